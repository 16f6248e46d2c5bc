//! Flow engine for the ABDM gateway.
//!
//! Each flow is a request/response exchange; multi-step flows thread the
//! gateway-issued `txnId` verbatim from the send step to its verify step.
//! Shared plumbing here builds the common header set (fresh correlation id
//! and timestamp per call, consent-manager marker, bearer access token) and
//! splits responses into raw payloads vs. verbatim gateway rejections.

mod enrollment;
mod login;
mod profile;
mod search;

use reqwest::RequestBuilder;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::endpoints::{
    AUTH_TOKEN_HEADER, CM_ID_HEADER, REQUEST_ID_HEADER, TIMESTAMP_HEADER,
    TRANSACTION_TOKEN_HEADER, TXN_ID_HEADER,
};
use crate::services::error::GatewayError;
use crate::services::registry::ClientEntry;
use crate::utils::iso_timestamp_millis;

/// Deadline for every outbound gateway call.
pub const GATEWAY_TIMEOUT_SECS: u64 = 30;

/// Per-call token routing. The bearer access token is always present; the
/// auth token (X-Token) and transaction token (T-Token) are flow-specific.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RequestTokens<'a> {
    pub auth_token: Option<&'a str>,
    pub transaction_token: Option<&'a str>,
    pub txn_id: Option<&'a str>,
}

/// Gateway client bound to one registry entry.
#[derive(Clone)]
pub struct GatewayClient {
    pub(crate) http: reqwest::Client,
    pub(crate) entry: Arc<ClientEntry>,
}

impl GatewayClient {
    pub fn new(http: reqwest::Client, entry: Arc<ClientEntry>) -> Self {
        Self { http, entry }
    }

    pub(crate) fn abha_url(&self, path: &str) -> String {
        format!("{}{}", self.entry.credentials.abha_base_url, path)
    }

    /// Apply the common header set. Correlation id and timestamp are
    /// regenerated per call, never reused.
    pub(crate) async fn apply_headers(
        &self,
        builder: RequestBuilder,
        tokens: RequestTokens<'_>,
    ) -> Result<RequestBuilder, GatewayError> {
        let cached = self.entry.state.read().await.usable_access_token();
        let access_token = match cached {
            Some(token) => token,
            None => self.ensure_access_token().await?,
        };

        let mut builder = builder
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
            .header(TIMESTAMP_HEADER, iso_timestamp_millis())
            .header(CM_ID_HEADER, &self.entry.credentials.x_cm_id)
            .bearer_auth(access_token);

        if let Some(token) = tokens.auth_token {
            builder = builder.header(AUTH_TOKEN_HEADER, format!("Bearer {token}"));
        }
        if let Some(token) = tokens.transaction_token {
            builder = builder.header(TRANSACTION_TOKEN_HEADER, format!("Bearer {token}"));
        }
        if let Some(txn_id) = tokens.txn_id {
            builder = builder.header(TXN_ID_HEADER, txn_id);
        }

        Ok(builder)
    }

    pub(crate) async fn post_abha<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
        tokens: RequestTokens<'_>,
    ) -> Result<Value, GatewayError> {
        let builder = self.http.post(self.abha_url(path));
        let builder = self.apply_headers(builder, tokens).await?;
        let response = builder
            .json(body)
            .send()
            .await
            .map_err(GatewayError::from_reqwest)?;
        Self::into_json(response).await
    }

    pub(crate) async fn patch_abha<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
        tokens: RequestTokens<'_>,
    ) -> Result<Value, GatewayError> {
        let builder = self.http.patch(self.abha_url(path));
        let builder = self.apply_headers(builder, tokens).await?;
        let response = builder
            .json(body)
            .send()
            .await
            .map_err(GatewayError::from_reqwest)?;
        Self::into_json(response).await
    }

    pub(crate) async fn get_abha_json(
        &self,
        path: &str,
        tokens: RequestTokens<'_>,
    ) -> Result<Value, GatewayError> {
        let response = self.get_abha(path, tokens).await?;
        Self::into_json(response).await
    }

    /// GET returning the raw response for flows that consume bytes. No
    /// Accept header is ever set; the card endpoint rejects requests that
    /// carry one.
    pub(crate) async fn get_abha(
        &self,
        path: &str,
        tokens: RequestTokens<'_>,
    ) -> Result<reqwest::Response, GatewayError> {
        let builder = self.http.get(self.abha_url(path));
        let builder = self.apply_headers(builder, tokens).await?;
        builder.send().await.map_err(GatewayError::from_reqwest)
    }

    /// Split a response into its raw JSON payload or a verbatim rejection.
    pub(crate) async fn into_json(response: reqwest::Response) -> Result<Value, GatewayError> {
        let status = response.status();
        let body = response.text().await.map_err(GatewayError::from_reqwest)?;

        if !status.is_success() {
            tracing::warn!(status = %status, "gateway rejected request");
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body)
            .map_err(|e| GatewayError::InvalidResponse(format!("non-JSON gateway body: {e}")))
    }

    /// POST a body whose sensitive fields are encrypted with the cached
    /// public key. If the gateway rejects the payload as mis-encrypted the
    /// key has rotated: refetch it, rebuild the body, and retry exactly
    /// once. A second rejection is final.
    pub(crate) async fn post_encrypted<T, F>(
        &self,
        path: &str,
        tokens: RequestTokens<'_>,
        build: F,
    ) -> Result<Value, GatewayError>
    where
        T: Serialize,
        F: Fn(&str) -> Result<T, GatewayError>,
    {
        let key = self.ensure_public_key().await?;
        let body = build(&key)?;

        match self.post_abha(path, &body, tokens).await {
            Err(GatewayError::Rejected { status, body: rejection })
                if is_encryption_rejection(status, &rejection) =>
            {
                tracing::warn!(
                    status = status,
                    "gateway flagged payload encryption; refreshing public key"
                );
                self.invalidate_public_key().await;
                let key = self.ensure_public_key().await?;
                let body = build(&key)?;
                self.post_abha(path, &body, tokens).await
            }
            other => other,
        }
    }
}

/// The gateway reports a rotated/mismatched key as a 4xx whose body names
/// the encryption (or its own decryption) failure.
pub(crate) fn is_encryption_rejection(status: u16, body: &str) -> bool {
    let body = body.to_lowercase();
    (status == 400 || status == 422) && (body.contains("encrypt") || body.contains("decrypt"))
}
