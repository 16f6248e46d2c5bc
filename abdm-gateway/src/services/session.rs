//! Access token manager.
//!
//! Obtains and caches the gateway-wide bearer token via a client-credentials
//! exchange. The exchange runs under the entry's write lock so concurrent
//! callers observing an expired token refresh once, not once each.

use chrono::{Duration, Utc};
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::dtos::{SessionRequest, SessionResponse};
use crate::endpoints::{CM_ID_HEADER, REQUEST_ID_HEADER, SESSIONS_PATH, TIMESTAMP_HEADER};
use crate::services::error::GatewayError;
use crate::services::flows::GatewayClient;
use crate::utils::iso_timestamp_millis;

impl GatewayClient {
    /// Return the cached access token, refreshing it when it is missing or
    /// inside the expiry buffer. Exchange failures surface as
    /// [`GatewayError::AuthFailed`] and are never silently retried.
    pub async fn ensure_access_token(&self) -> Result<String, GatewayError> {
        {
            let state = self.entry.state.read().await;
            if let Some(token) = state.valid_access_token() {
                return Ok(token);
            }
        }

        let mut state = self.entry.state.write().await;
        // Another caller may have refreshed while we waited for the lock.
        if let Some(token) = state.valid_access_token() {
            return Ok(token);
        }

        let credentials = &self.entry.credentials;
        let url = format!("{}{}", credentials.gateway_base_url, SESSIONS_PATH);
        let request = SessionRequest {
            client_id: &credentials.client_id,
            client_secret: credentials.client_secret.expose_secret(),
            grant_type: "client_credentials",
        };

        let response = self
            .http
            .post(&url)
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
            .header(TIMESTAMP_HEADER, iso_timestamp_millis())
            .header(CM_ID_HEADER, &credentials.x_cm_id)
            .json(&request)
            .send()
            .await
            .map_err(GatewayError::from_reqwest)?;

        let status = response.status();
        let body = response.text().await.map_err(GatewayError::from_reqwest)?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                client_id = %credentials.client_id,
                "gateway session exchange failed"
            );
            return Err(GatewayError::AuthFailed(format!("{status}: {body}")));
        }

        let session: SessionResponse = serde_json::from_str(&body)
            .map_err(|e| GatewayError::AuthFailed(format!("malformed session response: {e}")))?;

        state.access_token = Some(session.access_token.clone());
        state.access_token_expiry = Some(Utc::now() + Duration::seconds(session.expires_in));

        tracing::debug!(
            client_id = %credentials.client_id,
            expires_in = session.expires_in,
            "gateway access token refreshed"
        );

        Ok(session.access_token)
    }
}
