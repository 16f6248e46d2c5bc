//! Public key cache.
//!
//! Fetches the gateway's current RSA public certificate lazily, on first
//! encryption in a session or after the gateway rejects a payload as
//! mis-encrypted (key rotated). The response shape is not firmly specified
//! by the vendor — a plain string, or an object under one of several
//! conventional field names — so extraction probes a fixed priority order
//! and fails hard when nothing matches.

use serde_json::Value;
use uuid::Uuid;

use crate::endpoints::{
    CM_ID_HEADER, PUBLIC_CERTIFICATE_PATH, REQUEST_ID_HEADER, TIMESTAMP_HEADER,
};
use crate::services::error::GatewayError;
use crate::services::flows::GatewayClient;
use crate::utils::iso_timestamp_millis;

/// Object field names probed, in order, when the certificate response is a
/// JSON object.
const PUBLIC_KEY_FIELDS: [&str; 4] = ["publicKey", "public_key", "certificate", "key"];

impl GatewayClient {
    /// Return the cached public key, fetching it on first use. The fetch
    /// runs under the entry's write lock so concurrent first encryptions
    /// trigger one certificate request.
    pub async fn ensure_public_key(&self) -> Result<String, GatewayError> {
        {
            let state = self.entry.state.read().await;
            if let Some(key) = &state.public_key {
                return Ok(key.clone());
            }
        }

        // Resolve the bearer token before taking the write guard; the token
        // refresh path takes the same lock.
        let access_token = self.ensure_access_token().await?;

        let mut state = self.entry.state.write().await;
        if let Some(key) = &state.public_key {
            return Ok(key.clone());
        }

        let credentials = &self.entry.credentials;
        let url = format!("{}{}", credentials.abha_base_url, PUBLIC_CERTIFICATE_PATH);

        let response = self
            .http
            .get(&url)
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
            .header(TIMESTAMP_HEADER, iso_timestamp_millis())
            .header(CM_ID_HEADER, &credentials.x_cm_id)
            .bearer_auth(&access_token)
            .send()
            .await
            .map_err(GatewayError::from_reqwest)?;

        let status = response.status();
        let body = response.text().await.map_err(GatewayError::from_reqwest)?;

        if !status.is_success() {
            tracing::error!(status = %status, "gateway certificate fetch failed");
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let key = extract_public_key(&body)?;
        state.public_key = Some(key.clone());
        tracing::debug!("gateway public key cached");
        Ok(key)
    }

    /// Drop the cached key so the next encryption refetches it.
    pub async fn invalidate_public_key(&self) {
        self.entry.state.write().await.public_key = None;
    }
}

/// Extract the key string from a certificate response body. Probe order:
/// plain string body (raw or JSON-encoded), then the conventional object
/// fields in [`PUBLIC_KEY_FIELDS`] order.
pub(crate) fn extract_public_key(body: &str) -> Result<String, GatewayError> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::String(key)) => Ok(key),
        Ok(Value::Object(map)) => {
            for field in PUBLIC_KEY_FIELDS {
                if let Some(Value::String(key)) = map.get(field) {
                    return Ok(key.clone());
                }
            }
            Err(GatewayError::InvalidResponse(format!(
                "certificate response exposes none of the known key fields {PUBLIC_KEY_FIELDS:?}"
            )))
        }
        Ok(_) => Err(GatewayError::InvalidResponse(
            "certificate response is neither a key string nor an object".to_string(),
        )),
        // Not JSON at all: the body is the key material itself.
        Err(_) => {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                Err(GatewayError::InvalidResponse(
                    "certificate response body is empty".to_string(),
                ))
            } else {
                Ok(trimmed.to_string())
            }
        }
    }
}
