//! Credential registry.
//!
//! Owned by the service composition root and injected into the dispatcher.
//! Each entry carries its own lock over the mutable token/key state so
//! concurrent flows on different integrations never contend.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::GatewayCredentials;
use crate::services::error::GatewayError;

/// Cached token returned while at least this much lifetime remains.
pub(crate) const TOKEN_EXPIRY_BUFFER_MINUTES: i64 = 5;

/// One tenant's gateway client: immutable credentials plus the mutable
/// session state (access token, cached public key).
pub struct ClientEntry {
    pub credentials: GatewayCredentials,
    pub(crate) state: RwLock<ClientState>,
}

#[derive(Default)]
pub(crate) struct ClientState {
    pub(crate) access_token: Option<String>,
    pub(crate) access_token_expiry: Option<DateTime<Utc>>,
    pub(crate) public_key: Option<String>,
}

impl ClientState {
    /// The cached access token, if it is still inside the expiry buffer.
    pub(crate) fn valid_access_token(&self) -> Option<String> {
        match (&self.access_token, self.access_token_expiry) {
            (Some(token), Some(expiry))
                if Utc::now() < expiry - Duration::minutes(TOKEN_EXPIRY_BUFFER_MINUTES) =>
            {
                Some(token.clone())
            }
            _ => None,
        }
    }

    /// The cached access token, as long as it has not actually expired.
    /// Proactive buffer-based refresh happens at the ensure point; requests
    /// in flight may still ride a token inside the buffer window.
    pub(crate) fn usable_access_token(&self) -> Option<String> {
        match (&self.access_token, self.access_token_expiry) {
            (Some(token), Some(expiry)) if Utc::now() < expiry => Some(token.clone()),
            _ => None,
        }
    }
}

impl ClientEntry {
    pub fn new(credentials: GatewayCredentials) -> Self {
        Self {
            credentials,
            state: RwLock::new(ClientState::default()),
        }
    }
}

/// Registry of configured integrations, keyed by integration id.
#[derive(Default)]
pub struct CredentialRegistry {
    entries: RwLock<HashMap<String, Arc<ClientEntry>>>,
}

impl CredentialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace an integration. Replacing resets any cached
    /// token/key state for that integration.
    pub async fn put(
        &self,
        integration_id: impl Into<String>,
        credentials: GatewayCredentials,
    ) -> Arc<ClientEntry> {
        let integration_id = integration_id.into();
        let entry = Arc::new(ClientEntry::new(credentials));
        tracing::info!(integration_id = %integration_id, "gateway integration configured");
        self.entries
            .write()
            .await
            .insert(integration_id, entry.clone());
        entry
    }

    pub async fn get(&self, integration_id: &str) -> Result<Arc<ClientEntry>, GatewayError> {
        self.entries
            .read()
            .await
            .get(integration_id)
            .cloned()
            .ok_or_else(|| GatewayError::ConfigNotFound(integration_id.to_string()))
    }

    pub async fn remove(&self, integration_id: &str) -> bool {
        let removed = self.entries.write().await.remove(integration_id).is_some();
        if removed {
            tracing::info!(integration_id = %integration_id, "gateway integration removed");
        }
        removed
    }
}
