//! Persistence contract expected of the profile/token store.
//!
//! The service layer owns persistence; this subsystem only consumes the
//! contract (and never creates profiles itself — flows return raw gateway
//! payloads). The in-memory implementation backs tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::models::{IdentityProfile, TokenBundle};

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Persist a reconciled profile with its latest token bundle.
    async fn save_profile(
        &self,
        tenant: &str,
        profile: &IdentityProfile,
        tokens: &TokenBundle,
    ) -> anyhow::Result<()>;

    /// The latest token bundle for an identity, if any.
    async fn stored_tokens(
        &self,
        tenant: &str,
        abha_number: &str,
    ) -> anyhow::Result<Option<TokenBundle>>;

    /// Replace the token bundle for an identity.
    async fn update_tokens(
        &self,
        tenant: &str,
        abha_number: &str,
        tokens: &TokenBundle,
    ) -> anyhow::Result<()>;

    /// Record an executed operation for audit.
    async fn log_transaction(
        &self,
        tenant: &str,
        operation: &str,
        metadata: Value,
    ) -> anyhow::Result<()>;
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MockProfileStore {
    profiles: Mutex<HashMap<(String, String), (IdentityProfile, TokenBundle)>>,
    transactions: Mutex<Vec<(String, String, Value)>>,
}

impl MockProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn transaction_count(&self) -> usize {
        self.transactions.lock().await.len()
    }
}

#[async_trait]
impl ProfileStore for MockProfileStore {
    async fn save_profile(
        &self,
        tenant: &str,
        profile: &IdentityProfile,
        tokens: &TokenBundle,
    ) -> anyhow::Result<()> {
        let key = (
            tenant.to_string(),
            profile.abha_number.clone().unwrap_or_default(),
        );
        self.profiles
            .lock()
            .await
            .insert(key, (profile.clone(), tokens.clone()));
        Ok(())
    }

    async fn stored_tokens(
        &self,
        tenant: &str,
        abha_number: &str,
    ) -> anyhow::Result<Option<TokenBundle>> {
        let profiles = self.profiles.lock().await;
        Ok(profiles
            .get(&(tenant.to_string(), abha_number.to_string()))
            .map(|(_, tokens)| tokens.clone()))
    }

    async fn update_tokens(
        &self,
        tenant: &str,
        abha_number: &str,
        tokens: &TokenBundle,
    ) -> anyhow::Result<()> {
        let mut profiles = self.profiles.lock().await;
        if let Some(entry) = profiles.get_mut(&(tenant.to_string(), abha_number.to_string())) {
            entry.1 = tokens.clone();
        }
        Ok(())
    }

    async fn log_transaction(
        &self,
        tenant: &str,
        operation: &str,
        metadata: Value,
    ) -> anyhow::Result<()> {
        self.transactions
            .lock()
            .await
            .push((tenant.to_string(), operation.to_string(), metadata));
        Ok(())
    }
}
