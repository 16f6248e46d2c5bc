use anyhow::{anyhow, Result};
use dotenvy::dotenv;
use secrecy::Secret;
use serde::Deserialize;
use std::env;

/// Gateway deployment the credentials belong to.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Sandbox,
    Production,
}

impl Environment {
    /// Host serving the session (access-token) endpoint.
    pub fn gateway_base_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => "https://dev.abdm.gov.in/api/hiecm",
            Environment::Production => "https://live.abdm.gov.in/api/hiecm",
        }
    }

    /// Host serving the ABHA profile/enrollment/login endpoints.
    pub fn abha_base_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => "https://abhasbx.abdm.gov.in/abha/api/v3",
            Environment::Production => "https://abha.abdm.gov.in/abha/api/v3",
        }
    }

    /// Consent-manager marker the gateway expects in the X-CM-ID header.
    pub fn default_cm_id(&self) -> &'static str {
        match self {
            Environment::Sandbox => "sbx",
            Environment::Production => "abdm",
        }
    }
}

/// Per-tenant gateway client credentials.
///
/// One instance per tenant+environment pair, registered in the
/// [`CredentialRegistry`](crate::services::registry::CredentialRegistry) on
/// configuration save and removed on integration deletion.
#[derive(Clone, Debug)]
pub struct GatewayCredentials {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub x_cm_id: String,
    pub environment: Environment,
    /// Overridable for tests; defaults from the environment.
    pub gateway_base_url: String,
    pub abha_base_url: String,
}

impl GatewayCredentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: Secret<String>,
        environment: Environment,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            x_cm_id: environment.default_cm_id().to_string(),
            environment,
            gateway_base_url: environment.gateway_base_url().to_string(),
            abha_base_url: environment.abha_base_url().to_string(),
        }
    }

    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let client_id = env::var("ABDM_CLIENT_ID")
            .map_err(|_| anyhow!("ABDM_CLIENT_ID must be set"))?;
        let client_secret = env::var("ABDM_CLIENT_SECRET")
            .map_err(|_| anyhow!("ABDM_CLIENT_SECRET must be set"))?;

        let environment = match env::var("ABDM_ENVIRONMENT")
            .unwrap_or_else(|_| "sandbox".to_string())
            .to_lowercase()
            .as_str()
        {
            "production" | "live" => Environment::Production,
            _ => Environment::Sandbox,
        };

        let mut credentials = Self::new(client_id, Secret::new(client_secret), environment);

        if let Ok(cm_id) = env::var("ABDM_CM_ID") {
            credentials.x_cm_id = cm_id;
        }
        if let Ok(url) = env::var("ABDM_GATEWAY_BASE_URL") {
            credentials.gateway_base_url = url;
        }
        if let Ok(url) = env::var("ABDM_ABHA_BASE_URL") {
            credentials.abha_base_url = url;
        }

        Ok(credentials)
    }
}
