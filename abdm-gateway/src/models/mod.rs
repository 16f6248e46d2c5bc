use serde::{Deserialize, Serialize};

use crate::endpoints::{SCOPE_ENROL, SCOPE_LOGIN};
use crate::services::error::GatewayError;
use crate::utils::jwt_payload;

/// Token bundle issued by a verify step.
///
/// `token` is the X-Token; enrollment flows may additionally return a
/// transaction token (T-Token) scoped to enrollment-adjacent operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBundle {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl TokenBundle {
    /// Classify the bundle by the scope claim embedded in its token.
    pub fn scope(&self) -> Result<TokenScope, GatewayError> {
        TokenScope::from_token(&self.token)
    }
}

/// The two token kinds the gateway issues. An enrollment-scoped token must
/// never be used where a login-scoped token is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenScope {
    /// Issued by enrollment and address-setting flows; grants only
    /// enrollment-scope operations.
    Enrollment,
    /// Issued by login and search-verify flows; grants profile-scope
    /// operations.
    Login,
}

impl TokenScope {
    /// Inspect the JWT payload's scope claim. Accepts both string and array
    /// claim forms under either `scope` or `scopes`.
    pub fn from_token(token: &str) -> Result<Self, GatewayError> {
        let claims = jwt_payload(token).ok_or_else(|| {
            GatewayError::InvalidResponse("gateway token is not a decodable JWT".to_string())
        })?;

        let claim = claims
            .get("scope")
            .or_else(|| claims.get("scopes"))
            .cloned()
            .ok_or_else(|| {
                GatewayError::InvalidResponse("gateway token carries no scope claim".to_string())
            })?;

        let entries: Vec<String> = match claim {
            serde_json::Value::String(s) => s.split_whitespace().map(str::to_string).collect(),
            serde_json::Value::Array(items) => items
                .into_iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };

        if entries.iter().any(|s| s == SCOPE_ENROL) {
            Ok(TokenScope::Enrollment)
        } else if entries.iter().any(|s| s == SCOPE_LOGIN) {
            Ok(TokenScope::Login)
        } else {
            Err(GatewayError::InvalidResponse(format!(
                "gateway token scope claim matches neither enrollment nor login: {entries:?}"
            )))
        }
    }
}

/// Reconciled identity profile as returned by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProfile {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "ABHANumber", default)]
    pub abha_number: Option<String>,
    #[serde(default)]
    pub phr_address: Vec<String>,
    #[serde(default)]
    pub abha_status: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
}

/// One ABHA account in a multi-account login verify response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbhaAccount {
    #[serde(rename = "ABHANumber")]
    pub abha_number: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub preferred_abha_address: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Identity hint for login OTP requests. The hint value is encrypted before
/// transmission except for the ABHA address, which the gateway does not
/// classify as sensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoginHint {
    AbhaNumber(String),
    Mobile(String),
    AbhaAddress(String),
}

/// PHR search criterion. Only ABHA number and ABHA address are accepted by
/// the gateway's search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchCriterion {
    AbhaNumber(String),
    AbhaAddress(String),
    Mobile(String),
    Aadhaar(String),
}

/// Which channel delivers an OTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpSystem {
    /// The gateway's own delivery channel.
    Abdm,
    /// The national ID system's channel; only valid when the hint is
    /// Aadhaar or an ABHA number resolved via Aadhaar.
    Aadhaar,
}

impl OtpSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpSystem::Abdm => crate::endpoints::OTP_SYSTEM_ABDM,
            OtpSystem::Aadhaar => crate::endpoints::OTP_SYSTEM_AADHAAR,
        }
    }
}

/// Biometric capture modality. The wire codes are Aadhaar PID conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiometricModality {
    Fingerprint,
    Face,
    Iris,
}

impl BiometricModality {
    pub fn wire_code(&self) -> &'static str {
        match self {
            BiometricModality::Fingerprint => "FMR",
            BiometricModality::Face => "FID",
            BiometricModality::Iris => "IIR",
        }
    }
}
