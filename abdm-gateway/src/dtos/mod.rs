//! Wire types for the gateway's request and response bodies.
//!
//! Field names follow the gateway contract (camelCase, `ABHANumber`,
//! `timeStamp`); encrypted fields carry base64 ciphertext produced by the
//! payload encryptor, never plaintext.

use serde::{Deserialize, Serialize};

/// Client-credentials session exchange.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub grant_type: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Send-step body shared by the enrollment, login, and search OTP flows.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txn_id: Option<String>,
    pub scope: Vec<&'static str>,
    pub login_hint: &'static str,
    /// Encrypted hint value, except for ABHA addresses.
    pub login_id: String,
    pub otp_system: &'static str,
}

/// OTP proof inside a verify-step `authData` block.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpPayload {
    pub time_stamp: String,
    pub txn_id: String,
    /// Encrypted OTP.
    pub otp_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
}

/// Password proof; both fields are encrypted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordPayload {
    #[serde(rename = "ABHANumber")]
    pub abha_number: String,
    pub password: String,
}

/// Biometric proof. The pid blob is submitted as captured; the gateway
/// rejects encrypted pid data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BioPayload {
    pub txn_id: String,
    pub bio_type: &'static str,
    pub pid: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    pub auth_methods: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<OtpPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<PasswordPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<BioPayload>,
}

impl AuthData {
    pub fn otp(otp: OtpPayload) -> Self {
        Self {
            auth_methods: vec![crate::endpoints::AUTH_METHOD_OTP],
            otp: Some(otp),
            password: None,
            bio: None,
        }
    }

    pub fn password(password: PasswordPayload) -> Self {
        Self {
            auth_methods: vec![crate::endpoints::AUTH_METHOD_PASSWORD],
            otp: None,
            password: Some(password),
            bio: None,
        }
    }

    pub fn bio(bio: BioPayload) -> Self {
        Self {
            auth_methods: vec![crate::endpoints::AUTH_METHOD_BIO],
            otp: None,
            password: None,
            bio: Some(bio),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Consent {
    pub code: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrolByAadhaarRequest {
    pub auth_data: AuthData,
    pub consent: Consent,
}

/// Verify-step body for the login family and the enrollment auth endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    pub scope: Vec<&'static str>,
    pub auth_data: AuthData,
}

/// Account selection after a multi-account login verify.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyUserRequest {
    #[serde(rename = "ABHANumber")]
    pub abha_number: String,
    pub txn_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAddressRequest {
    pub txn_id: String,
    pub abha_address: String,
    pub preferred: u8,
}

/// PHR search body; exactly one criterion is set.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(rename = "ABHANumber", skip_serializing_if = "Option::is_none")]
    pub abha_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abha_address: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePhotoRequest {
    /// Base64 image bytes; not encrypted.
    pub profile_photo: String,
}

/// Email verification link request; the email travels encrypted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailVerificationRequest {
    pub scope: Vec<&'static str>,
    pub login_hint: &'static str,
    pub login_id: String,
    pub otp_system: &'static str,
}
