//! Profile-scoped flows: fetch, ABHA card, QR code, photo update, and the
//! email verification link. All of these authenticate with the auth-scoped
//! X-Token on top of the bearer access token.

use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Value};

use crate::dtos::{EmailVerificationRequest, UpdatePhotoRequest};
use crate::endpoints::{
    ABHA_CARD_PATH, EMAIL_VERIFICATION_PATH, LOGIN_HINT_EMAIL, OTP_SYSTEM_ABDM, PROFILE_PATH,
    QR_CODE_PATH, SCOPE_EMAIL_VERIFY, SCOPE_LOGIN,
};
use crate::services::crypto;
use crate::services::error::GatewayError;
use crate::services::flows::{GatewayClient, RequestTokens};
use crate::utils::sniff_card_mime;

impl GatewayClient {
    fn profile_tokens<'a>(auth_token: &'a str) -> RequestTokens<'a> {
        RequestTokens {
            auth_token: Some(auth_token),
            ..Default::default()
        }
    }

    /// Fetch the full identity profile.
    #[tracing::instrument(skip(self, auth_token))]
    pub async fn get_profile(&self, auth_token: &str) -> Result<Value, GatewayError> {
        self.get_abha_json(PROFILE_PATH, Self::profile_tokens(auth_token))
            .await
    }

    /// Download the ABHA card. The gateway rejects this call when an Accept
    /// header is present, so none is set; the binary body is sniffed
    /// (PDF vs PNG) and re-encoded as base64 for the caller.
    #[tracing::instrument(skip(self, auth_token))]
    pub async fn download_card(&self, auth_token: &str) -> Result<Value, GatewayError> {
        let response = self
            .get_abha(ABHA_CARD_PATH, Self::profile_tokens(auth_token))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(GatewayError::from_reqwest)?;
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(GatewayError::from_reqwest)?;
        let mime_type = sniff_card_mime(&bytes);
        tracing::debug!(mime_type, size = bytes.len(), "ABHA card downloaded");

        Ok(json!({
            "mimeType": mime_type,
            "content": general_purpose::STANDARD.encode(&bytes),
        }))
    }

    /// Fetch the profile QR code payload.
    #[tracing::instrument(skip(self, auth_token))]
    pub async fn get_qr_code(&self, auth_token: &str) -> Result<Value, GatewayError> {
        self.get_abha_json(QR_CODE_PATH, Self::profile_tokens(auth_token))
            .await
    }

    /// Replace the profile photo. The photo is base64 image data, not
    /// encrypted.
    #[tracing::instrument(skip(self, auth_token, photo_base64))]
    pub async fn update_profile_photo(
        &self,
        auth_token: &str,
        photo_base64: &str,
    ) -> Result<Value, GatewayError> {
        self.patch_abha(
            PROFILE_PATH,
            &UpdatePhotoRequest {
                profile_photo: photo_base64.to_string(),
            },
            Self::profile_tokens(auth_token),
        )
        .await
    }

    /// Ask the gateway to send a verification link to the given email. The
    /// email address is classified sensitive and travels encrypted.
    #[tracing::instrument(skip(self, auth_token, email))]
    pub async fn send_email_verification(
        &self,
        auth_token: &str,
        email: &str,
    ) -> Result<Value, GatewayError> {
        self.post_encrypted(
            EMAIL_VERIFICATION_PATH,
            Self::profile_tokens(auth_token),
            |key| {
                Ok(EmailVerificationRequest {
                    scope: vec![SCOPE_LOGIN, SCOPE_EMAIL_VERIFY],
                    login_hint: LOGIN_HINT_EMAIL,
                    login_id: crypto::encrypt(email, key)?,
                    otp_system: OTP_SYSTEM_ABDM,
                })
            },
        )
        .await
    }
}
