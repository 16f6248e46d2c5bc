//! Login flows: OTP by ABHA number, mobile, or ABHA address; password;
//! biometric; and account selection for multi-account mobile logins.
//!
//! Verify steps return auth-scoped token bundles (X-Token) granting
//! profile operations. A mobile login that resolves several ABHA accounts
//! returns a transaction token instead; the caller completes the flow with
//! [`GatewayClient::select_login_account`].

use serde_json::Value;

use crate::dtos::{AuthData, AuthRequest, BioPayload, OtpPayload, OtpRequest, PasswordPayload, VerifyUserRequest};
use crate::endpoints::{
    LOGIN_HINT_ABHA_ADDRESS, LOGIN_HINT_ABHA_NUMBER, LOGIN_HINT_MOBILE, LOGIN_OTP_PATH,
    LOGIN_VERIFY_PATH, LOGIN_VERIFY_USER_PATH, SCOPE_AADHAAR_VERIFY, SCOPE_BIO_VERIFY,
    SCOPE_LOGIN, SCOPE_MOBILE_VERIFY, SCOPE_PASSWORD_VERIFY,
};
use crate::models::{BiometricModality, LoginHint, OtpSystem};
use crate::services::crypto;
use crate::services::error::GatewayError;
use crate::services::flows::{GatewayClient, RequestTokens};
use crate::utils::{format_abha_number, iso_timestamp_millis};

/// Second scope entry for an OTP exchange, by delivery system.
fn otp_scope(otp_system: OtpSystem) -> &'static str {
    match otp_system {
        OtpSystem::Abdm => SCOPE_MOBILE_VERIFY,
        OtpSystem::Aadhaar => SCOPE_AADHAAR_VERIFY,
    }
}

impl GatewayClient {
    /// Send a login OTP. The hint value is encrypted except for ABHA
    /// addresses, which the gateway does not classify as sensitive. The
    /// Aadhaar delivery system is only valid for ABHA-number hints (the
    /// number's Aadhaar linkage routes the OTP).
    #[tracing::instrument(skip(self, hint))]
    pub async fn request_login_otp(
        &self,
        hint: &LoginHint,
        otp_system: OtpSystem,
    ) -> Result<Value, GatewayError> {
        if otp_system == OtpSystem::Aadhaar && !matches!(hint, LoginHint::AbhaNumber(_)) {
            return Err(GatewayError::Validation(
                "the aadhaar OTP system requires an ABHA-number hint".to_string(),
            ));
        }

        let scope = vec![SCOPE_LOGIN, otp_scope(otp_system)];

        match hint {
            LoginHint::AbhaNumber(number) => {
                let normalized = format_abha_number(number);
                self.post_encrypted(LOGIN_OTP_PATH, RequestTokens::default(), move |key| {
                    Ok(OtpRequest {
                        txn_id: None,
                        scope: scope.clone(),
                        login_hint: LOGIN_HINT_ABHA_NUMBER,
                        login_id: crypto::encrypt(&normalized, key)?,
                        otp_system: otp_system.as_str(),
                    })
                })
                .await
            }
            LoginHint::Mobile(mobile) => {
                self.post_encrypted(LOGIN_OTP_PATH, RequestTokens::default(), |key| {
                    Ok(OtpRequest {
                        txn_id: None,
                        scope: scope.clone(),
                        login_hint: LOGIN_HINT_MOBILE,
                        login_id: crypto::encrypt(mobile, key)?,
                        otp_system: otp_system.as_str(),
                    })
                })
                .await
            }
            LoginHint::AbhaAddress(address) => {
                // Not sensitive: goes out as-is.
                let request = OtpRequest {
                    txn_id: None,
                    scope,
                    login_hint: LOGIN_HINT_ABHA_ADDRESS,
                    login_id: address.clone(),
                    otp_system: otp_system.as_str(),
                };
                self.post_abha(LOGIN_OTP_PATH, &request, RequestTokens::default())
                    .await
            }
        }
    }

    /// Verify a login OTP. The scope pair must match the send step's.
    #[tracing::instrument(skip(self, otp), fields(txn_id = %txn_id))]
    pub async fn verify_login_otp(
        &self,
        txn_id: &str,
        otp: &str,
        otp_system: OtpSystem,
    ) -> Result<Value, GatewayError> {
        self.post_encrypted(LOGIN_VERIFY_PATH, RequestTokens::default(), |key| {
            Ok(AuthRequest {
                scope: vec![SCOPE_LOGIN, otp_scope(otp_system)],
                auth_data: AuthData::otp(OtpPayload {
                    time_stamp: iso_timestamp_millis(),
                    txn_id: txn_id.to_string(),
                    otp_value: crypto::encrypt(otp, key)?,
                    mobile: None,
                }),
            })
        })
        .await
    }

    /// Select one ABHA account after a multi-account mobile login. The
    /// transaction token from the verify step authorizes the selection.
    #[tracing::instrument(skip(self, transaction_token), fields(txn_id = %txn_id))]
    pub async fn select_login_account(
        &self,
        txn_id: &str,
        abha_number: &str,
        transaction_token: &str,
    ) -> Result<Value, GatewayError> {
        self.post_abha(
            LOGIN_VERIFY_USER_PATH,
            &VerifyUserRequest {
                abha_number: format_abha_number(abha_number),
                txn_id: txn_id.to_string(),
            },
            RequestTokens {
                transaction_token: Some(transaction_token),
                ..Default::default()
            },
        )
        .await
    }

    /// Password login: a single call, no send/verify split. Both the
    /// normalized ABHA number and the password are encrypted.
    #[tracing::instrument(skip(self, abha_number, password))]
    pub async fn verify_password(
        &self,
        abha_number: &str,
        password: &str,
    ) -> Result<Value, GatewayError> {
        let normalized = format_abha_number(abha_number);
        self.post_encrypted(LOGIN_VERIFY_PATH, RequestTokens::default(), move |key| {
            Ok(AuthRequest {
                scope: vec![SCOPE_LOGIN, SCOPE_PASSWORD_VERIFY],
                auth_data: AuthData::password(PasswordPayload {
                    abha_number: crypto::encrypt(&normalized, key)?,
                    password: crypto::encrypt(password, key)?,
                }),
            })
        })
        .await
    }

    /// Verify a biometric capture against a pending transaction. The pid
    /// blob is submitted as captured — the gateway rejects encrypted pid
    /// data — so no key fetch happens on this path.
    #[tracing::instrument(skip(self, pid), fields(txn_id = %txn_id, modality = ?modality))]
    pub async fn verify_biometric(
        &self,
        txn_id: &str,
        modality: BiometricModality,
        pid: &str,
    ) -> Result<Value, GatewayError> {
        let request = AuthRequest {
            scope: vec![SCOPE_LOGIN, SCOPE_BIO_VERIFY],
            auth_data: AuthData::bio(BioPayload {
                txn_id: txn_id.to_string(),
                bio_type: modality.wire_code(),
                pid: pid.to_string(),
            }),
        };
        self.post_abha(LOGIN_VERIFY_PATH, &request, RequestTokens::default())
            .await
    }
}
