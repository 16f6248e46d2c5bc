//! Enrollment flows: Aadhaar OTP enrollment, in-flow mobile update, and
//! ABHA address management.
//!
//! The send step issues a `txnId` that every later step of the same
//! enrollment must carry verbatim. Verify responses include a
//! transaction-scoped token (T-Token) that grants only enrollment-adjacent
//! operations such as setting the ABHA address.

use serde_json::Value;

use crate::dtos::{
    AuthData, Consent, EnrolByAadhaarRequest, AuthRequest, OtpPayload, OtpRequest,
    SetAddressRequest,
};
use crate::endpoints::{
    ADDRESS_SUGGESTION_PATH, CONSENT_CODE_ENROLLMENT, CONSENT_VERSION, ENROLLMENT_AUTH_PATH,
    ENROLLMENT_OTP_PATH, ENROL_BY_AADHAAR_PATH, LOGIN_HINT_AADHAAR, LOGIN_HINT_MOBILE,
    OTP_SYSTEM_AADHAAR, OTP_SYSTEM_ABDM, SCOPE_ENROL, SCOPE_MOBILE_VERIFY,
    SET_ABHA_ADDRESS_PATH,
};
use crate::services::crypto;
use crate::services::error::GatewayError;
use crate::services::flows::{GatewayClient, RequestTokens};
use crate::utils::iso_timestamp_millis;

impl GatewayClient {
    /// Send the enrollment OTP to the Aadhaar-linked mobile. Returns the
    /// gateway payload carrying the new `txnId`.
    #[tracing::instrument(skip(self, aadhaar))]
    pub async fn request_enrollment_otp(&self, aadhaar: &str) -> Result<Value, GatewayError> {
        self.post_encrypted(ENROLLMENT_OTP_PATH, RequestTokens::default(), |key| {
            Ok(OtpRequest {
                txn_id: None,
                scope: vec![SCOPE_ENROL],
                login_hint: LOGIN_HINT_AADHAAR,
                login_id: crypto::encrypt(aadhaar, key)?,
                otp_system: OTP_SYSTEM_AADHAAR,
            })
        })
        .await
    }

    /// Complete enrollment with the Aadhaar OTP. `mobile` becomes the
    /// communication number on the new account; it rides along unencrypted
    /// inside the otp block, as the gateway expects.
    #[tracing::instrument(skip(self, otp, mobile), fields(txn_id = %txn_id))]
    pub async fn enrol_by_aadhaar(
        &self,
        txn_id: &str,
        otp: &str,
        mobile: &str,
    ) -> Result<Value, GatewayError> {
        self.post_encrypted(ENROL_BY_AADHAAR_PATH, RequestTokens::default(), |key| {
            Ok(EnrolByAadhaarRequest {
                auth_data: AuthData::otp(OtpPayload {
                    time_stamp: iso_timestamp_millis(),
                    txn_id: txn_id.to_string(),
                    otp_value: crypto::encrypt(otp, key)?,
                    mobile: Some(mobile.to_string()),
                }),
                consent: Consent {
                    code: CONSENT_CODE_ENROLLMENT,
                    version: CONSENT_VERSION,
                },
            })
        })
        .await
    }

    /// Request an OTP on a different mobile number mid-enrollment, when the
    /// desired communication number is not the Aadhaar-linked one. Threads
    /// the enrollment `txnId`.
    #[tracing::instrument(skip(self, mobile), fields(txn_id = %txn_id))]
    pub async fn request_mobile_update_otp(
        &self,
        txn_id: &str,
        mobile: &str,
    ) -> Result<Value, GatewayError> {
        self.post_encrypted(ENROLLMENT_OTP_PATH, RequestTokens::default(), |key| {
            Ok(OtpRequest {
                txn_id: Some(txn_id.to_string()),
                scope: vec![SCOPE_ENROL, SCOPE_MOBILE_VERIFY],
                login_hint: LOGIN_HINT_MOBILE,
                login_id: crypto::encrypt(mobile, key)?,
                otp_system: OTP_SYSTEM_ABDM,
            })
        })
        .await
    }

    /// Verify the mobile-update OTP on the same enrollment transaction.
    #[tracing::instrument(skip(self, otp), fields(txn_id = %txn_id))]
    pub async fn verify_mobile_update_otp(
        &self,
        txn_id: &str,
        otp: &str,
    ) -> Result<Value, GatewayError> {
        self.post_encrypted(ENROLLMENT_AUTH_PATH, RequestTokens::default(), |key| {
            Ok(AuthRequest {
                scope: vec![SCOPE_ENROL, SCOPE_MOBILE_VERIFY],
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

    /// Candidate ABHA addresses for the enrolled profile. The transaction
    /// id travels as a header on this one.
    #[tracing::instrument(skip(self), fields(txn_id = %txn_id))]
    pub async fn fetch_address_suggestions(&self, txn_id: &str) -> Result<Value, GatewayError> {
        self.get_abha_json(
            ADDRESS_SUGGESTION_PATH,
            RequestTokens {
                txn_id: Some(txn_id),
                ..Default::default()
            },
        )
        .await
    }

    /// Claim the chosen ABHA address for the enrolled profile. Nothing in
    /// this body is classified sensitive.
    #[tracing::instrument(skip(self), fields(txn_id = %txn_id, abha_address = %abha_address))]
    pub async fn set_abha_address(
        &self,
        txn_id: &str,
        abha_address: &str,
    ) -> Result<Value, GatewayError> {
        self.post_abha(
            SET_ABHA_ADDRESS_PATH,
            &SetAddressRequest {
                txn_id: txn_id.to_string(),
                abha_address: abha_address.to_string(),
                preferred: 1,
            },
            RequestTokens::default(),
        )
        .await
    }
}
