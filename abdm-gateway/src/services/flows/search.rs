//! PHR search and the index-scoped authentication that follows it.
//!
//! A successful search returns the authentication methods available for the
//! identity; later send steps reference a method by its selection index
//! instead of the original hint value. Mobile-number and Aadhaar search are
//! not supported by the gateway's search endpoint and are rejected before
//! any network call.

use serde_json::Value;

use crate::dtos::{AuthData, AuthRequest, OtpPayload, OtpRequest, SearchRequest};
use crate::endpoints::{
    LOGIN_HINT_INDEX, LOGIN_OTP_PATH, LOGIN_VERIFY_PATH, SCOPE_AADHAAR_VERIFY, SCOPE_LOGIN,
    SCOPE_MOBILE_VERIFY, SEARCH_PATH,
};
use crate::models::{OtpSystem, SearchCriterion};
use crate::services::crypto;
use crate::services::error::GatewayError;
use crate::services::flows::{GatewayClient, RequestTokens};
use crate::utils::{format_abha_number, iso_timestamp_millis};

impl GatewayClient {
    /// Look up an identity and the authentication methods it supports.
    /// Search criteria are not classified sensitive; nothing is encrypted.
    #[tracing::instrument(skip(self, criterion))]
    pub async fn search_phr(&self, criterion: &SearchCriterion) -> Result<Value, GatewayError> {
        let request = match criterion {
            SearchCriterion::AbhaNumber(number) => SearchRequest {
                abha_number: Some(format_abha_number(number)),
                abha_address: None,
            },
            SearchCriterion::AbhaAddress(address) => SearchRequest {
                abha_number: None,
                abha_address: Some(address.clone()),
            },
            SearchCriterion::Mobile(_) => {
                return Err(GatewayError::UnsupportedOperation(
                    "mobile-number search is not supported by the gateway; \
                     search by ABHA number or ABHA address instead"
                        .to_string(),
                ));
            }
            SearchCriterion::Aadhaar(_) => {
                return Err(GatewayError::UnsupportedOperation(
                    "Aadhaar search is not supported by the gateway; \
                     search by ABHA number or ABHA address instead"
                        .to_string(),
                ));
            }
        };

        self.post_abha(SEARCH_PATH, &request, RequestTokens::default())
            .await
    }

    /// Send an OTP scoped by a selection index from a preceding search.
    /// The index is classified sensitive and travels encrypted; the search
    /// `txnId` is threaded so the gateway can resolve it.
    #[tracing::instrument(skip(self), fields(txn_id = %txn_id))]
    pub async fn request_search_otp(
        &self,
        txn_id: &str,
        index: u32,
        otp_system: OtpSystem,
    ) -> Result<Value, GatewayError> {
        let scope_tag = match otp_system {
            OtpSystem::Abdm => SCOPE_MOBILE_VERIFY,
            OtpSystem::Aadhaar => SCOPE_AADHAAR_VERIFY,
        };

        self.post_encrypted(LOGIN_OTP_PATH, RequestTokens::default(), move |key| {
            Ok(OtpRequest {
                txn_id: Some(txn_id.to_string()),
                scope: vec![SCOPE_LOGIN, scope_tag],
                login_hint: LOGIN_HINT_INDEX,
                login_id: crypto::encrypt(&index.to_string(), key)?,
                otp_system: otp_system.as_str(),
            })
        })
        .await
    }

    /// Verify a search-scoped OTP; returns an auth-scoped token bundle.
    #[tracing::instrument(skip(self, otp), fields(txn_id = %txn_id))]
    pub async fn verify_search_otp(
        &self,
        txn_id: &str,
        otp: &str,
        otp_system: OtpSystem,
    ) -> Result<Value, GatewayError> {
        let scope_tag = match otp_system {
            OtpSystem::Abdm => SCOPE_MOBILE_VERIFY,
            OtpSystem::Aadhaar => SCOPE_AADHAAR_VERIFY,
        };

        self.post_encrypted(LOGIN_VERIFY_PATH, RequestTokens::default(), |key| {
            Ok(AuthRequest {
                scope: vec![SCOPE_LOGIN, scope_tag],
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
}
