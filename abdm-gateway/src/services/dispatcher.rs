//! Operation dispatcher.
//!
//! The public entry point for the service layer. Operations form a closed
//! enum, each variant carrying its own typed parameter struct, dispatched by
//! exhaustive match — an unknown operation cannot exist at runtime.
//! Parameters are validated before any network call; the dispatcher is the
//! sole place that triggers lazy session initialization.

use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use validator::{Validate, ValidationError};

use crate::models::{BiometricModality, LoginHint, OtpSystem, SearchCriterion};
use crate::services::error::GatewayError;
use crate::services::flows::{GatewayClient, GATEWAY_TIMEOUT_SECS};
use crate::services::registry::CredentialRegistry;

fn digits_only(value: &str) -> Result<(), ValidationError> {
    if value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("digits_only"))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct EnrollmentOtpParams {
    #[validate(length(equal = 12), custom(function = "digits_only"))]
    pub aadhaar: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EnrollmentVerifyParams {
    #[validate(length(min = 1))]
    pub txn_id: String,
    #[validate(length(equal = 6), custom(function = "digits_only"))]
    pub otp: String,
    #[validate(length(equal = 10), custom(function = "digits_only"))]
    pub mobile: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MobileUpdateOtpParams {
    #[validate(length(min = 1))]
    pub txn_id: String,
    #[validate(length(equal = 10), custom(function = "digits_only"))]
    pub mobile: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MobileUpdateVerifyParams {
    #[validate(length(min = 1))]
    pub txn_id: String,
    #[validate(length(equal = 6), custom(function = "digits_only"))]
    pub otp: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TransactionParams {
    #[validate(length(min = 1))]
    pub txn_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetAddressParams {
    #[validate(length(min = 1))]
    pub txn_id: String,
    #[validate(length(min = 3))]
    pub abha_address: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginOtpParams {
    pub hint: LoginHint,
    pub otp_system: OtpSystem,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginOtpVerifyParams {
    #[validate(length(min = 1))]
    pub txn_id: String,
    #[validate(length(equal = 6), custom(function = "digits_only"))]
    pub otp: String,
    pub otp_system: OtpSystem,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AccountSelectParams {
    #[validate(length(min = 1))]
    pub txn_id: String,
    #[validate(length(min = 14))]
    pub abha_number: String,
    #[validate(length(min = 1))]
    pub transaction_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordLoginParams {
    #[validate(length(min = 14))]
    pub abha_number: String,
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BiometricVerifyParams {
    #[validate(length(min = 1))]
    pub txn_id: String,
    pub modality: BiometricModality,
    #[validate(length(min = 1))]
    pub pid: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub criterion: SearchCriterion,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchOtpParams {
    #[validate(length(min = 1))]
    pub txn_id: String,
    pub index: u32,
    pub otp_system: OtpSystem,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchOtpVerifyParams {
    #[validate(length(min = 1))]
    pub txn_id: String,
    #[validate(length(equal = 6), custom(function = "digits_only"))]
    pub otp: String,
    pub otp_system: OtpSystem,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProfileTokenParams {
    #[validate(length(min = 1))]
    pub auth_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PhotoUpdateParams {
    #[validate(length(min = 1))]
    pub auth_token: String,
    #[validate(length(min = 1))]
    pub photo_base64: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EmailVerificationParams {
    #[validate(length(min = 1))]
    pub auth_token: String,
    #[validate(email)]
    pub email: String,
}

/// The closed set of gateway operations.
#[derive(Debug, Deserialize)]
#[serde(tag = "operation", content = "params", rename_all = "kebab-case")]
pub enum Operation {
    RequestEnrollmentOtp(EnrollmentOtpParams),
    VerifyEnrollmentOtp(EnrollmentVerifyParams),
    RequestMobileUpdateOtp(MobileUpdateOtpParams),
    VerifyMobileUpdateOtp(MobileUpdateVerifyParams),
    FetchAddressSuggestions(TransactionParams),
    SetAbhaAddress(SetAddressParams),
    RequestLoginOtp(LoginOtpParams),
    VerifyLoginOtp(LoginOtpVerifyParams),
    SelectLoginAccount(AccountSelectParams),
    VerifyPassword(PasswordLoginParams),
    VerifyBiometric(BiometricVerifyParams),
    SearchPhr(SearchParams),
    RequestSearchOtp(SearchOtpParams),
    VerifySearchOtp(SearchOtpVerifyParams),
    GetProfile(ProfileTokenParams),
    DownloadCard(ProfileTokenParams),
    GetQrCode(ProfileTokenParams),
    UpdateProfilePhoto(PhotoUpdateParams),
    SendEmailVerification(EmailVerificationParams),
}

impl Operation {
    /// Stable operation name for logging and transaction audit records.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::RequestEnrollmentOtp(_) => "request-enrollment-otp",
            Operation::VerifyEnrollmentOtp(_) => "verify-enrollment-otp",
            Operation::RequestMobileUpdateOtp(_) => "request-mobile-update-otp",
            Operation::VerifyMobileUpdateOtp(_) => "verify-mobile-update-otp",
            Operation::FetchAddressSuggestions(_) => "fetch-address-suggestions",
            Operation::SetAbhaAddress(_) => "set-abha-address",
            Operation::RequestLoginOtp(_) => "request-login-otp",
            Operation::VerifyLoginOtp(_) => "verify-login-otp",
            Operation::SelectLoginAccount(_) => "select-login-account",
            Operation::VerifyPassword(_) => "verify-password",
            Operation::VerifyBiometric(_) => "verify-biometric",
            Operation::SearchPhr(_) => "search-phr",
            Operation::RequestSearchOtp(_) => "request-search-otp",
            Operation::VerifySearchOtp(_) => "verify-search-otp",
            Operation::GetProfile(_) => "get-profile",
            Operation::DownloadCard(_) => "download-card",
            Operation::GetQrCode(_) => "get-qr-code",
            Operation::UpdateProfilePhoto(_) => "update-profile-photo",
            Operation::SendEmailVerification(_) => "send-email-verification",
        }
    }

    /// Validate parameters before any network call.
    fn validate_params(&self) -> Result<(), GatewayError> {
        match self {
            Operation::RequestEnrollmentOtp(p) => p.validate()?,
            Operation::VerifyEnrollmentOtp(p) => p.validate()?,
            Operation::RequestMobileUpdateOtp(p) => p.validate()?,
            Operation::VerifyMobileUpdateOtp(p) => p.validate()?,
            Operation::FetchAddressSuggestions(p) => p.validate()?,
            Operation::SetAbhaAddress(p) => p.validate()?,
            Operation::RequestLoginOtp(p) => validate_login_hint(&p.hint)?,
            Operation::VerifyLoginOtp(p) => p.validate()?,
            Operation::SelectLoginAccount(p) => p.validate()?,
            Operation::VerifyPassword(p) => p.validate()?,
            Operation::VerifyBiometric(p) => p.validate()?,
            // Checked here as well as in the flow so the rejection lands
            // before the lazy session exchange.
            Operation::SearchPhr(p) => validate_search_criterion(&p.criterion)?,
            Operation::RequestSearchOtp(p) => p.validate()?,
            Operation::VerifySearchOtp(p) => p.validate()?,
            Operation::GetProfile(p) => p.validate()?,
            Operation::DownloadCard(p) => p.validate()?,
            Operation::GetQrCode(p) => p.validate()?,
            Operation::UpdateProfilePhoto(p) => p.validate()?,
            Operation::SendEmailVerification(p) => p.validate()?,
        }
        Ok(())
    }
}

fn validate_search_criterion(criterion: &SearchCriterion) -> Result<(), GatewayError> {
    match criterion {
        SearchCriterion::Mobile(_) => Err(GatewayError::UnsupportedOperation(
            "mobile-number search is not supported by the gateway; \
             search by ABHA number or ABHA address instead"
                .to_string(),
        )),
        SearchCriterion::Aadhaar(_) => Err(GatewayError::UnsupportedOperation(
            "Aadhaar search is not supported by the gateway; \
             search by ABHA number or ABHA address instead"
                .to_string(),
        )),
        SearchCriterion::AbhaNumber(_) | SearchCriterion::AbhaAddress(_) => Ok(()),
    }
}

fn validate_login_hint(hint: &LoginHint) -> Result<(), GatewayError> {
    match hint {
        LoginHint::AbhaNumber(number) => {
            let digits: String = number.chars().filter(char::is_ascii_digit).collect();
            let well_formed =
                number.chars().all(|c| c.is_ascii_digit() || c == '-') && digits.len() == 14;
            if !well_formed {
                return Err(GatewayError::Validation(
                    "ABHA number must be 14 digits".to_string(),
                ));
            }
        }
        LoginHint::Mobile(mobile) => {
            if mobile.len() != 10 || !mobile.chars().all(|c| c.is_ascii_digit()) {
                return Err(GatewayError::Validation(
                    "mobile number must be 10 digits".to_string(),
                ));
            }
        }
        LoginHint::AbhaAddress(address) => {
            if address.trim().is_empty() {
                return Err(GatewayError::Validation(
                    "ABHA address must not be empty".to_string(),
                ));
            }
        }
    }
    Ok(())
}

/// Maps operations onto the flow engine, guaranteeing credentials are
/// resolved and the session is initialized before any flow runs.
pub struct Dispatcher {
    registry: Arc<CredentialRegistry>,
    http: reqwest::Client,
}

impl Dispatcher {
    pub fn new(registry: Arc<CredentialRegistry>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(GATEWAY_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");
        Self { registry, http }
    }

    /// Execute one operation for an integration, returning the raw gateway
    /// payload. Persistence of profiles/tokens is the caller's concern.
    #[tracing::instrument(skip(self, operation), fields(operation = operation.name()))]
    pub async fn execute(
        &self,
        integration_id: &str,
        operation: Operation,
    ) -> Result<Value, GatewayError> {
        operation.validate_params()?;

        let entry = self.registry.get(integration_id).await?;
        let client = GatewayClient::new(self.http.clone(), entry);

        // Sole lazy-initialization point: the session fills on first use.
        client.ensure_access_token().await?;

        tracing::debug!(integration_id, "dispatching gateway operation");

        match operation {
            Operation::RequestEnrollmentOtp(p) => client.request_enrollment_otp(&p.aadhaar).await,
            Operation::VerifyEnrollmentOtp(p) => {
                client.enrol_by_aadhaar(&p.txn_id, &p.otp, &p.mobile).await
            }
            Operation::RequestMobileUpdateOtp(p) => {
                client.request_mobile_update_otp(&p.txn_id, &p.mobile).await
            }
            Operation::VerifyMobileUpdateOtp(p) => {
                client.verify_mobile_update_otp(&p.txn_id, &p.otp).await
            }
            Operation::FetchAddressSuggestions(p) => {
                client.fetch_address_suggestions(&p.txn_id).await
            }
            Operation::SetAbhaAddress(p) => {
                client.set_abha_address(&p.txn_id, &p.abha_address).await
            }
            Operation::RequestLoginOtp(p) => {
                client.request_login_otp(&p.hint, p.otp_system).await
            }
            Operation::VerifyLoginOtp(p) => {
                client.verify_login_otp(&p.txn_id, &p.otp, p.otp_system).await
            }
            Operation::SelectLoginAccount(p) => {
                client
                    .select_login_account(&p.txn_id, &p.abha_number, &p.transaction_token)
                    .await
            }
            Operation::VerifyPassword(p) => {
                client.verify_password(&p.abha_number, &p.password).await
            }
            Operation::VerifyBiometric(p) => {
                client.verify_biometric(&p.txn_id, p.modality, &p.pid).await
            }
            Operation::SearchPhr(p) => client.search_phr(&p.criterion).await,
            Operation::RequestSearchOtp(p) => {
                client
                    .request_search_otp(&p.txn_id, p.index, p.otp_system)
                    .await
            }
            Operation::VerifySearchOtp(p) => {
                client.verify_search_otp(&p.txn_id, &p.otp, p.otp_system).await
            }
            Operation::GetProfile(p) => client.get_profile(&p.auth_token).await,
            Operation::DownloadCard(p) => client.download_card(&p.auth_token).await,
            Operation::GetQrCode(p) => client.get_qr_code(&p.auth_token).await,
            Operation::UpdateProfilePhoto(p) => {
                client
                    .update_profile_photo(&p.auth_token, &p.photo_base64)
                    .await
            }
            Operation::SendEmailVerification(p) => {
                client.send_email_verification(&p.auth_token, &p.email).await
            }
        }
    }
}
