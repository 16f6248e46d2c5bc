//! Gateway-mandated paths, headers, and protocol constants.
//!
//! Paths and the scope/loginHint/otpSystem vocabulary are fixed by the ABDM
//! gateway contract. Several values (notably the login hints and otp systems)
//! were confirmed against sandbox behaviour; treat them as vendor constants
//! and verify against gateway documentation before changing any of them.

/// Client-credentials session exchange, relative to the gateway base URL.
pub const SESSIONS_PATH: &str = "/gateway/v3/sessions";

/// Current RSA public certificate, relative to the ABHA base URL.
pub const PUBLIC_CERTIFICATE_PATH: &str = "/profile/public/certificate";

// Enrollment family
pub const ENROLLMENT_OTP_PATH: &str = "/enrollment/request/otp";
pub const ENROL_BY_AADHAAR_PATH: &str = "/enrollment/enrol/byAadhaar";
pub const ENROLLMENT_AUTH_PATH: &str = "/enrollment/auth/byAbdm";
pub const ADDRESS_SUGGESTION_PATH: &str = "/enrollment/enrol/suggestion";
pub const SET_ABHA_ADDRESS_PATH: &str = "/enrollment/enrol/abha-address";

// Login family
pub const LOGIN_OTP_PATH: &str = "/profile/login/request/otp";
pub const LOGIN_VERIFY_PATH: &str = "/profile/login/verify";
pub const LOGIN_VERIFY_USER_PATH: &str = "/profile/login/verify/user";

// PHR search
pub const SEARCH_PATH: &str = "/phr/web/login/abha/search";

// Profile family (auth-token scoped)
pub const PROFILE_PATH: &str = "/profile/account";
pub const ABHA_CARD_PATH: &str = "/profile/account/abha-card";
pub const QR_CODE_PATH: &str = "/profile/account/qrCode";
pub const EMAIL_VERIFICATION_PATH: &str = "/profile/account/request/emailVerificationLink";

// Request headers. The auth token travels under X-Token, distinct from the
// bearer access token; T-Token carries the enrollment transaction token.
pub const REQUEST_ID_HEADER: &str = "REQUEST-ID";
pub const TIMESTAMP_HEADER: &str = "TIMESTAMP";
pub const CM_ID_HEADER: &str = "X-CM-ID";
pub const AUTH_TOKEN_HEADER: &str = "X-Token";
pub const TRANSACTION_TOKEN_HEADER: &str = "T-Token";
pub const TXN_ID_HEADER: &str = "TXN-ID";

// Scope vocabulary
pub const SCOPE_ENROL: &str = "abha-enrol";
pub const SCOPE_LOGIN: &str = "abha-login";
pub const SCOPE_MOBILE_VERIFY: &str = "mobile-verify";
pub const SCOPE_AADHAAR_VERIFY: &str = "aadhaar-verify";
pub const SCOPE_PASSWORD_VERIFY: &str = "password-verify";
pub const SCOPE_BIO_VERIFY: &str = "bio-verify";
pub const SCOPE_EMAIL_VERIFY: &str = "email-verify";

// Login hints. "mobile" was settled after the gateway rejected the older
// "mobile-number" value in sandbox; do not re-derive these.
pub const LOGIN_HINT_AADHAAR: &str = "aadhaar";
pub const LOGIN_HINT_MOBILE: &str = "mobile";
pub const LOGIN_HINT_ABHA_NUMBER: &str = "abha-number";
pub const LOGIN_HINT_ABHA_ADDRESS: &str = "abha-address";
pub const LOGIN_HINT_INDEX: &str = "index";
pub const LOGIN_HINT_EMAIL: &str = "email";

// OTP delivery systems: the gateway's own channel vs the national ID system.
pub const OTP_SYSTEM_ABDM: &str = "abdm";
pub const OTP_SYSTEM_AADHAAR: &str = "aadhaar";

// Enrollment consent artefact
pub const CONSENT_CODE_ENROLLMENT: &str = "abha-enrollment";
pub const CONSENT_VERSION: &str = "1.4";

// Auth methods accepted in verify payloads
pub const AUTH_METHOD_OTP: &str = "otp";
pub const AUTH_METHOD_PASSWORD: &str = "password";
pub const AUTH_METHOD_BIO: &str = "bio";
