//! Login flows against a mock gateway: OTP by mobile with multi-account
//! selection, password login in a single call, biometric verification with
//! an unencrypted pid blob, and hint/OTP-system compatibility.

mod common;

use common::{decrypt_field, request_body_json, scoped_token, TestGateway, TEST_INTEGRATION_ID};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use abdm_gateway::endpoints::{
    LOGIN_OTP_PATH, LOGIN_VERIFY_PATH, LOGIN_VERIFY_USER_PATH, TRANSACTION_TOKEN_HEADER,
};
use abdm_gateway::models::{
    AbhaAccount, BiometricModality, LoginHint, OtpSystem, TokenBundle, TokenScope,
};
use abdm_gateway::services::dispatcher::{
    AccountSelectParams, BiometricVerifyParams, LoginOtpParams, LoginOtpVerifyParams,
    PasswordLoginParams,
};
use abdm_gateway::services::{GatewayError, Operation};

const TEST_TXN_ID: &str = "7c41f3d2-9b1a-4f6e-8c2d-3e5a7b9d1f00";
const TEST_ABHA_NUMBER: &str = "91-7345-1816-0779";

#[tokio::test]
async fn mobile_login_with_account_selection() {
    let gateway = TestGateway::spawn().await;
    gateway.mount_session().await;
    let private_key = gateway.mount_certificate().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_OTP_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "txnId": TEST_TXN_ID,
            "message": "OTP sent to registered mobile"
        })))
        .expect(1)
        .mount(&gateway.server)
        .await;

    let transaction_token = scoped_token("abha-login");
    Mock::given(method("POST"))
        .and(path(LOGIN_VERIFY_PATH))
        .and(body_string_contains(TEST_TXN_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "txnId": TEST_TXN_ID,
            "token": transaction_token.clone(),
            "accounts": [
                { "ABHANumber": TEST_ABHA_NUMBER, "name": "Asha Kumar" },
                { "ABHANumber": "91-1111-2222-3333", "name": "Asha K" }
            ]
        })))
        .expect(1)
        .mount(&gateway.server)
        .await;

    // Selection is authorized by the transaction token from the verify step.
    Mock::given(method("POST"))
        .and(path(LOGIN_VERIFY_USER_PATH))
        .and(header(
            TRANSACTION_TOKEN_HEADER,
            format!("Bearer {transaction_token}").as_str(),
        ))
        .and(body_string_contains(TEST_ABHA_NUMBER))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": scoped_token("abha-login"),
            "expiresIn": 1800,
            "refreshToken": "refresh-token"
        })))
        .expect(1)
        .mount(&gateway.server)
        .await;

    let send_response = gateway
        .dispatcher
        .execute(
            TEST_INTEGRATION_ID,
            Operation::RequestLoginOtp(LoginOtpParams {
                hint: LoginHint::Mobile("9876543210".to_string()),
                otp_system: OtpSystem::Abdm,
            }),
        )
        .await
        .expect("login OTP send succeeds");
    let txn_id = send_response["txnId"].as_str().unwrap().to_string();

    let verify_response = gateway
        .dispatcher
        .execute(
            TEST_INTEGRATION_ID,
            Operation::VerifyLoginOtp(LoginOtpVerifyParams {
                txn_id: txn_id.clone(),
                otp: "654321".to_string(),
                otp_system: OtpSystem::Abdm,
            }),
        )
        .await
        .expect("login OTP verify succeeds");

    let accounts: Vec<AbhaAccount> =
        serde_json::from_value(verify_response["accounts"].clone()).unwrap();
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[0].abha_number, TEST_ABHA_NUMBER);

    let select_response = gateway
        .dispatcher
        .execute(
            TEST_INTEGRATION_ID,
            Operation::SelectLoginAccount(AccountSelectParams {
                txn_id,
                abha_number: TEST_ABHA_NUMBER.to_string(),
                transaction_token: verify_response["token"].as_str().unwrap().to_string(),
            }),
        )
        .await
        .expect("account selection succeeds");

    let token = select_response["token"].as_str().unwrap();
    assert_eq!(TokenScope::from_token(token).unwrap(), TokenScope::Login);

    // the mobile hint went out encrypted
    let requests = gateway.server.received_requests().await.unwrap();
    let otp_request = requests
        .iter()
        .find(|r| r.url.path() == LOGIN_OTP_PATH)
        .unwrap();
    let body = request_body_json(otp_request);
    assert_eq!(
        decrypt_field(&private_key, body["loginId"].as_str().unwrap()),
        "9876543210"
    );
    assert_eq!(body["loginHint"], "mobile");
}

#[tokio::test]
async fn password_login_is_a_single_call() {
    let gateway = TestGateway::spawn().await;
    gateway.mount_session().await;
    let private_key = gateway.mount_certificate().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_VERIFY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": scoped_token("abha-login"),
            "expiresIn": 1800,
            "refreshToken": "refresh-token"
        })))
        .expect(1)
        .mount(&gateway.server)
        .await;

    let response = gateway
        .dispatcher
        .execute(
            TEST_INTEGRATION_ID,
            Operation::VerifyPassword(PasswordLoginParams {
                abha_number: "91734518160779".to_string(),
                password: "S3cret!pass".to_string(),
            }),
        )
        .await
        .expect("password login succeeds");

    // the response parses as a token bundle, and its token is login-scoped
    let bundle: TokenBundle = serde_json::from_value(response.clone()).unwrap();
    assert_eq!(bundle.scope().unwrap(), TokenScope::Login);
    assert_eq!(bundle.expires_in, Some(1800));

    let requests = gateway.server.received_requests().await.unwrap();
    let verify_request = requests
        .iter()
        .find(|r| r.url.path() == LOGIN_VERIFY_PATH)
        .unwrap();
    let body = request_body_json(verify_request);
    let password_block = &body["authData"]["password"];
    // both credential fields are encrypted, and the bare ABHA number was
    // normalized to its dashed form before encryption
    assert_eq!(
        decrypt_field(&private_key, password_block["ABHANumber"].as_str().unwrap()),
        TEST_ABHA_NUMBER
    );
    assert_eq!(
        decrypt_field(&private_key, password_block["password"].as_str().unwrap()),
        "S3cret!pass"
    );
}

#[tokio::test]
async fn biometric_verify_submits_the_pid_unencrypted() {
    let gateway = TestGateway::spawn().await;
    gateway.mount_session().await;
    // no certificate mock: the biometric path must not touch the key cache

    let pid = "<Pid ts=\"2026-08-06T10:00:00\" ver=\"2.0\">capture-blob</Pid>";
    Mock::given(method("POST"))
        .and(path(LOGIN_VERIFY_PATH))
        .and(body_string_contains("capture-blob"))
        .and(body_string_contains(TEST_TXN_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": scoped_token("abha-login"),
            "expiresIn": 1800
        })))
        .expect(1)
        .mount(&gateway.server)
        .await;

    let response = gateway
        .dispatcher
        .execute(
            TEST_INTEGRATION_ID,
            Operation::VerifyBiometric(BiometricVerifyParams {
                txn_id: TEST_TXN_ID.to_string(),
                modality: BiometricModality::Fingerprint,
                pid: pid.to_string(),
            }),
        )
        .await
        .expect("biometric verify succeeds");
    assert!(response["token"].as_str().is_some());

    let requests = gateway.server.received_requests().await.unwrap();
    let verify_request = requests
        .iter()
        .find(|r| r.url.path() == LOGIN_VERIFY_PATH)
        .unwrap();
    let body = request_body_json(verify_request);
    assert_eq!(body["authData"]["bio"]["bioType"], "FMR");
    assert_eq!(body["authData"]["bio"]["pid"], pid);
}

#[tokio::test]
async fn aadhaar_otp_system_requires_an_abha_number_hint() {
    let gateway = TestGateway::spawn().await;
    gateway.mount_session().await;

    let err = gateway
        .dispatcher
        .execute(
            TEST_INTEGRATION_ID,
            Operation::RequestLoginOtp(LoginOtpParams {
                hint: LoginHint::Mobile("9876543210".to_string()),
                otp_system: OtpSystem::Aadhaar,
            }),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Validation(_)), "got {err:?}");

    let requests = gateway.server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() != LOGIN_OTP_PATH));
}
