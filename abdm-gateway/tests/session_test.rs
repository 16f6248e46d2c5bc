//! Access-token lifecycle against a mock gateway: caching inside the expiry
//! buffer, refresh after expiry, single-flight refresh under concurrency,
//! and distinct surfacing of auth failures and timeouts.

mod common;

use common::{TestGateway, TEST_INTEGRATION_ID};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use abdm_gateway::endpoints::{PROFILE_PATH, SESSIONS_PATH};
use abdm_gateway::services::dispatcher::ProfileTokenParams;
use abdm_gateway::services::{GatewayClient, GatewayError, Operation};

async fn mount_profile(gateway: &TestGateway) {
    Mock::given(method("GET"))
        .and(path(PROFILE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ABHANumber": "91-7345-1816-0779",
            "firstName": "Asha"
        })))
        .mount(&gateway.server)
        .await;
}

fn get_profile_op() -> Operation {
    Operation::GetProfile(ProfileTokenParams {
        auth_token: common::scoped_token("abha-login"),
    })
}

#[tokio::test]
async fn access_token_is_cached_inside_the_buffer() {
    let gateway = TestGateway::spawn().await;
    // exactly one exchange for two operations
    gateway.mount_session_with(1800, Some(1)).await;
    mount_profile(&gateway).await;

    for _ in 0..2 {
        gateway
            .dispatcher
            .execute(TEST_INTEGRATION_ID, get_profile_op())
            .await
            .expect("profile fetch succeeds");
    }
}

#[tokio::test]
async fn short_lived_token_is_refreshed_per_call() {
    let gateway = TestGateway::spawn().await;
    // 120s lifetime sits inside the 5-minute buffer, so every call refreshes
    gateway.mount_session_with(120, Some(2)).await;
    mount_profile(&gateway).await;

    for _ in 0..2 {
        gateway
            .dispatcher
            .execute(TEST_INTEGRATION_ID, get_profile_op())
            .await
            .expect("profile fetch succeeds");
    }
}

#[tokio::test]
async fn concurrent_callers_share_one_refresh() {
    let gateway = TestGateway::spawn().await;
    gateway.mount_session_with(1800, Some(1)).await;
    mount_profile(&gateway).await;

    let (first, second) = tokio::join!(
        gateway
            .dispatcher
            .execute(TEST_INTEGRATION_ID, get_profile_op()),
        gateway
            .dispatcher
            .execute(TEST_INTEGRATION_ID, get_profile_op()),
    );
    first.expect("first caller succeeds");
    second.expect("second caller succeeds");
}

#[tokio::test]
async fn failed_exchange_surfaces_as_auth_error() {
    let gateway = TestGateway::spawn().await;
    Mock::given(method("POST"))
        .and(path(SESSIONS_PATH))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({ "error": "invalid client credentials" })),
        )
        .expect(1)
        .mount(&gateway.server)
        .await;

    let err = gateway
        .dispatcher
        .execute(TEST_INTEGRATION_ID, get_profile_op())
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::AuthFailed(_)), "got {err:?}");
}

#[tokio::test]
async fn unconfigured_integration_is_rejected() {
    let gateway = TestGateway::spawn().await;
    gateway.mount_session().await;

    let err = gateway
        .dispatcher
        .execute("unknown-tenant", get_profile_op())
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::ConfigNotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn slow_gateway_surfaces_as_timeout() {
    let gateway = TestGateway::spawn().await;
    Mock::given(method("POST"))
        .and(path(SESSIONS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(2))
                .set_body_json(serde_json::json!({
                    "accessToken": "late",
                    "expiresIn": 1800
                })),
        )
        .mount(&gateway.server)
        .await;

    let entry = gateway.registry.get(TEST_INTEGRATION_ID).await.unwrap();
    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let client = GatewayClient::new(http, entry);

    let err = client.ensure_access_token().await.unwrap_err();
    assert!(matches!(err, GatewayError::Timeout(_)), "got {err:?}");
}
