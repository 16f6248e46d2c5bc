#![allow(dead_code)]

use base64::{engine::general_purpose, Engine as _};
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use secrecy::Secret;
use sha1::Sha1;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use abdm_gateway::config::{Environment, GatewayCredentials};
use abdm_gateway::endpoints::{PUBLIC_CERTIFICATE_PATH, SESSIONS_PATH};
use abdm_gateway::services::{CredentialRegistry, Dispatcher};

pub const TEST_INTEGRATION_ID: &str = "tenant-ehr-1";
pub const TEST_ACCESS_TOKEN: &str = "gateway-access-token";

/// Mock gateway plus a dispatcher wired to it through the registry.
pub struct TestGateway {
    pub server: MockServer,
    pub registry: Arc<CredentialRegistry>,
    pub dispatcher: Dispatcher,
}

impl TestGateway {
    pub async fn spawn() -> Self {
        // RUST_LOG=abdm_gateway=debug surfaces client traces on failures
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();

        let server = MockServer::start().await;

        let mut credentials = GatewayCredentials::new(
            "test-client",
            Secret::new("test-secret".to_string()),
            Environment::Sandbox,
        );
        credentials.gateway_base_url = server.uri();
        credentials.abha_base_url = server.uri();

        let registry = Arc::new(CredentialRegistry::new());
        registry.put(TEST_INTEGRATION_ID, credentials).await;
        let dispatcher = Dispatcher::new(registry.clone());

        Self {
            server,
            registry,
            dispatcher,
        }
    }

    /// Mount the session endpoint with a long-lived token.
    pub async fn mount_session(&self) {
        self.mount_session_with(1800, None).await;
    }

    pub async fn mount_session_with(&self, expires_in: i64, expected_calls: Option<u64>) {
        let mut mock = Mock::given(method("POST"))
            .and(path(SESSIONS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "accessToken": TEST_ACCESS_TOKEN,
                "expiresIn": expires_in,
                "refreshExpiresIn": expires_in,
                "refreshToken": "gateway-refresh-token",
                "tokenType": "bearer"
            })));
        if let Some(calls) = expected_calls {
            mock = mock.expect(calls);
        }
        mock.mount(&self.server).await;
    }

    /// Mount the certificate endpoint with a freshly generated key pair and
    /// return the private half for decrypting what the client sends.
    pub async fn mount_certificate(&self) -> RsaPrivateKey {
        self.mount_certificate_with(None).await
    }

    pub async fn mount_certificate_with(&self, expected_calls: Option<u64>) -> RsaPrivateKey {
        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, 2048).expect("generate RSA key");
        let public_pem = RsaPublicKey::from(&private_key)
            .to_public_key_pem(LineEnding::LF)
            .expect("encode public key");

        let mut mock = Mock::given(method("GET"))
            .and(path(PUBLIC_CERTIFICATE_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "publicKey": public_pem })),
            );
        if let Some(calls) = expected_calls {
            mock = mock.expect(calls);
        }
        mock.mount(&self.server).await;

        private_key
    }
}

/// Build an unsigned-but-well-formed JWT carrying the given scope claim.
pub fn scoped_token(scope: &str) -> String {
    let header = general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = general_purpose::URL_SAFE_NO_PAD.encode(format!(
        r#"{{"sub":"test-subject","scope":"{scope}","exp":4102444800}}"#
    ));
    format!("{header}.{payload}.test-signature")
}

/// Decrypt a base64 OAEP ciphertext produced by the client under test.
pub fn decrypt_field(private_key: &RsaPrivateKey, ciphertext_b64: &str) -> String {
    let ciphertext = general_purpose::STANDARD
        .decode(ciphertext_b64)
        .expect("ciphertext is valid base64");
    let plaintext = private_key
        .decrypt(Oaep::new::<Sha1>(), &ciphertext)
        .expect("ciphertext decrypts with the mounted key");
    String::from_utf8(plaintext).expect("plaintext is UTF-8")
}

/// JSON body of a received request.
pub fn request_body_json(request: &wiremock::Request) -> serde_json::Value {
    serde_json::from_slice(&request.body).expect("request body is JSON")
}
