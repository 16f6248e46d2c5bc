//! ABDM health-identity gateway client.
//!
//! Embedded by the EHR integration layer to enroll and authenticate
//! individuals against the national digital-health-identity gateway:
//! session/access-token management, public-key caching, RSA-OAEP payload
//! encryption for PII, and the multi-step OTP/password/biometric flows,
//! all behind a closed operation dispatcher.
//!
//! The crate is transport-only: it returns raw gateway payloads and leaves
//! persistence to the service layer via the [`services::ProfileStore`]
//! contract.

pub mod config;
pub mod dtos;
pub mod endpoints;
pub mod models;
pub mod services;
pub mod utils;

pub use config::{Environment, GatewayCredentials};
pub use services::{
    CredentialRegistry, Dispatcher, GatewayClient, GatewayError, Operation,
};
