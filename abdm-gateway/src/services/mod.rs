//! Services layer for the ABDM gateway client.
//!
//! Credential registry, session and public-key caches, the payload
//! encryptor, the flow engine, and the operation dispatcher.

pub mod certificate;
pub mod crypto;
pub mod dispatcher;
pub mod error;
pub mod flows;
pub mod registry;
pub mod session;
pub mod store;

pub use dispatcher::{Dispatcher, Operation};
pub use error::GatewayError;
pub use flows::GatewayClient;
pub use registry::{ClientEntry, CredentialRegistry};
pub use store::{MockProfileStore, ProfileStore};
