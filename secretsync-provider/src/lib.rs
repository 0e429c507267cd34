#![deny(missing_docs)]
//! Provider traits for secretsync.
//!
//! A backend plugs into the operator through two traits:
//!
//! - [`Provider`]: a long-lived factory. Validates store resources and
//!   builds a client for one store.
//! - [`SecretsClient`]: a per-store handle that fetches secrets.
//!
//! The operator assembles the backends it hosts into a [`ProviderRegistry`]
//! at start-up and passes it to its reconcilers. Nothing registers itself.

use async_trait::async_trait;
use secretsync_api::reference::{FindSpec, RemoteRef};
use secretsync_api::store::SecretStore;
use secretsync_secret::SecretResolver;
use std::collections::BTreeMap;
use std::sync::Arc;

mod error;
mod registry;

pub use error::ProviderError;
pub use registry::ProviderRegistry;

/// Map of secret names to raw values, ordered by name.
pub type SecretMap = BTreeMap<String, Vec<u8>>;

/// What a provider can do with its backend.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capabilities {
    /// Fetch only.
    ReadOnly,
    /// Push only.
    WriteOnly,
    /// Fetch and push.
    ReadWrite,
}

/// Outcome of [`SecretsClient::validate`].
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationResult {
    /// The backend was reached and the credentials were accepted.
    Ready,
    /// The client did not check the backend.
    Unknown,
}

/// A secrets backend the operator can host.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Telemetry-safe backend tag. Must match `SecretStoreProvider::kind()`
    /// for the stores this provider serves.
    fn kind(&self) -> &'static str;

    /// What the backend supports.
    fn capabilities(&self) -> Capabilities;

    /// Check a store resource without touching the network.
    fn validate_store(&self, store: Option<&SecretStore>) -> Result<(), ProviderError>;

    /// Build a client for `store`. `resolver` fetches the store's auth
    /// material; `namespace` is the namespace of the requesting resource.
    async fn new_client(
        &self,
        store: &SecretStore,
        resolver: Arc<dyn SecretResolver>,
        namespace: &str,
    ) -> Result<Box<dyn SecretsClient>, ProviderError>;
}

/// A client bound to one store.
#[async_trait]
pub trait SecretsClient: Send + Sync {
    /// Fetch one secret.
    async fn get_secret(&self, remote_ref: &RemoteRef) -> Result<Vec<u8>, ProviderError>;

    /// Fetch several secrets addressed by one key (`dataFrom.extract`).
    async fn get_secret_map(&self, remote_ref: &RemoteRef) -> Result<SecretMap, ProviderError>;

    /// Find secrets matching `find` (`dataFrom.find`).
    async fn get_all_secrets(&self, find: &FindSpec) -> Result<SecretMap, ProviderError>;

    /// Write a secret to the backend.
    async fn push_secret(&self, remote_ref: &RemoteRef, value: &[u8]) -> Result<(), ProviderError>;

    /// Delete a secret from the backend.
    async fn delete_secret(&self, remote_ref: &RemoteRef) -> Result<(), ProviderError>;

    /// Check that the client can reach its backend.
    async fn validate(&self) -> Result<ValidationResult, ProviderError>;

    /// Release resources held by the client.
    async fn close(&self) -> Result<(), ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn traits_are_object_safe_send_sync() {
        _assert_send_sync::<Box<dyn Provider>>();
        _assert_send_sync::<Arc<dyn Provider>>();
        _assert_send_sync::<Box<dyn SecretsClient>>();
    }
}
