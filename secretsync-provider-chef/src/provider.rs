//! The Chef provider factory.

use async_trait::async_trait;
use secretsync_api::secret::SecretSource;
use secretsync_api::store::{SecretKeySelector, SecretStore, StoreKind};
use secretsync_provider::{Capabilities, Provider, ProviderError, SecretsClient};
use secretsync_secret::SecretResolver;
use std::sync::Arc;

use crate::client::ChefClient;
use crate::error::ChefError;
use crate::secrets::{ChefSecretsClient, MapFailurePolicy};
use crate::validate::{self, ValidationError};

/// Provider kind, as it appears in the store's provider block.
pub const KIND: &str = "chef";

/// Serves stores backed by a Chef Infra Server.
///
/// Options set here are handed to every client it builds.
///
/// # Example
///
/// ```
/// use secretsync_provider::ProviderRegistry;
/// use secretsync_provider_chef::{ChefSecretsProvider, MapFailurePolicy};
/// use std::sync::Arc;
///
/// let registry = ProviderRegistry::new().with_provider(Arc::new(
///     ChefSecretsProvider::new().with_map_failure_policy(MapFailurePolicy::Abort),
/// ));
/// assert!(registry.get("chef").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct ChefSecretsProvider {
    map_failure_policy: MapFailurePolicy,
    reachability_check: bool,
    http: Option<reqwest::Client>,
}

impl ChefSecretsProvider {
    /// Provider with default options: failing items are skipped in maps and
    /// `validate` contacts the server.
    pub fn new() -> Self {
        Self {
            map_failure_policy: MapFailurePolicy::default(),
            reachability_check: true,
            http: None,
        }
    }

    /// Per-item failure policy of `get_secret_map`.
    #[must_use]
    pub fn with_map_failure_policy(mut self, policy: MapFailurePolicy) -> Self {
        self.map_failure_policy = policy;
        self
    }

    /// Whether `validate` looks up the store's user on the server.
    #[must_use]
    pub fn with_reachability_check(mut self, enabled: bool) -> Self {
        self.reachability_check = enabled;
        self
    }

    /// HTTP client shared by every Chef client this provider builds.
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }
}

impl Default for ChefSecretsProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Namespace the key secret is read from.
///
/// Cluster stores use the selector's namespace when set; everything else
/// reads from the namespace of the requesting resource.
pub(crate) fn key_namespace<'a>(
    kind: StoreKind,
    selector: &'a SecretKeySelector,
    caller: &'a str,
) -> &'a str {
    match (kind.is_cluster_scoped(), selector.namespace.as_deref()) {
        (true, Some(ns)) => ns,
        _ => caller,
    }
}

#[async_trait]
impl Provider for ChefSecretsProvider {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::ReadOnly
    }

    fn validate_store(&self, store: Option<&SecretStore>) -> Result<(), ProviderError> {
        validate::validate_store(store)
            .map(|_| ())
            .map_err(|e| ChefError::InvalidStore(e).into())
    }

    async fn new_client(
        &self,
        store: &SecretStore,
        resolver: Arc<dyn SecretResolver>,
        namespace: &str,
    ) -> Result<Box<dyn SecretsClient>, ProviderError> {
        let chef = validate::chef_provider(Some(store)).map_err(ChefError::InvalidSpec)?;
        let selector = chef
            .auth
            .as_ref()
            .map(|auth| &auth.secret_ref.secret_key)
            .ok_or(ChefError::InvalidSpec(ValidationError::MissingAuth))?;

        let source = SecretSource::kubernetes(
            key_namespace(store.kind, selector, namespace),
            &selector.name,
            &selector.key,
        );
        tracing::debug!(source = %source, user = %chef.user_name, "fetching chef private key");

        let key = resolver
            .resolve(&source)
            .await
            .map_err(ChefError::FetchAuthSecret)?;
        if key.is_empty() {
            return Err(ChefError::EmptySecretKey.into());
        }

        let mut client = key
            .with_bytes(|pem| ChefClient::new(chef.user_name.as_str(), pem, &chef.server_url))
            .map_err(ChefError::Client)?;
        if let Some(http) = &self.http {
            client = client.with_http_client(http.clone());
        }
        let client = Arc::new(client);

        tracing::debug!(url = %client.base_url(), user = %chef.user_name, "chef client ready");

        Ok(Box::new(
            ChefSecretsClient::new(chef.user_name.as_str(), client.clone(), client)
                .with_map_failure_policy(self.map_failure_policy)
                .with_reachability_check(self.reachability_check),
        ))
    }
}
