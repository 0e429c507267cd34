//! Per-store secrets client.

use async_trait::async_trait;
use secretsync_api::reference::{FindSpec, RemoteRef};
use secretsync_provider::{ProviderError, SecretMap, SecretsClient, ValidationResult};
use std::sync::Arc;

use crate::error::ChefError;
use crate::key::{DataBagKey, lookup, property_bytes};
use crate::service::{DataBagService, PrincipalService};

/// What `get_secret_map` does when one item of the bag cannot be fetched.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MapFailurePolicy {
    /// Log a warning and leave the item out of the map.
    #[default]
    Skip,
    /// Fail the whole call.
    Abort,
}

/// Reads data bag items for one store.
///
/// A default-constructed client has no backend and fails every call with
/// [`ChefError::Uninitialized`].
pub struct ChefSecretsClient {
    user_name: String,
    data_bags: Option<Arc<dyn DataBagService>>,
    principals: Option<Arc<dyn PrincipalService>>,
    map_failure_policy: MapFailurePolicy,
    reachability_check: bool,
}

impl ChefSecretsClient {
    /// Client acting as `user_name` against the given services.
    pub fn new(
        user_name: impl Into<String>,
        data_bags: Arc<dyn DataBagService>,
        principals: Arc<dyn PrincipalService>,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            data_bags: Some(data_bags),
            principals: Some(principals),
            ..Self::default()
        }
    }

    /// Set the per-item failure policy of `get_secret_map`.
    #[must_use]
    pub fn with_map_failure_policy(mut self, policy: MapFailurePolicy) -> Self {
        self.map_failure_policy = policy;
        self
    }

    /// Enable or disable the principal lookup done by `validate`.
    #[must_use]
    pub fn with_reachability_check(mut self, enabled: bool) -> Self {
        self.reachability_check = enabled;
        self
    }

    fn data_bags(&self) -> Result<&dyn DataBagService, ChefError> {
        self.data_bags.as_deref().ok_or(ChefError::Uninitialized)
    }

    async fn item(&self, key: &DataBagKey, property: &str) -> Result<Vec<u8>, ChefError> {
        let item = self
            .data_bags()?
            .get_item(&key.bag, &key.item)
            .await
            .map_err(|e| {
                tracing::debug!(key = %key, error = %e, "data bag item fetch failed");
                ChefError::ItemNotFound
            })?;

        if property.is_empty() {
            return serde_json::to_vec(&item).map_err(ChefError::Json);
        }
        let value = lookup(&item, property)
            .ok_or_else(|| ChefError::PropertyNotFound(property.to_string()))?;
        property_bytes(value)
    }

    async fn secret(&self, remote_ref: &RemoteRef) -> Result<Vec<u8>, ChefError> {
        self.data_bags()?;
        let key: DataBagKey = remote_ref.key.parse()?;
        self.item(&key, &remote_ref.property).await
    }

    async fn secret_map(&self, remote_ref: &RemoteRef) -> Result<SecretMap, ChefError> {
        let data_bags = self.data_bags()?;
        let bag = remote_ref.key.as_str();
        if bag.is_empty() {
            return Err(ChefError::InvalidFormat);
        }

        let names = data_bags.list_items(bag).await.map_err(|e| {
            tracing::debug!(bag = %bag, error = %e, "data bag listing failed");
            ChefError::ItemNotFound
        })?;

        let mut map = SecretMap::new();
        for name in names {
            let key = DataBagKey {
                bag: bag.to_string(),
                item: name,
            };
            match self.item(&key, "").await {
                Ok(bytes) => {
                    map.insert(key.item, bytes);
                }
                Err(e) if self.map_failure_policy == MapFailurePolicy::Skip => {
                    tracing::warn!(key = %key, error = %e, "skipping data bag item");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(map)
    }

    async fn check(&self) -> Result<ValidationResult, ChefError> {
        let principals = self.principals.as_deref().ok_or(ChefError::Uninitialized)?;
        if !self.reachability_check {
            return Ok(ValidationResult::Unknown);
        }
        principals
            .get_principal(&self.user_name)
            .await
            .map_err(|source| ChefError::UserValidation {
                user: self.user_name.clone(),
                source,
            })?;
        tracing::debug!(user = %self.user_name, "chef principal validated");
        Ok(ValidationResult::Ready)
    }
}

impl Default for ChefSecretsClient {
    fn default() -> Self {
        Self {
            user_name: String::new(),
            data_bags: None,
            principals: None,
            map_failure_policy: MapFailurePolicy::default(),
            reachability_check: true,
        }
    }
}

impl std::fmt::Debug for ChefSecretsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChefSecretsClient")
            .field("user_name", &self.user_name)
            .field("initialized", &self.data_bags.is_some())
            .field("map_failure_policy", &self.map_failure_policy)
            .field("reachability_check", &self.reachability_check)
            .finish()
    }
}

#[async_trait]
impl SecretsClient for ChefSecretsClient {
    async fn get_secret(&self, remote_ref: &RemoteRef) -> Result<Vec<u8>, ProviderError> {
        Ok(self.secret(remote_ref).await?)
    }

    async fn get_secret_map(&self, remote_ref: &RemoteRef) -> Result<SecretMap, ProviderError> {
        Ok(self.secret_map(remote_ref).await?)
    }

    async fn get_all_secrets(&self, _find: &FindSpec) -> Result<SecretMap, ProviderError> {
        Err(ChefError::FindNotSupported.into())
    }

    async fn push_secret(&self, _remote_ref: &RemoteRef, _value: &[u8]) -> Result<(), ProviderError> {
        Err(ChefError::NotImplemented.into())
    }

    async fn delete_secret(&self, _remote_ref: &RemoteRef) -> Result<(), ProviderError> {
        Err(ChefError::NotImplemented.into())
    }

    async fn validate(&self) -> Result<ValidationResult, ProviderError> {
        Ok(self.check().await?)
    }

    async fn close(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
