//! The store resource: how to connect to one secrets backend.

use serde::{Deserialize, Serialize};

/// Whether a store is namespaced or cluster-wide.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreKind {
    /// A `SecretStore`, usable only from its own namespace.
    #[default]
    SecretStore,
    /// A `ClusterSecretStore`, usable from any namespace.
    ClusterSecretStore,
}

impl StoreKind {
    /// Returns true for cluster-scoped stores.
    pub fn is_cluster_scoped(&self) -> bool {
        matches!(self, StoreKind::ClusterSecretStore)
    }
}

/// Object metadata carried by a store resource.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Resource name.
    #[serde(default)]
    pub name: String,
    /// Namespace of a namespaced store. `None` for cluster stores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl ObjectMeta {
    /// Metadata for a resource with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
        }
    }

    /// Set the namespace.
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

/// A store resource as read from the cluster.
///
/// `spec` is optional so a half-written resource can still be loaded and
/// rejected with a precise reason.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretStore {
    /// Namespaced or cluster-wide.
    #[serde(default)]
    pub kind: StoreKind,
    /// Resource metadata.
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// The store spec.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<SecretStoreSpec>,
}

impl SecretStore {
    /// A store of the given kind with the given spec.
    pub fn new(kind: StoreKind, spec: Option<SecretStoreSpec>) -> Self {
        Self {
            kind,
            metadata: ObjectMeta::default(),
            spec,
        }
    }

    /// Set the metadata.
    pub fn with_metadata(mut self, metadata: ObjectMeta) -> Self {
        self.metadata = metadata;
        self
    }

    /// Parse a store from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The provider block, if both the spec and the block are present.
    pub fn provider(&self) -> Option<&SecretStoreProvider> {
        self.spec.as_ref()?.provider.as_ref()
    }
}

/// The spec of a store resource.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretStoreSpec {
    /// Which backend this store talks to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<SecretStoreProvider>,
}

impl SecretStoreSpec {
    /// A spec with the given provider block.
    pub fn new(provider: Option<SecretStoreProvider>) -> Self {
        Self { provider }
    }
}

/// Provider block of a store. Exactly one backend entry is expected to be set.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretStoreProvider {
    /// Chef Infra Server backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chef: Option<ChefProvider>,
}

impl SecretStoreProvider {
    /// A provider block selecting the Chef backend.
    pub fn chef(chef: Option<ChefProvider>) -> Self {
        Self { chef }
    }

    /// Telemetry-safe tag of the configured backend, if any.
    pub fn kind(&self) -> Option<&'static str> {
        if self.chef.is_some() {
            return Some("chef");
        }
        None
    }
}

/// Connection settings for a Chef Infra Server.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChefProvider {
    /// The client or user name the private key belongs to.
    #[serde(default, rename = "username", alias = "userName", alias = "name")]
    pub user_name: String,
    /// Server URL, including the organization path, terminated by `/`.
    /// e.g. `https://chef.example.com/organizations/myorg/`
    #[serde(default, rename = "serverUrl", alias = "baseUrl")]
    pub server_url: String,
    /// Authentication material.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<ChefAuth>,
}

impl ChefProvider {
    /// Settings with the given principal, URL and auth block.
    pub fn new(
        user_name: impl Into<String>,
        server_url: impl Into<String>,
        auth: Option<ChefAuth>,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            server_url: server_url.into(),
            auth,
        }
    }
}

/// Authentication block for a Chef store.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChefAuth {
    /// Where the private key lives.
    #[serde(default)]
    pub secret_ref: ChefAuthSecretRef,
}

impl ChefAuth {
    /// Auth block pointing at the given key selector.
    pub fn from_selector(secret_key: SecretKeySelector) -> Self {
        Self {
            secret_ref: ChefAuthSecretRef { secret_key },
        }
    }
}

/// Reference to the Kubernetes secret holding the PEM private key.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChefAuthSecretRef {
    /// Selector of the private key.
    #[serde(
        default,
        rename = "privateKeySecretRef",
        alias = "secretKey",
        alias = "publickey"
    )]
    pub secret_key: SecretKeySelector,
}

/// Selects one key of one Kubernetes secret.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKeySelector {
    /// Secret resource name.
    #[serde(default)]
    pub name: String,
    /// Key within the secret's data map.
    #[serde(default)]
    pub key: String,
    /// Namespace of the secret. Only allowed on cluster-scoped stores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl SecretKeySelector {
    /// Selector for `key` in secret `name`, in the caller's namespace.
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            namespace: None,
        }
    }

    /// Pin the selector to an explicit namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}
