//! Explicit provider registry.

use crate::{Provider, ProviderError};
use secretsync_api::store::SecretStore;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Maps backend tags to providers.
///
/// Built by the operator at start-up and handed to whatever needs to pick a
/// provider for a store. Registering a second provider for the same tag
/// replaces the first.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<&'static str, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own [`Provider::kind`].
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.add(provider);
        self
    }

    /// Register a provider under its own [`Provider::kind`].
    pub fn add(&mut self, provider: Arc<dyn Provider>) {
        let kind = provider.kind();
        if self.providers.insert(kind, provider).is_some() {
            tracing::warn!(kind, "replacing registered provider");
        }
    }

    /// Look up a provider by tag.
    pub fn get(&self, kind: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(kind).cloned()
    }

    /// Registered tags, in order.
    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.providers.keys().copied()
    }

    /// Pick the provider for a store by looking at which provider block is set.
    pub fn for_store(&self, store: &SecretStore) -> Result<Arc<dyn Provider>, ProviderError> {
        let kind = store
            .provider()
            .and_then(|p| p.kind())
            .ok_or_else(|| ProviderError::InvalidStore("missing provider".into()))?;
        self.get(kind)
            .ok_or_else(|| ProviderError::NotSupported(format!("no provider registered for {kind}")))
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("kinds", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}
