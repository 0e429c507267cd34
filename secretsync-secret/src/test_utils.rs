//! Map-backed SecretResolver for testing.

use crate::{SecretError, SecretResolver, SecretValue};
use async_trait::async_trait;
use secretsync_api::secret::SecretSource;
use std::collections::HashMap;

/// Resolver serving Kubernetes secret keys from an in-memory map.
///
/// Entries are keyed by `(namespace, name, key)`. A secret that exists
/// without the requested key is reported the same way as a missing secret.
#[derive(Default)]
pub struct StaticResolver {
    entries: HashMap<(String, String, String), Vec<u8>>,
}

impl StaticResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a secret key.
    pub fn with_secret(
        mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        self.entries
            .insert((namespace.into(), name.into(), key.into()), value.into());
        self
    }
}

#[async_trait]
impl SecretResolver for StaticResolver {
    async fn resolve(&self, source: &SecretSource) -> Result<SecretValue, SecretError> {
        match source {
            SecretSource::Kubernetes {
                namespace,
                name,
                key,
            } => self
                .entries
                .get(&(namespace.clone(), name.clone(), key.clone()))
                .map(|bytes| SecretValue::new(bytes.clone()))
                .ok_or_else(|| SecretError::NotFound(source.to_string())),
            _ => Err(SecretError::NoResolver(source.kind().to_string())),
        }
    }
}
