#![deny(missing_docs)]
//! Fetching credential material for secretsync providers.
//!
//! A provider's store names where its credentials live (for Chef, a key of a
//! Kubernetes Secret). The provider turns that into a [`SecretSource`] and
//! asks a [`SecretResolver`] for the bytes. The operator decides which
//! resolver that is; a [`SecretRegistry`] lets it route different source
//! kinds to different backends behind one handle.
//!
//! Resolved bytes come back as a [`SecretValue`]: zeroed on drop, redacted
//! in `Debug`, and readable only inside [`SecretValue::with_bytes`].

use async_trait::async_trait;
use secretsync_api::secret::SecretSource;
use std::sync::Arc;
use thiserror::Error;
use zeroize::Zeroizing;

#[cfg(feature = "test-utils")]
pub mod test_utils;

/// Why a source could not be resolved.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SecretError {
    /// The secret, or the requested key inside it, does not exist.
    #[error("secret not found: {0}")]
    NotFound(String),

    /// The backend refused the read.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The backend could not be reached or answered with an error.
    #[error("backend error: {0}")]
    BackendError(String),

    /// Nothing is registered for this kind of source. Holds
    /// [`SecretSource::kind`].
    #[error("no resolver for source: {0}")]
    NoResolver(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Resolved credential bytes.
pub struct SecretValue {
    bytes: Zeroizing<Vec<u8>>,
}

impl SecretValue {
    /// Take ownership of `bytes`.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Zeroizing::new(bytes),
        }
    }

    /// Run `f` over the bytes. There is no other accessor.
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        f(&self.bytes)
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when the backend returned no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Reads credential material from one backend.
#[async_trait]
pub trait SecretResolver: Send + Sync {
    /// Fetch the bytes `source` points at.
    async fn resolve(&self, source: &SecretSource) -> Result<SecretValue, SecretError>;
}

/// Which sources a registered resolver serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceMatcher {
    /// Every Kubernetes secret key.
    Kubernetes,
    /// Custom sources with this provider name.
    Custom(String),
}

impl SourceMatcher {
    /// Whether `source` is routed to the resolver registered with this matcher.
    pub fn matches(&self, source: &SecretSource) -> bool {
        match (self, source) {
            (SourceMatcher::Kubernetes, SecretSource::Kubernetes { .. }) => true,
            (SourceMatcher::Custom(name), SecretSource::Custom { provider, .. }) => {
                name == provider
            }
            _ => false,
        }
    }
}

/// Routes each source to the first registered resolver whose matcher accepts
/// it. Itself a [`SecretResolver`], so providers never see the routing.
#[derive(Default)]
pub struct SecretRegistry {
    routes: Vec<(SourceMatcher, Arc<dyn SecretResolver>)>,
}

impl SecretRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`add`](Self::add).
    pub fn with_resolver(
        mut self,
        matcher: SourceMatcher,
        resolver: Arc<dyn SecretResolver>,
    ) -> Self {
        self.add(matcher, resolver);
        self
    }

    /// Route sources accepted by `matcher` to `resolver`. Earlier routes win.
    pub fn add(&mut self, matcher: SourceMatcher, resolver: Arc<dyn SecretResolver>) {
        self.routes.push((matcher, resolver));
    }
}

#[async_trait]
impl SecretResolver for SecretRegistry {
    async fn resolve(&self, source: &SecretSource) -> Result<SecretValue, SecretError> {
        let Some((_, resolver)) = self.routes.iter().find(|(m, _)| m.matches(source)) else {
            return Err(SecretError::NoResolver(source.kind().to_string()));
        };
        tracing::debug!(source = %source, "resolving secret");
        resolver.resolve(source).await
    }
}
