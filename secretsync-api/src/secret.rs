//! Credential source types.
//!
//! These are data types only. The resolution trait (`SecretResolver`) lives in
//! `secretsync-secret`; this crate only names where a credential is stored.

use serde::{Deserialize, Serialize};

/// Where a credential is stored. This describes the BACKEND, not how the
/// provider will use it.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SecretSource {
    /// Kubernetes Secret.
    Kubernetes {
        /// The namespace containing the secret.
        namespace: String,
        /// The secret resource name.
        name: String,
        /// The key within the secret's data map.
        key: String,
    },
    /// Custom source for backends outside this workspace.
    Custom {
        /// The backend provider identifier.
        provider: String,
        /// Backend-specific configuration.
        config: serde_json::Value,
    },
}

impl SecretSource {
    /// Shorthand for a Kubernetes secret key.
    pub fn kubernetes(
        namespace: impl Into<String>,
        name: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        SecretSource::Kubernetes {
            namespace: namespace.into(),
            name: name.into(),
            key: key.into(),
        }
    }

    /// Returns a short, telemetry-safe kind tag for this source variant.
    ///
    /// Safe to log and include in error messages; never contains secret
    /// material.
    pub fn kind(&self) -> &'static str {
        match self {
            SecretSource::Kubernetes { .. } => "kubernetes",
            SecretSource::Custom { .. } => "custom",
        }
    }
}

impl std::fmt::Display for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretSource::Kubernetes {
                namespace,
                name,
                key,
            } => write!(f, "{namespace}/{name}[{key}]"),
            SecretSource::Custom { provider, .. } => write!(f, "custom:{provider}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kubernetes_source_is_tagged() {
        let source = SecretSource::kubernetes("ops", "chef-key", "auth-key");
        let value = serde_json::to_value(&source).unwrap();
        assert_eq!(
            value,
            json!({ "type": "kubernetes", "namespace": "ops", "name": "chef-key", "key": "auth-key" })
        );
        assert_eq!(source.kind(), "kubernetes");
        assert_eq!(source.to_string(), "ops/chef-key[auth-key]");
    }

    #[test]
    fn custom_display_hides_config() {
        let source = SecretSource::Custom {
            provider: "env".into(),
            config: json!({ "var_name": "CHEF_KEY" }),
        };
        assert_eq!(source.kind(), "custom");
        assert_eq!(source.to_string(), "custom:env");
    }
}
