//! Store validation.
//!
//! Rules are checked in a fixed order and the first violation wins, so a
//! resource with several problems always reports the same one.

use regex::Regex;
use secretsync_api::store::{ChefProvider, SecretStore};
use std::sync::LazyLock;
use thiserror::Error;
use url::Url;

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_-]*$").expect("valid regex"));

/// Why a store resource was rejected.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No store was given.
    #[error("missing store")]
    MissingStore,
    /// The store has no spec.
    #[error("missing store spec")]
    MissingSpec,
    /// The spec has no provider block.
    #[error("missing provider")]
    MissingProvider,
    /// The provider block has no chef entry.
    #[error("missing chef provider")]
    MissingChefProvider,
    /// The principal name is empty.
    #[error("missing Name")]
    MissingName,
    /// The server URL is empty.
    #[error("missing BaseURL")]
    MissingServerUrl,
    /// The server URL is not an absolute URL.
    #[error("unable to parse URL: {0}")]
    InvalidServerUrl(String),
    /// The server URL does not end with `/`.
    #[error("server URL does not end with slash(/)")]
    MissingTrailingSlash,
    /// The principal name has characters outside `[a-z0-9_-]`.
    #[error("invalid name: allowed values are lowercase letters, numbers, hyphens and underscores")]
    InvalidName,
    /// There is no auth block.
    #[error("cannot initialize Chef Client: no valid authType was specified")]
    MissingAuth,
    /// The key selector has no key.
    #[error("missing Secret Key")]
    MissingSecretKey,
    /// The key selector has no secret name.
    #[error("missing Secret Key name")]
    MissingSecretName,
    /// A cluster store's key selector has no namespace.
    #[error("invalid ClusterSecretStore: missing Chef SecretKey Namespace")]
    MissingSecretNamespace,
    /// A namespaced store's key selector names a namespace.
    #[error("namespace not allowed with namespaced SecretStore")]
    NamespaceNotAllowed,
}

/// Check everything that does not depend on the store's scope and return
/// the chef settings.
pub fn chef_provider(store: Option<&SecretStore>) -> Result<&ChefProvider, ValidationError> {
    let store = store.ok_or(ValidationError::MissingStore)?;
    let spec = store.spec.as_ref().ok_or(ValidationError::MissingSpec)?;
    let provider = spec
        .provider
        .as_ref()
        .ok_or(ValidationError::MissingProvider)?;
    let chef = provider
        .chef
        .as_ref()
        .ok_or(ValidationError::MissingChefProvider)?;

    if chef.user_name.is_empty() {
        return Err(ValidationError::MissingName);
    }
    if chef.server_url.is_empty() {
        return Err(ValidationError::MissingServerUrl);
    }
    check_server_url(&chef.server_url)?;
    if !NAME_PATTERN.is_match(&chef.user_name) {
        return Err(ValidationError::InvalidName);
    }

    let auth = chef.auth.as_ref().ok_or(ValidationError::MissingAuth)?;
    let selector = &auth.secret_ref.secret_key;
    if selector.key.is_empty() {
        return Err(ValidationError::MissingSecretKey);
    }
    if selector.name.is_empty() {
        return Err(ValidationError::MissingSecretName);
    }

    Ok(chef)
}

/// Full store validation: [`chef_provider`] plus the namespace rule.
///
/// A `ClusterSecretStore` serves many namespaces and must pin the key
/// secret's namespace; a namespaced `SecretStore` may only read from its own.
pub fn validate_store(store: Option<&SecretStore>) -> Result<&ChefProvider, ValidationError> {
    let chef = chef_provider(store)?;
    let cluster_scoped = store.is_some_and(|s| s.kind.is_cluster_scoped());
    // chef_provider already guaranteed the auth block
    let namespace = chef
        .auth
        .as_ref()
        .and_then(|a| a.secret_ref.secret_key.namespace.as_ref());

    match (cluster_scoped, namespace) {
        (true, None) => Err(ValidationError::MissingSecretNamespace),
        (false, Some(_)) => Err(ValidationError::NamespaceNotAllowed),
        _ => Ok(chef),
    }
}

fn check_server_url(raw: &str) -> Result<(), ValidationError> {
    let url =
        Url::parse(raw).map_err(|e| ValidationError::InvalidServerUrl(format!("parse {raw:?}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ValidationError::InvalidServerUrl(format!(
            "parse {raw:?}: not a hierarchical URL"
        )));
    }
    if !raw.ends_with('/') {
        return Err(ValidationError::MissingTrailingSlash);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secretsync_api::store::{
        ChefAuth, ObjectMeta, SecretKeySelector, SecretStoreProvider, SecretStoreSpec, StoreKind,
    };

    const NAME: &str = "chef-demo-user";
    const BASE_URL: &str = "https://chef.example.com/organizations/myorg/";
    const AUTH_NAME: &str = "chef-demo-auth-name";
    const AUTH_KEY: &str = "chef-demo-auth-key";
    const AUTH_NAMESPACE: &str = "chef-demo-auth-namespace";

    fn auth(name: &str, key: &str, namespace: Option<&str>) -> Option<ChefAuth> {
        let mut selector = SecretKeySelector::new(name, key);
        if let Some(ns) = namespace {
            selector = selector.with_namespace(ns);
        }
        Some(ChefAuth::from_selector(selector))
    }

    fn store(kind: StoreKind, name: &str, url: &str, auth: Option<ChefAuth>) -> SecretStore {
        SecretStore::new(
            kind,
            Some(SecretStoreSpec::new(Some(SecretStoreProvider::chef(Some(
                ChefProvider::new(name, url, auth),
            ))))),
        )
        .with_metadata(ObjectMeta::named("chef-store").in_namespace(AUTH_NAMESPACE))
    }

    fn namespaced(name: &str, url: &str, auth: Option<ChefAuth>) -> SecretStore {
        store(StoreKind::SecretStore, name, url, auth)
    }

    #[test]
    fn accepts_valid_namespaced_store() {
        let s = namespaced(NAME, BASE_URL, auth(AUTH_NAME, AUTH_KEY, None));
        let chef = validate_store(Some(&s)).unwrap();
        assert_eq!(chef.user_name, NAME);
    }

    #[test]
    fn accepts_valid_cluster_store() {
        let s = store(
            StoreKind::ClusterSecretStore,
            NAME,
            BASE_URL,
            auth(AUTH_NAME, AUTH_KEY, Some(AUTH_NAMESPACE)),
        );
        assert!(validate_store(Some(&s)).is_ok());
    }

    #[test]
    fn each_missing_field_reports_its_own_reason() {
        let cases: Vec<(SecretStore, ValidationError)> = vec![
            (
                SecretStore::new(StoreKind::SecretStore, None),
                ValidationError::MissingSpec,
            ),
            (
                SecretStore::new(StoreKind::SecretStore, Some(SecretStoreSpec::new(None))),
                ValidationError::MissingProvider,
            ),
            (
                SecretStore::new(
                    StoreKind::SecretStore,
                    Some(SecretStoreSpec::new(Some(SecretStoreProvider::chef(None)))),
                ),
                ValidationError::MissingChefProvider,
            ),
            (
                namespaced("", BASE_URL, auth(AUTH_NAME, AUTH_KEY, None)),
                ValidationError::MissingName,
            ),
            (
                namespaced(NAME, "", auth(AUTH_NAME, AUTH_KEY, None)),
                ValidationError::MissingServerUrl,
            ),
            (namespaced(NAME, BASE_URL, None), ValidationError::MissingAuth),
            (
                namespaced(NAME, BASE_URL, auth(AUTH_NAME, "", None)),
                ValidationError::MissingSecretKey,
            ),
            (
                namespaced(NAME, BASE_URL, auth("", AUTH_KEY, None)),
                ValidationError::MissingSecretName,
            ),
        ];

        for (s, want) in cases {
            assert_eq!(validate_store(Some(&s)).unwrap_err(), want);
        }
        assert_eq!(validate_store(None).unwrap_err(), ValidationError::MissingStore);
    }

    #[test]
    fn unparsable_url_is_rejected() {
        let s = namespaced(NAME, "invalid base URL/", auth(AUTH_NAME, AUTH_KEY, None));
        let err = validate_store(Some(&s)).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidServerUrl(_)));
        assert!(err.to_string().starts_with("unable to parse URL: parse \"invalid base URL/\""));

        let s = namespaced(NAME, "mailto:ops@example.com/", auth(AUTH_NAME, AUTH_KEY, None));
        assert!(matches!(
            validate_store(Some(&s)).unwrap_err(),
            ValidationError::InvalidServerUrl(_)
        ));
    }

    #[test]
    fn url_without_trailing_slash_is_rejected() {
        for url in [
            "https://chef.example.com/organizations/myorg",
            "https://chef.example.com",
        ] {
            let s = namespaced(NAME, url, auth(AUTH_NAME, AUTH_KEY, None));
            assert_eq!(
                validate_store(Some(&s)).unwrap_err(),
                ValidationError::MissingTrailingSlash,
                "{url}"
            );
        }
    }

    #[test]
    fn name_outside_pattern_is_rejected() {
        for name in ["Chef-User", "chef.user", "chef user", "chef@org", "ÄBC"] {
            let s = namespaced(name, BASE_URL, auth(AUTH_NAME, AUTH_KEY, None));
            assert_eq!(
                validate_store(Some(&s)).unwrap_err(),
                ValidationError::InvalidName,
                "{name}"
            );
        }
        for name in ["chef_user-01", "a", "0-0"] {
            let s = namespaced(name, BASE_URL, auth(AUTH_NAME, AUTH_KEY, None));
            assert!(validate_store(Some(&s)).is_ok(), "{name}");
        }
    }

    #[test]
    fn url_is_checked_before_name_and_auth() {
        let s = namespaced("Bad Name", "https://chef.example.com", None);
        assert_eq!(
            validate_store(Some(&s)).unwrap_err(),
            ValidationError::MissingTrailingSlash
        );
        let s = namespaced("Bad Name", BASE_URL, None);
        assert_eq!(validate_store(Some(&s)).unwrap_err(), ValidationError::InvalidName);
    }

    #[test]
    fn namespace_rule_depends_on_store_kind() {
        let s = namespaced(NAME, BASE_URL, auth(AUTH_NAME, AUTH_KEY, Some(AUTH_NAMESPACE)));
        assert_eq!(
            validate_store(Some(&s)).unwrap_err(),
            ValidationError::NamespaceNotAllowed
        );
        // chef_provider alone ignores the scope
        assert!(chef_provider(Some(&s)).is_ok());

        let s = store(
            StoreKind::ClusterSecretStore,
            NAME,
            BASE_URL,
            auth(AUTH_NAME, AUTH_KEY, None),
        );
        assert_eq!(
            validate_store(Some(&s)).unwrap_err(),
            ValidationError::MissingSecretNamespace
        );
    }
}
