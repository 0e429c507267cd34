//! Error types for the Chef provider and its HTTP client.

use secretsync_provider::ProviderError;
use secretsync_secret::SecretError;
use thiserror::Error;

use crate::validate::ValidationError;

/// Errors from the Chef Server API client.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ChefApiError {
    /// The server URL could not be parsed or cannot carry a path.
    #[error("invalid server URL: {0}")]
    InvalidUrl(String),

    /// The private key bytes are not UTF-8 text.
    #[error("private key is not valid PEM text")]
    KeyEncoding,

    /// The private key is not an RSA key in PKCS#1 or PKCS#8 PEM form.
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    /// Producing the request signature failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The server answered with a non-success status.
    #[error("{url}: {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body, as returned by the server.
        body: String,
    },

    /// Transport failure.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body was not the expected JSON.
    #[error("invalid JSON response: {0}")]
    Decode(String),
}

/// Errors from the Chef provider. Messages are fixed; underlying causes are
/// kept as sources where the operator may want them.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ChefError {
    /// `validate_store` rejected the store.
    #[error("received invalid Chef SecretStore resource: {0}")]
    InvalidStore(#[source] ValidationError),

    /// `new_client` found the store unusable.
    #[error("missing or invalid spec: {0}")]
    InvalidSpec(#[source] ValidationError),

    /// The auth secret could not be fetched.
    #[error("could not fetch SecretKey Secret: {0}")]
    FetchAuthSecret(#[source] SecretError),

    /// The auth secret exists but holds no key material.
    #[error("missing Secret Key")]
    EmptySecretKey,

    /// The API client rejected its configuration (URL, key material).
    #[error("unable to create chef client: {0}")]
    Client(#[source] ChefApiError),

    /// The client handle has not been set up.
    #[error("provider chef is not initialized")]
    Uninitialized,

    /// The key is not `databagName/databagItemName`.
    #[error("invalid format. Expected value 'databagName/databagItemName'")]
    InvalidFormat,

    /// The data bag or item could not be read.
    #[error("no Databag Item found")]
    ItemNotFound,

    /// The item could not be serialized.
    #[error("unable to convert databagItem into JSON")]
    Json(#[source] serde_json::Error),

    /// The requested property is absent from the item.
    #[error("property {0} is not found in Databag item")]
    PropertyNotFound(String),

    /// `dataFrom.find` was requested.
    #[error("dataFrom.find not supported")]
    FindNotSupported,

    /// A write operation was requested.
    #[error("not implemented")]
    NotImplemented,

    /// The reachability check failed.
    #[error("unable to validate chef user {user}: {source}")]
    UserValidation {
        /// Principal that was looked up.
        user: String,
        /// Why the lookup failed.
        source: ChefApiError,
    },
}

impl From<ChefError> for ProviderError {
    fn from(err: ChefError) -> Self {
        let message = err.to_string();
        match err {
            ChefError::InvalidStore(_) | ChefError::InvalidSpec(_) => {
                ProviderError::InvalidStore(message)
            }
            ChefError::FetchAuthSecret(_) | ChefError::EmptySecretKey | ChefError::Client(_) => {
                ProviderError::Auth(message)
            }
            ChefError::Uninitialized => ProviderError::Uninitialized(message),
            ChefError::InvalidFormat => ProviderError::InvalidRef(message),
            ChefError::ItemNotFound | ChefError::PropertyNotFound(_) => {
                ProviderError::NotFound(message)
            }
            ChefError::Json(_) => ProviderError::Serialization(message),
            ChefError::FindNotSupported => ProviderError::NotSupported(message),
            ChefError::NotImplemented => ProviderError::NotImplemented(message),
            ChefError::UserValidation { .. } => ProviderError::Backend(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_keeps_message_and_classifies() {
        let err: ProviderError = ChefError::InvalidStore(ValidationError::MissingName).into();
        assert!(matches!(err, ProviderError::InvalidStore(_)));
        assert_eq!(
            err.to_string(),
            "received invalid Chef SecretStore resource: missing Name"
        );

        let err: ProviderError = ChefError::ItemNotFound.into();
        assert!(matches!(err, ProviderError::NotFound(_)));
        assert_eq!(err.to_string(), "no Databag Item found");

        let err: ProviderError = ChefError::Uninitialized.into();
        assert!(matches!(err, ProviderError::Uninitialized(_)));

        let err: ProviderError = ChefError::InvalidFormat.into();
        assert!(matches!(err, ProviderError::InvalidRef(_)));

        let err: ProviderError = ChefError::FindNotSupported.into();
        assert!(matches!(err, ProviderError::NotSupported(_)));
    }

    #[test]
    fn status_error_names_url() {
        let err = ChefApiError::Status {
            url: "https://chef.example.com/organizations/dev/data/bag/item".into(),
            status: 404,
            body: String::new(),
        };
        assert_eq!(
            err.to_string(),
            "https://chef.example.com/organizations/dev/data/bag/item: 404"
        );
    }

    #[test]
    fn fetch_error_wraps_detail() {
        let err = ChefError::FetchAuthSecret(SecretError::NotFound("ops/chef-key[pem]".into()));
        assert_eq!(
            err.to_string(),
            "could not fetch SecretKey Secret: secret not found: ops/chef-key[pem]"
        );
    }
}
