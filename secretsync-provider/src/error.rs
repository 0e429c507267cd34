//! Errors crossing the provider boundary.

use thiserror::Error;

/// Errors returned by [`Provider`](crate::Provider) and
/// [`SecretsClient`](crate::SecretsClient) implementations.
///
/// The variant classifies the failure for the operator; the message is the
/// provider's own and is displayed unchanged.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The store resource is missing fields or malformed.
    #[error("{0}")]
    InvalidStore(String),

    /// The remote reference does not follow the provider's key format.
    #[error("{0}")]
    InvalidRef(String),

    /// Auth material could not be resolved or was rejected.
    #[error("{0}")]
    Auth(String),

    /// The requested secret does not exist in the backend.
    #[error("{0}")]
    NotFound(String),

    /// A fetched value could not be converted.
    #[error("{0}")]
    Serialization(String),

    /// The request is valid in general but this provider does not support it.
    #[error("{0}")]
    NotSupported(String),

    /// The operation is not implemented by this provider.
    #[error("{0}")]
    NotImplemented(String),

    /// The client was used before it was initialized.
    #[error("{0}")]
    Uninitialized(String),

    /// Backend communication failure.
    #[error("{0}")]
    Backend(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
