#![deny(missing_docs)]
//! Chef Infra Server data bags as a secretsync backend.
//!
//! A store names a Chef organization URL, a client or user name, and the
//! Kubernetes secret holding that principal's RSA private key. Remote keys
//! address data bag items:
//!
//! | Call | Key | Result |
//! |------|-----|--------|
//! | `get_secret` | `bag/item` | item JSON, or one property when `property` is set |
//! | `get_secret_map` | `bag` | item name → item JSON for every item in the bag |
//! | `get_all_secrets` | – | always `dataFrom.find not supported` |
//!
//! Properties are dot paths into the item (`db.hosts.0`, `tls\.crt`).
//! String values come back without quotes; other values as JSON.
//!
//! Requests are signed with Chef authentication protocol 1.3 (see
//! [`signing`]). The resolver only depends on the narrow [`DataBagService`]
//! and [`PrincipalService`] traits, so tests can swap the HTTP client for
//! `fake::InMemoryChef` (feature `test-utils`).

pub mod client;
pub mod error;
pub mod key;
pub mod provider;
pub mod secrets;
pub mod service;
pub mod signing;
pub mod validate;

#[cfg(any(test, feature = "test-utils"))]
pub mod fake;

pub use client::ChefClient;
pub use error::{ChefApiError, ChefError};
pub use key::DataBagKey;
pub use provider::{ChefSecretsProvider, KIND};
pub use secrets::{ChefSecretsClient, MapFailurePolicy};
pub use service::{DataBagService, PrincipalService};
pub use validate::ValidationError;
