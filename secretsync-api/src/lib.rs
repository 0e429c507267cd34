//! # secretsync-api: vocabulary shared by secretsync providers
//!
//! This crate defines the data types that flow between the operator and the
//! provider plugins it hosts. It contains no behavior beyond small accessors;
//! the provider traits live in `secretsync-provider` and the secret-fetch
//! traits in `secretsync-secret`.
//!
//! | Module | Types | What it describes |
//! |--------|-------|-------------------|
//! | [`store`] | [`SecretStore`], [`ChefProvider`], [`SecretKeySelector`] | The declarative store resource |
//! | [`secret`] | [`SecretSource`] | Where a credential lives |
//! | [`reference`] | [`RemoteRef`], [`FindSpec`] | What the operator asks a provider for |
//!
//! All types deserialize from the camelCase JSON the operator reads from
//! the cluster. Optional sub-objects are `Option`s so that validators can
//! report exactly which part of a resource is missing.

#![deny(missing_docs)]

pub mod reference;
pub mod secret;
pub mod store;

pub use reference::{FindName, FindSpec, RemoteRef};
pub use secret::SecretSource;
pub use store::{
    ChefAuth, ChefAuthSecretRef, ChefProvider, ObjectMeta, SecretKeySelector, SecretStore,
    SecretStoreProvider, SecretStoreSpec, StoreKind,
};
