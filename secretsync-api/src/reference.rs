//! What the operator asks a provider to fetch.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reference to one remote secret.
///
/// `key` is interpreted by the provider (for Chef: `bag/item` for a single
/// item, or a bag name for a map). `property` optionally selects a nested
/// value of the fetched document.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteRef {
    /// Provider-specific key.
    pub key: String,
    /// Optional nested property path. Empty means the whole document.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub property: String,
}

impl RemoteRef {
    /// A reference to the whole document at `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            property: String::new(),
        }
    }

    /// Select a nested property.
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = property.into();
        self
    }
}

/// Bulk lookup request (`dataFrom.find`).
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindSpec {
    /// Optional path prefix to search under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Match by name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<FindName>,
    /// Match by tags.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl FindSpec {
    /// Find by name pattern.
    pub fn by_name(regexp: impl Into<String>) -> Self {
        Self {
            name: Some(FindName {
                regexp: regexp.into(),
            }),
            ..Self::default()
        }
    }
}

/// Name matcher of a [`FindSpec`].
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindName {
    /// Regular expression over secret names.
    pub regexp: String,
}
