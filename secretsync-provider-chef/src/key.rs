//! Remote key parsing and property extraction.

use serde_json::Value;
use std::str::FromStr;

use crate::error::ChefError;

/// A `databagName/databagItemName` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataBagKey {
    /// Data bag name.
    pub bag: String,
    /// Item name within the bag.
    pub item: String,
}

impl FromStr for DataBagKey {
    type Err = ChefError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let mut parts = key.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(bag), Some(item), None) if !bag.is_empty() && !item.is_empty() => Ok(Self {
                bag: bag.to_string(),
                item: item.to_string(),
            }),
            _ => Err(ChefError::InvalidFormat),
        }
    }
}

impl std::fmt::Display for DataBagKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.bag, self.item)
    }
}

/// Look up a dot path inside an item.
///
/// Segments are separated by `.`; `\.` is a literal dot. A numeric segment
/// indexes into an array.
pub fn lookup<'a>(item: &'a Value, path: &str) -> Option<&'a Value> {
    split_path(path)
        .iter()
        .try_fold(item, |node, segment| match node {
            Value::Object(map) => map.get(segment.as_str()),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

/// Bytes of a looked-up property: strings without quotes, anything else as
/// compact JSON.
pub fn property_bytes(value: &Value) -> Result<Vec<u8>, ChefError> {
    match value {
        Value::String(s) => Ok(s.as_bytes().to_vec()),
        other => serde_json::to_vec(other).map_err(ChefError::Json),
    }
}

fn split_path(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('.') => current.push('.'),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                None => current.push('\\'),
            },
            '.' => segments.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    segments.push(current);
    segments
}
