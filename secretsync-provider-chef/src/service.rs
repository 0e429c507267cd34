//! The narrow slice of the Chef Server API the provider needs.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ChefApiError;

/// Read access to data bags.
#[async_trait]
pub trait DataBagService: Send + Sync {
    /// Names of the items in `bag`.
    async fn list_items(&self, bag: &str) -> Result<Vec<String>, ChefApiError>;

    /// Content of one item.
    async fn get_item(&self, bag: &str, item: &str) -> Result<Value, ChefApiError>;
}

/// Read access to principals, used for the reachability check.
///
/// A principal is either an organization user or an API client.
#[async_trait]
pub trait PrincipalService: Send + Sync {
    /// The principal record for `name`.
    async fn get_principal(&self, name: &str) -> Result<Value, ChefApiError>;
}
