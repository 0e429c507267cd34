//! Map-backed Chef Server for testing.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::ChefApiError;
use crate::service::{DataBagService, PrincipalService};

/// In-memory data bags and principals.
///
/// Missing bags, items and principals answer like the server does, with a 404
/// status. Items registered through [`with_failing_item`](Self::with_failing_item)
/// are listed in their bag but answer 500 when fetched.
#[derive(Debug, Default)]
pub struct InMemoryChef {
    bags: BTreeMap<String, BTreeMap<String, Value>>,
    failing: BTreeSet<(String, String)>,
    principals: BTreeMap<String, Value>,
    calls: AtomicUsize,
}

impl InMemoryChef {
    /// Create an empty server.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a data bag item. The bag is created if needed.
    pub fn with_item(mut self, bag: impl Into<String>, item: impl Into<String>, value: Value) -> Self {
        self.bags
            .entry(bag.into())
            .or_default()
            .insert(item.into(), value);
        self
    }

    /// Add an empty data bag.
    pub fn with_bag(mut self, bag: impl Into<String>) -> Self {
        self.bags.entry(bag.into()).or_default();
        self
    }

    /// Add an item that is listed but cannot be fetched.
    pub fn with_failing_item(mut self, bag: impl Into<String>, item: impl Into<String>) -> Self {
        let (bag, item) = (bag.into(), item.into());
        self.bags
            .entry(bag.clone())
            .or_default()
            .insert(item.clone(), Value::Null);
        self.failing.insert((bag, item));
        self
    }

    /// Add a principal record. `kind` is `user` or `client`.
    pub fn with_principal_of_type(mut self, name: impl Into<String>, kind: &str) -> Self {
        let name = name.into();
        let record = serde_json::json!({ "name": name, "type": kind, "org_member": true });
        self.principals.insert(name, record);
        self
    }

    /// Add a user principal.
    pub fn with_principal(self, name: impl Into<String>) -> Self {
        self.with_principal_of_type(name, "user")
    }

    /// Number of API calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn status(path: String, status: u16) -> ChefApiError {
    ChefApiError::Status {
        url: path,
        status,
        body: String::new(),
    }
}

#[async_trait]
impl DataBagService for InMemoryChef {
    async fn list_items(&self, bag: &str) -> Result<Vec<String>, ChefApiError> {
        self.record();
        self.bags
            .get(bag)
            .map(|items| items.keys().cloned().collect())
            .ok_or_else(|| status(format!("data/{bag}"), 404))
    }

    async fn get_item(&self, bag: &str, item: &str) -> Result<Value, ChefApiError> {
        self.record();
        let path = format!("data/{bag}/{item}");
        if self.failing.contains(&(bag.to_string(), item.to_string())) {
            return Err(status(path, 500));
        }
        self.bags
            .get(bag)
            .and_then(|items| items.get(item))
            .cloned()
            .ok_or_else(|| status(path, 404))
    }
}

#[async_trait]
impl PrincipalService for InMemoryChef {
    async fn get_principal(&self, name: &str) -> Result<Value, ChefApiError> {
        self.record();
        self.principals
            .get(name)
            .cloned()
            .ok_or_else(|| status(format!("principals/{name}"), 404))
    }
}
