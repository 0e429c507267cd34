//! Chef Server HTTP client.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::error::ChefApiError;
use crate::service::{DataBagService, PrincipalService};
use crate::signing::RequestSigner;

/// Signed client for one Chef Server organization.
///
/// The server URL is the organization root and ends with `/`, for example
/// `https://chef.example.com/organizations/myorg/`. Endpoint paths are
/// appended to it segment by segment.
///
/// # Example
///
/// ```no_run
/// use secretsync_provider_chef::ChefClient;
///
/// # fn load() -> Result<(), Box<dyn std::error::Error>> {
/// let pem = std::fs::read("client.pem")?;
/// let client = ChefClient::new(
///     "chef-demo-user",
///     &pem,
///     "https://chef.example.com/organizations/myorg/",
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ChefClient {
    base_url: Url,
    signer: RequestSigner,
    http: reqwest::Client,
}

impl ChefClient {
    /// Build a client from the principal name, its PEM private key, and the
    /// organization URL.
    pub fn new(
        user: impl Into<String>,
        key_pem: &[u8],
        server_url: &str,
    ) -> Result<Self, ChefApiError> {
        let pem = std::str::from_utf8(key_pem).map_err(|_| ChefApiError::KeyEncoding)?;
        let signer = RequestSigner::from_pem(user, pem)?;
        let base_url = Url::parse(server_url)
            .map_err(|e| ChefApiError::InvalidUrl(format!("{server_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ChefApiError::InvalidUrl(server_url.to_string()));
        }
        Ok(Self {
            base_url,
            signer,
            http: reqwest::Client::new(),
        })
    }

    /// Use a preconfigured HTTP client (proxies, timeouts, custom roots).
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// The organization URL requests are made against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ChefApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| ChefApiError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn get_json(&self, segments: &[&str]) -> Result<Value, ChefApiError> {
        let url = self.endpoint(segments)?;
        let headers = self
            .signer
            .headers(&Method::GET, url.path(), b"", Utc::now())?;

        tracing::debug!(url = %url, user = %self.signer.user_id(), "sending chef request");

        let response = self.http.get(url.clone()).headers(headers).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(url = %url, status = status.as_u16(), "chef request failed");
            return Err(ChefApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ChefApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl DataBagService for ChefClient {
    async fn list_items(&self, bag: &str) -> Result<Vec<String>, ChefApiError> {
        match self.get_json(&["data", bag]).await? {
            Value::Object(items) => {
                let mut names: Vec<String> = items.keys().cloned().collect();
                names.sort();
                Ok(names)
            }
            other => Err(ChefApiError::Decode(format!(
                "expected an object of item names, got {other}"
            ))),
        }
    }

    async fn get_item(&self, bag: &str, item: &str) -> Result<Value, ChefApiError> {
        self.get_json(&["data", bag, item]).await
    }
}

#[async_trait]
impl PrincipalService for ChefClient {
    async fn get_principal(&self, name: &str) -> Result<Value, ChefApiError> {
        self.get_json(&["principals", name]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEM: &[u8] = include_bytes!("../tests/fixtures/client-pkcs1.pem");
    const BASE_URL: &str = "https://chef.example.com/organizations/myorg/";

    #[test]
    fn endpoint_appends_segments() {
        let client = ChefClient::new("chef-demo-user", PEM, BASE_URL).unwrap();
        assert_eq!(
            client.endpoint(&["data", "bag01", "item01"]).unwrap().as_str(),
            "https://chef.example.com/organizations/myorg/data/bag01/item01"
        );
        assert_eq!(
            client.endpoint(&["principals", "chef-demo-user"]).unwrap().path(),
            "/organizations/myorg/principals/chef-demo-user"
        );
    }

    #[test]
    fn endpoint_escapes_segments() {
        let client = ChefClient::new("chef-demo-user", PEM, BASE_URL).unwrap();
        let url = client.endpoint(&["data", "a b", "c?d"]).unwrap();
        assert_eq!(url.path(), "/organizations/myorg/data/a%20b/c%3Fd");
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(matches!(
            ChefClient::new("u", b"not a key", BASE_URL).unwrap_err(),
            ChefApiError::InvalidKey(_)
        ));
        assert!(matches!(
            ChefClient::new("u", &[0xff, 0xfe], BASE_URL).unwrap_err(),
            ChefApiError::KeyEncoding
        ));
        assert!(matches!(
            ChefClient::new("u", PEM, "not a url").unwrap_err(),
            ChefApiError::InvalidUrl(_)
        ));
    }
}
