#![deny(missing_docs)]
//! Secret resolver that reads keys of Kubernetes `core/v1` Secrets.
//!
//! Resolves `SecretSource::Kubernetes { namespace, name, key }` by fetching the
//! Secret through the API server and returning `data[key]`. Anything else
//! yields `SecretError::NoResolver`.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use secretsync_api::secret::SecretSource;
use secretsync_secret::{SecretError, SecretResolver, SecretValue};

/// Resolves secrets through the Kubernetes API.
#[derive(Clone)]
pub struct KubeSecretResolver {
    client: Client,
}

impl KubeSecretResolver {
    /// Create with an existing kube client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create from the ambient configuration (in-cluster service account,
    /// then `KUBECONFIG`).
    pub async fn try_default() -> Result<Self, SecretError> {
        let client = Client::try_default()
            .await
            .map_err(|e| SecretError::BackendError(format!("kube client: {e}")))?;
        Ok(Self::new(client))
    }
}

fn map_kube_error(err: kube::Error, source: &SecretSource) -> SecretError {
    match err {
        kube::Error::Api(resp) if resp.code == 404 => SecretError::NotFound(source.to_string()),
        kube::Error::Api(resp) if resp.code == 401 || resp.code == 403 => {
            SecretError::AccessDenied(resp.message)
        }
        other => SecretError::BackendError(other.to_string()),
    }
}

#[async_trait]
impl SecretResolver for KubeSecretResolver {
    async fn resolve(&self, source: &SecretSource) -> Result<SecretValue, SecretError> {
        match source {
            SecretSource::Kubernetes {
                namespace,
                name,
                key,
            } => {
                tracing::debug!(namespace = %namespace, name = %name, "fetching kubernetes secret");
                let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
                let secret = api
                    .get(name)
                    .await
                    .map_err(|e| map_kube_error(e, source))?;

                // stringData is write-only; reads only ever carry data
                secret
                    .data
                    .and_then(|mut data| data.remove(key))
                    .map(|bytes| SecretValue::new(bytes.0))
                    .ok_or_else(|| SecretError::NotFound(source.to_string()))
            }
            _ => Err(SecretError::NoResolver("kubernetes".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn _assert_send_sync<T: Send + Sync>() {}

    async fn resolver_for(server: &MockServer) -> KubeSecretResolver {
        let config = kube::Config::new(server.uri().parse().unwrap());
        KubeSecretResolver::new(Client::try_from(config).unwrap())
    }

    fn secret_body(data: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "apiVersion": "v1",
            "kind": "Secret",
            "metadata": { "name": "chef-key", "namespace": "ops" },
            "data": data
        })
    }

    #[tokio::test]
    async fn object_safety() {
        _assert_send_sync::<KubeSecretResolver>();
        let server = MockServer::start().await;
        let _: Arc<dyn SecretResolver> = Arc::new(resolver_for(&server).await);
    }

    #[tokio::test]
    async fn resolves_key_from_secret_data() {
        let server = MockServer::start().await;
        // "pem-bytes" base64 encoded
        Mock::given(method("GET"))
            .and(path("/api/v1/namespaces/ops/secrets/chef-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(secret_body(serde_json::json!({ "auth-key": "cGVtLWJ5dGVz" }))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let resolver = resolver_for(&server).await;
        let value = resolver
            .resolve(&SecretSource::kubernetes("ops", "chef-key", "auth-key"))
            .await
            .unwrap();
        value.with_bytes(|b| assert_eq!(b, b"pem-bytes"));
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/namespaces/ops/secrets/chef-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(secret_body(serde_json::json!({ "other": "eA==" }))),
            )
            .mount(&server)
            .await;

        let resolver = resolver_for(&server).await;
        let err = resolver
            .resolve(&SecretSource::kubernetes("ops", "chef-key", "auth-key"))
            .await
            .unwrap_err();
        assert!(matches!(err, SecretError::NotFound(_)));
        assert!(err.to_string().contains("ops/chef-key[auth-key]"));
    }

    #[tokio::test]
    async fn missing_secret_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/namespaces/ops/secrets/absent"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "kind": "Status",
                "apiVersion": "v1",
                "metadata": {},
                "status": "Failure",
                "message": "secrets \"absent\" not found",
                "reason": "NotFound",
                "code": 404
            })))
            .mount(&server)
            .await;

        let resolver = resolver_for(&server).await;
        let err = resolver
            .resolve(&SecretSource::kubernetes("ops", "absent", "auth-key"))
            .await
            .unwrap_err();
        assert!(matches!(err, SecretError::NotFound(_)));
    }

    #[tokio::test]
    async fn forbidden_is_access_denied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/namespaces/ops/secrets/chef-key"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "kind": "Status",
                "apiVersion": "v1",
                "metadata": {},
                "status": "Failure",
                "message": "secrets \"chef-key\" is forbidden",
                "reason": "Forbidden",
                "code": 403
            })))
            .mount(&server)
            .await;

        let resolver = resolver_for(&server).await;
        let err = resolver
            .resolve(&SecretSource::kubernetes("ops", "chef-key", "auth-key"))
            .await
            .unwrap_err();
        assert!(matches!(err, SecretError::AccessDenied(_)));
        assert!(err.to_string().contains("forbidden"));
    }

    #[tokio::test]
    async fn server_failure_is_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/namespaces/ops/secrets/chef-key"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "kind": "Status",
                "apiVersion": "v1",
                "metadata": {},
                "status": "Failure",
                "message": "etcdserver: request timed out",
                "reason": "InternalError",
                "code": 500
            })))
            .mount(&server)
            .await;

        let resolver = resolver_for(&server).await;
        let err = resolver
            .resolve(&SecretSource::kubernetes("ops", "chef-key", "auth-key"))
            .await
            .unwrap_err();
        assert!(matches!(err, SecretError::BackendError(_)));
        assert!(err.to_string().contains("request timed out"));
    }

    #[tokio::test]
    async fn rejects_custom_source() {
        let server = MockServer::start().await;
        let resolver = resolver_for(&server).await;
        let source = SecretSource::Custom {
            provider: "env".into(),
            config: serde_json::json!({}),
        };
        let err = resolver.resolve(&source).await.unwrap_err();
        assert!(matches!(err, SecretError::NoResolver(_)));
    }
}
