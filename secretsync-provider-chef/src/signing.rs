//! Chef Server request signing, authentication protocol version 1.3.
//!
//! Each request carries a SHA-256 hash of its body and an RSA PKCS#1 v1.5
//! signature over a canonical request string. The base64 signature is split
//! into 60-character `X-Ops-Authorization-N` headers.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use reqwest::Method;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use sha2::{Digest, Sha256};

use crate::error::ChefApiError;

/// Server API version announced and signed on every request.
pub const SERVER_API_VERSION: &str = "1";

/// Client version reported in `X-Chef-Version`.
pub const CHEF_VERSION: &str = "18.0.0";

const SIGN_ALGORITHM: &str = "algorithm=sha256;version=1.3";
const AUTHORIZATION_LINE_LEN: usize = 60;

/// Signs requests on behalf of one Chef principal.
pub struct RequestSigner {
    user_id: String,
    key: SigningKey<Sha256>,
}

impl RequestSigner {
    /// Load an RSA private key in PKCS#1 (`BEGIN RSA PRIVATE KEY`) or PKCS#8
    /// (`BEGIN PRIVATE KEY`) PEM form.
    pub fn from_pem(user_id: impl Into<String>, pem: &str) -> Result<Self, ChefApiError> {
        let key = RsaPrivateKey::from_pkcs1_pem(pem)
            .or_else(|pkcs1_err| {
                RsaPrivateKey::from_pkcs8_pem(pem).map_err(|_| pkcs1_err.to_string())
            })
            .map_err(ChefApiError::InvalidKey)?;
        Ok(Self {
            user_id: user_id.into(),
            key: SigningKey::<Sha256>::new(key),
        })
    }

    /// The principal requests are signed for.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The string that gets signed.
    pub fn canonical_request(
        &self,
        method: &Method,
        path: &str,
        content_hash: &str,
        timestamp: &str,
    ) -> String {
        format!(
            "Method:{method}\nPath:{path}\nX-Ops-Content-Hash:{content_hash}\nX-Ops-Sign:version=1.3\nX-Ops-Timestamp:{timestamp}\nX-Ops-UserId:{user}\nX-Ops-Server-API-Version:{SERVER_API_VERSION}",
            method = method.as_str(),
            user = self.user_id,
        )
    }

    /// Authentication headers for one request.
    pub fn headers(
        &self,
        method: &Method,
        path: &str,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<HeaderMap, ChefApiError> {
        let timestamp = now.format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let hash = content_hash(body);
        let canonical = self.canonical_request(method, path, &hash, &timestamp);

        let signature = self
            .key
            .try_sign(canonical.as_bytes())
            .map_err(|e| ChefApiError::Signing(e.to_string()))?;
        let encoded = STANDARD.encode(signature.to_bytes());

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("x-chef-version", HeaderValue::from_static(CHEF_VERSION));
        headers.insert("x-ops-sign", HeaderValue::from_static(SIGN_ALGORITHM));
        headers.insert(
            "x-ops-server-api-version",
            HeaderValue::from_static(SERVER_API_VERSION),
        );
        headers.insert("x-ops-userid", header_value(&self.user_id)?);
        headers.insert("x-ops-timestamp", header_value(&timestamp)?);
        headers.insert("x-ops-content-hash", header_value(&hash)?);

        for (i, line) in encoded.as_bytes().chunks(AUTHORIZATION_LINE_LEN).enumerate() {
            let name = HeaderName::from_bytes(format!("x-ops-authorization-{}", i + 1).as_bytes())
                .map_err(|e| ChefApiError::Signing(e.to_string()))?;
            let value =
                HeaderValue::from_bytes(line).map_err(|e| ChefApiError::Signing(e.to_string()))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("user_id", &self.user_id)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Base64 SHA-256 of a request body.
pub fn content_hash(body: &[u8]) -> String {
    STANDARD.encode(Sha256::digest(body))
}

fn header_value(value: &str) -> Result<HeaderValue, ChefApiError> {
    HeaderValue::from_str(value).map_err(|e| ChefApiError::Signing(e.to_string()))
}
