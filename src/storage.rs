//! S3 object store.
//!
//! Implements [`ObjectStore`] against the S3 REST API with AWS Signature V4
//! authentication: `HeadObject` for the existence check and `PutObject` with
//! a `public-read` canned ACL for uploads. Supports custom endpoints for
//! S3-compatible services (MinIO, LocalStack).
//!
//! Uses only pure-Rust dependencies (`hmac`, `sha2`) for AWS signing — no
//! C library dependencies like `aws-lc-sys`, making it compatible with
//! all build environments including Nix.
//!
//! # Environment Variables
//!
//! Credentials are read from environment variables:
//! - `AWS_ACCESS_KEY_ID` — required
//! - `AWS_SECRET_ACCESS_KEY` — required
//! - `AWS_SESSION_TOKEN` — optional (for temporary credentials / IAM roles)

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::config::StorageConfig;
use crate::traits::ObjectStore;

type HmacSha256 = Hmac<Sha256>;

/// An S3 bucket client implementing the [`ObjectStore`] trait.
pub struct S3Store {
    config: StorageConfig,
    creds: AwsCredentials,
    client: reqwest::Client,
}

impl S3Store {
    /// Create a store for the configured bucket, reading credentials from
    /// the environment.
    pub fn from_env(config: StorageConfig) -> Result<Self> {
        Ok(Self {
            config,
            creds: AwsCredentials::from_env()?,
            client: reqwest::Client::new(),
        })
    }

    /// Object URL for an encoded key path.
    fn object_url(&self, encoded_key: &str) -> String {
        format!(
            "{}://{}/{}",
            self.scheme(),
            self.host(),
            self.key_path(encoded_key)
        )
    }

    /// Request path for an encoded key, as used in both the URL and the
    /// SigV4 canonical request.
    ///
    /// AWS endpoints are virtual-hosted (the bucket lives in the hostname);
    /// custom endpoints (MinIO, LocalStack) use path-style addressing, so
    /// the bucket becomes the leading path segment.
    fn key_path(&self, encoded_key: &str) -> String {
        if self.config.endpoint_url.is_some() {
            format!("{}/{}", uri_encode(&self.config.bucket), encoded_key)
        } else {
            encoded_key.to_string()
        }
    }

    /// URL scheme: custom endpoints keep their configured scheme, AWS
    /// endpoints are always https.
    fn scheme(&self) -> &str {
        match self.config.endpoint_url {
            Some(ref endpoint) if endpoint.starts_with("http://") => "http",
            _ => "https",
        }
    }

    /// S3 hostname for the configured bucket and region.
    ///
    /// If a custom `endpoint_url` is set (for MinIO, LocalStack, etc.),
    /// that is used instead of the standard `<bucket>.s3.<region>.amazonaws.com`.
    fn host(&self) -> String {
        if let Some(ref endpoint) = self.config.endpoint_url {
            endpoint
                .trim_start_matches("https://")
                .trim_start_matches("http://")
                .trim_end_matches('/')
                .to_string()
        } else {
            format!("{}.s3.{}.amazonaws.com", self.config.bucket, self.config.region)
        }
    }

    /// Build the SigV4 headers for a request with no query string.
    ///
    /// `encoded_path` is the full request path from [`Self::key_path`];
    /// `extra_headers` must be lowercase `x-amz-*` names; they are included
    /// in the signature.
    fn sign_request(
        &self,
        method: &str,
        encoded_path: &str,
        payload_hash: &str,
        extra_headers: &[(&str, &str)],
    ) -> Vec<(String, String)> {
        let host = self.host();
        let now = Utc::now();
        let date_stamp = now.format("%Y%m%d").to_string();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();

        let mut headers: Vec<(String, String)> = vec![
            ("host".to_string(), host),
            ("x-amz-content-sha256".to_string(), payload_hash.to_string()),
            ("x-amz-date".to_string(), amz_date.clone()),
        ];
        for (name, value) in extra_headers {
            headers.push((name.to_string(), value.to_string()));
        }
        if let Some(ref token) = self.creds.session_token {
            headers.push(("x-amz-security-token".to_string(), token.clone()));
        }
        headers.sort_by(|a, b| a.0.cmp(&b.0));

        let signed_headers: String = headers
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(";");

        let canonical_headers: String = headers
            .iter()
            .map(|(k, v)| format!("{}:{}\n", k, v))
            .collect();

        let canonical_request = format!(
            "{}\n/{}\n\n{}\n{}\n{}",
            method, encoded_path, canonical_headers, signed_headers, payload_hash
        );

        let credential_scope = format!("{}/{}/s3/aws4_request", date_stamp, self.config.region);
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{}\n{}\n{}",
            amz_date,
            credential_scope,
            hex_sha256(canonical_request.as_bytes())
        );

        let signing_key = derive_signing_key(
            &self.creds.secret_access_key,
            &date_stamp,
            &self.config.region,
            "s3",
        );
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        let authorization = format!(
            "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
            self.creds.access_key_id, credential_scope, signed_headers, signature
        );

        headers.retain(|(k, _)| k != "host");
        headers.push(("authorization".to_string(), authorization));
        headers
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn exists(&self, key: &str) -> Result<bool> {
        let encoded_key = encode_key(key);
        let encoded_path = self.key_path(&encoded_key);
        let url = self.object_url(&encoded_key);
        let payload_hash = hex_sha256(b"");

        let mut req = self.client.head(&url);
        for (name, value) in self.sign_request("HEAD", &encoded_path, &payload_hash, &[]) {
            req = req.header(&name, &value);
        }

        let resp = req.send().await.map_err(|e| {
            anyhow::anyhow!("Failed to check s3://{}/{}: {}", self.config.bucket, key, e)
        })?;

        match resp.status().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => bail!(
                "S3 HeadObject failed (HTTP {}) for key '{}'",
                status,
                key
            ),
        }
    }

    async fn put_public(&self, key: &str, local_path: &Path) -> Result<()> {
        let body = tokio::fs::read(local_path)
            .await
            .with_context(|| format!("Failed to read {}", local_path.display()))?;
        let payload_hash = hex_sha256(&body);

        let encoded_key = encode_key(key);
        let encoded_path = self.key_path(&encoded_key);
        let url = self.object_url(&encoded_key);

        let mut req = self.client.put(&url).body(body);
        let signed = self.sign_request(
            "PUT",
            &encoded_path,
            &payload_hash,
            &[("x-amz-acl", "public-read")],
        );
        for (name, value) in signed {
            req = req.header(&name, &value);
        }

        let resp = req.send().await.map_err(|e| {
            anyhow::anyhow!("Failed to put s3://{}/{}: {}", self.config.bucket, key, e)
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!(
                "S3 PutObject failed (HTTP {}) for key '{}': {}",
                status,
                key,
                body.chars().take(500).collect::<String>()
            );
        }

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        self.object_url(&encode_key(key))
    }
}

// ============ AWS Credentials ============

/// AWS credentials loaded from environment variables.
struct AwsCredentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
}

impl AwsCredentials {
    /// Load credentials from `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`,
    /// and optionally `AWS_SESSION_TOKEN`.
    fn from_env() -> Result<Self> {
        let access_key_id = std::env::var("AWS_ACCESS_KEY_ID")
            .context("AWS_ACCESS_KEY_ID environment variable not set")?;
        let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY")
            .context("AWS_SECRET_ACCESS_KEY environment variable not set")?;
        let session_token = std::env::var("AWS_SESSION_TOKEN").ok();

        Ok(Self {
            access_key_id,
            secret_access_key,
            session_token,
        })
    }
}

// ============ AWS SigV4 Helpers ============

/// URI-encode an object key, preserving `/` separators.
fn encode_key(key: &str) -> String {
    key.split('/').map(uri_encode).collect::<Vec<_>>().join("/")
}

/// Compute the hex-encoded SHA-256 hash of data.
fn hex_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Compute HMAC-SHA256 of data with the given key.
fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Compute hex-encoded HMAC-SHA256.
fn hex_hmac_sha256(key: &[u8], data: &[u8]) -> String {
    hex::encode(hmac_sha256(key, data))
}

/// Derive the AWS SigV4 signing key for a given date, region, and service.
///
/// ```text
/// kDate    = HMAC("AWS4" + secret, dateStamp)
/// kRegion  = HMAC(kDate, region)
/// kService = HMAC(kRegion, service)
/// kSigning = HMAC(kService, "aws4_request")
/// ```
fn derive_signing_key(secret_key: &str, date_stamp: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(
        format!("AWS4{}", secret_key).as_bytes(),
        date_stamp.as_bytes(),
    );
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

/// URI-encode a string per RFC 3986 (used in SigV4 canonical requests).
///
/// Encodes all characters except unreserved characters:
/// `A-Z a-z 0-9 - _ . ~`
fn uri_encode(s: &str) -> String {
    let mut result = String::new();
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char);
            }
            _ => {
                result.push_str(&format!("%{:02X}", byte));
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(endpoint: Option<&str>) -> S3Store {
        S3Store {
            config: StorageConfig {
                bucket: "videos.example.com".to_string(),
                key_prefix: "fluent-2013/".to_string(),
                region: "us-east-1".to_string(),
                endpoint_url: endpoint.map(str::to_string),
            },
            creds: AwsCredentials {
                access_key_id: "AKIDEXAMPLE".to_string(),
                secret_access_key: "secret".to_string(),
                session_token: None,
            },
            client: reqwest::Client::new(),
        }
    }

    #[test]
    fn standard_host_is_virtual_hosted() {
        assert_eq!(
            store(None).host(),
            "videos.example.com.s3.us-east-1.amazonaws.com"
        );
    }

    #[test]
    fn custom_endpoint_uses_path_style_addressing() {
        let s = store(Some("http://localhost:9000"));
        assert_eq!(s.host(), "localhost:9000");
        // The bucket must appear as the leading path segment.
        assert_eq!(
            s.public_url("fluent-2013/opening-talk.mp4"),
            "http://localhost:9000/videos.example.com/fluent-2013/opening-talk.mp4"
        );
    }

    #[test]
    fn custom_endpoint_signs_the_path_style_path() {
        let s = store(Some("http://localhost:9000"));
        assert_eq!(
            s.key_path("fluent-2013/opening-talk.mp4"),
            "videos.example.com/fluent-2013/opening-talk.mp4"
        );
    }

    #[test]
    fn aws_endpoint_stays_virtual_hosted() {
        let s = store(None);
        assert_eq!(s.key_path("fluent-2013/opening-talk.mp4"), "fluent-2013/opening-talk.mp4");
        assert_eq!(
            s.public_url("fluent-2013/opening-talk.mp4"),
            "https://videos.example.com.s3.us-east-1.amazonaws.com/fluent-2013/opening-talk.mp4"
        );
    }

    #[test]
    fn public_url_encodes_key_segments() {
        assert_eq!(
            store(None).public_url("fluent-2013/a b.mp4"),
            "https://videos.example.com.s3.us-east-1.amazonaws.com/fluent-2013/a%20b.mp4"
        );
    }

    #[test]
    fn signing_key_matches_aws_reference_vector() {
        // From the AWS SigV4 documentation test suite.
        let key = derive_signing_key(
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            "20150830",
            "us-east-1",
            "iam",
        );
        assert_eq!(
            hex::encode(key),
            "c4afb1cc5771d871763a393e44b703571b55cc28424d1a5e86da6ed3c154a4b9"
        );
    }
}
