//! WordPress-style REST CMS client.
//!
//! Implements [`Cms`] against a WordPress-compatible REST API (`wp/v2`
//! routes): category and tag terms, post lookup by slug, create/update of
//! posts, and post meta. Every operation here is fatal on failure — a CMS
//! error aborts the import run.
//!
//! # Environment Variables
//!
//! Basic-auth credentials (a WordPress application password) are read from:
//! - `REELSYNC_CMS_USER` — required
//! - `REELSYNC_CMS_PASSWORD` — required

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::CmsConfig;
use crate::models::RecordFields;
use crate::slug::slugify;
use crate::traits::Cms;

/// A REST client for one CMS installation.
pub struct RestCms {
    base_url: String,
    username: String,
    password: String,
    client: reqwest::Client,
}

/// A category or tag term as returned by the terms endpoints.
#[derive(Debug, Deserialize)]
struct Term {
    id: u64,
    name: String,
    #[serde(default)]
    parent: u64,
}

/// Minimal view of a post: only the id is needed.
#[derive(Debug, Deserialize)]
struct PostRef {
    id: u64,
}

impl RestCms {
    /// Create a client for the configured REST root, reading credentials
    /// from the environment.
    pub fn from_env(config: &CmsConfig) -> Result<Self> {
        let username = std::env::var("REELSYNC_CMS_USER")
            .context("REELSYNC_CMS_USER environment variable not set")?;
        let password = std::env::var("REELSYNC_CMS_PASSWORD")
            .context("REELSYNC_CMS_PASSWORD environment variable not set")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username,
            password,
            client: reqwest::Client::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let resp = self
            .client
            .get(self.url(path))
            .basic_auth(&self.username, Some(&self.password))
            .query(query)
            .send()
            .await
            .with_context(|| format!("CMS request failed: GET {}", path))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            bail!(
                "CMS GET {} failed (HTTP {}): {}",
                path,
                status,
                body.chars().take(500).collect::<String>()
            );
        }
        serde_json::from_str(&body).with_context(|| format!("CMS GET {}: unparseable response", path))
    }

    /// POST a JSON payload. Returns the parsed body together with the HTTP
    /// status so callers can resolve well-known conflicts (`term_exists`).
    async fn post_json(&self, path: &str, payload: &Value) -> Result<(u16, Value)> {
        let resp = self
            .client
            .post(self.url(path))
            .basic_auth(&self.username, Some(&self.password))
            .json(payload)
            .send()
            .await
            .with_context(|| format!("CMS request failed: POST {}", path))?;

        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let value = serde_json::from_str(&body).unwrap_or(Value::Null);
        Ok((status, value))
    }

    /// Ensure a term exists under the given taxonomy route (`categories` or
    /// `tags`), returning its id.
    async fn ensure_term(&self, route: &str, name: &str, parent: Option<u64>) -> Result<u64> {
        // Exact-match lookup first; search is fuzzy, so filter by name.
        let mut query = vec![
            ("search", name.to_string()),
            ("per_page", "100".to_string()),
        ];
        if let Some(p) = parent {
            query.push(("parent", p.to_string()));
        }

        let found: Vec<Term> = serde_json::from_value(self.get_json(route, &query).await?)
            .with_context(|| format!("CMS GET {}: unexpected term list shape", route))?;
        if let Some(term) = found.iter().find(|t| {
            t.name.eq_ignore_ascii_case(name) && t.parent == parent.unwrap_or(0)
        }) {
            return Ok(term.id);
        }

        let mut payload = json!({ "name": name, "slug": slugify(name) });
        if let Some(p) = parent {
            payload["parent"] = json!(p);
        }

        let (status, body) = self.post_json(route, &payload).await?;
        if (200..300).contains(&status) {
            return body["id"]
                .as_u64()
                .with_context(|| format!("CMS POST {}: response has no term id", route));
        }

        // Lost a race or the slug is taken: the error carries the existing id.
        if body["code"].as_str() == Some("term_exists") {
            if let Some(id) = body["data"]["term_id"].as_u64() {
                return Ok(id);
            }
        }

        bail!(
            "CMS POST {} failed (HTTP {}) for term '{}': {}",
            route,
            status,
            name,
            body
        );
    }
}

#[async_trait]
impl Cms for RestCms {
    async fn ensure_category(&self, name: &str, parent: Option<u64>) -> Result<u64> {
        self.ensure_term("categories", name, parent).await
    }

    async fn find_record_by_slug(&self, slug: &str) -> Result<Option<u64>> {
        let found: Vec<PostRef> = serde_json::from_value(
            self.get_json("posts", &[("slug", slug.to_string())]).await?,
        )
        .context("CMS GET posts: unexpected post list shape")?;
        Ok(found.first().map(|p| p.id))
    }

    async fn upsert_record(&self, fields: &RecordFields) -> Result<u64> {
        let path = match fields.id {
            Some(id) => format!("posts/{}", id),
            None => "posts".to_string(),
        };

        let payload = json!({
            "title": fields.title,
            "slug": fields.slug,
            "content": fields.body,
            "status": fields.status,
            "categories": fields.categories,
        });

        let (status, body) = self.post_json(&path, &payload).await?;
        if !(200..300).contains(&status) {
            bail!(
                "CMS POST {} failed (HTTP {}) for '{}': {}",
                path,
                status,
                fields.title,
                body
            );
        }

        body["id"]
            .as_u64()
            .with_context(|| format!("CMS POST {}: response has no record id", path))
    }

    async fn set_tags(&self, record_id: u64, tags: &[String]) -> Result<()> {
        let mut ids = Vec::with_capacity(tags.len());
        for tag in tags {
            ids.push(self.ensure_term("tags", tag, None).await?);
        }

        let path = format!("posts/{}", record_id);
        let (status, body) = self.post_json(&path, &json!({ "tags": ids })).await?;
        if !(200..300).contains(&status) {
            bail!("CMS POST {} failed (HTTP {}) setting tags: {}", path, status, body);
        }
        Ok(())
    }

    async fn set_metadata(&self, record_id: u64, key: &str, value: &str) -> Result<()> {
        let path = format!("posts/{}", record_id);
        let (status, body) = self
            .post_json(&path, &json!({ "meta": { key: value } }))
            .await?;
        if !(200..300).contains(&status) {
            bail!(
                "CMS POST {} failed (HTTP {}) setting meta '{}': {}",
                path,
                status,
                key,
                body
            );
        }
        Ok(())
    }
}
