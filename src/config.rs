use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub storage: StorageConfig,
    pub cms: CmsConfig,
    pub import: ImportConfig,
}

/// Object-storage bucket settings. Credentials come from the environment
/// (`AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, optional
/// `AWS_SESSION_TOKEN`), never from the config file.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub bucket: String,
    /// Key prefix for all uploaded objects, e.g. `"fluent-2013/"`.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint for S3-compatible services (MinIO, LocalStack).
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

fn default_key_prefix() -> String {
    "conference/".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

/// CMS REST API settings. Credentials come from `REELSYNC_CMS_USER` /
/// `REELSYNC_CMS_PASSWORD`.
#[derive(Debug, Deserialize, Clone)]
pub struct CmsConfig {
    /// REST root, e.g. `"https://example.com/wp-json/wp/v2"`.
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImportConfig {
    /// Conference label, the middle link of the category chain
    /// root → conference → section (e.g. `"Fluent 2013"`).
    pub conference: String,
    /// Fixed root of the category chain.
    #[serde(default = "default_root_category")]
    pub root_category: String,
}

fn default_root_category() -> String {
    "Training".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.storage.bucket.trim().is_empty() {
        anyhow::bail!("storage.bucket must not be empty");
    }

    if config.import.conference.trim().is_empty() {
        anyhow::bail!("import.conference must not be empty");
    }

    if config.import.root_category.trim().is_empty() {
        anyhow::bail!("import.root_category must not be empty");
    }

    url::Url::parse(&config.cms.base_url)
        .with_context(|| format!("cms.base_url is not a valid URL: {}", config.cms.base_url))?;

    // Normalize the key prefix: keys are bucket-relative, prefix ends in '/'.
    let prefix = config.storage.key_prefix.trim_matches('/');
    config.storage.key_prefix = if prefix.is_empty() {
        String::new()
    } else {
        format!("{}/", prefix)
    };

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let file = write_config(
            r#"
[storage]
bucket = "videos.example.com"

[cms]
base_url = "https://example.com/wp-json/wp/v2"

[import]
conference = "Fluent 2013"
"#,
        );
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.storage.key_prefix, "conference/");
        assert_eq!(cfg.storage.region, "us-east-1");
        assert_eq!(cfg.import.root_category, "Training");
    }

    #[test]
    fn key_prefix_is_normalized() {
        let file = write_config(
            r#"
[storage]
bucket = "videos.example.com"
key_prefix = "/fluent-2013/"

[cms]
base_url = "https://example.com/wp-json/wp/v2"

[import]
conference = "Fluent 2013"
"#,
        );
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.storage.key_prefix, "fluent-2013/");
    }

    #[test]
    fn empty_bucket_is_rejected() {
        let file = write_config(
            r#"
[storage]
bucket = ""

[cms]
base_url = "https://example.com/wp-json/wp/v2"

[import]
conference = "Fluent 2013"
"#,
        );
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let file = write_config(
            r#"
[storage]
bucket = "videos.example.com"

[cms]
base_url = "not a url"

[import]
conference = "Fluent 2013"
"#,
        );
        assert!(load_config(file.path()).is_err());
    }
}
