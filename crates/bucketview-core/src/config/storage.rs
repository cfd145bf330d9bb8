//! Object store configuration.

use serde::{Deserialize, Serialize};

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Maximum number of keys requested per listing page.
    #[serde(default = "default_list_page_size")]
    pub list_page_size: i32,
    /// S3-compatible object storage configuration.
    #[serde(default)]
    pub s3: S3StorageConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            list_page_size: default_list_page_size(),
            s3: S3StorageConfig::default(),
        }
    }
}

/// S3-compatible object storage configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct S3StorageConfig {
    /// S3 endpoint URL (for non-AWS services like MinIO or R2).
    #[serde(default)]
    pub endpoint: String,
    /// AWS region.
    #[serde(default = "default_region")]
    pub region: String,
    /// S3 bucket name.
    #[serde(default)]
    pub bucket: String,
    /// Access key ID.
    #[serde(default)]
    pub access_key: String,
    /// Secret access key.
    #[serde(default)]
    pub secret_key: String,
    /// Address buckets as `endpoint/bucket` instead of `bucket.endpoint`.
    #[serde(default)]
    pub force_path_style: bool,
}

impl S3StorageConfig {
    /// Whether all three values required to reach a bucket are present.
    pub fn has_credentials(&self) -> bool {
        !self.access_key.trim().is_empty()
            && !self.secret_key.trim().is_empty()
            && !self.bucket.trim().is_empty()
    }
}

impl Default for S3StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            region: default_region(),
            bucket: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            force_path_style: false,
        }
    }
}

impl std::fmt::Debug for S3StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3StorageConfig")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("access_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

fn default_list_page_size() -> i32 {
    1000
}

fn default_region() -> String {
    "us-east-1".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_credentials_requires_all_three() {
        let mut s3 = S3StorageConfig {
            access_key: "AKIA".into(),
            secret_key: "secret".into(),
            bucket: "media".into(),
            ..Default::default()
        };
        assert!(s3.has_credentials());

        s3.secret_key = "   ".into();
        assert!(!s3.has_credentials());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let s3 = S3StorageConfig {
            access_key: "AKIA123".into(),
            secret_key: "topsecret".into(),
            ..Default::default()
        };
        let rendered = format!("{s3:?}");
        assert!(!rendered.contains("topsecret"));
        assert!(!rendered.contains("AKIA123"));
    }
}
