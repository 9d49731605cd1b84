use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use super::parse_props_payload;
use super::provider::PropSource;
use crate::models::Prop;

/// Props read from a JSON file exported by the ingestion pipeline.
pub struct JsonFilePropSource {
    path: PathBuf,
    name: String,
}

impl JsonFilePropSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("file:{}", path.display());
        JsonFilePropSource { path, name }
    }
}

#[async_trait]
impl PropSource for JsonFilePropSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_props(&self) -> Result<Vec<Prop>> {
        debug!("Reading props from {}", self.path.display());
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let raw: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("Invalid JSON in {}", self.path.display()))?;
        parse_props_payload(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::tests::sample_prop;

    #[tokio::test]
    async fn test_reads_props_file() {
        let path = std::env::temp_dir().join(format!("props-{}.json", std::process::id()));
        let body = serde_json::json!({ "props": [sample_prop(11), sample_prop(12)] });
        tokio::fs::write(&path, body.to_string()).await.unwrap();

        let source = JsonFilePropSource::new(&path);
        let props = source.fetch_props().await.unwrap();
        assert_eq!(props.len(), 2);
        assert!(source.name().starts_with("file:"));

        tokio::fs::remove_file(&path).await.ok();
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let source = JsonFilePropSource::new("/nonexistent/props.json");
        assert!(source.fetch_props().await.is_err());
    }
}
