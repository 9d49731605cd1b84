use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use super::parse_props_payload;
use super::provider::PropSource;
use crate::models::Prop;

/// Props pulled from an HTTP endpoint serving the ingestion pipeline's
/// snapshot as JSON.
pub struct HttpPropSource {
    http: Client,
    url: Url,
}

impl HttpPropSource {
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url).with_context(|| format!("Invalid prop feed URL: {}", url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("Prop feed URL must be http(s), got {}", url.scheme());
        }
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpPropSource { http, url })
    }
}

#[async_trait]
impl PropSource for HttpPropSource {
    fn name(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch_props(&self) -> Result<Vec<Prop>> {
        debug!("Fetching props from {}", self.url);

        let resp = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .context("Prop feed request failed")?;

        if !resp.status().is_success() {
            anyhow::bail!("Prop feed error: {}", resp.status());
        }

        let raw: serde_json::Value = resp
            .json()
            .await
            .context("Failed to parse prop feed response")?;

        let props = parse_props_payload(&raw)?;
        info!("Fetched {} props from {}", props.len(), self.url);
        Ok(props)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_urls() {
        let source = HttpPropSource::new("https://feed.example.com/props").unwrap();
        assert_eq!(source.name(), "https://feed.example.com/props");
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(HttpPropSource::new("not a url").is_err());
        assert!(HttpPropSource::new("ftp://feed.example.com/props").is_err());
    }
}
