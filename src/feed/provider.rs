use anyhow::Result;
use async_trait::async_trait;

use crate::models::Prop;

/// Trait that every prop feed must implement.
#[async_trait]
pub trait PropSource: Send + Sync {
    /// Return the current snapshot of props offered by this source.
    async fn fetch_props(&self) -> Result<Vec<Prop>>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
