pub mod file;
pub mod http;
pub mod provider;

pub use file::JsonFilePropSource;
pub use http::HttpPropSource;
pub use provider::PropSource;

use anyhow::{bail, Result};
use tracing::warn;

use crate::models::Prop;

/// Decode a prop feed document.
///
/// Accepts a bare array or an object with a `props` array. Entries that do
/// not match the prop shape are logged and dropped so one bad row does not
/// discard the snapshot.
pub fn parse_props_payload(raw: &serde_json::Value) -> Result<Vec<Prop>> {
    let entries = match raw {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(obj) => match obj.get("props").and_then(|v| v.as_array()) {
            Some(items) => items,
            None => bail!("prop feed object has no `props` array"),
        },
        _ => bail!("prop feed must be a JSON array or an object with `props`"),
    };

    let props = entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| match serde_json::from_value::<Prop>(entry.clone()) {
            Ok(prop) => Some(prop),
            Err(e) => {
                warn!("Skipping malformed prop at index {}: {}", i, e);
                None
            }
        })
        .collect();
    Ok(props)
}
