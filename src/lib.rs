//! Correlation-aware player-prop parlay builder.
//!
//! The [`slip`] module is the pure core: correlation detection, greedy slip
//! selection per risk profile, and fractional-Kelly stake sizing. The other
//! modules wrap it with prop feeds, SQLite storage and an HTTP API.

pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod feed;
pub mod models;
pub mod slip;

pub use error::SlipError;
pub use models::{CorrelationWarning, Prop, Slip};
