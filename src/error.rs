use thiserror::Error;

/// Caller contract violations raised by the slip core.
#[derive(Debug, Error, PartialEq)]
pub enum SlipError {
    #[error("cannot price a slip with no legs")]
    NoLegs,

    #[error("bankroll must be a positive, finite amount (got {0})")]
    InvalidBankroll(f64),

    #[error("unknown risk profile '{0}' (expected conservative, balanced or aggressive)")]
    UnknownProfile(String),
}
