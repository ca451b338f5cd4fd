//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`BreezeHubError`] via `#[from]` or an explicit `into_domain`.

use crate::id::PresetId;

/// Top-level error crossing port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum BreezeHubError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The preset has no trustworthy data (last read failed or never succeeded).
    #[error("preset {0} is unavailable")]
    Unavailable(PresetId),

    /// The remote service failed (transport, rejection, …).
    #[error("remote service error")]
    Remote(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A value broke a domain invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i32,
        min: i32,
        max: i32,
    },

    #[error("{field} must be a multiple of {step} from its minimum, got {value}")]
    OffStep {
        field: &'static str,
        value: i32,
        step: i32,
    },

    #[error("unknown preset mode {0:?}")]
    UnknownMode(String),
}

/// Lookup by identifier yielded nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
