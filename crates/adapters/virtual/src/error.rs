//! Virtual store error types.

use breezehub_domain::error::{BreezeHubError, NotFoundError};
use breezehub_domain::id::PresetId;

/// Errors produced by the simulated remote service.
#[derive(Debug, thiserror::Error)]
pub enum VirtualStoreError {
    /// The service did not answer (fault injected).
    #[error("remote service unreachable")]
    Unreachable,

    /// The service refused the save (fault injected).
    #[error("remote service rejected preset {id}")]
    Rejected { id: PresetId },

    #[error("unknown preset {0}")]
    UnknownPreset(PresetId),
}

impl VirtualStoreError {
    /// Convert into a [`BreezeHubError`] for propagation across port
    /// boundaries.
    #[must_use]
    pub fn into_domain(self) -> BreezeHubError {
        match self {
            Self::UnknownPreset(id) => NotFoundError {
                entity: "Preset",
                id: id.to_string(),
            }
            .into(),
            other => BreezeHubError::Remote(Box::new(other)),
        }
    }
}

impl From<VirtualStoreError> for BreezeHubError {
    fn from(err: VirtualStoreError) -> Self {
        err.into_domain()
    }
}
