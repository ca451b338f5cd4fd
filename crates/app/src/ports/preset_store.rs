//! Preset store port: reads and writes zone presets on the remote service.

use std::future::Future;
use std::sync::Arc;

use breezehub_domain::error::BreezeHubError;
use breezehub_domain::id::{PresetId, ZoneId};
use breezehub_domain::preset::PresetSnapshot;
use breezehub_domain::zone::Zone;

/// Bulk data a caller already holds, passed along so a load can skip a
/// round trip to the remote service.
///
/// Cloning is cheap: the lists are shared.
#[derive(Debug, Clone, Default)]
pub struct LoadHints {
    pub presets: Option<Arc<[PresetSnapshot]>>,
    pub zones: Option<Arc<[Zone]>>,
}

impl LoadHints {
    #[must_use]
    pub fn bulk(presets: Arc<[PresetSnapshot]>, zones: Arc<[Zone]>) -> Self {
        Self {
            presets: Some(presets),
            zones: Some(zones),
        }
    }

    /// The hinted snapshot for `id`, if the caller supplied one.
    #[must_use]
    pub fn preset(&self, id: PresetId) -> Option<&PresetSnapshot> {
        self.presets.as_deref()?.iter().find(|p| p.id == id)
    }

    /// The hinted zone for `id`, if the caller supplied one.
    #[must_use]
    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.as_deref()?.iter().find(|z| z.id == id)
    }
}

/// Authoritative storage for zone presets, usually a remote HTTP service.
///
/// One handle is shared by every proxy of an integration. Implementations
/// must tolerate sequential use from several tasks; the core never issues
/// two saves for the same preset concurrently.
pub trait PresetStore {
    /// List every preset the account can see.
    fn list_presets(
        &self,
    ) -> impl Future<Output = Result<Vec<PresetSnapshot>, BreezeHubError>> + Send;

    /// List every zone the account can see.
    fn list_zones(&self) -> impl Future<Output = Result<Vec<Zone>, BreezeHubError>> + Send;

    /// Read one preset.
    ///
    /// Without `force` an implementation may answer from `hints` or from its
    /// own cache. With `force` it must ask the remote service.
    fn load(
        &self,
        id: PresetId,
        hints: &LoadHints,
        force: bool,
    ) -> impl Future<Output = Result<PresetSnapshot, BreezeHubError>> + Send;

    /// Push the snapshot's settings to the remote service.
    fn save(
        &self,
        snapshot: &PresetSnapshot,
    ) -> impl Future<Output = Result<(), BreezeHubError>> + Send;
}

impl<T: PresetStore + Send + Sync> PresetStore for Arc<T> {
    fn list_presets(
        &self,
    ) -> impl Future<Output = Result<Vec<PresetSnapshot>, BreezeHubError>> + Send {
        (**self).list_presets()
    }

    fn list_zones(&self) -> impl Future<Output = Result<Vec<Zone>, BreezeHubError>> + Send {
        (**self).list_zones()
    }

    fn load(
        &self,
        id: PresetId,
        hints: &LoadHints,
        force: bool,
    ) -> impl Future<Output = Result<PresetSnapshot, BreezeHubError>> + Send {
        (**self).load(id, hints, force)
    }

    fn save(
        &self,
        snapshot: &PresetSnapshot,
    ) -> impl Future<Output = Result<(), BreezeHubError>> + Send {
        (**self).save(snapshot)
    }
}
