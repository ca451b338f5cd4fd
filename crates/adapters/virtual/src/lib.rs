//! # breezehub-adapter-virtual
//!
//! In-memory stand-in for the breezer vendor's cloud API, implementing the
//! [`PresetStore`] port.
//!
//! ## Behaviour
//!
//! | Aspect | Simulation |
//! |--------|------------|
//! | Latency | every call sleeps for `latency_ms` |
//! | Bulk cache | presets and zones are re-fetched at most every `min_update_interval_secs` unless forced |
//! | Saves | update the authoritative copy only; the cache stays stale until the next fetch |
//! | Faults | the service can be made unreachable, or made to reject saves |
//!
//! ## Dependency rule
//!
//! Depends on `breezehub-app` (port traits) and `breezehub-domain` only.

mod config;
mod demo;
mod error;

pub use config::VirtualConfig;
pub use error::VirtualStoreError;

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;

use breezehub_app::ports::{LoadHints, PresetStore};
use breezehub_domain::error::BreezeHubError;
use breezehub_domain::id::PresetId;
use breezehub_domain::preset::{PresetSettings, PresetSnapshot};
use breezehub_domain::zone::Zone;

/// Simulated remote preset service.
pub struct VirtualPresetStore {
    config: VirtualConfig,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    presets: Vec<PresetSnapshot>,
    zones: Vec<Zone>,
    cache: Option<Cache>,
    unreachable: bool,
    reject_saves: bool,
    fetches: usize,
    journal: Vec<PresetSnapshot>,
}

#[derive(Clone)]
struct Cache {
    presets: Vec<PresetSnapshot>,
    zones: Vec<Zone>,
    fetched_at: Instant,
}

impl VirtualPresetStore {
    /// Serve the given account data.
    #[must_use]
    pub fn new(config: VirtualConfig, presets: Vec<PresetSnapshot>, zones: Vec<Zone>) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner {
                presets,
                zones,
                ..Inner::default()
            }),
        }
    }

    /// Serve the seed data from `config`, or the demo account when it has none.
    #[must_use]
    pub fn from_config(mut config: VirtualConfig) -> Self {
        let mut presets = std::mem::take(&mut config.presets);
        let mut zones = std::mem::take(&mut config.zones);
        if presets.is_empty() && zones.is_empty() {
            presets = demo::presets();
            zones = demo::zones();
        }
        Self::new(config, presets, zones)
    }

    /// Make every call fail as if the service were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.lock().unreachable = unreachable;
    }

    /// Make saves fail while reads keep working.
    pub fn set_reject_saves(&self, reject: bool) {
        self.lock().reject_saves = reject;
    }

    /// Change a preset behind the integration's back, as another client would.
    ///
    /// Returns `false` if the preset does not exist.
    pub fn edit_remote(&self, id: PresetId, edit: impl FnOnce(&mut PresetSettings)) -> bool {
        let mut inner = self.lock();
        match inner.presets.iter_mut().find(|p| p.id == id) {
            Some(preset) => {
                edit(&mut preset.settings);
                true
            }
            None => false,
        }
    }

    /// The authoritative copy of a preset.
    #[must_use]
    pub fn remote_preset(&self, id: PresetId) -> Option<PresetSnapshot> {
        self.lock().presets.iter().find(|p| p.id == id).cloned()
    }

    /// Every snapshot accepted by [`save`](PresetStore::save), oldest first.
    #[must_use]
    pub fn saved(&self) -> Vec<PresetSnapshot> {
        self.lock().journal.clone()
    }

    #[must_use]
    pub fn save_count(&self) -> usize {
        self.lock().journal.len()
    }

    /// How many times the bulk data was actually fetched (cache misses).
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.lock().fetches
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn bulk(&self, force: bool) -> Result<Cache, VirtualStoreError> {
        if !force {
            let inner = self.lock();
            if let Some(cache) = &inner.cache
                && cache.fetched_at.elapsed() < self.config.min_update_interval()
            {
                return Ok(cache.clone());
            }
        }

        tokio::time::sleep(self.config.latency()).await;

        let mut inner = self.lock();
        if inner.unreachable {
            return Err(VirtualStoreError::Unreachable);
        }
        let cache = Cache {
            presets: inner.presets.clone(),
            zones: inner.zones.clone(),
            fetched_at: Instant::now(),
        };
        inner.fetches += 1;
        inner.cache = Some(cache.clone());
        tracing::debug!(force, presets = cache.presets.len(), "remote presets fetched");
        Ok(cache)
    }
}

impl PresetStore for VirtualPresetStore {
    async fn list_presets(&self) -> Result<Vec<PresetSnapshot>, BreezeHubError> {
        Ok(self.bulk(false).await?.presets)
    }

    async fn list_zones(&self) -> Result<Vec<Zone>, BreezeHubError> {
        Ok(self.bulk(false).await?.zones)
    }

    async fn load(
        &self,
        id: PresetId,
        hints: &LoadHints,
        force: bool,
    ) -> Result<PresetSnapshot, BreezeHubError> {
        let hinted = if force { None } else { hints.preset(id).cloned() };
        let (mut snapshot, zones) = match hinted {
            Some(snapshot) => (snapshot, Vec::new()),
            None => {
                let cache = self.bulk(force).await?;
                let snapshot = cache
                    .presets
                    .into_iter()
                    .find(|p| p.id == id)
                    .ok_or(VirtualStoreError::UnknownPreset(id))?;
                (snapshot, cache.zones)
            }
        };

        let zone = hints
            .zone(snapshot.zone_id)
            .or_else(|| zones.iter().find(|z| z.id == snapshot.zone_id));
        if let Some(zone) = zone {
            snapshot.room.clone_from(&zone.name);
        }
        Ok(snapshot)
    }

    async fn save(&self, snapshot: &PresetSnapshot) -> Result<(), BreezeHubError> {
        tokio::time::sleep(self.config.latency()).await;

        let mut inner = self.lock();
        if inner.unreachable {
            return Err(VirtualStoreError::Unreachable.into());
        }
        if inner.reject_saves {
            return Err(VirtualStoreError::Rejected { id: snapshot.id }.into());
        }
        let stored = inner
            .presets
            .iter_mut()
            .find(|p| p.id == snapshot.id)
            .ok_or(VirtualStoreError::UnknownPreset(snapshot.id))?;
        stored.settings = snapshot.settings;
        inner.journal.push(snapshot.clone());
        tracing::debug!(preset = %snapshot.id, "remote preset saved");
        Ok(())
    }
}
