//! Preset registry: the owned id → proxy map of one integration instance.
//!
//! Built once at startup from a single bulk read; proxies live as long as the
//! registry and are torn down together.

use std::collections::BTreeMap;
use std::sync::Arc;

use breezehub_domain::error::BreezeHubError;
use breezehub_domain::id::PresetId;
use breezehub_domain::preset::PresetSnapshot;
use breezehub_domain::zone::Zone;

use crate::ports::{LoadHints, PresetStore};
use crate::preset_proxy::{PresetProxy, ProxyConfig};

/// Every usable preset of an account, each behind its own [`PresetProxy`].
pub struct PresetRegistry<S> {
    store: S,
    proxies: BTreeMap<PresetId, PresetProxy<S>>,
}

impl<S> PresetRegistry<S>
where
    S: PresetStore + Clone + Send + Sync + 'static,
{
    /// List presets and zones once, then wrap every valid preset.
    ///
    /// Presets whose data fails validation are skipped. The bulk lists are
    /// handed to each proxy's first read so no per-preset round trip is made.
    ///
    /// # Errors
    ///
    /// Returns the store error if either bulk listing fails.
    pub async fn discover(store: S, config: ProxyConfig) -> Result<Self, BreezeHubError> {
        let hints = bulk_hints(&store).await?;
        let mut proxies = BTreeMap::new();

        for snapshot in hints.presets.iter().flat_map(|p| p.iter()) {
            if let Err(err) = snapshot.validate() {
                tracing::info!(preset = %snapshot.id, %err, "skipped preset with invalid data");
                continue;
            }
            let proxy =
                PresetProxy::connect(store.clone(), snapshot.clone(), hints.clone(), config).await;
            tracing::debug!(
                preset = %snapshot.id,
                name = %snapshot.display_name(),
                valid = proxy.is_valid(),
                "preset registered"
            );
            proxies.insert(snapshot.id, proxy);
        }

        tracing::info!(count = proxies.len(), "preset discovery complete");
        Ok(Self { store, proxies })
    }

    /// Refresh every proxy from one bulk read.
    ///
    /// Proxies with a pending save defer their read until it lands. When the
    /// bulk read fails, each proxy reads on its own instead, so a remote that
    /// stays unreachable leaves them unavailable rather than stale. Returns
    /// how many proxies hold valid data afterwards.
    pub async fn poll(&self) -> usize {
        let hints = match bulk_hints(&self.store).await {
            Ok(hints) => hints,
            Err(err) => {
                tracing::warn!(%err, "bulk preset read failed, reading presets one by one");
                LoadHints::default()
            }
        };
        let mut valid = 0;
        for proxy in self.proxies.values() {
            if proxy.load(hints.clone(), false).await {
                valid += 1;
            }
        }
        tracing::debug!(valid, total = self.proxies.len(), "presets polled");
        valid
    }

    /// Cancel every pending save and close all proxies.
    pub fn shutdown(&self) {
        for proxy in self.proxies.values() {
            proxy.shutdown();
        }
        tracing::info!(count = self.proxies.len(), "preset registry shut down");
    }
}

impl<S> PresetRegistry<S> {
    #[must_use]
    pub fn get(&self, id: PresetId) -> Option<&PresetProxy<S>> {
        self.proxies.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PresetProxy<S>> {
        self.proxies.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}

async fn bulk_hints<S: PresetStore>(store: &S) -> Result<LoadHints, BreezeHubError> {
    let presets: Arc<[PresetSnapshot]> = store.list_presets().await?.into();
    let zones: Arc<[Zone]> = store.list_zones().await?.into();
    Ok(LoadHints::bulk(presets, zones))
}
