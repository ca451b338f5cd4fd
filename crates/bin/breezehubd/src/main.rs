//! # breezehubd: breezehub daemon
//!
//! Composition root that wires the preset registry to a remote store and
//! keeps it in sync.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialise logging
//! - Construct the remote store adapter
//! - Discover presets and wrap each in a write-coalescing proxy
//! - Poll the remote service on a fixed interval
//! - Handle graceful shutdown (SIGINT), cancelling pending saves
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use std::sync::Arc;

use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

use breezehub_adapter_virtual::VirtualPresetStore;
use breezehub_app::preset_registry::PresetRegistry;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Remote store
    let store = Arc::new(VirtualPresetStore::from_config(config.virtual_store.clone()));

    // Presets
    let registry = PresetRegistry::discover(store, config.proxy_config()).await?;
    for proxy in registry.iter() {
        if let Some(snapshot) = proxy.snapshot() {
            tracing::info!(
                preset = %proxy.id(),
                name = %snapshot.display_name(),
                mode = %snapshot.settings.mode,
                co2 = snapshot.settings.co2,
                "preset available"
            );
        }
    }

    let mut ticker = tokio::time::interval(config.poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; discovery already read everything.
    ticker.tick().await;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    tracing::info!(
        presets = registry.len(),
        interval = ?config.poll_interval(),
        "breezehubd running"
    );

    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(err) = result {
                    tracing::error!(%err, "failed to listen for shutdown signal");
                }
                break;
            }
            _ = ticker.tick() => {
                let valid = registry.poll().await;
                if valid < registry.len() {
                    tracing::warn!(valid, total = registry.len(), "some presets are unavailable");
                }
            }
        }
    }

    registry.shutdown();
    tracing::info!("breezehubd stopped");
    Ok(())
}
