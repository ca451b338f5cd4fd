//! # breezehub-app
//!
//! Application layer: the write-coalescing core and **port definitions**.
//!
//! ## Responsibilities
//! - Define the [`PresetStore`](ports::PresetStore) port that remote-service
//!   adapters implement
//! - Provide [`PresetProxy`](preset_proxy::PresetProxy): batches bursts of
//!   field edits into one delayed save and reconciles reads against
//!   in-flight writes
//! - Provide [`PresetRegistry`](preset_registry::PresetRegistry): the owned
//!   id → proxy map built once at startup and polled afterwards
//!
//! ## Dependency rule
//! Depends on `breezehub-domain` only (plus `tokio` for timers and tasks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod preset_proxy;
pub mod preset_registry;

#[cfg(test)]
pub(crate) mod testing;
