//! Write-coalescing proxy around one remote zone preset.
//!
//! Several widgets may edit the same preset within one user interaction
//! (CO₂ target, speed, mode, heater, …). Each edit is followed by
//! [`PresetProxy::send`], which only (re-)arms a debounce timer; when the
//! timer finally fires, the accumulated snapshot goes out in a single save.
//!
//! Reads requested while a save is armed or in flight are not executed
//! against the remote service (they would clobber the pending edit with stale
//! data). They are recorded instead, and one forced read runs right after the
//! save completes.
//!
//! ```text
//!            send()                  timer fires              save done
//!   Idle ───────────▶ Armed ───────────────────▶ Saving ─────────────────▶ Idle
//!                     │  ▲ send(): re-arm            │ send(): re-arm        │
//!                     └──┘                           ▼                       ▼
//!                                                  Armed        forced load if deferred
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use breezehub_domain::error::BreezeHubError;
use breezehub_domain::id::PresetId;
use breezehub_domain::preset::{PresetMode, PresetSettings, PresetSnapshot, limits};
use breezehub_domain::time::{Timestamp, now};

use crate::ports::{LoadHints, PresetStore};

/// Quiet period after the last [`PresetProxy::send`] before the save fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(5);

/// Tuning for [`PresetProxy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyConfig {
    pub debounce: Duration,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// Observable scheduling phase of a [`PresetProxy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyPhase {
    /// Nothing pending.
    Idle,
    /// A save is scheduled but has not started.
    Armed,
    /// A save is in flight.
    Saving,
    /// Torn down; edits are no longer sent.
    Closed,
}

enum Phase {
    Idle,
    Armed {
        generation: u64,
        timer: JoinHandle<()>,
        load_deferred: bool,
    },
    Saving {
        generation: u64,
        load_deferred: bool,
    },
    Closed,
}

struct State {
    current: PresetSnapshot,
    valid: bool,
    phase: Phase,
    /// Bumped on every arm; a timer only fires if its generation is still
    /// current, and a read that saw an older generation is discarded.
    generation: u64,
    last_synced: Option<Timestamp>,
}

struct Shared<S> {
    id: PresetId,
    store: S,
    config: ProxyConfig,
    runtime: Handle,
    state: Mutex<State>,
    /// Held for the whole save + deferred read, so saves never overlap.
    save_gate: tokio::sync::Mutex<()>,
}

/// Debouncing, read-reconciling wrapper around a [`PresetStore`] entry.
///
/// Cloning yields another handle to the same proxy. Dropping the last handle
/// cancels a pending save, as does [`shutdown`](Self::shutdown).
pub struct PresetProxy<S> {
    shared: Arc<Shared<S>>,
}

impl<S> Clone for PresetProxy<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S> PresetProxy<S>
where
    S: PresetStore + Send + Sync + 'static,
{
    /// Wrap the preset described by `initial` and perform the first read.
    ///
    /// Must be called from within a tokio runtime; debounce timers are
    /// spawned on that runtime even when [`send`](Self::send) is later
    /// called from elsewhere. The proxy starts out invalid and becomes valid
    /// if the first read succeeds.
    pub async fn connect(
        store: S,
        initial: PresetSnapshot,
        hints: LoadHints,
        config: ProxyConfig,
    ) -> Self {
        let proxy = Self {
            shared: Arc::new(Shared {
                id: initial.id,
                store,
                config,
                runtime: Handle::current(),
                state: Mutex::new(State {
                    current: initial,
                    valid: false,
                    phase: Phase::Idle,
                    generation: 0,
                    last_synced: None,
                }),
                save_gate: tokio::sync::Mutex::new(()),
            }),
        };
        proxy.load(hints, false).await;
        proxy
    }

    /// Refresh from the store, or defer the read if a save is pending.
    ///
    /// Returns whether the proxy holds trustworthy data afterwards. A deferred
    /// read returns the current validity immediately and runs, forced, once
    /// the pending save completes.
    pub async fn load(&self, hints: LoadHints, force: bool) -> bool {
        self.shared.load(hints, force).await
    }

    /// Schedule a save of the current snapshot.
    ///
    /// Never blocks: arms (or re-arms) the debounce timer and returns. The
    /// outcome of the eventual save is only visible through later reads.
    /// Returns `false` when nothing was scheduled because the proxy is closed
    /// or holds no trustworthy data.
    pub fn send(&self) -> bool {
        let shared = &self.shared;
        let mut state = shared.lock_state();

        if !state.valid {
            tracing::warn!(preset = %shared.id, "refusing to save a preset without valid data");
            return false;
        }

        let load_deferred = match std::mem::replace(&mut state.phase, Phase::Idle) {
            Phase::Closed => {
                state.phase = Phase::Closed;
                tracing::debug!(preset = %shared.id, "send ignored, proxy closed");
                return false;
            }
            Phase::Idle => false,
            Phase::Armed {
                timer,
                load_deferred,
                ..
            } => {
                // May already be running; the generation check makes it a no-op.
                timer.abort();
                tracing::debug!(preset = %shared.id, "pending save re-armed");
                load_deferred
            }
            Phase::Saving { load_deferred, .. } => {
                tracing::debug!(preset = %shared.id, "save armed behind in-flight save");
                load_deferred
            }
        };

        state.generation = state.generation.wrapping_add(1);
        let generation = state.generation;
        let debounce = shared.config.debounce;
        let timer = shared
            .runtime
            .spawn(fire(Arc::downgrade(shared), generation, debounce));
        state.phase = Phase::Armed {
            generation,
            timer,
            load_deferred,
        };
        tracing::debug!(preset = %shared.id, ?debounce, "save armed");
        true
    }

    /// Cancel any pending save and stop accepting new ones.
    ///
    /// A save already in flight still completes, but its deferred read is
    /// skipped.
    pub fn shutdown(&self) {
        let mut state = self.shared.lock_state();
        match std::mem::replace(&mut state.phase, Phase::Closed) {
            Phase::Armed { timer, .. } => {
                timer.abort();
                tracing::info!(preset = %self.shared.id, "pending preset save cancelled");
            }
            Phase::Saving { .. } => {
                tracing::debug!(preset = %self.shared.id, "closing while a save is in flight");
            }
            Phase::Idle | Phase::Closed => {}
        }
    }
}

impl<S> PresetProxy<S> {
    #[must_use]
    pub fn id(&self) -> PresetId {
        self.shared.id
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.shared.lock_state().valid
    }

    #[must_use]
    pub fn phase(&self) -> ProxyPhase {
        match self.shared.lock_state().phase {
            Phase::Idle => ProxyPhase::Idle,
            Phase::Armed { .. } => ProxyPhase::Armed,
            Phase::Saving { .. } => ProxyPhase::Saving,
            Phase::Closed => ProxyPhase::Closed,
        }
    }

    /// When the last successful read landed.
    #[must_use]
    pub fn last_synced(&self) -> Option<Timestamp> {
        self.shared.lock_state().last_synced
    }

    /// The whole snapshot, including local edits, or `None` while invalid.
    #[must_use]
    pub fn snapshot(&self) -> Option<PresetSnapshot> {
        self.read(Clone::clone)
    }

    #[must_use]
    pub fn room(&self) -> Option<String> {
        self.read(|s| s.room.clone())
    }

    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.read(|s| s.name.clone())
    }

    #[must_use]
    pub fn index(&self) -> Option<u32> {
        self.read(|s| s.index)
    }

    #[must_use]
    pub fn co2(&self) -> Option<u16> {
        self.read(|s| s.settings.co2)
    }

    #[must_use]
    pub fn speed(&self) -> Option<u8> {
        self.read(|s| s.settings.speed)
    }

    #[must_use]
    pub fn speed_min(&self) -> Option<u8> {
        self.read(|s| s.settings.speed_min_set)
    }

    #[must_use]
    pub fn speed_max(&self) -> Option<u8> {
        self.read(|s| s.settings.speed_max_set)
    }

    #[must_use]
    pub fn target_temperature(&self) -> Option<i8> {
        self.read(|s| s.settings.t_set)
    }

    #[must_use]
    pub fn mode(&self) -> Option<PresetMode> {
        self.read(|s| s.settings.mode)
    }

    #[must_use]
    pub fn is_on(&self) -> Option<bool> {
        self.read(|s| s.settings.is_on)
    }

    #[must_use]
    pub fn heater_enabled(&self) -> Option<bool> {
        self.read(|s| s.settings.heater_enabled)
    }

    /// Set the CO₂ target (ppm). Takes effect on the next [`send`](Self::send).
    ///
    /// # Errors
    ///
    /// Returns [`BreezeHubError::Validation`] when out of range or not a
    /// multiple of 50 ppm, or
    /// [`BreezeHubError::Unavailable`] when the proxy holds no valid data.
    pub fn set_co2(&self, ppm: u16) -> Result<(), BreezeHubError> {
        limits::CO2.check(ppm)?;
        self.edit(|s| s.co2 = ppm)
    }

    /// # Errors
    ///
    /// See [`set_co2`](Self::set_co2).
    pub fn set_speed(&self, speed: u8) -> Result<(), BreezeHubError> {
        limits::SPEED.check(speed)?;
        self.edit(|s| s.speed = speed)
    }

    /// # Errors
    ///
    /// See [`set_co2`](Self::set_co2).
    pub fn set_speed_min(&self, speed: u8) -> Result<(), BreezeHubError> {
        limits::SPEED_MIN.check(speed)?;
        self.edit(|s| s.speed_min_set = speed)
    }

    /// # Errors
    ///
    /// See [`set_co2`](Self::set_co2).
    pub fn set_speed_max(&self, speed: u8) -> Result<(), BreezeHubError> {
        limits::SPEED_MAX.check(speed)?;
        self.edit(|s| s.speed_max_set = speed)
    }

    /// Set the target air temperature (°C).
    ///
    /// # Errors
    ///
    /// See [`set_co2`](Self::set_co2).
    pub fn set_target_temperature(&self, celsius: i8) -> Result<(), BreezeHubError> {
        limits::TARGET_TEMPERATURE.check(celsius)?;
        self.edit(|s| s.t_set = celsius)
    }

    /// # Errors
    ///
    /// Returns [`BreezeHubError::Unavailable`] when the proxy holds no valid data.
    pub fn set_mode(&self, mode: PresetMode) -> Result<(), BreezeHubError> {
        self.edit(|s| s.mode = mode)
    }

    /// # Errors
    ///
    /// Returns [`BreezeHubError::Unavailable`] when the proxy holds no valid data.
    pub fn set_power(&self, on: bool) -> Result<(), BreezeHubError> {
        self.edit(|s| s.is_on = on)
    }

    /// # Errors
    ///
    /// Returns [`BreezeHubError::Unavailable`] when the proxy holds no valid data.
    pub fn set_heater(&self, enabled: bool) -> Result<(), BreezeHubError> {
        self.edit(|s| s.heater_enabled = enabled)
    }

    fn read<T>(&self, field: impl FnOnce(&PresetSnapshot) -> T) -> Option<T> {
        let state = self.shared.lock_state();
        state.valid.then(|| field(&state.current))
    }

    fn edit(&self, apply: impl FnOnce(&mut PresetSettings)) -> Result<(), BreezeHubError> {
        let mut state = self.shared.lock_state();
        if !state.valid {
            return Err(BreezeHubError::Unavailable(self.shared.id));
        }
        apply(&mut state.current.settings);
        Ok(())
    }
}

impl<S> Shared<S> {
    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: PresetStore> Shared<S> {
    async fn load(&self, mut hints: LoadHints, mut force: bool) -> bool {
        loop {
            let started_at = {
                let mut guard = self.lock_state();
                let state = &mut *guard;
                match &mut state.phase {
                    Phase::Idle => state.generation,
                    Phase::Armed { load_deferred, .. } | Phase::Saving { load_deferred, .. } => {
                        *load_deferred = true;
                        tracing::debug!(preset = %self.id, "load deferred until pending save completes");
                        return state.valid;
                    }
                    Phase::Closed => return state.valid,
                }
            };

            let result = self
                .store
                .load(self.id, &hints, force)
                .await
                .and_then(|snapshot| {
                    snapshot.validate()?;
                    Ok(snapshot)
                });

            let mut guard = self.lock_state();
            let state = &mut *guard;
            match &mut state.phase {
                Phase::Idle => {}
                Phase::Armed { load_deferred, .. } | Phase::Saving { load_deferred, .. } => {
                    // An edit was sent while reading; this result predates it.
                    *load_deferred = true;
                    return state.valid;
                }
                Phase::Closed => return state.valid,
            }

            if state.generation != started_at {
                // A whole save cycle ran while reading; read back what it wrote.
                tracing::debug!(preset = %self.id, "stale load discarded, reading again");
                hints = LoadHints::default();
                force = true;
                continue;
            }

            match result {
                Ok(snapshot) => {
                    state.current = snapshot;
                    state.valid = true;
                    state.last_synced = Some(now());
                }
                Err(err) => {
                    tracing::warn!(preset = %self.id, %err, "preset load failed");
                    state.valid = false;
                }
            }
            return state.valid;
        }
    }

    async fn flush(&self, generation: u64) {
        let _gate = self.save_gate.lock().await;

        let snapshot = {
            let mut state = self.lock_state();
            let load_deferred = match &state.phase {
                Phase::Armed {
                    generation: armed,
                    load_deferred,
                    ..
                } if *armed == generation => *load_deferred,
                _ => {
                    tracing::trace!(preset = %self.id, generation, "stale save timer ignored");
                    return;
                }
            };
            state.phase = Phase::Saving {
                generation,
                load_deferred,
            };
            state.current.clone()
        };

        match self.store.save(&snapshot).await {
            Ok(()) => tracing::debug!(preset = %self.id, "preset saved"),
            Err(err) => tracing::warn!(preset = %self.id, %err, "preset save failed"),
        }

        let reload = {
            let mut state = self.lock_state();
            let finished = match &state.phase {
                Phase::Saving {
                    generation: saving,
                    load_deferred,
                } if *saving == generation => Some(*load_deferred),
                // Re-armed or closed while saving; the next cycle owns the deferred read.
                _ => None,
            };
            if let Some(load_deferred) = finished {
                state.phase = Phase::Idle;
                load_deferred
            } else {
                false
            }
        };

        if reload {
            self.load(LoadHints::default(), true).await;
        }
    }
}

impl<S> Drop for Shared<S> {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Phase::Armed { timer, .. } = &state.phase {
            timer.abort();
        }
    }
}

async fn fire<S>(shared: Weak<Shared<S>>, generation: u64, debounce: Duration)
where
    S: PresetStore + Send + Sync + 'static,
{
    tokio::time::sleep(debounce).await;
    if let Some(shared) = shared.upgrade() {
        shared.flush(generation).await;
    }
}
