//! In-memory [`PresetStore`] double shared by the unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use breezehub_domain::error::{BreezeHubError, NotFoundError};
use breezehub_domain::id::{PresetId, ZoneId};
use breezehub_domain::preset::{PresetMode, PresetSettings, PresetSnapshot};
use breezehub_domain::zone::Zone;

use crate::ports::{LoadHints, PresetStore};

/// A valid snapshot with a fresh id.
pub(crate) fn snapshot() -> PresetSnapshot {
    PresetSnapshot {
        id: PresetId::new(),
        zone_id: ZoneId::new(),
        room: "Living room".to_string(),
        name: "Day".to_string(),
        index: 0,
        settings: PresetSettings {
            co2: 900,
            speed: 2,
            speed_min_set: 1,
            speed_max_set: 5,
            t_set: 19,
            mode: PresetMode::Auto,
            is_on: true,
            heater_enabled: false,
        },
    }
}

/// What the store was asked to do, in completion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Op {
    Load { force: bool },
    HintedLoad,
    Save(PresetSnapshot),
}

#[derive(Default)]
struct Inner {
    remote: HashMap<PresetId, PresetSnapshot>,
    order: Vec<PresetId>,
    ops: Vec<Op>,
    fail_loads: bool,
    fail_saves: bool,
    save_latency: Duration,
    load_latency: Duration,
    saves_in_flight: usize,
    max_saves_in_flight: usize,
    on_save: Option<fn(&mut PresetSnapshot)>,
}

#[derive(Default)]
pub(crate) struct MockPresetStore {
    inner: Mutex<Inner>,
}

impl MockPresetStore {
    pub(crate) fn shared(remote: PresetSnapshot) -> Arc<Self> {
        let store = Self::default();
        store.insert(remote);
        Arc::new(store)
    }

    pub(crate) fn insert(&self, snapshot: PresetSnapshot) {
        let mut inner = self.lock();
        inner.order.push(snapshot.id);
        inner.remote.insert(snapshot.id, snapshot);
    }

    /// The first preset inserted, as the remote currently holds it.
    pub(crate) fn remote_snapshot(&self) -> PresetSnapshot {
        let inner = self.lock();
        inner.remote[&inner.order[0]].clone()
    }

    pub(crate) fn ops(&self) -> Vec<Op> {
        self.lock().ops.clone()
    }

    pub(crate) fn saves(&self) -> Vec<PresetSnapshot> {
        self.lock()
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Save(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn max_concurrent_saves(&self) -> usize {
        self.lock().max_saves_in_flight
    }

    pub(crate) fn set_fail_loads(&self, fail: bool) {
        self.lock().fail_loads = fail;
    }

    pub(crate) fn set_fail_saves(&self, fail: bool) {
        self.lock().fail_saves = fail;
    }

    pub(crate) fn set_save_latency(&self, latency: Duration) {
        self.lock().save_latency = latency;
    }

    /// Delay every non-hinted load; the answer is read before the delay.
    pub(crate) fn set_load_latency(&self, latency: Duration) {
        self.lock().load_latency = latency;
    }

    /// Rewrite what the remote stores after each save, like a server clamping input.
    pub(crate) fn normalize_on_save(&self, hook: fn(&mut PresetSnapshot)) {
        self.lock().on_save = Some(hook);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn remote_error(msg: &str) -> BreezeHubError {
    BreezeHubError::Remote(Box::new(std::io::Error::other(msg.to_string())))
}

impl PresetStore for MockPresetStore {
    async fn list_presets(&self) -> Result<Vec<PresetSnapshot>, BreezeHubError> {
        let inner = self.lock();
        if inner.fail_loads {
            return Err(remote_error("list failed"));
        }
        Ok(inner.order.iter().map(|id| inner.remote[id].clone()).collect())
    }

    async fn list_zones(&self) -> Result<Vec<Zone>, BreezeHubError> {
        Ok(Vec::new())
    }

    async fn load(
        &self,
        id: PresetId,
        hints: &LoadHints,
        force: bool,
    ) -> Result<PresetSnapshot, BreezeHubError> {
        let (result, latency) = {
            let mut inner = self.lock();
            if !force && let Some(hinted) = hints.preset(id) {
                inner.ops.push(Op::HintedLoad);
                return Ok(hinted.clone());
            }
            inner.ops.push(Op::Load { force });
            let result: Result<PresetSnapshot, BreezeHubError> = if inner.fail_loads {
                Err(remote_error("load failed"))
            } else {
                inner.remote.get(&id).cloned().ok_or_else(|| {
                    NotFoundError {
                        entity: "Preset",
                        id: id.to_string(),
                    }
                    .into()
                })
            };
            (result, inner.load_latency)
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        result
    }

    async fn save(&self, snapshot: &PresetSnapshot) -> Result<(), BreezeHubError> {
        let latency = {
            let mut inner = self.lock();
            inner.saves_in_flight += 1;
            inner.max_saves_in_flight = inner.max_saves_in_flight.max(inner.saves_in_flight);
            inner.save_latency
        };
        tokio::time::sleep(latency).await;

        let mut inner = self.lock();
        inner.saves_in_flight -= 1;
        inner.ops.push(Op::Save(snapshot.clone()));
        if inner.fail_saves {
            return Err(remote_error("save rejected"));
        }
        let mut stored = snapshot.clone();
        if let Some(hook) = inner.on_save {
            hook(&mut stored);
        }
        inner.remote.insert(stored.id, stored);
        Ok(())
    }
}
