//! Single-flight cache of completed forecast results

use crate::assemble::ForecastResult;
use crate::config::{ForecastConfig, Growth, SeasonalityMode};
use crate::contract::ForecastRequest;
use crate::data::SeriesStore;
use crate::error::Result;
use crate::pipeline::{run_forecast, FitBudget};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Condvar, Mutex};
use tracing::debug;

enum Slot {
    InFlight,
    Ready(Arc<ForecastResult>),
}

struct CacheState {
    snapshot: Option<u64>,
    slots: HashMap<u64, Slot>,
}

/// Result cache keyed by a fingerprint of the store snapshot and the
/// validated configuration
///
/// At most one fit runs per fingerprint: concurrent identical requests wait
/// for the in-flight fit and share its result. Entries are evicted wholesale
/// when a store with a different snapshot id is seen, and errors are never
/// cached, so a failed fit is retried by the next caller.
pub struct ForecastCache {
    state: Mutex<CacheState>,
    ready: Condvar,
}

impl ForecastCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CacheState {
                snapshot: None,
                slots: HashMap::new(),
            }),
            ready: Condvar::new(),
        }
    }

    /// Number of completed results currently cached
    pub fn len(&self) -> usize {
        let state = self.state.lock().unwrap();
        state
            .slots
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    /// Check whether the cache holds no completed results
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the cached result for this request, or compute and cache it
    ///
    /// Validation failures return immediately and are never cached.
    pub fn get_or_compute(
        &self,
        store: &SeriesStore,
        request: &ForecastRequest,
        budget: &FitBudget,
    ) -> Result<Arc<ForecastResult>> {
        let config = ForecastConfig::from_request(request, store)?;
        let key = fingerprint(store.snapshot_id(), &config);

        {
            let mut state = self.state.lock().unwrap();
            if state.snapshot != Some(store.snapshot_id()) {
                if !state.slots.is_empty() {
                    debug!(
                        entries = state.slots.len(),
                        "store snapshot changed, clearing forecast cache"
                    );
                }
                state.slots.clear();
                state.snapshot = Some(store.snapshot_id());
            }

            loop {
                match state.slots.get(&key) {
                    Some(Slot::Ready(result)) => {
                        debug!(key, "forecast cache hit");
                        return Ok(Arc::clone(result));
                    }
                    Some(Slot::InFlight) => {
                        debug!(key, "waiting on in-flight fit");
                        state = self.ready.wait(state).unwrap();
                    }
                    None => {
                        state.slots.insert(key, Slot::InFlight);
                        break;
                    }
                }
            }
        }

        let outcome = run_forecast(store, request, budget);

        let mut state = self.state.lock().unwrap();
        let current_snapshot = state.snapshot == Some(store.snapshot_id());
        match outcome {
            Ok(result) => {
                let shared = Arc::new(result);
                if current_snapshot {
                    state.slots.insert(key, Slot::Ready(Arc::clone(&shared)));
                }
                self.ready.notify_all();
                Ok(shared)
            }
            Err(error) => {
                if current_snapshot {
                    state.slots.remove(&key);
                }
                self.ready.notify_all();
                Err(error)
            }
        }
    }
}

impl Default for ForecastCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonical cache key: snapshot identity plus every configuration field,
/// with regressor names sorted so selection order does not split entries
fn fingerprint(snapshot: u64, config: &ForecastConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    snapshot.hash(&mut hasher);

    let growth: u8 = match config.growth {
        Growth::Linear => 0,
        Growth::Logistic => 1,
    };
    let mode: u8 = match config.seasonality_mode {
        SeasonalityMode::Additive => 0,
        SeasonalityMode::Multiplicative => 1,
    };
    growth.hash(&mut hasher);
    mode.hash(&mut hasher);
    config.yearly_seasonality.hash(&mut hasher);
    config.changepoint_prior_scale.to_bits().hash(&mut hasher);
    config.seasonality_prior_scale.to_bits().hash(&mut hasher);
    config.regressor_prior_scale.to_bits().hash(&mut hasher);
    config.interval_width.to_bits().hash(&mut hasher);
    (config.horizon_periods as u64).hash(&mut hasher);

    let mut names: Vec<&str> = config
        .extra_regressor_names
        .iter()
        .map(String::as_str)
        .collect();
    names.sort_unstable();
    for name in names {
        name.hash(&mut hasher);
    }

    hasher.finish()
}
