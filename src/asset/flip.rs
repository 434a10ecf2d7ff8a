//! Per-spawn-group flip overrides.
//!
//! Spawned asset instances normally pick a random horizontal flip. A spawn
//! group may pin that choice; the planner records the pin here, keyed by the
//! group's spawn id, and the asset runtime reads it back at spawn time.

use ahash::AHashMap;
use std::sync::{Mutex, OnceLock};

/// Flip override for one spawn id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlipOverride {
    /// When false the runtime keeps choosing a random flip
    pub explicit_flip: bool,
    /// Flip state used when `explicit_flip` is set
    pub force_flipped: bool,
}

/// Receiver of flip overrides registered during planning
pub trait FlipOverrideSink {
    fn set_flip_override(&self, spawn_id: &str, explicit_flip: bool, force_flipped: bool);
}

/// Mutex-guarded flip override registry
#[derive(Debug, Default)]
pub struct FlipOverrides {
    overrides: Mutex<AHashMap<String, FlipOverride>>,
}

static GLOBAL_FLIPS: OnceLock<FlipOverrides> = OnceLock::new();

impl FlipOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry read by the asset runtime
    pub fn global() -> &'static FlipOverrides {
        GLOBAL_FLIPS.get_or_init(FlipOverrides::new)
    }

    pub fn get(&self, spawn_id: &str) -> Option<FlipOverride> {
        self.lock().get(spawn_id).copied()
    }

    pub fn clear(&self, spawn_id: &str) {
        if spawn_id.is_empty() {
            return;
        }
        self.lock().remove(spawn_id);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AHashMap<String, FlipOverride>> {
        // A panic while holding the lock leaves the map itself intact.
        self.overrides.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl FlipOverrideSink for FlipOverrides {
    fn set_flip_override(&self, spawn_id: &str, explicit_flip: bool, force_flipped: bool) {
        if spawn_id.is_empty() {
            return;
        }
        self.lock().insert(
            spawn_id.to_string(),
            FlipOverride { explicit_flip, force_flipped },
        );
    }
}
