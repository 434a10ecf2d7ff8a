//! Planner configuration with documented constants
//!
//! The authoring tools and the planner share a handful of limits (edge inset
//! range, default perimeter radius, spawn id shape). They are collected here
//! so a project can override them from a TOML file.

use serde::Deserialize;
use std::path::Path;

use crate::core::error::{PlannerError, Result};

/// Configuration for spawn planning and spawn-group sanitizing
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    // === SPAWN IDS ===
    /// Prefix of generated spawn ids
    pub spawn_id_prefix: String,

    /// Number of lowercase hex digits after the prefix
    pub spawn_id_hex_len: usize,

    // === EDGE METHOD ===
    /// Lower bound for `edge_inset_percent`
    pub edge_inset_min: i32,

    /// Upper bound for `edge_inset_percent`
    ///
    /// 100 places assets on the area boundary, 0 collapses them onto the
    /// center, 200 pushes them out to twice the boundary distance.
    pub edge_inset_max: i32,

    /// Inset used when an Edge group does not author one
    pub edge_inset_default: i32,

    // === PERIMETER METHOD ===
    /// Radius written into Perimeter entries that have none
    pub perimeter_radius_default: i32,

    // === GRID ===
    /// Upper clamp for an entry's `resolution` (a power-of-two exponent)
    pub max_grid_resolution: i32,

    // === RANDOMNESS ===
    /// Fixed seed for the planner RNG; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            spawn_id_prefix: "spn-".to_string(),
            spawn_id_hex_len: 12,

            edge_inset_min: 0,
            edge_inset_max: 200,
            edge_inset_default: 100,

            perimeter_radius_default: 200,

            max_grid_resolution: 30,

            seed: None,
        }
    }
}

impl PlannerConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PlannerConfig =
            toml::from_str(content).map_err(|e| PlannerError::Config(e.to_string()))?;
        config.validate().map_err(PlannerError::Config)?;
        Ok(config)
    }

    /// Load a config from a TOML file on disk
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.spawn_id_hex_len == 0 {
            return Err("spawn_id_hex_len must be at least 1".into());
        }

        if self.edge_inset_min > self.edge_inset_max {
            return Err(format!(
                "edge_inset_min ({}) should be <= edge_inset_max ({})",
                self.edge_inset_min, self.edge_inset_max
            ));
        }

        if self.edge_inset_default < self.edge_inset_min
            || self.edge_inset_default > self.edge_inset_max
        {
            return Err(format!(
                "edge_inset_default ({}) outside [{}, {}]",
                self.edge_inset_default, self.edge_inset_min, self.edge_inset_max
            ));
        }

        if self.max_grid_resolution < 0 {
            return Err("max_grid_resolution must be non-negative".into());
        }

        Ok(())
    }

    /// Clamp an inset to the configured Edge range
    pub fn clamp_edge_inset(&self, inset: i32) -> i32 {
        inset.clamp(self.edge_inset_min, self.edge_inset_max)
    }

    /// Clamp a grid resolution exponent to `[0, max_grid_resolution]`
    pub fn clamp_resolution(&self, resolution: i32) -> i32 {
        resolution.clamp(0, self.max_grid_resolution)
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<PlannerConfig> = OnceLock::new();

/// Get the global planner config (initializes with defaults if not set)
pub fn config() -> &'static PlannerConfig {
    CONFIG.get_or_init(PlannerConfig::default)
}

/// Set the global planner config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: PlannerConfig) -> std::result::Result<(), PlannerConfig> {
    CONFIG.set(config)
}
