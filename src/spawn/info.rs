//! Planner output: one `SpawnInfo` per surviving spawn group

use glam::IVec2;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::Serialize;

use crate::asset::AssetInfo;

/// A resolved candidate; `info` borrows from the asset library
#[derive(Debug, Clone, Default, Serialize)]
pub struct SpawnCandidate<'lib> {
    /// Resolved asset name, empty for null slots
    pub name: String,
    pub display_name: String,
    pub weight: f64,
    #[serde(skip)]
    pub info: Option<&'lib AssetInfo>,
    pub is_null: bool,
}

/// Everything the placement layer needs to realize one spawn group
#[derive(Debug, Clone, Serialize)]
pub struct SpawnInfo<'lib> {
    pub name: String,
    /// Normalized method name
    pub position: String,
    pub spawn_id: String,
    pub priority: i32,
    pub quantity: i32,
    pub check_min_spacing: bool,
    pub grid_resolution: i32,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub link_area_name: String,

    pub exact_offset: IVec2,
    pub exact_origin_w: i32,
    pub exact_origin_h: i32,
    /// `(-1, -1)` when not authored
    pub exact_point: IVec2,

    pub perimeter_radius: i32,

    pub edge_inset_percent: i32,

    pub adjust_geometry_to_room: bool,

    pub candidates: Vec<SpawnCandidate<'lib>>,
}

impl Default for SpawnInfo<'_> {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: String::new(),
            spawn_id: String::new(),
            priority: 0,
            quantity: 0,
            check_min_spacing: false,
            grid_resolution: 0,
            link_area_name: String::new(),
            exact_offset: IVec2::ZERO,
            exact_origin_w: 0,
            exact_origin_h: 0,
            exact_point: IVec2::splat(-1),
            perimeter_radius: 0,
            edge_inset_percent: 100,
            adjust_geometry_to_room: false,
            candidates: Vec::new(),
        }
    }
}

impl<'lib> SpawnInfo<'lib> {
    pub fn has_candidates(&self) -> bool {
        !self.candidates.is_empty()
    }

    /// Draw one candidate by weight.
    ///
    /// Negative weights count as zero. When no weight is positive every
    /// candidate is equally likely. Null candidates can be drawn; they stand
    /// for an empty slot.
    pub fn select_candidate<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&SpawnCandidate<'lib>> {
        if self.candidates.is_empty() {
            return None;
        }
        let weights: Vec<f64> = self
            .candidates
            .iter()
            .map(|c| if c.weight.is_finite() { c.weight.max(0.0) } else { 0.0 })
            .collect();

        let idx = match WeightedIndex::new(&weights) {
            Ok(dist) => dist.sample(rng),
            Err(_) => rng.gen_range(0..self.candidates.len()),
        };
        self.candidates.get(idx)
    }
}
