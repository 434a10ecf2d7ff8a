//! Spawn Planner - room spawn-group planning
//!
//! Reads authored spawn groups from one or more room/map records, repairs
//! them in place, and emits a priority-ordered queue of [`SpawnInfo`]
//! requests for the placement layer.

pub mod asset;
pub mod core;
pub mod spawn;

pub use crate::asset::{AssetInfo, AssetLibrary};
pub use crate::core::{Area, Bounds, PlannerConfig, PlannerError, Result};
pub use crate::spawn::{SourceContext, SpawnInfo, SpawnPlanner};
