//! Spawn groups and spawn planning

pub mod fields;
pub mod group_utils;
pub mod info;
pub mod model;
pub mod planner;
pub mod size_resolver;
pub mod source;
pub mod tag_resolver;

pub use info::{SpawnCandidate, SpawnInfo};
pub use model::{Candidate, MethodConfig, SpawnGroup, SpawnMethod};
pub use planner::{PlanOptions, SpawnPlanner};
pub use size_resolver::RoomRelativeSizeResolver;
pub use source::{PersistError, SourceContext, SourceRef};
pub use tag_resolver::{resolve_asset_from_tag, TagFilters, TagResolveError};
