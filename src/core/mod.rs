pub mod config;
pub mod error;
pub mod types;

pub use config::{config, set_config, PlannerConfig};
pub use error::{PlannerError, Result};
pub use types::{Area, AreaBounds, Bounds};
