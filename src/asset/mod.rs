//! Asset catalog and asset-runtime state the planner talks to

pub mod flip;
pub mod library;

pub use flip::{FlipOverride, FlipOverrideSink, FlipOverrides};
pub use library::{AssetInfo, AssetLibrary, LibraryError};
