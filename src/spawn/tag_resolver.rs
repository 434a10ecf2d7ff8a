//! Resolve `#tag` candidates to a concrete asset.
//!
//! A tag candidate stands for "any asset carrying this tag". Siblings in the
//! same group narrow the choice: zero-weight candidates ban their tag or
//! asset, and an asset whose anti-tags name another positive tag candidate
//! of the group is excluded.

use ahash::AHashSet;
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::asset::{AssetInfo, AssetLibrary};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagResolveError {
    #[error("Empty tag provided for resolution")]
    EmptyTag,
    #[error("No assets found for tag: {0}")]
    NoMatch(String),
}

/// Exclusion sets derived from a group's other candidates
#[derive(Debug, Clone, Default)]
pub struct TagFilters {
    /// Tags of zero-weight tag candidates
    pub banned_tags: AHashSet<String>,
    /// Names of zero-weight direct candidates
    pub banned_assets: AHashSet<String>,
    /// Tags of positive-weight tag candidates
    pub candidate_tags: AHashSet<String>,
}

impl TagFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `info` may stand in for `tag` under these filters
    pub fn admits(&self, name: &str, info: &AssetInfo, tag: &str) -> bool {
        if !info.has_tag(tag) {
            return false;
        }
        if self.banned_assets.contains(name) {
            return false;
        }
        let banned_tag = self
            .banned_tags
            .iter()
            .any(|blocked| !blocked.is_empty() && blocked != tag && info.has_tag(blocked));
        if banned_tag {
            return false;
        }
        !info
            .anti_tags()
            .iter()
            .any(|anti| anti != tag && self.candidate_tags.contains(anti))
    }
}

/// All library assets admissible for `tag`, in library order
pub fn matching_assets<'lib>(
    library: &'lib AssetLibrary,
    tag: &str,
    filters: &TagFilters,
) -> Vec<&'lib str> {
    library
        .all()
        .filter(|(name, info)| filters.admits(name, info, tag))
        .map(|(name, _)| name)
        .collect()
}

/// Pick one admissible asset for `tag` uniformly at random
pub fn resolve_asset_from_tag<'lib, R: Rng + ?Sized>(
    library: &'lib AssetLibrary,
    tag: &str,
    filters: &TagFilters,
    rng: &mut R,
) -> Result<&'lib str, TagResolveError> {
    if tag.is_empty() {
        return Err(TagResolveError::EmptyTag);
    }
    let matches = matching_assets(library, tag, filters);
    matches
        .choose(rng)
        .copied()
        .ok_or_else(|| TagResolveError::NoMatch(tag.to_string()))
}
