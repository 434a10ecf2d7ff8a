//! Asset library: the catalog of spawnable assets and their tags.
//!
//! The planner only needs lookups by name, ordered enumeration and tag
//! queries, so an `AssetInfo` here carries identity and tag data. Assets are
//! loaded from JSON manifests, either a bare array, an `{"assets": [...]}`
//! wrapper, or an object keyed by asset name.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading an asset library
#[derive(Debug, Error)]
pub enum LibraryError {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing failed
    #[error("JSON parse error in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// An asset entry has no name
    #[error("Asset entry without a name in {0}")]
    MissingName(String),
}

/// Descriptor of one spawnable asset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    anti_tags: Vec<String>,
    #[serde(skip)]
    tag_lookup: AHashSet<String>,
}

impl AssetInfo {
    pub fn new<T, A>(name: impl Into<String>, tags: T, anti_tags: A) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        let mut info = Self {
            name: name.into(),
            tags: tags.into_iter().map(Into::into).collect(),
            anti_tags: anti_tags.into_iter().map(Into::into).collect(),
            tag_lookup: AHashSet::new(),
        };
        info.rebuild_tag_cache();
        info
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Tags of assets this one refuses to share a spawn group with
    pub fn anti_tags(&self) -> &[String] {
        &self.anti_tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag_lookup.contains(tag)
    }

    pub fn has_anti_tag(&self, tag: &str) -> bool {
        self.anti_tags.iter().any(|t| t == tag)
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.has_tag(&tag) {
            self.tags.push(tag);
            self.rebuild_tag_cache();
        }
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
        self.rebuild_tag_cache();
    }

    pub fn add_anti_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.has_anti_tag(&tag) {
            self.anti_tags.push(tag);
        }
    }

    fn rebuild_tag_cache(&mut self) {
        self.tag_lookup = self.tags.iter().cloned().collect();
    }
}

/// Tag and anti-tag body of an asset in a name-keyed manifest
#[derive(Debug, Deserialize)]
struct AssetBody {
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    anti_tags: Vec<String>,
}

/// Accepted manifest layouts
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LibraryFile {
    List(Vec<AssetInfo>),
    Wrapped { assets: Vec<AssetInfo> },
    Keyed(BTreeMap<String, AssetBody>),
}

impl LibraryFile {
    fn into_assets(self) -> Vec<AssetInfo> {
        match self {
            LibraryFile::List(assets) | LibraryFile::Wrapped { assets } => assets,
            LibraryFile::Keyed(map) => map
                .into_iter()
                .map(|(name, body)| AssetInfo::new(name, body.tags, body.anti_tags))
                .collect(),
        }
    }
}

/// Ordered asset store with a name index
#[derive(Debug, Clone, Default)]
pub struct AssetLibrary {
    assets: Vec<AssetInfo>,
    by_name: AHashMap<String, usize>,
}

impl AssetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a library from already-constructed descriptors
    pub fn from_assets(assets: impl IntoIterator<Item = AssetInfo>) -> Self {
        let mut library = Self::new();
        for info in assets {
            library.add_asset(info);
        }
        library
    }

    /// Insert an asset; an existing asset with the same name is replaced in place
    pub fn add_asset(&mut self, mut info: AssetInfo) {
        info.rebuild_tag_cache();
        if let Some(&idx) = self.by_name.get(&info.name) {
            tracing::warn!("Duplicate asset '{}' in library, replacing", info.name);
            self.assets[idx] = info;
            return;
        }
        self.by_name.insert(info.name.clone(), self.assets.len());
        self.assets.push(info);
    }

    /// Remove an asset by name, returns whether it existed
    pub fn remove(&mut self, name: &str) -> bool {
        let Some(idx) = self.by_name.remove(name) else {
            return false;
        };
        self.assets.remove(idx);
        for slot in self.by_name.values_mut() {
            if *slot > idx {
                *slot -= 1;
            }
        }
        true
    }

    pub fn get(&self, name: &str) -> Option<&AssetInfo> {
        self.by_name.get(name).map(|&idx| &self.assets[idx])
    }

    /// All assets in insertion order
    pub fn all(&self) -> impl Iterator<Item = (&str, &AssetInfo)> {
        self.assets.iter().map(|info| (info.name.as_str(), info))
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Load assets from a JSON manifest string
    pub fn load_from_json(&mut self, json: &str) -> Result<usize, LibraryError> {
        self.load_named(json, "<memory>")
    }

    /// Load assets from a JSON manifest on disk
    pub fn load_from_file(&mut self, path: &Path) -> Result<usize, LibraryError> {
        let content = std::fs::read_to_string(path)?;
        self.load_named(&content, &path.display().to_string())
    }

    /// Load every `.json` manifest under a directory, recursively
    pub fn load_directory(&mut self, path: &Path) -> Result<usize, LibraryError> {
        let mut entries: Vec<_> = std::fs::read_dir(path)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|e| e.path())
            .collect();
        entries.sort();

        let mut loaded = 0;
        for entry_path in entries {
            if entry_path.is_dir() {
                loaded += self.load_directory(&entry_path)?;
            } else if entry_path.extension().map_or(false, |ext| ext == "json") {
                loaded += self.load_from_file(&entry_path)?;
            }
        }
        Ok(loaded)
    }

    fn load_named(&mut self, json: &str, origin: &str) -> Result<usize, LibraryError> {
        let file: LibraryFile = serde_json::from_str(json).map_err(|source| LibraryError::Json {
            path: origin.to_string(),
            source,
        })?;
        let assets = file.into_assets();
        if assets.iter().any(|a| a.name.is_empty()) {
            return Err(LibraryError::MissingName(origin.to_string()));
        }
        let count = assets.len();
        for info in assets {
            self.add_asset(info);
        }
        Ok(count)
    }
}
