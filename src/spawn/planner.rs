//! Spawn planner: turns authored spawn groups into a prioritized spawn queue.
//!
//! Construction does all the work in one pass:
//! 1. merge the `spawn_groups` of every source, remembering provenance
//! 2. canonicalize each entry, writing repairs back into its source
//! 3. sample quantities and resolve candidates against the asset library
//! 4. stable-sort the queue by priority
//! 5. hand every rewritten source to its `SourceContext`
//!
//! Bad entries never fail the plan. They degrade to null candidates or are
//! skipped. Only a failing persist callback is reported as an error.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::{json, Value};

use super::fields::{read_bool, read_int, read_str, read_strict_int};
use super::group_utils::{
    ensure_spawn_groups_array, find_spawn_groups_array_mut, generate_spawn_id_with,
    SPAWN_GROUPS_KEY,
};
use super::info::{SpawnCandidate, SpawnInfo};
use super::model::{normalize_method_name, SpawnMethod};
use super::size_resolver::RoomRelativeSizeResolver;
use super::source::{SourceContext, SourceRef};
use super::tag_resolver::{resolve_asset_from_tag, TagFilters};
use crate::asset::{AssetLibrary, FlipOverrideSink, FlipOverrides};
use crate::core::config::{config, PlannerConfig};
use crate::core::error::{PlannerError, Result};
use crate::core::types::AreaBounds;

/// Collaborators a plan reports to besides the asset library
#[derive(Clone, Copy)]
pub struct PlanOptions<'a> {
    pub config: &'a PlannerConfig,
    pub flips: &'a dyn FlipOverrideSink,
}

impl Default for PlanOptions<'static> {
    fn default() -> Self {
        Self {
            config: config(),
            flips: FlipOverrides::global(),
        }
    }
}

/// Planned spawn queue plus the canonicalized source records
#[derive(Debug)]
pub struct SpawnPlanner<'lib> {
    library: &'lib AssetLibrary,
    source_jsons: Vec<Value>,
    source_changed: Vec<bool>,
    provenance: Vec<SourceRef>,
    spawn_queue: Vec<SpawnInfo<'lib>>,
}

/// Per-entry view of the current area
#[derive(Debug, Clone, Copy)]
struct RoomSize {
    width: i32,
    height: i32,
}

/// A parsed candidate before tag resolution
#[derive(Debug, Default)]
struct CandidateDraft {
    weight: f64,
    use_tag: bool,
    tag: String,
    original_name: String,
    asset_name: String,
    label: String,
    is_null: bool,
}

impl<'lib> SpawnPlanner<'lib> {
    /// Plan with the global config and flip registry.
    ///
    /// The RNG is seeded from `PlannerConfig::seed` when set, otherwise from
    /// entropy.
    pub fn new<A: AreaBounds + ?Sized>(
        sources: &[Value],
        area: &A,
        library: &'lib AssetLibrary,
        contexts: Vec<SourceContext<'_>>,
    ) -> Result<Self> {
        let options = PlanOptions::default();
        let mut rng = match options.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_options(sources, area, library, contexts, options, &mut rng)
    }

    /// Plan with the global config and flip registry, drawing from `rng`
    pub fn with_rng<A: AreaBounds + ?Sized, R: Rng + ?Sized>(
        sources: &[Value],
        area: &A,
        library: &'lib AssetLibrary,
        contexts: Vec<SourceContext<'_>>,
        rng: &mut R,
    ) -> Result<Self> {
        Self::with_options(sources, area, library, contexts, PlanOptions::default(), rng)
    }

    pub fn with_options<A: AreaBounds + ?Sized, R: Rng + ?Sized>(
        sources: &[Value],
        area: &A,
        library: &'lib AssetLibrary,
        contexts: Vec<SourceContext<'_>>,
        options: PlanOptions<'_>,
        rng: &mut R,
    ) -> Result<Self> {
        let mut planner = Self {
            library,
            source_jsons: sources.to_vec(),
            source_changed: vec![false; sources.len()],
            provenance: Vec::new(),
            spawn_queue: Vec::new(),
        };

        let mut merged = planner.merge_sources();
        let (width, height) = area.bounds().planning_size();
        let room = RoomSize { width, height };

        for (idx, entry) in merged.iter_mut().enumerate() {
            if !entry.is_object() {
                tracing::debug!("Skipping malformed spawn group entry {}", idx);
                continue;
            }
            if let Some(info) = planner.plan_entry(idx, entry, room, &options, rng) {
                planner.spawn_queue.push(info);
            }
        }

        planner.sort_spawn_queue();

        tracing::info!(
            "Planned {} spawn groups from {} sources ({} merged entries, {} sources rewritten)",
            planner.spawn_queue.len(),
            planner.source_jsons.len(),
            merged.len(),
            planner.dirty_sources().len()
        );

        planner.persist_sources(contexts)?;
        Ok(planner)
    }

    /// The ordered spawn queue
    pub fn spawn_queue(&self) -> &[SpawnInfo<'lib>] {
        &self.spawn_queue
    }

    /// Source records after canonicalization
    pub fn source_records(&self) -> &[Value] {
        &self.source_jsons
    }

    /// Indices of sources the planner rewrote
    pub fn dirty_sources(&self) -> Vec<usize> {
        self.source_changed
            .iter()
            .enumerate()
            .filter_map(|(i, &changed)| changed.then_some(i))
            .collect()
    }

    /// Where each merged entry came from, in merge order
    pub fn provenance(&self) -> &[SourceRef] {
        &self.provenance
    }

    /// Flatten every source's spawn groups into one stream
    fn merge_sources(&mut self) -> Vec<Value> {
        let mut merged = Vec::new();
        for (source_index, source) in self.source_jsons.iter().enumerate() {
            // Work on a copy so a missing array is not added to the source
            let mut scratch = source.clone();
            let groups = ensure_spawn_groups_array(&mut scratch);
            for (entry_index, entry) in groups.drain(..).enumerate() {
                merged.push(entry);
                self.provenance.push(SourceRef {
                    source_index,
                    entry_index,
                    key: SPAWN_GROUPS_KEY,
                });
            }
        }
        merged
    }

    /// Set `key` on the merged entry and on the source entry it came from
    fn write_field(&mut self, idx: usize, entry: &mut Value, key: &str, value: Value) {
        if let Some(obj) = entry.as_object_mut() {
            obj.insert(key.to_string(), value.clone());
        }
        let Some(origin) = self.provenance.get(idx) else {
            return;
        };
        let (source_index, entry_index) = (origin.source_index, origin.entry_index);
        let target = self
            .source_jsons
            .get_mut(source_index)
            .and_then(find_spawn_groups_array_mut)
            .and_then(|groups| groups.get_mut(entry_index))
            .and_then(Value::as_object_mut);
        if let Some(target) = target {
            target.insert(key.to_string(), value);
            self.source_changed[source_index] = true;
        }
    }

    fn plan_entry<R: Rng + ?Sized>(
        &mut self,
        idx: usize,
        entry: &mut Value,
        room: RoomSize,
        options: &PlanOptions<'_>,
        rng: &mut R,
    ) -> Option<SpawnInfo<'lib>> {
        let mut spawn_id = read_str(entry, "spawn_id").unwrap_or_default().to_string();
        if spawn_id.is_empty() {
            spawn_id = generate_spawn_id_with(options.config);
            self.write_field(idx, entry, "spawn_id", json!(spawn_id));
        }

        let mut priority = read_strict_int(entry, "priority").unwrap_or(-1);
        if priority < 0 {
            priority = idx as i32;
            self.write_field(idx, entry, "priority", json!(priority));
        }

        let position = normalize_method_name(read_str(entry, "position").unwrap_or_default());
        let method = SpawnMethod::from_name(&position);

        let display_name = [read_str(entry, "display_name"), read_str(entry, "name")]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| spawn_id.clone());
        let link_name = read_str(entry, "link").unwrap_or_default().to_string();

        let force_single_quantity = method == SpawnMethod::Exact;
        let default_geometry = matches!(method, SpawnMethod::Exact | SpawnMethod::Perimeter);
        let resolve_geometry = read_bool(entry, "resolve_geometry_to_room_size", default_geometry);
        let resolve_quantity = read_bool(entry, "resolve_quantity_to_room_size", false);
        self.ensure_bool_field(idx, entry, "resolve_geometry_to_room_size", resolve_geometry);
        self.ensure_bool_field(idx, entry, "resolve_quantity_to_room_size", resolve_quantity);

        let mut min_number = read_int(entry, "min_number", 1).max(0);
        let mut max_number = read_int(entry, "max_number", min_number).max(0);
        if max_number < min_number {
            std::mem::swap(&mut min_number, &mut max_number);
        }

        let (orig_w, orig_h) = if default_geometry || resolve_geometry || resolve_quantity {
            (
                self.ensure_dimension(idx, entry, "origional_width", room.width),
                self.ensure_dimension(idx, entry, "origional_height", room.height),
            )
        } else {
            (
                read_int(entry, "origional_width", room.width),
                read_int(entry, "origional_height", room.height),
            )
        };

        let scaler = RoomRelativeSizeResolver::new(orig_w, orig_h, room.width, room.height);
        if resolve_quantity && !force_single_quantity {
            (min_number, max_number) = scaler.scale_count_range(min_number, max_number);
        }

        let quantity = if force_single_quantity {
            1
        } else {
            rng.gen_range(min_number..=max_number)
        };

        let explicit_flip = read_bool(entry, "explicit_flip", false);
        let force_flipped = read_bool(entry, "force_flipped", false);
        options.flips.set_flip_override(&spawn_id, explicit_flip, force_flipped);

        let candidates = self.resolve_candidates(entry, rng);
        if candidates.is_empty() {
            tracing::debug!("Dropping spawn group '{}': no candidates", spawn_id);
            return None;
        }

        let mut info = SpawnInfo {
            name: display_name,
            position,
            spawn_id,
            priority,
            quantity,
            check_min_spacing: read_bool(entry, "enforce_spacing", false),
            grid_resolution: read_int(entry, "grid_resolution", 0),
            link_area_name: link_name,
            adjust_geometry_to_room: resolve_geometry,
            candidates,
            ..SpawnInfo::default()
        };

        info.exact_offset.x = read_int(entry, "dx", read_int(entry, "exact_dx", 0));
        info.exact_offset.y = read_int(entry, "dy", read_int(entry, "exact_dy", 0));
        (info.exact_origin_w, info.exact_origin_h) = if resolve_geometry {
            (orig_w, orig_h)
        } else {
            (room.width, room.height)
        };
        let ep_x = average_range(entry, "ep_x_min", "ep_x_max", -1);
        let ep_y = average_range(entry, "ep_y_min", "ep_y_max", -1);
        info.exact_point.x = read_int(entry, "ep_x", ep_x);
        info.exact_point.y = read_int(entry, "ep_y", ep_y);

        match method {
            SpawnMethod::Perimeter => {
                let radius = read_int(entry, "radius", read_int(entry, "perimeter_radius", 0));
                info.perimeter_radius = if resolve_geometry {
                    scaler.scale_length(radius)
                } else {
                    radius
                };
            }
            SpawnMethod::Edge => {
                let inset = read_int(
                    entry,
                    "edge_inset_percent",
                    read_int(entry, "boundary_inset", options.config.edge_inset_default),
                );
                info.edge_inset_percent = options.config.clamp_edge_inset(inset);
            }
            _ => {}
        }

        Some(info)
    }

    /// Make `key` a JSON boolean equal to `value`
    fn ensure_bool_field(&mut self, idx: usize, entry: &mut Value, key: &str, value: bool) {
        if entry.get(key).and_then(Value::as_bool) != Some(value) {
            self.write_field(idx, entry, key, json!(value));
        }
    }

    /// Read an integer reference dimension, initializing it to `current` when absent
    fn ensure_dimension(&mut self, idx: usize, entry: &mut Value, key: &str, current: i32) -> i32 {
        match read_strict_int(entry, key) {
            Some(value) => value,
            None => {
                self.write_field(idx, entry, key, json!(current));
                current
            }
        }
    }

    fn resolve_candidates<R: Rng + ?Sized>(
        &self,
        entry: &Value,
        rng: &mut R,
    ) -> Vec<SpawnCandidate<'lib>> {
        let authored: Vec<Value> = match entry.get("candidates").and_then(Value::as_array) {
            Some(list) => list.clone(),
            // Legacy single-asset entries: `name` is the only candidate. Without a
            // name this becomes a null slot, so the group still consumes its quantity.
            None => match read_str(entry, "name") {
                Some(name) => vec![json!({ "name": name, "chance": 100 })],
                None => vec![json!({ "chance": 100 })],
            },
        };

        let drafts: Vec<CandidateDraft> = authored.iter().map(parse_candidate).collect();

        let mut filters = TagFilters::new();
        for draft in &drafts {
            if draft.weight > 0.0 {
                if draft.use_tag && !draft.tag.is_empty() {
                    filters.candidate_tags.insert(draft.tag.clone());
                }
            } else if draft.use_tag {
                if !draft.tag.is_empty() {
                    filters.banned_tags.insert(draft.tag.clone());
                }
            } else if !draft.is_null {
                let blocked = if draft.asset_name.is_empty() {
                    sanitize_key(&draft.original_name)
                } else {
                    draft.asset_name.clone()
                };
                if !blocked.is_empty() {
                    filters.banned_assets.insert(blocked);
                }
            }
        }

        drafts
            .iter()
            .map(|draft| self.finish_candidate(draft, &filters, rng))
            .collect()
    }

    fn finish_candidate<R: Rng + ?Sized>(
        &self,
        draft: &CandidateDraft,
        filters: &TagFilters,
        rng: &mut R,
    ) -> SpawnCandidate<'lib> {
        let mut is_null = draft.is_null;
        let name = if draft.use_tag {
            let tag = if draft.tag.is_empty() {
                sanitize_key(&draft.original_name)
            } else {
                draft.tag.clone()
            };
            if draft.weight > 0.0 {
                match resolve_asset_from_tag(self.library, &tag, filters, rng) {
                    Ok(resolved) => resolved.to_string(),
                    Err(err) => {
                        tracing::debug!("Tag candidate '#{}' falls back to null: {}", tag, err);
                        String::new()
                    }
                }
            } else {
                is_null = true;
                String::new()
            }
        } else {
            draft.asset_name.clone()
        };

        let fallback_display = if draft.original_name.is_empty() && !draft.tag.is_empty() {
            format!("#{}", draft.tag)
        } else {
            draft.original_name.clone()
        };
        let mut display_name = [&draft.label, &name, &fallback_display]
            .into_iter()
            .find(|s| !s.is_empty())
            .cloned()
            .unwrap_or_default();

        let mut info = None;
        if !is_null && !name.is_empty() {
            info = self.library.get(&name);
            if info.is_none() {
                tracing::debug!("Candidate '{}' is not in the asset library", name);
            }
        }
        let is_null = info.is_none();
        if is_null && display_name.is_empty() {
            display_name = "null".to_string();
        }

        SpawnCandidate {
            name,
            display_name,
            weight: draft.weight.max(0.0),
            info,
            is_null,
        }
    }

    fn sort_spawn_queue(&mut self) {
        self.spawn_queue.sort_by_key(|info| info.priority);
    }

    fn persist_sources(&self, contexts: Vec<SourceContext<'_>>) -> Result<()> {
        for (source_index, mut ctx) in contexts.into_iter().enumerate() {
            if !self.source_changed.get(source_index).copied().unwrap_or(false) {
                continue;
            }
            let record = &self.source_jsons[source_index];
            if let Some(target) = ctx.json_ref.as_deref_mut() {
                *target = record.clone();
            }
            if let Some(persist) = ctx.persist.as_mut() {
                persist(record).map_err(|source| PlannerError::Persist { source_index, source })?;
            }
        }
        Ok(())
    }
}

/// Midpoint of an authored `[lo, hi]` pair; a single authored bound wins
fn average_range(entry: &Value, lo_key: &str, hi_key: &str, fallback: i32) -> i32 {
    let lo = read_int(entry, lo_key, fallback);
    let hi = read_int(entry, hi_key, fallback);
    if lo == fallback && hi != fallback {
        hi
    } else if hi == fallback && lo != fallback {
        lo
    } else {
        ((i64::from(lo) + i64::from(hi)) / 2) as i32
    }
}

/// Trim whitespace and one leading `#`
fn sanitize_key(value: &str) -> String {
    let trimmed = value.trim();
    trimmed.strip_prefix('#').unwrap_or(trimmed).to_string()
}

fn candidate_chance(candidate: &Value) -> f64 {
    candidate
        .get("chance")
        .and_then(Value::as_f64)
        .or_else(|| candidate.get("weight").and_then(Value::as_f64))
        .unwrap_or(0.0)
}

fn parse_candidate(candidate: &Value) -> CandidateDraft {
    let mut draft = CandidateDraft {
        weight: candidate_chance(candidate),
        is_null: candidate.is_null(),
        ..CandidateDraft::default()
    };
    let mut tag_value = String::new();

    match candidate {
        Value::Object(_) => {
            if let Some(name) = read_str(candidate, "name") {
                draft.original_name = name.to_string();
                detect_tag(name, &mut draft, &mut tag_value);
            }
            draft.label = [read_str(candidate, "display_name"), read_str(candidate, "label")]
                .into_iter()
                .flatten()
                .next()
                .unwrap_or_default()
                .to_string();
            match candidate.get("tag") {
                Some(Value::Bool(true)) => {
                    draft.use_tag = true;
                    if tag_value.is_empty() {
                        tag_value = strip_hash(&draft.original_name).to_string();
                    }
                }
                Some(Value::String(tag)) => {
                    draft.use_tag = true;
                    tag_value = tag.clone();
                }
                _ => {}
            }
            if let Some(tag) = read_str(candidate, "tag_name") {
                draft.use_tag = true;
                tag_value = tag.to_string();
            }
        }
        Value::String(name) => {
            draft.original_name = name.clone();
            draft.label = name.clone();
            detect_tag(name, &mut draft, &mut tag_value);
        }
        _ => {}
    }

    if draft.original_name == "null" {
        draft.is_null = true;
    }
    if draft.use_tag && tag_value.is_empty() {
        tag_value = strip_hash(&draft.original_name).to_string();
    }
    draft.tag = sanitize_key(&tag_value);

    if !draft.use_tag {
        let sanitized = sanitize_key(&draft.original_name);
        if sanitized == "null" {
            draft.is_null = true;
        } else {
            draft.asset_name = sanitized;
        }
    }
    draft
}

fn detect_tag(name: &str, draft: &mut CandidateDraft, tag_value: &mut String) {
    if let Some(tag) = name.strip_prefix('#') {
        draft.use_tag = true;
        *tag_value = tag.to_string();
    }
}

fn strip_hash(name: &str) -> &str {
    name.strip_prefix('#').unwrap_or(name)
}
