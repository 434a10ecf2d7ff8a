//! Helpers that normalize spawn-group records in place.
//!
//! These operate on raw authoring JSON rather than on [`SpawnGroup`] so they
//! can repair records without dropping keys the model does not know about.
//! Every sanitizer returns whether it changed the record, which callers use
//! to decide whether the source file needs saving.
//!
//! [`SpawnGroup`]: super::model::SpawnGroup

use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::fields::{bool_value, read_int, read_number, read_str};
use super::model::normalize_method_name;
use crate::core::config::{config, PlannerConfig};

/// Key holding the spawn group array in a source record
pub const SPAWN_GROUPS_KEY: &str = "spawn_groups";

/// Generate a spawn id using the global config
pub fn generate_spawn_id() -> String {
    generate_spawn_id_with(config())
}

/// Generate `prefix` followed by `spawn_id_hex_len` lowercase hex digits
pub fn generate_spawn_id_with(config: &PlannerConfig) -> String {
    let mut hex = String::with_capacity(config.spawn_id_hex_len + 32);
    while hex.len() < config.spawn_id_hex_len {
        hex.push_str(&Uuid::new_v4().simple().to_string());
    }
    hex.truncate(config.spawn_id_hex_len);
    format!("{}{}", config.spawn_id_prefix, hex)
}

/// Return the spawn group array of a source record, creating it when missing.
///
/// A record that is itself an array is treated as the group list. Any other
/// non-object record is replaced by an empty object first.
pub fn ensure_spawn_groups_array(root: &mut Value) -> &mut Vec<Value> {
    if !root.is_array() {
        if !root.is_object() {
            *root = Value::Object(Map::new());
        }
        if let Some(map) = root.as_object_mut() {
            let slot = map.entry(SPAWN_GROUPS_KEY).or_insert(Value::Null);
            if !slot.is_array() {
                *slot = Value::Array(Vec::new());
            }
        }
    }

    let slot = match root {
        Value::Object(map) => map.get_mut(SPAWN_GROUPS_KEY),
        other => Some(other),
    };
    match slot {
        Some(Value::Array(items)) => items,
        _ => unreachable!("spawn_groups was normalized to an array"),
    }
}

/// Read-only lookup of the spawn group array
pub fn find_spawn_groups_array(root: &Value) -> Option<&Vec<Value>> {
    match root {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.get(SPAWN_GROUPS_KEY).and_then(Value::as_array),
        _ => None,
    }
}

/// Mutable lookup of the spawn group array, without creating it
pub fn find_spawn_groups_array_mut(root: &mut Value) -> Option<&mut Vec<Value>> {
    match root {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.get_mut(SPAWN_GROUPS_KEY).and_then(Value::as_array_mut),
        _ => None,
    }
}

fn put(entry: &mut Value, key: &str, value: Value) {
    if let Some(obj) = entry.as_object_mut() {
        obj.insert(key.to_string(), value);
    }
}

/// Write an integer unless the key already holds exactly that integer
fn ensure_int(entry: &mut Value, key: &str, value: i32) -> bool {
    if entry.get(key).and_then(Value::as_i64) == Some(value as i64) {
        return false;
    }
    put(entry, key, json!(value));
    true
}

/// Write a boolean unless the key already holds exactly that boolean
fn ensure_bool(entry: &mut Value, key: &str, value: bool) -> bool {
    if entry.get(key).and_then(Value::as_bool) == Some(value) {
        return false;
    }
    put(entry, key, json!(value));
    true
}

fn has_bool(entry: &Value, key: &str) -> bool {
    entry.get(key).map_or(false, Value::is_boolean)
}

fn has_nonempty_string(entry: &Value, key: &str) -> bool {
    read_str(entry, key).map_or(false, |s| !s.is_empty())
}

fn entry_method(entry: &Value) -> String {
    normalize_method_name(read_str(entry, "position").unwrap_or_default())
}

/// Enforce count minimums and inset range on Perimeter and Edge groups.
///
/// Perimeter groups need at least two points to outline a ring, Edge groups
/// at least one. Other methods are left untouched.
pub fn sanitize_perimeter_spawn_groups(groups: &mut Value) -> bool {
    sanitize_perimeter_spawn_groups_with(groups, config())
}

pub fn sanitize_perimeter_spawn_groups_with(groups: &mut Value, config: &PlannerConfig) -> bool {
    let Some(items) = groups.as_array_mut() else {
        return false;
    };

    let mut changed = false;
    for entry in items.iter_mut().filter(|e| e.is_object()) {
        match entry_method(entry).as_str() {
            "Perimeter" => {
                let min_number =
                    read_int(entry, "min_number", read_int(entry, "max_number", 2)).max(2);
                let max_number = read_int(entry, "max_number", min_number).max(min_number);
                changed |= ensure_int(entry, "min_number", min_number);
                changed |= ensure_int(entry, "max_number", max_number);
            }
            "Edge" => {
                let min_number =
                    read_int(entry, "min_number", read_int(entry, "max_number", 1)).max(1);
                let max_number = read_int(entry, "max_number", min_number).max(min_number);
                let inset = config.clamp_edge_inset(read_int(
                    entry,
                    "edge_inset_percent",
                    config.edge_inset_default,
                ));
                changed |= ensure_int(entry, "min_number", min_number);
                changed |= ensure_int(entry, "max_number", max_number);
                changed |= ensure_int(entry, "edge_inset_percent", inset);
            }
            _ => {}
        }
    }
    changed
}

/// Normalize a group's candidate list.
///
/// Non-object candidates are dropped, nameless ones become `"null"`, and
/// each gets a finite non-negative `chance` (taken from `chance`, else
/// `weight`). An empty list gets a single zero-chance null slot.
pub fn sanitize_spawn_group_candidates(entry: &mut Value) -> bool {
    let mut changed = false;
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
        changed = true;
    }
    if !entry.get("candidates").map_or(false, Value::is_array) {
        put(entry, "candidates", Value::Array(Vec::new()));
        changed = true;
    }

    let current = entry
        .get("candidates")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut sanitized = Vec::with_capacity(current.len().max(1));
    for candidate in &current {
        let Some(obj) = candidate.as_object() else {
            changed = true;
            continue;
        };
        let mut obj = obj.clone();

        let name_empty = obj.get("name").and_then(Value::as_str).map_or(true, str::is_empty);
        if name_empty {
            obj.insert("name".into(), json!("null"));
            changed = true;
        }

        let raw = obj
            .get("chance")
            .or_else(|| obj.get("weight"))
            .map(|v| read_number(v).unwrap_or(0.0));
        let mut chance = raw.unwrap_or(0.0);
        if !chance.is_finite() || chance < 0.0 {
            chance = 0.0;
        }
        let stored = obj.get("chance").and_then(read_number);
        if raw.is_none() || stored != Some(chance) {
            changed = true;
        }
        obj.insert("chance".into(), chance_value(chance));

        sanitized.push(Value::Object(obj));
    }

    if sanitized.is_empty() {
        sanitized.push(json!({ "name": "null", "chance": 0 }));
        changed = true;
    }

    if sanitized != current {
        put(entry, "candidates", Value::Array(sanitized));
        changed = true;
    }
    changed
}

fn chance_value(chance: f64) -> Value {
    if (chance - chance.round()).abs() < 1e-9 {
        json!(chance.round() as i64)
    } else {
        json!(chance)
    }
}

/// Fill in every key the editor and planner expect on a spawn group entry
pub fn ensure_spawn_group_entry_defaults(
    entry: &mut Value,
    default_display_name: &str,
    default_resolution: Option<i32>,
) -> bool {
    ensure_spawn_group_entry_defaults_with(
        entry,
        default_display_name,
        default_resolution,
        config(),
    )
}

pub fn ensure_spawn_group_entry_defaults_with(
    entry: &mut Value,
    default_display_name: &str,
    default_resolution: Option<i32>,
    config: &PlannerConfig,
) -> bool {
    let mut changed = false;
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
        changed = true;
    }

    if !has_nonempty_string(entry, "spawn_id") {
        put(entry, "spawn_id", json!(generate_spawn_id_with(config)));
        changed = true;
    }
    if !has_nonempty_string(entry, "display_name") {
        put(entry, "display_name", json!(default_display_name));
        changed = true;
    }
    if !has_nonempty_string(entry, "position") {
        put(entry, "position", json!("Random"));
        changed = true;
    }
    let method = entry_method(entry);

    let min_number = read_int(entry, "min_number", 1).max(1);
    let max_number = read_int(entry, "max_number", min_number).max(min_number);
    changed |= ensure_int(entry, "min_number", min_number);
    changed |= ensure_int(entry, "max_number", max_number);

    if !has_bool(entry, "enforce_spacing") {
        put(entry, "enforce_spacing", json!(false));
        changed = true;
    }

    let geometry_method = method == "Exact" || method == "Perimeter";
    let geometry_flag = entry
        .get("resolve_geometry_to_room_size")
        .and_then(bool_value)
        .unwrap_or(geometry_method);
    changed |= ensure_bool(entry, "resolve_geometry_to_room_size", geometry_flag);

    let quantity_flag = entry
        .get("resolve_quantity_to_room_size")
        .and_then(bool_value)
        .unwrap_or(false);
    changed |= ensure_bool(entry, "resolve_quantity_to_room_size", quantity_flag);

    if !has_bool(entry, "locked") {
        put(entry, "locked", json!(false));
        changed = true;
    }

    let fallback_resolution = config.clamp_resolution(default_resolution.unwrap_or(0));
    let resolution = config.clamp_resolution(read_int(entry, "resolution", fallback_resolution));
    changed |= ensure_int(entry, "resolution", resolution);

    changed |= sanitize_spawn_group_candidates(entry);

    for key in ["explicit_flip", "force_flipped"] {
        if !has_bool(entry, key) {
            put(entry, key, json!(false));
            changed = true;
        }
    }

    match method.as_str() {
        "Edge" => {
            let inset = read_int(entry, "edge_inset_percent", config.edge_inset_default);
            changed |= ensure_int(entry, "edge_inset_percent", config.clamp_edge_inset(inset));
        }
        "Perimeter" => {
            let radius = read_int(
                entry,
                "radius",
                read_int(entry, "perimeter_radius", config.perimeter_radius_default),
            );
            changed |= ensure_int(entry, "radius", radius);
            changed |= ensure_int(entry, "perimeter_radius", radius);
        }
        _ => {
            if let Some(obj) = entry.as_object_mut() {
                changed |= obj.remove("edge_inset_percent").is_some();
            }
        }
    }

    changed
}

/// Remove every candidate naming `asset_name` from all `candidates` arrays
/// nested anywhere in `node`
pub fn remove_asset_from_spawn_groups(node: &mut Value, asset_name: &str) -> bool {
    let mut modified = false;
    match node {
        Value::Object(map) => {
            for (key, value) in map.iter_mut() {
                if key == "candidates" {
                    if let Value::Array(candidates) = value {
                        let before = candidates.len();
                        candidates.retain(|c| read_str(c, "name") != Some(asset_name));
                        modified |= candidates.len() != before;
                    }
                }
                modified |= remove_asset_from_spawn_groups(value, asset_name);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                modified |= remove_asset_from_spawn_groups(item, asset_name);
            }
        }
        _ => {}
    }
    modified
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_have_prefix_and_hex() {
        let id = generate_spawn_id();
        assert!(id.starts_with("spn-"));
        let hex = &id["spn-".len()..];
        assert_eq!(hex.len(), 12);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(generate_spawn_id(), id);
    }

    #[test]
    fn test_long_ids_span_several_uuids() {
        let config = PlannerConfig {
            spawn_id_prefix: "g".into(),
            spawn_id_hex_len: 40,
            ..Default::default()
        };
        let id = generate_spawn_id_with(&config);
        assert_eq!(id.len(), 41);
    }

    #[test]
    fn test_ensure_array_creates_and_reuses() {
        let mut root = json!({"name": "room"});
        ensure_spawn_groups_array(&mut root).push(json!({"spawn_id": "a"}));
        assert_eq!(root["spawn_groups"].as_array().unwrap().len(), 1);
        assert_eq!(ensure_spawn_groups_array(&mut root).len(), 1);

        let mut bare = json!([{"spawn_id": "b"}]);
        assert_eq!(ensure_spawn_groups_array(&mut bare).len(), 1);

        let mut junk = json!(5);
        assert!(ensure_spawn_groups_array(&mut junk).is_empty());
        assert!(junk["spawn_groups"].is_array());

        let mut wrong = json!({"spawn_groups": "nope"});
        assert!(ensure_spawn_groups_array(&mut wrong).is_empty());
    }

    #[test]
    fn test_find_array() {
        assert!(find_spawn_groups_array(&json!({})).is_none());
        assert_eq!(find_spawn_groups_array(&json!({"spawn_groups": [1]})).unwrap().len(), 1);
        assert_eq!(find_spawn_groups_array(&json!([1, 2])).unwrap().len(), 2);
    }

    #[test]
    fn test_sanitize_candidates() {
        let mut entry = json!({
            "candidates": [
                {"name": "", "weight": 2.0},
                {"name": "oak", "chance": -4},
                {"name": "ash", "chance": "2.5"},
                7,
            ]
        });
        assert!(sanitize_spawn_group_candidates(&mut entry));
        assert_eq!(
            entry["candidates"],
            json!([
                {"name": "null", "weight": 2.0, "chance": 2},
                {"name": "oak", "chance": 0},
                {"name": "ash", "chance": 2.5},
            ])
        );
        assert!(!sanitize_spawn_group_candidates(&mut entry));
    }

    #[test]
    fn test_sanitize_candidates_fills_empty() {
        let mut entry = json!({});
        assert!(sanitize_spawn_group_candidates(&mut entry));
        assert_eq!(entry["candidates"], json!([{"name": "null", "chance": 0}]));
    }

    #[test]
    fn test_sanitize_perimeter_groups() {
        let mut groups = json!([
            {"position": "Perimeter", "min_number": 1, "max_number": 0},
            {"position": "Edge", "min_number": 0, "edge_inset_percent": 300},
            {"position": "Random", "min_number": 0},
            "junk",
        ]);
        assert!(sanitize_perimeter_spawn_groups(&mut groups));
        assert_eq!(groups[0]["min_number"], 2);
        assert_eq!(groups[0]["max_number"], 2);
        assert_eq!(groups[1]["min_number"], 1);
        assert_eq!(groups[1]["max_number"], 1);
        assert_eq!(groups[1]["edge_inset_percent"], 200);
        assert_eq!(groups[2]["min_number"], 0);
        assert!(!sanitize_perimeter_spawn_groups(&mut groups));
        assert!(!sanitize_perimeter_spawn_groups(&mut json!({})));
    }

    #[test]
    fn test_entry_defaults_fill_everything() {
        let mut entry = json!({"position": "Perimeter", "perimeter_radius": 80});
        assert!(ensure_spawn_group_entry_defaults(&mut entry, "Group 1", Some(4)));

        assert!(entry["spawn_id"].as_str().unwrap().starts_with("spn-"));
        assert_eq!(entry["display_name"], "Group 1");
        assert_eq!(entry["min_number"], 1);
        assert_eq!(entry["max_number"], 1);
        assert_eq!(entry["enforce_spacing"], false);
        assert_eq!(entry["resolve_geometry_to_room_size"], true);
        assert_eq!(entry["resolve_quantity_to_room_size"], false);
        assert_eq!(entry["locked"], false);
        assert_eq!(entry["resolution"], 4);
        assert_eq!(entry["candidates"], json!([{"name": "null", "chance": 0}]));
        assert_eq!(entry["explicit_flip"], false);
        assert_eq!(entry["force_flipped"], false);
        assert_eq!(entry["radius"], 80);
        assert_eq!(entry["perimeter_radius"], 80);

        assert!(!ensure_spawn_group_entry_defaults(&mut entry, "ignored", Some(4)));
    }

    #[test]
    fn test_entry_defaults_edge_and_other_methods() {
        let mut edge = json!({
            "position": "Edge",
            "edge_inset_percent": -10,
            "resolve_geometry_to_room_size": "yes"
        });
        ensure_spawn_group_entry_defaults(&mut edge, "Edge", None);
        assert_eq!(edge["edge_inset_percent"], 0);
        assert_eq!(edge["resolve_geometry_to_room_size"], true);
        assert_eq!(edge["resolution"], 0);

        let mut random = json!({"position": "Random", "edge_inset_percent": 40, "resolution": 99});
        ensure_spawn_group_entry_defaults(&mut random, "Random", None);
        assert!(random.get("edge_inset_percent").is_none());
        assert_eq!(random["resolve_geometry_to_room_size"], false);
        assert_eq!(random["resolution"], 30);
    }

    #[test]
    fn test_remove_asset_recursively() {
        let mut room = json!({
            "spawn_groups": [
                {"candidates": [{"name": "oak"}, {"name": "pine"}]},
                {"candidates": [{"name": "oak"}]},
            ],
            "nested": {"child": {"candidates": [{"name": "oak"}, "oak"]}},
        });
        assert!(remove_asset_from_spawn_groups(&mut room, "oak"));
        assert_eq!(room["spawn_groups"][0]["candidates"], json!([{"name": "pine"}]));
        assert_eq!(room["spawn_groups"][1]["candidates"], json!([]));
        assert_eq!(room["nested"]["child"]["candidates"], json!(["oak"]));
        assert!(!remove_asset_from_spawn_groups(&mut room, "oak"));
    }
}
