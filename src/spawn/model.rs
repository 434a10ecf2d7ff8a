//! Spawn group authoring model.
//!
//! A spawn group says how a set of assets is distributed in an area (the
//! method) and which assets may fill it (weighted candidates). Each method
//! carries its own parameters, so the method and its config live in one
//! enum and can never disagree.

use serde_json::{json, Map, Value};
use std::fmt;

use super::fields::{read_int, read_number, read_string};

pub const DEFAULT_PERIMETER_COUNT: i32 = 2;
pub const DEFAULT_EDGE_COUNT: i32 = 1;
pub const DEFAULT_EDGE_INSET: i32 = 100;
pub const MAX_EDGE_INSET: i32 = 200;

/// Placement method of a spawn group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpawnMethod {
    None,
    Random,
    Perimeter,
    Edge,
    Exact,
}

impl SpawnMethod {
    pub const ALL: [SpawnMethod; 5] = [
        SpawnMethod::None,
        SpawnMethod::Random,
        SpawnMethod::Perimeter,
        SpawnMethod::Edge,
        SpawnMethod::Exact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpawnMethod::None => "None",
            SpawnMethod::Random => "Random",
            SpawnMethod::Perimeter => "Perimeter",
            SpawnMethod::Edge => "Edge",
            SpawnMethod::Exact => "Exact",
        }
    }

    /// Parse an authored method name; unknown names map to `None`
    pub fn from_name(name: &str) -> SpawnMethod {
        match normalize_method_name(name).as_str() {
            "Random" => SpawnMethod::Random,
            "Perimeter" => SpawnMethod::Perimeter,
            "Edge" => SpawnMethod::Edge,
            "Exact" => SpawnMethod::Exact,
            _ => SpawnMethod::None,
        }
    }
}

impl fmt::Display for SpawnMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize an authored `position` string: legacy `"Exact Position"`
/// becomes `"Exact"`, empty becomes `"Random"`, anything else is kept.
pub fn normalize_method_name(name: &str) -> String {
    match name {
        "" => "Random".to_string(),
        "Exact Position" => "Exact".to_string(),
        other => other.to_string(),
    }
}

/// Method-specific parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MethodConfig {
    #[default]
    None,
    Random,
    Perimeter { min_number: i32, max_number: i32 },
    Edge { min_number: i32, max_number: i32, inset_percent: i32 },
    Exact { quantity: i32 },
}

impl MethodConfig {
    /// Perimeter config; `max_number` is raised to `min_number`
    pub fn perimeter(min_number: i32, max_number: i32) -> Self {
        MethodConfig::Perimeter { min_number, max_number: max_number.max(min_number) }
    }

    /// Edge config with `min_number >= 1`, ordered bounds and a clamped inset
    pub fn edge(min_number: i32, max_number: i32, inset_percent: i32) -> Self {
        let min_number = min_number.max(1);
        MethodConfig::Edge {
            min_number,
            max_number: max_number.max(min_number),
            inset_percent: inset_percent.clamp(0, MAX_EDGE_INSET),
        }
    }

    pub fn exact(quantity: i32) -> Self {
        MethodConfig::Exact { quantity }
    }

    /// Default parameters for a method
    pub fn default_for(method: SpawnMethod) -> Self {
        match method {
            SpawnMethod::None => MethodConfig::None,
            SpawnMethod::Random => MethodConfig::Random,
            SpawnMethod::Perimeter => {
                MethodConfig::perimeter(DEFAULT_PERIMETER_COUNT, DEFAULT_PERIMETER_COUNT)
            }
            SpawnMethod::Edge => {
                MethodConfig::edge(DEFAULT_EDGE_COUNT, DEFAULT_EDGE_COUNT, DEFAULT_EDGE_INSET)
            }
            SpawnMethod::Exact => MethodConfig::exact(1),
        }
    }

    pub fn method(&self) -> SpawnMethod {
        match self {
            MethodConfig::None => SpawnMethod::None,
            MethodConfig::Random => SpawnMethod::Random,
            MethodConfig::Perimeter { .. } => SpawnMethod::Perimeter,
            MethodConfig::Edge { .. } => SpawnMethod::Edge,
            MethodConfig::Exact { .. } => SpawnMethod::Exact,
        }
    }
}

/// Weighted asset reference as authored
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Asset name; empty for a null slot
    pub asset_id: String,
    pub weight: f64,
}

impl Candidate {
    pub fn new(asset_id: impl Into<String>, weight: f64) -> Self {
        Self { asset_id: asset_id.into(), weight }
    }
}

/// Authoring form of a spawn group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnGroup {
    pub id: String,
    pub display_name: String,
    pub area_name: String,
    pub method_config: MethodConfig,
    pub candidates: Vec<Candidate>,
}

impl SpawnGroup {
    pub fn new(id: impl Into<String>, method: SpawnMethod) -> Self {
        Self {
            id: id.into(),
            method_config: MethodConfig::default_for(method),
            ..Default::default()
        }
    }

    pub fn method(&self) -> SpawnMethod {
        self.method_config.method()
    }

    /// Change method, resetting the config to that method's defaults.
    /// Identity, area link and candidates are kept.
    pub fn switch_method(&mut self, method: SpawnMethod) {
        self.method_config = MethodConfig::default_for(method);
    }

    /// Read a group from an authoring record, clamping method parameters
    pub fn from_json(entry: &Value) -> SpawnGroup {
        let mut group = SpawnGroup::default();
        if !entry.is_object() {
            group.switch_method(SpawnMethod::Random);
            return group;
        }

        group.id = read_string(entry, "spawn_id");
        group.display_name = read_string(entry, "display_name");
        group.area_name = read_string(entry, "area");
        group.switch_method(SpawnMethod::from_name(&read_string(entry, "position")));

        group.method_config = match group.method_config {
            MethodConfig::Perimeter { min_number, max_number } => {
                let min_number = read_int(entry, "min_number", min_number).max(1);
                let max_number = read_int(entry, "max_number", max_number);
                MethodConfig::perimeter(min_number, max_number)
            }
            MethodConfig::Edge { min_number, max_number, inset_percent } => MethodConfig::edge(
                read_int(entry, "min_number", min_number),
                read_int(entry, "max_number", max_number),
                read_int(entry, "edge_inset_percent", inset_percent),
            ),
            MethodConfig::Exact { quantity } => {
                let quantity =
                    read_int(entry, "quantity", read_int(entry, "min_number", quantity));
                MethodConfig::exact(quantity.max(1))
            }
            other => other,
        };

        if let Some(items) = entry.get("candidates").and_then(Value::as_array) {
            group.candidates = items
                .iter()
                .filter_map(|c| match c {
                    Value::String(name) => Some(Candidate::new(name.as_str(), 0.0)),
                    Value::Object(_) => {
                        Some(Candidate::new(read_string(c, "name"), candidate_weight(c)))
                    }
                    _ => None,
                })
                .filter(|c| !c.asset_id.is_empty() || c.weight != 0.0)
                .collect();
        }

        group
    }

    /// Write this group into an authoring record.
    ///
    /// Keys that do not belong to the current method (`quantity`,
    /// `edge_inset_percent`) are removed; unrelated keys are left alone.
    pub fn apply_to_json(&self, entry: &mut Value) {
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Some(obj) = entry.as_object_mut() else {
            return;
        };

        obj.insert("spawn_id".into(), json!(self.id));
        obj.insert("display_name".into(), json!(self.display_name));
        if self.area_name.is_empty() {
            obj.remove("area");
        } else {
            obj.insert("area".into(), json!(self.area_name));
        }
        obj.insert("position".into(), json!(self.method().as_str()));

        match self.method_config {
            MethodConfig::Perimeter { min_number, max_number } => {
                obj.insert("min_number".into(), json!(min_number));
                obj.insert("max_number".into(), json!(max_number));
                obj.remove("quantity");
                obj.remove("edge_inset_percent");
            }
            MethodConfig::Edge { min_number, max_number, inset_percent } => {
                obj.insert("min_number".into(), json!(min_number));
                obj.insert("max_number".into(), json!(max_number));
                obj.insert("edge_inset_percent".into(), json!(inset_percent));
                obj.remove("quantity");
            }
            MethodConfig::Exact { quantity } => {
                obj.insert("quantity".into(), json!(quantity));
                obj.insert("min_number".into(), json!(quantity));
                obj.insert("max_number".into(), json!(quantity));
                obj.remove("edge_inset_percent");
            }
            MethodConfig::None | MethodConfig::Random => {
                obj.remove("quantity");
                obj.remove("edge_inset_percent");
            }
        }

        let candidates: Vec<Value> = self
            .candidates
            .iter()
            .map(|c| json!({ "name": c.asset_id, "chance": c.weight }))
            .collect();
        obj.insert("candidates".into(), Value::Array(candidates));
    }

    /// Serialize into a fresh record
    pub fn to_json(&self) -> Value {
        let mut entry = Value::Object(Map::new());
        self.apply_to_json(&mut entry);
        entry
    }
}

/// Candidate weight: `chance` wins over `weight`; unreadable values are 0
pub fn candidate_weight(candidate: &Value) -> f64 {
    if !candidate.is_object() {
        return 0.0;
    }
    if let Some(chance) = candidate.get("chance") {
        return read_number(chance).unwrap_or(0.0);
    }
    candidate.get("weight").and_then(read_number).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_candidates_survive_round_trip() {
        let mut entry = json!({ "candidates": ["oak", { "name": "pine", "chance": 2 }, "", 7] });
        let group = SpawnGroup::from_json(&entry);
        assert_eq!(
            group.candidates,
            vec![Candidate::new("oak", 0.0), Candidate::new("pine", 2.0)]
        );

        group.apply_to_json(&mut entry);
        let names: Vec<&str> = entry["candidates"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|c| c["name"].as_str())
            .collect();
        assert_eq!(names, vec!["oak", "pine"]);
    }

    #[test]
    fn test_method_names() {
        assert_eq!(SpawnMethod::from_name("Exact Position"), SpawnMethod::Exact);
        assert_eq!(SpawnMethod::from_name(""), SpawnMethod::Random);
        assert_eq!(SpawnMethod::from_name("Perimeter"), SpawnMethod::Perimeter);
        assert_eq!(SpawnMethod::from_name("Sideways"), SpawnMethod::None);
        for method in SpawnMethod::ALL {
            assert_eq!(SpawnMethod::from_name(method.as_str()), method);
        }
    }

    #[test]
    fn test_switch_method_resets_config_keeps_identity() {
        let mut group = SpawnGroup::new("spn-1", SpawnMethod::Exact);
        group.display_name = "Torches".into();
        group.area_name = "hall".into();
        group.candidates.push(Candidate::new("torch", 1.0));

        group.switch_method(SpawnMethod::Perimeter);
        assert_eq!(group.method_config, MethodConfig::Perimeter { min_number: 2, max_number: 2 });
        assert_eq!(group.id, "spn-1");
        assert_eq!(group.display_name, "Torches");
        assert_eq!(group.area_name, "hall");
        assert_eq!(group.candidates.len(), 1);

        group.switch_method(SpawnMethod::Edge);
        assert_eq!(
            group.method_config,
            MethodConfig::Edge { min_number: 1, max_number: 1, inset_percent: 100 }
        );
    }

    #[test]
    fn test_constructors_clamp() {
        assert_eq!(
            MethodConfig::perimeter(5, 3),
            MethodConfig::Perimeter { min_number: 5, max_number: 5 }
        );
        assert_eq!(
            MethodConfig::edge(0, -2, 500),
            MethodConfig::Edge { min_number: 1, max_number: 1, inset_percent: 200 }
        );
    }

    #[test]
    fn test_from_json_perimeter_clamps() {
        let group = SpawnGroup::from_json(&json!({
            "spawn_id": "p1",
            "position": "Perimeter",
            "min_number": 0,
            "max_number": -3,
        }));
        assert_eq!(group.method_config, MethodConfig::Perimeter { min_number: 1, max_number: 1 });
    }

    #[test]
    fn test_from_json_edge_clamps_inset() {
        let group = SpawnGroup::from_json(&json!({
            "position": "Edge",
            "min_number": 3,
            "max_number": 2,
            "edge_inset_percent": 260,
        }));
        assert_eq!(
            group.method_config,
            MethodConfig::Edge { min_number: 3, max_number: 3, inset_percent: 200 }
        );
    }

    #[test]
    fn test_from_json_exact_quantity_ladder() {
        let from_min =
            SpawnGroup::from_json(&json!({"position": "Exact Position", "min_number": 4}));
        assert_eq!(from_min.method_config, MethodConfig::Exact { quantity: 4 });

        let explicit =
            SpawnGroup::from_json(&json!({"position": "Exact", "quantity": 2, "min_number": 9}));
        assert_eq!(explicit.method_config, MethodConfig::Exact { quantity: 2 });

        let floor = SpawnGroup::from_json(&json!({"position": "Exact", "quantity": 0}));
        assert_eq!(floor.method_config, MethodConfig::Exact { quantity: 1 });
    }

    #[test]
    fn test_from_json_candidates() {
        let group = SpawnGroup::from_json(&json!({
            "candidates": [
                {"name": "oak", "chance": 40},
                {"name": "pine", "weight": 2.5},
                {"name": "", "chance": 0},
                {"name": "", "chance": 10},
                {"name": "ash", "chance": 5, "weight": 99},
                "not-an-object",
            ]
        }));
        assert_eq!(group.method(), SpawnMethod::Random);
        assert_eq!(
            group.candidates,
            vec![
                Candidate::new("oak", 40.0),
                Candidate::new("pine", 2.5),
                Candidate::new("", 10.0),
                Candidate::new("ash", 5.0),
            ]
        );
    }

    #[test]
    fn test_non_object_is_random() {
        let group = SpawnGroup::from_json(&json!("junk"));
        assert_eq!(group.method(), SpawnMethod::Random);
        assert!(group.id.is_empty());
    }

    #[test]
    fn test_apply_erases_irrelevant_keys() {
        let mut entry = json!({
            "spawn_id": "x",
            "position": "Exact",
            "quantity": 3,
            "edge_inset_percent": 50,
            "area": "old",
            "enforce_spacing": true,
        });
        let mut group = SpawnGroup::from_json(&entry);
        group.area_name.clear();
        group.switch_method(SpawnMethod::Random);
        group.apply_to_json(&mut entry);

        assert_eq!(entry["position"], "Random");
        assert!(entry.get("quantity").is_none());
        assert!(entry.get("edge_inset_percent").is_none());
        assert!(entry.get("area").is_none());
        assert_eq!(entry["enforce_spacing"], true);
    }

    #[test]
    fn test_round_trip() {
        let source = json!({
            "spawn_id": "spn-abc",
            "display_name": "Crates",
            "area": "storage",
            "position": "Edge",
            "min_number": 2,
            "max_number": 4,
            "edge_inset_percent": 80,
            "candidates": [{"name": "crate", "chance": 3}, {"name": "", "chance": 1}],
        });
        let first = SpawnGroup::from_json(&source);
        let second = SpawnGroup::from_json(&first.to_json());
        assert_eq!(first, second);
    }
}
