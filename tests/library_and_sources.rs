//! Asset library loading, config loading and on-disk source write-back

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::{json, Value};
use spawn_planner::asset::{AssetLibrary, FlipOverrides};
use spawn_planner::core::{Bounds, PlannerConfig, PlannerError};
use spawn_planner::spawn::group_utils::{
    ensure_spawn_group_entry_defaults, find_spawn_groups_array, remove_asset_from_spawn_groups,
    sanitize_spawn_group_candidates,
};
use spawn_planner::spawn::{PlanOptions, SourceContext, SpawnPlanner};
use std::fs;

fn write(path: &std::path::Path, value: &Value) {
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

#[test]
fn test_library_directory_feeds_tag_resolution() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("props")).unwrap();
    write(
        &dir.path().join("props").join("crates.json"),
        &json!([
            { "name": "crate_small", "tags": ["crate"] },
            { "name": "crate_big", "tags": ["crate", "heavy"] }
        ]),
    );
    write(
        &dir.path().join("lights.json"),
        &json!({ "torch": { "tags": ["light"], "anti_tags": ["heavy"] } }),
    );
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let mut library = AssetLibrary::new();
    assert_eq!(library.load_directory(dir.path()).unwrap(), 3);

    let sources = [json!({ "spawn_groups": [{
        "spawn_id": "g",
        "priority": 0,
        "candidates": [{ "name": "#crate", "chance": 1 }, { "tag": "heavy", "chance": 0 }]
    }]})];
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let bounds = Bounds::from_size(50, 50);
    let planner =
        SpawnPlanner::with_rng(&sources, &bounds, &library, Vec::new(), &mut rng).unwrap();

    let crate_pick = &planner.spawn_queue()[0].candidates[0];
    assert_eq!(crate_pick.name, "crate_small");
    assert_eq!(crate_pick.info.map(|i| i.has_tag("crate")), Some(true));
}

#[test]
fn test_file_context_rewrites_room_file() {
    let dir = tempfile::tempdir().unwrap();
    let room_path = dir.path().join("room.json");
    let map_path = dir.path().join("map.json");
    write(&room_path, &json!({ "name": "cellar", "spawn_groups": [{ "name": "barrel" }] }));
    let map_record = json!({ "spawn_groups": [{
        "spawn_id": "map-1",
        "priority": 9,
        "name": "barrel",
        "resolve_geometry_to_room_size": false,
        "resolve_quantity_to_room_size": false
    }]});
    write(&map_path, &map_record);
    let map_before = fs::read_to_string(&map_path).unwrap();

    let mut library = AssetLibrary::new();
    library.load_from_json(r#"{"assets": [{"name": "barrel", "tags": ["container"]}]}"#).unwrap();

    let sources: Vec<Value> = [&room_path, &map_path]
        .iter()
        .map(|p| serde_json::from_str(&fs::read_to_string(p).unwrap()).unwrap())
        .collect();
    let contexts = vec![SourceContext::file(&room_path), SourceContext::file(&map_path)];
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let bounds = Bounds::from_size(80, 60);
    let planner =
        SpawnPlanner::with_rng(&sources, &bounds, &library, contexts, &mut rng).unwrap();

    assert_eq!(planner.dirty_sources(), vec![0]);
    assert_eq!(fs::read_to_string(&map_path).unwrap(), map_before);

    let room: Value = serde_json::from_str(&fs::read_to_string(&room_path).unwrap()).unwrap();
    assert_eq!(room["name"], json!("cellar"));
    let entry = &find_spawn_groups_array(&room).unwrap()[0];
    assert!(entry["spawn_id"].as_str().unwrap().starts_with("spn-"));
    assert_eq!(entry["priority"], json!(0));
    assert_eq!(entry["resolve_geometry_to_room_size"], json!(false));
}

#[test]
fn test_config_shapes_generated_ids_and_edge_inset() {
    let config = PlannerConfig::from_toml_str(
        r#"
spawn_id_prefix = "room-"
spawn_id_hex_len = 6
edge_inset_default = 150
"#,
    )
    .unwrap();

    let library = AssetLibrary::new();
    let sources = [json!({ "spawn_groups": [{ "position": "Edge" }] })];
    let flips = FlipOverrides::new();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let planner = SpawnPlanner::with_options(
        &sources,
        &Bounds::from_size(10, 10),
        &library,
        Vec::new(),
        PlanOptions { config: &config, flips: &flips },
        &mut rng,
    )
    .unwrap();

    let info = &planner.spawn_queue()[0];
    assert!(info.spawn_id.starts_with("room-"));
    assert_eq!(info.spawn_id.len(), "room-".len() + 6);
    assert_eq!(info.edge_inset_percent, 150);
    assert!(flips.get(&info.spawn_id).is_some());
}

#[test]
fn test_invalid_config_is_rejected() {
    let err =
        PlannerConfig::from_toml_str("edge_inset_min = 50\nedge_inset_max = 10\n").unwrap_err();
    assert!(matches!(err, PlannerError::Config(_)));
}

#[test]
fn test_authoring_helpers_prepare_entries_for_planning() {
    let mut room = json!({ "spawn_groups": [{
        "position": "Perimeter",
        "candidates": [{ "name": "lamp", "weight": 2 }, "junk"]
    }]});
    {
        let entry = &mut room["spawn_groups"][0];
        assert!(ensure_spawn_group_entry_defaults(entry, "Lamps", None));
        assert_eq!(entry["radius"], json!(200));
        assert_eq!(entry["display_name"], json!("Lamps"));
    }
    assert!(remove_asset_from_spawn_groups(&mut room, "lamp"));
    assert!(sanitize_spawn_group_candidates(&mut room["spawn_groups"][0]));
    assert_eq!(room["spawn_groups"][0]["candidates"], json!([{ "name": "null", "chance": 0 }]));

    let library = AssetLibrary::new();
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let bounds = Bounds::from_size(400, 400);
    let planner =
        SpawnPlanner::with_rng(&[room], &bounds, &library, Vec::new(), &mut rng).unwrap();
    let info = &planner.spawn_queue()[0];
    assert_eq!(info.name, "Lamps");
    assert_eq!(info.perimeter_radius, 200);
    assert!(info.candidates.iter().all(|c| c.is_null));
}
