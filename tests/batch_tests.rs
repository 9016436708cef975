//! Batch tests over a directory of merged tool records
//!
//! Records and schemas mimic the open software base data: one block per
//! origin (`wikidata`, `civicstack`, `debian_appstream`, ...) merged into a
//! single file per tool.

use canonicalize::{run_batch, Settings};
use serde_json::json;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const DEFAULT_SCHEMA: &str = "\
name:
  - debian_appstream.Name.C
  - wikidata.label.0.value
  - civicstack.name
license:
  - wikidata.license_label.0.value
  - civicstack.license.name.en
longDescription:
  en:
    - civicstack.description.en
  fr:
    - ogptoolbox-framacalc.Description
tags[]:
  - civicstack.tags
  - debian_appstream.Categories
";

const ETHERPAD: &str = "\
_source: merge
wikidata:
  label:
    - value: Etherpad
  license_label:
    - value: Apache License 2.0
debian_appstream:
  Categories:
    - Office
    - Network
civicstack:
  name: etherpad
  tags: Collaboration
  description:
    en: Real-time collaborative editor
name: Etherpad
";

const LOOMIO: &str = "\
civicstack:
  name: Loomio
  license:
    name:
      en: AGPL
name: Loomio
";

struct Workspace {
    _tmp: TempDir,
    data: PathBuf,
    priorities: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let data = tmp.path().join("data");
        let priorities = tmp.path().join("priorities");
        fs::create_dir_all(&data).unwrap();
        fs::create_dir_all(&priorities).unwrap();
        fs::write(priorities.join("_default.yaml"), DEFAULT_SCHEMA).unwrap();
        Self {
            _tmp: tmp,
            data,
            priorities,
        }
    }

    fn settings(&self) -> Settings {
        Settings::build(None, Some(json!({"priorities": {"dir": self.priorities}}))).unwrap()
    }

    fn write_record(&self, name: &str, text: &str) -> PathBuf {
        let path = self.data.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    fn canonical(&self, name: &str) -> Value {
        let text = fs::read_to_string(self.data.join(name)).unwrap();
        let record: Value = serde_yaml::from_str(&text).unwrap();
        record["canonical"].clone()
    }
}

fn top_level_keys(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|line| !line.starts_with(' ') && !line.starts_with('-'))
        .filter_map(|line| line.split(':').next())
        .map(str::to_string)
        .collect()
}

fn field(source: &str, value: Value) -> Value {
    let mut map = serde_yaml::Mapping::new();
    map.insert("source".into(), source.into());
    map.insert("value".into(), value);
    Value::Mapping(map)
}

#[test]
fn test_first_match_follows_priority_order() {
    let ws = Workspace::new();
    ws.write_record("etherpad.yaml", ETHERPAD);

    let summary = run_batch(&ws.data, &ws.settings()).unwrap();
    assert_eq!(summary.files_updated, 1);

    let canonical = ws.canonical("etherpad.yaml");
    assert_eq!(canonical["name"], field("wikidata", "Etherpad".into()));
    assert_eq!(canonical["license"], field("wikidata", "Apache License 2.0".into()));
}

#[test]
fn test_lower_priority_source_fills_gaps() {
    let ws = Workspace::new();
    ws.write_record("loomio.yaml", LOOMIO);

    run_batch(&ws.data, &ws.settings()).unwrap();

    let canonical = ws.canonical("loomio.yaml");
    assert_eq!(canonical["name"], field("civicstack", "Loomio".into()));
    assert_eq!(canonical["license"], field("civicstack", "AGPL".into()));
}

#[test]
fn test_accumulating_field_collects_all_sources() {
    let ws = Workspace::new();
    ws.write_record("etherpad.yaml", ETHERPAD);

    run_batch(&ws.data, &ws.settings()).unwrap();

    let canonical = ws.canonical("etherpad.yaml");
    let expected = Value::Sequence(vec![
        field("civicstack", "Collaboration".into()),
        field("debian_appstream", "Office".into()),
        field("debian_appstream", "Network".into()),
    ]);
    assert_eq!(canonical["tags"], expected);
    assert!(canonical.get("tags[]").is_none());
}

#[test]
fn test_unresolved_fields_are_omitted() {
    let ws = Workspace::new();
    ws.write_record("loomio.yaml", LOOMIO);

    run_batch(&ws.data, &ws.settings()).unwrap();

    let canonical = ws.canonical("loomio.yaml");
    let map = canonical.as_mapping().unwrap();
    assert!(map.get("tags").is_none());
    assert!(map.get("longDescription").is_none());
    assert_eq!(map.len(), 2);
}

#[test]
fn test_nested_schema_keeps_shape() {
    let ws = Workspace::new();
    ws.write_record("etherpad.yaml", ETHERPAD);

    run_batch(&ws.data, &ws.settings()).unwrap();

    let canonical = ws.canonical("etherpad.yaml");
    let description = &canonical["longDescription"];
    assert_eq!(
        description["en"],
        field("civicstack", "Real-time collaborative editor".into())
    );
    assert!(description.get("fr").is_none());
}

#[test]
fn test_override_replaces_default_node() {
    let ws = Workspace::new();
    fs::write(
        ws.priorities.join("etherpad.yaml"),
        "name:\n  - civicstack.name\nlongDescription:\n  fr:\n    - civicstack.description.en\n",
    )
    .unwrap();
    ws.write_record("etherpad.yaml", ETHERPAD);
    ws.write_record("loomio.yaml", LOOMIO);

    run_batch(&ws.data, &ws.settings()).unwrap();

    let etherpad = ws.canonical("etherpad.yaml");
    assert_eq!(etherpad["name"], field("civicstack", "etherpad".into()));
    // Overridden subtree: `en` is gone, not merged in from the default.
    assert!(etherpad["longDescription"].get("en").is_none());
    assert_eq!(
        etherpad["longDescription"]["fr"],
        field("civicstack", "Real-time collaborative editor".into())
    );
    // Untouched fields still come from the default schema.
    assert_eq!(etherpad["license"], field("wikidata", "Apache License 2.0".into()));

    // The override only applies to the record it is named after.
    let loomio = ws.canonical("loomio.yaml");
    assert_eq!(loomio["name"], field("civicstack", "Loomio".into()));
}

#[test]
fn test_key_order() {
    let ws = Workspace::new();
    let path = ws.write_record("etherpad.yaml", ETHERPAD);

    run_batch(&ws.data, &ws.settings()).unwrap();

    assert_eq!(
        top_level_keys(&path),
        vec![
            "_source",
            "name",
            "canonical",
            "civicstack",
            "debian_appstream",
            "wikidata"
        ]
    );
}

#[test]
fn test_second_run_is_byte_identical() {
    let ws = Workspace::new();
    let path = ws.write_record("etherpad.yaml", ETHERPAD);
    ws.write_record("loomio.yaml", LOOMIO);

    let first = run_batch(&ws.data, &ws.settings()).unwrap();
    assert_eq!(first.files_updated, 2);
    let after_first = fs::read_to_string(&path).unwrap();

    let second = run_batch(&ws.data, &ws.settings()).unwrap();
    assert_eq!(second.files_updated, 0);
    assert_eq!(second.files_unchanged, 2);
    assert_eq!(fs::read_to_string(&path).unwrap(), after_first);
}

#[test]
fn test_malformed_record_does_not_stop_batch() {
    let ws = Workspace::new();
    ws.write_record("a-broken.yaml", "civicstack: [unclosed\n");
    ws.write_record("etherpad.yaml", ETHERPAD);
    ws.write_record("loomio.yml", LOOMIO);

    let summary = run_batch(&ws.data, &ws.settings()).unwrap();
    assert_eq!(summary.files_found, 3);
    assert_eq!(summary.files_failed, 1);
    assert_eq!(summary.files_processed(), 2);
    assert!(summary.failures[0].path.ends_with("a-broken.yaml"));

    assert_eq!(
        fs::read_to_string(ws.data.join("a-broken.yaml")).unwrap(),
        "civicstack: [unclosed\n"
    );
    assert!(ws.canonical("loomio.yml").get("name").is_some());
}

#[test]
fn test_invalid_override_only_fails_its_record() {
    let ws = Workspace::new();
    fs::write(ws.priorities.join("loomio.yaml"), "name: civicstack.name\n").unwrap();
    ws.write_record("etherpad.yaml", ETHERPAD);
    ws.write_record("loomio.yaml", LOOMIO);

    let summary = run_batch(&ws.data, &ws.settings()).unwrap();
    assert_eq!(summary.files_updated, 1);
    assert_eq!(summary.files_failed, 1);
    assert!(summary.failures[0].error.contains("name"));
}

#[test]
fn test_other_files_are_ignored() {
    let ws = Workspace::new();
    ws.write_record("etherpad.yaml", ETHERPAD);
    ws.write_record("README.md", "# data\n");
    ws.write_record("loomio.YAML", LOOMIO);

    let summary = run_batch(&ws.data, &ws.settings()).unwrap();
    assert_eq!(summary.files_found, 1);
    assert_eq!(fs::read_to_string(ws.data.join("loomio.YAML")).unwrap(), LOOMIO);
}
