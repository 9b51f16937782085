//! Save/load tests for mapping documents

use std::fs;

use textshift_mapping::{Error, MappingStore, MappingTable};

#[test]
fn test_round_trip_preserves_rules_and_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = MappingStore::new(dir.path().join("mappings.json"));

    let mut table = MappingTable::new();
    table.insert("ı", "ì").unwrap();
    table.insert("a", "b").unwrap();
    table.insert("Ş", "É").unwrap();
    table.insert("->", "→").unwrap();

    store.save(&table).unwrap();
    let loaded = store.load().unwrap();

    assert_eq!(loaded, table);
    let order: Vec<_> = loaded.iter().map(|(from, _)| from).collect();
    assert_eq!(order, vec!["ı", "a", "Ş", "->"]);
}

#[test]
fn test_builtin_table_document_is_human_readable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("builtin.json");
    let store = MappingStore::new(&path);

    store.save(&MappingTable::builtin()).unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"Ğ\": \"ß\""));
    assert!(!raw.contains("\\u"));
    assert!(raw.lines().nth(1).unwrap().starts_with("    \""));
}

#[test]
fn test_saving_again_replaces_previous_document() {
    let dir = tempfile::tempdir().unwrap();
    let store = MappingStore::new(dir.path().join("mappings.json"));

    store.save(&MappingTable::builtin()).unwrap();

    let replacement = MappingTable::from_pairs([("x", "y")]);
    store.save(&replacement).unwrap();

    assert_eq!(store.load().unwrap(), replacement);
}

#[test]
fn test_documents_written_by_other_tools_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("external.json");
    fs::write(&path, "{\"\\u011f\": \"\\u00ea\", \"b\": \"c\"}").unwrap();

    let table = MappingStore::new(&path).load().unwrap();
    assert_eq!(table.get("ğ"), Some("ê"));
    assert_eq!(table.apply("ğb"), "êc");
}

#[test]
fn test_malformed_document_reports_format_error_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{\"a\": [1, 2]}").unwrap();

    let err = MappingStore::new(&path).load().unwrap_err();
    match err {
        Error::Format { path: reported, .. } => {
            assert!(reported.ends_with("broken.json"));
        }
        other => panic!("expected format error, got {other:?}"),
    }
}
