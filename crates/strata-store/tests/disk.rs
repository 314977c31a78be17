//! Disk-backed provider tests using real temporary directories.

use strata_codec::{DecodeOptions, ValueNode};
use strata_schema::{FieldKind, NamingPolicy, RecordDescription, RecordSchema, SchemaOptions};
use strata_store::{load_record, save_record, DiskStore, StorageProvider, StoreError};
use tempfile::TempDir;

fn person_schema() -> RecordSchema {
    let desc = RecordDescription::new("disk_tests::Person")
        .property("first_name", FieldKind::Text)
        .property("age", FieldKind::Float);
    let options = SchemaOptions {
        naming_policy: NamingPolicy::CamelCase,
        ..Default::default()
    };
    RecordSchema::build(&desc, &options).unwrap()
}

#[test]
fn test_open_creates_root() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("store/sub");
    let store = DiskStore::open(&root).unwrap();
    assert!(root.is_dir());
    assert_eq!(store.root(), root);
}

#[test]
fn test_write_read_delete() {
    let dir = TempDir::new().unwrap();
    let store = DiskStore::open(dir.path()).unwrap();

    assert!(!store.exists("a/b.txt").unwrap());
    store.write("a/b.txt", b"hello").unwrap();
    assert!(store.exists("a/b.txt").unwrap());
    assert_eq!(store.read("a/b.txt").unwrap(), b"hello");

    store.delete("a/b.txt", false).unwrap();
    assert!(!store.exists("a/b.txt").unwrap());
    assert!(matches!(
        store.read("a/b.txt"),
        Err(StoreError::NotFound { .. })
    ));
}

#[test]
fn test_recursive_delete() {
    let dir = TempDir::new().unwrap();
    let store = DiskStore::open(dir.path()).unwrap();
    store.write("tree/one", b"1").unwrap();
    store.write("tree/deep/two", b"2").unwrap();

    assert!(store.delete("tree", false).is_err());
    store.delete("tree", true).unwrap();
    assert!(!store.exists("tree").unwrap());
}

#[test]
fn test_enumerate_sorted() {
    let dir = TempDir::new().unwrap();
    let store = DiskStore::open(dir.path()).unwrap();
    store.write("dir/b.txt", b"").unwrap();
    store.write("dir/a.txt", b"").unwrap();
    store.write("dir/sub/c.txt", b"").unwrap();

    let entries = store.enumerate("dir").unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["a.txt", "b.txt", "sub"]);
    assert!(entries[2].is_dir);
    assert!(!entries[0].is_dir);
}

#[test]
fn test_path_escape_rejected() {
    let dir = TempDir::new().unwrap();
    let store = DiskStore::open(dir.path()).unwrap();
    for path in ["../outside", "a/../../outside", "/etc/passwd"] {
        assert!(
            matches!(store.write(path, b"x"), Err(StoreError::InvalidPath { .. })),
            "path {path:?} was not rejected"
        );
    }
}

#[test]
fn test_record_round_trip_on_disk() {
    let dir = TempDir::new().unwrap();
    let store = DiskStore::open(dir.path()).unwrap();
    let schema = person_schema();

    let value = ValueNode::record(vec![
        ("first_name".to_string(), ValueNode::text("Ada")),
        ("age".to_string(), ValueNode::float(30.0)),
    ]);
    save_record(&store, "people/ada.rec", &schema, &value).unwrap();

    let on_disk = std::fs::read_to_string(dir.path().join("people/ada.rec")).unwrap();
    assert_eq!(on_disk, "{firstName: \"Ada\", age: 30}");

    let back =
        load_record(&store, "people/ada.rec", &schema, &DecodeOptions::default()).unwrap();
    assert_eq!(back, value);
}

#[test]
fn test_hand_edited_record_with_extra_field() {
    let dir = TempDir::new().unwrap();
    let store = DiskStore::open(dir.path()).unwrap();
    let schema = person_schema();

    // Unknown fields in a stored record survive a load/save cycle.
    store
        .write("ada.rec", b"{firstName: \"Ada\", age: 30, legacyId: 7}")
        .unwrap();
    let value = load_record(&store, "ada.rec", &schema, &DecodeOptions::default()).unwrap();
    save_record(&store, "ada.rec", &schema, &value).unwrap();
    assert_eq!(
        store.read("ada.rec").unwrap(),
        b"{firstName: \"Ada\", age: 30, legacyId: 7}"
    );
}
