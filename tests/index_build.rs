// Index build guard rails: ordering, determinism, hashing and rejection rules.
#[path = "support/common.rs"]
mod common;

use anyhow::Result;
use chrono::{TimeZone, Utc};
use defindex::{BuildConfig, IndexSchema, build_index, sha256_hex};
use serde_json::json;
use std::fs;

use common::{DefsTree, definition, item_paths, read_index};

#[test]
fn items_follow_directory_then_file_order() -> Result<()> {
    let tree = DefsTree::new()?;
    for app in ["b", "a"] {
        for file in ["2.json", "1.json"] {
            let id = format!("com.example.{app}{}", &file[..1]);
            tree.write_definition(app, file, &definition(&id, app, Some("1")))?;
        }
    }

    build_index(&BuildConfig::from_root(tree.root()), Utc::now)?;
    let index = read_index(&tree.index_path())?;
    assert_eq!(
        item_paths(&index),
        vec![
            "defs/a/1.json",
            "defs/a/2.json",
            "defs/b/1.json",
            "defs/b/2.json"
        ]
    );
    Ok(())
}

#[test]
fn rebuilding_yields_identical_items() -> Result<()> {
    let tree = DefsTree::new()?;
    tree.write_definition(
        "chrome",
        "chrome.json",
        &definition("com.google.Chrome", "chrome", None),
    )?;
    tree.write_definition(
        "zoom",
        "zoom.json",
        &definition("us.zoom.xos", "zoom", Some("5.17")),
    )?;
    tree.write_raw("zoom", "broken.json", b"{ nope")?;
    let config = BuildConfig::from_root(tree.root());

    build_index(&config, || Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())?;
    let first = read_index(&tree.index_path())?;
    build_index(&config, || Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())?;
    let second = read_index(&tree.index_path())?;

    assert_eq!(
        serde_json::to_vec(&first["items"])?,
        serde_json::to_vec(&second["items"])?
    );
    assert_eq!(second["generated_at"], json!("2024-01-02T00:00:00Z"));
    Ok(())
}

#[test]
fn unversioned_definition_uses_digest_prefix() -> Result<()> {
    let tree = DefsTree::new()?;
    let bytes =
        tree.write_definition("app", "app.json", &definition("com.example.app", "app", None))?;

    let report = build_index(&BuildConfig::from_root(tree.root()), Utc::now)?;
    let item = &report.document.items[0];
    let digest = sha256_hex(&bytes);
    assert_eq!(item.sha256, digest);
    assert_eq!(item.version, &digest[..8]);

    // Flip one byte (inside a string value) and rebuild.
    let mut changed = bytes.clone();
    let pos = changed
        .windows(4)
        .position(|w| w == b"2025")
        .expect("timestamp present");
    changed[pos + 3] = b'6';
    tree.write_raw("app", "app.json", &changed)?;

    let report = build_index(&BuildConfig::from_root(tree.root()), Utc::now)?;
    let item = &report.document.items[0];
    assert_ne!(item.sha256, digest);
    assert_ne!(item.version, &digest[..8]);
    assert_eq!(item.version, &sha256_hex(&changed)[..8]);
    Ok(())
}

#[test]
fn definition_without_bundle_id_is_dropped() -> Result<()> {
    let tree = DefsTree::new()?;
    tree.write_definition("a", "good.json", &definition("com.example.a", "a", Some("1")))?;
    tree.write_definition("b", "good.json", &definition("com.example.b", "b", Some("1")))?;
    let config = BuildConfig::from_root(tree.root());
    let baseline = build_index(&config, Utc::now)?.item_count();

    let mut missing = definition("com.example.b", "b", Some("1"));
    missing["uninstall"]
        .as_object_mut()
        .expect("uninstall object")
        .remove("bundleId");
    tree.write_definition("b", "good.json", &missing)?;

    let report = build_index(&config, Utc::now)?;
    assert_eq!(report.item_count(), baseline - 1);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].path, "defs/b/good.json");
    assert!(report.rejected[0].to_string().contains("defs/b/good.json"));
    Ok(())
}

#[test]
fn malformed_json_does_not_block_later_files() -> Result<()> {
    let tree = DefsTree::new()?;
    tree.write_raw("a", "1.json", b"{\"name\": \"a\",,}")?;
    tree.write_definition("a", "2.json", &definition("com.example.a2", "a2", Some("1")))?;
    tree.write_definition("b", "1.json", &definition("com.example.b1", "b1", Some("1")))?;

    let report = build_index(&BuildConfig::from_root(tree.root()), Utc::now)?;
    let ids: Vec<_> = report.document.items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["com.example.a2", "com.example.b1"]);
    assert_eq!(report.rejected.len(), 1);
    assert!(
        report.rejected[0]
            .to_string()
            .starts_with("Skipping invalid JSON: defs/a/1.json")
    );
    Ok(())
}

#[test]
fn empty_tree_still_writes_an_index() -> Result<()> {
    let tree = DefsTree::new()?;
    fs::write(tree.index_path(), "stale")?;

    let report = build_index(&BuildConfig::from_root(tree.root()), Utc::now)?;
    assert_eq!(report.item_count(), 0);
    let index = read_index(&tree.index_path())?;
    assert_eq!(index["schema_version"], json!(1));
    assert_eq!(index["items"], json!([]));
    Ok(())
}

#[test]
fn written_index_is_pretty_schema_valid_json() -> Result<()> {
    let tree = DefsTree::new()?;
    tree.write_definition(
        "café",
        "déf.json",
        &definition("com.example.cafe", "Café", Some("2")),
    )?;

    build_index(&BuildConfig::from_root(tree.root()), Utc::now)?;
    let text = fs::read_to_string(tree.index_path())?;
    assert!(text.starts_with("{\n  \"schema_version\": 1,\n  \"generated_at\": \""));
    assert!(text.ends_with("}\n") && !text.ends_with("\n\n"));
    assert!(text.contains("\"path\": \"defs/café/déf.json\""));
    assert!(!text.contains('\\'));

    let value = read_index(&tree.index_path())?;
    IndexSchema::bundled()?.validate(&value)?;
    Ok(())
}

#[test]
fn previous_index_is_fully_replaced() -> Result<()> {
    let tree = DefsTree::new()?;
    tree.write_definition("a", "a.json", &definition("com.example.a", "a", Some("1")))?;
    tree.write_definition("b", "b.json", &definition("com.example.b", "b", Some("1")))?;
    let config = BuildConfig::from_root(tree.root());
    build_index(&config, Utc::now)?;

    fs::remove_dir_all(tree.root().join("defs/b"))?;
    build_index(&config, Utc::now)?;
    let index = read_index(&tree.index_path())?;
    assert_eq!(item_paths(&index), vec!["defs/a/a.json"]);

    let leftovers: Vec<_> = fs::read_dir(tree.root())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temp files left behind: {leftovers:?}");
    Ok(())
}

#[cfg(unix)]
#[test]
fn rebuild_keeps_index_readable_by_others() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let tree = DefsTree::new()?;
    tree.write_definition("a", "a.json", &definition("com.example.a", "a", Some("1")))?;
    fs::write(tree.index_path(), "{}")?;
    fs::set_permissions(tree.index_path(), fs::Permissions::from_mode(0o644))?;

    build_index(&BuildConfig::from_root(tree.root()), Utc::now)?;
    let mode = fs::metadata(tree.index_path())?.permissions().mode() & 0o777;
    assert_eq!(mode, 0o644, "index mode after rebuild: {mode:o}");
    Ok(())
}
