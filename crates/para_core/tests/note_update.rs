use para_core::{
    parse_edits, parse_frontmatter, EngineConfig, MetaValue, NoteUpdater, ParseMode, UpdateError,
};
use std::fs;
use std::path::Path;

const ORIGINAL: &str = "\
---
title: Vendor review
status: draft
owner:
  name: kim
  team: ops
---
# Vendor review

- [ ] Collect quotes
";

fn backup_files(dir: &Path) -> Vec<std::path::PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .collect(),
        Err(_) => Vec::new(),
    }
}

#[test]
fn update_round_trips_edits_and_keeps_other_keys() {
    let dir = tempfile::tempdir().unwrap();
    let doc = dir.path().join("vendor.md");
    fs::write(&doc, ORIGINAL).unwrap();
    let updater = NoteUpdater::new(dir.path(), &EngineConfig::default());

    let edits = parse_edits(["status=active", "priority=2", "owner={team: platform}"]).unwrap();
    updater.update(&doc, edits).unwrap();

    let text = fs::read_to_string(&doc).unwrap();
    let parsed = parse_frontmatter(&text, ParseMode::Strict).unwrap();
    let metadata = parsed.metadata;
    assert_eq!(metadata.get("title"), Some(&MetaValue::from("Vendor review")));
    assert_eq!(metadata.get("status"), Some(&MetaValue::from("active")));
    assert_eq!(metadata.get("priority"), Some(&MetaValue::Integer(2)));

    let owner = metadata.get("owner").and_then(MetaValue::as_map).unwrap();
    assert_eq!(owner.get("name"), Some(&MetaValue::from("kim")));
    assert_eq!(owner.get("team"), Some(&MetaValue::from("platform")));

    let keys = metadata.keys().collect::<Vec<_>>();
    assert_eq!(keys, vec!["title", "status", "owner", "priority"]);
    assert_eq!(parsed.body, "# Vendor review\n\n- [ ] Collect quotes\n");
}

#[test]
fn each_update_leaves_exactly_one_new_backup_of_previous_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let doc = dir.path().join("vendor.md");
    fs::write(&doc, ORIGINAL).unwrap();
    let updater = NoteUpdater::new(dir.path(), &EngineConfig::default());
    let backup_dir = updater.backups().backup_dir().to_path_buf();

    let first = updater
        .update(&doc, parse_edits(["status=active"]).unwrap())
        .unwrap();
    assert_eq!(backup_files(&backup_dir), vec![first.backup_path.clone()]);
    assert_eq!(fs::read_to_string(&first.backup_path).unwrap(), ORIGINAL);

    let before_second = fs::read(&doc).unwrap();
    let second = updater
        .update(&doc, parse_edits(["status=done"]).unwrap())
        .unwrap();
    assert_ne!(first.backup_path, second.backup_path);
    assert_eq!(backup_files(&backup_dir).len(), 2);
    assert_eq!(fs::read(&second.backup_path).unwrap(), before_second);
    assert_eq!(fs::read_to_string(&first.backup_path).unwrap(), ORIGINAL);
}

#[test]
fn update_leaves_no_temp_files_behind() {
    let dir = tempfile::tempdir().unwrap();
    let doc = dir.path().join("vendor.md");
    fs::write(&doc, ORIGINAL).unwrap();
    let updater = NoteUpdater::new(dir.path(), &EngineConfig::default());

    updater
        .update(&doc, parse_edits(["status=active"]).unwrap())
        .unwrap();

    let names = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    assert!(names.iter().all(|name| !name.ends_with(".tmp")), "{names:?}");
}

#[test]
fn blocked_backup_aborts_update_and_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let doc = dir.path().join("vendor.md");
    fs::write(&doc, ORIGINAL).unwrap();
    fs::write(dir.path().join(".backups"), "a file, not a directory").unwrap();
    let modified_before = fs::metadata(&doc).unwrap().modified().unwrap();
    let updater = NoteUpdater::new(dir.path(), &EngineConfig::default());

    let err = updater
        .update(&doc, parse_edits(["status=active"]).unwrap())
        .unwrap_err();

    assert!(matches!(err, UpdateError::Backup(_)));
    assert_eq!(fs::read_to_string(&doc).unwrap(), ORIGINAL);
    assert_eq!(fs::metadata(&doc).unwrap().modified().unwrap(), modified_before);
}

#[cfg(unix)]
#[test]
fn failed_write_keeps_original_and_its_backup() {
    let dir = tempfile::tempdir().unwrap();
    // Fits the 255-byte name limit, but the sibling temp file does not.
    let doc = dir.path().join(format!("n.{}", "m".repeat(248)));
    fs::write(&doc, ORIGINAL).unwrap();
    let modified_before = fs::metadata(&doc).unwrap().modified().unwrap();
    let updater = NoteUpdater::new(dir.path(), &EngineConfig::default());

    let err = updater
        .update(&doc, parse_edits(["status=active"]).unwrap())
        .unwrap_err();

    assert!(matches!(err, UpdateError::AtomicWrite { .. }), "{err}");
    assert_eq!(fs::read_to_string(&doc).unwrap(), ORIGINAL);
    assert_eq!(fs::metadata(&doc).unwrap().modified().unwrap(), modified_before);

    let backups = backup_files(updater.backups().backup_dir());
    assert_eq!(backups.len(), 1);
    assert_eq!(fs::read_to_string(&backups[0]).unwrap(), ORIGINAL);

    let leftovers = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .count();
    assert_eq!(leftovers, 0);
}

#[test]
fn unsigned_ids_beyond_i64_survive_an_update() {
    let dir = tempfile::tempdir().unwrap();
    let doc = dir.path().join("ids.md");
    fs::write(&doc, "---\nid: 18446744073709551615\n---\nbody\n").unwrap();
    let updater = NoteUpdater::new(dir.path(), &EngineConfig::default());

    updater.update(&doc, parse_edits(["a=1"]).unwrap()).unwrap();

    let text = fs::read_to_string(&doc).unwrap();
    assert!(text.contains("id: 18446744073709551615\n"), "{text}");
    let parsed = parse_frontmatter(&text, ParseMode::Strict).unwrap();
    assert_eq!(parsed.metadata.get("id"), Some(&MetaValue::UInteger(u64::MAX)));
    assert_eq!(parsed.metadata.get("a"), Some(&MetaValue::Integer(1)));
}

#[test]
fn missing_file_fails_without_backup() {
    let dir = tempfile::tempdir().unwrap();
    let updater = NoteUpdater::new(dir.path(), &EngineConfig::default());

    let err = updater
        .update(dir.path().join("absent.md"), parse_edits(["a=1"]).unwrap())
        .unwrap_err();

    assert!(matches!(err, UpdateError::MissingFile { .. }));
    assert!(!updater.backups().backup_dir().exists());
}

#[test]
fn unterminated_metadata_fails_without_backup() {
    let dir = tempfile::tempdir().unwrap();
    let doc = dir.path().join("draft.md");
    fs::write(&doc, "---\ntitle: never closed\n").unwrap();
    let updater = NoteUpdater::new(dir.path(), &EngineConfig::default());

    let err = updater.update(&doc, parse_edits(["a=1"]).unwrap()).unwrap_err();

    assert!(matches!(err, UpdateError::Metadata { .. }));
    assert!(!updater.backups().backup_dir().exists());
    assert_eq!(fs::read_to_string(&doc).unwrap(), "---\ntitle: never closed\n");
}

#[test]
fn document_without_metadata_gains_a_block() {
    let dir = tempfile::tempdir().unwrap();
    let doc = dir.path().join("plain.md");
    fs::write(&doc, "Plain body\n").unwrap();
    let updater = NoteUpdater::new(dir.path(), &EngineConfig::default());

    updater
        .update(&doc, parse_edits(["tags=[x, y]"]).unwrap())
        .unwrap();

    assert_eq!(
        fs::read_to_string(&doc).unwrap(),
        "---\ntags:\n- x\n- y\n---\nPlain body\n"
    );
}

#[test]
fn custom_backup_location_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let doc = dir.path().join("vendor.md");
    fs::write(&doc, ORIGINAL).unwrap();
    let config = EngineConfig::parse_yaml("backup_dir: _history\nbackup_extension: orig\n").unwrap();
    let updater = NoteUpdater::new(dir.path(), &config);

    let outcome = updater
        .update(&doc, parse_edits(["status=active"]).unwrap())
        .unwrap();

    assert!(outcome.backup_path.starts_with(dir.path().join("_history")));
    assert_eq!(
        outcome.backup_path.extension().and_then(|ext| ext.to_str()),
        Some("orig")
    );
}
