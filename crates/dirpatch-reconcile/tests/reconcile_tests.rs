use dirpatch_reconcile::{
    Change, PatchFormat, PatchWriter, ReconcileConfig, Reconciler, TimestampZone,
};
use dirpatch_scan::{FingerprintKind, ScanConfig, ScanResult, TreeScanner};
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tempfile::TempDir;

const MODIFIED: u64 = 1_600_000_000;
const GENERATED: u64 = 1_700_000_000;

fn at(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

/// Write a file and pin its modification time.
fn write_file(root: &Path, relative: &str, content: &str, modified: SystemTime) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    fs::File::options()
        .write(true)
        .open(&path)
        .unwrap()
        .set_modified(modified)
        .unwrap();
}

fn scan_both(a: &Path, b: &Path, kind: FingerprintKind) -> (ScanResult, ScanResult) {
    let config = ScanConfig::builder()
        .root(a)
        .fingerprint(kind)
        .build()
        .unwrap();
    TreeScanner::new()
        .scan_pair(&config, &config.with_root(b))
        .unwrap()
}

fn render(a: &ScanResult, b: &ScanResult, writer: PatchWriter) -> String {
    let outcome = Reconciler::new().reconcile(a, b).unwrap();
    writer
        .with_zone(TimestampZone::Utc)
        .render("X", "Y", &outcome, at(GENERATED))
        .unwrap()
}

#[test]
fn test_file_only_in_first_tree_is_added_to_second() {
    let x = TempDir::new().unwrap();
    let y = TempDir::new().unwrap();
    write_file(x.path(), "a.txt", "hello", at(MODIFIED));

    let (scan_x, scan_y) = scan_both(x.path(), y.path(), FingerprintKind::Md5);
    let report = render(&scan_x, &scan_y, PatchWriter::new());

    assert_eq!(
        report,
        "# Results for 2023-11-14 22:13:20\n\
         # Reconciled 'X' 'Y'\n\
         X\n\
         \n\
         Y\n\
         + a.txt (2020-09-13 12:26:40 | 5 bytes)\n\
         \n"
    );
}

#[test]
fn test_identical_files_are_unchanged() {
    let x = TempDir::new().unwrap();
    let y = TempDir::new().unwrap();
    write_file(x.path(), "a.txt", "hello", at(MODIFIED));
    write_file(y.path(), "a.txt", "hello", at(MODIFIED));

    let (scan_x, scan_y) = scan_both(x.path(), y.path(), FingerprintKind::Sha256);
    let report = render(&scan_x, &scan_y, PatchWriter::new());

    assert_eq!(
        report,
        "# Results for 2023-11-14 22:13:20\n\
         # Reconciled 'X' 'Y'\n\
         X\n\
         = a.txt (2020-09-13 12:26:40 | 5 bytes)\n\
         \n\
         Y\n\
         = a.txt (2020-09-13 12:26:40 | 5 bytes)\n\
         \n"
    );

    let quiet = render(&scan_x, &scan_y, PatchWriter::new().with_ignore_unchanged(true));
    assert_eq!(
        quiet,
        "# Results for 2023-11-14 22:13:20\n# Reconciled 'X' 'Y'\nX\n\nY\n\n"
    );
}

#[test]
fn test_differing_files_conflict_with_own_record() {
    let x = TempDir::new().unwrap();
    let y = TempDir::new().unwrap();
    write_file(x.path(), "a.txt", "hello", at(MODIFIED));
    write_file(y.path(), "a.txt", "goodbye", at(MODIFIED + 60));

    let (scan_x, scan_y) = scan_both(x.path(), y.path(), FingerprintKind::Crc32);
    let report = render(&scan_x, &scan_y, PatchWriter::new());

    assert_eq!(
        report,
        "# Results for 2023-11-14 22:13:20\n\
         # Reconciled 'X' 'Y'\n\
         X\n\
         ! a.txt (2020-09-13 12:26:40 | 5 bytes)\n\
         \n\
         Y\n\
         ! a.txt (2020-09-13 12:27:40 | 7 bytes)\n\
         \n"
    );
}

#[test]
fn test_same_content_different_mtime_is_a_conflict() {
    let x = TempDir::new().unwrap();
    let y = TempDir::new().unwrap();
    write_file(x.path(), "a.txt", "hello", at(MODIFIED));
    write_file(y.path(), "a.txt", "hello", at(MODIFIED + 5));

    let (scan_x, scan_y) = scan_both(x.path(), y.path(), FingerprintKind::Sha1);

    let strict = Reconciler::new().reconcile(&scan_x, &scan_y).unwrap();
    assert_eq!(strict.a.conflict.len(), 1);

    let config = ReconcileConfig::builder()
        .mtime_tolerance(Duration::from_secs(10))
        .build()
        .unwrap();
    let lenient = Reconciler::with_config(config)
        .reconcile(&scan_x, &scan_y)
        .unwrap();
    assert_eq!(lenient.a.unchanged.len(), 1);
}

#[test]
fn test_nested_path_is_root_independent() {
    let x = TempDir::new().unwrap();
    let y = TempDir::new().unwrap();
    write_file(x.path(), "sub/b.txt", "b", at(MODIFIED));

    let (scan_x, scan_y) = scan_both(x.path(), y.path(), FingerprintKind::Adler32);
    let outcome = Reconciler::new().reconcile(&scan_x, &scan_y).unwrap();

    assert_eq!(outcome.b.added.len(), 1);
    assert_eq!(outcome.b.added[0].relative_path, "sub/b.txt");
    assert!(outcome.a.is_empty());
}

#[test]
fn test_mixed_tree_sections_are_sorted() {
    let x = TempDir::new().unwrap();
    let y = TempDir::new().unwrap();
    write_file(x.path(), "m/same.txt", "same", at(MODIFIED));
    write_file(y.path(), "m/same.txt", "same", at(MODIFIED));
    write_file(x.path(), "z_only_x.txt", "x", at(MODIFIED));
    write_file(y.path(), "a_only_y.txt", "y", at(MODIFIED));
    write_file(x.path(), "b/diff.txt", "left", at(MODIFIED));
    write_file(y.path(), "b/diff.txt", "right!", at(MODIFIED));

    let (scan_x, scan_y) = scan_both(x.path(), y.path(), FingerprintKind::Blake3);
    let outcome = Reconciler::new().reconcile(&scan_x, &scan_y).unwrap();
    let writer = PatchWriter::new();

    let side_x: Vec<(Change, String)> = writer
        .lines(&outcome.a)
        .into_iter()
        .map(|l| (l.change, l.record.relative_path.to_string()))
        .collect();
    assert_eq!(
        side_x,
        vec![
            (Change::Added, "a_only_y.txt".to_string()),
            (Change::Conflict, "b/diff.txt".to_string()),
            (Change::Unchanged, "m/same.txt".to_string()),
        ]
    );

    let side_y: Vec<(Change, String)> = writer
        .lines(&outcome.b)
        .into_iter()
        .map(|l| (l.change, l.record.relative_path.to_string()))
        .collect();
    assert_eq!(
        side_y,
        vec![
            (Change::Conflict, "b/diff.txt".to_string()),
            (Change::Unchanged, "m/same.txt".to_string()),
            (Change::Added, "z_only_x.txt".to_string()),
        ]
    );

    for lines in [writer.lines(&outcome.a), writer.lines(&outcome.b)] {
        assert!(lines
            .windows(2)
            .all(|w| w[0].record.relative_path <= w[1].record.relative_path));
    }
}

#[test]
fn test_repeated_runs_render_identically() {
    let x = TempDir::new().unwrap();
    let y = TempDir::new().unwrap();
    for i in 0..20 {
        write_file(x.path(), &format!("d{}/f{i}.txt", i % 3), &"x".repeat(i), at(MODIFIED));
        if i % 2 == 0 {
            write_file(y.path(), &format!("d{}/f{i}.txt", i % 3), &"x".repeat(i), at(MODIFIED));
        }
    }

    let first = {
        let (a, b) = scan_both(x.path(), y.path(), FingerprintKind::Md5);
        render(&a, &b, PatchWriter::new())
    };
    let second = {
        let (a, b) = scan_both(x.path(), y.path(), FingerprintKind::Md5);
        render(&a, &b, PatchWriter::new())
    };

    assert_eq!(first, second);
}

#[test]
fn test_write_persists_report() {
    let x = TempDir::new().unwrap();
    let y = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_file(x.path(), "a.txt", "hello", at(MODIFIED));

    let (scan_x, scan_y) = scan_both(x.path(), y.path(), FingerprintKind::Sha256);
    let outcome = Reconciler::new().reconcile(&scan_x, &scan_y).unwrap();
    let destination = out.path().join("reference.patch");

    let writer = PatchWriter::new().with_zone(TimestampZone::Utc);
    writer
        .write(&destination, "X", "Y", &outcome, at(GENERATED))
        .unwrap();

    let written = fs::read_to_string(&destination).unwrap();
    assert_eq!(
        written,
        writer.render("X", "Y", &outcome, at(GENERATED)).unwrap()
    );
    // Only the report itself, no leftover staging file.
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 1);
}

#[test]
fn test_write_into_missing_directory_fails() {
    let x = TempDir::new().unwrap();
    let (scan_x, scan_y) = scan_both(x.path(), x.path(), FingerprintKind::Md5);
    let outcome = Reconciler::new().reconcile(&scan_x, &scan_y).unwrap();

    let destination = x.path().join("no/such/dir/reference.patch");
    let err = PatchWriter::new()
        .write(&destination, "X", "X", &outcome, at(GENERATED))
        .unwrap_err();

    assert!(err.to_string().contains("Failed to write patch report"));
    assert!(!destination.exists());
}

#[test]
fn test_json_report() {
    let x = TempDir::new().unwrap();
    let y = TempDir::new().unwrap();
    write_file(x.path(), "a.txt", "hello", at(MODIFIED));
    write_file(y.path(), "a.txt", "hello", at(MODIFIED));
    write_file(y.path(), "b.txt", "b", at(MODIFIED));

    let (scan_x, scan_y) = scan_both(x.path(), y.path(), FingerprintKind::Md5);
    let json = render(
        &scan_x,
        &scan_y,
        PatchWriter::new()
            .with_format(PatchFormat::Json)
            .with_ignore_unchanged(true),
    );

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["fingerprint"], "md5");
    assert_eq!(value["generated_at"], "2023-11-14 22:13:20");
    assert_eq!(value["sections"][0]["directory"], "X");

    let entries = value["sections"][0]["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["change"], "added");
    assert_eq!(entries[0]["path"], "b.txt");
    assert_eq!(entries[0]["size_bytes"], 1);
    assert!(value["sections"][1]["entries"].as_array().unwrap().is_empty());
}
