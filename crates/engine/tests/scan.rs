use std::{fs, path::PathBuf};

use chrono::NaiveDate;
use engine::{filter_valid, scan_directory};
use uuid::Uuid;

const VALID_RULESET: &str = r#"
name: Kinderfreizeit 2024
type: kinder
valid_from: 2024-01-01
valid_until: 2024-12-31
age_groups:
  - min_age: 6
    max_age: 9
    price: 140.00
"#;

const BROKEN_RULESET: &str = r#"
name: Kaputt
type: kinder
valid_from: not-a-date
valid_until: 2024-12-31
age_groups: []
"#;

fn scratch_dir() -> PathBuf {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../target/test_rulesets")
        .join(Uuid::new_v4().to_string());
    fs::create_dir_all(&root).unwrap();
    root
}

#[test]
fn reports_valid_and_broken_files_side_by_side() {
    let dir = scratch_dir();
    fs::write(dir.join("kinder.yaml"), VALID_RULESET).unwrap();
    fs::write(dir.join("kaputt.yml"), BROKEN_RULESET).unwrap();
    fs::write(dir.join("notes.txt"), "not yaml").unwrap();

    let report = scan_directory(&dir, false);
    assert_eq!(report.len(), 2);

    // A validation failure keeps the document's own fields; only the
    // window entry that did not parse stays empty.
    let kaputt = report.iter().find(|e| e.name == "Kaputt").unwrap();
    assert!(!kaputt.is_valid);
    assert_eq!(kaputt.kind, "kinder");
    assert!(kaputt.valid_from.is_none());
    assert_eq!(
        kaputt.valid_until,
        NaiveDate::from_ymd_opt(2024, 12, 31)
    );
    assert_eq!(kaputt.age_group_count, 0);
    let error = kaputt.error.as_deref().unwrap();
    assert!(error.contains("valid_from"));
    assert!(error.contains("age_groups"));

    let kinder = report
        .iter()
        .find(|e| e.name == "Kinderfreizeit 2024")
        .unwrap();
    assert!(kinder.is_valid);
    assert_eq!(kinder.kind, "kinder");
    assert_eq!(kinder.age_group_count, 1);
    assert!(!kinder.has_role_discounts);
    assert!(!kinder.has_family_discount);

    let valid = filter_valid(report);
    assert_eq!(valid.len(), 1);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn unreadable_yaml_is_reported_with_the_file_stem() {
    let dir = scratch_dir();
    fs::write(dir.join("garbage.yaml"), "name: [unclosed").unwrap();

    let report = scan_directory(&dir, false);
    assert_eq!(report.len(), 1);
    assert!(!report[0].is_valid);
    assert_eq!(report[0].name, "garbage");
    assert_eq!(report[0].kind, "unknown");
    assert!(report[0].error.is_some());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn recursive_scan_walks_subdirectories() {
    let dir = scratch_dir();
    let nested = dir.join("2024");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("kinder.yaml"), VALID_RULESET).unwrap();

    let flat = scan_directory(&dir, false);
    assert!(flat.is_empty());

    let deep = scan_directory(&dir, true);
    assert_eq!(deep.len(), 1);
    assert_eq!(deep[0].relative_path, PathBuf::from("2024/kinder.yaml"));

    fs::remove_dir_all(&dir).unwrap();
}
