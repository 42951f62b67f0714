use super::*;
use crate::error::CoreError;
use crate::MigrationName;
use chrono::NaiveDate;

#[test]
fn test_version_accepts_timestamp_and_token() {
    let v = Version::new("2024-03-01-09-30-ab12c").unwrap();
    assert_eq!(v.as_str(), "2024-03-01-09-30-ab12c");
    assert_eq!(v.timestamp_part(), "2024-03-01-09-30");
}

#[test]
fn test_version_accepts_uppercase_token() {
    assert!(Version::new("2024-03-01-09-30-AB12C").is_ok());
}

#[test]
fn test_version_rejects_malformed() {
    for bad in [
        "",
        "2024-03-01-09-30",
        "2024-03-01-09-30-ab12",
        "2024-03-01-09-30-ab12cd",
        "24-03-01-09-30-ab12c",
        "2024-03-01-09-30-ab_2c",
        "2024/03/01-09-30-ab12c",
    ] {
        let err = Version::new(bad).unwrap_err();
        assert!(
            matches!(err, CoreError::InvalidVersion { ref value } if value == bad),
            "unexpected error for {bad:?}: {err}"
        );
    }
}

#[test]
fn test_version_lexical_order_is_chronological() {
    let mut versions = vec![
        Version::new("2024-11-02-00-00-zzzzz").unwrap(),
        Version::new("2023-12-31-23-59-aaaaa").unwrap(),
        Version::new("2024-01-15-08-05-00000").unwrap(),
        Version::new("2024-01-15-08-05-00001").unwrap(),
    ];
    versions.sort();
    let ordered: Vec<&str> = versions.iter().map(Version::as_str).collect();
    assert_eq!(
        ordered,
        vec![
            "2023-12-31-23-59-aaaaa",
            "2024-01-15-08-05-00000",
            "2024-01-15-08-05-00001",
            "2024-11-02-00-00-zzzzz",
        ]
    );
}

#[test]
fn test_sort_then_reverse_matches_descending_sort() {
    let raw = [
        "2024-05-01-00-00-bbbbb",
        "2022-01-01-00-00-aaaaa",
        "2024-05-01-00-00-aaaaa",
        "2023-07-04-12-00-q1w2e",
    ];
    let mut ascending: Vec<Version> = raw.iter().map(|v| Version::new(*v).unwrap()).collect();
    ascending.sort();
    let reversed: Vec<Version> = ascending.iter().rev().cloned().collect();

    let mut descending: Vec<Version> = raw.iter().map(|v| Version::new(*v).unwrap()).collect();
    descending.sort_by(|a, b| b.cmp(a));

    assert_eq!(reversed, descending);
}

#[test]
fn test_version_from_parts() {
    let at = NaiveDate::from_ymd_opt(2025, 2, 7)
        .unwrap()
        .and_hms_opt(6, 4, 59)
        .unwrap();
    let v = Version::from_parts(at, "x9y8z").unwrap();
    assert_eq!(v, "2025-02-07-06-04-x9y8z");
    assert!(Version::from_parts(at, "toolong").is_err());
}

#[test]
fn test_version_deserialize_validates() {
    let ok: Version = serde_yaml::from_str("\"2024-03-01-09-30-ab12c\"").unwrap();
    assert_eq!(ok, "2024-03-01-09-30-ab12c");
    assert!(serde_yaml::from_str::<Version>("\"not-a-version\"").is_err());
}

#[test]
fn test_migration_name_validation() {
    assert_eq!(
        MigrationName::new("create_users_2").unwrap().as_str(),
        "create_users_2"
    );
    assert!(MigrationName::new("").is_err());
    assert!(MigrationName::new("drop-table").is_err());
    assert!(MigrationName::new("has space").is_err());
}

#[test]
fn test_migration_name_deref_and_display() {
    let name = MigrationName::new("add_index").unwrap();
    assert!(name.starts_with("add_"));
    assert_eq!(format!("{name}"), "add_index");
    assert_eq!(name, "add_index");
}
