// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn finds_config_in_current_dir() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("fleetreport.toml");
    fs::write(&config_path, "version = 1\n").unwrap();

    assert_eq!(find_config(dir.path()), Some(config_path));
}

#[test]
fn finds_config_in_parent_dir() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("fleetreport.toml");
    fs::write(&config_path, "version = 1\n").unwrap();

    let subdir = dir.path().join("subdir");
    fs::create_dir(&subdir).unwrap();

    assert_eq!(find_config(&subdir), Some(config_path));
}

#[test]
fn stops_at_git_root() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    let subdir = dir.path().join("subdir");
    fs::create_dir(&subdir).unwrap();

    assert_eq!(find_config(&subdir), None);
}

#[test]
fn explicit_missing_config_is_an_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let err = resolve_config(Some(&missing), dir.path()).unwrap_err();
    assert!(err.to_string().contains("config file not found"));
}

#[test]
fn include_candidates_follow_search_order() {
    let candidates = include_candidates(
        Some(Path::new("/etc/fleet")),
        Some(Path::new("reports.d")),
        Path::new("extra.xml"),
    );
    assert_eq!(
        candidates,
        vec![
            PathBuf::from("/etc/fleet/reports.d/extra.xml"),
            PathBuf::from("/etc/fleet/extra.xml"),
            PathBuf::from("reports.d/extra.xml"),
            PathBuf::from("extra.xml"),
        ]
    );
}

#[test]
fn include_candidates_without_dirs_use_file_as_given() {
    let candidates = include_candidates(None, None, Path::new("/abs/extra.xml"));
    assert_eq!(candidates, vec![PathBuf::from("/abs/extra.xml")]);
}

#[test]
fn find_include_prefers_include_dir_under_parent() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("reports.d");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("extra.xml"), "<ReportDefinition/>").unwrap();
    fs::write(dir.path().join("extra.xml"), "<ReportDefinition/>").unwrap();

    let found = find_include(
        Some(dir.path()),
        Some(Path::new("reports.d")),
        Path::new("extra.xml"),
    );
    assert_eq!(found, Some(sub.join("extra.xml")));
}
