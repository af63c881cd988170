use std::path::Path;

use sol_conform::{canonicalize_or_current, infer_project_name, verbosity_level};
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_handles_dot_existing_and_missing() {
    let cwd = std::env::current_dir().expect("cwd");
    assert_eq!(canonicalize_or_current(".").expect("dot"), cwd);

    let dir = tempdir().expect("tempdir");
    let existing = canonicalize_or_current(dir.path().to_str().expect("utf8 path")).expect("existing");
    assert_eq!(existing, dir.path().canonicalize().expect("canonicalize"));

    let missing = canonicalize_or_current("does-not-exist-yet").expect("missing");
    assert_eq!(missing, cwd.join("does-not-exist-yet"));
}

#[test]
fn project_name_falls_back_for_root() {
    assert_eq!(infer_project_name(Path::new("/work/tokens")), "tokens");
    assert_eq!(infer_project_name(Path::new("/")), "unnamed-project");
}

#[test]
fn verbosity_maps_to_levels() {
    assert_eq!(verbosity_level(0), "warn");
    assert_eq!(verbosity_level(1), "info");
    assert_eq!(verbosity_level(2), "debug");
    assert_eq!(verbosity_level(7), "trace");
}
