#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use super::*;

#[test]
fn reads_files() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.pug");
    fs::write(&path, "p a").unwrap();
    let bytes = FsLoader.read(&path.to_string_lossy()).unwrap();
    assert_eq!(bytes, b"p a");
}

#[test]
fn missing_files_name_the_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.pug").to_string_lossy().into_owned();
    match FsLoader.read(&path) {
        Err(LoadError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected an io error, got {other:?}"),
    }
}

#[test]
fn default_resolution_is_relative_to_the_source() {
    let resolved = FsLoader
        .resolve("../shared/nav.pug", Some("/site/pages/index.pug"), None)
        .unwrap();
    assert_eq!(resolved, "/site/shared/nav.pug");
    assert!(matches!(
        FsLoader.resolve("/nav.pug", None, None),
        Err(LoadError::AbsoluteWithoutBasedir)
    ));
}
