#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::test_support::{load_entry, parse_file, MemoryLoader};
use pretty_assertions::assert_eq;

fn file_of(node: &Node) -> &FileReference {
    match node {
        Node::Extends(Extends { file, .. }) | Node::Include(Include { file, .. }) => file,
        Node::RawInclude(raw) => &raw.file,
        other => panic!("expected a file reference, got {other:?}"),
    }
}

#[test]
fn resolves_relative_to_the_including_file() {
    assert_eq!(
        resolve_path("partials/nav.pug", Some("/views/index.pug"), None).unwrap(),
        "/views/partials/nav.pug"
    );
    assert_eq!(
        resolve_path("../shared/./nav.pug", Some("/views/pages/index.pug"), None).unwrap(),
        "/views/shared/nav.pug"
    );
    assert_eq!(
        resolve_path("  nav.pug ", Some("index.pug"), None).unwrap(),
        "nav.pug"
    );
}

#[test]
fn resolves_absolute_paths_under_basedir() {
    assert_eq!(
        resolve_path("/layouts/base.pug", None, Some("/srv/views")).unwrap(),
        "/srv/views/layouts/base.pug"
    );
}

#[test]
fn resolution_needs_filename_or_basedir() {
    assert!(matches!(
        resolve_path("nav.pug", None, Some("/views")),
        Err(LoadError::RelativeWithoutFilename)
    ));
    assert!(matches!(
        resolve_path("/nav.pug", Some("/views/index.pug"), None),
        Err(LoadError::AbsoluteWithoutBasedir)
    ));
}

#[test]
fn loads_templates_recursively_in_order() {
    let loader = MemoryLoader::new(&[
        ("/views/index.pug", "extends layout.pug\nblock content\n  include part.pug"),
        ("/views/layout.pug", "html\n  include /head.pug\n  block content"),
        ("/views/head.pug", "head"),
        ("/views/part.pug", "p part"),
    ]);
    let (ast, dependencies) = load_entry(&loader, "/views/index.pug").unwrap();
    assert_eq!(
        dependencies,
        vec![
            "/views/layout.pug",
            "/views/head.pug",
            "/views/part.pug",
        ]
    );

    let extends = file_of(&ast.nodes[0]);
    assert_eq!(extends.full_path.as_deref(), Some("/views/layout.pug"));
    assert_eq!(extends.contents.as_deref(), Some(loader.source("/views/layout.pug")));
    let layout = extends.ast.as_deref().unwrap();
    let Node::Tag(html) = &layout.nodes[0] else {
        panic!("expected html, got {:?}", layout.nodes[0]);
    };
    let head = file_of(&html.block.nodes[0]);
    assert!(head.ast.is_some());
    assert_eq!(head.loc.filename.as_deref(), Some("/views/layout.pug"));
}

#[test]
fn raw_includes_are_read_but_not_parsed() {
    let loader = MemoryLoader::new(&[
        ("/views/index.pug", "pre\n  include style.css"),
        ("/views/style.css", "p { color: red }"),
    ]);
    let (ast, dependencies) = load_entry(&loader, "/views/index.pug").unwrap();
    assert_eq!(dependencies, vec!["/views/style.css"]);
    let Node::Tag(pre) = &ast.nodes[0] else {
        panic!("expected pre, got {:?}", ast.nodes[0]);
    };
    let raw = file_of(&pre.block.nodes[0]);
    assert_eq!(raw.contents.as_deref(), Some("p { color: red }"));
    assert!(raw.ast.is_none());
}

#[test]
fn missing_files_report_the_reference() {
    let loader = MemoryLoader::new(&[("/views/index.pug", "div\n  include missing.pug")]);
    let err = load_entry(&loader, "/views/index.pug").unwrap_err();
    assert_eq!(err.code, ErrorCode::FileLoad);
    assert_eq!(
        err.message,
        "/views/missing.pug: no such file\n    at /views/index.pug line 2"
    );
    assert_eq!(err.line, 2);
}

#[test]
fn errors_inside_dependencies_gain_each_reference() {
    let loader = MemoryLoader::new(&[
        ("/views/index.pug", "include a.pug"),
        ("/views/a.pug", "p a\ninclude b.pug"),
    ]);
    let err = load_entry(&loader, "/views/index.pug").unwrap_err();
    assert_eq!(err.code, ErrorCode::FileLoad);
    assert_eq!(
        err.message,
        "/views/b.pug: no such file\n    at /views/a.pug line 2\n    at /views/index.pug line 1"
    );
    assert_eq!(err.filename.as_deref(), Some("/views/a.pug"));
}

#[test]
fn relative_paths_need_a_filename() {
    let loader = MemoryLoader::new(&[("/views/nav.pug", "nav")]);
    let mut ast = parse_file("include nav.pug", "").unwrap();
    for node in &mut ast.nodes {
        if let Node::Include(include) = node {
            include.file.loc.filename = None;
        }
    }
    let err = load(&mut ast, &loader, Some("/views"), &mut parse_file).unwrap_err();
    assert_eq!(err.code, ErrorCode::FileLoad);
    assert!(err
        .message
        .starts_with("the \"filename\" option is required to use includes and extends with \"relative\" paths"));
}
