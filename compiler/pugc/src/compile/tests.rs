#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use super::*;
use crate::StripComments;

const OPEN: &str = "function template(locals) {var pug_html = \"\", pug_mixins = {}, pug_interp;";
const CLOSE: &str = ";return pug_html;}";

fn quiet() -> CompileOptions {
    CompileOptions {
        compile_debug: false,
        ..CompileOptions::default()
    }
}

/// `js` with the markup escapes in string literals decoded.
fn readable(js: &str) -> String {
    js.replace("\\u003C", "<")
        .replace("\\u003E", ">")
        .replace("\\u002F", "/")
}

fn body(src: &str) -> String {
    readable(&compile(src, &quiet()).unwrap().body)
}

fn write(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn static_template() {
    assert_eq!(
        body("p Hello"),
        format!("{OPEN}with (locals || {{}}) {{pug_html = pug_html + \"<p>Hello</p>\";}}{CLOSE}")
    );
}

#[test]
fn unbuffered_comments_are_stripped() {
    assert_eq!(body("//- note\np Hello"), body("p Hello"));
}

#[test]
fn buffered_comments_are_kept() {
    assert!(body("// note").contains("<!-- note-->"));

    let options = CompileOptions {
        strip_comments: StripComments {
            unbuffered: true,
            buffered: true,
        },
        ..quiet()
    };
    let js = readable(&compile("// note\np Hello", &options).unwrap().body);
    assert!(!js.contains("<!--"));
    assert!(js.contains("<p>Hello</p>"));
}

#[test]
fn client_function_is_named() {
    let options = CompileOptions {
        template_name: "render".into(),
        ..quiet()
    };
    let js = compile_client("p Hello", &options).unwrap();
    assert!(js.starts_with("function render(locals) {"));

    // `compile` always produces `template`.
    let js = compile("p Hello", &options).unwrap().body;
    assert!(js.starts_with("function template(locals) {"));
}

#[test]
fn runtime_helpers_are_inlined_by_default() {
    let js = compile("a(href=url)", &quiet()).unwrap().body;
    assert!(js.starts_with("function pug_attr("));
    assert!(js.contains("pug_attr(\"href\", url, true, false)"));

    let options = CompileOptions {
        inline_runtime_functions: false,
        ..quiet()
    };
    let js = compile("a(href=url)", &options).unwrap().body;
    assert!(js.starts_with(OPEN));
    assert!(js.contains("pug.attr(\"href\", url, true, false)"));
}

#[test]
fn self_locals() {
    let options = CompileOptions {
        self_locals: true,
        ..quiet()
    };
    let js = compile("p= self.name", &options).unwrap().body;
    assert!(js.contains("var self = locals || {};"));
    assert!(!js.contains("with (locals"));
}

#[test]
fn sources_are_embedded_on_request() {
    let options = CompileOptions {
        include_sources: true,
        ..CompileOptions::default().with_filename("index.pug")
    };
    let js = compile("p Hi", &options).unwrap().body;
    assert!(js.contains(r#"var pug_debug_sources = {"index.pug":"p Hi"};"#));
    assert!(js.contains("pug_debug_sources[pug_debug_filename]"));

    let js = compile("p Hi", &CompileOptions::default()).unwrap().body;
    assert!(!js.contains("pug_debug_sources"));
}

#[test]
fn includes_are_read_from_disk() {
    let dir = TempDir::new().unwrap();
    let header = write(&dir, "header.pug", "h1 Title");
    let index = write(&dir, "index.pug", "include header\np body");

    let compiled = compile_file(&index, &quiet()).unwrap();
    assert_eq!(compiled.dependencies, vec![header]);
    let js = readable(&compiled.body);
    assert!(js.contains("<h1>Title</h1>"));
    assert!(js.contains("<p>body</p>"));
}

#[test]
fn extends_replaces_named_blocks() {
    let dir = TempDir::new().unwrap();
    write(&dir, "layout.pug", "html\n  body\n    block content\n      p Default");
    let page = write(&dir, "page.pug", "extends layout\nblock content\n  p Page");

    let js = readable(&compile_file(&page, &quiet()).unwrap().body);
    assert!(js.contains("<body><p>Page</p></body>"));
    assert!(!js.contains("Default"));
}

#[test]
fn absolute_paths_use_basedir() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("partials")).unwrap();
    write(&dir, "partials/nav.pug", "nav");
    let options = CompileOptions {
        basedir: Some(dir.path().to_string_lossy().into_owned()),
        ..quiet()
    };
    let js = readable(&compile("include /partials/nav", &options).unwrap().body);
    assert!(js.contains("<nav></nav>"));
}

#[test]
fn missing_include() {
    let dir = TempDir::new().unwrap();
    let index = write(&dir, "index.pug", "include missing");
    let err = compile_file(&index, &quiet()).unwrap_err();
    assert_eq!(err.code, ErrorCode::FileLoad);
    assert!(err.message.contains("missing.pug"));
}

#[test]
fn relative_include_needs_a_filename() {
    let err = compile("include header", &quiet()).unwrap_err();
    assert_eq!(err.code, ErrorCode::FileLoad);
    assert!(err.message.contains("the \"filename\" option is required"));
}

#[test]
fn missing_entry_file() {
    let dir = TempDir::new().unwrap();
    let err = compile_file(dir.path().join("nope.pug"), &quiet()).unwrap_err();
    assert_eq!(err.code, ErrorCode::FileLoad);
    assert!(err.filename.as_deref().is_some_and(|name| name.ends_with("nope.pug")));
}

#[test]
fn errors_carry_the_filename() {
    let options = quiet().with_filename("bad.pug");
    let err = compile("p(", &options).unwrap_err();
    assert!(err.code.is_lexer_error());
    assert_eq!(err.filename.as_deref(), Some("bad.pug"));
}

#[test]
fn path_tokens_default_to_pug() {
    let mut tokens = vec![
        Token::new(TokenKind::Path("header".into()), Default::default()),
        Token::new(TokenKind::Path("style.css".into()), Default::default()),
        Token::new(TokenKind::Path("dir.d/page".into()), Default::default()),
    ];
    default_extensions(&mut tokens);
    let paths: Vec<_> = tokens.iter().map(|token| token.kind.clone()).collect();
    assert_eq!(
        paths,
        vec![
            TokenKind::Path("header.pug".into()),
            TokenKind::Path("style.css".into()),
            TokenKind::Path("dir.d/page.pug".into()),
        ]
    );
}
