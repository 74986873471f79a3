//! In-memory files and a compact tree outline for the load and link tests.

use std::io;
use std::sync::Arc;

use pug_diagnostic::PugResult;
use pug_ir::{Block, FileName, Node};
use pug_lexer::{lex, LexerOptions};
use pug_parse::{parse, ParseOptions};
use rustc_hash::FxHashMap;

use crate::{link, load, LoadError, Loader};

pub struct MemoryLoader {
    files: FxHashMap<String, String>,
}

impl MemoryLoader {
    pub fn new(files: &[(&str, &str)]) -> Self {
        MemoryLoader {
            files: files
                .iter()
                .map(|(path, src)| ((*path).to_string(), (*src).to_string()))
                .collect(),
        }
    }

    pub fn source(&self, path: &str) -> &str {
        match self.files.get(path) {
            Some(src) => src,
            None => panic!("no file {path}"),
        }
    }
}

impl Loader for MemoryLoader {
    fn read(&self, path: &str) -> Result<Vec<u8>, LoadError> {
        self.files
            .get(path)
            .map(|src| src.clone().into_bytes())
            .ok_or_else(|| LoadError::Io {
                path: path.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
            })
    }
}

pub fn parse_file(src: &str, path: &str) -> PugResult<Block> {
    let filename: FileName = Arc::from(path);
    let lexer = LexerOptions {
        filename: Some(filename.clone()),
        ..LexerOptions::default()
    };
    let tokens = lex(src, &lexer)?;
    let options = ParseOptions {
        filename: Some(filename),
        src: Some(Arc::from(src)),
        ..ParseOptions::default()
    };
    parse(tokens, &options)
}

/// Parse and load `entry`, with `/views` as the base directory. Returns
/// the paths read.
pub fn load_entry(loader: &MemoryLoader, entry: &str) -> PugResult<(Block, Vec<String>)> {
    let mut ast = parse_file(loader.source(entry), entry)?;
    let dependencies = load(&mut ast, loader, Some("/views"), &mut parse_file)?;
    Ok((ast, dependencies.into_iter().map(|dep| dep.path).collect()))
}

pub fn link_files(files: &[(&str, &str)], entry: &str) -> PugResult<Block> {
    let loader = MemoryLoader::new(files);
    let (ast, _) = load_entry(&loader, entry)?;
    link(ast)
}

/// One token per node: `tag(children)`, quoted text, `[name children]`
/// for named blocks and `mixin:name` for declarations. Plain blocks are
/// transparent.
pub fn outline(block: &Block) -> String {
    let mut parts = Vec::new();
    for node in &block.nodes {
        outline_node(node, &mut parts);
    }
    parts.join(" ")
}

fn outline_node(node: &Node, parts: &mut Vec<String>) {
    match node {
        Node::Block(block) => {
            for node in &block.nodes {
                outline_node(node, parts);
            }
        }
        Node::NamedBlock(named) if named.block.is_empty() => {
            parts.push(format!("[{}]", named.name));
        }
        Node::NamedBlock(named) => {
            parts.push(format!("[{} {}]", named.name, outline(&named.block)));
        }
        Node::Tag(tag) if tag.block.is_empty() => parts.push(tag.name.clone()),
        Node::Tag(tag) => parts.push(format!("{}({})", tag.name, outline(&tag.block))),
        Node::Text(text) => parts.push(format!("{:?}", text.val)),
        Node::Mixin(mixin) if mixin.call => parts.push(format!("+{}", mixin.name)),
        Node::Mixin(mixin) => parts.push(format!("mixin:{}", mixin.name)),
        other => parts.push(other.kind_name().to_string()),
    }
}
