//! The load pass: resolve, read and parse every file a template references.
//!
//! `extends` and `include` of a template get their file parsed (and loaded
//! in turn); raw includes only get their text. Nothing is linked here.

use std::io;
use std::path::{Component, Path, PathBuf};

use pug_diagnostic::{ErrorCode, PugError, PugResult};
use pug_ir::visit::child_blocks_mut;
use pug_ir::{Block, Extends, FileReference, Include, Node, SourceLoc};
use pug_stack::ensure_sufficient_stack;
use thiserror::Error;
use tracing::{debug, trace};

/// Why a referenced file could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("the \"filename\" option is required to use includes and extends with \"relative\" paths")]
    RelativeWithoutFilename,
    #[error("the \"basedir\" option is required to use includes and extends with \"absolute\" paths")]
    AbsoluteWithoutBasedir,
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    /// Failure reported by a custom loader.
    #[error("{0}")]
    Other(String),
}

/// Access to the files templates reference.
pub trait Loader {
    /// The path `path` refers to when written in `source`. Absolute paths
    /// are taken relative to `basedir`.
    fn resolve(
        &self,
        path: &str,
        source: Option<&str>,
        basedir: Option<&str>,
    ) -> Result<String, LoadError> {
        resolve_path(path, source, basedir)
    }

    /// Raw bytes of a resolved path.
    fn read(&self, path: &str) -> Result<Vec<u8>, LoadError>;
}

/// Default resolution: absolute paths join `basedir`, relative paths join
/// the directory of `source`. The result is normalized lexically.
pub fn resolve_path(
    path: &str,
    source: Option<&str>,
    basedir: Option<&str>,
) -> Result<String, LoadError> {
    let path = path.trim();
    let joined = match path.strip_prefix('/') {
        Some(rest) => {
            let basedir = basedir.ok_or(LoadError::AbsoluteWithoutBasedir)?;
            Path::new(basedir).join(rest)
        }
        None => {
            let source = source.ok_or(LoadError::RelativeWithoutFilename)?;
            let dir = Path::new(source.trim()).parent().unwrap_or(Path::new(""));
            dir.join(path)
        }
    };
    Ok(normalize(&joined))
}

/// Drop `.` segments and fold `..` into the preceding segment.
fn normalize(path: &Path) -> String {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return ".".to_string();
    }
    parts.iter().collect::<PathBuf>().to_string_lossy().into_owned()
}

/// A file read by the load pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dependency {
    /// Resolved path.
    pub path: String,
    pub contents: String,
}

/// Parses the text of a loaded template. The second argument is the
/// resolved path, which becomes the filename of the new tree.
pub type ParseFn<'a> = dyn FnMut(&str, &str) -> PugResult<Block> + 'a;

/// Load every file `ast` references, recursively.
///
/// Returns every file read, in load order.
pub fn load(
    ast: &mut Block,
    loader: &dyn Loader,
    basedir: Option<&str>,
    parse: &mut ParseFn<'_>,
) -> PugResult<Vec<Dependency>> {
    let mut pass = LoadPass {
        loader,
        basedir,
        parse,
        dependencies: Vec::new(),
    };
    pass.block(ast)?;
    debug!(dependencies = pass.dependencies.len(), "loaded");
    Ok(pass.dependencies)
}

struct LoadPass<'a, 'p> {
    loader: &'a dyn Loader,
    basedir: Option<&'a str>,
    parse: &'a mut ParseFn<'p>,
    dependencies: Vec<Dependency>,
}

impl LoadPass<'_, '_> {
    fn block(&mut self, block: &mut Block) -> PugResult<()> {
        ensure_sufficient_stack(|| {
            for node in &mut block.nodes {
                match node {
                    Node::Extends(Extends { file, .. }) | Node::Include(Include { file, .. }) => {
                        self.file(file, true)?;
                    }
                    Node::RawInclude(raw) => self.file(&mut raw.file, false)?,
                    _ => {}
                }
                for child in child_blocks_mut(node) {
                    self.block(child)?;
                }
            }
            Ok(())
        })
    }

    /// Fill in `file`. Any failure, including one inside the loaded file,
    /// is reported with the location of the reference appended.
    fn file(&mut self, file: &mut FileReference, template: bool) -> PugResult<()> {
        let loc = file.loc.clone();
        let path = self
            .loader
            .resolve(&file.path, loc.filename.as_deref(), self.basedir)
            .map_err(|err| file_error(&err, &loc))?;
        let bytes = self
            .loader
            .read(&path)
            .map_err(|err| file_error(&err, &loc))?;
        let contents = String::from_utf8_lossy(&bytes).into_owned();
        trace!(path = %path, bytes = bytes.len(), "read dependency");
        self.dependencies.push(Dependency {
            path: path.clone(),
            contents: contents.clone(),
        });

        if template {
            let mut ast = (self.parse)(&contents, &path).map_err(|err| nested_error(err, &loc))?;
            self.block(&mut ast).map_err(|err| nested_error(err, &loc))?;
            file.ast = Some(Box::new(ast));
        }
        file.full_path = Some(path);
        file.contents = Some(contents);
        Ok(())
    }
}

fn reference_suffix(loc: &SourceLoc) -> String {
    format!(
        "\n    at {} line {}",
        loc.filename.as_deref().unwrap_or("Pug"),
        loc.line
    )
}

#[cold]
fn file_error(err: &LoadError, loc: &SourceLoc) -> PugError {
    PugError::at_node(
        ErrorCode::FileLoad,
        format!("{err}{}", reference_suffix(loc)),
        loc,
    )
}

#[cold]
fn nested_error(mut err: PugError, loc: &SourceLoc) -> PugError {
    err.message.push_str(&reference_suffix(loc));
    err
}

#[cfg(test)]
mod tests;
