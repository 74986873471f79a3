//! File access for `include` and `extends`.

use std::fs;

use pug_link::{resolve_path, LoadError, Loader};

use crate::plugin::HookContext;

/// Reads templates from the filesystem.
#[derive(Copy, Clone, Debug, Default)]
pub struct FsLoader;

impl Loader for FsLoader {
    fn read(&self, path: &str) -> Result<Vec<u8>, LoadError> {
        fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_string(),
            source,
        })
    }
}

/// The filesystem loader with `resolve` and `read` plugins applied.
pub(crate) struct PluginLoader<'a> {
    cx: HookContext<'a>,
}

impl<'a> PluginLoader<'a> {
    pub(crate) fn new(cx: HookContext<'a>) -> Self {
        PluginLoader { cx }
    }
}

impl Loader for PluginLoader<'_> {
    fn resolve(
        &self,
        path: &str,
        source: Option<&str>,
        basedir: Option<&str>,
    ) -> Result<String, LoadError> {
        match self.cx.options.plugins.resolver() {
            Some(hook) => hook.resolve(path, source, &self.cx),
            None => resolve_path(path, source, basedir),
        }
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, LoadError> {
        match self.cx.options.plugins.reader() {
            Some(hook) => hook.read(path, &self.cx),
            None => FsLoader.read(path),
        }
    }
}

#[cfg(test)]
mod tests;
