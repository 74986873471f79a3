//! Compile options.

use std::fmt;
use std::sync::Arc;

use pug_codegen::{CodeGenOptions, Indent};
use pug_eval::Object;
use pug_lexer::DEFAULT_MAX_INTERPOLATION_DEPTH;
use rustc_hash::FxHashMap;

use crate::filters::Filter;
use crate::{Plugins, StripComments};

/// Options for [`compile`](crate::compile) and friends.
#[derive(Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct CompileOptions {
    /// Name of the template file. Used in errors, for relative includes
    /// and in debug instrumentation.
    pub filename: Option<String>,
    /// Root for `include` and `extends` paths starting with `/`.
    pub basedir: Option<String>,
    /// Doctype to assume before any `doctype` line.
    pub doctype: Option<String>,
    /// Indent the output markup.
    pub pretty: Option<Indent>,
    pub compile_debug: bool,
    /// Embed every loaded source for `rethrow`. Needs `compile_debug`.
    pub include_sources: bool,
    /// Emit the used runtime helpers ahead of the function; otherwise they
    /// are expected on a `pug` object in scope.
    pub inline_runtime_functions: bool,
    /// Expose locals as `self` instead of through `with`.
    pub self_locals: bool,
    pub globals: Vec<String>,
    /// Function name for [`compile_client`](crate::compile_client).
    pub template_name: String,
    pub strip_comments: StripComments,
    pub filters: FxHashMap<String, Arc<dyn Filter>>,
    /// Alternative names for registered filters.
    pub filter_aliases: FxHashMap<String, String>,
    /// Default options per filter name, beneath the filter's attributes.
    pub filter_options: FxHashMap<String, Object>,
    pub plugins: Plugins,
    /// Bound on nested `#[...]` interpolation.
    pub max_interpolation_depth: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            filename: None,
            basedir: None,
            doctype: None,
            pretty: None,
            compile_debug: true,
            include_sources: false,
            inline_runtime_functions: true,
            self_locals: false,
            globals: Vec::new(),
            template_name: "template".to_string(),
            strip_comments: StripComments::default(),
            filters: FxHashMap::default(),
            filter_aliases: FxHashMap::default(),
            filter_options: FxHashMap::default(),
            plugins: Plugins::default(),
            max_interpolation_depth: DEFAULT_MAX_INTERPOLATION_DEPTH,
        }
    }
}

impl CompileOptions {
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Register `filter` as `:name`.
    #[must_use]
    pub fn with_filter(mut self, name: impl Into<String>, filter: impl Filter + 'static) -> Self {
        self.filters.insert(name.into(), Arc::new(filter));
        self
    }

    pub(crate) fn codegen_options(
        &self,
        template_name: &str,
        include_sources: Option<Vec<(String, String)>>,
    ) -> CodeGenOptions {
        CodeGenOptions {
            pretty: self.pretty.clone(),
            compile_debug: self.compile_debug,
            doctype: self.doctype.clone(),
            inline_runtime_functions: self.inline_runtime_functions,
            self_locals: self.self_locals,
            globals: self.globals.clone(),
            include_sources,
            template_name: template_name.to_string(),
        }
    }
}

impl fmt::Debug for CompileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut filters: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        filters.sort_unstable();
        f.debug_struct("CompileOptions")
            .field("filename", &self.filename)
            .field("basedir", &self.basedir)
            .field("doctype", &self.doctype)
            .field("pretty", &self.pretty)
            .field("compile_debug", &self.compile_debug)
            .field("include_sources", &self.include_sources)
            .field("inline_runtime_functions", &self.inline_runtime_functions)
            .field("self_locals", &self.self_locals)
            .field("globals", &self.globals)
            .field("template_name", &self.template_name)
            .field("strip_comments", &self.strip_comments)
            .field("filters", &filters)
            .field("filter_aliases", &self.filter_aliases)
            .field("filter_options", &self.filter_options)
            .field("plugins", &self.plugins)
            .field("max_interpolation_depth", &self.max_interpolation_depth)
            .finish()
    }
}
