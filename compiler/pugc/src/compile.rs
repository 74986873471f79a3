//! The compile pipeline.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use pug_codegen::generate;
use pug_diagnostic::{ErrorCode, PugError, PugResult};
use pug_ir::{Block, FileName, Token, TokenKind};
use pug_lexer::{lex, LexerOptions};
use pug_link::{link, load, LoadError};
use pug_parse::{parse, ParseOptions};
use tracing::debug;

use crate::filters::handle_filters;
use crate::loader::PluginLoader;
use crate::plugin::{AstStage, HookContext, TextStage, TokenStage};
use crate::strip::strip_comments;
use crate::CompileOptions;

/// A compiled template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledTemplate {
    /// Source of `function template(locals) {...}`, preceded by the inlined
    /// runtime helpers when those are enabled.
    pub body: String,
    /// Every file read while loading, in load order.
    pub dependencies: Vec<String>,
}

/// Compile `source` to the source of a render function named `template`.
pub fn compile(source: &str, options: &CompileOptions) -> PugResult<CompiledTemplate> {
    compile_body(source, options, "template")
}

/// Compile `source` to the source of a render function named after
/// `options.template_name`.
pub fn compile_client(source: &str, options: &CompileOptions) -> PugResult<String> {
    compile_body(source, options, &options.template_name).map(|compiled| compiled.body)
}

/// Read and compile the template at `path`, which becomes the filename.
pub fn compile_file(
    path: impl AsRef<Path>,
    options: &CompileOptions,
) -> PugResult<CompiledTemplate> {
    let path = path.as_ref();
    let filename = path.to_string_lossy().into_owned();
    let source = fs::read_to_string(path).map_err(|source| {
        let err = LoadError::Io {
            path: filename.clone(),
            source,
        };
        PugError::new(ErrorCode::FileLoad, err.to_string(), 0, 0)
            .with_filename(Some(Arc::from(filename.as_str())))
    })?;
    let options = CompileOptions {
        filename: Some(filename),
        ..options.clone()
    };
    compile(&source, &options)
}

fn compile_body(
    source: &str,
    options: &CompileOptions,
    template_name: &str,
) -> PugResult<CompiledTemplate> {
    let plugins = &options.plugins;
    let cx = HookContext {
        filename: options.filename.as_deref(),
        options,
    };
    let frontend = Frontend { options };

    let mut ast = frontend.parse_file(source, cx.filename)?;
    let loader = PluginLoader::new(cx);
    let loaded = load(
        &mut ast,
        &loader,
        options.basedir.as_deref(),
        &mut |src: &str, path: &str| frontend.parse_file(src, Some(path)),
    )?;
    let mut ast = plugins.apply_ast(AstStage::PostLoad, ast, &cx)?;

    ast = plugins.apply_ast(AstStage::PreFilters, ast, &cx)?;
    let applied = handle_filters(
        &mut ast,
        &options.filters,
        &options.filter_aliases,
        &options.filter_options,
    )?;
    debug!(applied, "filtered");
    ast = plugins.apply_ast(AstStage::PostFilters, ast, &cx)?;

    ast = plugins.apply_ast(AstStage::PreLink, ast, &cx)?;
    ast = link(ast)?;
    ast = plugins.apply_ast(AstStage::PostLink, ast, &cx)?;

    ast = plugins.apply_ast(AstStage::PreCodegen, ast, &cx)?;
    // Looked up by `pug_debug_filename`, which is `undefined` when there is
    // no filename.
    let include_sources = options.include_sources.then(|| {
        let entry = options.filename.as_deref().unwrap_or("undefined");
        std::iter::once((entry.to_string(), source.to_string()))
            .chain(loaded.iter().map(|dep| (dep.path.clone(), dep.contents.clone())))
            .collect()
    });
    let codegen = options.codegen_options(template_name, include_sources);
    let js = match plugins.code_generator() {
        Some(hook) => hook.generate_code(&ast, &codegen)?,
        None => generate(&ast, &codegen)?,
    };
    let body = plugins.apply_text(TextStage::PostCodegen, js, &cx)?;

    Ok(CompiledTemplate {
        body,
        dependencies: loaded.into_iter().map(|dep| dep.path).collect(),
    })
}

/// Source text to tree for one file, with the per-file hooks.
struct Frontend<'a> {
    options: &'a CompileOptions,
}

impl Frontend<'_> {
    fn parse_file(&self, source: &str, filename: Option<&str>) -> PugResult<Block> {
        let options = self.options;
        let plugins = &options.plugins;
        let cx = HookContext { filename, options };
        let name: Option<FileName> = filename.map(Arc::from);

        let source = plugins.apply_text(TextStage::PreLex, source.to_string(), &cx)?;
        let source: Arc<str> = Arc::from(source);
        let lexer = LexerOptions {
            filename: name.clone(),
            max_interpolation_depth: options.max_interpolation_depth,
            ..LexerOptions::default()
        };
        let tokens = lex(&source, &lexer)?;
        debug!(tokens = tokens.len(), ?filename, "lexed");
        let tokens = plugins.apply_tokens(TokenStage::PostLex, tokens, &cx)?;

        let mut tokens = strip_comments(tokens, options.strip_comments)?;
        default_extensions(&mut tokens);
        let tokens = plugins.apply_tokens(TokenStage::PreParse, tokens, &cx)?;

        let parse_options = ParseOptions {
            filename: name,
            src: Some(source),
            extensions: plugins.parser_extensions().to_vec(),
        };
        let ast = parse(tokens, &parse_options)?;
        let ast = plugins.apply_ast(AstStage::PostParse, ast, &cx)?;
        plugins.apply_ast(AstStage::PreLoad, ast, &cx)
    }
}

/// `include foo` means `include foo.pug`.
fn default_extensions(tokens: &mut [Token]) {
    for token in tokens {
        if let TokenKind::Path(path) = &mut token.kind {
            if Path::new(path.as_str()).extension().is_none() {
                path.push_str(".pug");
            }
        }
    }
}

#[cfg(test)]
mod tests;
