//! Extension points around the compile pipeline.
//!
//! Transform hooks see the value passing between two stages and return a
//! replacement; any number may be registered at each point and they run in
//! registration order. Replacement hooks (`resolve`, `read`,
//! `generate_code`) stand in for a built-in step, so at most one of each
//! may be registered.
//!
//! The lexing and parsing hooks (`pre_lex` through `pre_load`) run for
//! every file, including the ones loaded through `include` and `extends`.
//! The later hooks run once, on the entry template's tree.

use std::fmt;
use std::sync::Arc;

use pug_codegen::CodeGenOptions;
use pug_diagnostic::{ErrorCode, PugError, PugResult};
use pug_ir::{Block, Token};
use pug_link::LoadError;
use pug_parse::ParserExtension;

use crate::CompileOptions;

/// What a hook knows about the compile it runs in.
#[derive(Copy, Clone)]
pub struct HookContext<'a> {
    /// The file being processed: the entry template, or a dependency in
    /// the per-file hooks.
    pub filename: Option<&'a str>,
    pub options: &'a CompileOptions,
}

/// Transforms template source before lexing, or generated code after
/// code generation.
pub trait TextHook {
    fn apply(&self, text: String, cx: &HookContext<'_>) -> PugResult<String>;
}

/// Transforms a token stream.
pub trait TokenHook {
    fn apply(&self, tokens: Vec<Token>, cx: &HookContext<'_>) -> PugResult<Vec<Token>>;
}

/// Transforms a template tree.
pub trait AstHook {
    fn apply(&self, ast: Block, cx: &HookContext<'_>) -> PugResult<Block>;
}

/// Replaces the default path resolution of `include` and `extends`.
pub trait ResolveHook {
    fn resolve(
        &self,
        path: &str,
        source: Option<&str>,
        cx: &HookContext<'_>,
    ) -> Result<String, LoadError>;
}

/// Replaces reading a resolved file from disk.
pub trait ReadHook {
    fn read(&self, path: &str, cx: &HookContext<'_>) -> Result<Vec<u8>, LoadError>;
}

/// Replaces the code generator.
pub trait CodeGenHook {
    fn generate_code(&self, ast: &Block, options: &CodeGenOptions) -> PugResult<String>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum TextStage {
    PreLex,
    PostCodegen,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum TokenStage {
    PostLex,
    PreParse,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum AstStage {
    PostParse,
    PreLoad,
    PostLoad,
    PreFilters,
    PostFilters,
    PreLink,
    PostLink,
    PreCodegen,
}

/// The registered plugins.
#[derive(Clone, Default)]
pub struct Plugins {
    text: Vec<(TextStage, Arc<dyn TextHook>)>,
    tokens: Vec<(TokenStage, Arc<dyn TokenHook>)>,
    ast: Vec<(AstStage, Arc<dyn AstHook>)>,
    parser_extensions: Vec<Arc<dyn ParserExtension>>,
    resolve: Option<Arc<dyn ResolveHook>>,
    read: Option<Arc<dyn ReadHook>>,
    generate_code: Option<Arc<dyn CodeGenHook>>,
}

impl Plugins {
    pub fn new() -> Self {
        Plugins::default()
    }

    #[must_use]
    pub fn pre_lex(self, hook: impl TextHook + 'static) -> Self {
        self.text(TextStage::PreLex, hook)
    }

    #[must_use]
    pub fn post_lex(self, hook: impl TokenHook + 'static) -> Self {
        self.tokens(TokenStage::PostLex, hook)
    }

    /// Runs after comment stripping, on the tokens the parser will see.
    #[must_use]
    pub fn pre_parse(self, hook: impl TokenHook + 'static) -> Self {
        self.tokens(TokenStage::PreParse, hook)
    }

    #[must_use]
    pub fn post_parse(self, hook: impl AstHook + 'static) -> Self {
        self.ast(AstStage::PostParse, hook)
    }

    #[must_use]
    pub fn pre_load(self, hook: impl AstHook + 'static) -> Self {
        self.ast(AstStage::PreLoad, hook)
    }

    #[must_use]
    pub fn post_load(self, hook: impl AstHook + 'static) -> Self {
        self.ast(AstStage::PostLoad, hook)
    }

    #[must_use]
    pub fn pre_filters(self, hook: impl AstHook + 'static) -> Self {
        self.ast(AstStage::PreFilters, hook)
    }

    #[must_use]
    pub fn post_filters(self, hook: impl AstHook + 'static) -> Self {
        self.ast(AstStage::PostFilters, hook)
    }

    #[must_use]
    pub fn pre_link(self, hook: impl AstHook + 'static) -> Self {
        self.ast(AstStage::PreLink, hook)
    }

    #[must_use]
    pub fn post_link(self, hook: impl AstHook + 'static) -> Self {
        self.ast(AstStage::PostLink, hook)
    }

    #[must_use]
    pub fn pre_codegen(self, hook: impl AstHook + 'static) -> Self {
        self.ast(AstStage::PreCodegen, hook)
    }

    #[must_use]
    pub fn post_codegen(self, hook: impl TextHook + 'static) -> Self {
        self.text(TextStage::PostCodegen, hook)
    }

    /// Let `extension` claim tokens the parser does not handle.
    #[must_use]
    pub fn parser_extension(mut self, extension: impl ParserExtension + 'static) -> Self {
        self.parser_extensions.push(Arc::new(extension));
        self
    }

    pub fn resolve(mut self, hook: impl ResolveHook + 'static) -> PugResult<Self> {
        if self.resolve.is_some() {
            return Err(conflict("resolve"));
        }
        self.resolve = Some(Arc::new(hook));
        Ok(self)
    }

    pub fn read(mut self, hook: impl ReadHook + 'static) -> PugResult<Self> {
        if self.read.is_some() {
            return Err(conflict("read"));
        }
        self.read = Some(Arc::new(hook));
        Ok(self)
    }

    pub fn generate_code(mut self, hook: impl CodeGenHook + 'static) -> PugResult<Self> {
        if self.generate_code.is_some() {
            return Err(conflict("generateCode"));
        }
        self.generate_code = Some(Arc::new(hook));
        Ok(self)
    }

    fn text(mut self, stage: TextStage, hook: impl TextHook + 'static) -> Self {
        self.text.push((stage, Arc::new(hook)));
        self
    }

    fn tokens(mut self, stage: TokenStage, hook: impl TokenHook + 'static) -> Self {
        self.tokens.push((stage, Arc::new(hook)));
        self
    }

    fn ast(mut self, stage: AstStage, hook: impl AstHook + 'static) -> Self {
        self.ast.push((stage, Arc::new(hook)));
        self
    }

    pub(crate) fn apply_text(
        &self,
        stage: TextStage,
        text: String,
        cx: &HookContext<'_>,
    ) -> PugResult<String> {
        self.text
            .iter()
            .filter(|(at, _)| *at == stage)
            .try_fold(text, |text, (_, hook)| hook.apply(text, cx))
    }

    pub(crate) fn apply_tokens(
        &self,
        stage: TokenStage,
        tokens: Vec<Token>,
        cx: &HookContext<'_>,
    ) -> PugResult<Vec<Token>> {
        self.tokens
            .iter()
            .filter(|(at, _)| *at == stage)
            .try_fold(tokens, |tokens, (_, hook)| hook.apply(tokens, cx))
    }

    pub(crate) fn apply_ast(
        &self,
        stage: AstStage,
        ast: Block,
        cx: &HookContext<'_>,
    ) -> PugResult<Block> {
        self.ast
            .iter()
            .filter(|(at, _)| *at == stage)
            .try_fold(ast, |ast, (_, hook)| hook.apply(ast, cx))
    }

    pub(crate) fn parser_extensions(&self) -> &[Arc<dyn ParserExtension>] {
        &self.parser_extensions
    }

    pub(crate) fn resolver(&self) -> Option<&dyn ResolveHook> {
        self.resolve.as_deref()
    }

    pub(crate) fn reader(&self) -> Option<&dyn ReadHook> {
        self.read.as_deref()
    }

    pub(crate) fn code_generator(&self) -> Option<&dyn CodeGenHook> {
        self.generate_code.as_deref()
    }
}

impl fmt::Debug for Plugins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugins")
            .field("text_hooks", &self.text.len())
            .field("token_hooks", &self.tokens.len())
            .field("ast_hooks", &self.ast.len())
            .field("parser_extensions", &self.parser_extensions.len())
            .field("resolve", &self.resolve.is_some())
            .field("read", &self.read.is_some())
            .field("generate_code", &self.generate_code.is_some())
            .finish()
    }
}

#[cold]
fn conflict(method: &str) -> PugError {
    PugError::new(
        ErrorCode::PluginConflict,
        format!("Two or more plugins all implement {method} method."),
        0,
        0,
    )
}
