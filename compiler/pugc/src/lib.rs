//! The Pug template compiler.
//!
//! Compiles template source to the JavaScript source of a render function.
//!
//! # Pipeline
//!
//! ```text
//! source ─► pre_lex ─► lex ─► post_lex ─► strip comments ─► pre_parse
//!                                                              │
//!        ┌─────────────── per file (entry and every dependency) ┘
//!        ▼
//!      parse ─► post_parse ─► pre_load ─► load ─► post_load
//!                                                   │
//!        ┌──────────────────────────────────────────┘
//!        ▼
//!   pre_filters ─► filters ─► post_filters ─► pre_link ─► link ─► post_link
//!                                                                    │
//!        ┌───────────────────────────────────────────────────────────┘
//!        ▼
//!   pre_codegen ─► codegen ─► post_codegen ─► function source
//! ```
//!
//! The named hooks are [`Plugins`] extension points. Every stage fails fast
//! with a [`PugError`].
//!
//! # Example
//!
//! ```
//! use pugc::{compile, CompileOptions};
//!
//! let options = CompileOptions {
//!     compile_debug: false,
//!     ..CompileOptions::default()
//! };
//! let compiled = compile("p Hello", &options).unwrap();
//! assert!(compiled.body.starts_with("function template(locals)"));
//! ```

mod compile;
mod filters;
mod loader;
mod options;
mod plugin;
mod strip;

pub use compile::{compile, compile_client, compile_file, CompiledTemplate};
pub use filters::{handle_filters, Filter, FilterOptions};
pub use loader::FsLoader;
pub use options::CompileOptions;
pub use plugin::{
    AstHook, CodeGenHook, HookContext, Plugins, ReadHook, ResolveHook, TextHook, TokenHook,
};
pub use strip::{strip_comments, StripComments};

pub use pug_codegen::{CodeGenOptions, Indent};
pub use pug_diagnostic::{ErrorCode, PugError, PugResult};
pub use pug_eval::{Object, Value};
pub use pug_link::LoadError;
