//! Loading and linking of Pug templates.
//!
//! A parsed template may reference other files through `extends`,
//! `include` and raw includes. [`load`] reads and parses them through a
//! [`Loader`], attaching each file's tree to the node that references it.
//! [`link`] then merges everything into one tree for the code generator:
//!
//! - raw includes become text;
//! - includes are replaced by the included file's linked tree, with the
//!   includer's block placed at the `yield`;
//! - a template that extends another becomes its parent's tree with the
//!   child's named-block overrides applied and its mixins prepended.

mod link;
mod load;

pub use link::link;
pub use load::{load, resolve_path, Dependency, LoadError, Loader, ParseFn};

#[cfg(test)]
mod test_support;
