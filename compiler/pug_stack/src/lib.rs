//! Stack safety for the recursive passes of the Pug compiler.
//!
//! Templates nest through tags, blocks, mixins and includes, and embedded
//! expressions nest through brackets. The parser, linker, code generator and
//! expression parser all recurse on that structure, so a hostile or generated
//! template can nest deeper than the default thread stack allows.
//!
//! - **Native targets**: the `stacker` crate grows the stack on demand.
//! - **WASM targets**: a plain passthrough.
//!
//! ```text
//! fn parse_expr(&mut self) -> Result<Node, PugError> {
//!     ensure_sufficient_stack(|| self.parse_expr_inner())
//! }
//! ```

/// Grow when less than this much stack is left.
const RED_ZONE: usize = 64 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if the remaining space is below the
/// red zone.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum Nested {
        Leaf,
        Wrap(Box<Nested>),
    }

    fn depth(node: &Nested) -> usize {
        ensure_sufficient_stack(|| match node {
            Nested::Leaf => 0,
            Nested::Wrap(inner) => depth(inner) + 1,
        })
    }

    #[test]
    fn measures_shallow_tree() {
        let tree = Nested::Wrap(Box::new(Nested::Wrap(Box::new(Nested::Leaf))));
        assert_eq!(depth(&tree), 2);
    }

    #[test]
    fn survives_deep_nesting() {
        let mut tree = Nested::Leaf;
        for _ in 0..50_000 {
            tree = Nested::Wrap(Box::new(tree));
        }
        assert_eq!(depth(&tree), 50_000);

        // Dropping the chain recursively would overflow on its own.
        let mut cursor = tree;
        while let Nested::Wrap(inner) = cursor {
            cursor = *inner;
        }
    }

    #[test]
    fn passes_results_through() {
        let result: Result<u32, &str> = ensure_sufficient_stack(|| Ok(7));
        assert_eq!(result, Ok(7));
    }
}
