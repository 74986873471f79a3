//! Tree walking.
//!
//! The passes after parsing (load, filters, link, code generation) each
//! need "every node, depth first". These helpers give them the child blocks
//! of a node without each pass re-listing which variants own blocks.

use crate::ast::{Alternate, Block, Conditional, Node};

/// Blocks directly owned by `node`, in source order.
///
/// An `else if` chain contributes the blocks of every link. Loaded
/// dependency trees are not included; see [`dependency_mut`].
pub fn child_blocks_mut(node: &mut Node) -> Vec<&mut Block> {
    let mut out = Vec::new();
    match node {
        Node::Block(block) => out.push(block),
        Node::NamedBlock(named) => out.push(&mut named.block),
        Node::Tag(tag) | Node::InterpolatedTag(tag) => out.push(&mut tag.block),
        Node::Code(code) => out.extend(code.block.as_mut()),
        Node::Conditional(cond) => conditional_blocks_mut(cond, &mut out),
        Node::While(w) => out.push(&mut w.block),
        Node::Each(each) => {
            out.push(&mut each.block);
            out.extend(each.alternate.as_mut());
        }
        Node::EachOf(each) => out.push(&mut each.block),
        Node::Case(case) => out.push(&mut case.block),
        Node::When(when) => out.extend(when.block.as_mut()),
        Node::Mixin(mixin) => out.extend(mixin.block.as_mut()),
        Node::BlockComment(comment) => out.push(&mut comment.block),
        Node::Filter(filter) => out.push(&mut filter.block),
        Node::Include(include) => out.push(&mut include.block),
        Node::Text(_)
        | Node::MixinBlock(_)
        | Node::Doctype(_)
        | Node::Comment(_)
        | Node::Extends(_)
        | Node::RawInclude(_)
        | Node::YieldBlock(_) => {}
    }
    out
}

fn conditional_blocks_mut<'a>(cond: &'a mut Conditional, out: &mut Vec<&'a mut Block>) {
    out.push(&mut cond.consequent);
    match cond.alternate.as_deref_mut() {
        Some(Alternate::ElseIf(next)) => conditional_blocks_mut(next, out),
        Some(Alternate::Else(block)) => out.push(block),
        None => {}
    }
}

/// Shared-borrow counterpart of [`child_blocks_mut`].
pub fn child_blocks(node: &Node) -> Vec<&Block> {
    let mut out = Vec::new();
    match node {
        Node::Block(block) => out.push(block),
        Node::NamedBlock(named) => out.push(&named.block),
        Node::Tag(tag) | Node::InterpolatedTag(tag) => out.push(&tag.block),
        Node::Code(code) => out.extend(code.block.as_ref()),
        Node::Conditional(cond) => {
            let mut cur = cond;
            loop {
                out.push(&cur.consequent);
                match cur.alternate.as_deref() {
                    Some(Alternate::ElseIf(next)) => cur = next,
                    Some(Alternate::Else(block)) => {
                        out.push(block);
                        break;
                    }
                    None => break,
                }
            }
        }
        Node::While(w) => out.push(&w.block),
        Node::Each(each) => {
            out.push(&each.block);
            out.extend(each.alternate.as_ref());
        }
        Node::EachOf(each) => out.push(&each.block),
        Node::Case(case) => out.push(&case.block),
        Node::When(when) => out.extend(when.block.as_ref()),
        Node::Mixin(mixin) => out.extend(mixin.block.as_ref()),
        Node::BlockComment(comment) => out.push(&comment.block),
        Node::Filter(filter) => out.push(&filter.block),
        Node::Include(include) => out.push(&include.block),
        Node::Text(_)
        | Node::MixinBlock(_)
        | Node::Doctype(_)
        | Node::Comment(_)
        | Node::Extends(_)
        | Node::RawInclude(_)
        | Node::YieldBlock(_) => {}
    }
    out
}

/// The parsed tree of a file referenced by `extends` or `include`, once
/// the load pass has filled it in.
pub fn dependency_mut(node: &mut Node) -> Option<&mut Block> {
    match node {
        Node::Extends(ext) => ext.file.ast.as_deref_mut(),
        Node::Include(inc) => inc.file.ast.as_deref_mut(),
        _ => None,
    }
}

/// Visit every node under `block` depth first, parents before children.
///
/// The callback may rewrite a node; the walk then descends into the
/// rewritten node's blocks.
pub fn walk_mut(block: &mut Block, f: &mut dyn FnMut(&mut Node)) {
    for node in &mut block.nodes {
        f(node);
        for child in child_blocks_mut(node) {
            walk_mut(child, f);
        }
    }
}

/// Shared-borrow counterpart of [`walk_mut`].
pub fn walk(block: &Block, f: &mut dyn FnMut(&Node)) {
    for node in &block.nodes {
        f(node);
        for child in child_blocks(node) {
            walk(child, f);
        }
    }
}

#[cfg(test)]
mod tests;
