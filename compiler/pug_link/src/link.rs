//! Template inheritance and inclusion.
//!
//! Linking turns a loaded tree into one self-contained tree: includes are
//! spliced in, and a template that extends another is folded into its
//! parent by applying its named-block overrides.
//!
//! Named blocks are tracked by [`BlockId`]. Overriding copies the child's
//! nodes into the parent, so one declaration can end up in the tree more
//! than once; a later override rewrites every block carrying the target
//! id, wherever the copies landed.

use pug_diagnostic::{ErrorCode, PugError, PugResult};
use pug_ir::visit::{child_blocks, child_blocks_mut, walk, walk_mut};
use pug_ir::{Block, BlockId, BlockMode, Node, SourceLoc, Text};
use pug_stack::ensure_sufficient_stack;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

/// Link a loaded template into a single tree.
pub fn link(ast: Block) -> PugResult<Block> {
    let linked = Linker::default().link(ast)?;
    debug!(
        nodes = linked.ast.nodes.len(),
        extends = linked.has_extends,
        "linked"
    );
    Ok(linked.ast)
}

/// A linked file and the blocks a file extending it may override.
struct Linked {
    ast: Block,
    /// Replace-mode blocks by name.
    declared: FxHashMap<String, Vec<BlockId>>,
    has_extends: bool,
}

/// An override found in an extending file.
struct Override {
    id: BlockId,
    name: String,
    mode: BlockMode,
    nodes: Vec<Node>,
}

#[derive(Default)]
struct Linker {
    next_id: u32,
    /// For each override applied, the blocks it was applied to, outermost
    /// ancestor first.
    parents: FxHashMap<BlockId, Vec<BlockId>>,
}

impl Linker {
    fn link(&mut self, ast: Block) -> PugResult<Linked> {
        ensure_sufficient_stack(|| self.link_inner(ast))
    }

    fn link_inner(&mut self, mut ast: Block) -> PugResult<Linked> {
        self.assign_ids(&mut ast);
        let extends = match ast.nodes.first() {
            Some(Node::Extends(_)) => Some(ast.nodes.remove(0)),
            _ => None,
        };
        check_extends_position(&ast)?;
        self.apply_includes(&mut ast)?;
        let declared = declared_blocks(&ast);

        let Some(Node::Extends(extends)) = extends else {
            return Ok(Linked {
                ast,
                declared,
                has_extends: false,
            });
        };

        let mut expected = Vec::new();
        check_extending_root(&ast, &mut expected)?;

        let parent_ast = extends
            .file
            .ast
            .ok_or_else(|| not_loaded(&extends.file.path, &extends.loc))?;
        let mut parent = self.link(*parent_ast)?;
        self.extend(&parent.declared, &ast, &mut parent.ast);

        let found = block_names(&parent.ast);
        if let Some((name, loc)) = expected.iter().find(|(name, _)| !found.contains(*name)) {
            return Err(PugError::at_node(
                ErrorCode::UnexpectedBlock,
                format!("Unexpected block {name}"),
                loc,
            ));
        }

        parent.declared.extend(declared);
        let mut nodes = Vec::new();
        take_mixins(ast.nodes, &mut nodes);
        nodes.append(&mut parent.ast.nodes);
        parent.ast.nodes = nodes;
        parent.has_extends = true;
        Ok(parent)
    }

    fn assign_ids(&mut self, ast: &mut Block) {
        walk_mut(ast, &mut |node| {
            if let Node::NamedBlock(named) = node {
                self.next_id += 1;
                named.id = BlockId(self.next_id);
            }
        });
    }

    /// Replace raw includes with their text and includes with their linked
    /// tree. Includes inside an include's own block are handled first.
    fn apply_includes(&mut self, block: &mut Block) -> PugResult<()> {
        ensure_sufficient_stack(|| {
            for node in &mut block.nodes {
                if let Node::RawInclude(raw) = node {
                    let text = raw.file.contents.as_deref().unwrap_or_default().replace('\r', "");
                    *node = Node::Text(Text::new(text, raw.loc.clone()));
                    continue;
                }
                for child in child_blocks_mut(node) {
                    self.apply_includes(child)?;
                }
                if let Node::Include(include) = node {
                    let included = include
                        .file
                        .ast
                        .take()
                        .ok_or_else(|| not_loaded(&include.file.path, &include.loc))?;
                    let mut linked = self.link(*included)?;
                    if linked.has_extends {
                        remove_named_blocks(&mut linked.ast);
                    }
                    let content = std::mem::take(&mut include.block);
                    apply_yield(&mut linked.ast, content);
                    *node = Node::Block(linked.ast);
                }
            }
            Ok(())
        })
    }

    /// Apply the overrides in `child` to the blocks `parent` declares.
    fn extend(
        &mut self,
        declared: &FxHashMap<String, Vec<BlockId>>,
        child: &Block,
        parent: &mut Block,
    ) {
        let mut overrides = Vec::new();
        collect_overrides(child, &mut Vec::new(), &mut overrides);
        for over in overrides {
            let mut targets = Vec::new();
            if let Some(ids) = declared.get(&over.name) {
                self.flatten(ids, &mut targets);
            }
            if targets.is_empty() {
                continue;
            }
            for target in &targets {
                apply_override(parent, *target, over.mode, &over.nodes);
            }
            self.parents.insert(over.id, targets);
        }
    }

    /// `ids` preceded by every block they were themselves applied to,
    /// ancestors first, each once.
    fn flatten(&self, ids: &[BlockId], out: &mut Vec<BlockId>) {
        for id in ids {
            if let Some(parents) = self.parents.get(id) {
                self.flatten(parents, out);
            }
            if !out.contains(id) {
                out.push(*id);
            }
        }
    }
}

fn not_loaded(path: &str, loc: &SourceLoc) -> PugError {
    PugError::at_node(
        ErrorCode::FileLoad,
        format!("\"{path}\" was not loaded before linking"),
        loc,
    )
}

/// Only a leading `extends` is allowed; the caller has already removed it.
fn check_extends_position(ast: &Block) -> PugResult<()> {
    let mut misplaced = None;
    walk(ast, &mut |node| {
        if let Node::Extends(extends) = node {
            if misplaced.is_none() {
                misplaced = Some(extends.loc.clone());
            }
        }
    });
    match misplaced {
        Some(loc) => Err(PugError::at_node(
            ErrorCode::ExtendsNotFirst,
            "Declaration of template inheritance (\"extends\") should be the first thing in the file. There can only be one extends statement per file.",
            &loc,
        )),
        None => Ok(()),
    }
}

fn declared_blocks(ast: &Block) -> FxHashMap<String, Vec<BlockId>> {
    let mut declared: FxHashMap<String, Vec<BlockId>> = FxHashMap::default();
    walk(ast, &mut |node| {
        if let Node::NamedBlock(named) = node {
            if named.mode == BlockMode::Replace {
                declared.entry(named.name.clone()).or_default().push(named.id);
            }
        }
    });
    declared
}

fn block_names(ast: &Block) -> FxHashSet<String> {
    let mut names = FxHashSet::default();
    walk(ast, &mut |node| {
        if let Node::NamedBlock(named) = node {
            names.insert(named.name.clone());
        }
    });
    names
}

/// The top level of an extending file holds only named blocks and mixin
/// declarations, possibly grouped in plain blocks. Collects the names of
/// the top-level named blocks.
fn check_extending_root<'a>(
    block: &'a Block,
    expected: &mut Vec<(&'a str, &'a SourceLoc)>,
) -> PugResult<()> {
    for node in &block.nodes {
        match node {
            Node::NamedBlock(named) => expected.push((named.name.as_str(), &named.loc)),
            Node::Block(inner) => check_extending_root(inner, expected)?,
            Node::Mixin(mixin) if !mixin.call => {}
            other => {
                return Err(PugError::at_node(
                    ErrorCode::UnexpectedNodesInExtendingRoot,
                    "Only named blocks and mixins can appear at the top level of an extending template",
                    other.loc(),
                ))
            }
        }
    }
    Ok(())
}

fn take_mixins(nodes: Vec<Node>, out: &mut Vec<Node>) {
    for node in nodes {
        match node {
            Node::Mixin(mixin) if !mixin.call => out.push(Node::Mixin(mixin)),
            Node::Block(block) => take_mixins(block.nodes, out),
            _ => {}
        }
    }
}

/// Every named block in `block`, outer before inner. A block nested in a
/// block of the same name is skipped; its own children are still visited.
fn collect_overrides(block: &Block, open: &mut Vec<String>, out: &mut Vec<Override>) {
    for node in &block.nodes {
        let mut opened = false;
        if let Node::NamedBlock(named) = node {
            if !open.contains(&named.name) {
                open.push(named.name.clone());
                opened = true;
                out.push(Override {
                    id: named.id,
                    name: named.name.clone(),
                    mode: named.mode,
                    nodes: named.block.nodes.clone(),
                });
            }
        }
        for child in child_blocks(node) {
            collect_overrides(child, open, out);
        }
        if opened {
            open.pop();
        }
    }
}

fn apply_override(ast: &mut Block, target: BlockId, mode: BlockMode, nodes: &[Node]) {
    walk_mut(ast, &mut |node| {
        let Node::NamedBlock(named) = node else {
            return;
        };
        if named.id != target {
            return;
        }
        let existing = &mut named.block.nodes;
        match mode {
            BlockMode::Replace => *existing = nodes.to_vec(),
            BlockMode::Append => existing.extend_from_slice(nodes),
            BlockMode::Prepend => {
                let mut merged = nodes.to_vec();
                merged.append(existing);
                *existing = merged;
            }
        }
    });
}

/// An included file that extends another contributes its merged body;
/// its blocks are no longer overridable.
fn remove_named_blocks(ast: &mut Block) {
    walk_mut(ast, &mut |node| {
        if let Node::NamedBlock(named) = node {
            let block = std::mem::take(&mut named.block);
            *node = Node::Block(block);
        }
    });
}

/// Put the includer's block into the included tree: at each `yield`, or
/// failing that at the default location.
fn apply_yield(ast: &mut Block, content: Block) {
    if content.is_empty() {
        return;
    }
    if replace_yields(ast, &content) {
        return;
    }
    warn!(
        filename = ?content.loc.filename,
        line = content.loc.line,
        "included file has no yield; appending the include's block to its last element"
    );
    push_at_default_yield(ast, Node::Block(content));
}

/// Replace every `yield` with `content`. Inserted content is not searched.
fn replace_yields(block: &mut Block, content: &Block) -> bool {
    let mut replaced = false;
    for node in &mut block.nodes {
        if let Node::YieldBlock(loc) = node {
            let loc = loc.clone();
            *node = Node::Block(Block::with_nodes(vec![Node::Block(content.clone())], loc));
            replaced = true;
            continue;
        }
        for child in child_blocks_mut(node) {
            replaced |= replace_yields(child, content);
        }
    }
    replaced
}

/// Descend through the last child that has content, skipping text-only
/// tags, and push `content` into the deepest block reached.
fn push_at_default_yield(block: &mut Block, content: Node) {
    match block.nodes.iter().rposition(|node| yield_target(node).is_some()) {
        Some(at) => {
            if let Some(inner) = yield_target_mut(&mut block.nodes[at]) {
                push_at_default_yield(inner, content);
            }
        }
        None => block.nodes.push(content),
    }
}

/// The block a default yield may descend into: a plain block, or the
/// non-empty body of a node.
fn yield_target(node: &Node) -> Option<&Block> {
    let body = match node {
        Node::Block(block) => return Some(block),
        Node::Tag(tag) | Node::InterpolatedTag(tag) if tag.text_only => return None,
        Node::Tag(tag) | Node::InterpolatedTag(tag) => &tag.block,
        Node::Code(code) => code.block.as_ref()?,
        Node::While(w) => &w.block,
        Node::Each(each) => &each.block,
        Node::EachOf(each) => &each.block,
        Node::Case(case) => &case.block,
        Node::When(when) => when.block.as_ref()?,
        Node::Mixin(mixin) => mixin.block.as_ref()?,
        Node::BlockComment(comment) => &comment.block,
        Node::Filter(filter) => &filter.block,
        _ => return None,
    };
    (!body.is_empty()).then_some(body)
}

fn yield_target_mut(node: &mut Node) -> Option<&mut Block> {
    let body = match node {
        Node::Block(block) => return Some(block),
        Node::Tag(tag) | Node::InterpolatedTag(tag) if tag.text_only => return None,
        Node::Tag(tag) | Node::InterpolatedTag(tag) => &mut tag.block,
        Node::Code(code) => code.block.as_mut()?,
        Node::While(w) => &mut w.block,
        Node::Each(each) => &mut each.block,
        Node::EachOf(each) => &mut each.block,
        Node::Case(case) => &mut case.block,
        Node::When(when) => when.block.as_mut()?,
        Node::Mixin(mixin) => mixin.block.as_mut()?,
        Node::BlockComment(comment) => &mut comment.block,
        Node::Filter(filter) => &mut filter.block,
        _ => return None,
    };
    (!body.is_empty()).then_some(body)
}
