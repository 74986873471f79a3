use pretty_assertions::assert_eq;

use super::*;
use crate::ast::{Conditional, Tag, Text};
use crate::SourceLoc;

fn text(val: &str) -> Node {
    Node::Text(Text::new(val, SourceLoc::default()))
}

fn tag(name: &str, children: Vec<Node>) -> Node {
    Node::Tag(Tag {
        name: name.into(),
        self_closing: false,
        attrs: Vec::new(),
        attribute_blocks: Vec::new(),
        block: Block::with_nodes(children, SourceLoc::default()),
        is_inline: false,
        text_only: false,
        loc: SourceLoc::default(),
    })
}

fn conditional(test: &str, then: Node, alternate: Option<Alternate>) -> Node {
    Node::Conditional(Conditional {
        test: test.into(),
        consequent: Block::with_nodes(vec![then], SourceLoc::default()),
        alternate: alternate.map(Box::new),
        loc: SourceLoc::default(),
    })
}

#[test]
fn else_if_chain_yields_every_branch() {
    let Node::Conditional(inner) = conditional("b", text("two"), Some(Alternate::Else(
        Block::with_nodes(vec![text("three")], SourceLoc::default()),
    ))) else {
        unreachable!()
    };
    let node = conditional("a", text("one"), Some(Alternate::ElseIf(inner)));

    let texts: Vec<_> = child_blocks(&node)
        .into_iter()
        .flat_map(|b| b.nodes.iter())
        .filter_map(|n| match n {
            Node::Text(t) => Some(t.val.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(texts, vec!["one", "two", "three"]);
}

#[test]
fn walk_visits_parents_first() {
    let root = Block::with_nodes(
        vec![tag("div", vec![tag("p", vec![text("hi")])]), text("tail")],
        SourceLoc::default(),
    );
    let mut seen = Vec::new();
    walk(&root, &mut |node| seen.push(node.kind_name()));
    assert_eq!(seen, vec!["Tag", "Tag", "Text", "Text"]);
}

#[test]
fn walk_mut_descends_into_rewritten_nodes() {
    let mut root = Block::with_nodes(vec![text("swap")], SourceLoc::default());
    let mut count = 0;
    walk_mut(&mut root, &mut |node| {
        count += 1;
        if matches!(node, Node::Text(t) if t.val == "swap") {
            *node = tag("span", vec![text("inner")]);
        }
    });
    assert_eq!(count, 2);
    assert!(matches!(&root.nodes[0], Node::Tag(t) if t.name == "span"));
}
