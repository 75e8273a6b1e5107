use ego_tree::iter::Edge;
use rustc_hash::FxHashMap;
use scraper::{ElementRef, Html, Node, Selector};

use crate::node::{HtmlElement, HtmlNode};
use crate::rules::ConversionRules;

const CONTENT_ROOTS: &[&str] = &["main", "body"];

/// Picks the subtree that holds the page content: the first `<main>`,
/// falling back to `<body>`.
pub fn select_content_root(document: &Html) -> Option<ElementRef<'_>> {
    CONTENT_ROOTS.iter().find_map(|tag| {
        let selector = Selector::parse(tag).ok()?;
        document.select(&selector).next()
    })
}

/// Elements nested deeper than this below the content root are flattened
/// into their text.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Maps the children of `root` into [`HtmlNode`]s, dropping everything the
/// rules remove.
pub fn map_content_nodes(root: ElementRef<'_>, rules: &ConversionRules) -> Vec<HtmlNode> {
    map_children(root, rules, 0)
}

fn map_children(parent: ElementRef<'_>, rules: &ConversionRules, depth: usize) -> Vec<HtmlNode> {
    parent
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => Some(HtmlNode::Text(text.to_string())),
            Node::Element(_) => ElementRef::wrap(child).and_then(|element| map_element(element, rules, depth)),
            _ => None,
        })
        .collect()
}

fn map_element(element: ElementRef<'_>, rules: &ConversionRules, depth: usize) -> Option<HtmlNode> {
    let value = element.value();

    if rules.removes(value) {
        tracing::trace!("Removing <{}> from content", value.name());
        return None;
    }

    if depth >= MAX_NESTING_DEPTH {
        tracing::debug!("Flattening <{}> nested {} levels deep", value.name(), depth);
        return Some(HtmlNode::Text(flatten_text(element, rules)));
    }

    let tag_name = value.name().to_lowercase();
    let attributes: FxHashMap<String, String> = value
        .attrs()
        .filter(|(name, _)| rules.keeps_attribute(&tag_name, name))
        .map(|(name, attr_value)| (name.to_string(), attr_value.to_string()))
        .collect();

    Some(HtmlNode::Element(HtmlElement::new(
        &tag_name,
        attributes,
        map_children(element, rules, depth + 1),
    )))
}

/// Collects the text below `element` without recursing, skipping the
/// subtrees the rules remove.
fn flatten_text(element: ElementRef<'_>, rules: &ConversionRules) -> String {
    let mut text = String::new();
    let mut removed_depth = 0usize;

    for edge in element.traverse() {
        match edge {
            Edge::Open(node) => match node.value() {
                Node::Element(value) if removed_depth > 0 || rules.removes(value) => removed_depth += 1,
                Node::Text(content) if removed_depth == 0 => text.push_str(content),
                _ => {}
            },
            Edge::Close(node) => {
                if node.value().is_element() && removed_depth > 0 {
                    removed_depth -= 1;
                }
            }
        }
    }

    text
}
