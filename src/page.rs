//! Host page handle
//!
//! Wraps a parsed HTML document and exposes exactly the operations the
//! pipeline needs: read the theme attribute, select marked code blocks,
//! read their plain text, splice rendered markup into the tree, and track
//! the page's hidden state while a render pass runs.
//!
//! The page is only serialized after a pipeline run completes, by which
//! point the hidden state has been restored; the flag exists so the
//! suppress/restore contract around the render loop is observable.

use std::sync::OnceLock;

use ego_tree::{NodeId, Tree};
use scraper::node::Element;
use scraper::{ElementRef, Html, Node, Selector};

use crate::config;

fn block_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| {
        Selector::parse(&format!("code.{}", config::MARKER_CLASS))
            .expect("marker selector is a valid CSS selector")
    })
}

/// A documentation page loaded into memory.
#[derive(Debug)]
pub struct Page {
    doc: Html,
    has_doctype: bool,
    hidden: bool,
}

impl Page {
    /// Parse a page from its HTML source.
    pub fn parse(html: &str) -> Self {
        let doc = Html::parse_document(html);
        let has_doctype = doc
            .tree
            .root()
            .children()
            .any(|child| matches!(child.value(), Node::Doctype(_)));
        Page {
            doc,
            has_doctype,
            hidden: false,
        }
    }

    /// Value of the theme attribute on the root `<html>` element.
    pub fn theme_attr(&self) -> Option<String> {
        self.doc
            .root_element()
            .value()
            .attr(config::THEME_ATTR)
            .map(String::from)
    }

    /// Rewrite the theme attribute, mirroring what a host theme toggle does.
    /// Returns false when the page carries no such attribute.
    pub fn set_theme_attr(&mut self, value: &str) -> bool {
        let root_id = self.doc.root_element().id();
        let Some(mut root) = self.doc.tree.get_mut(root_id) else {
            return false;
        };
        if let Node::Element(el) = root.value() {
            set_attr(el, config::THEME_ATTR, value)
        } else {
            false
        }
    }

    /// Ids of every marked code block, in document order. A static snapshot:
    /// later replacements do not perturb a list taken before them.
    pub fn unrendered_blocks(&self) -> Vec<NodeId> {
        self.doc
            .select(block_selector())
            .map(|el| el.id())
            .collect()
    }

    /// Plain-text content of a block, or None if the node is gone or not an
    /// element.
    pub fn block_text(&self, id: NodeId) -> Option<String> {
        let node = self.doc.tree.get(id)?;
        let el = ElementRef::wrap(node)?;
        Some(el.text().collect())
    }

    /// Swap rendered markup in for the block's parent wrapper.
    ///
    /// Parses `markup` into a detached fragment, locates its root element
    /// and nested `<code>` element, re-applies the marker class to that code
    /// element (never duplicating it), then replaces the original block's
    /// parent with the new root. Returns false when the document or the
    /// markup does not have the expected structure; the block is skipped
    /// rather than failing the pass.
    pub fn replace_block(&mut self, id: NodeId, markup: &str) -> bool {
        let Some(code) = self.doc.tree.get(id) else {
            tracing::warn!("code block no longer in document; skipping");
            return false;
        };
        let Some(wrapper) = code.parent() else {
            tracing::warn!("code block has no parent wrapper; skipping");
            return false;
        };
        if !wrapper.value().is_element() || wrapper.parent().is_none() {
            tracing::warn!("code block wrapper is not a replaceable element; skipping");
            return false;
        }
        let wrapper_id = wrapper.id();

        let mut fragment = Html::parse_fragment(markup);
        let Some(new_root) = fragment
            .root_element()
            .children()
            .find(|child| child.value().is_element())
            .map(|child| child.id())
        else {
            tracing::warn!("rendered markup has no root element; skipping block");
            return false;
        };
        let Some(new_code) = find_descendant_element(&fragment.tree, new_root, "code") else {
            tracing::warn!("rendered markup has no nested code element; skipping block");
            return false;
        };

        // Re-tag the replacement so a later pass selects it again.
        let marker_applied = match fragment.tree.get_mut(new_code) {
            Some(mut node) => match node.value() {
                Node::Element(el) => append_class_token(el, config::MARKER_CLASS),
                _ => false,
            },
            None => false,
        };
        if !marker_applied {
            tracing::warn!("could not re-apply marker class; skipping block");
            return false;
        }

        if graft_before(&mut self.doc.tree, wrapper_id, &fragment.tree, new_root).is_none() {
            tracing::warn!("failed to graft rendered markup; skipping block");
            return false;
        }
        if let Some(mut old) = self.doc.tree.get_mut(wrapper_id) {
            old.detach();
        }
        true
    }

    /// Enter the hidden state for the duration of a render pass. Returns the
    /// prior state for [`Page::restore`].
    pub fn hide(&mut self) -> bool {
        let prior = self.hidden;
        self.hidden = true;
        prior
    }

    /// Restore the hidden state captured by [`Page::hide`]. Must run on
    /// every exit path of a render pass, error included.
    pub fn restore(&mut self, prior: bool) {
        self.hidden = prior;
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Serialize the page back to HTML, preserving the doctype.
    pub fn to_html(&self) -> String {
        let markup = self.doc.root_element().html();
        if self.has_doctype {
            format!("<!DOCTYPE html>\n{markup}")
        } else {
            markup
        }
    }
}

/// First descendant element with the given name, the root included.
fn find_descendant_element(tree: &Tree<Node>, root: NodeId, name: &str) -> Option<NodeId> {
    let root = tree.get(root)?;
    root.descendants()
        .find(|node| {
            node.value()
                .as_element()
                .is_some_and(|el| el.name() == name)
        })
        .map(|node| node.id())
}

/// Overwrite an existing attribute value. Returns false if the element does
/// not carry the attribute.
fn set_attr(el: &mut Element, name: &str, value: &str) -> bool {
    for (qual, val) in el.attrs.iter_mut() {
        if &*qual.local == name {
            val.clear();
            val.push_slice(value);
            return true;
        }
    }
    false
}

/// Append a class token unless it is already present. Requires the element
/// to carry a class attribute; rendered markup always does.
fn append_class_token(el: &mut Element, token: &str) -> bool {
    let existing = match el.attr("class") {
        Some(value) => value.to_string(),
        None => return false,
    };
    if existing.split_whitespace().any(|t| t == token) {
        return true;
    }
    let combined = if existing.is_empty() {
        token.to_string()
    } else {
        format!("{existing} {token}")
    };
    set_attr(el, "class", &combined)
}

/// Copy the `src_root` subtree out of `src` and insert it before `anchor`.
fn graft_before(
    tree: &mut Tree<Node>,
    anchor: NodeId,
    src: &Tree<Node>,
    src_root: NodeId,
) -> Option<NodeId> {
    let root_value = src.get(src_root)?.value().clone();
    let new_root = tree.get_mut(anchor)?.insert_before(root_value).id();

    let mut pending = vec![(src_root, new_root)];
    while let Some((from, to)) = pending.pop() {
        let children: Vec<NodeId> = match src.get(from) {
            Some(node) => node.children().map(|c| c.id()).collect(),
            None => continue,
        };
        for child in children {
            let Some(value) = src.get(child).map(|c| c.value().clone()) else {
                continue;
            };
            let Some(mut dest) = tree.get_mut(to) else {
                continue;
            };
            let new_child = dest.append(value).id();
            pending.push((child, new_child));
        }
    }
    Some(new_root)
}
