//! Read-only tree queries over a parsed HTML document.
//!
//! [`DocNode`] wraps a `scraper` element and exposes just the moves the endpoint
//! extractor makes: selector queries below a node, the parent, and the
//! following siblings.

use scraper::{ElementRef, Node, Selector};

/// An element in the parsed document.
#[derive(Debug, Clone, Copy)]
pub struct DocNode<'a> {
    el: ElementRef<'a>,
}

/// A sibling reached by walking forward from a [`DocNode`].
#[derive(Debug, Clone, Copy)]
pub enum Sibling<'a> {
    Element(DocNode<'a>),
    Text(&'a str),
}

impl<'a> DocNode<'a> {
    pub fn new(el: ElementRef<'a>) -> Self {
        Self { el }
    }

    /// Lowercase tag name.
    pub fn tag(&self) -> &'a str {
        self.el.value().name()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.el.value().attr(name)
    }

    /// Concatenated text of the node and its descendants, untrimmed.
    pub fn text(&self) -> String {
        self.el.text().collect()
    }

    /// Descendants matching `selector`, in document order.
    pub fn select_all(
        &self,
        selector: &'a Selector,
    ) -> impl Iterator<Item = DocNode<'a>> + use<'a> {
        self.el.select(selector).map(DocNode::new)
    }

    /// First descendant matching `selector`.
    pub fn select_first(&self, selector: &'a Selector) -> Option<DocNode<'a>> {
        self.select_all(selector).next()
    }

    /// The enclosing element, if any.
    pub fn parent(&self) -> Option<DocNode<'a>> {
        self.el.parent().and_then(ElementRef::wrap).map(DocNode::new)
    }

    /// Siblings after this node. Whitespace-only text and comments are skipped.
    pub fn following_siblings(&self) -> impl Iterator<Item = Sibling<'a>> + use<'a> {
        self.el.next_siblings().filter_map(|node| match node.value() {
            Node::Element(_) => {
                ElementRef::wrap(node).map(|el| Sibling::Element(DocNode::new(el)))
            }
            Node::Text(text) if !text.trim().is_empty() => Some(Sibling::Text(&**text)),
            _ => None,
        })
    }

    /// The first element sibling after this node.
    pub fn next_element(&self) -> Option<DocNode<'a>> {
        self.following_siblings().find_map(|sibling| match sibling {
            Sibling::Element(node) => Some(node),
            Sibling::Text(_) => None,
        })
    }
}

impl Sibling<'_> {
    /// Text content of the sibling, untrimmed.
    pub fn text(&self) -> String {
        match self {
            Sibling::Element(node) => node.text(),
            Sibling::Text(text) => (*text).to_string(),
        }
    }
}
