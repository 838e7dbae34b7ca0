//! Owned HTML fragment tree.
//!
//! ## Why an owned tree?
//!
//! The sanitizer removes nodes and the TOC builder writes `id` attributes, so
//! the stages after conversion need a mutable document. `scraper`'s parsed
//! tree is borrow-heavy and awkward to mutate, so we parse once and copy the
//! result into a plain owned structure the rest of the pipeline can freely
//! edit, then serialise back to HTML at the end.

use scraper::{Html, Node as ScraperNode};

/// Elements serialised without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// What a [`Node`] is: an element with attributes, or a text run.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Element {
        /// Lowercased tag name.
        name: String,
        /// Attribute pairs. Small lists, so a flat vec beats a map.
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

/// One node of the fragment tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

impl Node {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Text(content.into()),
            children: Vec::new(),
        }
    }

    pub fn element(name: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Element {
                name: name.into(),
                attrs: Vec::new(),
            },
            children: Vec::new(),
        }
    }

    /// Tag name for elements, `None` for text nodes.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { name, .. } => Some(name),
            NodeKind::Text(_) => None,
        }
    }

    pub fn is_element(&self, tag: &str) -> bool {
        self.name() == Some(tag)
    }

    /// Attribute value, if present.
    pub fn attr(&self, key: &str) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    /// Set an attribute, replacing any existing value. No-op on text nodes.
    pub fn set_attr(&mut self, key: &str, value: &str) {
        if let NodeKind::Element { attrs, .. } = &mut self.kind {
            if let Some(slot) = attrs.iter_mut().find(|(k, _)| k == key) {
                slot.1 = value.to_string();
            } else {
                attrs.push((key.to_string(), value.to_string()));
            }
        }
    }

    /// Concatenated text of this node and all descendants, in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Text(t) => out.push_str(t),
            NodeKind::Element { .. } => {
                for child in &self.children {
                    child.collect_text(out);
                }
            }
        }
    }

    fn write_html(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Text(t) => out.push_str(&escape_text(t)),
            NodeKind::Element { name, attrs } => {
                out.push('<');
                out.push_str(name);
                for (k, v) in attrs {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(v));
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&name.as_str()) {
                    return;
                }
                for child in &self.children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
    }
}

/// A parsed HTML fragment: the top-level nodes of the converted document.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    pub nodes: Vec<Node>,
}

impl Fragment {
    /// Parse an HTML fragment into an owned tree.
    ///
    /// Parsing is lenient (html5ever underneath): malformed input yields a
    /// best-effort tree, never an error, mirroring how browsers treat
    /// converter output.
    pub fn parse(html: &str) -> Fragment {
        let parsed = Html::parse_fragment(html);
        let mut nodes = Vec::new();
        // parse_fragment wraps content in a synthetic <html> root element.
        for child in parsed.root_element().children() {
            copy_children(&child, &mut nodes);
        }
        Fragment { nodes }
    }

    /// Serialise back to an HTML string.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_html(&mut out);
        }
        out
    }

    /// Depth-first mutable visit of every element node.
    pub fn walk_elements_mut<F: FnMut(&mut Node)>(&mut self, mut f: F) {
        for node in &mut self.nodes {
            walk_node_mut(node, &mut f);
        }
    }

    /// Concatenated text of the whole fragment.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.collect_text(&mut out);
        }
        out
    }
}

fn walk_node_mut<F: FnMut(&mut Node)>(node: &mut Node, f: &mut F) {
    if matches!(node.kind, NodeKind::Element { .. }) {
        f(node);
    }
    for child in &mut node.children {
        walk_node_mut(child, f);
    }
}

/// Copy a scraper subtree into owned [`Node`]s, appending to `out`.
///
/// The synthetic root element from `parse_fragment` is flattened away by the
/// caller; here we keep everything except comments, doctypes, and processing
/// instructions, which never survive to the rendered page.
fn copy_children(node_ref: &ego_tree::NodeRef<'_, ScraperNode>, out: &mut Vec<Node>) {
    match node_ref.value() {
        ScraperNode::Text(t) => out.push(Node::text(t.to_string())),
        ScraperNode::Element(el) => {
            let mut node = Node::element(el.name().to_ascii_lowercase());
            if let NodeKind::Element { attrs, .. } = &mut node.kind {
                for (key, value) in el.attrs() {
                    attrs.push((key.to_string(), value.to_string()));
                }
            }
            for child in node_ref.children() {
                copy_children(&child, &mut node.children);
            }
            out.push(node);
        }
        _ => {}
    }
}

fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            _ => out.push(ch),
        }
    }
    out
}
