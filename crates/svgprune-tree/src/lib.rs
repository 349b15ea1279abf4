// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Represents an SVG document as a mutable tree.

`svgprune-tree` uses [`roxmltree`](https://github.com/RazrFalcon/roxmltree) for parsing
and [`xmlwriter`](https://github.com/RazrFalcon/xmlwriter) for writing, but unlike
`roxmltree` the resulting tree can be modified: nodes can be appended, attributes changed
and subtrees detached.

All nodes are stored in a single arena and addressed by [`NodeId`].
A detached node is still present in the arena, but it is no longer reachable from the root.
Ids are never reused, so they are safe to use as map keys during a single processing run.
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(missing_copy_implementations)]

use std::num::NonZeroU32;

mod error;
mod parse;
mod write;

pub use error::Error;
pub use parse::decompress_svgz;
pub use write::{Indent, WriteOptions};

pub use roxmltree;

/// The SVG namespace URI.
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// A mutable SVG tree container.
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Document {
    /// Creates a new document that contains only the root node.
    pub fn new() -> Self {
        Document {
            nodes: vec![NodeData {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Root,
            }],
        }
    }

    /// Returns the root node.
    #[inline]
    pub fn root(&self) -> Node {
        self.get(NodeId::new(0))
    }

    /// Returns the root element.
    ///
    /// Unlike a parsed document, a manually built one can be empty.
    #[inline]
    pub fn root_element(&self) -> Option<Node> {
        self.root().first_element_child()
    }

    /// Returns a node by ID.
    ///
    /// # Panics
    ///
    /// When `id` belongs to a different document.
    #[inline]
    pub fn get(&self, id: NodeId) -> Node {
        Node {
            id,
            d: &self.nodes[id.get_usize()],
            doc: self,
        }
    }

    /// Returns an iterator over the root's descendant nodes.
    ///
    /// Shorthand for `doc.root().descendants()`.
    #[inline]
    pub fn descendants(&self) -> Descendants {
        self.root().descendants()
    }

    /// Returns the first attached element with the specified `id` attribute.
    pub fn element_by_id(&self, id: &str) -> Option<Node> {
        self.descendants()
            .find(|n| n.is_element() && n.attribute("id") == Some(id))
    }

    /// Returns the number of nodes in the arena, detached ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Checks that the document has no nodes except the root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Appends a new node to the end of the `parent` children list.
    pub fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let new_child_id = NodeId::from(self.nodes.len());
        self.nodes.push(NodeData {
            parent: Some(parent),
            children: Vec::new(),
            kind,
        });
        self.nodes[parent.get_usize()].children.push(new_child_id);
        new_child_id
    }

    /// Appends a new element in the SVG namespace.
    ///
    /// A prefixed name, like `sodipodi:namedview`, will keep its prefix,
    /// but will not be bound to any namespace.
    pub fn append_element(&mut self, parent: NodeId, name: &str) -> NodeId {
        let name = match name.split_once(':') {
            Some((prefix, local)) => QName {
                prefix: Some(prefix.to_string()),
                local: local.to_string(),
                namespace: None,
            },
            None => QName {
                prefix: None,
                local: name.to_string(),
                namespace: Some(SVG_NS.to_string()),
            },
        };

        self.append(parent, NodeKind::Element(ElementData::new(name)))
    }

    /// Appends a new text node.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.append(parent, NodeKind::Text(text.to_string()))
    }

    /// Sets an attribute value, replacing an existing one.
    ///
    /// Does nothing for non-element nodes.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeKind::Element(ref mut e) = self.nodes[id.get_usize()].kind {
            match e.attributes.iter_mut().find(|a| a.name == name) {
                Some(attr) => attr.value = value.to_string(),
                None => e.attributes.push(Attribute {
                    name: name.to_string(),
                    value: value.to_string(),
                }),
            }
        }
    }

    /// Removes an attribute and returns its value.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        match self.nodes[id.get_usize()].kind {
            NodeKind::Element(ref mut e) => {
                let idx = e.attributes.iter().position(|a| a.name == name)?;
                Some(e.attributes.remove(idx).value)
            }
            _ => None,
        }
    }

    /// Detaches a node from its parent.
    ///
    /// Returns `false` when the node doesn't have a parent. The root node and
    /// already detached nodes are left as is.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let parent_id = match self.nodes[id.get_usize()].parent.take() {
            Some(id) => id,
            None => return false,
        };

        let siblings = &mut self.nodes[parent_id.get_usize()].children;
        if let Some(idx) = siblings.iter().position(|c| *c == id) {
            siblings.remove(idx);
        }

        true
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        if !self.root().has_children() {
            return write!(f, "Document []");
        }

        macro_rules! writeln_indented {
            ($depth:expr, $f:expr, $fmt:expr) => {
                for _ in 0..$depth { write!($f, "    ")?; }
                writeln!($f, $fmt)?;
            };
            ($depth:expr, $f:expr, $fmt:expr, $($arg:tt)*) => {
                for _ in 0..$depth { write!($f, "    ")?; }
                writeln!($f, $fmt, $($arg)*)?;
            };
        }

        fn print_children(
            parent: Node,
            depth: usize,
            f: &mut std::fmt::Formatter,
        ) -> Result<(), std::fmt::Error> {
            for child in parent.children() {
                if child.is_element() {
                    writeln_indented!(depth, f, "Element {{");
                    writeln_indented!(depth, f, "    tag_name: {:?}", child.tag_name());

                    if !child.attributes().is_empty() {
                        writeln_indented!(depth + 1, f, "attributes: [");
                        for attr in child.attributes() {
                            writeln_indented!(depth + 2, f, "{:?}", attr);
                        }
                        writeln_indented!(depth + 1, f, "]");
                    }

                    if child.has_children() {
                        writeln_indented!(depth, f, "    children: [");
                        print_children(child, depth + 2, f)?;
                        writeln_indented!(depth, f, "    ]");
                    }

                    writeln_indented!(depth, f, "}}");
                } else {
                    writeln_indented!(depth, f, "{:?}", child);
                }
            }

            Ok(())
        }

        writeln!(f, "Document [")?;
        print_children(self.root(), 1, f)?;
        writeln!(f, "]")?;

        Ok(())
    }
}

/// A node ID.
///
/// Stays valid for the whole document lifetime, even after the node was detached.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    #[inline]
    fn new(id: u32) -> Self {
        debug_assert!(id < u32::MAX);

        // We are using `NonZeroU32` to reduce overhead of `Option<NodeId>`.
        NodeId(NonZeroU32::new(id + 1).unwrap())
    }

    /// Returns the arena index.
    #[inline]
    pub fn get(self) -> u32 {
        self.0.get() - 1
    }

    #[inline]
    fn get_usize(self) -> usize {
        self.get() as usize
    }
}

impl From<usize> for NodeId {
    #[inline]
    fn from(id: usize) -> Self {
        // The parser limits the number of nodes way below `u32::MAX`.
        debug_assert!(id < u32::MAX as usize);
        NodeId::new(id as u32)
    }
}

/// A qualified element name.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct QName {
    /// Namespace prefix, as written in the source.
    pub prefix: Option<String>,
    /// Local name.
    pub local: String,
    /// Namespace URI.
    pub namespace: Option<String>,
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.prefix {
            Some(ref prefix) => write!(f, "{}:{}", prefix, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// An attribute.
///
/// The name is qualified, like `fill` or `xlink:href`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Attribute {
    /// Attribute's name.
    pub name: String,
    /// Attribute's value.
    pub value: String,
}

/// A namespace declaration.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Namespace {
    /// Namespace prefix. `None` for the default namespace.
    pub prefix: Option<String>,
    /// Namespace URI.
    pub uri: String,
}

/// Element's data.
#[derive(Clone, PartialEq, Debug)]
pub struct ElementData {
    /// Element's name.
    pub name: QName,
    /// Element's attributes, in the source order.
    pub attributes: Vec<Attribute>,
    /// Namespaces declared on this element.
    pub namespaces: Vec<Namespace>,
}

impl ElementData {
    /// Creates an element without attributes.
    pub fn new(name: QName) -> Self {
        ElementData {
            name,
            attributes: Vec::new(),
            namespaces: Vec::new(),
        }
    }
}

/// A node kind.
#[derive(Clone, PartialEq, Debug)]
pub enum NodeKind {
    /// The document root. Not an element.
    Root,
    /// An element.
    Element(ElementData),
    /// A text node.
    Text(String),
    /// A comment.
    Comment(String),
}

struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// An SVG node.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    id: NodeId,
    doc: &'a Document,
    d: &'a NodeData,
}

impl Eq for Node<'_> {}

impl PartialEq for Node<'_> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.doc, other.doc)
    }
}

impl<'a> Node<'a> {
    /// Returns node's ID.
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns node's document.
    #[inline]
    pub fn document(&self) -> &'a Document {
        self.doc
    }

    /// Returns node's kind.
    #[inline]
    pub fn kind(&self) -> &'a NodeKind {
        &self.d.kind
    }

    /// Checks if the current node is the document root.
    #[inline]
    pub fn is_root(&self) -> bool {
        matches!(self.d.kind, NodeKind::Root)
    }

    /// Checks if the current node is an element.
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.d.kind, NodeKind::Element(_))
    }

    /// Checks if the current node is a text.
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.d.kind, NodeKind::Text(_))
    }

    /// Returns element's qualified name, unless the current node is not an element.
    #[inline]
    pub fn qname(&self) -> Option<&'a QName> {
        match self.d.kind {
            NodeKind::Element(ref e) => Some(&e.name),
            _ => None,
        }
    }

    /// Returns element's local name, unless the current node is not an element.
    #[inline]
    pub fn tag_name(&self) -> Option<&'a str> {
        self.qname().map(|name| name.local.as_str())
    }

    /// Checks that the current node is an element with the specified local name.
    #[inline]
    pub fn has_tag_name(&self, name: &str) -> bool {
        self.tag_name() == Some(name)
    }

    /// Checks that the current node is an SVG element with the specified local name.
    ///
    /// Elements from other namespaces, like `foo:g`, do not match.
    #[inline]
    pub fn has_svg_tag_name(&self, name: &str) -> bool {
        match self.qname() {
            Some(qname) => qname.local == name && qname.namespace.as_deref() == Some(SVG_NS),
            None => false,
        }
    }

    /// Returns an attribute value by its qualified name.
    #[inline]
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.attributes()
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Checks if an attribute is present.
    #[inline]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes().iter().any(|a| a.name == name)
    }

    /// Returns a list of all element's attributes.
    #[inline]
    pub fn attributes(&self) -> &'a [Attribute] {
        match self.d.kind {
            NodeKind::Element(ref e) => &e.attributes,
            _ => &[],
        }
    }

    /// Returns node's text data.
    ///
    /// For text and comment nodes returns their content.
    /// For elements returns the first child node text.
    pub fn text(&self) -> &'a str {
        match self.d.kind {
            NodeKind::Element(_) => match self.first_child() {
                Some(child) => match child.d.kind {
                    NodeKind::Text(ref text) => text,
                    _ => "",
                },
                None => "",
            },
            NodeKind::Text(ref text) | NodeKind::Comment(ref text) => text,
            NodeKind::Root => "",
        }
    }

    /// Returns a parent node.
    #[inline]
    pub fn parent(&self) -> Option<Self> {
        self.d.parent.map(|id| self.doc.get(id))
    }

    /// Returns the parent element.
    #[inline]
    pub fn parent_element(&self) -> Option<Self> {
        self.ancestors().skip(1).find(|n| n.is_element())
    }

    /// Returns the first child.
    #[inline]
    pub fn first_child(&self) -> Option<Self> {
        self.d.children.first().map(|id| self.doc.get(*id))
    }

    /// Returns the first child element.
    #[inline]
    pub fn first_element_child(&self) -> Option<Self> {
        self.children().find(|n| n.is_element())
    }

    /// Checks if the node has child nodes.
    #[inline]
    pub fn has_children(&self) -> bool {
        !self.d.children.is_empty()
    }

    /// Checks that the node is reachable from the document root.
    pub fn is_attached(&self) -> bool {
        self.ancestors()
            .take(self.doc.len() + 1)
            .any(|n| n.is_root())
    }

    /// Returns an iterator over ancestor nodes starting at this node.
    #[inline]
    pub fn ancestors(&self) -> Ancestors<'a> {
        Ancestors(Some(*self))
    }

    /// Returns an iterator over children nodes.
    #[inline]
    pub fn children(&self) -> Children<'a> {
        Children {
            doc: self.doc,
            iter: self.d.children.iter(),
        }
    }

    /// Returns an iterator over this node and its descendants, in document order.
    #[inline]
    pub fn descendants(&self) -> Descendants<'a> {
        Descendants {
            doc: self.doc,
            stack: vec![self.id],
        }
    }
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self.d.kind {
            NodeKind::Root => write!(f, "Root"),
            NodeKind::Element(ref e) => {
                write!(
                    f,
                    "Element {{ tag_name: {}, attributes: {:?} }}",
                    e.name, e.attributes
                )
            }
            NodeKind::Text(ref text) => write!(f, "Text({:?})", text),
            NodeKind::Comment(ref text) => write!(f, "Comment({:?})", text),
        }
    }
}

/// An iterator over ancestor nodes.
#[derive(Clone, Debug)]
pub struct Ancestors<'a>(Option<Node<'a>>);

impl<'a> Iterator for Ancestors<'a> {
    type Item = Node<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.0.take();
        self.0 = node.as_ref().and_then(Node::parent);
        node
    }
}

/// An iterator over children nodes.
#[derive(Clone, Debug)]
pub struct Children<'a> {
    doc: &'a Document,
    iter: std::slice::Iter<'a, NodeId>,
}

impl<'a> Iterator for Children<'a> {
    type Item = Node<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|id| self.doc.get(*id))
    }
}

impl DoubleEndedIterator for Children<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter.next_back().map(|id| self.doc.get(*id))
    }
}

/// A pre-order descendants iterator.
#[derive(Clone, Debug)]
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.doc.get(self.stack.pop()?);
        self.stack.extend(node.d.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let svg = doc.append_element(doc.root().id(), "svg");
        let g = doc.append_element(svg, "g");
        let path = doc.append_element(g, "path");
        doc.set_attribute(path, "id", "p1");
        (doc, svg, g, path)
    }

    #[test]
    fn append_and_navigate() {
        let (doc, svg, g, path) = sample();
        assert_eq!(doc.root_element().map(|n| n.id()), Some(svg));
        assert_eq!(doc.get(path).parent().map(|n| n.id()), Some(g));
        assert_eq!(doc.get(path).parent_element().map(|n| n.id()), Some(g));
        assert_eq!(doc.get(path).ancestors().count(), 4);
        assert_eq!(doc.get(g).tag_name(), Some("g"));
        assert_eq!(doc.element_by_id("p1").map(|n| n.id()), Some(path));
    }

    #[test]
    fn descendants_are_in_document_order() {
        let mut doc = Document::new();
        let svg = doc.append_element(doc.root().id(), "svg");
        let a = doc.append_element(svg, "a");
        doc.append_element(a, "b");
        doc.append_element(svg, "c");

        let names: Vec<_> = doc.descendants().filter_map(|n| n.tag_name()).collect();
        assert_eq!(names, ["svg", "a", "b", "c"]);
    }

    #[test]
    fn detach() {
        let (mut doc, svg, g, path) = sample();
        assert!(doc.detach(path));
        assert!(!doc.get(g).has_children());
        assert!(!doc.get(path).is_attached());
        assert!(doc.get(g).is_attached());
        assert!(doc.element_by_id("p1").is_none());

        // A second attempt is a no-op.
        assert!(!doc.detach(path));
        // As well as the root.
        assert!(!doc.detach(doc.root().id()));
        assert!(doc.get(svg).has_children());
    }

    #[test]
    fn attributes() {
        let (mut doc, _, g, _) = sample();
        doc.set_attribute(g, "fill", "red");
        doc.set_attribute(g, "fill", "blue");
        assert_eq!(doc.get(g).attributes().len(), 1);
        assert_eq!(doc.get(g).attribute("fill"), Some("blue"));
        assert_eq!(doc.remove_attribute(g, "fill"), Some("blue".to_string()));
        assert_eq!(doc.remove_attribute(g, "fill"), None);
        assert!(!doc.get(g).has_attribute("fill"));
    }

    #[test]
    fn prefixed_element() {
        let mut doc = Document::new();
        let id = doc.append_element(doc.root().id(), "sodipodi:namedview");
        let name = doc.get(id).qname().unwrap();
        assert_eq!(name.local, "namedview");
        assert_eq!(name.to_string(), "sodipodi:namedview");
    }

    #[test]
    fn svg_tag_name() {
        let mut doc = Document::new();
        let svg = doc.append_element(doc.root().id(), "svg");
        let g = doc.append_element(svg, "g");
        let foreign = doc.append_element(svg, "foo:g");
        assert!(doc.get(g).has_svg_tag_name("g"));
        assert!(!doc.get(g).has_svg_tag_name("svg"));
        assert!(doc.get(foreign).has_tag_name("g"));
        assert!(!doc.get(foreign).has_svg_tag_name("g"));
        assert!(!doc.root().has_svg_tag_name("g"));
    }

    #[test]
    fn text_child() {
        let mut doc = Document::new();
        let svg = doc.append_element(doc.root().id(), "svg");
        let g = doc.append_element(svg, "g");
        doc.append_text(g, "  ");
        assert!(doc.get(g).has_children());
        assert!(doc.get(g).first_child().unwrap().is_text());
        assert_eq!(doc.get(g).text(), "  ");
    }
}
