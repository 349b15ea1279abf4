// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::collections::HashMap;
use std::rc::Rc;

use svgprune_tree::{Node, NodeId};

use crate::{Error, PropertyMap, StyleSheet};

/// A resolved property value.
pub type Value = Rc<str>;

/// Resolves effective style properties.
///
/// The lookup order for each node is:
///
/// 1. a declaration inside the `style` attribute
/// 2. a presentation attribute with the same name
/// 3. the first class from the `class` attribute that defines the property
/// 4. the same lookup on the parent node
///
/// Results are cached per node and property. The cache doesn't hold any
/// references to the document, so it stays valid while nodes are being detached:
/// a detached node never changes the ancestors chain of an attached one.
#[derive(Debug)]
pub struct Cascade<'a> {
    style_sheet: &'a StyleSheet,
    inline: HashMap<NodeId, PropertyMap>,
    values: HashMap<NodeId, HashMap<String, Option<Value>>>,
}

impl<'a> Cascade<'a> {
    /// Creates a new resolver with an empty cache.
    pub fn new(style_sheet: &'a StyleSheet) -> Self {
        Cascade {
            style_sheet,
            inline: HashMap::new(),
            values: HashMap::new(),
        }
    }

    /// Returns the underlying style sheet.
    #[inline]
    pub fn style_sheet(&self) -> &'a StyleSheet {
        self.style_sheet
    }

    /// Returns parsed `style` attribute declarations.
    ///
    /// Each node's `style` attribute is parsed only once.
    pub fn inline_style(&mut self, node: Node) -> &PropertyMap {
        self.inline
            .entry(node.id())
            .or_insert_with(|| PropertyMap::parse(node.attribute("style").unwrap_or_default()))
    }

    /// Returns an effective property value.
    ///
    /// Returns `None` when neither the node nor any of its ancestors declare the property.
    pub fn resolve(&mut self, node: Node, name: &str) -> Result<Option<Value>, Error> {
        // Any chain longer than the whole document has a loop in it.
        let limit = node.document().len();

        let mut visited = Vec::new();
        let mut current = Some(node);
        let value = loop {
            let n = match current {
                Some(n) => n,
                None => break None,
            };

            if let Some(value) = self.cached(n.id(), name) {
                break value;
            }

            if visited.len() >= limit {
                return Err(Error::BrokenTree(node.id()));
            }

            visited.push(n.id());

            if let Some(value) = self.declared(n, name) {
                break Some(value);
            }

            current = n.parent();
        };

        for id in visited {
            self.values
                .entry(id)
                .or_default()
                .insert(name.to_string(), value.clone());
        }

        Ok(value)
    }

    #[inline]
    fn cached(&self, id: NodeId, name: &str) -> Option<Option<Value>> {
        self.values.get(&id).and_then(|props| props.get(name)).cloned()
    }

    /// Returns a value declared on the node itself, ignoring ancestors.
    fn declared(&mut self, node: Node, name: &str) -> Option<Value> {
        if !node.is_element() {
            return None;
        }

        if let Some(value) = self.inline_style(node).get(name) {
            return Some(Value::from(value));
        }

        if let Some(value) = node.attribute(name) {
            return Some(Value::from(value));
        }

        let style_sheet = self.style_sheet;
        class_names(node)
            .filter_map(|class| style_sheet.class(class))
            .find_map(|props| props.get(name))
            .map(Value::from)
    }
}

/// Returns an iterator over class names from the `class` attribute.
pub(crate) fn class_names<'a>(node: Node<'a>) -> impl Iterator<Item = &'a str> {
    node.attribute("class").unwrap_or_default().split_whitespace()
}
