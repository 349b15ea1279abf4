// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use roxmltree::NodeType;

use crate::{Attribute, Document, ElementData, Error, Namespace, NodeId, NodeKind, QName};

const XML_NAMESPACE_NS: &str = "http://www.w3.org/XML/1998/namespace";

const MAX_DEPTH: u32 = 1024;
const MAX_NODES: usize = 1_000_000;

impl Document {
    /// Parses a [`Document`] from raw data.
    ///
    /// Can contain an SVG string or a gzip compressed data.
    pub fn from_data(data: &[u8]) -> Result<Document, Error> {
        if data.starts_with(&[0x1f, 0x8b]) {
            let data = decompress_svgz(data)?;
            let text = std::str::from_utf8(&data).map_err(|_| Error::NotAnUtf8Str)?;
            Self::parse_str(text)
        } else {
            let text = std::str::from_utf8(data).map_err(|_| Error::NotAnUtf8Str)?;
            Self::parse_str(text)
        }
    }

    /// Parses a [`Document`] from a string.
    pub fn parse_str(text: &str) -> Result<Document, Error> {
        let xml_opt = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        };

        let xml = roxmltree::Document::parse_with_options(text, xml_opt)?;
        Self::parse_tree(&xml)
    }

    /// Parses a [`Document`] from a [`roxmltree::Document`].
    pub fn parse_tree(xml: &roxmltree::Document) -> Result<Document, Error> {
        let mut doc = Document::new();
        let root_id = doc.root().id();
        parse_xml_node_children(xml.root(), root_id, 0, &mut doc)?;

        if doc.root_element().is_none() {
            return Err(roxmltree::Error::NoRootNode.into());
        }

        Ok(doc)
    }
}

/// Decompresses an SVGZ file.
pub fn decompress_svgz(data: &[u8]) -> Result<Vec<u8>, Error> {
    use std::io::Read;

    let mut decoder = flate2::read::GzDecoder::new(data);
    let mut decoded = Vec::with_capacity(data.len() * 2);
    decoder
        .read_to_end(&mut decoded)
        .map_err(|_| Error::MalformedGZip)?;
    Ok(decoded)
}

fn parse_xml_node_children(
    parent: roxmltree::Node,
    parent_id: NodeId,
    depth: u32,
    doc: &mut Document,
) -> Result<(), Error> {
    let keep_whitespaces = preserves_whitespaces(parent);
    for node in parent.children() {
        parse_xml_node(node, parent_id, keep_whitespaces, depth, doc)?;
    }

    Ok(())
}

fn parse_xml_node(
    node: roxmltree::Node,
    parent_id: NodeId,
    keep_whitespaces: bool,
    depth: u32,
    doc: &mut Document,
) -> Result<(), Error> {
    if depth > MAX_DEPTH || doc.len() > MAX_NODES {
        return Err(Error::ElementsLimitReached);
    }

    match node.node_type() {
        NodeType::Element => {
            let node_id = doc.append(parent_id, NodeKind::Element(parse_element(node)));
            parse_xml_node_children(node, node_id, depth + 1, doc)?;
        }
        NodeType::Text => {
            let text = node.text().unwrap_or_default();
            if keep_whitespaces || !text.trim().is_empty() {
                doc.append(parent_id, NodeKind::Text(text.to_string()));
            }
        }
        NodeType::Comment => {
            let text = node.text().unwrap_or_default();
            doc.append(parent_id, NodeKind::Comment(text.to_string()));
        }
        NodeType::Root | NodeType::PI => {}
    }

    Ok(())
}

fn parse_element(node: roxmltree::Node) -> ElementData {
    let tag_name = node.tag_name();
    let name = QName {
        prefix: lookup_prefix(node, tag_name.namespace()).map(ToString::to_string),
        local: tag_name.name().to_string(),
        namespace: tag_name.namespace().map(ToString::to_string),
    };

    let attributes = node
        .attributes()
        .map(|attr| {
            let name = match lookup_prefix(node, attr.namespace()) {
                Some(prefix) => format!("{}:{}", prefix, attr.name()),
                None => attr.name().to_string(),
            };

            Attribute {
                name,
                value: attr.value().to_string(),
            }
        })
        .collect();

    // `roxmltree` stores all namespaces in scope on each element,
    // so we have to keep only the ones that are new compared to the parent.
    let parent_namespaces: Vec<_> = match node.parent_element() {
        Some(parent) => parent.namespaces().collect(),
        None => Vec::new(),
    };

    let namespaces = node
        .namespaces()
        .filter(|ns| ns.uri() != XML_NAMESPACE_NS)
        .filter(|ns| {
            !parent_namespaces
                .iter()
                .any(|p| p.name() == ns.name() && p.uri() == ns.uri())
        })
        .map(|ns| Namespace {
            prefix: ns.name().map(ToString::to_string),
            uri: ns.uri().to_string(),
        })
        .collect();

    ElementData {
        name,
        attributes,
        namespaces,
    }
}

fn lookup_prefix<'a>(node: roxmltree::Node<'a, '_>, namespace: Option<&str>) -> Option<&'a str> {
    let uri = namespace?;
    if uri == XML_NAMESPACE_NS {
        return Some("xml");
    }

    node.lookup_prefix(uri).filter(|prefix| !prefix.is_empty())
}

/// Checks that whitespace-only text nodes inside `node` are meaningful.
///
/// Mixed content and text elements keep them, everything else is reindented on write.
fn preserves_whitespaces(node: roxmltree::Node) -> bool {
    if !node.is_element() {
        return false;
    }

    if matches!(node.tag_name().name(), "text" | "tspan" | "textPath") {
        return true;
    }

    node.children()
        .any(|n| n.is_text() && !n.text().unwrap_or_default().trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespaces_between_elements_are_dropped() {
        let doc = Document::parse_str(
            "<svg xmlns='http://www.w3.org/2000/svg'>\n  <g>\n    <rect/>\n  </g>\n</svg>",
        )
        .unwrap();

        let svg = doc.root_element().unwrap();
        assert_eq!(svg.children().count(), 1);
        assert_eq!(svg.first_child().unwrap().children().count(), 1);
    }

    #[test]
    fn text_content_is_kept() {
        let doc = Document::parse_str(
            "<svg xmlns='http://www.w3.org/2000/svg'><text>Hello <tspan>world</tspan></text></svg>",
        )
        .unwrap();

        let text = doc.descendants().find(|n| n.has_tag_name("text")).unwrap();
        assert_eq!(text.children().count(), 2);
        assert_eq!(text.text(), "Hello ");
    }

    #[test]
    fn prefixes_are_resolved() {
        let doc = Document::parse_str(
            "<svg xmlns='http://www.w3.org/2000/svg' \
                  xmlns:xlink='http://www.w3.org/1999/xlink' \
                  xmlns:sodipodi='http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd'>\
                <sodipodi:namedview/>\
                <use xlink:href='#a' xml:space='preserve'/>\
            </svg>",
        )
        .unwrap();

        let svg = doc.root_element().unwrap();
        match svg.kind() {
            NodeKind::Element(ref e) => assert_eq!(e.namespaces.len(), 3),
            _ => unreachable!(),
        }

        let view = doc.descendants().find(|n| n.has_tag_name("namedview")).unwrap();
        assert_eq!(view.qname().unwrap().to_string(), "sodipodi:namedview");

        let use_node = doc.descendants().find(|n| n.has_tag_name("use")).unwrap();
        assert_eq!(use_node.attribute("xlink:href"), Some("#a"));
        assert_eq!(use_node.attribute("xml:space"), Some("preserve"));
        match use_node.kind() {
            NodeKind::Element(ref e) => assert!(e.namespaces.is_empty()),
            _ => unreachable!(),
        }
    }

    #[test]
    fn comments_are_kept() {
        let doc =
            Document::parse_str("<svg xmlns='http://www.w3.org/2000/svg'><!-- note --></svg>")
                .unwrap();
        let svg = doc.root_element().unwrap();
        assert_eq!(svg.first_child().unwrap().text(), " note ");
    }

    #[test]
    fn malformed_gzip() {
        assert!(matches!(
            Document::from_data(&[0x1f, 0x8b, 0x00]),
            Err(Error::MalformedGZip)
        ));
    }

    #[test]
    fn not_utf8() {
        assert!(matches!(
            Document::from_data(&[0xff, 0xfe, 0x3c]),
            Err(Error::NotAnUtf8Str)
        ));
    }

    #[test]
    fn too_deep() {
        let mut text = String::from("<svg xmlns='http://www.w3.org/2000/svg'>");
        for _ in 0..1100 {
            text.push_str("<g>");
        }
        for _ in 0..1100 {
            text.push_str("</g>");
        }
        text.push_str("</svg>");

        assert!(Document::parse_str(&text).is_err());
    }
}
