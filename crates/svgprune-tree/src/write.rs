// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::borrow::Cow;

use xmlwriter::XmlWriter;

use crate::{Document, Node, NodeKind};

pub use xmlwriter::Indent;

/// XML writing options.
#[derive(Clone, Copy, Debug)]
pub struct WriteOptions {
    /// Use single quote marks instead of double quote.
    ///
    /// Default: disabled
    pub use_single_quote: bool,

    /// Set XML nodes indention.
    ///
    /// Elements with text content are always written as is.
    ///
    /// Default: 4 spaces
    pub indent: Indent,

    /// Set XML attributes indention.
    ///
    /// Default: `None`
    pub attributes_indent: Indent,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            use_single_quote: false,
            indent: Indent::Spaces(4),
            attributes_indent: Indent::None,
        }
    }
}

impl Document {
    /// Writes the document back to SVG.
    ///
    /// Detached nodes are not written.
    pub fn to_string(&self, opt: &WriteOptions) -> String {
        let mut xml = XmlWriter::new(xmlwriter::Options {
            use_single_quote: opt.use_single_quote,
            indent: opt.indent,
            attributes_indent: opt.attributes_indent,
        });

        xml.write_declaration();
        write_children(self.root(), false, &mut xml);
        xml.end_document()
    }
}

fn write_children(parent: Node, preserve_whitespaces: bool, xml: &mut XmlWriter) {
    for child in parent.children() {
        write_node(child, preserve_whitespaces, xml);
    }
}

fn write_node(node: Node, preserve_whitespaces: bool, xml: &mut XmlWriter) {
    match node.kind() {
        NodeKind::Root => write_children(node, preserve_whitespaces, xml),
        NodeKind::Element(ref e) => {
            xml.start_element(&e.name.to_string());

            for ns in &e.namespaces {
                let name = match ns.prefix {
                    Some(ref prefix) => Cow::Owned(format!("xmlns:{}", prefix)),
                    None => Cow::Borrowed("xmlns"),
                };
                xml.write_attribute(&name, &escape(&ns.uri));
            }

            for attr in &e.attributes {
                xml.write_attribute(&attr.name, &escape(&attr.value));
            }

            // Any indention inside an element with text will alter the text content.
            let has_text = preserve_whitespaces || node.children().any(|n| n.is_text());
            let toggle = has_text && !preserve_whitespaces;
            if toggle {
                xml.set_preserve_whitespaces(true);
            }

            write_children(node, has_text, xml);
            xml.end_element();

            if toggle {
                xml.set_preserve_whitespaces(false);
            }
        }
        NodeKind::Text(ref text) => xml.write_text(&escape(text)),
        NodeKind::Comment(ref text) => xml.write_comment(text),
    }
}

/// Escapes markup characters.
///
/// Quotes inside attributes are handled by `xmlwriter` itself.
fn escape(text: &str) -> Cow<str> {
    if !text.contains(['&', '<', '>']) {
        return Cow::Borrowed(text);
    }

    let mut s = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => s.push_str("&amp;"),
            '<' => s.push_str("&lt;"),
            '>' => s.push_str("&gt;"),
            _ => s.push(c),
        }
    }

    Cow::Owned(s)
}
