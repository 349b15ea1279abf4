// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::borrow::Cow;
use std::collections::HashMap;

use svgprune_tree::Document;

/// An ordered list of `name: value` declarations.
///
/// Setting an already present property overwrites its value in place.
#[derive(Clone, Default, PartialEq, Debug)]
pub struct PropertyMap(Vec<(String, String)>);

impl PropertyMap {
    /// Creates an empty map.
    #[inline]
    pub fn new() -> Self {
        PropertyMap(Vec::new())
    }

    /// Parses a declarations list, like the one inside a `style` attribute.
    ///
    /// Declarations without a colon or with an empty name are ignored.
    pub fn parse(text: &str) -> Self {
        let mut map = PropertyMap::new();
        for declaration in text.split(';') {
            if let Some((name, value)) = declaration.split_once(':') {
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }

                map.insert(name, value.trim());
            }
        }

        map
    }

    /// Returns a property value.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Sets a property value.
    pub fn insert(&mut self, name: &str, value: &str) {
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.0.push((name.to_string(), value.to_string())),
        }
    }

    /// Copies all properties from `other`, overwriting the existing ones.
    pub fn merge(&mut self, other: &PropertyMap) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }

    /// Returns an iterator over declarations.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Returns the number of declarations.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks that there are no declarations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Class-based style rules.
///
/// Only simple class selectors, like `.cls1`, are supported.
/// Everything else is silently ignored.
#[derive(Clone, Default, Debug)]
pub struct StyleSheet {
    classes: HashMap<String, PropertyMap>,
}

impl StyleSheet {
    /// Creates an empty style sheet.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses multiple style blocks.
    pub fn from_blocks<I, S>(blocks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sheet = StyleSheet::new();
        for text in blocks {
            sheet.parse_more(text.as_ref());
        }

        sheet
    }

    /// Collects and parses all attached SVG `style` elements of a document.
    ///
    /// Elements with a non-CSS `type` are skipped.
    pub fn from_document(doc: &Document) -> Self {
        let blocks = doc
            .descendants()
            .filter(|n| n.has_svg_tag_name("style"))
            .filter(|n| match n.attribute("type") {
                None | Some("text/css") => true,
                Some(kind) => {
                    log::warn!("Unsupported style type '{}'. Skipped.", kind);
                    false
                }
            })
            .map(|n| n.text());

        Self::from_blocks(blocks)
    }

    /// Parses a style block and merges it into the current sheet.
    ///
    /// Later declarations override earlier ones for the same class.
    pub fn parse_more(&mut self, text: &str) {
        let text = strip_comments(text);
        for (selectors, body) in Blocks::new(&text) {
            let body = body.trim();
            if body.is_empty() {
                continue;
            }

            let properties = PropertyMap::parse(body);
            for selector in selectors.split(',') {
                let selector = selector.trim();
                match selector.strip_prefix('.') {
                    Some(name) if is_class_name(name) => {
                        self.classes
                            .entry(name.to_string())
                            .or_default()
                            .merge(&properties);
                    }
                    _ => log::debug!("Unsupported CSS selector '{}'. Skipped.", selector),
                }
            }
        }
    }

    /// Returns properties of the specified class.
    #[inline]
    pub fn class(&self, name: &str) -> Option<&PropertyMap> {
        self.classes.get(name)
    }

    /// Returns the number of classes.
    #[inline]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Checks that there are no classes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

fn is_class_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii())
}

/// Removes `/* ... */` comments.
///
/// An unterminated comment is left as is.
fn strip_comments(text: &str) -> Cow<str> {
    if !text.contains("/*") {
        return Cow::Borrowed(text);
    }

    let mut s = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("/*") {
        match rest[start + 2..].find("*/") {
            Some(len) => {
                s.push_str(&rest[..start]);
                rest = &rest[start + 2 + len + 2..];
            }
            None => break,
        }
    }
    s.push_str(rest);

    Cow::Owned(s)
}

/// An iterator over `selectors { body }` pairs.
///
/// A selectors list cannot contain braces. A body ends at the first `}`.
/// Text that doesn't form a block is skipped.
struct Blocks<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Blocks<'a> {
    fn new(text: &'a str) -> Self {
        Blocks { text, pos: 0 }
    }
}

impl<'a> Iterator for Blocks<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rest = &self.text[self.pos..];
            let brace = rest.find(['{', '}'])?;
            let selectors = &rest[..brace];

            if rest.as_bytes()[brace] == b'}' || selectors.is_empty() {
                // Not a block start. Try again after the brace.
                self.pos += brace + 1;
                continue;
            }

            let body_start = brace + 1;
            let body_len = match rest[body_start..].find('}') {
                Some(len) => len,
                None => {
                    log::debug!("Unclosed CSS block '{}'. Skipped.", selectors.trim());
                    self.pos = self.text.len();
                    return None;
                }
            };

            self.pos += body_start + body_len + 1;
            return Some((selectors, &rest[body_start..body_start + body_len]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarations() {
        let map = PropertyMap::parse(" fill : red ;stroke:none;;broken; :x; fill:blue; d:url(a:b)");
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("fill"), Some("blue"));
        assert_eq!(map.get("stroke"), Some("none"));
        assert_eq!(map.get("d"), Some("url(a:b)"));
        assert_eq!(map.get("broken"), None);

        let names: Vec<_> = map.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["fill", "stroke", "d"]);
    }

    #[test]
    fn simple_classes() {
        let sheet = StyleSheet::from_blocks([".a { fill: none; stroke: red }"]);
        let a = sheet.class("a").unwrap();
        assert_eq!(a.get("fill"), Some("none"));
        assert_eq!(a.get("stroke"), Some("red"));
    }

    #[test]
    fn selector_list() {
        let sheet = StyleSheet::from_blocks([".a, rect, .b ,#c { fill: none }"]);
        assert_eq!(sheet.len(), 2);
        assert!(sheet.class("a").is_some());
        assert!(sheet.class("b").is_some());
    }

    #[test]
    fn complex_selectors_are_ignored() {
        let sheet = StyleSheet::from_blocks([
            ".a .b { fill: none } .c:hover { fill: none } .d.e { fill: none } .f>g { fill: none }",
        ]);
        assert!(sheet.is_empty());
    }

    #[test]
    fn repeated_class_is_merged() {
        let sheet = StyleSheet::from_blocks([
            ".a { fill: none; stroke: red }",
            ".a { stroke: blue; opacity: 0.5 }",
        ]);
        let a = sheet.class("a").unwrap();
        assert_eq!(a.get("fill"), Some("none"));
        assert_eq!(a.get("stroke"), Some("blue"));
        assert_eq!(a.get("opacity"), Some("0.5"));
    }

    #[test]
    fn comments() {
        let sheet = StyleSheet::from_blocks([
            "/* .x { fill: red } */ .a { /* fill: red; */ stroke: none } /* unterminated",
        ]);
        assert!(sheet.class("x").is_none());
        let a = sheet.class("a").unwrap();
        assert_eq!(a.get("fill"), None);
        assert_eq!(a.get("stroke"), Some("none"));
    }

    #[test]
    fn malformed_blocks() {
        let sheet = StyleSheet::from_blocks(["} .a { fill: none } .b { stroke: none"]);
        assert!(sheet.class("a").is_some());
        assert!(sheet.class("b").is_none());

        let sheet = StyleSheet::from_blocks([".a { }", ".b { fill }", "{ fill: red }"]);
        assert!(sheet.class("a").is_none());
        assert_eq!(sheet.class("b").map(|p| p.len()), Some(0));
    }

    #[test]
    fn nested_block_takes_outer_selector() {
        // `@media` is not a class selector, so the whole block is lost.
        let sheet = StyleSheet::from_blocks(["@media print { .a { fill: none } } .b { fill: none }"]);
        assert!(sheet.class("a").is_none());
        assert!(sheet.class("b").is_some());
    }

    #[test]
    fn from_document() {
        let doc = Document::parse_str(
            "<svg xmlns='http://www.w3.org/2000/svg'>\
                <style>.a { fill: none }</style>\
                <defs><style type='text/css'>.a { stroke: none }</style></defs>\
                <style type='text/less'>.b { fill: none }</style>\
                <foo:style xmlns:foo='http://example.com/foo'>.c { fill: none }</foo:style>\
            </svg>",
        )
        .unwrap();

        let sheet = StyleSheet::from_document(&doc);
        let a = sheet.class("a").unwrap();
        assert_eq!(a.get("fill"), Some("none"));
        assert_eq!(a.get("stroke"), Some("none"));
        assert!(sheet.class("b").is_none());
        assert!(sheet.class("c").is_none());
    }
}
