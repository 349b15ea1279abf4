// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use svgprune_tree::{Document, Node, NodeId};

use crate::{has_marker_reference, visibility, Cascade, Error, Options, Policy, StyleSheet};

/// Pruning results.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct Report {
    /// The number of removed graphic and text elements.
    pub removed_elements: usize,
    /// The number of removed groups.
    pub removed_groups: usize,
    /// The number of removed `desc` and `title` elements.
    pub removed_meta: usize,
    /// A human-readable log of all removals, in order.
    pub messages: Vec<String>,
}

impl Report {
    /// Returns the number of removed graphic elements and groups.
    ///
    /// `desc` and `title` elements are not included.
    #[inline]
    pub fn total(&self) -> usize {
        self.removed_elements + self.removed_groups
    }

    fn push(&mut self, msg: String) {
        log::info!("{}", msg);
        self.messages.push(msg);
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ElementKind {
    /// A nested or root `svg`. Always processed, never removed.
    Svg,
    /// A non-paintable container. Neither processed nor removed.
    Protected,
    Group,
    Text,
    Graphic,
    Other,
}

impl ElementKind {
    fn of(node: Node) -> Option<Self> {
        let kind = match node.tag_name()? {
            "svg" => ElementKind::Svg,
            "defs" | "metadata" | "namedview" | "style" | "script" | "clipPath" | "marker"
            | "pattern" | "linearGradient" | "radialGradient" | "symbol" => ElementKind::Protected,
            "g" if node.has_svg_tag_name("g") => ElementKind::Group,
            "text" => ElementKind::Text,
            "path" | "rect" | "circle" | "ellipse" | "line" | "polyline" | "polygon"
            | "flowRoot" => ElementKind::Graphic,
            _ => ElementKind::Other,
        };

        Some(kind)
    }
}

/// Removes invisible elements from the document.
///
/// Style rules are collected from all `style` elements of the document.
pub fn prune(doc: &mut Document, opt: &Options) -> Result<Report, Error> {
    let style_sheet = StyleSheet::from_document(doc);
    prune_with_style_sheet(doc, &style_sheet, opt)
}

/// Removes invisible elements from the document using the provided style rules.
///
/// The root element is never removed.
pub fn prune_with_style_sheet(
    doc: &mut Document,
    style_sheet: &StyleSheet,
    opt: &Options,
) -> Result<Report, Error> {
    let policy = opt.policy();
    let mut cascade = Cascade::new(style_sheet);
    let mut report = Report::default();

    let mut candidates = Vec::new();
    if let Some(svg) = doc.root_element() {
        collect_candidates(svg, &mut cascade, &policy, &mut candidates)?;
    }

    remove_meta(doc, opt, &mut report);

    for id in candidates {
        let is_group = doc.get(id).has_svg_tag_name("g");
        if remove(doc, id, "", &mut report) {
            if is_group {
                report.removed_groups += 1;
            } else {
                report.removed_elements += 1;
            }
        }
    }

    if opt.remove_empty_groups {
        remove_empty_groups(doc, &mut cascade, &policy, &mut report)?;
    }

    report.push(format!("removed {} element(s) in total", report.total()));

    Ok(report)
}

/// Collects removable elements in post-order.
///
/// Nothing is modified here, so the collected elements are never ancestors of each other,
/// except for graphic elements inside an invisible text.
fn collect_candidates(
    parent: Node,
    cascade: &mut Cascade,
    policy: &Policy,
    candidates: &mut Vec<NodeId>,
) -> Result<(), Error> {
    for node in parent.children() {
        let kind = match ElementKind::of(node) {
            Some(ElementKind::Protected) | None => continue,
            Some(kind) => kind,
        };

        collect_candidates(node, cascade, policy, candidates)?;

        if is_candidate(node, kind, cascade, policy)? {
            candidates.push(node.id());
        }
    }

    Ok(())
}

fn is_candidate(
    node: Node,
    kind: ElementKind,
    cascade: &mut Cascade,
    policy: &Policy,
) -> Result<bool, Error> {
    match kind {
        ElementKind::Group => {
            Ok(is_empty_group(node) && visibility::is_invisible(cascade, node, policy)?)
        }
        ElementKind::Text => {
            if !visibility::is_invisible(cascade, node, policy)? {
                return Ok(false);
            }

            if has_visible_text_run(node, cascade)? {
                return Ok(false);
            }

            Ok(!has_marker_reference(cascade, node))
        }
        ElementKind::Graphic => {
            Ok(visibility::is_invisible(cascade, node, policy)?
                && !has_marker_reference(cascade, node))
        }
        ElementKind::Svg | ElementKind::Protected | ElementKind::Other => Ok(false),
    }
}

/// A group is empty when it has nothing but text inside.
///
/// Comments keep a group alive.
fn is_empty_group(g: Node) -> bool {
    g.children().all(|n| n.is_text())
}

fn has_visible_text_run(text: Node, cascade: &mut Cascade) -> Result<bool, Error> {
    for node in text.descendants().skip(1) {
        let is_run = node.has_tag_name("tspan") || node.has_tag_name("textPath");
        if is_run && visibility::has_paint(cascade, node)? {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Removes `desc` and `title` elements, when requested.
///
/// Unlike other elements, they are removed from protected containers too.
fn remove_meta(doc: &mut Document, opt: &Options, report: &mut Report) {
    if !opt.remove_desc && !opt.remove_title {
        return;
    }

    let ids: Vec<_> = match doc.root_element() {
        Some(svg) => svg
            .descendants()
            .skip(1)
            .filter(|n| {
                (opt.remove_desc && n.has_svg_tag_name("desc"))
                    || (opt.remove_title && n.has_svg_tag_name("title"))
            })
            .map(|n| n.id())
            .collect(),
        None => return,
    };

    for id in ids {
        if doc.detach(id) {
            report.removed_meta += 1;
        }
    }

    if report.removed_meta != 0 {
        report.push(format!(
            "removed {} meta element(s) (desc/title)",
            report.removed_meta
        ));
    }
}

/// Removes empty invisible groups until there is nothing left to remove.
fn remove_empty_groups(
    doc: &mut Document,
    cascade: &mut Cascade,
    policy: &Policy,
    report: &mut Report,
) -> Result<(), Error> {
    let mut groups = Vec::with_capacity(16);

    loop {
        if let Some(svg) = doc.root_element() {
            collect_empty_groups(svg, cascade, policy, &mut groups)?;
        }

        let mut changed = false;
        for id in groups.drain(..) {
            if remove(doc, id, "empty ", report) {
                report.removed_groups += 1;
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }

    Ok(())
}

fn collect_empty_groups(
    parent: Node,
    cascade: &mut Cascade,
    policy: &Policy,
    groups: &mut Vec<NodeId>,
) -> Result<(), Error> {
    for node in parent.children() {
        match ElementKind::of(node) {
            Some(ElementKind::Group) => {
                if is_empty_group(node) {
                    if visibility::is_invisible(cascade, node, policy)? {
                        groups.push(node.id());
                    }

                    continue;
                }
            }
            Some(ElementKind::Protected) | None => continue,
            Some(_) => {}
        }

        collect_empty_groups(node, cascade, policy, groups)?;
    }

    Ok(())
}

/// Detaches a node and logs it.
///
/// Returns `false` when the node was already detached.
fn remove(doc: &mut Document, id: NodeId, prefix: &str, report: &mut Report) -> bool {
    let node = doc.get(id);
    let msg = format!(
        "removed {}{} id={}",
        prefix,
        node.tag_name().unwrap_or_default(),
        node.attribute("id").unwrap_or("(none)")
    );

    if !doc.detach(id) {
        return false;
    }

    report.push(msg);
    true
}
