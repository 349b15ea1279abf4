// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use svgprune_tree::Node;

use crate::cascade::class_names;
use crate::Cascade;

/// Checks that a node declares a marker reference.
///
/// Only the node itself is checked: its attributes, its `style` attribute
/// and all of its classes. The value is not parsed, any `url(` is enough.
pub fn has_marker_reference(cascade: &mut Cascade, node: Node) -> bool {
    if node
        .attributes()
        .iter()
        .any(|a| is_marker_reference(&a.name, &a.value))
    {
        return true;
    }

    if cascade
        .inline_style(node)
        .iter()
        .any(|(name, value)| is_marker_reference(name, value))
    {
        return true;
    }

    let style_sheet = cascade.style_sheet();
    class_names(node)
        .filter_map(|class| style_sheet.class(class))
        .any(|props| props.iter().any(|(name, value)| is_marker_reference(name, value)))
}

/// `marker` is a shorthand for all three `marker-*` properties.
fn is_marker_reference(name: &str, value: &str) -> bool {
    (name == "marker" || name.starts_with("marker-")) && value.contains("url(")
}
