// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;

use svgprune_tree::Node;

use crate::{Cascade, Error};

/// Visibility rules configuration.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Policy {
    /// Treats a node with both `fill-opacity` and `stroke-opacity` equal to zero as invisible.
    pub zero_opacity_is_invisible: bool,
    /// Treats a node with `display:none` as invisible.
    pub display_none_is_invisible: bool,
}

/// Checks that a paint value doesn't paint anything.
///
/// Absent, empty and `none` values are empty.
pub fn is_empty_paint(value: Option<&str>) -> bool {
    match value {
        Some(v) => {
            let v = v.trim();
            v.is_empty() || v.eq_ignore_ascii_case("none")
        }
        None => true,
    }
}

/// Checks that an opacity value is a number equal to zero.
///
/// Anything that is not a number, like `0%`, is not zero.
fn is_zero_opacity(value: Option<&str>) -> bool {
    value
        .and_then(|v| svgtypes::Number::from_str(v.trim()).ok())
        .map(|n| n.0 == 0.0)
        .unwrap_or(false)
}

/// Checks that a node doesn't produce any paint.
///
/// The rules are checked in order:
///
/// 1. `display:none`, when enabled by the policy
/// 2. both `fill` and `stroke` are empty
/// 3. both `fill-opacity` and `stroke-opacity` are zero, when enabled by the policy
pub fn is_invisible(cascade: &mut Cascade, node: Node, policy: &Policy) -> Result<bool, Error> {
    if policy.display_none_is_invisible {
        if let Some(display) = cascade.resolve(node, "display")? {
            if display.trim().eq_ignore_ascii_case("none") {
                return Ok(true);
            }
        }
    }

    let fill = cascade.resolve(node, "fill")?;
    let stroke = cascade.resolve(node, "stroke")?;
    if is_empty_paint(fill.as_deref()) && is_empty_paint(stroke.as_deref()) {
        return Ok(true);
    }

    if policy.zero_opacity_is_invisible {
        let fill_opacity = cascade.resolve(node, "fill-opacity")?;
        let stroke_opacity = cascade.resolve(node, "stroke-opacity")?;
        if is_zero_opacity(fill_opacity.as_deref()) && is_zero_opacity(stroke_opacity.as_deref()) {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Checks that a node has a paint on its own or inherits one.
///
/// Used for text runs, where only `fill` and `stroke` matter.
pub fn has_paint(cascade: &mut Cascade, node: Node) -> Result<bool, Error> {
    let fill = cascade.resolve(node, "fill")?;
    if !is_empty_paint(fill.as_deref()) {
        return Ok(true);
    }

    let stroke = cascade.resolve(node, "stroke")?;
    Ok(!is_empty_paint(stroke.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StyleSheet;
    use svgprune_tree::Document;

    const OPACITY: Policy = Policy {
        zero_opacity_is_invisible: true,
        display_none_is_invisible: false,
    };

    const DISPLAY: Policy = Policy {
        zero_opacity_is_invisible: false,
        display_none_is_invisible: true,
    };

    macro_rules! test {
        ($name:ident, $attrs:expr, $policy:expr, $result:expr) => {
            #[test]
            fn $name() {
                let text = format!(
                    "<svg xmlns='http://www.w3.org/2000/svg'><path id='p1' {}/></svg>",
                    $attrs
                );
                let doc = Document::parse_str(&text).unwrap();
                let sheet = StyleSheet::from_blocks([".n { fill: none } .r { stroke: red }"]);
                let mut cascade = Cascade::new(&sheet);
                let node = doc.element_by_id("p1").unwrap();
                assert_eq!(is_invisible(&mut cascade, node, &$policy).unwrap(), $result);
            }
        };
    }

    test!(no_paint, "", Policy::default(), true);
    test!(fill_none, "fill='none'", Policy::default(), true);
    test!(fill_none_uppercase, "fill=' NONE '", Policy::default(), true);
    test!(fill_empty, "style='fill:'", Policy::default(), true);
    test!(fill_red, "fill='red'", Policy::default(), false);
    test!(stroke_only, "fill='none' stroke='#000'", Policy::default(), false);
    test!(class_none, "class='n'", Policy::default(), true);
    test!(class_stroke, "class='n r'", Policy::default(), false);
    test!(inline_overrides_class, "class='r' style='stroke:none'", Policy::default(), true);

    test!(zero_opacity_off, "fill='red' fill-opacity='0'", Policy::default(), false);
    test!(zero_opacity_on, "fill='red' fill-opacity='0' stroke-opacity='0.0'", OPACITY, true);
    test!(zero_opacity_no_stroke, "fill='red' fill-opacity='0'", OPACITY, false);
    test!(zero_opacity_no_stroke_explicit, "fill='red' fill-opacity='0' stroke='none'", OPACITY, false);
    test!(zero_opacity_visible_stroke, "fill='red' fill-opacity='0' stroke='blue'", OPACITY, false);
    test!(zero_opacity_stroke_only, "fill='none' stroke='red' stroke-opacity='0'", OPACITY, false);
    test!(zero_opacity_opaque_stroke, "fill='red' fill-opacity='0' stroke='none' stroke-opacity='1'", OPACITY, false);
    test!(zero_opacity_no_paint_channel, "fill='red' fill-opacity='0' stroke='none' stroke-opacity='0'", OPACITY, true);
    test!(zero_opacity_fill_only, "fill='red' stroke-opacity='0' stroke='blue'", OPACITY, false);
    test!(zero_opacity_percent, "fill='red' fill-opacity='0%' stroke-opacity='0'", OPACITY, false);
    test!(zero_opacity_garbage, "fill='red' fill-opacity='abc' stroke-opacity='0'", OPACITY, false);
    test!(zero_opacity_exp, "fill='red' style='fill-opacity: 0e3; stroke-opacity: -0'", OPACITY, true);

    test!(display_none_off, "fill='red' display='none'", Policy::default(), false);
    test!(display_none_on, "fill='red' style='display: None'", DISPLAY, true);
    test!(display_inline, "fill='red' display='inline'", DISPLAY, false);

    #[test]
    fn inherited_display() {
        let doc = Document::parse_str(
            "<svg xmlns='http://www.w3.org/2000/svg'>\
                <g display='none'><rect id='r1' fill='red'/></g>\
            </svg>",
        )
        .unwrap();
        let sheet = StyleSheet::new();
        let mut cascade = Cascade::new(&sheet);
        let node = doc.element_by_id("r1").unwrap();
        assert!(is_invisible(&mut cascade, node, &DISPLAY).unwrap());
        assert!(!is_invisible(&mut cascade, node, &Policy::default()).unwrap());
    }

    #[test]
    fn paint() {
        let doc = Document::parse_str(
            "<svg xmlns='http://www.w3.org/2000/svg'>\
                <text fill='none'><tspan id='t1'>a</tspan><tspan id='t2' stroke='blue'>b</tspan></text>\
            </svg>",
        )
        .unwrap();
        let sheet = StyleSheet::new();
        let mut cascade = Cascade::new(&sheet);
        assert!(!has_paint(&mut cascade, doc.element_by_id("t1").unwrap()).unwrap());
        assert!(has_paint(&mut cascade, doc.element_by_id("t2").unwrap()).unwrap());
    }
}
