// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
`svgprune` removes SVG elements that do not paint anything.

An element is invisible when both its effective `fill` and `stroke` are absent or `none`.
Optionally, a zero opacity or `display:none` can be treated as invisible as well.

Effective values are resolved the same way for every property:

1. a declaration inside the `style` attribute
2. a presentation attribute
3. a rule for one of the element's classes
4. the parent element value

## Features

- Basic shapes, paths and text elements are removed
- Groups that became empty are removed, until nothing else can be removed
- Text elements with a visible `tspan` or `textPath` are kept
- Elements that reference markers are kept
- Definitions, gradients, patterns, markers, clip paths, symbols and metadata are never touched
- `desc` and `title` elements can be removed too

## Limitations

- Only simple class selectors, like `.cls`, are supported.
  Everything else is ignored
- There is no specificity. When a class is defined multiple times, the last value wins
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(missing_copy_implementations)]

mod cascade;
mod error;
mod markers;
mod options;
mod prune;
mod stylesheet;
mod visibility;

pub use cascade::{Cascade, Value};
pub use error::Error;
pub use markers::has_marker_reference;
pub use options::Options;
pub use prune::{prune, prune_with_style_sheet, Report};
pub use stylesheet::{PropertyMap, StyleSheet};
pub use visibility::{has_paint, is_empty_paint, is_invisible, Policy};

pub use svgprune_tree;

use svgprune_tree::{Document, WriteOptions};

/// Parses an SVG string, removes invisible elements and writes it back.
pub fn prune_str(
    text: &str,
    opt: &Options,
    write_opt: &WriteOptions,
) -> Result<(String, Report), Error> {
    let mut doc = Document::parse_str(text)?;
    let report = prune(&mut doc, opt)?;
    Ok((doc.to_string(write_opt), report))
}

/// Parses an SVG or SVGZ data, removes invisible elements and writes it back.
///
/// The output is never compressed.
pub fn prune_data(
    data: &[u8],
    opt: &Options,
    write_opt: &WriteOptions,
) -> Result<(String, Report), Error> {
    let mut doc = Document::from_data(data)?;
    let report = prune(&mut doc, opt)?;
    Ok((doc.to_string(write_opt), report))
}
