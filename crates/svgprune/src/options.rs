// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::Policy;

/// Processing options.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Options {
    /// Removes groups that became empty after invisible elements removal.
    ///
    /// Groups that were empty and invisible from the start are removed regardless.
    ///
    /// Default: true
    pub remove_empty_groups: bool,

    /// Treats elements with both `fill-opacity` and `stroke-opacity`
    /// set to zero as invisible.
    ///
    /// Default: false
    pub zero_opacity_is_invisible: bool,

    /// Treats elements with `display:none` as invisible.
    ///
    /// The property is inherited, so children of a hidden group are invisible as well.
    ///
    /// Default: false
    pub display_none_is_invisible: bool,

    /// Removes all `desc` elements.
    ///
    /// Default: false
    pub remove_desc: bool,

    /// Removes all `title` elements.
    ///
    /// Default: false
    pub remove_title: bool,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            remove_empty_groups: true,
            zero_opacity_is_invisible: false,
            display_none_is_invisible: false,
            remove_desc: false,
            remove_title: false,
        }
    }
}

impl Options {
    /// Returns visibility rules enabled by these options.
    pub fn policy(&self) -> Policy {
        Policy {
            zero_opacity_is_invisible: self.zero_opacity_is_invisible,
            display_none_is_invisible: self.display_none_is_invisible,
        }
    }
}
