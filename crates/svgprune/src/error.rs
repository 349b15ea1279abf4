// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use svgprune_tree::NodeId;

/// List of all errors.
#[derive(Debug)]
pub enum Error {
    /// A node ancestors chain is longer than the document itself.
    ///
    /// Means that the tree has a parent loop and cannot be processed.
    BrokenTree(NodeId),

    /// Failed to load or parse an SVG data.
    Tree(svgprune_tree::Error),
}

impl From<svgprune_tree::Error> for Error {
    fn from(e: svgprune_tree::Error) -> Self {
        Error::Tree(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::BrokenTree(id) => {
                write!(f, "node #{} has a cyclic ancestors chain", id.get())
            }
            Error::Tree(ref e) => {
                write!(f, "{}", e)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::BrokenTree(_) => None,
            Error::Tree(ref e) => Some(e),
        }
    }
}
