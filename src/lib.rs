//! A region quadtree over 2d point-located objects.
//!
//! Objects implement [`Positioned`] and are stored by handle in the leaf whose
//! bounds contain their position. Leaves divide once they hold more than
//! [`Config::max`] objects and are merged back by their parent once a subtree
//! holds fewer than [`Config::min`]. Moving objects are relocated with
//! [`QuadTree::update`] and found with any [`Shape`] through [`QuadTree::query`].

use std::rc::Rc;

use nalgebra::Point2;

mod config;
mod error;
mod quadtree;
mod shapes;
mod util;

pub use config::{Config, DEFAULT_MAX_DEPTH};
pub use error::{Error, Result};
pub use quadtree::QuadTree;
pub use shapes::{Circle, Rect, Shape};

/// 2d point type used for positions and shape geometry
pub type P2 = Point2<f64>;

/// Trait for objects stored in the [`QuadTree`]
///
/// The tree only keeps handles. Entries are located by [`Positioned::key`], never
/// by comparing the objects themselves.
pub trait Positioned {
    /// Identity of the object
    type Key: PartialEq;

    /// Get the identity key of the object
    fn key(&self) -> Self::Key;

    /// Get the current 2d position
    fn position(&self) -> P2;

    /// Get the position the object had when it was last inserted or updated.
    /// Only [`QuadTree::update`] reads it.
    fn previous_position(&self) -> P2 {
        self.position()
    }
}

impl<U: Positioned> Positioned for Rc<U> {
    type Key = *const U;

    fn key(&self) -> Self::Key {
        Rc::as_ptr(self)
    }

    fn position(&self) -> P2 {
        (**self).position()
    }

    fn previous_position(&self) -> P2 {
        (**self).previous_position()
    }
}
