use tracing::{debug, trace, warn};

use crate::{
    config::Config,
    error::{Error, Result},
    shapes::{Rect, Shape},
    util::{determine_quadrant, nearest_quadrant},
    Positioned, P2,
};

/// A region QuadTree over objects that report a 2d position.
///
/// Every stored object lives in exactly one leaf, the one whose bounds contain its
/// position. Positions on an edge shared by several quadrants belong to the first of
/// them in top-left, top-right, bottom-left, bottom-right order.
///
/// Callers must keep the tree in step with their objects: after an object moves,
/// call [`QuadTree::update`] once, with [`Positioned::previous_position`] reporting
/// the position the tree last saw.
#[derive(Debug)]
pub struct QuadTree<T> {
    root: Node<T>,
    config: Config,
}

impl<T: Positioned + Clone> QuadTree<T> {
    /// Create a new empty quadtree
    ///
    /// ## Arguments
    /// - `boundary`: The boundary of the quadtree
    /// - `config`: Divide and collapse thresholds shared by all nodes
    pub fn new(boundary: Rect, config: Config) -> Result<Self> {
        config.validate()?;
        let (width, height) = (boundary.width(), boundary.height());
        if !(width.is_finite() && height.is_finite() && width > 0. && height > 0.) {
            return Err(Error::InvalidBoundary { width, height });
        }

        Ok(Self {
            root: Node::leaf(boundary, config.root_depth),
            config,
        })
    }

    /// Insert an object into the quadtree
    ///
    /// **Returns** [`Error::OutOfBounds`] if the object's position lies outside the
    /// tree, in which case nothing is stored
    pub fn insert(&mut self, item: &T) -> Result<()> {
        let point = item.position();
        if !self.root.boundary().contains(&point) || !self.root.insert(item.clone(), &self.config) {
            debug!(x = point.x, y = point.y, "rejected out of bounds insert");
            return Err(Error::out_of_bounds(&point));
        }
        Ok(())
    }

    /// Remove an object from the quadtree, looking it up by key at its current position
    ///
    /// **Returns** the stored handle, or `None` if no such object was found
    pub fn remove(&mut self, item: &T) -> Option<T> {
        self.remove_at(&item.key(), &item.position())
    }

    /// Relocate an object whose position changed since it was last inserted or updated.
    ///
    /// The object is searched for under [`Positioned::previous_position`]. If its new
    /// position falls in a different cell it is moved there, otherwise the stored
    /// handle is refreshed in place.
    ///
    /// **Returns**
    /// - [`Error::OutOfBounds`] if the new position left the tree. The object is
    ///   evicted.
    /// - [`Error::NotFound`] if nothing with the object's key is stored under its
    ///   previous position, whether or not the new position is inside the tree. The
    ///   tree is left unchanged.
    pub fn update(&mut self, item: &T) -> Result<()> {
        let key = item.key();
        let previous = item.previous_position();
        let current = item.position();

        if !self.root.boundary().contains(&current) {
            if self.remove_at(&key, &previous).is_none() {
                return Err(Error::NotFound);
            }
            debug!(x = current.x, y = current.y, "evicted object moved out of bounds");
            return Err(Error::out_of_bounds(&current));
        }

        self.root
            .update(item, &key, &previous, &current, &self.config)?;
        self.collapse_root();
        Ok(())
    }

    /// Queries the QuadTree for items within a specified shape area.
    /// This method populates a passed mutable vector with all found items.
    pub fn query<'a, S: Shape>(&'a self, shape: &S, results: &mut Vec<&'a T>) {
        self.root.query(shape, results)
    }

    /// Number of objects stored in the tree
    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the root still holds its objects directly
    pub fn is_leaf(&self) -> bool {
        matches!(self.root, Node::Leaf { .. })
    }

    /// Depth of the root node
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Return the point at the center of the boundary
    pub fn center(&self) -> P2 {
        self.root.boundary().center()
    }

    /// Get the boundary rect of the quadtree
    pub fn boundary(&self) -> &Rect {
        self.root.boundary()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn remove_at(&mut self, key: &T::Key, point: &P2) -> Option<T> {
        if !self.root.boundary().contains(point) {
            return None;
        }
        let removed = self.root.remove(key, point, &self.config)?;
        self.collapse_root();
        Some(removed)
    }

    /// The tree is the root's parent, so it decides when the root merges
    fn collapse_root(&mut self) {
        if !self.root.is_leaf() && self.root.len() < self.config.min {
            self.root.collapse();
        }
    }
}

/// QuadTree node enum
///
/// ## Variants
/// - `Internal`: Contains four children partitioning its boundary, plus the number of
///   objects held anywhere below it.
/// - `Leaf`: Holds objects directly.
#[derive(Debug)]
enum Node<T> {
    Internal {
        boundary: Rect,
        depth: usize,
        len: usize,
        children: [Box<Self>; 4],
    },
    Leaf {
        boundary: Rect,
        depth: usize,
        items: Vec<T>,
    },
}

impl<T: Positioned + Clone> Node<T> {
    fn leaf(boundary: Rect, depth: usize) -> Self {
        Self::Leaf {
            boundary,
            depth,
            items: Vec::new(),
        }
    }

    /// Store an item somewhere below this node. The caller has checked that this node's
    /// boundary contains the item's position.
    ///
    /// Returns false if no quadrant would take the item
    fn insert(&mut self, item: T, config: &Config) -> bool {
        match self {
            Self::Leaf { depth, items, .. } => {
                items.push(item);
                if items.len() <= config.max {
                    return true;
                }
                if *depth >= config.max_depth {
                    trace!(depth = *depth, len = items.len(), "leaf saturated at depth ceiling");
                    return true;
                }
            }
            Self::Internal {
                boundary,
                len,
                children,
                ..
            } => {
                return match determine_quadrant(boundary, &item.position()) {
                    Some(q) => {
                        let inserted = children[q].insert(item, config);
                        if inserted {
                            *len += 1;
                        }
                        inserted
                    }
                    None => false,
                };
            }
        }

        self.divide(config);
        true
    }

    /// Turn a leaf into an internal node and hand its items down to fresh children
    fn divide(&mut self, config: &Config) {
        let Self::Leaf {
            boundary,
            depth,
            items,
        } = self
        else {
            return;
        };
        let (boundary, depth) = (*boundary, *depth);
        let items = std::mem::take(items);
        debug!(depth, len = items.len(), "dividing node");

        let mut children = boundary.quarter().map(|r| Box::new(Self::leaf(r, depth + 1)));
        let len = items.len();
        for item in items {
            let point = item.position();
            let q = determine_quadrant(&boundary, &point).unwrap_or_else(|| {
                warn!(
                    x = point.x,
                    y = point.y,
                    depth,
                    "item outside its leaf during divide, routing to nearest quadrant"
                );
                nearest_quadrant(&boundary, &point)
            });
            children[q].push_unchecked(item, config);
        }

        *self = Self::Internal {
            boundary,
            depth,
            len,
            children,
        };
    }

    /// Like `insert`, but an item outside every quadrant still goes to the nearest one
    fn push_unchecked(&mut self, item: T, config: &Config) {
        match self {
            Self::Leaf { .. } => {
                self.insert(item, config);
            }
            Self::Internal {
                boundary,
                len,
                children,
                ..
            } => {
                let q = nearest_quadrant(boundary, &item.position());
                children[q].push_unchecked(item, config);
                *len += 1;
            }
        }
    }

    fn query<'a, S: Shape>(&'a self, shape: &S, results: &mut Vec<&'a T>) {
        match self {
            Self::Leaf {
                boundary, items, ..
            } => {
                if shape.contains_rect(boundary) {
                    results.extend(items.iter());
                } else {
                    results.extend(items.iter().filter(|item| shape.contains(&item.position())));
                }
            }
            Self::Internal { children, .. } => {
                for c in children {
                    if shape.intersects_rect(c.boundary()) {
                        c.query(shape, results);
                    }
                }
            }
        }
    }

    /// Remove the item with `key` from the leaf containing `point`. A child whose
    /// subtree falls below `config.min` is collapsed on the way back up.
    fn remove(&mut self, key: &T::Key, point: &P2, config: &Config) -> Option<T> {
        match self {
            Self::Leaf { items, .. } => {
                let idx = items.iter().position(|item| item.key() == *key)?;
                Some(items.remove(idx))
            }
            Self::Internal {
                boundary,
                len,
                children,
                ..
            } => {
                let q = determine_quadrant(boundary, point)?;
                let removed = children[q].remove(key, point, config)?;
                *len -= 1;
                children[q].collapse_below(config.min);
                Some(removed)
            }
        }
    }

    fn update(
        &mut self,
        item: &T,
        key: &T::Key,
        previous: &P2,
        current: &P2,
        config: &Config,
    ) -> Result<()> {
        match self {
            Self::Leaf { items, .. } => {
                let slot = items
                    .iter_mut()
                    .find(|stored| stored.key() == *key)
                    .ok_or(Error::NotFound)?;
                *slot = item.clone();
                Ok(())
            }
            Self::Internal {
                boundary, children, ..
            } => {
                let from = determine_quadrant(boundary, previous).ok_or(Error::NotFound)?;
                let to = determine_quadrant(boundary, current)
                    .ok_or_else(|| Error::out_of_bounds(current))?;

                if from == to {
                    return children[from].update(item, key, previous, current, config);
                }

                children[from]
                    .remove(key, previous, config)
                    .ok_or(Error::NotFound)?;
                children[from].collapse_below(config.min);
                let inserted = children[to].insert(item.clone(), config);
                debug_assert!(inserted, "quarters cover every point of their parent");
                Ok(())
            }
        }
    }

    /// Collapse this node if it is internal and holds fewer than `min` items
    fn collapse_below(&mut self, min: usize) {
        if !self.is_leaf() && self.len() < min {
            self.collapse();
        }
    }

    /// Turn an internal node back into a leaf holding every item of its subtree
    fn collapse(&mut self) {
        let Self::Internal {
            boundary,
            depth,
            len,
            ..
        } = *self
        else {
            return;
        };

        let mut items = Vec::with_capacity(len);
        self.drain_into(&mut items);
        debug!(depth, len, "collapsing node");

        *self = Self::Leaf {
            boundary,
            depth,
            items,
        };
    }

    fn drain_into(&mut self, out: &mut Vec<T>) {
        match self {
            Self::Leaf { items, .. } => out.append(items),
            Self::Internal { children, .. } => {
                for c in children {
                    c.drain_into(out);
                }
            }
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Leaf { items, .. } => items.len(),
            Self::Internal { len, .. } => *len,
        }
    }

    fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    fn depth(&self) -> usize {
        match self {
            Self::Leaf { depth, .. } | Self::Internal { depth, .. } => *depth,
        }
    }

    fn boundary(&self) -> &Rect {
        match self {
            Self::Leaf { boundary, .. } | Self::Internal { boundary, .. } => boundary,
        }
    }
}
