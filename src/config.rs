use crate::error::{Error, Result};

/// Depth ceiling used by [`Config::new`]. Leaves at this depth never divide.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Capacity policy shared by every node of a [`QuadTree`](crate::QuadTree).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Depth assigned to the root node
    pub root_depth: usize,
    /// A subtree holding fewer objects than this is collapsed by its parent
    pub min: usize,
    /// A leaf holding more objects than this divides
    pub max: usize,
    /// Leaves at this depth accept objects past `max` instead of dividing
    pub max_depth: usize,
}

impl Config {
    /// Create a config for a root at depth 0 with the default depth ceiling
    ///
    /// ## Arguments
    /// - `min`: The collapse floor
    /// - `max`: The divide ceiling, at least 1
    pub fn new(min: usize, max: usize) -> Self {
        Self {
            root_depth: 0,
            min,
            max,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_root_depth(mut self, root_depth: usize) -> Self {
        self.root_depth = root_depth;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Check the thresholds are usable together
    pub fn validate(&self) -> Result<()> {
        if self.max == 0 {
            return Err(Error::ZeroCapacity);
        }
        if self.min > self.max {
            return Err(Error::ThresholdOrder {
                min: self.min,
                max: self.max,
            });
        }
        if self.root_depth > self.max_depth {
            return Err(Error::DepthOrder {
                root_depth: self.root_depth,
                max_depth: self.max_depth,
            });
        }
        Ok(())
    }
}
