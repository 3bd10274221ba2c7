use thiserror::Error;

/// Errors surfaced by [`QuadTree`](crate::QuadTree) construction and mutation.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Error {
    #[error("position ({x}, {y}) lies outside the tree bounds")]
    OutOfBounds { x: f64, y: f64 },

    #[error("object is not stored under its previous position")]
    NotFound,

    #[error("divide threshold must be at least 1")]
    ZeroCapacity,

    #[error("collapse threshold {min} exceeds divide threshold {max}")]
    ThresholdOrder { min: usize, max: usize },

    #[error("root depth {root_depth} exceeds maximum depth {max_depth}")]
    DepthOrder { root_depth: usize, max_depth: usize },

    #[error("boundary width/height must be finite and positive (width: {width}, height: {height})")]
    InvalidBoundary { width: f64, height: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn out_of_bounds(point: &crate::P2) -> Self {
        Self::OutOfBounds {
            x: point.x,
            y: point.y,
        }
    }
}
