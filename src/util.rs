use crate::{
    shapes::{Rect, Shape},
    P2,
};

/// First quarter of `rect` that contains `point`, in top-left, top-right, bottom-left,
/// bottom-right order. Points on a shared edge go to the earliest quarter.
pub(crate) fn determine_quadrant(rect: &Rect, point: &P2) -> Option<usize> {
    rect.quarter().iter().position(|q| q.contains(point))
}

/// Quarter of `rect` nearest to `point`, even when `rect` does not contain it.
/// Agrees with [`determine_quadrant`] for contained points.
pub(crate) fn nearest_quadrant(rect: &Rect, point: &P2) -> usize {
    let center = rect.center();
    let left = point.x <= center.x;
    let top = point.y >= center.y;
    match (top, left) {
        (true, true) => 0,
        (true, false) => 1,
        (false, true) => 2,
        (false, false) => 3,
    }
}
