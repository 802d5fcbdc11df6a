mod collision;
mod quadtree;
mod rect;
mod worker;
mod wrap;

pub use collision::{FrameResult, resolve_labels};
pub use quadtree::QuadTree;
pub use rect::{LabelDebug, LabelRect, build_label_rects};
pub use worker::{FrameRequest, LabelWorker};
pub use wrap::wrap_title;

use serde::{Deserialize, Serialize};

/// Axis-aligned box in graph space, shared by the rect builder and the
/// quadtree.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Closed-interval AABB overlap: touching edges count as
    /// overlapping. Membership and collision tests share this
    /// convention so quadtree pruning never misses a reported hit.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.x + self.width < other.x
            || self.x > other.x + other.width
            || self.y + self.height < other.y
            || self.y > other.y + other.height)
    }

    /// Grow this rect in place to cover `other`.
    pub fn union_with(&mut self, other: &Rect) {
        let max_x = (self.x + self.width).max(other.x + other.width);
        let max_y = (self.y + self.height).max(other.y + other.height);
        self.x = self.x.min(other.x);
        self.y = self.y.min(other.y);
        self.width = max_x - self.x;
        self.height = max_y - self.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn separated_rects_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.1, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn union_covers_both() {
        let mut a = Rect::new(0.0, 0.0, 5.0, 5.0);
        a.union_with(&Rect::new(10.0, -2.0, 4.0, 4.0));
        assert_eq!(a.x, 0.0);
        assert_eq!(a.y, -2.0);
        assert_eq!(a.width, 14.0);
        assert_eq!(a.height, 7.0);
    }
}
