//! Axis-aligned rectangles in viewport coordinates

use glam::Vec2;

/// Axis-aligned bounding box of a laid-out element (px)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
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

    /// Rectangle with its top-left corner at `origin`
    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self::new(origin.x, origin.y, size.x, size.y)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// True when the element has not been laid out yet
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Grow by `pad` on every side
    pub fn expanded(&self, pad: f32) -> Self {
        Self::new(
            self.x - pad,
            self.y - pad,
            self.width + 2.0 * pad,
            self.height + 2.0 * pad,
        )
    }

    /// Strict overlap test; touching edges do not intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Overlap test against `other` grown by `pad`
    pub fn intersects_padded(&self, other: &Rect, pad: f32) -> bool {
        self.intersects(&other.expanded(pad))
    }

    /// True if `other` lies entirely inside this rectangle (edges inclusive)
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }
}

/// Visible area of the page (px)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Viewport shrunk by `margin` on every side
    pub fn inset(&self, margin: f32) -> Rect {
        Rect::new(
            margin,
            margin,
            (self.width - 2.0 * margin).max(0.0),
            (self.height - 2.0 * margin).max(0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersects_overlap() {
        let a = Rect::new(0.0, 0.0, 100.0, 50.0);
        let b = Rect::new(50.0, 25.0, 100.0, 50.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 100.0, 50.0);
        let b = Rect::new(100.0, 0.0, 100.0, 50.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_padding_turns_near_miss_into_hit() {
        let a = Rect::new(0.0, 0.0, 100.0, 50.0);
        let b = Rect::new(105.0, 0.0, 100.0, 50.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects_padded(&b, 10.0));
        // Exactly at the padded edge is still clear
        assert!(!a.intersects_padded(&b, 5.0));
    }

    #[test]
    fn test_contains_rect() {
        let outer = Viewport::new(800.0, 600.0).inset(20.0);
        assert!(outer.contains_rect(&Rect::new(20.0, 20.0, 150.0, 50.0)));
        assert!(outer.contains_rect(&Rect::new(630.0, 530.0, 150.0, 50.0)));
        assert!(!outer.contains_rect(&Rect::new(631.0, 530.0, 150.0, 50.0)));
    }

    #[test]
    fn test_empty_rect() {
        assert!(Rect::default().is_empty());
        assert!(!Rect::new(0.0, 0.0, 1.0, 1.0).is_empty());
    }
}
