//! Axis-aligned bounding box used for character collision volumes.

use glam::Vec2;

/// A 2D axis-aligned box in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    /// Box centered on `center` extending `half_extents` in each direction.
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn bottom_left(&self) -> Vec2 {
        self.min
    }

    pub fn bottom_right(&self) -> Vec2 {
        Vec2::new(self.max.x, self.min.y)
    }

    pub fn top_left(&self) -> Vec2 {
        Vec2::new(self.min.x, self.max.y)
    }

    pub fn top_right(&self) -> Vec2 {
        self.max
    }

    /// Grow (positive) or shrink (negative) the box by `amount` in total size.
    ///
    /// Each side moves by half of `amount`. Shrinking never inverts the box;
    /// it collapses to its center instead.
    pub fn expand(&self, amount: f32) -> Self {
        let half = Vec2::splat(amount * 0.5);
        let center = self.center();
        let min = (self.min - half).min(center);
        let max = (self.max + half).max(center);
        Self { min, max }
    }

    /// Move the box by `delta`.
    pub fn translate(&self, delta: Vec2) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Overlap test; boxes that only share an edge count as touching.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_center_corners() {
        let b = Aabb::from_center(Vec2::new(1.0, 2.0), Vec2::new(0.5, 1.0));
        assert_eq!(b.bottom_left(), Vec2::new(0.5, 1.0));
        assert_eq!(b.top_right(), Vec2::new(1.5, 3.0));
        assert_eq!(b.bottom_right(), Vec2::new(1.5, 1.0));
        assert_eq!(b.top_left(), Vec2::new(0.5, 3.0));
    }

    #[test]
    fn expand_negative_shrinks_each_side_by_half() {
        let b = Aabb::from_center(Vec2::ZERO, Vec2::ONE).expand(-0.5);
        assert!((b.min.x + 0.75).abs() < 1e-6);
        assert!((b.max.y - 0.75).abs() < 1e-6);
        assert_eq!(b.center(), Vec2::ZERO);
    }

    #[test]
    fn expand_never_inverts() {
        let b = Aabb::from_center(Vec2::ZERO, Vec2::splat(0.1)).expand(-10.0);
        assert!(b.width() >= 0.0);
        assert!(b.height() >= 0.0);
    }

    #[test]
    fn intersects_overlap_and_edges() {
        let a = Aabb::from_center(Vec2::ZERO, Vec2::splat(0.5));
        assert!(a.intersects(&a.translate(Vec2::new(0.7, -0.3))));
        assert!(a.intersects(&a.translate(Vec2::new(1.0, 0.0))));
        assert!(!a.intersects(&a.translate(Vec2::new(1.01, 0.0))));
        assert!(!a.intersects(&a.translate(Vec2::new(0.0, -2.0))));
    }
}
