use crate::physics::math::Vector;

/// Axis-aligned bounding box grown point by point.
///
/// Starts out empty (min above max) so the first extended point becomes both
/// corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3d {
    pub min: Vector,
    pub max: Vector,
}

impl Aabb3d {
    pub const EMPTY: Self = Self {
        min: Vector::splat(f64::MAX),
        max: Vector::splat(f64::MIN),
    };

    pub fn new(min: Vector, max: Vector) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vector>) -> Self {
        points.into_iter().fold(Self::EMPTY, |mut aabb, point| {
            aabb.extend(point);
            aabb
        })
    }

    #[inline]
    pub fn extend(&mut self, point: Vector) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn union(self, other: Self) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    #[inline]
    pub fn center(&self) -> Vector {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vector {
        self.max - self.min
    }

    pub fn contains(&self, point: Vector) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

impl Default for Aabb3d {
    fn default() -> Self {
        Self::EMPTY
    }
}
