//! Axis-aligned bounding boxes.

use glam::Vec3;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner of the bounding box.
    pub min: Vec3,
    /// Maximum corner of the bounding box.
    pub max: Vec3,
}

impl BoundingBox {
    /// Creates a new bounding box from min and max points.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Creates an empty (inverted) bounding box.
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    /// Creates a bounding box that contains all given points.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut bbox = Self::empty();
        for point in points {
            bbox = bbox.expand_to_include(point);
        }
        bbox
    }

    /// Returns the center of the bounding box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the size (full extents) of the bounding box.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns the largest of the three extents.
    pub fn max_dimension(&self) -> f32 {
        self.size().max_element()
    }

    /// Returns the union of two bounding boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Returns a new bounding box expanded to include the given point.
    pub fn expand_to_include(&self, point: Vec3) -> BoundingBox {
        BoundingBox {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// Returns true if the bounding box is valid (non-empty).
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// Union of many boxes, `None` when there is nothing valid to unite.
    pub fn union_all<'a>(boxes: impl IntoIterator<Item = &'a BoundingBox>) -> Option<Self> {
        let merged = boxes
            .into_iter()
            .filter(|b| b.is_valid())
            .fold(Self::empty(), |acc, b| acc.union(b));
        merged.is_valid().then_some(merged)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_center() {
        let bbox = BoundingBox::new(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(bbox.center(), Vec3::ZERO);
        assert_eq!(bbox.size(), Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(bbox.max_dimension(), 6.0);
    }

    #[test]
    fn test_empty_box_is_invalid() {
        assert!(!BoundingBox::empty().is_valid());
        assert!(BoundingBox::from_points([Vec3::ONE]).is_valid());
    }

    #[test]
    fn test_union_all() {
        let a = BoundingBox::new(Vec3::splat(-1.0), Vec3::ZERO);
        let b = BoundingBox::new(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        let u = BoundingBox::union_all([&a, &BoundingBox::empty(), &b]).unwrap();
        assert_eq!(u.min, Vec3::splat(-1.0));
        assert_eq!(u.max, Vec3::new(1.0, 2.0, 3.0));

        assert!(BoundingBox::union_all([]).is_none());
        assert!(BoundingBox::union_all([&BoundingBox::empty()]).is_none());
    }
}
