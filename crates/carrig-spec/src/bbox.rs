//! Axis-aligned bounding boxes measured around rig anchor nodes.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::naming::Side;

/// Axis-aligned extents of an anchor node and its attached geometry.
///
/// `center` is the anchor node's head, not the middle of the extents; use
/// [`BoundingBox::box_center`] for the geometric midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
    /// Head of the anchor node.
    pub center: DVec3,
}

impl BoundingBox {
    /// Creates a box from explicit extents.
    pub fn new(min: [f64; 3], max: [f64; 3], center: DVec3) -> Self {
        Self {
            min_x: min[0],
            max_x: max[0],
            min_y: min[1],
            max_y: max[1],
            min_z: min[2],
            max_z: max[2],
            center,
        }
    }

    /// Computes the extents of a set of world-space points.
    ///
    /// Returns `None` when `points` is empty.
    pub fn from_points<I>(points: I, center: DVec3) -> Option<Self>
    where
        I: IntoIterator<Item = DVec3>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self::new(min.to_array(), max.to_array(), center))
    }

    /// Synthetic box for an anchor without attached geometry: half the
    /// segment length on each side in X, the full length on each side in Y,
    /// and from the ground up to twice the head height in Z.
    pub fn from_segment(head: DVec3, length: f64) -> Self {
        Self::new(
            [head.x - length / 2.0, head.y - length, 0.0],
            [head.x + length / 2.0, head.y + length, head.z * 2.0],
            head,
        )
    }

    /// Extent along X.
    pub fn width(&self) -> f64 {
        (self.min_x - self.max_x).abs()
    }

    /// Extent along Y.
    pub fn length(&self) -> f64 {
        (self.min_y - self.max_y).abs()
    }

    /// Extent along Z.
    pub fn height(&self) -> f64 {
        (self.min_z - self.max_z).abs()
    }

    /// Midpoint of the extents.
    pub fn box_center(&self) -> DVec3 {
        DVec3::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
            (self.min_z + self.max_z) / 2.0,
        )
    }

    /// Outermost X on the given side, pushed outward by `delta`.
    pub fn outer_x(&self, side: Side, delta: f64) -> f64 {
        match side {
            Side::Left => self.max_x + delta,
            Side::Right => self.min_x - delta,
        }
    }

    /// Minimum corner.
    pub fn min(&self) -> DVec3 {
        DVec3::new(self.min_x, self.min_y, self.min_z)
    }

    /// Maximum corner.
    pub fn max(&self) -> DVec3 {
        DVec3::new(self.max_x, self.max_y, self.max_z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_points() {
        let bb = BoundingBox::from_points(
            [
                DVec3::new(-1.0, -2.0, 0.0),
                DVec3::new(1.0, 2.0, 1.0),
                DVec3::new(0.5, 0.0, 0.2),
            ],
            DVec3::ZERO,
        )
        .unwrap();
        assert_eq!(bb.width(), 2.0);
        assert_eq!(bb.length(), 4.0);
        assert_eq!(bb.height(), 1.0);
        assert_eq!(bb.box_center(), DVec3::new(0.0, 0.0, 0.5));
    }

    #[test]
    fn test_from_points_empty() {
        assert!(BoundingBox::from_points(Vec::new(), DVec3::ZERO).is_none());
    }

    #[test]
    fn test_segment_fallback() {
        let bb = BoundingBox::from_segment(DVec3::new(1.0, -2.0, 0.5), 0.5);
        assert_eq!(bb.min_x, 0.75);
        assert_eq!(bb.max_x, 1.25);
        assert_eq!(bb.min_y, -2.5);
        assert_eq!(bb.max_y, -1.5);
        assert_eq!(bb.min_z, 0.0);
        assert_eq!(bb.max_z, 1.0);
        assert_eq!(bb.center, DVec3::new(1.0, -2.0, 0.5));
    }

    #[test]
    fn test_outer_x_is_biased_by_side() {
        let bb = BoundingBox::new([-1.0, 0.0, 0.0], [1.0, 1.0, 1.0], DVec3::ZERO);
        assert_eq!(bb.outer_x(Side::Left, 0.1), 1.1);
        assert_eq!(bb.outer_x(Side::Right, 0.1), -1.1);
    }
}
