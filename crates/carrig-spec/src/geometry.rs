//! Vehicle geometry: per-corner wheel groups and the derived positions used
//! by rig synthesis.
//!
//! A [`VehicleGeometry`] is built once from a snapshot of the deformation rig
//! and never mutated; every derived quantity is a pure function of the stored
//! boxes and segments.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::naming::{Axle, Corner, Side, WheelSuffix};

/// A head/tail pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub head: DVec3,
    pub tail: DVec3,
}

impl Segment {
    pub fn new(head: DVec3, tail: DVec3) -> Self {
        Self { head, tail }
    }

    pub fn length(&self) -> f64 {
        self.head.distance(self.tail)
    }
}

/// One detected wheel: its deform segment, measured box and optional brake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelDescriptor {
    pub suffix: WheelSuffix,
    /// Segment of the `DEF_Wheel` anchor.
    pub deform: Segment,
    pub bounds: BoundingBox,
    /// Segment of the `DEF_Brake` anchor, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brake: Option<Segment>,
}

impl WheelDescriptor {
    pub fn side(&self) -> Side {
        self.suffix.corner.side
    }

    /// Outermost X of this wheel's box, pushed outward by `delta`.
    pub fn outer_x(&self, delta: f64) -> f64 {
        self.bounds.outer_x(self.side(), delta)
    }
}

/// All wheels sharing one corner, indexed contiguously from 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelPositionGroup {
    corner: Corner,
    /// Reference point used when the group is empty.
    default: DVec3,
    wheels: Vec<WheelDescriptor>,
}

impl WheelPositionGroup {
    pub fn new(corner: Corner, default: DVec3) -> Self {
        Self {
            corner,
            default,
            wheels: Vec::new(),
        }
    }

    /// Appends the next wheel. Returns false (and drops the wheel) when its
    /// corner or index does not continue the sequence.
    pub fn push(&mut self, wheel: WheelDescriptor) -> bool {
        let expected = self.corner.suffix(self.wheels.len() as u32);
        if wheel.suffix != expected {
            return false;
        }
        self.wheels.push(wheel);
        true
    }

    pub fn corner(&self) -> Corner {
        self.corner
    }

    pub fn wheels(&self) -> &[WheelDescriptor] {
        &self.wheels
    }

    pub fn len(&self) -> usize {
        self.wheels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wheels.is_empty()
    }

    /// Name of a per-group node, keyed on index 0 (`Damper_FL_0`).
    pub fn name(&self, role: &str) -> String {
        self.corner.suffix(0).name(role)
    }

    /// Anchor head of the wheel with the smallest Y; first wins on ties.
    pub fn min_position(&self) -> DVec3 {
        self.wheels
            .iter()
            .map(|w| w.bounds.center)
            .reduce(|best, c| if c.y < best.y { c } else { best })
            .unwrap_or(self.default)
    }

    /// Anchor head of the wheel with the largest Y; first wins on ties.
    pub fn max_position(&self) -> DVec3 {
        self.wheels
            .iter()
            .map(|w| w.bounds.center)
            .reduce(|best, c| if c.y > best.y { c } else { best })
            .unwrap_or(self.default)
    }

    pub fn medium_position(&self) -> DVec3 {
        if self.is_empty() {
            return self.default;
        }
        (self.min_position() + self.max_position()) / 2.0
    }

    /// Outermost X across the group's wheels on its side, pushed by `delta`.
    pub fn outer_x(&self, delta: f64) -> Option<f64> {
        let xs = self.wheels.iter().map(|w| w.outer_x(0.0));
        let x = match self.corner.side {
            Side::Left => xs.reduce(f64::max)? + delta,
            Side::Right => xs.reduce(f64::min)? - delta,
        };
        Some(x)
    }

    pub fn outer_z(&self) -> Option<f64> {
        self.wheels.iter().map(|w| w.bounds.max_z).reduce(f64::max)
    }

    pub fn outer_front(&self) -> Option<f64> {
        self.wheels.iter().map(|w| w.bounds.min_y).reduce(f64::min)
    }

    pub fn outer_back(&self) -> Option<f64> {
        self.wheels.iter().map(|w| w.bounds.max_y).reduce(f64::max)
    }
}

/// Body box plus the four corner groups, in [`Corner::ALL`] order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleGeometry {
    body: BoundingBox,
    body_segment: Segment,
    groups: [WheelPositionGroup; 4],
}

impl VehicleGeometry {
    /// Creates empty corner groups whose defaults are the body head (front)
    /// or body tail (back).
    pub fn empty_groups(body_segment: Segment) -> [WheelPositionGroup; 4] {
        Corner::ALL.map(|corner| {
            let default = match corner.axle {
                Axle::Front => body_segment.head,
                Axle::Back => body_segment.tail,
            };
            WheelPositionGroup::new(corner, default)
        })
    }

    /// Assembles a geometry snapshot. Groups are reordered by corner.
    pub fn new(body: BoundingBox, body_segment: Segment, groups: [WheelPositionGroup; 4]) -> Self {
        let mut ordered = Self::empty_groups(body_segment);
        for group in groups {
            let slot = group.corner.ordinal();
            ordered[slot] = group;
        }
        Self {
            body,
            body_segment,
            groups: ordered,
        }
    }

    pub fn body(&self) -> &BoundingBox {
        &self.body
    }

    pub fn body_segment(&self) -> Segment {
        self.body_segment
    }

    pub fn group(&self, corner: Corner) -> &WheelPositionGroup {
        &self.groups[corner.ordinal()]
    }

    pub fn groups(&self) -> &[WheelPositionGroup; 4] {
        &self.groups
    }

    /// Non-empty groups in corner order.
    pub fn occupied_groups(&self) -> impl Iterator<Item = &WheelPositionGroup> {
        self.groups.iter().filter(|g| !g.is_empty())
    }

    /// Every wheel, group by group.
    pub fn wheels(&self) -> impl Iterator<Item = &WheelDescriptor> {
        self.groups.iter().flat_map(|g| g.wheels.iter())
    }

    pub fn wheel(&self, suffix: WheelSuffix) -> Option<&WheelDescriptor> {
        self.group(suffix.corner).wheels.get(suffix.index as usize)
    }

    /// Head of the body anchor.
    pub fn body_center(&self) -> DVec3 {
        self.body.center
    }

    /// Body box center, recentered on Y over the whole vehicle.
    pub fn car_center(&self) -> DVec3 {
        let mut center = self.body.box_center();
        center.y = (self.max_y() + self.min_y()) / 2.0;
        center
    }

    pub fn width(&self) -> f64 {
        self.occupied_groups()
            .filter_map(|g| g.outer_x(0.0))
            .map(|x| (x - self.body.center.x).abs() * 2.0)
            .fold(self.body.width(), f64::max)
    }

    pub fn height(&self) -> f64 {
        self.occupied_groups()
            .filter_map(|g| g.outer_z())
            .fold(self.body.max_z, f64::max)
    }

    pub fn length(&self) -> f64 {
        (self.max_y() - self.min_y()).abs()
    }

    pub fn min_y(&self) -> f64 {
        self.occupied_groups()
            .filter_map(|g| g.outer_front())
            .fold(self.body.min_y, f64::min)
    }

    pub fn max_y(&self) -> f64 {
        self.occupied_groups()
            .filter_map(|g| g.outer_back())
            .fold(self.body.max_y, f64::max)
    }

    fn centered(&self, mut position: DVec3) -> DVec3 {
        position.x = self.body.center.x;
        position
    }

    /// Midpoint of the front-most wheels of both front corners.
    pub fn wheels_front_position(&self) -> DVec3 {
        self.centered(
            (self.group(Corner::FRONT_LEFT).min_position()
                + self.group(Corner::FRONT_RIGHT).min_position())
                / 2.0,
        )
    }

    /// Midpoint of the rear-most wheels of both back corners.
    pub fn wheels_back_position(&self) -> DVec3 {
        self.centered(
            (self.group(Corner::BACK_LEFT).max_position() + self.group(Corner::BACK_RIGHT).max_position())
                / 2.0,
        )
    }

    pub fn suspension_front_position(&self) -> DVec3 {
        self.centered(
            (self.group(Corner::FRONT_LEFT).medium_position()
                + self.group(Corner::FRONT_RIGHT).medium_position())
                / 2.0,
        )
    }

    pub fn suspension_back_position(&self) -> DVec3 {
        self.centered(
            (self.group(Corner::BACK_LEFT).medium_position()
                + self.group(Corner::BACK_RIGHT).medium_position())
                / 2.0,
        )
    }

    pub fn nb_front_wheels(&self) -> usize {
        self.group(Corner::FRONT_LEFT)
            .len()
            .max(self.group(Corner::FRONT_RIGHT).len())
    }

    pub fn nb_back_wheels(&self) -> usize {
        self.group(Corner::BACK_LEFT)
            .len()
            .max(self.group(Corner::BACK_RIGHT).len())
    }

    pub fn has_front_wheels(&self) -> bool {
        self.nb_front_wheels() > 0
    }

    pub fn has_back_wheels(&self) -> bool {
        self.nb_back_wheels() > 0
    }

    pub fn has_wheels(&self) -> bool {
        self.has_front_wheels() || self.has_back_wheels()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn wheel(corner: Corner, index: u32, head: DVec3, radius: f64) -> WheelDescriptor {
        let bounds = BoundingBox::new(
            [head.x - 0.1, head.y - radius, head.z - radius],
            [head.x + 0.1, head.y + radius, head.z + radius],
            head,
        );
        WheelDescriptor {
            suffix: corner.suffix(index),
            deform: Segment::new(head, head + DVec3::new(0.0, radius, 0.0)),
            bounds,
            brake: None,
        }
    }

    fn sedan() -> VehicleGeometry {
        let body_segment = Segment::new(DVec3::ZERO, DVec3::new(0.0, 1.0, 0.0));
        let body = BoundingBox::new([-1.0, -2.0, 0.0], [1.0, 2.0, 1.0], DVec3::ZERO);
        let mut groups = VehicleGeometry::empty_groups(body_segment);
        for corner in Corner::ALL {
            let x = if corner.is_left() { 0.9 } else { -0.9 };
            let y = if corner.is_front() { -1.5 } else { 1.5 };
            let group = &mut groups[corner.ordinal()];
            assert!(group.push(wheel(corner, 0, DVec3::new(x, y, 0.3), 0.3)));
        }
        VehicleGeometry::new(body, body_segment, groups)
    }

    #[test]
    fn test_sedan_derived_positions() {
        let geometry = sedan();
        assert_eq!(geometry.wheels_front_position(), DVec3::new(0.0, -1.5, 0.3));
        assert_eq!(geometry.wheels_back_position(), DVec3::new(0.0, 1.5, 0.3));
        assert_eq!(geometry.min_y(), -2.0);
        assert_eq!(geometry.max_y(), 2.0);
        assert_eq!(geometry.length(), 4.0);
        assert_eq!(geometry.width(), 2.0);
        assert_eq!(geometry.height(), 1.0);
        assert_eq!(geometry.nb_front_wheels(), 1);
        assert!(geometry.has_wheels());
    }

    #[test]
    fn test_push_rejects_out_of_sequence() {
        let mut group = WheelPositionGroup::new(Corner::FRONT_LEFT, DVec3::ZERO);
        assert!(!group.push(wheel(Corner::FRONT_LEFT, 1, DVec3::ZERO, 0.3)));
        assert!(!group.push(wheel(Corner::FRONT_RIGHT, 0, DVec3::ZERO, 0.3)));
        assert!(group.push(wheel(Corner::FRONT_LEFT, 0, DVec3::ZERO, 0.3)));
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn test_empty_group_uses_default() {
        let group = WheelPositionGroup::new(Corner::BACK_LEFT, DVec3::new(0.0, 1.0, 0.0));
        assert_eq!(group.min_position(), DVec3::new(0.0, 1.0, 0.0));
        assert_eq!(group.medium_position(), DVec3::new(0.0, 1.0, 0.0));
        assert_eq!(group.outer_x(0.0), None);
    }

    #[test]
    fn test_multi_wheel_group_positions() {
        let mut group = WheelPositionGroup::new(Corner::BACK_RIGHT, DVec3::ZERO);
        group.push(wheel(Corner::BACK_RIGHT, 0, DVec3::new(-1.0, 1.0, 0.5), 0.5));
        group.push(wheel(Corner::BACK_RIGHT, 1, DVec3::new(-1.0, 2.0, 0.5), 0.5));
        assert_eq!(group.min_position().y, 1.0);
        assert_eq!(group.max_position().y, 2.0);
        assert_eq!(group.medium_position(), DVec3::new(-1.0, 1.5, 0.5));
        assert_eq!(group.outer_x(0.25), Some(-1.35));
        assert_eq!(group.name("Damper"), "Damper_BR_0");
    }

    #[test]
    fn test_geometry_is_deterministic() {
        let a = sedan();
        let b = sedan();
        assert_eq!(a.car_center(), b.car_center());
        assert_eq!(a.suspension_front_position(), b.suspension_front_position());
    }
}
