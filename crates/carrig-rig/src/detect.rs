//! Detection of the vehicle layout from a deformation rig.
//!
//! Wheels are discovered once, here, by scanning `DEF_Wheel_<corner>_<i>`
//! anchors per corner. The result is a typed [`VehicleGeometry`] that the
//! synthesizer consumes; nothing downstream re-derives wheel sets from names.

use carrig_spec::naming::{self, role};
use carrig_spec::{
    Corner, CornerName, Rig, SceneGraph, Segment, VehicleGeometry, WheelDescriptor, WheelSuffix,
};
use tracing::{debug, warn};

use crate::analyzer;
use crate::error::{RigError, RigResult};

/// Builds the geometry snapshot of a deformation rig.
///
/// Fails with [`RigError::MissingBody`] when `DEF_Body` is absent.
pub fn detect<S: SceneGraph + ?Sized>(rig: &Rig, scene: &S) -> RigResult<VehicleGeometry> {
    let body_node = rig.node(naming::DEF_BODY).ok_or(RigError::MissingBody)?;
    let body_segment = Segment::new(body_node.head, body_node.tail);
    let body = analyzer::compute(naming::DEF_BODY, &rig.nodes, scene)?;

    let mut groups = VehicleGeometry::empty_groups(body_segment);
    for group in groups.iter_mut() {
        let corner = group.corner();
        for suffix in rig.nodes.corner_suffixes(role::DEF_WHEEL, corner) {
            let wheel = describe_wheel(rig, scene, suffix)?;
            group.push(wheel);
        }
        for stray in stray_wheels(rig, corner, group.len()) {
            warn!(
                wheel = %stray.name(role::DEF_WHEEL),
                "Wheel index after a gap in the sequence, ignored"
            );
        }
        debug!(corner = %corner, wheels = group.len(), "Detected wheels");
    }

    Ok(VehicleGeometry::new(body, body_segment, groups))
}

fn describe_wheel<S: SceneGraph + ?Sized>(
    rig: &Rig,
    scene: &S,
    suffix: WheelSuffix,
) -> RigResult<WheelDescriptor> {
    let name = suffix.name(role::DEF_WHEEL);
    let node = rig.nodes.require(&name)?;
    let bounds = analyzer::compute(&name, &rig.nodes, scene)?;
    let brake = rig
        .node(&suffix.name(role::DEF_BRAKE))
        .map(|b| Segment::new(b.head, b.tail));
    Ok(WheelDescriptor {
        suffix,
        deform: Segment::new(node.head, node.tail),
        bounds,
        brake,
    })
}

/// `DEF_Wheel` anchors at `corner` whose index lies beyond the contiguous run.
fn stray_wheels(rig: &Rig, corner: Corner, contiguous: usize) -> Vec<WheelSuffix> {
    let mut strays: Vec<WheelSuffix> = rig
        .nodes
        .names()
        .filter_map(|name| CornerName::parse(name).ok())
        .filter(|parsed| parsed.role == role::DEF_WHEEL)
        .map(|parsed| parsed.suffix)
        .filter(|suffix| suffix.corner == corner && suffix.index as usize >= contiguous)
        .collect();
    strays.sort();
    strays
}

#[cfg(test)]
mod tests {
    use super::*;
    use carrig_spec::{MemoryScene, Node};
    use glam::DVec3;
    use pretty_assertions::assert_eq;

    fn deform_rig(wheels: &[(&str, DVec3)]) -> Rig {
        let mut rig = Rig::new("Car");
        rig.add_node(Node::new("DEF_Body", DVec3::ZERO, DVec3::new(0.0, 2.0, 0.0)).with_deform(true))
            .unwrap();
        for (suffix, head) in wheels {
            rig.add_node(
                Node::new(format!("DEF_Wheel_{}", suffix), *head, *head + DVec3::new(0.0, head.z, 0.0))
                    .with_deform(true),
            )
            .unwrap();
        }
        rig
    }

    #[test]
    fn test_missing_body() {
        let rig = Rig::new("Empty");
        assert!(matches!(
            detect(&rig, &MemoryScene::new()),
            Err(RigError::MissingBody)
        ));
    }

    #[test]
    fn test_detects_groups_and_brakes() {
        let mut rig = deform_rig(&[
            ("FL_0", DVec3::new(0.9, -2.0, 0.5)),
            ("FR_0", DVec3::new(-0.9, -2.0, 0.5)),
            ("BL_0", DVec3::new(0.9, 2.0, 0.5)),
            ("BL_1", DVec3::new(0.9, 3.1, 0.5)),
        ]);
        rig.add_node(Node::new(
            "DEF_Brake_FL_0",
            DVec3::new(0.8, -2.0, 0.5),
            DVec3::new(0.8, -1.5, 0.5),
        ))
        .unwrap();

        let geometry = detect(&rig, &MemoryScene::new()).unwrap();
        assert_eq!(geometry.group(Corner::FRONT_LEFT).len(), 1);
        assert_eq!(geometry.group(Corner::BACK_LEFT).len(), 2);
        assert!(geometry.group(Corner::BACK_RIGHT).is_empty());
        assert_eq!(geometry.nb_back_wheels(), 2);

        let fl = geometry.wheel(Corner::FRONT_LEFT.suffix(0)).unwrap();
        assert!(fl.brake.is_some());
        assert!(geometry.wheel(Corner::FRONT_RIGHT.suffix(0)).unwrap().brake.is_none());
    }

    #[test]
    fn test_gap_terminates_enumeration() {
        let rig = deform_rig(&[
            ("FL_0", DVec3::new(0.9, -2.0, 0.5)),
            ("FL_2", DVec3::new(0.9, -3.0, 0.5)),
        ]);
        let geometry = detect(&rig, &MemoryScene::new()).unwrap();
        assert_eq!(geometry.group(Corner::FRONT_LEFT).len(), 1);
        assert_eq!(
            stray_wheels(&rig, Corner::FRONT_LEFT, 1),
            vec![Corner::FRONT_LEFT.suffix(2)]
        );
    }

    #[test]
    fn test_detection_is_deterministic() {
        let rig = deform_rig(&[
            ("FL_0", DVec3::new(0.9, -2.0, 0.5)),
            ("FR_0", DVec3::new(-0.9, -2.0, 0.5)),
        ]);
        let scene = MemoryScene::new();
        let a = detect(&rig, &scene).unwrap();
        let b = detect(&rig, &scene).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.wheels_front_position(), b.wheels_front_position());
    }
}
