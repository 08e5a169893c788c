//! Door and trunk hinges.

use carrig_spec::naming::{self, role};
use carrig_spec::{AxisLimits, AxisRange, Constraint, Corner, Space, TransformLocks};

use super::{widget, Wiring};

/// Constraint attaching a hinge to the deformed body.
pub const ATTACHMENT_CONSTRAINT: &str = "Armature-Attachment";

/// Rear trunk lids open up to this angle around their hinge, in degrees.
pub const TRUNK_OPENING_DEGREES: f64 = 80.0;

impl Wiring<'_> {
    pub(super) fn doors(&mut self) {
        for corner in Corner::ALL {
            let suffix = corner.suffix(0);
            let door = suffix.name(role::DOOR);
            if !self.has(&door) {
                continue;
            }
            // Doors swing outward: left doors turn negative around Z.
            let range = if corner.is_left() {
                AxisRange::new(-90f64.to_radians(), 0.0)
            } else {
                AxisRange::new(0.0, 90f64.to_radians())
            };
            self.hinge(&door, "Door Rotation Limit", AxisLimits::default().z(range));
            self.lock(
                &door,
                TransformLocks::ALL
                    .with_rotation([true, true, false])
                    .with_rotation_w(false),
            );
            self.display(&door, widget::DOOR_TRUNK, Some(&suffix.name(role::SHP_DOOR)));
        }
    }

    pub(super) fn trunks(&mut self) {
        let trunks: Vec<String> = self
            .rig
            .nodes
            .names()
            .filter(|name| name.starts_with(&format!("{}_", role::TRUNK)))
            .map(str::to_string)
            .collect();
        for trunk in trunks {
            self.hinge(
                &trunk,
                "Trunk Rotation Limit",
                AxisLimits::default().y(AxisRange::new(-TRUNK_OPENING_DEGREES.to_radians(), 0.0)),
            );
            self.lock(
                &trunk,
                TransformLocks::ALL
                    .with_rotation([true, false, true])
                    .with_rotation_w(false),
            );
            self.display(&trunk, widget::DOOR_TRUNK, None);
        }
    }

    fn hinge(&mut self, owner: &str, limit: &str, limits: AxisLimits) {
        self.constrain(
            owner,
            Constraint::limit_rotation(limit, limits)
                .in_space(Space::Local)
                .affecting_transform(),
        );
        self.constrain(
            owner,
            Constraint::child_of(ATTACHMENT_CONSTRAINT, naming::DEF_BODY),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carrig_spec::{ConstraintKind, MemoryScene, SceneObject};
    use glam::DVec3;
    use pretty_assertions::assert_eq;

    use crate::detect::detect;
    use crate::synth::synthesize;
    use crate::test_support::{deform_rig, SEDAN};
    use crate::wire::{wire, DEFAULT_WIDGET_PREFIX};

    fn wired_with(scene: &MemoryScene) -> carrig_spec::Rig {
        let mut rig = deform_rig(SEDAN, &[]);
        let geometry = detect(&rig, scene).unwrap();
        rig.nodes = synthesize(&rig, &geometry, scene).unwrap();
        wire(&mut rig, &geometry, DEFAULT_WIDGET_PREFIX);
        rig
    }

    fn rotation_limit(rig: &carrig_spec::Rig, node: &str, name: &str) -> AxisLimits {
        match &rig.node(node).unwrap().constraint(name).unwrap().kind {
            ConstraintKind::LimitRotation { limits, .. } => *limits,
            other => panic!("unexpected constraint {:?}", other),
        }
    }

    #[test]
    fn test_door_hinges_open_outward() {
        let mut shell = SceneObject::mesh("Shell", DVec3::new(0.0, 0.0, 0.8), DVec3::new(2.0, 4.0, 1.0));
        shell.vertex_groups = vec!["Door_FL_0".into(), "Door_FR_0".into()];
        let rig = wired_with(&MemoryScene::new().with_object(shell));

        let left = rotation_limit(&rig, "Door_FL_0", "Door Rotation Limit").z.unwrap();
        assert!(left.min < 0.0 && left.max == 0.0);
        let right = rotation_limit(&rig, "Door_FR_0", "Door Rotation Limit").z.unwrap();
        assert!(right.min == 0.0 && right.max > 0.0);

        let door = rig.node("Door_FL_0").unwrap();
        assert_eq!(door.locks.rotation, [true, true, false]);
        assert_eq!(door.display_handle.as_deref(), Some("SHP_Door_FL_0"));
        assert_eq!(
            door.constraint(ATTACHMENT_CONSTRAINT).unwrap().target.as_deref(),
            Some(naming::DEF_BODY)
        );
        assert!(rig.validate().is_ok());
    }

    #[test]
    fn test_trunk_hinge() {
        let scene = MemoryScene::new().with_object(SceneObject::mesh(
            "Trunk_B_0",
            DVec3::new(0.0, 2.0, 1.0),
            DVec3::new(1.6, 0.6, 0.4),
        ));
        let rig = wired_with(&scene);
        let limit = rotation_limit(&rig, "Trunk_B_0", "Trunk Rotation Limit").y.unwrap();
        assert!((limit.min + TRUNK_OPENING_DEGREES.to_radians()).abs() < 1e-12);
        let trunk = rig.node("Trunk_B_0").unwrap();
        assert_eq!(trunk.locks.rotation, [true, false, true]);
        assert_eq!(trunk.widget.as_deref(), Some("WGT-CarRig.DoorTrunk"));
    }
}
