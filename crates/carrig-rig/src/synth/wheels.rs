//! Per-wheel chains and per-corner dampers.

use carrig_spec::naming::role;
use carrig_spec::{Node, SceneGraph, WheelDescriptor, WheelPositionGroup};

use super::{along_y, with_x, with_z, Synthesizer};
use crate::error::RigResult;

impl<S: SceneGraph + ?Sized> Synthesizer<'_, S> {
    /// Wheel chains of every corner, each corner closed by its damper.
    pub(super) fn wheels(&mut self, base: &str) -> RigResult<()> {
        let geometry = self.geometry;
        for group in geometry.occupied_groups() {
            for wheel in group.wheels() {
                self.wheel(wheel, base)?;
            }
            self.damper(group, base)?;
        }
        Ok(())
    }

    fn wheel(&mut self, wheel: &WheelDescriptor, base: &str) -> RigResult<()> {
        let suffix = wheel.suffix;
        let bounds = &wheel.bounds;
        let deform = wheel.deform;

        let sensor_name = suffix.name(role::GROUND_SENSOR);
        let sensor_head = with_z(bounds.box_center(), deform.head.z);
        let sensor_length =
            (bounds.height().max(sensor_head.z) / 2.5).max(bounds.width() * 1.02);
        let sensor_tail = along_y(sensor_head, sensor_length);
        self.add(Node::new(&sensor_name, sensor_head, sensor_tail).with_parent(base))?;
        self.add(
            Node::new(
                suffix.name(role::SHP_GROUND_SENSOR),
                with_z(sensor_head, 0.001),
                with_z(sensor_tail, 0.001),
            )
            .with_parent(&sensor_name),
        )?;

        self.add(
            Node::new(
                suffix.name(role::MCH_WHEEL),
                deform.head,
                along_y(deform.tail, 0.5),
            )
            .with_parent(&sensor_name),
        )?;

        // Spin accumulator: driven by distance only, so it has no parent.
        self.add(Node::new(
            suffix.name(role::MCH_WHEEL_ROTATION),
            deform.head,
            along_y(deform.head, deform.head.z),
        ))?;

        let mch_brake = suffix.name(role::MCH_BRAKE);
        if let Some(brake) = wheel.brake {
            self.add(
                Node::new(&mch_brake, brake.head, along_y(brake.tail, 0.5))
                    .with_parent(&sensor_name),
            )?;
        }

        let control_head = with_x(deform.head, wheel.outer_x(bounds.length() * 0.05));
        let control_tail = along_y(control_head, control_head.z * 0.9);
        self.add(
            Node::new(suffix.name(role::WHEEL), control_head, control_tail)
                .with_parent(&sensor_name),
        )?;

        if wheel.brake.is_some() && suffix.is_left() {
            self.add(
                Node::new(suffix.name(role::BRAKE), control_head, control_tail)
                    .with_parent(&mch_brake),
            )?;
        }
        Ok(())
    }

    /// Damper of a corner. Corners with several wheels get an averaging
    /// sensor between the wheels and the damper.
    fn damper(&mut self, group: &WheelPositionGroup, base: &str) -> RigResult<()> {
        let medium = group.medium_position();

        let damper_parent = if group.len() == 1 {
            group.name(role::GROUND_SENSOR)
        } else {
            let name = group.name(role::MCH_GROUND_SENSOR);
            let head = with_z(medium, 0.0);
            self.add(Node::new(&name, head, along_y(head, 1.0)).with_parent(base))?;
            name
        };

        let ratio = medium.z.abs();
        let mut head = medium;
        head.x = group.outer_x(ratio * 0.25).unwrap_or(medium.x);
        head.z *= 1.5;
        let damper = group.name(role::DAMPER);
        self.add(Node::new(&damper, head, along_y(head, ratio)).with_parent(&damper_parent))?;

        self.add(
            Node::new(group.name(role::MCH_DAMPER), medium, along_y(medium, 2.0))
                .with_parent(&damper),
        )
    }
}
