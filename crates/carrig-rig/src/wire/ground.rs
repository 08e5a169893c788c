//! Ground sensing, root, axle sensors and drift.

use carrig_spec::naming;
use carrig_spec::{
    AxisLimits, AxisRange, Constraint, RotationMode, Space, TrackAxis, TransformLocks,
};

use super::{widget, Wiring};

/// Name of the shrinkwrap constraint on every ground sensor.
pub const GROUND_PROJECTION: &str = "Ground projection";

impl Wiring<'_> {
    /// Wheel ground sensor: vertical travel only, projected on the ground.
    pub(super) fn sensor(&mut self, sensor: &str, handle: &str, is_front: bool) {
        self.lock(sensor, TransformLocks::ALL.with_location([true, true, false]));
        self.display(sensor, widget::GROUND_SENSOR, Some(handle));

        if is_front {
            self.constrain(
                sensor,
                Constraint::copy_rotation("Steering rotation", naming::MCH_STEERING, [false, false, true])
                    .in_space(Space::Local),
            );
        }
        self.project_on_ground(sensor);
        self.constrain(
            sensor,
            Constraint::limit_location(
                "Ground projection limitation",
                AxisLimits::default()
                    .x(AxisRange::fixed(0.0))
                    .y(AxisRange::fixed(0.0))
                    .z(AxisRange::symmetric(0.2)),
            )
            .in_space(Space::Local)
            .affecting_transform(),
        );
    }

    /// Downward projection keeping the sensor at its rest height.
    fn project_on_ground(&mut self, sensor: &str) {
        let Some(height) = self.rig.node(sensor).map(|n| n.head.z.abs()) else {
            return;
        };
        self.constrain(sensor, Constraint::ground_projection(GROUND_PROJECTION, height));
    }

    pub(super) fn root_and_axles(&mut self) {
        self.lock(naming::ROOT, TransformLocks::NONE.with_scale([true; 3]));
        self.display(naming::ROOT, widget::ROOT, Some(naming::SHP_ROOT));

        for (sensor, handle) in [
            (naming::GROUND_SENSOR_AXLE_F, naming::SHP_GROUND_SENSOR_AXLE_F),
            (naming::GROUND_SENSOR_AXLE_B, naming::SHP_GROUND_SENSOR_AXLE_B),
        ] {
            if !self.has(sensor) {
                continue;
            }
            self.lock(sensor, TransformLocks::ALL.with_location([true, true, false]));
            self.display(sensor, widget::GROUND_SENSOR_AXLE, Some(handle));
            self.project_on_ground(sensor);
        }

        if self.has(naming::GROUND_SENSOR_AXLE_F) && self.has(naming::GROUND_SENSOR_AXLE_B) {
            self.constrain(
                naming::GROUND_SENSOR_AXLE_F,
                Constraint::limit_distance("Limit distance from Root", naming::GROUND_SENSOR_AXLE_B)
                    .in_space(Space::Pose),
            );
        }

        // The chassis axis follows the vector between the two axles.
        if self.has(naming::MCH_ROOT_AXLE_F) && self.has(naming::MCH_ROOT_AXLE_B) {
            self.constrain(
                naming::MCH_ROOT_AXLE_B,
                Constraint::damped_track(
                    "Track front axle",
                    naming::MCH_ROOT_AXLE_F,
                    TrackAxis::NegativeY,
                ),
            );
        }
    }

    pub(super) fn drift(&mut self) {
        self.setup(naming::DRIFT, |node| {
            node.rotation_mode = RotationMode::Zyx;
            node.locks = TransformLocks::ALL
                .with_rotation([true, true, false])
                .with_rotation_w(false);
        });
        self.display(naming::DRIFT, widget::DRIFT, Some(naming::SHP_DRIFT));
    }
}
