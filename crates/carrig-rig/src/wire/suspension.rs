//! Axle pivots, roll axis, body carrier and the suspension handle.

use std::f64::consts::PI;

use carrig_spec::naming::{self, property, role};
use carrig_spec::{
    Axis, AxisLimits, AxisMapping, AxisRange, Axle, Constraint, Corner, Side, Space, TrackAxis,
    TransformChannel, TransformLocks, TransformMapping,
};

use super::{widget, Wiring};

/// Roll share of each axle: the rear axle only half-tilts the chassis.
const AXIS_ROLL_INFLUENCE: [(Axle, f64); 2] = [(Axle::Front, 1.0), (Axle::Back, 0.5)];

fn axle_names(axle: Axle) -> (&'static str, &'static str) {
    match axle {
        Axle::Front => (naming::MCH_AXIS_F, naming::MCH_SUSPENSION_F),
        Axle::Back => (naming::MCH_AXIS_B, naming::MCH_SUSPENSION_B),
    }
}

impl Wiring<'_> {
    /// Suspension pivots ride on their axle axis; each axis spans the
    /// dampers of its axle.
    pub(super) fn axle_suspension(&mut self) {
        for axle in [Axle::Front, Axle::Back] {
            let (axis, pivot) = axle_names(axle);
            if !self.has(axis) {
                continue;
            }

            let copy = format!("Location from {}", axis);
            if self.constrain(
                pivot,
                Constraint::copy_location(&copy, axis, [false, false, true]).with_head_tail(0.5),
            ) {
                self.drive_influence(pivot, &copy, property::SUSPENSION_FACTOR, 1.0);
            }
            if axle == Axle::Front {
                self.constrain(
                    pivot,
                    Constraint::damped_track(
                        "Track suspension back",
                        naming::MCH_SUSPENSION_B,
                        TrackAxis::Y,
                    ),
                );
            }

            let right = self.geometry.group(Corner::new(axle, Side::Right));
            if !right.is_empty() {
                self.constrain(
                    axis,
                    Constraint::copy_location(
                        "Copy location from right wheel",
                        right.name(role::MCH_DAMPER),
                        [true; 3],
                    ),
                );
            }
            let left = self.geometry.group(Corner::new(axle, Side::Left));
            if !left.is_empty() {
                self.constrain(
                    axis,
                    Constraint::damped_track("Track Left Wheel", left.name(role::MCH_DAMPER), TrackAxis::Y),
                );
            }
        }
    }

    /// Chassis roll taken from the axle axes.
    pub(super) fn axis(&mut self) {
        for (axle, influence) in AXIS_ROLL_INFLUENCE {
            let (source, _) = axle_names(axle);
            if !self.has(source) {
                continue;
            }
            let name = format!("Rotation from {}", source);
            let mapping = TransformMapping {
                from_channel: TransformChannel::Rotation,
                from_ranges: AxisLimits::default().x(AxisRange::symmetric(PI)),
                to_channel: TransformChannel::Rotation,
                mappings: vec![AxisMapping {
                    to: Axis::Y,
                    from: Axis::X,
                    range: AxisRange::new(PI, -PI),
                }],
                extrapolate: false,
            };
            if self.constrain(
                naming::MCH_AXIS,
                Constraint::transform_remap(&name, source, mapping)
                    .in_space(Space::Local)
                    .with_influence(influence),
            ) {
                self.drive_influence(
                    naming::MCH_AXIS,
                    &name,
                    property::SUSPENSION_ROLLING_FACTOR,
                    influence,
                );
            }
        }
    }

    pub(super) fn suspension_handle(&mut self) {
        self.lock(
            naming::SUSPENSION,
            TransformLocks::ALL.with_location([false; 3]),
        );
        self.display(naming::SUSPENSION, widget::SUSPENSION, None);
        self.constrain(
            naming::SUSPENSION,
            Constraint::limit_location(
                "Limit Location",
                AxisLimits::default()
                    .x(AxisRange::symmetric(0.5))
                    .y(AxisRange::symmetric(0.3))
                    .z(AxisRange::symmetric(0.1)),
            )
            .in_space(Space::Local)
            .affecting_transform(),
        );
    }

    /// Body carrier driven by the suspension handle, then the deform body.
    pub(super) fn body(&mut self) {
        let rollover = TransformMapping {
            from_channel: TransformChannel::Location,
            from_ranges: AxisLimits::default()
                .x(AxisRange::symmetric(2.0))
                .y(AxisRange::symmetric(2.0)),
            to_channel: TransformChannel::Rotation,
            mappings: vec![
                AxisMapping {
                    to: Axis::X,
                    from: Axis::Y,
                    range: AxisRange::new(6f64.to_radians(), -6f64.to_radians()),
                },
                AxisMapping {
                    to: Axis::Y,
                    from: Axis::X,
                    range: AxisRange::new(-7f64.to_radians(), 7f64.to_radians()),
                },
            ],
            extrapolate: false,
        };
        self.constrain(
            naming::MCH_BODY,
            Constraint::transform_remap("Suspension on rollover", naming::SUSPENSION, rollover)
                .in_space(Space::Local),
        );

        let vertical = TransformMapping {
            from_channel: TransformChannel::Location,
            from_ranges: AxisLimits::default().z(AxisRange::symmetric(0.5)),
            to_channel: TransformChannel::Location,
            mappings: vec![AxisMapping {
                to: Axis::Z,
                from: Axis::Z,
                range: AxisRange::symmetric(0.1),
            }],
            extrapolate: false,
        };
        self.constrain(
            naming::MCH_BODY,
            Constraint::transform_remap("Suspension on vertical", naming::SUSPENSION, vertical)
                .in_space(Space::Local),
        );

        self.constrain(
            naming::DEF_BODY,
            Constraint::copy_transforms("Copy Transforms", naming::MCH_BODY),
        );
    }
}
