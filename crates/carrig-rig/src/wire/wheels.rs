//! Wheel spin, brakes, ground sensors and dampers.

use std::f64::consts::PI;

use carrig_spec::naming::{self, property, role};
use carrig_spec::{
    Axis, AxisLimits, AxisMapping, AxisRange, ChannelPath, Constraint, Driver, DriverReduce,
    DriverSource, Node, PoseChannel, RotationMode, Space, TransformChannel, TransformLocks,
    TransformMapping, WheelPositionGroup, WheelSuffix,
};

use super::{widget, Wiring, ROTATION_INPUT};

/// Name of the spin shortcut constraint on `MCH_Wheel_*`.
pub const WHEEL_ROLLING_CONSTRAINT: &str = "Wheel rotation along Y axis";

/// Name of the scale limit on brake controls.
pub const BRAKE_CONSTRAINT: &str = "Brakes";

/// Turns a brake node into a user control: braking is expressed by
/// shrinking the handle on Y and Z down to half size.
pub fn configure_brake(node: &mut Node, widget_prefix: &str) {
    node.locks = TransformLocks::ALL.with_scale([true, false, false]);
    node.widget = Some(format!("{}.{}", widget_prefix, widget::BRAKE));
    node.constraints.retain(|c| c.name != BRAKE_CONSTRAINT);
    node.constraints.push(
        Constraint::limit_scale(
            BRAKE_CONSTRAINT,
            AxisLimits::default()
                .x(AxisRange::fixed(1.0))
                .y(AxisRange::new(0.5, 1.0))
                .z(AxisRange::new(0.5, 1.0)),
        )
        .in_space(Space::Local)
        .affecting_transform(),
    );
}

impl Wiring<'_> {
    pub(super) fn wheels(&mut self) {
        let geometry = self.geometry;
        for group in geometry.occupied_groups() {
            for wheel in group.wheels() {
                self.wheel(wheel.suffix);
            }
            self.damper(group);
        }
    }

    fn wheel(&mut self, suffix: WheelSuffix) {
        let mch_wheel = suffix.name(role::MCH_WHEEL);
        let mch_brake = suffix.name(role::MCH_BRAKE);
        let sensor = suffix.name(role::GROUND_SENSOR);
        let control = suffix.name(role::WHEEL);
        let rotation = suffix.name(role::MCH_WHEEL_ROTATION);

        self.constrain(
            &suffix.name(role::DEF_WHEEL),
            Constraint::copy_transforms("Copy Transforms", &mch_wheel),
        );
        let def_brake = suffix.name(role::DEF_BRAKE);
        if self.has(&def_brake) {
            self.constrain(&def_brake, Constraint::copy_transforms("Copy Transforms", &mch_brake));
        }

        self.sensor(&sensor, &suffix.name(role::SHP_GROUND_SENSOR), suffix.is_front());

        self.setup(&control, |node| {
            node.rotation_mode = RotationMode::Xyz;
            node.locks = TransformLocks::ALL
                .with_rotation([false, true, true])
                .with_rotation_w(false);
        });
        self.display(&control, widget::WHEEL, None);

        let brake = suffix.name(role::BRAKE);
        let prefix = self.widget_prefix;
        self.setup(&brake, |node| configure_brake(node, prefix));

        self.setup(&mch_wheel, |node| node.rotation_mode = RotationMode::Xyz);
        self.constrain(
            &mch_wheel,
            Constraint::copy_rotation("Bake animation wheels", &rotation, [true, false, false])
                .in_space(Space::Pose),
        );
        let radius = self
            .rig
            .node(&mch_wheel)
            .map(|n| n.head.z)
            .filter(|z| *z != 0.0)
            .unwrap_or(1.0)
            .abs();
        let rolling = TransformMapping {
            from_channel: TransformChannel::Location,
            from_ranges: AxisLimits::default().y(AxisRange::symmetric(PI * radius)),
            to_channel: TransformChannel::Rotation,
            mappings: vec![AxisMapping {
                to: Axis::X,
                from: Axis::Y,
                range: AxisRange::new(PI, -PI),
            }],
            extrapolate: true,
        };
        if self.constrain(
            &mch_wheel,
            Constraint::transform_remap(WHEEL_ROLLING_CONSTRAINT, naming::ROOT, rolling)
                .in_space(Space::Local),
        ) {
            self.drive_influence(
                &mch_wheel,
                WHEEL_ROLLING_CONSTRAINT,
                property::WHEELS_Y_ROLLING,
                1.0,
            );
        }
        // Manual nudges on the control stack on top of the driven spin.
        self.constrain(
            &mch_wheel,
            Constraint::copy_rotation("Animation wheels", &control, [true, false, false])
                .with_offset()
                .in_space(Space::Local),
        );

        self.setup(&rotation, |node| node.rotation_mode = RotationMode::Xyz);
        self.constrain(&rotation, Constraint::child_of("Child Of", &sensor));
        self.drive(Driver::from_property(
            ChannelPath::node(&rotation, PoseChannel::RotationEuler, 0),
            ROTATION_INPUT,
            suffix.rotation_property(),
        ));
    }

    fn damper(&mut self, group: &WheelPositionGroup) {
        let locks = TransformLocks::ALL.with_location([true, true, false]);
        let damper = group.name(role::DAMPER);
        self.lock(&damper, locks);
        self.display(&damper, widget::DAMPER, None);
        self.lock(&group.name(role::MCH_DAMPER), locks);

        let averaging = group.name(role::MCH_GROUND_SENSOR);
        if !self.has(&averaging) {
            return;
        }
        let mut driver = Driver::new(ChannelPath::node(&averaging, PoseChannel::Location, 2))
            .with_reduce(DriverReduce::Max);
        for (i, wheel) in group.wheels().iter().enumerate() {
            let sensor = wheel.suffix.name(role::GROUND_SENSOR);
            if self.has(&sensor) {
                driver = driver.with_input(
                    format!("groundSensor{:03}", i),
                    DriverSource::transform(sensor, TransformChannel::Location, Axis::Z, Space::Local),
                );
            }
        }
        self.drive(driver);
    }
}
