//! Steering handle, its rotation carrier and the steering mechanism.

use carrig_spec::naming::{self, property};
use carrig_spec::{
    ChannelPath, Constraint, Driver, PoseChannel, RotationMode, Space, TrackAxis, TransformLocks,
};
use tracing::debug;

use super::{widget, Wiring, ROTATION_INPUT};

impl Wiring<'_> {
    pub(super) fn steering(&mut self) {
        if !self.has(naming::STEERING) {
            debug!("No steering handle, steering wiring skipped");
            return;
        }

        // Sideways slide of the handle is the only user input.
        self.lock(
            naming::STEERING,
            TransformLocks::ALL.with_location([false, true, true]),
        );
        self.display(naming::STEERING, widget::STEERING, None);

        let carrier = naming::MCH_STEERING_ROTATION;
        self.setup(carrier, |node| node.rotation_mode = RotationMode::Quaternion);
        self.drive(Driver::from_property(
            ChannelPath::node(carrier, PoseChannel::Location, 0),
            ROTATION_INPUT,
            property::STEERING_ROTATION,
        ));
        if self.has(naming::MCH_ROOT_AXLE_B) {
            self.constrain(
                carrier,
                Constraint::copy_rotation("Copy back axle rotation", naming::MCH_ROOT_AXLE_B, [true, false, false])
                    .in_space(Space::Local),
            );
        }
        let anchor = if self.has(naming::MCH_ROOT_AXLE_F) {
            naming::MCH_ROOT_AXLE_F
        } else {
            naming::ROOT
        };
        self.constrain(carrier, Constraint::child_of("Child Of", anchor));

        self.constrain(
            naming::MCH_STEERING,
            Constraint::damped_track("Track steering bone", naming::STEERING, TrackAxis::NegativeY),
        );
        // Counter-steer against drift so the wheels keep their heading.
        self.constrain(
            naming::MCH_STEERING,
            Constraint::copy_rotation("Drift counter animation", naming::DRIFT, [false, false, true])
                .with_offset()
                .in_space(Space::Local)
                .with_influence(1.0),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carrig_spec::{ConstraintKind, DriverSource};
    use pretty_assertions::assert_eq;

    use crate::test_support::{wired, SEDAN, TRAILER};

    #[test]
    fn test_steering_chain() {
        let (rig, _) = wired(SEDAN, &[]);
        let handle = rig.node(naming::STEERING).unwrap();
        assert_eq!(handle.locks.location, [false, true, true]);
        assert_eq!(handle.widget.as_deref(), Some("WGT-CarRig.Steering"));

        let carrier = rig.node(naming::MCH_STEERING_ROTATION).unwrap();
        let names: Vec<&str> = carrier.constraints.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Copy back axle rotation", "Child Of"]);
        assert_eq!(
            carrier.constraint("Child Of").unwrap().target.as_deref(),
            Some(naming::MCH_ROOT_AXLE_F)
        );

        let driver = rig
            .driver(&ChannelPath::node(carrier.name.as_str(), PoseChannel::Location, 0))
            .unwrap();
        assert_eq!(driver.inputs[0].source, DriverSource::property("SteeringRotation"));

        let mechanism = rig.node(naming::MCH_STEERING).unwrap();
        let drift = mechanism.constraint("Drift counter animation").unwrap();
        assert_eq!(
            drift.kind,
            ConstraintKind::CopyRotation {
                axes: [false, false, true],
                use_offset: true
            }
        );
        assert_eq!(drift.owner_space, Space::Local);
        assert!(rig.validate().is_ok());
    }

    #[test]
    fn test_no_steering_without_front_wheels() {
        let (rig, stats) = wired(TRAILER, &[]);
        assert!(!rig.has_node(naming::STEERING));
        assert!(rig.property("SteeringRotation").is_none());
        assert_eq!(stats.skipped, 0);
    }
}
