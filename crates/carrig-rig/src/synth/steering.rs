//! Axle axis nodes and the steering sub-chain.

use carrig_spec::naming::{self, role};
use carrig_spec::{Axle, Corner, Node, SceneGraph, Side};
use glam::DVec3;
use tracing::debug;

use super::{along_y, Synthesizer};
use crate::error::RigResult;

impl<S: SceneGraph + ?Sized> Synthesizer<'_, S> {
    /// `MCH_Axis_F` / `MCH_Axis_B`, spanning the first right wheel to the
    /// first left wheel of each present axle.
    pub(super) fn axis_nodes(&mut self, base: &str) -> RigResult<()> {
        for (axle, name) in [(Axle::Front, naming::MCH_AXIS_F), (Axle::Back, naming::MCH_AXIS_B)] {
            let present = match axle {
                Axle::Front => self.geometry.has_front_wheels(),
                Axle::Back => self.geometry.has_back_wheels(),
            };
            if !present {
                continue;
            }
            let right = self.first_wheel_head(Corner::new(axle, Side::Right));
            let left = self.first_wheel_head(Corner::new(axle, Side::Left));
            let (head, tail) = match (right, left) {
                (Some(r), Some(l)) => (r, l),
                (Some(r), None) => (r, self.mirrored(r)),
                (None, Some(l)) => (self.mirrored(l), l),
                (None, None) => continue,
            };
            self.add(Node::new(name, head, tail).with_parent(base))?;
        }
        Ok(())
    }

    /// Steering mechanism, rotation carrier and user handle. Only built when
    /// the vehicle has front wheels.
    pub(super) fn steering(&mut self) -> RigResult<()> {
        if !self.geometry.has_front_wheels() {
            debug!("No front wheels, steering skipped");
            return Ok(());
        }
        let front = self.geometry.wheels_front_position();
        let width = self.geometry.width();

        let mechanism_tail = along_y(front, width / 2.0);
        self.add(
            Node::new(naming::MCH_STEERING, front, mechanism_tail)
                .with_parent(naming::GROUND_SENSOR_AXLE_F),
        )?;

        self.add(Node::new(
            naming::MCH_STEERING_ROTATION,
            front,
            along_y(mechanism_tail, 1.0),
        ))?;

        // The handle sits well ahead of the car for leverage.
        let reference = [Corner::FRONT_LEFT, Corner::FRONT_RIGHT]
            .into_iter()
            .find_map(|corner| self.tree.get(&corner.suffix(0).name(role::DEF_WHEEL)))
            .map(|node| node.length())
            .unwrap_or(0.0);
        let mut head = front;
        head.y = self.geometry.min_y() - 4.0 * reference;
        self.add(
            Node::new(naming::STEERING, head, along_y(head, -width / 2.0))
                .with_parent(naming::MCH_STEERING_ROTATION),
        )
    }

    fn first_wheel_head(&self, corner: Corner) -> Option<DVec3> {
        self.geometry
            .group(corner)
            .wheels()
            .first()
            .map(|wheel| wheel.deform.head)
    }

    /// Reflection of `point` across the body's center plane.
    fn mirrored(&self, point: DVec3) -> DVec3 {
        let center = self.geometry.body_center().x;
        DVec3::new(2.0 * center - point.x, point.y, point.z)
    }
}

#[cfg(test)]
mod tests {
    use carrig_spec::naming;
    use carrig_spec::MemoryScene;
    use glam::DVec3;

    use crate::detect::detect;
    use crate::synth::synthesize;
    use crate::test_support::{deform_rig, SEDAN, TRAILER};

    #[test]
    fn test_steering_chain() {
        let rig = deform_rig(SEDAN, &[]);
        let scene = MemoryScene::new();
        let geometry = detect(&rig, &scene).unwrap();
        let tree = synthesize(&rig, &geometry, &scene).unwrap();

        let mechanism = tree.get(naming::MCH_STEERING).unwrap();
        let carrier = tree.get(naming::MCH_STEERING_ROTATION).unwrap();
        let handle = tree.get(naming::STEERING).unwrap();
        assert_eq!(carrier.head, mechanism.head);
        assert!((carrier.tail.y - (mechanism.tail.y + 1.0)).abs() < 1e-12);
        assert!(handle.head.y < geometry.min_y());
        assert_eq!(handle.parent.as_deref(), Some(naming::MCH_STEERING_ROTATION));

        let def_length = tree.get("DEF_Wheel_FL_0").unwrap().length();
        assert!((handle.head.y - (geometry.min_y() - 4.0 * def_length)).abs() < 1e-12);
    }

    #[test]
    fn test_axis_spans_right_to_left() {
        let rig = deform_rig(SEDAN, &[]);
        let scene = MemoryScene::new();
        let geometry = detect(&rig, &scene).unwrap();
        let tree = synthesize(&rig, &geometry, &scene).unwrap();

        let axis = tree.get(naming::MCH_AXIS_F).unwrap();
        assert_eq!(axis.head, tree.get("DEF_Wheel_FR_0").unwrap().head);
        assert_eq!(axis.tail, tree.get("DEF_Wheel_FL_0").unwrap().head);
    }

    #[test]
    fn test_one_sided_axle_is_mirrored() {
        let rig = deform_rig(&[("FL_0", DVec3::new(0.9, -2.0, 0.5)), ("BL_0", DVec3::new(0.9, 2.0, 0.5))], &[]);
        let scene = MemoryScene::new();
        let geometry = detect(&rig, &scene).unwrap();
        let tree = synthesize(&rig, &geometry, &scene).unwrap();

        let axis = tree.get(naming::MCH_AXIS_B).unwrap();
        let center = geometry.body_center().x;
        assert!((axis.head.x - (2.0 * center - 0.9)).abs() < 1e-12);
        assert_eq!(axis.tail, DVec3::new(0.9, 2.0, 0.5));
    }

    #[test]
    fn test_no_front_wheels_no_steering() {
        let rig = deform_rig(TRAILER, &[]);
        let scene = MemoryScene::new();
        let geometry = detect(&rig, &scene).unwrap();
        let tree = synthesize(&rig, &geometry, &scene).unwrap();

        assert!(!tree.contains(naming::STEERING));
        assert!(!tree.contains(naming::MCH_STEERING));
        assert!(!tree.contains(naming::MCH_STEERING_ROTATION));
        assert!(!tree.contains(naming::MCH_AXIS_F));
        assert!(tree.contains(naming::MCH_AXIS_B));
    }
}
