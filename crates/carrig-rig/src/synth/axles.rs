//! Root, drift and ground-sensing axle chains.

use carrig_spec::naming;
use carrig_spec::{Node, SceneGraph};
use glam::DVec3;

use super::{along_y, with_z, Synthesizer};
use crate::error::RigResult;

impl<S: SceneGraph + ?Sized> Synthesizer<'_, S> {
    /// Creates `Root`, `Drift` and the axle chains. Returns the name of the
    /// node the per-wheel chains hang from.
    pub(super) fn axles(&mut self) -> RigResult<String> {
        let geometry = self.geometry;
        let front = geometry.wheels_front_position();
        let back = geometry.wheels_back_position();
        let length = geometry.length();
        let width = geometry.width();

        let root_head = with_z(back, 0.0);
        let root = Node::new(
            naming::ROOT,
            root_head,
            along_y(root_head, (length / 1.95).max(width * 1.1)),
        );
        let root_length = root.length();
        self.add(root)?;

        let shape_head = with_z(geometry.car_center(), 0.01);
        self.add(
            Node::new(naming::SHP_ROOT, shape_head, along_y(shape_head, root_length))
                .with_parent(naming::ROOT),
        )?;

        // The front chain stays on Root so drift animation never moves the
        // front ground sensing.
        if geometry.has_front_wheels() {
            self.axle_chain(
                [
                    naming::GROUND_SENSOR_AXLE_F,
                    naming::SHP_GROUND_SENSOR_AXLE_F,
                    naming::MCH_ROOT_AXLE_F,
                ],
                front,
                0.001,
                naming::ROOT,
            )?;
        }

        let drift_parent = if geometry.has_front_wheels() && !geometry.has_back_wheels() {
            naming::MCH_ROOT_AXLE_F
        } else {
            naming::ROOT
        };
        let drift_head = with_z(front, back.z);
        let drift = Node::new(naming::DRIFT, drift_head, along_y(drift_head, -width * 0.95))
            .with_roll(std::f64::consts::PI)
            .with_parent(drift_parent);
        let drift_length = drift.length();
        self.add(drift)?;

        let mut base = naming::DRIFT;
        if geometry.has_back_wheels() {
            self.axle_chain(
                [
                    naming::GROUND_SENSOR_AXLE_B,
                    naming::SHP_GROUND_SENSOR_AXLE_B,
                    naming::MCH_ROOT_AXLE_B,
                ],
                back,
                0.0,
                naming::DRIFT,
            )?;
            base = naming::MCH_ROOT_AXLE_B;
        }

        let mut drift_shape_head = geometry.body_center();
        drift_shape_head.y = geometry.max_y() + drift_length * 0.2;
        drift_shape_head.z = back.z;
        self.add(
            Node::new(
                naming::SHP_DRIFT,
                drift_shape_head,
                along_y(drift_shape_head, drift_length),
            )
            .with_parent(base),
        )?;

        Ok(base.to_string())
    }

    /// Sensor, display handle and mechanism root of one axle.
    fn axle_chain(
        &mut self,
        [sensor, handle, mechanism]: [&str; 3],
        position: DVec3,
        mechanism_z: f64,
        parent: &str,
    ) -> RigResult<()> {
        let length = self.geometry.length();
        let tail = along_y(position, length / 16.0);

        self.add(Node::new(sensor, position, tail).with_parent(parent))?;
        self.add(
            Node::new(handle, with_z(position, 0.001), with_z(tail, 0.001)).with_parent(sensor),
        )?;

        let mechanism_head = with_z(position, mechanism_z);
        self.add(
            Node::new(
                mechanism,
                mechanism_head,
                along_y(mechanism_head, length / 6.0),
            )
            .with_parent(sensor),
        )
    }
}
