//! Door and trunk hinges, only for meshes that were actually bound.

use carrig_spec::naming::{self, role};
use carrig_spec::{Axle, Corner, Node, SceneGraph, SceneObject};
use glam::DVec3;
use tracing::debug;

use super::Synthesizer;
use crate::error::RigResult;

/// Fallback offsets from the body center, per corner: (x, y).
const DOOR_OFFSETS: [(Corner, f64, f64); 4] = [
    (Corner::FRONT_LEFT, 0.8, 0.3),
    (Corner::FRONT_RIGHT, -0.8, 0.3),
    (Corner::BACK_LEFT, 0.8, -0.3),
    (Corner::BACK_RIGHT, -0.8, -0.3),
];

/// Name of the trunk hinge of an axle (`Trunk_F_0`).
pub fn trunk_name(axle: Axle) -> String {
    format!("{}_{}_0", role::TRUNK, axle.letter())
}

impl<S: SceneGraph + ?Sized> Synthesizer<'_, S> {
    /// Door hinges for every door vertex group present on a mesh.
    pub(super) fn doors(&mut self) -> RigResult<()> {
        for (corner, x_offset, y_offset) in DOOR_OFFSETS {
            let name = corner.suffix(0).name(role::DOOR);
            let bound = self
                .scene
                .objects()
                .into_iter()
                .any(|o| o.is_mesh() && o.vertex_groups.iter().any(|g| *g == name));
            if !bound {
                continue;
            }

            let (head, tail) = match self.matching_mesh(&name) {
                Some(mesh) => self.hinge_from_bounds(mesh),
                None => {
                    debug!(door = %name, "No door mesh, using body offsets");
                    let center = self.geometry.body_center();
                    let head = DVec3::new(center.x + x_offset, center.y + y_offset, center.z + 0.4);
                    let tail_y = head.y + if y_offset > 0.0 { 0.3 } else { -0.3 };
                    (head, DVec3::new(head.x, tail_y, center.z + 0.1))
                }
            };

            self.add(
                Node::new(&name, head, tail)
                    .with_deform(true)
                    .with_parent(naming::DEF_BODY),
            )?;
            let handle_head = tail + DVec3::new(0.0, 0.0, 0.1);
            self.add(
                Node::new(
                    corner.suffix(0).name(role::SHP_DOOR),
                    handle_head,
                    handle_head - DVec3::new(0.0, 0.0, 0.01),
                )
                .with_parent(&name),
            )?;
        }
        Ok(())
    }

    /// Trunk hinges for trunk meshes found in the scene.
    pub(super) fn trunks(&mut self) -> RigResult<()> {
        for axle in [Axle::Front, Axle::Back] {
            let name = trunk_name(axle);
            let Some(mesh) = self.matching_mesh(&name) else {
                continue;
            };
            let (high, low) = self.hinge_from_bounds(mesh);
            // The rear trunk hinges on the opposite face: swap ends, keep heights.
            let (head, tail) = match axle {
                Axle::Front => (high, low),
                Axle::Back => (
                    DVec3::new(low.x, low.y, high.z),
                    DVec3::new(high.x, high.y, low.z),
                ),
            };
            self.add(
                Node::new(&name, head, tail)
                    .with_deform(true)
                    .with_parent(naming::DEF_BODY),
            )?;
        }
        Ok(())
    }

    /// First mesh whose name contains `name`.
    fn matching_mesh(&self, name: &str) -> Option<&SceneObject> {
        self.scene
            .objects()
            .into_iter()
            .find(|o| o.is_mesh() && o.name.contains(name))
    }

    /// Hinge from a mesh box in rig space: head on the far Y face at its
    /// highest corner, tail on the near Y face at its lowest corner.
    fn hinge_from_bounds(&self, mesh: &SceneObject) -> (DVec3, DVec3) {
        let to_rig = self.scene.rig_matrix().inverse() * mesh.world_matrix();
        let corners: Vec<DVec3> = mesh
            .bound_corners()
            .into_iter()
            .map(|p| to_rig.transform_point3(p))
            .collect();
        if corners.is_empty() {
            let location = to_rig.transform_point3(DVec3::ZERO);
            return (location, location);
        }

        let count = corners.len() as f64;
        let center_x = corners.iter().map(|p| p.x).sum::<f64>() / count;
        let center_z = corners.iter().map(|p| p.z).sum::<f64>() / count;
        let max_y = corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        let min_y = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);

        const EPS: f64 = 1e-6;
        let head_z = corners
            .iter()
            .filter(|p| (p.y - max_y).abs() <= EPS)
            .map(|p| p.z)
            .reduce(f64::max)
            .unwrap_or(center_z);
        let tail_z = corners
            .iter()
            .filter(|p| (p.y - min_y).abs() <= EPS)
            .map(|p| p.z)
            .reduce(f64::min)
            .unwrap_or(center_z);

        let head = DVec3::new(center_x, max_y, head_z);
        let tail = DVec3::new(center_x, min_y, tail_z);
        if head.z < tail.z {
            (tail, head)
        } else {
            (head, tail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carrig_spec::{MemoryScene, SceneObject};

    use crate::detect::detect;
    use crate::synth::synthesize;
    use crate::test_support::{deform_rig, SEDAN};

    fn door_mesh(name: &str, location: DVec3) -> SceneObject {
        let mut mesh = SceneObject::mesh(name, location, DVec3::new(0.1, 1.0, 0.8));
        mesh.vertex_groups.push(name.to_string());
        mesh
    }

    #[test]
    fn test_doors_only_for_bound_meshes() {
        let rig = deform_rig(SEDAN, &[]);
        let scene = MemoryScene::new().with_object(door_mesh("Door_FL_0", DVec3::new(0.9, -0.5, 0.8)));
        let geometry = detect(&rig, &scene).unwrap();
        let tree = synthesize(&rig, &geometry, &scene).unwrap();

        assert!(tree.contains("Door_FL_0"));
        assert!(tree.contains("SHP_Door_FL_0"));
        assert!(!tree.contains("Door_FR_0"));

        let door = tree.get("Door_FL_0").unwrap();
        assert!(door.deform);
        assert_eq!(door.parent.as_deref(), Some(naming::DEF_BODY));
        assert!((door.head.y - 0.0).abs() < 1e-9);
        assert!((door.tail.y + 1.0).abs() < 1e-9);
        assert!((door.head.z - 1.2).abs() < 1e-9);
        assert!((door.tail.z - 0.4).abs() < 1e-9);

        let handle = tree.get("SHP_Door_FL_0").unwrap();
        assert!((handle.head.z - (door.tail.z + 0.1)).abs() < 1e-12);
    }

    #[test]
    fn test_door_fallback_without_named_mesh() {
        let rig = deform_rig(SEDAN, &[]);
        let mut body = SceneObject::mesh("Shell", DVec3::new(0.0, 0.0, 0.8), DVec3::new(2.0, 4.0, 1.0));
        body.vertex_groups.push("Door_BR_0".into());
        let scene = MemoryScene::new().with_object(body);
        let geometry = detect(&rig, &scene).unwrap();
        let tree = synthesize(&rig, &geometry, &scene).unwrap();

        let door = tree.get("Door_BR_0").unwrap();
        let center = geometry.body_center();
        assert!((door.head.x - (center.x - 0.8)).abs() < 1e-12);
        assert!((door.head.y - (center.y - 0.3)).abs() < 1e-12);
        assert!((door.tail.y - (door.head.y - 0.3)).abs() < 1e-12);
        assert!((door.tail.z - (center.z + 0.1)).abs() < 1e-12);
    }

    #[test]
    fn test_rear_trunk_swaps_ends() {
        let rig = deform_rig(SEDAN, &[]);
        let scene = MemoryScene::new()
            .with_object(SceneObject::mesh("Trunk_B_0", DVec3::new(0.0, 2.0, 1.0), DVec3::new(1.6, 0.6, 0.4)))
            .with_object(SceneObject::mesh("Trunk_F_0", DVec3::new(0.0, -2.0, 1.0), DVec3::new(1.6, 0.6, 0.4)));
        let geometry = detect(&rig, &scene).unwrap();
        let tree = synthesize(&rig, &geometry, &scene).unwrap();

        let front = tree.get("Trunk_F_0").unwrap();
        assert!(front.head.y > front.tail.y);
        assert!(front.head.z > front.tail.z);

        let back = tree.get("Trunk_B_0").unwrap();
        assert!((back.head.y - 1.7).abs() < 1e-9);
        assert!((back.tail.y - 2.3).abs() < 1e-9);
        assert!((back.head.z - 1.2).abs() < 1e-9);
        assert!((back.tail.z - 0.8).abs() < 1e-9);
    }
}
