//! Bounding-box analysis of the geometry attached to rig anchor nodes.
//!
//! Scene objects parented to an anchor node are measured with their children
//! and with the members of any collection they instance. Points are expressed
//! in rig space so the boxes line up with node heads and tails.

use std::collections::BTreeSet;

use carrig_spec::{BoundingBox, NodeTree, ObjectData, SceneGraph, SceneObject, SpecResult};
use glam::{DMat4, DVec3};
use tracing::{debug, warn};

/// Computes the box of `anchor` and everything attached to it.
///
/// Falls back to [`BoundingBox::from_segment`] when no geometry is attached,
/// which happens for deformation rigs generated before any mesh exists.
pub fn compute<S: SceneGraph + ?Sized>(anchor: &str, nodes: &NodeTree, scene: &S) -> SpecResult<BoundingBox> {
    let node = nodes.require(anchor)?;
    let objects = scene.node_children(anchor);
    if objects.is_empty() {
        debug!(anchor, "No attached geometry, using segment box");
        return Ok(BoundingBox::from_segment(node.head, node.length()));
    }

    let mut walker = Walker {
        scene,
        points: Vec::new(),
        instancing: BTreeSet::new(),
    };
    walker.visit(scene.rig_matrix().inverse(), &objects);

    match BoundingBox::from_points(walker.points, node.head) {
        Some(bbox) => Ok(bbox),
        None => {
            debug!(anchor, "Attached objects have no bounds, using segment box");
            Ok(BoundingBox::from_segment(node.head, node.length()))
        }
    }
}

struct Walker<'a, S: SceneGraph + ?Sized> {
    scene: &'a S,
    points: Vec<DVec3>,
    /// Collections currently being expanded, to stop self-instancing loops.
    instancing: BTreeSet<String>,
}

impl<S: SceneGraph + ?Sized> Walker<'_, S> {
    fn visit(&mut self, parent_matrix: DMat4, objects: &[&SceneObject]) {
        for object in objects {
            let matrix = parent_matrix * object.world_matrix();
            if let ObjectData::Instance { collection } = &object.data {
                if self.instancing.insert(collection.clone()) {
                    let members = self.scene.collection_objects(collection);
                    self.visit(matrix, &members);
                    self.instancing.remove(collection);
                } else {
                    warn!(object = %object.name, collection = %collection, "Recursive collection instance skipped");
                }
            } else {
                self.points.extend(
                    object
                        .bound_corners()
                        .into_iter()
                        .map(|p| matrix.transform_point3(p)),
                );
            }
            let children = self.scene.object_children(&object.name);
            self.visit(parent_matrix, &children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carrig_spec::{MemoryScene, Node, ObjectParent, Transform};
    use pretty_assertions::assert_eq;

    fn tree() -> NodeTree {
        let mut nodes = NodeTree::new();
        nodes
            .insert(Node::new("DEF_Body", DVec3::ZERO, DVec3::new(0.0, 2.0, 0.0)))
            .unwrap();
        nodes
            .insert(Node::new(
                "DEF_Wheel_FL_0",
                DVec3::new(0.9, -1.5, 0.3),
                DVec3::new(0.9, -1.2, 0.3),
            ))
            .unwrap();
        nodes
    }

    fn attached(object: SceneObject, node: &str) -> SceneObject {
        object.with_parent(ObjectParent::Node { name: node.into() })
    }

    #[test]
    fn test_missing_anchor_fails() {
        let scene = MemoryScene::new();
        assert!(compute("DEF_Nothing", &tree(), &scene).is_err());
    }

    #[test]
    fn test_fallback_without_geometry() {
        let scene = MemoryScene::new();
        let bbox = compute("DEF_Wheel_FL_0", &tree(), &scene).unwrap();
        assert!((bbox.min_x - 0.75).abs() < 1e-9);
        assert!((bbox.max_z - 0.6).abs() < 1e-9);
        assert_eq!(bbox.center, DVec3::new(0.9, -1.5, 0.3));
    }

    #[test]
    fn test_mesh_and_children_are_measured() {
        let scene = MemoryScene::new()
            .with_object(attached(
                SceneObject::mesh("Body", DVec3::new(0.0, 0.0, 0.5), DVec3::new(2.0, 4.0, 1.0)),
                "DEF_Body",
            ))
            .with_object(
                SceneObject::mesh("Spoiler", DVec3::new(0.0, 2.5, 1.2), DVec3::new(1.0, 0.2, 0.2))
                    .with_parent(ObjectParent::Object { name: "Body".into() }),
            );
        let bbox = compute("DEF_Body", &tree(), &scene).unwrap();
        assert_eq!(bbox.min_x, -1.0);
        assert_eq!(bbox.max_x, 1.0);
        assert_eq!(bbox.min_y, -2.0);
        assert!((bbox.max_y - 2.6).abs() < 1e-9);
        assert!((bbox.max_z - 1.3).abs() < 1e-9);
        assert_eq!(bbox.center, DVec3::ZERO);
    }

    #[test]
    fn test_instanced_collection_is_measured() {
        let mut scene = MemoryScene::new()
            .with_object(attached(
                SceneObject::new(
                    "WheelInstance",
                    ObjectData::Instance {
                        collection: "WheelParts".into(),
                    },
                )
                .with_matrix(Transform::from_location(DVec3::new(0.9, -1.5, 0.3))),
                "DEF_Wheel_FL_0",
            ))
            .with_object(SceneObject::mesh("Tyre", DVec3::ZERO, DVec3::new(0.2, 0.6, 0.6)));
        scene.add_collection("WheelParts", vec!["Tyre".into()]);

        let bbox = compute("DEF_Wheel_FL_0", &tree(), &scene).unwrap();
        assert!((bbox.min_x - 0.8).abs() < 1e-9);
        assert!((bbox.max_x - 1.0).abs() < 1e-9);
        assert!((bbox.min_z - 0.0).abs() < 1e-9);
        assert!((bbox.max_z - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_self_instancing_collection_terminates() {
        let mut scene = MemoryScene::new()
            .with_object(attached(
                SceneObject::new(
                    "Loop",
                    ObjectData::Instance {
                        collection: "Loop".into(),
                    },
                ),
                "DEF_Body",
            ))
            .with_object(SceneObject::new(
                "Inner",
                ObjectData::Instance {
                    collection: "Loop".into(),
                },
            ));
        scene.add_collection("Loop", vec!["Inner".into()]);
        let bbox = compute("DEF_Body", &tree(), &scene).unwrap();
        // Nothing measurable: segment fallback.
        assert_eq!(bbox.max_y, 2.0);
    }

    #[test]
    fn test_points_are_in_rig_space() {
        let mut scene = MemoryScene::new().with_object(attached(
            SceneObject::mesh("Body", DVec3::new(10.0, 0.0, 0.5), DVec3::new(2.0, 4.0, 1.0)),
            "DEF_Body",
        ));
        scene.rig_transform = Transform::from_location(DVec3::new(10.0, 0.0, 0.0));
        let bbox = compute("DEF_Body", &tree(), &scene).unwrap();
        assert!((bbox.min_x + 1.0).abs() < 1e-9);
        assert!((bbox.max_x - 1.0).abs() < 1e-9);
    }
}
