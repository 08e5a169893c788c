//! Host scene snapshot: the objects surrounding a rig.
//!
//! [`SceneGraph`] is the query surface rig generation needs from a host;
//! [`MemoryScene`] is a serializable implementation used by the CLI and tests.

use glam::{DMat4, DVec3};
use serde::{Deserialize, Serialize};

use crate::error::{SpecError, SpecResult};
use crate::transform::Transform;

/// Kind-specific object data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum ObjectData {
    /// Mesh with its local-space bounds.
    Mesh { min: DVec3, max: DVec3 },
    /// Polyline path.
    Curve {
        points: Vec<DVec3>,
        #[serde(default)]
        cyclic: bool,
    },
    /// Instancer of a named object collection.
    Instance { collection: String },
    Empty,
}

/// What an object is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum ObjectParent {
    /// Another scene object.
    Object { name: String },
    /// A node of the rig.
    Node { name: String },
    /// The rig object itself; the object is skinned through vertex groups.
    Rig,
}

/// A scene object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    pub data: ObjectData,
    /// World transform. Members of an instanced collection store their
    /// transform relative to the instancer.
    #[serde(default)]
    pub matrix: Transform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ObjectParent>,
    /// Vertex groups used for skin binding.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vertex_groups: Vec<String>,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, data: ObjectData) -> Self {
        Self {
            name: name.into(),
            data,
            matrix: Transform::IDENTITY,
            parent: None,
            vertex_groups: Vec::new(),
        }
    }

    /// Axis-aligned mesh of size `dimensions` centered on `location`.
    pub fn mesh(name: impl Into<String>, location: DVec3, dimensions: DVec3) -> Self {
        let half = dimensions / 2.0;
        Self::new(name, ObjectData::Mesh { min: -half, max: half })
            .with_matrix(Transform::from_location(location))
    }

    /// Polyline path through `points`, given in world space.
    pub fn curve(name: impl Into<String>, points: Vec<DVec3>) -> Self {
        Self::new(
            name,
            ObjectData::Curve {
                points,
                cyclic: false,
            },
        )
    }

    pub fn with_matrix(mut self, matrix: Transform) -> Self {
        self.matrix = matrix;
        self
    }

    pub fn with_parent(mut self, parent: ObjectParent) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self.data, ObjectData::Mesh { .. })
    }

    pub fn world_matrix(&self) -> DMat4 {
        self.matrix.to_matrix()
    }

    pub fn location(&self) -> DVec3 {
        self.matrix.location
    }

    /// Local-space corners of the object's bounds; empty when it has none.
    pub fn bound_corners(&self) -> Vec<DVec3> {
        match &self.data {
            ObjectData::Mesh { min, max } => box_corners(*min, *max).to_vec(),
            ObjectData::Curve { points, .. } => {
                let Some(first) = points.first() else {
                    return Vec::new();
                };
                let (min, max) = points
                    .iter()
                    .fold((*first, *first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
                box_corners(min, max).to_vec()
            }
            ObjectData::Instance { .. } | ObjectData::Empty => Vec::new(),
        }
    }

    /// Scaled extents of the local bounds.
    pub fn dimensions(&self) -> DVec3 {
        match &self.data {
            ObjectData::Mesh { min, max } => (*max - *min) * self.matrix.scale.abs(),
            _ => DVec3::ZERO,
        }
    }
}

/// The eight corners of an axis-aligned box.
pub fn box_corners(min: DVec3, max: DVec3) -> [DVec3; 8] {
    [
        DVec3::new(min.x, min.y, min.z),
        DVec3::new(min.x, min.y, max.z),
        DVec3::new(min.x, max.y, max.z),
        DVec3::new(min.x, max.y, min.z),
        DVec3::new(max.x, min.y, min.z),
        DVec3::new(max.x, min.y, max.z),
        DVec3::new(max.x, max.y, max.z),
        DVec3::new(max.x, max.y, min.z),
    ]
}

/// Read access to the scene around a rig, plus the few edits generation makes.
pub trait SceneGraph {
    /// World matrix of the rig object.
    fn rig_matrix(&self) -> DMat4;

    fn object(&self, name: &str) -> Option<&SceneObject>;

    /// All objects in a stable order.
    fn objects(&self) -> Vec<&SceneObject>;

    /// Objects parented to a rig node.
    fn node_children(&self, node: &str) -> Vec<&SceneObject> {
        self.objects()
            .into_iter()
            .filter(|o| matches!(&o.parent, Some(ObjectParent::Node { name }) if name == node))
            .collect()
    }

    /// Objects parented to another object.
    fn object_children(&self, object: &str) -> Vec<&SceneObject> {
        self.objects()
            .into_iter()
            .filter(|o| matches!(&o.parent, Some(ObjectParent::Object { name }) if name == object))
            .collect()
    }

    /// Members of a named object collection.
    fn collection_objects(&self, collection: &str) -> Vec<&SceneObject>;

    /// Attaches an object to a rig node or another object.
    fn set_parent(&mut self, object: &str, parent: Option<ObjectParent>) -> SpecResult<()>;

    /// Adds a vertex group to an object when missing.
    fn add_vertex_group(&mut self, object: &str, group: &str) -> SpecResult<()>;

    /// Moves an object by a world-space offset.
    fn translate_object(&mut self, object: &str, offset: DVec3) -> SpecResult<()>;
}

/// Serializable scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryScene {
    /// World transform of the rig object.
    #[serde(default)]
    pub rig_transform: Transform,
    #[serde(default)]
    pub objects: Vec<SceneObject>,
    /// Collection name to member object names.
    #[serde(default)]
    pub collections: Vec<ObjectCollection>,
}

/// Named set of objects that instancers can reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectCollection {
    pub name: String,
    pub objects: Vec<String>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, object: SceneObject) -> Self {
        self.objects.push(object);
        self
    }

    pub fn add_object(&mut self, object: SceneObject) {
        self.objects.push(object);
    }

    pub fn add_collection(&mut self, name: impl Into<String>, objects: Vec<String>) {
        self.collections.push(ObjectCollection {
            name: name.into(),
            objects,
        });
    }

    fn object_mut(&mut self, name: &str) -> SpecResult<&mut SceneObject> {
        self.objects
            .iter_mut()
            .find(|o| o.name == name)
            .ok_or_else(|| SpecError::object_not_found(name))
    }
}

impl SceneGraph for MemoryScene {
    fn rig_matrix(&self) -> DMat4 {
        self.rig_transform.to_matrix()
    }

    fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    fn objects(&self) -> Vec<&SceneObject> {
        self.objects.iter().collect()
    }

    fn collection_objects(&self, collection: &str) -> Vec<&SceneObject> {
        self.collections
            .iter()
            .find(|c| c.name == collection)
            .map(|c| c.objects.iter().filter_map(|n| self.object(n)).collect())
            .unwrap_or_default()
    }

    fn set_parent(&mut self, object: &str, parent: Option<ObjectParent>) -> SpecResult<()> {
        self.object_mut(object)?.parent = parent;
        Ok(())
    }

    fn add_vertex_group(&mut self, object: &str, group: &str) -> SpecResult<()> {
        let object = self.object_mut(object)?;
        if !object.vertex_groups.iter().any(|g| g == group) {
            object.vertex_groups.push(group.to_string());
        }
        Ok(())
    }

    fn translate_object(&mut self, object: &str, offset: DVec3) -> SpecResult<()> {
        self.object_mut(object)?.matrix.location += offset;
        Ok(())
    }
}

// =============================================================================
// Paths
// =============================================================================

/// World-space polyline sampled from a curve object.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenePath {
    points: Vec<DVec3>,
}

impl ScenePath {
    /// Builds the path of a curve object; `None` for other kinds or fewer
    /// than two points.
    pub fn from_object(object: &SceneObject) -> Option<Self> {
        let ObjectData::Curve { points, cyclic } = &object.data else {
            return None;
        };
        if points.len() < 2 {
            return None;
        }
        let matrix = object.world_matrix();
        let mut world: Vec<DVec3> = points.iter().map(|p| matrix.transform_point3(*p)).collect();
        if *cyclic {
            world.push(world[0]);
        }
        Some(Self { points: world })
    }

    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    /// Total polyline length.
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    /// Position and unit tangent at a normalized distance along the path.
    pub fn sample(&self, factor: f64) -> (DVec3, DVec3) {
        let total = self.length();
        let first_tangent = (self.points[1] - self.points[0]).normalize_or_zero();
        if total <= 0.0 {
            return (self.points[0], first_tangent);
        }
        let mut remaining = factor.clamp(0.0, 1.0) * total;
        let mut tangent = first_tangent;
        for w in self.points.windows(2) {
            let segment = w[0].distance(w[1]);
            if segment <= 0.0 {
                continue;
            }
            tangent = (w[1] - w[0]) / segment;
            if remaining <= segment {
                return (w[0] + tangent * remaining, tangent);
            }
            remaining -= segment;
        }
        (self.points[self.points.len() - 1], tangent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mesh_corners_and_dimensions() {
        let mesh = SceneObject::mesh("Body", DVec3::new(0.0, 0.0, 0.5), DVec3::new(2.0, 4.0, 1.0));
        let corners = mesh.bound_corners();
        assert_eq!(corners.len(), 8);
        assert!(corners.contains(&DVec3::new(-1.0, -2.0, -0.5)));
        assert_eq!(mesh.dimensions(), DVec3::new(2.0, 4.0, 1.0));
    }

    #[test]
    fn test_node_children() {
        let scene = MemoryScene::new()
            .with_object(
                SceneObject::mesh("Wheel_FL_0", DVec3::ZERO, DVec3::ONE).with_parent(ObjectParent::Node {
                    name: "DEF_Wheel_FL_0".into(),
                }),
            )
            .with_object(SceneObject::mesh("Body", DVec3::ZERO, DVec3::ONE));
        let children: Vec<_> = scene
            .node_children("DEF_Wheel_FL_0")
            .iter()
            .map(|o| o.name.clone())
            .collect();
        assert_eq!(children, vec!["Wheel_FL_0".to_string()]);
    }

    #[test]
    fn test_set_parent_and_vertex_group() {
        let mut scene = MemoryScene::new().with_object(SceneObject::mesh("Door", DVec3::ZERO, DVec3::ONE));
        scene
            .set_parent("Door", Some(ObjectParent::Object { name: "Body".into() }))
            .unwrap();
        scene.add_vertex_group("Door", "Door_FL_0").unwrap();
        scene.add_vertex_group("Door", "Door_FL_0").unwrap();
        let door = scene.object("Door").unwrap();
        assert_eq!(door.vertex_groups, vec!["Door_FL_0".to_string()]);
        assert!(scene.set_parent("Missing", None).is_err());
    }

    #[test]
    fn test_path_length_and_sample() {
        let curve = SceneObject::curve(
            "Path",
            vec![DVec3::ZERO, DVec3::new(0.0, -6.0, 0.0), DVec3::new(4.0, -6.0, 0.0)],
        );
        let path = ScenePath::from_object(&curve).unwrap();
        assert_eq!(path.length(), 10.0);
        let (mid, tangent) = path.sample(0.3);
        assert!(mid.abs_diff_eq(DVec3::new(0.0, -3.0, 0.0), 1e-12));
        assert_eq!(tangent, DVec3::NEG_Y);
        let (end, tangent) = path.sample(1.0);
        assert!(end.abs_diff_eq(DVec3::new(4.0, -6.0, 0.0), 1e-12));
        assert_eq!(tangent, DVec3::X);
    }
}
