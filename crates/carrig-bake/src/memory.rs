//! In-memory reference host.
//!
//! [`MemoryHost`] implements every host trait over plain serializable data
//! and doubles as the on-disk vehicle document used by the CLI. Its pose
//! evaluator is deliberately small: a node's local transform is its pose
//! basis overridden by keyed channels, and a `follow_path` constraint places
//! the node along a polyline path. Other constraints and drivers are not
//! evaluated.

use std::collections::BTreeMap;

use carrig_spec::{
    euler_xyz_to_quat, quat_to_euler_xyz, ChannelPath, Constraint, ConstraintKind, MemoryScene,
    Node, PoseChannel, Rig, SceneGraph, ScenePath, SpecError, TrackAxis, Transform,
};
use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::error::{BakeError, BakeResult};
use crate::host::{AnimationStore, BakeHost, EditContext, EditMode, PoseEvaluator};

fn default_frame_rate() -> f64 {
    24.0
}

/// A vehicle document: scene, rig, animation and interaction state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryHost {
    #[serde(default)]
    pub scene: MemoryScene,
    #[serde(default)]
    pub rig: Rig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    /// Pose basis per node; absent nodes are at rest.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub pose: BTreeMap<String, Transform>,
    /// Custom property values; absent properties read their default.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selection: Vec<String>,
    #[serde(default)]
    pub mode: EditMode,
    #[serde(default)]
    pub tweak_mode: bool,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
}

impl MemoryHost {
    pub fn new(rig: Rig, scene: MemoryScene) -> Self {
        Self {
            scene,
            rig,
            action: None,
            pose: BTreeMap::new(),
            properties: BTreeMap::new(),
            selection: Vec::new(),
            mode: EditMode::default(),
            tweak_mode: false,
            frame_rate: default_frame_rate(),
        }
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Parses a vehicle document.
    pub fn from_json(json: &str) -> BakeResult<Self> {
        serde_json::from_str(json).map_err(|e| SpecError::from(e).into())
    }

    /// Serializes the document as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> BakeResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SpecError::from(e).into())
    }

    fn require_node(&self, name: &str) -> BakeResult<&Node> {
        self.rig.node(name).ok_or_else(|| BakeError::missing_node(name))
    }

    fn keyed(&self, path: ChannelPath, frame: i32) -> Option<f64> {
        self.action.as_ref()?.evaluate(&path, frame as f64)
    }

    /// Overrides basis components with keyed pose channels.
    fn apply_keyed_channels(&self, node: &str, frame: i32, local: &mut Transform) {
        let key = |channel, index| self.keyed(ChannelPath::node(node, channel, index), frame);

        for i in 0..3 {
            if let Some(value) = key(PoseChannel::Location, i) {
                local.location[i] = value;
            }
            if let Some(value) = key(PoseChannel::Scale, i) {
                local.scale[i] = value;
            }
        }

        let q = local.rotation;
        let mut wxyz = [q.w, q.x, q.y, q.z];
        let mut keyed = false;
        for (i, component) in wxyz.iter_mut().enumerate() {
            if let Some(value) = key(PoseChannel::RotationQuaternion, i) {
                *component = value;
                keyed = true;
            }
        }
        if keyed {
            let q = DQuat::from_xyzw(wxyz[1], wxyz[2], wxyz[3], wxyz[0]);
            local.rotation = if q.length_squared() > 0.0 {
                q.normalize()
            } else {
                DQuat::IDENTITY
            };
        }

        let mut euler = quat_to_euler_xyz(local.rotation);
        let mut keyed = false;
        for i in 0..3 {
            if let Some(value) = key(PoseChannel::RotationEuler, i) {
                euler[i] = value;
                keyed = true;
            }
        }
        if keyed {
            local.rotation = euler_xyz_to_quat(euler);
        }
    }

    /// Places `node` along the path of a `follow_path` constraint.
    fn follow_path(
        &self,
        node: &Node,
        constraint: &Constraint,
        frame: i32,
        local: &mut Transform,
    ) -> BakeResult<()> {
        let ConstraintKind::FollowPath {
            path,
            forward_axis,
            offset_factor,
            use_curve_follow,
            ..
        } = &constraint.kind
        else {
            return Ok(());
        };
        let object = self
            .scene
            .object(path)
            .ok_or_else(|| SpecError::object_not_found(path.as_str()))?;
        let curve = ScenePath::from_object(object)
            .ok_or_else(|| BakeError::host(format!("'{}' is not a path", path)))?;
        let factor = self
            .keyed(
                ChannelPath::constraint(&node.name, &constraint.name, "offset_factor"),
                frame,
            )
            .unwrap_or(*offset_factor);

        let (position, tangent) = curve.sample(factor);
        let to_rig = self.scene.rig_matrix().inverse();
        local.location = to_rig.transform_point3(position) - node.head;
        if *use_curve_follow {
            if let Some(yaw) = yaw_towards(*forward_axis, to_rig.transform_vector3(tangent)) {
                local.rotation = DQuat::from_rotation_z(yaw);
            }
        }
        Ok(())
    }
}

/// Rotation about Z that turns `axis` onto the horizontal part of `tangent`.
fn yaw_towards(axis: TrackAxis, tangent: DVec3) -> Option<f64> {
    let forward = match axis {
        TrackAxis::X => DVec3::X,
        TrackAxis::Y => DVec3::Y,
        TrackAxis::NegativeX => DVec3::NEG_X,
        TrackAxis::NegativeY => DVec3::NEG_Y,
        TrackAxis::Z | TrackAxis::NegativeZ => return None,
    };
    let flat = DVec3::new(tangent.x, tangent.y, 0.0);
    if flat.length_squared() <= f64::EPSILON {
        return None;
    }
    Some(flat.y.atan2(flat.x) - forward.y.atan2(forward.x))
}

impl PoseEvaluator for MemoryHost {
    fn evaluate_local(&self, name: &str, frame: i32) -> BakeResult<Transform> {
        let node = self.require_node(name)?;
        let mut local = self.pose.get(name).copied().unwrap_or_default();
        self.apply_keyed_channels(name, frame, &mut local);

        for constraint in &node.constraints {
            self.follow_path(node, constraint, frame, &mut local)?;
        }
        Ok(local)
    }
}

impl AnimationStore for MemoryHost {
    fn action(&self) -> Option<&Action> {
        self.action.as_ref()
    }

    fn action_mut(&mut self) -> Option<&mut Action> {
        self.action.as_mut()
    }

    fn ensure_action(&mut self, name: &str) -> &mut Action {
        self.action.get_or_insert_with(|| Action::new(name))
    }

    fn property_value(&self, name: &str) -> Option<f64> {
        self.properties
            .get(name)
            .copied()
            .or_else(|| self.rig.property(name).map(|p| p.default))
    }

    fn set_property_value(&mut self, name: &str, value: f64) -> BakeResult<()> {
        let value = match self.rig.property(name) {
            Some(property) => property.clamp(value),
            None => {
                return Err(SpecError::invalid_property(name, "not defined on the rig").into());
            }
        };
        self.properties.insert(name.to_string(), value);
        Ok(())
    }
}

impl EditContext for MemoryHost {
    fn mode(&self) -> EditMode {
        self.mode
    }

    fn set_mode(&mut self, mode: EditMode) {
        self.mode = mode;
    }

    fn selection(&self) -> Vec<String> {
        self.selection.clone()
    }

    fn select(&mut self, nodes: &[String]) -> BakeResult<()> {
        if let Some(missing) = nodes.iter().find(|n| !self.rig.has_node(n)) {
            return Err(BakeError::missing_node(missing.as_str()));
        }
        self.selection = nodes.to_vec();
        Ok(())
    }

    fn pose_basis(&self, node: &str) -> Transform {
        self.pose.get(node).copied().unwrap_or_default()
    }

    fn set_pose_basis(&mut self, node: &str, basis: Transform) -> BakeResult<()> {
        self.require_node(node)?;
        if basis == Transform::IDENTITY {
            self.pose.remove(node);
        } else {
            self.pose.insert(node.to_string(), basis);
        }
        Ok(())
    }

    fn tweak_mode(&self) -> bool {
        self.tweak_mode
    }

    fn set_tweak_mode(&mut self, enabled: bool) {
        self.tweak_mode = enabled;
    }
}

impl BakeHost for MemoryHost {
    fn rig(&self) -> &Rig {
        &self.rig
    }

    fn rig_mut(&mut self) -> &mut Rig {
        &mut self.rig
    }

    fn scene(&self) -> &dyn SceneGraph {
        &self.scene
    }

    fn rig_and_scene(&mut self) -> (&mut Rig, &dyn SceneGraph) {
        (&mut self.rig, &self.scene)
    }

    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }
}
