//! Host contracts consumed by the baking engine.
//!
//! A host owns the live scene: it evaluates poses, stores animation and
//! tracks selection and edit state. The engine only talks to it through
//! these traits, so any application embedding the rig can drive a bake.

use carrig_spec::{Rig, SceneGraph, Transform};
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::error::BakeResult;

/// Interaction mode of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    #[default]
    Object,
    Pose,
    Edit,
}

/// Full rig evaluation at arbitrary frames.
pub trait PoseEvaluator {
    /// Local transform of `node` at `frame` with every constraint, driver
    /// and keyed channel resolved (visual keying).
    fn evaluate_local(&self, node: &str, frame: i32) -> BakeResult<Transform>;
}

/// Animation storage and custom property values.
pub trait AnimationStore {
    /// The rig's animation container, if one exists.
    fn action(&self) -> Option<&Action>;

    fn action_mut(&mut self) -> Option<&mut Action>;

    /// Returns the animation container, creating it as `name` when missing.
    fn ensure_action(&mut self, name: &str) -> &mut Action;

    /// Current value of a custom property.
    fn property_value(&self, name: &str) -> Option<f64>;

    fn set_property_value(&mut self, name: &str, value: f64) -> BakeResult<()>;
}

/// Selection, mode and pose-basis state the engine must leave untouched.
pub trait EditContext {
    fn mode(&self) -> EditMode;

    fn set_mode(&mut self, mode: EditMode);

    /// Selected node names.
    fn selection(&self) -> Vec<String>;

    /// Replaces the selection.
    fn select(&mut self, nodes: &[String]) -> BakeResult<()>;

    /// Unevaluated local transform of a node; identity when at rest.
    fn pose_basis(&self, node: &str) -> Transform;

    fn set_pose_basis(&mut self, node: &str, basis: Transform) -> BakeResult<()>;

    /// Whether an animation layer is being edited in place.
    fn tweak_mode(&self) -> bool;

    fn set_tweak_mode(&mut self, enabled: bool);
}

/// Everything a bake needs from the host.
pub trait BakeHost: PoseEvaluator + AnimationStore + EditContext {
    fn rig(&self) -> &Rig;

    fn rig_mut(&mut self) -> &mut Rig;

    fn scene(&self) -> &dyn SceneGraph;

    /// Mutable rig alongside the scene, for edits that read scene objects.
    fn rig_and_scene(&mut self) -> (&mut Rig, &dyn SceneGraph);

    /// Playback rate in frames per second.
    fn frame_rate(&self) -> f64;
}
