//! Steering baking.
//!
//! The path followed by `MCH_SteeringRotation` is projected onto its own
//! forward and side axes: the lateral drift of a motion step stretched to
//! the axle offset gives the steering displacement keyed on
//! `SteeringRotation`.

use carrig_spec::naming::{self, property};
use carrig_spec::{ChannelPath, Curve, Keyframe, RotationMode};
use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::{self, resolve_range, BakePlan, BAKE_GROUP};
use crate::error::{BakeError, BakeResult};
use crate::host::BakeHost;
use crate::report::BakeReport;
use crate::wheels::clear_property;

/// Lowest accepted rotation factor.
pub const MIN_ROTATION_FACTOR: f64 = 0.1;

/// Floor applied to the tolerance when deriving the motion threshold.
const MIN_DISTANCE_TOLERANCE: f64 = 0.001;

fn default_rotation_factor() -> f64 {
    1.0
}

fn default_keyframe_tolerance() -> f64 {
    0.01
}

/// Parameters of the steering bake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SteeringBakeSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_start: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_end: Option<i32>,
    /// Multiplier of the steering displacement.
    #[serde(default = "default_rotation_factor")]
    pub rotation_factor: f64,
    #[serde(default = "default_keyframe_tolerance")]
    pub keyframe_tolerance: f64,
}

impl Default for SteeringBakeSettings {
    fn default() -> Self {
        Self {
            frame_start: None,
            frame_end: None,
            rotation_factor: default_rotation_factor(),
            keyframe_tolerance: default_keyframe_tolerance(),
        }
    }
}

impl SteeringBakeSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, start: i32, end: i32) -> Self {
        self.frame_start = Some(start);
        self.frame_end = Some(end);
        self
    }

    pub fn with_rotation_factor(mut self, factor: f64) -> Self {
        self.rotation_factor = factor;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.keyframe_tolerance = tolerance;
        self
    }

    pub fn validate(&self) -> BakeResult<()> {
        if !self.rotation_factor.is_finite() || self.rotation_factor < MIN_ROTATION_FACTOR {
            return Err(BakeError::invalid_setting(
                "rotation_factor",
                format!("must be at least {}", MIN_ROTATION_FACTOR),
            ));
        }
        if !self.keyframe_tolerance.is_finite() || self.keyframe_tolerance < 0.0 {
            return Err(BakeError::invalid_setting(
                "keyframe_tolerance",
                "must be a finite value of at least 0",
            ));
        }
        Ok(())
    }
}

/// One sampled frame of `MCH_SteeringRotation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringSample {
    pub location: DVec3,
    pub rotation: DQuat,
}

/// Derives steering keys from per-frame samples.
///
/// `samples[i]` belongs to frame `start + i`; frames `start` up to but
/// excluding `end - 1` are examined. `offset` is the distance between the
/// steering handle and the rotation carrier along Y.
pub fn derive_steering(
    start: i32,
    samples: &[SteeringSample],
    forward: DVec3,
    offset: f64,
    rotation_factor: f64,
    tolerance: f64,
) -> Vec<Keyframe> {
    let Some(first) = samples.first() else {
        return Vec::new();
    };
    let end = start + samples.len() as i32 - 1;
    let distance_threshold = (offset * tolerance.max(MIN_DISTANCE_TOLERANCE)).powi(2);
    let steering_threshold = offset * tolerance * 0.1;

    let mut keys = Vec::new();
    let mut current = first.location;
    let mut previous: Option<f64> = None;

    for frame in start..end - 1 {
        let index = (frame - start) as usize;
        let next = samples[index + 1].location;
        let mut motion = next - current;
        if motion.length_squared() < distance_threshold {
            continue;
        }

        let rotation = samples[index].rotation;
        let direction = rotation * forward;
        let normal = rotation * DVec3::X;
        let longitudinal = motion.dot(direction);
        if longitudinal == 0.0 {
            continue;
        }

        motion *= offset * rotation_factor / longitudinal;
        let displacement = distance_to_plane(motion, direction, normal);
        if previous.is_some_and(|p| (displacement - p).abs() < steering_threshold) {
            continue;
        }

        keys.push(Keyframe::linear(frame, displacement));
        current = next;
        previous = Some(displacement);
    }
    keys
}

/// Signed distance from `point` to the plane through `origin` with `normal`.
fn distance_to_plane(point: DVec3, origin: DVec3, normal: DVec3) -> f64 {
    (point - origin).dot(normal.normalize_or_zero())
}

/// Bakes `SteeringRotation` from the motion of the steering carrier.
pub fn bake_steering<H: BakeHost + ?Sized>(
    host: &mut H,
    settings: &SteeringBakeSettings,
) -> BakeReport {
    let mut report = engine::start_report("bake_steering");

    let prepared = (|| -> BakeResult<((i32, i32), f64, DVec3)> {
        settings.validate()?;
        if host.action().is_none() {
            return Err(BakeError::NoAnimation);
        }
        let range = resolve_range(&*host, settings.frame_start, settings.frame_end)?;
        let rig = host.rig();
        let (Some(steering), Some(carrier)) = (
            rig.node(naming::STEERING),
            rig.node(naming::MCH_STEERING_ROTATION),
        ) else {
            return Err(BakeError::no_targets("steering bones"));
        };
        let offset = (steering.head.y - carrier.head.y).abs();
        Ok((range, offset, carrier.forward()))
    })();
    let ((start, end), offset, forward) = match prepared {
        Ok(prepared) => prepared,
        Err(err) => {
            report.error(&err);
            return report.build();
        }
    };

    clear_property(host, property::STEERING_ROTATION);
    if let Some(carrier) = host.rig_mut().node_mut(naming::MCH_STEERING_ROTATION) {
        carrier.rotation_mode = RotationMode::Quaternion;
    }

    let carrier = naming::MCH_STEERING_ROTATION.to_string();
    let plan = BakePlan {
        nodes: vec![carrier.clone()],
        reset: vec![carrier.clone()],
        start,
        end,
    };

    engine::run(host, &plan, &mut report, |baked, report| {
        let samples: Vec<SteeringSample> = baked
            .require(&carrier)?
            .iter()
            .map(|t| SteeringSample {
                location: t.location,
                rotation: t.rotation,
            })
            .collect();
        let keys = derive_steering(
            start,
            &samples,
            forward,
            offset,
            settings.rotation_factor,
            settings.keyframe_tolerance,
        );
        let message = format!("Created {} steering keyframes", keys.len());
        info!("{}", message);
        report.info(message);
        Ok(vec![Curve::from_keyframes(
            ChannelPath::property(property::STEERING_ROTATION),
            keys,
        )
        .with_group(BAKE_GROUP)])
    });
    report.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::host::AnimationStore;
    use crate::memory::MemoryHost;
    use carrig_spec::{CustomProperty, MemoryScene, Node, PoseChannel, Rig};
    use pretty_assertions::assert_eq;

    fn along(points: &[(f64, f64)]) -> Vec<SteeringSample> {
        points
            .iter()
            .map(|(x, y)| SteeringSample {
                location: DVec3::new(*x, *y, 0.0),
                rotation: DQuat::IDENTITY,
            })
            .collect()
    }

    #[test]
    fn test_settings() {
        let settings: SteeringBakeSettings = serde_json::from_str(r#"{"rotation_factor": 2.0}"#).unwrap();
        assert_eq!(settings.rotation_factor, 2.0);
        assert_eq!(settings.keyframe_tolerance, 0.01);
        assert!(settings.validate().is_ok());
        assert!(SteeringBakeSettings::new()
            .with_rotation_factor(0.05)
            .validate()
            .is_err());
    }

    #[test]
    fn test_straight_motion_has_no_displacement() {
        let points: Vec<(f64, f64)> = (0..6).map(|i| (0.0, -(i as f64))).collect();
        let keys = derive_steering(1, &along(&points), DVec3::NEG_Y, 2.0, 1.0, 0.01);
        // Frames 1 to 4 are examined; identical values after the first are dropped.
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].frame, 1);
        assert!(keys[0].value.abs() < 1e-12);
    }

    #[test]
    fn test_lateral_drift_is_scaled_to_offset() {
        let points = [(0.0, 0.0), (0.5, -1.0), (1.0, -2.0), (1.5, -3.0)];
        let keys = derive_steering(1, &along(&points), DVec3::NEG_Y, 2.0, 1.0, 0.01);
        assert_eq!(keys.len(), 1);
        // Step (0.5, -1) stretched to 2 along the forward axis.
        assert!((keys[0].value - 1.0).abs() < 1e-12);

        let doubled = derive_steering(1, &along(&points), DVec3::NEG_Y, 2.0, 2.0, 0.01);
        assert!((doubled[0].value - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_stationary_frames_skipped() {
        let points = [(0.0, 0.0), (0.0, 0.0), (0.0, 0.0), (1.0, -1.0), (1.0, -1.0)];
        let keys = derive_steering(10, &along(&points), DVec3::NEG_Y, 1.0, 1.0, 0.01);
        let frames: Vec<i32> = keys.iter().map(|k| k.frame).collect();
        assert_eq!(frames, vec![12]);
    }

    fn host(with_steering: bool) -> MemoryHost {
        let mut rig = Rig::new("Car");
        rig.add_node(Node::new("Root", DVec3::ZERO, DVec3::Y)).unwrap();
        rig.add_node(Node::new(
            naming::MCH_STEERING_ROTATION,
            DVec3::new(0.0, -1.0, 0.5),
            DVec3::new(0.0, 0.0, 0.5),
        ))
        .unwrap();
        if with_steering {
            rig.add_node(Node::new(
                naming::STEERING,
                DVec3::new(0.0, -3.0, 0.5),
                DVec3::new(0.0, -3.5, 0.5),
            ))
            .unwrap();
        }
        rig.define_property(CustomProperty::steering_rotation());
        MemoryHost::new(rig, MemoryScene::new()).with_action(Action::new("Car_Action"))
    }

    fn key_location(host: &mut MemoryHost, frame: i32, location: DVec3) {
        let action = host.ensure_action("Car_Action");
        for (index, value) in location.to_array().into_iter().enumerate() {
            action.insert_keyframe(
                &ChannelPath::node(naming::MCH_STEERING_ROTATION, PoseChannel::Location, index),
                Keyframe::linear(frame, value),
            );
        }
    }

    #[test]
    fn test_bake_writes_steering_curve() {
        let mut host = host(true);
        key_location(&mut host, 1, DVec3::ZERO);
        key_location(&mut host, 11, DVec3::new(5.0, -10.0, 0.0));
        let before = host.clone();

        let report = bake_steering(&mut host, &SteeringBakeSettings::new());
        assert!(report.is_finished(), "{:?}", report.messages);

        let curve = host
            .action
            .as_ref()
            .unwrap()
            .curve(&ChannelPath::property(property::STEERING_ROTATION))
            .unwrap();
        assert_eq!(curve.group.as_deref(), Some(BAKE_GROUP));
        // Constant drift of 0.5 per unit forward, stretched to an offset of 2.
        assert_eq!(curve.len(), 1);
        assert!((curve.keyframes[0].value - 1.0).abs() < 1e-9);
        assert_eq!(host.selection, before.selection);
        assert_eq!(host.pose, before.pose);
        assert_eq!(
            host.rig.node(naming::MCH_STEERING_ROTATION).unwrap().rotation_mode,
            RotationMode::Quaternion
        );
    }

    #[test]
    fn test_bake_without_steering_nodes_is_cancelled() {
        let mut host = host(false);
        key_location(&mut host, 1, DVec3::ZERO);
        key_location(&mut host, 11, DVec3::new(0.0, -10.0, 0.0));
        let before = host.clone();

        let report = bake_steering(&mut host, &SteeringBakeSettings::new());
        assert!(report.is_cancelled());
        assert!(report.find_code("BAKE_002").is_some());
        assert_eq!(host, before);
    }

    #[test]
    fn test_sideways_motion_skipped() {
        let points = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)];
        assert!(derive_steering(1, &along(&points), DVec3::NEG_Y, 1.0, 1.0, 0.01).is_empty());
    }
}
