//! Path-follow setup: drives `Root` along a path object, then bakes.

use carrig_rig::set_ground;
use carrig_spec::naming;
use carrig_spec::{
    Axis, ChannelPath, Constraint, ConstraintKind, Curve, Keyframe, ScenePath, ShrinkwrapMode,
    SpecError, TrackAxis, Transform,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clear::{clear_baked, ClearOptions};
use crate::engine::{self, BakeState};
use crate::error::{BakeError, BakeResult};
use crate::host::BakeHost;
use crate::report::BakeReport;
use crate::steering::{bake_steering, SteeringBakeSettings};
use crate::wheels::{bake_wheels, WheelBakeSettings};

/// Name of the constraint placed on `Root`.
pub const FOLLOW_PATH_CONSTRAINT: &str = "Follow Path";

/// Setting keyed to move along the path.
pub const OFFSET_FACTOR: &str = "offset_factor";

/// Duration used by speed mode when the speed is not positive.
pub const DEFAULT_DURATION: i32 = 240;

fn default_true() -> bool {
    true
}

/// How the traversal is timed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PathTiming {
    /// Explicit frame range.
    Frames { start: i32, end: i32 },
    /// Constant speed in km/h; the end frame follows from the path length.
    Speed {
        start: i32,
        kmh: f64,
        /// Frames per second; the host's rate when omitted.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fps: Option<f64>,
    },
}

impl Default for PathTiming {
    fn default() -> Self {
        PathTiming::Frames {
            start: 1,
            end: 1 + DEFAULT_DURATION,
        }
    }
}

/// Parameters of the path-follow setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FollowPathOptions {
    /// Curve object to follow.
    pub path: String,
    /// Ground object assigned to every ground projection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground: Option<String>,
    #[serde(default)]
    pub timing: PathTiming,
    #[serde(default = "default_true")]
    pub bake_steering: bool,
    #[serde(default = "default_true")]
    pub bake_wheels: bool,
    #[serde(default = "default_true")]
    pub clear_previous: bool,
}

impl FollowPathOptions {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ground: None,
            timing: PathTiming::default(),
            bake_steering: true,
            bake_wheels: true,
            clear_previous: true,
        }
    }

    pub fn with_ground(mut self, ground: impl Into<String>) -> Self {
        self.ground = Some(ground.into());
        self
    }

    pub fn with_frames(mut self, start: i32, end: i32) -> Self {
        self.timing = PathTiming::Frames { start, end };
        self
    }

    pub fn with_speed(mut self, start: i32, kmh: f64, fps: Option<f64>) -> Self {
        self.timing = PathTiming::Speed { start, kmh, fps };
        self
    }

    pub fn with_bakes(mut self, steering: bool, wheels: bool) -> Self {
        self.bake_steering = steering;
        self.bake_wheels = wheels;
        self
    }

    pub fn with_clear_previous(mut self, clear: bool) -> Self {
        self.clear_previous = clear;
        self
    }
}

/// Last frame a speed-timed traversal may end on.
pub const MAX_FRAME: i32 = 1_048_574;

/// End frame of a traversal of `length` at `kmh`.
///
/// Fails when the traversal would end past [`MAX_FRAME`].
pub fn end_frame_from_speed(start: i32, length: f64, kmh: f64, fps: f64) -> BakeResult<i32> {
    let frames = if kmh <= 0.0 {
        f64::from(DEFAULT_DURATION)
    } else {
        (length / (kmh / 3.6) * fps).floor().max(1.0)
    };
    let end = f64::from(start) + frames;
    if !end.is_finite() || end > f64::from(MAX_FRAME) {
        return Err(BakeError::invalid_setting(
            "kmh",
            format!("traversal from frame {} ends past frame {}", start, MAX_FRAME),
        ));
    }
    Ok(end as i32)
}

fn resolve_timing(timing: PathTiming, length: f64, host_fps: f64) -> BakeResult<(i32, i32)> {
    let (start, end) = match timing {
        PathTiming::Frames { start, end } => (start, end),
        PathTiming::Speed { start, kmh, fps } => {
            let fps = fps.unwrap_or(host_fps);
            if !fps.is_finite() || fps <= 0.0 {
                return Err(BakeError::invalid_setting("fps", "must be positive"));
            }
            if !kmh.is_finite() {
                return Err(BakeError::invalid_setting("kmh", "must be finite"));
            }
            (start, end_frame_from_speed(start, length, kmh, fps)?)
        }
    };
    if start >= end {
        return Err(BakeError::InvalidRange { start, end });
    }
    Ok((start, end))
}

fn offset_channel() -> ChannelPath {
    ChannelPath::constraint(naming::ROOT, FOLLOW_PATH_CONSTRAINT, OFFSET_FACTOR)
}

/// Makes `Root` follow a path object and bakes the resulting motion.
///
/// Every precondition is checked before the host is touched; a failure
/// leaves it unchanged and cancels the report. Chained bakes that cancel
/// are reported as warnings.
pub fn setup_follow_path<H: BakeHost + ?Sized>(
    host: &mut H,
    options: &FollowPathOptions,
) -> BakeReport {
    let mut report = engine::start_report("follow_path");

    let prepared = (|| -> BakeResult<(i32, i32)> {
        let object = host
            .scene()
            .object(&options.path)
            .ok_or_else(|| SpecError::object_not_found(options.path.as_str()))?;
        let path = ScenePath::from_object(object).ok_or_else(|| {
            BakeError::invalid_setting("path", format!("'{}' is not a curve", options.path))
        })?;
        if !host.rig().has_node(naming::ROOT) {
            return Err(BakeError::missing_node(naming::ROOT));
        }
        if let Some(ground) = &options.ground {
            if host.scene().object(ground).is_none() {
                return Err(SpecError::object_not_found(ground.as_str()).into());
            }
        }
        resolve_timing(options.timing, path.length(), host.frame_rate())
    })();
    let (start, end) = match prepared {
        Ok(range) => range,
        Err(err) => {
            report.error(&err);
            return report.build();
        }
    };

    if let Err(err) = attach(host, options, start, end) {
        report.error(&err);
        return report.build();
    }
    let message = format!(
        "{} follows '{}' from frame {} to {}",
        naming::ROOT,
        options.path,
        start,
        end
    );
    info!("{}", message);
    report.info(message);
    report.keyframes(2);

    if options.clear_previous {
        report.merge(&clear_baked(host, &ClearOptions::new()));
    }
    if options.bake_steering {
        let rig = host.rig();
        if rig.has_node(naming::STEERING) && rig.has_node(naming::MCH_STEERING_ROTATION) {
            let settings = SteeringBakeSettings::new().with_range(start, end);
            report.merge(&bake_steering(host, &settings));
        } else {
            debug!("No steering nodes, steering bake skipped");
        }
    }
    if options.bake_wheels {
        let settings = WheelBakeSettings::new().with_range(start, end);
        report.merge(&bake_wheels(host, &settings));
    }
    report.state(BakeState::Done);
    report.build()
}

fn attach<H: BakeHost + ?Sized>(
    host: &mut H,
    options: &FollowPathOptions,
    start: i32,
    end: i32,
) -> BakeResult<()> {
    let action_name = format!("{}_Action", host.rig().name);
    let (rig, scene) = host.rig_and_scene();
    if let Some(ground) = &options.ground {
        set_ground(rig, scene, Some(ground), ShrinkwrapMode::Project)?;
    }
    let root = rig
        .node_mut(naming::ROOT)
        .ok_or_else(|| BakeError::missing_node(naming::ROOT))?;
    root.remove_constraint(FOLLOW_PATH_CONSTRAINT);
    root.constraints.push(Constraint::new(
        FOLLOW_PATH_CONSTRAINT,
        ConstraintKind::FollowPath {
            path: options.path.clone(),
            forward_axis: TrackAxis::Y,
            up_axis: Axis::Z,
            offset_factor: 0.0,
            use_fixed_location: true,
            use_curve_follow: true,
        },
    ));

    host.set_pose_basis(naming::ROOT, Transform::IDENTITY)?;
    host.ensure_action(&action_name).set_curve(Curve::from_keyframes(
        offset_channel(),
        [Keyframe::linear(start, 1.0), Keyframe::linear(end, 0.0)],
    ));
    debug!(path = %options.path, start, end, "Follow path attached");
    Ok(())
}

/// Removes the path constraint from `Root` and its keyed offset.
///
/// Returns true if anything was removed.
pub fn clear_follow_path<H: BakeHost + ?Sized>(host: &mut H) -> bool {
    let constraint = host
        .rig_mut()
        .node_mut(naming::ROOT)
        .is_some_and(|root| root.remove_constraint(FOLLOW_PATH_CONSTRAINT));
    let channel = host
        .action_mut()
        .is_some_and(|action| action.remove_curve(&offset_channel()));
    info!(constraint, channel, "Cleared follow path");
    constraint || channel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{AnimationStore, EditContext};
    use crate::memory::MemoryHost;
    use crate::report::ReportLevel;
    use carrig_spec::{MemoryScene, Node, Rig, SceneObject};
    use glam::DVec3;
    use pretty_assertions::assert_eq;

    fn host() -> MemoryHost {
        let mut rig = Rig::new("Car");
        rig.add_node(Node::new("Root", DVec3::ZERO, DVec3::new(0.0, 2.0, 0.0)))
            .unwrap();
        let scene = MemoryScene::new()
            .with_object(SceneObject::curve(
                "Road",
                vec![DVec3::new(0.0, -10.0, 0.0), DVec3::ZERO],
            ))
            .with_object(SceneObject::mesh("Ground", DVec3::ZERO, DVec3::new(50.0, 50.0, 0.0)));
        MemoryHost::new(rig, scene)
    }

    #[test]
    fn test_end_frame_from_speed() {
        // 36 km/h is 10 m/s: 100 m take 10 s.
        assert_eq!(end_frame_from_speed(1, 100.0, 36.0, 24.0).unwrap(), 241);
        assert_eq!(end_frame_from_speed(1, 0.001, 36.0, 24.0).unwrap(), 2);
        assert_eq!(end_frame_from_speed(5, 100.0, 0.0, 24.0).unwrap(), 245);
    }

    #[test]
    fn test_tiny_speed_is_rejected() {
        assert!(matches!(
            end_frame_from_speed(1, 10.0, 1e-9, 24.0),
            Err(BakeError::InvalidSetting { .. })
        ));
        let timing = PathTiming::Speed {
            start: 1,
            kmh: 1e-9,
            fps: Some(24.0),
        };
        assert!(matches!(
            resolve_timing(timing, 10.0, 24.0),
            Err(BakeError::InvalidSetting { .. })
        ));
        // The default duration cannot push a late start past the last frame.
        assert!(end_frame_from_speed(i32::MAX - 10, 10.0, 0.0, 24.0).is_err());
        assert_eq!(
            end_frame_from_speed(MAX_FRAME - 1, 0.001, 36.0, 24.0).unwrap(),
            MAX_FRAME
        );
    }

    #[test]
    fn test_setup_keys_offset_and_constraint() {
        let mut host = host();
        host.set_pose_basis("Root", Transform::from_location(DVec3::X))
            .unwrap();
        let options = FollowPathOptions::new("Road")
            .with_frames(1, 11)
            .with_bakes(false, false);
        let report = setup_follow_path(&mut host, &options);
        assert!(report.is_finished(), "{:?}", report.messages);

        let action = host.action().unwrap();
        assert_eq!(action.name, "Car_Action");
        let curve = action.curve(&offset_channel()).unwrap();
        assert_eq!(curve.keyframes[0], Keyframe::linear(1, 1.0));
        assert_eq!(curve.keyframes[1], Keyframe::linear(11, 0.0));
        assert_eq!(host.pose_basis("Root"), Transform::IDENTITY);
        assert!(host
            .rig
            .node("Root")
            .unwrap()
            .constraint(FOLLOW_PATH_CONSTRAINT)
            .is_some());

        // Replacing keeps a single constraint.
        setup_follow_path(&mut host, &options);
        assert_eq!(host.rig.node("Root").unwrap().constraints.len(), 1);
    }

    #[test]
    fn test_speed_mode_uses_host_rate() {
        let mut host = host().with_frame_rate(10.0);
        let options = FollowPathOptions::new("Road")
            .with_speed(1, 36.0, None)
            .with_bakes(false, false);
        setup_follow_path(&mut host, &options);
        let curve = host.action().unwrap().curve(&offset_channel()).unwrap();
        assert_eq!(curve.frame_range(), Some((1, 11)));
    }

    #[test]
    fn test_missing_objects_leave_host_unchanged() {
        let mut host = host();
        let before = host.clone();

        let report = setup_follow_path(&mut host, &FollowPathOptions::new("Nowhere"));
        assert!(report.is_cancelled());
        assert_eq!(report.messages[0].level, ReportLevel::Error);

        let report = setup_follow_path(&mut host, &FollowPathOptions::new("Ground"));
        assert!(report.is_cancelled());

        let options = FollowPathOptions::new("Road").with_ground("Lake");
        assert!(setup_follow_path(&mut host, &options).is_cancelled());
        assert_eq!(host, before);
    }

    #[test]
    fn test_missing_wheels_cancel_only_the_chained_bake() {
        let mut host = host();
        let options = FollowPathOptions::new("Road").with_frames(1, 11);
        let report = setup_follow_path(&mut host, &options);
        assert!(report.is_finished());
        assert!(report.find_code("BAKE_002").is_some());
        assert!(report
            .messages
            .iter()
            .any(|m| m.message == "bake_wheels was cancelled"));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut host = host();
        let options = FollowPathOptions::new("Road").with_bakes(false, false);
        setup_follow_path(&mut host, &options);
        assert!(clear_follow_path(&mut host));
        assert!(host.action().unwrap().curve(&offset_channel()).is_none());
        assert!(host.rig.node("Root").unwrap().constraints.is_empty());
        assert!(!clear_follow_path(&mut host));
    }

    #[test]
    fn test_options_document() {
        let options: FollowPathOptions = serde_json::from_str(
            r#"{"path": "Road", "timing": {"mode": "speed", "start": 1, "kmh": 50.0}}"#,
        )
        .unwrap();
        assert_eq!(options.timing, PathTiming::Speed { start: 1, kmh: 50.0, fps: None });
        assert!(options.bake_wheels);
    }
}
