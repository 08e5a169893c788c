//! Wheel spin baking.
//!
//! The distance travelled by the rig root, scaled by the brake factor and
//! signed by the wheel's orientation, is turned into an accumulated
//! rotation per wheel and written to its `WheelRotation_*` property.

use carrig_spec::naming::{self, property, role};
use carrig_spec::{ChannelPath, Corner, Curve, Keyframe, Rig, WheelSuffix};
use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::{self, resolve_range, BakePlan, BAKE_GROUP};
use crate::error::{BakeError, BakeResult};
use crate::host::BakeHost;
use crate::report::BakeReport;
use crate::sample::BakedAction;

/// Relative change of angular speed that forces a keyframe.
pub const SPEED_CHANGE_THRESHOLD: f64 = 0.1;

fn default_keyframe_tolerance() -> f64 {
    0.01
}

/// Parameters of the wheel rotation bake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WheelBakeSettings {
    /// First frame; defaults to the start of the animation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_start: Option<i32>,
    /// Last frame; defaults to the end of the animation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_end: Option<i32>,
    /// Accumulated rotation (radians) after which a keyframe is emitted.
    #[serde(default = "default_keyframe_tolerance")]
    pub keyframe_tolerance: f64,
}

impl Default for WheelBakeSettings {
    fn default() -> Self {
        Self {
            frame_start: None,
            frame_end: None,
            keyframe_tolerance: default_keyframe_tolerance(),
        }
    }
}

impl WheelBakeSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, start: i32, end: i32) -> Self {
        self.frame_start = Some(start);
        self.frame_end = Some(end);
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.keyframe_tolerance = tolerance;
        self
    }

    pub fn validate(&self) -> BakeResult<()> {
        if !self.keyframe_tolerance.is_finite() || self.keyframe_tolerance < 0.0 {
            return Err(BakeError::invalid_setting(
                "keyframe_tolerance",
                "must be a finite value of at least 0",
            ));
        }
        Ok(())
    }
}

/// A wheel control and everything its bake reads.
#[derive(Debug, Clone, PartialEq)]
pub struct WheelTarget {
    pub suffix: WheelSuffix,
    /// The `Wheel_*` control.
    pub wheel: String,
    /// Node whose Y scale gives the brake factor.
    pub brake: String,
    /// Output property (`WheelRotation_*`).
    pub property: String,
    /// Wheel control length, or 1 when degenerate.
    pub radius: f64,
    /// Rest forward vector of the wheel control.
    pub forward: DVec3,
}

/// Finds the brake paired with a wheel.
///
/// Lookup order: `Brake` on the same side, then the other side, then
/// `MCH_Brake` on the same and other side, then the index-0 `Brake` of the
/// axle, and finally the wheel control itself.
pub fn pair_brake(rig: &Rig, suffix: WheelSuffix) -> String {
    let other = suffix.mirrored();
    let mut candidates = vec![
        suffix.name(role::BRAKE),
        other.name(role::BRAKE),
        suffix.name(role::MCH_BRAKE),
        other.name(role::MCH_BRAKE),
    ];
    if suffix.index > 0 {
        let first = suffix.corner.suffix(0);
        candidates.push(first.name(role::BRAKE));
        candidates.push(first.mirrored().name(role::BRAKE));
    }
    candidates
        .into_iter()
        .find(|name| rig.has_node(name))
        .unwrap_or_else(|| suffix.name(role::WHEEL))
}

/// Wheel controls of every corner, front-left first.
pub fn find_wheel_targets(rig: &Rig) -> Vec<WheelTarget> {
    Corner::ALL
        .iter()
        .flat_map(|corner| naming::scan_corner(role::WHEEL, *corner, |n| rig.has_node(n)))
        .filter_map(|suffix| {
            let wheel = rig.node(&suffix.name(role::WHEEL))?;
            let length = wheel.length();
            Some(WheelTarget {
                suffix,
                wheel: wheel.name.clone(),
                brake: pair_brake(rig, suffix),
                property: suffix.rotation_property(),
                radius: if length > 0.0 { length } else { 1.0 },
                forward: wheel.forward(),
            })
        })
        .collect()
}

/// One sampled frame of a wheel bake.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelSample {
    /// Root location, the proxy for distance travelled.
    pub root_location: DVec3,
    /// Wheel control rotation.
    pub rotation: DQuat,
    /// Y scale of the paired brake.
    pub brake_scale_y: f64,
}

impl WheelSample {
    /// A sample of straight unbraked motion.
    pub fn moving(root_location: DVec3) -> Self {
        Self {
            root_location,
            rotation: DQuat::IDENTITY,
            brake_scale_y: 1.0,
        }
    }
}

/// Derives accumulated wheel rotation keys from per-frame samples.
///
/// `samples[i]` belongs to frame `start + i`. Keys are emitted at both ends
/// of the range, on both sides of every start or stop, when the
/// accumulated rotation since the last key reaches `tolerance`, and when
/// the angular speed changes by more than 10 % from the previous frame.
///
/// Comparing with the previous frame rather than the last emitted key keeps
/// the decimation monotonic: a coarser tolerance never adds keys.
pub fn derive_rotation(
    start: i32,
    samples: &[WheelSample],
    forward: DVec3,
    radius: f64,
    tolerance: f64,
) -> Vec<Keyframe> {
    let Some(first) = samples.first() else {
        return Vec::new();
    };
    let end = start + samples.len() as i32 - 1;
    let mut keys = vec![Keyframe::linear(start, 0.0)];

    let mut previous_position = first.root_location;
    let mut previous_speed = 0.0_f64;
    let mut accumulated = 0.0_f64;
    let mut last_key_value = 0.0_f64;

    for (frame, sample) in (start + 1..).zip(&samples[1..]) {
        let motion = (sample.root_location - previous_position) * (2.0 * sample.brake_scale_y - 1.0);
        let orientation = sample.rotation * forward;
        let speed = motion.length().copysign(orientation.dot(motion));
        let angular_speed = speed / radius;
        let before = accumulated;
        accumulated += angular_speed;

        let transition = (angular_speed == 0.0) != (previous_speed == 0.0);
        let speed_changed = previous_speed != 0.0
            && angular_speed != 0.0
            && (1.0 - previous_speed / angular_speed).abs() > SPEED_CHANGE_THRESHOLD;

        if transition && keys.last().is_some_and(|k| k.frame != frame - 1) {
            keys.push(Keyframe::linear(frame - 1, before));
            last_key_value = before;
        }
        if frame == end
            || transition
            || speed_changed
            || (accumulated - last_key_value).abs() >= tolerance
        {
            keys.push(Keyframe::linear(frame, accumulated));
            last_key_value = accumulated;
        }

        previous_speed = angular_speed;
        previous_position = sample.root_location;
    }
    keys
}

/// Bakes the rotation of every wheel control.
pub fn bake_wheels<H: BakeHost + ?Sized>(host: &mut H, settings: &WheelBakeSettings) -> BakeReport {
    let mut report = engine::start_report("bake_wheels");

    let prepared = (|| -> BakeResult<((i32, i32), Vec<WheelTarget>)> {
        settings.validate()?;
        if host.action().is_none() {
            return Err(BakeError::NoAnimation);
        }
        let range = resolve_range(&*host, settings.frame_start, settings.frame_end)?;
        if !host.rig().has_node(naming::ROOT) {
            return Err(BakeError::missing_node(naming::ROOT));
        }
        let targets = find_wheel_targets(host.rig());
        if targets.is_empty() {
            return Err(BakeError::no_targets("wheel bones"));
        }
        Ok((range, targets))
    })();
    let ((start, end), targets) = match prepared {
        Ok(prepared) => prepared,
        Err(err) => {
            report.error(&err);
            return report.build();
        }
    };

    if host.rig().property(property::WHEELS_Y_ROLLING).is_some() {
        if let Err(err) = host.set_property_value(property::WHEELS_Y_ROLLING, 0.0) {
            report.warning(format!("Could not turn off Y rolling: {}", err));
        }
    }
    for target in &targets {
        clear_property(host, &target.property);
    }
    report.info(format!("Found {} wheel bones to bake", targets.len()));

    let mut nodes = vec![naming::ROOT.to_string()];
    for target in &targets {
        for name in [&target.wheel, &target.brake] {
            if !nodes.contains(name) {
                nodes.push(name.clone());
            }
        }
    }
    let plan = BakePlan {
        nodes,
        reset: targets.iter().map(|t| t.wheel.clone()).collect(),
        start,
        end,
    };

    engine::run(host, &plan, &mut report, |baked, report| {
        let root = baked.locations(naming::ROOT)?;
        let mut curves = Vec::with_capacity(targets.len());
        for target in &targets {
            let samples = wheel_samples(baked, &root, target)?;
            let keys = derive_rotation(
                start,
                &samples,
                target.forward,
                target.radius,
                settings.keyframe_tolerance,
            );
            let total = keys.last().map_or(0.0, |k| k.value);
            let message = format!(
                "Created {} keyframes for {}: {:.2} rotations ({:.2} rad)",
                keys.len(),
                target.wheel,
                total / std::f64::consts::TAU,
                total
            );
            info!("{}", message);
            report.info(message);
            curves.push(
                Curve::from_keyframes(ChannelPath::property(&target.property), keys)
                    .with_group(BAKE_GROUP),
            );
        }
        Ok(curves)
    });
    report.build()
}

fn wheel_samples(
    baked: &BakedAction,
    root: &[DVec3],
    target: &WheelTarget,
) -> BakeResult<Vec<WheelSample>> {
    let rotations = baked.rotations(&target.wheel)?;
    let brakes = baked.scales(&target.brake)?;
    Ok(root
        .iter()
        .zip(rotations)
        .zip(brakes)
        .map(|((location, rotation), scale)| WheelSample {
            root_location: *location,
            rotation,
            brake_scale_y: scale.y,
        })
        .collect())
}

/// Removes a property's animation and resets its value to 0.
pub(crate) fn clear_property<H: BakeHost + ?Sized>(host: &mut H, name: &str) -> bool {
    let removed = host
        .action_mut()
        .is_some_and(|action| action.remove_curve(&ChannelPath::property(name)));
    if host.rig().property(name).is_some() {
        if let Err(err) = host.set_property_value(name, 0.0) {
            debug!(property = name, error = %err, "Could not reset property");
        }
    }
    debug!(property = name, removed, "Cleared property animation");
    removed
}
