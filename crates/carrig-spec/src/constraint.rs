//! Declarative constraint descriptors.
//!
//! Constraints describe intent only; the host evaluates them. Angles are in
//! radians throughout.

use serde::{Deserialize, Serialize};

// =============================================================================
// Shared enums
// =============================================================================

/// Coordinate space a constraint reads or writes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Space {
    #[default]
    World,
    Pose,
    Local,
}

/// Axis a damped-track constraint points at its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackAxis {
    X,
    #[default]
    Y,
    Z,
    NegativeX,
    NegativeY,
    NegativeZ,
}

/// Direction of a shrinkwrap projection ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectAxis {
    #[default]
    NegativeZ,
    Z,
}

/// How a shrinkwrap constraint finds the ground surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShrinkwrapMode {
    #[default]
    NearestSurface,
    Project,
}

/// Transform channel addressed by a transform-remap constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformChannel {
    Location,
    Rotation,
    Scale,
}

/// Axis selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Closed interval used by limit and remap constraints.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A range pinned to one value.
    pub const fn fixed(value: f64) -> Self {
        Self::new(value, value)
    }

    /// Symmetric range `[-half, half]`.
    pub const fn symmetric(half: f64) -> Self {
        Self::new(-half, half)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Optional per-axis limits.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<AxisRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<AxisRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<AxisRange>,
}

impl AxisLimits {
    pub fn x(mut self, range: AxisRange) -> Self {
        self.x = Some(range);
        self
    }

    pub fn y(mut self, range: AxisRange) -> Self {
        self.y = Some(range);
        self
    }

    pub fn z(mut self, range: AxisRange) -> Self {
        self.z = Some(range);
        self
    }

    pub fn get(&self, axis: Axis) -> Option<AxisRange> {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

/// Mapping of one destination axis in a transform-remap constraint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisMapping {
    /// Destination axis.
    pub to: Axis,
    /// Source axis feeding it.
    pub from: Axis,
    /// Destination value range; the source range maps linearly onto it.
    pub range: AxisRange,
}

/// Linear remap from a source channel to a destination channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformMapping {
    pub from_channel: TransformChannel,
    /// Source ranges per axis. Unset axes are ignored.
    pub from_ranges: AxisLimits,
    pub to_channel: TransformChannel,
    /// Destination axes; unmapped destination axes are left untouched.
    pub mappings: Vec<AxisMapping>,
    /// Extend the mapping past the source range.
    #[serde(default)]
    pub extrapolate: bool,
}

// =============================================================================
// Constraint kinds
// =============================================================================

/// Kind-specific constraint data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum ConstraintKind {
    /// Copies selected rotation axes from the target.
    CopyRotation {
        axes: [bool; 3],
        /// Add to the owner's own rotation instead of replacing it.
        #[serde(default)]
        use_offset: bool,
    },
    /// Copies selected location axes from a point along the target segment.
    CopyLocation {
        axes: [bool; 3],
        /// 0 = target head, 1 = target tail.
        #[serde(default)]
        head_tail: f64,
    },
    /// Copies the full target transform.
    CopyTransforms,
    /// Clamps location per axis.
    LimitLocation {
        limits: AxisLimits,
        /// Apply the limit to the transform itself, not only to UI edits.
        #[serde(default)]
        affect_transform: bool,
    },
    /// Clamps rotation per axis.
    LimitRotation {
        limits: AxisLimits,
        #[serde(default)]
        affect_transform: bool,
    },
    /// Clamps scale per axis.
    LimitScale {
        limits: AxisLimits,
        #[serde(default)]
        affect_transform: bool,
    },
    /// Rotates the owner so an axis points at the target.
    DampedTrack { track_axis: TrackAxis },
    /// Projects the owner onto a ground surface.
    Shrinkwrap {
        mode: ShrinkwrapMode,
        /// Offset kept from the surface.
        distance: f64,
        project_axis: ProjectAxis,
        /// Scene object used as ground. `None` until the user assigns one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ground: Option<String>,
    },
    /// Remaps one transform channel of the target onto another of the owner.
    TransformRemap(TransformMapping),
    /// Full parent-like attachment to the target.
    ChildOf,
    /// Keeps the owner on the sphere around the target at its rest distance.
    LimitDistance {
        /// 0 means "use the rest distance".
        #[serde(default)]
        distance: f64,
    },
    /// Positions the owner along a path object.
    FollowPath {
        /// Path object in the scene.
        path: String,
        forward_axis: TrackAxis,
        up_axis: Axis,
        /// Normalized position along the path (0..1) when using a fixed location.
        #[serde(default)]
        offset_factor: f64,
        #[serde(default)]
        use_fixed_location: bool,
        #[serde(default)]
        use_curve_follow: bool,
    },
}

impl ConstraintKind {
    /// Stable identifier of the constraint kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::CopyRotation { .. } => "copy_rotation",
            ConstraintKind::CopyLocation { .. } => "copy_location",
            ConstraintKind::CopyTransforms => "copy_transforms",
            ConstraintKind::LimitLocation { .. } => "limit_location",
            ConstraintKind::LimitRotation { .. } => "limit_rotation",
            ConstraintKind::LimitScale { .. } => "limit_scale",
            ConstraintKind::DampedTrack { .. } => "damped_track",
            ConstraintKind::Shrinkwrap { .. } => "shrinkwrap",
            ConstraintKind::TransformRemap(_) => "transform_remap",
            ConstraintKind::ChildOf => "child_of",
            ConstraintKind::LimitDistance { .. } => "limit_distance",
            ConstraintKind::FollowPath { .. } => "follow_path",
        }
    }
}

/// A declared constraint on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Name, unique per owner node.
    pub name: String,
    /// Target node inside the rig, when the kind needs one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default)]
    pub owner_space: Space,
    #[serde(default)]
    pub target_space: Space,
    #[serde(default = "default_influence")]
    pub influence: f64,
    pub kind: ConstraintKind,
}

fn default_influence() -> f64 {
    1.0
}

impl Constraint {
    /// Creates a constraint with world spaces and full influence.
    pub fn new(name: impl Into<String>, kind: ConstraintKind) -> Self {
        Self {
            name: name.into(),
            target: None,
            owner_space: Space::World,
            target_space: Space::World,
            influence: 1.0,
            kind,
        }
    }

    /// Copy-rotation on the given axes.
    pub fn copy_rotation(name: impl Into<String>, target: impl Into<String>, axes: [bool; 3]) -> Self {
        Self::new(
            name,
            ConstraintKind::CopyRotation {
                axes,
                use_offset: false,
            },
        )
        .with_target(target)
    }

    /// Copy-location on the given axes.
    pub fn copy_location(name: impl Into<String>, target: impl Into<String>, axes: [bool; 3]) -> Self {
        Self::new(
            name,
            ConstraintKind::CopyLocation {
                axes,
                head_tail: 0.0,
            },
        )
        .with_target(target)
    }

    /// Copy-transforms from the target.
    pub fn copy_transforms(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, ConstraintKind::CopyTransforms).with_target(target)
    }

    /// Damped track toward the target.
    pub fn damped_track(name: impl Into<String>, target: impl Into<String>, track_axis: TrackAxis) -> Self {
        Self::new(name, ConstraintKind::DampedTrack { track_axis }).with_target(target)
    }

    /// Child-of attachment to the target.
    pub fn child_of(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, ConstraintKind::ChildOf).with_target(target)
    }

    pub fn limit_location(name: impl Into<String>, limits: AxisLimits) -> Self {
        Self::new(
            name,
            ConstraintKind::LimitLocation {
                limits,
                affect_transform: false,
            },
        )
    }

    pub fn limit_rotation(name: impl Into<String>, limits: AxisLimits) -> Self {
        Self::new(
            name,
            ConstraintKind::LimitRotation {
                limits,
                affect_transform: false,
            },
        )
    }

    pub fn limit_scale(name: impl Into<String>, limits: AxisLimits) -> Self {
        Self::new(
            name,
            ConstraintKind::LimitScale {
                limits,
                affect_transform: false,
            },
        )
    }

    /// Downward nearest-surface ground projection.
    pub fn ground_projection(name: impl Into<String>, distance: f64) -> Self {
        Self::new(
            name,
            ConstraintKind::Shrinkwrap {
                mode: ShrinkwrapMode::NearestSurface,
                distance,
                project_axis: ProjectAxis::NegativeZ,
                ground: None,
            },
        )
    }

    pub fn transform_remap(
        name: impl Into<String>,
        target: impl Into<String>,
        mapping: TransformMapping,
    ) -> Self {
        Self::new(name, ConstraintKind::TransformRemap(mapping)).with_target(target)
    }

    pub fn limit_distance(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, ConstraintKind::LimitDistance { distance: 0.0 }).with_target(target)
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Sets both owner and target space.
    pub fn in_space(mut self, space: Space) -> Self {
        self.owner_space = space;
        self.target_space = space;
        self
    }

    pub fn with_influence(mut self, influence: f64) -> Self {
        self.influence = influence;
        self
    }

    /// Enables offset mode on copy-rotation constraints.
    pub fn with_offset(mut self) -> Self {
        if let ConstraintKind::CopyRotation { use_offset, .. } = &mut self.kind {
            *use_offset = true;
        }
        self
    }

    /// Sets the head/tail blend on copy-location constraints.
    pub fn with_head_tail(mut self, value: f64) -> Self {
        if let ConstraintKind::CopyLocation { head_tail, .. } = &mut self.kind {
            *head_tail = value;
        }
        self
    }

    /// Makes limit constraints affect the transform itself.
    pub fn affecting_transform(mut self) -> Self {
        match &mut self.kind {
            ConstraintKind::LimitLocation {
                affect_transform, ..
            }
            | ConstraintKind::LimitRotation {
                affect_transform, ..
            }
            | ConstraintKind::LimitScale {
                affect_transform, ..
            } => *affect_transform = true,
            _ => {}
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder_sets_spaces_and_offset() {
        let c = Constraint::copy_rotation("Animation wheels", "Wheel_FL_0", [true, false, false])
            .in_space(Space::Local)
            .with_offset();
        assert_eq!(c.owner_space, Space::Local);
        assert_eq!(c.target_space, Space::Local);
        assert_eq!(c.target.as_deref(), Some("Wheel_FL_0"));
        assert_eq!(
            c.kind,
            ConstraintKind::CopyRotation {
                axes: [true, false, false],
                use_offset: true
            }
        );
    }

    #[test]
    fn test_kind_serialization_is_tagged() {
        let c = Constraint::ground_projection("Ground projection", 0.5);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["kind"]["type"], "shrinkwrap");
        assert_eq!(json["kind"]["mode"], "nearest_surface");
        assert_eq!(json["kind"]["project_axis"], "negative_z");
        let back: Constraint = serde_json::from_value(json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_axis_range_helpers() {
        assert_eq!(AxisRange::symmetric(0.2), AxisRange::new(-0.2, 0.2));
        assert!(AxisRange::fixed(1.0).contains(1.0));
        assert!(!AxisRange::new(0.5, 1.0).contains(0.4));
        let limits = AxisLimits::default().z(AxisRange::symmetric(0.1));
        assert_eq!(limits.get(Axis::Z), Some(AxisRange::new(-0.1, 0.1)));
        assert_eq!(limits.get(Axis::X), None);
    }
}
