//! Keyframed scalar curves and the channel paths they animate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Keyframe interpolation toward the next key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    #[default]
    Linear,
    Constant,
    /// Stored for host fidelity; evaluated like linear by the reference host.
    Bezier,
}

/// Pose channel of a node addressed by an animation curve or driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseChannel {
    Location,
    RotationEuler,
    /// Components ordered `w, x, y, z`.
    RotationQuaternion,
    Scale,
}

impl PoseChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoseChannel::Location => "location",
            PoseChannel::RotationEuler => "rotation_euler",
            PoseChannel::RotationQuaternion => "rotation_quaternion",
            PoseChannel::Scale => "scale",
        }
    }

    /// Number of scalar components.
    pub fn arity(&self) -> usize {
        match self {
            PoseChannel::RotationQuaternion => 4,
            _ => 3,
        }
    }
}

/// Address of an animatable scalar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChannelPath {
    /// Custom property on the rig root.
    Property { name: String },
    /// Component of a node's pose channel.
    Node {
        node: String,
        channel: PoseChannel,
        index: usize,
    },
    /// Numeric setting of a node constraint (for example `offset_factor`).
    Constraint {
        node: String,
        constraint: String,
        setting: String,
    },
}

impl ChannelPath {
    pub fn property(name: impl Into<String>) -> Self {
        ChannelPath::Property { name: name.into() }
    }

    pub fn node(node: impl Into<String>, channel: PoseChannel, index: usize) -> Self {
        ChannelPath::Node {
            node: node.into(),
            channel,
            index,
        }
    }

    pub fn constraint(
        node: impl Into<String>,
        constraint: impl Into<String>,
        setting: impl Into<String>,
    ) -> Self {
        ChannelPath::Constraint {
            node: node.into(),
            constraint: constraint.into(),
            setting: setting.into(),
        }
    }

    /// Property name, if this path addresses a custom property.
    pub fn property_name(&self) -> Option<&str> {
        match self {
            ChannelPath::Property { name } => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for ChannelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelPath::Property { name } => write!(f, "[\"{}\"]", name),
            ChannelPath::Node {
                node,
                channel,
                index,
            } => write!(
                f,
                "nodes[\"{}\"].{}[{}]",
                node,
                channel.as_str(),
                index
            ),
            ChannelPath::Constraint {
                node,
                constraint,
                setting,
            } => write!(f, "nodes[\"{}\"].constraints[\"{}\"].{}", node, constraint, setting),
        }
    }
}

/// A single key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub frame: i32,
    pub value: f64,
    #[serde(default)]
    pub interpolation: Interpolation,
}

impl Keyframe {
    /// Linear key.
    pub fn linear(frame: i32, value: f64) -> Self {
        Self {
            frame,
            value,
            interpolation: Interpolation::Linear,
        }
    }
}

/// Keys for one channel, sorted by frame with at most one key per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub path: ChannelPath,
    /// Group label shown by hosts (for example "Wheels rotation").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
}

impl Curve {
    pub fn new(path: ChannelPath) -> Self {
        Self {
            path,
            group: None,
            keyframes: Vec::new(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Builds a curve from keys, sorting them and keeping the last key per frame.
    pub fn from_keyframes(path: ChannelPath, keyframes: impl IntoIterator<Item = Keyframe>) -> Self {
        let mut curve = Self::new(path);
        for key in keyframes {
            curve.insert(key);
        }
        curve
    }

    /// Inserts a key, replacing any key on the same frame.
    pub fn insert(&mut self, key: Keyframe) {
        match self.keyframes.binary_search_by(|k| k.frame.cmp(&key.frame)) {
            Ok(i) => self.keyframes[i] = key,
            Err(i) => self.keyframes.insert(i, key),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// First and last keyed frames.
    pub fn frame_range(&self) -> Option<(i32, i32)> {
        Some((self.keyframes.first()?.frame, self.keyframes.last()?.frame))
    }

    /// Value at `frame`, held constant outside the keyed range.
    pub fn evaluate(&self, frame: f64) -> Option<f64> {
        let first = self.keyframes.first()?;
        let last = self.keyframes.last()?;
        if frame <= first.frame as f64 {
            return Some(first.value);
        }
        if frame >= last.frame as f64 {
            return Some(last.value);
        }
        let next = self.keyframes.partition_point(|k| (k.frame as f64) <= frame);
        let a = self.keyframes[next - 1];
        let b = self.keyframes[next];
        match a.interpolation {
            Interpolation::Constant => Some(a.value),
            Interpolation::Linear | Interpolation::Bezier => {
                let t = (frame - a.frame as f64) / (b.frame - a.frame) as f64;
                Some(a.value + (b.value - a.value) * t)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_keeps_order_and_replaces() {
        let mut curve = Curve::new(ChannelPath::property("SteeringRotation"));
        curve.insert(Keyframe::linear(10, 1.0));
        curve.insert(Keyframe::linear(1, 0.0));
        curve.insert(Keyframe::linear(10, 2.0));
        let frames: Vec<_> = curve.keyframes.iter().map(|k| k.frame).collect();
        assert_eq!(frames, vec![1, 10]);
        assert_eq!(curve.keyframes[1].value, 2.0);
        assert_eq!(curve.frame_range(), Some((1, 10)));
    }

    #[test]
    fn test_evaluate_linear_and_hold() {
        let curve = Curve::from_keyframes(
            ChannelPath::property("x"),
            [Keyframe::linear(0, 0.0), Keyframe::linear(10, 10.0)],
        );
        assert_eq!(curve.evaluate(-5.0), Some(0.0));
        assert_eq!(curve.evaluate(5.0), Some(5.0));
        assert_eq!(curve.evaluate(20.0), Some(10.0));
        assert_eq!(Curve::new(ChannelPath::property("y")).evaluate(0.0), None);
    }

    #[test]
    fn test_evaluate_constant() {
        let mut a = Keyframe::linear(0, 1.0);
        a.interpolation = Interpolation::Constant;
        let curve = Curve::from_keyframes(ChannelPath::property("x"), [a, Keyframe::linear(4, 3.0)]);
        assert_eq!(curve.evaluate(3.9), Some(1.0));
        assert_eq!(curve.evaluate(4.0), Some(3.0));
    }

    #[test]
    fn test_channel_path_display() {
        assert_eq!(
            ChannelPath::property("WheelRotation_FL_0").to_string(),
            "[\"WheelRotation_FL_0\"]"
        );
        assert_eq!(
            ChannelPath::node("Root", PoseChannel::Location, 1).to_string(),
            "nodes[\"Root\"].location[1]"
        );
        assert_eq!(
            ChannelPath::constraint("Root", "follow_path", "offset_factor").to_string(),
            "nodes[\"Root\"].constraints[\"follow_path\"].offset_factor"
        );
    }
}
