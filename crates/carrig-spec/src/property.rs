//! Custom scalar properties attached to the rig root.

use serde::{Deserialize, Serialize};

use crate::error::{SpecError, SpecResult};
use crate::naming::{property, WheelSuffix};

fn default_min() -> f64 {
    f64::NEG_INFINITY
}

fn default_max() -> f64 {
    f64::INFINITY
}

fn default_true() -> bool {
    true
}

/// A user-tunable scalar on the rig root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomProperty {
    pub name: String,
    /// Human label shown by hosts.
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub default: f64,
    #[serde(
        default = "default_min",
        serialize_with = "unbounded::serialize",
        deserialize_with = "unbounded::deserialize_min"
    )]
    pub min: f64,
    #[serde(
        default = "default_max",
        serialize_with = "unbounded::serialize",
        deserialize_with = "unbounded::deserialize_max"
    )]
    pub max: f64,
    /// Whether the property may carry keyframes.
    #[serde(default = "default_true")]
    pub animatable: bool,
}

impl CustomProperty {
    /// Unbounded, animatable property.
    pub fn new(name: impl Into<String>, label: impl Into<String>, default: f64) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            description: String::new(),
            default,
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
            animatable: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_animatable(mut self, animatable: bool) -> Self {
        self.animatable = animatable;
        self
    }

    /// Clamps a value into the declared range.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Checks range consistency and that the default lies inside it.
    pub fn validate(&self) -> SpecResult<()> {
        if self.name.is_empty() {
            return Err(SpecError::invalid_property("", "property name is empty"));
        }
        if self.min.is_nan() || self.max.is_nan() || self.min > self.max {
            return Err(SpecError::invalid_property(
                &self.name,
                format!("invalid range [{}, {}]", self.min, self.max),
            ));
        }
        if !(self.min..=self.max).contains(&self.default) {
            return Err(SpecError::invalid_property(
                &self.name,
                format!("default {} outside [{}, {}]", self.default, self.min, self.max),
            ));
        }
        Ok(())
    }

    // =========================================================================
    // Rig properties
    // =========================================================================

    /// Switch for the roll-with-translation wheel shortcut.
    pub fn wheels_y_rolling() -> Self {
        Self::new(property::WHEELS_Y_ROLLING, "Wheels Y Rolling", 0.0)
            .with_description("Activate wheels rotation when moving the root along the Y axis")
            .with_range(0.0, 1.0)
    }

    pub fn suspension_factor() -> Self {
        Self::new(property::SUSPENSION_FACTOR, "Suspension Factor", 0.5)
            .with_description("Influence of the dampers over the pitch of the body")
            .with_range(0.0, 1.0)
    }

    pub fn suspension_rolling_factor() -> Self {
        Self::new(property::SUSPENSION_ROLLING_FACTOR, "Suspension Rolling Factor", 0.5)
            .with_description("Influence of the dampers over the roll of the body")
            .with_range(0.0, 1.0)
    }

    pub fn steering_rotation() -> Self {
        Self::new(property::STEERING_ROTATION, "Steering Rotation", 0.0)
            .with_description("Animation property for steering")
    }

    pub fn wheel_rotation(suffix: WheelSuffix) -> Self {
        Self::new(suffix.rotation_property(), format!("Wheel Rotation {}", suffix), 0.0)
            .with_description("Animation property for wheel spinning")
    }
}

/// JSON has no infinities; unbounded limits serialize as `null`.
mod unbounded {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize_min<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NEG_INFINITY))
    }

    pub fn deserialize_max<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}
