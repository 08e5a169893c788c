//! Node collections and display colors.

use serde::{Deserialize, Serialize};

use crate::error::{SpecError, SpecResult};

fn default_true() -> bool {
    true
}

/// RGB display color (0.0-1.0 range).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl NodeColor {
    /// Creates a color, clamping each component.
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
        }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }
}

/// Host color themes used by the vehicle rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorTheme {
    /// Orange, ground sensors.
    Theme02,
    /// Green, wheels and steering.
    Theme03,
    /// Blue, direction controls.
    Theme04,
    /// Pink, doors and trunks.
    Theme05,
    /// Yellow, suspension.
    Theme09,
}

impl ColorTheme {
    /// Host palette identifier.
    pub fn palette_name(&self) -> &'static str {
        match self {
            ColorTheme::Theme02 => "THEME02",
            ColorTheme::Theme03 => "THEME03",
            ColorTheme::Theme04 => "THEME04",
            ColorTheme::Theme05 => "THEME05",
            ColorTheme::Theme09 => "THEME09",
        }
    }

    /// Normal-state color of the theme.
    pub fn color(&self) -> NodeColor {
        match self {
            ColorTheme::Theme02 => NodeColor::new(0.969, 0.251, 0.094),
            ColorTheme::Theme03 => NodeColor::new(0.118, 0.569, 0.196),
            ColorTheme::Theme04 => NodeColor::new(0.039, 0.212, 0.580),
            ColorTheme::Theme05 => NodeColor::new(0.663, 0.161, 0.400),
            ColorTheme::Theme09 => NodeColor::new(0.957, 0.788, 0.047),
        }
    }
}

/// A named group of nodes with shared visibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeCollection {
    pub name: String,
    pub nodes: Vec<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub selectable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<ColorTheme>,
}

impl NodeCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            visible: true,
            selectable: true,
            theme: None,
        }
    }

    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.nodes.push(node.into());
        self
    }

    pub fn with_nodes(mut self, nodes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.nodes.extend(nodes.into_iter().map(|n| n.into()));
        self
    }

    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_theme(mut self, theme: ColorTheme) -> Self {
        self.theme = Some(theme);
        self
    }

    pub fn contains(&self, node: &str) -> bool {
        self.nodes.iter().any(|n| n == node)
    }

    pub fn validate(&self) -> SpecResult<()> {
        if self.name.is_empty() {
            return Err(SpecError::invalid_name("", "collection name is empty"));
        }
        Ok(())
    }
}

/// The collections a generated vehicle rig is dispatched into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionPreset {
    Direction,
    Suspension,
    Wheel,
    GroundSensor,
    DoorTrunk,
    Deform,
    Mechanism,
}

impl CollectionPreset {
    pub const ALL: [CollectionPreset; 7] = [
        CollectionPreset::Direction,
        CollectionPreset::Suspension,
        CollectionPreset::Wheel,
        CollectionPreset::GroundSensor,
        CollectionPreset::DoorTrunk,
        CollectionPreset::Deform,
        CollectionPreset::Mechanism,
    ];

    pub fn default_name(&self) -> &'static str {
        match self {
            CollectionPreset::Direction => "Direction",
            CollectionPreset::Suspension => "Suspension",
            CollectionPreset::Wheel => "Wheel",
            CollectionPreset::GroundSensor => "GroundSensor",
            CollectionPreset::DoorTrunk => "DoorTrunk",
            CollectionPreset::Deform => "Deform",
            CollectionPreset::Mechanism => "Mechanism",
        }
    }

    /// Helper collections are hidden and not selectable.
    pub fn is_helper(&self) -> bool {
        matches!(self, CollectionPreset::Deform | CollectionPreset::Mechanism)
    }

    pub fn theme(&self) -> Option<ColorTheme> {
        match self {
            CollectionPreset::Direction => Some(ColorTheme::Theme04),
            CollectionPreset::Suspension => Some(ColorTheme::Theme09),
            CollectionPreset::Wheel => Some(ColorTheme::Theme03),
            CollectionPreset::GroundSensor => Some(ColorTheme::Theme02),
            CollectionPreset::DoorTrunk => Some(ColorTheme::Theme05),
            CollectionPreset::Deform | CollectionPreset::Mechanism => None,
        }
    }

    pub fn to_collection(&self) -> NodeCollection {
        NodeCollection {
            name: self.default_name().to_string(),
            nodes: Vec::new(),
            visible: !self.is_helper(),
            selectable: !self.is_helper(),
            theme: self.theme(),
        }
    }
}
