//! Naming contract for generated nodes and rig properties.
//!
//! Per-wheel nodes are named `<Role>_<Axle><Side>_<Index>` (for example
//! `MCH_WheelRotation_FR_1`); every other node uses a fixed name. The
//! baking engine locates its targets through these names, so formatting and
//! parsing must stay exact inverses of each other.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{SpecError, SpecResult};

/// Pattern for a corner-suffixed node name. Indices have no leading zeros so
/// that parse/format is a bijection.
const CORNER_NAME_PATTERN: &str = r"^([A-Za-z][A-Za-z_]*?)_([FB])([LR])_(0|[1-9][0-9]*)$";

/// Pattern for a bare corner suffix (`FL_0`).
const SUFFIX_PATTERN: &str = r"^([FB])([LR])_(0|[1-9][0-9]*)$";

static CORNER_NAME_REGEX: OnceLock<Regex> = OnceLock::new();
static SUFFIX_REGEX: OnceLock<Regex> = OnceLock::new();

fn corner_name_regex() -> &'static Regex {
    CORNER_NAME_REGEX.get_or_init(|| Regex::new(CORNER_NAME_PATTERN).expect("invalid regex pattern"))
}

fn suffix_regex() -> &'static Regex {
    SUFFIX_REGEX.get_or_init(|| Regex::new(SUFFIX_PATTERN).expect("invalid regex pattern"))
}

// =============================================================================
// Fixed node names
// =============================================================================

pub const ROOT: &str = "Root";
pub const SHP_ROOT: &str = "SHP_Root";
pub const DRIFT: &str = "Drift";
pub const SHP_DRIFT: &str = "SHP_Drift";
pub const GROUND_SENSOR_AXLE_F: &str = "GroundSensor_Axle_F";
pub const GROUND_SENSOR_AXLE_B: &str = "GroundSensor_Axle_B";
pub const SHP_GROUND_SENSOR_AXLE_F: &str = "SHP_GroundSensor_Axle_F";
pub const SHP_GROUND_SENSOR_AXLE_B: &str = "SHP_GroundSensor_Axle_B";
pub const MCH_ROOT_AXLE_F: &str = "MCH_Root_Axle_F";
pub const MCH_ROOT_AXLE_B: &str = "MCH_Root_Axle_B";
pub const MCH_AXIS_F: &str = "MCH_Axis_F";
pub const MCH_AXIS_B: &str = "MCH_Axis_B";
pub const MCH_STEERING: &str = "MCH_Steering";
pub const MCH_STEERING_ROTATION: &str = "MCH_SteeringRotation";
pub const STEERING: &str = "Steering";
pub const MCH_SUSPENSION_F: &str = "MCH_Suspension_F";
pub const MCH_SUSPENSION_B: &str = "MCH_Suspension_B";
pub const MCH_AXIS: &str = "MCH_Axis";
pub const MCH_BODY: &str = "MCH_Body";
pub const SUSPENSION: &str = "Suspension";
pub const DEF_BODY: &str = "DEF_Body";

// =============================================================================
// Per-corner roles
// =============================================================================

/// Role prefixes for corner-suffixed nodes.
pub mod role {
    pub const DEF_WHEEL: &str = "DEF_Wheel";
    pub const DEF_BRAKE: &str = "DEF_Brake";
    pub const GROUND_SENSOR: &str = "GroundSensor";
    pub const SHP_GROUND_SENSOR: &str = "SHP_GroundSensor";
    pub const MCH_GROUND_SENSOR: &str = "MCH_GroundSensor";
    pub const MCH_WHEEL: &str = "MCH_Wheel";
    pub const MCH_WHEEL_ROTATION: &str = "MCH_WheelRotation";
    pub const MCH_BRAKE: &str = "MCH_Brake";
    pub const WHEEL: &str = "Wheel";
    pub const BRAKE: &str = "Brake";
    pub const DAMPER: &str = "Damper";
    pub const MCH_DAMPER: &str = "MCH_Damper";
    pub const DOOR: &str = "Door";
    pub const SHP_DOOR: &str = "SHP_Door";
    pub const TRUNK: &str = "Trunk";
    pub const SHP_TRUNK: &str = "SHP_Trunk";
}

// =============================================================================
// Custom property names
// =============================================================================

/// Names of custom scalar properties stored on the rig root.
pub mod property {
    pub const WHEELS_Y_ROLLING: &str = "WheelsYRolling";
    pub const SUSPENSION_FACTOR: &str = "SuspensionFactor";
    pub const SUSPENSION_ROLLING_FACTOR: &str = "SuspensionRollingFactor";
    pub const STEERING_ROTATION: &str = "SteeringRotation";
    /// Prefix of the per-wheel rotation accumulators (`WheelRotation_FL_0`).
    pub const WHEEL_ROTATION: &str = "WheelRotation";
}

/// Marker stored on the rig to tell deformation rigs from generated ones.
pub const RIG_MARKER: &str = "CarRig";

// =============================================================================
// Corner grammar
// =============================================================================

/// Front or back axle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axle {
    Front,
    Back,
}

impl Axle {
    /// Single-letter code used in node names.
    pub fn letter(&self) -> char {
        match self {
            Axle::Front => 'F',
            Axle::Back => 'B',
        }
    }

    /// Parses a single-letter axle code.
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'F' => Some(Axle::Front),
            'B' => Some(Axle::Back),
            _ => None,
        }
    }
}

/// Left or right side of the vehicle. Left is +X.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Single-letter code used in node names.
    pub fn letter(&self) -> char {
        match self {
            Side::Left => 'L',
            Side::Right => 'R',
        }
    }

    /// Parses a single-letter side code.
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'L' => Some(Side::Left),
            'R' => Some(Side::Right),
            _ => None,
        }
    }

    /// The opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// One of the four corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Corner {
    pub axle: Axle,
    pub side: Side,
}

impl Corner {
    pub const FRONT_LEFT: Corner = Corner::new(Axle::Front, Side::Left);
    pub const FRONT_RIGHT: Corner = Corner::new(Axle::Front, Side::Right);
    pub const BACK_LEFT: Corner = Corner::new(Axle::Back, Side::Left);
    pub const BACK_RIGHT: Corner = Corner::new(Axle::Back, Side::Right);

    /// All corners in enumeration order (FL, FR, BL, BR).
    pub const ALL: [Corner; 4] = [
        Corner::FRONT_LEFT,
        Corner::FRONT_RIGHT,
        Corner::BACK_LEFT,
        Corner::BACK_RIGHT,
    ];

    pub const fn new(axle: Axle, side: Side) -> Self {
        Self { axle, side }
    }

    pub fn is_front(&self) -> bool {
        self.axle == Axle::Front
    }

    pub fn is_left(&self) -> bool {
        self.side == Side::Left
    }

    /// Suffix for the given wheel index at this corner.
    pub fn suffix(&self, index: u32) -> WheelSuffix {
        WheelSuffix::new(*self, index)
    }

    /// Position in [`Corner::ALL`].
    pub fn ordinal(&self) -> usize {
        match (self.axle, self.side) {
            (Axle::Front, Side::Left) => 0,
            (Axle::Front, Side::Right) => 1,
            (Axle::Back, Side::Left) => 2,
            (Axle::Back, Side::Right) => 3,
        }
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.axle.letter(), self.side.letter())
    }
}

/// Corner plus wheel index, rendered as `FL_0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WheelSuffix {
    pub corner: Corner,
    pub index: u32,
}

impl WheelSuffix {
    pub fn new(corner: Corner, index: u32) -> Self {
        Self { corner, index }
    }

    pub fn is_front(&self) -> bool {
        self.corner.is_front()
    }

    pub fn is_left(&self) -> bool {
        self.corner.is_left()
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    /// Full node name for a role, e.g. `name("MCH_Wheel")` -> `MCH_Wheel_FL_0`.
    pub fn name(&self, role: &str) -> String {
        format!("{}_{}", role, self)
    }

    /// Same index on the opposite side.
    pub fn mirrored(&self) -> Self {
        Self::new(Corner::new(self.corner.axle, self.corner.side.opposite()), self.index)
    }

    /// Name of the per-wheel rotation property (`WheelRotation_FL_0`).
    pub fn rotation_property(&self) -> String {
        self.name(property::WHEEL_ROTATION)
    }
}

impl fmt::Display for WheelSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.corner, self.index)
    }
}

impl FromStr for WheelSuffix {
    type Err = SpecError;

    fn from_str(s: &str) -> SpecResult<Self> {
        let caps = suffix_regex()
            .captures(s)
            .ok_or_else(|| SpecError::invalid_name(s, "expected <F|B><L|R>_<index>"))?;
        suffix_from_captures(s, &caps[1], &caps[2], &caps[3])
    }
}

fn suffix_from_captures(name: &str, axle: &str, side: &str, index: &str) -> SpecResult<WheelSuffix> {
    let axle = axle
        .chars()
        .next()
        .and_then(Axle::from_letter)
        .ok_or_else(|| SpecError::invalid_name(name, "unknown axle letter"))?;
    let side = side
        .chars()
        .next()
        .and_then(Side::from_letter)
        .ok_or_else(|| SpecError::invalid_name(name, "unknown side letter"))?;
    let index = index
        .parse::<u32>()
        .map_err(|e| SpecError::invalid_name(name, format!("bad index: {}", e)))?;
    Ok(WheelSuffix::new(Corner::new(axle, side), index))
}

/// A parsed corner-suffixed node name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CornerName {
    pub role: String,
    pub suffix: WheelSuffix,
}

impl CornerName {
    /// Parses `<Role>_<Axle><Side>_<Index>`.
    pub fn parse(name: &str) -> SpecResult<Self> {
        let caps = corner_name_regex()
            .captures(name)
            .ok_or_else(|| SpecError::invalid_name(name, "expected <Role>_<F|B><L|R>_<index>"))?;
        let suffix = suffix_from_captures(name, &caps[2], &caps[3], &caps[4])?;
        Ok(Self {
            role: caps[1].to_string(),
            suffix,
        })
    }

    /// Formats back into the node name.
    pub fn format(&self) -> String {
        self.suffix.name(&self.role)
    }
}

/// Returns true if `name` is a per-wheel rotation property (`WheelRotation_FR_0`).
pub fn is_wheel_rotation_property(name: &str) -> bool {
    CornerName::parse(name)
        .map(|parsed| parsed.role == property::WHEEL_ROTATION)
        .unwrap_or(false)
}

/// Suffixes of `role` at `corner`, scanning indices from 0 up to the first
/// missing name. Indices after a gap are not reached.
pub fn scan_corner(role: &str, corner: Corner, exists: impl Fn(&str) -> bool) -> Vec<WheelSuffix> {
    (0..)
        .map(|index| corner.suffix(index))
        .take_while(|suffix| exists(&suffix.name(role)))
        .collect()
}
