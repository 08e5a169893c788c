//! Carrig Rig Data Model
//!
//! This crate provides the declarative types shared by rig generation and
//! motion baking: nodes, constraints, drivers, custom properties, curves,
//! vehicle geometry and the host scene snapshot.
//!
//! # Overview
//!
//! A vehicle rig is a tree of named nodes. Nodes carry declarative
//! constraints; drivers wire custom properties and transform channels into
//! constraint influences and pose channels. Nothing here evaluates a pose;
//! that is the host's job.
//!
//! # Example
//!
//! ```
//! use carrig_spec::{Node, Rig, WheelSuffix};
//! use glam::DVec3;
//!
//! let mut rig = Rig::new("Car");
//! rig.add_node(Node::new("Root", DVec3::ZERO, DVec3::Y)).unwrap();
//!
//! let suffix: WheelSuffix = "FL_0".parse().unwrap();
//! assert_eq!(suffix.name("MCH_WheelRotation"), "MCH_WheelRotation_FL_0");
//! assert!(rig.validate().is_ok());
//! ```
//!
//! # Modules
//!
//! - [`bbox`]: Axis-aligned bounding boxes around anchor nodes
//! - [`collection`]: Node collections and color themes
//! - [`constraint`]: Constraint descriptors
//! - [`curve`]: Keyframed curves and channel paths
//! - [`driver`]: Drivers and dependency graph validation
//! - [`error`]: Error types and the [`CodedError`] trait
//! - [`geometry`]: Per-corner wheel groups and derived vehicle positions
//! - [`naming`]: Node naming grammar and fixed names
//! - [`node`]: Nodes and the ordered node tree
//! - [`property`]: Custom scalar properties
//! - [`rig`]: The rig container and its validation
//! - [`scene`]: Host scene snapshot
//! - [`transform`]: Local transforms

pub mod bbox;
pub mod collection;
pub mod constraint;
pub mod curve;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod naming;
pub mod node;
pub mod property;
pub mod rig;
pub mod scene;
pub mod transform;

// Re-export commonly used types at the crate root
pub use bbox::BoundingBox;
pub use collection::{CollectionPreset, ColorTheme, NodeCollection, NodeColor};
pub use constraint::{
    Axis, AxisLimits, AxisMapping, AxisRange, Constraint, ConstraintKind, ProjectAxis,
    ShrinkwrapMode, Space, TrackAxis, TransformChannel, TransformMapping,
};
pub use curve::{ChannelPath, Curve, Interpolation, Keyframe, PoseChannel};
pub use driver::{DependencyGraph, Driver, DriverInput, DriverReduce, DriverSource, EdgeKind};
pub use error::{CodedError, SpecError, SpecResult};
pub use geometry::{Segment, VehicleGeometry, WheelDescriptor, WheelPositionGroup};
pub use naming::{Axle, Corner, CornerName, Side, WheelSuffix};
pub use node::{Node, NodeTree, RotationMode, TransformLocks};
pub use property::CustomProperty;
pub use rig::Rig;
pub use scene::{MemoryScene, ObjectData, ObjectParent, SceneGraph, SceneObject, ScenePath};
pub use transform::{euler_xyz_to_quat, quat_to_euler_xyz, Transform};
