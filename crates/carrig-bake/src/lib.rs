//! Carrig Motion Baking
//!
//! This crate samples a rig's fully evaluated animation frame by frame and
//! derives the sparse keyframes that reproduce it on the rig's animation
//! properties: wheel spin on `WheelRotation_*` and steering on
//! `SteeringRotation`.
//!
//! # Overview
//!
//! Bakes run against a [`BakeHost`], the application owning the live scene.
//! Each bake captures the host's edit context, resets the sampled nodes to
//! rest, samples every frame of the range into a transient [`BakedAction`],
//! derives curves and writes them, then restores the context on every exit
//! path. Outcomes are returned as a [`BakeReport`].
//!
//! [`MemoryHost`] is a serializable reference host used by the `carrig`
//! command line tool and the tests.
//!
//! # Example
//!
//! ```
//! use carrig_bake::{bake_wheels, Action, MemoryHost, WheelBakeSettings};
//! use carrig_spec::{MemoryScene, Rig};
//!
//! let host = &mut MemoryHost::new(Rig::new("Car"), MemoryScene::new())
//!     .with_action(Action::new("Car_Action"));
//! let report = bake_wheels(host, &WheelBakeSettings::new());
//! // A rig without wheel controls has nothing to bake.
//! assert!(report.is_cancelled());
//! ```
//!
//! # Modules
//!
//! - [`action`]: Animation container
//! - [`clear`]: Removal of baked channels
//! - [`context`]: Edit-context capture and restoration
//! - [`engine`]: The bake state machine
//! - [`error`]: Error types
//! - [`follow_path`]: Path-follow setup and its chained bakes
//! - [`host`]: Host traits
//! - [`memory`]: In-memory reference host
//! - [`report`]: Operation reports
//! - [`sample`]: Per-frame sampling
//! - [`steering`]: Steering derivation
//! - [`wheels`]: Wheel spin derivation

pub mod action;
pub mod clear;
pub mod context;
pub mod engine;
pub mod error;
pub mod follow_path;
pub mod host;
pub mod memory;
pub mod report;
pub mod sample;
pub mod steering;
pub mod wheels;

// Re-export commonly used types at the crate root
pub use action::Action;
pub use clear::{clear_baked, ClearOptions};
pub use context::{CapturedContext, ContextGuard};
pub use engine::{resolve_range, BakePlan, BakeState, BAKE_GROUP, DEFAULT_FRAME_RANGE};
pub use error::{BakeError, BakeResult};
pub use follow_path::{
    clear_follow_path, end_frame_from_speed, setup_follow_path, FollowPathOptions, PathTiming,
    FOLLOW_PATH_CONSTRAINT, MAX_FRAME,
};
pub use host::{AnimationStore, BakeHost, EditContext, EditMode, PoseEvaluator};
pub use memory::MemoryHost;
pub use report::{BakeReport, BakeStatus, ReportBuilder, ReportLevel, ReportMessage};
pub use sample::BakedAction;
pub use steering::{bake_steering, derive_steering, SteeringBakeSettings, SteeringSample};
pub use wheels::{
    bake_wheels, derive_rotation, find_wheel_targets, pair_brake, WheelBakeSettings, WheelSample,
    WheelTarget,
};
