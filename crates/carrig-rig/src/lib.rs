//! Carrig Rig Generation
//!
//! This crate turns the geometry of a vehicle's meshes into a procedural
//! control rig: a parented tree of named control and mechanism nodes plus a
//! declarative network of constraints and drivers implementing ground
//! contact, suspension, steering and wheel spin.
//!
//! # Pipeline
//!
//! 1. [`deform::generate`] creates the `DEF_` anchors from selected meshes
//! 2. [`detect::detect`] measures them into a [`VehicleGeometry`]
//! 3. [`synth::synthesize`] places every control node
//! 4. [`wire::wire`] declares constraints, drivers, locks and widgets
//! 5. [`collections::assign`] dispatches nodes into themed collections
//!
//! Steps 2 to 5 are run together by [`generate`], which only replaces the
//! caller's rig once the result validates.
//!
//! # Example
//!
//! ```
//! use carrig_rig::{deform, generate, DeformRigOptions, GenerateOptions, GenerateOutcome};
//! use carrig_spec::MemoryScene;
//!
//! let mut scene = MemoryScene::new();
//! let deformation = deform::generate(&mut scene, &[], &DeformRigOptions::new()).unwrap();
//! let mut rig = deformation.rig;
//!
//! let outcome = generate(&mut rig, &scene, &GenerateOptions::new()).unwrap();
//! assert!(matches!(outcome, GenerateOutcome::Generated(_)));
//! assert!(rig.has_node("MCH_SteeringRotation"));
//! ```
//!
//! # Modules
//!
//! - [`analyzer`]: Bounding boxes of anchors and their attached meshes
//! - [`collections`]: Collection assignment
//! - [`deform`]: Deformation rig generation from meshes
//! - [`detect`]: Wheel detection into typed geometry
//! - [`error`]: Error types
//! - [`generator`]: The generation pipeline and its options
//! - [`maintenance`]: Ground assignment and brake creation on generated rigs
//! - [`synth`]: Topology synthesis
//! - [`wire`]: Constraint and driver network

pub mod analyzer;
pub mod collections;
pub mod deform;
pub mod detect;
pub mod error;
pub mod generator;
pub mod maintenance;
pub mod synth;
pub mod wire;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types at the crate root
pub use carrig_spec::VehicleGeometry;
pub use deform::{DeformRig, DeformRigOptions, MeshTarget};
pub use error::{RigError, RigResult};
pub use generator::{generate, is_control_rig, GenerateOptions, GenerateOutcome, GenerationSummary};
pub use maintenance::{add_missing_brakes, set_ground};
pub use wire::{WireStats, DEFAULT_WIDGET_PREFIX};
