//! Carrig End-to-End Test Infrastructure
//!
//! This crate provides integration tests across the workspace:
//!
//! - Generation: scene meshes -> deformation rig -> control rig
//! - Baking: path follow, wheel and steering bakes over generated rigs
//! - Documents: CLI commands over vehicle documents on disk
//! - Properties: naming, determinism and decimation invariants (proptest)
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p carrig-tests
//! ```

pub mod fixtures;

pub use fixtures::{animated, rigged};
