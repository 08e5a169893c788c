//! CLI command implementations

pub mod bake;
pub mod inspect;
pub mod path;
pub mod rig;

mod reporting;
