//! Carrig CLI library.
//!
//! This crate provides the command implementations of the `carrig` binary.
//! Every command loads a vehicle document, runs one rig or bake operation
//! and writes the document back.

pub mod commands;
pub mod document;
