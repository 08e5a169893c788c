//! Bake and clear commands

use anyhow::Result;
use carrig_bake::{
    bake_steering, bake_wheels, clear_baked, ClearOptions, SteeringBakeSettings,
    WheelBakeSettings,
};
use colored::Colorize;
use std::process::ExitCode;

use super::reporting;
use crate::document;

/// Run `bake wheels`
pub fn run_wheels(path: &str, out: Option<&str>, settings: &WheelBakeSettings) -> Result<ExitCode> {
    println!("{} {}", "Baking wheels:".cyan().bold(), path);
    let mut host = document::load(path)?;
    let report = bake_wheels(&mut host, settings);
    reporting::finish(&report, &host, path, out)
}

/// Run `bake steering`
pub fn run_steering(
    path: &str,
    out: Option<&str>,
    settings: &SteeringBakeSettings,
) -> Result<ExitCode> {
    println!("{} {}", "Baking steering:".cyan().bold(), path);
    let mut host = document::load(path)?;
    let report = bake_steering(&mut host, settings);
    reporting::finish(&report, &host, path, out)
}

/// Run `clear`
pub fn run_clear(path: &str, out: Option<&str>, options: &ClearOptions) -> Result<ExitCode> {
    println!("{} {}", "Clearing baked animation:".cyan().bold(), path);
    let mut host = document::load(path)?;
    let report = clear_baked(&mut host, options);
    reporting::finish(&report, &host, path, out)
}
