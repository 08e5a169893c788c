//! Rig generation and maintenance commands
//!
//! `deform`, `generate`, `set-ground` and `add-brakes`.

use anyhow::{bail, Context, Result};
use carrig_rig::{
    add_missing_brakes, deform, generate, set_ground, DeformRigOptions, GenerateOptions,
    GenerateOutcome,
};
use carrig_spec::{SceneGraph, ShrinkwrapMode};
use colored::Colorize;
use std::process::ExitCode;

use super::reporting;
use crate::document;

/// Run the deform command
///
/// # Arguments
/// * `path` - Path to the vehicle document
/// * `out` - Output path (default: overwrite the document)
/// * `meshes` - Candidate mesh names; every mesh of the scene when empty
/// * `options` - Deformation rig options
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run_deform(
    path: &str,
    out: Option<&str>,
    meshes: &[String],
    options: &DeformRigOptions,
) -> Result<ExitCode> {
    println!("{} {}", "Deformation rig:".cyan().bold(), path);
    let mut host = document::load(path)?;

    let candidates: Vec<String> = if meshes.is_empty() {
        host.scene
            .objects()
            .into_iter()
            .filter(|o| o.is_mesh())
            .map(|o| o.name.clone())
            .collect()
    } else {
        meshes.to_vec()
    };

    let deformation = deform::generate(&mut host.scene, &candidates, options)
        .context("Failed to generate the deformation rig")?;
    for target in &deformation.targets {
        println!("  {} {} -> {}", "+".green(), target.object, target.anchor);
    }
    println!(
        "  {} nodes, {} meshes attached",
        deformation.rig.nodes.len(),
        deformation.targets.len()
    );
    host.rig = deformation.rig;
    host.action = None;
    host.pose.clear();
    host.selection.clear();

    reporting::saved(&host, path, out, "Deformation rig generated")
}

/// Run the generate command
pub fn run_generate(path: &str, out: Option<&str>, options: &GenerateOptions) -> Result<ExitCode> {
    println!("{} {}", "Control rig:".cyan().bold(), path);
    let mut host = document::load(path)?;

    let outcome = generate(&mut host.rig, &host.scene, options)
        .context("Failed to generate the control rig")?;
    match outcome {
        GenerateOutcome::AlreadyGenerated => {
            println!("  {} Control rig already generated, nothing to do", "i".blue());
            Ok(ExitCode::SUCCESS)
        }
        GenerateOutcome::Generated(summary) => {
            println!(
                "  {} wheels, {} nodes created, {} constraints, {} drivers, {} collections",
                summary.geometry.wheels().count(),
                summary.nodes_created,
                summary.wiring.constraints,
                summary.wiring.drivers,
                summary.collections
            );
            if summary.wiring.skipped > 0 {
                println!(
                    "  {} {} constraints or drivers skipped",
                    "!".yellow(),
                    summary.wiring.skipped
                );
            }
            reporting::saved(&host, path, out, "Control rig generated")
        }
    }
}

/// Run the set-ground command
pub fn run_set_ground(
    path: &str,
    out: Option<&str>,
    ground: Option<&str>,
    project: bool,
) -> Result<ExitCode> {
    let mut host = document::load(path)?;
    let mode = if project {
        ShrinkwrapMode::Project
    } else {
        ShrinkwrapMode::NearestSurface
    };
    let updated = set_ground(&mut host.rig, &host.scene, ground, mode)
        .context("Failed to set the ground")?;
    println!(
        "  {} ground projections set to {}",
        updated,
        ground.unwrap_or("none")
    );
    reporting::saved(&host, path, out, "Ground updated")
}

/// Run the add-brakes command
pub fn run_add_brakes(path: &str, out: Option<&str>, wheels: &[String]) -> Result<ExitCode> {
    let mut host = document::load(path)?;
    if !host.rig.generated {
        bail!("'{}' has no control rig; run `carrig generate` first", path);
    }
    let selected = if wheels.is_empty() {
        host.selection.clone()
    } else {
        wheels.to_vec()
    };

    let created = add_missing_brakes(&mut host.rig, &selected, carrig_rig::DEFAULT_WIDGET_PREFIX)
        .context("Failed to add brakes")?;
    if created.is_empty() {
        println!("  {} No brake to add", "i".blue());
    }
    for brake in &created {
        println!("  {} {}", "+".green(), brake);
    }
    reporting::saved(&host, path, out, "Brakes added")
}
