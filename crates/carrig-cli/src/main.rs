//! Carrig CLI - Command-line interface for procedural vehicle rigs
//!
//! This binary generates vehicle rigs from scene meshes and bakes their
//! motion into animation properties, working on JSON vehicle documents.

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli_args;

use carrig_bake::{ClearOptions, FollowPathOptions, SteeringBakeSettings, WheelBakeSettings};
use carrig_cli::commands;
use carrig_rig::{DeformRigOptions, GenerateOptions};
use cli_args::{BakeCommands, Cli, Commands, RangeArgs};

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn wheel_settings(range: &RangeArgs) -> WheelBakeSettings {
    WheelBakeSettings {
        frame_start: range.start,
        frame_end: range.end,
        keyframe_tolerance: range.tolerance,
    }
}

fn steering_settings(range: &RangeArgs, factor: f64) -> SteeringBakeSettings {
    SteeringBakeSettings {
        frame_start: range.start,
        frame_end: range.end,
        rotation_factor: factor,
        keyframe_tolerance: range.tolerance,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Deform {
            doc,
            meshes,
            front_pairs,
            back_pairs,
            front_brakes,
            back_brakes,
        } => {
            let mut options = DeformRigOptions::new();
            options.front_pairs = front_pairs;
            options.back_pairs = back_pairs;
            options.front_brake_pairs = front_brakes;
            options.back_brake_pairs = back_brakes;
            commands::rig::run_deform(&doc.document, doc.out.as_deref(), &meshes, &options)
        }
        Commands::Generate {
            doc,
            no_collections,
            widget_prefix,
        } => {
            let mut options = GenerateOptions::new().with_collections(!no_collections);
            if let Some(prefix) = widget_prefix {
                options = options.with_widget_prefix(prefix);
            }
            commands::rig::run_generate(&doc.document, doc.out.as_deref(), &options)
        }
        Commands::SetGround {
            doc,
            ground,
            project,
        } => commands::rig::run_set_ground(
            &doc.document,
            doc.out.as_deref(),
            ground.as_deref(),
            project,
        ),
        Commands::AddBrakes { doc, wheels } => {
            commands::rig::run_add_brakes(&doc.document, doc.out.as_deref(), &wheels)
        }
        Commands::FollowPath {
            doc,
            path,
            ground,
            start,
            end,
            kmh,
            fps,
            no_steering,
            no_wheels,
            keep_previous,
        } => {
            let mut options = FollowPathOptions::new(path)
                .with_bakes(!no_steering, !no_wheels)
                .with_clear_previous(!keep_previous);
            options = match kmh {
                Some(kmh) => options.with_speed(start, kmh, fps),
                None => options.with_frames(start, end),
            };
            if let Some(ground) = ground {
                options = options.with_ground(ground);
            }
            commands::path::run_follow(&doc.document, doc.out.as_deref(), &options)
        }
        Commands::ClearPath { doc } => commands::path::run_clear(&doc.document, doc.out.as_deref()),
        Commands::Bake { command } => match command {
            BakeCommands::Wheels { doc, range } => commands::bake::run_wheels(
                &doc.document,
                doc.out.as_deref(),
                &wheel_settings(&range),
            ),
            BakeCommands::Steering { doc, range, factor } => commands::bake::run_steering(
                &doc.document,
                doc.out.as_deref(),
                &steering_settings(&range, factor),
            ),
        },
        Commands::Clear {
            doc,
            no_steering,
            no_wheels,
        } => {
            let options = ClearOptions::new()
                .with_steering(!no_steering)
                .with_wheels(!no_wheels);
            commands::bake::run_clear(&doc.document, doc.out.as_deref(), &options)
        }
        Commands::Inspect { document, json } => commands::inspect::run(&document, json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
