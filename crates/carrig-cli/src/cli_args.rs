//! CLI argument definitions for the carrig command-line interface.
//!
//! All `#[derive(Parser)]` and `#[derive(Subcommand)]` types are defined here,
//! keeping `main.rs` focused on dispatch logic.

use clap::{Args, Parser, Subcommand};

/// Carrig - Procedural vehicle rigs and motion baking
#[derive(Parser)]
#[command(name = "carrig")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// The vehicle document a command reads and writes.
#[derive(Args, Debug, Clone)]
pub(crate) struct DocumentArgs {
    /// Path to the vehicle document (JSON)
    pub document: String,

    /// Write the updated document here instead of in place
    #[arg(short, long)]
    pub out: Option<String>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Generate a deformation rig from the meshes of the scene
    Deform {
        #[command(flatten)]
        doc: DocumentArgs,

        /// Candidate mesh names (default: every mesh of the scene)
        #[arg(short, long = "mesh")]
        meshes: Vec<String>,

        /// Number of front wheel pairs (default: detected)
        #[arg(long)]
        front_pairs: Option<u32>,

        /// Number of back wheel pairs (default: detected)
        #[arg(long)]
        back_pairs: Option<u32>,

        /// Number of front brake pairs (default: detected)
        #[arg(long)]
        front_brakes: Option<u32>,

        /// Number of back brake pairs (default: detected)
        #[arg(long)]
        back_brakes: Option<u32>,
    },

    /// Generate the control rig on top of the deformation rig
    Generate {
        #[command(flatten)]
        doc: DocumentArgs,

        /// Do not dispatch nodes into collections
        #[arg(long)]
        no_collections: bool,

        /// Prefix of widget shape names
        #[arg(long)]
        widget_prefix: Option<String>,
    },

    /// Assign a ground object to every ground projection
    SetGround {
        #[command(flatten)]
        doc: DocumentArgs,

        /// Ground object name (omit to clear the ground)
        #[arg(short, long)]
        ground: Option<String>,

        /// Project along the sensor axis instead of using the nearest surface
        #[arg(long)]
        project: bool,
    },

    /// Create missing brake controls for wheel controls
    AddBrakes {
        #[command(flatten)]
        doc: DocumentArgs,

        /// Wheel controls to complete (default: the document selection)
        #[arg(short, long = "wheel")]
        wheels: Vec<String>,
    },

    /// Make the rig follow a path object and bake the motion
    FollowPath {
        #[command(flatten)]
        doc: DocumentArgs,

        /// Curve object to follow
        #[arg(short, long)]
        path: String,

        /// Ground object for the ground projections
        #[arg(short, long)]
        ground: Option<String>,

        /// First frame of the traversal
        #[arg(long, default_value = "1")]
        start: i32,

        /// Last frame of the traversal (ignored with --kmh)
        #[arg(long, default_value = "241")]
        end: i32,

        /// Constant speed in km/h; the last frame follows from the path length
        #[arg(long)]
        kmh: Option<f64>,

        /// Frames per second for --kmh (default: the document frame rate)
        #[arg(long)]
        fps: Option<f64>,

        /// Skip the steering bake
        #[arg(long)]
        no_steering: bool,

        /// Skip the wheel bake
        #[arg(long)]
        no_wheels: bool,

        /// Keep previously baked channels
        #[arg(long)]
        keep_previous: bool,
    },

    /// Remove the path constraint and its keyed offset
    ClearPath {
        #[command(flatten)]
        doc: DocumentArgs,
    },

    /// Bake wheel spin or steering into animation properties
    Bake {
        #[command(subcommand)]
        command: BakeCommands,
    },

    /// Remove baked steering and wheel animation
    Clear {
        #[command(flatten)]
        doc: DocumentArgs,

        /// Keep the steering animation
        #[arg(long)]
        no_steering: bool,

        /// Keep the wheel animation
        #[arg(long)]
        no_wheels: bool,
    },

    /// Print the rig tree, geometry and driver network of a document
    Inspect {
        /// Path to the vehicle document (JSON)
        document: String,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub(crate) enum BakeCommands {
    /// Bake WheelRotation_* properties
    Wheels {
        #[command(flatten)]
        doc: DocumentArgs,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// Bake the SteeringRotation property
    Steering {
        #[command(flatten)]
        doc: DocumentArgs,

        #[command(flatten)]
        range: RangeArgs,

        /// Multiplier of the steering displacement (at least 0.1)
        #[arg(long, default_value = "1.0")]
        factor: f64,
    },
}

/// Frame range and decimation shared by the bake commands.
#[derive(Args, Debug, Clone)]
pub(crate) struct RangeArgs {
    /// First frame (default: start of the animation)
    #[arg(long)]
    pub start: Option<i32>,

    /// Last frame (default: end of the animation)
    #[arg(long)]
    pub end: Option<i32>,

    /// Keyframe tolerance
    #[arg(long, default_value = "0.01")]
    pub tolerance: f64,
}
