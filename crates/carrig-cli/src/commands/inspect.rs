//! Inspect command implementation
//!
//! Prints the node tree, the measured vehicle geometry, the driver network
//! and the animation of a vehicle document.

use anyhow::{Context, Result};
use carrig_bake::MemoryHost;
use carrig_rig::detect::detect;
use carrig_spec::{EdgeKind, Rig, VehicleGeometry};
use colored::Colorize;
use serde::Serialize;
use std::process::ExitCode;

use crate::document;

/// Machine-readable inspection summary.
#[derive(Debug, Serialize)]
pub struct InspectOutput {
    pub rig: String,
    pub generated: bool,
    pub nodes: usize,
    pub constraints: usize,
    pub drivers: usize,
    pub parent_edges: usize,
    pub constraint_edges: usize,
    pub driver_edges: usize,
    pub acyclic: bool,
    pub properties: Vec<String>,
    pub collections: Vec<String>,
    pub curves: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_range: Option<(i32, i32)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<VehicleGeometry>,
}

impl InspectOutput {
    pub fn from_host(host: &MemoryHost) -> Self {
        let rig = &host.rig;
        let graph = rig.dependency_graph();
        Self {
            rig: rig.name.clone(),
            generated: rig.generated,
            nodes: rig.nodes.len(),
            constraints: rig.nodes.iter().map(|n| n.constraints.len()).sum(),
            drivers: rig.drivers.len(),
            parent_edges: graph.edge_count(EdgeKind::Parent),
            constraint_edges: graph.edge_count(EdgeKind::ConstraintTarget),
            driver_edges: graph.edge_count(EdgeKind::Driver),
            acyclic: graph.check_acyclic().is_ok(),
            properties: rig.properties.iter().map(|p| p.name.clone()).collect(),
            collections: rig.collections.iter().map(|c| c.name.clone()).collect(),
            curves: host
                .action
                .iter()
                .flat_map(|a| a.curves.iter())
                .map(|c| format!("{} ({} keys)", c.path, c.len()))
                .collect(),
            frame_range: host.action.as_ref().and_then(|a| a.frame_range()),
            geometry: detect(rig, &host.scene).ok(),
        }
    }
}

/// Run the inspect command
///
/// # Arguments
/// * `path` - Path to the vehicle document
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(path: &str, json_output: bool) -> Result<ExitCode> {
    let host = document::load(path)?;
    let output = InspectOutput::from_host(&host);

    if json_output {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialize output")?;
        println!("{}", json);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} {}", "Rig:".cyan().bold(), output.rig);
    print_tree(&host.rig);

    println!("\n{}", "Network:".cyan().bold());
    println!(
        "  {} constraints, {} drivers",
        output.constraints, output.drivers
    );
    println!(
        "  edges: {} parent, {} constraint target, {} driver",
        output.parent_edges, output.constraint_edges, output.driver_edges
    );
    if output.acyclic {
        println!("  {}", "acyclic".green());
    } else {
        println!("  {}", "cycle detected".red().bold());
    }

    if let Some(geometry) = &output.geometry {
        println!("\n{}", "Geometry:".cyan().bold());
        println!(
            "  width {:.3}, length {:.3}, height {:.3}",
            geometry.width(),
            geometry.length(),
            geometry.height()
        );
        for group in geometry.occupied_groups() {
            println!("  {}: {} wheel(s)", group.corner(), group.len());
        }
    }

    if !output.properties.is_empty() {
        println!("\n{}", "Properties:".cyan().bold());
        for name in &output.properties {
            println!("  {}", name);
        }
    }

    if !output.curves.is_empty() {
        println!("\n{}", "Animation:".cyan().bold());
        if let Some((start, end)) = output.frame_range {
            println!("  frames {}..{}", start, end);
        }
        for curve in &output.curves {
            println!("  {}", curve.dimmed());
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_tree(rig: &Rig) {
    for root in rig.nodes.roots() {
        print_node(rig, &root.name, 1);
    }
}

fn print_node(rig: &Rig, name: &str, depth: usize) {
    let constraints = rig.node(name).map(|n| n.constraints.len()).unwrap_or(0);
    if constraints > 0 {
        println!("{}{} {}", "  ".repeat(depth), name, format!("[{}]", constraints).dimmed());
    } else {
        println!("{}{}", "  ".repeat(depth), name);
    }
    for child in rig.nodes.children(name) {
        print_node(rig, &child.name, depth + 1);
    }
}
