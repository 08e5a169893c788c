//! Path-follow commands

use anyhow::Result;
use carrig_bake::{clear_follow_path, setup_follow_path, FollowPathOptions};
use colored::Colorize;
use std::process::ExitCode;

use super::reporting;
use crate::document;

/// Run `follow-path`
pub fn run_follow(path: &str, out: Option<&str>, options: &FollowPathOptions) -> Result<ExitCode> {
    println!(
        "{} {} along '{}'",
        "Follow path:".cyan().bold(),
        path,
        options.path
    );
    let mut host = document::load(path)?;
    let report = setup_follow_path(&mut host, options);
    reporting::finish(&report, &host, path, out)
}

/// Run `clear-path`
pub fn run_clear(path: &str, out: Option<&str>) -> Result<ExitCode> {
    let mut host = document::load(path)?;
    if !clear_follow_path(&mut host) {
        println!("  {} No path to clear", "i".blue());
        return Ok(ExitCode::SUCCESS);
    }
    reporting::saved(&host, path, out, "Path cleared")
}
