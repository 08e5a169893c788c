use anyhow::Result;
use carrig_bake::{BakeReport, MemoryHost, ReportLevel};
use colored::Colorize;
use std::process::ExitCode;

use crate::document;

/// Prints every message of an operation report.
pub(crate) fn print_report(report: &BakeReport) {
    for message in &report.messages {
        let marker = match message.level {
            ReportLevel::Info => "i".blue(),
            ReportLevel::Warning => "!".yellow(),
            ReportLevel::Error => "x".red(),
        };
        match &message.code {
            Some(code) => println!("  {} [{}] {}", marker, code.dimmed(), message.message),
            None => println!("  {} {}", marker, message.message),
        }
    }
}

/// Prints the report, saves the document unless the operation failed its
/// preconditions, and maps the outcome to an exit code.
pub(crate) fn finish(
    report: &BakeReport,
    host: &MemoryHost,
    path: &str,
    out: Option<&str>,
) -> Result<ExitCode> {
    print_report(report);
    if report.has_errors() {
        println!(
            "{} {} was cancelled, document left unchanged",
            "FAILED".red().bold(),
            report.operation
        );
        return Ok(ExitCode::from(1));
    }

    let written = document::save(host, path, out)?;
    let status = if report.is_cancelled() {
        "CANCELLED".yellow().bold()
    } else {
        "SUCCESS".green().bold()
    };
    println!(
        "{} {} ({} keyframes) -> {}",
        status, report.operation, report.keyframes, written
    );
    Ok(ExitCode::SUCCESS)
}

/// Prints the standard success line after saving a document.
pub(crate) fn saved(host: &MemoryHost, path: &str, out: Option<&str>, what: &str) -> Result<ExitCode> {
    let written = document::save(host, path, out)?;
    println!("{} {} -> {}", "SUCCESS".green().bold(), what, written);
    Ok(ExitCode::SUCCESS)
}
