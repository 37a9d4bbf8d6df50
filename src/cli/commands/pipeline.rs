//! `init` / `generate` / `update` / `status` / `doctor` command handlers.

use crate::config::Settings;
use crate::error::SkellyResult;
use crate::orchestrator::{self, DoctorReport, RunReport, StatusReport, UpdateReport};
use crate::output::OutputFormat;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::path::Path;
use std::str::FromStr;

pub fn init(root: &Path, settings: &Settings) -> SkellyResult<()> {
    orchestrator::init(root, settings)?;
    println!("{}", "initialized .skelly context directory".green());
    Ok(())
}

pub fn generate(root: &Path, settings: &Settings, lang: Option<&str>, format: &str, json: bool) -> SkellyResult<()> {
    let format = parse_format(format)?;
    let report = orchestrator::generate(root, settings, lang, format)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
    } else {
        print_run_report(&report);
    }
    Ok(())
}

pub fn update(root: &Path, settings: &Settings, format: &str, explain: bool, json: bool) -> SkellyResult<()> {
    let format = parse_format(format)?;
    let report = orchestrator::update(root, settings, format, explain)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
    } else {
        print_update_report(&report);
    }
    Ok(())
}

pub fn status(root: &Path, settings: &Settings, json: bool) -> SkellyResult<()> {
    let report = orchestrator::status(root, settings)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
    } else {
        print_status_report(&report);
    }
    Ok(())
}

pub fn doctor(root: &Path, settings: &Settings, json: bool) -> SkellyResult<()> {
    let report = orchestrator::doctor(root, settings)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
    } else {
        print_doctor_report(&report);
    }
    Ok(())
}

fn parse_format(format: &str) -> SkellyResult<OutputFormat> {
    OutputFormat::from_str(format).map_err(|reason| crate::error::SkellyError::UnsupportedInput { reason })
}

fn print_run_report(report: &RunReport) {
    println!(
        "parsed {} files, {} symbols, {}/{} artifacts rewritten",
        report.files_parsed, report.symbols, report.artifacts_written, report.artifacts_total
    );
    for issue in &report.issues {
        println!("  {} {issue}", "warning:".yellow());
    }
}

fn print_update_report(report: &UpdateReport) {
    if report.regenerated {
        println!("{}", "state was absent or stale; ran a full generate".yellow());
        return;
    }
    println!(
        "{} changed, {} deleted, {}/{} artifacts rewritten",
        report.changed.len(),
        report.deleted.len(),
        report.artifacts_written,
        report.artifacts_total
    );
    if !report.impact.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["file", "reason"]);
        for entry in &report.impact {
            table.add_row(vec![entry.file.clone(), entry.reason.clone()]);
        }
        println!("{table}");
    }
}

fn print_status_report(report: &StatusReport) {
    if !report.state_present {
        println!("{}", "no state found; run 'skelly generate' first".red());
        return;
    }
    println!("{} changed, {} deleted", report.changed.len(), report.deleted.len());
    if !report.impact.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["file", "reason"]);
        for entry in &report.impact {
            table.add_row(vec![entry.file.clone(), entry.reason.clone()]);
        }
        println!("{table}");
    }
}

fn print_doctor_report(report: &DoctorReport) {
    let mut table = Table::new();
    table.set_header(vec!["check", "value"]);
    table.add_row(vec!["context dir".to_string(), report.context_dir_exists.to_string()]);
    table.add_row(vec!["format".to_string(), report.format_detected.clone().unwrap_or_else(|| "none".to_string())]);
    table.add_row(vec!["state".to_string(), report.state_present.to_string()]);
    table.add_row(vec!["stale files".to_string(), report.stale_files.to_string()]);
    for integration in &report.integrations {
        table.add_row(vec!["integration".to_string(), integration.clone()]);
    }
    for (lang, available) in &report.language_servers {
        table.add_row(vec![format!("lsp: {lang}"), available.to_string()]);
    }
    println!("{table}");
}
