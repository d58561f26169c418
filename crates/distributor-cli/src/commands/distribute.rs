//! The distribute command
//!
//! Runs one full orchestrator pass and renders each phase as it completes.

use std::path::Path;

use colored::Colorize;

use distributor_core::archive::ArchiveOutcome;
use distributor_core::sync::ArchiveReport;
use distributor_core::{
    CategoryReport, ConfigStatus, ConvergenceReport, Error, RunState, ServerConnector,
    SyncObserver, SyncOrchestrator,
};
use distributor_fs::{LocalFileSystem, WarehousePath};

use crate::error::{CliError, Result};

/// Run a full pass in the project at `path`.
pub fn run_distribute(path: &Path) -> Result<()> {
    let fs = LocalFileSystem::new();
    let orchestrator = SyncOrchestrator::new(&fs, path, ServerConnector::default());

    let report = match orchestrator.run_observed(&mut Progress) {
        Ok(report) => report,
        Err(Error::ConfigIncomplete { keys }) => {
            return Err(CliError::user(format!(
                "Please fill in {} in {} before running again",
                keys.join(", "),
                WarehousePath::ConfigFile
            )));
        }
        Err(e) => return Err(e.into()),
    };

    println!();
    println!(
        "Repaired {} paths, uploaded {} mods, deleted {} mods.",
        report.paths_repaired(),
        report.mods_uploaded(),
        report.mods_deleted()
    );

    match report.state {
        RunState::SyncFailed => Err(CliError::user("Synchronization failed")),
        _ => Ok(()),
    }
}

/// Prints phase headers and results while the pass runs.
struct Progress;

impl SyncObserver for Progress {
    fn state_changed(&mut self, state: RunState) {
        match state {
            RunState::Verifying => {
                println!("{} Verifying project structure...", "=>".blue().bold())
            }
            RunState::Syncing => {
                println!("{} Synchronizing server mods...", "=>".blue().bold())
            }
            _ => {}
        }
    }

    fn converged(&mut self, report: &ConvergenceReport) {
        render_convergence(report);
    }

    fn archived(&mut self, reports: &[ArchiveReport]) {
        println!("{} Archiving mods...", "=>".blue().bold());
        render_archives(reports);
    }

    fn category_synced(&mut self, report: &CategoryReport) {
        render_category(report);
    }
}

fn render_convergence(report: &ConvergenceReport) {
    if report.was_converged() {
        println!("{} Project structure is healthy.", "OK".green().bold());
    }

    let warehouse = WarehousePath::Warehouse;
    for path in &report.warehouse.repair.created {
        println!("   {} created {}/{}", "+".green(), warehouse, path.to_string().cyan());
    }
    for path in &report.warehouse.repair.already_present {
        println!("   {} {}/{} appeared meanwhile", "=".dimmed(), warehouse, path);
    }
    for path in &report.warehouse.diff.unexpected {
        println!(
            "   {} unexpected {}/{} (left in place)",
            "?".yellow(),
            warehouse,
            path.to_string().yellow()
        );
    }

    let config = &report.config;
    match &config.status {
        ConfigStatus::Valid => {}
        ConfigStatus::Created => {
            println!("   {} created {}", "+".green(), WarehousePath::ConfigFile.to_string().cyan());
        }
        ConfigStatus::Repaired => {
            for key in &config.repair.created {
                println!("   {} added missing key {}", "+".green(), key.dotted().cyan());
            }
        }
        ConfigStatus::Regenerated { reason } => {
            println!(
                "   {} {} was damaged ({}), regenerated defaults",
                "!".red(),
                WarehousePath::ConfigFile,
                reason
            );
        }
    }
    for key in &config.diff.unexpected {
        println!("   {} unexpected key {}", "?".yellow(), key.dotted().yellow());
    }
}

fn render_archives(reports: &[ArchiveReport]) {
    for report in reports {
        match &report.outcome {
            ArchiveOutcome::Archived { version, files, .. } => println!(
                "   {} {}: archived {} mods as v{}",
                "+".green(),
                report.category,
                files,
                version
            ),
            ArchiveOutcome::Unchanged { version } => println!(
                "   {} {}: archive v{} is up to date",
                "=".dimmed(),
                report.category,
                version
            ),
            ArchiveOutcome::Skipped { reason } => {
                println!("   {} {}: skipped, {}", "-".dimmed(), report.category, reason)
            }
        }
    }
}

fn render_category(report: &CategoryReport) {
    for name in &report.deleted {
        println!("   {} removed {} from {}", "-".red(), name.to_string().cyan(), report.remote_dir);
    }
    for name in &report.uploaded {
        println!("   {} uploaded {} to {}", "+".green(), name.to_string().cyan(), report.remote_dir);
    }
    match &report.error {
        Some(error) => println!("   {} {}: {}", "!".red(), report.category, error),
        None if report.plan.is_empty() => println!(
            "{} {} mods on the server are up to date.",
            "OK".green().bold(),
            report.category
        ),
        None => {}
    }
}
