//! Structured results of each orchestrator phase
//!
//! The engine never prints; callers render these reports.

use serde::Serialize;

use crate::archive::ArchiveOutcome;
use crate::config::ConfigReport;
use crate::reconcile::{ModName, ReconciliationPlan};
use crate::schema::{DiffResult, RepairResult};
use crate::warehouse::ModCategory;

/// Where a run is in its lifecycle.
///
/// `Unverified -> Verifying -> [Repairing ->] Converged -> Syncing -> Synced | SyncFailed`.
/// A run that changed nothing remotely ends in `Converged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    Unverified,
    Verifying,
    Repairing,
    Converged,
    Syncing,
    Synced,
    SyncFailed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Converged | Self::Synced | Self::SyncFailed)
    }
}

/// Verification and repair of the warehouse folders.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WarehouseReport {
    pub diff: DiffResult,
    pub repair: RepairResult,
}

/// Result of the verify-and-repair phase for warehouse and configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ConvergenceReport {
    pub warehouse: WarehouseReport,
    pub config: ConfigReport,
}

impl ConvergenceReport {
    /// Paths (folders and config keys) created by this phase.
    pub fn paths_repaired(&self) -> usize {
        self.warehouse.repair.created.len() + self.config.repair.created.len()
    }

    /// True when nothing had to be repaired.
    pub fn was_converged(&self) -> bool {
        self.warehouse.diff.is_converged() && !self.config.was_written()
    }
}

/// Archive step result for one category.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveReport {
    pub category: ModCategory,
    pub outcome: ArchiveOutcome,
}

/// Remote sync result for one category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryReport {
    pub category: ModCategory,
    pub remote_dir: String,
    pub plan: ReconciliationPlan,
    pub deleted: Vec<ModName>,
    pub uploaded: Vec<ModName>,
    /// Transport failure that stopped this category, if any
    pub error: Option<String>,
}

impl CategoryReport {
    pub fn new(category: ModCategory, remote_dir: impl Into<String>) -> Self {
        Self {
            category,
            remote_dir: remote_dir.into(),
            plan: ReconciliationPlan::default(),
            deleted: Vec::new(),
            uploaded: Vec::new(),
            error: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary of a full pass.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub state: RunState,
    /// Every state the run went through, starting at `Unverified`
    pub history: Vec<RunState>,
    pub dry_run: bool,
    pub convergence: ConvergenceReport,
    pub archives: Vec<ArchiveReport>,
    pub categories: Vec<CategoryReport>,
}

impl SyncReport {
    pub fn paths_repaired(&self) -> usize {
        self.convergence.paths_repaired()
    }

    pub fn mods_uploaded(&self) -> usize {
        self.categories.iter().map(|c| c.uploaded.len()).sum()
    }

    pub fn mods_deleted(&self) -> usize {
        self.categories.iter().map(|c| c.deleted.len()).sum()
    }

    pub fn is_success(&self) -> bool {
        self.state != RunState::SyncFailed
    }
}

/// Terminal state for a set of category results.
pub fn final_state(categories: &[CategoryReport], dry_run: bool) -> RunState {
    if categories.iter().any(|c| !c.succeeded()) {
        RunState::SyncFailed
    } else if !dry_run && categories.iter().any(|c| !c.plan.is_empty()) {
        RunState::Synced
    } else {
        RunState::Converged
    }
}
