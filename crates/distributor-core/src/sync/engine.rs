//! SyncOrchestrator implementation
//!
//! Sequences one convergence pass: verify and repair the warehouse folders
//! and the configuration file, archive each category, then reconcile the
//! server's mod folders with the local ones.

use std::path::PathBuf;

use distributor_fs::FileSystem;
use tracing::{debug, info, warn};

use crate::Result;
use crate::archive::{Archiver, ZipArchiver};
use crate::config::{self, DistributionConfig, FtpSettings};
use crate::reconcile::{ModSet, reconcile};
use crate::remote::{RemoteConnector, TransportResult};
use crate::schema::{RepairResult, SchemaNode, TreeRepairer, TreeVerifier, presets};
use crate::warehouse::{ModCategory, Warehouse};

use super::report::{
    ArchiveReport, CategoryReport, ConvergenceReport, RunState, SyncReport, WarehouseReport,
    final_state,
};

/// A category pushed to a folder on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySync {
    pub category: ModCategory,
    pub remote_dir: String,
}

impl CategorySync {
    pub fn new(category: ModCategory, remote_dir: impl Into<String>) -> Self {
        Self {
            category,
            remote_dir: remote_dir.into(),
        }
    }

    /// Server mods go to the server's `mods` folder. Client mods are only
    /// archived.
    pub fn defaults() -> Vec<Self> {
        vec![Self::new(ModCategory::Server, "./mods")]
    }
}

/// Options for a pass
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Compute plans without archiving or touching the server.
    /// Local folder and config repairs still happen.
    pub dry_run: bool,
}

/// Receives each phase's result as soon as it is known.
///
/// Every method defaults to doing nothing.
pub trait SyncObserver {
    fn state_changed(&mut self, _state: RunState) {}

    fn converged(&mut self, _report: &ConvergenceReport) {}

    fn archived(&mut self, _reports: &[ArchiveReport]) {}

    fn category_synced(&mut self, _report: &CategoryReport) {}
}

impl SyncObserver for () {}

/// The state of one run and every state it went through.
struct Run<'o> {
    state: RunState,
    history: Vec<RunState>,
    observer: &'o mut dyn SyncObserver,
}

impl<'o> Run<'o> {
    fn new(observer: &'o mut dyn SyncObserver) -> Self {
        Self {
            state: RunState::Unverified,
            history: vec![RunState::Unverified],
            observer,
        }
    }

    fn advance(&mut self, next: RunState) {
        debug!(from = ?self.state, to = ?next, "Run state");
        self.state = next;
        self.history.push(next);
        self.observer.state_changed(next);
    }
}

/// Orchestrates verification, repair, archiving and remote sync.
pub struct SyncOrchestrator<'a, F: FileSystem> {
    fs: &'a F,
    warehouse: Warehouse,
    connector: Box<dyn RemoteConnector + 'a>,
    archiver: Box<dyn Archiver + 'a>,
    warehouse_schema: SchemaNode,
    config_schema: SchemaNode,
    targets: Vec<CategorySync>,
    options: SyncOptions,
}

impl<'a, F: FileSystem> SyncOrchestrator<'a, F> {
    /// Create an orchestrator for the project at `root` with the shipped
    /// warehouse schema, the `[FTP]` config schema and [`ZipArchiver`].
    pub fn new(
        fs: &'a F,
        root: impl Into<PathBuf>,
        connector: impl RemoteConnector + 'a,
    ) -> Self {
        Self {
            fs,
            warehouse: Warehouse::new(root),
            connector: Box::new(connector),
            archiver: Box::new(ZipArchiver::new()),
            warehouse_schema: presets::warehouse(),
            config_schema: presets::ftp_config(),
            targets: CategorySync::defaults(),
            options: SyncOptions::default(),
        }
    }

    pub fn with_config_schema(mut self, schema: SchemaNode) -> Self {
        self.config_schema = schema;
        self
    }

    pub fn with_warehouse_schema(mut self, schema: SchemaNode) -> Self {
        self.warehouse_schema = schema;
        self
    }

    pub fn with_archiver(mut self, archiver: impl Archiver + 'a) -> Self {
        self.archiver = Box::new(archiver);
        self
    }

    pub fn with_targets(mut self, targets: Vec<CategorySync>) -> Self {
        self.targets = targets;
        self
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn warehouse(&self) -> &Warehouse {
        &self.warehouse
    }

    /// Verify and repair the warehouse folders and the configuration file.
    ///
    /// # Errors
    ///
    /// Scan and repair failures are fatal for the whole run. A damaged
    /// configuration file is not an error: it is regenerated.
    pub fn converge(&self) -> Result<ConvergenceReport> {
        self.converge_in(&mut Run::new(&mut ()))
    }

    fn converge_in(&self, run: &mut Run<'_>) -> Result<ConvergenceReport> {
        run.advance(RunState::Verifying);

        let root = self.warehouse.warehouse_path();
        let diff = TreeVerifier::new(self.fs).verify(&self.warehouse_schema, &root)?;
        let repair = if diff.is_converged() {
            RepairResult::default()
        } else {
            run.advance(RunState::Repairing);
            TreeRepairer::new(self.fs).repair(&diff, &root)?
        };

        let config = config::verify_and_repair(
            self.fs,
            &self.warehouse.config_path(),
            &self.config_schema,
        )?;
        if config.was_written() && run.state == RunState::Verifying {
            run.advance(RunState::Repairing);
        }

        run.advance(RunState::Converged);
        let report = ConvergenceReport {
            warehouse: WarehouseReport { diff, repair },
            config,
        };
        info!(repaired = report.paths_repaired(), "Project converged");
        run.observer.converged(&report);
        Ok(report)
    }

    /// Archive every category. Skipped entirely on a dry run.
    pub fn archive(&self) -> Result<Vec<ArchiveReport>> {
        if self.options.dry_run {
            return Ok(Vec::new());
        }
        let mut reports = Vec::new();
        for category in ModCategory::ALL {
            let mods = self.warehouse.local_mods(self.fs, category)?;
            let outcome = self.archiver.archive(
                self.fs,
                category,
                &self.warehouse.mods_path(category),
                &mods,
                &self.warehouse.archive_path(category),
            )?;
            reports.push(ArchiveReport { category, outcome });
        }
        Ok(reports)
    }

    /// Reconcile each configured category with the server.
    ///
    /// # Errors
    ///
    /// Incomplete or mistyped connection settings and local scan failures
    /// abort the run. Transport failures only stop the affected category and
    /// are recorded in its [`CategoryReport`].
    pub fn sync_remote(&self) -> Result<Vec<CategoryReport>> {
        self.sync_targets(&mut ())
    }

    fn sync_targets(&self, observer: &mut dyn SyncObserver) -> Result<Vec<CategoryReport>> {
        if self.targets.is_empty() {
            return Ok(Vec::new());
        }

        let config = DistributionConfig::load(self.fs, &self.warehouse.config_path())?;
        let settings = config.ftp()?;

        let mut reports = Vec::new();
        for target in &self.targets {
            let local = self.warehouse.local_mods(self.fs, target.category)?;
            let mut report = CategoryReport::new(target.category, &target.remote_dir);
            if let Err(e) = self.sync_category(settings, target, &local, &mut report) {
                warn!(category = %target.category, error = %e, "Category sync failed");
                report.error = Some(e.to_string());
            }
            observer.category_synced(&report);
            reports.push(report);
        }
        Ok(reports)
    }

    /// Deletes run strictly before uploads so a replaced mod never
    /// coexists with its successor on the server.
    fn sync_category(
        &self,
        settings: &FtpSettings,
        target: &CategorySync,
        local: &ModSet,
        report: &mut CategoryReport,
    ) -> TransportResult<()> {
        let mut store = self.connector.connect(settings)?;
        let remote = store.list_names(&target.remote_dir)?;
        report.plan = reconcile(local, &remote);
        debug!(
            category = %target.category,
            upload = report.plan.to_upload.len(),
            delete = report.plan.to_delete.len(),
            "Computed plan"
        );

        if self.options.dry_run {
            return Ok(());
        }

        for name in &report.plan.to_delete {
            store.remove(&target.remote_dir, name)?;
            info!(category = %target.category, mod_name = %name, "Removed from server");
            report.deleted.push(name.clone());
        }

        let source = self.warehouse.mods_path(target.category);
        for name in &report.plan.to_upload {
            store.put(&source.join(name.as_str()), &target.remote_dir, name)?;
            info!(category = %target.category, mod_name = %name, "Uploaded to server");
            report.uploaded.push(name.clone());
        }
        Ok(())
    }

    /// Run a full pass: converge, archive, sync.
    pub fn run(&self) -> Result<SyncReport> {
        self.run_observed(&mut ())
    }

    /// Run a full pass, reporting each phase to `observer` as it completes.
    pub fn run_observed(&self, observer: &mut dyn SyncObserver) -> Result<SyncReport> {
        let mut run = Run::new(observer);
        let convergence = self.converge_in(&mut run)?;

        let archives = self.archive()?;
        run.observer.archived(&archives);

        run.advance(RunState::Syncing);
        let categories = self.sync_targets(&mut *run.observer)?;
        run.advance(final_state(&categories, self.options.dry_run));

        Ok(SyncReport {
            state: run.state,
            history: run.history,
            dry_run: self.options.dry_run,
            convergence,
            archives,
            categories,
        })
    }
}
