mod common;

use common::{COMPLETE_CONFIG, Call, FakeServer};
use distributor_core::archive::ArchiveOutcome;
use distributor_core::schema::presets;
use distributor_core::sync::ArchiveReport;
use distributor_core::{
    CategoryReport, CategorySync, ConfigStatus, ConvergenceReport, Error, ModCategory, RunState,
    SyncObserver, SyncOptions, SyncOrchestrator,
};
use rstest::rstest;
use distributor_fs::LocalFileSystem;
use distributor_test_utils::warehouse::TestWarehouse;
use pretty_assertions::assert_eq;

fn ready_project() -> TestWarehouse {
    let project = TestWarehouse::new();
    project.init_layout();
    project.write_config(COMPLETE_CONFIG);
    project
}

#[test]
fn test_full_pass_uploads_and_deletes() {
    let project = ready_project();
    project.add_mod("server", "a.jar");
    project.add_mod("server", "b.jar");
    let server = FakeServer::with_mods(&["b.jar", "c.jar"]);
    let fs = LocalFileSystem::new();

    let report = SyncOrchestrator::new(&fs, project.root(), server.clone())
        .run()
        .unwrap();

    assert_eq!(report.state, RunState::Synced);
    assert_eq!(report.mods_uploaded(), 1);
    assert_eq!(report.mods_deleted(), 1);
    assert_eq!(report.paths_repaired(), 0);
    assert_eq!(server.mods(), vec!["a.jar", "b.jar"]);
}

#[test]
fn test_deletes_happen_before_uploads() {
    let project = ready_project();
    project.add_mod("server", "JEI-2.jar");
    project.add_mod("server", "create.jar");
    let server = FakeServer::with_mods(&["jei-1.jar", "old.jar"]);
    let fs = LocalFileSystem::new();

    SyncOrchestrator::new(&fs, project.root(), server.clone())
        .run()
        .unwrap();

    let calls = server.calls();
    assert_eq!(
        calls,
        vec![
            Call::List("./mods".into()),
            Call::Remove("./mods".into(), "jei-1.jar".into()),
            Call::Remove("./mods".into(), "old.jar".into()),
            Call::Put("./mods".into(), "JEI-2.jar".into()),
            Call::Put("./mods".into(), "create.jar".into()),
        ]
    );
}

#[test]
fn test_second_run_is_converged() {
    let project = ready_project();
    project.add_mod("server", "a.jar");
    let server = FakeServer::with_mods(&["z.jar"]);
    let fs = LocalFileSystem::new();
    let orchestrator = SyncOrchestrator::new(&fs, project.root(), server.clone());

    orchestrator.run().unwrap();
    let second = orchestrator.run().unwrap();

    assert_eq!(second.state, RunState::Converged);
    assert_eq!(second.mods_uploaded(), 0);
    assert_eq!(second.mods_deleted(), 0);
}

#[test]
fn test_fresh_project_is_scaffolded_then_stops_on_empty_config() {
    let project = TestWarehouse::new();
    let fs = LocalFileSystem::new();
    let orchestrator = SyncOrchestrator::new(&fs, project.root(), FakeServer::default());

    let convergence = orchestrator.converge().unwrap();
    assert_eq!(convergence.config.status, ConfigStatus::Created);
    assert_eq!(convergence.paths_repaired(), 8);
    assert!(!convergence.was_converged());
    project.assert_dir_exists("mod_warehouse/mods/server");
    project.assert_file_exists("distribution-config.toml");

    let err = orchestrator.run().unwrap_err();
    match err {
        Error::ConfigIncomplete { keys } => {
            assert_eq!(keys, vec!["FTP.host", "FTP.user", "FTP.port"])
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_transport_failure_is_scoped_to_category() {
    let project = ready_project();
    project.add_mod("server", "a.jar");
    project.add_mod("client", "shader.jar");
    let server = FakeServer::default();
    server.0.borrow_mut().refuse_connection = true;
    let fs = LocalFileSystem::new();

    let report = SyncOrchestrator::new(&fs, project.root(), server)
        .with_targets(vec![
            CategorySync::new(ModCategory::Server, "./mods"),
            CategorySync::new(ModCategory::Client, "./client-mods"),
        ])
        .run()
        .unwrap();

    assert_eq!(report.state, RunState::SyncFailed);
    assert_eq!(report.categories.len(), 2);
    for category in &report.categories {
        let error = category.error.as_deref().unwrap();
        assert!(error.contains("sftp://ops@mc.example.org:22"), "got: {}", error);
    }
    // Archives were still produced before the sync phase
    assert_eq!(report.archives.len(), 2);
}

#[test]
fn test_partial_upload_failure_resumes_on_next_run() {
    let project = ready_project();
    project.add_mod("server", "a.jar");
    project.add_mod("server", "b.jar");
    let server = FakeServer::with_mods(&["old.jar"]);
    server.0.borrow_mut().fail_put = Some("b.jar".to_string());
    let fs = LocalFileSystem::new();
    let orchestrator = SyncOrchestrator::new(&fs, project.root(), server.clone());

    let first = orchestrator.run().unwrap();
    assert_eq!(first.state, RunState::SyncFailed);
    let category = &first.categories[0];
    assert_eq!(category.deleted.len(), 1);
    assert_eq!(category.uploaded.len(), 1);
    assert!(category.error.as_deref().unwrap().contains("b.jar"));
    assert_eq!(server.mods(), vec!["a.jar"]);

    server.0.borrow_mut().fail_put = None;
    let second = orchestrator.run().unwrap();
    assert_eq!(second.state, RunState::Synced);
    assert_eq!(second.mods_uploaded(), 1);
    assert_eq!(second.mods_deleted(), 0);
    assert_eq!(server.mods(), vec!["a.jar", "b.jar"]);
}

#[test]
fn test_dry_run_plans_without_changes() {
    let project = ready_project();
    project.add_mod("server", "a.jar");
    let server = FakeServer::with_mods(&["z.jar"]);
    let fs = LocalFileSystem::new();

    let report = SyncOrchestrator::new(&fs, project.root(), server.clone())
        .with_options(SyncOptions { dry_run: true })
        .run()
        .unwrap();

    assert_eq!(report.state, RunState::Converged);
    assert_eq!(report.categories[0].plan.to_upload.len(), 1);
    assert_eq!(report.categories[0].plan.to_delete.len(), 1);
    assert!(report.archives.is_empty());
    assert_eq!(server.mods(), vec!["z.jar"]);
    project.assert_not_exists("mod_warehouse/archives/essentials/archive.toml");
}

#[test]
fn test_archive_step_reports_skip_for_empty_category() {
    let project = ready_project();
    project.add_mod("server", "a.jar");
    let fs = LocalFileSystem::new();

    let archives = SyncOrchestrator::new(&fs, project.root(), FakeServer::default())
        .archive()
        .unwrap();

    assert!(matches!(archives[0].outcome, ArchiveOutcome::Archived { files: 1, .. }));
    assert!(matches!(archives[1].outcome, ArchiveOutcome::Skipped { .. }));
    project.assert_file_exists("mod_warehouse/archives/essentials/essentials-0.1.0.zip");
    project.assert_file_exists("mod_warehouse/archives/essentials/archive.toml");
}

#[test]
fn test_legacy_schema_without_targets_only_converges() {
    let project = TestWarehouse::new();
    let fs = LocalFileSystem::new();

    let report = SyncOrchestrator::new(&fs, project.root(), FakeServer::default())
        .with_config_schema(presets::legacy_versions_config())
        .with_targets(Vec::new())
        .run()
        .unwrap();

    assert_eq!(report.state, RunState::Converged);
    assert!(report.categories.is_empty());
    assert!(project.read_config().contains("server-mods-version"));
}

#[rstest]
#[case::host_number("host = 5\nuser = \"ops\"\npassword = \"\"\nport = 22\n", "FTP.host")]
#[case::port_bool("host = \"mc.example.org\"\nuser = \"ops\"\npassword = \"\"\nport = true\n", "FTP.port")]
fn test_mistyped_setting_is_reported_by_key(#[case] body: &str, #[case] expected: &str) {
    let project = TestWarehouse::new();
    project.init_layout();
    project.write_config(&format!("[FTP]\n{}", body));
    let fs = LocalFileSystem::new();

    let err = SyncOrchestrator::new(&fs, project.root(), FakeServer::default())
        .run()
        .unwrap_err();

    match err {
        Error::InvalidValue { key, .. } => assert_eq!(key, expected),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_report_records_every_state_of_a_ready_run() {
    let project = ready_project();
    project.add_mod("server", "a.jar");
    let fs = LocalFileSystem::new();

    let report = SyncOrchestrator::new(&fs, project.root(), FakeServer::default())
        .run()
        .unwrap();

    assert_eq!(
        report.history,
        vec![
            RunState::Unverified,
            RunState::Verifying,
            RunState::Converged,
            RunState::Syncing,
            RunState::Synced,
        ]
    );
    assert_eq!(report.history.last(), Some(&report.state));
}

#[test]
fn test_report_records_repair_of_a_damaged_layout() {
    let project = ready_project();
    std::fs::remove_dir(project.path("mod_warehouse/mods/client")).unwrap();
    let fs = LocalFileSystem::new();

    let report = SyncOrchestrator::new(&fs, project.root(), FakeServer::default())
        .run()
        .unwrap();

    assert_eq!(
        report.history,
        vec![
            RunState::Unverified,
            RunState::Verifying,
            RunState::Repairing,
            RunState::Converged,
            RunState::Syncing,
            RunState::Converged,
        ]
    );
    project.assert_dir_exists("mod_warehouse/mods/client");
}

#[derive(Default)]
struct Recorder {
    states: Vec<RunState>,
    events: Vec<String>,
}

impl SyncObserver for Recorder {
    fn state_changed(&mut self, state: RunState) {
        self.states.push(state);
    }

    fn converged(&mut self, _report: &ConvergenceReport) {
        self.events.push("converged".to_string());
    }

    fn archived(&mut self, reports: &[ArchiveReport]) {
        self.events.push(format!("archived {}", reports.len()));
    }

    fn category_synced(&mut self, report: &CategoryReport) {
        self.events.push(format!("synced {}", report.category));
    }
}

#[test]
fn test_observer_sees_each_phase_in_order() {
    let project = ready_project();
    project.add_mod("server", "a.jar");
    let fs = LocalFileSystem::new();
    let mut recorder = Recorder::default();

    let report = SyncOrchestrator::new(&fs, project.root(), FakeServer::default())
        .run_observed(&mut recorder)
        .unwrap();

    assert_eq!(recorder.events, vec!["converged", "archived 2", "synced server"]);
    assert_eq!(recorder.states, report.history[1..].to_vec());
}

#[cfg(unix)]
#[test]
fn test_dangling_symlink_among_mods_is_ignored() {
    let project = ready_project();
    project.add_mod("server", "a.jar");
    std::os::unix::fs::symlink(
        project.path("gone.jar"),
        project.path("mod_warehouse/mods/server/broken.jar"),
    )
    .unwrap();
    let server = FakeServer::default();
    let fs = LocalFileSystem::new();

    let report = SyncOrchestrator::new(&fs, project.root(), server.clone())
        .run()
        .unwrap();

    assert_eq!(report.state, RunState::Synced);
    assert_eq!(server.mods(), vec!["a.jar"]);
}
