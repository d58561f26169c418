//! SyncOrchestrator for converging the project and the server
//!
//! This module provides:
//! - **engine**: the orchestrator and its options
//! - **report**: per-phase result types and run states

mod engine;
mod report;

pub use engine::{CategorySync, SyncObserver, SyncOptions, SyncOrchestrator};
pub use report::{
    ArchiveReport, CategoryReport, ConvergenceReport, RunState, SyncReport, WarehouseReport,
    final_state,
};
