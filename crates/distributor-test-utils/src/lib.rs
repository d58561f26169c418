//! Shared test utilities for the distributor workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`warehouse`] [`warehouse::TestWarehouse`] builder for project trees

pub mod warehouse;
