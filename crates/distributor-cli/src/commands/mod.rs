//! Command implementations

mod distribute;

pub use distribute::run_distribute;
