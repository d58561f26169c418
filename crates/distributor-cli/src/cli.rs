//! CLI argument parsing using clap derive

use clap::Parser;

/// Mod Distributor - keep a mod warehouse and a game server in sync
///
/// Run in a project folder. Scaffolds `mod_warehouse/` and
/// `distribution-config.toml` when missing, archives the mods and pushes
/// the server mods to the configured server. Set RUST_LOG for diagnostics.
#[derive(Parser, Debug)]
#[command(name = "distributor")]
#[command(author, version, about)]
pub struct Cli {}
