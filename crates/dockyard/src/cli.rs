// ABOUTME: Command line arguments for the dock tool
// ABOUTME: Global config path and verbosity plus one subcommand per operation

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "dock")]
#[command(about = "Inspect, normalize and exercise Dockyard dashboard layouts")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to <config dir>/dockyard/dockyard.toml)
    #[arg(short, long, global = true, env = "DOCKYARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the tree, closed panels and persisted state count of a saved layout
    Inspect {
        /// Saved layout or workspace document (JSON)
        path: PathBuf,
    },
    /// Restore a saved layout and write it back as a workspace document
    Normalize {
        input: PathBuf,

        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run a scripted dashboard session with sample widget plugins
    Demo,
}
