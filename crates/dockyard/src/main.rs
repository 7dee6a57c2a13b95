// ABOUTME: Entry point of the dock binary
// ABOUTME: Parses arguments and hands off to the dockyard library

use clap::Parser;

use dockyard::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dockyard::run(Cli::parse()).await
}
