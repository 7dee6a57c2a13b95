// ABOUTME: The inspect and normalize subcommands over saved layouts and workspace documents
// ABOUTME: Both restore the input into a dashboard first so hydration rules apply

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

use dockyard_logging::info;
use dockyard_state::InitialPersistentState;
use dockyard_workspace::WorkspaceDocument;

use crate::config::Config;
use crate::document::{outline, parse_saved, restore};

fn read_saved(path: &Path) -> Result<WorkspaceDocument> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read layout file {}", path.display()))?;
    parse_saved(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Print the tree outline and history of a saved layout.
pub fn inspect(config: &Config, path: &Path, out: &mut dyn Write) -> Result<()> {
    let document = read_saved(path)?;
    let persisted = match &document.persistent_state {
        InitialPersistentState::Keyed(entries) => entries.len(),
        InitialPersistentState::Ordered(entries) => entries.len(),
    };
    let dashboard = restore(config, document)?;

    for line in outline(&dashboard) {
        writeln!(out, "{line}")?;
    }
    let closed = dashboard.panel_manager().closed_panels();
    writeln!(out, "closed panels: {}", closed.len())?;
    for panel in &closed {
        let id = panel
            .config
            .id
            .as_ref()
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        writeln!(
            out,
            "  {} {id} (stack: {})",
            panel.config.component,
            panel.parent_stack_id.as_deref().unwrap_or("-")
        )?;
    }
    writeln!(out, "persisted states: {persisted}")?;

    dashboard.close();
    Ok(())
}

/// Hydrate then dehydrate a saved layout and write the resulting workspace
/// document to `output`, or to `out` when no output path is given.
pub fn normalize(
    config: &Config,
    input: &Path,
    output: Option<&Path>,
    out: &mut dyn Write,
) -> Result<()> {
    let document = read_saved(input)?;
    let original_state = document.persistent_state.clone();
    let dashboard = restore(config, document)?;

    let mut normalized = dashboard.to_document();
    // Unclaimed legacy entries are not part of the provider's snapshot yet.
    if matches!(original_state, InitialPersistentState::Ordered(_)) {
        normalized.persistent_state = original_state;
    }
    dashboard.close();

    let json = serde_json::to_string_pretty(&normalized).context("Failed to serialize document")?;
    match output {
        Some(path) => {
            fs::write(path, format!("{json}\n"))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(input = %input.display(), output = %path.display(), "Normalized layout");
        }
        None => writeln!(out, "{json}")?,
    }
    Ok(())
}
