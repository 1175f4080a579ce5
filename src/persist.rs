//! Viewer state files
//!
//! A state file stores the pipeline description and the plot definitions as
//! one JSON document. The frame itself is never stored; it is rebuilt by
//! running the pipeline after loading.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::files::STATE_VERSION;
use crate::data::ActionsState;
use crate::error::{PlotError, Result};
use crate::state::VizState;

#[derive(Serialize, Deserialize)]
struct StateFile {
    version: u32,
    #[serde(default)]
    actions: ActionsState,
    #[serde(default)]
    viz: VizState,
}

/// Parse a state document
pub fn parse_state(json: &str) -> Result<(ActionsState, VizState)> {
    let file: StateFile = serde_json::from_str(json)?;
    if file.version != STATE_VERSION {
        return Err(PlotError::StateVersion {
            found: file.version,
            expected: STATE_VERSION,
        });
    }
    Ok((file.actions, file.viz))
}

/// Read the pipeline and plot definitions from `path`
pub fn load_state(path: &Path) -> Result<(ActionsState, VizState)> {
    let contents = std::fs::read_to_string(path)?;
    let (mut actions, viz) = parse_state(&contents)?;

    // Relative sources are resolved against the state file's directory
    if let Some(dir) = path.parent() {
        actions.source = actions
            .source
            .take()
            .map(|source| if source.is_relative() { dir.join(source) } else { source });
    }
    tracing::info!(
        path = %path.display(),
        plots = viz.plots.len(),
        steps = actions.actions.len(),
        "loaded viewer state"
    );
    Ok((actions, viz))
}

/// Write the pipeline and plot definitions to `path`
pub fn save_state(path: &Path, actions: &ActionsState, viz: &VizState) -> Result<()> {
    let file = StateFile {
        version: STATE_VERSION,
        actions: actions.clone(),
        viz: viz.clone(),
    };
    let json = serde_json::to_string_pretty(&file)?;
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), "saved viewer state");
    Ok(())
}
