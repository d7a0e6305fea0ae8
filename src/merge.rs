use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::process::Command;
use tracing::info;

use crate::corpus::order::canonical_order;
use crate::corpus::Corpus;
use crate::error::CollectError;

/// Local paths in merge order. Entries without a local path are skipped.
pub fn merge_inputs(corpus: &Corpus) -> Vec<PathBuf> {
    canonical_order(corpus)
        .into_iter()
        .filter_map(|d| d.local_path.clone())
        .collect()
}

/// Run `<tool> <inputs...> <output>`. A non-zero exit or a missing output file
/// is a `MergeTool` failure carrying the tool's own stderr.
pub async fn run_merge_tool(tool: &str, inputs: &[PathBuf], output: &Path) -> Result<u64> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Merging {} files with {}", inputs.len(), tool));
    spinner.enable_steady_tick(Duration::from_millis(120));

    info!("Running {} with {} inputs -> {}", tool, inputs.len(), output.display());
    let result = Command::new(tool).args(inputs).arg(output).output().await;
    spinner.finish_and_clear();

    let out = result.map_err(|e| CollectError::MergeTool {
        tool: tool.to_string(),
        diagnostic: e.to_string(),
    })?;
    if !out.status.success() {
        return Err(CollectError::MergeTool {
            tool: tool.to_string(),
            diagnostic: format!("{}: {}", out.status, String::from_utf8_lossy(&out.stderr).trim_end()),
        }
        .into());
    }

    let size = match tokio::fs::metadata(output).await {
        Ok(meta) => meta.len(),
        Err(_) => {
            return Err(CollectError::MergeTool {
                tool: tool.to_string(),
                diagnostic: format!("no output file at {}", output.display()),
            }
            .into())
        }
    };
    Ok(size)
}

/// Size of a previously merged file, if one exists.
pub fn merged_size(path: &Path) -> Result<Option<u64>> {
    if !path.exists() {
        return Ok(None);
    }
    let meta = std::fs::metadata(path).with_context(|| format!("Failed to stat {}", path.display()))?;
    Ok(Some(meta.len()))
}
