//! Artifact manager for persisting run outputs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::result::MonteCarloResult;
use crate::statistics::SimulationStatistics;

/// Summary written next to every persisted result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub mode: String,
    pub schema_version: u32,
    /// BLAKE3 hash of the configuration that produced the run.
    pub config_hash: String,
    pub master_seed: u64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub duration_secs: f64,
    pub stats: SimulationStatistics,
}

/// Artifact paths returned after export.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub run_dir: PathBuf,
    pub manifest: PathBuf,
    pub result_json: PathBuf,
    pub sample_run_csv: PathBuf,
    pub buckets_csv: PathBuf,
    pub report_markdown: PathBuf,
}

/// Manages writing all artifacts for a run.
#[derive(Debug, Clone)]
pub struct ArtifactManager {
    output_dir: PathBuf,
}

impl ArtifactManager {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)
            .context("Failed to create artifact output directory")?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Save complete run artifacts under `<output_dir>/<run_id>/`.
    ///
    /// The run id is the first 16 hex digits of the config hash, so re-running
    /// an identical config overwrites its previous artifacts.
    pub fn save_run(
        &self,
        config: &SimulationConfig,
        result: &MonteCarloResult,
        duration_secs: f64,
    ) -> Result<ArtifactPaths> {
        let config_hash = config.config_hash().context("Failed to hash config")?;
        let run_id = config_hash.chars().take(16).collect::<String>();
        let run_dir = self.output_dir.join(&run_id);
        std::fs::create_dir_all(&run_dir).context("Failed to create run artifact directory")?;

        let manifest = RunManifest {
            run_id,
            mode: result.mode().to_string(),
            schema_version: result.schema_version(),
            config_hash,
            master_seed: result.master_seed(),
            timestamp: chrono::Utc::now(),
            duration_secs,
            stats: result.statistics().clone(),
        };
        let manifest_path = run_dir.join("manifest.json");
        let json =
            serde_json::to_string_pretty(&manifest).context("Failed to serialize run manifest")?;
        write(&manifest_path, &json)?;

        let result_json = run_dir.join("result.json");
        write(&result_json, &super::export_json(result)?)?;

        let sample_run_csv = run_dir.join("sample_run.csv");
        write(&sample_run_csv, &super::sample_run_csv(result)?)?;

        let buckets_csv = run_dir.join("buckets.csv");
        write(&buckets_csv, &super::buckets_csv(result.distribution_buckets())?)?;

        let report_markdown = run_dir.join("report.md");
        write(&report_markdown, &super::render_markdown(result))?;

        tracing::info!(dir = %run_dir.display(), "artifacts written");

        Ok(ArtifactPaths {
            run_dir,
            manifest: manifest_path,
            result_json,
            sample_run_csv,
            buckets_csv,
            report_markdown,
        })
    }
}

fn write(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))
}
