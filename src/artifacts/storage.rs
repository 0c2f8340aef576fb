//! Run record storage
//!
//! Stores each run as `<results_folder>/<run_id>.json`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::models::RunSummary;

/// Where the run happened
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    pub os: String,
    pub arch: String,
    pub tool_version: String,
    pub project_id: Option<String>,
    /// Whether a record key was configured; the key itself is never stored
    pub record_key_present: bool,
    pub headless: bool,
}

impl Default for EnvironmentInfo {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            project_id: None,
            record_key_present: false,
            headless: true,
        }
    }
}

/// A run as written to disk
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredRun {
    pub summary: RunSummary,
    pub environment: EnvironmentInfo,
}

impl StoredRun {
    pub fn new(summary: RunSummary) -> Self {
        Self {
            summary,
            environment: EnvironmentInfo::default(),
        }
    }

    pub fn with_environment(mut self, environment: EnvironmentInfo) -> Self {
        self.environment = environment;
        self
    }

    pub fn id(&self) -> &str {
        &self.summary.run_id
    }
}

/// Generate unique run ID
pub fn generate_run_id() -> String {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let random: u32 = rand::random::<u32>() % 10000;
    format!("{timestamp}_{random:04}")
}

/// Brief run information
#[derive(Clone, Debug)]
pub struct RunInfo {
    pub id: String,
    pub base_url: String,
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub pass_rate: f64,
    pub green: bool,
}

/// Export format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            _ => None,
        }
    }

    pub fn from_extension(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_str)
    }
}

/// Results storage manager
pub struct ResultsStore {
    base_dir: PathBuf,
}

impl ResultsStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn run_path(&self, run_id: &str) -> PathBuf {
        self.base_dir.join(format!("{run_id}.json"))
    }

    /// Save a run
    pub fn save(&self, run: &StoredRun) -> Result<PathBuf> {
        fs::create_dir_all(&self.base_dir).with_context(|| {
            format!("Failed to create directory: {}", self.base_dir.display())
        })?;

        let path = self.run_path(run.id());
        let file = File::create(&path).context("Failed to create results file")?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, run).context("Failed to write results")?;

        info!("Saved run results to {}", path.display());
        Ok(path)
    }

    /// Load a run
    pub fn load(&self, run_id: &str) -> Result<StoredRun> {
        let path = self.run_path(run_id);
        let run = self
            .load_from_path(&path)
            .with_context(|| format!("No stored run '{run_id}'"))?;
        debug!("Loaded run results from {}", path.display());
        Ok(run)
    }

    pub fn load_from_path(&self, path: &Path) -> Result<StoredRun> {
        let file = File::open(path).context("Failed to open results file")?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).context("Failed to parse results")
    }

    /// All stored runs, newest first; unreadable files are skipped
    pub fn load_all(&self) -> Result<Vec<StoredRun>> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }

        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                match self.load_from_path(&path) {
                    Ok(run) => runs.push(run),
                    Err(e) => debug!("Failed to load {}: {}", path.display(), e),
                }
            }
        }

        runs.sort_by(|a, b| b.summary.started_at.cmp(&a.summary.started_at));
        Ok(runs)
    }

    pub fn list_runs(&self) -> Result<Vec<RunInfo>> {
        Ok(self
            .load_all()?
            .into_iter()
            .map(|run| RunInfo {
                pass_rate: run.summary.pass_rate(),
                green: run.summary.is_green(),
                id: run.summary.run_id,
                base_url: run.summary.base_url,
                started_at: run.summary.started_at,
                total: run.summary.total,
            })
            .collect())
    }

    pub fn latest(&self) -> Result<Option<StoredRun>> {
        Ok(self.load_all()?.into_iter().next())
    }

    pub fn delete(&self, run_id: &str) -> Result<()> {
        let path = self.run_path(run_id);
        if path.exists() {
            fs::remove_file(&path)?;
            info!("Deleted results: {}", path.display());
        }
        Ok(())
    }

    /// Export run to a file
    pub fn export(&self, run: &StoredRun, path: &Path, format: ExportFormat) -> Result<()> {
        match format {
            ExportFormat::Json => {
                let file = File::create(path)?;
                let writer = BufWriter::new(file);
                serde_json::to_writer_pretty(writer, run)?;
            }
            ExportFormat::Csv => {
                let mut writer = csv::Writer::from_path(path)?;

                writer.write_record([
                    "run_id",
                    "scenario_number",
                    "scenario_name",
                    "suite",
                    "status",
                    "attempts",
                    "duration_ms",
                    "suppressed_exceptions",
                    "screenshot",
                    "message",
                ])?;

                for result in &run.summary.results {
                    writer.write_record([
                        run.summary.run_id.clone(),
                        result.scenario.number().to_string(),
                        result.scenario.name().to_string(),
                        result.scenario.suite().name().to_string(),
                        result.status.to_string(),
                        result.attempts.to_string(),
                        result.duration_ms.to_string(),
                        result.suppressed_exceptions.len().to_string(),
                        result.screenshot.clone().unwrap_or_default(),
                        result.message.clone().unwrap_or_default(),
                    ])?;
                }
                writer.flush()?;
            }
        }

        info!("Exported results to {}", path.display());
        Ok(())
    }
}
