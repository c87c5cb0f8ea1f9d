//! Benchmark configuration.
//!
//! Layers, lowest first: built-in defaults, an optional JSON file, environment
//! variables (after `.env` is loaded), then command-line flags.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::BenchError;

pub const DEFAULT_DATASET: &str = "rth/sroie-2019-v2";
pub const DEFAULT_SPLIT: &str = "test";
pub const DEFAULT_HUB_URL: &str = "https://datasets-server.huggingface.co";
pub const DEFAULT_MAX_SAMPLES: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Hub dataset identifier.
    pub dataset: String,
    pub split: String,
    /// datasets-server base URL.
    pub hub_url: String,
    /// Local dataset directory; overrides the hub dataset when set.
    pub dataset_dir: Option<PathBuf>,
    pub max_samples: usize,
    pub ocrs_bin: PathBuf,
    /// Command run once before the `ocrs` backend is used. `None` skips the build.
    pub build_command: Option<String>,
    pub tesseract_bin: PathBuf,
    pub tesseract_lang: String,
    pub tesseract_oem: u8,
    pub sidecar_url: Option<String>,
    /// Scratch directory for per-sample JPEGs; discovered when unset.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            dataset: DEFAULT_DATASET.to_string(),
            split: DEFAULT_SPLIT.to_string(),
            hub_url: DEFAULT_HUB_URL.to_string(),
            dataset_dir: None,
            max_samples: DEFAULT_MAX_SAMPLES,
            ocrs_bin: PathBuf::from("target/release/ocrs"),
            build_command: Some("cargo build --release -p ocrs-cli".to_string()),
            tesseract_bin: PathBuf::from("tesseract"),
            tesseract_lang: "eng".to_string(),
            tesseract_oem: 1,
            sidecar_url: None,
            scratch_dir: None,
        }
    }
}

impl BenchConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Apply environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("OCRS_BIN") {
            self.ocrs_bin = PathBuf::from(v);
        }
        if let Some(v) = var("OCRS_BUILD_COMMAND") {
            // An empty value disables the build step.
            self.build_command = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Some(v) = var("TESSERACT_BIN") {
            self.tesseract_bin = PathBuf::from(v);
        }
        if let Some(v) = var("OCR_SIDECAR_URL") {
            self.sidecar_url = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Some(v) = var("OCR_BENCH_SCRATCH_DIR") {
            self.scratch_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = var("OCR_BENCH_HUB_URL") {
            self.hub_url = v;
        }
    }

    pub fn validate(&self) -> std::result::Result<(), BenchError> {
        if self.max_samples == 0 {
            return Err(BenchError::Config("max_samples must be at least 1".to_string()));
        }
        if let Some(dir) = &self.scratch_dir {
            if !dir.is_dir() {
                return Err(BenchError::Config(format!(
                    "scratch_dir {:?} is not a directory",
                    dir
                )));
            }
        }
        Ok(())
    }
}
