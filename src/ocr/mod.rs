//! OCR backend abstraction.
//!
//! Defines the [`OcrBackend`] trait so different engines (the `ocrs` CLI,
//! Tesseract, an HTTP sidecar) can be benchmarked through one interface.

pub mod ocrs;
pub mod sidecar;
pub mod tesseract;

use std::path::Path;

use tokio::process::Command;
use tracing::{debug, info};

use crate::config::BenchConfig;
use crate::error::Result;

/// Async trait implemented by each OCR engine.
#[async_trait::async_trait]
pub trait OcrBackend: Send + Sync {
    fn name(&self) -> &str;

    /// One-time preparation (build, locate binary). Not timed.
    async fn ensure_ready(&self) -> Result<()> {
        Ok(())
    }

    /// Transcribe the JPEG at `image` into a single string.
    async fn extract(&self, image: &Path) -> anyhow::Result<String>;
}

/// Known backend identifiers, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum BackendKind {
    Ocrs,
    Tesseract,
    Sidecar,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ocrs => "ocrs",
            Self::Tesseract => "tesseract",
            Self::Sidecar => "sidecar",
        }
    }
}

/// Build the ordered backend list: `ocrs` first, then whichever optional
/// engines are available locally. `only`, when non-empty, restricts the list.
pub async fn discover(
    config: &BenchConfig,
    client: reqwest::Client,
    only: &[BackendKind],
) -> Vec<Box<dyn OcrBackend>> {
    let wanted = |kind: BackendKind| only.is_empty() || only.contains(&kind);
    let mut backends: Vec<Box<dyn OcrBackend>> = Vec::new();

    if wanted(BackendKind::Ocrs) {
        backends.push(Box::new(ocrs::OcrsBackend::new(
            config.ocrs_bin.clone(),
            config.build_command.clone(),
        )));
    }

    if wanted(BackendKind::Tesseract) {
        match tesseract::TesseractBackend::detect(
            &config.tesseract_bin,
            &config.tesseract_lang,
            config.tesseract_oem,
        )
        .await
        {
            Some(backend) => backends.push(Box::new(backend)),
            None => debug!("Tesseract not available, skipping"),
        }
    }

    if wanted(BackendKind::Sidecar) {
        match sidecar::SidecarBackend::detect(client, config.sidecar_url.clone()).await {
            Some(backend) => backends.push(Box::new(backend)),
            None => debug!("OCR sidecar not available, skipping"),
        }
    }

    info!(
        "Backends: {:?}",
        backends.iter().map(|b| b.name()).collect::<Vec<_>>()
    );
    backends
}

/// Prepare every backend in order, before any dataset work starts. The first
/// failure stops preparation.
pub async fn prepare_all(backends: &[Box<dyn OcrBackend>]) -> Result<()> {
    for backend in backends {
        debug!("Preparing {}", backend.name());
        backend.ensure_ready().await?;
    }
    Ok(())
}

/// Run a command to completion and return its stdout. Non-zero exit is an error.
pub(crate) async fn run_for_stdout(cmd: &mut Command) -> anyhow::Result<String> {
    let program = cmd.as_std().get_program().to_string_lossy().into_owned();
    let output = cmd
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| anyhow::anyhow!("failed to spawn {}: {}", program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("{} exited with {}: {}", program, output.status, stderr.trim());
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
