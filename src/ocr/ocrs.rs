//! Primary backend: the `ocrs` command-line tool.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::info;

use super::{run_for_stdout, BackendKind, OcrBackend};
use crate::error::{BenchError, Result};

pub struct OcrsBackend {
    bin: PathBuf,
    build_command: Option<String>,
}

impl OcrsBackend {
    pub fn new(bin: impl Into<PathBuf>, build_command: Option<String>) -> Self {
        Self {
            bin: bin.into(),
            build_command,
        }
    }
}

#[async_trait::async_trait]
impl OcrBackend for OcrsBackend {
    fn name(&self) -> &str {
        BackendKind::Ocrs.as_str()
    }

    async fn ensure_ready(&self) -> Result<()> {
        if let Some(build) = &self.build_command {
            let mut parts = build.split_whitespace();
            let program = parts
                .next()
                .ok_or_else(|| BenchError::build(self.name(), "empty build command"))?;

            info!("Building ocrs: {}", build);
            run_for_stdout(Command::new(program).args(parts))
                .await
                .map_err(|e| BenchError::build(self.name(), e))?;
        }

        if !self.bin.is_file() {
            return Err(BenchError::build(
                self.name(),
                format!("binary not found at {}", self.bin.display()),
            ));
        }
        Ok(())
    }

    async fn extract(&self, image: &Path) -> anyhow::Result<String> {
        // Run the binary directly; `cargo run` adds startup overhead to every sample.
        run_for_stdout(Command::new(&self.bin).arg(image)).await
    }
}
