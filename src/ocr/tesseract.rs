//! Reference backend: the `tesseract` CLI.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::debug;

use super::{run_for_stdout, BackendKind, OcrBackend};

pub struct TesseractBackend {
    bin: PathBuf,
    lang: String,
    /// OCR engine mode; 1 is the LSTM-only engine.
    oem: u8,
}

impl TesseractBackend {
    /// Only create the backend if `<bin> --version` runs.
    pub async fn detect(bin: &Path, lang: &str, oem: u8) -> Option<Self> {
        match run_for_stdout(Command::new(bin).arg("--version")).await {
            Ok(version) => {
                debug!(
                    "Found tesseract: {}",
                    version.lines().next().unwrap_or_default()
                );
                Some(Self {
                    bin: bin.to_path_buf(),
                    lang: lang.to_string(),
                    oem,
                })
            }
            Err(e) => {
                debug!("tesseract unavailable: {}", e);
                None
            }
        }
    }

    fn command(&self, image: &Path) -> Command {
        let mut cmd = Command::new(&self.bin);
        cmd.arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .arg("--oem")
            .arg(self.oem.to_string());
        cmd
    }
}

#[async_trait::async_trait]
impl OcrBackend for TesseractBackend {
    fn name(&self) -> &str {
        BackendKind::Tesseract.as_str()
    }

    async fn extract(&self, image: &Path) -> anyhow::Result<String> {
        run_for_stdout(&mut self.command(image)).await
    }
}
