//! Scratch storage for per-sample image files.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use tempfile::NamedTempFile;
use tracing::debug;

/// In-memory filesystem checked before falling back to the OS temp dir.
const FAST_STORAGE: &str = "/dev/shm";

/// Run-wide scratch directory, chosen once at startup.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Prefer `/dev/shm` when present to keep disk I/O out of the timings.
    pub fn discover() -> Self {
        let fast = Path::new(FAST_STORAGE);
        let path = if fast.is_dir() {
            fast.to_path_buf()
        } else {
            std::env::temp_dir()
        };
        debug!("Scratch directory: {}", path.display());
        Self { path }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `image` as a JPEG file that is deleted when the guard drops.
    pub fn write_jpeg(&self, image: &DynamicImage) -> std::io::Result<ScratchImage> {
        let file = tempfile::Builder::new()
            .prefix("ocr-bench-")
            .suffix(".jpg")
            .tempfile_in(&self.path)?;

        // JPEG has no alpha channel.
        image
            .to_rgb8()
            .save_with_format(file.path(), image::ImageFormat::Jpeg)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

        Ok(ScratchImage { file })
    }
}

/// Scoped JPEG on disk; removed on drop.
#[derive(Debug)]
pub struct ScratchImage {
    file: NamedTempFile,
}

impl ScratchImage {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
