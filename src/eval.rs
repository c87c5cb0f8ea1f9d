//! Per-backend evaluation loop.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::dataset::Sample;
use crate::error::{BenchError, Result};
use crate::ocr::OcrBackend;
use crate::scratch::ScratchDir;

const PROGRESS_EVERY: usize = 10;

/// What to do when a backend fails on a sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the backend's run with the error; nothing is reported for it.
    #[default]
    Abort,
    /// Record an empty prediction, count the failure, keep going.
    Skip,
}

/// Predictions and timing for one backend over one pass.
#[derive(Debug, Clone)]
pub struct BackendRun {
    pub backend: String,
    /// One entry per sample, dataset order.
    pub predicted_texts: Vec<String>,
    /// Sum of per-sample `extract` durations.
    pub elapsed: Duration,
    pub sample_count: usize,
    pub failures: usize,
}

impl BackendRun {
    /// Mean seconds per sample.
    pub fn avg_latency(&self) -> f64 {
        if self.sample_count == 0 {
            0.0
        } else {
            self.elapsed.as_secs_f64() / self.sample_count as f64
        }
    }
}

/// Run `backend` over `samples` in order, one at a time.
///
/// Each image is written to a scoped scratch JPEG that is removed before the
/// next sample starts, on success and on failure. Only the `extract` call is
/// timed.
pub async fn evaluate_backend(
    backend: &dyn OcrBackend,
    samples: &[Sample],
    scratch: &ScratchDir,
    policy: FailurePolicy,
) -> Result<BackendRun> {
    let name = backend.name().to_string();
    let mut predicted_texts = Vec::with_capacity(samples.len());
    let mut elapsed = Duration::ZERO;
    let mut failures = 0;

    info!("Evaluating {} on {} samples", name, samples.len());

    for (idx, sample) in samples.iter().enumerate() {
        let image = scratch.write_jpeg(&sample.image)?;

        let start = Instant::now();
        let result = backend.extract(image.path()).await;
        let took = start.elapsed();
        elapsed += took;

        match result {
            Ok(text) => {
                debug!("{} sample {}: {} chars in {:?}", name, idx, text.len(), took);
                predicted_texts.push(text);
            }
            Err(e) if policy == FailurePolicy::Skip => {
                warn!("{} failed on sample {}, skipping: {:#}", name, idx, e);
                failures += 1;
                predicted_texts.push(String::new());
            }
            Err(e) => {
                return Err(BenchError::Extraction {
                    backend: name,
                    sample: idx,
                    message: format!("{:#}", e),
                });
            }
        }

        if (idx + 1) % PROGRESS_EVERY == 0 {
            info!("{}: {}/{} samples", name, idx + 1, samples.len());
        }
    }

    Ok(BackendRun {
        backend: name,
        predicted_texts,
        elapsed,
        sample_count: samples.len(),
        failures,
    })
}
