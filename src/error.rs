//! Error taxonomy for a benchmark run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    /// A backend could not be prepared (build or install step failed).
    #[error("failed to prepare backend {backend}: {message}")]
    Build { backend: String, message: String },

    /// A single sample's backend invocation failed.
    #[error("backend {backend} failed on sample {sample}: {message}")]
    Extraction {
        backend: String,
        sample: usize,
        message: String,
    },

    #[error("failed to load dataset {dataset}: {message}")]
    DatasetLoad { dataset: String, message: String },

    #[error("ground truth produced an empty vocabulary")]
    EmptyVocabulary,

    /// Predicted and ground-truth vectors do not line up.
    #[error("misaligned term vectors: {0}")]
    Misaligned(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("scratch storage error: {0}")]
    Scratch(#[from] std::io::Error),

    #[error("failed to render report: {0}")]
    Report(#[from] serde_json::Error),
}

impl BenchError {
    pub fn dataset(dataset: impl Into<String>, message: impl ToString) -> Self {
        Self::DatasetLoad {
            dataset: dataset.into(),
            message: message.to_string(),
        }
    }

    pub fn build(backend: impl Into<String>, message: impl ToString) -> Self {
        Self::Build {
            backend: backend.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;
