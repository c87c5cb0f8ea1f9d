//! ocr-bench - OCR accuracy and latency benchmark.
//!
//! Runs each available OCR backend over the same labeled document images and
//! reports seconds per image plus token-level micro precision / recall / F1.

mod bench;
mod config;
mod dataset;
mod error;
mod eval;
mod metrics;
mod ocr;
mod report;
mod scratch;
mod vocab;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bench::Benchmark;
use config::BenchConfig;
use dataset::{DatasetProvider, HubDataset, LocalDataset};
use eval::FailurePolicy;
use ocr::BackendKind;
use report::ReportFormat;
use scratch::ScratchDir;

/// Benchmark OCR backends against a labeled document-image dataset
#[derive(Parser, Debug)]
#[command(name = "ocr-bench")]
#[command(about = "Measure OCR latency and token-level precision/recall/F1")]
struct Args {
    /// Upper bound on evaluated samples [default: 100]
    #[arg(long)]
    max_samples: Option<usize>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Hub dataset identifier
    #[arg(long)]
    dataset: Option<String>,

    /// Dataset split
    #[arg(long)]
    split: Option<String>,

    /// Local dataset directory containing manifest.jsonl (instead of the hub)
    #[arg(long)]
    dataset_dir: Option<PathBuf>,

    /// Only evaluate these backends (repeatable)
    #[arg(long = "backend", value_enum)]
    backends: Vec<BackendKind>,

    /// Skip the ocrs build step
    #[arg(long)]
    no_build: bool,

    /// Record failed samples as empty predictions instead of aborting
    #[arg(long)]
    skip_failures: bool,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    format: ReportFormat,

    /// Save the loaded samples as a local dataset in this directory
    #[arg(long)]
    export_dataset: Option<PathBuf>,
}

impl Args {
    /// Defaults, then the config file, then the environment, then flags.
    fn resolve_config(&self) -> anyhow::Result<BenchConfig> {
        let mut config = match &self.config {
            Some(path) => BenchConfig::from_file(path)?,
            None => BenchConfig::default(),
        };
        config.apply_env();

        if let Some(n) = self.max_samples {
            config.max_samples = n;
        }
        if let Some(dataset) = &self.dataset {
            config.dataset = dataset.clone();
        }
        if let Some(split) = &self.split {
            config.split = split.clone();
        }
        if let Some(dir) = &self.dataset_dir {
            config.dataset_dir = Some(dir.clone());
        }
        if self.no_build {
            config.build_command = None;
        }

        config.validate()?;
        Ok(config)
    }

    fn failure_policy(&self) -> FailurePolicy {
        if self.skip_failures {
            FailurePolicy::Skip
        } else {
            FailurePolicy::Abort
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Logs on stderr; stdout carries the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ocr_bench=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = args.resolve_config()?;
    let client = reqwest::Client::new();

    // Backends are built and checked before any dataset download
    let backends = ocr::discover(&config, client.clone(), &args.backends).await;
    if backends.is_empty() {
        anyhow::bail!("No OCR backends available");
    }
    ocr::prepare_all(&backends).await?;

    let provider: Box<dyn DatasetProvider> = match &config.dataset_dir {
        Some(dir) => Box::new(LocalDataset::new(dir)),
        None => Box::new(HubDataset::new(
            client,
            &config.hub_url,
            &config.dataset,
            &config.split,
        )),
    };

    info!("Evaluating on {}...", provider.name());
    let samples = provider.load(config.max_samples).await?;

    if let Some(dir) = &args.export_dataset {
        dataset::write_local_dataset(dir, &samples)
            .with_context(|| format!("Failed to export dataset to {:?}", dir))?;
        info!("Exported {} samples to {:?}", samples.len(), dir);
    }

    let scratch = config
        .scratch_dir
        .clone()
        .map(ScratchDir::at)
        .unwrap_or_else(ScratchDir::discover);

    info!("Scratch directory: {}", scratch.path().display());

    let bench = Benchmark::new(samples, config.max_samples, scratch, args.failure_policy())?;
    info!(
        "Benchmarking {} samples over {} vocabulary terms",
        bench.sample_count(),
        bench.vocabulary().len()
    );

    bench
        .run_all(&backends, |report| {
            println!("{}", report.render(args.format)?);
            Ok(())
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["ocr-bench", "--no-build"]).unwrap();
        let config = args.resolve_config().unwrap();
        assert_eq!(config.max_samples, 100);
        assert!(config.build_command.is_none());
        assert_eq!(args.failure_policy(), FailurePolicy::Abort);
        assert_eq!(args.format, ReportFormat::Text);
    }

    #[test]
    fn test_args_overrides() {
        let args = Args::try_parse_from([
            "ocr-bench",
            "--max-samples",
            "5",
            "--backend",
            "tesseract",
            "--backend",
            "ocrs",
            "--skip-failures",
            "--format",
            "json",
        ])
        .unwrap();
        let config = args.resolve_config().unwrap();
        assert_eq!(config.max_samples, 5);
        assert_eq!(args.backends, vec![BackendKind::Tesseract, BackendKind::Ocrs]);
        assert_eq!(args.failure_policy(), FailurePolicy::Skip);
        assert_eq!(args.format, ReportFormat::Json);
    }

    #[test]
    fn test_args_zero_samples_rejected() {
        let args = Args::try_parse_from(["ocr-bench", "--max-samples", "0"]).unwrap();
        assert!(args.resolve_config().is_err());
    }

    #[test]
    fn test_args_unknown_backend_rejected() {
        assert!(Args::try_parse_from(["ocr-bench", "--backend", "abbyy"]).is_err());
    }
}
