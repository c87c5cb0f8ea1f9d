//! Benchmark orchestrator.
//!
//! Owns the sample slice, the frozen vocabulary and the ground-truth vectors.
//! Every backend is evaluated against exactly these, so reports are
//! comparable with each other.

use tracing::info;

use crate::dataset::Sample;
use crate::error::Result;
use crate::eval::{evaluate_backend, FailurePolicy};
use crate::metrics::Scores;
use crate::ocr::OcrBackend;
use crate::report::BackendReport;
use crate::scratch::ScratchDir;
use crate::vocab::{TermVector, Vocabulary};

pub struct Benchmark {
    samples: Vec<Sample>,
    vocabulary: Vocabulary,
    truth: Vec<TermVector>,
    scratch: ScratchDir,
    policy: FailurePolicy,
}

impl Benchmark {
    /// Slice `samples` to `max_samples` and fit the vocabulary on their ground truth.
    pub fn new(
        mut samples: Vec<Sample>,
        max_samples: usize,
        scratch: ScratchDir,
        policy: FailurePolicy,
    ) -> Result<Self> {
        samples.truncate(max_samples);

        let truth_text: Vec<String> = samples.iter().map(Sample::ground_truth_text).collect();
        let vocabulary = Vocabulary::fit(&truth_text)?;
        let truth = vocabulary.vectorize_all(&truth_text);

        info!(
            "Vocabulary: {} terms from {} samples",
            vocabulary.len(),
            samples.len()
        );

        Ok(Self {
            samples,
            vocabulary,
            truth,
            scratch,
            policy,
        })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Run and score one backend. The backend must already be prepared
    /// (see [`crate::ocr::prepare_all`]).
    pub async fn evaluate(&self, backend: &dyn OcrBackend) -> Result<BackendReport> {
        let run = evaluate_backend(backend, &self.samples, &self.scratch, self.policy).await?;
        let predicted = self.vocabulary.vectorize_all(&run.predicted_texts);
        let scores = Scores::compute(&self.truth, &predicted)?;

        info!(
            "{}: tp={} fp={} fn={}",
            run.backend,
            scores.counts.true_positives,
            scores.counts.false_positives,
            scores.counts.false_negatives
        );

        Ok(BackendReport::new(&run, &scores))
    }

    /// Evaluate backends in order, handing each report to `emit` as soon as it
    /// is ready. The first error, from a backend or from `emit`, stops the run.
    pub async fn run_all(
        &self,
        backends: &[Box<dyn OcrBackend>],
        mut emit: impl FnMut(&BackendReport) -> Result<()>,
    ) -> Result<Vec<BackendReport>> {
        let mut reports = Vec::with_capacity(backends.len());
        for backend in backends {
            let report = self.evaluate(backend.as_ref()).await?;
            emit(&report)?;
            reports.push(report);
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::samples;
    use crate::error::BenchError;
    use crate::eval::tests::TableBackend;

    const TRUTH: [&str; 3] = ["invoice total 100", "receipt date 2021", "tax amount 5"];

    fn bench(dir: &tempfile::TempDir, max_samples: usize) -> Benchmark {
        Benchmark::new(
            samples(&TRUTH),
            max_samples,
            ScratchDir::at(dir.path()),
            FailurePolicy::Abort,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_exact_predictions_score_one() {
        let dir = tempfile::tempdir().unwrap();
        let bench = bench(&dir, 100);

        let report = bench.evaluate(&TableBackend::new("exact", &TRUTH)).await.unwrap();

        assert_eq!(report.samples, 3);
        assert_eq!(report.precision, 1.0);
        assert_eq!(report.recall, 1.0);
        assert_eq!(report.f1, 1.0);
        assert!(report.avg_latency >= 0.0);
    }

    #[tokio::test]
    async fn test_empty_predictions_score_zero() {
        let dir = tempfile::tempdir().unwrap();
        let bench = bench(&dir, 100);

        let report = bench
            .evaluate(&TableBackend::new("blank", &["", "", ""]))
            .await
            .unwrap();

        assert_eq!(report.precision, 0.0);
        assert_eq!(report.recall, 0.0);
        assert_eq!(report.f1, 0.0);
    }

    #[tokio::test]
    async fn test_max_samples_caps_and_dataset_size_bounds() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(bench(&dir, 100).sample_count(), 3);
        assert_eq!(bench(&dir, 2).sample_count(), 2);

        let report = bench(&dir, 2)
            .evaluate(&TableBackend::new("exact", &TRUTH))
            .await
            .unwrap();
        assert_eq!(report.samples, 2);
        assert_eq!(report.f1, 1.0);
    }

    #[tokio::test]
    async fn test_vocabulary_unaffected_by_backends() {
        let dir = tempfile::tempdir().unwrap();
        let bench = bench(&dir, 100);
        let before = bench.vocabulary().clone();

        let backends: Vec<Box<dyn OcrBackend>> = vec![
            Box::new(TableBackend::new("noisy", &["zebra quartz", "lorem ipsum", "tax"])),
            Box::new(TableBackend::new("exact", &TRUTH)),
        ];
        bench.run_all(&backends, |_| Ok(())).await.unwrap();

        assert_eq!(bench.vocabulary(), &before);
        assert_eq!(bench.vocabulary(), &Vocabulary::fit(TRUTH).unwrap());
        assert_eq!(bench.vocabulary().position("zebra"), None);
    }

    #[tokio::test]
    async fn test_missing_optional_backend_leaves_primary_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let bench = bench(&dir, 100);
        let primary = || TableBackend::new("primary", &["invoice total", "receipt", "amount 5"]);

        let with_reference: Vec<Box<dyn OcrBackend>> = vec![
            Box::new(primary()),
            Box::new(TableBackend::new("reference", &TRUTH)),
        ];
        let primary_only: Vec<Box<dyn OcrBackend>> = vec![Box::new(primary())];

        let full = bench.run_all(&with_reference, |_| Ok(())).await.unwrap();
        let mut emitted = Vec::new();
        let alone = bench
            .run_all(&primary_only, |r| {
                emitted.push(r.backend.clone());
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(emitted, vec!["primary"]);
        assert_eq!(alone.len(), 1);
        assert_eq!(full[0].backend, "primary");
        assert_eq!(full[0].precision, alone[0].precision);
        assert_eq!(full[0].recall, alone[0].recall);
        assert_eq!(full[0].f1, alone[0].f1);
    }

    #[tokio::test]
    async fn test_failing_backend_stops_run_after_earlier_reports() {
        let dir = tempfile::tempdir().unwrap();
        let bench = bench(&dir, 100);

        let backends: Vec<Box<dyn OcrBackend>> = vec![
            Box::new(TableBackend::new("first", &TRUTH)),
            Box::new(TableBackend::new("broken", &TRUTH).failing_at(2)),
        ];
        let mut emitted = Vec::new();
        let result = bench
            .run_all(&backends, |r| {
                emitted.push(r.backend.clone());
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(BenchError::Extraction { .. })));
        assert_eq!(emitted, vec!["first"]);
    }

    #[tokio::test]
    async fn test_emit_error_stops_run() {
        let dir = tempfile::tempdir().unwrap();
        let bench = bench(&dir, 100);

        let backends: Vec<Box<dyn OcrBackend>> = vec![
            Box::new(TableBackend::new("first", &TRUTH)),
            Box::new(TableBackend::new("second", &TRUTH)),
        ];
        let mut emitted = Vec::new();
        let result = bench
            .run_all(&backends, |r| {
                emitted.push(r.backend.clone());
                serde_json::from_str::<serde_json::Value>("{")?;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(BenchError::Report(_))));
        assert_eq!(emitted, vec!["first"]);
    }

    #[test]
    fn test_empty_ground_truth_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = Benchmark::new(
            samples(&["", "a"]),
            10,
            ScratchDir::at(dir.path()),
            FailurePolicy::Abort,
        );
        assert!(matches!(result, Err(BenchError::EmptyVocabulary)));
    }
}
