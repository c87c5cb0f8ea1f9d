//! Per-backend report lines.

use serde::Serialize;

use crate::eval::BackendRun;
use crate::metrics::Scores;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Scores and latency for one evaluated backend.
#[derive(Debug, Clone, Serialize)]
pub struct BackendReport {
    pub backend: String,
    pub samples: usize,
    /// Seconds per image.
    pub avg_latency: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub failures: usize,
}

impl BackendReport {
    pub fn new(run: &BackendRun, scores: &Scores) -> Self {
        Self {
            backend: run.backend.clone(),
            samples: run.sample_count,
            avg_latency: run.avg_latency(),
            precision: scores.precision,
            recall: scores.recall,
            f1: scores.f1,
            failures: run.failures,
        }
    }

    /// `<backend>: <s> s/image, precision <p>, recall <r>, F1 <f>`
    pub fn text_line(&self) -> String {
        let mut line = format!(
            "{}: {:.2} s/image, precision {:.2}, recall {:.2}, F1 {:.2}",
            self.backend, self.avg_latency, self.precision, self.recall, self.f1
        );
        if self.failures > 0 {
            line.push_str(&format!(", {} failed", self.failures));
        }
        line
    }

    pub fn render(&self, format: ReportFormat) -> serde_json::Result<String> {
        match format {
            ReportFormat::Text => Ok(self.text_line()),
            ReportFormat::Json => serde_json::to_string(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(failures: usize) -> BackendReport {
        BackendReport {
            backend: "ocrs".to_string(),
            samples: 3,
            avg_latency: 0.4567,
            precision: 0.912,
            recall: 0.8,
            f1: 0.85234,
            failures,
        }
    }

    #[test]
    fn test_text_line_format() {
        assert_eq!(
            report(0).text_line(),
            "ocrs: 0.46 s/image, precision 0.91, recall 0.80, F1 0.85"
        );
    }

    #[test]
    fn test_text_line_mentions_failures() {
        assert!(report(2).text_line().ends_with(", 2 failed"));
    }

    #[test]
    fn test_text_render_matches_text_line() {
        let r = report(1);
        assert_eq!(r.render(ReportFormat::Text).unwrap(), r.text_line());
    }

    #[test]
    fn test_json_render() {
        let line = report(0).render(ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["backend"], "ocrs");
        assert_eq!(value["samples"], 3);
        assert_eq!(value["failures"], 0);
    }
}
