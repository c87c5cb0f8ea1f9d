//! Micro-averaged precision / recall / F1 over binary term vectors.
//!
//! Every (sample, term) cell is one binary decision; counts are pooled over
//! all cells before the ratios are taken.

use crate::error::{BenchError, Result};
use crate::vocab::TermVector;

/// Pooled confusion counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl Counts {
    /// Pool counts over aligned ground-truth and predicted vectors.
    pub fn pool(truth: &[TermVector], predicted: &[TermVector]) -> Result<Self> {
        if truth.len() != predicted.len() {
            return Err(BenchError::Misaligned(format!(
                "{} ground-truth rows vs {} predicted rows",
                truth.len(),
                predicted.len()
            )));
        }

        let mut counts = Counts::default();
        for (row, (t, p)) in truth.iter().zip(predicted).enumerate() {
            if t.len() != p.len() {
                return Err(BenchError::Misaligned(format!(
                    "row {}: {} ground-truth columns vs {} predicted columns",
                    row,
                    t.len(),
                    p.len()
                )));
            }
            for (&t, &p) in t.bits().iter().zip(p.bits()) {
                match (t, p) {
                    (true, true) => counts.true_positives += 1,
                    (false, true) => counts.false_positives += 1,
                    (true, false) => counts.false_negatives += 1,
                    (false, false) => {}
                }
            }
        }
        Ok(counts)
    }

    /// TP / (TP + FP); 0 when nothing was predicted.
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// TP / (TP + FN); 0 when the ground truth is empty.
    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Scores for one backend run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub counts: Counts,
}

impl Scores {
    pub fn compute(truth: &[TermVector], predicted: &[TermVector]) -> Result<Self> {
        let counts = Counts::pool(truth, predicted)?;
        Ok(Self {
            precision: counts.precision(),
            recall: counts.recall(),
            f1: counts.f1(),
            counts,
        })
    }
}
