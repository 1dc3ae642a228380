//! Clinical validation metrics over expected/predicted dispositions.
//!
//! Sensitivity and specificity are taken with `Pathological` as the
//! positive class.

use serde::Serialize;

use auramed_core::{Disposition, Error, Result};

const CLASSES: usize = Disposition::ALL.len();

fn index(d: Disposition) -> usize {
    Disposition::ALL.iter().position(|c| *c == d).unwrap_or(0)
}

/// Rows are expected, columns predicted, in `Disposition::ALL` order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    counts: [[usize; CLASSES]; CLASSES],
}

impl ConfusionMatrix {
    pub fn from_pairs(expected: &[Disposition], predicted: &[Disposition]) -> Result<Self> {
        if expected.len() != predicted.len() {
            return Err(Error::InvalidInput(format!(
                "expected {} labels but got {} predictions",
                expected.len(),
                predicted.len()
            )));
        }
        let mut matrix = Self::default();
        for (e, p) in expected.iter().zip(predicted) {
            matrix.counts[index(*e)][index(*p)] += 1;
        }
        Ok(matrix)
    }

    pub fn get(&self, expected: Disposition, predicted: Disposition) -> usize {
        self.counts[index(expected)][index(predicted)]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    fn true_positives(&self, class: usize) -> usize {
        self.counts[class][class]
    }

    fn false_negatives(&self, class: usize) -> usize {
        self.counts[class].iter().sum::<usize>() - self.counts[class][class]
    }

    fn false_positives(&self, class: usize) -> usize {
        (0..CLASSES)
            .filter(|&row| row != class)
            .map(|row| self.counts[row][class])
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub disposition: Disposition,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub sensitivity: f64,
    pub specificity: f64,
    pub accuracy: f64,
    pub f1_weighted: f64,
    pub total_samples: usize,
    pub correct: usize,
    pub per_class: Vec<ClassMetrics>,
    pub confusion_matrix: ConfusionMatrix,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl ValidationReport {
    pub fn compute(expected: &[Disposition], predicted: &[Disposition]) -> Result<Self> {
        let matrix = ConfusionMatrix::from_pairs(expected, predicted)?;
        let total = matrix.total();
        let correct = (0..CLASSES).map(|c| matrix.true_positives(c)).sum();

        let positive = index(Disposition::Pathological);
        let tp = matrix.true_positives(positive);
        let fn_ = matrix.false_negatives(positive);
        let fp = matrix.false_positives(positive);
        let tn = total - tp - fn_ - fp;

        let per_class: Vec<ClassMetrics> = Disposition::ALL
            .iter()
            .enumerate()
            .map(|(c, disposition)| {
                let tp = matrix.true_positives(c);
                let precision = ratio(tp, tp + matrix.false_positives(c));
                let recall = ratio(tp, tp + matrix.false_negatives(c));
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    disposition: *disposition,
                    precision,
                    recall,
                    f1,
                    support: tp + matrix.false_negatives(c),
                }
            })
            .collect();

        let support_sum: usize = per_class.iter().map(|m| m.support).sum();
        let f1_weighted = if support_sum == 0 {
            0.0
        } else {
            per_class
                .iter()
                .map(|m| m.f1 * m.support as f64)
                .sum::<f64>()
                / support_sum as f64
        };

        Ok(Self {
            sensitivity: ratio(tp, tp + fn_),
            specificity: ratio(tn, tn + fp),
            accuracy: ratio(correct, total),
            f1_weighted,
            total_samples: total,
            correct,
            per_class,
            confusion_matrix: matrix,
        })
    }
}
