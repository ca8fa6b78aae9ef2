use std::fmt;

/// Binary confusion matrix. Rows are the actual class, columns the predicted
/// class; index 0 is negative, 1 positive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConfusionMatrix {
    counts: [[usize; 2]; 2],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl ConfusionMatrix {
    pub fn record(&mut self, actual: usize, predicted: usize) {
        self.counts[actual.min(1)][predicted.min(1)] += 1;
    }

    pub fn get(&self, actual: usize, predicted: usize) -> usize {
        self.counts[actual][predicted]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.counts[0][0] + self.counts[1][1], self.total())
    }

    pub fn class_metrics(&self, class: usize) -> ClassMetrics {
        let true_positive = self.counts[class][class];
        let support = self.counts[class][0] + self.counts[class][1];
        let predicted = self.counts[0][class] + self.counts[1][class];

        let precision = ratio(true_positive, predicted);
        let recall = ratio(true_positive, support);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        ClassMetrics {
            precision,
            recall,
            f1,
            support,
        }
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[[{} {}]", self.counts[0][0], self.counts[0][1])?;
        write!(f, " [{} {}]]", self.counts[1][0], self.counts[1][1])
    }
}

/// Per-class precision / recall / f1 table in the layout of scikit-learn's
/// `classification_report`.
pub struct ClassificationReport<'a> {
    pub matrix: &'a ConfusionMatrix,
    pub class_names: &'a [String],
}

impl fmt::Display for ClassificationReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .class_names
            .iter()
            .map(String::len)
            .chain(["weighted avg".len()])
            .max()
            .unwrap_or(12);

        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;

        let per_class: Vec<ClassMetrics> = (0..2).map(|c| self.matrix.class_metrics(c)).collect();
        for (class, metrics) in per_class.iter().enumerate() {
            let name = self
                .class_names
                .get(class)
                .cloned()
                .unwrap_or_else(|| class.to_string());
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, metrics.precision, metrics.recall, metrics.f1, metrics.support
            )?;
        }
        writeln!(f)?;

        let total = self.matrix.total();
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy",
            "",
            "",
            self.matrix.accuracy(),
            total
        )?;

        let macro_avg = |pick: fn(&ClassMetrics) -> f64| {
            per_class.iter().map(pick).sum::<f64>() / per_class.len() as f64
        };
        let weighted_avg = |pick: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                return 0.0;
            }
            per_class
                .iter()
                .map(|m| pick(m) * m.support as f64)
                .sum::<f64>()
                / total as f64
        };

        writeln!(
            f,
            "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
            "macro avg",
            macro_avg(|m| m.precision),
            macro_avg(|m| m.recall),
            macro_avg(|m| m.f1),
            total
        )?;
        write!(
            f,
            "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
            "weighted avg",
            weighted_avg(|m| m.precision),
            weighted_avg(|m| m.recall),
            weighted_avg(|m| m.f1),
            total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConfusionMatrix {
        let mut matrix = ConfusionMatrix::default();
        // 8 negatives: 6 right, 2 wrong. 4 positives: 3 right, 1 wrong.
        for _ in 0..6 {
            matrix.record(0, 0);
        }
        for _ in 0..2 {
            matrix.record(0, 1);
        }
        for _ in 0..3 {
            matrix.record(1, 1);
        }
        matrix.record(1, 0);
        matrix
    }

    #[test]
    fn test_counts_and_accuracy() {
        let matrix = sample();
        assert_eq!(matrix.total(), 12);
        assert_eq!(matrix.get(0, 1), 2);
        assert_eq!(matrix.get(1, 0), 1);
        assert!((matrix.accuracy() - 0.75).abs() < 1e-12);
        assert_eq!(matrix.to_string(), "[[6 2]\n [1 3]]");
    }

    #[test]
    fn test_class_metrics() {
        let matrix = sample();

        let negative = matrix.class_metrics(0);
        assert!((negative.precision - 6.0 / 7.0).abs() < 1e-12);
        assert!((negative.recall - 0.75).abs() < 1e-12);
        assert_eq!(negative.support, 8);

        let positive = matrix.class_metrics(1);
        assert!((positive.precision - 0.6).abs() < 1e-12);
        assert!((positive.recall - 0.75).abs() < 1e-12);
        let expected_f1 = 2.0 * 0.6 * 0.75 / (0.6 + 0.75);
        assert!((positive.f1 - expected_f1).abs() < 1e-12);
        assert_eq!(positive.support, 4);
    }

    #[test]
    fn test_empty_matrix_has_zero_metrics() {
        let matrix = ConfusionMatrix::default();
        assert_eq!(matrix.accuracy(), 0.0);
        assert_eq!(matrix.class_metrics(1).f1, 0.0);
    }

    #[test]
    fn test_report_lists_classes() {
        let matrix = sample();
        let names = vec!["cancer".to_string(), "normal".to_string()];
        let report = ClassificationReport {
            matrix: &matrix,
            class_names: &names,
        }
        .to_string();

        assert!(report.contains("precision"));
        assert!(report.lines().any(|l| l.trim_start().starts_with("cancer")));
        assert!(report.lines().any(|l| l.trim_start().starts_with("normal")));
        assert!(report.contains("accuracy"));
        assert!(report.contains("0.75"));
        assert!(report.contains("weighted avg"));
    }
}
