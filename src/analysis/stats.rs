use std::fmt::Write;

use crate::data::model::{Column, Table};

use super::round_to;

/// Descriptive statistics of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: Column,
    pub mean: f64,
    /// Population standard deviation (ddof = 0).
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
}

impl ColumnSummary {
    /// Summarise `values`. `None` when there are no values.
    pub fn of(column: Column, values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Some(ColumnSummary {
            column,
            mean,
            std: variance.sqrt(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            q25: quantile(&sorted, 0.25),
            q50: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
        })
    }

    /// Label / value pairs rounded to two decimals, in display order.
    pub fn rows(&self) -> [(&'static str, f64); 7] {
        [
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("max", self.max),
            ("25%", self.q25),
            ("50%", self.q50),
            ("75%", self.q75),
        ]
        .map(|(label, value)| (label, round_to(value, 2)))
    }
}

/// Linear-interpolation quantile of already sorted, non-empty values.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Summaries of every numeric column. Empty for an empty table.
pub fn describe(table: &Table) -> Vec<ColumnSummary> {
    Column::NUMERIC
        .iter()
        .filter_map(|&column| {
            let values = table.numeric_column(column)?;
            ColumnSummary::of(column, &values)
        })
        .collect()
}

/// Text block shown on the information screen, one paragraph per column.
pub fn format_summaries(summaries: &[ColumnSummary]) -> String {
    let mut text = String::new();
    for summary in summaries {
        let _ = writeln!(text, "{}:", summary.column);
        for (label, value) in summary.rows() {
            let _ = writeln!(text, "{label} {value:.2}");
        }
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{HumanDevelopment, Record};

    fn gii_table(values: &[f64]) -> Table {
        Table::from_records(
            values
                .iter()
                .map(|&v| {
                    let mut numbers = [0.0; 9];
                    numbers[0] = v;
                    Record {
                        country: "Iceland".into(),
                        iso: "ISL".into(),
                        human_development: HumanDevelopment::High,
                        numbers,
                    }
                })
                .collect(),
        )
    }

    #[test]
    fn summary_of_one_to_four() {
        let summaries = describe(&gii_table(&[1.0, 2.0, 3.0, 4.0]));
        assert_eq!(summaries.len(), 9);
        let gii = &summaries[0];
        assert_eq!(gii.column, Column::Gii);
        assert_eq!(gii.mean, 2.5);
        assert_eq!(gii.min, 1.0);
        assert_eq!(gii.max, 4.0);
        assert_eq!(gii.q25, 1.75);
        assert_eq!(gii.q50, 2.5);
        assert_eq!(gii.q75, 3.25);
        assert!((gii.std - 1.25f64.sqrt()).abs() < 1e-12);

        let text = format_summaries(&summaries[..1]);
        assert!(text.starts_with("GII:\nmean 2.50\nstd 1.12\nmin 1.00\nmax 4.00\n"));
        assert!(text.contains("25% 1.75\n50% 2.50\n75% 3.25\n"));
    }

    #[test]
    fn display_rounding_uses_binary_value() {
        let summary = ColumnSummary::of(Column::Gii, &[1.005]).unwrap();
        let text = format_summaries(&[summary]);
        assert!(text.contains("mean 1.00\n"));
    }

    #[test]
    fn empty_table_has_no_summaries() {
        assert!(describe(&gii_table(&[])).is_empty());
    }

    #[test]
    fn quantile_of_single_value() {
        assert_eq!(quantile(&[7.0], 0.75), 7.0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn summary_is_ordered(values in prop::collection::vec(0.0f64..1.0, 1..40)) {
                let summaries = describe(&gii_table(&values));
                let gii = &summaries[0];
                let eps = 1e-12;
                prop_assert!(gii.min <= gii.q25 + eps);
                prop_assert!(gii.q25 <= gii.q50 + eps);
                prop_assert!(gii.q50 <= gii.q75 + eps);
                prop_assert!(gii.q75 <= gii.max + eps);
                prop_assert!(gii.std >= 0.0);
            }
        }
    }
}
