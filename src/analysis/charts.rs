use std::collections::BTreeMap;
use std::f64::consts::PI;

use crate::data::model::{Column, HumanDevelopment, Table};

use super::stats::quantile;

/// Number of points a KDE curve is evaluated on.
const KDE_POINTS: usize = 200;

/// Values of `column` grouped by development level, in table order.
pub fn values_by_level(table: &Table, column: Column) -> BTreeMap<HumanDevelopment, Vec<f64>> {
    let mut groups: BTreeMap<HumanDevelopment, Vec<f64>> = BTreeMap::new();
    for record in table.records() {
        if let Some(v) = record.number(column) {
            groups.entry(record.human_development).or_default().push(v);
        }
    }
    groups
}

// ---------------------------------------------------------------------------
// Distribution plots
// ---------------------------------------------------------------------------

/// Equal-width histogram with per-level counts (stacked bars).
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub start: f64,
    pub bin_width: f64,
    pub counts: BTreeMap<HumanDevelopment, Vec<usize>>,
}

impl Histogram {
    pub fn bin_count(&self) -> usize {
        self.counts.values().next().map_or(0, Vec::len)
    }

    /// Centre of bin `i` on the value axis.
    pub fn bin_center(&self, i: usize) -> f64 {
        self.start + (i as f64 + 0.5) * self.bin_width
    }

    pub fn total(&self) -> usize {
        self.counts.values().flatten().sum()
    }
}

/// Histogram of `column`, Sturges bin count over `[min, max]`.
pub fn histogram(table: &Table, column: Column) -> Option<Histogram> {
    let values = table.numeric_column(column)?;
    if values.is_empty() {
        return None;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let bins = (values.len() as f64).log2().ceil() as usize + 1;

    let (start, bin_width) = if max > min {
        (min, (max - min) / bins as f64)
    } else {
        (min - 0.5, 1.0 / bins as f64)
    };

    let mut counts: BTreeMap<HumanDevelopment, Vec<usize>> = BTreeMap::new();
    for (level, group) in values_by_level(table, column) {
        let slots = counts.entry(level).or_insert_with(|| vec![0; bins]);
        for v in group {
            let i = (((v - start) / bin_width) as usize).min(bins - 1);
            slots[i] += 1;
        }
    }
    Some(Histogram {
        start,
        bin_width,
        counts,
    })
}

/// Gaussian kernel density per level, Scott's bandwidth.
pub fn kde(table: &Table, column: Column) -> BTreeMap<HumanDevelopment, Vec<[f64; 2]>> {
    values_by_level(table, column)
        .into_iter()
        .filter_map(|(level, values)| {
            let n = values.len() as f64;
            if values.len() < 2 {
                return None;
            }
            let mean = values.iter().sum::<f64>() / n;
            let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();
            let bandwidth = std * n.powf(-0.2);
            if !(bandwidth > 0.0) {
                return None;
            }
            let lo = values.iter().copied().fold(f64::INFINITY, f64::min) - 3.0 * bandwidth;
            let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max) + 3.0 * bandwidth;
            let norm = 1.0 / (n * bandwidth * (2.0 * PI).sqrt());

            let curve = (0..KDE_POINTS)
                .map(|i| {
                    let x = lo + (hi - lo) * i as f64 / (KDE_POINTS - 1) as f64;
                    let density: f64 = values
                        .iter()
                        .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                        .sum();
                    [x, density * norm]
                })
                .collect();
            Some((level, curve))
        })
        .collect()
}

/// Empirical CDF per level: sorted values with cumulative proportion.
pub fn ecdf(table: &Table, column: Column) -> BTreeMap<HumanDevelopment, Vec<[f64; 2]>> {
    values_by_level(table, column)
        .into_iter()
        .map(|(level, mut values)| {
            values.sort_by(f64::total_cmp);
            let n = values.len() as f64;
            let points = values
                .into_iter()
                .enumerate()
                .map(|(i, v)| [v, (i + 1) as f64 / n])
                .collect();
            (level, points)
        })
        .collect()
}

/// Five-number summary for a box plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSpread {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

pub fn box_spreads(table: &Table, column: Column) -> Vec<(HumanDevelopment, BoxSpread)> {
    values_by_level(table, column)
        .into_iter()
        .map(|(level, mut values)| {
            values.sort_by(f64::total_cmp);
            let spread = BoxSpread {
                min: values[0],
                q1: quantile(&values, 0.25),
                median: quantile(&values, 0.5),
                q3: quantile(&values, 0.75),
                max: values[values.len() - 1],
            };
            (level, spread)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Proportion plots
// ---------------------------------------------------------------------------

/// Sum of `column` per development level (pie slices).
pub fn sums_by_level(table: &Table, column: Column) -> Vec<(HumanDevelopment, f64)> {
    values_by_level(table, column)
        .into_iter()
        .map(|(level, values)| (level, values.iter().sum()))
        .collect()
}

/// Pivot `Human_development × ISO` of summed values, restricted to the ISO
/// codes with the largest mean of the column.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedPivot {
    /// Development levels on the category axis, lowest first.
    pub levels: Vec<HumanDevelopment>,
    /// One stacked series per ISO code: the sum for each entry of `levels`.
    pub series: Vec<(String, Vec<f64>)>,
}

pub fn top_iso_pivot(table: &Table, column: Column, top: usize) -> StackedPivot {
    let mut by_iso: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for record in table.records() {
        let Some(v) = record.number(column) else {
            continue;
        };
        let entry = by_iso.entry(record.iso.as_str()).or_insert((0.0, 0));
        entry.0 += v;
        entry.1 += 1;
    }
    let mut means: Vec<(&str, f64)> = by_iso
        .into_iter()
        .map(|(iso, (sum, count))| (iso, sum / count as f64))
        .collect();
    means.sort_by(|a, b| b.1.total_cmp(&a.1));
    means.truncate(top);

    let levels: Vec<HumanDevelopment> = HumanDevelopment::ALL
        .into_iter()
        .filter(|level| {
            table.records().iter().any(|r| {
                r.human_development == *level && means.iter().any(|(iso, _)| *iso == r.iso)
            })
        })
        .collect();

    let series = means
        .iter()
        .map(|(iso, _)| {
            let sums = levels
                .iter()
                .map(|level| {
                    table
                        .records()
                        .iter()
                        .filter(|r| r.human_development == *level && r.iso == *iso)
                        .filter_map(|r| r.number(column))
                        .sum()
                })
                .collect();
            (iso.to_string(), sums)
        })
        .collect();

    StackedPivot { levels, series }
}

// ---------------------------------------------------------------------------
// Correlation plots
// ---------------------------------------------------------------------------

/// `(x, y)` pairs per level. Sorted by `x` when drawn as lines.
pub fn correlation_pairs(
    table: &Table,
    x: Column,
    y: Column,
    sort_by_x: bool,
) -> BTreeMap<HumanDevelopment, Vec<[f64; 2]>> {
    let mut groups: BTreeMap<HumanDevelopment, Vec<[f64; 2]>> = BTreeMap::new();
    for record in table.records() {
        if let (Some(a), Some(b)) = (record.number(x), record.number(y)) {
            groups.entry(record.human_development).or_default().push([a, b]);
        }
    }
    if sort_by_x {
        for points in groups.values_mut() {
            points.sort_by(|p, q| p[0].total_cmp(&q[0]));
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn record(iso: &str, level: HumanDevelopment, gii: f64, rank: f64) -> Record {
        let mut numbers = [0.0; 9];
        numbers[0] = gii;
        numbers[1] = rank;
        Record {
            country: iso.into(),
            iso: iso.into(),
            human_development: level,
            numbers,
        }
    }

    fn table() -> Table {
        use HumanDevelopment::*;
        Table::from_records(vec![
            record("ISL", VeryHigh, 0.04, 8.0),
            record("SWE", VeryHigh, 0.02, 4.0),
            record("PER", High, 0.38, 90.0),
            record("IND", Medium, 0.49, 122.0),
            record("CHN", High, 0.19, 48.0),
            record("TCD", Low, 0.65, 165.0),
            record("NER", Low, 0.61, 154.0),
        ])
    }

    #[test]
    fn histogram_counts_every_row() {
        let h = histogram(&table(), Column::Gii).unwrap();
        // Sturges: ceil(log2 7) + 1
        assert_eq!(h.bin_count(), 4);
        assert_eq!(h.total(), 7);
        assert_eq!(h.counts[&HumanDevelopment::Low].iter().sum::<usize>(), 2);
        // max lands in the last bin
        assert_eq!(h.counts[&HumanDevelopment::Low][3], 2);
        assert_eq!(h.counts[&HumanDevelopment::VeryHigh][0], 2);
    }

    #[test]
    fn histogram_of_constant_column() {
        let t = Table::from_records(vec![record("ISL", HumanDevelopment::High, 1.0, 1.0); 3]);
        let h = histogram(&t, Column::Gii).unwrap();
        assert_eq!(h.total(), 3);
        assert!(histogram(&t, Column::Country).is_none());
    }

    #[test]
    fn ecdf_reaches_one_per_level() {
        let curves = ecdf(&table(), Column::Gii);
        for points in curves.values() {
            assert_eq!(points.last().unwrap()[1], 1.0);
            assert!(points.windows(2).all(|w| w[0][0] <= w[1][0]));
        }
        assert_eq!(curves[&HumanDevelopment::Low], vec![[0.61, 0.5], [0.65, 1.0]]);
    }

    #[test]
    fn kde_integrates_to_about_one() {
        let curves = kde(&table(), Column::Gii);
        // Single-row levels have no spread.
        assert!(!curves.contains_key(&HumanDevelopment::Medium));
        let curve = &curves[&HumanDevelopment::High];
        let dx = curve[1][0] - curve[0][0];
        let area: f64 = curve.iter().map(|p| p[1] * dx).sum();
        assert!((area - 1.0).abs() < 0.02, "area {area}");
    }

    #[test]
    fn box_spread_quartiles() {
        let spreads = box_spreads(&table(), Column::Rank);
        let (level, low) = spreads[0];
        assert_eq!(level, HumanDevelopment::Low);
        assert_eq!(low.min, 154.0);
        assert_eq!(low.median, 159.5);
        assert_eq!(low.max, 165.0);
    }

    #[test]
    fn pie_sums_by_level() {
        let sums = sums_by_level(&table(), Column::Rank);
        assert_eq!(
            sums,
            vec![
                (HumanDevelopment::Low, 319.0),
                (HumanDevelopment::Medium, 122.0),
                (HumanDevelopment::High, 138.0),
                (HumanDevelopment::VeryHigh, 12.0),
            ]
        );
    }

    #[test]
    fn pivot_keeps_top_iso_codes() {
        let pivot = top_iso_pivot(&table(), Column::Gii, 3);
        let isos: Vec<&str> = pivot.series.iter().map(|(iso, _)| iso.as_str()).collect();
        assert_eq!(isos, vec!["TCD", "NER", "IND"]);
        assert_eq!(pivot.levels, vec![HumanDevelopment::Low, HumanDevelopment::Medium]);
        assert_eq!(pivot.series[0].1, vec![0.65, 0.0]);
        assert_eq!(pivot.series[2].1, vec![0.0, 0.49]);
    }

    #[test]
    fn line_pairs_are_sorted_by_x() {
        let pairs = correlation_pairs(&table(), Column::Gii, Column::Rank, true);
        assert_eq!(pairs[&HumanDevelopment::High], vec![[0.19, 48.0], [0.38, 90.0]]);
        let raw = correlation_pairs(&table(), Column::Gii, Column::Rank, false);
        assert_eq!(raw[&HumanDevelopment::High], vec![[0.38, 90.0], [0.19, 48.0]]);
    }
}
