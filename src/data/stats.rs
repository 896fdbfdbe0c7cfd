//! Aggregations behind the dashboard charts.
//!
//! Every function here consumes plain iterators or slices pulled out of the
//! listing table and returns small owned summaries for the plot layer. Null
//! and non-finite values are skipped throughout.

use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Scalar summaries
// ---------------------------------------------------------------------------

/// Arithmetic mean, skipping nulls and non-finite entries. `NAN` when no
/// usable value remains.
pub fn mean<I>(values: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values.into_iter().flatten() {
        if v.is_finite() {
            sum += v;
            n += 1;
        }
    }
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// Number of distinct non-null values.
pub fn nunique<'a, I>(items: I) -> usize
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    items
        .into_iter()
        .flatten()
        .collect::<std::collections::BTreeSet<_>>()
        .len()
}

// ---------------------------------------------------------------------------
// Grouped summaries
// ---------------------------------------------------------------------------

/// Occurrences per distinct value, most frequent first. Ties break
/// alphabetically so the ordering is stable across runs.
pub fn value_counts<'a, I>(items: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for item in items.into_iter().flatten() {
        *counts.entry(item).or_insert(0) += 1;
    }
    let mut out: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

/// Mean of `value` per distinct `key`, sorted by key. Pairs with a null key
/// or no usable value are dropped.
pub fn group_mean<'a, I>(pairs: I) -> Vec<(String, f64)>
where
    I: IntoIterator<Item = (Option<&'a str>, Option<f64>)>,
{
    let mut acc: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for (key, value) in pairs {
        let (Some(key), Some(value)) = (key, value) else {
            continue;
        };
        if value.is_finite() {
            let slot = acc.entry(key).or_insert((0.0, 0));
            slot.0 += value;
            slot.1 += 1;
        }
    }
    acc.into_iter()
        .filter(|(_, (_, n))| *n > 0)
        .map(|(k, (sum, n))| (k.to_string(), sum / n as f64))
        .collect()
}

/// All values of `value` per distinct `key`, sorted by key. Feeds the box
/// plots, which need the full distribution rather than a mean.
pub fn group_values<'a, I>(pairs: I) -> Vec<(String, Vec<f64>)>
where
    I: IntoIterator<Item = (Option<&'a str>, Option<f64>)>,
{
    let mut acc: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for (key, value) in pairs {
        let (Some(key), Some(value)) = (key, value) else {
            continue;
        };
        if value.is_finite() {
            acc.entry(key).or_default().push(value);
        }
    }
    acc.into_iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(k, values)| (k.to_string(), values))
        .collect()
}

// ---------------------------------------------------------------------------
// Histograms
// ---------------------------------------------------------------------------

/// Equal-width binning of a numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub counts: Vec<usize>,
    pub min: f64,
    pub max: f64,
    pub bin_width: f64,
}

impl Histogram {
    /// Midpoint of bin `i`, where the bars are drawn.
    pub fn center(&self, i: usize) -> f64 {
        self.min + (i as f64 + 0.5) * self.bin_width
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Bin `values` into `bins` equal-width buckets over their observed range.
/// The maximum lands in the last bin rather than one past it. `None` when
/// there is nothing to bin.
pub fn histogram<I>(values: I, bins: usize) -> Option<Histogram>
where
    I: IntoIterator<Item = Option<f64>>,
{
    if bins == 0 {
        return None;
    }
    let finite: Vec<f64> = values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect();
    if finite.is_empty() {
        return None;
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in &finite {
        min = min.min(v);
        max = max.max(v);
    }
    // A constant column still deserves a visible bar.
    if min == max {
        min -= 0.5;
        max += 0.5;
    }

    let bin_width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in finite {
        let i = (((v - min) / bin_width) as usize).min(bins - 1);
        counts[i] += 1;
    }
    Some(Histogram {
        counts,
        min,
        max,
        bin_width,
    })
}

// ---------------------------------------------------------------------------
// Box plot summaries
// ---------------------------------------------------------------------------

/// Five-number summary with Tukey whiskers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSummary {
    pub whisker_low: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_high: f64,
}

/// Summarize a distribution for a box plot. Quartiles use linear
/// interpolation; whiskers reach the most extreme points within 1.5 IQR of
/// the box. `None` when `values` is empty.
pub fn box_summary(values: &[f64]) -> Option<BoxSummary> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let reach = 1.5 * (q3 - q1);
    let low_fence = q1 - reach;
    let high_fence = q3 + reach;

    let whisker_low = sorted
        .iter()
        .copied()
        .find(|&v| v >= low_fence)
        .unwrap_or(q1);
    let whisker_high = sorted
        .iter()
        .rev()
        .copied()
        .find(|&v| v <= high_fence)
        .unwrap_or(q3);

    Some(BoxSummary {
        whisker_low,
        q1,
        median,
        q3,
        whisker_high,
    })
}

/// Linear-interpolated quantile of an ascending slice.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
    }
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pairwise Pearson correlation matrix over the given columns. Each pair is
/// computed on rows where both columns are present. Cells without enough
/// data or without variance come back as `NAN`.
pub fn correlation_matrix(columns: &[Vec<Option<f64>>]) -> Vec<Vec<f64>> {
    let n = columns.len();
    let mut matrix = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&columns[i], &columns[j]);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    matrix
}

fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b.iter())
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((*x, *y)),
            _ => None,
        })
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x * var_y).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_skips_nulls_and_nan() {
        let values = [Some(1.0), None, Some(3.0), Some(f64::NAN)];
        assert_eq!(mean(values), 2.0);
        assert!(mean([None, None]).is_nan());
        assert!(mean([]).is_nan());
    }

    #[test]
    fn nunique_counts_distinct_non_null() {
        let items = [Some("a"), Some("b"), Some("a"), None];
        assert_eq!(nunique(items), 2);
    }

    #[test]
    fn value_counts_orders_by_count_then_label() {
        let items = [
            Some("b"),
            Some("a"),
            Some("b"),
            Some("c"),
            Some("a"),
            None,
        ];
        assert_eq!(
            value_counts(items),
            vec![
                ("a".to_string(), 2),
                ("b".to_string(), 2),
                ("c".to_string(), 1),
            ]
        );
    }

    #[test]
    fn group_mean_drops_null_keys_and_values() {
        let pairs = [
            (Some("x"), Some(10.0)),
            (Some("x"), Some(20.0)),
            (Some("y"), Some(5.0)),
            (None, Some(100.0)),
            (Some("y"), None),
        ];
        assert_eq!(
            group_mean(pairs),
            vec![("x".to_string(), 15.0), ("y".to_string(), 5.0)]
        );
    }

    #[test]
    fn group_values_collects_per_key() {
        let pairs = [
            (Some("x"), Some(1.0)),
            (Some("y"), Some(2.0)),
            (Some("x"), Some(3.0)),
        ];
        assert_eq!(
            group_values(pairs),
            vec![
                ("x".to_string(), vec![1.0, 3.0]),
                ("y".to_string(), vec![2.0]),
            ]
        );
    }

    #[test]
    fn histogram_keeps_every_value() {
        let values: Vec<Option<f64>> = (0..100).map(|i| Some(i as f64)).collect();
        let hist = histogram(values, 10).unwrap();
        assert_eq!(hist.total(), 100);
        assert_eq!(hist.counts, vec![10; 10]);
    }

    #[test]
    fn histogram_puts_the_maximum_in_the_last_bin() {
        let hist = histogram([Some(0.0), Some(5.0), Some(10.0)], 5).unwrap();
        assert_eq!(*hist.counts.last().unwrap(), 1);
        assert_eq!(hist.total(), 3);
    }

    #[test]
    fn histogram_of_a_constant_column_is_one_spike() {
        let hist = histogram(vec![Some(7.0); 4], 10).unwrap();
        assert_eq!(hist.total(), 4);
        assert_eq!(hist.counts.iter().filter(|&&c| c > 0).count(), 1);
    }

    #[test]
    fn histogram_is_none_without_data() {
        assert!(histogram([None, Some(f64::NAN)], 10).is_none());
        assert!(histogram([Some(1.0)], 0).is_none());
    }

    #[test]
    fn box_summary_of_one_through_nine() {
        let values: Vec<f64> = (1..=9).map(f64::from).collect();
        let summary = box_summary(&values).unwrap();
        assert_eq!(summary.q1, 3.0);
        assert_eq!(summary.median, 5.0);
        assert_eq!(summary.q3, 7.0);
        assert_eq!(summary.whisker_low, 1.0);
        assert_eq!(summary.whisker_high, 9.0);
    }

    #[test]
    fn box_whiskers_stop_at_the_fences() {
        // 100.0 sits far outside q3 + 1.5 IQR and must not drag the whisker.
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let summary = box_summary(&values).unwrap();
        assert!(summary.whisker_high < 100.0);
    }

    #[test]
    fn pearson_recovers_known_relationships() {
        let x: Vec<Option<f64>> = (0..10).map(|i| Some(i as f64)).collect();
        let double: Vec<Option<f64>> = (0..10).map(|i| Some(2.0 * i as f64)).collect();
        let negated: Vec<Option<f64>> = (0..10).map(|i| Some(-(i as f64))).collect();

        assert!((pearson(&x, &double) - 1.0).abs() < 1e-12);
        assert!((pearson(&x, &negated) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_is_nan_without_variance_or_data() {
        let x: Vec<Option<f64>> = (0..5).map(|i| Some(i as f64)).collect();
        let constant = vec![Some(3.0); 5];
        assert!(pearson(&x, &constant).is_nan());
        assert!(pearson(&[Some(1.0)], &[Some(2.0)]).is_nan());
    }

    #[test]
    fn pearson_uses_rows_where_both_sides_exist() {
        let a = vec![Some(1.0), None, Some(3.0), Some(4.0)];
        let b = vec![Some(2.0), Some(9.0), Some(6.0), None];
        // Only rows 0 and 2 overlap: (1, 2) and (3, 6), a perfect line.
        assert!((pearson(&a, &b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let cols = vec![
            (0..8).map(|i| Some(i as f64)).collect::<Vec<_>>(),
            (0..8).map(|i| Some((i * i) as f64)).collect::<Vec<_>>(),
            (0..8).map(|i| Some(8.0 - i as f64)).collect::<Vec<_>>(),
        ];
        let m = correlation_matrix(&cols);
        for i in 0..3 {
            assert!((m[i][i] - 1.0).abs() < 1e-12);
            for j in 0..3 {
                assert_eq!(m[i][j].to_bits(), m[j][i].to_bits());
            }
        }
    }
}
