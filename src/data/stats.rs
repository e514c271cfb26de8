use serde::Serialize;

/// Descriptive statistics of one numeric column.
///
/// Every field except `count` is `None` when it is undefined for the input
/// (empty column, or `std` with fewer than two values).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Describe {
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (ddof = 1).
    pub std: Option<f64>,
    pub min: Option<f64>,
    /// 25th percentile (Q1)
    #[serde(rename = "25%")]
    pub q25: Option<f64>,
    /// 50th percentile (median)
    #[serde(rename = "50%")]
    pub q50: Option<f64>,
    /// 75th percentile (Q3)
    #[serde(rename = "75%")]
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl Describe {
    /// Label / value pairs in display order.
    pub fn rows(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("count", Some(self.count as f64)),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.q50),
            ("75%", self.q75),
            ("max", self.max),
        ]
    }
}

/// Compute count, mean, std, min, quartiles and max. NaNs are ignored.
pub fn describe(values: &[f64]) -> Describe {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    if n == 0 {
        return Describe {
            count: 0,
            mean: None,
            std: None,
            min: None,
            q25: None,
            q50: None,
            q75: None,
            max: None,
        };
    }

    let mean = sorted.iter().sum::<f64>() / n as f64;
    let std = (n > 1).then(|| {
        let ss = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
        (ss / (n - 1) as f64).sqrt()
    });

    Describe {
        count: n,
        mean: Some(mean),
        std,
        min: Some(sorted[0]),
        q25: Some(percentile(&sorted, 0.25)),
        q50: Some(percentile(&sorted, 0.50)),
        q75: Some(percentile(&sorted, 0.75)),
        max: Some(sorted[n - 1]),
    }
}

/// Linear interpolation between closest ranks. `sorted` must be non-empty.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Equal-width frequency histogram. `edges` has one more entry than `counts`.
///
/// Infinite values cannot be binned; they are counted in `skipped`, so
/// `total() + skipped` equals the `count` reported by [`describe`].
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    pub skipped: usize,
}

impl Histogram {
    pub fn bin_count(&self) -> usize {
        self.counts.len()
    }

    pub fn bin_width(&self) -> f64 {
        match self.edges.as_slice() {
            [first, second, ..] => second - first,
            _ => 0.0,
        }
    }

    /// (bin centre, count) pairs.
    pub fn bars(&self) -> Vec<(f64, usize)> {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(w, &c)| ((w[0] + w[1]) / 2.0, c))
            .collect()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Bin `values` with automatic bin selection: the larger of the Sturges and
/// Freedman–Diaconis bin counts, capped at `max_bins`.
///
/// Bins are half-open `[lo, hi)` except the last, which includes the maximum.
/// Constant input yields one bin `[v - 0.5, v + 0.5]`. NaNs are ignored.
pub fn histogram(values: &[f64], max_bins: usize) -> Histogram {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let skipped = values.iter().filter(|v| v.is_infinite()).count();
    if skipped > 0 {
        log::debug!("{skipped} infinite values left out of the histogram");
    }
    if finite.is_empty() {
        return Histogram {
            edges: Vec::new(),
            counts: Vec::new(),
            skipped,
        };
    }

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range == 0.0 {
        return Histogram {
            edges: vec![min - 0.5, min + 0.5],
            counts: vec![finite.len()],
            skipped,
        };
    }

    let bins = auto_bin_count(&finite, range).clamp(1, max_bins.max(1));
    let width = range / bins as f64;
    let edges: Vec<f64> = (0..=bins)
        .map(|i| if i == bins { max } else { min + width * i as f64 })
        .collect();

    let mut counts = vec![0usize; bins];
    for v in &finite {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Histogram {
        edges,
        counts,
        skipped,
    }
}

fn auto_bin_count(values: &[f64], range: f64) -> usize {
    let n = values.len() as f64;
    let sturges_width = range / (n.log2() + 1.0);

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let iqr = percentile(&sorted, 0.75) - percentile(&sorted, 0.25);
    let fd_width = 2.0 * iqr * n.powf(-1.0 / 3.0);

    let width = if fd_width > 0.0 {
        fd_width.min(sturges_width)
    } else {
        sturges_width
    };
    (range / width).ceil() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_BINS: usize = 200;

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn describe_one_to_five() {
        let d = describe(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(d.count, 5);
        assert!(approx(d.mean, 3.0));
        assert!(approx(d.min, 1.0));
        assert!(approx(d.max, 5.0));
        assert!(approx(d.q50, 3.0));
        assert!(approx(d.q25, 2.0));
        assert!(approx(d.q75, 4.0));
        assert!(approx(d.std, 2.5f64.sqrt()));
    }

    #[test]
    fn quartiles_interpolate_between_ranks() {
        let d = describe(&[4.0, 1.0, 3.0, 2.0]);
        assert!(approx(d.q25, 1.75));
        assert!(approx(d.q50, 2.5));
        assert!(approx(d.q75, 3.25));
    }

    #[test]
    fn single_value_has_no_std() {
        let d = describe(&[7.5]);
        assert_eq!(d.count, 1);
        assert_eq!(d.std, None);
        assert!(approx(d.q75, 7.5));
    }

    #[test]
    fn empty_input_is_all_undefined() {
        let d = describe(&[]);
        assert_eq!(d.count, 0);
        assert!(d.rows().iter().skip(1).all(|(_, v)| v.is_none()));
    }

    #[test]
    fn describe_serializes_with_describe_labels() {
        let json = serde_json::to_value(describe(&[2.0])).unwrap();
        assert_eq!(json["count"], 1);
        assert_eq!(json["50%"], 2.0);
        assert!(json["std"].is_null());
    }

    #[test]
    fn histogram_counts_every_value() {
        let values: Vec<f64> = (0..100).map(|i| (i as f64 * 0.37).sin() * 10.0).collect();
        let h = histogram(&values, MAX_BINS);
        assert_eq!(h.total(), 100);
        assert_eq!(h.edges.len(), h.bin_count() + 1);
        assert!(h.bin_count() >= 8);
        assert!(h.bin_count() <= MAX_BINS);
    }

    #[test]
    fn histogram_last_bin_includes_max() {
        let h = histogram(&[1.0, 2.0, 3.0, 4.0, 5.0], MAX_BINS);
        assert_eq!(h.total(), 5);
        assert_eq!(*h.edges.last().unwrap(), 5.0);
        assert!(*h.counts.last().unwrap() >= 1);
    }

    #[test]
    fn constant_values_make_one_bin() {
        let h = histogram(&[2.0, 2.0, 2.0], MAX_BINS);
        assert_eq!(h.counts, vec![3]);
        assert_eq!(h.edges, vec![1.5, 2.5]);
        assert_eq!(h.bars(), vec![(2.0, 3)]);
    }

    #[test]
    fn infinite_values_are_reported_as_skipped() {
        let values = [1.0, 2.0, f64::INFINITY];
        let d = describe(&values);
        let h = histogram(&values, MAX_BINS);
        assert_eq!(d.count, 3);
        assert_eq!(d.mean, Some(f64::INFINITY));
        assert_eq!(h.total(), 2);
        assert_eq!(h.skipped, 1);
        assert_eq!(h.total() + h.skipped, d.count);

        let only_inf = histogram(&[f64::NEG_INFINITY, f64::INFINITY], MAX_BINS);
        assert_eq!(only_inf.bin_count(), 0);
        assert_eq!(only_inf.skipped, 2);
    }

    #[test]
    fn bin_cap_is_respected() {
        let values: Vec<f64> = (0..1000).map(|i| i as f64).collect();
        assert_eq!(histogram(&values, 4).bin_count(), 4);
    }

    #[test]
    fn empty_histogram_has_no_bins() {
        let h = histogram(&[], MAX_BINS);
        assert_eq!(h.bin_count(), 0);
        assert_eq!(h.bin_width(), 0.0);
    }
}
