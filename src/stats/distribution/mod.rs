//! Equal-width distribution binning

use serde::Serialize;

use crate::error::{Error, Result};

/// Upper limit of the default bin count
pub const DEFAULT_MAX_BINS: usize = 10;

/// Largest bin count a histogram accepts
pub const MAX_BINS: usize = 10_000;

/// One histogram bin
///
/// Bins cover `[start, end)`, except the last one which is closed so that
/// the maximum is counted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
    pub percentage: f64,
}

impl HistogramBin {
    /// Display label, e.g. `"1.00 - 2.50"`
    pub fn label(&self) -> String {
        format!("{:.2} - {:.2}", self.start, self.end)
    }
}

/// Equal-width histogram
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
    pub bin_width: f64,
    pub total: usize,
}

impl Histogram {
    /// Bin counts in order
    pub fn counts(&self) -> Vec<usize> {
        self.bins.iter().map(|b| b.count).collect()
    }

    /// Bin labels in order
    pub fn labels(&self) -> Vec<String> {
        self.bins.iter().map(HistogramBin::label).collect()
    }
}

/// `min(max_bins, ceil(sqrt(n)))`, at least one bin
pub fn default_bin_count(n: usize, max_bins: usize) -> usize {
    let by_size = (n as f64).sqrt().ceil() as usize;
    by_size.min(max_bins).max(1)
}

/// Bucket values into `bins` equal-width bins spanning `[min, max]`
pub(crate) fn histogram_impl(data: &[f64], bins: usize) -> Result<Histogram> {
    if data.is_empty() {
        return Err(Error::EmptyData("histogram needs at least one value".into()));
    }
    if bins == 0 {
        return Err(Error::InvalidInput("histogram needs at least one bin".into()));
    }
    if bins > MAX_BINS {
        return Err(Error::InvalidInput(format!(
            "histogram accepts at most {} bins, got {}",
            MAX_BINS, bins
        )));
    }
    if data.iter().any(|v| !v.is_finite()) {
        return Err(Error::InvalidInput("histogram needs finite values".into()));
    }

    let (min, max) = data
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
    let total = data.len();

    // constant sample: a single closed bin
    if max == min {
        return Ok(Histogram {
            bins: vec![HistogramBin {
                start: min,
                end: max,
                count: total,
                percentage: 100.0,
            }],
            bin_width: 0.0,
            total,
        });
    }

    let width = (max - min) / bins as f64;
    let last = bins - 1;
    let start_of = |i: usize| min + i as f64 * width;
    let end_of = |i: usize| if i == last { max } else { min + (i + 1) as f64 * width };

    let mut counts = vec![0usize; bins];
    for &value in data {
        let mut idx = (((value - min) / width).floor() as usize).min(last);
        // keep the assignment consistent with the reported edges
        while idx > 0 && value < start_of(idx) {
            idx -= 1;
        }
        while idx < last && value >= end_of(idx) {
            idx += 1;
        }
        counts[idx] += 1;
    }

    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: start_of(i),
            end: end_of(i),
            count,
            percentage: crate::stats::percentage(count, total),
        })
        .collect();

    Ok(Histogram {
        bins,
        bin_width: width,
        total,
    })
}
