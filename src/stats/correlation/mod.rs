//! Pearson correlation over row-aligned numeric columns
//!
//! Columns are paired by row. A row where either side is missing is dropped for
//! that pair only, and the drop is reported as a caveat. A pair whose
//! correlation has no defined value (a constant side, fewer than two complete
//! rows) gets `r = 0` together with a caveat saying why.

use rayon::prelude::*;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::stats::descriptive::{mean_impl, negligible_spread};

/// Smallest number of complete pairs a correlation is computed from
const MIN_PAIRS: usize = 2;

/// Why a matrix entry needs a second look
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaveatKind {
    /// One side has no spread, r is reported as 0
    ConstantColumn,
    /// Incomplete rows dropped from the pair
    DroppedRows(usize),
    /// Fewer than two complete rows, r is reported as 0
    InsufficientPairs(usize),
}

/// Caveat attached to one column pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorrelationCaveat {
    pub first: String,
    pub second: String,
    pub kind: CaveatKind,
}

/// One off-diagonal entry of the matrix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationPair {
    pub first: String,
    pub second: String,
    pub r: f64,
}

/// Symmetric correlation matrix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    /// Column names, in row/column order of `values`
    pub columns: Vec<String>,
    /// Square matrix of coefficients
    pub values: Vec<Vec<f64>>,
    /// Caveats in pair order
    pub caveats: Vec<CorrelationCaveat>,
}

impl CorrelationMatrix {
    /// Column names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the matrix has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Coefficient between two columns
    pub fn get(&self, first: &str, second: &str) -> Option<f64> {
        let i = self.position(first)?;
        let j = self.position(second)?;
        Some(self.values[i][j])
    }

    /// Caveats mentioning both columns
    pub fn caveats_for(&self, first: &str, second: &str) -> Vec<&CorrelationCaveat> {
        self.caveats
            .iter()
            .filter(|c| (c.first == first && c.second == second) || (c.first == second && c.second == first))
            .collect()
    }

    /// Off-diagonal pairs with `|r|` strictly above `threshold`
    pub fn strong_pairs(&self, threshold: f64) -> Vec<CorrelationPair> {
        let mut pairs = Vec::new();
        for i in 0..self.columns.len() {
            for j in (i + 1)..self.columns.len() {
                let r = self.values[i][j];
                if r.abs() > threshold {
                    pairs.push(CorrelationPair {
                        first: self.columns[i].clone(),
                        second: self.columns[j].clone(),
                        r,
                    });
                }
            }
        }
        pairs
    }
}

/// Pearson coefficient of one complete sample pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PearsonResult {
    /// Coefficient, 0 when `degenerate` is set
    pub r: f64,
    /// Number of pairs used
    pub n: usize,
    /// Set when r had no defined value
    pub degenerate: Option<CaveatKind>,
}

/// Sum-of-products Pearson coefficient over centered values
///
/// `r = Sxy / sqrt(Sxx * Syy)` with `S` the sums of products of deviations from
/// the means, clamped to `[-1, 1]`. A side counts as constant under the same
/// spread test the descriptive statistics use.
pub(crate) fn pearson_impl(x: &[f64], y: &[f64]) -> Result<PearsonResult> {
    if x.len() != y.len() {
        return Err(Error::InvalidInput(format!(
            "correlation needs samples of equal length: x={}, y={}",
            x.len(),
            y.len()
        )));
    }

    let n = x.len();
    if n < MIN_PAIRS {
        return Ok(PearsonResult {
            r: 0.0,
            n,
            degenerate: Some(CaveatKind::InsufficientPairs(n)),
        });
    }

    let mean_x = mean_impl(x);
    let mean_y = mean_impl(y);
    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    let nf = n as f64;
    let std_x = (sxx / nf).sqrt();
    let std_y = (syy / nf).sqrt();
    let denominator = (sxx * syy).sqrt();
    let constant = negligible_spread(std_x, mean_x) || negligible_spread(std_y, mean_y);
    if constant || denominator.is_nan() || denominator <= 0.0 {
        return Ok(PearsonResult {
            r: 0.0,
            n,
            degenerate: Some(CaveatKind::ConstantColumn),
        });
    }

    Ok(PearsonResult {
        r: (sxy / denominator).clamp(-1.0, 1.0),
        n,
        degenerate: None,
    })
}

/// Correlate one row-aligned pair, dropping incomplete rows
fn pair_entry(first: &str, x: &[Option<f64>], second: &str, y: &[Option<f64>]) -> Result<(f64, Vec<CorrelationCaveat>)> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .unzip();

    let caveat = |kind| CorrelationCaveat {
        first: first.to_string(),
        second: second.to_string(),
        kind,
    };

    let mut caveats = Vec::new();
    let dropped = x.len() - xs.len();
    if dropped > 0 {
        log::warn!(
            "correlation {} / {}: dropped {} incomplete row(s)",
            first,
            second,
            dropped
        );
        caveats.push(caveat(CaveatKind::DroppedRows(dropped)));
    }

    let pearson = pearson_impl(&xs, &ys)?;
    if let Some(kind) = pearson.degenerate {
        log::debug!("correlation {} / {} reported as 0: {:?}", first, second, kind);
        caveats.push(caveat(kind));
    }

    Ok((pearson.r, caveats))
}

/// Build the correlation matrix of row-aligned numeric columns
///
/// Only the upper triangle is computed; the lower one is its mirror.
pub(crate) fn correlation_matrix_impl(columns: &[(String, Vec<Option<f64>>)], parallel: bool) -> Result<CorrelationMatrix> {
    if columns.len() < 2 {
        return Err(Error::InsufficientColumns {
            required: 2,
            found: columns.len(),
        });
    }
    let rows = columns[0].1.len();
    if let Some((name, values)) = columns.iter().find(|(_, v)| v.len() != rows) {
        return Err(Error::InvalidInput(format!(
            "column '{}' has {} rows, expected {}",
            name,
            values.len(),
            rows
        )));
    }

    let k = columns.len();
    let pairs: Vec<(usize, usize)> = (0..k).flat_map(|i| ((i + 1)..k).map(move |j| (i, j))).collect();

    let compute = |&(i, j): &(usize, usize)| {
        let (first, x) = &columns[i];
        let (second, y) = &columns[j];
        pair_entry(first, x, second, y)
    };
    let entries: Vec<(f64, Vec<CorrelationCaveat>)> = if parallel {
        pairs.par_iter().map(compute).collect::<Result<_>>()?
    } else {
        pairs.iter().map(compute).collect::<Result<_>>()?
    };

    let mut values = vec![vec![0.0; k]; k];
    let mut caveats = Vec::new();
    for (i, row) in values.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    for (&(i, j), (r, pair_caveats)) in pairs.iter().zip(entries) {
        values[i][j] = r;
        values[j][i] = r;
        caveats.extend(pair_caveats);
    }

    Ok(CorrelationMatrix {
        columns: columns.iter().map(|(name, _)| name.clone()).collect(),
        values,
        caveats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, values: &[Option<f64>]) -> (String, Vec<Option<f64>>) {
        (name.to_string(), values.to_vec())
    }

    fn full(name: &str, values: &[f64]) -> (String, Vec<Option<f64>>) {
        (name.to_string(), values.iter().copied().map(Some).collect())
    }

    #[test]
    fn test_perfect_correlation() {
        let p = pearson_impl(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
        assert_eq!(p.r, 1.0);
        assert_eq!(p.n, 3);
        assert!(p.degenerate.is_none());

        let p = pearson_impl(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap();
        assert_eq!(p.r, -1.0);
    }

    #[test]
    fn test_constant_column_is_zero() {
        let p = pearson_impl(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]).unwrap();
        assert_eq!(p.r, 0.0);
        assert_eq!(p.degenerate, Some(CaveatKind::ConstantColumn));

        let p = pearson_impl(&[0.1, 0.1, 0.1, 0.1], &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(p.degenerate, Some(CaveatKind::ConstantColumn));
    }

    #[test]
    fn test_offset_values_are_not_constant() {
        let p = pearson_impl(&[1e6, 1e6 + 1.0, 1e6 + 2.0], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(p.r, 1.0);
        assert!(p.degenerate.is_none());

        let ts = [1_700_000_000.0, 1_700_000_060.0, 1_700_000_120.0, 1_700_000_180.0];
        let p = pearson_impl(&ts, &[4.0, 3.0, 2.0, 1.0]).unwrap();
        assert_eq!(p.r, -1.0);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(pearson_impl(&[1.0], &[1.0, 2.0]), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_matrix_is_symmetric() {
        let columns = vec![
            full("a", &[1.0, 2.0, 3.0, 4.0, 5.0]),
            full("b", &[2.0, 1.0, 4.0, 3.0, 6.0]),
            full("c", &[9.0, 7.0, 4.0, 4.5, 1.0]),
        ];
        for parallel in [false, true] {
            let m = correlation_matrix_impl(&columns, parallel).unwrap();
            for i in 0..3 {
                assert_eq!(m.values[i][i], 1.0);
                for j in 0..3 {
                    assert_eq!(m.values[i][j], m.values[j][i]);
                    assert!(m.values[i][j].abs() <= 1.0);
                }
            }
            assert!(m.caveats.is_empty());
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let columns: Vec<_> = (0..6)
            .map(|c| {
                let values: Vec<f64> = (0..50).map(|i| ((i * (c + 3)) % 17) as f64).collect();
                full(&format!("c{}", c), &values)
            })
            .collect();
        let seq = correlation_matrix_impl(&columns, false).unwrap();
        let par = correlation_matrix_impl(&columns, true).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn test_incomplete_rows_are_dropped() {
        let columns = vec![
            column("x", &[Some(1.0), Some(2.0), None, Some(3.0)]),
            column("y", &[Some(2.0), Some(4.0), Some(100.0), Some(6.0)]),
        ];
        let m = correlation_matrix_impl(&columns, false).unwrap();
        assert_eq!(m.get("x", "y"), Some(1.0));
        assert_eq!(m.caveats_for("y", "x")[0].kind, CaveatKind::DroppedRows(1));
    }

    #[test]
    fn test_insufficient_pairs() {
        let columns = vec![
            column("x", &[Some(1.0), None, Some(3.0)]),
            column("y", &[None, Some(2.0), Some(6.0)]),
        ];
        let m = correlation_matrix_impl(&columns, false).unwrap();
        assert_eq!(m.get("x", "y"), Some(0.0));
        let kinds: Vec<CaveatKind> = m.caveats.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![CaveatKind::DroppedRows(2), CaveatKind::InsufficientPairs(1)]);
    }

    #[test]
    fn test_insufficient_columns() {
        let result = correlation_matrix_impl(&[full("a", &[1.0, 2.0])], false);
        assert!(matches!(result, Err(Error::InsufficientColumns { required: 2, found: 1 })));
    }

    #[test]
    fn test_strong_pairs() {
        let columns = vec![
            full("a", &[1.0, 2.0, 3.0, 4.0]),
            full("b", &[2.0, 4.0, 6.0, 8.0]),
            full("c", &[1.0, -1.0, 1.0, -1.0]),
        ];
        let m = correlation_matrix_impl(&columns, false).unwrap();
        let strong = m.strong_pairs(0.7);
        assert_eq!(strong.len(), 1);
        assert_eq!((strong[0].first.as_str(), strong[0].second.as_str()), ("a", "b"));
    }
}
