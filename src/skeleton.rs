//! Canonical 1-skeleton edge enumeration.
//!
//! All operations in this crate agree on one edge ordering: the row-major
//! upper triangle of the vertex pair grid, `(i, j)` with `i < j`. The
//! oriented incidence matrix, the weight vectorization, and the no-restore
//! mask are all indexed by that ordering, so a weight matrix can round-trip
//! between its symmetric n x n form and its length-m edge vector form
//! without any auxiliary index map.

use crate::error::{RepairError, RepairResult};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Number of edges in the complete upper-triangular edge set on `n` vertices.
pub fn edge_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Endpoints `(i, j)` with `i < j` for every edge, in canonical order.
pub fn edge_endpoints(n: usize) -> Vec<(usize, usize)> {
    let mut pairs = Vec::with_capacity(edge_count(n));
    for i in 0..n {
        for j in (i + 1)..n {
            pairs.push((i, j));
        }
    }
    pairs
}

/// Canonical index of the edge between vertices `a` and `b`.
///
/// Returns `None` for a self-pair or an out-of-range vertex.
pub fn edge_index(a: usize, b: usize, n: usize) -> Option<usize> {
    if a == b || a >= n || b >= n {
        return None;
    }
    let (i, j) = if a < b { (a, b) } else { (b, a) };
    // Edges before row i, plus the offset within row i.
    Some(i * n - i * (i + 1) / 2 + (j - i - 1))
}

/// Oriented incidence matrix `B1` (m x n) for the complete edge set.
///
/// Row `e` for edge `(i, j)` carries `+1` at column `i` and `-1` at
/// column `j`, the source-minus-target orientation. The repair gradient
/// squares edge tensions, so downstream results do not depend on the
/// sign choice, only on its consistency.
pub fn incidence_matrix(n: usize) -> Array2<f64> {
    let m = edge_count(n);
    let mut b1 = Array2::zeros((m, n));
    for (e, (i, j)) in edge_endpoints(n).into_iter().enumerate() {
        b1[[e, i]] = 1.0;
        b1[[e, j]] = -1.0;
    }
    b1
}

/// Extract the canonical edge-weight vector from a symmetric matrix.
pub fn upper_triangle(weights: &Array2<f64>) -> Array1<f64> {
    let n = weights.nrows();
    let mut w = Array1::zeros(edge_count(n));
    for (e, (i, j)) in edge_endpoints(n).into_iter().enumerate() {
        w[e] = weights[[i, j]];
    }
    w
}

/// Scatter an edge-weight vector back into symmetric n x n form.
///
/// The diagonal is zero; entry `(i, j)` and its mirror both receive the
/// weight of edge `(i, j)`.
pub fn from_upper_triangle(w: &Array1<f64>, n: usize) -> RepairResult<Array2<f64>> {
    let m = edge_count(n);
    if w.len() != m {
        return Err(RepairError::dim_mismatch(m, w.len()));
    }
    let mut weights = Array2::zeros((n, n));
    for (e, (i, j)) in edge_endpoints(n).into_iter().enumerate() {
        weights[[i, j]] = w[e];
        weights[[j, i]] = w[e];
    }
    Ok(weights)
}

/// The no-restore constraint: edges that must never receive positive
/// reinforcement from a repair step.
///
/// The mask is indexed by the canonical edge ordering. Masked edges still
/// decay; they are only excluded from the gradient term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoRestoreMask {
    forbidden: Vec<bool>,
}

impl NoRestoreMask {
    /// Mask with no forbidden edges, for an edge set of size `m`.
    pub fn none(m: usize) -> Self {
        Self {
            forbidden: vec![false; m],
        }
    }

    /// Mask forbidding the edges at the given canonical indices.
    pub fn from_indices(m: usize, indices: &[usize]) -> RepairResult<Self> {
        let mut forbidden = vec![false; m];
        for &e in indices {
            if e >= m {
                return Err(RepairError::invalid_shape(format!(
                    "forbidden edge index {e} out of range for {m} edges"
                )));
            }
            forbidden[e] = true;
        }
        Ok(Self { forbidden })
    }

    /// Mask forbidding the edges between the given vertex pairs on an
    /// `n`-vertex skeleton.
    pub fn from_pairs(n: usize, pairs: &[(usize, usize)]) -> RepairResult<Self> {
        let mut forbidden = vec![false; edge_count(n)];
        for &(a, b) in pairs {
            let e = edge_index(a, b, n).ok_or_else(|| {
                RepairError::invalid_shape(format!(
                    "({a}, {b}) is not an edge of a {n}-vertex skeleton"
                ))
            })?;
            forbidden[e] = true;
        }
        Ok(Self { forbidden })
    }

    /// Number of edges the mask covers.
    pub fn len(&self) -> usize {
        self.forbidden.len()
    }

    /// Whether the mask covers no edges at all.
    pub fn is_empty(&self) -> bool {
        self.forbidden.is_empty()
    }

    /// Whether edge `e` is under the no-restore constraint.
    pub fn is_forbidden(&self, e: usize) -> bool {
        self.forbidden.get(e).copied().unwrap_or(false)
    }

    /// Number of forbidden edges.
    pub fn forbidden_count(&self) -> usize {
        self.forbidden.iter().filter(|&&f| f).count()
    }

    /// Iterator over the per-edge flags in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.forbidden.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_count_matches_enumeration() {
        for n in 0..8 {
            assert_eq!(edge_endpoints(n).len(), edge_count(n));
        }
    }

    #[test]
    fn edge_index_agrees_with_enumeration() {
        let n = 6;
        for (e, (i, j)) in edge_endpoints(n).into_iter().enumerate() {
            assert_eq!(edge_index(i, j, n), Some(e));
            assert_eq!(edge_index(j, i, n), Some(e));
        }
    }

    #[test]
    fn edge_index_rejects_self_and_out_of_range() {
        assert_eq!(edge_index(2, 2, 5), None);
        assert_eq!(edge_index(0, 5, 5), None);
    }

    #[test]
    fn incidence_rows_sum_to_zero() {
        let b1 = incidence_matrix(5);
        assert_eq!(b1.dim(), (10, 5));
        for row in b1.outer_iter() {
            assert_eq!(row.sum(), 0.0);
            assert_eq!(row.iter().filter(|&&x| x != 0.0).count(), 2);
        }
    }

    #[test]
    fn vectorize_scatter_round_trip() {
        let n = 4;
        let w = Array1::from_iter((0..edge_count(n)).map(|e| e as f64 + 0.5));
        let full = from_upper_triangle(&w, n).unwrap();
        assert_eq!(full, full.t().to_owned());
        assert_eq!(upper_triangle(&full), w);
    }

    #[test]
    fn scatter_rejects_wrong_length() {
        let w = Array1::zeros(5);
        assert!(from_upper_triangle(&w, 4).is_err());
    }

    #[test]
    fn mask_from_pairs() {
        let mask = NoRestoreMask::from_pairs(4, &[(0, 1), (3, 2)]).unwrap();
        assert_eq!(mask.len(), 6);
        assert_eq!(mask.forbidden_count(), 2);
        assert!(mask.is_forbidden(edge_index(0, 1, 4).unwrap()));
        assert!(mask.is_forbidden(edge_index(2, 3, 4).unwrap()));
        assert!(!mask.is_forbidden(edge_index(0, 2, 4).unwrap()));
    }

    #[test]
    fn mask_rejects_invalid_pair() {
        assert!(NoRestoreMask::from_pairs(4, &[(1, 1)]).is_err());
        assert!(NoRestoreMask::from_indices(6, &[6]).is_err());
    }
}
