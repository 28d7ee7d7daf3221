//! Weighted Hodge 1-Laplacian and its spectrum.
//!
//! The Laplacian is assembled from the oriented incidence operator and the
//! current edge weights as `L1 = B1^T diag(w) B1`. Its spectrum carries the
//! structure the repair step acts on:
//!
//! - Near-zero eigenvalues span the harmonic subspace; their count
//!   approximates the number of independent cycles in the skeleton.
//! - The smallest strictly positive eigenvalue is the spectral gap, the
//!   quantity gradient ascent pushes up.

use crate::error::{RepairError, RepairResult};
use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Assemble the weighted Laplacian `L1 = B1^T diag(w) B1`.
///
/// `b1` is m x n, `weights` the length-m edge weight vector in canonical
/// order. The result is n x n, symmetric and positive semi-definite for
/// non-negative weights.
pub fn hodge_laplacian(b1: &Array2<f64>, weights: &Array1<f64>) -> RepairResult<Array2<f64>> {
    if b1.nrows() != weights.len() {
        return Err(RepairError::dim_mismatch(b1.nrows(), weights.len()));
    }
    let mut weighted = b1.clone();
    for (mut row, &w) in weighted.outer_iter_mut().zip(weights.iter()) {
        row.mapv_inplace(|x| x * w);
    }
    Ok(b1.t().dot(&weighted))
}

/// Spectrum of the weighted Laplacian, eigenvalues ascending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaplacianSpectrum {
    /// Eigenvalues in ascending order.
    pub eigenvalues: Vec<f64>,
    /// Eigenvectors, matching the eigenvalue order.
    pub eigenvectors: Vec<Array1<f64>>,
    /// Number of eigenvalues at or below the zero tolerance.
    pub null_space_dim: usize,
    /// Smallest strictly positive eigenvalue, if any.
    pub spectral_gap: Option<f64>,
}

impl LaplacianSpectrum {
    /// Harmonic subspace dimension (approximate first Betti number of the
    /// weighted skeleton).
    pub fn betti_number(&self) -> usize {
        self.null_space_dim
    }

    /// Whether a strictly positive eigenvalue exists.
    pub fn has_spectral_gap(&self) -> bool {
        self.spectral_gap.is_some()
    }

    /// The first non-kernel eigenpair: the harmonic vector the repair
    /// gradient is computed from, together with its eigenvalue.
    ///
    /// `None` when the kernel spans the whole spectrum.
    pub fn harmonic_pair(&self) -> Option<(f64, &Array1<f64>)> {
        let k = self.null_space_dim;
        match (self.eigenvalues.get(k), self.eigenvectors.get(k)) {
            (Some(&eval), Some(evec)) => Some((eval, evec)),
            _ => None,
        }
    }
}

/// Full symmetric eigendecomposition of a Laplacian.
///
/// Eigenvalues are sorted ascending; eigenvalues at or below
/// `zero_tolerance` count toward the null space. NaN anywhere in the
/// decomposition is reported as numeric instability rather than being
/// carried forward.
pub fn compute_spectrum(
    laplacian: &Array2<f64>,
    zero_tolerance: f64,
) -> RepairResult<LaplacianSpectrum> {
    let n = laplacian.nrows();
    if laplacian.ncols() != n {
        return Err(RepairError::invalid_shape(format!(
            "Laplacian must be square, got {} x {}",
            n,
            laplacian.ncols()
        )));
    }
    if n == 0 {
        return Ok(LaplacianSpectrum {
            eigenvalues: Vec::new(),
            eigenvectors: Vec::new(),
            null_space_dim: 0,
            spectral_gap: None,
        });
    }

    let matrix = DMatrix::from_fn(n, n, |r, c| laplacian[[r, c]]);
    if matrix.iter().any(|x| !x.is_finite()) {
        return Err(RepairError::unstable("non-finite entry in Laplacian"));
    }

    let eigen = SymmetricEigen::new(matrix);

    // nalgebra does not order the eigenvalues; sort the pairs ascending.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[a]
            .partial_cmp(&eigen.eigenvalues[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut eigenvalues = Vec::with_capacity(n);
    let mut eigenvectors = Vec::with_capacity(n);
    for &idx in &order {
        let eval = eigen.eigenvalues[idx];
        if !eval.is_finite() {
            return Err(RepairError::unstable("non-finite eigenvalue"));
        }
        eigenvalues.push(eval);
        let col = eigen.eigenvectors.column(idx);
        eigenvectors.push(Array1::from_iter(col.iter().copied()));
    }

    let null_space_dim = eigenvalues.iter().filter(|&&e| e <= zero_tolerance).count();
    let spectral_gap = eigenvalues.iter().find(|&&e| e > zero_tolerance).copied();

    Ok(LaplacianSpectrum {
        eigenvalues,
        eigenvectors,
        null_space_dim,
        spectral_gap,
    })
}
