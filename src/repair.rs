//! The spectral repair step.
//!
//! One step of topological spectral coherence control: read the harmonic
//! structure of the current weighted skeleton, reinforce the edges whose
//! tension most increases the spectral gap, decay everything that is
//! currently load-bearing, and never reinforce an edge under the
//! no-restore constraint.
//!
//! The step is a pure function: inputs are untouched and identical inputs
//! produce identical outputs. Callers drive it in a loop, feeding each
//! returned weight matrix back in as the next input.

use crate::error::{RepairError, RepairResult};
use crate::laplacian::{compute_spectrum, hodge_laplacian};
use crate::skeleton::{edge_count, from_upper_triangle, upper_triangle, NoRestoreMask};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Relative tolerance for accepting a weight matrix as symmetric.
const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Hyperparameters of the repair step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairConfig {
    /// Gradient gain for spectral gap ascent. Must be finite and >= 0.
    pub eta: f64,
    /// Constant decay applied to every strictly positive weight.
    /// Must be finite and >= 0.
    pub gamma: f64,
    /// Eigenvalues at or below this threshold count as kernel.
    pub zero_tolerance: f64,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            eta: 0.05,
            gamma: 0.002,
            zero_tolerance: 1e-9,
        }
    }
}

impl RepairConfig {
    /// Check the hyperparameters are usable.
    pub fn validate(&self) -> RepairResult<()> {
        if !self.eta.is_finite() || self.eta < 0.0 {
            return Err(RepairError::Config(format!(
                "eta must be finite and non-negative, got {}",
                self.eta
            )));
        }
        if !self.gamma.is_finite() || self.gamma < 0.0 {
            return Err(RepairError::Config(format!(
                "gamma must be finite and non-negative, got {}",
                self.gamma
            )));
        }
        if !self.zero_tolerance.is_finite() || self.zero_tolerance < 0.0 {
            return Err(RepairError::Config(format!(
                "zero_tolerance must be finite and non-negative, got {}",
                self.zero_tolerance
            )));
        }
        Ok(())
    }
}

/// Result of one repair step: the updated weights plus the scalars worth
/// inspecting along the way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairStep {
    /// Updated weight matrix, symmetric and non-negative.
    pub weights: Array2<f64>,
    /// Eigenvalue of the harmonic vector the gradient targeted.
    pub spectral_gap: f64,
    /// Kernel dimension of the Laplacian at this step.
    pub kernel_dim: usize,
    /// Edges that received a strictly positive reinforcement.
    pub reinforced_edges: usize,
    /// Sum of all weight changes, reinforcement minus decay and clamping.
    pub net_weight_change: f64,
}

/// Validate input shapes; returns the vertex count.
fn validate_inputs(
    weights: &Array2<f64>,
    b1: &Array2<f64>,
    mask: &NoRestoreMask,
) -> RepairResult<usize> {
    let n = weights.nrows();
    if weights.ncols() != n {
        return Err(RepairError::invalid_shape(format!(
            "weight matrix must be square, got {} x {}",
            n,
            weights.ncols()
        )));
    }
    for i in 0..n {
        for j in (i + 1)..n {
            let a = weights[[i, j]];
            let b = weights[[j, i]];
            if (a - b).abs() > SYMMETRY_TOLERANCE * a.abs().max(1.0) {
                return Err(RepairError::invalid_shape(format!(
                    "weight matrix not symmetric at ({i}, {j}): {a} vs {b}"
                )));
            }
        }
    }
    let m = edge_count(n);
    if b1.nrows() != m {
        return Err(RepairError::dim_mismatch(m, b1.nrows()));
    }
    if b1.ncols() != n {
        return Err(RepairError::dim_mismatch(n, b1.ncols()));
    }
    if mask.len() != m {
        return Err(RepairError::dim_mismatch(m, mask.len()));
    }
    Ok(n)
}

/// One repair step, returning diagnostics alongside the updated weights.
///
/// Non-negativity of `weights` is the caller's responsibility; shapes and
/// symmetry are validated here. The step:
///
/// 1. vectorizes the upper triangle of `weights`,
/// 2. assembles `L1 = B1^T diag(w) B1` and decomposes it,
/// 3. takes the first non-kernel eigenvector as the harmonic vector,
/// 4. reinforces each unmasked edge by `eta` times its squared tension,
/// 5. decays every strictly positive weight by `gamma`,
/// 6. clamps at zero and scatters back to symmetric form.
///
/// Fails with [`RepairError::DegenerateSpectrum`] when the kernel spans
/// the whole spectrum (for example, all weights zero) and with
/// [`RepairError::NumericInstability`] when the arithmetic produces
/// non-finite values.
pub fn repair_step_detailed(
    weights: &Array2<f64>,
    b1: &Array2<f64>,
    mask: &NoRestoreMask,
    config: &RepairConfig,
) -> RepairResult<RepairStep> {
    config.validate()?;
    let n = validate_inputs(weights, b1, mask)?;

    let w = upper_triangle(weights);
    let laplacian = hodge_laplacian(b1, &w)?;
    let spectrum = compute_spectrum(&laplacian, config.zero_tolerance)?;

    let kernel_dim = spectrum.null_space_dim;
    let (gap, harmonic) =
        spectrum
            .harmonic_pair()
            .ok_or(RepairError::DegenerateSpectrum {
                kernel_dim,
                dim: n,
            })?;

    // Hellmann-Feynman: d(lambda)/d(w_e) = (B1 v)_e^2.
    let tension = b1.dot(harmonic);
    let mut reinforced = 0usize;
    let mut net_change = 0.0;
    let mut w_new = w.clone();
    for e in 0..w.len() {
        let grad = if mask.is_forbidden(e) {
            0.0
        } else {
            tension[e] * tension[e]
        };
        let decay = if w[e] > 0.0 { config.gamma } else { 0.0 };
        let updated = (w[e] + config.eta * grad - decay).max(0.0);
        if config.eta * grad > 0.0 {
            reinforced += 1;
        }
        net_change += updated - w[e];
        w_new[e] = updated;
    }

    if w_new.iter().any(|x| !x.is_finite()) {
        return Err(RepairError::unstable("non-finite weight after update"));
    }

    debug!(
        n,
        kernel_dim,
        spectral_gap = gap,
        reinforced_edges = reinforced,
        net_weight_change = net_change,
        "repair step applied"
    );

    Ok(RepairStep {
        weights: from_upper_triangle(&w_new, n)?,
        spectral_gap: gap,
        kernel_dim,
        reinforced_edges: reinforced,
        net_weight_change: net_change,
    })
}

/// One repair step, returning only the updated weight matrix.
pub fn repair_step(
    weights: &Array2<f64>,
    b1: &Array2<f64>,
    mask: &NoRestoreMask,
    config: &RepairConfig,
) -> RepairResult<Array2<f64>> {
    repair_step_detailed(weights, b1, mask, config).map(|step| step.weights)
}
