//! Integration tests for the spectral repair step
//!
//! Verifies the step's contract end to end:
//! - Output symmetry, non-negativity, and shape preservation
//! - The no-restore constraint removes exactly the reinforcement term
//! - Pure reinforcement (gamma = 0) never shrinks a free edge
//! - The eta = gamma = 0 step is the identity
//! - The n = 2 boundary errors on a degenerate spectrum instead of panicking

use approx::assert_abs_diff_eq;
use ndarray::{Array1, Array2};
use tscc_core::{
    compute_spectrum, edge_endpoints, edge_index, hodge_laplacian, incidence_matrix, repair_step,
    repair_step_detailed, upper_triangle, NoRestoreMask, RepairConfig, RepairError, RepairProtocol,
};

// ============================================================================
// TEST INFRASTRUCTURE
// ============================================================================

/// Complete graph with uniform unit weights.
fn complete_uniform(n: usize) -> Array2<f64> {
    let mut w = Array2::ones((n, n));
    for i in 0..n {
        w[[i, i]] = 0.0;
    }
    w
}

/// Gradient the step would apply before masking: squared edge tensions of
/// the harmonic vector, recomputed through the public API.
fn unmasked_gradient(weights: &Array2<f64>, b1: &Array2<f64>, tol: f64) -> Array1<f64> {
    let w = upper_triangle(weights);
    let laplacian = hodge_laplacian(b1, &w).unwrap();
    let spectrum = compute_spectrum(&laplacian, tol).unwrap();
    let (_, harmonic) = spectrum.harmonic_pair().unwrap();
    b1.dot(harmonic).mapv(|t| t * t)
}

// ============================================================================
// CONTRACT TESTS
// ============================================================================

#[test]
fn output_is_symmetric_nonnegative_and_same_shape() {
    let n = 4;
    let weights = complete_uniform(n);
    let b1 = incidence_matrix(n);
    let mask = NoRestoreMask::none(b1.nrows());

    let updated = repair_step(&weights, &b1, &mask, &RepairConfig::default()).unwrap();

    assert_eq!(updated.dim(), (n, n));
    for i in 0..n {
        for j in 0..n {
            assert_eq!(updated[[i, j]], updated[[j, i]]);
            assert!(updated[[i, j]] >= 0.0);
        }
    }
}

#[test]
fn uniform_complete_graph_stays_near_uniform() {
    // K4 with unit weights is already maximally connected at this size:
    // one step should barely disturb the relative weight profile.
    let n = 4;
    let weights = complete_uniform(n);
    let b1 = incidence_matrix(n);
    let mask = NoRestoreMask::none(b1.nrows());

    let updated = repair_step(&weights, &b1, &mask, &RepairConfig::default()).unwrap();

    let w = upper_triangle(&updated);
    let max = w.iter().cloned().fold(f64::MIN, f64::max);
    let min = w.iter().cloned().fold(f64::MAX, f64::min);
    assert!(min > 0.99);
    assert!(max < 1.11);
    assert!(max / min < 1.15);
}

#[test]
fn masking_removes_exactly_the_reinforcement_term() {
    let n = 4;
    let weights = complete_uniform(n);
    let b1 = incidence_matrix(n);
    let config = RepairConfig::default();
    let grad = unmasked_gradient(&weights, &b1, config.zero_tolerance);

    let open = repair_step(&weights, &b1, &NoRestoreMask::none(b1.nrows()), &config).unwrap();
    let mask = NoRestoreMask::from_pairs(n, &[(0, 1)]).unwrap();
    let masked = repair_step(&weights, &b1, &mask, &config).unwrap();

    for (e, (i, j)) in edge_endpoints(n).into_iter().enumerate() {
        if mask.is_forbidden(e) {
            // Both land above zero here, so the clamp is inactive and the
            // difference is exactly eta * grad[e].
            assert_abs_diff_eq!(
                open[[i, j]] - masked[[i, j]],
                config.eta * grad[e],
                epsilon = 1e-12
            );
        } else {
            assert_eq!(open[[i, j]], masked[[i, j]]);
        }
    }
}

#[test]
fn forbidden_edge_decays_while_a_free_edge_grows() {
    let n = 4;
    let weights = complete_uniform(n);
    let b1 = incidence_matrix(n);
    let mask = NoRestoreMask::from_pairs(n, &[(0, 1)]).unwrap();

    let updated = repair_step(&weights, &b1, &mask, &RepairConfig::default()).unwrap();

    // Only decay applies on the forbidden edge.
    assert!(updated[[0, 1]] < weights[[0, 1]]);

    // At least one free edge received more reinforcement than decay.
    let grew = edge_endpoints(n)
        .into_iter()
        .enumerate()
        .filter(|(e, _)| !mask.is_forbidden(*e))
        .any(|(_, (i, j))| updated[[i, j]] > weights[[i, j]]);
    assert!(grew);
}

#[test]
fn zero_gamma_never_shrinks_a_free_edge() {
    let n = 5;
    let weights = complete_uniform(n);
    let b1 = incidence_matrix(n);
    let mask = NoRestoreMask::none(b1.nrows());
    let config = RepairConfig {
        gamma: 0.0,
        ..Default::default()
    };

    let updated = repair_step(&weights, &b1, &mask, &config).unwrap();

    for (i, j) in edge_endpoints(n) {
        assert!(updated[[i, j]] >= weights[[i, j]]);
    }
}

#[test]
fn zero_eta_zero_gamma_is_identity() {
    let n = 4;
    let mut weights = complete_uniform(n);
    weights[[0, 2]] = 0.25;
    weights[[2, 0]] = 0.25;
    let b1 = incidence_matrix(n);
    let mask = NoRestoreMask::none(b1.nrows());
    let config = RepairConfig {
        eta: 0.0,
        gamma: 0.0,
        ..Default::default()
    };

    let updated = repair_step(&weights, &b1, &mask, &config).unwrap();

    for i in 0..n {
        for j in 0..n {
            assert_abs_diff_eq!(updated[[i, j]], weights[[i, j]], epsilon = 1e-12);
        }
    }
}

#[test]
fn two_vertex_skeleton_with_weight_succeeds() {
    let mut weights = Array2::zeros((2, 2));
    weights[[0, 1]] = 1.0;
    weights[[1, 0]] = 1.0;
    let b1 = incidence_matrix(2);
    let mask = NoRestoreMask::none(1);

    let step = repair_step_detailed(&weights, &b1, &mask, &RepairConfig::default()).unwrap();
    assert_eq!(step.kernel_dim, 1);
    assert_abs_diff_eq!(step.spectral_gap, 2.0, epsilon = 1e-9);
}

#[test]
fn two_vertex_skeleton_without_weight_is_degenerate() {
    // Zero weight on the only edge: the kernel spans the whole spectrum
    // and there is no harmonic vector to follow. The contract here is an
    // explicit error, never an out-of-range index.
    let weights = Array2::zeros((2, 2));
    let b1 = incidence_matrix(2);
    let mask = NoRestoreMask::none(1);

    let err = repair_step(&weights, &b1, &mask, &RepairConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        RepairError::DegenerateSpectrum {
            kernel_dim: 2,
            dim: 2
        }
    ));
}

#[test]
fn repeated_steps_preserve_invariants() {
    let n = 5;
    let weights = complete_uniform(n);
    let b1 = incidence_matrix(n);
    let mask = NoRestoreMask::from_pairs(n, &[(0, 1), (2, 3)]).unwrap();

    let mut protocol = RepairProtocol::default();
    let final_weights = protocol.run(&weights, &b1, &mask, 8).unwrap();

    assert_eq!(protocol.gap_history().len(), 8);
    for i in 0..n {
        for j in 0..n {
            assert_eq!(final_weights[[i, j]], final_weights[[j, i]]);
            assert!(final_weights[[i, j]] >= 0.0);
        }
    }
    // Forbidden edges can only have decayed across the whole run.
    let e = edge_index(0, 1, n).unwrap();
    assert!(mask.is_forbidden(e));
    assert!(final_weights[[0, 1]] <= weights[[0, 1]]);
}

#[test]
fn config_round_trips_through_serde() {
    let config = RepairConfig {
        eta: 0.1,
        gamma: 0.01,
        zero_tolerance: 1e-8,
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: RepairConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.eta, config.eta);
    assert_eq!(back.gamma, config.gamma);
    assert_eq!(back.zero_tolerance, config.zero_tolerance);
}
