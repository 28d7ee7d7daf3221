//! # tscc-core: Topological Spectral Coherence Control
//!
//! A spectral repair engine for weighted 1-skeletons. One numerical
//! operation sits at the center: given the edge weights of a graph, the
//! oriented incidence operator of its 1-skeleton, and a set of edges under
//! a permanent **no-restore** constraint, produce new weights that push up
//! the algebraic connectivity of the harmonic subspace without ever
//! reinforcing a forbidden edge.
//!
//! ## Key Mathematical Concepts
//!
//! | Concept | Definition | System Interpretation |
//! |---------|------------|----------------------|
//! | **Weight matrix W** | Symmetric n x n, entries >= 0 | Edge strengths of the 1-skeleton |
//! | **Incidence B1** | m x n oriented boundary operator | Edge-to-vertex structure |
//! | **Laplacian L1** | `B1^T diag(w) B1` | Coherence operator of the weighted skeleton |
//! | **Harmonic vector** | First non-kernel eigenvector | Cycle structure the repair targets |
//! | **Spectral gap** | Smallest strictly positive eigenvalue | Connectivity robustness |
//! | **No-restore mask** | Boolean per edge | Edges that must never be repaired |
//!
//! ## The Repair Step
//!
//! Each step reads the spectrum fresh from the current weights:
//!
//! ```text
//! w      = upper_triangle(W)
//! L1     = B1^T diag(w) B1
//! v      = eigenvector at index k, k = dim ker(L1)
//! grad_e = (B1 v)_e^2          (zeroed on masked edges)
//! w'     = max(w + eta*grad - gamma*sign(w), 0)
//! ```
//!
//! The returned matrix is always symmetric and non-negative, and masked
//! edges only ever change through the decay term.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tscc_core::{incidence_matrix, NoRestoreMask, RepairConfig, RepairProtocol};
//! use ndarray::Array2;
//!
//! let n = 4;
//! let b1 = incidence_matrix(n);
//! let mut weights = Array2::ones((n, n));
//! weights.diag_mut().fill(0.0);
//!
//! // Edge (0, 1) is damaged and must not be repaired.
//! let mask = NoRestoreMask::from_pairs(n, &[(0, 1)])?;
//!
//! let mut protocol = RepairProtocol::new(RepairConfig::default());
//! let repaired = protocol.run(&weights, &b1, &mask, 10)?;
//! println!("gap trajectory: {:?}", protocol.gap_history());
//! ```

pub mod error;
pub mod laplacian;
pub mod protocol;
pub mod repair;
pub mod skeleton;

pub use error::{RepairError, RepairResult};
pub use laplacian::{compute_spectrum, hodge_laplacian, LaplacianSpectrum};
pub use protocol::{ProtocolStats, RepairProtocol};
pub use repair::{repair_step, repair_step_detailed, RepairConfig, RepairStep};
pub use skeleton::{
    edge_count, edge_endpoints, edge_index, from_upper_triangle, incidence_matrix, upper_triangle,
    NoRestoreMask,
};
