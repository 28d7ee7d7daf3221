//! Iterative repair driver.
//!
//! The repair step itself is stateless; this module supplies the loop
//! around it. A [`RepairProtocol`] applies steps, feeding each output back
//! as the next input, and keeps the trajectory of targeted spectral gaps
//! so callers can watch connectivity recover (or stall) over time.

use crate::error::RepairResult;
use crate::repair::{repair_step_detailed, RepairConfig, RepairStep};
use crate::skeleton::NoRestoreMask;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Driver state: configuration plus the spectral-gap trajectory.
#[derive(Debug, Clone)]
pub struct RepairProtocol {
    config: RepairConfig,
    gap_history: Vec<f64>,
    steps_applied: u64,
}

/// Summary of a protocol run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolStats {
    /// Total steps applied over the protocol's lifetime.
    pub steps_applied: u64,
    /// Spectral gap targeted by the most recent step.
    pub current_gap: Option<f64>,
    /// Recorded gap trajectory length.
    pub history_len: usize,
}

impl RepairProtocol {
    /// Create a driver with the given step configuration.
    pub fn new(config: RepairConfig) -> Self {
        Self {
            config,
            gap_history: Vec::new(),
            steps_applied: 0,
        }
    }

    /// The step configuration in use.
    pub fn config(&self) -> &RepairConfig {
        &self.config
    }

    /// Apply one repair step and record the gap it targeted.
    pub fn step(
        &mut self,
        weights: &Array2<f64>,
        b1: &Array2<f64>,
        mask: &NoRestoreMask,
    ) -> RepairResult<RepairStep> {
        let step = repair_step_detailed(weights, b1, mask, &self.config)?;
        self.gap_history.push(step.spectral_gap);
        self.steps_applied += 1;
        Ok(step)
    }

    /// Apply `steps` repair steps, feeding each output back as the next
    /// input. Returns the final weight matrix.
    pub fn run(
        &mut self,
        weights: &Array2<f64>,
        b1: &Array2<f64>,
        mask: &NoRestoreMask,
        steps: usize,
    ) -> RepairResult<Array2<f64>> {
        let mut current = weights.clone();
        for _ in 0..steps {
            current = self.step(&current, b1, mask)?.weights;
        }
        info!(
            steps,
            final_gap = self.gap_history.last().copied(),
            "repair run complete"
        );
        Ok(current)
    }

    /// Spectral gaps targeted so far, in step order.
    pub fn gap_history(&self) -> &[f64] {
        &self.gap_history
    }

    /// Mean successive gap change over the trailing `window` steps.
    ///
    /// Positive means connectivity is recovering. `None` until at least
    /// `window + 1` samples exist or when `window` is zero.
    pub fn gap_trend(&self, window: usize) -> Option<f64> {
        if window == 0 || self.gap_history.len() < window + 1 {
            return None;
        }
        let recent = &self.gap_history[self.gap_history.len() - window - 1..];
        let total: f64 = recent.windows(2).map(|pair| pair[1] - pair[0]).sum();
        Some(total / window as f64)
    }

    /// Snapshot of the protocol's counters.
    pub fn stats(&self) -> ProtocolStats {
        ProtocolStats {
            steps_applied: self.steps_applied,
            current_gap: self.gap_history.last().copied(),
            history_len: self.gap_history.len(),
        }
    }

    /// Drop the recorded trajectory, keeping the configuration.
    pub fn clear(&mut self) {
        self.gap_history.clear();
    }
}

impl Default for RepairProtocol {
    fn default() -> Self {
        Self::new(RepairConfig::default())
    }
}
