//! Op-amp operating-point iteration.
//!
//! Every op-amp starts out assumed active. The aggregate DC system is solved,
//! each op-amp's expected mode is read off the solution, and the assumption
//! is corrected until the two agree.

use tracing::{debug, warn};

use super::elements::OpAmpElement;
use super::factory::{potential, MatrixFactory};
use super::matrix::MatrixSolution;
use crate::components::OpAmpMode;
use crate::error::{Result, SimulationError};

/// Default cap on operating-point iterations.
pub const DEFAULT_MAX_ITERATIONS: usize = 64;

/// A self-consistent set of op-amp modes.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatingPoint {
    /// Settled mode per op-amp, parallel to the element table
    pub modes: Vec<OpAmpMode>,
    /// Number of DC solves performed
    pub iterations: usize,
    /// Number of passes that changed at least one mode
    pub corrections: usize,
    /// The DC solution the modes were confirmed against, if one was needed
    pub solution: Option<MatrixSolution>,
}

/// Expected mode of one op-amp given a DC solution.
///
/// An active op-amp is judged by its output potential against the rails.
/// A saturated output sits exactly on its rail, so a saturated op-amp is
/// judged by its open-loop estimate `gain * (V+ - V-)` instead: it stays
/// pinned while the estimate still reaches that rail and otherwise falls
/// back to active, never straight to the opposite rail.
pub fn expected_mode(op: &OpAmpElement, assumed: OpAmpMode, solution: &MatrixSolution) -> OpAmpMode {
    let rails = &op.params;
    match assumed {
        OpAmpMode::Active => {
            let v_out = potential(&solution.potentials, op.output).re;
            rails.classify(v_out)
        }
        OpAmpMode::PositiveSaturation | OpAmpMode::NegativeSaturation => {
            let v_pos = potential(&solution.potentials, op.input_pos).re;
            let v_neg = potential(&solution.potentials, op.input_neg).re;
            let estimate = rails.gain * (v_pos - v_neg);
            let holds = match assumed {
                OpAmpMode::PositiveSaturation => estimate >= rails.v_rail_pos,
                _ => estimate <= rails.v_rail_neg,
            };
            if holds {
                assumed
            } else {
                OpAmpMode::Active
            }
        }
    }
}

/// The check step: expected modes of every op-amp for `solution`.
pub fn check_modes(ops: &[OpAmpElement], assumed: &[OpAmpMode], solution: &MatrixSolution) -> Vec<OpAmpMode> {
    ops.iter()
        .zip(assumed)
        .map(|(op, mode)| expected_mode(op, *mode, solution))
        .collect()
}

/// Runs the solve/check/adjust loop.
#[derive(Debug, Clone, Copy)]
pub struct OperatingPointIterator {
    max_iterations: usize,
}

impl Default for OperatingPointIterator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITERATIONS)
    }
}

impl OperatingPointIterator {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    /// Iterate until the assumed modes in `factory` are self-consistent.
    /// On success the factory is left configured with the settled modes.
    ///
    /// Without op-amps, or without any DC drive, the assumed modes are
    /// already settled and no DC system is solved.
    pub fn run(&self, factory: &mut MatrixFactory<'_>) -> Result<OperatingPoint> {
        if factory.elements().op_amps.is_empty() || !factory.sources().iter().any(|s| s.is_dc()) {
            debug!(op_amps = factory.modes().len(), "no DC solve needed for the operating point");
            return Ok(OperatingPoint {
                modes: factory.modes().to_vec(),
                iterations: 0,
                corrections: 0,
                solution: None,
            });
        }

        let mut corrections = 0;

        for iteration in 1..=self.max_iterations {
            let solution = factory.build_dc()?.solve()?;
            let expected = check_modes(&factory.elements().op_amps, factory.modes(), &solution);

            if expected == factory.modes() {
                debug!(iterations = iteration, corrections, "operating point settled");
                return Ok(OperatingPoint {
                    modes: expected,
                    iterations: iteration,
                    corrections,
                    solution: Some(solution),
                });
            }

            for ((op, old), new) in factory.elements().op_amps.iter().zip(factory.modes()).zip(&expected) {
                if old != new {
                    debug!(op_amp = %op.name, from = %old, to = %new, "op-amp mode change");
                }
            }
            factory.set_modes(expected);
            corrections += 1;
        }

        warn!(max_iterations = self.max_iterations, "op-amp modes did not settle");
        Err(SimulationError::OscillatingOperatingPoint {
            iterations: self.max_iterations,
        })
    }
}
