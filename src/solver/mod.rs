//! MNA (Modified Nodal Analysis) solver.
//!
//! This module provides the numerical engine for steady-state simulation.
//!
//! ## Modified Nodal Analysis
//!
//! Every source is solved on its own (superposition) in a system
//!
//! ```text
//! [ A   B ] [ v ]   [ I ]
//! [ C   D ] [ j ] = [ E ]
//! ```
//!
//! where:
//! - A is the nodal admittance matrix
//! - B, C connect voltage sources and op-amp outputs to nodes
//! - D is reserved and always zero
//! - v is the vector of node potentials
//! - j is the vector of branch currents, flowing into the + terminal
//! - I is the current injected into each node
//! - E is the vector of enforced voltages
//!
//! Op-amps are linear in each of their three modes; the operating-point
//! iterator finds the mode of every op-amp before the per-source solves.

mod elements;
mod factory;
mod matrix;
mod operating_point;
mod simulator;
mod states;

pub use elements::{CurrentSourceElement, ElementTable, OpAmpElement, PassiveElement, VoltageSourceElement};
pub use factory::{is_saturation, Drive, MatrixFactory};
pub use matrix::{AdmittanceMatrix, ComplexMatrix, MatrixSolution};
pub use operating_point::{
    check_modes, expected_mode, OperatingPoint, OperatingPointIterator, DEFAULT_MAX_ITERATIONS,
};
pub use simulator::{Simulation, Simulator, SimulatorConfig};
pub use states::{InstantaneousState, PhasorState, WaveformState};
