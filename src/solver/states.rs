//! Per-source solution states and their superposition.
//!
//! A state maps node index to potential and active index to branch current
//! for one source (or a sum of sources). Phasor states come straight from a
//! solve; instantaneous and waveform states are the same quantities
//! evaluated in time.

use std::ops::{Add, AddAssign};

use num_complex::Complex64;

use super::matrix::MatrixSolution;
use crate::circuit::{Frequency, NodeIndex};

/// Complex potentials and currents at one frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct PhasorState {
    pub potentials: Vec<Complex64>,
    pub currents: Vec<Complex64>,
}

impl PhasorState {
    /// An all-zero state for `nodes` nodes and `active` active elements.
    pub fn zeros(nodes: usize, active: usize) -> Self {
        Self {
            potentials: vec![Complex64::new(0.0, 0.0); nodes],
            currents: vec![Complex64::new(0.0, 0.0); active],
        }
    }

    /// Potential of `node`; the reference node is always zero.
    pub fn potential(&self, node: NodeIndex) -> Complex64 {
        node.matrix_index()
            .and_then(|i| self.potentials.get(i).copied())
            .unwrap_or(Complex64::new(0.0, 0.0))
    }

    /// Branch current of active element `index`.
    pub fn current(&self, index: usize) -> Option<Complex64> {
        self.currents.get(index).copied()
    }

    /// Evaluate at time `t` for a phasor at `frequency`.
    pub fn at_time(&self, frequency: Frequency, t: f64) -> InstantaneousState {
        let rotation = Complex64::from_polar(1.0, frequency.omega() * t);
        InstantaneousState {
            potentials: self.potentials.iter().map(|p| (p * rotation).re).collect(),
            currents: self.currents.iter().map(|c| (c * rotation).re).collect(),
        }
    }
}

impl From<MatrixSolution> for PhasorState {
    fn from(solution: MatrixSolution) -> Self {
        Self {
            potentials: solution.potentials,
            currents: solution.currents,
        }
    }
}

impl AddAssign<&PhasorState> for PhasorState {
    fn add_assign(&mut self, rhs: &PhasorState) {
        for (a, b) in self.potentials.iter_mut().zip(&rhs.potentials) {
            *a += b;
        }
        for (a, b) in self.currents.iter_mut().zip(&rhs.currents) {
            *a += b;
        }
    }
}

impl Add<&PhasorState> for PhasorState {
    type Output = PhasorState;

    fn add(mut self, rhs: &PhasorState) -> PhasorState {
        self += rhs;
        self
    }
}

/// Real potentials and currents at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct InstantaneousState {
    pub potentials: Vec<f64>,
    pub currents: Vec<f64>,
}

impl InstantaneousState {
    pub fn zeros(nodes: usize, active: usize) -> Self {
        Self {
            potentials: vec![0.0; nodes],
            currents: vec![0.0; active],
        }
    }

    /// Potential of `node`; the reference node is always zero.
    pub fn potential(&self, node: NodeIndex) -> f64 {
        node.matrix_index()
            .and_then(|i| self.potentials.get(i).copied())
            .unwrap_or(0.0)
    }
}

impl AddAssign<&InstantaneousState> for InstantaneousState {
    fn add_assign(&mut self, rhs: &InstantaneousState) {
        for (a, b) in self.potentials.iter_mut().zip(&rhs.potentials) {
            *a += b;
        }
        for (a, b) in self.currents.iter_mut().zip(&rhs.currents) {
            *a += b;
        }
    }
}

/// Sampled potentials and currents, one sequence per node and per active
/// element.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformState {
    pub start: f64,
    pub step: f64,
    pub potentials: Vec<Vec<f64>>,
    pub currents: Vec<Vec<f64>>,
}

impl WaveformState {
    /// Sample a phasor state at `frequency`.
    pub fn sample(state: &PhasorState, frequency: Frequency, start: f64, step: f64, count: usize) -> Self {
        let mut potentials = vec![Vec::with_capacity(count); state.potentials.len()];
        let mut currents = vec![Vec::with_capacity(count); state.currents.len()];

        for i in 0..count {
            let instant = state.at_time(frequency, start + step * i as f64);
            for (seq, v) in potentials.iter_mut().zip(instant.potentials) {
                seq.push(v);
            }
            for (seq, v) in currents.iter_mut().zip(instant.currents) {
                seq.push(v);
            }
        }

        Self {
            start,
            step,
            potentials,
            currents,
        }
    }

    /// Number of samples per sequence.
    pub fn len(&self) -> usize {
        self.potentials.first().or(self.currents.first()).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Samples of `node`'s potential; the reference node has none.
    pub fn potential(&self, node: NodeIndex) -> Option<&[f64]> {
        node.matrix_index()
            .and_then(|i| self.potentials.get(i))
            .map(Vec::as_slice)
    }
}

impl AddAssign<&WaveformState> for WaveformState {
    fn add_assign(&mut self, rhs: &WaveformState) {
        for (a, b) in self.potentials.iter_mut().zip(&rhs.potentials) {
            for (x, y) in a.iter_mut().zip(b) {
                *x += y;
            }
        }
        for (a, b) in self.currents.iter_mut().zip(&rhs.currents) {
            for (x, y) in a.iter_mut().zip(b) {
                *x += y;
            }
        }
    }
}
