//! Admittance matrix assembly.
//!
//! One matrix is built per independent source with only that source driving
//! (superposition). Every other source still contributes its structure (a
//! voltage source stays a short, a current source an open), only its drive
//! term is zeroed. The aggregate DC build drives every DC source and every
//! saturation rail at once and is used to find the operating point.

use num_complex::Complex64;
use tracing::trace;

use super::elements::{ElementTable, OpAmpElement};
use super::matrix::AdmittanceMatrix;
use crate::circuit::{Frequency, NodeIndex};
use crate::components::{OpAmpMode, SourceDescription, SourceKind};
use crate::error::Result;

/// Which sources drive a build.
#[derive(Debug, Clone, Copy)]
pub enum Drive<'a> {
    /// Exactly one source is on
    Single(&'a SourceDescription),
    /// Every DC source and every saturation rail is on
    AllDc,
}

impl Drive<'_> {
    fn frequency(&self) -> Frequency {
        match self {
            Drive::Single(source) => source.frequency,
            Drive::AllDc => Frequency::DC,
        }
    }

    fn drives(&self, source: &SourceDescription) -> bool {
        match self {
            Drive::Single(on) => *on == source,
            Drive::AllDc => source.is_dc(),
        }
    }
}

/// Builds configured admittance matrices for one element table under an
/// assumed op-amp operating mode per op-amp.
#[derive(Debug, Clone)]
pub struct MatrixFactory<'a> {
    elements: &'a ElementTable,
    modes: Vec<OpAmpMode>,
}

impl<'a> MatrixFactory<'a> {
    /// Create a factory with every op-amp assumed active.
    pub fn new(elements: &'a ElementTable) -> Self {
        Self {
            elements,
            modes: vec![OpAmpMode::Active; elements.op_amps.len()],
        }
    }

    /// The element table this factory builds from.
    pub fn elements(&self) -> &'a ElementTable {
        self.elements
    }

    /// Assumed mode of every op-amp, parallel to `elements().op_amps`.
    pub fn modes(&self) -> &[OpAmpMode] {
        &self.modes
    }

    /// Replace the assumed op-amp modes.
    pub fn set_modes(&mut self, modes: Vec<OpAmpMode>) {
        debug_assert_eq!(modes.len(), self.modes.len());
        self.modes = modes;
    }

    /// Saturation source of the op-amp at `position`, if it is saturated.
    pub fn saturation_source(&self, position: usize) -> Option<SourceDescription> {
        let op = self.elements.op_amps.get(position)?;
        let rail = op.params.rail(*self.modes.get(position)?)?;
        Some(SourceDescription::op_amp_saturation(op.id, rail))
    }

    /// Every source that gets its own superposition build: the independent
    /// sources followed by one rail source per saturated op-amp.
    pub fn sources(&self) -> Vec<SourceDescription> {
        let mut sources = self.elements.source_descriptions();
        sources.extend((0..self.modes.len()).filter_map(|i| self.saturation_source(i)));
        sources
    }

    /// Build the matrix with only `source` driving, at its own frequency.
    pub fn build_for_source(&self, source: &SourceDescription) -> Result<AdmittanceMatrix> {
        self.build(Drive::Single(source))
    }

    /// Build the DC matrix with every DC source and saturation rail driving.
    pub fn build_dc(&self) -> Result<AdmittanceMatrix> {
        self.build(Drive::AllDc)
    }

    /// Build a matrix for `drive`.
    pub fn build(&self, drive: Drive<'_>) -> Result<AdmittanceMatrix> {
        let frequency = drive.frequency();
        let mut matrix = AdmittanceMatrix::new(self.elements.node_count, self.elements.active_count())?;

        self.stamp_passives(&mut matrix, frequency);
        self.stamp_voltage_sources(&mut matrix, drive);
        self.stamp_current_sources(&mut matrix, drive);
        self.stamp_op_amps(&mut matrix, drive);

        trace!(?frequency, size = matrix.size(), "assembled admittance matrix");
        Ok(matrix)
    }

    fn stamp_passives(&self, matrix: &mut AdmittanceMatrix, frequency: Frequency) {
        let a = matrix.a_mut();
        for passive in &self.elements.passives {
            let y = passive.admittance(frequency.hz());
            let n1 = passive.nodes[0].matrix_index();
            let n2 = passive.nodes[1].matrix_index();
            if let Some(i) = n1 {
                a.add(i, i, y);
            }
            if let Some(j) = n2 {
                a.add(j, j, y);
            }
            if let (Some(i), Some(j)) = (n1, n2) {
                a.add(i, j, -y);
                a.add(j, i, -y);
            }
        }
    }

    fn stamp_voltage_sources(&self, matrix: &mut AdmittanceMatrix, drive: Drive<'_>) {
        let one = Complex64::new(1.0, 0.0);
        for source in &self.elements.voltage_sources {
            let k = source.active_index;
            if let Some(i) = source.positive.matrix_index() {
                matrix.b_mut().add(i, k, one);
                matrix.c_mut().add(k, i, one);
            }
            if let Some(j) = source.negative.matrix_index() {
                matrix.b_mut().add(j, k, -one);
                matrix.c_mut().add(k, j, -one);
            }
            matrix.e_mut()[k] = if drive.drives(&source.description) {
                Complex64::new(source.description.value, 0.0)
            } else {
                Complex64::new(0.0, 0.0)
            };
        }
    }

    fn stamp_current_sources(&self, matrix: &mut AdmittanceMatrix, drive: Drive<'_>) {
        for source in &self.elements.current_sources {
            if !drive.drives(&source.description) {
                continue;
            }
            let value = Complex64::new(source.description.value, 0.0);
            let i = matrix.i_mut();
            if let Some(p) = source.positive.matrix_index() {
                i[p] += value;
            }
            if let Some(n) = source.negative.matrix_index() {
                i[n] -= value;
            }
        }
    }

    fn stamp_op_amps(&self, matrix: &mut AdmittanceMatrix, drive: Drive<'_>) {
        let one = Complex64::new(1.0, 0.0);
        for (position, op) in self.elements.op_amps.iter().enumerate() {
            let k = op.active_index;
            // Output is never the reference node; the element table rejects that
            let Some(out) = op.output.matrix_index() else { continue };
            matrix.b_mut().add(out, k, one);

            match self.saturation_source(position) {
                None => stamp_active_op_amp(matrix, op, out),
                Some(rail) => {
                    // Output pinned like an ideal voltage source to ground
                    let c = matrix.c_mut();
                    c.clear_row(k);
                    c.set(k, out, one);
                    matrix.e_mut()[k] = if drive.drives(&rail) {
                        Complex64::new(rail.value, 0.0)
                    } else {
                        Complex64::new(0.0, 0.0)
                    };
                }
            }
        }
    }
}

/// Vout = gain * (V+ - V-), written as Vout - gain*V+ + gain*V- = 0.
fn stamp_active_op_amp(matrix: &mut AdmittanceMatrix, op: &OpAmpElement, out: usize) {
    let gain = Complex64::new(op.params.gain, 0.0);
    let c = matrix.c_mut();
    let k = op.active_index;

    if op.input_pos != op.output {
        if let Some(p) = op.input_pos.matrix_index() {
            c.add(k, p, -gain);
        }
    }
    if let Some(n) = op.input_neg.matrix_index() {
        c.add(k, n, gain);
    }
    // Follower: the gain terms alone force V+ = V-
    if op.output != op.input_neg {
        c.add(k, out, Complex64::new(1.0, 0.0));
    }
    matrix.e_mut()[k] = Complex64::new(0.0, 0.0);
}

/// Check whether a source is the rail of a saturated op-amp.
pub fn is_saturation(source: &SourceDescription) -> bool {
    source.kind == SourceKind::OpAmpSaturation
}

/// Reference-aware potential lookup into a solved potential vector.
pub(crate) fn potential(potentials: &[Complex64], node: NodeIndex) -> Complex64 {
    node.matrix_index()
        .and_then(|i| potentials.get(i).copied())
        .unwrap_or(Complex64::new(0.0, 0.0))
}
