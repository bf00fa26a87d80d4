//! Independent voltage and current sources, and the descriptions used to
//! key per-source results during superposition.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::circuit::{ComponentId, Frequency, Point};

/// Kind of an independent source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    /// Sinusoidal voltage source
    AcVoltage,
    /// Constant voltage source
    DcVoltage,
    /// Constant current source
    DcCurrent,
    /// Rail voltage of a saturated op-amp, modeled as a DC voltage source
    OpAmpSaturation,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SourceKind::AcVoltage => "AC voltage",
            SourceKind::DcVoltage => "DC voltage",
            SourceKind::DcCurrent => "DC current",
            SourceKind::OpAmpSaturation => "op-amp saturation",
        };
        f.write_str(text)
    }
}

/// Immutable description of one independent source instance.
///
/// Equality and hashing are structural (value compared bitwise) so the
/// description can key per-source results directly.
#[derive(Debug, Clone, Copy)]
pub struct SourceDescription {
    pub kind: SourceKind,
    pub frequency: Frequency,
    pub value: f64,
    pub owner: ComponentId,
}

impl SourceDescription {
    /// Create a new source description.
    pub fn new(kind: SourceKind, frequency: f64, value: f64, owner: ComponentId) -> Self {
        Self {
            kind,
            frequency: Frequency::new(frequency),
            value,
            owner,
        }
    }

    /// Describe the rail a saturated op-amp is pinned to.
    pub fn op_amp_saturation(owner: ComponentId, rail: f64) -> Self {
        Self::new(SourceKind::OpAmpSaturation, 0.0, rail, owner)
    }

    /// Check if this source contributes to the DC solution.
    pub fn is_dc(&self) -> bool {
        self.frequency.is_dc()
    }
}

impl PartialEq for SourceDescription {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.frequency == other.frequency
            && self.value.to_bits() == other.value.to_bits()
            && self.owner == other.owner
    }
}

impl Eq for SourceDescription {}

impl Hash for SourceDescription {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.frequency.hash(state);
        self.value.to_bits().hash(state);
        self.owner.hash(state);
    }
}

impl fmt::Display for SourceDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} @ {} ({})", self.kind, self.value, self.frequency, self.owner)
    }
}

/// A voltage source component.
///
/// Voltage sources require an extra row/column in the MNA matrix for the
/// branch current. The source enforces: V+ - V- = value. A non-zero
/// frequency makes it an AC source whose value is the phasor amplitude.
#[derive(Debug, Clone)]
pub struct VoltageSource {
    pub id: ComponentId,
    pub name: String,
    pub terminals: [Point; 2], // [positive, negative]
    pub value: f64,
    pub frequency: f64,
}

impl VoltageSource {
    /// Create a new DC voltage source.
    pub fn dc(id: ComponentId, name: String, terminals: [Point; 2], value: f64) -> Self {
        Self {
            id,
            name,
            terminals,
            value,
            frequency: 0.0,
        }
    }

    /// Create a new AC voltage source.
    pub fn ac(id: ComponentId, name: String, terminals: [Point; 2], amplitude: f64, frequency: f64) -> Self {
        Self {
            id,
            name,
            terminals,
            value: amplitude,
            frequency,
        }
    }

    /// Check if this is an AC source.
    pub fn is_ac(&self) -> bool {
        self.frequency != 0.0
    }

    /// Get the positive terminal.
    pub fn positive(&self) -> Point {
        self.terminals[0]
    }

    /// Get the negative terminal.
    pub fn negative(&self) -> Point {
        self.terminals[1]
    }

    /// Describe this source for superposition.
    pub fn description(&self) -> SourceDescription {
        let kind = if self.is_ac() {
            SourceKind::AcVoltage
        } else {
            SourceKind::DcVoltage
        };
        SourceDescription::new(kind, self.frequency, self.value, self.id)
    }
}

/// A current source component.
///
/// Current sources add directly to the free-term vector of the MNA equations.
/// The source pushes `value` amperes out of its positive terminal into the
/// external circuit.
#[derive(Debug, Clone)]
pub struct CurrentSource {
    pub id: ComponentId,
    pub name: String,
    pub terminals: [Point; 2], // [positive, negative]
    pub value: f64,
}

impl CurrentSource {
    /// Create a new current source.
    pub fn new(id: ComponentId, name: String, terminals: [Point; 2], value: f64) -> Self {
        Self {
            id,
            name,
            terminals,
            value,
        }
    }

    /// Get the positive terminal.
    pub fn positive(&self) -> Point {
        self.terminals[0]
    }

    /// Get the negative terminal.
    pub fn negative(&self) -> Point {
        self.terminals[1]
    }

    /// Describe this source for superposition.
    pub fn description(&self) -> SourceDescription {
        SourceDescription::new(SourceKind::DcCurrent, 0.0, self.value, self.id)
    }
}
