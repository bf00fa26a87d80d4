//! Core types for schematic representation.

use std::fmt;

/// A position on the schematic grid.
///
/// Terminals and wire endpoints connect only when their positions are
/// identical, so positions are integral grid cells rather than floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new grid point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// A unique identifier for a component in the schematic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub usize);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// A unique identifier for a wire in the schematic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WireId(pub usize);

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W{}", self.0)
    }
}

/// One terminal of one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TerminalId {
    /// Owning component
    pub component: ComponentId,
    /// Terminal slot on the component (0-based)
    pub terminal: usize,
}

impl TerminalId {
    /// Create a new terminal id.
    pub fn new(component: ComponentId, terminal: usize) -> Self {
        Self { component, terminal }
    }
}

impl fmt::Display for TerminalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.component, self.terminal)
    }
}

/// Index of an electrical node.
///
/// Non-reference nodes are numbered densely from 0; the reference (ground)
/// node is always -1 and never appears in the unknown vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub isize);

impl NodeIndex {
    /// The reference node (always -1).
    pub const REFERENCE: NodeIndex = NodeIndex(-1);

    /// Create the index for the `i`-th non-reference node.
    pub fn from_matrix_index(i: usize) -> Self {
        NodeIndex(i as isize)
    }

    /// Check if this is the reference node.
    pub fn is_reference(&self) -> bool {
        self.0 < 0
    }

    /// Get the row/column of this node in the admittance matrix.
    /// Returns None for the reference node.
    pub fn matrix_index(&self) -> Option<usize> {
        if self.is_reference() {
            None
        } else {
            Some(self.0 as usize)
        }
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_reference() {
            write!(f, "GND")
        } else {
            write!(f, "N{}", self.0)
        }
    }
}

/// A frequency in Hz usable as a map key.
///
/// Frequencies come from source parameters rather than arithmetic, so
/// bitwise identity is the right notion of equality. Negative zero is
/// folded into zero.
#[derive(Debug, Clone, Copy)]
pub struct Frequency(f64);

impl Frequency {
    /// Direct current.
    pub const DC: Frequency = Frequency(0.0);

    /// Wrap a frequency in Hz.
    pub fn new(hz: f64) -> Self {
        if hz == 0.0 {
            Self::DC
        } else {
            Frequency(hz)
        }
    }

    /// The frequency in Hz.
    pub fn hz(&self) -> f64 {
        self.0
    }

    /// Angular frequency ω = 2πf.
    pub fn omega(&self) -> f64 {
        2.0 * std::f64::consts::PI * self.0
    }

    /// Check if this is the DC frequency.
    pub fn is_dc(&self) -> bool {
        self.0 == 0.0
    }
}

impl PartialEq for Frequency {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Frequency {}

impl std::hash::Hash for Frequency {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for Frequency {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frequency {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dc() {
            write!(f, "DC")
        } else {
            write!(f, "{} Hz", self.0)
        }
    }
}
