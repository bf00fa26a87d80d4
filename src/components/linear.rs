//! Linear passive components: Resistor, Capacitor, Inductor.

use num_complex::Complex64;

use super::DC_SHORT_CONDUCTANCE;
use crate::circuit::{ComponentId, Point};

/// A passive two-terminal element seen by the matrix assembly.
///
/// Terminal A is the reference for "forward" current: positive current
/// flows into A, through the element and out of B.
pub trait TwoTerminal {
    /// Positions of terminals A and B.
    fn terminals(&self) -> [Point; 2];

    /// Complex admittance at `frequency` (Hz).
    fn admittance(&self, frequency: f64) -> Complex64;

    /// Real admittance at DC.
    fn conductance(&self) -> f64 {
        self.admittance(0.0).re
    }
}

/// A resistor component.
#[derive(Debug, Clone)]
pub struct Resistor {
    pub id: ComponentId,
    pub name: String,
    pub terminals: [Point; 2],
    pub resistance: f64,
}

impl Resistor {
    /// Create a new resistor.
    pub fn new(id: ComponentId, name: String, terminals: [Point; 2], resistance: f64) -> Self {
        Self {
            id,
            name,
            terminals,
            resistance: resistance.max(1e-12), // Minimum resistance to avoid singularity
        }
    }
}

impl TwoTerminal for Resistor {
    fn terminals(&self) -> [Point; 2] {
        self.terminals
    }

    fn admittance(&self, _frequency: f64) -> Complex64 {
        Complex64::new(1.0 / self.resistance, 0.0)
    }

    fn conductance(&self) -> f64 {
        1.0 / self.resistance
    }
}

/// A capacitor component.
///
/// In the frequency domain a capacitor has admittance Y = jωC, which is an
/// open circuit at DC.
#[derive(Debug, Clone)]
pub struct Capacitor {
    pub id: ComponentId,
    pub name: String,
    pub terminals: [Point; 2],
    pub capacitance: f64,
}

impl Capacitor {
    /// Create a new capacitor.
    pub fn new(id: ComponentId, name: String, terminals: [Point; 2], capacitance: f64) -> Self {
        Self {
            id,
            name,
            terminals,
            capacitance,
        }
    }
}

impl TwoTerminal for Capacitor {
    fn terminals(&self) -> [Point; 2] {
        self.terminals
    }

    fn admittance(&self, frequency: f64) -> Complex64 {
        let omega = 2.0 * std::f64::consts::PI * frequency;
        Complex64::new(0.0, omega * self.capacitance)
    }

    fn conductance(&self) -> f64 {
        0.0
    }
}

/// An inductor component.
///
/// In the frequency domain an inductor has admittance Y = 1/(jωL). At DC it
/// is a short, stamped as [`DC_SHORT_CONDUCTANCE`] so that it stays a plain
/// admittance entry instead of needing a branch current.
#[derive(Debug, Clone)]
pub struct Inductor {
    pub id: ComponentId,
    pub name: String,
    pub terminals: [Point; 2],
    pub inductance: f64,
}

impl Inductor {
    /// Create a new inductor.
    pub fn new(id: ComponentId, name: String, terminals: [Point; 2], inductance: f64) -> Self {
        Self {
            id,
            name,
            terminals,
            inductance,
        }
    }
}

impl TwoTerminal for Inductor {
    fn terminals(&self) -> [Point; 2] {
        self.terminals
    }

    fn admittance(&self, frequency: f64) -> Complex64 {
        if frequency == 0.0 {
            return Complex64::new(DC_SHORT_CONDUCTANCE, 0.0);
        }
        let omega = 2.0 * std::f64::consts::PI * frequency;
        // 1 / (jωL) = -j / (ωL)
        Complex64::new(0.0, -1.0 / (omega * self.inductance))
    }

    fn conductance(&self) -> f64 {
        DC_SHORT_CONDUCTANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pins() -> [Point; 2] {
        [Point::new(0, 0), Point::new(0, 1)]
    }

    #[test]
    fn test_resistor_conductance() {
        let r = Resistor::new(ComponentId(0), "R1".to_string(), pins(), 1000.0);
        assert_relative_eq!(r.conductance(), 0.001);
        assert_eq!(r.admittance(1e3), Complex64::new(0.001, 0.0));
    }

    #[test]
    fn test_capacitor_admittance() {
        let c = Capacitor::new(ComponentId(0), "C1".to_string(), pins(), 1e-6);
        assert_eq!(c.admittance(0.0), Complex64::new(0.0, 0.0));
        assert_eq!(c.conductance(), 0.0);

        // Y = j * 2π * 1kHz * 1µF ≈ j 6.283 mS
        let y = c.admittance(1000.0);
        assert_eq!(y.re, 0.0);
        assert_relative_eq!(y.im, 2.0 * std::f64::consts::PI * 1e-3, max_relative = 1e-12);
    }

    #[test]
    fn test_inductor_admittance() {
        let l = Inductor::new(ComponentId(0), "L1".to_string(), pins(), 10e-3);
        assert_eq!(l.admittance(0.0).re, DC_SHORT_CONDUCTANCE);

        let y = l.admittance(1000.0);
        let omega = 2.0 * std::f64::consts::PI * 1000.0;
        assert_relative_eq!(y.im, -1.0 / (omega * 10e-3), max_relative = 1e-12);
        assert_eq!(y.re, 0.0);
    }
}
