//! Reading scalar figures out of signals.

use std::fmt;

/// A scalar figure that can be read from a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interpretation {
    Maximum,
    Minimum,
    Rms,
    Average,
}

impl Interpretation {
    /// All interpretations, in display order.
    pub const ALL: [Interpretation; 4] = [
        Interpretation::Maximum,
        Interpretation::Minimum,
        Interpretation::Rms,
        Interpretation::Average,
    ];
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Interpretation::Maximum => "max",
            Interpretation::Minimum => "min",
            Interpretation::Rms => "rms",
            Interpretation::Average => "avg",
        };
        f.write_str(text)
    }
}

/// Scalar figures of a signal.
pub trait SignalInterpreter {
    /// Largest instantaneous value.
    fn maximum(&self) -> f64;

    /// Smallest instantaneous value.
    fn minimum(&self) -> f64;

    /// Root mean square.
    fn rms(&self) -> f64;

    /// Mean value.
    fn average(&self) -> f64;

    /// Read one figure selected at runtime.
    fn interpret(&self, what: Interpretation) -> f64 {
        match what {
            Interpretation::Maximum => self.maximum(),
            Interpretation::Minimum => self.minimum(),
            Interpretation::Rms => self.rms(),
            Interpretation::Average => self.average(),
        }
    }
}
