//! Signal algebra.
//!
//! Results are stored as [`PhasorSignal`]s: a DC offset plus one phasor per
//! AC source, combined by superposition. A [`WaveformSignal`] is the same
//! quantity sampled in time. Both read out through [`SignalInterpreter`]
//! and negate exactly, so a quantity measured in the opposite direction is
//! the bitwise negation of the original. Phasor signals are turned into
//! waveforms by sampling them on a [`SampleGrid`].

mod interpreter;
mod phasor;
mod waveform;

pub use interpreter::{Interpretation, SignalInterpreter};
pub use phasor::PhasorSignal;
pub use waveform::{SampleGrid, WaveformSignal};

use std::ops::Neg;

/// Either representation of a signal.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Phasor(PhasorSignal),
    Waveform(WaveformSignal),
}

impl Signal {
    /// The zero signal.
    pub fn zero() -> Self {
        Signal::Phasor(PhasorSignal::zero())
    }

    /// Convert to a waveform, sampling phasor signals over `periods` of
    /// their slowest component. Pure DC signals sample over one second.
    pub fn to_waveform(&self, samples: usize, periods: f64) -> WaveformSignal {
        let span = match self {
            Signal::Phasor(p) => p.longest_period().map_or(1.0, |t| t * periods),
            Signal::Waveform(_) => 1.0,
        };
        self.sample(&SampleGrid::spanning(span, samples))
    }

    /// Sample on `grid`. A waveform is already sampled and is returned as is.
    pub fn sample(&self, grid: &SampleGrid) -> WaveformSignal {
        match self {
            Signal::Phasor(p) => p.sample(grid.start, grid.step, grid.count),
            Signal::Waveform(w) => w.clone(),
        }
    }

    /// The time-domain form of this signal on `grid`.
    pub fn sampled(self, grid: &SampleGrid) -> Signal {
        match self {
            Signal::Phasor(_) => Signal::Waveform(self.sample(grid)),
            waveform => waveform,
        }
    }

    /// The phasor form, if this signal has not been sampled.
    pub fn as_phasor(&self) -> Option<&PhasorSignal> {
        match self {
            Signal::Phasor(p) => Some(p),
            Signal::Waveform(_) => None,
        }
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<PhasorSignal> for Signal {
    fn from(p: PhasorSignal) -> Self {
        Signal::Phasor(p)
    }
}

impl From<WaveformSignal> for Signal {
    fn from(w: WaveformSignal) -> Self {
        Signal::Waveform(w)
    }
}

impl SignalInterpreter for Signal {
    fn maximum(&self) -> f64 {
        match self {
            Signal::Phasor(p) => p.maximum(),
            Signal::Waveform(w) => w.maximum(),
        }
    }

    fn minimum(&self) -> f64 {
        match self {
            Signal::Phasor(p) => p.minimum(),
            Signal::Waveform(w) => w.minimum(),
        }
    }

    fn rms(&self) -> f64 {
        match self {
            Signal::Phasor(p) => p.rms(),
            Signal::Waveform(w) => w.rms(),
        }
    }

    fn average(&self) -> f64 {
        match self {
            Signal::Phasor(p) => p.average(),
            Signal::Waveform(w) => w.average(),
        }
    }
}

impl Neg for Signal {
    type Output = Signal;

    fn neg(self) -> Signal {
        match self {
            Signal::Phasor(p) => Signal::Phasor(-p),
            Signal::Waveform(w) => Signal::Waveform(-w),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::ComponentId;
    use crate::components::{SourceDescription, SourceKind};
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    #[test]
    fn test_signal_dispatch_and_negation() {
        let src = SourceDescription::new(SourceKind::AcVoltage, 100.0, 1.0, ComponentId(0));
        let s: Signal = PhasorSignal::constant(1.0)
            .with_phasor(src, Complex64::new(0.5, 0.0))
            .into();
        assert_eq!(s.interpret(Interpretation::Maximum), 1.5);
        assert_eq!(-(-s.clone()), s);
        assert_eq!((-s.clone()).maximum(), -s.minimum());
    }

    #[test]
    fn test_to_waveform_spans_periods() {
        let src = SourceDescription::new(SourceKind::AcVoltage, 100.0, 1.0, ComponentId(0));
        let s = Signal::from(PhasorSignal::zero().with_phasor(src, Complex64::new(1.0, 0.0)));
        let w = s.to_waveform(100, 2.0);
        assert_eq!(w.len(), 100);
        assert_relative_eq!(w.step(), 0.0002);
        assert_relative_eq!(w.maximum(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(w.rms(), std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-9);

        let dc = Signal::from(PhasorSignal::constant(3.0)).to_waveform(10, 1.0);
        assert_eq!(dc.average(), 3.0);
        assert_eq!(Signal::Waveform(dc.clone()).to_waveform(5, 1.0), dc);
    }

    #[test]
    fn test_sampled_keeps_figures() {
        let src = SourceDescription::new(SourceKind::AcVoltage, 50.0, 1.0, ComponentId(0));
        let phasor = Signal::from(PhasorSignal::constant(0.5).with_phasor(src, Complex64::new(0.0, 2.0)));
        let grid = SampleGrid::spanning(0.02, 400);
        let sampled = phasor.clone().sampled(&grid);

        assert!(sampled.as_phasor().is_none());
        assert_relative_eq!(sampled.average(), phasor.average(), epsilon = 1e-9);
        assert_relative_eq!(sampled.rms(), phasor.rms(), epsilon = 1e-9);
        assert_relative_eq!(sampled.maximum(), phasor.maximum(), epsilon = 1e-3);
        assert_eq!(sampled.clone().sampled(&grid), sampled);
    }
}
