//! Phasor-domain signals: a DC offset plus one phasor per AC source.

use std::collections::BTreeMap;
use std::ops::{Neg, Sub};

use indexmap::IndexMap;
use num_complex::Complex64;

use super::interpreter::SignalInterpreter;
use super::waveform::WaveformSignal;
use crate::circuit::Frequency;
use crate::components::SourceDescription;

/// A steady-state signal built by superposition.
///
/// Phasors are amplitude phasors: the time-domain contribution of `p` at
/// frequency `f` is `|p| cos(2πft + arg p)`. They are kept in insertion
/// order so every sum over them runs in the same order, which keeps the
/// figures of a signal and its negation exact mirrors.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PhasorSignal {
    dc: f64,
    phasors: IndexMap<SourceDescription, Complex64>,
}

impl PhasorSignal {
    /// The zero signal.
    pub fn zero() -> Self {
        Self::default()
    }

    /// A pure DC signal.
    pub fn constant(dc: f64) -> Self {
        Self {
            dc,
            phasors: IndexMap::new(),
        }
    }

    /// Add a phasor contribution, builder style.
    pub fn with_phasor(mut self, source: SourceDescription, phasor: Complex64) -> Self {
        self.add_phasor(source, phasor);
        self
    }

    /// DC offset.
    pub fn dc(&self) -> f64 {
        self.dc
    }

    /// Add to the DC offset.
    pub fn add_dc(&mut self, value: f64) {
        self.dc += value;
    }

    /// Add a phasor contribution from `source`.
    pub fn add_phasor(&mut self, source: SourceDescription, phasor: Complex64) {
        *self.phasors.entry(source).or_insert(Complex64::new(0.0, 0.0)) += phasor;
    }

    /// Phasor contributed by `source`.
    pub fn phasor(&self, source: &SourceDescription) -> Option<Complex64> {
        self.phasors.get(source).copied()
    }

    /// Iterate over the phasors in insertion order.
    pub fn phasors(&self) -> impl Iterator<Item = (&SourceDescription, &Complex64)> {
        self.phasors.iter()
    }

    /// Number of phasor contributions.
    pub fn phasor_count(&self) -> usize {
        self.phasors.len()
    }

    /// Check if the signal carries only a DC offset.
    pub fn is_dc(&self) -> bool {
        self.phasors.is_empty()
    }

    /// Phasors summed per frequency.
    pub fn by_frequency(&self) -> BTreeMap<Frequency, Complex64> {
        let mut out = BTreeMap::new();
        for (source, p) in &self.phasors {
            *out.entry(source.frequency).or_insert(Complex64::new(0.0, 0.0)) += *p;
        }
        out
    }

    /// Transform the DC offset and every phasor.
    pub fn map(&self, dc: impl FnOnce(f64) -> f64, mut phasor: impl FnMut(&SourceDescription, Complex64) -> Complex64) -> Self {
        Self {
            dc: dc(self.dc),
            phasors: self.phasors.iter().map(|(s, p)| (*s, phasor(s, *p))).collect(),
        }
    }

    /// Instantaneous value at time `t` seconds.
    pub fn value_at(&self, t: f64) -> f64 {
        self.phasors.iter().fold(self.dc, |acc, (source, p)| {
            let omega = source.frequency.omega();
            acc + (*p * Complex64::from_polar(1.0, omega * t)).re
        })
    }

    /// Period of the lowest AC frequency present, if any.
    pub fn longest_period(&self) -> Option<f64> {
        self.phasors
            .keys()
            .map(|s| s.frequency.hz().abs())
            .filter(|f| *f > 0.0)
            .min_by(|a, b| a.total_cmp(b))
            .map(|f| 1.0 / f)
    }

    /// Sample the signal into a waveform.
    pub fn sample(&self, start: f64, step: f64, count: usize) -> WaveformSignal {
        let samples = (0..count).map(|i| self.value_at(start + step * i as f64)).collect();
        WaveformSignal::new(start, step, samples)
    }

    fn magnitude_sum(&self) -> f64 {
        self.phasors.values().map(|p| p.norm()).sum()
    }
}

impl SignalInterpreter for PhasorSignal {
    /// Worst case with every phasor in phase.
    fn maximum(&self) -> f64 {
        self.dc + self.magnitude_sum()
    }

    fn minimum(&self) -> f64 {
        self.dc - self.magnitude_sum()
    }

    fn rms(&self) -> f64 {
        let ac: f64 = self
            .phasors
            .values()
            .map(|p| {
                let r = p.norm() / std::f64::consts::SQRT_2;
                r * r
            })
            .sum();
        (self.dc * self.dc + ac).sqrt()
    }

    fn average(&self) -> f64 {
        self.dc
    }
}

impl Neg for &PhasorSignal {
    type Output = PhasorSignal;

    fn neg(self) -> PhasorSignal {
        self.map(|dc| -dc, |_, p| -p)
    }
}

impl Neg for PhasorSignal {
    type Output = PhasorSignal;

    fn neg(self) -> PhasorSignal {
        -&self
    }
}

impl Sub for &PhasorSignal {
    type Output = PhasorSignal;

    fn sub(self, rhs: &PhasorSignal) -> PhasorSignal {
        let mut out = self.clone();
        out.dc -= rhs.dc;
        for (source, p) in &rhs.phasors {
            out.add_phasor(*source, -*p);
        }
        out
    }
}
