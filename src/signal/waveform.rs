//! Discretized time-domain signals.

use std::ops::Neg;

use super::interpreter::SignalInterpreter;

/// Sampling instants shared by every waveform of one readout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleGrid {
    pub start: f64,
    pub step: f64,
    pub count: usize,
}

impl SampleGrid {
    pub fn new(start: f64, step: f64, count: usize) -> Self {
        Self { start, step, count }
    }

    /// `count` samples from t = 0 covering `span` seconds.
    pub fn spanning(span: f64, count: usize) -> Self {
        let step = if count > 1 { span / count as f64 } else { span };
        Self::new(0.0, step, count)
    }

    /// Time of sample `i`.
    pub fn time_at(&self, i: usize) -> f64 {
        self.start + self.step * i as f64
    }
}

/// Uniformly sampled signal.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformSignal {
    start: f64,
    step: f64,
    samples: Vec<f64>,
}

impl WaveformSignal {
    /// Create a waveform whose first sample is at `start` seconds.
    pub fn new(start: f64, step: f64, samples: Vec<f64>) -> Self {
        Self { start, step, samples }
    }

    /// Time of the first sample.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Time between samples.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Sample values in time order.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time of sample `i`.
    pub fn time_at(&self, i: usize) -> f64 {
        self.start + self.step * i as f64
    }

    /// Iterate over `(time, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.samples.iter().enumerate().map(|(i, v)| (self.time_at(i), *v))
    }
}

// Empty waveforms read as zero for every figure.
impl SignalInterpreter for WaveformSignal {
    fn maximum(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    fn minimum(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().copied().fold(f64::INFINITY, f64::min)
    }

    fn rms(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = self.samples.iter().map(|v| v * v).sum();
        (sum_sq / self.samples.len() as f64).sqrt()
    }

    fn average(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }
}

impl Neg for &WaveformSignal {
    type Output = WaveformSignal;

    fn neg(self) -> WaveformSignal {
        WaveformSignal {
            start: self.start,
            step: self.step,
            samples: self.samples.iter().map(|v| -v).collect(),
        }
    }
}

impl Neg for WaveformSignal {
    type Output = WaveformSignal;

    fn neg(mut self) -> WaveformSignal {
        for v in &mut self.samples {
            *v = -*v;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_figures() {
        let w = WaveformSignal::new(0.0, 0.5, vec![1.0, -3.0, 2.0, 0.0]);
        assert_eq!(w.maximum(), 2.0);
        assert_eq!(w.minimum(), -3.0);
        assert_relative_eq!(w.average(), 0.0);
        assert_relative_eq!(w.rms(), 3.5_f64.sqrt());
        assert_eq!(w.time_at(3), 1.5);
        assert_eq!(w.iter().nth(1), Some((0.5, -3.0)));
    }

    #[test]
    fn test_negation() {
        let w = WaveformSignal::new(1.0, 0.1, vec![1.0, -3.0, 2.5]);
        let n = -&w;
        assert_eq!(-n.clone(), w);
        assert_eq!(n.maximum(), -w.minimum());
        assert_eq!(n.rms(), w.rms());
        assert_eq!(n.start(), 1.0);
    }

    #[test]
    fn test_grid_spanning() {
        let grid = SampleGrid::spanning(0.02, 40);
        assert_eq!(grid.count, 40);
        assert_relative_eq!(grid.step, 0.0005);
        assert_relative_eq!(grid.time_at(20), 0.01);
        assert_eq!(SampleGrid::spanning(1.0, 1).step, 1.0);
    }

    #[test]
    fn test_empty_waveform_reads_zero() {
        let w = WaveformSignal::new(0.0, 1.0, Vec::new());
        assert!(w.is_empty());
        assert_eq!(w.maximum(), 0.0);
        assert_eq!(w.rms(), 0.0);
    }
}
