//! Power figures from a voltage drop and a current.
//!
//! Voltage and current follow the passive sign convention: the drop is
//! taken from the + terminal to the - terminal and the current flows into
//! the + terminal, so positive power is absorbed.

use num_complex::Complex64;

use crate::circuit::Frequency;
use crate::signal::{PhasorSignal, SignalInterpreter};

/// Average power with worst-case bounds, in watts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerReading {
    pub average: f64,
    pub minimum: f64,
    pub maximum: f64,
}

/// Power dissipated by a conductance `g` across `drop`.
pub fn resistor_power(drop: &PhasorSignal, g: f64) -> PowerReading {
    let rms = drop.rms();
    let hi = drop.maximum();
    let lo = drop.minimum();
    let (hi2, lo2) = (hi * hi, lo * lo);
    let minimum = if lo <= 0.0 && hi >= 0.0 { 0.0 } else { hi2.min(lo2) * g };
    PowerReading {
        average: rms * rms * g,
        minimum,
        maximum: hi2.max(lo2) * g,
    }
}

/// Power absorbed by any element with `drop` across it and `current`
/// flowing into its + terminal.
pub fn element_power(drop: &PhasorSignal, current: &PhasorSignal) -> PowerReading {
    let (minimum, maximum) = interval_product(
        (drop.minimum(), drop.maximum()),
        (current.minimum(), current.maximum()),
    );
    PowerReading {
        average: average_power(drop, current),
        minimum,
        maximum,
    }
}

/// Power absorbed by an AC voltage source at `frequency`.
///
/// The average is undefined when the source carries current at any other
/// AC frequency, and reads NaN.
pub fn ac_source_power(drop: &PhasorSignal, current: &PhasorSignal, frequency: Frequency) -> PowerReading {
    let mut reading = element_power(drop, current);
    if current.phasors().any(|(s, _)| s.frequency != frequency) {
        reading.average = f64::NAN;
    }
    reading
}

fn average_power(drop: &PhasorSignal, current: &PhasorSignal) -> f64 {
    let currents = current.by_frequency();
    drop.by_frequency()
        .iter()
        .filter_map(|(f, v)| currents.get(f).map(|i| complex_power(*v, *i).re))
        .fold(drop.dc() * current.dc(), |acc, p| acc + p)
}

fn interval_product((a_lo, a_hi): (f64, f64), (b_lo, b_hi): (f64, f64)) -> (f64, f64) {
    let products = [a_lo * b_lo, a_lo * b_hi, a_hi * b_lo, a_hi * b_hi];
    products
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(*p), hi.max(*p)))
}

/// Complex power `V I* / 2` of one phasor pair.
pub fn complex_power(v: Complex64, i: Complex64) -> Complex64 {
    v * i.conj() / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::ComponentId;
    use crate::components::{SourceDescription, SourceKind};
    use approx::assert_relative_eq;

    fn ac(owner: usize, hz: f64) -> SourceDescription {
        SourceDescription::new(SourceKind::AcVoltage, hz, 1.0, ComponentId(owner))
    }

    #[test]
    fn test_resistor_dc_power() {
        let p = resistor_power(&PhasorSignal::constant(5.0), 1e-3);
        assert_relative_eq!(p.average, 0.025);
        assert_relative_eq!(p.minimum, 0.025);
        assert_relative_eq!(p.maximum, 0.025);
    }

    #[test]
    fn test_resistor_ac_power_spans_zero() {
        let drop = PhasorSignal::zero().with_phasor(ac(0, 50.0), Complex64::new(10.0, 0.0));
        let p = resistor_power(&drop, 0.1);
        assert_relative_eq!(p.average, 5.0, epsilon = 1e-12);
        assert_eq!(p.minimum, 0.0);
        assert_relative_eq!(p.maximum, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_element_power_matches_phasor_average() {
        let src = ac(0, 50.0);
        let v = PhasorSignal::constant(2.0).with_phasor(src, Complex64::new(4.0, 0.0));
        let i = PhasorSignal::constant(1.0).with_phasor(src, Complex64::new(0.0, 1.0));
        let p = element_power(&v, &i);
        // quadrature AC current carries no real power
        assert_relative_eq!(p.average, 2.0, epsilon = 1e-12);
        assert_relative_eq!(p.maximum, 12.0, epsilon = 1e-12);
        assert_relative_eq!(p.minimum, -4.0, epsilon = 1e-12);
        assert_relative_eq!(complex_power(Complex64::new(4.0, 0.0), Complex64::new(2.0, 0.0)).re, 4.0);
    }

    #[test]
    fn test_ac_source_power_nan_on_foreign_frequency() {
        let own = ac(0, 50.0);
        let v = PhasorSignal::zero().with_phasor(own, Complex64::new(1.0, 0.0));
        let i = PhasorSignal::zero().with_phasor(own, Complex64::new(-0.5, 0.0));
        let p = ac_source_power(&v, &i, own.frequency);
        assert_relative_eq!(p.average, -0.25, epsilon = 1e-12);

        let mixed = i.with_phasor(ac(1, 60.0), Complex64::new(0.1, 0.0));
        assert!(ac_source_power(&v, &mixed, own.frequency).average.is_nan());
    }
}
