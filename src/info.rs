//! Which result sections a front end shows for each kind of component.
//!
//! The registry is an explicit map from [`ComponentKind`] to an ordered list
//! of [`InfoSection`]s, filled by plain registration functions.

use std::collections::HashMap;
use std::fmt;

use crate::circuit::ComponentId;
use crate::components::{ComponentKind, OpAmpMode, SourceDescription};
use crate::results::PowerReading;
use crate::signal::{SampleGrid, Signal};
use crate::solver::Simulation;

/// One block of information about a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoSection {
    VoltageDrop,
    Current,
    Power,
    SourceOutput,
    OperatingMode,
}

impl fmt::Display for InfoSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            InfoSection::VoltageDrop => "voltage drop",
            InfoSection::Current => "current",
            InfoSection::Power => "power",
            InfoSection::SourceOutput => "source output",
            InfoSection::OperatingMode => "operating mode",
        };
        f.write_str(text)
    }
}

/// The value behind one section.
#[derive(Debug, Clone, PartialEq)]
pub enum InfoReading {
    Signal(Signal),
    Power(PowerReading),
    Source(SourceDescription),
    Mode(OpAmpMode),
}

impl InfoReading {
    /// Time-domain form of a signal reading; other readings are unchanged.
    pub fn sampled(self, grid: &SampleGrid) -> InfoReading {
        match self {
            InfoReading::Signal(signal) => InfoReading::Signal(signal.sampled(grid)),
            other => other,
        }
    }
}

/// Map from component kind to the sections shown for it.
#[derive(Debug, Clone, Default)]
pub struct InfoRegistry {
    sections: HashMap<ComponentKind, Vec<InfoSection>>,
}

impl InfoRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry used by the bundled front ends.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        register_passives(&mut registry);
        register_sources(&mut registry);
        register_op_amps(&mut registry);
        registry
    }

    /// Append `sections` to those of `kind`.
    pub fn register(&mut self, kind: ComponentKind, sections: &[InfoSection]) {
        self.sections.entry(kind).or_default().extend_from_slice(sections);
    }

    /// Sections of `kind`, in registration order.
    pub fn sections(&self, kind: ComponentKind) -> &[InfoSection] {
        self.sections.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn register_passives(registry: &mut InfoRegistry) {
    for kind in [ComponentKind::Resistor, ComponentKind::Capacitor, ComponentKind::Inductor] {
        registry.register(
            kind,
            &[InfoSection::VoltageDrop, InfoSection::Current, InfoSection::Power],
        );
    }
}

fn register_sources(registry: &mut InfoRegistry) {
    registry.register(
        ComponentKind::VoltageSource,
        &[InfoSection::SourceOutput, InfoSection::Current, InfoSection::Power],
    );
    registry.register(
        ComponentKind::CurrentSource,
        &[InfoSection::SourceOutput, InfoSection::VoltageDrop, InfoSection::Power],
    );
}

fn register_op_amps(registry: &mut InfoRegistry) {
    registry.register(
        ComponentKind::OpAmp,
        &[
            InfoSection::OperatingMode,
            InfoSection::VoltageDrop,
            InfoSection::Current,
            InfoSection::Power,
        ],
    );
}

/// Read one section of `component` out of a finished simulation.
pub fn read_section(simulation: &mut Simulation, component: ComponentId, section: InfoSection) -> Option<InfoReading> {
    match section {
        InfoSection::VoltageDrop => {
            let [a, b] = simulation.results().entry(component)?.nodes;
            simulation
                .results_mut()
                .try_get_voltage_drop(a, b)
                .map(|drop| InfoReading::Signal(drop.into()))
        }
        InfoSection::Current => simulation
            .results_mut()
            .get_current(component, false)
            .map(|current| InfoReading::Signal(current.into())),
        InfoSection::Power => simulation.results_mut().get_power(component).map(InfoReading::Power),
        InfoSection::SourceOutput => simulation
            .schematic()
            .component(component)?
            .source_description()
            .map(InfoReading::Source),
        InfoSection::OperatingMode => simulation.op_amp_mode(component).map(InfoReading::Mode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{Point, Schematic};
    use crate::components::OpAmpParams;
    use crate::signal::SignalInterpreter;
    use crate::solver::Simulator;
    use approx::assert_relative_eq;

    #[test]
    fn test_standard_registry() {
        let registry = InfoRegistry::standard();
        assert_eq!(
            registry.sections(ComponentKind::Resistor),
            &[InfoSection::VoltageDrop, InfoSection::Current, InfoSection::Power]
        );
        assert_eq!(registry.sections(ComponentKind::OpAmp)[0], InfoSection::OperatingMode);
        assert_eq!(registry.sections(ComponentKind::CurrentSource)[1], InfoSection::VoltageDrop);
        assert!(registry.sections(ComponentKind::Ground).is_empty());
        assert!(InfoRegistry::new().sections(ComponentKind::Resistor).is_empty());
    }

    #[test]
    fn test_register_appends() {
        let mut registry = InfoRegistry::new();
        registry.register(ComponentKind::Ground, &[InfoSection::VoltageDrop]);
        registry.register(ComponentKind::Ground, &[InfoSection::Power]);
        assert_eq!(
            registry.sections(ComponentKind::Ground),
            &[InfoSection::VoltageDrop, InfoSection::Power]
        );
    }

    #[test]
    fn test_read_sections() {
        let p = Point::new;
        let mut s = Schematic::new();
        let v1 = s.add_dc_voltage_source("V1", p(0, 4), p(0, 0), 1.0);
        let op = s.add_op_amp("OP1", p(0, 4), p(4, 4), p(4, 4), OpAmpParams::ideal());
        let rl = s.add_resistor("RL", p(4, 4), p(0, 0), 1e3);
        s.add_ground("GND1", p(0, 0));
        let mut sim = Simulator::default().simulate(s).unwrap();

        assert_eq!(
            read_section(&mut sim, op, InfoSection::OperatingMode),
            Some(InfoReading::Mode(OpAmpMode::Active))
        );
        assert!(matches!(
            read_section(&mut sim, v1, InfoSection::SourceOutput),
            Some(InfoReading::Source(d)) if d.value == 1.0
        ));
        assert!(matches!(
            read_section(&mut sim, rl, InfoSection::Power),
            Some(InfoReading::Power(_))
        ));
        assert_eq!(read_section(&mut sim, rl, InfoSection::OperatingMode), None);
        assert_eq!(read_section(&mut sim, rl, InfoSection::SourceOutput), None);
    }

    #[test]
    fn test_sampled_current_reading() {
        let p = Point::new;
        let mut s = Schematic::new();
        s.add_ac_voltage_source("V1", p(0, 4), p(0, 0), 2.0, 100.0);
        let r1 = s.add_resistor("R1", p(0, 4), p(0, 0), 1e3);
        s.add_ground("GND1", p(0, 0));
        let mut sim = Simulator::default().simulate(s).unwrap();
        let grid = sim.sample_grid(200, 1.0);

        let Some(InfoReading::Signal(phasor)) = read_section(&mut sim, r1, InfoSection::Current) else {
            panic!("resistor current should be a signal reading");
        };
        let Some(InfoReading::Signal(sampled)) =
            read_section(&mut sim, r1, InfoSection::Current).map(|r| r.sampled(&grid))
        else {
            panic!("sampled current should stay a signal reading");
        };

        assert!(phasor.as_phasor().is_some());
        assert!(matches!(sampled, Signal::Waveform(ref w) if w.len() == 200));
        assert_relative_eq!(sampled.maximum(), 2e-3, epsilon = 1e-9);
        assert_relative_eq!(sampled.rms(), phasor.rms(), epsilon = 1e-12);

        let mode = InfoReading::Mode(OpAmpMode::Active);
        assert_eq!(mode.clone().sampled(&grid), mode);
    }
}
