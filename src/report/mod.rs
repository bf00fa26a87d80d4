//! Plain-text report for the CLI frontend.
//!
//! Prints node potentials, the operating point and, for every component,
//! the sections the info registry lists for its kind. With sampling on,
//! voltages and currents are repeated in the time domain and node
//! potentials are written as CSV.

use std::io::Write;

use crate::components::Component;
use crate::error::{Result, SimulationError};
use crate::info::{read_section, InfoReading, InfoRegistry, InfoSection};
use crate::signal::{Interpretation, SampleGrid, Signal, SignalInterpreter, WaveformSignal};
use crate::solver::Simulation;

/// Options for [`write_report`].
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Also print node potentials sampled at this many points
    pub samples: Option<usize>,
    /// Periods of the slowest AC source covered by the samples
    pub periods: f64,
}

fn output_error(e: std::io::Error) -> SimulationError {
    SimulationError::ReportOutputError { message: e.to_string() }
}

/// Write the full report for `simulation`.
pub fn write_report<W: Write>(
    simulation: &mut Simulation,
    registry: &InfoRegistry,
    options: &ReportOptions,
    writer: &mut W,
) -> Result<()> {
    write_nodes(simulation, writer).map_err(output_error)?;
    write_operating_point(simulation, writer).map_err(output_error)?;

    let components: Vec<Component> = simulation.schematic().components.clone();
    for component in &components {
        let sections = registry.sections(component.kind());
        if sections.is_empty() {
            continue;
        }
        writeln!(writer, "{} ({})", component.name(), component.kind()).map_err(output_error)?;
        for section in sections {
            let text = match read_section(simulation, component.id(), *section) {
                Some(reading) => format_reading(&reading),
                None => "n/a".to_string(),
            };
            writeln!(writer, "  {}: {}", section, text).map_err(output_error)?;
        }
    }

    if let Some(samples) = options.samples {
        let periods = if options.periods > 0.0 { options.periods } else { 1.0 };
        let grid = simulation.sample_grid(samples, periods);
        write_sampled_sections(simulation, registry, &components, &grid, writer)?;
        write_waveforms(simulation, &grid, writer).map_err(output_error)?;
    }
    Ok(())
}

/// Voltage and current sections again, read from their sampled waveforms.
fn write_sampled_sections<W: Write>(
    simulation: &mut Simulation,
    registry: &InfoRegistry,
    components: &[Component],
    grid: &SampleGrid,
    writer: &mut W,
) -> Result<()> {
    writeln!(writer, "Sampled: {} points, step {}", grid.count, format_value(grid.step, "s")).map_err(output_error)?;
    for component in components {
        for section in registry.sections(component.kind()) {
            if !matches!(section, InfoSection::VoltageDrop | InfoSection::Current) {
                continue;
            }
            if let Some(reading) = read_section(simulation, component.id(), *section) {
                let text = format_reading(&reading.sampled(grid));
                writeln!(writer, "  {} {}: {}", component.name(), section, text).map_err(output_error)?;
            }
        }
    }
    Ok(())
}

fn write_nodes<W: Write>(simulation: &Simulation, writer: &mut W) -> std::io::Result<()> {
    let nodes = simulation.nodes();
    writeln!(writer, "Nodes: {}", nodes.len())?;
    for node in nodes.nodes() {
        let positions: Vec<String> = node.positions.iter().map(ToString::to_string).collect();
        write!(writer, "  {} {}: {}", node.index, positions.join(" "), format_value(node.dc_potential, "V"))?;
        for (frequency, p) in &node.ac_potentials {
            write!(
                writer,
                ", {} {} at {:.2} deg",
                frequency,
                format_value(p.norm(), "V"),
                p.arg().to_degrees()
            )?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

fn write_operating_point<W: Write>(simulation: &Simulation, writer: &mut W) -> std::io::Result<()> {
    if let Some(op) = simulation.operating_point() {
        writeln!(
            writer,
            "Operating point: {} iteration(s), {} correction(s)",
            op.iterations, op.corrections
        )?;
    }
    Ok(())
}

fn write_waveforms<W: Write>(simulation: &Simulation, grid: &SampleGrid, writer: &mut W) -> std::io::Result<()> {
    let waves: Vec<WaveformSignal> = simulation
        .nodes()
        .nodes()
        .iter()
        .filter_map(|node| simulation.node_waveform(node.index, grid))
        .collect();

    write!(writer, "Time")?;
    for node in simulation.nodes().nodes() {
        write!(writer, ",V({})", node.index)?;
    }
    writeln!(writer)?;
    for i in 0..grid.count {
        write!(writer, "{}", grid.time_at(i))?;
        for wave in &waves {
            write!(writer, ",{}", wave.samples()[i])?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// One-line rendering of a section value.
pub fn format_reading(reading: &InfoReading) -> String {
    match reading {
        InfoReading::Signal(signal) => format_signal(signal),
        InfoReading::Power(p) => format!(
            "avg {}, min {}, max {}",
            format_value(p.average, "W"),
            format_value(p.minimum, "W"),
            format_value(p.maximum, "W")
        ),
        InfoReading::Source(source) => source.to_string(),
        InfoReading::Mode(mode) => mode.to_string(),
    }
}

fn format_signal(signal: &Signal) -> String {
    Interpretation::ALL
        .iter()
        .map(|what| format!("{} {}", what, format_value(signal.interpret(*what), "")))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format a value with an engineering prefix.
pub fn format_value(value: f64, unit: &str) -> String {
    const PREFIXES: [(f64, &str); 7] = [
        (1e9, "G"),
        (1e6, "M"),
        (1e3, "k"),
        (1.0, ""),
        (1e-3, "m"),
        (1e-6, "u"),
        (1e-9, "n"),
    ];
    if !value.is_finite() {
        return format!("{} {}", value, unit).trim_end().to_string();
    }
    let magnitude = value.abs();
    let (scale, prefix) = PREFIXES
        .iter()
        .find(|(scale, _)| magnitude >= *scale)
        .copied()
        .unwrap_or((1.0, ""));
    let scaled = if magnitude == 0.0 { 0.0 } else { value / scale };
    format!("{:.4} {}{}", scaled, prefix, unit).trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{Point, Schematic};
    use crate::solver::Simulator;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(5.0, "V"), "5.0000 V");
        assert_eq!(format_value(-2.5e-3, "A"), "-2.5000 mA");
        assert_eq!(format_value(4.7e3, ""), "4.7000 k");
        assert_eq!(format_value(0.0, "W"), "0.0000 W");
        assert_eq!(format_value(f64::NAN, "W"), "NaN W");
    }

    #[test]
    fn test_report_lists_registered_sections() {
        let p = Point::new;
        let mut s = Schematic::new();
        s.add_dc_voltage_source("V1", p(0, 4), p(0, 0), 5.0);
        s.add_resistor("R1", p(0, 4), p(0, 0), 1e3);
        s.add_ground("GND1", p(0, 0));
        let mut sim = Simulator::default().simulate(s).unwrap();

        let mut out = Vec::new();
        let options = ReportOptions {
            samples: Some(2),
            periods: 1.0,
        };
        write_report(&mut sim, &InfoRegistry::standard(), &options, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Nodes: 1"));
        assert!(text.contains("R1 (resistor)"));
        assert!(text.contains("  power: avg 25.0000 mW"));
        assert!(text.contains("  source output: DC voltage 5 @ DC (C0)"));
        assert!(!text.contains("GND1"));
        assert!(text.contains("Sampled: 2 points"));
        assert!(text.contains("  R1 current: max 5.0000 mA"));
        assert!(!text.contains("V1 power:"));
        assert!(text.contains("Time,V(N0)"));
    }
}
