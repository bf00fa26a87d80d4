//! Schematic validation.

use std::collections::HashSet;

use crate::components::Component;
use crate::error::{Result, SimulationError};

use super::Schematic;

/// Validate a schematic for simulation.
///
/// Checks:
/// - The schematic has at least one component
/// - No duplicate component names
/// - Component parameters are physically meaningful
/// - Every wire has two endpoints
pub fn validate_schematic(schematic: &Schematic) -> Result<()> {
    if schematic.components.is_empty() {
        return Err(SimulationError::InvalidTopology {
            message: "Schematic has no components".to_string(),
        });
    }

    let mut names = HashSet::new();
    for component in &schematic.components {
        if !names.insert(component.name()) {
            return Err(SimulationError::DuplicateComponent {
                name: component.name().to_string(),
            });
        }
        validate_component(component)?;
    }

    for wire in &schematic.wires {
        if wire.endpoints().is_none() {
            return Err(SimulationError::InvalidTopology {
                message: format!("Wire {} needs at least two points", wire.id),
            });
        }
    }

    Ok(())
}

fn positive(component: &Component, param: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::invalid_parameter(
            component.name(),
            param,
            format!("must be positive, got {}", value),
        ))
    }
}

fn validate_component(component: &Component) -> Result<()> {
    match component {
        Component::Resistor(r) => positive(component, "resistance", r.resistance),
        Component::Capacitor(c) => positive(component, "capacitance", c.capacitance),
        Component::Inductor(l) => positive(component, "inductance", l.inductance),
        Component::VoltageSource(v) if v.is_ac() => positive(component, "freq", v.frequency),
        Component::OpAmp(op) => {
            positive(component, "gain", op.params.gain)?;
            if op.params.v_rail_pos <= op.params.v_rail_neg {
                return Err(SimulationError::invalid_parameter(
                    component.name(),
                    "vpos",
                    format!(
                        "positive rail {} must exceed negative rail {}",
                        op.params.v_rail_pos, op.params.v_rail_neg
                    ),
                ));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
