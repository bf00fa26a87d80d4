//! Component models for schematic simulation.
//!
//! This module provides models for all supported schematic components:
//! - Linear: Resistor, Capacitor, Inductor
//! - Sources: Voltage Source (DC or AC), Current Source
//! - Active: Op-Amp
//! - Ground
//!
//! Passive components expose their admittance through [`TwoTerminal`];
//! sources and op-amps are stamped by the matrix factory.

mod ground;
mod linear;
mod opamp;
mod sources;

pub use ground::Ground;
pub use linear::{Capacitor, Inductor, Resistor, TwoTerminal};
pub use opamp::{OpAmp, OpAmpMode, OpAmpParams};
pub use sources::{CurrentSource, SourceDescription, SourceKind, VoltageSource};

use std::fmt;

use crate::circuit::{ComponentId, Point};
use crate::dsl::{ComponentDef, ModelDef};
use crate::error::{SimulationError, Result};

/// Conductance used for an ideal short (inductor at DC).
pub const DC_SHORT_CONDUCTANCE: f64 = 1e9;

/// Kind of a component, independent of its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    Resistor,
    Capacitor,
    Inductor,
    VoltageSource,
    CurrentSource,
    OpAmp,
    Ground,
}

impl ComponentKind {
    /// Number of terminals a component of this kind has.
    pub fn terminal_count(&self) -> usize {
        match self {
            Self::Resistor | Self::Capacitor | Self::Inductor => 2,
            Self::VoltageSource | Self::CurrentSource => 2,
            Self::OpAmp => 3, // in+, in-, out
            Self::Ground => 1,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Resistor => "resistor",
            Self::Capacitor => "capacitor",
            Self::Inductor => "inductor",
            Self::VoltageSource => "voltage source",
            Self::CurrentSource => "current source",
            Self::OpAmp => "op-amp",
            Self::Ground => "ground",
        };
        f.write_str(text)
    }
}

/// A schematic component.
#[derive(Debug, Clone)]
pub enum Component {
    Resistor(Resistor),
    Capacitor(Capacitor),
    Inductor(Inductor),
    VoltageSource(VoltageSource),
    CurrentSource(CurrentSource),
    OpAmp(OpAmp),
    Ground(Ground),
}

impl Component {
    /// Create a component from a schematic description definition.
    pub fn from_def(id: ComponentId, def: &ComponentDef, model: Option<&ModelDef>) -> Result<Self> {
        let expected = def.kind.terminal_count();
        if def.points.len() != expected {
            return Err(SimulationError::invalid_component(
                &def.name,
                def.line,
                format!("expected {} terminals, got {}", expected, def.points.len()),
            ));
        }
        let p = &def.points;

        match def.kind {
            ComponentKind::Resistor => {
                let value = def.value.ok_or_else(|| {
                    SimulationError::invalid_component(&def.name, def.line, "resistor requires a value")
                })?;
                Ok(Component::Resistor(Resistor::new(id, def.name.clone(), [p[0], p[1]], value)))
            }

            ComponentKind::Capacitor => {
                let value = def.value.ok_or_else(|| {
                    SimulationError::invalid_component(&def.name, def.line, "capacitor requires a value")
                })?;
                Ok(Component::Capacitor(Capacitor::new(id, def.name.clone(), [p[0], p[1]], value)))
            }

            ComponentKind::Inductor => {
                let value = def.value.ok_or_else(|| {
                    SimulationError::invalid_component(&def.name, def.line, "inductor requires a value")
                })?;
                Ok(Component::Inductor(Inductor::new(id, def.name.clone(), [p[0], p[1]], value)))
            }

            ComponentKind::VoltageSource => {
                let value = def.value.unwrap_or(0.0);
                if def.params.contains_key("ac") {
                    let frequency = def.params.get("freq").copied().ok_or_else(|| {
                        SimulationError::invalid_component(
                            &def.name,
                            def.line,
                            "AC source requires freq=<hz>",
                        )
                    })?;
                    Ok(Component::VoltageSource(VoltageSource::ac(
                        id,
                        def.name.clone(),
                        [p[0], p[1]],
                        value,
                        frequency,
                    )))
                } else {
                    Ok(Component::VoltageSource(VoltageSource::dc(
                        id,
                        def.name.clone(),
                        [p[0], p[1]],
                        value,
                    )))
                }
            }

            ComponentKind::CurrentSource => {
                if def.params.contains_key("ac") {
                    return Err(SimulationError::invalid_component(
                        &def.name,
                        def.line,
                        "current sources are DC only",
                    ));
                }
                let value = def.value.unwrap_or(0.0);
                Ok(Component::CurrentSource(CurrentSource::new(
                    id,
                    def.name.clone(),
                    [p[0], p[1]],
                    value,
                )))
            }

            ComponentKind::OpAmp => {
                let params = match (model, def.model_ref.as_deref()) {
                    (Some(m), _) => OpAmpParams::from_model(m),
                    (None, Some(name)) => OpAmpParams::preset(name).ok_or_else(|| {
                        SimulationError::UndefinedModel {
                            model: name.to_string(),
                            component: def.name.clone(),
                        }
                    })?,
                    (None, None) => OpAmpParams::ideal(),
                };
                Ok(Component::OpAmp(OpAmp::new(
                    id,
                    def.name.clone(),
                    [p[0], p[1], p[2]], // in+, in-, out
                    params,
                )))
            }

            ComponentKind::Ground => Ok(Component::Ground(Ground::new(id, def.name.clone(), p[0]))),
        }
    }

    /// Get the component ID.
    pub fn id(&self) -> ComponentId {
        match self {
            Component::Resistor(r) => r.id,
            Component::Capacitor(c) => c.id,
            Component::Inductor(l) => l.id,
            Component::VoltageSource(v) => v.id,
            Component::CurrentSource(i) => i.id,
            Component::OpAmp(o) => o.id,
            Component::Ground(g) => g.id,
        }
    }

    /// Get the component name.
    pub fn name(&self) -> &str {
        match self {
            Component::Resistor(r) => &r.name,
            Component::Capacitor(c) => &c.name,
            Component::Inductor(l) => &l.name,
            Component::VoltageSource(v) => &v.name,
            Component::CurrentSource(i) => &i.name,
            Component::OpAmp(o) => &o.name,
            Component::Ground(g) => &g.name,
        }
    }

    /// Get the component kind.
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Resistor(_) => ComponentKind::Resistor,
            Component::Capacitor(_) => ComponentKind::Capacitor,
            Component::Inductor(_) => ComponentKind::Inductor,
            Component::VoltageSource(_) => ComponentKind::VoltageSource,
            Component::CurrentSource(_) => ComponentKind::CurrentSource,
            Component::OpAmp(_) => ComponentKind::OpAmp,
            Component::Ground(_) => ComponentKind::Ground,
        }
    }

    /// Get the terminal positions, in terminal-slot order.
    pub fn terminals(&self) -> &[Point] {
        match self {
            Component::Resistor(r) => &r.terminals,
            Component::Capacitor(c) => &c.terminals,
            Component::Inductor(l) => &l.terminals,
            Component::VoltageSource(v) => &v.terminals,
            Component::CurrentSource(i) => &i.terminals,
            Component::OpAmp(o) => &o.terminals,
            Component::Ground(g) => &g.terminals,
        }
    }

    /// View this component as a passive two-terminal element.
    pub fn as_two_terminal(&self) -> Option<&dyn TwoTerminal> {
        match self {
            Component::Resistor(r) => Some(r),
            Component::Capacitor(c) => Some(c),
            Component::Inductor(l) => Some(l),
            _ => None,
        }
    }

    /// Describe this component as an independent source, if it is one.
    pub fn source_description(&self) -> Option<SourceDescription> {
        match self {
            Component::VoltageSource(v) => Some(v.description()),
            Component::CurrentSource(i) => Some(i.description()),
            _ => None,
        }
    }

    /// Position of the negative terminal for sources.
    pub fn source_negative(&self) -> Option<Point> {
        match self {
            Component::VoltageSource(v) => Some(v.negative()),
            Component::CurrentSource(i) => Some(i.negative()),
            _ => None,
        }
    }

    /// Check if this component needs a branch-current unknown.
    pub fn is_active(&self) -> bool {
        matches!(self, Component::VoltageSource(_) | Component::OpAmp(_))
    }
}
