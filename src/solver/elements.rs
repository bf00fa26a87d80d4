//! Matrix-level view of schematic components.
//!
//! Every component is resolved to the node indices its terminals landed on.
//! Voltage sources and op-amps additionally get a dense active index, the
//! row/column of their branch current in B, C and E. Active indices follow
//! component order.

use num_complex::Complex64;

use crate::circuit::{ComponentId, NodeIndex, NodeMap, Schematic};
use crate::components::{Component, OpAmpParams, SourceDescription};
use crate::error::{Result, SimulationError};

/// A two-terminal passive element between nodes A and B.
#[derive(Debug, Clone)]
pub struct PassiveElement {
    pub component: Component,
    pub nodes: [NodeIndex; 2],
}

impl PassiveElement {
    pub fn id(&self) -> ComponentId {
        self.component.id()
    }

    /// Admittance at `frequency` Hz.
    pub fn admittance(&self, frequency: f64) -> Complex64 {
        self.component
            .as_two_terminal()
            .map_or(Complex64::new(0.0, 0.0), |t| t.admittance(frequency))
    }

    /// Admittance at DC.
    pub fn conductance(&self) -> f64 {
        self.component.as_two_terminal().map_or(0.0, |t| t.conductance())
    }
}

/// An independent voltage source with its branch-current unknown.
#[derive(Debug, Clone)]
pub struct VoltageSourceElement {
    pub id: ComponentId,
    pub positive: NodeIndex,
    pub negative: NodeIndex,
    pub description: SourceDescription,
    pub active_index: usize,
}

/// An independent current source.
#[derive(Debug, Clone)]
pub struct CurrentSourceElement {
    pub id: ComponentId,
    pub positive: NodeIndex,
    pub negative: NodeIndex,
    pub description: SourceDescription,
}

/// An op-amp's node triple, parameters and branch-current unknown.
#[derive(Debug, Clone)]
pub struct OpAmpElement {
    pub id: ComponentId,
    pub name: String,
    pub input_pos: NodeIndex,
    pub input_neg: NodeIndex,
    pub output: NodeIndex,
    pub params: OpAmpParams,
    pub active_index: usize,
}

/// All stampable elements of one schematic.
#[derive(Debug, Clone, Default)]
pub struct ElementTable {
    pub node_count: usize,
    pub passives: Vec<PassiveElement>,
    pub voltage_sources: Vec<VoltageSourceElement>,
    pub current_sources: Vec<CurrentSourceElement>,
    pub op_amps: Vec<OpAmpElement>,
    active_count: usize,
}

impl ElementTable {
    /// Resolve every component of `schematic` against `nodes`.
    pub fn build(schematic: &Schematic, nodes: &NodeMap) -> Result<Self> {
        let mut table = ElementTable {
            node_count: nodes.len(),
            ..Default::default()
        };

        for component in &schematic.components {
            match component {
                Component::Resistor(_) | Component::Capacitor(_) | Component::Inductor(_) => {
                    table.passives.push(PassiveElement {
                        component: component.clone(),
                        nodes: [nodes.terminal_node(component, 0)?, nodes.terminal_node(component, 1)?],
                    });
                }
                Component::VoltageSource(v) => {
                    let active_index = table.next_active_index();
                    table.voltage_sources.push(VoltageSourceElement {
                        id: v.id,
                        positive: nodes.terminal_node(component, 0)?,
                        negative: nodes.terminal_node(component, 1)?,
                        description: v.description(),
                        active_index,
                    });
                }
                Component::CurrentSource(i) => {
                    table.current_sources.push(CurrentSourceElement {
                        id: i.id,
                        positive: nodes.terminal_node(component, 0)?,
                        negative: nodes.terminal_node(component, 1)?,
                        description: i.description(),
                    });
                }
                Component::OpAmp(op) => {
                    let output = nodes.terminal_node(component, 2)?;
                    if output.is_reference() {
                        return Err(SimulationError::OpAmpOutputGrounded { name: op.name.clone() });
                    }
                    let active_index = table.next_active_index();
                    table.op_amps.push(OpAmpElement {
                        id: op.id,
                        name: op.name.clone(),
                        input_pos: nodes.terminal_node(component, 0)?,
                        input_neg: nodes.terminal_node(component, 1)?,
                        output,
                        params: op.params,
                        active_index,
                    });
                }
                Component::Ground(_) => {}
            }
        }

        Ok(table)
    }

    fn next_active_index(&mut self) -> usize {
        let idx = self.active_count;
        self.active_count += 1;
        idx
    }

    /// Number of branch-current unknowns.
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Active index of a voltage source or op-amp.
    pub fn active_index_of(&self, id: ComponentId) -> Option<usize> {
        self.voltage_sources
            .iter()
            .find(|v| v.id == id)
            .map(|v| v.active_index)
            .or_else(|| self.op_amps.iter().find(|o| o.id == id).map(|o| o.active_index))
    }

    /// Independent source descriptions, in component order.
    pub fn source_descriptions(&self) -> Vec<SourceDescription> {
        let mut sources: Vec<SourceDescription> = self
            .voltage_sources
            .iter()
            .map(|v| v.description)
            .chain(self.current_sources.iter().map(|i| i.description))
            .collect();
        sources.sort_by_key(|s| s.owner);
        sources
    }
}
