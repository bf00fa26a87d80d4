//! Schematic structure: placed components and the wires between them.

use super::types::{ComponentId, Point, WireId};
use crate::components::{
    Capacitor, Component, CurrentSource, Ground, Inductor, OpAmp, OpAmpParams, Resistor, VoltageSource,
};
use crate::dsl::SchematicAst;
use crate::error::{Result, SimulationError};

/// A wire polyline. Only its two endpoints make electrical connections;
/// interior vertices are routing only.
#[derive(Debug, Clone, PartialEq)]
pub struct Wire {
    pub id: WireId,
    pub points: Vec<Point>,
}

impl Wire {
    /// Create a new wire through `points`.
    pub fn new(id: WireId, points: Vec<Point>) -> Self {
        Self { id, points }
    }

    /// The two connecting endpoints, or None for a degenerate wire.
    pub fn endpoints(&self) -> Option<(Point, Point)> {
        match (self.points.first(), self.points.last()) {
            (Some(&a), Some(&b)) if self.points.len() >= 2 => Some((a, b)),
            _ => None,
        }
    }
}

/// A complete schematic ready for node generation.
///
/// Component ids are positions in `components`, so they stay dense and
/// follow the order the components were added in.
#[derive(Debug, Clone, Default)]
pub struct Schematic {
    /// All components, in declaration order
    pub components: Vec<Component>,
    /// All wires, in declaration order
    pub wires: Vec<Wire>,
}

impl Schematic {
    /// Create an empty schematic.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schematic from a parsed description.
    pub fn from_ast(ast: SchematicAst) -> Result<Self> {
        let mut schematic = Schematic::new();

        for comp_def in &ast.components {
            // Look up model if referenced; presets are resolved by the component
            let model = comp_def.model_ref.as_ref().and_then(|name| ast.models.get(name));
            let id = schematic.next_component_id();
            let component = Component::from_def(id, comp_def, model)?;
            schematic.components.push(component);
        }

        for wire_def in ast.wires {
            let id = WireId(schematic.wires.len());
            schematic.wires.push(Wire::new(id, wire_def.points));
        }

        Ok(schematic)
    }

    fn next_component_id(&self) -> ComponentId {
        ComponentId(self.components.len())
    }

    fn push(&mut self, build: impl FnOnce(ComponentId) -> Component) -> ComponentId {
        let id = self.next_component_id();
        self.components.push(build(id));
        id
    }

    /// Add a resistor between `a` and `b`.
    pub fn add_resistor(&mut self, name: &str, a: Point, b: Point, resistance: f64) -> ComponentId {
        self.push(|id| Component::Resistor(Resistor::new(id, name.to_string(), [a, b], resistance)))
    }

    /// Add a capacitor between `a` and `b`.
    pub fn add_capacitor(&mut self, name: &str, a: Point, b: Point, capacitance: f64) -> ComponentId {
        self.push(|id| Component::Capacitor(Capacitor::new(id, name.to_string(), [a, b], capacitance)))
    }

    /// Add an inductor between `a` and `b`.
    pub fn add_inductor(&mut self, name: &str, a: Point, b: Point, inductance: f64) -> ComponentId {
        self.push(|id| Component::Inductor(Inductor::new(id, name.to_string(), [a, b], inductance)))
    }

    /// Add a DC voltage source.
    pub fn add_dc_voltage_source(&mut self, name: &str, positive: Point, negative: Point, value: f64) -> ComponentId {
        self.push(|id| Component::VoltageSource(VoltageSource::dc(id, name.to_string(), [positive, negative], value)))
    }

    /// Add a sinusoidal voltage source.
    pub fn add_ac_voltage_source(
        &mut self,
        name: &str,
        positive: Point,
        negative: Point,
        amplitude: f64,
        frequency: f64,
    ) -> ComponentId {
        self.push(|id| {
            Component::VoltageSource(VoltageSource::ac(
                id,
                name.to_string(),
                [positive, negative],
                amplitude,
                frequency,
            ))
        })
    }

    /// Add a DC current source pushing `value` out of its positive terminal.
    pub fn add_current_source(&mut self, name: &str, positive: Point, negative: Point, value: f64) -> ComponentId {
        self.push(|id| Component::CurrentSource(CurrentSource::new(id, name.to_string(), [positive, negative], value)))
    }

    /// Add an op-amp.
    pub fn add_op_amp(
        &mut self,
        name: &str,
        input_pos: Point,
        input_neg: Point,
        output: Point,
        params: OpAmpParams,
    ) -> ComponentId {
        self.push(|id| Component::OpAmp(OpAmp::new(id, name.to_string(), [input_pos, input_neg, output], params)))
    }

    /// Add a ground symbol.
    pub fn add_ground(&mut self, name: &str, position: Point) -> ComponentId {
        self.push(|id| Component::Ground(Ground::new(id, name.to_string(), position)))
    }

    /// Add a straight wire from `a` to `b`.
    pub fn add_wire(&mut self, a: Point, b: Point) -> WireId {
        self.add_polyline(vec![a, b])
    }

    /// Add a wire routed through `points`.
    pub fn add_polyline(&mut self, points: Vec<Point>) -> WireId {
        let id = WireId(self.wires.len());
        self.wires.push(Wire::new(id, points));
        id
    }

    /// Get a component by id.
    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.0)
    }

    /// Get a component by id, failing for ids the schematic doesn't hold.
    pub fn require_component(&self, id: ComponentId) -> Result<&Component> {
        self.component(id).ok_or(SimulationError::UnknownComponent { id: id.0 })
    }

    /// Find a component by name.
    pub fn find_component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name() == name)
    }

    /// Iterate over all op-amps, in component order.
    pub fn op_amps(&self) -> impl Iterator<Item = &OpAmp> {
        self.components.iter().filter_map(|c| match c {
            Component::OpAmp(op) => Some(op),
            _ => None,
        })
    }
}
