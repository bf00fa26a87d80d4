//! Abstract Syntax Tree types for the schematic description language.

use std::collections::HashMap;

use crate::circuit::Point;
use crate::components::ComponentKind;

/// Complete AST representation of a parsed schematic.
#[derive(Debug, Clone)]
pub struct SchematicAst {
    /// All component instances, in file order
    pub components: Vec<ComponentDef>,
    /// All wires, in file order
    pub wires: Vec<WireDef>,
    /// Model definitions
    pub models: HashMap<String, ModelDef>,
}

impl SchematicAst {
    /// Create a new empty schematic AST.
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
            wires: Vec::new(),
            models: HashMap::new(),
        }
    }
}

impl Default for SchematicAst {
    fn default() -> Self {
        Self::new()
    }
}

/// A component definition from the description.
#[derive(Debug, Clone)]
pub struct ComponentDef {
    /// Component kind
    pub kind: ComponentKind,
    /// Unique component name
    pub name: String,
    /// Terminal positions, in terminal-slot order
    pub points: Vec<Point>,
    /// Component value (resistance, capacitance, source output, ...)
    pub value: Option<f64>,
    /// Reference to a model definition or built-in preset
    pub model_ref: Option<String>,
    /// Additional parameters
    pub params: HashMap<String, f64>,
    /// Source line number for error reporting
    pub line: usize,
}

/// A wire polyline from a `.wire` directive.
#[derive(Debug, Clone, PartialEq)]
pub struct WireDef {
    /// Polyline vertices; only the first and last connect
    pub points: Vec<Point>,
    /// Source line number
    pub line: usize,
}

/// An op-amp model definition.
#[derive(Debug, Clone)]
pub struct ModelDef {
    /// Model name
    pub name: String,
    /// Model parameters
    pub params: HashMap<String, f64>,
    /// Source line number
    pub line: usize,
}

impl ComponentKind {
    /// Parse a component kind from a single-character name prefix.
    pub fn from_prefix(prefix: char) -> Option<Self> {
        match prefix.to_ascii_uppercase() {
            'R' => Some(Self::Resistor),
            'C' => Some(Self::Capacitor),
            'L' => Some(Self::Inductor),
            'V' => Some(Self::VoltageSource),
            'I' => Some(Self::CurrentSource),
            _ => None,
        }
    }

    /// Parse a component kind from a leading keyword (`OPAMP U1 ...`).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_uppercase().as_str() {
            "OPAMP" => Some(Self::OpAmp),
            "GROUND" => Some(Self::Ground),
            _ => None,
        }
    }
}
