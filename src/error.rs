//! Error types for the schematic simulator.
//!
//! This module provides a unified error type [`SimulationError`] that covers
//! every construction-time failure: schematic description parsing, schematic
//! validation, matrix assembly and solving. Query misses on a finished
//! simulation are never errors; they surface as `None` or zero signals.

use thiserror::Error;

/// Result type alias using [`SimulationError`].
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Unified error type for all simulator operations.
#[derive(Error, Debug)]
pub enum SimulationError {
    // ============ Description Parsing Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Invalid component definition
    #[error("Invalid component '{name}' at line {line}: {message}")]
    InvalidComponent {
        name: String,
        line: usize,
        message: String,
    },

    /// Unknown component type
    #[error("Unknown component type '{component_type}' at line {line}")]
    UnknownComponentType { component_type: String, line: usize },

    /// Undefined model reference
    #[error("Undefined model '{model}' referenced by component '{component}'")]
    UndefinedModel { model: String, component: String },

    /// Duplicate model name
    #[error("Duplicate model name '{name}'")]
    DuplicateModel { name: String },

    // ============ Schematic Validation Errors ============
    /// Invalid parameter value
    #[error("Invalid parameter '{param}' for component '{component}': {message}")]
    InvalidParameter {
        component: String,
        param: String,
        message: String,
    },

    /// Duplicate component name
    #[error("Duplicate component name '{name}'")]
    DuplicateComponent { name: String },

    /// Invalid schematic topology
    #[error("Invalid schematic topology: {message}")]
    InvalidTopology { message: String },

    /// A component id that the schematic does not contain
    #[error("Unknown component id {id}")]
    UnknownComponent { id: usize },

    /// A terminal that the node generator never assigned to a node
    #[error("Terminal {terminal} of component '{component}' is not mapped to a node")]
    UnmappedTerminal { component: String, terminal: usize },

    // ============ Matrix and Simulation Errors ============
    /// Submatrix or vector shape does not match the declared dimensions
    #[error("Dimension mismatch for {part}: expected {expected_rows}x{expected_cols}, got {rows}x{cols}")]
    DimensionMismatch {
        part: &'static str,
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    /// Admittance matrix built with no node unknowns
    #[error("Invalid matrix dimension: {nodes} nodes, {active} active elements")]
    InvalidDimension { nodes: usize, active: usize },

    /// Op-amp output terminal lands on the reference node
    #[error("Op-amp '{name}' has its output tied to the reference node")]
    OpAmpOutputGrounded { name: String },

    /// Elimination found a column with no usable pivot
    #[error("Singular matrix at column {column} - schematic may contain a floating node or a voltage loop")]
    SingularMatrix { column: usize },

    /// Simulator configuration that cannot run
    #[error("Invalid simulator configuration: {message}")]
    InvalidConfig { message: String },

    /// Op-amp operating modes never settled
    #[error("Oscillating operating point: op-amp modes did not settle after {iterations} iterations")]
    OscillatingOperatingPoint { iterations: usize },

    // ============ I/O Errors ============
    /// Error reading a schematic file
    #[error("Failed to read schematic file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing the report
    #[error("Report output error: {message}")]
    ReportOutputError { message: String },

    // ============ WASM Errors ============
    /// WASM-specific error
    #[cfg(feature = "wasm")]
    #[error("WASM error: {message}")]
    WasmError { message: String },
}

impl SimulationError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid component error
    pub fn invalid_component(name: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::InvalidComponent {
            name: name.into(),
            line,
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        component: impl Into<String>,
        param: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            component: component.into(),
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch(
        part: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    ) -> Self {
        Self::DimensionMismatch {
            part,
            expected_rows: expected.0,
            expected_cols: expected.1,
            rows: actual.0,
            cols: actual.1,
        }
    }
}
