//! Text description language for schematics.
//!
//! Schematics are drawn on an integer grid. Every component names the grid
//! points its terminals sit on; wires are polylines whose two endpoints join
//! whatever they touch. The language is line-oriented and human-editable.
//!
//! # Grammar Overview
//!
//! ```text
//! schematic   = { line }
//! line        = comment | directive | component | empty
//! comment     = ('#' | ';') { any_char }
//! directive   = wire | model
//! wire        = ".wire" point point { point }
//! model       = ".model" name ("OPAMP" | "OP") [ '(' { param } ')' ]
//! component   = [keyword] name point+ { value | source | param | model_ref }
//!
//! keyword     = "OPAMP" | "GROUND"
//! point       = integer ',' integer
//! source      = ("DC" | "AC") value
//! param       = identifier '=' value
//! value       = number [unit_suffix]
//! model_ref   = identifier
//!
//! number      = ['-'] digit+ ['.' digit+] [('e'|'E') ['-'|'+'] digit+]
//! unit_suffix = 'p' | 'n' | 'u' | 'm' | 'k' | 'M' | 'G'
//! identifier  = (letter | '_') { letter | digit | '_' }
//! ```
//!
//! # Component Types
//!
//! | Prefix | Description | Syntax |
//! |--------|-------------|--------|
//! | R | Resistor | `R<name> <p1> <p2> <ohms>` |
//! | C | Capacitor | `C<name> <p1> <p2> <farads>` |
//! | L | Inductor | `L<name> <p1> <p2> <henries>` |
//! | V | Voltage Source | `V<name> <p+> <p-> DC <volts>` or `AC <amplitude> freq=<hz>` |
//! | I | Current Source | `I<name> <p+> <p-> <amps>` |
//! | OP | Op-Amp | `OP<name> <in+> <in-> <out> [model]` |
//! | GND | Ground | `GND<name> <p>` |
//!
//! # Example
//!
//! ```text
//! # Non-inverting buffer driven past the rail
//! .model FAST OPAMP (gain=1e6 vpos=15 vneg=-15)
//!
//! V1   0,4 0,0 DC 20
//! OP1  0,4 4,2 4,4 FAST
//! .wire 4,2 6,2 6,4 4,4
//! R1   4,4 4,0 1k
//! GND1 0,0
//! .wire 0,0 4,0
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{parse_value, Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::error::Result;

/// Parse a schematic description string into an AST.
pub fn parse(input: &str) -> Result<SchematicAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}

/// Parse a schematic description file.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path) -> Result<SchematicAst> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::SimulationError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}
