//! # Schemsim Core
//!
//! A steady-state simulator for schematics drawn on a grid.
//!
//! This library provides:
//! - A line-oriented description language for schematics
//! - Node generation from terminal positions and wires
//! - Modified Nodal Analysis (MNA) with one solve per independent source
//! - Op-amp operating-point iteration (active vs. saturated)
//! - Phasor signals combined by superposition, with lazily cached voltage,
//!   current and power queries
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`dsl`] - Parser for the schematic description language
//! - [`circuit`] - Schematic model, node generation and validation
//! - [`components`] - Component models (resistors, sources, op-amps, etc.)
//! - [`solver`] - Matrix assembly, solving and the simulation pipeline
//! - [`signal`] - Phasor and sampled signals
//! - [`results`] - Voltage, current and power queries
//! - [`info`] - Which result sections apply to which component kind
//! - `report` - Plain-text report (CLI only)
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! schemsim divider.sch --samples 32
//! ```
//!
//! ### Library
//!
//! ```
//! use schemsim_core::{circuit::Schematic, dsl, Simulator};
//!
//! let ast = dsl::parse("V1 0,1 0,0 DC 10\nR1 0,1 1,1 1k\nR2 1,1 0,0 1k\nGND1 0,0\n").unwrap();
//! let schematic = Schematic::from_ast(ast).unwrap();
//! let simulation = Simulator::default().simulate(schematic).unwrap();
//! assert_eq!(simulation.nodes().len(), 2);
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmSimulation } from 'schemsim_core';
//!
//! const sim = new WasmSimulation(schematicText);
//! sim.voltage_drop_rms(0, -1);
//! ```
//!
//! ## Simulation Method
//!
//! 1. Merge terminals into nodes and pick the reference node
//! 2. Assume every op-amp active; solve the DC system and correct the
//!    assumed modes until they agree with the solution
//! 3. Solve once per independent source with only that source on
//! 4. Sum DC contributions and keep one phasor per AC source

pub mod circuit;
pub mod components;
pub mod dsl;
pub mod error;
pub mod info;
pub mod results;
pub mod signal;
pub mod solver;

#[cfg(feature = "cli")]
pub mod report;

// Re-export main types for convenience
pub use circuit::Schematic;
pub use error::{Result, SimulationError};
pub use solver::{Simulation, Simulator, SimulatorConfig, DEFAULT_MAX_ITERATIONS};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmSimulation;
