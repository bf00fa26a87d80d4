//! WASM bindings for Schemsim Core.
//!
//! This module provides JavaScript-friendly bindings for schematic editors
//! running in a browser.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmSimulation } from 'schemsim_core';
//!
//! await init();
//!
//! const schematic = `
//!   V1 0,4 0,0 DC 10
//!   R1 0,4 2,4 1k
//!   R2 2,4 0,0 1k
//!   GND1 0,0
//! `;
//!
//! const sim = new WasmSimulation(schematic);
//! sim.voltage_drop_max(1, -1); // 5
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::{validate_schematic, NodeIndex, Schematic};
use crate::dsl;
use crate::error::SimulationError;
use crate::signal::{PhasorSignal, SignalInterpreter};
use crate::solver::{Simulation, Simulator, SimulatorConfig};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(e: SimulationError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// WASM-compatible schematic simulation.
///
/// Wraps a finished [`Simulation`]; every query reads from its result cache.
#[wasm_bindgen]
pub struct WasmSimulation {
    simulation: Simulation,
}

#[wasm_bindgen]
impl WasmSimulation {
    /// Simulate a schematic description.
    ///
    /// # Returns
    /// A new `WasmSimulation` or an error if the schematic is invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(schematic: &str) -> Result<WasmSimulation, JsValue> {
        Self::with_config(schematic, crate::DEFAULT_MAX_ITERATIONS)
    }

    /// Simulate with a custom operating-point iteration cap.
    #[wasm_bindgen]
    pub fn with_config(schematic: &str, max_iterations: usize) -> Result<WasmSimulation, JsValue> {
        if max_iterations == 0 {
            return Err(to_js(SimulationError::WasmError {
                message: "max_iterations must be at least 1".to_string(),
            }));
        }
        let ast = dsl::parse(schematic).map_err(to_js)?;
        let schematic = Schematic::from_ast(ast).map_err(to_js)?;
        validate_schematic(&schematic).map_err(to_js)?;

        let config = SimulatorConfig::new().with_max_iterations(max_iterations);
        let simulation = Simulator::new(config).simulate(schematic).map_err(to_js)?;

        Ok(WasmSimulation { simulation })
    }

    /// Number of non-reference nodes.
    #[wasm_bindgen(getter)]
    pub fn node_count(&self) -> usize {
        self.simulation.nodes().len()
    }

    /// Node index at a grid point, or `undefined`. The reference node is -1.
    #[wasm_bindgen]
    pub fn node_at(&self, x: i32, y: i32) -> Option<i32> {
        self.simulation
            .nodes()
            .node_at((x, y).into())
            .map(|n| n.0 as i32)
    }

    /// Largest instantaneous drop from node `from` to node `to`.
    #[wasm_bindgen]
    pub fn voltage_drop_max(&mut self, from: i32, to: i32) -> Option<f64> {
        self.voltage_drop(from, to).map(|s| s.maximum())
    }

    /// Smallest instantaneous drop from node `from` to node `to`.
    #[wasm_bindgen]
    pub fn voltage_drop_min(&mut self, from: i32, to: i32) -> Option<f64> {
        self.voltage_drop(from, to).map(|s| s.minimum())
    }

    /// RMS drop from node `from` to node `to`.
    #[wasm_bindgen]
    pub fn voltage_drop_rms(&mut self, from: i32, to: i32) -> Option<f64> {
        self.voltage_drop(from, to).map(|s| s.rms())
    }

    /// Average power absorbed by the named component.
    #[wasm_bindgen]
    pub fn power_average(&mut self, name: &str) -> Option<f64> {
        let id = self.simulation.schematic().find_component(name)?.id();
        self.simulation.results_mut().get_power(id).map(|p| p.average)
    }

    /// `[average, minimum, maximum]` power of the named component.
    #[wasm_bindgen]
    pub fn power(&mut self, name: &str) -> Option<Vec<f64>> {
        let id = self.simulation.schematic().find_component(name)?.id();
        self.simulation
            .results_mut()
            .get_power(id)
            .map(|p| vec![p.average, p.minimum, p.maximum])
    }
}

impl WasmSimulation {
    fn voltage_drop(&mut self, from: i32, to: i32) -> Option<PhasorSignal> {
        self.simulation
            .results_mut()
            .try_get_voltage_drop(NodeIndex(from as isize), NodeIndex(to as isize))
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
