//! Operational Amplifier model.
//!
//! The op-amp is a finite-gain voltage-controlled voltage source whose output
//! is limited by its supply rails. Rail limiting is not a smooth nonlinearity
//! here: each op-amp is either in its linear region or pinned to one rail,
//! and the operating-point iteration picks the region.

use std::fmt;

use crate::circuit::{ComponentId, Point};
use crate::dsl::ModelDef;

/// Parameters for an op-amp model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpAmpParams {
    /// Open-loop DC gain (A_OL)
    pub gain: f64,
    /// Positive rail voltage
    pub v_rail_pos: f64,
    /// Negative rail voltage
    pub v_rail_neg: f64,
}

impl Default for OpAmpParams {
    fn default() -> Self {
        Self::ideal()
    }
}

impl OpAmpParams {
    /// Create parameters for an ideal op-amp.
    pub fn ideal() -> Self {
        Self {
            gain: 1e6, // Very high but finite for numerical stability
            v_rail_pos: 15.0,
            v_rail_neg: -15.0,
        }
    }

    /// Create parameters for a typical 741-style op-amp.
    pub fn ua741() -> Self {
        Self {
            gain: 2e5, // 200,000 open-loop gain
            v_rail_pos: 13.0,
            v_rail_neg: -13.0,
        }
    }

    /// Create parameters for a TL072-style JFET op-amp.
    pub fn tl072() -> Self {
        Self {
            gain: 2e5,
            v_rail_pos: 13.5,
            v_rail_neg: -13.5,
        }
    }

    /// Look up a built-in preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ideal" => Some(Self::ideal()),
            "ua741" | "lm741" => Some(Self::ua741()),
            "tl072" | "tl071" => Some(Self::tl072()),
            _ => None,
        }
    }

    /// Classify an output voltage against the supply rails.
    pub fn classify(&self, v_out: f64) -> OpAmpMode {
        if v_out >= self.v_rail_pos {
            OpAmpMode::PositiveSaturation
        } else if v_out <= self.v_rail_neg {
            OpAmpMode::NegativeSaturation
        } else {
            OpAmpMode::Active
        }
    }

    /// The rail voltage the output is pinned to in `mode`.
    pub fn rail(&self, mode: OpAmpMode) -> Option<f64> {
        match mode {
            OpAmpMode::Active => None,
            OpAmpMode::PositiveSaturation => Some(self.v_rail_pos),
            OpAmpMode::NegativeSaturation => Some(self.v_rail_neg),
        }
    }

    /// Create parameters from a model definition.
    pub fn from_model(model: &ModelDef) -> Self {
        let mut params = Self::ideal();

        if let Some(&gain) = model.params.get("gain") {
            params.gain = gain;
        }
        if let Some(&a) = model.params.get("a") {
            params.gain = a;
        }
        if let Some(&vp) = model.params.get("vpos") {
            params.v_rail_pos = vp;
        }
        if let Some(&vn) = model.params.get("vneg") {
            params.v_rail_neg = vn;
        }

        params
    }
}

/// Operating region of an op-amp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OpAmpMode {
    /// Linear region: Vout = A * (V+ - V-)
    #[default]
    Active,
    /// Output pinned to the positive rail
    PositiveSaturation,
    /// Output pinned to the negative rail
    NegativeSaturation,
}

impl OpAmpMode {
    /// Check if the output is pinned to a rail.
    pub fn is_saturated(&self) -> bool {
        !matches!(self, OpAmpMode::Active)
    }
}

impl fmt::Display for OpAmpMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            OpAmpMode::Active => "active",
            OpAmpMode::PositiveSaturation => "positive saturation",
            OpAmpMode::NegativeSaturation => "negative saturation",
        };
        f.write_str(text)
    }
}

/// An operational amplifier component.
#[derive(Debug, Clone)]
pub struct OpAmp {
    pub id: ComponentId,
    pub name: String,
    pub terminals: [Point; 3], // [non-inverting (+), inverting (-), output]
    pub params: OpAmpParams,
}

impl OpAmp {
    /// Create a new op-amp.
    pub fn new(id: ComponentId, name: String, terminals: [Point; 3], params: OpAmpParams) -> Self {
        Self {
            id,
            name,
            terminals,
            params,
        }
    }

    /// Get the non-inverting input terminal.
    pub fn input_pos(&self) -> Point {
        self.terminals[0]
    }

    /// Get the inverting input terminal.
    pub fn input_neg(&self) -> Point {
        self.terminals[1]
    }

    /// Get the output terminal.
    pub fn output(&self) -> Point {
        self.terminals[2]
    }
}
