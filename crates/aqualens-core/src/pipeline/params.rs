//! Reflective parameter surface for UI binding.
//!
//! Stage parameters are plain typed records internally; this sum type and
//! the descriptor table exist only at the binding boundary so a front-end
//! can enumerate, display, and write parameters generically.

use serde::{Deserialize, Serialize};

/// A parameter value crossing the UI boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Choice(String),
}

impl ParameterValue {
    /// Numeric view; integers widen to float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterValue::Float(v) => Some(*v),
            ParameterValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParameterValue::Int(v) => Some(*v),
            ParameterValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::Choice(v) => Some(v),
            _ => None,
        }
    }
}

/// Declared kind and bounds of a single parameter.
#[derive(Clone, Copy, Debug)]
pub enum ParamKind {
    Float { min: f64, max: f64, default: f64 },
    Int { min: i64, max: i64, default: i64 },
    Bool { default: bool },
    Choice { options: &'static [&'static str], default: &'static str },
}

/// Descriptor of one named parameter of a stage.
#[derive(Clone, Copy, Debug)]
pub struct ParamDescriptor {
    pub name: &'static str,
    pub kind: ParamKind,
}

/// Contract every per-stage parameter record fulfills.
pub trait StageParams: Clone + Default {
    /// The declared parameters with bounds and defaults.
    fn descriptors() -> &'static [ParamDescriptor];

    /// Read a parameter by name.
    fn get(&self, name: &str) -> Option<ParameterValue>;

    /// Write a parameter by name, clamping numeric values into bounds.
    /// Returns a reason string for unknown names or unconvertible values.
    fn set(&mut self, name: &str, value: &ParameterValue) -> Result<(), String>;

    /// Clamp every field into its declared bounds.
    fn clamp(&mut self);
}
