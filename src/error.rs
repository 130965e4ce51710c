// error.rs - Engine error type
//
// The simulation itself never fails. Errors only come from setup:
// finding a drawing surface, parsing configuration, talking to JS.

use std::fmt;

#[derive(Debug)]
pub enum EngineError {
    /// No canvas element with the requested id.
    MissingCanvas(String),
    /// The canvas exists but refused a 2D context.
    MissingContext,
    /// Configuration parsed but holds values the simulation can't run with.
    InvalidConfig(String),
    /// Configuration is not valid JSON for the expected shape.
    Config(serde_json::Error),
    /// A browser API call threw.
    Js(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::MissingCanvas(id) => write!(f, "canvas element '{}' not found", id),
            EngineError::MissingContext => write!(f, "canvas has no 2d rendering context"),
            EngineError::InvalidConfig(msg) => write!(f, "invalid config: {}", msg),
            EngineError::Config(e) => write!(f, "failed to parse config: {}", e),
            EngineError::Js(msg) => write!(f, "javascript error: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Config(e)
    }
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for EngineError {
    fn from(v: wasm_bindgen::JsValue) -> Self {
        EngineError::Js(v.as_string().unwrap_or_else(|| format!("{:?}", v)))
    }
}
