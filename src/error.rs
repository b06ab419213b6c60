use std::fmt;

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Which half of the program a compiler diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Everything that can stop the effect from starting. Once rendering runs
/// nothing is fatal; video problems are only logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RainError {
    #[error("no global window")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("canvas #{0} not found")]
    CanvasNotFound(String),
    #[error("element #{0} is not a canvas")]
    NotACanvas(String),
    #[error("Unable to initialize WebGL. Your browser may not support it.")]
    ContextUnavailable,
    #[error("An error occurred compiling the {stage} shader: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },
    #[error("Unable to initialize the shader program: {0}")]
    ProgramLink(String),
    #[error("failed to allocate {0}")]
    Allocation(&'static str),
    #[error("{0}")]
    Js(String),
}

impl RainError {
    /// Format a rejected JS value for display.
    pub fn js(value: &JsValue) -> Self {
        RainError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<RainError> for JsValue {
    fn from(err: RainError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_carries_stage_and_log() {
        let err = RainError::ShaderCompile {
            stage: ShaderStage::Fragment,
            log: "ERROR: 0:12: 'foo' : undeclared identifier".into(),
        };
        assert_eq!(
            err.to_string(),
            "An error occurred compiling the fragment shader: ERROR: 0:12: 'foo' : undeclared identifier"
        );
    }

    #[test]
    fn context_error_reads_like_a_user_alert() {
        assert!(RainError::ContextUnavailable.to_string().starts_with("Unable to initialize WebGL"));
        assert_eq!(RainError::CanvasNotFound("glCanvas".into()).to_string(), "canvas #glCanvas not found");
    }
}
