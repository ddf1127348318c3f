//! Error types for the sandbox.
//!
//! Only configuration loading and sandbox construction are fallible; runtime
//! anomalies (missed grabs, repeated removals) are absorbed where they occur.

use std::fmt;

#[derive(Debug)]
pub enum SandboxError {
    /// Viewport dimensions must be positive and finite.
    InvalidViewport { width: f32, height: f32 },
    /// The fixed timestep must be positive and finite.
    InvalidTimeStep(f32),
    /// Any other out-of-range setting.
    InvalidConfig(String),
    /// A configuration document could not be parsed.
    ConfigParse(serde_json::Error),
}

impl fmt::Display for SandboxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidViewport { width, height } => {
                write!(f, "Invalid viewport: {width} x {height}")
            }
            Self::InvalidTimeStep(dt) => write!(f, "Invalid time step: {dt}"),
            Self::InvalidConfig(msg) => write!(f, "Invalid config: {msg}"),
            Self::ConfigParse(err) => write!(f, "Config parse error: {err}"),
        }
    }
}

impl std::error::Error for SandboxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigParse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SandboxError {
    fn from(err: serde_json::Error) -> Self {
        Self::ConfigParse(err)
    }
}

/// Convenient Result alias.
pub type Result<T> = std::result::Result<T, SandboxError>;
