//! Error taxonomy for the affect engine.
//!
//! Everything fallible in the engine returns [`NimaError`], so a host agent can
//! treat all failures from this subsystem uniformly. Vector shape and range
//! problems are grouped under [`AffectVectorError`] and convert into the root
//! kind with `?`.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, NimaError>;

/// Root error kind for the affect engine.
#[derive(Debug, Error)]
pub enum NimaError {
    /// Invalid affect name, out-of-range value or malformed baseline.
    #[error(transparent)]
    AffectVector(#[from] AffectVectorError),

    /// Disk read, write or parse failure of persisted state.
    #[error("Failed to {operation} state at {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        operation: PersistOp,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A named baseline profile was requested but is not configured.
    #[error("Profile '{name}' not found{}", alternatives(.available))]
    ProfileNotFound {
        name: String,
        available: Vec<String>,
    },

    /// An archetype name did not match any known archetype.
    #[error("Unknown archetype '{name}'{}", alternatives(.available))]
    UnknownArchetype {
        name: String,
        available: Vec<String>,
    },

    /// Configuration value that cannot be used.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl NimaError {
    pub fn persistence(
        path: impl Into<PathBuf>,
        operation: PersistOp,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Persistence {
            path: path.into(),
            operation,
            source: source.into(),
        }
    }
}

/// Vector-shape and value-range violations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AffectVectorError {
    #[error("Invalid affect name '{name}'{}", alternatives_opt(.valid_names))]
    InvalidName {
        name: String,
        valid_names: Option<Vec<String>>,
    },

    #[error("Affect {affect} value {value} outside valid range [0, 1]")]
    Value { affect: String, value: f32 },

    #[error("Invalid baseline: {0}")]
    Baseline(String),
}

/// Which half of a persistence round trip failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOp {
    Load,
    Save,
}

impl fmt::Display for PersistOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistOp::Load => f.write_str("load"),
            PersistOp::Save => f.write_str("save"),
        }
    }
}

fn alternatives(available: &[String]) -> String {
    if available.is_empty() {
        String::new()
    } else {
        format!(" (available: {})", available.join(", "))
    }
}

fn alternatives_opt(available: &Option<Vec<String>>) -> String {
    match available {
        Some(names) if !names.is_empty() => format!(" (valid: {})", names.join(", ")),
        _ => String::new(),
    }
}
