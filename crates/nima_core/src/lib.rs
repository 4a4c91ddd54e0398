//! # NIMA Core
//!
//! Shared vocabulary for the affect engine: the seven primary affects of
//! Panksepp's affective neuroscience, the bounded affect vector every other
//! crate exchanges, the error taxonomy, archetype baselines and configuration.

pub mod affect;
pub mod archetype;
pub mod config;
pub mod error;

pub use affect::{Affect, AffectVector, AFFECT_COUNT, DEFAULT_BASELINE};
pub use archetype::Archetype;
pub use config::{
    BaselineSpec, CorrelationConfig, HistoryConfig, NimaConfig, TrackerConfig, MAX_CAPACITY,
};
pub use error::{AffectVectorError, NimaError, PersistOp, Result};
