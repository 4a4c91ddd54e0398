//! # NIMA Memory
//!
//! What the agent remembers about its own feelings:
//! - [`HistoryStore`]: the bounded, optionally persisted trail of snapshots
//! - [`CorrelationAnalyzer`]: which inputs precede which affect changes
//! - [`AffectTracker`]: the per-tick flow tying regulation, history and
//!   correlation together

pub mod correlation;
pub mod history;
pub mod tracker;

pub use correlation::{
    CorrelationAnalyzer, StateTransition, TransitionSummary, Trigger, TriggerCriteria,
    DELTA_SATURATION, MIN_INPUT_INTENSITY,
};
pub use history::{
    AffectSnapshot, HistoryStore, Metadata, TrendDirection, STATE_LOOKUP_WINDOW_SECS,
    TREND_SLOPE_THRESHOLD,
};
pub use tracker::AffectTracker;

/// Wall-clock time as Unix seconds with microsecond precision.
pub(crate) fn now_secs() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
