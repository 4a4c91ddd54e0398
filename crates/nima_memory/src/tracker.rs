//! Affect Tracker - one agent's tick loop
//!
//! Wires the pieces in the order a host drives them on every interaction:
//!
//! ```text
//! raw vector ──► cross-affect regulation ──► history snapshot
//!                                        └─► correlation transition (if stimulated)
//! ```
//!
//! The tracker owns the current vector and serialises ticks on it, so the
//! transition it records always starts from the previous tick's result.

use crate::correlation::CorrelationAnalyzer;
use crate::history::{AffectSnapshot, HistoryStore, Metadata};
use nima_core::{AffectVector, NimaConfig, Result};
use nima_limbic::{InteractionMatrix, INTERACTION_THRESHOLD};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub struct AffectTracker {
    baseline: AffectVector,
    matrix: InteractionMatrix,
    cross_affect: bool,
    history: HistoryStore,
    correlation: CorrelationAnalyzer,
    current: Mutex<AffectVector>,
}

impl AffectTracker {
    /// Build a tracker around an explicit baseline.
    ///
    /// Resumes from the most recent persisted snapshot when there is one,
    /// otherwise starts at the baseline.
    pub fn new(config: &NimaConfig, baseline: AffectVector) -> Result<Self> {
        config.validate()?;
        let history = HistoryStore::new(config.history.clone())?;
        let current = history
            .get_timeline(config.history.max_age_hours, Some(1))
            .pop()
            .map(|s| *s.values())
            .unwrap_or(baseline);

        tracing::info!(
            "Affect tracker ready for '{}' (baseline {}, resuming at {})",
            config.history.identity_name,
            baseline,
            current
        );

        Ok(Self {
            baseline,
            matrix: InteractionMatrix::default(),
            cross_affect: config.tracker.cross_affect,
            history,
            correlation: CorrelationAnalyzer::new(config.correlation.clone()),
            current: Mutex::new(current),
        })
    }

    /// Build a tracker whose baseline comes from the config, optionally via a
    /// named profile.
    pub fn from_config(config: &NimaConfig, profile: Option<&str>) -> Result<Self> {
        let baseline = config.resolve_baseline(profile)?;
        Self::new(config, baseline)
    }

    /// Swap in a different coupling table.
    pub fn with_matrix(mut self, matrix: InteractionMatrix) -> Self {
        self.matrix = matrix;
        self
    }

    fn lock_current(&self) -> MutexGuard<'_, AffectVector> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Advance one step.
    ///
    /// `raw` is the host's freshly computed vector; `stimulus` names the input
    /// intensities that produced it. The snapshot is returned even when only
    /// in-memory recording succeeded; a failed flush surfaces as the error.
    pub fn tick(
        &self,
        raw: AffectVector,
        source: &str,
        stimulus: Option<&HashMap<String, f32>>,
        mut metadata: Metadata,
    ) -> Result<AffectSnapshot> {
        let mut current = self.lock_current();

        let next = if self.cross_affect {
            self.matrix.apply(&raw, INTERACTION_THRESHOLD)
        } else {
            raw
        };

        if let Some(inputs) = stimulus {
            metadata.insert("inputs".to_string(), serde_json::json!(inputs));
        }
        let recorded = self.history.record(next, &self.baseline, source, metadata);

        if let Some(inputs) = stimulus {
            self.correlation.record_transition(inputs, &current, &next);
        }
        tracing::debug!("Affect tick from '{}': {} -> {}", source, *current, next);
        *current = next;

        recorded
    }

    pub fn current(&self) -> AffectVector {
        *self.lock_current()
    }

    pub fn baseline(&self) -> &AffectVector {
        &self.baseline
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn correlation(&self) -> &CorrelationAnalyzer {
        &self.correlation
    }

    pub fn identity_name(&self) -> &str {
        self.history.identity_name()
    }
}
