//! Cross-affect interactions: strong affects suppress (or feed) others.
//!
//! Whenever a source affect is at or above the activation threshold it
//! contributes `source_value × coefficient` to each of its targets. The update
//! is two-phase:
//!
//! 1. every delta is computed from the untouched input vector and accumulated
//!    per target;
//! 2. the accumulated deltas are added to the original values and clamped.
//!
//! Mutual suppression (FEAR ⟂ PLAY) therefore has a single result no matter
//! in which order the matrix is scanned.

use nima_core::{Affect, AffectVector, AFFECT_COUNT};
use std::collections::BTreeMap;

/// Sources below this value do not interact.
pub const INTERACTION_THRESHOLD: f32 = 0.5;

/// Effects at or below this magnitude are omitted from [`get_effects`].
pub const EFFECT_NOISE_FLOOR: f32 = 0.05;

/// A signed coupling from one affect to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interaction {
    pub source: Affect,
    pub target: Affect,
    pub coefficient: f32,
}

/// Fixed source → target coupling table.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionMatrix {
    entries: Vec<Interaction>,
}

impl Default for InteractionMatrix {
    fn default() -> Self {
        use Affect::*;
        Self::from_entries([
            // Threat shuts down play and exploration, and feeds separation distress
            (Fear, Play, -0.25),
            (Fear, Seeking, -0.15),
            (Fear, Lust, -0.10),
            (Fear, Panic, 0.10),
            // Anger crowds out play and tenderness
            (Rage, Play, -0.20),
            (Rage, Care, -0.15),
            // Nurturing calms aggression and distress
            (Care, Rage, -0.30),
            (Care, Panic, -0.10),
            // Play is the antidote to panic and fear
            (Play, Panic, -0.20),
            (Play, Fear, -0.15),
            (Play, Rage, -0.10),
            (Lust, Rage, -0.10),
            // Separation distress dampens play and exploration
            (Panic, Play, -0.15),
            (Panic, Seeking, -0.10),
            (Seeking, Panic, -0.10),
        ])
    }
}

impl InteractionMatrix {
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Affect, Affect, f32)>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(source, target, coefficient)| Interaction {
                    source,
                    target,
                    coefficient,
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[Interaction] {
        &self.entries
    }

    /// Coefficient from `source` to `target`, if the pair is coupled.
    pub fn coefficient(&self, source: Affect, target: Affect) -> Option<f32> {
        self.entries
            .iter()
            .filter(|e| e.source == source && e.target == target)
            .map(|e| e.coefficient)
            .reduce(|a, b| a + b)
    }

    /// Apply every active interaction to `vector` and return the result.
    ///
    /// Pure: the input is never modified.
    pub fn apply(&self, vector: &AffectVector, threshold: f32) -> AffectVector {
        // Phase 1: accumulate deltas from the original values only
        let mut deltas = [0.0f32; AFFECT_COUNT];
        for entry in &self.entries {
            let source_value = vector[entry.source];
            if source_value < threshold {
                continue;
            }
            deltas[entry.target.index()] += source_value * entry.coefficient;
        }

        // Phase 2: apply all at once (AffectVector::new clamps)
        let mut out = *vector.values();
        for (value, delta) in out.iter_mut().zip(deltas.iter()) {
            *value += delta;
        }
        let regulated = AffectVector::new(out);
        if regulated != *vector {
            tracing::trace!("Cross-affect regulation: {} -> {}", vector, regulated);
        }
        regulated
    }

    /// Per active source, the target deltas large enough to matter.
    pub fn effects(
        &self,
        vector: &AffectVector,
        threshold: f32,
    ) -> BTreeMap<Affect, BTreeMap<Affect, f32>> {
        let mut effects: BTreeMap<Affect, BTreeMap<Affect, f32>> = BTreeMap::new();
        for entry in &self.entries {
            let source_value = vector[entry.source];
            if source_value < threshold {
                continue;
            }
            let delta = source_value * entry.coefficient;
            if delta.abs() > EFFECT_NOISE_FLOOR {
                *effects
                    .entry(entry.source)
                    .or_default()
                    .entry(entry.target)
                    .or_insert(0.0) += delta;
            }
        }
        effects
    }
}

/// Apply the default matrix at the default threshold.
pub fn apply_interactions(vector: &AffectVector) -> AffectVector {
    InteractionMatrix::default().apply(vector, INTERACTION_THRESHOLD)
}

/// Debug view of what [`apply_interactions`] would do to `vector`.
pub fn get_effects(vector: &AffectVector) -> BTreeMap<Affect, BTreeMap<Affect, f32>> {
    InteractionMatrix::default().effects(vector, INTERACTION_THRESHOLD)
}

/// Operator-facing description of the interaction rules.
pub fn explain() -> String {
    let matrix = InteractionMatrix::default();
    let mut lines = vec![
        format!(
            "Cross-affect interactions over {}.",
            Affect::ALL.map(|a| a.name()).join(", ")
        ),
        format!(
            "A source affect at or above {} adds value × coefficient to each target; \
             all deltas are computed from the original state, then applied together and clamped to [0, 1].",
            INTERACTION_THRESHOLD
        ),
    ];
    for source in Affect::ALL {
        let targets: Vec<String> = matrix
            .entries()
            .iter()
            .filter(|e| e.source == source)
            .map(|e| format!("{} {:+.2}", e.target, e.coefficient))
            .collect();
        if !targets.is_empty() {
            lines.push(format!("  {} → {}", source, targets.join(", ")));
        }
    }
    lines.join("\n")
}
