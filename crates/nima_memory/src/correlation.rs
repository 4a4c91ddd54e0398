//! Affect Correlation - which inputs tend to move which affects
//!
//! Every stimulated tick is remembered as a [`StateTransition`]: the named
//! input intensities plus the vector before and after. Over a sliding window
//! of recent transitions the analyzer answers:
//! - Which inputs reliably raise a given affect (`analyze_triggers`)
//! - How volatile each affect is (`analyze_sensitivity`)
//! - Which inputs show up most (`get_input_distribution`)

use crate::now_secs;
use nima_core::{Affect, AffectVector, CorrelationConfig};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Inputs weaker than this are not credited with any change.
pub const MIN_INPUT_INTENSITY: f32 = 0.1;

/// An increase of this size (or more) counts as a full-strength response.
pub const DELTA_SATURATION: f32 = 0.2;

const INITIAL_CAPACITY: usize = 128;

/// One recorded before → after change and the inputs present at the time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    id: u64,
    input_affects: HashMap<String, f32>,
    from_values: AffectVector,
    to_values: AffectVector,
    timestamp: f64,
}

impl StateTransition {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn input_affects(&self) -> &HashMap<String, f32> {
        &self.input_affects
    }

    pub fn from_values(&self) -> &AffectVector {
        &self.from_values
    }

    pub fn to_values(&self) -> &AffectVector {
        &self.to_values
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn delta(&self, affect: Affect) -> f32 {
        self.to_values[affect] - self.from_values[affect]
    }

    /// The affect that moved the most, with its signed change.
    ///
    /// Ties go to the earlier affect in canonical order.
    pub fn dominant_change(&self) -> (Affect, f32) {
        let mut best = (Affect::Seeking, self.delta(Affect::Seeking));
        for affect in Affect::ALL.into_iter().skip(1) {
            let delta = self.delta(affect);
            if delta.abs() > best.1.abs() {
                best = (affect, delta);
            }
        }
        best
    }
}

/// Thresholds a candidate trigger must clear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerCriteria {
    /// Minimum number of qualifying transitions for an input.
    pub min_samples: usize,
    /// Minimum average strength for an input.
    pub min_correlation: f32,
}

impl Default for TriggerCriteria {
    fn default() -> Self {
        Self {
            min_samples: 3,
            min_correlation: 0.3,
        }
    }
}

/// An input that reliably raises the analyzed affect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub input: String,
    /// Average strength in [0, 1]
    pub strength: f32,
    /// Qualifying transitions the average is taken over
    pub count: usize,
}

/// Compact view of a transition for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionSummary {
    pub id: u64,
    pub inputs: HashMap<String, f32>,
    pub dominant_change: (Affect, f32),
    pub timestamp: f64,
}

#[derive(Debug)]
struct Window {
    transitions: VecDeque<StateTransition>,
    next_id: u64,
}

/// Sliding window of transitions plus the analyses over it.
#[derive(Debug)]
pub struct CorrelationAnalyzer {
    window_size: usize,
    window: Mutex<Window>,
}

impl Default for CorrelationAnalyzer {
    fn default() -> Self {
        Self::new(CorrelationConfig::default())
    }
}

impl CorrelationAnalyzer {
    pub fn new(config: CorrelationConfig) -> Self {
        Self {
            window_size: config.window_size,
            window: Mutex::new(Window {
                transitions: VecDeque::with_capacity(config.window_size.min(INITIAL_CAPACITY)),
                next_id: 1,
            }),
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    fn lock(&self) -> MutexGuard<'_, Window> {
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Remember a transition. Inputs are copied; the oldest entry is evicted
    /// once the window is full.
    pub fn record_transition(
        &self,
        input_affects: &HashMap<String, f32>,
        from_values: &AffectVector,
        to_values: &AffectVector,
    ) -> StateTransition {
        let mut window = self.lock();
        let transition = StateTransition {
            id: window.next_id,
            input_affects: input_affects.clone(),
            from_values: *from_values,
            to_values: *to_values,
            timestamp: now_secs(),
        };
        window.next_id += 1;
        window.transitions.push_back(transition.clone());
        while window.transitions.len() > self.window_size {
            window.transitions.pop_front();
        }
        transition
    }

    /// Inputs that tend to precede an increase in `target_affect`.
    ///
    /// Each transition where the target rose credits every input present with
    /// `intensity × min(1, delta / DELTA_SATURATION)`. Strengths are averaged
    /// per input, filtered by `criteria`, and sorted strongest first.
    pub fn analyze_triggers(&self, target_affect: &str, criteria: &TriggerCriteria) -> Vec<Trigger> {
        let target: Affect = match target_affect.parse() {
            Ok(affect) => affect,
            Err(e) => {
                tracing::debug!("Skipping trigger analysis: {}", e);
                return Vec::new();
            }
        };

        let mut samples: HashMap<String, Vec<f32>> = HashMap::new();
        {
            let window = self.lock();
            for transition in &window.transitions {
                let delta = transition.delta(target);
                if delta <= 0.0 {
                    continue;
                }
                let response = (delta / DELTA_SATURATION).min(1.0);
                for (input, intensity) in &transition.input_affects {
                    if !intensity.is_finite() || *intensity < MIN_INPUT_INTENSITY {
                        continue;
                    }
                    samples
                        .entry(input.clone())
                        .or_default()
                        .push(intensity.clamp(0.0, 1.0) * response);
                }
            }
        }

        let mut triggers: Vec<Trigger> = samples
            .into_iter()
            .filter_map(|(input, strengths)| {
                let count = strengths.len();
                let strength = strengths.iter().sum::<f32>() / count as f32;
                (count >= criteria.min_samples && strength >= criteria.min_correlation).then_some(
                    Trigger {
                        input,
                        strength,
                        count,
                    },
                )
            })
            .collect();
        triggers.sort_by(|a, b| {
            b.strength
                .total_cmp(&a.strength)
                .then_with(|| a.input.cmp(&b.input))
        });
        triggers
    }

    /// Mean absolute change per affect across the window.
    pub fn analyze_sensitivity(&self) -> BTreeMap<Affect, f32> {
        let window = self.lock();
        let n = window.transitions.len();
        Affect::ALL
            .into_iter()
            .map(|affect| {
                let mean = if n == 0 {
                    0.0
                } else {
                    window
                        .transitions
                        .iter()
                        .map(|t| t.delta(affect).abs())
                        .sum::<f32>()
                        / n as f32
                };
                (affect, mean)
            })
            .collect()
    }

    /// How many transitions each input name appears in.
    pub fn get_input_distribution(&self) -> HashMap<String, usize> {
        let window = self.lock();
        let mut counts = HashMap::new();
        for transition in &window.transitions {
            for input in transition.input_affects.keys() {
                *counts.entry(input.clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// The `count` most recent transitions, newest first.
    pub fn get_recent_transitions(&self, count: usize) -> Vec<TransitionSummary> {
        let window = self.lock();
        window
            .transitions
            .iter()
            .rev()
            .take(count)
            .map(|t| TransitionSummary {
                id: t.id,
                inputs: t.input_affects.clone(),
                dominant_change: t.dominant_change(),
                timestamp: t.timestamp,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.lock().transitions.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().transitions.is_empty()
    }
}

impl fmt::Display for CorrelationAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CorrelationAnalyzer(transitions={}/{})",
            self.len(),
            self.window_size
        )
    }
}
