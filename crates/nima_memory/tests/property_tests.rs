//! Property-based tests for nima_memory.
//!
//! Retention caps and trigger strengths must hold for any sequence of records.

use nima_core::{AffectVector, CorrelationConfig, HistoryConfig};
use nima_memory::{CorrelationAnalyzer, HistoryStore, Metadata, TriggerCriteria};
use proptest::prelude::*;
use std::collections::HashMap;

// ============================================================================
// Strategies
// ============================================================================

fn arb_vector() -> impl Strategy<Value = AffectVector> {
    proptest::array::uniform7(0.0f32..=1.0).prop_map(AffectVector::new)
}

fn arb_inputs() -> impl Strategy<Value = HashMap<String, f32>> {
    proptest::collection::hash_map("[a-c]", -0.5f32..1.5, 0..3)
}

// ============================================================================
// Retention
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn history_never_exceeds_cap(cap in 1usize..20, vectors in proptest::collection::vec(arb_vector(), 0..40)) {
        let history = HistoryStore::new(HistoryConfig {
            max_snapshots: cap,
            ..HistoryConfig::default()
        }).unwrap();
        let baseline = AffectVector::default();
        for v in &vectors {
            history.record(*v, &baseline, "prop", Metadata::new()).unwrap();
            prop_assert!(history.len() <= cap);
        }
        prop_assert_eq!(history.len(), vectors.len().min(cap));
    }

    #[test]
    fn timeline_limit_respected(n in 0usize..30, limit in 0usize..40) {
        let history = HistoryStore::new(HistoryConfig::default()).unwrap();
        let baseline = AffectVector::default();
        for i in 0..n {
            history.record(baseline, &baseline, &format!("s{}", i), Metadata::new()).unwrap();
        }
        let timeline = history.get_timeline(1.0, Some(limit));
        prop_assert_eq!(timeline.len(), n.min(limit));
        for pair in timeline.windows(2) {
            prop_assert!(pair[0].timestamp() <= pair[1].timestamp());
        }
    }

    #[test]
    fn correlation_window_bounded(window in 1usize..15, count in 0usize..40) {
        let analyzer = CorrelationAnalyzer::new(CorrelationConfig { window_size: window });
        let v = AffectVector::default();
        for _ in 0..count {
            analyzer.record_transition(&HashMap::new(), &v, &v);
        }
        prop_assert_eq!(analyzer.len(), count.min(window));
    }

    #[test]
    fn trigger_strength_in_unit_range(
        steps in proptest::collection::vec((arb_inputs(), arb_vector(), arb_vector()), 0..30)
    ) {
        let analyzer = CorrelationAnalyzer::default();
        for (inputs, from, to) in &steps {
            analyzer.record_transition(inputs, from, to);
        }
        let criteria = TriggerCriteria { min_samples: 1, min_correlation: 0.0 };
        for target in ["SEEKING", "CARE", "PANIC"] {
            let triggers = analyzer.analyze_triggers(target, &criteria);
            for t in &triggers {
                prop_assert!(t.strength >= 0.0 && t.strength <= 1.0, "strength {}", t.strength);
                prop_assert!(t.count >= 1);
            }
            for pair in triggers.windows(2) {
                prop_assert!(pair[0].strength >= pair[1].strength);
            }
        }
    }
}
