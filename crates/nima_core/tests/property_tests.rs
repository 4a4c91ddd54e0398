//! Property-based tests for nima_core.
//!
//! The affect vector is the one type every component trusts to be bounded, so
//! these check that no constructor or helper can let a value escape [0, 1].

use nima_core::{Affect, AffectVector, Archetype};
use proptest::prelude::*;
use std::collections::BTreeMap;

// ============================================================================
// Strategies
// ============================================================================

/// Any f32 including wildly out-of-range values.
fn arb_raw() -> impl Strategy<Value = [f32; 7]> {
    proptest::array::uniform7(-10.0f32..10.0)
}

fn arb_vector() -> impl Strategy<Value = AffectVector> {
    proptest::array::uniform7(0.0f32..=1.0).prop_map(AffectVector::new)
}

fn arb_affect() -> impl Strategy<Value = Affect> {
    (0usize..7).prop_map(|i| Affect::ALL[i])
}

// ============================================================================
// Bound Properties
// ============================================================================

proptest! {
    #[test]
    fn new_always_bounded(raw in arb_raw()) {
        let v = AffectVector::new(raw);
        for x in v.values() {
            prop_assert!((0.0..=1.0).contains(x), "value escaped bounds: {}", x);
        }
    }

    #[test]
    fn with_always_bounded(v in arb_vector(), affect in arb_affect(), value in -5.0f32..5.0) {
        let updated = v.with(affect, value);
        prop_assert!((0.0..=1.0).contains(&updated[affect]));
        // Other entries untouched
        for other in Affect::ALL.iter().filter(|a| **a != affect) {
            prop_assert_eq!(updated[*other], v[*other]);
        }
    }

    #[test]
    fn dominant_is_maximum(v in arb_vector()) {
        let (affect, value) = v.dominant();
        prop_assert_eq!(v[affect], value);
        for x in v.values() {
            prop_assert!(*x <= value);
        }
    }

    #[test]
    fn distance_is_non_negative_and_symmetric(a in arb_vector(), b in arb_vector()) {
        let d = a.distance(&b);
        prop_assert!(d >= 0.0);
        prop_assert!((d - b.distance(&a)).abs() < 1e-6);
        prop_assert!(a.distance(&a) == 0.0);
    }

    #[test]
    fn similarity_in_unit_range(a in arb_vector(), b in arb_vector()) {
        let s = a.similarity(&b);
        // Non-negative inputs keep cosine similarity in [0, 1]
        prop_assert!(s >= -1e-6 && s <= 1.0 + 1e-5, "similarity out of range: {}", s);
    }

    #[test]
    fn archetype_modifiers_bounded(idx in 0usize..10, affect in arb_affect(), delta in -2.0f32..2.0) {
        let mut modifiers = BTreeMap::new();
        modifiers.insert(affect, delta);
        let b = Archetype::ALL[idx].baseline_with(&modifiers);
        for x in b.values() {
            prop_assert!((0.0..=1.0).contains(x));
        }
    }

    #[test]
    fn json_roundtrip_preserves_values(v in arb_vector()) {
        let json = serde_json::to_string(&v).unwrap();
        let restored: AffectVector = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(restored, v);
    }
}
