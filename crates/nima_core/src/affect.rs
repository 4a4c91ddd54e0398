//! Panksepp's seven primary affects as a fixed-order bounded vector.
//!
//! Every component of the engine speaks the same canonical order:
//! SEEKING, RAGE, FEAR, LUST, CARE, PANIC, PLAY. The [`Affect`] enum is the
//! name↔index bijection and [`AffectVector`] is the 7-tuple of intensities in
//! [0, 1]. The length is carried by the type, so a vector can never be
//! index-inconsistent with the canonical mapping.

use crate::error::AffectVectorError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;
use std::str::FromStr;

/// Number of affect dimensions.
pub const AFFECT_COUNT: usize = 7;

/// Neutral resting state used when no baseline is configured.
pub const DEFAULT_BASELINE: [f32; AFFECT_COUNT] = [0.5, 0.1, 0.2, 0.1, 0.5, 0.1, 0.4];

/// One of the seven primary affects, ordered canonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Affect {
    Seeking,
    Rage,
    Fear,
    Lust,
    Care,
    Panic,
    Play,
}

impl Affect {
    /// All affects in canonical index order.
    pub const ALL: [Affect; AFFECT_COUNT] = [
        Affect::Seeking,
        Affect::Rage,
        Affect::Fear,
        Affect::Lust,
        Affect::Care,
        Affect::Panic,
        Affect::Play,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Affect> {
        Self::ALL.get(index).copied()
    }

    /// Canonical upper-case name, e.g. `"CARE"`.
    pub fn name(self) -> &'static str {
        match self {
            Affect::Seeking => "SEEKING",
            Affect::Rage => "RAGE",
            Affect::Fear => "FEAR",
            Affect::Lust => "LUST",
            Affect::Care => "CARE",
            Affect::Panic => "PANIC",
            Affect::Play => "PLAY",
        }
    }

    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|a| a.name().to_string()).collect()
    }
}

impl fmt::Display for Affect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Affect {
    type Err = AffectVectorError;

    /// Case-insensitive lookup by name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AffectVectorError::InvalidName {
                name: s.to_string(),
                valid_names: Some(Self::names()),
            })
    }
}

/// Guard against NaN and Infinity, then clamp into [0, 1].
#[inline]
fn bound(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        tracing::warn!("NaN/Inf detected in affect vector, resetting to 0.0");
        0.0
    }
}

/// A 7-dimensional affect state with every entry in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AffectVector([f32; AFFECT_COUNT]);

impl Default for AffectVector {
    fn default() -> Self {
        Self(DEFAULT_BASELINE)
    }
}

impl AffectVector {
    /// Build a vector, clamping every entry into [0, 1].
    pub fn new(values: [f32; AFFECT_COUNT]) -> Self {
        Self(values.map(bound))
    }

    pub fn zeros() -> Self {
        Self([0.0; AFFECT_COUNT])
    }

    /// Same value in every dimension.
    pub fn splat(value: f32) -> Self {
        Self::new([value; AFFECT_COUNT])
    }

    /// Strictly validated construction from an arbitrary slice.
    ///
    /// Used for construction arguments such as baselines, where a wrong shape
    /// or out-of-range value is a misconfiguration rather than noise.
    pub fn try_from_slice(values: &[f32]) -> Result<Self, AffectVectorError> {
        if values.len() != AFFECT_COUNT {
            return Err(AffectVectorError::Baseline(format!(
                "expected {} values, got {}",
                AFFECT_COUNT,
                values.len()
            )));
        }
        let mut out = [0.0; AFFECT_COUNT];
        for (i, &v) in values.iter().enumerate() {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(AffectVectorError::Value {
                    affect: Affect::ALL[i].name().to_string(),
                    value: v,
                });
            }
            out[i] = v;
        }
        Ok(Self(out))
    }

    /// Build from a name → intensity map; unnamed affects are 0.0.
    pub fn from_named(named: &HashMap<String, f32>) -> Result<Self, AffectVectorError> {
        let mut out = [0.0; AFFECT_COUNT];
        for (name, &value) in named {
            let affect: Affect = name.parse()?;
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(AffectVectorError::Value {
                    affect: affect.name().to_string(),
                    value,
                });
            }
            out[affect.index()] = value;
        }
        Ok(Self(out))
    }

    pub fn values(&self) -> &[f32; AFFECT_COUNT] {
        &self.0
    }

    pub fn get(&self, affect: Affect) -> f32 {
        self.0[affect.index()]
    }

    /// Copy with a single entry replaced.
    pub fn with(mut self, affect: Affect, value: f32) -> Self {
        self.0[affect.index()] = bound(value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Affect, f32)> + '_ {
        Affect::ALL.iter().map(move |&a| (a, self.0[a.index()]))
    }

    /// The affect with the highest value. Ties resolve to the lowest index.
    pub fn dominant(&self) -> (Affect, f32) {
        let mut best = (Affect::Seeking, self.0[0]);
        for (affect, value) in self.iter().skip(1) {
            if value > best.1 {
                best = (affect, value);
            }
        }
        best
    }

    /// The `n` strongest affects, strongest first.
    pub fn top_n(&self, n: usize) -> Vec<(Affect, f32)> {
        let mut ranked: Vec<(Affect, f32)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(n);
        ranked
    }

    /// Euclidean distance.
    pub fn distance(&self, other: &AffectVector) -> f32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }

    /// Cosine similarity; 0.0 when either vector has zero magnitude.
    pub fn similarity(&self, other: &AffectVector) -> f32 {
        let dot: f32 = self.0.iter().zip(other.0.iter()).map(|(a, b)| a * b).sum();
        let norm_a = self.0.iter().map(|v| v * v).sum::<f32>().sqrt();
        let norm_b = other.0.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot / (norm_a * norm_b)
    }
}

impl Index<Affect> for AffectVector {
    type Output = f32;

    fn index(&self, affect: Affect) -> &f32 {
        &self.0[affect.index()]
    }
}

impl From<[f32; AFFECT_COUNT]> for AffectVector {
    fn from(values: [f32; AFFECT_COUNT]) -> Self {
        Self::new(values)
    }
}

impl<'de> Deserialize<'de> for AffectVector {
    /// Accepts a flat 7-element array; bad numbers are sanitised, not rejected.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = <[f32; AFFECT_COUNT]>::deserialize(deserializer)?;
        Ok(Self::new(raw))
    }
}

impl fmt::Display for AffectVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(a, v)| format!("{}={:.2}", a, v))
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order() {
        let names: Vec<&str> = Affect::ALL.iter().map(|a| a.name()).collect();
        assert_eq!(
            names,
            vec!["SEEKING", "RAGE", "FEAR", "LUST", "CARE", "PANIC", "PLAY"]
        );
        for (i, affect) in Affect::ALL.iter().enumerate() {
            assert_eq!(affect.index(), i);
            assert_eq!(Affect::from_index(i), Some(*affect));
        }
        assert_eq!(Affect::from_index(7), None);
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("care".parse::<Affect>().unwrap(), Affect::Care);
        assert_eq!("Play".parse::<Affect>().unwrap(), Affect::Play);
        assert_eq!(" FEAR ".parse::<Affect>().unwrap(), Affect::Fear);
    }

    #[test]
    fn test_parse_unknown_lists_valid_names() {
        match "INVALID_AFFECT".parse::<Affect>() {
            Err(AffectVectorError::InvalidName { name, valid_names }) => {
                assert_eq!(name, "INVALID_AFFECT");
                assert_eq!(valid_names.unwrap().len(), 7);
            }
            other => panic!("Expected InvalidName, got {:?}", other),
        }
    }

    #[test]
    fn test_new_clamps_values() {
        let v = AffectVector::new([-0.1, 0.5, 1.5, 0.0, 0.8, -0.5, 2.0]);
        assert!(v.values().iter().all(|x| (0.0..=1.0).contains(x)));
        assert_eq!(v[Affect::Seeking], 0.0);
        assert_eq!(v[Affect::Fear], 1.0);
    }

    #[test]
    fn test_new_sanitizes_nan() {
        let v = AffectVector::new([f32::NAN, 0.5, f32::INFINITY, 0.0, 0.8, 0.1, 0.6]);
        assert_eq!(v[Affect::Seeking], 0.0);
        assert_eq!(v[Affect::Fear], 0.0);
        assert_eq!(v[Affect::Rage], 0.5);
    }

    #[test]
    fn test_dominant() {
        let v = AffectVector::new([0.3, 0.9, 0.2, 0.1, 0.5, 0.1, 0.4]);
        let (affect, value) = v.dominant();
        assert_eq!(affect, Affect::Rage);
        assert!((value - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_dominant_tie_takes_first() {
        let v = AffectVector::splat(0.5);
        assert_eq!(v.dominant().0, Affect::Seeking);
    }

    #[test]
    fn test_top_n() {
        let v = AffectVector::new([0.9, 0.1, 0.2, 0.1, 0.8, 0.1, 0.7]);
        let top = v.top_n(3);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].0, Affect::Seeking);
        assert_eq!(top[1].0, Affect::Care);
        assert_eq!(top[2].0, Affect::Play);
    }

    #[test]
    fn test_similarity() {
        let a = AffectVector::new([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let b = AffectVector::new([0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!((a.similarity(&a) - 1.0).abs() < 1e-6);
        assert!(a.similarity(&b).abs() < 1e-6);
        assert_eq!(a.similarity(&AffectVector::zeros()), 0.0);
    }

    #[test]
    fn test_distance() {
        let a = AffectVector::splat(0.5);
        let b = a.with(Affect::Care, 0.9);
        assert!((a.distance(&b) - 0.4).abs() < 1e-6);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn test_try_from_slice_rejects_wrong_length() {
        let err = AffectVector::try_from_slice(&[0.5; 5]).unwrap_err();
        assert!(matches!(err, AffectVectorError::Baseline(_)));
        assert!(err.to_string().starts_with("Invalid baseline"));
    }

    #[test]
    fn test_try_from_slice_rejects_out_of_range() {
        let err = AffectVector::try_from_slice(&[0.5, 0.5, 1.5, 0.5, 0.5, 0.5, 0.5]).unwrap_err();
        match err {
            AffectVectorError::Value { affect, value } => {
                assert_eq!(affect, "FEAR");
                assert_eq!(value, 1.5);
            }
            other => panic!("Expected Value error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_named() {
        let mut named = HashMap::new();
        named.insert("care".to_string(), 0.8);
        named.insert("PLAY".to_string(), 0.3);
        let v = AffectVector::from_named(&named).unwrap();
        assert_eq!(v[Affect::Care], 0.8);
        assert_eq!(v[Affect::Play], 0.3);
        assert_eq!(v[Affect::Rage], 0.0);

        named.insert("JOY".to_string(), 0.5);
        assert!(matches!(
            AffectVector::from_named(&named),
            Err(AffectVectorError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_from_named_rejects_negative() {
        let mut named = HashMap::new();
        named.insert("RAGE".to_string(), -0.2);
        assert!(matches!(
            AffectVector::from_named(&named),
            Err(AffectVectorError::Value { .. })
        ));
    }

    #[test]
    fn test_json_is_flat_array() {
        let v = AffectVector::new([0.5, 0.2, 0.3, 0.1, 0.9, 0.0, 0.7]);
        let json = serde_json::to_string(&v).unwrap();
        assert!(json.starts_with('['));
        let restored: AffectVector = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, v);
    }

    #[test]
    fn test_json_wrong_length_rejected() {
        let result: Result<AffectVector, _> = serde_json::from_str("[0.1, 0.2, 0.3]");
        assert!(result.is_err());
    }

    #[test]
    fn test_json_out_of_range_clamped() {
        let v: AffectVector = serde_json::from_str("[1.5, 0.2, 0.3, 0.1, 0.9, -1.0, 0.7]").unwrap();
        assert_eq!(v[Affect::Seeking], 1.0);
        assert_eq!(v[Affect::Panic], 0.0);
    }

    #[test]
    fn test_affect_serde_uppercase() {
        assert_eq!(serde_json::to_string(&Affect::Care).unwrap(), "\"CARE\"");
        let a: Affect = serde_json::from_str("\"PANIC\"").unwrap();
        assert_eq!(a, Affect::Panic);
    }
}
