//! Named baseline archetypes.
//!
//! An archetype is a ready-made resting state for an agent's personality.
//! Hosts can use one directly or nudge individual affects with modifiers.

use crate::affect::{Affect, AffectVector};
use crate::error::NimaError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Archetype {
    Guardian,
    Explorer,
    Trickster,
    Stoic,
    Empath,
    Warrior,
    Sage,
    Nurturer,
    Rebel,
    Sentinel,
}

impl Archetype {
    pub const ALL: [Archetype; 10] = [
        Archetype::Guardian,
        Archetype::Explorer,
        Archetype::Trickster,
        Archetype::Stoic,
        Archetype::Empath,
        Archetype::Warrior,
        Archetype::Sage,
        Archetype::Nurturer,
        Archetype::Rebel,
        Archetype::Sentinel,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Archetype::Guardian => "guardian",
            Archetype::Explorer => "explorer",
            Archetype::Trickster => "trickster",
            Archetype::Stoic => "stoic",
            Archetype::Empath => "empath",
            Archetype::Warrior => "warrior",
            Archetype::Sage => "sage",
            Archetype::Nurturer => "nurturer",
            Archetype::Rebel => "rebel",
            Archetype::Sentinel => "sentinel",
        }
    }

    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|a| a.name().to_string()).collect()
    }

    /// Short operator-facing summary.
    pub fn description(self) -> &'static str {
        match self {
            Archetype::Guardian => "Protective, alert, caring",
            Archetype::Explorer => "Curious, adventurous, open",
            Archetype::Trickster => "Playful, mischievous, witty",
            Archetype::Stoic => "Calm, measured, even-tempered",
            Archetype::Empath => "Sensitive, warm, attuned to others",
            Archetype::Warrior => "Bold, driven, quick to defend",
            Archetype::Sage => "Wise, reflective, knowledge-seeking",
            Archetype::Nurturer => "Devoted, gentle, deeply caring",
            Archetype::Rebel => "Independent, defiant, energetic",
            Archetype::Sentinel => "Vigilant, cautious, watchful",
        }
    }

    /// Resting state in canonical order.
    pub fn baseline(self) -> AffectVector {
        //                          SEEK  RAGE  FEAR  LUST  CARE  PANIC PLAY
        let values = match self {
            Archetype::Guardian => [0.5, 0.2, 0.3, 0.1, 0.8, 0.2, 0.3],
            Archetype::Explorer => [0.8, 0.1, 0.2, 0.1, 0.4, 0.1, 0.5],
            Archetype::Trickster => [0.6, 0.1, 0.1, 0.2, 0.3, 0.1, 0.8],
            Archetype::Stoic => [0.3, 0.1, 0.1, 0.1, 0.3, 0.1, 0.2],
            Archetype::Empath => [0.4, 0.1, 0.2, 0.1, 0.9, 0.3, 0.4],
            Archetype::Warrior => [0.6, 0.4, 0.2, 0.2, 0.4, 0.1, 0.3],
            Archetype::Sage => [0.7, 0.1, 0.1, 0.1, 0.5, 0.1, 0.3],
            Archetype::Nurturer => [0.4, 0.1, 0.2, 0.1, 0.95, 0.2, 0.5],
            Archetype::Rebel => [0.7, 0.4, 0.1, 0.3, 0.3, 0.1, 0.6],
            Archetype::Sentinel => [0.4, 0.3, 0.5, 0.1, 0.4, 0.2, 0.2],
        };
        AffectVector::new(values)
    }

    /// Baseline with additive per-affect modifiers, clamped to [0, 1].
    pub fn baseline_with(self, modifiers: &BTreeMap<Affect, f32>) -> AffectVector {
        modifiers
            .iter()
            .fold(self.baseline(), |acc, (&affect, &delta)| {
                acc.with(affect, acc[affect] + delta)
            })
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Archetype {
    type Err = NimaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| NimaError::UnknownArchetype {
                name: s.to_string(),
                available: Self::names(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guardian_baseline() {
        let b = Archetype::Guardian.baseline();
        assert!((b[Affect::Care] - 0.8).abs() < 1e-6);
        assert!((b[Affect::Play] - 0.3).abs() < 1e-6);
        assert_eq!(b.dominant().0, Affect::Care);
    }

    #[test]
    fn test_archetype_character() {
        assert!(Archetype::Trickster.baseline()[Affect::Play] >= 0.7);
        let stoic = Archetype::Stoic.baseline();
        assert!(stoic.values().iter().sum::<f32>() / 7.0 <= 0.4);
        assert!(Archetype::Empath.baseline()[Affect::Care] >= 0.8);
        assert!(Archetype::Nurturer.baseline()[Affect::Care] >= 0.8);
        assert!(Archetype::Warrior.baseline()[Affect::Rage] >= 0.2);
        let sentinel = Archetype::Sentinel.baseline();
        assert!(sentinel[Affect::Fear] >= 0.2 || sentinel[Affect::Panic] >= 0.2);
        assert!(Archetype::Explorer.baseline()[Affect::Seeking] >= 0.7);
        let guardian_fear = Archetype::Guardian.baseline()[Affect::Fear];
        assert!((0.1..=0.5).contains(&guardian_fear));
    }

    #[test]
    fn test_every_archetype_listed_and_parsable() {
        let names = Archetype::names();
        for expected in [
            "guardian", "explorer", "trickster", "stoic", "empath", "warrior", "sage", "nurturer",
            "rebel", "sentinel",
        ] {
            assert!(names.contains(&expected.to_string()));
            let parsed: Archetype = expected.to_uppercase().parse().unwrap();
            assert_eq!(parsed.name(), expected);
            assert!(!parsed.description().is_empty());
        }
        assert_eq!(Archetype::Guardian.description(), "Protective, alert, caring");
    }

    #[test]
    fn test_modifiers_are_additive() {
        let mut modifiers = BTreeMap::new();
        modifiers.insert(Affect::Play, 0.2);
        modifiers.insert(Affect::Fear, -0.05);
        let b = Archetype::Explorer.baseline_with(&modifiers);
        assert!((b[Affect::Play] - 0.7).abs() < 1e-6);
        assert!((b[Affect::Fear] - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_modifiers_clamp() {
        let mut modifiers = BTreeMap::new();
        modifiers.insert(Affect::Seeking, 0.9);
        modifiers.insert(Affect::Rage, -0.9);
        let b = Archetype::Explorer.baseline_with(&modifiers);
        assert_eq!(b[Affect::Seeking], 1.0);
        assert_eq!(b[Affect::Rage], 0.0);
    }

    #[test]
    fn test_parse() {
        assert_eq!("Guardian".parse::<Archetype>().unwrap(), Archetype::Guardian);
        match "badarch".parse::<Archetype>() {
            Err(NimaError::UnknownArchetype { name, available }) => {
                assert_eq!(name, "badarch");
                assert_eq!(available.len(), 10);
            }
            other => panic!("Expected UnknownArchetype, got {:?}", other),
        }
    }
}
