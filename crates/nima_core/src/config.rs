use crate::affect::{Affect, AffectVector, DEFAULT_BASELINE};
use crate::archetype::Archetype;
use crate::error::{NimaError, Result as NimaResult};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NimaConfig {
    pub history: HistoryConfig,
    pub correlation: CorrelationConfig,
    pub tracker: TrackerConfig,
    pub baseline: BaselineSpec,
    /// Named baseline presets selectable at startup.
    pub profiles: BTreeMap<String, BaselineSpec>,
}

impl NimaConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let config: NimaConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.validate()?;
        Ok(config)
    }

    /// Try to load from path; if the file is missing or invalid, return defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({:#}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Reject values that would make the stores misbehave.
    pub fn validate(&self) -> NimaResult<()> {
        self.history.validate()?;
        check_capacity("correlation.window_size", self.correlation.window_size)
    }

    /// Resolve the baseline, optionally through a named profile.
    pub fn resolve_baseline(&self, profile: Option<&str>) -> NimaResult<AffectVector> {
        match profile {
            None => self.baseline.resolve(),
            Some(name) => match self.profiles.get(name) {
                Some(spec) => spec.resolve(),
                None => Err(NimaError::ProfileNotFound {
                    name: name.to_string(),
                    available: self.profiles.keys().cloned().collect(),
                }),
            },
        }
    }
}

/// Upper bound for `max_snapshots` and `window_size`.
pub const MAX_CAPACITY: usize = 100_000;

fn check_capacity(field: &str, value: usize) -> NimaResult<()> {
    if value == 0 || value > MAX_CAPACITY {
        return Err(NimaError::Config(format!(
            "{} must be between 1 and {}, got {}",
            field, MAX_CAPACITY, value
        )));
    }
    Ok(())
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Cap on retained snapshots.
    pub max_snapshots: usize,
    /// Retention horizon in hours.
    pub max_age_hours: f64,
    /// Directory for the flat-file snapshot store. `None` disables persistence.
    pub persist_dir: Option<PathBuf>,
    /// Distinguishes this agent's persisted file from others in the same dir.
    pub identity_name: String,
}

impl HistoryConfig {
    pub fn validate(&self) -> NimaResult<()> {
        if !self.max_age_hours.is_finite() || self.max_age_hours <= 0.0 {
            return Err(NimaError::Config(format!(
                "history.max_age_hours must be positive, got {}",
                self.max_age_hours
            )));
        }
        let identity = self.identity_name.trim();
        if identity.is_empty() {
            return Err(NimaError::Config(
                "history.identity_name must not be empty".to_string(),
            ));
        }
        // The identity becomes part of a file name inside persist_dir
        if identity.contains(&['/', '\\'][..]) || identity == "." || identity == ".." {
            return Err(NimaError::Config(format!(
                "history.identity_name must not contain path separators, got '{}'",
                self.identity_name
            )));
        }
        check_capacity("history.max_snapshots", self.max_snapshots)
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_snapshots: 1000,
            max_age_hours: 168.0, // one week
            persist_dir: None,
            identity_name: "agent".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    /// Capacity of the transition window.
    pub window_size: usize,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self { window_size: 100 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Run cross-affect suppression on every tick.
    pub cross_affect: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self { cross_affect: true }
    }
}

/// Where a baseline comes from: explicit values or an archetype plus modifiers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BaselineSpec {
    Values(Vec<f32>),
    Archetype {
        archetype: String,
        #[serde(default)]
        modifiers: BTreeMap<String, f32>,
    },
}

impl Default for BaselineSpec {
    fn default() -> Self {
        BaselineSpec::Values(DEFAULT_BASELINE.to_vec())
    }
}

impl BaselineSpec {
    pub fn resolve(&self) -> NimaResult<AffectVector> {
        match self {
            BaselineSpec::Values(values) => Ok(AffectVector::try_from_slice(values)?),
            BaselineSpec::Archetype {
                archetype,
                modifiers,
            } => {
                let archetype: Archetype = archetype.parse()?;
                let mut parsed = BTreeMap::new();
                for (name, delta) in modifiers {
                    let affect: Affect = name.parse()?;
                    parsed.insert(affect, *delta);
                }
                Ok(archetype.baseline_with(&parsed))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
