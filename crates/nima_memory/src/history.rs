//! Affect History - the emotional trajectory of one agent
//!
//! Every tick produces an [`AffectSnapshot`]: the vector, where it came from,
//! which affect dominated and how far it sat from the baseline. The store keeps
//! a bounded, time-limited trail of them and answers "what was I feeling, and
//! where is it heading?".
//!
//! Retention is enforced on every record by two independent policies:
//! - Age: snapshots older than `max_age_hours` are dropped
//! - Count: beyond `max_snapshots`, the oldest by insertion order go first
//!
//! With a `persist_dir` configured, the whole pruned trail is rewritten to
//! `history_<identity>.json` after every mutation (temp file + rename).

use crate::now_secs;
use nima_core::{Affect, AffectVector, HistoryConfig, NimaError, PersistOp, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Opaque key → value annotations attached to a snapshot.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// `get_state_at` only answers within this distance of the query (seconds).
pub const STATE_LOOKUP_WINDOW_SECS: f64 = 3600.0;

/// Per-snapshot slope beyond which a deviation trend counts as moving.
pub const TREND_SLOPE_THRESHOLD: f32 = 0.01;

/// One recorded affect state. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectSnapshot {
    values: AffectVector,
    /// Unix seconds with sub-second precision
    timestamp: f64,
    source: String,
    dominant: (Affect, f32),
    /// Euclidean distance from the baseline at record time
    deviation: f32,
    #[serde(default)]
    metadata: Metadata,
}

impl AffectSnapshot {
    fn capture(
        values: AffectVector,
        baseline: &AffectVector,
        source: &str,
        metadata: Metadata,
        timestamp: f64,
    ) -> Self {
        Self {
            values,
            timestamp,
            source: source.to_string(),
            dominant: values.dominant(),
            deviation: values.distance(baseline),
            metadata,
        }
    }

    pub fn values(&self) -> &AffectVector {
        &self.values
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn dominant(&self) -> (Affect, f32) {
        self.dominant
    }

    pub fn deviation(&self) -> f32 {
        self.deviation
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Records from disk are only trusted if they could have been produced here.
    fn is_well_formed(&self) -> bool {
        self.timestamp.is_finite() && self.deviation.is_finite() && self.deviation >= 0.0
    }
}

impl fmt::Display for AffectSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AffectSnapshot({}={:.2}, deviation={:.2}, source={})",
            self.dominant.0, self.dominant.1, self.deviation, self.source
        )
    }
}

/// Direction of the deviation-from-baseline trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    fn classify(slope: f32) -> Self {
        if slope > TREND_SLOPE_THRESHOLD {
            TrendDirection::Increasing
        } else if slope < -TREND_SLOPE_THRESHOLD {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        };
        f.write_str(s)
    }
}

/// Bounded, optionally persisted trail of affect snapshots.
///
/// All reads and writes go through one lock, so the store can be shared
/// between a recording path and reporting paths.
pub struct HistoryStore {
    config: HistoryConfig,
    persist_path: Option<PathBuf>,
    snapshots: Mutex<VecDeque<AffectSnapshot>>,
}

impl HistoryStore {
    /// Create a store, loading any prior trail for `identity_name`.
    ///
    /// A missing or corrupt history file yields an empty store; an invalid
    /// config or failing to create the persistence directory is an error.
    pub fn new(config: HistoryConfig) -> Result<Self> {
        config.validate()?;
        let persist_path = match &config.persist_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)
                    .map_err(|e| NimaError::persistence(dir, PersistOp::Load, e))?;
                Some(dir.join(format!("history_{}.json", config.identity_name)))
            }
            None => None,
        };

        let mut snapshots = match &persist_path {
            Some(path) => load_snapshots(path),
            None => VecDeque::new(),
        };
        let loaded = snapshots.len();
        prune(&mut snapshots, &config, now_secs());
        if loaded > 0 {
            tracing::info!(
                "Loaded {} affect snapshots for '{}' ({} kept after pruning)",
                loaded,
                config.identity_name,
                snapshots.len()
            );
        }

        Ok(Self {
            config,
            persist_path,
            snapshots: Mutex::new(snapshots),
        })
    }

    pub fn max_snapshots(&self) -> usize {
        self.config.max_snapshots
    }

    pub fn max_age_hours(&self) -> f64 {
        self.config.max_age_hours
    }

    pub fn persist_dir(&self) -> Option<&Path> {
        self.config.persist_dir.as_deref()
    }

    pub fn identity_name(&self) -> &str {
        &self.config.identity_name
    }

    /// File backing this store, if persistence is enabled.
    pub fn persist_path(&self) -> Option<&Path> {
        self.persist_path.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<AffectSnapshot>> {
        self.snapshots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a snapshot stamped with the current wall-clock time.
    pub fn record(
        &self,
        values: AffectVector,
        baseline: &AffectVector,
        source: &str,
        metadata: Metadata,
    ) -> Result<AffectSnapshot> {
        self.record_at(values, baseline, source, metadata, now_secs())
    }

    /// Record a snapshot with an explicit timestamp, then prune and flush.
    ///
    /// The snapshot stays in memory even if the flush fails; the error is
    /// still returned so the caller sees it.
    pub fn record_at(
        &self,
        values: AffectVector,
        baseline: &AffectVector,
        source: &str,
        metadata: Metadata,
        timestamp: f64,
    ) -> Result<AffectSnapshot> {
        let snapshot = AffectSnapshot::capture(values, baseline, source, metadata, timestamp);

        let mut snapshots = self.lock();
        snapshots.push_back(snapshot.clone());
        prune(&mut snapshots, &self.config, now_secs());
        tracing::trace!(
            "Recorded affect snapshot: {} ({} retained)",
            snapshot,
            snapshots.len()
        );
        self.flush(&snapshots)?;
        Ok(snapshot)
    }

    /// The snapshot closest to `timestamp`, if one lies within an hour of it.
    pub fn get_state_at(&self, timestamp: f64) -> Option<AffectSnapshot> {
        let snapshots = self.lock();
        snapshots
            .iter()
            .map(|s| ((s.timestamp - timestamp).abs(), s))
            .filter(|(distance, _)| *distance <= STATE_LOOKUP_WINDOW_SECS)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, s)| s.clone())
    }

    /// Snapshots from the trailing window, oldest first.
    ///
    /// With a `limit`, only the newest `limit` of them are returned (still in
    /// chronological order).
    pub fn get_timeline(&self, duration_hours: f64, limit: Option<usize>) -> Vec<AffectSnapshot> {
        let mut window = self.windowed(duration_hours);
        window.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        if let Some(limit) = limit {
            if window.len() > limit {
                window.drain(..window.len() - limit);
            }
        }
        window
    }

    /// `(dominant affect, its value, timestamp)` for each snapshot in the window.
    pub fn get_dominant_timeline(&self, duration_hours: f64) -> Vec<(Affect, f32, f64)> {
        self.get_timeline(duration_hours, None)
            .iter()
            .map(|s| (s.dominant.0, s.dominant.1, s.timestamp))
            .collect()
    }

    /// Least-squares slope of deviation over snapshot index, and its direction.
    ///
    /// The slope is per snapshot, not per second. Fewer than two points in the
    /// window yields `(0.0, Stable)`.
    pub fn get_deviation_trend(&self, duration_hours: f64) -> (f32, TrendDirection) {
        let deviations: Vec<f32> = self
            .windowed(duration_hours)
            .iter()
            .map(|s| s.deviation)
            .collect();
        if deviations.len() < 2 {
            return (0.0, TrendDirection::Stable);
        }
        let slope = linear_slope(&deviations);
        (slope, TrendDirection::classify(slope))
    }

    /// How often each source label occurs in the window.
    pub fn count_sources(&self, duration_hours: f64) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for snapshot in self.windowed(duration_hours) {
            *counts.entry(snapshot.source.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Drop every snapshot, and persist the empty trail so a reload stays empty.
    pub fn clear(&self) -> Result<()> {
        let mut snapshots = self.lock();
        snapshots.clear();
        self.flush(&snapshots)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshots inside the trailing window, in insertion order.
    fn windowed(&self, duration_hours: f64) -> Vec<AffectSnapshot> {
        let cutoff = now_secs() - duration_hours * 3600.0;
        self.lock()
            .iter()
            .filter(|s| s.timestamp >= cutoff)
            .cloned()
            .collect()
    }

    fn flush(&self, snapshots: &VecDeque<AffectSnapshot>) -> Result<()> {
        match &self.persist_path {
            Some(path) => write_atomic(path, snapshots),
            None => Ok(()),
        }
    }
}

impl fmt::Display for HistoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HistoryStore(snapshots={}, max={}, max_age={}h, identity={})",
            self.len(),
            self.config.max_snapshots,
            self.config.max_age_hours,
            self.config.identity_name
        )
    }
}

impl fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryStore")
            .field("config", &self.config)
            .field("persist_path", &self.persist_path)
            .field("len", &self.len())
            .finish()
    }
}

/// Age policy first, then count policy.
fn prune(snapshots: &mut VecDeque<AffectSnapshot>, config: &HistoryConfig, now: f64) {
    let cutoff = now - config.max_age_hours * 3600.0;
    snapshots.retain(|s| s.timestamp >= cutoff);
    while snapshots.len() > config.max_snapshots {
        snapshots.pop_front();
    }
}

fn linear_slope(ys: &[f32]) -> f32 {
    let n = ys.len() as f32;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = ys.iter().sum::<f32>() / n;
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in ys.iter().enumerate() {
        let dx = i as f32 - mean_x;
        num += dx * (y - mean_y);
        den += dx * dx;
    }
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Read a persisted trail. Never fails: problems are logged and yield empty.
fn load_snapshots(path: &Path) -> VecDeque<AffectSnapshot> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return VecDeque::new(),
        Err(e) => {
            tracing::warn!(
                "{}, starting with empty affect history",
                NimaError::persistence(path, PersistOp::Load, e)
            );
            return VecDeque::new();
        }
    };
    match serde_json::from_str::<Vec<AffectSnapshot>>(&content) {
        Ok(snapshots) => {
            let total = snapshots.len();
            let valid: VecDeque<AffectSnapshot> =
                snapshots.into_iter().filter(|s| s.is_well_formed()).collect();
            if valid.len() < total {
                tracing::warn!(
                    "Dropped {} malformed affect snapshots from {}",
                    total - valid.len(),
                    path.display()
                );
            }
            valid
        }
        Err(e) => {
            // Leave the corrupt file in place for inspection
            tracing::warn!(
                "{}, starting with empty affect history",
                NimaError::persistence(path, PersistOp::Load, e)
            );
            VecDeque::new()
        }
    }
}

/// Rewrite `path` through a temp file in the same directory and a rename.
fn write_atomic(path: &Path, snapshots: &VecDeque<AffectSnapshot>) -> Result<()> {
    let json = serde_json::to_vec(snapshots)
        .map_err(|e| NimaError::persistence(path, PersistOp::Save, e))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "history.json".to_string());
    let tmp = path.with_file_name(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

    let written = std::fs::write(&tmp, &json).and_then(|_| std::fs::rename(&tmp, path));
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp);
        return Err(NimaError::persistence(path, PersistOp::Save, e));
    }
    Ok(())
}
