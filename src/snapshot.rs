//! Durable engine state for restarts.
//!
//! All engine state is normally in-memory only. Hosts that want continuity
//! across restarts export an `EngineSnapshot` on shutdown and load it at
//! startup. Writes go through a temp file and rename so a crash mid-write
//! never leaves a torn snapshot behind.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::streaks::StreakState;
use crate::types::{FeedId, PendingPrediction, VerificationRecord};

/// Full durable state: per-feed pending predictions and streaks, plus the
/// capped cross-feed verification log. Summaries are derived and excluded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub captured_at: DateTime<Utc>,
    pub pending: HashMap<FeedId, Vec<PendingPrediction>>,
    pub streaks: HashMap<FeedId, StreakState>,
    pub log: Vec<VerificationRecord>,
}

impl EngineSnapshot {
    /// Write the snapshot as pretty JSON, atomically.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("serializing snapshot")?;

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json)
            .with_context(|| format!("writing snapshot tmp file {:?}", tmp_path))?;
        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("renaming snapshot into place at {:?}", path))?;

        info!(
            "[SNAPSHOT] Saved {} pending feed(s), {} log record(s) to {:?}",
            self.pending.len(),
            self.log.len(),
            path
        );
        Ok(())
    }

    /// Load a snapshot if the file exists and parses; `None` means a fresh
    /// start (missing or unreadable file, logged, never fatal).
    pub fn load_from<P: AsRef<Path>>(path: P) -> Option<Self> {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => {
                info!("[SNAPSHOT] No snapshot at {:?}, starting fresh", path);
                return None;
            }
        };

        match serde_json::from_str::<Self>(&contents) {
            Ok(snapshot) => {
                info!(
                    "[SNAPSHOT] Loaded snapshot from {:?} (captured {})",
                    path, snapshot.captured_at
                );
                Some(snapshot)
            }
            Err(e) => {
                warn!("[SNAPSHOT] Failed to parse snapshot at {:?}: {}", path, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PredictionEngine;
    use crate::types::{Descriptor, DrawRecord, Label};
    use tempfile::tempdir;

    fn history(n: usize) -> Vec<DrawRecord> {
        (0..n)
            .map(|i| {
                let d = |k: usize| Some(((i * 7 + k * 3) % 10) as u8);
                DrawRecord::new(
                    format!("20250724-{:04}", i + 1),
                    [d(0), d(1), d(2), d(3), d(4)],
                )
            })
            .collect()
    }

    #[test]
    fn test_snapshot_roundtrip_through_disk() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("predictor_state.json");

        let mut engine = PredictionEngine::new();
        engine.run_cycle(&[("alpha".to_string(), history(20))]);
        let exported = engine.export_snapshot();
        assert_eq!(exported.pending.get("alpha").map(Vec::len), Some(1));

        exported.save_to(&path).expect("save");
        let loaded = EngineSnapshot::load_from(&path).expect("load");

        assert_eq!(loaded.pending, exported.pending);
        assert_eq!(loaded.streaks, exported.streaks);
        assert_eq!(loaded.log, exported.log);

        // A rebuilt engine picks up where the old one left off.
        let restored = PredictionEngine::from_snapshot(loaded);
        assert_eq!(restored.pending("alpha"), engine.pending("alpha"));
        assert_eq!(restored.streak("alpha"), engine.streak("alpha"));
    }

    #[test]
    fn test_missing_snapshot_is_none() {
        let dir = tempdir().expect("tempdir");
        assert!(EngineSnapshot::load_from(dir.path().join("absent.json")).is_none());
    }

    #[test]
    fn test_corrupt_snapshot_is_none() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").expect("write");
        assert!(EngineSnapshot::load_from(&path).is_none());
    }

    #[test]
    fn test_descriptor_text_form_in_json() {
        let snapshot = EngineSnapshot {
            captured_at: Utc::now(),
            pending: HashMap::from([(
                "alpha".to_string(),
                vec![crate::types::PendingPrediction {
                    feed: "alpha".into(),
                    target_period: "20250724-0002".into(),
                    descriptor: Descriptor {
                        position: 2,
                        label: Label::Odd,
                    },
                    probability: 0.61,
                    created_at: Utc::now(),
                    verified: false,
                }],
            )]),
            streaks: HashMap::new(),
            log: Vec::new(),
        };

        let json = serde_json::to_string(&snapshot).expect("json");
        assert!(json.contains("\"label\":\"odd\""));
        assert!(json.contains("\"target_period\":\"20250724-0002\""));
    }
}
