use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::arithmetic::MathLevelConfig;
use crate::progress::store::KvStore;
use crate::progress::{percentage, LevelStats};

pub const MATH_PROGRESS_KEY: &str = "matematicas_progress";

/// Persisted arithmetic progress: the active level and a raw completion
/// count per level id. Counts are not capped on write; reads clamp them
/// to the level target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MathProgress {
    pub current_level_index: usize,
    pub completed_per_level: BTreeMap<String, u32>,
}

impl Default for MathProgress {
    fn default() -> Self {
        Self {
            current_level_index: 0,
            completed_per_level: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawMathProgress {
    current_level_index: Option<usize>,
    completed_per_level: Option<BTreeMap<String, u32>>,
}

/// Tracks arithmetic completion counts against a level table.
#[derive(Debug)]
pub struct MathTracker<S: KvStore> {
    levels: Vec<MathLevelConfig>,
    progress: MathProgress,
    store: S,
    unlock_all: bool,
}

impl<S: KvStore> MathTracker<S> {
    pub fn new(levels: Vec<MathLevelConfig>, store: S, unlock_all: bool) -> Self {
        let progress = restore(&levels, &store);
        Self {
            levels,
            progress,
            store,
            unlock_all,
        }
    }

    pub fn levels(&self) -> &[MathLevelConfig] {
        &self.levels
    }

    pub fn level(&self, index: usize) -> Option<&MathLevelConfig> {
        self.levels.get(index)
    }

    pub fn progress(&self) -> &MathProgress {
        &self.progress
    }

    pub fn current_level_index(&self) -> usize {
        self.progress.current_level_index
    }

    pub fn current_level(&self) -> Option<&MathLevelConfig> {
        self.levels.get(self.progress.current_level_index)
    }

    fn completed_raw(&self, id: &str) -> u32 {
        self.progress.completed_per_level.get(id).copied().unwrap_or(0)
    }

    /// Stats with the completed count clamped to the level target, so a
    /// count that ran past the target still reads as exactly done. An index
    /// outside the table reads as empty.
    pub fn level_stats(&self, index: usize) -> LevelStats {
        match self.levels.get(index) {
            Some(level) => {
                let total = level.target_exercises as usize;
                let completed = (self.completed_raw(&level.id) as usize).min(total);
                LevelStats {
                    completed,
                    total,
                    percentage: percentage(completed, total),
                }
            }
            None => LevelStats::empty(),
        }
    }

    pub fn is_level_complete(&self, index: usize) -> bool {
        match self.levels.get(index) {
            Some(level) => self.completed_raw(&level.id) >= level.target_exercises,
            None => false,
        }
    }

    pub fn is_level_unlocked(&self, index: usize) -> bool {
        if self.levels.get(index).is_none() {
            return false;
        }
        if self.unlock_all {
            return true;
        }
        index == 0 || self.is_level_complete(index - 1)
    }

    /// Count one more solved exercise on the current level. Ignored when
    /// the current index points outside the table.
    pub fn increment_completed(&mut self) {
        let id = match self.current_level() {
            Some(level) => level.id.clone(),
            None => return,
        };
        *self.progress.completed_per_level.entry(id).or_insert(0) += 1;
        self.persist();
    }

    /// Switch the active level. Callers gate on `is_level_unlocked`.
    pub fn set_current_level_index(&mut self, index: usize) {
        self.progress.current_level_index = index;
        self.persist();
    }

    pub fn reset_progress(&mut self) {
        self.progress = MathProgress::default();
        let _ = self.store.remove(MATH_PROGRESS_KEY);
    }

    fn persist(&self) {
        let json = serde_json::to_string(&self.progress).unwrap_or_default();
        let _ = self.store.set(MATH_PROGRESS_KEY, &json);
    }
}

fn restore<S: KvStore>(levels: &[MathLevelConfig], store: &S) -> MathProgress {
    let mut progress = MathProgress::default();
    let raw: RawMathProgress = match store.get(MATH_PROGRESS_KEY) {
        Some(text) => serde_json::from_str(&text).unwrap_or_default(),
        None => return progress,
    };
    if let Some(completed) = raw.completed_per_level {
        progress.completed_per_level = completed
            .into_iter()
            .filter(|(id, _)| levels.iter().any(|l| l.id == *id))
            .collect();
    }
    if let Some(index) = raw.current_level_index {
        if index < levels.len() {
            progress.current_level_index = index;
        }
    }
    progress
}
