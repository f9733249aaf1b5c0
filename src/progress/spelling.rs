use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::curriculum::{Curriculum, CurriculumItem, LevelId};
use crate::progress::store::KvStore;
use crate::progress::{percentage, LevelStats};

pub const PROGRESS_KEY: &str = "palabritas_progress";

/// Persisted spelling progress. Serialized with camelCase keys so records
/// written by older installs keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurriculumProgress {
    pub current_level: LevelId,
    pub current_word_index: usize,
    pub completed_words: BTreeMap<LevelId, BTreeSet<usize>>,
}

impl Default for CurriculumProgress {
    fn default() -> Self {
        Self {
            current_level: LevelId::Nivel1,
            current_word_index: 0,
            completed_words: LevelId::ALL
                .iter()
                .map(|l| (*l, BTreeSet::new()))
                .collect(),
        }
    }
}

/// Loose mirror of the persisted record. Every field is optional and level
/// keys are plain strings; restore validates field by field and drops what
/// it cannot use instead of rejecting the whole record.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawProgress {
    current_level: Option<String>,
    current_word_index: Option<usize>,
    completed_words: Option<BTreeMap<String, Vec<usize>>>,
}

/// Tracks which words are done, which level is active, and which levels are
/// unlocked. Owns the curriculum it reports on and persists every mutation.
#[derive(Debug)]
pub struct CurriculumTracker<S: KvStore> {
    curriculum: Curriculum,
    progress: CurriculumProgress,
    store: S,
    unlock_all: bool,
}

impl<S: KvStore> CurriculumTracker<S> {
    pub fn new(curriculum: Curriculum, store: S, unlock_all: bool) -> Self {
        let progress = restore(&curriculum, &store);
        Self {
            curriculum,
            progress,
            store,
            unlock_all,
        }
    }

    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    pub fn progress(&self) -> &CurriculumProgress {
        &self.progress
    }

    pub fn current_level(&self) -> LevelId {
        self.progress.current_level
    }

    pub fn current_word_index(&self) -> usize {
        self.progress.current_word_index
    }

    pub fn current_item(&self) -> Option<&CurriculumItem> {
        self.curriculum
            .item(self.progress.current_level, self.progress.current_word_index)
    }

    pub fn is_word_completed(&self, level: LevelId, index: usize) -> bool {
        self.progress
            .completed_words
            .get(&level)
            .map_or(false, |set| set.contains(&index))
    }

    /// Record a word as done. Completing the same word again, or an index
    /// outside the level, changes nothing.
    pub fn mark_word_completed(&mut self, level: LevelId, index: usize) {
        if index >= self.curriculum.items(level).len() {
            return;
        }
        let inserted = self
            .progress
            .completed_words
            .entry(level)
            .or_default()
            .insert(index);
        if inserted {
            self.persist();
        }
    }

    fn completed_count(&self, level: LevelId) -> usize {
        self.progress
            .completed_words
            .get(&level)
            .map_or(0, |set| set.len())
    }

    pub fn is_level_complete(&self, level: LevelId) -> bool {
        self.completed_count(level) >= self.curriculum.items(level).len()
    }

    /// The first level is always unlocked; each later level unlocks when
    /// the one before it is complete. `unlock_all` overrides the chain.
    pub fn is_level_unlocked(&self, level: LevelId) -> bool {
        if self.unlock_all {
            return true;
        }
        match level.prev() {
            None => true,
            Some(prev) => self.is_level_complete(prev),
        }
    }

    pub fn level_stats(&self, level: LevelId) -> LevelStats {
        let total = self.curriculum.items(level).len();
        let completed = self.completed_count(level);
        LevelStats {
            completed,
            total,
            percentage: percentage(completed, total),
        }
    }

    /// Switch to a level and rewind to its first word. Selecting a locked
    /// level is ignored.
    pub fn set_current_level(&mut self, level: LevelId) {
        if !self.is_level_unlocked(level) {
            return;
        }
        self.progress.current_level = level;
        self.progress.current_word_index = 0;
        self.persist();
    }

    /// Move to a word within the current level. Callers keep the index in
    /// range; the tracker does not second-guess navigation.
    pub fn set_current_word_index(&mut self, index: usize) {
        self.progress.current_word_index = index;
        self.persist();
    }

    pub fn first_incomplete_index(&self, level: LevelId) -> Option<usize> {
        (0..self.curriculum.items(level).len()).find(|i| !self.is_word_completed(level, *i))
    }

    /// Back to a fresh state: first level, first word, nothing completed,
    /// and the persisted record erased.
    pub fn reset_progress(&mut self) {
        self.progress = CurriculumProgress::default();
        let _ = self.store.remove(PROGRESS_KEY);
    }

    fn persist(&self) {
        let json = serde_json::to_string(&self.progress).unwrap_or_default();
        let _ = self.store.set(PROGRESS_KEY, &json);
    }
}

fn restore<S: KvStore>(curriculum: &Curriculum, store: &S) -> CurriculumProgress {
    let mut progress = CurriculumProgress::default();
    let raw: RawProgress = match store.get(PROGRESS_KEY) {
        Some(text) => serde_json::from_str(&text).unwrap_or_default(),
        None => return progress,
    };
    if let Some(completed) = raw.completed_words {
        for (name, indices) in completed {
            if let Some(level) = LevelId::from_name(&name) {
                let len = curriculum.items(level).len();
                progress
                    .completed_words
                    .entry(level)
                    .or_default()
                    .extend(indices.into_iter().filter(|i| *i < len));
            }
        }
    }
    if let Some(level) = raw.current_level.as_deref().and_then(LevelId::from_name) {
        progress.current_level = level;
    }
    if let Some(index) = raw.current_word_index {
        if index < curriculum.items(progress.current_level).len() {
            progress.current_word_index = index;
        }
    }
    progress
}
