pub mod math;
pub mod spelling;
pub mod store;

/// Completion stats for one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelStats {
    pub completed: usize,
    pub total: usize,
    pub percentage: u32,
}

impl LevelStats {
    pub fn empty() -> Self {
        LevelStats {
            completed: 0,
            total: 0,
            percentage: 0,
        }
    }
}

pub(crate) fn percentage(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u32
}
