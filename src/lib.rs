// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod arithmetic;
pub mod curriculum;
pub mod matching;
pub mod practice_log;
pub mod prefs;
pub mod progress;
pub mod runtime;
pub mod session;

/// Milliseconds between runtime ticks; session countdowns are measured in
/// these units.
pub const TICK_RATE_MS: u64 = 100;
