use crate::arithmetic::{self, MathExercise, MathLevelConfig};
use crate::curriculum::{Curriculum, LevelId};
use crate::matching::{self, SpaceHintCounter};
use crate::progress::math::MathTracker;
use crate::progress::spelling::CurriculumTracker;
use crate::progress::store::KvStore;
use crate::TICK_RATE_MS;

const fn duration_ticks(ms: u64) -> u32 {
    (ms / TICK_RATE_MS) as u32
}

/// How long the success screen stays up after a completed word or exercise.
pub const SUCCESS_TICKS: u32 = duration_ticks(1500);
/// How long the correct option stays highlighted before the success screen.
pub const REVEAL_TICKS: u32 = duration_ticks(700);
/// How long a rejected keystroke or wrong option stays flagged.
pub const FLASH_TICKS: u32 = duration_ticks(600);
/// How long the arithmetic level-complete screen waits before moving on.
pub const LEVEL_COMPLETE_TICKS: u32 = duration_ticks(3000);

/// Discrete inputs dispatched into a session. Events that do not apply to
/// the current mode or phase are silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Key(char),
    Backspace,
    NextWord,
    PrevWord,
    SelectLevel(LevelId),
    SelectMathLevel(usize),
    Answer(usize),
    Continue,
    Reset,
}

/// Outcomes surfaced to the shell for feedback and logging. The char on the
/// keystroke variants is the key as the child pressed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    CorrectKeystroke(char),
    WrongKeystroke(char),
    WordCompleted,
    LevelCompleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpellingPhase {
    Typing,
    Success,
    LevelComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathPhase {
    Answering,
    Reveal,
    Success,
    LevelComplete,
}

/// A scheduled phase change. It stays in its slot until the countdown runs
/// out; if a user event superseded it in the meantime the generation no
/// longer matches and the expiry is discarded.
#[derive(Debug, Clone, Copy)]
struct PendingAdvance {
    ticks_left: u32,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MathStep {
    FinishReveal,
    FinishSuccess,
    ContinueLevel,
}

#[derive(Debug, Clone, Copy)]
struct PendingStep {
    step: MathStep,
    ticks_left: u32,
    generation: u64,
}

#[derive(Debug, Clone, Copy)]
struct ErrorFlash {
    char: char,
    ticks_left: u32,
}

#[derive(Debug, Clone, Copy)]
struct WrongFlash {
    index: usize,
    ticks_left: u32,
}

/// Spelling mode: the child types the displayed word, one gated keystroke
/// at a time. All timing runs on session ticks fed by the runtime.
#[derive(Debug)]
pub struct SpellingSession<S: KvStore> {
    tracker: CurriculumTracker<S>,
    input: String,
    phase: SpellingPhase,
    error_flash: Option<ErrorFlash>,
    space_hint: SpaceHintCounter,
    pending: Option<PendingAdvance>,
    generation: u64,
}

impl<S: KvStore> SpellingSession<S> {
    pub fn new(curriculum: Curriculum, store: S, unlock_all: bool) -> Self {
        Self {
            tracker: CurriculumTracker::new(curriculum, store, unlock_all),
            input: String::new(),
            phase: SpellingPhase::Typing,
            error_flash: None,
            space_hint: SpaceHintCounter::new(),
            pending: None,
            generation: 0,
        }
    }

    pub fn tracker(&self) -> &CurriculumTracker<S> {
        &self.tracker
    }

    pub fn phase(&self) -> SpellingPhase {
        self.phase
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// The rejected key currently flashing, if any.
    pub fn error_char(&self) -> Option<char> {
        self.error_flash.map(|flash| flash.char)
    }

    pub fn show_space_hint(&self) -> bool {
        self.space_hint.should_hint()
    }

    pub fn handle(&mut self, event: SessionEvent) -> Vec<Signal> {
        match event {
            SessionEvent::Key(c) => self.on_key(c),
            SessionEvent::Backspace => {
                self.on_backspace();
                Vec::new()
            }
            SessionEvent::NextWord => self.next_word(),
            SessionEvent::PrevWord => {
                self.previous_word();
                Vec::new()
            }
            SessionEvent::SelectLevel(level) => {
                self.select_level(level);
                Vec::new()
            }
            SessionEvent::Continue => {
                self.continue_after_level();
                Vec::new()
            }
            SessionEvent::Reset => {
                self.reset();
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// Advance countdowns by one tick. Expired timers only take effect when
    /// their generation still matches.
    pub fn on_tick(&mut self) -> Vec<Signal> {
        if let Some(mut flash) = self.error_flash.take() {
            flash.ticks_left = flash.ticks_left.saturating_sub(1);
            if flash.ticks_left > 0 {
                self.error_flash = Some(flash);
            }
        }
        if let Some(mut pending) = self.pending.take() {
            pending.ticks_left = pending.ticks_left.saturating_sub(1);
            if pending.ticks_left > 0 {
                self.pending = Some(pending);
            } else if pending.generation == self.generation {
                return self.finish_success();
            }
        }
        Vec::new()
    }

    fn on_key(&mut self, c: char) -> Vec<Signal> {
        if self.phase != SpellingPhase::Typing {
            return Vec::new();
        }
        let target = match self.tracker.current_item() {
            Some(item) => item.text.clone(),
            None => return Vec::new(),
        };
        let mut candidate = self.input.clone();
        candidate.push(c);
        if !matching::is_valid_partial_input(&candidate, &target) {
            self.space_hint
                .record_rejection(matching::is_next_char_space(&self.input, &target));
            self.error_flash = Some(ErrorFlash {
                char: c,
                ticks_left: FLASH_TICKS,
            });
            return vec![Signal::WrongKeystroke(c)];
        }
        self.input = candidate;
        self.error_flash = None;
        self.space_hint.reset();
        let mut signals = vec![Signal::CorrectKeystroke(c)];
        if matching::compare_words(&self.input, &target) {
            let level = self.tracker.current_level();
            let index = self.tracker.current_word_index();
            self.tracker.mark_word_completed(level, index);
            self.phase = SpellingPhase::Success;
            self.pending = Some(PendingAdvance {
                ticks_left: SUCCESS_TICKS,
                generation: self.generation,
            });
            signals.push(Signal::WordCompleted);
        }
        signals
    }

    fn on_backspace(&mut self) {
        if self.phase != SpellingPhase::Typing {
            return;
        }
        self.input.pop();
        self.space_hint.reset();
    }

    /// The success screen ran its course: either raise the level-complete
    /// screen or move to the next word, staying put at the end of the level.
    fn finish_success(&mut self) -> Vec<Signal> {
        if self.phase != SpellingPhase::Success {
            return Vec::new();
        }
        self.input.clear();
        self.space_hint.reset();
        let level = self.tracker.current_level();
        if self.tracker.is_level_complete(level) {
            self.phase = SpellingPhase::LevelComplete;
            return vec![Signal::LevelCompleted];
        }
        let index = self.tracker.current_word_index();
        if index + 1 < self.tracker.curriculum().items(level).len() {
            self.tracker.set_current_word_index(index + 1);
        }
        self.phase = SpellingPhase::Typing;
        Vec::new()
    }

    fn next_word(&mut self) -> Vec<Signal> {
        if self.phase == SpellingPhase::LevelComplete {
            return Vec::new();
        }
        let level = self.tracker.current_level();
        let index = self.tracker.current_word_index();
        if index + 1 < self.tracker.curriculum().items(level).len() {
            self.go_to_word(index + 1);
        } else if self.tracker.is_level_complete(level) {
            self.supersede();
            self.input.clear();
            self.phase = SpellingPhase::LevelComplete;
            return vec![Signal::LevelCompleted];
        } else if let Some(first) = self.tracker.first_incomplete_index(level) {
            self.go_to_word(first);
        }
        Vec::new()
    }

    fn previous_word(&mut self) {
        if self.phase == SpellingPhase::LevelComplete {
            return;
        }
        let index = self.tracker.current_word_index();
        if index > 0 {
            self.go_to_word(index - 1);
        }
    }

    fn select_level(&mut self, level: LevelId) {
        if !self.tracker.is_level_unlocked(level) {
            return;
        }
        self.supersede();
        self.tracker.set_current_level(level);
        self.input.clear();
        self.phase = SpellingPhase::Typing;
    }

    /// Leave the level-complete screen: on to the next level, or back to
    /// the first one after the final level.
    fn continue_after_level(&mut self) {
        if self.phase != SpellingPhase::LevelComplete {
            return;
        }
        self.supersede();
        let level = self.tracker.current_level();
        match level.next() {
            Some(next) => self.tracker.set_current_level(next),
            None => self.tracker.set_current_level(LevelId::Nivel1),
        }
        self.input.clear();
        self.phase = SpellingPhase::Typing;
    }

    fn reset(&mut self) {
        self.supersede();
        self.tracker.reset_progress();
        self.input.clear();
        self.phase = SpellingPhase::Typing;
    }

    fn go_to_word(&mut self, index: usize) {
        self.supersede();
        self.tracker.set_current_word_index(index);
        self.input.clear();
        self.phase = SpellingPhase::Typing;
    }

    fn supersede(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.error_flash = None;
        self.space_hint.reset();
    }
}

/// Arithmetic mode: pick the right answer out of three. A correct answer
/// first highlights itself, then celebrates, then the next exercise comes
/// up; finishing a level raises a screen that moves on by itself.
#[derive(Debug)]
pub struct MathSession<S: KvStore> {
    tracker: MathTracker<S>,
    exercise: Option<MathExercise>,
    phase: MathPhase,
    wrong_option: Option<WrongFlash>,
    level_just_completed: bool,
    pending: Option<PendingStep>,
    generation: u64,
}

impl<S: KvStore> MathSession<S> {
    pub fn new(levels: Vec<MathLevelConfig>, store: S, unlock_all: bool) -> Self {
        let mut session = Self {
            tracker: MathTracker::new(levels, store, unlock_all),
            exercise: None,
            phase: MathPhase::Answering,
            wrong_option: None,
            level_just_completed: false,
            pending: None,
            generation: 0,
        };
        session.regenerate();
        session
    }

    pub fn tracker(&self) -> &MathTracker<S> {
        &self.tracker
    }

    pub fn phase(&self) -> MathPhase {
        self.phase
    }

    pub fn exercise(&self) -> Option<&MathExercise> {
        self.exercise.as_ref()
    }

    /// The option index currently flagged as a wrong pick, if any.
    pub fn wrong_option(&self) -> Option<usize> {
        self.wrong_option.map(|flash| flash.index)
    }

    pub fn handle(&mut self, event: SessionEvent) -> Vec<Signal> {
        match event {
            SessionEvent::Answer(index) => self.answer(index),
            SessionEvent::SelectMathLevel(index) => {
                self.select_level(index);
                Vec::new()
            }
            SessionEvent::Continue => {
                self.continue_after_level();
                Vec::new()
            }
            SessionEvent::Reset => {
                self.reset();
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    pub fn on_tick(&mut self) -> Vec<Signal> {
        if let Some(mut flash) = self.wrong_option.take() {
            flash.ticks_left = flash.ticks_left.saturating_sub(1);
            if flash.ticks_left > 0 {
                self.wrong_option = Some(flash);
            }
        }
        if let Some(mut pending) = self.pending.take() {
            pending.ticks_left = pending.ticks_left.saturating_sub(1);
            if pending.ticks_left > 0 {
                self.pending = Some(pending);
            } else if pending.generation == self.generation {
                return self.advance(pending.step);
            }
        }
        Vec::new()
    }

    fn answer(&mut self, option_index: usize) -> Vec<Signal> {
        if self.phase != MathPhase::Answering {
            return Vec::new();
        }
        let (value, correct_answer) = match &self.exercise {
            Some(ex) => match ex.options.get(option_index) {
                Some(v) => (*v, ex.correct_answer),
                None => return Vec::new(),
            },
            None => return Vec::new(),
        };
        let key = (b'1' + option_index as u8) as char;
        if value != correct_answer {
            self.wrong_option = Some(WrongFlash {
                index: option_index,
                ticks_left: FLASH_TICKS,
            });
            return vec![Signal::WrongKeystroke(key)];
        }
        self.wrong_option = None;
        let index = self.tracker.current_level_index();
        let stats = self.tracker.level_stats(index);
        let was_complete = stats.completed >= stats.total;
        self.level_just_completed = !was_complete && stats.completed + 1 >= stats.total;
        self.tracker.increment_completed();
        self.phase = MathPhase::Reveal;
        self.pending = Some(PendingStep {
            step: MathStep::FinishReveal,
            ticks_left: REVEAL_TICKS,
            generation: self.generation,
        });
        vec![Signal::CorrectKeystroke(key), Signal::WordCompleted]
    }

    fn advance(&mut self, step: MathStep) -> Vec<Signal> {
        match step {
            MathStep::FinishReveal => {
                self.phase = MathPhase::Success;
                self.pending = Some(PendingStep {
                    step: MathStep::FinishSuccess,
                    ticks_left: SUCCESS_TICKS,
                    generation: self.generation,
                });
                Vec::new()
            }
            MathStep::FinishSuccess => {
                if self.level_just_completed {
                    self.level_just_completed = false;
                    self.phase = MathPhase::LevelComplete;
                    self.pending = Some(PendingStep {
                        step: MathStep::ContinueLevel,
                        ticks_left: LEVEL_COMPLETE_TICKS,
                        generation: self.generation,
                    });
                    vec![Signal::LevelCompleted]
                } else {
                    self.regenerate();
                    self.phase = MathPhase::Answering;
                    Vec::new()
                }
            }
            MathStep::ContinueLevel => {
                self.continue_level();
                Vec::new()
            }
        }
    }

    fn select_level(&mut self, index: usize) {
        if index == self.tracker.current_level_index() {
            return;
        }
        if !self.tracker.is_level_unlocked(index) {
            return;
        }
        self.supersede();
        self.tracker.set_current_level_index(index);
        self.level_just_completed = false;
        self.regenerate();
        self.phase = MathPhase::Answering;
    }

    fn continue_after_level(&mut self) {
        if self.phase != MathPhase::LevelComplete {
            return;
        }
        self.continue_level();
    }

    /// Past the level-complete screen: the next level if there is one,
    /// otherwise more of the last level.
    fn continue_level(&mut self) {
        self.supersede();
        let index = self.tracker.current_level_index();
        if index + 1 < self.tracker.levels().len() {
            self.tracker.set_current_level_index(index + 1);
        }
        self.regenerate();
        self.phase = MathPhase::Answering;
    }

    fn reset(&mut self) {
        self.supersede();
        self.tracker.reset_progress();
        self.level_just_completed = false;
        self.regenerate();
        self.phase = MathPhase::Answering;
    }

    fn regenerate(&mut self) {
        self.exercise = self
            .tracker
            .current_level()
            .map(|level| arithmetic::generate_exercise(level, &mut rand::thread_rng()));
        self.wrong_option = None;
    }

    fn supersede(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.wrong_option = None;
    }
}
