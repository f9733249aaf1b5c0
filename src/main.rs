pub mod app_dirs;
pub mod arithmetic;
pub mod curriculum;
pub mod matching;
pub mod practice_log;
pub mod prefs;
pub mod progress;
pub mod runtime;
pub mod session;
pub mod ui;

use crate::{
    arithmetic::MathLevelConfig,
    curriculum::{Curriculum, LevelId},
    practice_log::PracticeEntry,
    prefs::Preferences,
    progress::store::{FileKvStore, KvStore},
    runtime::{CrosstermEventSource, FixedTicker, GameEvent, Runner},
    session::{MathSession, SessionEvent, Signal, SpellingSession},
};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use itertools::Itertools;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
};

const TICK_RATE_MS: u64 = 100;

const UNLOCK_ALL_ENV: &str = "PALABRITAS_UNLOCK_ALL";

/// spelling and arithmetic games for early readers, in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Two games for kids learning to read and count: copy-type Spanish words and sentences one accepted keystroke at a time, and pick the right answer to small additions and subtractions. Levels unlock in order and progress is saved between runs."
)]
pub struct Cli {
    /// game to start in
    #[clap(short = 'm', long, value_enum, default_value_t = GameMode::Spelling)]
    mode: GameMode,

    /// unlock every level regardless of saved progress
    #[clap(long)]
    unlock_all: bool,

    /// print the level tables and exit
    #[clap(long)]
    list_levels: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum GameMode {
    Spelling,
    Math,
}

impl GameMode {
    /// Name used in persisted records and the practice log.
    pub fn log_name(self) -> &'static str {
        match self {
            GameMode::Spelling => "palabritas",
            GameMode::Math => "matematicas",
        }
    }

    pub fn other(self) -> Self {
        match self {
            GameMode::Spelling => GameMode::Math,
            GameMode::Math => GameMode::Spelling,
        }
    }
}

/// Both game sessions plus the shared preferences. Only the active mode
/// receives key events; ticks always reach both so scheduled phase changes
/// keep running across a mode switch.
#[derive(Debug)]
pub struct App<S: KvStore> {
    pub spelling: SpellingSession<S>,
    pub math: MathSession<S>,
    pub prefs: Preferences<S>,
    pub mode: GameMode,
    pub confirm_reset: bool,
}

impl App<FileKvStore> {
    pub fn new(cli: &Cli) -> Self {
        let unlock_all = cli.unlock_all || env_unlock_all();
        Self::with_store(FileKvStore::new(), cli.mode, unlock_all)
    }
}

impl<S: KvStore + Clone> App<S> {
    pub fn with_store(store: S, mode: GameMode, unlock_all: bool) -> Self {
        Self {
            spelling: SpellingSession::new(Curriculum::builtin(), store.clone(), unlock_all),
            math: MathSession::new(MathLevelConfig::builtin(), store.clone(), unlock_all),
            prefs: Preferences::new(store),
            mode,
            confirm_reset: false,
        }
    }
}

impl<S: KvStore> App<S> {
    pub fn on_tick(&mut self) {
        let signals = self.spelling.on_tick();
        self.record(GameMode::Spelling, &signals);
        let signals = self.math.on_tick();
        self.record(GameMode::Math, &signals);
    }

    /// Returns false when the key asks to leave the app.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return self.handle_control_key(key.code);
        }
        self.confirm_reset = false;
        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Tab => self.mode = self.mode.other(),
            KeyCode::Enter => self.dispatch(SessionEvent::Continue),
            KeyCode::Backspace => self.dispatch(SessionEvent::Backspace),
            KeyCode::Left => self.dispatch(SessionEvent::PrevWord),
            KeyCode::Right => self.dispatch(SessionEvent::NextWord),
            KeyCode::F(slot) => self.select_level(slot),
            KeyCode::Char(c) => match self.mode {
                GameMode::Spelling => self.dispatch(SessionEvent::Key(c)),
                GameMode::Math => {
                    if let Some(digit) = c.to_digit(10) {
                        if digit >= 1 {
                            self.dispatch(SessionEvent::Answer(digit as usize - 1));
                        }
                    }
                }
            },
            _ => {}
        }
        true
    }

    fn handle_control_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('c') => return false,
            // reset wants a second ctrl+r before it erases anything
            KeyCode::Char('r') => {
                if self.confirm_reset {
                    self.confirm_reset = false;
                    self.dispatch(SessionEvent::Reset);
                } else {
                    self.confirm_reset = true;
                }
                return true;
            }
            KeyCode::Char('s') => self.prefs.toggle_sound(),
            KeyCode::Char('n') => self.prefs.toggle_letter_narration(),
            KeyCode::Char('z') => self.prefs.toggle_zen_mode(),
            _ => {}
        }
        self.confirm_reset = false;
        true
    }

    fn dispatch(&mut self, event: SessionEvent) {
        let signals = match self.mode {
            GameMode::Spelling => self.spelling.handle(event),
            GameMode::Math => self.math.handle(event),
        };
        self.record(self.mode, &signals);
    }

    /// F1..F7 pick a spelling level, F1..F3 an arithmetic one. The sessions
    /// ignore locked or unknown levels on their own.
    fn select_level(&mut self, slot: u8) {
        if slot == 0 {
            return;
        }
        let index = slot as usize - 1;
        match self.mode {
            GameMode::Spelling => {
                if let Some(level) = LevelId::ALL.get(index).copied() {
                    self.dispatch(SessionEvent::SelectLevel(level));
                }
            }
            GameMode::Math => self.dispatch(SessionEvent::SelectMathLevel(index)),
        }
    }

    /// Practice history: one row per completed word, one per answered
    /// exercise. Spelling typos are feedback on screen, not history.
    fn record(&self, mode: GameMode, signals: &[Signal]) {
        for signal in signals {
            let entry = match (mode, signal) {
                (GameMode::Spelling, Signal::WordCompleted) => {
                    // the word index only advances once the success screen
                    // resolves, so the current item is the completed one
                    self.spelling
                        .tracker()
                        .current_item()
                        .map(|item| PracticeEntry {
                            mode: mode.log_name().to_string(),
                            level: self.spelling.tracker().current_level().to_string(),
                            item: item.text.clone(),
                            outcome: "correct".to_string(),
                        })
                }
                (GameMode::Math, Signal::WordCompleted) => self.math_entry("correct"),
                (GameMode::Math, Signal::WrongKeystroke(_)) => self.math_entry("wrong"),
                _ => None,
            };
            if let Some(entry) = entry {
                let _ = practice_log::append_entry(&entry);
            }
        }
    }

    fn math_entry(&self, outcome: &str) -> Option<PracticeEntry> {
        let exercise = self.math.exercise()?;
        let level = self.math.tracker().current_level()?;
        Some(PracticeEntry {
            mode: GameMode::Math.log_name().to_string(),
            level: level.id.clone(),
            item: exercise.prompt(),
            outcome: outcome.to_string(),
        })
    }
}

fn env_unlock_all() -> bool {
    std::env::var(UNLOCK_ALL_ENV).map_or(false, |value| value == "true")
}

/// The level tables as printed by --list-levels.
fn level_table() -> String {
    let curriculum = Curriculum::builtin();
    let mut lines: Vec<String> = vec!["palabritas:".to_string()];
    for level in curriculum.levels() {
        lines.push(format!(
            "  {}  {} ({}): {}",
            level.id,
            level.title,
            level.items.len(),
            level.items.iter().map(|item| item.text.as_str()).join(", ")
        ));
    }
    lines.push("matematicas:".to_string());
    for level in MathLevelConfig::builtin() {
        lines.push(format!(
            "  {}  {} ({} hasta {}, {} ejercicios)",
            level.id, level.label, level.operation, level.max_result, level.target_exercises
        ));
    }
    lines.join("\n")
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.list_levels {
        println!("{}", level_table());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&cli);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend, S: KvStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            GameEvent::Tick => app.on_tick(),
            GameEvent::Resize => {}
            GameEvent::Key(key) => {
                if !app.handle_key(key) {
                    return Ok(());
                }
            }
        }
    }
}
