use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::arithmetic::MathExercise;
use crate::curriculum::LevelId;
use crate::progress::store::KvStore;
use crate::session::{MathPhase, SpellingPhase};
use crate::{App, GameMode};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl<S: KvStore> Widget for &App<S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // level bar
                Constraint::Min(1),    // game body
                Constraint::Length(2), // toggles + key legend
            ])
            .split(area);

        let zen = self.prefs.zen_mode();

        if !zen {
            let bar = match self.mode {
                GameMode::Spelling => spelling_level_bar(self),
                GameMode::Math => math_level_bar(self),
            };
            Paragraph::new(bar)
                .alignment(Alignment::Center)
                .render(chunks[0], buf);
        }

        let body = match self.mode {
            GameMode::Spelling => spelling_body(self),
            GameMode::Math => math_body(self),
        };
        // long sentences in the later levels may not fit on one line
        let needs_wrap = self.mode == GameMode::Spelling
            && self
                .spelling
                .tracker()
                .current_item()
                .map_or(false, |item| item.text.width() as u16 > chunks[1].width);
        render_body(body, needs_wrap, chunks[1], buf);

        if !zen || self.confirm_reset {
            Paragraph::new(footer_lines(self))
                .alignment(Alignment::Center)
                .render(chunks[2], buf);
        }
    }
}

fn render_body(lines: Vec<Line<'static>>, wrap: bool, area: Rect, buf: &mut Buffer) {
    let height = lines.len() as u16;
    let top = area.height.saturating_sub(height) / 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(top), Constraint::Min(1)])
        .split(area);

    let mut paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    if wrap {
        paragraph = paragraph.wrap(Wrap { trim: true });
    }
    paragraph.render(chunks[1], buf);
}

fn spelling_body<S: KvStore>(app: &App<S>) -> Vec<Line<'static>> {
    let zen = app.prefs.zen_mode();
    let tracker = app.spelling.tracker();
    let stats = tracker.level_stats(tracker.current_level());
    let item = match tracker.current_item() {
        Some(item) => item.clone(),
        None => return Vec::new(),
    };

    match app.spelling.phase() {
        SpellingPhase::Typing => {
            let typed = app.spelling.input().chars().count();
            let mut lines = Vec::new();
            if !zen {
                lines.push(Line::from(Span::raw(item.media_key.clone())));
                lines.push(Line::from(""));
            }
            lines.push(Line::from(target_spans(&item.text, typed)));
            lines.push(Line::from(""));
            lines.push(Line::from(input_spans(app)));
            lines.push(hint_line(app));
            if !zen {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!("{} / {}", stats.completed, stats.total),
                    bold_style(),
                )));
            }
            lines
        }
        SpellingPhase::Success => vec![
            Line::from(Span::raw(item.media_key.clone())),
            Line::from(""),
            Line::from(Span::styled("¡Muy bien!".to_string(), green_bold_style())),
            Line::from(""),
            Line::from(Span::styled(item.text.clone(), green_bold_style())),
        ],
        SpellingPhase::LevelComplete => {
            let number = tracker.current_level().number();
            vec![
                Line::from(Span::styled(
                    format!("¡Nivel {number} completado!"),
                    yellow_bold_style(),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    format!("{} / {}", stats.completed, stats.total),
                    bold_style(),
                )),
                Line::from(""),
                Line::from(Span::styled("(enter) continuar".to_string(), italic_style())),
            ]
        }
    }
}

fn math_body<S: KvStore>(app: &App<S>) -> Vec<Line<'static>> {
    let zen = app.prefs.zen_mode();
    let tracker = app.math.tracker();
    let stats = tracker.level_stats(tracker.current_level_index());
    let exercise = match app.math.exercise() {
        Some(exercise) => exercise.clone(),
        None => return Vec::new(),
    };

    match app.math.phase() {
        MathPhase::Answering | MathPhase::Reveal => {
            let mut lines = vec![
                Line::from(Span::styled(exercise.prompt(), bold_style())),
                Line::from(""),
                Line::from(dot_spans(&exercise)),
                Line::from(""),
                Line::from(option_spans(app, &exercise)),
            ];
            if !zen {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!("{} / {}", stats.completed, stats.total),
                    bold_style(),
                )));
            }
            lines
        }
        MathPhase::Success => vec![
            Line::from(Span::styled("¡Correcto!".to_string(), green_bold_style())),
            Line::from(""),
            Line::from(Span::styled(
                format!("{} = {}", exercise.prompt(), exercise.correct_answer),
                bold_style(),
            )),
        ],
        MathPhase::LevelComplete => {
            let label = tracker
                .current_level()
                .map(|level| level.label.clone())
                .unwrap_or_default();
            vec![
                Line::from(Span::styled(
                    "¡Nivel completado!".to_string(),
                    yellow_bold_style(),
                )),
                Line::from(""),
                Line::from(Span::styled(label, bold_style())),
                Line::from(""),
                Line::from(Span::styled("(enter) continuar".to_string(), italic_style())),
            ]
        }
    }
}

/// The target word with the accepted prefix in green, the next expected
/// char underlined, and the rest dimmed.
fn target_spans(target: &str, typed: usize) -> Vec<Span<'static>> {
    target
        .chars()
        .enumerate()
        .map(|(idx, c)| {
            let text = c.to_string();
            if idx < typed {
                Span::styled(text, green_bold_style())
            } else if idx == typed {
                Span::styled(text, underlined_dim_bold_style())
            } else {
                Span::styled(text, dim_bold_style())
            }
        })
        .collect()
}

fn input_spans<S: KvStore>(app: &App<S>) -> Vec<Span<'static>> {
    let mut spans = vec![Span::styled(
        app.spelling.input().to_string(),
        green_bold_style(),
    )];
    if let Some(c) = app.spelling.error_char() {
        let shown = match c {
            ' ' => "·".to_string(),
            c => c.to_string(),
        };
        spans.push(Span::styled(shown, red_bold_style()));
    }
    spans.push(Span::styled("_".to_string(), dim_bold_style()));
    spans
}

/// Kept in the layout even when empty so the body does not jump around.
fn hint_line<S: KvStore>(app: &App<S>) -> Line<'static> {
    if app.spelling.show_space_hint() {
        Line::from(Span::styled(
            "pulsa espacio para separar las palabras".to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        ))
    } else {
        Line::from("")
    }
}

fn dot_spans(exercise: &MathExercise) -> Vec<Span<'static>> {
    vec![
        Span::styled(
            "●".repeat(exercise.operand_a as usize),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(format!("  {}  ", exercise.operation.symbol())),
        Span::styled(
            "●".repeat(exercise.operand_b as usize),
            Style::default().fg(Color::Cyan),
        ),
    ]
}

fn option_spans<S: KvStore>(app: &App<S>, exercise: &MathExercise) -> Vec<Span<'static>> {
    let reveal = app.math.phase() == MathPhase::Reveal;
    let mut spans = Vec::new();
    for (idx, value) in exercise.options.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw("   "));
        }
        let style = if reveal && *value == exercise.correct_answer {
            green_bold_style()
        } else if app.math.wrong_option() == Some(idx) {
            red_bold_style()
        } else if reveal {
            dim_bold_style()
        } else {
            bold_style()
        };
        spans.push(Span::styled(format!("{}) {}", idx + 1, value), style));
    }
    spans
}

fn spelling_level_bar<S: KvStore>(app: &App<S>) -> Line<'static> {
    let tracker = app.spelling.tracker();
    let mut spans = vec![Span::styled("niveles".to_string(), dim_style())];
    for level in LevelId::ALL {
        spans.push(Span::raw("  "));
        let mut label = level.number().to_string();
        if tracker.is_level_complete(level) {
            label.push('✓');
        }
        spans.push(Span::styled(
            label,
            level_style(
                level == tracker.current_level(),
                tracker.is_level_unlocked(level),
            ),
        ));
    }
    Line::from(spans)
}

fn math_level_bar<S: KvStore>(app: &App<S>) -> Line<'static> {
    let tracker = app.math.tracker();
    let mut spans = vec![Span::styled("niveles".to_string(), dim_style())];
    for index in 0..tracker.levels().len() {
        spans.push(Span::raw("  "));
        let mut label = (index + 1).to_string();
        if tracker.is_level_complete(index) {
            label.push('✓');
        }
        spans.push(Span::styled(
            label,
            level_style(
                index == tracker.current_level_index(),
                tracker.is_level_unlocked(index),
            ),
        ));
    }
    Line::from(spans)
}

fn level_style(current: bool, unlocked: bool) -> Style {
    if current {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else if unlocked {
        bold_style()
    } else {
        dim_style()
    }
}

fn footer_lines<S: KvStore>(app: &App<S>) -> Vec<Line<'static>> {
    let toggles = format!(
        "(ctrl+s) sonido: {}   (ctrl+n) letras: {}   (ctrl+z) zen: {}",
        on_off(app.prefs.sound()),
        on_off(app.prefs.letter_narration()),
        on_off(app.prefs.zen_mode()),
    );
    let legend = match app.mode {
        GameMode::Spelling => "(f1-f7) nivel / (←→) palabra / (tab) cuentas / (esc) salir",
        GameMode::Math => "(1-3) responder / (f1-f3) nivel / (tab) palabras / (esc) salir",
    };
    let legend_line = if app.confirm_reset {
        Line::from(Span::styled(
            "ctrl+r de nuevo para borrar el progreso".to_string(),
            red_bold_style(),
        ))
    } else {
        Line::from(Span::styled(legend.to_string(), italic_style()))
    };
    vec![Line::from(Span::styled(toggles, dim_style())), legend_line]
}

fn on_off(value: bool) -> &'static str {
    if value {
        "sí"
    } else {
        "no"
    }
}

fn bold_style() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn green_bold_style() -> Style {
    bold_style().fg(Color::Green)
}

fn red_bold_style() -> Style {
    bold_style().fg(Color::Red)
}

fn yellow_bold_style() -> Style {
    bold_style().fg(Color::Yellow)
}

fn dim_style() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn dim_bold_style() -> Style {
    bold_style().add_modifier(Modifier::DIM)
}

fn underlined_dim_bold_style() -> Style {
    dim_bold_style().add_modifier(Modifier::UNDERLINED)
}

fn italic_style() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}
