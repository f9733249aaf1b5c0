use unicode_normalization::UnicodeNormalization;

/// Consecutive rejected keystrokes at a word boundary before the
/// "press space" hint is raised.
pub const SPACE_HINT_THRESHOLD: u32 = 3;

/// Canonical comparison form: lowercased, canonically decomposed, combining
/// marks stripped. Lets a learner type "arbol" for "árbol".
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect()
}

/// True iff `input` is a correct (possibly empty) prefix of `target`,
/// ignoring case and accents. Every keystroke passes through this before it
/// is allowed into the displayed input.
pub fn is_valid_partial_input(input: &str, target: &str) -> bool {
    normalize(target).starts_with(&normalize(input))
}

/// Whole-word comparison, ignoring case and accents.
pub fn compare_words(input: &str, target: &str) -> bool {
    normalize(input) == normalize(target)
}

/// True iff the next expected character of `target` after `current_input`
/// is a space.
pub fn is_next_char_space(current_input: &str, target: &str) -> bool {
    let pos = normalize(current_input).chars().count();
    normalize(target).chars().nth(pos) == Some(' ')
}

/// Counts consecutive rejected keystrokes that happen while the next
/// expected character is a space, so the UI can suggest pressing space.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpaceHintCounter {
    rejected_at_boundary: u32,
}

impl SpaceHintCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rejected keystroke. Only rejections at a space boundary
    /// count towards the hint; any other rejection breaks the streak.
    pub fn record_rejection(&mut self, at_space_boundary: bool) {
        if at_space_boundary {
            self.rejected_at_boundary = self.rejected_at_boundary.saturating_add(1);
        } else {
            self.rejected_at_boundary = 0;
        }
    }

    /// An accepted keystroke or a change of target word clears the streak.
    pub fn reset(&mut self) {
        self.rejected_at_boundary = 0;
    }

    pub fn should_hint(&self) -> bool {
        self.rejected_at_boundary >= SPACE_HINT_THRESHOLD
    }
}
