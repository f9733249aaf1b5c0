use rand::seq::SliceRandom;
use rand::Rng;

/// Answer buttons shown per exercise.
pub const OPTION_COUNT: usize = 3;

/// Offsets tried around the correct answer when building distractors, in
/// order of preference. Negative candidates are skipped.
const DISTRACTOR_OFFSETS: [i64; 6] = [1, -1, 2, -2, 3, -3];

/// Displays as the Spanish operation name, e.g. in the --list-levels table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, strum_macros::Display)]
pub enum MathOperation {
    #[strum(serialize = "sumas")]
    Addition,
    #[strum(serialize = "restas")]
    Subtraction,
}

impl MathOperation {
    pub fn symbol(self) -> char {
        match self {
            MathOperation::Addition => '+',
            MathOperation::Subtraction => '−',
        }
    }
}

/// One arithmetic level: which operation it drills, how large results may
/// get, and how many exercises complete it.
#[derive(Debug, Clone)]
pub struct MathLevelConfig {
    pub id: String,
    pub label: String,
    pub operation: MathOperation,
    pub max_result: u32,
    pub target_exercises: u32,
}

impl MathLevelConfig {
    /// The level table embedded in the binary, ordered easiest first.
    pub fn builtin() -> Vec<MathLevelConfig> {
        vec![
            MathLevelConfig {
                id: "sumas-5".into(),
                label: "Nivel 1 - Sumas hasta 5".into(),
                operation: MathOperation::Addition,
                max_result: 5,
                target_exercises: 10,
            },
            MathLevelConfig {
                id: "sumas-10".into(),
                label: "Nivel 2 - Sumas hasta 10".into(),
                operation: MathOperation::Addition,
                max_result: 10,
                target_exercises: 15,
            },
            MathLevelConfig {
                id: "restas".into(),
                label: "Nivel 3 - Restas simples".into(),
                operation: MathOperation::Subtraction,
                max_result: 10,
                target_exercises: 15,
            },
        ]
    }
}

/// A generated exercise with its shuffled answer options. Options always
/// contain the correct answer exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathExercise {
    pub operand_a: u32,
    pub operand_b: u32,
    pub operation: MathOperation,
    pub correct_answer: u32,
    pub options: Vec<u32>,
}

impl MathExercise {
    /// The exercise as shown to the child, e.g. "2 + 3".
    pub fn prompt(&self) -> String {
        format!(
            "{} {} {}",
            self.operand_a,
            self.operation.symbol(),
            self.operand_b
        )
    }
}

/// Generate a fresh exercise for a level. Operands are positive, results
/// stay within `max_result`, and subtractions never go below 1.
pub fn generate_exercise(level: &MathLevelConfig, rng: &mut impl Rng) -> MathExercise {
    let max_result = level.max_result.max(2);
    let (operand_a, operand_b) = match level.operation {
        MathOperation::Addition => {
            let a = rng.gen_range(1..=max_result - 1);
            let b = rng.gen_range(1..=max_result - a);
            (a, b)
        }
        MathOperation::Subtraction => {
            let a = rng.gen_range(2..=max_result);
            let b = rng.gen_range(1..=a - 1);
            (a, b)
        }
    };
    let correct_answer = match level.operation {
        MathOperation::Addition => operand_a + operand_b,
        MathOperation::Subtraction => operand_a - operand_b,
    };
    MathExercise {
        operand_a,
        operand_b,
        operation: level.operation,
        correct_answer,
        options: answer_options(correct_answer, rng),
    }
}

fn answer_options(correct: u32, rng: &mut impl Rng) -> Vec<u32> {
    let mut options = vec![correct];
    for offset in DISTRACTOR_OFFSETS {
        if options.len() >= OPTION_COUNT {
            break;
        }
        let candidate = correct as i64 + offset;
        if candidate < 0 {
            continue;
        }
        let candidate = candidate as u32;
        if !options.contains(&candidate) {
            options.push(candidate);
        }
    }
    options.shuffle(rng);
    options
}
