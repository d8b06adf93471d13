//! Flags quiz core
//!
//! Question generation and scoring for the flags quiz. Two question kinds
//! alternate at random: show a country name and pick its flag, or show a flag
//! and pick the country. A correct answer extends the streak; the longest
//! streak is persisted as the quiz's best score.

pub mod deck;
pub mod flags;
pub mod session;

pub use deck::Deck;
pub use flags::{FlagEntry, SpriteRect, parse_flags};
pub use session::{AnswerOutcome, Question, QuestionKind, QuizSession};

/// Number of answer options per question
pub const OPTION_COUNT: usize = 4;

/// Quiz data errors
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("Malformed flags data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Not enough flags to build a question: {0}")]
    NotEnoughFlags(usize),
}
