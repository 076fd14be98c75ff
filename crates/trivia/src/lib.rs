//! Trivia engine: the click-the-country game and the multiple-choice quiz.
//!
//! Nothing here owns a clock or a thread; callers pass `Instant`s in and
//! hold one session per player.

pub mod error;
pub mod question;
pub mod quiz;
pub mod round;
pub mod session;

pub use error::TriviaError;
pub use question::{DEMONYM_QUESTIONS, Question, QuestionBank};
pub use quiz::{
    ALL_KINDS, DEFAULT_QUIZ_ROUNDS, OPTION_COUNT, QuizCountry, QuizKind, QuizQuestion,
    QuizSession, QuizSnapshot, QuizState,
};
pub use round::{GameRound, Judgement};
pub use session::{
    ClickOutcome, DEFAULT_CORRECT_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_ROUNDS, GameConfig,
    GameSession, GameSnapshot, GameState,
};
