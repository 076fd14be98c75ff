use std::time::{Duration, Instant};

use rand::Rng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::debug;

use crate::error::TriviaError;
use crate::question::QuestionBank;
use crate::round::{GameRound, Judgement};

pub const DEFAULT_ROUNDS: u32 = 3;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;
pub const DEFAULT_CORRECT_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    Loading,
    Asking,
    Correct,
    Wrong,
    Locked,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub rounds: u32,
    pub max_attempts: u32,
    /// How long `Correct` stays up before the next round.
    pub correct_delay: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rounds: DEFAULT_ROUNDS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            correct_delay: DEFAULT_CORRECT_DELAY,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), TriviaError> {
        if self.rounds == 0 {
            return Err(TriviaError::InvalidConfig("rounds must be at least 1".into()));
        }
        if self.max_attempts == 0 {
            return Err(TriviaError::InvalidConfig(
                "max attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum ClickOutcome {
    /// The click arrived in a state that does not accept clicks.
    Ignored,
    Correct,
    Wrong { remaining: u32 },
    Locked,
}

/// Read-only view of a session for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub state: GameState,
    /// 1-based; stays at the last round in `Summary`.
    pub round: u32,
    pub total_rounds: u32,
    pub score: u32,
    pub prompt: Option<String>,
    pub attempts: u32,
    pub remaining_attempts: u32,
    /// Revealed only while `Correct`.
    pub answer: Option<String>,
    pub last_guess: Option<String>,
}

/// Fixed-length click-the-country game.
///
/// State machine:
/// - `Loading` until [`GameSession::begin`] is called with data ready.
/// - `Asking`/`Wrong` accept clicks; everything else ignores them.
/// - `Correct` advances on [`GameSession::poll`] once the delay has passed.
/// - `Locked` waits for `try_again`, `next` or `restart`.
/// - `Summary` only leaves through `restart`.
#[derive(Debug, Clone)]
pub struct GameSession<R = StdRng> {
    config: GameConfig,
    bank: QuestionBank,
    rng: R,
    state: GameState,
    round_index: u32,
    score: u32,
    round: Option<GameRound>,
    answered_at: Option<Instant>,
    last_guess: Option<String>,
}

impl<R: Rng> GameSession<R> {
    pub fn new(config: GameConfig, bank: QuestionBank, rng: R) -> Result<Self, TriviaError> {
        config.validate()?;
        Ok(Self {
            config,
            bank,
            rng,
            state: GameState::Loading,
            round_index: 0,
            score: 0,
            round: None,
            answered_at: None,
            last_guess: None,
        })
    }

    /// Leaves `Loading` once country data is available. No-op otherwise.
    pub fn begin(&mut self) {
        if self.state == GameState::Loading {
            self.start_game();
        }
    }

    pub fn click(&mut self, candidate: &str, now: Instant) -> ClickOutcome {
        if !matches!(self.state, GameState::Asking | GameState::Wrong) {
            debug!(state = ?self.state, candidate, "click ignored");
            return ClickOutcome::Ignored;
        }
        let Some(round) = self.round.as_mut() else {
            return ClickOutcome::Ignored;
        };
        self.last_guess = Some(candidate.to_string());

        match round.judge(candidate) {
            Judgement::Correct => {
                self.score += 1;
                self.state = GameState::Correct;
                self.answered_at = Some(now);
                debug!(round = self.round_index, score = self.score, "correct answer");
                ClickOutcome::Correct
            }
            Judgement::Wrong { .. } => {
                self.state = GameState::Wrong;
                ClickOutcome::Wrong {
                    remaining: round.remaining_attempts(),
                }
            }
            Judgement::Locked { attempts } => {
                self.state = GameState::Locked;
                debug!(round = self.round_index, attempts, "round locked");
                ClickOutcome::Locked
            }
        }
    }

    /// Advances past `Correct` once the display delay has elapsed.
    ///
    /// Returns `true` when the session moved on.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.state != GameState::Correct {
            return false;
        }
        let due = self
            .answered_at
            .is_none_or(|at| now.saturating_duration_since(at) >= self.config.correct_delay);
        if due {
            self.advance();
        }
        due
    }

    /// Retries a locked round with the same prompt.
    pub fn try_again(&mut self) -> bool {
        if self.state != GameState::Locked {
            return false;
        }
        if let Some(round) = self.round.as_mut() {
            round.reset_attempts();
        }
        self.last_guess = None;
        self.state = GameState::Asking;
        true
    }

    /// Skips a locked round.
    pub fn next(&mut self) -> bool {
        if self.state != GameState::Locked {
            return false;
        }
        self.advance();
        true
    }

    /// Starts over from round 1. Ignored while `Loading`.
    pub fn restart(&mut self) -> bool {
        if self.state == GameState::Loading {
            return false;
        }
        self.start_game();
        true
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn round_index(&self) -> u32 {
        self.round_index
    }

    pub fn current_round(&self) -> Option<&GameRound> {
        self.round.as_ref()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let round = self.round.as_ref();
        GameSnapshot {
            state: self.state,
            round: self.round_index,
            total_rounds: self.config.rounds,
            score: self.score,
            prompt: round.map(|r| r.question().prompt.clone()),
            attempts: round.map_or(0, GameRound::attempts),
            remaining_attempts: round.map_or(0, GameRound::remaining_attempts),
            answer: round
                .filter(|_| self.state == GameState::Correct)
                .map(|r| r.question().answer.clone()),
            last_guess: self.last_guess.clone(),
        }
    }

    fn start_game(&mut self) {
        self.score = 0;
        self.round_index = 0;
        self.advance();
    }

    fn advance(&mut self) {
        self.answered_at = None;
        self.last_guess = None;
        if self.round_index >= self.config.rounds {
            self.round = None;
            self.state = GameState::Summary;
            debug!(score = self.score, rounds = self.config.rounds, "game over");
            return;
        }
        self.round_index += 1;
        let question = self.bank.draw(&mut self.rng).clone();
        debug!(round = self.round_index, prompt = %question.prompt, "new round");
        self.round = Some(GameRound::new(question, self.config.max_attempts));
        self.state = GameState::Asking;
    }
}
