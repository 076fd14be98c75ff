use crate::question::Question;

/// Result of judging one click against the round's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Judgement {
    Correct,
    /// Miss with attempts left.
    Wrong { attempts: u32 },
    /// Miss that used the last attempt.
    Locked { attempts: u32 },
}

/// One prompt and its attempt counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRound {
    question: Question,
    attempts: u32,
    max_attempts: u32,
    resolved: bool,
}

impl GameRound {
    pub fn new(question: Question, max_attempts: u32) -> Self {
        Self {
            question,
            attempts: 0,
            max_attempts: max_attempts.max(1),
            resolved: false,
        }
    }

    /// Judges a candidate. Callers must not judge a resolved or locked round.
    pub fn judge(&mut self, candidate: &str) -> Judgement {
        if self.question.is_answer(candidate) {
            self.resolved = true;
            return Judgement::Correct;
        }
        self.attempts += 1;
        if self.attempts >= self.max_attempts {
            Judgement::Locked {
                attempts: self.attempts,
            }
        } else {
            Judgement::Wrong {
                attempts: self.attempts,
            }
        }
    }

    pub fn reset_attempts(&mut self) {
        self.attempts = 0;
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn remaining_attempts(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts)
    }

    pub fn is_locked(&self) -> bool {
        !self.resolved && self.attempts >= self.max_attempts
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }
}
