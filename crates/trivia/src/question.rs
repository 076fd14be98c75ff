use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::error::TriviaError;

#[rustfmt::skip]
pub const DEMONYM_QUESTIONS: &[(&str, &str)] = &[
    ("Which country do Filipinos live?", "Philippines"),
    ("Where do Japanese live?", "Japan"),
    ("Which country do Brazilians live?", "Brazil"),
    ("Which country do Egyptians live?", "Egypt"),
    ("Which country do Canadians live?", "Canada"),
    ("Where do French people live?", "France"),
    ("Which country do Indians live?", "India"),
];

/// A prompt answered by clicking one country on the globe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub prompt: String,
    /// Country common name.
    pub answer: String,
}

impl Question {
    pub fn new(prompt: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            answer: answer.into(),
        }
    }

    /// Exact comparison after lowercasing; no fuzzy matching.
    pub fn is_answer(&self, candidate: &str) -> bool {
        candidate.to_lowercase() == self.answer.to_lowercase()
    }
}

#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Result<Self, TriviaError> {
        if questions.is_empty() {
            return Err(TriviaError::EmptyBank);
        }
        Ok(Self { questions })
    }

    pub fn demonyms() -> Self {
        Self {
            questions: DEMONYM_QUESTIONS
                .iter()
                .map(|(prompt, answer)| Question::new(*prompt, *answer))
                .collect(),
        }
    }

    /// Uniform draw; repeats across rounds are allowed.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> &Question {
        // `new` rejects empty banks.
        self.questions
            .choose(rng)
            .unwrap_or(&self.questions[0])
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::demonyms()
    }
}

#[cfg(test)]
mod tests {
    use super::{Question, QuestionBank};
    use crate::error::TriviaError;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn answer_ignores_case_only() {
        let q = Question::new("Which country do Canadians live?", "Canada");
        assert!(q.is_answer("canada"));
        assert!(q.is_answer("CANADA"));
        assert!(!q.is_answer("Canad"));
        assert!(!q.is_answer("Canada "));
    }

    #[test]
    fn empty_bank_is_rejected() {
        assert_eq!(QuestionBank::new(Vec::new()).unwrap_err(), TriviaError::EmptyBank);
    }

    #[test]
    fn draws_come_from_the_bank() {
        let bank = QuestionBank::demonyms();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let q = bank.draw(&mut rng);
            assert!(bank.questions().contains(q));
        }
    }
}
