//! Multiple-choice quiz over the country list: capitals, regions and flags.

use formats::CountryAttributes;
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TriviaError;

pub const OPTION_COUNT: usize = 4;
pub const DEFAULT_QUIZ_ROUNDS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizKind {
    CapitalOf,
    RegionOf,
    FlagOf,
}

pub const ALL_KINDS: [QuizKind; 3] = [QuizKind::CapitalOf, QuizKind::RegionOf, QuizKind::FlagOf];

/// The subset of a country the quiz asks about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizCountry {
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub flag: Option<String>,
}

impl From<&CountryAttributes> for QuizCountry {
    fn from(a: &CountryAttributes) -> Self {
        let non_empty = |s: &str| Some(s.to_string()).filter(|s| !s.trim().is_empty());
        Self {
            name: a.common_name().to_string(),
            capital: a.first_capital().and_then(non_empty),
            region: non_empty(&a.region),
            flag: a.flag.as_deref().and_then(non_empty),
        }
    }
}

impl QuizCountry {
    /// The value a question of `kind` asks for, when the country has one.
    fn fact(&self, kind: QuizKind) -> Option<&str> {
        match kind {
            QuizKind::CapitalOf => self.capital.as_deref(),
            QuizKind::RegionOf => self.region.as_deref(),
            QuizKind::FlagOf => self.flag.as_ref().map(|_| self.name.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub kind: QuizKind,
    pub prompt: String,
    /// Image URL for flag questions.
    pub flag: Option<String>,
    pub options: Vec<String>,
    #[serde(skip)]
    pub correct_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizState {
    Asking,
    Answered,
    Summary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSnapshot {
    pub state: QuizState,
    pub round: u32,
    pub total_rounds: u32,
    pub score: u32,
    pub question: Option<QuizQuestion>,
    pub selected: Option<usize>,
    /// Revealed once the round is answered.
    pub correct_index: Option<usize>,
}

/// Multiple-choice quiz: `Asking -> Answered -> Asking ... -> Summary`.
#[derive(Debug, Clone)]
pub struct QuizSession<R = StdRng> {
    countries: Vec<QuizCountry>,
    kinds: Vec<QuizKind>,
    rounds: u32,
    rng: R,
    state: QuizState,
    round: u32,
    score: u32,
    question: Option<QuizQuestion>,
    selected: Option<usize>,
}

impl<R: Rng> QuizSession<R> {
    /// Keeps only the kinds the country list can fill with
    /// [`OPTION_COUNT`] distinct options; errors when none remain.
    pub fn new(
        countries: Vec<QuizCountry>,
        kinds: &[QuizKind],
        rounds: u32,
        rng: R,
    ) -> Result<Self, TriviaError> {
        if rounds == 0 {
            return Err(TriviaError::InvalidConfig("rounds must be at least 1".into()));
        }
        let usable: Vec<QuizKind> = kinds
            .iter()
            .copied()
            .filter(|&k| distinct_facts(&countries, k) >= OPTION_COUNT)
            .collect();
        if usable.is_empty() {
            return Err(TriviaError::TooFewCountries {
                found: countries.len(),
            });
        }

        let mut session = Self {
            countries,
            kinds: usable,
            rounds,
            rng,
            state: QuizState::Asking,
            round: 1,
            score: 0,
            question: None,
            selected: None,
        };
        session.question = Some(session.make_question());
        Ok(session)
    }

    /// Answers the current question. `None` when not asking or out of range.
    pub fn select(&mut self, option: usize) -> Option<bool> {
        if self.state != QuizState::Asking {
            return None;
        }
        let question = self.question.as_ref()?;
        if option >= question.options.len() {
            return None;
        }
        let correct = option == question.correct_index;
        if correct {
            self.score += 1;
        }
        self.selected = Some(option);
        self.state = QuizState::Answered;
        Some(correct)
    }

    pub fn next(&mut self) -> bool {
        if self.state != QuizState::Answered {
            return false;
        }
        self.selected = None;
        if self.round >= self.rounds {
            self.question = None;
            self.state = QuizState::Summary;
            debug!(score = self.score, rounds = self.rounds, "quiz over");
            return true;
        }
        self.round += 1;
        self.question = Some(self.make_question());
        self.state = QuizState::Asking;
        true
    }

    pub fn restart(&mut self) {
        self.round = 1;
        self.score = 0;
        self.selected = None;
        self.question = Some(self.make_question());
        self.state = QuizState::Asking;
    }

    pub fn state(&self) -> QuizState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn question(&self) -> Option<&QuizQuestion> {
        self.question.as_ref()
    }

    pub fn snapshot(&self) -> QuizSnapshot {
        QuizSnapshot {
            state: self.state,
            round: self.round,
            total_rounds: self.rounds,
            score: self.score,
            question: self.question.clone(),
            selected: self.selected,
            correct_index: self
                .question
                .as_ref()
                .filter(|_| self.state == QuizState::Answered)
                .map(|q| q.correct_index),
        }
    }

    fn make_question(&mut self) -> QuizQuestion {
        // `new` guarantees at least one usable kind.
        let kind = *self.kinds.choose(&mut self.rng).unwrap_or(&QuizKind::RegionOf);
        let pool: Vec<&QuizCountry> = self
            .countries
            .iter()
            .filter(|c| c.fact(kind).is_some())
            .collect();
        let base = pool[self.rng.gen_range(0..pool.len())];
        let answer = base.fact(kind).unwrap_or_default();

        let mut wrongs: Vec<&str> = pool
            .iter()
            .filter_map(|c| c.fact(kind))
            .filter(|f| *f != answer)
            .collect();
        wrongs.sort_unstable();
        wrongs.dedup();
        wrongs.shuffle(&mut self.rng);
        wrongs.truncate(OPTION_COUNT - 1);

        let mut options: Vec<String> = wrongs.into_iter().map(str::to_string).collect();
        options.push(answer.to_string());
        options.shuffle(&mut self.rng);
        let correct_index = options.iter().position(|o| o == answer).unwrap_or(0);

        let (prompt, flag) = match kind {
            QuizKind::CapitalOf => (format!("What is the capital of {}?", base.name), None),
            QuizKind::RegionOf => (format!("Which region does {} belong to?", base.name), None),
            QuizKind::FlagOf => (
                "Which country does this flag belong to?".to_string(),
                base.flag.clone(),
            ),
        };
        QuizQuestion {
            kind,
            prompt,
            flag,
            options,
            correct_index,
        }
    }
}

fn distinct_facts(countries: &[QuizCountry], kind: QuizKind) -> usize {
    let mut facts: Vec<&str> = countries.iter().filter_map(|c| c.fact(kind)).collect();
    facts.sort_unstable();
    facts.dedup();
    facts.len()
}

#[cfg(test)]
mod tests {
    use super::{ALL_KINDS, OPTION_COUNT, QuizCountry, QuizKind, QuizSession, QuizState};
    use crate::error::TriviaError;
    use formats::builtin_countries;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn countries() -> Vec<QuizCountry> {
        builtin_countries().iter().map(QuizCountry::from).collect()
    }

    #[test]
    fn questions_have_four_distinct_options_with_one_answer() {
        let mut quiz = QuizSession::new(
            countries(),
            &[QuizKind::CapitalOf, QuizKind::RegionOf],
            50,
            StdRng::seed_from_u64(11),
        )
        .unwrap();
        for _ in 0..50 {
            let q = quiz.question().unwrap().clone();
            assert_eq!(q.options.len(), OPTION_COUNT);
            let mut dedup = q.options.clone();
            dedup.sort();
            dedup.dedup();
            assert_eq!(dedup.len(), OPTION_COUNT);
            assert!(q.correct_index < OPTION_COUNT);
            quiz.select(q.correct_index);
            quiz.next();
        }
        assert_eq!(quiz.state(), QuizState::Summary);
        assert_eq!(quiz.score(), 50);
    }

    #[test]
    fn flag_questions_are_skipped_without_flags() {
        // The built-in list carries no flag URLs.
        let mut quiz =
            QuizSession::new(countries(), &ALL_KINDS, 20, StdRng::seed_from_u64(5)).unwrap();
        for _ in 0..20 {
            assert_ne!(quiz.question().unwrap().kind, QuizKind::FlagOf);
            quiz.select(0);
            quiz.next();
        }
    }

    #[test]
    fn too_few_countries_is_an_error() {
        let few: Vec<QuizCountry> = countries().into_iter().take(2).collect();
        let err = QuizSession::new(few, &ALL_KINDS, 10, StdRng::seed_from_u64(0)).unwrap_err();
        assert_eq!(err, TriviaError::TooFewCountries { found: 2 });
    }

    #[test]
    fn answer_flow_and_summary() {
        let mut quiz = QuizSession::new(
            countries(),
            &[QuizKind::RegionOf],
            2,
            StdRng::seed_from_u64(9),
        )
        .unwrap();
        assert!(!quiz.next());
        let correct = quiz.question().unwrap().correct_index;
        let wrong = (correct + 1) % OPTION_COUNT;

        assert_eq!(quiz.select(wrong), Some(false));
        assert_eq!(quiz.select(correct), None);
        let snap = quiz.snapshot();
        assert_eq!(snap.state, QuizState::Answered);
        assert_eq!(snap.correct_index, Some(correct));
        assert_eq!(snap.selected, Some(wrong));

        assert!(quiz.next());
        let correct = quiz.question().unwrap().correct_index;
        assert_eq!(quiz.select(correct), Some(true));
        assert!(quiz.next());

        let snap = quiz.snapshot();
        assert_eq!(snap.state, QuizState::Summary);
        assert_eq!((snap.score, snap.total_rounds), (1, 2));

        quiz.restart();
        assert_eq!(quiz.state(), QuizState::Asking);
        assert_eq!(quiz.score(), 0);
    }

    #[test]
    fn out_of_range_option_is_ignored() {
        let mut quiz =
            QuizSession::new(countries(), &ALL_KINDS, 1, StdRng::seed_from_u64(2)).unwrap();
        assert_eq!(quiz.select(OPTION_COUNT), None);
        assert_eq!(quiz.state(), QuizState::Asking);
    }
}
