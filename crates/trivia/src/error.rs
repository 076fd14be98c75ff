#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TriviaError {
    #[error("question bank is empty")]
    EmptyBank,
    #[error("invalid game config: {0}")]
    InvalidConfig(String),
    #[error("not enough countries for any quiz question ({found} usable)")]
    TooFewCountries { found: usize },
}
