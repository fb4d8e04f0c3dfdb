use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("fuzzy threshold {0} is outside 0..=100")]
    InvalidThreshold(f64),
}

pub type Result<T> = std::result::Result<T, MatchError>;
