use thiserror::Error;

pub type Result<T> = std::result::Result<T, IdeogramError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdeogramError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("invalid input: {0}")]
    InputValidation(String),
    #[error("Ideogram API error: {0}")]
    Upstream(String),
}

impl IdeogramError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::InputValidation(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }
}
