pub mod bio;
pub mod cli;
pub mod parse;
pub mod remote;
pub mod tools;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IrisError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP response status code {0}. Please double-check arguments and try again.")]
    Status(u16),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for IrisError {
    fn from(err: reqwest::Error) -> Self {
        IrisError::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IrisError>;
