use std::path::PathBuf;

use thiserror::Error;

/// Every failure the word pipeline can surface to its caller.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    MissingArgument(String),

    #[error("{} does not exist!", .0.display())]
    FileNotFound(PathBuf),

    #[error("{} is not a {kind}.", path.display())]
    InvalidFormat { path: PathBuf, kind: &'static str },

    #[error("invalid token pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("{0} was already added to stopwords.")]
    AlreadyExists(String),

    #[error("text extraction failed for {}: {reason}", path.display())]
    Extraction { path: PathBuf, reason: String },

    #[error("fetching {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("rendering failed: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn word_not_listed(word: &str) -> Self {
        Error::NotFound(format!("{word} is not in the list."))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
