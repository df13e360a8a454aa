//! Source parsers: one per input modality, each reducing its input to raw word tokens.
//!
//! A parser is single-use. It validates its input when constructed, so a parser that
//! exists is one whose source looked structurally right, then `parse` produces the
//! tokens. Pruning is a separate, explicit step.

mod document;
mod text_file;
mod text_widget;
mod web_page;

pub use document::{ImageFileParser, PdfImageParser, PdfTextParser, WordDocParser};
pub use text_file::TextFileParser;
pub use text_widget::TextWidgetParser;
pub use web_page::WebPageParser;

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::analyzer::{PruneOptions, Pruner, TextAnalyzer};
use crate::error::{Error, Result};
use crate::stopwords::default_stopwords;

/// Per-parser settings.
#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    /// Replaces the default `\w[\w']+` token rule.
    pub token_pattern: Option<String>,
    pub include_numbers: bool,
    pub min_word_length: usize,
    /// Stop words used by `prune`; the built-in English list when `None`.
    pub stopwords: Option<HashSet<String>>,
}

impl ParserConfig {
    pub fn with_token_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.token_pattern = Some(pattern.into());
        self
    }

    pub fn with_include_numbers(mut self, include_numbers: bool) -> Self {
        self.include_numbers = include_numbers;
        self
    }

    pub fn with_min_word_length(mut self, min_word_length: usize) -> Self {
        self.min_word_length = min_word_length;
        self
    }

    pub fn with_stopwords<I, S>(mut self, stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stopwords = Some(stopwords.into_iter().map(Into::into).collect());
        self
    }

    pub(crate) fn analyzer(&self) -> Result<TextAnalyzer> {
        TextAnalyzer::with_pattern(self.token_pattern.as_deref())
    }

    pub(crate) fn pruning(&self) -> Pruning {
        Pruning {
            stopwords: self
                .stopwords
                .clone()
                .unwrap_or_else(|| default_stopwords().clone()),
            options: PruneOptions {
                include_numbers: self.include_numbers,
                min_word_length: self.min_word_length,
            },
        }
    }
}

/// The stop words and filter switches a parser prunes with.
#[derive(Debug, Clone)]
pub struct Pruning {
    stopwords: HashSet<String>,
    options: PruneOptions,
}

impl Pruning {
    pub fn stopwords(&self) -> &HashSet<String> {
        &self.stopwords
    }

    pub fn stopwords_mut(&mut self) -> &mut HashSet<String> {
        &mut self.stopwords
    }

    pub fn options(&self) -> PruneOptions {
        self.options
    }

    /// Note the side effect: a `stopwords` argument replaces the stored set, so it also
    /// applies to every later call that passes `None`.
    pub fn prune(&mut self, tokens: Vec<String>, stopwords: Option<HashSet<String>>) -> Vec<String> {
        if let Some(stopwords) = stopwords {
            self.stopwords = stopwords;
        }
        Pruner::new(&self.stopwords, self.options).prune(tokens)
    }
}

pub trait Parser {
    /// Raw tokens, in source order, before any pruning.
    fn parse(&self) -> Result<Vec<String>>;

    fn pruning(&self) -> &Pruning;

    fn pruning_mut(&mut self) -> &mut Pruning;

    /// Removes stop words, strips possessive `'s`, drops pure numbers (unless enabled)
    /// and drops short tokens, in that order.
    ///
    /// Passing `stopwords` replaces this parser's stored stop-word set for later calls too.
    fn prune(&mut self, tokens: Vec<String>, stopwords: Option<HashSet<String>>) -> Vec<String> {
        self.pruning_mut().prune(tokens, stopwords)
    }
}

/// Checks that a file-backed parser was given a path and that it exists.
pub(crate) fn require_file(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(Error::MissingArgument(
            "No filename was passed to the constructor.".to_string(),
        ));
    }
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    Ok(path.to_path_buf())
}

pub(crate) const PDF_TAG: &[u8; 4] = b"%PDF";

/// Rejects anything whose first four bytes are not `%PDF`, whatever its extension.
pub(crate) fn require_pdf_tag(path: &Path) -> Result<()> {
    let mut tag = Vec::with_capacity(PDF_TAG.len());
    File::open(path)?
        .take(PDF_TAG.len() as u64)
        .read_to_end(&mut tag)?;
    if tag.as_slice() != PDF_TAG {
        return Err(Error::InvalidFormat {
            path: path.to_path_buf(),
            kind: "text based PDF file",
        });
    }
    Ok(())
}
