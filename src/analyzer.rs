use html2text::from_read;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::error::Result;

/// Default token rule: a word character followed by one or more word characters or apostrophes.
pub const DEFAULT_TOKEN_PATTERN: &str = r"\w[\w']+";

static DEFAULT_TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEFAULT_TOKEN_PATTERN).expect("default token pattern compiles"));

static DIGITS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+$").expect("digit pattern compiles"));

/// A character filter receives the original text and may transform it before tokenization.
/// For instance, a markup filter strips the tags from a fetched web page so that only the
/// rendered text reaches the tokenizer.
pub trait CharacterFilter: Send + Sync {
    fn filter(&self, text: String) -> String;
}

/// Renders HTML to plain text. Input that fails to render is passed through unchanged.
#[derive(Debug, Clone)]
pub struct MarkupFilter {
    width: usize,
}

impl Default for MarkupFilter {
    fn default() -> Self {
        Self { width: 120 }
    }
}

impl CharacterFilter for MarkupFilter {
    fn filter(&self, html: String) -> String {
        match from_read(html.as_bytes(), self.width) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("markup filter failed, keeping raw text: {e}");
                html
            }
        }
    }
}

/// A tokenizer breaks a block of text into individual word tokens.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Emits every match of a regular expression, in order. Everything between matches
/// (punctuation, whitespace) is discarded.
#[derive(Debug, Clone)]
pub struct RegexTokenizer {
    regex: Regex,
}

impl RegexTokenizer {
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

impl Default for RegexTokenizer {
    fn default() -> Self {
        Self {
            regex: DEFAULT_TOKEN_REGEX.clone(),
        }
    }
}

impl Tokenizer for RegexTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        self.regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// Character filters followed by a tokenizer. Shared by every source parser.
pub struct TextAnalyzer {
    char_filters: Vec<Box<dyn CharacterFilter>>,
    tokenizer: Box<dyn Tokenizer>,
}

impl TextAnalyzer {
    pub fn new(char_filters: Vec<Box<dyn CharacterFilter>>, tokenizer: Box<dyn Tokenizer>) -> Self {
        Self {
            char_filters,
            tokenizer,
        }
    }

    /// Builds an analyzer around the default pattern, or `pattern` when given.
    pub fn with_pattern(pattern: Option<&str>) -> Result<Self> {
        let tokenizer = match pattern {
            Some(p) => RegexTokenizer::with_pattern(p)?,
            None => RegexTokenizer::default(),
        };
        Ok(Self::new(vec![], Box::new(tokenizer)))
    }

    pub fn push_char_filter(&mut self, filter: Box<dyn CharacterFilter>) {
        self.char_filters.push(filter);
    }

    pub fn char_filter(&self, mut content: String) -> String {
        for filter in self.char_filters.iter() {
            content = filter.filter(content);
        }
        content
    }

    /// Tokenizes `content` as one block.
    pub fn tokenize(&self, content: String) -> Vec<String> {
        let content = self.char_filter(content);
        self.tokenizer.tokenize(&content)
    }

    /// Tokenizes `content` one line at a time and concatenates the results.
    pub fn tokenize_lines(&self, content: String) -> Vec<String> {
        let content = self.char_filter(content);
        content
            .lines()
            .flat_map(|line| self.tokenizer.tokenize(line))
            .collect()
    }
}

impl Default for TextAnalyzer {
    fn default() -> Self {
        Self::new(vec![], Box::new(RegexTokenizer::default()))
    }
}

/// A token filter receives the token stream and may remove or change tokens.
pub trait TokenFilter: Send + Sync {
    fn filter(&self, tokens: Vec<String>) -> Vec<String>;
}

/// Drops tokens whose lower-cased form is a lower-cased stop word.
pub struct StopWordTokenFilter {
    stop_words: HashSet<String>,
}

impl StopWordTokenFilter {
    pub fn new<I, S>(stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stop_words: stop_words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }
}

impl TokenFilter for StopWordTokenFilter {
    fn filter(&self, mut tokens: Vec<String>) -> Vec<String> {
        tokens.retain(|w| !self.stop_words.contains(&w.to_lowercase()));
        tokens
    }
}

/// Strips a trailing `'s` (any case) from each token.
pub struct PossessiveTokenFilter;

impl TokenFilter for PossessiveTokenFilter {
    fn filter(&self, tokens: Vec<String>) -> Vec<String> {
        tokens
            .into_iter()
            .map(|mut t| {
                if t.ends_with("'s") || t.ends_with("'S") {
                    t.truncate(t.len() - 2);
                }
                t
            })
            .collect()
    }
}

/// Filters out tokens made only of decimal digits. Other numeric characters
/// (Roman numerals, fractions) count as letters.
pub struct NumericTokenFilter;

impl TokenFilter for NumericTokenFilter {
    fn filter(&self, mut tokens: Vec<String>) -> Vec<String> {
        tokens.retain(|t| !DIGITS_REGEX.is_match(t));
        tokens
    }
}

/// Drops tokens shorter than `min_length` characters.
pub struct MinLengthTokenFilter {
    min_length: usize,
}

impl MinLengthTokenFilter {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }
}

impl TokenFilter for MinLengthTokenFilter {
    fn filter(&self, mut tokens: Vec<String>) -> Vec<String> {
        tokens.retain(|t| t.chars().count() >= self.min_length);
        tokens
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneOptions {
    pub include_numbers: bool,
    /// 0 disables the length check.
    pub min_word_length: usize,
}

/// Token filters applied in a fixed order: stop words, possessives, numbers, length.
/// Reordering changes results (a stripped `'s` can push a token under the length floor).
pub struct Pruner {
    token_filters: Vec<Box<dyn TokenFilter>>,
}

impl Pruner {
    pub fn new<I, S>(stop_words: I, options: PruneOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut token_filters: Vec<Box<dyn TokenFilter>> = vec![
            Box::new(StopWordTokenFilter::new(stop_words)),
            Box::new(PossessiveTokenFilter),
        ];
        if !options.include_numbers {
            token_filters.push(Box::new(NumericTokenFilter));
        }
        if options.min_word_length > 0 {
            token_filters.push(Box::new(MinLengthTokenFilter::new(options.min_word_length)));
        }
        Self { token_filters }
    }

    pub fn prune(&self, mut tokens: Vec<String>) -> Vec<String> {
        for filter in self.token_filters.iter() {
            tokens = filter.filter(tokens);
        }
        tokens
    }
}
