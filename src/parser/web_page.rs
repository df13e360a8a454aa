use std::sync::Arc;

use super::{Parser, ParserConfig, Pruning};
use crate::analyzer::{MarkupFilter, TextAnalyzer};
use crate::error::{Error, Result};
use crate::extract::{HttpFetcher, PageFetcher};

/// A page fetched over HTTP, tokenized line by line.
///
/// The body is tokenized as returned, markup included, unless
/// [`WebPageParser::with_markup_stripping`] is enabled.
pub struct WebPageParser {
    url: String,
    analyzer: TextAnalyzer,
    pruning: Pruning,
    fetcher: Arc<dyn PageFetcher>,
}

impl WebPageParser {
    pub fn new(url: impl Into<String>, config: ParserConfig) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(Error::MissingArgument(
                "No URL was passed to the constructor.".to_string(),
            ));
        }
        Ok(Self {
            url,
            analyzer: config.analyzer()?,
            pruning: config.pruning(),
            fetcher: Arc::new(HttpFetcher::new()),
        })
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_markup_stripping(mut self) -> Self {
        self.analyzer.push_char_filter(Box::new(MarkupFilter::default()));
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Parser for WebPageParser {
    fn parse(&self) -> Result<Vec<String>> {
        let body = self.fetcher.get(&self.url)?;
        let text = String::from_utf8_lossy(&body).into_owned();
        let tokens = self.analyzer.tokenize_lines(text);
        log::debug!("{}: {} tokens", self.url, tokens.len());
        Ok(tokens)
    }

    fn pruning(&self) -> &Pruning {
        &self.pruning
    }

    fn pruning_mut(&mut self) -> &mut Pruning {
        &mut self.pruning
    }
}
