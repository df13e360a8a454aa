use std::path::PathBuf;
use std::sync::Arc;

use crate::cloud::CloudGenerator;
use crate::config::Config;
use crate::error::Result;
use crate::extract::{
    CommandExtractor, DocumentExtractor, HttpFetcher, PageFetcher, PdfExtractor, PdfTextExtractor,
};
use crate::frequency::WordFrequencies;
use crate::parser::{
    ImageFileParser, Parser, ParserConfig, PdfImageParser, PdfTextParser, TextFileParser,
    TextWidgetParser, WebPageParser, WordDocParser,
};
use crate::render::{ChartRenderer, CloudRenderer};
use crate::stopwords::StopWords;

/// Where a batch of words comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    TextFile(PathBuf),
    /// A PDF with a text layer; falls back to OCR when no text comes out.
    PdfText(PathBuf),
    PdfImage(PathBuf),
    WordDocument(PathBuf),
    ImageFile(PathBuf),
    WebPage { url: String, strip_markup: bool },
    Pasted(String),
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub parser: ParserConfig,
    /// Prune before counting, with `parser.stopwords` when set and the
    /// context's stop words otherwise.
    pub prune: bool,
}

/// Process-wide state, built once at startup and passed by reference.
///
/// Owns the stop-word set, the frequency model of the current session and the
/// cloud generator, together with the collaborators parsers are built with.
pub struct AppContext {
    stopwords: StopWords,
    words: WordFrequencies,
    generator: CloudGenerator,
    ocr: Arc<dyn DocumentExtractor>,
    documents: Arc<dyn DocumentExtractor>,
    pdf_text: Arc<dyn PdfTextExtractor>,
    fetcher: Arc<dyn PageFetcher>,
}

impl AppContext {
    pub fn new(config: &Config) -> Result<Self> {
        let mut stopwords = StopWords::new();
        if let Some(stopfile) = &config.stopfile {
            stopwords.set_stopfile(stopfile)?;
        }
        Ok(Self {
            stopwords,
            words: WordFrequencies::new(),
            generator: CloudGenerator::from_config(config),
            ocr: Arc::new(CommandExtractor::from_template(&config.ocr_command)?),
            documents: Arc::new(CommandExtractor::from_template(&config.doc_command)?),
            pdf_text: Arc::new(PdfExtractor),
            fetcher: Arc::new(HttpFetcher::new()),
        })
    }

    pub fn with_ocr(mut self, ocr: Arc<dyn DocumentExtractor>) -> Self {
        self.ocr = ocr;
        self
    }

    /// Extractor used for word-processor documents.
    pub fn with_documents(mut self, documents: Arc<dyn DocumentExtractor>) -> Self {
        self.documents = documents;
        self
    }

    pub fn with_pdf_text(mut self, pdf_text: Arc<dyn PdfTextExtractor>) -> Self {
        self.pdf_text = pdf_text;
        self
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_renderers(
        mut self,
        cloud_renderer: Box<dyn CloudRenderer>,
        chart_renderer: Box<dyn ChartRenderer>,
    ) -> Self {
        self.generator = self.generator.with_renderers(cloud_renderer, chart_renderer);
        self
    }

    pub fn stopwords(&self) -> &StopWords {
        &self.stopwords
    }

    pub fn stopwords_mut(&mut self) -> &mut StopWords {
        &mut self.stopwords
    }

    pub fn words(&self) -> &WordFrequencies {
        &self.words
    }

    pub fn words_mut(&mut self) -> &mut WordFrequencies {
        &mut self.words
    }

    pub fn generator(&self) -> &CloudGenerator {
        &self.generator
    }

    pub fn generator_mut(&mut self) -> &mut CloudGenerator {
        &mut self.generator
    }

    /// Starts over with an empty frequency model. Subscribers of the old model are dropped with it.
    pub fn new_session(&mut self) -> &mut WordFrequencies {
        self.words = WordFrequencies::new();
        &mut self.words
    }

    pub fn parser_for(&self, source: &Source, config: ParserConfig) -> Result<Box<dyn Parser>> {
        let parser: Box<dyn Parser> = match source {
            Source::TextFile(path) => Box::new(TextFileParser::new(path, config)?),
            Source::PdfText(path) => {
                Box::new(PdfTextParser::new(path, config)?.with_extractor(self.pdf_text.clone()))
            }
            Source::PdfImage(path) => {
                Box::new(PdfImageParser::new(path, config)?.with_extractor(self.ocr.clone()))
            }
            Source::WordDocument(path) => {
                Box::new(WordDocParser::new(path, config)?.with_extractor(self.documents.clone()))
            }
            Source::ImageFile(path) => {
                Box::new(ImageFileParser::new(path, config)?.with_extractor(self.ocr.clone()))
            }
            Source::WebPage { url, strip_markup } => {
                let parser = WebPageParser::new(url.clone(), config)?.with_fetcher(self.fetcher.clone());
                if *strip_markup {
                    Box::new(parser.with_markup_stripping())
                } else {
                    Box::new(parser)
                }
            }
            Source::Pasted(text) => Box::new(TextWidgetParser::new(text.clone(), config)?),
        };
        Ok(parser)
    }

    /// Parses `source`, optionally prunes it, and returns the tokens.
    ///
    /// A text-layer PDF that yields no tokens is parsed again through OCR.
    pub fn extract(&self, source: &Source, options: &LoadOptions) -> Result<Vec<String>> {
        let mut parser = self.parser_for(source, options.parser.clone())?;
        let mut tokens = parser.parse()?;

        if tokens.is_empty() {
            if let Source::PdfText(path) = source {
                log::info!(
                    "{} has no text layer, retrying through OCR",
                    path.display()
                );
                parser = self.parser_for(&Source::PdfImage(path.clone()), options.parser.clone())?;
                tokens = parser.parse()?;
            }
        }

        if options.prune {
            let stopwords = if options.parser.stopwords.is_some() {
                None
            } else {
                Some(self.stopwords.get_stopwords().clone())
            };
            tokens = parser.prune(tokens, stopwords);
        }
        Ok(tokens)
    }

    /// Extracts `source` and counts its tokens into the current session. Returns the token count.
    pub fn load(&mut self, source: &Source, options: &LoadOptions) -> Result<usize> {
        let tokens = self.extract(source, options)?;
        let added = tokens.len();
        self.words.add_words(tokens);
        log::info!(
            "added {added} tokens, {} distinct words in session",
            self.words.get_word_count().len()
        );
        Ok(added)
    }

    /// Renders the current session with the current stop words.
    pub fn visualize(&mut self) -> Result<()> {
        self.generator.set_stopwords(&self.stopwords);
        self.generator.generate_from_count(self.words.get_word_count())
    }
}
