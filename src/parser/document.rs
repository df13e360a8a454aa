use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{Parser, ParserConfig, Pruning, require_file, require_pdf_tag};
use crate::analyzer::TextAnalyzer;
use crate::error::Result;
use crate::extract::{
    CommandExtractor, DocumentExtractor, PdfExtractor, PdfTextExtractor, decode_permissive,
};

/// PDF with an embedded text layer, read page by page.
pub struct PdfTextParser {
    path: PathBuf,
    analyzer: TextAnalyzer,
    pruning: Pruning,
    extractor: Arc<dyn PdfTextExtractor>,
}

impl PdfTextParser {
    pub fn new(path: impl AsRef<Path>, config: ParserConfig) -> Result<Self> {
        let path = require_file(path.as_ref())?;
        require_pdf_tag(&path)?;
        Ok(Self {
            path,
            analyzer: config.analyzer()?,
            pruning: config.pruning(),
            extractor: Arc::new(PdfExtractor),
        })
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn PdfTextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Parser for PdfTextParser {
    fn parse(&self) -> Result<Vec<String>> {
        let pages = self.extractor.pages(&self.path)?;
        let page_count = pages.len();
        let tokens: Vec<String> = pages
            .into_iter()
            .flat_map(|page| self.analyzer.tokenize(page))
            .collect();
        log::debug!(
            "{}: {} tokens from {page_count} pages",
            self.path.display(),
            tokens.len()
        );
        Ok(tokens)
    }

    fn pruning(&self) -> &Pruning {
        &self.pruning
    }

    fn pruning_mut(&mut self) -> &mut Pruning {
        &mut self.pruning
    }
}

/// A file handed whole to a document-to-text service, whose output is decoded
/// permissively and tokenized as one block.
struct ExtractedDocument {
    path: PathBuf,
    analyzer: TextAnalyzer,
    pruning: Pruning,
    extractor: Arc<dyn DocumentExtractor>,
}

impl ExtractedDocument {
    fn new(
        path: PathBuf,
        config: ParserConfig,
        extractor: Arc<dyn DocumentExtractor>,
    ) -> Result<Self> {
        Ok(Self {
            path,
            analyzer: config.analyzer()?,
            pruning: config.pruning(),
            extractor,
        })
    }

    fn parse(&self) -> Result<Vec<String>> {
        let raw = self.extractor.extract(&self.path)?;
        let text = decode_permissive(&raw);
        let tokens = self.analyzer.tokenize(text);
        log::debug!("{}: {} tokens", self.path.display(), tokens.len());
        Ok(tokens)
    }
}

/// Scanned PDF, read through OCR.
pub struct PdfImageParser {
    inner: ExtractedDocument,
}

impl PdfImageParser {
    pub fn new(path: impl AsRef<Path>, config: ParserConfig) -> Result<Self> {
        let path = require_file(path.as_ref())?;
        require_pdf_tag(&path)?;
        Ok(Self {
            inner: ExtractedDocument::new(
                path,
                config,
                Arc::new(CommandExtractor::tesseract()),
            )?,
        })
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn DocumentExtractor>) -> Self {
        self.inner.extractor = extractor;
        self
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }
}

/// Word-processor document (.docx, .odt, .rtf), converted by a document-to-text
/// command rather than OCR. The file is not sniffed; whatever the extractor accepts
/// is accepted.
pub struct WordDocParser {
    inner: ExtractedDocument,
}

impl WordDocParser {
    pub fn new(path: impl AsRef<Path>, config: ParserConfig) -> Result<Self> {
        let path = require_file(path.as_ref())?;
        Ok(Self {
            inner: ExtractedDocument::new(
                path,
                config,
                Arc::new(CommandExtractor::word_processor()),
            )?,
        })
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn DocumentExtractor>) -> Self {
        self.inner.extractor = extractor;
        self
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }
}

/// Raster image (PNG, JPEG, TIFF) read through OCR.
pub struct ImageFileParser {
    inner: ExtractedDocument,
}

impl ImageFileParser {
    pub fn new(path: impl AsRef<Path>, config: ParserConfig) -> Result<Self> {
        let path = require_file(path.as_ref())?;
        Ok(Self {
            inner: ExtractedDocument::new(
                path,
                config,
                Arc::new(CommandExtractor::tesseract()),
            )?,
        })
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn DocumentExtractor>) -> Self {
        self.inner.extractor = extractor;
        self
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }
}

impl Parser for PdfImageParser {
    fn parse(&self) -> Result<Vec<String>> {
        self.inner.parse()
    }

    fn pruning(&self) -> &Pruning {
        &self.inner.pruning
    }

    fn pruning_mut(&mut self) -> &mut Pruning {
        &mut self.inner.pruning
    }
}

impl Parser for WordDocParser {
    fn parse(&self) -> Result<Vec<String>> {
        self.inner.parse()
    }

    fn pruning(&self) -> &Pruning {
        &self.inner.pruning
    }

    fn pruning_mut(&mut self) -> &mut Pruning {
        &mut self.inner.pruning
    }
}

impl Parser for ImageFileParser {
    fn parse(&self) -> Result<Vec<String>> {
        self.inner.parse()
    }

    fn pruning(&self) -> &Pruning {
        &self.inner.pruning
    }

    fn pruning_mut(&mut self) -> &mut Pruning {
        &mut self.inner.pruning
    }
}
