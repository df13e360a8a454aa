//! Collaborators that turn a document or URL into raw text.
//!
//! Parsers only see the traits; the default implementations shell out to an OCR
//! command, read PDFs with `pdf-extract`, and fetch pages with a blocking `reqwest` client.

use std::path::Path;
use std::process::Command;

use crate::config::{DEFAULT_DOC_COMMAND, DEFAULT_OCR_COMMAND};
use crate::error::{Error, Result};

/// Document-to-text service (OCR, word processors). May return an empty buffer.
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<Vec<u8>>;
}

/// Text of every page of a PDF, in page order.
pub trait PdfTextExtractor: Send + Sync {
    fn pages(&self, path: &Path) -> Result<Vec<String>>;
}

pub trait PageFetcher: Send + Sync {
    fn get(&self, url: &str) -> Result<Vec<u8>>;
}

/// Decodes UTF-8, silently dropping byte sequences that do not decode.
pub fn decode_permissive(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl PdfTextExtractor for PdfExtractor {
    fn pages(&self, path: &Path) -> Result<Vec<String>> {
        pdf_extract::extract_text_by_pages(path).map_err(|e| Error::Extraction {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Runs an external program and captures its standard output.
///
/// The command line is a whitespace separated template where `{file}` is replaced
/// by the document path, e.g. `tesseract {file} stdout -l eng`.
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    program: String,
    args: Vec<String>,
}

impl CommandExtractor {
    pub fn from_template(template: &str) -> Result<Self> {
        let mut parts = template.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| Error::MissingArgument("empty extraction command".to_string()))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    fn builtin(template: &'static str) -> Self {
        let mut parts = template.split_whitespace().map(str::to_string);
        Self {
            program: parts.next().unwrap_or_default(),
            args: parts.collect(),
        }
    }

    /// OCR through `tesseract`, for scans and images.
    pub fn tesseract() -> Self {
        Self::builtin(DEFAULT_OCR_COMMAND)
    }

    /// Plain-text conversion through `pandoc`, for .docx, .odt and .rtf documents.
    pub fn word_processor() -> Self {
        Self::builtin(DEFAULT_DOC_COMMAND)
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl DocumentExtractor for CommandExtractor {
    fn extract(&self, path: &Path) -> Result<Vec<u8>> {
        let file = path.to_string_lossy();
        let args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.replace("{file}", &file))
            .collect();
        log::debug!("running {} {:?}", self.program, args);

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| Error::Extraction {
                path: path.to_path_buf(),
                reason: format!("could not run {}: {e}", self.program),
            })?;

        if !output.status.success() {
            return Err(Error::Extraction {
                path: path.to_path_buf(),
                reason: format!(
                    "{} exited with {}: {}",
                    self.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(output.stdout)
    }
}

impl Default for CommandExtractor {
    fn default() -> Self {
        Self::tesseract()
    }
}

#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PageFetcher for HttpFetcher {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        let network = |e: reqwest::Error| Error::Network {
            url: url.to_string(),
            reason: e.to_string(),
        };
        let res = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(network)?;
        let body = res.bytes().map_err(network)?;
        log::info!("fetched {} bytes from {url}", body.len());
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_permissive_drops_invalid_bytes() {
        let bytes = b"caf\xff\xfee ok";
        assert_eq!(decode_permissive(bytes), "cafe ok");
    }

    #[test]
    fn test_template_parsing() {
        let cmd = CommandExtractor::from_template("antiword {file}").unwrap();
        assert_eq!(cmd.program(), "antiword");
        assert_eq!(cmd.args, vec!["{file}"]);
        assert!(CommandExtractor::from_template("   ").is_err());
    }

    #[test]
    fn test_tesseract_default_args() {
        let cmd = CommandExtractor::tesseract();
        assert_eq!(cmd.program(), "tesseract");
        assert_eq!(cmd.args, vec!["{file}", "stdout", "-l", "eng"]);
    }

    #[test]
    fn test_word_processor_default_args() {
        let cmd = CommandExtractor::word_processor();
        assert_eq!(cmd.program(), "pandoc");
        assert_eq!(cmd.args, vec!["{file}", "--to", "plain"]);
    }

    #[test]
    fn test_missing_program_is_extraction_error() {
        let cmd = CommandExtractor::from_template("surely-not-an-installed-program-xyz {file}")
            .unwrap();
        let err = cmd.extract(Path::new("whatever.pdf")).unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }
}
