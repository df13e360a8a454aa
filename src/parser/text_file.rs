use std::fs;
use std::path::{Path, PathBuf};

use super::{Parser, ParserConfig, Pruning, require_file};
use crate::analyzer::TextAnalyzer;
use crate::error::{Error, Result};

/// Share of "binary" characters above which a file is refused as not being text.
const MAX_BINARY_NUMERATOR: usize = 3;
const MAX_BINARY_DENOMINATOR: usize = 10;

/// Plain text file, tokenized line by line.
pub struct TextFileParser {
    path: PathBuf,
    analyzer: TextAnalyzer,
    pruning: Pruning,
}

impl TextFileParser {
    pub fn new(path: impl AsRef<Path>, config: ParserConfig) -> Result<Self> {
        let path = require_file(path.as_ref())?;
        let analyzer = config.analyzer()?;
        let bytes = fs::read(&path)?;
        if !looks_like_text(&bytes) {
            return Err(Error::InvalidFormat {
                path,
                kind: "text file",
            });
        }
        Ok(Self {
            path,
            analyzer,
            pruning: config.pruning(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Parser for TextFileParser {
    fn parse(&self) -> Result<Vec<String>> {
        let bytes = fs::read(&self.path)?;
        let content = String::from_utf8_lossy(&bytes).into_owned();
        let tokens = self.analyzer.tokenize_lines(content);
        log::debug!("{}: {} tokens", self.path.display(), tokens.len());
        Ok(tokens)
    }

    fn pruning(&self) -> &Pruning {
        &self.pruning
    }

    fn pruning_mut(&mut self) -> &mut Pruning {
        &mut self.pruning
    }
}

/// Counts binary characters line by line.
///
/// In an ASCII line every character below space or above `~` is binary, line
/// terminators included (`\r\n` counts once). A line that is not ASCII counts as
/// binary in full. Text passes while binary / total stays at or under 30%.
pub(crate) fn looks_like_text(bytes: &[u8]) -> bool {
    let (mut total, mut binary) = (0usize, 0usize);
    for raw in bytes.split_inclusive(|b| *b == b'\n') {
        let (body, terminator) = match raw.strip_suffix(b"\r\n").or_else(|| raw.strip_suffix(b"\n")) {
            Some(body) => (body, 1),
            None => (raw, 0),
        };
        let (len, bin) = if body.is_ascii() {
            let bin = body.iter().filter(|b| **b < b' ' || **b > b'~').count();
            (body.len(), bin)
        } else {
            let len = std::str::from_utf8(body)
                .map(|s| s.chars().count())
                .unwrap_or(body.len());
            (len, len)
        };
        total += len + terminator;
        binary += bin + terminator;
    }
    binary * MAX_BINARY_DENOMINATOR <= total * MAX_BINARY_NUMERATOR
}
