use super::{Parser, ParserConfig, Pruning};
use crate::analyzer::TextAnalyzer;
use crate::error::Result;

/// Text already in memory, typically pasted into an editor widget.
pub struct TextWidgetParser {
    text: String,
    analyzer: TextAnalyzer,
    pruning: Pruning,
}

impl TextWidgetParser {
    pub fn new(text: impl Into<String>, config: ParserConfig) -> Result<Self> {
        Ok(Self {
            text: text.into(),
            analyzer: config.analyzer()?,
            pruning: config.pruning(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Parser for TextWidgetParser {
    fn parse(&self) -> Result<Vec<String>> {
        Ok(self.analyzer.tokenize_lines(self.text.clone()))
    }

    fn pruning(&self) -> &Pruning {
        &self.pruning
    }

    fn pruning_mut(&mut self) -> &mut Pruning {
        &mut self.pruning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_then_prune() {
        let mut parser = TextWidgetParser::new(
            "Research and develop BI models and data analysis",
            ParserConfig::default(),
        )
        .unwrap();
        let words = parser.parse().unwrap();
        assert_eq!(
            words,
            vec!["Research", "and", "develop", "BI", "models", "and", "data", "analysis"]
        );

        let pruned = parser.prune(words, Some(["and".to_string()].into()));
        assert_eq!(
            pruned,
            vec!["Research", "develop", "BI", "models", "data", "analysis"]
        );
    }

    #[test]
    fn test_each_line_is_tokenized() {
        let parser =
            TextWidgetParser::new("Top 3 requirements:\n1) Experience in SQL", ParserConfig::default())
                .unwrap();
        assert_eq!(
            parser.parse().unwrap(),
            vec!["Top", "requirements", "Experience", "in", "SQL"]
        );
    }
}
