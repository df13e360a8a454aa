use dotenvy::dotenv;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config::from_env()
});

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 800;
pub const DEFAULT_BACKGROUND: &str = "white";
pub const DEFAULT_MIN_FONT_SIZE: u32 = 10;
pub const DEFAULT_FREQ_SIZE: usize = 20;
pub const DEFAULT_OCR_COMMAND: &str = "tesseract {file} stdout -l eng";
pub const DEFAULT_DOC_COMMAND: &str = "pandoc {file} --to plain";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub width: u32,
    pub height: u32,
    pub background: String,
    pub min_font_size: u32,
    pub freq_size: usize,
    /// Replaces the built-in stop-word list at startup when set.
    pub stopfile: Option<String>,
    /// Command line used for OCR; `{file}` is substituted with the input path.
    pub ocr_command: String,
    /// Command line that converts a word-processor document to text on stdout.
    pub doc_command: String,
    pub out_dir: String,
}

impl Config {
    pub fn from_env() -> Config {
        Config {
            width: get_env_parsed("WORDCLOUD_WIDTH", DEFAULT_WIDTH),
            height: get_env_parsed("WORDCLOUD_HEIGHT", DEFAULT_HEIGHT),
            background: get_env_or_default("WORDCLOUD_BACKGROUND", DEFAULT_BACKGROUND),
            min_font_size: get_env_parsed("WORDCLOUD_MIN_FONT_SIZE", DEFAULT_MIN_FONT_SIZE),
            freq_size: get_env_parsed("WORDCLOUD_FREQ_SIZE", DEFAULT_FREQ_SIZE),
            stopfile: env::var("WORDCLOUD_STOPFILE").ok().filter(|s| !s.is_empty()),
            ocr_command: get_env_or_default("WORDCLOUD_OCR_COMMAND", DEFAULT_OCR_COMMAND),
            doc_command: get_env_or_default("WORDCLOUD_DOC_COMMAND", DEFAULT_DOC_COMMAND),
            out_dir: get_env_or_default("WORDCLOUD_OUT_DIR", "."),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            background: DEFAULT_BACKGROUND.to_string(),
            min_font_size: DEFAULT_MIN_FONT_SIZE,
            freq_size: DEFAULT_FREQ_SIZE,
            stopfile: None,
            ocr_command: DEFAULT_OCR_COMMAND.to_string(),
            doc_command: DEFAULT_DOC_COMMAND.to_string(),
            out_dir: ".".to_string(),
        }
    }
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_env_parsed<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("ignoring unparsable value {raw:?} for {key}");
            default
        }),
        Err(_) => default,
    }
}
