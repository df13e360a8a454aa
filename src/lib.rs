pub mod analyzer;
pub mod cloud;
pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod frequency;
pub mod observer;
pub mod parser;
pub mod render;
pub mod stopwords;

pub use cloud::{CloudGenerator, top_terms};
pub use context::{AppContext, LoadOptions, Source};
pub use error::{Error, Result};
pub use frequency::{FrequencyMap, WordFrequencies};
pub use observer::{Event, SubscriptionId};
pub use parser::{Parser, ParserConfig};
pub use render::{CloudOptions, RasterImage};
pub use stopwords::StopWords;
