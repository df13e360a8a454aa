use std::fs;
use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use wordcloud_tool::config::{CONFIG, Config};
use wordcloud_tool::{AppContext, LoadOptions, ParserConfig, Source, top_terms};

#[derive(Parser, Debug)]
#[command(name = "wordcloud-tool", about = "Build a word cloud and a top-terms chart from a document")]
struct Cli {
    #[command(subcommand)]
    source: SourceCommand,

    #[command(flatten)]
    options: Options,
}

#[derive(Subcommand, Debug)]
enum SourceCommand {
    /// Plain text file
    Text { path: PathBuf },
    /// PDF with a text layer, falling back to OCR when it has none
    Pdf { path: PathBuf },
    /// Scanned PDF, read through OCR
    Ocr { path: PathBuf },
    /// Word-processor document
    Word { path: PathBuf },
    /// Raster image, read through OCR
    Image { path: PathBuf },
    /// Web page
    Url {
        url: String,
        /// Strip HTML before tokenizing
        #[arg(long)]
        strip_markup: bool,
    },
    /// Literal text, or stdin when omitted
    Paste { text: Option<String> },
}

#[derive(Args, Debug)]
struct Options {
    /// Replace the built-in stop words with one word per line from this file
    #[arg(long, global = true)]
    stopfile: Option<String>,
    #[arg(long, global = true, default_value_t = 0)]
    min_length: usize,
    #[arg(long, global = true)]
    include_numbers: bool,
    /// Count raw tokens without pruning
    #[arg(long, global = true)]
    no_prune: bool,
    #[arg(long, global = true)]
    width: Option<u32>,
    #[arg(long, global = true)]
    height: Option<u32>,
    #[arg(long, global = true)]
    background: Option<String>,
    #[arg(long, global = true)]
    min_font_size: Option<u32>,
    /// Number of bars in the frequency chart
    #[arg(long, global = true)]
    top: Option<usize>,
    #[arg(long, global = true)]
    out_dir: Option<PathBuf>,
    /// Print the ranked frequency table as JSON
    #[arg(long, global = true)]
    json: bool,
    #[arg(short, long, global = true)]
    verbose: bool,
}

impl Options {
    fn apply(&self, config: &mut Config) {
        if let Some(stopfile) = &self.stopfile {
            config.stopfile = Some(stopfile.clone());
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(background) = &self.background {
            config.background = background.clone();
        }
        if let Some(min_font_size) = self.min_font_size {
            config.min_font_size = min_font_size;
        }
        if let Some(top) = self.top {
            config.freq_size = top;
        }
    }
}

impl SourceCommand {
    fn into_source(self) -> anyhow::Result<Source> {
        Ok(match self {
            SourceCommand::Text { path } => Source::TextFile(path),
            SourceCommand::Pdf { path } => Source::PdfText(path),
            SourceCommand::Ocr { path } => Source::PdfImage(path),
            SourceCommand::Word { path } => Source::WordDocument(path),
            SourceCommand::Image { path } => Source::ImageFile(path),
            SourceCommand::Url { url, strip_markup } => Source::WebPage { url, strip_markup },
            SourceCommand::Paste { text: Some(text) } => Source::Pasted(text),
            SourceCommand::Paste { text: None } => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .context("failed to read text from stdin")?;
                Source::Pasted(text)
            }
        })
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.options.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_target(true)
        .init();

    let mut config = CONFIG.clone();
    cli.options.apply(&mut config);
    let out_dir = cli
        .options
        .out_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.out_dir));

    let mut ctx = AppContext::new(&config).context("failed to set up word cloud context")?;
    let source = cli.source.into_source()?;
    let options = LoadOptions {
        parser: ParserConfig::default()
            .with_include_numbers(cli.options.include_numbers)
            .with_min_word_length(cli.options.min_length),
        prune: !cli.options.no_prune,
    };

    let added = ctx
        .load(&source, &options)
        .with_context(|| format!("failed to read words from {source:?}"))?;
    tracing::info!("{added} words loaded");

    ctx.visualize().context("failed to generate images")?;

    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let generator = ctx.generator();
    if let Some(cloud) = generator.get_cloud_image() {
        let path = out_dir.join("cloud.png");
        cloud
            .save(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!("wrote {}", path.display());
    }
    if let Some(chart) = generator.get_frequency_image() {
        let path = out_dir.join("chart.png");
        chart
            .save(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!("wrote {}", path.display());
    }

    if cli.options.json {
        let shown = generator.filtered(ctx.words().get_word_count());
        let table = top_terms(&shown, generator.get_freq_size());
        println!("{}", serde_json::to_string_pretty(&table)?);
    }
    Ok(())
}
