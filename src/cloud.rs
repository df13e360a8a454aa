use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fmt;

use crate::config::{Config, DEFAULT_FREQ_SIZE};
use crate::error::Result;
use crate::frequency::FrequencyMap;
use crate::observer::{Event, EventBus, SubscriptionId};
use crate::render::{
    BarChartRenderer, ChartRenderer, CloudOptions, CloudRenderer, RasterImage, TileCloudRenderer,
};
use crate::stopwords::{StopWords, default_stopwords};

/// The `n` most frequent entries, highest count first. Ties keep the map's insertion order.
pub fn top_terms(counts: &FrequencyMap, n: usize) -> Vec<(String, u64)> {
    counts
        .ranked()
        .into_iter()
        .take(n)
        .map(|(w, c)| (w.to_string(), c))
        .collect()
}

/// Produces the word-cloud image and the top-terms bar chart for a frequency table.
///
/// Both images are regenerated from scratch on every request. Image subscribers are
/// notified before chart subscribers.
pub struct CloudGenerator {
    options: CloudOptions,
    freq_size: usize,
    stopwords: HashSet<String>,
    cloud_renderer: Box<dyn CloudRenderer>,
    chart_renderer: Box<dyn ChartRenderer>,
    cloud_image: Option<RasterImage>,
    frequency_image: Option<RasterImage>,
    generated_at: Option<DateTime<Utc>>,
    events: EventBus<CloudGenerator>,
}

impl CloudGenerator {
    pub fn new(options: CloudOptions, freq_size: usize) -> Self {
        Self {
            options,
            freq_size,
            stopwords: default_stopwords().iter().map(|w| w.to_lowercase()).collect(),
            cloud_renderer: Box::new(TileCloudRenderer),
            chart_renderer: Box::new(BarChartRenderer::default()),
            cloud_image: None,
            frequency_image: None,
            generated_at: None,
            events: EventBus::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            CloudOptions {
                width: config.width,
                height: config.height,
                background: config.background.clone(),
                min_font_size: config.min_font_size,
            },
            config.freq_size,
        )
    }

    pub fn with_renderers(
        mut self,
        cloud_renderer: Box<dyn CloudRenderer>,
        chart_renderer: Box<dyn ChartRenderer>,
    ) -> Self {
        self.cloud_renderer = cloud_renderer;
        self.chart_renderer = chart_renderer;
        self
    }

    /// Filters `counts` against the stop words, renders both images, stores them and
    /// notifies image then chart subscribers. Renderer failures leave the previous
    /// images in place and notify nobody.
    pub fn generate_from_count(&mut self, counts: &FrequencyMap) -> Result<()> {
        let filtered = self.filtered(counts);
        log::info!(
            "generating cloud from {} words ({} dropped as stop words)",
            filtered.len(),
            counts.len() - filtered.len()
        );

        let cloud = self.cloud_renderer.render(&filtered, &self.options)?;

        let (labels, values): (Vec<String>, Vec<u64>) =
            top_terms(&filtered, self.freq_size).into_iter().unzip();
        let chart = self.chart_renderer.render_bars(&labels, &values)?;

        self.cloud_image = Some(cloud);
        self.frequency_image = Some(chart);
        self.generated_at = Some(Utc::now());

        self.events.emit(Event::ImageReady, self);
        self.events.emit(Event::ChartReady, self);
        Ok(())
    }

    /// `counts` without the words the images leave out.
    pub fn filtered(&self, counts: &FrequencyMap) -> FrequencyMap {
        let mut filtered = counts.clone();
        filtered.retain(|word, _| !self.stopwords.contains(&word.to_lowercase()));
        filtered
    }

    /// Takes a snapshot of `stopwords` for later generations.
    pub fn set_stopwords(&mut self, stopwords: &StopWords) {
        self.stopwords = stopwords.lowercased();
    }

    pub fn get_cloud_image(&self) -> Option<&RasterImage> {
        self.cloud_image.as_ref()
    }

    pub fn get_frequency_image(&self) -> Option<&RasterImage> {
        self.frequency_image.as_ref()
    }

    pub fn generated_at(&self) -> Option<DateTime<Utc>> {
        self.generated_at
    }

    pub fn options(&self) -> &CloudOptions {
        &self.options
    }

    pub fn get_width(&self) -> u32 {
        self.options.width
    }

    pub fn set_width(&mut self, width: u32) {
        self.options.width = width;
    }

    pub fn get_height(&self) -> u32 {
        self.options.height
    }

    pub fn set_height(&mut self, height: u32) {
        self.options.height = height;
    }

    pub fn get_background_color(&self) -> &str {
        &self.options.background
    }

    pub fn set_background_color(&mut self, background: impl Into<String>) {
        self.options.background = background.into();
    }

    pub fn get_min_font_size(&self) -> u32 {
        self.options.min_font_size
    }

    pub fn set_min_font_size(&mut self, min_font_size: u32) {
        self.options.min_font_size = min_font_size;
    }

    pub fn get_freq_size(&self) -> usize {
        self.freq_size
    }

    pub fn set_freq_size(&mut self, freq_size: usize) {
        self.freq_size = freq_size;
    }

    pub fn subscribe_image<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&CloudGenerator) + Send + Sync + 'static,
    {
        self.events.subscribe(Event::ImageReady, callback)
    }

    pub fn subscribe_chart<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&CloudGenerator) + Send + Sync + 'static,
    {
        self.events.subscribe(Event::ChartReady, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> Result<()> {
        self.events.unsubscribe(id)
    }
}

impl Default for CloudGenerator {
    fn default() -> Self {
        Self::new(CloudOptions::default(), DEFAULT_FREQ_SIZE)
    }
}

impl fmt::Debug for CloudGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudGenerator")
            .field("options", &self.options)
            .field("freq_size", &self.freq_size)
            .field("stopwords", &self.stopwords.len())
            .field("generated_at", &self.generated_at)
            .finish()
    }
}
