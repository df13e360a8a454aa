//! Raster output for the cloud and the bar chart.
//!
//! Glyph rendering is left to whoever implements [`CloudRenderer`]; the bundled
//! renderers only lay out coloured blocks so the pipeline produces a usable PNG
//! without a font stack.

use image::{ImageBuffer, ImageFormat, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

use crate::config::{DEFAULT_BACKGROUND, DEFAULT_HEIGHT, DEFAULT_MIN_FONT_SIZE, DEFAULT_WIDTH};
use crate::error::{Error, Result};
use crate::frequency::FrequencyMap;

/// An encoded PNG plus its dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl RasterImage {
    pub fn encode(image: &RgbImage) -> Result<Self> {
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| Error::Render(e.to_string()))?;
        Ok(Self {
            width: image.width(),
            height: image.height(),
            png,
        })
    }

    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        std::fs::write(path, &self.png)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudOptions {
    pub width: u32,
    pub height: u32,
    pub background: String,
    pub min_font_size: u32,
}

impl Default for CloudOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            background: DEFAULT_BACKGROUND.to_string(),
            min_font_size: DEFAULT_MIN_FONT_SIZE,
        }
    }
}

pub trait CloudRenderer: Send + Sync {
    fn render(&self, words: &FrequencyMap, options: &CloudOptions) -> Result<RasterImage>;
}

pub trait ChartRenderer: Send + Sync {
    fn render_bars(&self, labels: &[String], counts: &[u64]) -> Result<RasterImage>;
}

/// Accepts a handful of colour names and `#rgb` / `#rrggbb` hex.
pub fn parse_color(color: &str) -> Result<Rgb<u8>> {
    let color = color.trim().to_lowercase();
    let rgb = match color.as_str() {
        "white" => [255, 255, 255],
        "black" => [0, 0, 0],
        "red" => [220, 20, 60],
        "green" => [34, 139, 34],
        "blue" => [30, 90, 200],
        "yellow" => [255, 215, 0],
        "gray" | "grey" => [128, 128, 128],
        "navy" => [0, 0, 128],
        hex if hex.starts_with('#') => parse_hex(&hex[1..])
            .ok_or_else(|| Error::Render(format!("unknown colour {color:?}")))?,
        _ => return Err(Error::Render(format!("unknown colour {color:?}"))),
    };
    Ok(Rgb(rgb))
}

fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some([channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?]),
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = v * 17;
            }
            Some(rgb)
        }
        _ => None,
    }
}

const PALETTE: [[u8; 3]; 6] = [
    [31, 119, 180],
    [255, 127, 14],
    [44, 160, 44],
    [214, 39, 40],
    [148, 103, 189],
    [140, 86, 75],
];

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
    let x_end = x.saturating_add(w).min(img.width());
    let y_end = y.saturating_add(h).min(img.height());
    for py in y..y_end {
        for px in x..x_end {
            img.put_pixel(px, py, color);
        }
    }
}

/// Lays words out left to right in rows, one square tile per word, side length
/// scaled between the minimum font size and a sixth of the canvas. Words that no
/// longer fit are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct TileCloudRenderer;

impl CloudRenderer for TileCloudRenderer {
    fn render(&self, words: &FrequencyMap, options: &CloudOptions) -> Result<RasterImage> {
        if options.width == 0 || options.height == 0 {
            return Err(Error::Render("cloud dimensions must be positive".to_string()));
        }
        let background = parse_color(&options.background)?;
        let mut img: RgbImage = ImageBuffer::from_pixel(options.width, options.height, background);

        let ranked = words.ranked();
        let max = ranked.first().map(|(_, c)| *c).unwrap_or(1) as f64;
        let shortest = options.width.min(options.height);
        let floor = options.min_font_size.clamp(1, shortest);
        let ceiling = (shortest / 6).max(floor);
        let gap = 2;

        let (mut x, mut y, mut row_height) = (0u32, 0u32, 0u32);
        let mut placed = 0usize;
        for (idx, (_, count)) in ranked.iter().enumerate() {
            let side = floor + ((ceiling - floor) as f64 * (*count as f64 / max)) as u32;
            if x.saturating_add(side) > options.width {
                x = 0;
                y = y.saturating_add(row_height.saturating_add(gap));
                row_height = 0;
            }
            if y.saturating_add(side) > options.height {
                break;
            }
            fill_rect(&mut img, x, y, side, side, Rgb(PALETTE[idx % PALETTE.len()]));
            x = x.saturating_add(side.saturating_add(gap));
            row_height = row_height.max(side);
            placed += 1;
        }
        log::debug!("placed {placed} of {} cloud tiles", ranked.len());

        RasterImage::encode(&img)
    }
}

/// Vertical bars scaled to the largest count, in the order given.
#[derive(Debug, Clone, Copy)]
pub struct BarChartRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for BarChartRenderer {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

impl ChartRenderer for BarChartRenderer {
    fn render_bars(&self, labels: &[String], counts: &[u64]) -> Result<RasterImage> {
        if labels.len() != counts.len() {
            return Err(Error::Render(format!(
                "{} labels for {} counts",
                labels.len(),
                counts.len()
            )));
        }
        let mut img: RgbImage = ImageBuffer::from_pixel(self.width, self.height, Rgb([255, 255, 255]));
        let margin = 20;
        let plot_width = self.width.saturating_sub(2 * margin);
        let plot_height = self.height.saturating_sub(2 * margin);

        if let Some(max) = counts.iter().copied().max().filter(|m| *m > 0) {
            let slot = plot_width / counts.len() as u32;
            let bar_width = (slot * 3 / 4).max(1);
            for (i, count) in counts.iter().enumerate() {
                let bar_height = (plot_height as f64 * (*count as f64 / max as f64)) as u32;
                let x = margin + i as u32 * slot;
                let y = margin + plot_height - bar_height;
                fill_rect(&mut img, x, y, bar_width, bar_height, Rgb(PALETTE[0]));
            }
        }
        // baseline
        fill_rect(&mut img, margin, margin + plot_height, plot_width, 1, Rgb([0, 0, 0]));

        RasterImage::encode(&img)
    }
}
