//! Shared test utilities for the person-gallery test suite.
//!
//! Provides synthetic image writers for on-disk fixtures and a scripted
//! [`ScriptedLoader`] that answers probes from an in-memory set of URLs while
//! recording every attempt, so resolver and builder tests can assert the
//! exact probe sequence without touching the filesystem.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let loader = ScriptedLoader::with_existing(&["assets/A1.jpg"]);
//! let resolver = Resolver::new(&loader, ExtensionOrder::default(), TIMEOUT);
//! let hit = resolver.find_first_available("assets/", "A1");
//! assert_eq!(loader.attempts().len(), 3);
//! ```

use image::{DynamicImage, ImageEncoder, RgbImage};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Duration;

use crate::loader::{Dimensions, ImageLoader, LoadOutcome};

// =========================================================================
// Synthetic image files
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Write a small valid JPEG.
pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    let img = gradient(width, height);
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a small valid PNG.
pub fn write_png(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

/// Write a small valid lossless WebP.
pub fn write_webp(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, image::ImageFormat::WebP)
        .unwrap();
}

/// Write a small valid AVIF through the `image` crate's rav1e encoder.
pub fn write_avif(path: &Path, width: u32, height: u32) {
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    let encoder = image::codecs::avif::AvifEncoder::new_with_speed_quality(writer, 10, 60);
    DynamicImage::ImageRgb8(gradient(width, height))
        .write_with_encoder(encoder)
        .unwrap();
}

// =========================================================================
// Scripted loader
// =========================================================================

/// A loader whose answers are fixed up front.
///
/// URLs in `existing` load as 1×1 images. URLs in `stalled` report
/// [`LoadOutcome::TimedOut`]. Everything else fails as "not found".
#[derive(Default)]
pub struct ScriptedLoader {
    existing: BTreeSet<String>,
    stalled: BTreeSet<String>,
    attempts: RefCell<Vec<String>>,
    timeouts_seen: RefCell<BTreeMap<String, Duration>>,
}

impl ScriptedLoader {
    pub fn with_existing(urls: &[&str]) -> Self {
        Self {
            existing: urls.iter().map(|u| u.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn stall(mut self, urls: &[&str]) -> Self {
        self.stalled.extend(urls.iter().map(|u| u.to_string()));
        self
    }

    /// Every URL attempted, in order.
    pub fn attempts(&self) -> Vec<String> {
        self.attempts.borrow().clone()
    }

    /// Timeout passed with the attempt for `url`.
    pub fn timeout_for(&self, url: &str) -> Option<Duration> {
        self.timeouts_seen.borrow().get(url).copied()
    }
}

impl ImageLoader for ScriptedLoader {
    fn load(&self, url: &str, timeout: Duration) -> LoadOutcome {
        self.attempts.borrow_mut().push(url.to_string());
        self.timeouts_seen
            .borrow_mut()
            .insert(url.to_string(), timeout);
        if self.stalled.contains(url) {
            LoadOutcome::TimedOut
        } else if self.existing.contains(url) {
            LoadOutcome::Loaded(Dimensions {
                width: 1,
                height: 1,
            })
        } else {
            LoadOutcome::Failed("not found".into())
        }
    }
}
