//! Gallery configuration module.
//!
//! Handles loading, validating, and merging `gallery.toml`. The file is
//! sparse: stock defaults are the base layer and the user file overrides
//! only the keys it names. Command-line flags override both.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [probe]
//! extensions = ["avif", "webp", "jpg", "jpeg", "png",
//!               "AVIF", "WEBP", "JPG", "JPEG", "PNG"]
//! timeout_ms = 5000          # Per-probe timeout
//!
//! [gallery]
//! base_path = "../assets/"   # Relative to the page being built
//! main_selector = "#main-photo"
//! gallery_selector = ".gallery"
//! from = 1                   # First gallery index (inclusive)
//! to = 9                     # Last gallery index (inclusive, span <= 1000)
//! alt_base = ""              # Alt text; empty = use the base name
//! item_class = "gallery-item"
//! hide_missing_main = false
//! hide_empty_gallery = false
//!
//! [style]
//! main_max_width = "100%"
//! main_border_radius = "12px"
//! item_width = "100%"
//!
//! [theme]
//! background = "#ffffff"
//! text = "#111111"
//! gap = "1rem"
//! column_min_width = "12rem"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::page::Selector;
use crate::resolve::{DEFAULT_EXTENSIONS, DEFAULT_TIMEOUT, ExtensionOrder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Largest number of gallery indices one build may resolve.
pub const MAX_GALLERY_SPAN: u32 = 1000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `gallery.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Extension priority and probe timeout.
    pub probe: ProbeConfig,
    /// Where assets live and which regions to fill.
    pub gallery: GallerySection,
    /// Inline styles applied to inserted images.
    pub style: ImageStyleConfig,
    /// Page-level CSS variables.
    pub theme: ThemeConfig,
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probe.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "probe.extensions must not be empty".into(),
            ));
        }
        let mut seen = BTreeSet::new();
        for ext in &self.probe.extensions {
            if ext.is_empty() || ext.contains(['.', '/', '\\']) {
                return Err(ConfigError::Validation(format!(
                    "probe.extensions: invalid extension {ext:?}"
                )));
            }
            if !seen.insert(ext.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "probe.extensions: duplicate extension {ext:?}"
                )));
            }
        }
        if self.probe.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "probe.timeout_ms must be greater than 0".into(),
            ));
        }
        let g = &self.gallery;
        if g.from <= g.to && g.to - g.from >= MAX_GALLERY_SPAN {
            return Err(ConfigError::Validation(format!(
                "gallery.from..gallery.to spans {} indices (max {MAX_GALLERY_SPAN})",
                u64::from(g.to - g.from) + 1
            )));
        }
        for (key, value) in [
            ("gallery.main_selector", &self.gallery.main_selector),
            ("gallery.gallery_selector", &self.gallery.gallery_selector),
        ] {
            if !value.is_empty() && Selector::parse(value).is_none() {
                return Err(ConfigError::Validation(format!(
                    "{key}: {value:?} is not a #id or .class selector"
                )));
            }
        }
        Ok(())
    }
}

/// Probe settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Extensions tried in order; first success wins. Case-sensitive.
    pub extensions: Vec<String>,
    /// Per-probe timeout in milliseconds.
    pub timeout_ms: u64,
}

impl ProbeConfig {
    pub fn extension_order(&self) -> ExtensionOrder {
        ExtensionOrder::new(self.extensions.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
        }
    }
}

/// Asset location and target regions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GallerySection {
    /// Prepended verbatim to every base name; keep the trailing separator.
    /// Relative paths are relative to the page, not the working directory.
    pub base_path: String,
    /// Region for the main photo. Empty disables the main photo.
    pub main_selector: String,
    /// Region for the gallery grid. Empty disables the gallery.
    pub gallery_selector: String,
    /// First gallery index, inclusive.
    pub from: u32,
    /// Last gallery index, inclusive. The span is capped at
    /// [`MAX_GALLERY_SPAN`].
    pub to: u32,
    /// Base alt text. Empty falls back to the base name.
    pub alt_base: String,
    /// Class of the `<figure>` wrapping each gallery image.
    pub item_class: String,
    /// Hide the main region when no main photo exists.
    pub hide_missing_main: bool,
    /// Hide the gallery region when no gallery photo exists.
    pub hide_empty_gallery: bool,
}

impl Default for GallerySection {
    fn default() -> Self {
        Self {
            base_path: "../assets/".to_string(),
            main_selector: "#main-photo".to_string(),
            gallery_selector: ".gallery".to_string(),
            from: 1,
            to: 9,
            alt_base: String::new(),
            item_class: "gallery-item".to_string(),
            hide_missing_main: false,
            hide_empty_gallery: false,
        }
    }
}

/// Inline styles on inserted images. Empty values are omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageStyleConfig {
    pub main_max_width: String,
    pub main_border_radius: String,
    pub item_width: String,
}

impl Default for ImageStyleConfig {
    fn default() -> Self {
        Self {
            main_max_width: "100%".to_string(),
            main_border_radius: "12px".to_string(),
            item_width: "100%".to_string(),
        }
    }
}

/// Page theme, emitted as CSS custom properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    pub background: String,
    pub text: String,
    /// Gap between gallery items (CSS value).
    pub gap: String,
    /// Minimum gallery column width (CSS value).
    pub column_min_width: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#111111".to_string(),
            gap: "1rem".to_string(),
            column_min_width: "12rem".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(GalleryConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<GalleryConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `path` over the stock defaults. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<GalleryConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `gallery.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Person Gallery Configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Command-line flags override them.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Probing
# ---------------------------------------------------------------------------
[probe]
# Extensions tried in order for every base name; the first file that loads
# wins. Matching is case-sensitive, so list uppercase spellings explicitly.
extensions = ["avif", "webp", "jpg", "jpeg", "png", "AVIF", "WEBP", "JPG", "JPEG", "PNG"]

# Give up on a single probe after this many milliseconds and try the next
# extension.
timeout_ms = 5000

# ---------------------------------------------------------------------------
# Gallery
# ---------------------------------------------------------------------------
[gallery]
# Prepended verbatim to every base name and written as the <img src>, so a
# relative path is relative to the page. When building, files are looked up
# next to the output HTML file. Keep the trailing slash.
# Use an http:// or https:// URL to probe a web server instead of the disk.
base_path = "../assets/"

# Region receiving the main photo (index 0). Empty disables it.
main_selector = "#main-photo"

# Region receiving the gallery grid. Empty disables it.
gallery_selector = ".gallery"

# Gallery index range, inclusive. At most 1000 indices.
from = 1
to = 9

# Alt text. Main photo uses it as is, gallery photos append the index.
# Empty falls back to the base name (A0, A1, ...).
alt_base = ""

# Class of the <figure> wrapping each gallery photo.
item_class = "gallery-item"

# Hide the main region when there is no main photo.
hide_missing_main = false

# Hide the gallery region when no gallery photo was found.
hide_empty_gallery = false

# ---------------------------------------------------------------------------
# Inline image styles (empty value = omit the declaration)
# ---------------------------------------------------------------------------
[style]
main_max_width = "100%"
main_border_radius = "12px"
item_width = "100%"

# ---------------------------------------------------------------------------
# Page theme
# ---------------------------------------------------------------------------
[theme]
background = "#ffffff"
text = "#111111"
gap = "1rem"
column_min_width = "12rem"
"##
}

/// Page stylesheet: theme variables followed by grid rules for the region
/// matched by `gallery_selector`.
pub fn generate_css(theme: &ThemeConfig, gallery_selector: &str) -> String {
    format!(
        r#":root {{
    --color-bg: {background};
    --color-text: {text};
    --gallery-gap: {gap};
    --gallery-column-min: {column_min};
}}

body {{
    margin: 0 auto;
    max-width: 72rem;
    padding: 2rem;
    background: var(--color-bg);
    color: var(--color-text);
    font-family: system-ui, sans-serif;
}}

{grid} {{
    display: grid;
    grid-template-columns: repeat(auto-fill, minmax(var(--gallery-column-min), 1fr));
    gap: var(--gallery-gap);
    margin-top: var(--gallery-gap);
}}

{grid} figure {{
    margin: 0;
}}"#,
        background = theme.background,
        text = theme.text,
        gap = theme.gap,
        column_min = theme.column_min_width,
        grid = gallery_selector,
    )
}
