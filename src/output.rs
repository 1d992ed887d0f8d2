//! CLI output formatting.
//!
//! Each display has a pure `format_*` function returning lines, for
//! testability, and a `print_*` wrapper that writes them to stdout.
//!
//! # Output Format
//!
//! ## Build progress
//!
//! ```text
//! 000 A0
//!     ✗ ../assets/A0.avif: No such file or directory (os error 2)
//!     → ../assets/A0.webp (webp, 1200x1600)
//!     main photo inserted
//! 001 A1
//!     → ../assets/A1.jpg (jpg, 800x600)
//!     gallery item inserted
//! 002 A2
//!     ✗ ../assets/A2.avif: No such file or directory (os error 2)
//!     ...
//!     not found
//! ```
//!
//! ## Build summary
//!
//! ```text
//! Person A
//!     Main: ../assets/A0.webp
//!     Gallery: 1 photo
//!         001 ../assets/A1.jpg
//!     Probes: 18
//! ```
//!
//! ## Probe
//!
//! ```text
//! A1
//!     avif  ✗ No such file or directory (os error 2)
//!     webp  ✗ No such file or directory (os error 2)
//!     jpg   ✓ loaded 800x600
//! Found: ../assets/A1.jpg
//! ```

use crate::gallery::{GalleryEvent, GalleryReport};
use crate::resolve::Resolution;

/// Format an index as 3-digit zero-padded.
fn format_index(index: u32) -> String {
    format!("{:0>3}", index)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Build progress
// ============================================================================

/// Format one build event.
///
/// Each base name gets a header line; its probes and verdict follow as
/// indented detail lines, printed as they happen.
pub fn format_gallery_event(event: &GalleryEvent) -> Vec<String> {
    match event {
        GalleryEvent::Resolving { index, base_name } => {
            vec![format!("{} {}", format_index(*index), base_name)]
        }
        GalleryEvent::ProbeFailed { url, reason } => {
            vec![format!("{}✗ {}: {}", indent(1), url, reason)]
        }
        GalleryEvent::Found { hit, .. } => {
            vec![format!(
                "{}→ {} ({}, {}x{})",
                indent(1),
                hit.url,
                hit.ext,
                hit.width,
                hit.height
            )]
        }
        GalleryEvent::NotFound { .. } => vec![format!("{}not found", indent(1))],
        GalleryEvent::MainInserted { .. } => {
            vec![format!("{}main photo inserted", indent(1))]
        }
        GalleryEvent::ItemAdded { .. } => {
            vec![format!("{}gallery item inserted", indent(1))]
        }
        GalleryEvent::RegionMissing { selector } => {
            vec![format!("Region {} not on page, skipped", selector)]
        }
        GalleryEvent::RegionHidden { selector } => {
            vec![format!("Region {} hidden", selector)]
        }
    }
}

// ============================================================================
// Build summary
// ============================================================================

pub fn format_report(report: &GalleryReport) -> Vec<String> {
    let Some(prefix) = &report.prefix else {
        return vec!["Nothing built: no prefix given".to_string()];
    };

    let mut lines = vec![format!("Person {}", prefix)];
    match &report.main {
        Some(hit) => lines.push(format!("{}Main: {}", indent(1), hit.url)),
        None => lines.push(format!("{}Main: none", indent(1))),
    }
    lines.push(format!(
        "{}Gallery: {}",
        indent(1),
        plural(report.added, "photo", "photos")
    ));
    for item in &report.items {
        lines.push(format!(
            "{}{} {}",
            indent(2),
            format_index(item.index),
            item.hit.url
        ));
    }
    lines.push(format!("{}Probes: {}", indent(1), report.probes));
    lines
}

pub fn print_report(report: &GalleryReport) {
    for line in format_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Probe
// ============================================================================

/// Format every attempt for a single base name, then the verdict.
pub fn format_resolution(base_name: &str, resolution: &Resolution) -> Vec<String> {
    let width = resolution
        .attempts
        .iter()
        .map(|a| a.ext.len())
        .max()
        .unwrap_or(0);

    let mut lines = vec![base_name.to_string()];
    for attempt in &resolution.attempts {
        let mark = if attempt.outcome.is_loaded() { "✓" } else { "✗" };
        lines.push(format!(
            "{}{:<width$}  {} {}",
            indent(1),
            attempt.ext,
            mark,
            attempt.outcome,
        ));
    }
    match &resolution.hit {
        Some(hit) => lines.push(format!("Found: {}", hit.url)),
        None => lines.push(format!(
            "Not found: {} (tried {})",
            base_name,
            plural(resolution.attempts.len(), "extension", "extensions")
        )),
    }
    lines
}

pub fn print_resolution(base_name: &str, resolution: &Resolution) {
    for line in format_resolution(base_name, resolution) {
        println!("{}", line);
    }
}
