//! # Person Gallery
//!
//! Builds a photo page for a person from whatever image files happen to
//! exist. Assets are named by convention, a prefix plus an index (`A0`,
//! `A1`, ...), and each may be stored in any of several formats. Nothing
//! lists which files exist, so every base name is resolved by probing.
//!
//! # Architecture: Resolve, Then Insert
//!
//! ```text
//! 1. Resolve   A0 → try A0.avif, A0.webp, A0.jpg, …  → first that loads
//! 2. Insert    hit → <img> in #main-photo, or <figure><img> in .gallery
//! 3. Render    Page → standalone HTML (CLI only)
//! ```
//!
//! Index 0 is the main photo. Indices `from..=to` (default `1..=9`) fill the
//! gallery in ascending order, skipping any that resolve to nothing.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`resolve`] | Extension priority list and first-match resolver |
//! | [`loader`] | `ImageLoader` trait with filesystem and HTTP backends, per-probe timeouts |
//! | [`gallery`] | [`build_person_gallery`]: main photo plus gallery grid |
//! | [`page`] | DOM-like page model (selector-addressed regions) rendered with Maud |
//! | [`naming`] | `prefix + index` base names and alt text |
//! | [`config`] | `gallery.toml` loading, validation, merging, and CSS generation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Sequential Probing With a Hard Timeout
//!
//! Probes run one at a time, in priority order, and stop at the first hit.
//! Firing all extensions at once would be faster but would also fetch files
//! that lose the priority race. Every probe carries a timeout so one stalled
//! request cannot hang the whole build; a timed-out probe counts as a miss.
//!
//! ## A Page Model Instead of Raw HTML
//!
//! The builder mutates a small [`page::Page`] (look up a region, clear it,
//! append nodes) rather than emitting markup. That keeps the insertion rules
//! testable as plain data and leaves escaping to Maud at render time.
//!
//! ## Loaded Means Identified
//!
//! A probe succeeds only when the bytes are an image whose dimensions can be
//! read. An HTML 404 page served with status 200, or a zero-byte upload, is
//! a miss, the same as a browser `<img>` firing `onerror`.

pub mod config;
pub mod gallery;
pub mod loader;
pub mod naming;
pub mod output;
pub mod page;
pub mod resolve;

pub use gallery::{GalleryOptions, GalleryReport, build_person_gallery};

#[cfg(test)]
pub(crate) mod test_helpers;
