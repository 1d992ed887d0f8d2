//! Base-name conventions for person assets.
//!
//! Every asset of a person is addressed by a prefix followed by a decimal
//! index, with no separator:
//!
//! - `A0` → main photo of person `A`
//! - `A1` .. `A9` → gallery photos
//! - `Z12` → gallery photo 12 of person `Z`
//!
//! The file on disk (or behind a URL) adds one of the configured extensions:
//! `A0.avif`, `A1.jpg`, ...

/// Index reserved for the main photo.
pub const MAIN_INDEX: u32 = 0;

/// Build the base name for `prefix` and `index` (`"A"`, `3` → `"A3"`).
pub fn base_name(prefix: &str, index: u32) -> String {
    format!("{prefix}{index}")
}

/// Join a base path, base name, and extension into a candidate URL.
///
/// The base path is used verbatim, so it must carry its own trailing
/// separator (`"../assets/"`, `"https://cdn.example.com/people/"`).
pub fn candidate_url(base_path: &str, base_name: &str, ext: &str) -> String {
    format!("{base_path}{base_name}.{ext}")
}

/// Alt text for the main photo: the base alt text, or the base name when
/// no alt text is configured.
pub fn main_alt(alt_base: &str, prefix: &str) -> String {
    if alt_base.is_empty() {
        base_name(prefix, MAIN_INDEX)
    } else {
        alt_base.to_string()
    }
}

/// Alt text for gallery photo `index`: `"{alt_base} {index}"`, or the base
/// name when no alt text is configured.
pub fn gallery_alt(alt_base: &str, prefix: &str, index: u32) -> String {
    if alt_base.is_empty() {
        base_name(prefix, index)
    } else {
        format!("{alt_base} {index}")
    }
}
