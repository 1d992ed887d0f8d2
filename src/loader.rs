//! Image-loading primitives used by the asset resolver.
//!
//! A load "succeeds" the way a browser `<img>` fires `onload`: the resource
//! exists and is an image we can identify. Identification only reads the
//! header, so no pixel data is decoded.
//!
//! ## Backends
//!
//! | Base path | Loader | Transport |
//! |---|---|---|
//! | `http://…`, `https://…` | [`HttpLoader`] | `reqwest` blocking client |
//! | anything else | [`FsLoader`] | filesystem read on a worker thread |
//!
//! ## Format identification
//!
//! | Format | Crate |
//! |---|---|
//! | JPEG, PNG, WebP | `image` (header only, `into_dimensions`) |
//! | AVIF | `avif-parse` (container metadata, no AV1 decode) |
//!
//! Every load carries a timeout. A load that outlives it reports
//! [`LoadOutcome::TimedOut`] and the resolver moves on.

use image::{ImageFormat, ImageReader};
use std::fmt;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Pixel dimensions read from an image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Outcome of a single load attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(Dimensions),
    Failed(String),
    TimedOut,
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded(_))
    }
}

impl fmt::Display for LoadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadOutcome::Loaded(d) => write!(f, "loaded {}x{}", d.width, d.height),
            LoadOutcome::Failed(reason) => write!(f, "{reason}"),
            LoadOutcome::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Something that can attempt to load an image by URL.
///
/// Implementations must return within roughly `timeout`; the resolver relies
/// on this to never stall.
pub trait ImageLoader {
    fn load(&self, url: &str, timeout: Duration) -> LoadOutcome;
}

impl<L: ImageLoader + ?Sized> ImageLoader for &L {
    fn load(&self, url: &str, timeout: Duration) -> LoadOutcome {
        (**self).load(url, timeout)
    }
}

impl<L: ImageLoader + ?Sized> ImageLoader for Box<L> {
    fn load(&self, url: &str, timeout: Duration) -> LoadOutcome {
        (**self).load(url, timeout)
    }
}

/// Identify an in-memory image, returning its dimensions.
pub fn identify_bytes(data: &[u8]) -> Result<Dimensions, String> {
    let format = image::guess_format(data).map_err(|e| format!("not an image: {e}"))?;
    if format == ImageFormat::Avif {
        return identify_avif(data);
    }
    let (width, height) = ImageReader::with_format(Cursor::new(data), format)
        .into_dimensions()
        .map_err(|e| format!("failed to read {format:?} header: {e}"))?;
    Ok(Dimensions { width, height })
}

/// Read dimensions from AVIF container metadata.
fn identify_avif(data: &[u8]) -> Result<Dimensions, String> {
    let avif = avif_parse::read_avif(&mut Cursor::new(data))
        .map_err(|e| format!("failed to parse AVIF: {e:?}"))?;
    let meta = avif
        .primary_item_metadata()
        .map_err(|e| format!("failed to read AVIF metadata: {e:?}"))?;
    Ok(Dimensions {
        width: meta.max_frame_width.get(),
        height: meta.max_frame_height.get(),
    })
}

// ============================================================================
// Filesystem
// ============================================================================

/// Loads images from the local filesystem.
///
/// URLs are treated as paths; a leading `file://` is stripped. Relative
/// paths are joined onto the loader's root, which should be the directory
/// of the page that will reference them. Without a root they resolve
/// against the working directory.
///
/// The read runs on a detached worker thread so a hung filesystem (stale
/// NFS mount, FUSE) is bounded by the timeout. A timed-out worker is
/// abandoned.
#[derive(Debug, Default, Clone)]
pub struct FsLoader {
    root: Option<PathBuf>,
}

impl FsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader resolving relative URLs against `root`.
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn path_for(&self, url: &str) -> PathBuf {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        match &self.root {
            Some(root) => root.join(path),
            None => path.to_path_buf(),
        }
    }
}

impl ImageLoader for FsLoader {
    fn load(&self, url: &str, timeout: Duration) -> LoadOutcome {
        let path = self.path_for(url);
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let outcome = match std::fs::read(&path) {
                Ok(data) => match identify_bytes(&data) {
                    Ok(dims) => LoadOutcome::Loaded(dims),
                    Err(msg) => LoadOutcome::Failed(msg),
                },
                Err(e) => LoadOutcome::Failed(e.to_string()),
            };
            // Receiver is gone if we already timed out.
            let _ = tx.send(outcome);
        });

        match rx.recv_timeout(timeout) {
            Ok(outcome) => outcome,
            Err(mpsc::RecvTimeoutError::Timeout) => LoadOutcome::TimedOut,
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                LoadOutcome::Failed("load worker exited without a result".into())
            }
        }
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// Loads images over HTTP(S) with a per-request timeout.
pub struct HttpLoader {
    client: reqwest::blocking::Client,
}

impl HttpLoader {
    pub fn new() -> Result<Self, LoaderError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("person-gallery/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl ImageLoader for HttpLoader {
    fn load(&self, url: &str, timeout: Duration) -> LoadOutcome {
        let response = match self.client.get(url).timeout(timeout).send() {
            Ok(r) => r,
            Err(e) if e.is_timeout() => return LoadOutcome::TimedOut,
            Err(e) => return LoadOutcome::Failed(e.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            return LoadOutcome::Failed(format!("HTTP {status}"));
        }

        match identify_stream(response, HEADER_PREFIX_BYTES, MAX_BODY_BYTES) {
            Ok(Ok(dims)) => LoadOutcome::Loaded(dims),
            Ok(Err(msg)) => LoadOutcome::Failed(msg),
            Err(e) if is_timeout(&e) => LoadOutcome::TimedOut,
            Err(e) => LoadOutcome::Failed(e.to_string()),
        }
    }
}

/// Bytes read before the first identification attempt. Enough for the
/// header of every supported format short of AVIF files with late metadata.
const HEADER_PREFIX_BYTES: u64 = 256 * 1024;

/// Hard cap on how much of a response body is ever read.
const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// Identify an image from a stream without reading all of it.
///
/// Tries the first `prefix` bytes, then at most `max` bytes in total. The
/// outer error is a read failure, the inner one an identification failure.
fn identify_stream(
    body: impl Read,
    prefix: u64,
    max: u64,
) -> io::Result<Result<Dimensions, String>> {
    let mut body = body.take(max);
    let mut data = Vec::new();
    (&mut body).take(prefix).read_to_end(&mut data)?;
    match identify_bytes(&data) {
        Ok(dims) => return Ok(Ok(dims)),
        // Short read: the whole body is already here.
        Err(msg) if (data.len() as u64) < prefix => return Ok(Err(msg)),
        Err(_) => {}
    }
    body.read_to_end(&mut data)?;
    Ok(identify_bytes(&data))
}

fn is_timeout(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::TimedOut
        || e.get_ref()
            .and_then(|inner| inner.downcast_ref::<reqwest::Error>())
            .is_some_and(reqwest::Error::is_timeout)
}

/// Whether a base path addresses a remote server.
pub fn is_remote(base_path: &str) -> bool {
    base_path.starts_with("http://") || base_path.starts_with("https://")
}

/// Pick the loader that matches a base path.
///
/// `page_dir` is the directory of the page the URLs will be written into;
/// filesystem lookups of relative paths start there.
pub fn loader_for(
    base_path: &str,
    page_dir: &Path,
) -> Result<Box<dyn ImageLoader>, LoaderError> {
    if is_remote(base_path) {
        Ok(Box::new(HttpLoader::new()?))
    } else {
        Ok(Box::new(FsLoader::rooted(page_dir)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{write_avif, write_jpeg, write_png};

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn identify_jpeg_bytes() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("a.jpg");
        write_jpeg(&path, 40, 30);
        let dims = identify_bytes(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(dims, Dimensions { width: 40, height: 30 });
    }

    #[test]
    fn identify_avif_bytes_uses_container_metadata() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("a.avif");
        write_avif(&path, 32, 24);
        let dims = identify_bytes(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(dims, Dimensions { width: 32, height: 24 });
    }

    #[test]
    fn identify_rejects_non_image() {
        assert!(identify_bytes(b"<html>not found</html>").is_err());
    }

    #[test]
    fn identify_rejects_truncated_png() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("a.png");
        write_png(&path, 8, 8);
        let data = std::fs::read(&path).unwrap();
        assert!(identify_bytes(&data[..10]).is_err());
    }

    #[test]
    fn fs_loader_loads_existing_image() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("A1.png");
        write_png(&path, 16, 9);
        let outcome = FsLoader::new().load(path.to_str().unwrap(), TIMEOUT);
        assert_eq!(outcome, LoadOutcome::Loaded(Dimensions { width: 16, height: 9 }));
    }

    #[test]
    fn fs_loader_strips_file_scheme() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("A1.png");
        write_png(&path, 4, 4);
        let url = format!("file://{}", path.display());
        assert!(FsLoader::new().load(&url, TIMEOUT).is_loaded());
    }

    #[test]
    fn rooted_fs_loader_resolves_relative_urls_from_root() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("people/assets")).unwrap();
        write_png(&tmp.path().join("people/assets/A1.png"), 4, 4);
        write_png(&tmp.path().join("A2.png"), 4, 4);

        let loader = FsLoader::rooted(tmp.path().join("people"));
        assert!(loader.load("assets/A1.png", TIMEOUT).is_loaded());
        assert!(loader.load("../A2.png", TIMEOUT).is_loaded());
        assert!(!loader.load("people/assets/A1.png", TIMEOUT).is_loaded());
    }

    #[test]
    fn rooted_fs_loader_keeps_absolute_urls() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("A1.png");
        write_png(&path, 4, 4);

        let loader = FsLoader::rooted("/nonexistent-page-dir");
        assert!(loader.load(path.to_str().unwrap(), TIMEOUT).is_loaded());
        let url = format!("file://{}", path.display());
        assert!(loader.load(&url, TIMEOUT).is_loaded());
    }

    #[test]
    fn fs_loader_missing_file_fails() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("missing.jpg");
        let outcome = FsLoader::new().load(path.to_str().unwrap(), TIMEOUT);
        assert!(matches!(outcome, LoadOutcome::Failed(_)));
    }

    #[test]
    fn fs_loader_non_image_fails() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("A1.jpg");
        std::fs::write(&path, "plain text").unwrap();
        let outcome = FsLoader::new().load(path.to_str().unwrap(), TIMEOUT);
        assert!(matches!(outcome, LoadOutcome::Failed(_)));
    }

    #[test]
    fn identify_stream_stops_after_header() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("a.png");
        write_png(&path, 12, 7);
        let png = std::fs::read(&path).unwrap();

        // An endless body after the image: only the prefix is consumed.
        let body = Cursor::new(png).chain(io::repeat(0));
        let dims = identify_stream(body, 4096, 1 << 20).unwrap().unwrap();
        assert_eq!(dims, Dimensions { width: 12, height: 7 });
    }

    #[test]
    fn identify_stream_gives_up_at_cap() {
        let result = identify_stream(io::repeat(0), 1024, 8192).unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn identify_stream_short_body_is_read_once() {
        let result = identify_stream(&b"<html>gone</html>"[..], 1024, 8192).unwrap();
        assert!(result.unwrap_err().contains("not an image"));
    }

    #[test]
    fn outcome_display() {
        let loaded = LoadOutcome::Loaded(Dimensions { width: 3, height: 2 });
        assert_eq!(loaded.to_string(), "loaded 3x2");
        assert_eq!(LoadOutcome::Failed("HTTP 404 Not Found".into()).to_string(), "HTTP 404 Not Found");
        assert_eq!(LoadOutcome::TimedOut.to_string(), "timed out");
    }

    #[test]
    fn remote_detection() {
        assert!(is_remote("http://example.test/"));
        assert!(is_remote("https://example.test/"));
        assert!(!is_remote("../assets/"));
        assert!(!is_remote("file:///srv/assets/"));
    }
}
