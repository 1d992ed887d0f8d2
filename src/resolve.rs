//! Asset resolution: find the first existing image for a base name.
//!
//! Given a base path and a base name, the resolver walks the extension
//! priority list in order and probes `base_path + base_name + "." + ext`
//! until one loads:
//!
//! ```text
//! A1.avif   ✗ failed
//! A1.webp   ✗ failed
//! A1.jpg    ✓ loaded  → ProbeHit { url: "…/A1.jpg", ext: "jpg" }
//! ```
//!
//! Candidates are generated lazily, so nothing past the first hit is ever
//! built or probed. A failed probe is an expected branch of the search, not
//! an error: it is logged at debug level and the next candidate is tried.
//! Only exhaustion of the whole list yields "not found".
//!
//! Every probe is bounded by the resolver's timeout. A stalled probe reports
//! [`LoadOutcome::TimedOut`] and counts as a failure.

use crate::loader::{Dimensions, ImageLoader, LoadOutcome};
use crate::naming;
use serde::Serialize;
use std::time::Duration;

/// Extensions tried when no order is configured. Lowercase first, then the
/// uppercase spellings cameras and some exporters produce.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "avif", "webp", "jpg", "jpeg", "png", "AVIF", "WEBP", "JPG", "JPEG", "PNG",
];

/// Default per-probe timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Ordered list of extension candidates. First success wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionOrder(Vec<String>);

impl ExtensionOrder {
    pub fn new(extensions: Vec<String>) -> Self {
        Self(extensions)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lazily yield the candidate URLs for `base_name`, in priority order.
    pub fn candidates<'a>(
        &'a self,
        base_path: &'a str,
        base_name: &'a str,
    ) -> impl Iterator<Item = Candidate> + 'a {
        self.0.iter().map(move |ext| Candidate {
            url: naming::candidate_url(base_path, base_name, ext),
            ext: ext.clone(),
        })
    }
}

impl Default for ExtensionOrder {
    fn default() -> Self {
        Self(DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect())
    }
}

/// One URL to probe and the extension that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    pub ext: String,
}

/// A successful probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeHit {
    pub url: String,
    pub ext: String,
    pub width: u32,
    pub height: u32,
}

/// One probe and what came of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub url: String,
    pub ext: String,
    pub outcome: LoadOutcome,
}

/// Full trace of resolving one base name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub hit: Option<ProbeHit>,
    /// Every probe made, in order. The last one is the hit, if any.
    pub attempts: Vec<Attempt>,
}

impl Resolution {
    /// Probes that did not load.
    pub fn failures(&self) -> impl Iterator<Item = &Attempt> {
        self.attempts.iter().filter(|a| !a.outcome.is_loaded())
    }
}

/// Sequential first-match resolver over an [`ImageLoader`].
pub struct Resolver<L> {
    loader: L,
    order: ExtensionOrder,
    timeout: Duration,
}

impl<L: ImageLoader> Resolver<L> {
    pub fn new(loader: L, order: ExtensionOrder, timeout: Duration) -> Self {
        Self {
            loader,
            order,
            timeout,
        }
    }

    /// Resolve `base_name`, returning the hit and every attempt made.
    pub fn resolve(&self, base_path: &str, base_name: &str) -> Resolution {
        self.resolve_with(base_path, base_name, |_| {})
    }

    /// Like [`resolve`](Self::resolve), but hands each attempt to
    /// `on_attempt` as soon as its probe returns.
    pub fn resolve_with(
        &self,
        base_path: &str,
        base_name: &str,
        mut on_attempt: impl FnMut(&Attempt),
    ) -> Resolution {
        let mut attempts = Vec::new();
        for candidate in self.order.candidates(base_path, base_name) {
            let outcome = self.loader.load(&candidate.url, self.timeout);
            let attempt = Attempt {
                url: candidate.url,
                ext: candidate.ext,
                outcome,
            };
            on_attempt(&attempt);

            if let LoadOutcome::Loaded(Dimensions { width, height }) = attempt.outcome {
                let hit = ProbeHit {
                    url: attempt.url.clone(),
                    ext: attempt.ext.clone(),
                    width,
                    height,
                };
                attempts.push(attempt);
                return Resolution {
                    hit: Some(hit),
                    attempts,
                };
            }
            log::debug!("probe {} failed: {}", attempt.url, attempt.outcome);
            attempts.push(attempt);
        }
        Resolution {
            hit: None,
            attempts,
        }
    }

    /// Resolve `base_name` and keep only the hit.
    pub fn find_first_available(&self, base_path: &str, base_name: &str) -> Option<ProbeHit> {
        self.resolve(base_path, base_name).hit
    }
}
