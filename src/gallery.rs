//! Person gallery builder.
//!
//! Fills two regions of a [`Page`] with a person's photos:
//!
//! ```text
//! #main-photo   ← {prefix}0           eager, high priority
//! .gallery      ← {prefix}{from..=to} lazy, low priority, one <figure> each
//! ```
//!
//! Each base name goes through the [`Resolver`], which probes the extension
//! list in order. Resolution is strictly sequential: the main photo first,
//! then gallery indices in ascending order. An index that resolves to
//! nothing is skipped silently, and a selector that matches no region is
//! skipped without probing.
//!
//! Results are memoized per invocation, so no base name is probed twice even
//! when the gallery range includes the main index.
//!
//! Progress is reported through an optional channel of [`GalleryEvent`]s,
//! which the CLI drains on a printer thread.

use crate::config::{GalleryConfig, ImageStyleConfig};
use crate::loader::ImageLoader;
use crate::naming::{self, MAIN_INDEX};
use crate::page::{FetchPriority, ImgElement, Loading, Node, Page, Selector};
use crate::resolve::{ProbeHit, Resolver};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::mpsc::Sender;

/// Inputs for one gallery build.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryOptions {
    /// Person identity prefix (`"A"`, `"Z"`). Required; nothing happens without it.
    pub prefix: Option<String>,
    /// Prepended verbatim to every base name.
    pub base_path: String,
    /// Region for the main photo, if any.
    pub main_selector: Option<String>,
    /// Region for the gallery grid, if any.
    pub gallery_selector: Option<String>,
    /// First gallery index, inclusive.
    pub gallery_from: u32,
    /// Last gallery index, inclusive. `from > to` is an empty range.
    pub gallery_to: u32,
    pub alt_base: String,
    pub item_class: String,
    pub hide_missing_main: bool,
    pub hide_empty_gallery: bool,
    pub style: ImageStyleConfig,
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self::from_config(None, &GalleryConfig::default())
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl GalleryOptions {
    /// Build options from a loaded config. Empty selectors disable their region.
    pub fn from_config(prefix: Option<&str>, config: &GalleryConfig) -> Self {
        let g = &config.gallery;
        Self {
            prefix: prefix.map(str::to_string),
            base_path: g.base_path.clone(),
            main_selector: non_empty(&g.main_selector),
            gallery_selector: non_empty(&g.gallery_selector),
            gallery_from: g.from,
            gallery_to: g.to,
            alt_base: g.alt_base.clone(),
            item_class: g.item_class.clone(),
            hide_missing_main: g.hide_missing_main,
            hide_empty_gallery: g.hide_empty_gallery,
            style: config.style.clone(),
        }
    }
}

/// An empty page with a region for each configured selector.
///
/// Selectors that do not parse get no region, so the builder skips them.
pub fn person_page(title: &str, opts: &GalleryOptions) -> Page {
    [&opts.main_selector, &opts.gallery_selector]
        .into_iter()
        .flatten()
        .filter_map(|s| Selector::parse(s))
        .fold(Page::new(title), Page::with_region)
}

/// Progress events emitted while building.
#[derive(Debug, Clone, PartialEq)]
pub enum GalleryEvent {
    /// Probing for a base name is starting.
    Resolving { index: u32, base_name: String },
    /// One extension candidate did not load. Sent as soon as the probe returns.
    ProbeFailed { url: String, reason: String },
    /// A base name resolved.
    Found {
        index: u32,
        base_name: String,
        hit: ProbeHit,
    },
    /// Every extension failed for a base name.
    NotFound { index: u32, base_name: String },
    MainInserted { url: String },
    ItemAdded { index: u32, url: String },
    /// A configured selector matched no region on the page.
    RegionMissing { selector: String },
    RegionHidden { selector: String },
}

/// A gallery image that made it onto the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryItem {
    pub index: u32,
    #[serde(flatten)]
    pub hit: ProbeHit,
}

/// What a build did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GalleryReport {
    pub prefix: Option<String>,
    /// Main photo, if it was inserted.
    pub main: Option<ProbeHit>,
    /// Gallery images in insertion (ascending index) order.
    pub items: Vec<GalleryItem>,
    /// Number of gallery images inserted.
    pub added: usize,
    /// Total probes issued.
    pub probes: usize,
}

/// Per-invocation resolution state.
struct Session<'a, L> {
    resolver: &'a Resolver<L>,
    base_path: &'a str,
    prefix: &'a str,
    resolved: BTreeMap<u32, Option<ProbeHit>>,
    probes: usize,
    events: Option<Sender<GalleryEvent>>,
}

impl<L: ImageLoader> Session<'_, L> {
    fn emit(&self, event: GalleryEvent) {
        if let Some(tx) = &self.events {
            tx.send(event).ok();
        }
    }

    /// Resolve `index`, probing only the first time it is asked for.
    fn lookup(&mut self, index: u32) -> Option<ProbeHit> {
        if let Some(cached) = self.resolved.get(&index) {
            return cached.clone();
        }

        let base_name = naming::base_name(self.prefix, index);
        self.emit(GalleryEvent::Resolving {
            index,
            base_name: base_name.clone(),
        });
        let events = &self.events;
        let resolution = self
            .resolver
            .resolve_with(self.base_path, &base_name, |attempt| {
                if attempt.outcome.is_loaded() {
                    return;
                }
                if let Some(tx) = events {
                    tx.send(GalleryEvent::ProbeFailed {
                        url: attempt.url.clone(),
                        reason: attempt.outcome.to_string(),
                    })
                    .ok();
                }
            });
        self.probes += resolution.attempts.len();
        match &resolution.hit {
            Some(hit) => self.emit(GalleryEvent::Found {
                index,
                base_name,
                hit: hit.clone(),
            }),
            None => self.emit(GalleryEvent::NotFound { index, base_name }),
        }

        self.resolved.insert(index, resolution.hit.clone());
        resolution.hit
    }
}

fn main_image(hit: &ProbeHit, opts: &GalleryOptions, prefix: &str) -> ImgElement {
    ImgElement::new(
        &hit.url,
        &naming::main_alt(&opts.alt_base, prefix),
        Loading::Eager,
        FetchPriority::High,
    )
    .with_style("max-width", &opts.style.main_max_width)
    .with_style("border-radius", &opts.style.main_border_radius)
}

fn gallery_image(hit: &ProbeHit, opts: &GalleryOptions, prefix: &str, index: u32) -> ImgElement {
    ImgElement::new(
        &hit.url,
        &naming::gallery_alt(&opts.alt_base, prefix, index),
        Loading::Lazy,
        FetchPriority::Low,
    )
    .with_style("width", &opts.style.item_width)
    .with_style("display", "block")
}

/// Populate `page` with the main photo and gallery for `opts.prefix`.
///
/// Without a prefix this logs a warning and returns an empty report; the
/// page is left untouched and nothing is probed.
pub fn build_person_gallery<L: ImageLoader>(
    page: &mut Page,
    resolver: &Resolver<L>,
    opts: &GalleryOptions,
    events: Option<Sender<GalleryEvent>>,
) -> GalleryReport {
    let Some(prefix) = opts.prefix.as_deref().filter(|p| !p.is_empty()) else {
        log::warn!("build_person_gallery: prefix is required");
        return GalleryReport::default();
    };

    let mut session = Session {
        resolver,
        base_path: &opts.base_path,
        prefix,
        resolved: BTreeMap::new(),
        probes: 0,
        events,
    };
    let mut report = GalleryReport {
        prefix: Some(prefix.to_string()),
        ..GalleryReport::default()
    };

    if let Some(selector) = &opts.main_selector {
        if page.query_selector(selector).is_some() {
            let hit = session.lookup(MAIN_INDEX);
            if let Some(host) = page.query_selector_mut(selector) {
                match hit {
                    Some(hit) => {
                        host.clear();
                        host.append(Node::img(main_image(&hit, opts, prefix)));
                        log::info!("main photo for {prefix}: {}", hit.url);
                        session.emit(GalleryEvent::MainInserted {
                            url: hit.url.clone(),
                        });
                        report.main = Some(hit);
                    }
                    None if opts.hide_missing_main => {
                        host.hide();
                        session.emit(GalleryEvent::RegionHidden {
                            selector: selector.clone(),
                        });
                    }
                    None => {}
                }
            }
        } else {
            session.emit(GalleryEvent::RegionMissing {
                selector: selector.clone(),
            });
        }
    }

    if let Some(selector) = &opts.gallery_selector {
        if page.query_selector(selector).is_some() {
            for index in opts.gallery_from..=opts.gallery_to {
                let Some(hit) = session.lookup(index) else {
                    continue;
                };
                let Some(grid) = page.query_selector_mut(selector) else {
                    break;
                };
                grid.append(Node::figure(
                    &opts.item_class,
                    gallery_image(&hit, opts, prefix, index),
                ));
                log::info!("gallery photo {index} for {prefix}: {}", hit.url);
                session.emit(GalleryEvent::ItemAdded {
                    index,
                    url: hit.url.clone(),
                });
                report.items.push(GalleryItem { index, hit });
            }
            report.added = report.items.len();

            if report.added == 0 && opts.hide_empty_gallery {
                if let Some(grid) = page.query_selector_mut(selector) {
                    grid.hide();
                }
                session.emit(GalleryEvent::RegionHidden {
                    selector: selector.clone(),
                });
            }
        } else {
            session.emit(GalleryEvent::RegionMissing {
                selector: selector.clone(),
            });
        }
    }

    report.probes = session.probes;
    report
}
