//! DOM-like page model and HTML rendering.
//!
//! The gallery builder never writes HTML directly. It mutates a [`Page`]:
//! looks up a [`Region`] by selector, clears it, appends nodes, or hides it.
//! Once building is done the page is rendered to a static HTML document.
//!
//! ```text
//! Page "Anna"
//! ├── #main-photo        Region → [Img]
//! └── .gallery           Region → [Figure(Img), Figure(Img), …]
//! ```
//!
//! ## Selectors
//!
//! Only simple selectors are supported: `#id` and `.class`. Anything else
//! (tag names, combinators, attribute selectors) does not parse, and a
//! lookup with it finds nothing.
//!
//! ## HTML Generation
//!
//! Rendering uses [maud](https://maud.lambda.xyz/), so every attribute and
//! text value is escaped automatically.

use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fmt;

/// A simple `#id` or `.class` selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Id(String),
    Class(String),
}

fn is_ident(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl Selector {
    /// Parse `#id` or `.class`. Returns `None` for anything else.
    pub fn parse(selector: &str) -> Option<Self> {
        let selector = selector.trim();
        if let Some(id) = selector.strip_prefix('#') {
            return is_ident(id).then(|| Selector::Id(id.to_string()));
        }
        if let Some(class) = selector.strip_prefix('.') {
            return is_ident(class).then(|| Selector::Class(class.to_string()));
        }
        None
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Id(id) => write!(f, "#{id}"),
            Selector::Class(class) => write!(f, ".{class}"),
        }
    }
}

/// `loading` attribute hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loading {
    Eager,
    Lazy,
}

impl Loading {
    pub fn as_str(self) -> &'static str {
        match self {
            Loading::Eager => "eager",
            Loading::Lazy => "lazy",
        }
    }
}

/// `fetchpriority` attribute hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPriority {
    High,
    Low,
}

impl FetchPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            FetchPriority::High => "high",
            FetchPriority::Low => "low",
        }
    }
}

/// An `<img>` element. Decoding is always `async`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImgElement {
    pub src: String,
    pub alt: String,
    pub loading: Loading,
    pub fetch_priority: FetchPriority,
    /// Inline style declarations as `(property, value)` pairs.
    pub style: Vec<(String, String)>,
}

impl ImgElement {
    pub fn new(src: &str, alt: &str, loading: Loading, fetch_priority: FetchPriority) -> Self {
        Self {
            src: src.to_string(),
            alt: alt.to_string(),
            loading,
            fetch_priority,
            style: Vec::new(),
        }
    }

    /// Add an inline style declaration. Empty values are skipped.
    pub fn with_style(mut self, property: &str, value: &str) -> Self {
        if !value.is_empty() {
            self.style.push((property.to_string(), value.to_string()));
        }
        self
    }

    /// Inline `style` attribute value, or `None` when there are no declarations.
    pub fn style_attr(&self) -> Option<String> {
        if self.style.is_empty() {
            return None;
        }
        Some(
            self.style
                .iter()
                .map(|(p, v)| format!("{p}: {v};"))
                .collect::<Vec<_>>()
                .join(" "),
        )
    }
}

/// A child node of a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Img(ImgElement),
    Figure { class: String, img: ImgElement },
}

impl Node {
    pub fn text(text: &str) -> Self {
        Node::Text(text.to_string())
    }

    pub fn img(img: ImgElement) -> Self {
        Node::Img(img)
    }

    pub fn figure(class: &str, img: ImgElement) -> Self {
        Node::Figure {
            class: class.to_string(),
            img,
        }
    }

    /// The image carried by this node, if any.
    pub fn image(&self) -> Option<&ImgElement> {
        match self {
            Node::Text(_) => None,
            Node::Img(img) | Node::Figure { img, .. } => Some(img),
        }
    }
}

/// A container on the page, addressed by its selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    selector: Selector,
    hidden: bool,
    children: Vec<Node>,
}

impl Region {
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            hidden: false,
            children: Vec::new(),
        }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Remove all children.
    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn append(&mut self, node: Node) {
        self.children.push(node);
    }

    pub fn hide(&mut self) {
        self.hidden = true;
    }
}

/// A page made of selector-addressed regions, rendered in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    regions: Vec<Region>,
}

impl Page {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            regions: Vec::new(),
        }
    }

    /// Add a region. A region with an equal selector is not added twice.
    pub fn with_region(mut self, selector: Selector) -> Self {
        if !self.regions.iter().any(|r| r.selector == selector) {
            self.regions.push(Region::new(selector));
        }
        self
    }

    /// Add pre-existing content to a region (placeholder text, say).
    pub fn with_content(mut self, selector: &str, node: Node) -> Self {
        if let Some(region) = self.query_selector_mut(selector) {
            region.append(node);
        }
        self
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Find the region matching `selector`.
    pub fn query_selector(&self, selector: &str) -> Option<&Region> {
        let selector = Selector::parse(selector)?;
        self.regions.iter().find(|r| r.selector == selector)
    }

    /// Find the region matching `selector` for mutation.
    pub fn query_selector_mut(&mut self, selector: &str) -> Option<&mut Region> {
        let selector = Selector::parse(selector)?;
        self.regions.iter_mut().find(|r| r.selector == selector)
    }
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body {
                (content)
            }
        }
    }
}

fn render_img(img: &ImgElement) -> Markup {
    html! {
        img src=(img.src)
            alt=(img.alt)
            decoding="async"
            loading=(img.loading.as_str())
            fetchpriority=(img.fetch_priority.as_str())
            style=[img.style_attr()];
    }
}

fn render_node(node: &Node) -> Markup {
    html! {
        @match node {
            Node::Text(text) => (text),
            Node::Img(img) => (render_img(img)),
            Node::Figure { class, img } => {
                figure class=(class) {
                    (render_img(img))
                }
            }
        }
    }
}

/// Renders one region as a `<div>` carrying its selector.
pub fn render_region(region: &Region) -> Markup {
    let (id, class) = match &region.selector {
        Selector::Id(id) => (Some(id.as_str()), None),
        Selector::Class(class) => (None, Some(class.as_str())),
    };
    html! {
        div id=[id] class=[class] hidden[region.hidden] {
            @for node in &region.children {
                (render_node(node))
            }
        }
    }
}

/// Renders the whole page as a standalone HTML document.
pub fn render_page(page: &Page, css: &str) -> Markup {
    let content = html! {
        header.page-header {
            h1 { (page.title) }
        }
        main.person-page {
            @for region in &page.regions {
                (render_region(region))
            }
        }
    };
    base_document(&page.title, css, content)
}
