//! The parsed-page collaborator boundary.
//!
//! Reflow consumes an already-parsed page through the [`SourcePage`]
//! trait: positioned text spans and placed images in the page's own
//! coordinate space (PDF convention, `y` growing upward from the
//! bottom). How that content was decoded — content-stream parsing, font
//! encoding, stream decompression — is the parser's business and stays
//! behind this seam.
//!
//! [`StaticPage`] is an owned implementation that can be built in code
//! or deserialized from JSON; the CLI and the test suite feed pages
//! through it.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// A font reference carried by text spans.
///
/// The reflow engine never opens the font; the name is forwarded to the
/// renderer so it can resolve the face the same way it would for normal
/// page rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontRef {
    /// Base font name (e.g., "Helvetica-Bold")
    pub name: String,
}

impl FontRef {
    /// Create a font reference.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl std::fmt::Display for FontRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// A non-owning reference to an image resource of the source page.
///
/// The referenced bitmap data lives in the source page's resource
/// store and must outlive every reflow page built from it; the
/// `ReflowPage<'_>` lifetime ties the two together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitmapRef {
    /// Resource identifier within the source page
    pub id: String,
    /// Intrinsic width in pixels
    pub width_px: u32,
    /// Intrinsic height in pixels
    pub height_px: u32,
}

impl BitmapRef {
    /// Create a bitmap reference.
    pub fn new(id: impl Into<String>, width_px: u32, height_px: u32) -> Self {
        Self {
            id: id.into(),
            width_px,
            height_px,
        }
    }
}

/// A positioned text span as the parser produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSpan {
    /// Decoded text content
    pub text: String,
    /// X position of the left edge
    pub x: f32,
    /// Y position of the baseline (page coordinates, y-up)
    pub y: f32,
    /// Advance width of the span
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
    /// Font reference
    pub font: FontRef,
}

impl SourceSpan {
    /// Create a new span.
    pub fn new(
        text: impl Into<String>,
        x: f32,
        y: f32,
        width: f32,
        font_size: f32,
        font: FontRef,
    ) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            font_size,
            font,
        }
    }
}

/// A placed image as the parser produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceImage {
    /// Bitmap resource reference
    pub bitmap: BitmapRef,
    /// Placement rect in page coordinates (y-up; `y` is the bottom edge)
    pub rect: Rect,
}

impl SourceImage {
    /// Create a new placed image.
    pub fn new(bitmap: BitmapRef, rect: Rect) -> Self {
        Self { bitmap, rect }
    }
}

/// A parsed page, as seen by the reflow engine.
///
/// Implementations may stream spans and images out of their own content
/// model; the extractor consumes each iterator exactly once per layout
/// pass.
pub trait SourcePage {
    /// Whether content parsing has completed for this page.
    fn is_parsed(&self) -> bool;

    /// Positioned text spans, in whatever order the content stream
    /// painted them.
    fn spans(&self) -> Box<dyn Iterator<Item = SourceSpan> + '_>;

    /// Placed images, in paint order.
    fn images(&self) -> Box<dyn Iterator<Item = SourceImage> + '_>;
}

/// An owned, serializable [`SourcePage`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticPage {
    /// Text spans on the page
    #[serde(default)]
    pub spans: Vec<SourceSpan>,
    /// Placed images on the page
    #[serde(default)]
    pub images: Vec<SourceImage>,
    /// Whether the page counts as parsed (defaults to true)
    #[serde(default = "default_parsed")]
    pub parsed: bool,
}

fn default_parsed() -> bool {
    true
}

impl StaticPage {
    /// Create an empty parsed page.
    pub fn new() -> Self {
        Self {
            spans: Vec::new(),
            images: Vec::new(),
            parsed: true,
        }
    }

    /// Create a page that reports unparsed content.
    pub fn unparsed() -> Self {
        Self {
            parsed: false,
            ..Self::new()
        }
    }

    /// Add a text span.
    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.spans.push(span);
        self
    }

    /// Add a placed image.
    pub fn with_image(mut self, image: SourceImage) -> Self {
        self.images.push(image);
        self
    }
}

impl Default for StaticPage {
    fn default() -> Self {
        Self::new()
    }
}

impl SourcePage for StaticPage {
    fn is_parsed(&self) -> bool {
        self.parsed
    }

    fn spans(&self) -> Box<dyn Iterator<Item = SourceSpan> + '_> {
        Box::new(self.spans.iter().cloned())
    }

    fn images(&self) -> Box<dyn Iterator<Item = SourceImage> + '_> {
        Box::new(self.images.iter().cloned())
    }
}
