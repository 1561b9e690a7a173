//! Content run types produced by extraction.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::source::{BitmapRef, FontRef};

/// Fraction of the font size above the baseline.
pub(crate) const ASCENT_FACTOR: f32 = 0.8;

/// Fraction of the font size below the baseline.
pub(crate) const DESCENT_FACTOR: f32 = 0.2;

/// A typed content unit in reading order.
///
/// Runs are immutable once extracted; the layout engine reads them and
/// addresses them by their position in the extracted sequence, which is
/// the basis for focus-data ordinals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentRun {
    /// A text run
    Text(TextRun),
    /// A placed image
    Image(ImageRun),
}

impl ContentRun {
    /// The run's rect in the source page's coordinate space.
    pub fn origin(&self) -> Rect {
        match self {
            ContentRun::Text(t) => t.origin,
            ContentRun::Image(i) => i.origin,
        }
    }

    /// Check if this run is text.
    pub fn is_text(&self) -> bool {
        matches!(self, ContentRun::Text(_))
    }

    /// Check if this run is an image.
    pub fn is_image(&self) -> bool {
        matches!(self, ContentRun::Image(_))
    }
}

/// A text run with its original font metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRun {
    /// NFC-normalized text content
    pub text: String,
    /// Font reference from the source page
    pub font: FontRef,
    /// Font size in points
    pub font_size: f32,
    /// Rect the run occupied on the source page (y-up)
    pub origin: Rect,
}

impl TextRun {
    /// Nominal line height of this run (ascent + descent).
    pub fn height(&self) -> f32 {
        self.font_size * (ASCENT_FACTOR + DESCENT_FACTOR)
    }

    /// Nominal ascent of this run.
    pub fn ascent(&self) -> f32 {
        self.font_size * ASCENT_FACTOR
    }
}

/// An image run with its intrinsic size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRun {
    /// Bitmap resource reference (borrowed from the source page)
    pub bitmap: BitmapRef,
    /// Rect the image occupied on the source page (y-up)
    pub origin: Rect,
}
