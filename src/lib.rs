//! # repage
//!
//! Progressive PDF page reflow for Rust.
//!
//! This library takes a parsed, fixed-layout page and re-paginates its
//! content into a caller-specified viewport — the small-screen reading
//! problem. Content is extracted in reading order, packed into
//! width-bounded lines, optionally mapped onto discrete screen-sized
//! pages, and addressed through stable focus data that survives
//! re-layout at any viewport size.
//!
//! ## Quick Start
//!
//! ```
//! use repage::{reflow, ReflowMode, Rotation};
//! use repage::source::{FontRef, SourceSpan, StaticPage};
//!
//! fn main() -> repage::Result<()> {
//!     let source = StaticPage::new().with_span(SourceSpan::new(
//!         "Hello, reflow!",
//!         72.0,
//!         700.0,
//!         120.0,
//!         12.0,
//!         FontRef::new("Helvetica"),
//!     ));
//!
//!     // Reflow into a 320x480 viewport and drain the operation.
//!     let page = reflow(&source, 320.0, 480.0, ReflowMode::Normal)?;
//!
//!     let size = page.content_size()?;
//!     let matrix = page.matrix(0.0, 0.0, 320.0, 480.0, Rotation::None)?;
//!     let focus = page.focus_data(&matrix, 10.0, 10.0)?;
//!     println!("content {}x{}, focus at run {}", size.width, size.height, focus.run());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Reading order extraction**: baseline grouping, RTL-aware
//!   ordering, NFC-normalized text
//! - **Width-bounded line packing** with line/top spacing and
//!   aspect-preserving image downscale
//! - **Three paging modes**: continuous, screen-paged, and
//!   no-truncate (blocks never cut at page boundaries)
//! - **Resumable operations**: pagination and rendering run as
//!   caller-driven step sequences, cancellable between steps
//! - **Stable focus data**: serializable position identity that
//!   survives re-layout at different viewport sizes

pub mod error;
pub mod extract;
pub mod focus;
pub mod geometry;
pub mod layout;
pub mod progress;
pub mod render;
pub mod source;

// Re-export commonly used types
pub use error::{Error, Result};
pub use extract::{extract_runs, ContentRun, ImageRun, TextRun};
pub use focus::FocusData;
pub use geometry::{Matrix, Point, Rect, Rotation, Size};
pub use layout::{BlockKind, LayoutBlock, LineSegment, ReflowMode, ReflowPage, MIN_VIEWPORT_EXTENT};
pub use progress::{LayoutProgress, Progress};
pub use render::{PageRenderer, RenderContext, RenderProgress};
pub use source::{BitmapRef, FontRef, SourceImage, SourcePage, SourceSpan, StaticPage};

/// Reflow a parsed page into a viewport, draining the pagination
/// operation in one call.
///
/// Convenience wrapper over the progressive protocol; use
/// [`ReflowPage::start_parse`] directly when layout should interleave
/// with other work.
pub fn reflow(
    source: &dyn SourcePage,
    width: f32,
    height: f32,
    mode: ReflowMode,
) -> Result<ReflowPage<'_>> {
    let mut page = ReflowPage::new(source)?;
    page.set_size(width, height)?;
    page.start_parse(mode)?.finish()?;
    Ok(page)
}
