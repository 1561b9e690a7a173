//! Render adapter: driving an external renderer over laid-out blocks.
//!
//! The engine does not paint pixels. It walks blocks in reading order
//! and issues draw calls — text with its original font metadata, images
//! by their borrowed bitmap references — through the [`PageRenderer`]
//! collaborator, applying the caller's transform. Rendering is a
//! progressive operation like pagination: a bounded batch of blocks per
//! step, cancellation by dropping the handle.
//!
//! Only the [`RenderContext`] transform is honored here. Renderer
//! configuration that applies to normal page rendering has no effect on
//! reflow rendering and is deliberately not representable.

use crate::error::{Error, Result};
use crate::extract::ContentRun;
use crate::geometry::{Matrix, Rect};
use crate::layout::LayoutData;
use crate::progress::Progress;
use crate::source::{BitmapRef, FontRef};

/// Blocks painted per [`RenderProgress::step`] call.
pub(crate) const RENDER_STEP_BLOCKS: usize = 16;

/// The external renderer collaborator.
///
/// Implementations resolve fonts and bitmap resources themselves; the
/// adapter supplies device-space rects and effective font sizes.
/// Failures surface to the caller as [`Error::Render`]-class errors and
/// abort the in-flight render operation.
pub trait PageRenderer {
    /// Paint a text run into the given device rect.
    fn draw_text(&mut self, text: &str, font: &FontRef, font_size: f32, rect: Rect) -> Result<()>;

    /// Paint an image into the given device rect.
    fn draw_image(&mut self, bitmap: &BitmapRef, rect: Rect) -> Result<()>;
}

/// Render configuration for reflow rendering.
///
/// Carries the transform override and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderContext {
    transform: Matrix,
}

impl RenderContext {
    /// Create a context with the identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reflow-local → device transform.
    pub fn with_transform(mut self, transform: Matrix) -> Self {
        self.transform = transform;
        self
    }

    /// The configured transform.
    pub fn transform(&self) -> Matrix {
        self.transform
    }
}

/// A resumable render operation.
///
/// Obtained from [`crate::ReflowPage::start_render`]. A failure during a
/// step invalidates the handle; the owning page is unaffected and a
/// fresh render may be started.
pub struct RenderProgress<'r, R: PageRenderer> {
    runs: &'r [ContentRun],
    blocks: &'r [crate::layout::LayoutBlock],
    transform: Matrix,
    renderer: &'r mut R,
    next_block: usize,
    finished: bool,
}

impl<'r, R: PageRenderer> RenderProgress<'r, R> {
    pub(crate) fn new(layout: &'r LayoutData, transform: Matrix, renderer: &'r mut R) -> Self {
        Self {
            runs: &layout.runs,
            blocks: &layout.blocks,
            transform,
            renderer,
            next_block: 0,
            finished: false,
        }
    }

    /// Total number of blocks this operation will paint.
    pub fn total_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the operation has completed (or failed).
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Paint one bounded batch of blocks.
    ///
    /// Fails with [`Error::AlreadyFinished`] once the operation has
    /// completed or failed.
    pub fn step(&mut self) -> Result<Progress> {
        if self.finished {
            return Err(Error::AlreadyFinished);
        }
        let end = (self.next_block + RENDER_STEP_BLOCKS).min(self.blocks.len());
        while self.next_block < end {
            let block = &self.blocks[self.next_block];
            if let Err(e) = self.paint_block(block) {
                self.finished = true;
                return Err(e);
            }
            self.next_block += 1;
        }
        if self.next_block == self.blocks.len() {
            self.finished = true;
            log::debug!("render finished: {} blocks painted", self.blocks.len());
            return Ok(Progress::Finished);
        }
        Ok(Progress::InProgress {
            done: self.next_block,
            total: self.blocks.len(),
        })
    }

    /// Drive the render to completion.
    pub fn finish(mut self) -> Result<()> {
        while !self.step()?.is_finished() {}
        Ok(())
    }

    fn paint_block(&mut self, block: &crate::layout::LayoutBlock) -> Result<()> {
        let scale = self.transform.vertical_scale();
        for segment in &block.segments {
            let device_rect = self.transform.transform_rect(segment.rect);
            match &self.runs[segment.run] {
                ContentRun::Text(text) => {
                    self.renderer.draw_text(
                        &text.text,
                        &text.font,
                        text.font_size * scale,
                        device_rect,
                    )?;
                }
                ContentRun::Image(image) => {
                    self.renderer.draw_image(&image.bitmap, device_rect)?;
                }
            }
        }
        Ok(())
    }
}
