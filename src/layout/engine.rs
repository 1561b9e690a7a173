//! The reflow page: configuration, lifecycle, and layout-derived queries.

use crate::error::{Error, Result};
use crate::extract::{extract_runs, ContentRun};
use crate::focus::{self, FocusData};
use crate::geometry::{Matrix, Point, Rotation, Size};
use crate::layout::block::LayoutBlock;
use crate::layout::paginate::{LayoutParams, Paginator, ReflowMode};
use crate::progress::LayoutProgress;
use crate::render::{PageRenderer, RenderContext, RenderProgress};
use crate::source::SourcePage;

/// Minimum viewport extent, exclusive, for each dimension.
pub const MIN_VIEWPORT_EXTENT: f32 = 20.0;

/// A page being reflowed into a caller-specified viewport.
///
/// Lifecycle: construct from a parsed source page, configure the
/// viewport (mandatory) and spacing, run the pagination operation to
/// completion through [`LayoutProgress`], then query content size,
/// viewport matrices, focus data, and drive rendering. Dropping the
/// page releases it and everything derived from it.
///
/// The page holds the source immutably and never mutates it; image
/// blocks borrow the source's bitmap resources for the page's lifetime.
pub struct ReflowPage<'s> {
    source: &'s dyn SourcePage,
    viewport: Option<Size>,
    line_space: f32,
    top_space: f32,
    layout: Option<LayoutData>,
}

/// Layout results, immutable once committed.
pub(crate) struct LayoutData {
    pub(crate) mode: ReflowMode,
    pub(crate) runs: Vec<ContentRun>,
    pub(crate) blocks: Vec<LayoutBlock>,
    pub(crate) content_size: Size,
    /// Run ordinal → index of the block carrying it.
    pub(crate) run_to_block: Vec<usize>,
}

impl<'s> ReflowPage<'s> {
    /// Create a reflow page over a parsed source page.
    ///
    /// Fails with [`Error::NotParsed`] when the source has not completed
    /// content parsing.
    pub fn new(source: &'s dyn SourcePage) -> Result<Self> {
        if !source.is_parsed() {
            return Err(Error::NotParsed);
        }
        Ok(Self {
            source,
            viewport: None,
            line_space: 0.0,
            top_space: 0.0,
            layout: None,
        })
    }

    /// Set the target viewport size. Mandatory before layout.
    ///
    /// Each dimension must exceed [`MIN_VIEWPORT_EXTENT`]; on failure
    /// the previous configuration is left unchanged.
    pub fn set_size(&mut self, width: f32, height: f32) -> Result<()> {
        self.ensure_configurable()?;
        if !(width > MIN_VIEWPORT_EXTENT && height > MIN_VIEWPORT_EXTENT) {
            return Err(Error::invalid(format!(
                "viewport {width}x{height}: each dimension must exceed {MIN_VIEWPORT_EXTENT}"
            )));
        }
        self.viewport = Some(Size::new(width, height));
        Ok(())
    }

    /// Set the additional inter-line gap. Defaults to 0.
    pub fn set_line_space(&mut self, line_space: f32) -> Result<()> {
        self.ensure_configurable()?;
        self.line_space = line_space;
        Ok(())
    }

    /// Set the vertical offset before the first line. Defaults to 0.
    pub fn set_top_space(&mut self, top_space: f32) -> Result<()> {
        self.ensure_configurable()?;
        if top_space < 0.0 {
            return Err(Error::invalid(format!(
                "top space must be non-negative, got {top_space}"
            )));
        }
        self.top_space = top_space;
        Ok(())
    }

    /// The configured viewport, if any.
    pub fn viewport(&self) -> Option<Size> {
        self.viewport
    }

    /// The configured inter-line gap.
    pub fn line_space(&self) -> f32 {
        self.line_space
    }

    /// The configured leading vertical offset.
    pub fn top_space(&self) -> f32 {
        self.top_space
    }

    /// Whether layout has completed.
    pub fn is_laid_out(&self) -> bool {
        self.layout.is_some()
    }

    /// Start the pagination operation.
    ///
    /// Returns a resumable handle; drive it with
    /// [`LayoutProgress::step`] or drain it with
    /// [`LayoutProgress::finish`]. Dropping the handle before completion
    /// cancels the operation and leaves this page configured but not
    /// laid out. Fails with [`Error::AlreadyFinished`] when already laid
    /// out and [`Error::InvalidParameter`] when the viewport was never
    /// configured.
    pub fn start_parse(&mut self, mode: ReflowMode) -> Result<LayoutProgress<'_, 's>> {
        if self.layout.is_some() {
            return Err(Error::AlreadyFinished);
        }
        let viewport = self
            .viewport
            .ok_or_else(|| Error::invalid("viewport size must be set before layout"))?;
        let runs = extract_runs(self.source)?;
        let paginator = Paginator::new(LayoutParams {
            viewport,
            line_space: self.line_space,
            top_space: self.top_space,
            mode,
        });
        Ok(LayoutProgress::new(self, runs, paginator, mode))
    }

    /// Discard a completed layout, returning to the configured state so
    /// parameters may change and layout may run again.
    pub fn reset(&mut self) {
        self.layout = None;
    }

    /// The laid-out content extent.
    pub fn content_size(&self) -> Result<Size> {
        Ok(self.laid_out()?.content_size)
    }

    /// Number of pages the content maps onto (1 under `Normal`).
    pub fn page_count(&self) -> Result<usize> {
        let layout = self.laid_out()?;
        if !layout.mode.is_paged() {
            return Ok(1);
        }
        let viewport = self.viewport.unwrap_or_default();
        if viewport.height <= 0.0 || layout.content_size.height <= 0.0 {
            return Ok(1);
        }
        Ok((layout.content_size.height / viewport.height).ceil() as usize)
    }

    /// The laid-out blocks, in reading order.
    pub fn blocks(&self) -> Result<&[LayoutBlock]> {
        Ok(&self.laid_out()?.blocks)
    }

    /// The extracted runs, in reading order.
    pub fn runs(&self) -> Result<&[ContentRun]> {
        Ok(&self.laid_out()?.runs)
    }

    /// The mode layout ran under.
    pub fn mode(&self) -> Result<ReflowMode> {
        Ok(self.laid_out()?.mode)
    }

    /// Compute the transform from reflow-local coordinates onto the
    /// device rect at `(x, y)` with extent `(width, height)`, rotated by
    /// the given quarter turn.
    ///
    /// Valid only once laid out. Matrices are computed fresh per call;
    /// results are only meaningful together with queries made through
    /// the same matrix.
    pub fn matrix(
        &self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        rotation: Rotation,
    ) -> Result<Matrix> {
        let layout = self.laid_out()?;
        if width <= 0.0 || height <= 0.0 {
            return Err(Error::invalid(format!(
                "device viewport {width}x{height}: extents must be positive"
            )));
        }
        let mut content = layout.content_size;
        // Empty content maps as a full viewport.
        let viewport = self.viewport.unwrap_or(content);
        if content.width <= 0.0 {
            content.width = viewport.width;
        }
        if content.height <= 0.0 {
            content.height = viewport.height;
        }
        Ok(Matrix::fit(
            content,
            x,
            y,
            Size::new(width, height),
            rotation,
        ))
    }

    /// Encode the content position under a device point as stable focus
    /// data. See [`crate::focus`].
    pub fn focus_data(&self, matrix: &Matrix, x: f32, y: f32) -> Result<FocusData> {
        focus::focus_data(self.laid_out()?, matrix, Point::new(x, y))
    }

    /// Resolve focus data back to a device point at the current layout.
    pub fn focus_position(&self, matrix: &Matrix, data: &FocusData) -> Result<Point> {
        focus::focus_position(self.laid_out()?, matrix, data)
    }

    /// Start a progressive render of the laid-out blocks.
    ///
    /// Only the context's transform is honored; other render
    /// configuration does not apply to reflow rendering.
    pub fn start_render<'r, R: PageRenderer>(
        &'r self,
        context: &RenderContext,
        renderer: &'r mut R,
    ) -> Result<RenderProgress<'r, R>> {
        let layout = self.laid_out()?;
        Ok(RenderProgress::new(layout, context.transform(), renderer))
    }

    pub(crate) fn laid_out(&self) -> Result<&LayoutData> {
        self.layout.as_ref().ok_or(Error::NotLaidOut)
    }

    /// Commit a finished pagination pass. Called exactly once by the
    /// progress driver.
    pub(crate) fn commit_layout(
        &mut self,
        mode: ReflowMode,
        runs: Vec<ContentRun>,
        blocks: Vec<LayoutBlock>,
        content_size: Size,
    ) {
        let mut run_to_block = vec![usize::MAX; runs.len()];
        for (index, block) in blocks.iter().enumerate() {
            for segment in &block.segments {
                run_to_block[segment.run] = index;
            }
        }
        debug_assert!(run_to_block.iter().all(|&b| b != usize::MAX));
        self.layout = Some(LayoutData {
            mode,
            runs,
            blocks,
            content_size,
            run_to_block,
        });
    }

    fn ensure_configurable(&self) -> Result<()> {
        if self.layout.is_some() {
            return Err(Error::AlreadyFinished);
        }
        Ok(())
    }
}
