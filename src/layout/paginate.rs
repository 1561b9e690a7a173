//! The pagination cursor.
//!
//! Runs are consumed in reading order and packed into width-bounded
//! lines; images become their own blocks, downscaled to the viewport
//! width when wider. The cursor owns all in-flight state, so the
//! progress driver can advance it a bounded batch at a time and throw it
//! away on cancellation without touching the owning page.

use crate::extract::{ContentRun, ImageRun, TextRun, ASCENT_FACTOR};
use crate::geometry::{Rect, Size};
use crate::layout::block::{BlockKind, LayoutBlock, LineSegment};

/// How content maps onto pages during reflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReflowMode {
    /// One continuous strip, no page boundaries.
    #[default]
    Normal,
    /// Content maps onto discrete viewport-height pages; a block may
    /// straddle a boundary and render cut.
    Image,
    /// Paged like `Image`, but a block that would straddle a boundary is
    /// deferred whole to the next page.
    NoTruncate,
}

impl ReflowMode {
    /// Whether this mode divides content into pages.
    pub fn is_paged(&self) -> bool {
        !matches!(self, ReflowMode::Normal)
    }
}

/// Resolved layout parameters, frozen for one pagination pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LayoutParams {
    pub viewport: Size,
    pub line_space: f32,
    pub top_space: f32,
    pub mode: ReflowMode,
}

/// A pending text line.
#[derive(Debug, Default)]
struct LineBuilder {
    segments: Vec<(usize, f32, f32)>, // (run index, width, font size)
    used_width: f32,
}

impl LineBuilder {
    fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn push(&mut self, run: usize, width: f32, font_size: f32) {
        self.segments.push((run, width, font_size));
        self.used_width += width;
    }

    fn max_font_size(&self) -> f32 {
        self.segments
            .iter()
            .map(|&(_, _, size)| size)
            .fold(0.0, f32::max)
    }
}

/// The resumable pagination state machine.
#[derive(Debug)]
pub(crate) struct Paginator {
    params: LayoutParams,
    next_run: usize,
    pen_y: f32,
    line: LineBuilder,
    blocks: Vec<LayoutBlock>,
    done: bool,
}

impl Paginator {
    pub(crate) fn new(params: LayoutParams) -> Self {
        Self {
            pen_y: params.top_space,
            params,
            next_run: 0,
            line: LineBuilder::default(),
            blocks: Vec::new(),
            done: false,
        }
    }

    /// Lay out up to `batch` further runs. Returns the number of runs
    /// consumed so far; after the final run the pending line is flushed
    /// and the paginator reports done.
    pub(crate) fn step(&mut self, runs: &[ContentRun], batch: usize) -> usize {
        let end = (self.next_run + batch).min(runs.len());
        while self.next_run < end {
            match &runs[self.next_run] {
                ContentRun::Text(text) => self.place_text(self.next_run, text),
                ContentRun::Image(image) => self.place_image(self.next_run, image),
            }
            self.next_run += 1;
        }
        if self.next_run == runs.len() && !self.done {
            self.flush_line();
            self.done = true;
            log::debug!(
                "pagination finished: {} blocks over {} page(s)",
                self.blocks.len(),
                self.page_count()
            );
        }
        self.next_run
    }

    pub(crate) fn is_done(&self) -> bool {
        self.done
    }

    /// Consume the paginator, yielding blocks and the content size.
    pub(crate) fn into_result(self) -> (Vec<LayoutBlock>, Size) {
        debug_assert!(self.done);
        let bottom = self
            .blocks
            .iter()
            .map(|b| b.rect.bottom())
            .fold(0.0, f32::max);
        let height = if self.params.mode.is_paged() && bottom > 0.0 {
            // Whole pages, so every page renders with uniform extent.
            let page_h = self.params.viewport.height;
            (bottom / page_h).ceil() * page_h
        } else {
            bottom
        };
        (self.blocks, Size::new(self.params.viewport.width, height))
    }

    fn page_count(&self) -> usize {
        self.blocks.iter().map(|b| b.page).max().map_or(1, |p| p + 1)
    }

    fn place_text(&mut self, idx: usize, run: &TextRun) {
        let width = run.origin.width;
        if !self.line.is_empty() && self.line.used_width + width > self.params.viewport.width {
            self.flush_line();
        }
        // An oversized run on an empty line is kept whole and overflows;
        // the renderer clips it at the viewport edge.
        self.line.push(idx, width, run.font_size);
    }

    fn place_image(&mut self, idx: usize, image: &ImageRun) {
        self.flush_line();

        let (iw, ih) = intrinsic_size(image);
        let scale = if iw > self.params.viewport.width {
            self.params.viewport.width / iw
        } else {
            1.0
        };
        let (w, h) = (iw * scale, ih * scale);

        let top = self.resolve_block_top(h);
        let rect = Rect::new(0.0, top, w, h);
        self.blocks.push(LayoutBlock {
            rect,
            page: self.page_of(top),
            kind: BlockKind::Image,
            segments: vec![LineSegment { run: idx, rect }],
        });
        self.pen_y = top + h + self.params.line_space;
    }

    fn flush_line(&mut self) {
        if self.line.is_empty() {
            return;
        }
        let line = std::mem::take(&mut self.line);
        let height = line.max_font_size();
        let ascent = height * ASCENT_FACTOR;

        let top = self.resolve_block_top(height);
        let mut x = 0.0;
        let mut segments = Vec::with_capacity(line.segments.len());
        for (run, width, font_size) in line.segments {
            // Baseline-align: smaller runs sit lower within the line.
            let seg_top = top + ascent - font_size * ASCENT_FACTOR;
            segments.push(LineSegment {
                run,
                rect: Rect::new(x, seg_top, width, font_size),
            });
            x += width;
        }
        self.blocks.push(LayoutBlock {
            rect: Rect::new(0.0, top, line.used_width, height),
            page: self.page_of(top),
            kind: BlockKind::Line,
            segments,
        });
        self.pen_y = top + height + self.params.line_space;
    }

    /// Where a block of the given height starts, honoring the mode's
    /// page-boundary rule.
    fn resolve_block_top(&self, height: f32) -> f32 {
        let top = self.pen_y;
        if self.params.mode != ReflowMode::NoTruncate {
            return top;
        }
        let page_h = self.params.viewport.height;
        let page_start = self.page_of(top) as f32 * page_h;
        let page_end = page_start + page_h;
        if height > page_h {
            // Can never fit whole; start it on a fresh page and let it cut.
            if top - page_start > EPSILON {
                return page_end;
            }
            return top;
        }
        if top + height - page_end > EPSILON {
            log::debug!(
                "deferring block (h={:.1}) from y={:.1} to next page at y={:.1}",
                height,
                top,
                page_end
            );
            return page_end;
        }
        top
    }

    fn page_of(&self, top: f32) -> usize {
        if !self.params.mode.is_paged() {
            return 0;
        }
        let page_h = self.params.viewport.height;
        ((top + EPSILON) / page_h).floor().max(0.0) as usize
    }
}

const EPSILON: f32 = 0.01;

/// Intrinsic image extent: placed size on the source page, falling back
/// to the bitmap's pixel dimensions when the placement was degenerate.
fn intrinsic_size(image: &ImageRun) -> (f32, f32) {
    let (w, h) = (image.origin.width, image.origin.height);
    if w > 0.0 && h > 0.0 {
        (w, h)
    } else {
        (image.bitmap.width_px as f32, image.bitmap.height_px as f32)
    }
}
