//! Laid-out block types.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

/// Kind of a laid-out block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// A line of text segments
    Line,
    /// A single image placement
    Image,
}

/// One run's placement within a block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSegment {
    /// Index of the originating run in the extracted sequence.
    ///
    /// This is the reading-order ordinal focus data encodes; it depends
    /// only on the source content, never on the viewport.
    pub run: usize,
    /// The segment's rect in reflow-local coordinates
    pub rect: Rect,
}

/// One reflow-local positioned unit: a text line or an image placement.
///
/// Block order is reading order; pagination and focus addressing both
/// rely on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutBlock {
    /// Bounding rect in reflow-local coordinates
    pub rect: Rect,
    /// Page index in the paged modes (always 0 under `Normal`)
    pub page: usize,
    /// Block kind
    pub kind: BlockKind,
    /// Per-run placements, left to right
    pub segments: Vec<LineSegment>,
}

impl LayoutBlock {
    /// The segment containing `x`, or the nearest one horizontally.
    ///
    /// Blocks always carry at least one segment.
    pub fn segment_near(&self, x: f32) -> &LineSegment {
        let mut best = &self.segments[0];
        let mut best_dist = f32::MAX;
        for seg in &self.segments {
            if x >= seg.rect.x && x <= seg.rect.right() {
                return seg;
            }
            let dist = (seg.rect.x - x).max(x - seg.rect.right());
            if dist < best_dist {
                best_dist = dist;
                best = seg;
            }
        }
        best
    }

    /// The segment carrying the given run ordinal, if this block has it.
    pub fn segment_for_run(&self, run: usize) -> Option<&LineSegment> {
        self.segments.iter().find(|s| s.run == run)
    }

    /// Squared distance from a local point to this block.
    pub fn distance_sq(&self, p: Point) -> f32 {
        self.rect.distance_sq(p)
    }
}
