//! Stable content-position identity across re-layouts.
//!
//! Focus data names "the content unit under a device point" by its
//! reading-order ordinal plus a fractional offset within that run. The
//! ordinal derives from the extracted run sequence — which depends only
//! on the source content — so a position captured at one viewport size
//! resolves correctly on any reflow page built from the same content,
//! whatever its viewport or spacing settings.
//!
//! Both conversions are interpreted through a caller-supplied matrix;
//! use a matrix obtained for the same viewport parameters the device
//! points live in.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{Matrix, Point};
use crate::layout::{LayoutBlock, LayoutData};

/// Current focus-data encoding version.
const FOCUS_DATA_VERSION: u8 = 1;

/// An opaque, serializable content-position identifier.
///
/// Produced by [`crate::ReflowPage::focus_data`] and consumed by
/// [`crate::ReflowPage::focus_position`]. The byte encoding is stable
/// and versioned; persist it, ship it across processes, re-resolve it
/// after a re-layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusData {
    version: u8,
    run: u32,
    offset: f32,
}

impl FocusData {
    pub(crate) fn new(run: usize, offset: f32) -> Self {
        Self {
            version: FOCUS_DATA_VERSION,
            run: run as u32,
            offset,
        }
    }

    /// Reading-order ordinal of the addressed run.
    pub fn run(&self) -> usize {
        self.run as usize
    }

    /// Fractional horizontal offset within the run, in `0.0..=1.0`.
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Serialize to the opaque byte encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| Error::Internal(e.to_string()))
    }

    /// Decode from the opaque byte encoding.
    ///
    /// Fails with [`Error::InvalidParameter`] on malformed bytes, an
    /// unknown version, or a non-finite offset.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let data: FocusData = serde_json::from_slice(bytes)
            .map_err(|e| Error::invalid(format!("malformed focus data: {e}")))?;
        if data.version != FOCUS_DATA_VERSION {
            return Err(Error::invalid(format!(
                "unsupported focus data version {}",
                data.version
            )));
        }
        if !data.offset.is_finite() {
            return Err(Error::invalid("focus offset is not finite"));
        }
        Ok(data)
    }
}

/// Encode the content position under `device` as focus data.
pub(crate) fn focus_data(
    layout: &LayoutData,
    matrix: &Matrix,
    device: Point,
) -> Result<FocusData> {
    let inverse = matrix
        .invert()
        .ok_or_else(|| Error::invalid("matrix is not invertible"))?;
    let local = inverse.transform_point(device);

    let block = nearest_block(&layout.blocks, local)
        .ok_or_else(|| Error::invalid("page has no content to focus"))?;
    let segment = block.segment_near(local.x);
    let offset = if segment.rect.width > 0.0 {
        ((local.x - segment.rect.x) / segment.rect.width).clamp(0.0, 1.0)
    } else {
        0.0
    };
    Ok(FocusData::new(segment.run, offset))
}

/// Resolve focus data to a device point at the current layout.
pub(crate) fn focus_position(
    layout: &LayoutData,
    matrix: &Matrix,
    data: &FocusData,
) -> Result<Point> {
    let run = data.run();
    if run >= layout.runs.len() {
        return Err(Error::invalid(format!(
            "focus ordinal {run} out of range ({} runs)",
            layout.runs.len()
        )));
    }
    let block = &layout.blocks[layout.run_to_block[run]];
    let segment = block
        .segment_for_run(run)
        .ok_or_else(|| Error::Internal(format!("run {run} missing from its block")))?;

    // The anchor is the fractional x within the run at the run's
    // vertical center; a round trip snaps to this, not to the original
    // pixel.
    let local = Point::new(
        segment.rect.x + data.offset().clamp(0.0, 1.0) * segment.rect.width,
        segment.rect.center().y,
    );
    Ok(matrix.transform_point(local))
}

/// The block containing `p`, else the nearest one.
fn nearest_block(blocks: &[LayoutBlock], p: Point) -> Option<&LayoutBlock> {
    let mut best: Option<(&LayoutBlock, f32)> = None;
    for block in blocks {
        let dist = block.distance_sq(p);
        if dist == 0.0 {
            return Some(block);
        }
        match best {
            Some((_, best_dist)) if best_dist <= dist => {}
            _ => best = Some((block, dist)),
        }
    }
    best.map(|(block, _)| block)
}
