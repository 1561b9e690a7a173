//! Resumable progress protocol for long-running operations.
//!
//! Pagination (and rendering, see [`crate::render`]) never runs as one
//! blocking call. The caller holds a progress handle and repeatedly
//! steps it; each step performs a bounded unit of work and returns
//! control, so an embedding application can interleave UI work with a
//! long layout. Cancellation is simply dropping the handle before it
//! finishes — no partial layout becomes observable on the owning page,
//! and the operation may be started again.
//!
//! No threads are involved anywhere: progression is strictly
//! caller-driven, and the handle's mutable borrow of the page keeps any
//! other mutation out for as long as the operation is in flight.

use crate::error::{Error, Result};
use crate::extract::ContentRun;
use crate::layout::{Paginator, ReflowMode, ReflowPage};

/// Runs laid out per [`LayoutProgress::step`] call.
pub(crate) const LAYOUT_STEP_RUNS: usize = 32;

/// Outcome of one progress step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// More steps are needed.
    InProgress {
        /// Units of work completed so far
        done: usize,
        /// Total units of work
        total: usize,
    },
    /// The operation completed; its results are committed.
    Finished,
}

impl Progress {
    /// Check whether this outcome is [`Progress::Finished`].
    pub fn is_finished(&self) -> bool {
        matches!(self, Progress::Finished)
    }
}

/// A resumable pagination operation over one [`ReflowPage`].
///
/// Obtained from [`ReflowPage::start_parse`]. While the handle lives,
/// it exclusively borrows the page. On the step that completes
/// pagination, the laid-out blocks and content size are committed to
/// the page in one move; until then the page observes nothing.
pub struct LayoutProgress<'p, 's> {
    page: &'p mut ReflowPage<'s>,
    mode: ReflowMode,
    runs: Vec<ContentRun>,
    paginator: Option<Paginator>,
}

impl<'p, 's> LayoutProgress<'p, 's> {
    pub(crate) fn new(
        page: &'p mut ReflowPage<'s>,
        runs: Vec<ContentRun>,
        paginator: Paginator,
        mode: ReflowMode,
    ) -> Self {
        Self {
            page,
            mode,
            runs,
            paginator: Some(paginator),
        }
    }

    /// Total number of runs this operation will lay out.
    pub fn total_runs(&self) -> usize {
        self.runs.len()
    }

    /// Whether the operation has completed.
    pub fn is_finished(&self) -> bool {
        self.paginator.is_none()
    }

    /// Perform one bounded unit of layout work.
    ///
    /// Fails with [`Error::AlreadyFinished`] when called again after
    /// [`Progress::Finished`] was returned.
    pub fn step(&mut self) -> Result<Progress> {
        let paginator = self.paginator.as_mut().ok_or(Error::AlreadyFinished)?;
        let done = paginator.step(&self.runs, LAYOUT_STEP_RUNS);
        if !paginator.is_done() {
            return Ok(Progress::InProgress {
                done,
                total: self.runs.len(),
            });
        }

        let paginator = self
            .paginator
            .take()
            .ok_or_else(|| Error::Internal("paginator vanished mid-step".to_string()))?;
        let (blocks, content_size) = paginator.into_result();
        self.page
            .commit_layout(self.mode, std::mem::take(&mut self.runs), blocks, content_size);
        Ok(Progress::Finished)
    }

    /// Drive the operation to completion.
    pub fn finish(mut self) -> Result<()> {
        while !self.step()?.is_finished() {}
        Ok(())
    }
}
