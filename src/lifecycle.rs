//! Mount / frame / teardown sequencing for the animation loop.
//!
//! The loop is driven by a [`FrameScheduler`] (in the browser,
//! `requestAnimationFrame`). At most one frame request is outstanding at any
//! time, and after [`Lifecycle::teardown`] none is.

use crate::error::{FieldError, Result};

/// Opaque handle of a scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameId(pub i32);

pub trait FrameScheduler {
    /// Ask the host to run the frame callback once, at its next refresh.
    fn request_frame(&mut self) -> Result<FrameId>;

    /// Withdraw a request made with [`FrameScheduler::request_frame`].
    fn cancel_frame(&mut self, id: FrameId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Mounted, waiting on assets; nothing is scheduled.
    Loading,
    Running,
    TornDown,
}

#[derive(Debug)]
pub struct Lifecycle<S> {
    scheduler: S,
    phase: Phase,
    pending: Option<FrameId>,
}

impl<S: FrameScheduler> Lifecycle<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            phase: Phase::Loading,
            pending: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn pending_frame(&self) -> Option<FrameId> {
        self.pending
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Begin animating. Starting twice is a no-op; starting after teardown
    /// is an error.
    pub fn start(&mut self) -> Result<()> {
        match self.phase {
            Phase::Loading => {
                self.phase = Phase::Running;
                self.schedule()
            }
            Phase::Running => Ok(()),
            Phase::TornDown => Err(FieldError::Detached),
        }
    }

    /// Called first thing in the frame callback. The request that fired is
    /// spent; returns whether the frame should do any work.
    pub fn begin_frame(&mut self) -> bool {
        self.pending = None;
        self.is_running()
    }

    /// Called last in the frame callback to queue the next one.
    pub fn end_frame(&mut self) -> Result<()> {
        if self.is_running() {
            self.schedule()
        } else {
            Ok(())
        }
    }

    fn schedule(&mut self) -> Result<()> {
        if self.pending.is_none() {
            self.pending = Some(self.scheduler.request_frame()?);
        }
        Ok(())
    }

    /// Stop the loop and cancel any outstanding request. Idempotent and
    /// valid in any phase. Returns `true` the first time.
    pub fn teardown(&mut self) -> bool {
        if let Some(id) = self.pending.take() {
            self.scheduler.cancel_frame(id);
        }
        let first = self.phase != Phase::TornDown;
        self.phase = Phase::TornDown;
        first
    }
}
