//! Host integration for the flush queue.
//!
//! The engine never flushes on its own. When deferred work (a re-render, an
//! effect, an instance teardown) is queued while the queue is idle, the
//! runtime asks its [`FlushScheduler`] to arrange a call to
//! [`Renderer::flush`](crate::Renderer::flush).

/// Requests a flush from the host.
///
/// Called once per idle → busy transition, not once per queued item. The
/// runtime itself stays on one thread, but a scheduler is usually shared with
/// the host's event loop or wake-up channel, which may live on another.
pub trait FlushScheduler: Send + Sync {
    fn request_flush(&self);
}

/// Scheduler for hosts that flush explicitly after each event.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualFlush;

impl FlushScheduler for ManualFlush {
    fn request_flush(&self) {}
}
