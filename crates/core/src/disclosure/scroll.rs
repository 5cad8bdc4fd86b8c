use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::debug;

/// Scroll position of the viewport over the scrollable content, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollMetrics {
    /// Distance scrolled from the top of the content.
    pub scroll_top: f64,
    /// Height of the visible viewport.
    pub viewport_height: f64,
    /// Total height of the scrollable content.
    pub document_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, viewport_height: f64, document_height: f64) -> Self {
        Self {
            scroll_top,
            viewport_height,
            document_height,
        }
    }

    /// Whether the bottom of the viewport is within `threshold` pixels of the
    /// end of the content.
    pub fn near_bottom(&self, threshold: f64) -> bool {
        self.scroll_top + self.viewport_height >= self.document_height - threshold
    }
}

/// Registration of a scroll listener on a [`super::LazyDisclosure`].
///
/// The listener runs until this value is dropped or [`Self::detach`]ed;
/// either way the background task is aborted and the engine accepts a new
/// listener.
#[derive(Debug)]
pub struct ScrollListener {
    task: JoinHandle<()>,
    attached: Arc<AtomicBool>,
}

impl ScrollListener {
    pub(super) fn new(task: JoinHandle<()>, attached: Arc<AtomicBool>) -> Self {
        Self { task, attached }
    }

    /// Stop listening.
    pub fn detach(self) {
        drop(self);
    }

    /// Whether the listener task is still running.
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for ScrollListener {
    fn drop(&mut self) {
        self.task.abort();
        self.attached.store(false, Ordering::Release);
        debug!("Scroll listener detached");
    }
}
