//! Lazy disclosure - incremental reveal of an in-memory item list.
//!
//! The engine keeps a "visible window" over a list that has already been
//! fetched. The window grows by a fixed step on request or when the viewport
//! nears the end of the content, with a short artificial delay between the
//! request and the reveal to pace scroll-triggered growth. Nothing here
//! touches the network.

mod scroll;

pub use scroll::{ScrollListener, ScrollMetrics};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

use crate::metrics;

/// Errors from the disclosure engine.
#[derive(Debug, Error)]
pub enum DisclosureError {
    /// A scroll listener is already registered on this engine.
    #[error("A scroll listener is already attached")]
    AlreadyAttached,
}

/// Disclosure tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisclosureConfig {
    /// Items visible before any reveal (default: 4).
    #[serde(default = "default_initial_count")]
    pub initial_count: usize,
    /// Items added per reveal (default: 4).
    #[serde(default = "default_load_more_count")]
    pub load_more_count: usize,
    /// Distance from the content end, in pixels, that triggers a reveal
    /// (default: 100).
    #[serde(default = "default_scroll_threshold_px")]
    pub scroll_threshold_px: f64,
    /// Pause between a reveal request and the reveal (default: 150 ms).
    #[serde(default = "default_reveal_delay_ms")]
    pub reveal_delay_ms: u64,
    /// Length change of the source list above which the window resets
    /// (default: 5).
    #[serde(default = "default_reset_delta")]
    pub reset_delta: usize,
}

impl Default for DisclosureConfig {
    fn default() -> Self {
        Self {
            initial_count: default_initial_count(),
            load_more_count: default_load_more_count(),
            scroll_threshold_px: default_scroll_threshold_px(),
            reveal_delay_ms: default_reveal_delay_ms(),
            reset_delta: default_reset_delta(),
        }
    }
}

impl DisclosureConfig {
    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }
}

fn default_initial_count() -> usize {
    4
}

fn default_load_more_count() -> usize {
    4
}

fn default_scroll_threshold_px() -> f64 {
    100.0
}

fn default_reveal_delay_ms() -> u64 {
    150
}

fn default_reset_delta() -> usize {
    5
}

#[derive(Debug)]
struct DisclosureState<T> {
    items: Vec<T>,
    visible_count: usize,
    is_loading: bool,
    /// Bumped on every reset so reveals scheduled before it are dropped.
    generation: u64,
}

impl<T> DisclosureState<T> {
    fn has_more(&self) -> bool {
        self.visible_count < self.items.len()
    }

    fn reset(&mut self, initial_count: usize) {
        self.visible_count = initial_count;
        self.is_loading = false;
        self.generation += 1;
    }
}

/// Clears `is_loading` if a reveal is abandoned before it completes.
struct PendingReveal<'a, T> {
    state: &'a Mutex<DisclosureState<T>>,
    generation: u64,
    completed: bool,
}

impl<T> Drop for PendingReveal<'_, T> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        let mut state = lock(self.state);
        if state.generation == self.generation {
            state.is_loading = false;
        }
    }
}

fn lock<T>(state: &Mutex<DisclosureState<T>>) -> MutexGuard<'_, DisclosureState<T>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Visible window over a list of items.
///
/// Clones share the same window, which is how a scroll listener task and
/// the owning view observe one state.
///
/// `visible_count` only grows, except on reset. A reset puts it back to
/// `initial_count` even if the list is now shorter than that; consumers read
/// the visible slice through [`Self::visible_items`], which is clamped.
#[derive(Debug)]
pub struct LazyDisclosure<T> {
    config: DisclosureConfig,
    state: Arc<Mutex<DisclosureState<T>>>,
    listener_attached: Arc<AtomicBool>,
}

impl<T> Clone for LazyDisclosure<T> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            state: Arc::clone(&self.state),
            listener_attached: Arc::clone(&self.listener_attached),
        }
    }
}

impl<T: Clone> LazyDisclosure<T> {
    pub fn new(items: Vec<T>, config: DisclosureConfig) -> Self {
        let state = DisclosureState {
            items,
            visible_count: config.initial_count,
            is_loading: false,
            generation: 0,
        };
        Self {
            config,
            state: Arc::new(Mutex::new(state)),
            listener_attached: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Engine with the default configuration.
    pub fn with_defaults(items: Vec<T>) -> Self {
        Self::new(items, DisclosureConfig::default())
    }

    pub fn config(&self) -> &DisclosureConfig {
        &self.config
    }

    fn state(&self) -> MutexGuard<'_, DisclosureState<T>> {
        lock(&self.state)
    }

    // =========================================================================
    // Read-only state
    // =========================================================================

    pub fn visible_count(&self) -> usize {
        self.state().visible_count
    }

    pub fn total_count(&self) -> usize {
        self.state().items.len()
    }

    pub fn has_more_items(&self) -> bool {
        self.state().has_more()
    }

    /// True while a reveal is pending.
    pub fn is_loading(&self) -> bool {
        self.state().is_loading
    }

    /// Share of the list currently visible, 0-100. An empty list reports 0.
    pub fn progress_percentage(&self) -> f64 {
        let state = self.state();
        if state.items.is_empty() {
            return 0.0;
        }
        (state.visible_count as f64 / state.items.len() as f64 * 100.0).min(100.0)
    }

    /// The first `visible_count` items.
    pub fn visible_items(&self) -> Vec<T> {
        let state = self.state();
        let end = state.visible_count.min(state.items.len());
        state.items[..end].to_vec()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Reveal the next `load_more_count` items after the configured delay.
    ///
    /// Returns false without waiting if a reveal is already pending or every
    /// item is visible. Also returns false if the window was reset while the
    /// reveal was pending; the reset wins.
    pub async fn load_more(&self) -> bool {
        let generation = {
            let mut state = self.state();
            if state.is_loading || !state.has_more() {
                return false;
            }
            state.is_loading = true;
            state.generation
        };

        let mut pending = PendingReveal {
            state: &self.state,
            generation,
            completed: false,
        };

        tokio::time::sleep(self.config.reveal_delay()).await;

        let mut state = self.state();
        if state.generation != generation {
            debug!("Window reset during reveal, discarding it");
            pending.completed = true;
            return false;
        }

        let total = state.items.len();
        state.visible_count = (state.visible_count + self.config.load_more_count).min(total);
        state.is_loading = false;
        pending.completed = true;

        debug!("Revealed items: {}/{}", state.visible_count, total);
        metrics::DISCLOSURE_REVEALS.inc();

        true
    }

    /// Replace the source list.
    ///
    /// If the length changed by more than `reset_delta` the list is treated
    /// as a different data set and the window resets. Smaller changes keep
    /// the window. Returns whether a reset happened.
    pub fn set_items(&self, items: Vec<T>) -> bool {
        let mut state = self.state();
        let old_len = state.items.len();
        state.items = items;

        if old_len.abs_diff(state.items.len()) > self.config.reset_delta {
            debug!(
                "Source list changed from {} to {} items, resetting window",
                old_len,
                state.items.len()
            );
            state.reset(self.config.initial_count);
            true
        } else {
            false
        }
    }

    /// Put the window back to its initial size and cancel any pending reveal.
    pub fn reset(&self) {
        self.state().reset(self.config.initial_count);
    }

    /// React to a scroll position: reveal more when near the end of the
    /// content. Returns whether a reveal happened.
    pub async fn handle_scroll(&self, metrics: ScrollMetrics) -> bool {
        let should_load = {
            let state = self.state();
            !state.is_loading
                && state.has_more()
                && metrics.near_bottom(self.config.scroll_threshold_px)
        };

        if should_load {
            self.load_more().await
        } else {
            false
        }
    }
}

impl<T: Clone + Send + 'static> LazyDisclosure<T> {
    /// Follow scroll positions published on `positions` until the returned
    /// listener is dropped.
    ///
    /// Only one listener may be attached at a time. Must be called from
    /// within a Tokio runtime.
    pub fn attach_scroll(
        &self,
        mut positions: watch::Receiver<ScrollMetrics>,
    ) -> Result<ScrollListener, DisclosureError> {
        if self
            .listener_attached
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(DisclosureError::AlreadyAttached);
        }

        let engine = self.clone();
        let task = tokio::spawn(async move {
            while positions.changed().await.is_ok() {
                let metrics = *positions.borrow_and_update();
                engine.handle_scroll(metrics).await;
            }
        });

        debug!("Scroll listener attached");
        Ok(ScrollListener::new(task, Arc::clone(&self.listener_attached)))
    }

    /// Whether a scroll listener is currently attached.
    pub fn has_scroll_listener(&self) -> bool {
        self.listener_attached.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> DisclosureConfig {
        DisclosureConfig {
            reveal_delay_ms: 5,
            ..DisclosureConfig::default()
        }
    }

    fn engine(len: usize) -> LazyDisclosure<usize> {
        LazyDisclosure::new((0..len).collect(), fast_config())
    }

    #[test]
    fn test_initial_state() {
        let engine = engine(8);

        assert_eq!(engine.visible_count(), 4);
        assert_eq!(engine.total_count(), 8);
        assert!(engine.has_more_items());
        assert!(!engine.is_loading());
        assert_eq!(engine.progress_percentage(), 50.0);
        assert_eq!(engine.visible_items(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_empty_list() {
        let engine = engine(0);

        assert!(!engine.has_more_items());
        assert_eq!(engine.progress_percentage(), 0.0);
        assert!(engine.visible_items().is_empty());
    }

    #[test]
    fn test_short_list_saturates_progress() {
        let engine = engine(3);

        assert_eq!(engine.visible_count(), 4);
        assert!(!engine.has_more_items());
        assert_eq!(engine.progress_percentage(), 100.0);
        assert_eq!(engine.visible_items(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_load_more_reveals_next_batch() {
        let engine = engine(8);

        assert!(engine.load_more().await);

        assert_eq!(engine.visible_count(), 8);
        assert!(!engine.has_more_items());
        assert!(!engine.is_loading());
        assert_eq!(engine.progress_percentage(), 100.0);
    }

    #[tokio::test]
    async fn test_load_more_noop_when_everything_visible() {
        let engine = engine(4);

        assert!(!engine.load_more().await);
        assert_eq!(engine.visible_count(), 4);
    }

    #[tokio::test]
    async fn test_load_more_clamps_to_total() {
        let engine = engine(6);

        assert!(engine.load_more().await);
        assert_eq!(engine.visible_count(), 6);
    }

    #[tokio::test]
    async fn test_loading_flag_during_delay() {
        let engine = engine(20);

        let mut reveal = tokio_test::task::spawn(engine.load_more());
        tokio_test::assert_pending!(reveal.poll());
        assert!(engine.is_loading());
        assert_eq!(engine.visible_count(), 4);

        assert!(reveal.await);
        assert!(!engine.is_loading());
        assert_eq!(engine.visible_count(), 8);
    }

    #[tokio::test]
    async fn test_concurrent_load_more_rejected() {
        let engine = engine(20);

        let (first, second) = tokio::join!(engine.load_more(), engine.load_more());

        assert!(first);
        assert!(!second);
        assert_eq!(engine.visible_count(), 8);
    }

    #[tokio::test]
    async fn test_reset_during_reveal_wins() {
        let engine = engine(20);

        let mut reveal = tokio_test::task::spawn(engine.load_more());
        tokio_test::assert_pending!(reveal.poll());

        engine.reset();
        assert!(!engine.is_loading());

        assert!(!reveal.await);
        assert_eq!(engine.visible_count(), 4);
    }

    #[tokio::test]
    async fn test_abandoned_reveal_clears_loading() {
        let engine = engine(20);

        {
            let mut reveal = tokio_test::task::spawn(engine.load_more());
            tokio_test::assert_pending!(reveal.poll());
        }

        assert!(!engine.is_loading());
        assert!(engine.load_more().await);
    }

    #[tokio::test]
    async fn test_set_items_large_change_resets() {
        let engine = engine(10);
        engine.load_more().await;
        assert_eq!(engine.visible_count(), 8);

        assert!(engine.set_items(vec![0, 1, 2]));

        assert_eq!(engine.visible_count(), 4);
        assert_eq!(engine.visible_items(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_set_items_small_change_keeps_window() {
        let engine = engine(10);
        engine.load_more().await;

        // Delta of exactly 5 is not enough.
        assert!(!engine.set_items((0..15).collect()));
        assert_eq!(engine.visible_count(), 8);
        assert!(engine.has_more_items());
    }

    #[test]
    fn test_custom_reset_delta() {
        let engine = LazyDisclosure::new(
            (0..10).collect::<Vec<usize>>(),
            DisclosureConfig {
                reset_delta: 0,
                ..fast_config()
            },
        );

        assert!(engine.set_items((0..11).collect()));
    }

    #[tokio::test]
    async fn test_handle_scroll_threshold() {
        let engine = engine(20);

        assert!(!engine.handle_scroll(ScrollMetrics::new(0.0, 600.0, 2000.0)).await);
        assert_eq!(engine.visible_count(), 4);

        assert!(engine.handle_scroll(ScrollMetrics::new(1350.0, 600.0, 2000.0)).await);
        assert_eq!(engine.visible_count(), 8);
    }

    /// Let spawned tasks run up to their next await point.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_listener_reveals_and_detaches() {
        let engine = engine(20);
        let (tx, rx) = watch::channel(ScrollMetrics::default());

        let listener = engine.attach_scroll(rx).unwrap();
        assert!(engine.has_scroll_listener());

        tx.send(ScrollMetrics::new(1900.0, 600.0, 2000.0)).unwrap();
        settle().await;
        assert!(engine.is_loading());

        tokio::time::advance(engine.config().reveal_delay()).await;
        settle().await;
        assert_eq!(engine.visible_count(), 8);
        assert!(!engine.is_loading());

        drop(listener);
        assert!(!engine.has_scroll_listener());
        settle().await;

        let _ = tx.send(ScrollMetrics::new(1900.0, 600.0, 2000.0));
        settle().await;
        tokio::time::advance(engine.config().reveal_delay()).await;
        settle().await;
        assert!(!engine.is_loading());
        assert_eq!(engine.visible_count(), 8);
    }

    #[tokio::test]
    async fn test_second_listener_rejected_until_first_dropped() {
        let engine = engine(20);
        let (_tx, rx) = watch::channel(ScrollMetrics::default());

        let first = engine.attach_scroll(rx.clone()).unwrap();
        assert!(matches!(
            engine.attach_scroll(rx.clone()),
            Err(DisclosureError::AlreadyAttached)
        ));

        first.detach();
        let second = engine.attach_scroll(rx).unwrap();
        assert!(second.is_active());
    }
}
