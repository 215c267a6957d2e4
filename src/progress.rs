//! Progress reporting and cooperative cancellation for long decodes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives progress while elements are decoded.
///
/// `initialize` is called once per element kind with its record count before
/// any of its records are decoded, then `increment` as records complete. None of
/// this affects decoding results.
pub trait ProgressSink {
    fn initialize(&mut self, total: usize);

    fn increment(&mut self, n: usize);

    /// Polled at chunk and record boundaries. Returning `true` aborts the decode.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Discards all progress.
impl ProgressSink for () {
    fn initialize(&mut self, _total: usize) {}

    fn increment(&mut self, _n: usize) {}
}

impl<P: ProgressSink + ?Sized> ProgressSink for &mut P {
    fn initialize(&mut self, total: usize) {
        (**self).initialize(total)
    }

    fn increment(&mut self, n: usize) {
        (**self).increment(n)
    }

    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// Wraps a sink with a flag another thread can raise to stop the decode.
///
/// # Examples
///
/// ```rust
/// use plykit::{Cancellable, ProgressSink};
///
/// let mut progress = Cancellable::new(());
/// let flag = progress.flag();
/// assert!(!progress.is_cancelled());
/// flag.store(true, std::sync::atomic::Ordering::Relaxed);
/// assert!(progress.is_cancelled());
/// ```
#[derive(Debug, Default)]
pub struct Cancellable<P> {
    inner: P,
    cancelled: Arc<AtomicBool>,
}

impl<P: ProgressSink> Cancellable<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared handle to the cancellation flag.
    pub fn flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: ProgressSink> ProgressSink for Cancellable<P> {
    fn initialize(&mut self, total: usize) {
        self.inner.initialize(total)
    }

    fn increment(&mut self, n: usize) {
        self.inner.increment(n)
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed) || self.inner.is_cancelled()
    }
}
