/// Default quiet period before a search box value is applied.
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 250;

/// Holds the latest value until its input has been quiet for `delay_ms`.
///
/// Adapter-driven: feed it `set(value, now_ms)` on every keystroke and `tick(now_ms)` from a
/// frame or timer callback. No threads or timers are spawned.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Debouncer<V> {
    delay_ms: u64,
    pending: Option<V>,
    changed_at_ms: u64,
}

impl<V> Default for Debouncer<V> {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEBOUNCE_MS)
    }
}

impl<V> Debouncer<V> {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
            changed_at_ms: 0,
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&V> {
        self.pending.as_ref()
    }

    /// Replaces any pending value and restarts the quiet period.
    pub fn set(&mut self, value: V, now_ms: u64) {
        self.pending = Some(value);
        self.changed_at_ms = now_ms;
    }

    /// Returns the pending value once the quiet period has elapsed.
    pub fn tick(&mut self, now_ms: u64) -> Option<V> {
        self.pending.as_ref()?;
        if now_ms.saturating_sub(self.changed_at_ms) < self.delay_ms {
            return None;
        }
        self.pending.take()
    }

    /// Returns the pending value immediately (e.g. on Enter).
    pub fn flush(&mut self) -> Option<V> {
        self.pending.take()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
