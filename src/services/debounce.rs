use std::time::{Duration, Instant};

/// Delay between the last keystroke and the search it triggers.
pub const SEARCH_DELAY: Duration = Duration::from_millis(150);

/// Classic single-slot debounce: a new submission replaces (cancels) the
/// pending one; polling at or after `last input + delay` fires it exactly
/// once. Single-threaded by design, driven by whatever loop the host
/// front-end runs.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn submit(&mut self, value: T) {
        self.submit_at(value, Instant::now());
    }

    pub fn submit_at(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    pub fn poll(&mut self) -> Option<T> {
        self.poll_at(Instant::now())
    }

    pub fn poll_at(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, at)) if now.duration_since(*at) >= self.delay => {
                self.pending.take().map(|(v, _)| v)
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}
