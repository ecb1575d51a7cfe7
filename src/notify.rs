//! Wake-up signal from tick or interrupt context to a waiting task.
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Single-slot counting signal.
///
/// [`post`](Notifier::post) never blocks and never allocates, so it is safe
/// to call from an interrupt handler. Posts that arrive before the consumer
/// gets around to [`wait`](Notifier::wait) coalesce into one pending wake.
pub struct Notifier(Signal<CriticalSectionRawMutex, ()>);

impl Notifier {
    pub const fn new() -> Self {
        Self(Signal::new())
    }

    /// Marks the slot signaled. Idempotent while a wake is pending.
    pub fn post(&self) {
        self.0.signal(());
    }

    /// Parks until a post has happened since the last successful wait, then
    /// clears the slot.
    pub async fn wait(&self) {
        self.0.wait().await
    }

    pub fn is_pending(&self) -> bool {
        self.0.signaled()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::select::{select, Either};

    fn wakes_now(notifier: &Notifier) -> bool {
        let polled = embassy_futures::block_on(select(notifier.wait(), core::future::ready(())));
        matches!(polled, Either::First(()))
    }

    #[test]
    fn wait_returns_after_post() {
        let notifier = Notifier::new();
        notifier.post();
        assert!(notifier.is_pending());
        assert!(wakes_now(&notifier));
        assert!(!notifier.is_pending());
    }

    #[test]
    fn wait_parks_without_post() {
        let notifier = Notifier::new();
        assert!(!wakes_now(&notifier));
    }

    #[test]
    fn bursts_coalesce_into_one_wake() {
        let notifier = Notifier::new();
        notifier.post();
        notifier.post();
        notifier.post();
        assert!(wakes_now(&notifier));
        assert!(!wakes_now(&notifier));
    }

    #[test]
    fn channels_fed_by_one_producer_wake_independently() {
        let measure = Notifier::new();
        let report = Notifier::new();
        for target in [&measure, &report] {
            target.post();
        }
        assert!(wakes_now(&report));
        assert!(wakes_now(&measure));
    }
}
