//! Test helper fixtures.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use auspex_domain::{Direction, ExposureKey, InboundMessage, Instrument};
use auspex_exec::{AlertPort, ExecutionSurface, PageHandle, StubBrowser, SurfaceRegistry};

// =============================================================================
// Counting Alerter
// =============================================================================

/// Alert channel that records every alert instead of making noise.
pub struct CountingAlerter {
    count: AtomicUsize,
    reasons: Mutex<Vec<String>>,
}

impl CountingAlerter {
    /// Create a fresh alerter.
    pub fn new() -> Self {
        Self {
            count: AtomicUsize::new(0),
            reasons: Mutex::new(Vec::new()),
        }
    }

    /// How many alerts fired so far.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// The recorded alert reasons, in order.
    pub fn reasons(&self) -> Vec<String> {
        self.reasons.lock().unwrap().clone()
    }
}

impl Default for CountingAlerter {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertPort for CountingAlerter {
    fn alert(&self, reason: &str) {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.reasons.lock().unwrap().push(reason.to_string());
    }
}

// =============================================================================
// Registry Fixtures
// =============================================================================

/// Build a registry with one stub-backed surface per direction of an
/// instrument, the way bootstrap would provision it.
pub fn provisioned_registry(
    browser: &Arc<StubBrowser>,
    instrument: &Instrument,
) -> SurfaceRegistry<StubBrowser> {
    let mut registry = SurfaceRegistry::new();

    for direction in Direction::all() {
        let key = ExposureKey::new(instrument.clone(), direction);
        let page = PageHandle::new(format!(
            "{}-{}",
            instrument.as_str().to_lowercase(),
            direction
        ));
        let surface = Arc::new(ExecutionSurface::new(key, browser.clone(), page));
        registry
            .register(surface)
            .expect("fresh registry cannot hold duplicates");
    }

    registry
}

/// A canned channel message.
pub fn channel_message(text: &str) -> InboundMessage {
    InboundMessage::new(2442330266, text)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting_alerter_records_reasons() {
        let alerter = CountingAlerter::new();

        alerter.alert("first");
        alerter.alert("second");

        assert_eq!(alerter.count(), 2);
        assert_eq!(alerter.reasons(), vec!["first", "second"]);
    }

    #[test]
    fn test_provisioned_registry_holds_both_directions() {
        let browser = Arc::new(StubBrowser::new());
        let ada = Instrument::new("ADA").unwrap();

        let registry = provisioned_registry(&browser, &ada);

        assert_eq!(registry.len(), 2);
        for direction in Direction::all() {
            registry
                .resolve(&ExposureKey::new(ada.clone(), direction))
                .unwrap();
        }
    }
}
