//! Signal Router: per-message orchestrator.
//!
//! Drives each inbound message through filter → classification → direction
//! mapping → surface resolution → trade action, reaching exactly one
//! terminal disposition. Failures on any step are logged, alerted, and
//! terminal for that message only; the process keeps running.
//!
//! # Architecture
//!
//! ```text
//! Feed → Router → SignalFilter
//!                     ↓ (pass)
//!              ClassifierGateway → CompletionPort
//!                     ↓ (outcome)
//!              Outcome::direction → SurfaceRegistry → ExecutionSurface
//! ```

use std::sync::Arc;

use tracing::{error, info};

use auspex_domain::{ExposureKey, InboundMessage, Instrument, SignalFilter};
use auspex_exec::{AlertPort, BrowserPort, ClassifierGateway, CompletionPort, SurfaceRegistry};

// =============================================================================
// Disposition
// =============================================================================

/// Terminal state of one message's trip through the pipeline.
///
/// Every processed message reaches exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalDisposition {
    /// Filter rejected the message; no classification happened
    FilteredOut,
    /// Classified inconclusive; explicitly no action
    NoAction,
    /// Trade action fired on the surface for this key
    Traded(ExposureKey),
    /// Classifier service failed; message dropped
    ClassifyFailed,
    /// No surface provisioned for the key; message dropped
    ResolveFailed(ExposureKey),
    /// Trade click failed; message dropped, surface stays usable
    TradeFailed(ExposureKey),
}

// =============================================================================
// Signal Router
// =============================================================================

/// Routes inbound messages to trade actions.
pub struct SignalRouter<B: BrowserPort, C: CompletionPort> {
    /// Trigger-term filter
    filter: SignalFilter,
    /// Classifier gateway
    classifier: ClassifierGateway<C>,
    /// Read-only surface registry, provisioned at bootstrap
    registry: Arc<SurfaceRegistry<B>>,
    /// Operator alert channel
    alerter: Arc<dyn AlertPort>,
    /// Instrument this router trades
    instrument: Instrument,
}

impl<B: BrowserPort, C: CompletionPort> SignalRouter<B, C> {
    /// Create a router over a provisioned registry.
    pub fn new(
        filter: SignalFilter,
        classifier: ClassifierGateway<C>,
        registry: Arc<SurfaceRegistry<B>>,
        alerter: Arc<dyn AlertPort>,
        instrument: Instrument,
    ) -> Self {
        Self {
            filter,
            classifier,
            registry,
            alerter,
            instrument,
        }
    }

    /// Process one message to its terminal disposition.
    ///
    /// Intended to run on its own task: the classification call is
    /// long-latency and must not stall message intake.
    pub async fn process(&self, message: InboundMessage) -> SignalDisposition {
        if !self.filter.matches(&message.text) {
            return SignalDisposition::FilteredOut;
        }

        info!(
            signal_id = %message.id,
            channel_id = message.channel_id,
            text = %message.text,
            "Trigger term matched, classifying"
        );

        let outcome = match self.classifier.classify(&message.text).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(signal_id = %message.id, error = %e, "Classification failed");
                self.alerter.alert("classification failed");
                return SignalDisposition::ClassifyFailed;
            }
        };

        let Some(direction) = outcome.direction() else {
            info!(signal_id = %message.id, %outcome, "No actionable outcome");
            return SignalDisposition::NoAction;
        };

        let key = ExposureKey::new(self.instrument.clone(), direction);
        let surface = match self.registry.resolve(&key) {
            Ok(surface) => surface,
            Err(e) => {
                error!(signal_id = %message.id, key = %key, error = %e, "Surface resolution failed");
                self.alerter.alert("surface resolution failed");
                return SignalDisposition::ResolveFailed(key);
            }
        };

        info!(signal_id = %message.id, key = %key, %outcome, "Triggering trade");
        match surface.trigger().await {
            Ok(()) => {
                info!(signal_id = %message.id, key = %key, "Trade action completed");
                SignalDisposition::Traded(key)
            }
            Err(e) => {
                error!(signal_id = %message.id, key = %key, error = %e, "Trade click failed");
                self.alerter.alert("trade click failed");
                SignalDisposition::TradeFailed(key)
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
