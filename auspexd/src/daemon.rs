//! Daemon: Main runtime orchestrator.
//!
//! The Daemon ties together all components:
//! - Message Feed (inbound messages, with reconnect)
//! - Signal Router (per-message pipeline)
//! - Surface Registry + Popup Suppressors (provisioned at bootstrap)
//! - Operator alert channel
//!
//! # Lifecycle
//!
//! 1. Bootstrap has already provisioned every surface (see `bootstrap`)
//! 2. Spawn the dispatcher (one task per inbound message)
//! 3. Feed loop with fixed-delay reconnect on transport drops
//! 4. Graceful shutdown on SIGINT: join in-flight work and suppressors,
//!    close all surfaces

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use auspex_domain::InboundMessage;
use auspex_exec::{
    AlertPort, BrowserPort, CompletionPort, FeedPort, PopupSuppressor, SurfaceRegistry,
};

use crate::config::Config;
use crate::error::DaemonResult;
use crate::router::SignalRouter;

/// Buffered inbound messages before the feed backpressures.
const MESSAGE_BUFFER: usize = 256;

// =============================================================================
// Daemon
// =============================================================================

/// The main auspex daemon.
pub struct Daemon<B: BrowserPort + 'static, C: CompletionPort + 'static, F: FeedPort> {
    /// Configuration
    config: Config,
    /// Inbound message feed
    feed: F,
    /// Per-message router
    router: Arc<SignalRouter<B, C>>,
    /// Provisioned surfaces (read-only from here on)
    registry: Arc<SurfaceRegistry<B>>,
    /// Running popup suppressors
    suppressors: Vec<PopupSuppressor>,
    /// Operator alert channel
    alerter: Arc<dyn AlertPort>,
}

impl<B: BrowserPort + 'static, C: CompletionPort + 'static, F: FeedPort> Daemon<B, C, F> {
    /// Create a daemon from bootstrapped components.
    pub fn new(
        config: Config,
        feed: F,
        router: Arc<SignalRouter<B, C>>,
        registry: Arc<SurfaceRegistry<B>>,
        suppressors: Vec<PopupSuppressor>,
        alerter: Arc<dyn AlertPort>,
    ) -> Self {
        Self {
            config,
            feed,
            router,
            registry,
            suppressors,
            alerter,
        }
    }

    /// Run the daemon.
    ///
    /// Blocks until shutdown is requested (SIGINT) or the message consumer
    /// goes away. Transport drops on the feed reconnect with a fixed delay
    /// and never lose the provisioned registry.
    pub async fn run(self) -> DaemonResult<()> {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            surfaces = self.registry.len(),
            channels = self.config.telegram.channels.len(),
            "Starting signal routing"
        );

        // 1. Dispatcher: every message gets its own task, so a long-latency
        //    classification never stalls message intake. In-flight tasks are
        //    joined before the dispatcher exits.
        let (sender, mut receiver) = mpsc::channel::<InboundMessage>(MESSAGE_BUFFER);
        let router = self.router.clone();
        let dispatcher = tokio::spawn(async move {
            let mut in_flight = JoinSet::new();
            while let Some(message) = receiver.recv().await {
                let router = router.clone();
                in_flight.spawn(async move {
                    router.process(message).await;
                });
            }
            while in_flight.join_next().await.is_some() {}
        });

        // 2. Feed loop with fixed-delay reconnect
        loop {
            tokio::select! {
                result = self.feed.run(sender.clone()) => {
                    match result {
                        Ok(()) => {
                            info!("Message consumer gone, stopping feed");
                            break;
                        }
                        Err(e) => {
                            error!(error = %e, "Message stream dropped");
                            self.alerter.alert("message stream dropped");
                            tokio::time::sleep(self.config.telegram.reconnect_delay).await;
                        }
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        // 3. Graceful shutdown
        drop(sender);
        let _ = dispatcher.await;
        self.shutdown().await;

        Ok(())
    }

    /// Close every surface and stop every suppressor, regardless of which
    /// code path triggered shutdown.
    async fn shutdown(self) {
        info!("Initiating graceful shutdown");

        for suppressor in self.suppressors {
            suppressor.shutdown().await;
        }

        for surface in self.registry.surfaces() {
            if let Err(e) = surface.close().await {
                warn!(key = %surface.key(), error = %e, "Failed to close surface");
            }
        }

        info!("Shutdown complete");
    }
}

// =============================================================================
// Tests
// =============================================================================
