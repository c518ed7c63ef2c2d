//! Auspex Daemon
//!
//! Event-driven trading signal pipeline: watches Telegram channels for a
//! trigger term, classifies triggering messages with an LLM, and converts
//! the classification into a directional trade click on a pre-provisioned
//! browser page.
//!
//! # Usage
//!
//! ```bash
//! # chromedriver must be running (default: http://127.0.0.1:9515)
//! cargo run -p auspexd
//! ```
//!
//! # Environment Variables
//!
//! Required: `AUSPEX_TG_API_ID`, `AUSPEX_TG_API_HASH`, `AUSPEX_TG_PHONE`,
//! `AUSPEX_OPENAI_API_KEY`, `AUSPEX_CHANNELS`.
//!
//! Optional (with defaults): `AUSPEX_TRIGGER`, `AUSPEX_INSTRUMENTS`,
//! `AUSPEX_QUANTITIES`, `AUSPEX_OPENAI_MODEL`, `AUSPEX_TOPIC`,
//! `AUSPEX_CONTEXT`, `AUSPEX_WEBDRIVER_URL`, `AUSPEX_TRADE_URL`,
//! `AUSPEX_TG_SESSION`, `AUSPEX_RECONNECT_DELAY_SECS`,
//! `AUSPEX_ALERT_PLAYER`, `AUSPEX_ALERT_SOUND`.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use auspex_connectors::{OpenAiClient, TelegramCredentials, TelegramFeed, WebDriverBrowser};
use auspex_domain::SignalFilter;
use auspex_exec::{AlertPort, ClassifierGateway};
use auspexd::{provision, Config, Daemon, SignalRouter, SoundAlerter, StdinPrompt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("auspexd=info".parse()?))
        .init();

    // Load configuration
    let config = Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        model = %config.classifier.model,
        trigger = %config.signal.trigger,
        instruments = config.signal.instruments.len(),
        "Auspex Daemon"
    );

    let prompt = StdinPrompt;
    let alerter: Arc<dyn AlertPort> =
        Arc::new(SoundAlerter::new(&config.alert.player, &config.alert.sound));

    // 1. Messaging platform login (interactive on first run)
    let credentials = TelegramCredentials {
        api_id: config.telegram.api_id,
        api_hash: config.telegram.api_hash.clone(),
        phone: config.telegram.phone.clone(),
    };
    let feed = TelegramFeed::connect(
        &credentials,
        config.telegram.session_file.clone(),
        &config.telegram.channels,
    )
    .await?;
    feed.ensure_authorized(&credentials, &prompt).await?;

    // 2. Trading origin login + surface provisioning (fatal on any failure)
    let browser = Arc::new(WebDriverBrowser::new(&config.browser.webdriver_url));
    let provisioned = provision(&browser, &config, &prompt).await?;
    let registry = Arc::new(provisioned.registry);

    // 3. Router wiring
    let completion = Arc::new(OpenAiClient::new(
        config.classifier.api_key.clone(),
        &config.classifier.model,
    ));
    let classifier = ClassifierGateway::new(completion, &config.classifier.topic)
        .with_context(config.classifier.context.clone());
    let filter = SignalFilter::new(&config.signal.trigger)?;
    let instrument = config
        .signal
        .instruments
        .first()
        .cloned()
        .context("No instruments configured")?;
    let router = Arc::new(SignalRouter::new(
        filter,
        classifier,
        registry.clone(),
        alerter.clone(),
        instrument,
    ));

    // 4. Run until interrupted
    let daemon = Daemon::new(
        config,
        feed,
        router,
        registry,
        provisioned.suppressors,
        alerter,
    );
    daemon.run().await?;

    Ok(())
}
