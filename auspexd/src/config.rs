//! Daemon configuration.
//!
//! Loads configuration from environment variables (a `.env` file is picked
//! up when present) with sensible defaults for everything except the
//! credentials and the channel list.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use auspex_connectors::normalize_channel_id;
use auspex_domain::{Direction, ExposureKey, Instrument, Quantity, Secret};

use crate::error::{DaemonError, DaemonResult};

// =============================================================================
// Configuration
// =============================================================================

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram feed configuration
    pub telegram: TelegramConfig,

    /// Classifier service configuration
    pub classifier: ClassifierConfig,

    /// Browser control configuration
    pub browser: BrowserConfig,

    /// Signal pipeline configuration
    pub signal: SignalConfig,

    /// Operator alert configuration
    pub alert: AlertConfig,
}

/// Telegram feed configuration.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// API id from my.telegram.org
    pub api_id: i32,
    /// API hash from my.telegram.org
    pub api_hash: Secret,
    /// Phone number of the listening account
    pub phone: String,
    /// Where the authorized session is persisted
    pub session_file: PathBuf,
    /// Channel ids to listen to (normalized to bare form)
    pub channels: Vec<i64>,
    /// Fixed delay before reconnecting a dropped stream
    pub reconnect_delay: Duration,
}

/// Classifier service configuration.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// API key for the classifier service
    pub api_key: Secret,
    /// Model name
    pub model: String,
    /// What the watched messages are about
    pub topic: String,
    /// Prior-news context lines folded into every prompt
    pub context: Vec<String>,
}

/// Browser control configuration.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// WebDriver endpoint URL
    pub webdriver_url: String,
    /// Trade page URL template; `{instrument}` is substituted
    pub trade_url_template: String,
}

impl BrowserConfig {
    /// Trade page URL for an instrument.
    pub fn trade_url(&self, instrument: &Instrument) -> String {
        self.trade_url_template
            .replace("{instrument}", instrument.as_str())
    }
}

/// Signal pipeline configuration.
#[derive(Debug, Clone)]
pub struct SignalConfig {
    /// Trigger term whose presence sends a message to the classifier
    pub trigger: String,
    /// Instruments to provision surfaces for
    pub instruments: Vec<Instrument>,
    /// Trade size per exposure key
    pub quantities: HashMap<ExposureKey, Quantity>,
}

impl SignalConfig {
    /// Every exposure key this configuration provisions, in order.
    pub fn exposure_keys(&self) -> Vec<ExposureKey> {
        self.instruments
            .iter()
            .flat_map(|instrument| {
                Direction::all()
                    .into_iter()
                    .map(|direction| ExposureKey::new(instrument.clone(), direction))
            })
            .collect()
    }
}

/// Operator alert configuration.
#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// External audio player command
    pub player: String,
    /// Sound file to play on alerts
    pub sound: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> DaemonResult<Self> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let telegram = Self::load_telegram_config()?;
        let classifier = Self::load_classifier_config()?;
        let browser = Self::load_browser_config();
        let signal = Self::load_signal_config()?;
        let alert = Self::load_alert_config();

        let config = Self {
            telegram,
            classifier,
            browser,
            signal,
            alert,
        };
        config.validate()?;
        Ok(config)
    }

    /// Create test configuration.
    pub fn test() -> Self {
        let ada = Instrument::new("ADA").unwrap();
        let mut quantities = HashMap::new();
        quantities.insert(
            ExposureKey::new(ada.clone(), Direction::Long),
            "10".parse().unwrap(),
        );
        quantities.insert(
            ExposureKey::new(ada.clone(), Direction::Short),
            "20".parse().unwrap(),
        );

        Self {
            telegram: TelegramConfig {
                api_id: 1,
                api_hash: Secret::new("test-hash"),
                phone: "+10000000000".to_string(),
                session_file: PathBuf::from("test.session"),
                channels: vec![normalize_channel_id(-1002442330266)],
                reconnect_delay: Duration::from_millis(10),
            },
            classifier: ClassifierConfig {
                api_key: Secret::new("sk-test"),
                model: "gpt-4o-mini".to_string(),
                topic: "the phone call with Xi Jinping".to_string(),
                context: Vec::new(),
            },
            browser: BrowserConfig {
                webdriver_url: "http://127.0.0.1:9515".to_string(),
                trade_url_template: "https://www.mexc.com/futures/{instrument}_USDT".to_string(),
            },
            signal: SignalConfig {
                trigger: "xi".to_string(),
                instruments: vec![ada],
                quantities,
            },
            alert: AlertConfig {
                player: "true".to_string(),
                sound: PathBuf::from("error.mp3"),
            },
        }
    }

    fn load_telegram_config() -> DaemonResult<TelegramConfig> {
        let api_id = required("AUSPEX_TG_API_ID")?
            .parse::<i32>()
            .map_err(|_| DaemonError::Config("Invalid AUSPEX_TG_API_ID".to_string()))?;
        let api_hash = Secret::new(required("AUSPEX_TG_API_HASH")?);
        let phone = required("AUSPEX_TG_PHONE")?;
        let session_file =
            PathBuf::from(env_or("AUSPEX_TG_SESSION", "auspex.session"));
        let channels = parse_channels(&required("AUSPEX_CHANNELS")?)?;
        let reconnect_delay = Duration::from_secs(
            env_or("AUSPEX_RECONNECT_DELAY_SECS", "5")
                .parse::<u64>()
                .map_err(|_| {
                    DaemonError::Config("Invalid AUSPEX_RECONNECT_DELAY_SECS".to_string())
                })?,
        );

        Ok(TelegramConfig {
            api_id,
            api_hash,
            phone,
            session_file,
            channels,
            reconnect_delay,
        })
    }

    fn load_classifier_config() -> DaemonResult<ClassifierConfig> {
        Ok(ClassifierConfig {
            api_key: Secret::new(required("AUSPEX_OPENAI_API_KEY")?),
            model: env_or("AUSPEX_OPENAI_MODEL", "gpt-4o-mini"),
            topic: env_or("AUSPEX_TOPIC", "the phone call with Xi Jinping"),
            context: parse_context(&env_or("AUSPEX_CONTEXT", "")),
        })
    }

    fn load_browser_config() -> BrowserConfig {
        BrowserConfig {
            webdriver_url: env_or("AUSPEX_WEBDRIVER_URL", "http://127.0.0.1:9515"),
            trade_url_template: env_or(
                "AUSPEX_TRADE_URL",
                "https://www.mexc.com/futures/{instrument}_USDT",
            ),
        }
    }

    fn load_signal_config() -> DaemonResult<SignalConfig> {
        let trigger = env_or("AUSPEX_TRIGGER", "xi");
        let instruments = parse_instruments(&env_or("AUSPEX_INSTRUMENTS", "ADA"))?;
        let quantities =
            parse_quantities(&env_or("AUSPEX_QUANTITIES", "ADA:long=10,ADA:short=20"))?;

        Ok(SignalConfig {
            trigger,
            instruments,
            quantities,
        })
    }

    fn load_alert_config() -> AlertConfig {
        AlertConfig {
            player: env_or("AUSPEX_ALERT_PLAYER", "mpg123"),
            sound: PathBuf::from(env_or("AUSPEX_ALERT_SOUND", "error.mp3")),
        }
    }

    /// Cross-section validation.
    ///
    /// Every configured exposure key must have a quantity, so bootstrap can
    /// provision the full registry before the router starts.
    fn validate(&self) -> DaemonResult<()> {
        if self.signal.instruments.is_empty() {
            return Err(DaemonError::Config(
                "At least one instrument must be configured".to_string(),
            ));
        }
        if self.telegram.channels.is_empty() {
            return Err(DaemonError::Config(
                "At least one channel must be configured".to_string(),
            ));
        }
        for key in self.signal.exposure_keys() {
            if !self.signal.quantities.contains_key(&key) {
                return Err(DaemonError::Config(format!(
                    "No quantity configured for {}",
                    key
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Parsers
// =============================================================================

fn required(key: &str) -> DaemonResult<String> {
    env::var(key).map_err(|_| DaemonError::Config(format!("{} must be set", key)))
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a comma-separated channel id list, normalizing each id.
fn parse_channels(raw: &str) -> DaemonResult<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map(normalize_channel_id)
                .map_err(|_| DaemonError::Config(format!("Invalid channel id: {}", part)))
        })
        .collect()
}

/// Parse a comma-separated instrument list.
fn parse_instruments(raw: &str) -> DaemonResult<Vec<Instrument>> {
    let instruments: Vec<Instrument> = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| Instrument::new(part).map_err(DaemonError::from))
        .collect::<DaemonResult<_>>()?;
    Ok(instruments)
}

/// Parse a quantity table spec like `ADA:long=10,ADA:short=20`.
fn parse_quantities(raw: &str) -> DaemonResult<HashMap<ExposureKey, Quantity>> {
    let mut quantities = HashMap::new();

    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (key_part, qty_part) = entry.split_once('=').ok_or_else(|| {
            DaemonError::Config(format!("Invalid quantity entry (expected KEY=QTY): {}", entry))
        })?;
        let (instrument_part, direction_part) = key_part.split_once(':').ok_or_else(|| {
            DaemonError::Config(format!(
                "Invalid quantity key (expected INSTRUMENT:DIRECTION): {}",
                key_part
            ))
        })?;

        let instrument = Instrument::new(instrument_part)?;
        let direction = direction_part.parse::<Direction>()?;
        let quantity = qty_part.parse::<Quantity>()?;

        let key = ExposureKey::new(instrument, direction);
        if quantities.insert(key.clone(), quantity).is_some() {
            return Err(DaemonError::Config(format!(
                "Duplicate quantity entry for {}",
                key
            )));
        }
    }

    Ok(quantities)
}

/// Parse `|`-separated context lines.
fn parse_context(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_test_config_is_valid() {
        let config = Config::test();

        config.validate().unwrap();
        assert_eq!(config.signal.exposure_keys().len(), 2);
    }

    #[test]
    fn test_parse_channels_normalizes_ids() {
        let channels = parse_channels("-1002442330266, 2062626558").unwrap();

        assert_eq!(channels, vec![2442330266, 2062626558]);
        assert!(parse_channels("-100abc").is_err());
    }

    #[test]
    fn test_parse_quantities_table() {
        let quantities = parse_quantities("ADA:long=10, ADA:short=20").unwrap();
        let ada = Instrument::new("ADA").unwrap();

        let long = &quantities[&ExposureKey::new(ada.clone(), Direction::Long)];
        let short = &quantities[&ExposureKey::new(ada, Direction::Short)];
        assert_eq!(long.as_decimal(), dec!(10));
        assert_eq!(short.as_decimal(), dec!(20));
    }

    #[test]
    fn test_parse_quantities_rejects_malformed_entries() {
        assert!(parse_quantities("ADA:long").is_err());
        assert!(parse_quantities("ADAlong=10").is_err());
        assert!(parse_quantities("ADA:sideways=10").is_err());
        assert!(parse_quantities("ADA:long=0").is_err());
        assert!(parse_quantities("ADA:long=10,ADA:long=15").is_err());
    }

    #[test]
    fn test_validate_requires_quantity_for_every_key() {
        let mut config = Config::test();
        let ada = Instrument::new("ADA").unwrap();
        config
            .signal
            .quantities
            .remove(&ExposureKey::new(ada, Direction::Short));

        let err = config.validate().unwrap_err();
        assert!(matches!(err, DaemonError::Config(_)));
    }

    #[test]
    fn test_validate_requires_instruments_and_channels() {
        let mut config = Config::test();
        config.signal.instruments.clear();
        assert!(config.validate().is_err());

        let mut config = Config::test();
        config.telegram.channels.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_trade_url_substitution() {
        let config = Config::test();
        let ada = Instrument::new("ADA").unwrap();

        assert_eq!(
            config.browser.trade_url(&ada),
            "https://www.mexc.com/futures/ADA_USDT"
        );
    }

    #[test]
    fn test_parse_context_lines() {
        let context = parse_context("Tariff pause extended | Talks resumed |");

        assert_eq!(context, vec!["Tariff pause extended", "Talks resumed"]);
        assert!(parse_context("").is_empty());
    }
}
