//! Telegram Channel Feed
//!
//! Subscribes to a configured set of channels over an MTProto user session
//! and forwards their messages into the pipeline. Authorization is
//! interactive on first run (login code, optional two-step password) and
//! silent afterwards via the persisted session file.

use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info};

use grammers_client::session::Session;
use grammers_client::{Client, Config, SignInError, Update};

use auspex_domain::{InboundMessage, Secret};
use auspex_exec::{FeedError, FeedPort, OperatorPrompt};

// =============================================================================
// Credentials
// =============================================================================

/// Telegram API credentials for a user session.
#[derive(Debug, Clone)]
pub struct TelegramCredentials {
    /// API id from my.telegram.org
    pub api_id: i32,
    /// API hash from my.telegram.org
    pub api_hash: Secret,
    /// Phone number of the account
    pub phone: String,
}

// =============================================================================
// Telegram Feed
// =============================================================================

/// Inbound message stream over a Telegram user session.
pub struct TelegramFeed {
    /// Connected client
    client: Client,
    /// Where the session is persisted between runs
    session_file: PathBuf,
    /// Channel ids to forward (normalized, bare form)
    channels: HashSet<i64>,
}

impl TelegramFeed {
    /// Connect to Telegram, reusing the persisted session when present.
    pub async fn connect(
        credentials: &TelegramCredentials,
        session_file: impl Into<PathBuf>,
        channels: &[i64],
    ) -> Result<Self, FeedError> {
        let session_file = session_file.into();
        let session = Session::load_file_or_create(&session_file)
            .map_err(|e| FeedError::Session(e.to_string()))?;

        info!("Connecting to Telegram");
        let client = Client::connect(Config {
            session,
            api_id: credentials.api_id,
            api_hash: credentials.api_hash.expose().to_string(),
            params: Default::default(),
        })
        .await
        .map_err(|e| FeedError::Connect(e.to_string()))?;

        Ok(Self {
            client,
            session_file,
            channels: channels.iter().map(|&id| normalize_channel_id(id)).collect(),
        })
    }

    /// Make sure the session is authorized, prompting the operator if not.
    ///
    /// On a fresh session this requests a login code, reads it from the
    /// operator, handles the optional two-step password, and persists the
    /// session for silent reuse on the next run.
    pub async fn ensure_authorized(
        &self,
        credentials: &TelegramCredentials,
        prompt: &dyn OperatorPrompt,
    ) -> Result<(), FeedError> {
        let authorized = self
            .client
            .is_authorized()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;
        if authorized {
            info!("Already logged in to Telegram");
            return Ok(());
        }

        info!("Requesting Telegram login code");
        let token = self
            .client
            .request_login_code(&credentials.phone)
            .await
            .map_err(|e| FeedError::Auth(e.to_string()))?;

        let code = prompt
            .read_line("Enter Telegram code: ")
            .map_err(|e| FeedError::Prompt(e.to_string()))?;

        match self.client.sign_in(&token, code.trim()).await {
            Ok(_) => {}
            Err(SignInError::PasswordRequired(password_token)) => {
                let password = prompt
                    .read_line("Two-step password: ")
                    .map_err(|e| FeedError::Prompt(e.to_string()))?;
                self.client
                    .check_password(password_token, password.trim())
                    .await
                    .map_err(|e| FeedError::Auth(e.to_string()))?;
            }
            Err(e) => return Err(FeedError::Auth(e.to_string())),
        }

        self.client
            .session()
            .save_to_file(&self.session_file)
            .map_err(|e| FeedError::Session(e.to_string()))?;
        info!("Telegram login successful");
        Ok(())
    }

    /// Whether a chat id belongs to the subscribed channel set.
    pub fn wants(&self, channel_id: i64) -> bool {
        self.channels.contains(&normalize_channel_id(channel_id))
    }
}

#[async_trait]
impl FeedPort for TelegramFeed {
    /// Pump channel messages into the pipeline until the transport drops.
    ///
    /// The subscribed-channel filter is applied here, before the router.
    async fn run(&self, sender: mpsc::Sender<InboundMessage>) -> Result<(), FeedError> {
        info!(channels = self.channels.len(), "Listening for channel messages");
        loop {
            let update = self
                .client
                .next_update()
                .await
                .map_err(|e| FeedError::Transport(e.to_string()))?;

            if let Update::NewMessage(message) = update {
                if message.outgoing() {
                    continue;
                }
                let chat_id = message.chat().id();
                if !self.wants(chat_id) {
                    continue;
                }

                let inbound = InboundMessage::new(chat_id, message.text());
                debug!(signal_id = %inbound.id, channel_id = chat_id, "Forwarding channel message");
                if sender.send(inbound).await.is_err() {
                    // Receiver dropped: the daemon is shutting down
                    return Ok(());
                }
            }
        }
    }
}

// =============================================================================
// Channel Id Normalization
// =============================================================================

/// Normalize a channel id to its bare positive form.
///
/// Operators paste `-100…`-prefixed ids from Telegram clients; the update
/// stream reports bare channel ids. Both forms are accepted.
pub fn normalize_channel_id(raw: i64) -> i64 {
    if raw >= 0 {
        return raw;
    }
    let positive = raw.unsigned_abs() as i64;
    let digits = positive.to_string();
    if let Some(bare) = digits.strip_prefix("100") {
        if !bare.is_empty() {
            if let Ok(id) = bare.parse::<i64>() {
                return id;
            }
        }
    }
    positive
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_marked_prefix() {
        assert_eq!(normalize_channel_id(-1002442330266), 2442330266);
        assert_eq!(normalize_channel_id(-1002062626558), 2062626558);
    }

    #[test]
    fn test_normalize_keeps_bare_ids() {
        assert_eq!(normalize_channel_id(2442330266), 2442330266);
        assert_eq!(normalize_channel_id(0), 0);
    }

    #[test]
    fn test_normalize_plain_negative_ids() {
        // Basic group ids are negative without the -100 marker
        assert_eq!(normalize_channel_id(-5007), 5007);
        assert_eq!(normalize_channel_id(-100), 100);
    }
}
