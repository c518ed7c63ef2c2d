//! Operator alerts.
//!
//! The audible side channel that makes a human look at the logs. Alerts are
//! best-effort: a missing player binary or sound file must never take the
//! pipeline down, so every failure here is swallowed.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tracing::{debug, warn};

use auspex_exec::AlertPort;

/// Audible alerter backed by an external audio player.
pub struct SoundAlerter {
    /// Player command (e.g. "mpg123")
    player: String,
    /// Sound file to play
    sound: PathBuf,
}

impl SoundAlerter {
    /// Create an alerter for a player command and sound file.
    pub fn new(player: impl Into<String>, sound: impl AsRef<Path>) -> Self {
        Self {
            player: player.into(),
            sound: sound.as_ref().to_path_buf(),
        }
    }
}

impl AlertPort for SoundAlerter {
    fn alert(&self, reason: &str) {
        warn!(reason, "Operator alert");

        // Terminal bell even when no audio player is available
        let _ = std::io::stderr().write_all(b"\x07");

        match tokio::process::Command::new(&self.player)
            .arg(&self.sound)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(_child) => {}
            Err(e) => debug!(player = %self.player, error = %e, "Alert sound unavailable"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_alert_swallows_missing_player() {
        let alerter = SoundAlerter::new("definitely-not-a-player", "missing.mp3");

        // Must not panic or error out
        alerter.alert("classification failed");
        alerter.alert("trade click failed");
    }
}
