//! Operator console.
//!
//! Interactive stdin/stdout prompts for the one-time authentication steps
//! (Telegram login code, two-step password, manual browser login pause).

use std::io::{self, BufRead, Write};

use auspex_exec::OperatorPrompt;

/// Stdin-backed operator prompt.
pub struct StdinPrompt;

impl OperatorPrompt for StdinPrompt {
    fn read_line(&self, message: &str) -> io::Result<String> {
        print!("{}", message);
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}
