//! Credential Material
//!
//! Secret wrapper for API credentials held in process memory.
//!
//! # Security Model
//!
//! - Secrets are zeroized on drop
//! - Debug/Display never print the underlying value

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A secret string (API key, hash, password).
///
/// The value is zeroized when dropped and redacted in all formatting.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the underlying value.
    ///
    /// Call sites should pass the result straight to the consuming client
    /// rather than copying it around.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_redacted_in_formatting() {
        let secret = Secret::new("sk-very-secret");

        assert_eq!(format!("{}", secret), "***");
        assert_eq!(format!("{:?}", secret), "Secret(***)");
        assert_eq!(secret.expose(), "sk-very-secret");
    }
}
