//! Signal Filter
//!
//! Cheap local test deciding whether an inbound message is worth sending to
//! the classifier at all. False positives only cost a classification call;
//! the trigger term is matched exactly, insensitive to case only.

use crate::value_objects::DomainError;

/// Case-insensitive substring filter over a configured trigger term.
///
/// Pure and stateless: a single scan over the message text, no side effects.
#[derive(Debug, Clone)]
pub struct SignalFilter {
    /// Trigger term, lowercased once at construction
    trigger: String,
}

impl SignalFilter {
    /// Create a filter for the given trigger term.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidTrigger` for an empty term (an empty
    /// trigger would accept every message).
    pub fn new(trigger: &str) -> Result<Self, DomainError> {
        let trigger = trigger.trim();
        if trigger.is_empty() {
            return Err(DomainError::InvalidTrigger(
                "Trigger term must not be empty".to_string(),
            ));
        }
        Ok(Self {
            trigger: trigger.to_lowercase(),
        })
    }

    /// The configured trigger term (lowercased).
    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    /// Whether the message text contains the trigger term, ignoring case.
    pub fn matches(&self, text: &str) -> bool {
        text.to_lowercase().contains(&self.trigger)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_trigger() {
        assert!(SignalFilter::new("").is_err());
        assert!(SignalFilter::new("  ").is_err());
    }

    #[test]
    fn test_accepts_any_case_mix() {
        let filter = SignalFilter::new("xi").unwrap();

        assert!(filter.matches("XI"));
        assert!(filter.matches("xI"));
        assert!(filter.matches("confirmed xi talks"));
        assert!(filter.matches("Xi Jinping call ends with no new tariffs"));
    }

    #[test]
    fn test_rejects_messages_without_trigger() {
        let filter = SignalFilter::new("xi").unwrap();

        assert!(!filter.matches(""));
        assert!(!filter.matches("tariff talks continue"));
        assert!(!filter.matches("X I spelled out"));
    }

    #[test]
    fn test_trigger_is_case_insensitive_at_construction() {
        let filter = SignalFilter::new("Xi").unwrap();

        assert_eq!(filter.trigger(), "xi");
        assert!(filter.matches("taxi fare"));
    }
}
