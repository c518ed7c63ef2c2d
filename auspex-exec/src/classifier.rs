//! Classifier Gateway
//!
//! Wraps the completion port in a deterministic single-token instruction and
//! normalizes whatever comes back into a closed `Outcome`. The transport
//! constraint (max one output token) is best-effort; `Outcome::from_raw` is
//! the actual correctness boundary.

use std::sync::Arc;

use tracing::debug;

use auspex_domain::Outcome;

use crate::error::ClassifyError;
use crate::ports::{CompletionPort, CompletionRequest};

/// System instruction for the classifier service.
const SYSTEM_PROMPT: &str = "You are an assistant for evaluating negotiation results.";

/// Gateway from raw message text to a classification outcome.
pub struct ClassifierGateway<C: CompletionPort> {
    completion: Arc<C>,
    /// What the messages are about, e.g. "the phone call with Xi Jinping"
    topic: String,
    /// Operator-supplied prior news lines folded into every prompt
    context: Vec<String>,
}

impl<C: CompletionPort> ClassifierGateway<C> {
    /// Create a gateway for a topic.
    pub fn new(completion: Arc<C>, topic: impl Into<String>) -> Self {
        Self {
            completion,
            topic: topic.into(),
            context: Vec::new(),
        }
    }

    /// Attach prior-news context lines to every classification prompt.
    pub fn with_context(mut self, context: Vec<String>) -> Self {
        self.context = context;
        self
    }

    /// Classify one message.
    ///
    /// Service errors are surfaced unretried; unexpected response content
    /// never errors and normalizes to `Outcome::Inconclusive`.
    pub async fn classify(&self, text: &str) -> Result<Outcome, ClassifyError> {
        let request = CompletionRequest {
            system: SYSTEM_PROMPT.to_string(),
            prompt: self.build_prompt(text),
            deterministic: true,
            max_tokens: 1,
        };

        let raw = self.completion.complete(request).await?;
        let outcome = Outcome::from_raw(&raw);
        debug!(raw = %raw, outcome = %outcome, "Classified message");
        Ok(outcome)
    }

    /// Build the single-token classification instruction.
    fn build_prompt(&self, text: &str) -> String {
        let mut prompt = format!(
            "Message: \"{text}\"\n\n\
             Analyze whether this message reports concrete results of {topic}.\n\
             - If it describes results, return exactly ONE WORD: \"positive\" or \"negative\".\n\
             - Use \"positive\" if the reported outcome is favorable or constructive.\n\
             - Use \"negative\" if the reported outcome is hostile or escalatory.\n\
             - If there are no concrete results, or the message is purely speculative, \
             return an empty string (nothing).\n\
             - Do not answer just because the message states that {topic} has ended.\n\n\
             IMPORTANT: Return exactly one token, either \"positive\" or \"negative\", \
             with NO extra text, no punctuation, no newlines. \
             If there are no results, return \"\" (empty).",
            text = text,
            topic = self.topic,
        );

        if !self.context.is_empty() {
            prompt.push_str("\nKeep in mind previously announced news:\n");
            for (i, line) in self.context.iter().enumerate() {
                prompt.push_str(&format!("{}) {}\n", i + 1, line));
            }
        }

        prompt
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::ScriptedCompletion;

    fn gateway(completion: Arc<ScriptedCompletion>) -> ClassifierGateway<ScriptedCompletion> {
        ClassifierGateway::new(completion, "the phone call with Xi Jinping")
    }

    #[tokio::test]
    async fn test_request_is_deterministic_single_token() {
        let completion = Arc::new(ScriptedCompletion::new());
        completion.push_response("positive");

        gateway(completion.clone()).classify("Xi call ended well").await.unwrap();

        let requests = completion.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].deterministic);
        assert_eq!(requests[0].max_tokens, 1);
        assert!(requests[0].prompt.contains("Xi call ended well"));
        assert!(requests[0].prompt.contains("the phone call with Xi Jinping"));
    }

    #[tokio::test]
    async fn test_normalizes_untidy_responses() {
        for (raw, expected) in [
            ("Positive", Outcome::Positive),
            (" positive ", Outcome::Positive),
            ("positive\n", Outcome::Positive),
            ("positive negative", Outcome::Positive),
            ("", Outcome::Inconclusive),
            ("maybe", Outcome::Inconclusive),
            ("neutral", Outcome::Inconclusive),
        ] {
            let completion = Arc::new(ScriptedCompletion::new());
            completion.push_response(raw);

            let outcome = gateway(completion).classify("xi").await.unwrap();
            assert_eq!(outcome, expected, "raw response {:?}", raw);
        }
    }

    #[tokio::test]
    async fn test_service_errors_pass_through_unretried() {
        let completion = Arc::new(ScriptedCompletion::new());
        completion.push_error(ClassifyError::Service {
            status: 429,
            message: "rate limited".to_string(),
        });

        let err = gateway(completion.clone()).classify("xi").await.unwrap_err();

        assert!(matches!(err, ClassifyError::Service { status: 429, .. }));
        assert_eq!(completion.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_context_lines_are_numbered_into_prompt() {
        let completion = Arc::new(ScriptedCompletion::new());
        completion.push_response("negative");

        let gateway = gateway(completion.clone())
            .with_context(vec!["Tariff pause extended".to_string(), "Talks resumed".to_string()]);
        gateway.classify("xi").await.unwrap();

        let prompt = &completion.requests()[0].prompt;
        assert!(prompt.contains("1) Tariff pause extended"));
        assert!(prompt.contains("2) Talks resumed"));
    }
}
