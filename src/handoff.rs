// src/handoff.rs — Human escalation hand-off
//
// The side channel a host uses to forward a question to the official's
// team once the detector has flagged a reply. The detector never calls
// this itself.

use async_trait::async_trait;

use crate::infra::errors::TownhallError;

#[async_trait]
pub trait TeamHandoff: Send + Sync {
    async fn escalate(&self, question: &str, context: &str) -> Result<(), TownhallError>;
}

/// Stand-in dispatcher that records the hand-off in the log. Real
/// deployments plug in a mail or ticketing transport here.
#[derive(Debug, Default)]
pub struct LoggingHandoff;

#[async_trait]
impl TeamHandoff for LoggingHandoff {
    async fn escalate(&self, question: &str, context: &str) -> Result<(), TownhallError> {
        tracing::info!(
            question = %question,
            context_len = context.len(),
            "escalation forwarded to team inbox"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_logging_handoff_succeeds() {
        let h = LoggingHandoff;
        assert!(h.escalate("When is the vote?", "ctx").await.is_ok());
    }
}
