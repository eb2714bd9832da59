//! Text collaborator boundary and the published analysis result.
//!
//! The collaborator is an external text-generation service. Ledger analysis is
//! published through an [`AnalysisPanel`]: calls may overlap, nothing correlates
//! requests, and whichever response arrives last is what subscribers see.

use crate::{
    errors::{Result, ValidationError},
    models::FinancialRecord,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Shown in place of the analysis when the service fails.
pub const ANALYSIS_FAILED_MESSAGE: &str = "An error occurred while analyzing the ledger.";
/// Shown in place of the analysis when the service answers with nothing.
pub const ANALYSIS_EMPTY_MESSAGE: &str = "Could not retrieve analysis results.";

/// An external service that writes free text.
#[allow(async_fn_in_trait)]
pub trait TextCollaborator {
    /// Summarizes the dues ledger.
    async fn analyze(&self, records: &[FinancialRecord]) -> Result<String>;

    /// Drafts notice copy about `topic`.
    async fn draft_notice(&self, topic: &str) -> Result<String>;
}

/// What the analysis panel currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisState {
    /// Analysis calls that have not resolved yet
    pub in_flight: usize,
    /// Latest published text, if any
    pub text: Option<String>,
}

impl AnalysisState {
    /// Whether at least one call is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.in_flight > 0
    }
}

/// Publishes ledger analysis results. Clones share the same state.
#[derive(Debug, Clone)]
pub struct AnalysisPanel {
    state: Arc<watch::Sender<AnalysisState>>,
}

impl Default for AnalysisPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisPanel {
    /// Creates an empty panel.
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(AnalysisState::default());
        Self {
            state: Arc::new(state),
        }
    }

    /// Follows the published state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AnalysisState> {
        self.state.subscribe()
    }

    /// Snapshot of the published state.
    #[must_use]
    pub fn current(&self) -> AnalysisState {
        self.state.borrow().clone()
    }

    /// Clears the published text.
    pub fn dismiss(&self) {
        self.state.send_modify(|s| s.text = None);
    }

    /// Asks the collaborator to analyze `records` and publishes the outcome.
    ///
    /// Never fails: a service error publishes [`ANALYSIS_FAILED_MESSAGE`] and an
    /// empty answer publishes [`ANALYSIS_EMPTY_MESSAGE`]. Returns the published text.
    pub async fn run_analysis<C: TextCollaborator>(
        &self,
        collaborator: &C,
        records: &[FinancialRecord],
    ) -> String {
        self.state.send_modify(|s| s.in_flight += 1);
        info!(entries = records.len(), "Requesting ledger analysis");

        let text = match collaborator.analyze(records).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => ANALYSIS_EMPTY_MESSAGE.to_string(),
            Err(e) => {
                warn!("Ledger analysis failed: {e}");
                ANALYSIS_FAILED_MESSAGE.to_string()
            }
        };

        self.state.send_modify(|s| {
            s.in_flight = s.in_flight.saturating_sub(1);
            s.text = Some(text.clone());
        });
        text
    }
}

/// Drafts notice copy for a non-blank topic.
pub async fn draft_notice<C: TextCollaborator>(collaborator: &C, topic: &str) -> Result<String> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(ValidationError::MissingField { field: "topic" }.into());
    }
    info!(topic, "Requesting notice draft");
    collaborator.draft_notice(topic).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::Error;
    use crate::test_utils::sample_roster;
    use std::{collections::VecDeque, sync::Mutex};
    use tokio::sync::oneshot;

    /// Answers each call with the next scripted reply, waiting until it is sent.
    #[derive(Default)]
    struct Scripted {
        replies: Mutex<VecDeque<oneshot::Receiver<Result<String>>>>,
        topics: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn push_pending(&self) -> oneshot::Sender<Result<String>> {
            let (tx, rx) = oneshot::channel();
            self.replies.lock().unwrap().push_back(rx);
            tx
        }

        fn push_ready(&self, reply: Result<String>) {
            let _ = self.push_pending().send(reply);
        }
    }

    impl TextCollaborator for Scripted {
        async fn analyze(&self, _records: &[FinancialRecord]) -> Result<String> {
            let reply = self.replies.lock().unwrap().pop_front().unwrap();
            reply.await.unwrap()
        }

        async fn draft_notice(&self, topic: &str) -> Result<String> {
            self.topics.lock().unwrap().push(topic.to_string());
            Ok(format!("Notice about {topic}"))
        }
    }

    #[tokio::test]
    async fn test_publishes_analysis() {
        let panel = AnalysisPanel::new();
        let collaborator = Scripted::default();
        collaborator.push_ready(Ok("Balance is healthy.".to_string()));

        let text = panel
            .run_analysis(&collaborator, &sample_roster().finances)
            .await;

        assert_eq!(text, "Balance is healthy.");
        assert_eq!(
            panel.current(),
            AnalysisState {
                in_flight: 0,
                text: Some(text),
            }
        );
    }

    #[tokio::test]
    async fn test_failure_publishes_fixed_message() {
        let panel = AnalysisPanel::new();
        let collaborator = Scripted::default();
        collaborator.push_ready(Err(Error::Collaborator {
            message: "quota exceeded".to_string(),
        }));

        let text = panel.run_analysis(&collaborator, &[]).await;
        assert_eq!(text, ANALYSIS_FAILED_MESSAGE);
        assert_eq!(panel.current().text.as_deref(), Some(ANALYSIS_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_empty_answer_publishes_placeholder() {
        let panel = AnalysisPanel::new();
        let collaborator = Scripted::default();
        collaborator.push_ready(Ok("  \n".to_string()));

        assert_eq!(
            panel.run_analysis(&collaborator, &[]).await,
            ANALYSIS_EMPTY_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_last_response_wins() {
        let panel = AnalysisPanel::new();
        let watcher = panel.clone();
        let collaborator = Scripted::default();
        let first_reply = collaborator.push_pending();
        collaborator.push_ready(Ok("second".to_string()));

        let first = panel.run_analysis(&collaborator, &[]);
        tokio::pin!(first);

        // Start the first call without letting it finish.
        tokio::select! {
            biased;
            _ = &mut first => unreachable!("first reply has not been sent"),
            () = tokio::task::yield_now() => {}
        }
        assert!(watcher.current().is_loading());

        assert_eq!(panel.run_analysis(&collaborator, &[]).await, "second");
        assert_eq!(watcher.current().text.as_deref(), Some("second"));
        assert!(watcher.current().is_loading());

        first_reply.send(Ok("first".to_string())).unwrap();
        assert_eq!(first.await, "first");

        let state = watcher.current();
        assert_eq!(state.text.as_deref(), Some("first"));
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn test_dismiss_clears_text() {
        let panel = AnalysisPanel::new();
        let collaborator = Scripted::default();
        collaborator.push_ready(Ok("summary".to_string()));
        panel.run_analysis(&collaborator, &[]).await;

        let mut updates = panel.subscribe();
        panel.dismiss();
        assert!(updates.has_changed().unwrap());
        assert_eq!(updates.borrow_and_update().text, None);
    }

    #[tokio::test]
    async fn test_draft_notice_requires_topic() -> Result<()> {
        let collaborator = Scripted::default();

        let err = draft_notice(&collaborator, "   ").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::MissingField { field: "topic" })
        ));

        let text = draft_notice(&collaborator, "  April round ").await?;
        assert_eq!(text, "Notice about April round");
        assert_eq!(*collaborator.topics.lock().unwrap(), vec!["April round"]);
        Ok(())
    }
}
