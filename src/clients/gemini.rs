//! Gemini text-generation client.
//!
//! Implements [`TextCollaborator`] on top of the `generateContent` REST endpoint.
//! Only the text parts of the first candidate are used.

use crate::{
    config::GeminiSettings,
    core::assistant::TextCollaborator,
    errors::{Error, Result},
    models::FinancialRecord,
};
use serde::{Deserialize, Serialize};

const USER_AGENT: &str = concat!("clubhouse/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

/// `generateContent` response, reduced to the fields we read
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Prompt asking for a short summary of the dues ledger.
pub fn analysis_prompt(records: &[FinancialRecord]) -> Result<String> {
    let ledger = serde_json::to_string(records)?;
    Ok(format!(
        "Analyze and summarize the following golf club dues ledger: {ledger}. \
         Briefly summarize total income, total expenses, and anything notable."
    ))
}

/// Prompt asking for notice copy on a topic.
#[must_use]
pub fn notice_prompt(topic: &str) -> String {
    format!(
        "Write a notice for our golf club. Topic: {topic}. \
         Keep the tone polite and clear, and include the key details."
    )
}

/// Gemini API client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http_client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Creates a client for the configured endpoint and model.
    pub fn new(settings: &GeminiSettings, api_key: String) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Collaborator {
                message: e.to_string(),
            })?;

        Ok(Self {
            http_client,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key,
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        };

        tracing::debug!(model = %self.model, "Calling text generation service");

        let response = self
            .http_client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Collaborator {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Collaborator {
                message: format!("HTTP {}: {error_text}", status.as_u16()),
            });
        }

        let body: GenerateResponse = response.json().await.map_err(|e| Error::Collaborator {
            message: e.to_string(),
        })?;
        Ok(body.text())
    }
}

impl TextCollaborator for GeminiClient {
    async fn analyze(&self, records: &[FinancialRecord]) -> Result<String> {
        self.generate(&analysis_prompt(records)?).await
    }

    async fn draft_notice(&self, topic: &str) -> Result<String> {
        self.generate(&notice_prompt(topic)).await
    }
}
