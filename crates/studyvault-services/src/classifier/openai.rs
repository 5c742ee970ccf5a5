//! OpenAI chat completions client for relevance classification.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use studyvault_core::models::{Verdict, MAX_CONFIDENCE};
use studyvault_core::Config;

use super::{ClassifierError, RelevanceClassifier};

const SYSTEM_PROMPT: &str = r#"You are an AI content analyzer that determines if PDF documents are study-related or educational materials.

Analyze the provided content and determine:
1. Is this study-related? (educational materials, textbooks, research papers, assignments, course materials, lab manuals, question papers, study guides, etc.)
2. Confidence level (0-100)
3. Brief summary of content
4. Relevant categories if study-related
5. Reasoning for your decision

Study-related content includes academic papers and research, textbooks and educational materials, course syllabi and curricula, assignments and homework, lab manuals and experiments, question papers and exams, study guides and notes, educational presentations, academic journals and articles.

Non-study-related content includes personal documents, business documents, entertainment content, random text or spam, marketing materials, legal documents (unless academic law materials).

Respond in JSON format only:
{
  "isStudyRelated": boolean,
  "confidence": number,
  "summary": "brief summary",
  "categories": ["category1", "category2"],
  "reasoning": "explanation for decision"
}"#;

const TRUNCATION_MARKER: &str = "\n...(truncated)";

#[derive(Clone)]
pub struct OpenAiClassifierConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub char_budget: usize,
}

impl Debug for OpenAiClassifierConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("OpenAiClassifierConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("char_budget", &self.char_budget)
            .finish_non_exhaustive()
    }
}

impl OpenAiClassifierConfig {
    /// `None` when no API key is configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        Some(Self {
            api_key: config.openai_api_key()?.to_string(),
            base_url: config.openai_base_url().trim_end_matches('/').to_string(),
            model: config.classifier_model().to_string(),
            timeout: Duration::from_secs(config.classifier_timeout_secs()),
            char_budget: config.classifier_char_budget(),
        })
    }
}

pub struct OpenAiClassifier {
    http_client: reqwest::Client,
    config: OpenAiClassifierConfig,
}

impl Debug for OpenAiClassifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("OpenAiClassifier")
            .field("config", &self.config)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

/// Model output before range checking.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVerdict {
    is_study_related: bool,
    confidence: f64,
    summary: String,
    categories: Vec<String>,
    reasoning: String,
}

impl RawVerdict {
    fn into_verdict(self) -> Result<Verdict, ClassifierError> {
        if !self.confidence.is_finite()
            || self.confidence < 0.0
            || self.confidence > f64::from(MAX_CONFIDENCE)
        {
            return Err(ClassifierError::Malformed(format!(
                "confidence {} outside 0..=100",
                self.confidence
            )));
        }
        // Round up: against an integer threshold, `ceil(x) > t` iff `x > t`.
        Ok(Verdict::new(
            self.is_study_related,
            self.confidence.ceil() as u8,
            self.summary,
            self.categories,
            self.reasoning,
        ))
    }
}

/// Cut `text` to at most `budget` characters on a char boundary.
fn truncate_excerpt(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

impl OpenAiClassifier {
    pub fn new(config: OpenAiClassifierConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "Failed to create HTTP client for OpenAI API, using default client");
                reqwest::Client::default()
            });

        Self {
            http_client,
            config,
        }
    }

    fn user_prompt(&self, file_name: &str, excerpt: &str) -> String {
        format!(
            "Analyze this PDF content:\n\nFilename: {}\n\nContent:\n{}",
            file_name,
            truncate_excerpt(excerpt, self.config.char_budget)
        )
    }
}

#[async_trait]
impl RelevanceClassifier for OpenAiClassifier {
    #[tracing::instrument(skip(self, excerpt), fields(model = %self.config.model, excerpt_chars = excerpt.len()))]
    async fn classify(&self, file_name: &str, excerpt: &str) -> Result<Verdict, ClassifierError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let request_body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": self.user_prompt(file_name, excerpt) }
            ],
            "max_tokens": 1000,
            "temperature": 0.1,
            "response_format": { "type": "json_object" }
        });

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifierError::Timeout(self.config.timeout.as_secs())
                } else {
                    ClassifierError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let message = serde_json::from_str::<serde_json::Value>(&error_text)
                .ok()
                .and_then(|v| {
                    v.get("error")
                        .and_then(|e| e.get("message"))
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                })
                .unwrap_or(error_text);

            return Err(ClassifierError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Malformed(e.to_string()))?;

        let content = chat_response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .ok_or_else(|| ClassifierError::Malformed("no message content".to_string()))?;

        let raw: RawVerdict = serde_json::from_str(content.trim())
            .map_err(|e| ClassifierError::Malformed(e.to_string()))?;
        let verdict = raw.into_verdict()?;

        tracing::info!(
            is_study_related = verdict.is_study_related,
            confidence = verdict.confidence,
            "Classifier verdict received"
        );
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier(base_url: String) -> OpenAiClassifier {
        OpenAiClassifier::new(OpenAiClassifierConfig {
            api_key: "sk-test".to_string(),
            base_url,
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(5),
            char_budget: 8000,
        })
    }

    fn completion(content: &str) -> String {
        json!({ "choices": [ { "message": { "role": "assistant", "content": content } } ] })
            .to_string()
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_excerpt("short", 10), "short");
        assert_eq!(truncate_excerpt("exactly", 7), "exactly");
        assert_eq!(truncate_excerpt("ééééé", 2), "éé\n...(truncated)");
    }

    #[test]
    fn user_prompt_format() {
        let c = classifier("http://unused".to_string());
        assert_eq!(
            c.user_prompt("dsa.pdf", "Q1. Define a heap."),
            "Analyze this PDF content:\n\nFilename: dsa.pdf\n\nContent:\nQ1. Define a heap."
        );
    }

    #[tokio::test]
    async fn parses_verdict_from_chat_completion() {
        let mut server = mockito::Server::new_async().await;
        let verdict = r#"{"isStudyRelated":true,"confidence":85,"summary":"DSA exam","categories":["question-paper"],"reasoning":"exam questions"}"#;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion(verdict))
            .create_async()
            .await;

        let result = classifier(server.url())
            .classify("dsa.pdf", "Q1. Define a heap.")
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(result.is_study_related);
        assert_eq!(result.confidence, 85);
        assert_eq!(result.categories, vec!["question-paper".to_string()]);
    }

    #[tokio::test]
    async fn api_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body(r#"{"error":{"message":"Rate limit reached","type":"requests"}}"#)
            .create_async()
            .await;

        let err = classifier(server.url())
            .classify("a.pdf", "text")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClassifierError::Api { status: 429, ref message } if message == "Rate limit reached"
        ));
    }

    #[tokio::test]
    async fn out_of_range_confidence_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let verdict = r#"{"isStudyRelated":true,"confidence":140,"summary":"s","categories":[],"reasoning":"r"}"#;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(completion(verdict))
            .create_async()
            .await;

        let err = classifier(server.url())
            .classify("a.pdf", "text")
            .await
            .unwrap_err();
        assert!(matches!(err, ClassifierError::Malformed(_)));
    }

    #[tokio::test]
    async fn missing_field_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(completion(r#"{"isStudyRelated":true,"confidence":90}"#))
            .create_async()
            .await;

        let err = classifier(server.url())
            .classify("a.pdf", "text")
            .await
            .unwrap_err();
        assert!(matches!(err, ClassifierError::Malformed(_)));
    }

    #[test]
    fn fractional_confidence_keeps_its_side_of_the_threshold() {
        let raw = |confidence: f64| RawVerdict {
            is_study_related: true,
            confidence,
            summary: "s".to_string(),
            categories: vec![],
            reasoning: "r".to_string(),
        };

        let just_above = raw(70.3).into_verdict().unwrap();
        assert_eq!(just_above.confidence, 71);
        assert_eq!(
            studyvault_core::decide(Some(&just_above)),
            studyvault_core::AdmissionDecision::AutoPublish
        );

        let exact = raw(70.0).into_verdict().unwrap();
        assert_eq!(exact.confidence, 70);
        assert_eq!(
            studyvault_core::decide(Some(&exact)),
            studyvault_core::AdmissionDecision::HoldForReview
        );

        assert_eq!(raw(99.2).into_verdict().unwrap().confidence, 100);
    }
}
