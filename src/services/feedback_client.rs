//! OpenAI-compatible feedback client
//!
//! Production [`FeedbackGenerator`] implementation: sends the essay and the
//! evaluation criteria to a chat-completions endpoint and parses the strict
//! JSON object the model is instructed to return. The call carries a fixed
//! timeout; callers treat any failure as terminal for that run (no retry).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::services::criteria::EvaluationCriteria;
use crate::services::generator::{FeedbackGenerator, GeneratedFeedback, GenerationError};

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
const USER_AGENT: &str = "redink/0.1.0";
const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 2000;

/// Chat-completions response envelope (only what we read)
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Feedback client for an OpenAI-compatible chat endpoint
pub struct OpenAiFeedbackClient {
    http_client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiFeedbackClient {
    /// Create a new client with a fixed per-request timeout
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, GenerationError> {
        if api_key.trim().is_empty() {
            return Err(GenerationError::MissingApiKey);
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_url: API_URL.to_string(),
            api_key,
            model,
        })
    }

    fn system_prompt(criteria: &EvaluationCriteria) -> String {
        format!(
            "당신은 초등학교 5학년 국어 수업을 돕는 AI 보조교사입니다. \
             다음 성취 기준을 정확히 이해하고 학생 글을 평가하세요.\n\n\
             성취 기준: {}\n\n\
             출력은 반드시 아래 키를 가진 JSON 객체 하나로만 답하세요.\n\
             - \"feedback\": 3단 구성 피드백 (공감과 격려, 성취기준 기반 조언, 심화 질문)\n\
             - \"achievement_explanation\": 성취기준을 인용한 상세한 근거 설명\n\
             - \"revised_text\": 학생 원문을 다듬은 추천 수정본\n\
             - \"scores\": vocabulary, grammar, logic, empathy 각각 1-5 정수",
            criteria.achievement_standard
        )
    }

    fn user_prompt(criteria: &EvaluationCriteria, student_text: &str) -> String {
        format!(
            "지문의 주제와 성취 기준을 참고하여 학생 글을 평가하세요.\n\n\
             지문 설명: {}\n\n학생 글:\n\"\"\"\n{}\n\"\"\"",
            criteria.text_description, student_text
        )
    }
}

/// Parse the model's message content as the expected feedback object
fn parse_generated(content: &str) -> Result<GeneratedFeedback, GenerationError> {
    serde_json::from_str(content.trim()).map_err(|e| {
        GenerationError::ParseError(format!("model output is not the expected JSON object: {}", e))
    })
}

#[async_trait]
impl FeedbackGenerator for OpenAiFeedbackClient {
    async fn generate(
        &self,
        student_text: &str,
        criteria: &EvaluationCriteria,
    ) -> Result<GeneratedFeedback, GenerationError> {
        let payload = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": Self::system_prompt(criteria)},
                {"role": "user", "content": Self::user_prompt(criteria, student_text)},
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        });

        tracing::debug!(model = %self.model, "Requesting draft feedback");

        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| GenerationError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerationError::ApiError(status.as_u16(), error_text));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::ParseError(e.to_string()))?;

        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| {
                GenerationError::ParseError("response contained no choices".to_string())
            })?;

        let generated = parse_generated(content)?;

        tracing::info!(
            model = %self.model,
            feedback_len = generated.feedback.len(),
            "Draft feedback generated"
        );

        Ok(generated)
    }
}
