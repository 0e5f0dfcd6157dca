use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{AiError, ChatTarget, Optimizer, resolve_target};
use crate::model::settings::Settings;

const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 2000;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Body of `POST /v1/chat/completions`
#[derive(Debug, Serialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

pub fn build_request(target: &ChatTarget, text: &str) -> ChatRequest {
    ChatRequest {
        model: target.model.clone(),
        messages: vec![
            ChatMessage {
                role: "system".to_string(),
                content: target.system_message().to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: target.user_message(text),
            },
        ],
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
    }
}

/// Pull `choices[0].message.content` out of a success body
pub fn parse_response(body: &str) -> Result<String, AiError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| AiError::InvalidResponse(e.to_string()))?;
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| AiError::InvalidResponse("no choices in response".to_string()))
}

/// Map a failed status (and its body, if any) to an error class
pub fn classify_status(status: StatusCode, body: &str, target: &ChatTarget) -> AiError {
    match status {
        StatusCode::UNAUTHORIZED => AiError::Unauthorized {
            provider: target.provider,
        },
        StatusCode::NOT_FOUND => AiError::NotFound {
            provider: target.provider,
            endpoint: target.endpoint.clone(),
        },
        StatusCode::TOO_MANY_REQUESTS => AiError::RateLimited,
        StatusCode::BAD_GATEWAY => AiError::Unreachable {
            endpoint: target.endpoint.clone(),
        },
        s => AiError::Http {
            status: s.as_u16(),
            message: serde_json::from_str::<ErrorBody>(body)
                .ok()
                .and_then(|b| b.error)
                .map(|d| d.message)
                .unwrap_or_default(),
        },
    }
}

/// Blocking client for OpenAI-compatible chat completion services
#[derive(Debug, Clone, Default)]
pub struct HttpOptimizer;

impl HttpOptimizer {
    pub fn new() -> Self {
        HttpOptimizer
    }

    fn send(&self, target: &ChatTarget, text: &str) -> Result<String, AiError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| AiError::Transport(e.to_string()))?;
        let url = target.url();
        tracing::info!(%url, model = %target.model, "requesting AI rewrite");

        let response = client
            .post(&url)
            .bearer_auth(&target.api_key)
            .json(&build_request(target, text))
            .send()
            .map_err(|e| AiError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| AiError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(classify_status(status, &body, target));
        }
        parse_response(&body)
    }
}

impl Optimizer for HttpOptimizer {
    fn optimize(&self, text: &str, settings: &Settings) -> Result<String, AiError> {
        let target = resolve_target(settings)?;
        let result = self.send(&target, text);
        if let Err(e) = &result {
            tracing::warn!(error = %e, "AI rewrite failed");
        }
        result
    }
}
