//! Optional rewrite of outline text by an OpenAI-compatible chat service.

pub mod http;

pub use http::HttpOptimizer;

use crate::model::settings::{
    ApiProvider, DEFAULT_DEEPSEEK_ENDPOINT, DEFAULT_OPENAI_ENDPOINT, Settings,
};

/// Fallback system prompt when the configured one is empty
pub const FALLBACK_SYSTEM_PROMPT: &str =
    "You are a text editing assistant that helps improve the structure and content of text.";

/// Error classes for the AI assist. Each has its own message; every one of
/// them aborts the import it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AiError {
    #[error("AI optimization is not enabled")]
    Disabled,
    #[error("{} API key is not set", .0.display_name())]
    MissingApiKey(ApiProvider),
    #[error("{} API endpoint is not set", .0.display_name())]
    MissingEndpoint(ApiProvider),
    #[error("API authentication failed; check that the {} API key is correct", .provider.display_name())]
    Unauthorized { provider: ApiProvider },
    #[error("API endpoint not reachable; check the {} endpoint setting ({endpoint})", .provider.display_name())]
    NotFound {
        provider: ApiProvider,
        endpoint: String,
    },
    #[error("too many requests; try again later")]
    RateLimited,
    #[error("could not connect to the API server ({endpoint}); check the network or the endpoint setting")]
    Unreachable { endpoint: String },
    #[error("request failed (HTTP {status}){}", detail_suffix(.message))]
    Http { status: u16, message: String },
    #[error("AI optimization failed: {0}")]
    Transport(String),
    #[error("unexpected response from the API: {0}")]
    InvalidResponse(String),
}

fn detail_suffix(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!(": {message}")
    }
}

/// Rewrites outline text. Implementations block until the service answers.
pub trait Optimizer: Send + Sync {
    fn optimize(&self, text: &str, settings: &Settings) -> Result<String, AiError>;
}

/// Everything needed for one request, after provider and credential lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTarget {
    pub provider: ApiProvider,
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
}

impl ChatTarget {
    /// Full URL of the chat completions route
    pub fn url(&self) -> String {
        format!("{}/v1/chat/completions", self.endpoint.trim_end_matches('/'))
    }

    /// The system message, falling back to the built-in one when empty
    pub fn system_message(&self) -> &str {
        if self.system_prompt.trim().is_empty() {
            FALLBACK_SYSTEM_PROMPT
        } else {
            &self.system_prompt
        }
    }

    /// The user message: the prompt, a blank line, then the text
    pub fn user_message(&self, text: &str) -> String {
        if self.user_prompt.is_empty() {
            text.to_string()
        } else {
            format!("{}\n\n{}", self.user_prompt, text)
        }
    }
}

/// Resolve the active provider's credentials from the process environment
pub fn resolve_target(settings: &Settings) -> Result<ChatTarget, AiError> {
    resolve_target_with(settings, |key| std::env::var(key).ok())
}

/// Resolve the active provider's credentials. Built-in credentials come from
/// `env` (`OPENAI_API_KEY`/`OPENAI_API_ENDPOINT` or the `DEEPSEEK_` pair).
pub fn resolve_target_with(
    settings: &Settings,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ChatTarget, AiError> {
    if !settings.ai_enabled {
        return Err(AiError::Disabled);
    }
    let provider = settings.active_api;
    let built_in = match provider {
        ApiProvider::OpenAi => settings.use_built_in_openai,
        ApiProvider::DeepSeek => settings.use_built_in_deepseek,
    };

    let (api_key, endpoint) = if built_in {
        let (key_var, endpoint_var, default_endpoint) = match provider {
            ApiProvider::OpenAi => ("OPENAI_API_KEY", "OPENAI_API_ENDPOINT", DEFAULT_OPENAI_ENDPOINT),
            ApiProvider::DeepSeek => (
                "DEEPSEEK_API_KEY",
                "DEEPSEEK_API_ENDPOINT",
                DEFAULT_DEEPSEEK_ENDPOINT,
            ),
        };
        (
            env(key_var).unwrap_or_default(),
            env(endpoint_var)
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| default_endpoint.to_string()),
        )
    } else {
        (
            settings.active_api_key().to_string(),
            settings.active_endpoint().to_string(),
        )
    };

    if api_key.trim().is_empty() {
        return Err(AiError::MissingApiKey(provider));
    }
    if endpoint.trim().is_empty() {
        return Err(AiError::MissingEndpoint(provider));
    }

    Ok(ChatTarget {
        provider,
        api_key,
        endpoint,
        model: settings.model.clone(),
        system_prompt: settings.active_system_prompt().to_string(),
        user_prompt: settings.active_user_prompt().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn enabled() -> Settings {
        Settings {
            ai_enabled: true,
            api_key: "sk-user".into(),
            ..Default::default()
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn disabled_is_its_own_error() {
        let settings = Settings::default();
        assert_eq!(resolve_target_with(&settings, no_env), Err(AiError::Disabled));
    }

    #[test]
    fn user_credentials_for_active_provider() {
        let target = resolve_target_with(&enabled(), no_env).unwrap();
        assert_eq!(target.provider, ApiProvider::OpenAi);
        assert_eq!(target.api_key, "sk-user");
        assert_eq!(target.url(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn missing_key_and_endpoint() {
        let mut settings = enabled();
        settings.active_api = ApiProvider::DeepSeek;
        assert_eq!(
            resolve_target_with(&settings, no_env),
            Err(AiError::MissingApiKey(ApiProvider::DeepSeek))
        );
        settings.deepseek_api_key = "sk-ds".into();
        settings.deepseek_api_endpoint = "  ".into();
        assert_eq!(
            resolve_target_with(&settings, no_env),
            Err(AiError::MissingEndpoint(ApiProvider::DeepSeek))
        );
    }

    #[test]
    fn built_in_credentials_come_from_env() {
        let env: HashMap<&str, &str> = [("DEEPSEEK_API_KEY", "sk-env")].into_iter().collect();
        let mut settings = enabled();
        settings.active_api = ApiProvider::DeepSeek;
        settings.use_built_in_deepseek = true;

        let target =
            resolve_target_with(&settings, |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(target.api_key, "sk-env");
        assert_eq!(target.endpoint, DEFAULT_DEEPSEEK_ENDPOINT);
    }

    #[test]
    fn built_in_without_env_key_is_missing_key() {
        let mut settings = enabled();
        settings.use_built_in_openai = true;
        assert_eq!(
            resolve_target_with(&settings, no_env),
            Err(AiError::MissingApiKey(ApiProvider::OpenAi))
        );
    }

    #[test]
    fn messages_fall_back_and_join() {
        let mut target = resolve_target_with(&enabled(), no_env).unwrap();
        target.system_prompt = String::new();
        target.user_prompt = "Polish this:".into();
        assert_eq!(target.system_message(), FALLBACK_SYSTEM_PROMPT);
        assert_eq!(target.user_message("# Goal"), "Polish this:\n\n# Goal");

        target.user_prompt = String::new();
        assert_eq!(target.user_message("# Goal"), "# Goal");
    }

    #[test]
    fn url_tolerates_trailing_slash() {
        let mut target = resolve_target_with(&enabled(), no_env).unwrap();
        target.endpoint = "http://localhost:8080/".into();
        assert_eq!(target.url(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn error_messages_are_distinct() {
        let errors = [
            AiError::Disabled,
            AiError::MissingApiKey(ApiProvider::OpenAi),
            AiError::MissingEndpoint(ApiProvider::OpenAi),
            AiError::Unauthorized {
                provider: ApiProvider::OpenAi,
            },
            AiError::NotFound {
                provider: ApiProvider::OpenAi,
                endpoint: "e".into(),
            },
            AiError::RateLimited,
            AiError::Unreachable {
                endpoint: "e".into(),
            },
            AiError::Http {
                status: 500,
                message: String::new(),
            },
            AiError::Transport("t".into()),
            AiError::InvalidResponse("r".into()),
        ];
        let mut messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        messages.sort();
        messages.dedup();
        assert_eq!(messages.len(), errors.len());
        assert_eq!(
            AiError::Http {
                status: 418,
                message: "teapot".into()
            }
            .to_string(),
            "request failed (HTTP 418): teapot"
        );
    }
}
