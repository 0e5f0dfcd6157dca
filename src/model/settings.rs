use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Default: see `Settings::default`
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com";
pub const DEFAULT_DEEPSEEK_ENDPOINT: &str = "https://api.deepseek.com";

/// Models offered for the OpenAI provider (first is the fallback)
pub const OPENAI_MODELS: &[&str] = &[
    "gpt-4o",
    "gpt-4",
    "gpt-4o-mini",
    "o1-mini",
    "o1-preview",
    "o1",
    "o3-mini",
    "gpt-3.5",
];

/// Models offered for the DeepSeek provider (first is the fallback)
pub const DEEPSEEK_MODELS: &[&str] = &["deepseek-chat", "deepseek-reasoner"];

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a text editing assistant that improves the structure and wording of \
a mandala outline. Keep the original structure and format; only improve the \
expression and logic of the content.

Format rules:
1. A line starting with # is the center theme
2. A line starting with ## is a main theme (甲, 乙, 丙, ...)
3. A line starting with ### is a sub-theme (A, B, C, ...)
4. Each heading may be followed by content lines

Example:
# Center theme
Content of the center theme

## 甲 Theme 1
Content of theme 1

### A Sub-theme 1
Content of sub-theme 1";

pub const DEFAULT_USER_PROMPT: &str = "\
Improve the following text so it reads more clearly and flows more logically, \
while keeping its structure and format:";

/// Which completion provider the AI assist talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiProvider {
    #[default]
    OpenAi,
    DeepSeek,
}

impl ApiProvider {
    pub fn display_name(self) -> &'static str {
        match self {
            ApiProvider::OpenAi => "OpenAI",
            ApiProvider::DeepSeek => "DeepSeek",
        }
    }

    pub fn models(self) -> &'static [&'static str] {
        match self {
            ApiProvider::OpenAi => OPENAI_MODELS,
            ApiProvider::DeepSeek => DEEPSEEK_MODELS,
        }
    }

    pub fn parse_provider(s: &str) -> Option<ApiProvider> {
        match s.to_lowercase().as_str() {
            "openai" => Some(ApiProvider::OpenAi),
            "deepseek" => Some(ApiProvider::DeepSeek),
            _ => None,
        }
    }
}

impl fmt::Display for ApiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiProvider::OpenAi => write!(f, "openai"),
            ApiProvider::DeepSeek => write!(f, "deepseek"),
        }
    }
}

/// Persisted preferences (settings.toml)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Route imports through the AI assist before parsing
    pub ai_enabled: bool,
    pub active_api: ApiProvider,
    pub api_key: String,
    pub api_endpoint: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub deepseek_api_key: String,
    pub deepseek_api_endpoint: String,
    pub deepseek_system_prompt: String,
    pub deepseek_user_prompt: String,
    /// Take the OpenAI key/endpoint from the environment instead
    pub use_built_in_openai: bool,
    /// Take the DeepSeek key/endpoint from the environment instead
    pub use_built_in_deepseek: bool,
    pub model: String,
    /// User-added model names, offered alongside the built-in lists
    pub custom_models: Vec<String>,
    pub ui: UiConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            ai_enabled: false,
            active_api: ApiProvider::OpenAi,
            api_key: String::new(),
            api_endpoint: DEFAULT_OPENAI_ENDPOINT.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            user_prompt: DEFAULT_USER_PROMPT.to_string(),
            deepseek_api_key: String::new(),
            deepseek_api_endpoint: DEFAULT_DEEPSEEK_ENDPOINT.to_string(),
            deepseek_system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            deepseek_user_prompt: DEFAULT_USER_PROMPT.to_string(),
            use_built_in_openai: false,
            use_built_in_deepseek: false,
            model: OPENAI_MODELS[0].to_string(),
            custom_models: Vec::new(),
            ui: UiConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Hex color overrides keyed by theme slot (e.g. `highlight = "#FB4196"`)
    #[serde(default)]
    pub colors: HashMap<String, String>,
    #[serde(default)]
    pub show_key_hints: bool,
}

/// Error type for settings validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("{} API key must not be empty while AI optimization is enabled", .0.display_name())]
    MissingApiKey(ApiProvider),
    #[error("{} API endpoint must not be empty while AI optimization is enabled", .0.display_name())]
    MissingEndpoint(ApiProvider),
    #[error("unknown setting: {0}")]
    UnknownKey(String),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
    #[error("model name must not be empty")]
    EmptyModelName,
    #[error("{0} is already a built-in model")]
    BuiltInModel(String),
    #[error("{0} is already in the custom model list")]
    DuplicateModel(String),
    #[error("no custom model named {0}")]
    UnknownCustomModel(String),
}

impl Settings {
    /// Key for the active provider (as configured, ignoring built-ins)
    pub fn active_api_key(&self) -> &str {
        match self.active_api {
            ApiProvider::OpenAi => &self.api_key,
            ApiProvider::DeepSeek => &self.deepseek_api_key,
        }
    }

    pub fn active_endpoint(&self) -> &str {
        match self.active_api {
            ApiProvider::OpenAi => &self.api_endpoint,
            ApiProvider::DeepSeek => &self.deepseek_api_endpoint,
        }
    }

    pub fn active_system_prompt(&self) -> &str {
        match self.active_api {
            ApiProvider::OpenAi => &self.system_prompt,
            ApiProvider::DeepSeek => &self.deepseek_system_prompt,
        }
    }

    pub fn active_user_prompt(&self) -> &str {
        match self.active_api {
            ApiProvider::OpenAi => &self.user_prompt,
            ApiProvider::DeepSeek => &self.deepseek_user_prompt,
        }
    }

    fn uses_built_in(&self) -> bool {
        match self.active_api {
            ApiProvider::OpenAi => self.use_built_in_openai,
            ApiProvider::DeepSeek => self.use_built_in_deepseek,
        }
    }

    /// Validate before saving. When AI is enabled the active provider needs a
    /// key and an endpoint (unless it uses the built-in credentials); a model
    /// that the provider doesn't offer is reset to its first model.
    pub fn validate(mut self) -> Result<Settings, SettingsError> {
        if self.ai_enabled && !self.uses_built_in() {
            if self.active_api_key().trim().is_empty() {
                return Err(SettingsError::MissingApiKey(self.active_api));
            }
            if self.active_endpoint().trim().is_empty() {
                return Err(SettingsError::MissingEndpoint(self.active_api));
            }
        }
        let offered = self.active_api.models().contains(&self.model.as_str())
            || self.custom_models.iter().any(|m| m == &self.model);
        if !offered {
            self.model = self.active_api.models()[0].to_string();
        }
        Ok(self)
    }

    /// Add a user model and select it. Names already offered by a provider
    /// or already in the custom list are refused.
    pub fn add_custom_model(&mut self, name: &str) -> Result<(), SettingsError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SettingsError::EmptyModelName);
        }
        if OPENAI_MODELS.contains(&name) || DEEPSEEK_MODELS.contains(&name) {
            return Err(SettingsError::BuiltInModel(name.to_string()));
        }
        if self.custom_models.iter().any(|m| m == name) {
            return Err(SettingsError::DuplicateModel(name.to_string()));
        }
        self.custom_models.push(name.to_string());
        self.model = name.to_string();
        Ok(())
    }

    /// Drop a user model. If it was selected, the provider's first model
    /// takes its place.
    pub fn remove_custom_model(&mut self, name: &str) -> Result<(), SettingsError> {
        let name = name.trim();
        let Some(index) = self.custom_models.iter().position(|m| m == name) else {
            return Err(SettingsError::UnknownCustomModel(name.to_string()));
        };
        self.custom_models.remove(index);
        if self.model == name {
            self.model = self.active_api.models()[0].to_string();
        }
        Ok(())
    }

    /// Set a field by its settings.toml key, from a string value
    pub fn set_by_key(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let invalid = || SettingsError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            "ai_enabled" => self.ai_enabled = parse_bool(value).ok_or_else(invalid)?,
            "active_api" => self.active_api = ApiProvider::parse_provider(value).ok_or_else(invalid)?,
            "api_key" => self.api_key = value.to_string(),
            "api_endpoint" => self.api_endpoint = value.to_string(),
            "system_prompt" => self.system_prompt = value.to_string(),
            "user_prompt" => self.user_prompt = value.to_string(),
            "deepseek_api_key" => self.deepseek_api_key = value.to_string(),
            "deepseek_api_endpoint" => self.deepseek_api_endpoint = value.to_string(),
            "deepseek_system_prompt" => self.deepseek_system_prompt = value.to_string(),
            "deepseek_user_prompt" => self.deepseek_user_prompt = value.to_string(),
            "use_built_in_openai" => {
                self.use_built_in_openai = parse_bool(value).ok_or_else(invalid)?
            }
            "use_built_in_deepseek" => {
                self.use_built_in_deepseek = parse_bool(value).ok_or_else(invalid)?
            }
            "model" => self.model = value.to_string(),
            _ => return Err(SettingsError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
