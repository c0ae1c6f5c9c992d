use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.siliconflow.cn/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "Qwen/Qwen2.5-7B-Instruct";

/// Models offered for quick selection: `(label, model id, recommended)`.
pub const KNOWN_MODELS: [(&str, &str, bool); 3] = [
    ("Qwen2.5-7B", "Qwen/Qwen2.5-7B-Instruct", true),
    ("Qwen2-7B", "Qwen/Qwen2-7B-Instruct", false),
    (
        "DeepSeek-R1-0528-Qwen3-8B",
        "deepseek-ai/DeepSeek-R1-0528-Qwen3-8B",
        false,
    ),
];

/// Explanation-service settings.
///
/// The API key is never serialized; it is supplied at runtime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    #[serde(skip)]
    api_key: Option<String>,
    api_url: String,
    model: String,
    enable_reasoning: bool,
    system_prompt: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct AppSettingsDraft {
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub model: Option<String>,
    pub enable_reasoning: bool,
    pub system_prompt: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AppSettingsError {
    #[error("invalid API URL")]
    InvalidApiUrl,
}

impl AppSettingsDraft {
    /// Seeds a draft from existing settings so single fields can be edited.
    #[must_use]
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            api_key: settings.api_key.clone(),
            api_url: Some(settings.api_url.clone()),
            model: Some(settings.model.clone()),
            enable_reasoning: settings.enable_reasoning,
            system_prompt: settings.system_prompt.clone(),
        }
    }

    /// Validate and normalize the draft. Blank URL or model fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppSettingsError::InvalidApiUrl` if the URL does not parse.
    pub fn validate(self) -> Result<AppSettings, AppSettingsError> {
        let api_url = normalize_optional(self.api_url).unwrap_or_else(|| DEFAULT_API_URL.into());
        if Url::parse(&api_url).is_err() {
            return Err(AppSettingsError::InvalidApiUrl);
        }

        Ok(AppSettings {
            api_key: normalize_optional(self.api_key),
            api_url,
            model: normalize_optional(self.model).unwrap_or_else(|| DEFAULT_MODEL.into()),
            enable_reasoning: self.enable_reasoning,
            system_prompt: normalize_optional(self.system_prompt),
        })
    }
}

impl AppSettings {
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn enable_reasoning(&self) -> bool {
        self.enable_reasoning
    }

    #[must_use]
    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    /// Returns a copy carrying the given runtime API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = normalize_optional(api_key);
        self
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.into(),
            model: DEFAULT_MODEL.into(),
            enable_reasoning: false,
            system_prompt: None,
        }
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
