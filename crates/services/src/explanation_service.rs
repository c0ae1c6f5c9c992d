use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tiku_core::model::AppSettings;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::error::ExplanationError;

pub const EXPLAIN_TIMEOUT: Duration = Duration::from_secs(20);
pub const CONNECTION_TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Reference placeholder when the bank has no answer for a stem.
pub const NO_REFERENCE_ANSWER: &str = "本地库无对应答案";

const CONNECTION_TEST_PROMPT: &str = "你好";
const CONNECTION_TEST_MAX_TOKENS: u32 = 10;
const EXPLAIN_TEMPERATURE: f32 = 0.3;

/// Chat-completion client that explains a question against its reference answer.
///
/// Requests never touch session state; `spawn_explain` hands back a task the
/// caller may await, abort or drop.
#[derive(Clone)]
pub struct ExplanationService {
    client: Client,
    settings: AppSettings,
}

impl ExplanationService {
    #[must_use]
    pub fn new(settings: AppSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Explanations need an API key.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.settings.has_api_key()
    }

    /// User prompt for one question.
    #[must_use]
    pub fn build_prompt(stem: &str, reference: &str) -> String {
        let reference = if reference.trim().is_empty() {
            NO_REFERENCE_ANSWER
        } else {
            reference.trim()
        };
        format!(
            "题目：{stem}\n参考答案：{reference}\n\
             请给出详细且好懂的解析，并指出考点。只用纯文本，不要使用 markdown 格式。\
             如果是选择题，请逐个说明每个选项正确或错误的原因。",
            stem = stem.trim(),
        )
    }

    /// Ask the model to explain `stem` given its `reference` answer.
    ///
    /// # Errors
    ///
    /// Returns `ExplanationError::MissingApiKey` without an API key, and
    /// transport, status or empty-body errors from the endpoint.
    #[instrument(skip(self, reference), fields(model = %self.settings.model()))]
    pub async fn explain(&self, stem: &str, reference: &str) -> Result<String, ExplanationError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = self.settings.system_prompt() {
            messages.push(ChatMessage {
                role: "system",
                content: system.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: Self::build_prompt(stem, reference),
        });

        let payload = ChatRequest {
            model: self.settings.model().to_string(),
            messages,
            temperature: Some(EXPLAIN_TEMPERATURE),
            enable_thinking: self.settings.enable_reasoning().then_some(true),
            max_tokens: None,
        };
        self.complete(&payload, EXPLAIN_TIMEOUT).await
    }

    /// Run [`ExplanationService::explain`] on the tokio runtime.
    ///
    /// Must be called from within a runtime.
    #[must_use]
    pub fn spawn_explain(
        &self,
        stem: impl Into<String>,
        reference: impl Into<String>,
    ) -> JoinHandle<Result<String, ExplanationError>> {
        let service = self.clone();
        let stem = stem.into();
        let reference = reference.into();
        tokio::spawn(async move { service.explain(&stem, &reference).await })
    }

    /// Send a tiny greeting to check endpoint, key and model.
    ///
    /// # Errors
    ///
    /// Same as [`ExplanationService::explain`].
    #[instrument(skip(self), fields(url = %self.settings.api_url()))]
    pub async fn test_connection(&self) -> Result<String, ExplanationError> {
        let payload = ChatRequest {
            model: self.settings.model().to_string(),
            messages: vec![ChatMessage {
                role: "user",
                content: CONNECTION_TEST_PROMPT.to_string(),
            }],
            temperature: None,
            enable_thinking: None,
            max_tokens: Some(CONNECTION_TEST_MAX_TOKENS),
        };
        self.complete(&payload, CONNECTION_TEST_TIMEOUT).await
    }

    async fn complete(
        &self,
        payload: &ChatRequest,
        timeout: Duration,
    ) -> Result<String, ExplanationError> {
        let api_key = self
            .settings
            .api_key()
            .ok_or(ExplanationError::MissingApiKey)?;

        let response = self
            .client
            .post(self.settings.api_url())
            .bearer_auth(api_key)
            .timeout(timeout)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "chat completion rejected");
            return Err(ExplanationError::HttpStatus(status));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ExplanationError::EmptyResponse)?;

        debug!(chars = content.chars().count(), "chat completion received");
        Ok(content.trim().to_string())
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    enable_thinking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiku_core::model::AppSettingsDraft;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings_for(server: &MockServer, reasoning: bool, system: Option<&str>) -> AppSettings {
        AppSettingsDraft {
            api_key: Some("test-key".into()),
            api_url: Some(format!("{}/v1/chat/completions", server.uri())),
            model: Some("test-model".into()),
            enable_reasoning: reasoning,
            system_prompt: system.map(str::to_string),
        }
        .validate()
        .unwrap()
    }

    fn reply(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        }))
    }

    #[test]
    fn prompt_falls_back_when_reference_missing() {
        let prompt = ExplanationService::build_prompt(" 什么是货币 ", "  ");
        assert!(prompt.starts_with("题目：什么是货币\n"));
        assert!(prompt.contains(NO_REFERENCE_ANSWER));
    }

    #[tokio::test]
    async fn explain_sends_prompt_and_reasoning_flag() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "test-model",
                "temperature": 0.3,
                "enable_thinking": true,
                "messages": [{"role": "system", "content": "be brief"}, {"role": "user"}]
            })))
            .respond_with(reply("  货币是一般等价物。 "))
            .expect(1)
            .mount(&server)
            .await;

        let service = ExplanationService::new(settings_for(&server, true, Some("be brief")));
        let text = service.explain("什么是货币", "一般等价物").await.unwrap();
        assert_eq!(text, "货币是一般等价物。");
    }

    #[tokio::test]
    async fn spawned_explanation_can_be_awaited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(reply("ok"))
            .mount(&server)
            .await;

        let service = ExplanationService::new(settings_for(&server, false, None));
        let handle = service.spawn_explain("Q", "A");
        assert_eq!(handle.await.unwrap().unwrap(), "ok");
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let service = ExplanationService::new(settings_for(&server, false, None));
        let err = service.explain("Q", "A").await.unwrap_err();
        assert!(matches!(err, ExplanationError::HttpStatus(s) if s.as_u16() == 401));
    }

    #[tokio::test]
    async fn empty_choices_are_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&server)
            .await;

        let service = ExplanationService::new(settings_for(&server, false, None));
        let err = service.test_connection().await.unwrap_err();
        assert!(matches!(err, ExplanationError::EmptyResponse));
    }

    #[tokio::test]
    async fn connection_test_sends_greeting() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "max_tokens": 10,
                "messages": [{"role": "user", "content": "你好"}]
            })))
            .respond_with(reply("你好！"))
            .expect(1)
            .mount(&server)
            .await;

        let service = ExplanationService::new(settings_for(&server, false, None));
        assert_eq!(service.test_connection().await.unwrap(), "你好！");
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let service = ExplanationService::new(AppSettings::default());
        assert!(!service.enabled());
        let err = service.explain("Q", "A").await.unwrap_err();
        assert!(matches!(err, ExplanationError::MissingApiKey));
    }
}
