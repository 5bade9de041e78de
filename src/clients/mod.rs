//! LLM 客户端
//!
//! 每个后端在构造时固定自己的消息字段名（[`RoleField`]），
//! 评审层只依赖 [`LlmClient`] trait，不关心具体后端。

pub mod openai_client;
pub mod yandex_client;

pub use openai_client::OpenAiClient;
pub use yandex_client::YandexGptClient;

use crate::config::Config;
use crate::error::ReviewResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

/// 后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// OpenAI 兼容接口
    OpenAi,
    /// YandexGPT
    Yandex,
}

impl std::str::FromStr for LlmBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "open_ai" | "gpt" => Ok(LlmBackend::OpenAi),
            "yandex" | "yandexgpt" | "yagpt" => Ok(LlmBackend::Yandex),
            _ => Err(format!("未知的 LLM 后端 '{s}'，可选: openai, yandex")),
        }
    }
}

/// 消息正文所在的 JSON 字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleField {
    /// `{"role": .., "text": ..}`（YandexGPT）
    Text,
    /// `{"role": .., "content": ..}`（OpenAI）
    Content,
}

impl RoleField {
    pub fn as_str(self) -> &'static str {
        match self {
            RoleField::Text => "text",
            RoleField::Content => "content",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// 对话历史中的一条消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }

    /// 按后端的字段名序列化
    pub fn to_json(&self, field: RoleField) -> JsonValue {
        let mut message = json!({ "role": self.role });
        message[field.as_str()] = JsonValue::String(self.text.clone());
        message
    }
}

/// 生成参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 500,
            temperature: 0.5,
        }
    }
}

impl From<&Config> for GenerationOptions {
    fn from(config: &Config) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// LLM 客户端能力
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 后端名称（用于日志和错误信息）
    fn name(&self) -> &str;

    /// 消息正文字段名
    fn role_field(&self) -> RoleField;

    /// 发送一次对话请求
    ///
    /// 消息顺序：系统提示词 → `context` → 用户消息
    async fn call(
        &self,
        prompt: &str,
        user_message: &str,
        context: &[ChatMessage],
    ) -> ReviewResult<String>;
}

/// 按配置创建客户端
pub fn build_client(backend: LlmBackend, config: &Config) -> ReviewResult<Arc<dyn LlmClient>> {
    let options = GenerationOptions::from(config);
    let client: Arc<dyn LlmClient> = match backend {
        LlmBackend::OpenAi => Arc::new(OpenAiClient::new(
            &config.openai_api_key,
            &config.openai_api_base_url,
            &config.openai_model,
            options,
        )),
        LlmBackend::Yandex => Arc::new(YandexGptClient::from_config(config, options)?),
    };
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_uses_backend_field() {
        let message = ChatMessage::user("решение");
        assert_eq!(
            message.to_json(RoleField::Text),
            json!({"role": "user", "text": "решение"})
        );
        assert_eq!(
            ChatMessage::assistant("ok").to_json(RoleField::Content),
            json!({"role": "assistant", "content": "ok"})
        );
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("OpenAI".parse::<LlmBackend>().unwrap(), LlmBackend::OpenAi);
        assert_eq!("yagpt".parse::<LlmBackend>().unwrap(), LlmBackend::Yandex);
        assert!("claude".parse::<LlmBackend>().is_err());
    }
}
