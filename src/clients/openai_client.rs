//! OpenAI 兼容接口的客户端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::clients::{ChatMessage, ChatRole, GenerationOptions, LlmClient, RoleField};
use crate::error::{ReviewError, ReviewResult};

const BACKEND_NAME: &str = "openai";

/// OpenAI 客户端
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    options: GenerationOptions,
}

impl OpenAiClient {
    pub fn new(
        api_key: &str,
        api_base_url: &str,
        model_name: impl Into<String>,
        options: GenerationOptions,
    ) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: model_name.into(),
            options,
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    fn to_request_message(message: &ChatMessage) -> ReviewResult<ChatCompletionRequestMessage> {
        let built = match message.role {
            ChatRole::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(message.text.as_str())
                .build()
                .map(ChatCompletionRequestMessage::System),
            ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
                .content(message.text.as_str())
                .build()
                .map(ChatCompletionRequestMessage::User),
            ChatRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(message.text.as_str())
                .build()
                .map(ChatCompletionRequestMessage::Assistant),
        };
        built.map_err(|e| ReviewError::api_call_failed(BACKEND_NAME, e))
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn role_field(&self) -> RoleField {
        RoleField::Content
    }

    async fn call(
        &self,
        prompt: &str,
        user_message: &str,
        context: &[ChatMessage],
    ) -> ReviewResult<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!(
            "用户消息长度: {} 字符, 上下文 {} 条",
            user_message.chars().count(),
            context.len()
        );

        let mut messages = Vec::with_capacity(context.len() + 2);
        messages.push(Self::to_request_message(&ChatMessage::system(prompt))?);
        for message in context {
            messages.push(Self::to_request_message(message)?);
        }
        messages.push(Self::to_request_message(&ChatMessage::user(user_message))?);

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.options.temperature)
            .max_tokens(self.options.max_tokens)
            .build()
            .map_err(|e| ReviewError::api_call_failed(BACKEND_NAME, e))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            ReviewError::api_call_failed(BACKEND_NAME, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| ReviewError::empty_content(BACKEND_NAME))?;

        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_client() -> OpenAiClient {
        OpenAiClient::new(
            &std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            "https://api.openai.com/v1",
            "gpt-4o",
            GenerationOptions::default(),
        )
    }

    #[test]
    fn test_role_field_is_content() {
        let client = create_test_client();
        assert_eq!(client.role_field(), RoleField::Content);
        assert_eq!(client.model_name(), "gpt-4o");
    }

    #[test]
    fn test_history_messages_convert() {
        for message in [
            ChatMessage::system("s"),
            ChatMessage::user("u"),
            ChatMessage::assistant("a"),
        ] {
            assert!(OpenAiClient::to_request_message(&message).is_ok());
        }
    }

    /// 需要真实的 OPENAI_API_KEY
    #[tokio::test]
    #[ignore]
    async fn test_call_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let client = create_test_client();
        let result = client
            .call("Отвечай одним словом.", "Столица России?", &[])
            .await;

        match result {
            Ok(response) => {
                println!("LLM 响应: {}", response);
                assert!(!response.is_empty());
            }
            Err(e) => panic!("测试失败: {}", e),
        }
    }
}
