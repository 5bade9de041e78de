//! YandexGPT 客户端
//!
//! 直接调用 Foundation Models 的 completion 接口，消息正文字段为 `text`。
//! 使用服务账号时先签发 PS256 JWT，再换取 IAM 令牌（每个客户端只换取一次）。

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::clients::{ChatMessage, GenerationOptions, LlmClient, RoleField};
use crate::config::Config;
use crate::error::{ReviewError, ReviewResult};

const BACKEND_NAME: &str = "yandexgpt";
const IAM_BACKEND_NAME: &str = "yandex-iam";

/// completion 接口地址
pub const COMPLETION_URL: &str = "https://llm.api.cloud.yandex.net/foundationModels/v1/completion";

/// IAM 令牌接口地址，同时也是 JWT 的 `aud`
pub const IAM_TOKEN_URL: &str = "https://iam.api.cloud.yandex.net/iam/v1/tokens";

/// JWT 有效期（秒）
const JWT_LIFETIME_SECS: i64 = 360;

/// 认证方式
#[derive(Debug, Clone)]
pub enum YandexAuth {
    /// IAM 令牌（`Bearer`）
    IamToken(String),
    /// 服务账号 API key（`Api-Key`）
    ApiKey(String),
    /// 服务账号授权密钥，用 JWT 换取 IAM 令牌
    ServiceAccount {
        service_account_id: String,
        key_id: String,
        /// PEM 格式的 RSA 私钥
        private_key: String,
    },
}

/// 换取 IAM 令牌用的 JWT 载荷
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct IamJwtClaims {
    aud: String,
    iss: String,
    iat: i64,
    exp: i64,
}

fn jwt_header(key_id: &str) -> Header {
    let mut header = Header::new(Algorithm::PS256);
    header.kid = Some(key_id.to_string());
    header
}

fn jwt_claims(service_account_id: &str, now: i64) -> IamJwtClaims {
    IamJwtClaims {
        aud: IAM_TOKEN_URL.to_string(),
        iss: service_account_id.to_string(),
        iat: now,
        exp: now + JWT_LIFETIME_SECS,
    }
}

/// 用服务账号私钥签发 JWT
fn sign_jwt(
    service_account_id: &str,
    key_id: &str,
    private_key: &str,
    now: i64,
) -> ReviewResult<String> {
    let key = EncodingKey::from_rsa_pem(private_key.as_bytes())
        .map_err(|e| ReviewError::api_call_failed(IAM_BACKEND_NAME, e))?;

    jsonwebtoken::encode(
        &jwt_header(key_id),
        &jwt_claims(service_account_id, now),
        &key,
    )
    .map_err(|e| ReviewError::api_call_failed(IAM_BACKEND_NAME, e))
}

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    #[serde(rename = "iamToken")]
    iam_token: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    result: CompletionResult,
}

#[derive(Debug, Deserialize)]
struct CompletionResult {
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    message: AlternativeMessage,
}

#[derive(Debug, Deserialize)]
struct AlternativeMessage {
    #[serde(default)]
    text: String,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// YandexGPT 客户端
pub struct YandexGptClient {
    http: reqwest::Client,
    auth: YandexAuth,
    /// 服务账号换取到的 IAM 令牌
    iam_token: OnceCell<String>,
    model_uri: String,
    options: GenerationOptions,
}

impl YandexGptClient {
    pub fn new(auth: YandexAuth, model_uri: impl Into<String>, options: GenerationOptions) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth,
            iam_token: OnceCell::new(),
            model_uri: model_uri.into(),
            options,
        }
    }

    /// 从配置创建
    ///
    /// 优先级：服务账号 → IAM 令牌 → API key
    pub fn from_config(config: &Config, options: GenerationOptions) -> ReviewResult<Self> {
        let service_account = (
            non_empty(&config.yandex_service_account_id),
            non_empty(&config.yandex_key_id),
            non_empty(&config.yandex_private_key),
        );

        let auth = if let (Some(account), Some(key_id), Some(private_key)) = service_account {
            YandexAuth::ServiceAccount {
                service_account_id: account.to_string(),
                key_id: key_id.to_string(),
                private_key: private_key.to_string(),
            }
        } else if let Some(token) = non_empty(&config.yandex_iam_token) {
            YandexAuth::IamToken(token.to_string())
        } else if let Some(key) = non_empty(&config.yandex_api_key) {
            YandexAuth::ApiKey(key.to_string())
        } else {
            return Err(ReviewError::MissingCredentials(
                "yandex_service_account_id/yandex_key_id/yandex_private_key、yandex_iam_token 或 yandex_api_key"
                    .to_string(),
            ));
        };

        if config.yandex_model_uri.is_empty() {
            return Err(ReviewError::MissingCredentials("yandex_model_uri".to_string()));
        }

        Ok(Self::new(auth, &config.yandex_model_uri, options))
    }

    /// 用 JWT 换取 IAM 令牌
    async fn exchange_iam_token(&self, jwt: String) -> ReviewResult<String> {
        let response = self
            .http
            .post(IAM_TOKEN_URL)
            .json(&json!({ "jwt": jwt }))
            .send()
            .await
            .map_err(|e| {
                warn!("IAM 令牌请求失败: {}", e);
                ReviewError::api_call_failed(IAM_BACKEND_NAME, e)
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ReviewError::api_call_failed(IAM_BACKEND_NAME, e))?;

        if !status.is_success() {
            return Err(ReviewError::BadResponse {
                backend: IAM_BACKEND_NAME.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: IamTokenResponse = serde_json::from_str(&text)
            .map_err(|e| ReviewError::api_call_failed(IAM_BACKEND_NAME, e))?;

        info!("🔑 已通过服务账号获取 IAM 令牌");
        Ok(parsed.iam_token)
    }

    /// Authorization 请求头
    async fn authorization(&self) -> ReviewResult<String> {
        match &self.auth {
            YandexAuth::IamToken(token) => Ok(format!("Bearer {token}")),
            YandexAuth::ApiKey(key) => Ok(format!("Api-Key {key}")),
            YandexAuth::ServiceAccount {
                service_account_id,
                key_id,
                private_key,
            } => {
                let token = self
                    .iam_token
                    .get_or_try_init(|| async move {
                        let now = chrono::Utc::now().timestamp();
                        let jwt = sign_jwt(service_account_id, key_id, private_key, now)?;
                        self.exchange_iam_token(jwt).await
                    })
                    .await?;
                Ok(format!("Bearer {token}"))
            }
        }
    }

    /// 构建请求体
    fn build_body(&self, prompt: &str, user_message: &str, context: &[ChatMessage]) -> JsonValue {
        let field = self.role_field();
        let mut messages = Vec::with_capacity(context.len() + 2);
        messages.push(ChatMessage::system(prompt).to_json(field));
        messages.extend(context.iter().map(|m| m.to_json(field)));
        messages.push(ChatMessage::user(user_message).to_json(field));

        json!({
            "modelUri": self.model_uri,
            "completionOptions": {
                "maxTokens": self.options.max_tokens,
                "temperature": self.options.temperature,
            },
            "messages": messages,
        })
    }

    fn parse_response(body: &str) -> ReviewResult<String> {
        let response: CompletionResponse = serde_json::from_str(body)
            .map_err(|e| ReviewError::api_call_failed(BACKEND_NAME, e))?;

        let text = response
            .result
            .alternatives
            .into_iter()
            .next()
            .map(|alt| alt.message.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ReviewError::empty_content(BACKEND_NAME))?;

        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl LlmClient for YandexGptClient {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn role_field(&self) -> RoleField {
        RoleField::Text
    }

    async fn call(
        &self,
        prompt: &str,
        user_message: &str,
        context: &[ChatMessage],
    ) -> ReviewResult<String> {
        debug!("调用 YandexGPT，模型: {}", self.model_uri);

        let body = self.build_body(prompt, user_message, context);
        let authorization = self.authorization().await?;

        let response = self
            .http
            .post(COMPLETION_URL)
            .header(AUTHORIZATION, authorization)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("YandexGPT 请求失败: {}", e);
                ReviewError::api_call_failed(BACKEND_NAME, e)
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ReviewError::api_call_failed(BACKEND_NAME, e))?;

        if !status.is_success() {
            warn!("YandexGPT 返回错误状态: {}", status);
            return Err(ReviewError::BadResponse {
                backend: BACKEND_NAME.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        debug!("YandexGPT 调用成功");
        Self::parse_response(&text)
    }
}
