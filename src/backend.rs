//! Gemini API クライアント
//!
//! 2つの接続先に対応:
//! - Proxy: APIキーを持たず、プロキシ（`candle-studio serve`）へ `{ model, ...request }` をPOST
//! - Direct: APIキーを持って generateContent を直接呼ぶ

use crate::config::Config;
use crate::error::{Result, StudioError};
use async_trait::async_trait;
use candle_studio_common::{GenerateContentRequest, GenerateContentResponse};
use serde_json::Value;
use tracing::debug;

/// エラーメッセージとして残す最大文字数
const ERROR_MESSAGE_MAX_CHARS: usize = 300;

/// 生成AIバックエンド
#[async_trait]
pub trait GenAiBackend: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Proxy { url: String },
    Direct { base_url: String, api_key: String },
}

pub struct GeminiClient {
    client: reqwest::Client,
    endpoint: Endpoint,
}

impl GeminiClient {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    pub fn proxy(url: impl Into<String>) -> Self {
        Self::new(Endpoint::Proxy { url: url.into() })
    }

    pub fn direct(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::new(Endpoint::Direct {
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// 設定から生成（プロキシURLがあればプロキシ、なければAPIキーで直接）
    pub fn from_config(config: &Config) -> Result<Self> {
        match config.get_proxy_url() {
            Some(url) => Ok(Self::proxy(url)),
            None => Ok(Self::direct(
                config.upstream_base_url.clone(),
                config.get_api_key()?,
            )),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn send(&self, model: &str, request: &GenerateContentRequest) -> Result<reqwest::Response> {
        let response = match &self.endpoint {
            Endpoint::Proxy { url } => {
                let body = proxy_payload(model, request)?;
                self.client.post(url).json(&body).send().await?
            }
            Endpoint::Direct { base_url, api_key } => {
                self.client
                    .post(generate_content_url(base_url, model))
                    .header("x-goog-api-key", api_key)
                    .json(request)
                    .send()
                    .await?
            }
        };
        Ok(response)
    }
}

#[async_trait]
impl GenAiBackend for GeminiClient {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        debug!(model, images = request.inline_image_count(), "sending generateContent");

        let response = self.send(model, request).await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(StudioError::Api {
                status: status.as_u16(),
                message: summarize_error_body(&text),
            });
        }

        if text.trim().is_empty() {
            return Err(StudioError::Api {
                status: status.as_u16(),
                message: "Empty response from AI".into(),
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

/// `{base}/models/{model}:generateContent`
pub fn generate_content_url(base_url: &str, model: &str) -> String {
    format!(
        "{}/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    )
}

/// プロキシ向けボディ: リクエストに `model` を足したもの
pub fn proxy_payload(model: &str, request: &GenerateContentRequest) -> Result<Value> {
    let mut body = serde_json::to_value(request)?;
    if let Value::Object(map) = &mut body {
        map.insert("model".into(), Value::String(model.to_string()));
    }
    Ok(body)
}

/// エラーボディを短いメッセージにする
///
/// Googleのエラー形式 `{"error": {"message": ...}}` ならその message、
/// それ以外は先頭 ERROR_MESSAGE_MAX_CHARS 文字。
pub fn summarize_error_body(body: &str) -> String {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());

    if message.chars().count() > ERROR_MESSAGE_MAX_CHARS {
        let truncated: String = message.chars().take(ERROR_MESSAGE_MAX_CHARS).collect();
        format!("{}...", truncated)
    } else {
        message
    }
}
