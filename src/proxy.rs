//! Gemini API プロキシ
//!
//! ブラウザ等のクライアントにAPIキーを渡さないための薄い中継サーバー。
//! リクエストボディ `{ model, contents, config | generationConfig }` を受け取り、
//! サーバー側のキーで generateContent に転送して、上流のステータスとボディをそのまま返す。

use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Map, Value};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::backend::generate_content_url;
use crate::config::{Config, DEFAULT_LISTING_MODEL};

lazy_static! {
    /// URLパスにそのまま埋め込めるモデル名
    static ref MODEL_NAME: Regex = Regex::new(r"^[A-Za-z0-9._-]+$").unwrap();
}

pub const GENAI_PATH: &str = "/api/genai";
/// Netlify Functions 互換パス（既存フロントエンドをそのまま向けられる）
pub const NETLIFY_GENAI_PATH: &str = "/.netlify/functions/genai";

#[derive(Clone)]
pub struct ProxyState {
    api_key: Option<String>,
    upstream_base_url: String,
    client: reqwest::Client,
}

impl ProxyState {
    pub fn new(api_key: Option<String>, upstream_base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            upstream_base_url: upstream_base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// 設定から生成（キー未設定でも起動はする。リクエスト時に500を返す）
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.get_api_key().ok(), config.upstream_base_url.clone())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

pub fn build_router(state: ProxyState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(GENAI_PATH, post(forward_generate_content).fallback(method_not_allowed))
        .route(
            NETLIFY_GENAI_PATH,
            post(forward_generate_content).fallback(method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: ProxyState) -> std::io::Result<()> {
    if !state.has_api_key() {
        warn!("GOOGLE_API_KEY is not configured; generate requests will fail with 500");
    }
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(bind = %addr, "starting candle-studio proxy");
    axum::serve(listener, build_router(state)).await
}

async fn health(State(state): State<ProxyState>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "service": "candle-studio-proxy",
        "version": env!("CARGO_PKG_VERSION"),
        "apiKeyConfigured": state.has_api_key(),
    }))
}

async fn method_not_allowed() -> Response {
    (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response()
}

async fn forward_generate_content(State(state): State<ProxyState>, body: Bytes) -> Response {
    let Some(api_key) = state.api_key.as_deref() else {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Missing GOOGLE_API_KEY").into_response();
    };

    let mut payload = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(map)) => map,
        _ => return (StatusCode::BAD_REQUEST, "Invalid JSON body").into_response(),
    };

    let model = prepare_upstream_body(&mut payload);
    if !is_valid_model_name(&model) {
        return (StatusCode::BAD_REQUEST, "Invalid model name").into_response();
    }
    let url = generate_content_url(&state.upstream_base_url, &model);

    let upstream = state
        .client
        .post(url)
        .header("x-goog-api-key", api_key)
        .json(&payload)
        .send()
        .await;

    let response = match upstream {
        Ok(response) => response,
        Err(e) => return upstream_failure(&model, e),
    };

    let status = response.status();
    match response.bytes().await {
        Ok(bytes) => {
            info!(model = %model, status = status.as_u16(), "forwarded generateContent");
            (status, [(header::CONTENT_TYPE, "application/json")], bytes).into_response()
        }
        Err(e) => upstream_failure(&model, e),
    }
}

fn upstream_failure(model: &str, error: reqwest::Error) -> Response {
    warn!(model, error = %error, "upstream request failed");
    (StatusCode::BAD_GATEWAY, format!("Upstream request failed: {}", error)).into_response()
}

/// モデル名として受け付けるか（`:` や `/` `?` を含むものは不可）
pub fn is_valid_model_name(model: &str) -> bool {
    MODEL_NAME.is_match(model)
}

/// 画像出力モデルかどうか
pub fn is_image_model(model: &str) -> bool {
    model.contains("-image")
}

/// クライアントのボディを上流向けに整え、モデル名を返す
///
/// - `model` を取り除く（未指定なら gemini-2.5-flash）
/// - `config` を `generationConfig` に寄せる（既存のキーは上書きしない）
/// - `contents` がオブジェクト1つなら配列に包む
/// - 画像モデルなら `responseModalities: ["IMAGE"]` を付ける
pub fn prepare_upstream_body(body: &mut Map<String, Value>) -> String {
    let model = body
        .remove("model")
        .and_then(|m| m.as_str().map(str::to_string))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LISTING_MODEL.to_string());

    if let Some(Value::Object(config)) = body.remove("config") {
        let target = generation_config_mut(body);
        for (key, value) in config {
            target.entry(key).or_insert(value);
        }
    }

    if let Some(contents) = body.get_mut("contents") {
        if contents.is_object() {
            let single = contents.take();
            *contents = Value::Array(vec![single]);
        }
    }

    if is_image_model(&model) {
        generation_config_mut(body).insert("responseModalities".into(), json!(["IMAGE"]));
    }

    model
}

fn generation_config_mut(body: &mut Map<String, Value>) -> &mut Map<String, Value> {
    let entry = body
        .entry("generationConfig")
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    match entry {
        Value::Object(map) => map,
        _ => unreachable!("generationConfig was just set to an object"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_prepare_removes_model() {
        let mut body = object(json!({"model": "gemini-2.5-flash", "contents": []}));
        assert_eq!(prepare_upstream_body(&mut body), "gemini-2.5-flash");
        assert!(body.get("model").is_none());
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_prepare_default_model() {
        let mut body = object(json!({"contents": []}));
        assert_eq!(prepare_upstream_body(&mut body), DEFAULT_LISTING_MODEL);
    }

    #[test]
    fn test_prepare_image_model_requests_image() {
        let mut body = object(json!({
            "model": "gemini-2.5-flash-image",
            "contents": {"parts": [{"text": "x"}]},
            "config": {"temperature": 0.4}
        }));
        prepare_upstream_body(&mut body);

        assert!(body.get("config").is_none());
        assert_eq!(body["generationConfig"]["responseModalities"], json!(["IMAGE"]));
        assert_eq!(body["generationConfig"]["temperature"], json!(0.4));
        // contents はオブジェクトから配列へ
        assert_eq!(body["contents"][0]["parts"][0]["text"], "x");
    }

    #[test]
    fn test_prepare_keeps_existing_generation_config() {
        let mut body = object(json!({
            "model": "gemini-2.5-flash",
            "generationConfig": {"responseMimeType": "application/json"},
            "config": {"responseMimeType": "text/plain", "temperature": 1.0}
        }));
        prepare_upstream_body(&mut body);
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["temperature"], json!(1.0));
    }

    #[test]
    fn test_model_name_validation() {
        assert!(is_valid_model_name("gemini-2.5-flash"));
        assert!(is_valid_model_name("gemini-2.5-flash-image_preview"));
        assert!(!is_valid_model_name("gemini-2.5-flash:countTokens?x="));
        assert!(!is_valid_model_name("../files"));
        assert!(!is_valid_model_name(""));
    }

    #[test]
    fn test_is_image_model() {
        assert!(is_image_model("gemini-2.5-flash-image"));
        assert!(is_image_model("gemini-2.5-flash-image-preview"));
        assert!(!is_image_model("gemini-2.5-flash"));
    }
}
