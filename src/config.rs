use crate::error::{Result, StudioError};
use candle_studio_common::BackgroundStyle;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const PROXY_URL_ENV: &str = "CANDLE_STUDIO_PROXY_URL";
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_LISTING_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    /// 設定されていればGeminiを直接呼ばずプロキシ経由にする
    pub proxy_url: Option<String>,
    pub upstream_base_url: String,
    pub listing_model: String,
    pub image_model: String,
    pub timeout_seconds: u64,
    pub default_style: BackgroundStyle,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            proxy_url: None,
            upstream_base_url: DEFAULT_UPSTREAM_BASE_URL.into(),
            listing_model: DEFAULT_LISTING_MODEL.into(),
            image_model: DEFAULT_IMAGE_MODEL.into(),
            timeout_seconds: 120,
            default_style: BackgroundStyle::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// 指定パスから読み込み（存在しなければデフォルト）
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| StudioError::Config("Nie znaleziono katalogu domowego".into()))?;
        Ok(home.join(".config").join("candle-studio").join("config.json"))
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        if let Some(key) = non_empty_env(API_KEY_ENV) {
            return Ok(key);
        }

        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(StudioError::MissingApiKey)
    }

    pub fn get_proxy_url(&self) -> Option<String> {
        non_empty_env(PROXY_URL_ENV).or_else(|| self.proxy_url.clone())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn set_proxy_url(&mut self, url: String) -> Result<()> {
        self.proxy_url = if url.trim().is_empty() { None } else { Some(url) };
        self.save()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
