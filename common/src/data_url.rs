//! Data URL / base64 画像データのユーティリティ
//!
//! 画面やファイルから受け取る画像は `data:image/png;base64,...` 形式と
//! 素のbase64の両方がありうる。API送信前にプレフィックスを外し、
//! MIMEタイプを判定する。

use crate::error::Result;
use base64::Engine;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DATA_URL_PREFIX: Regex =
        Regex::new(r"(?i)^data:image/(png|jpeg|jpg|webp);base64,").unwrap();
}

/// 対応画像形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::WebP => "webp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// 拡張子から判定（大文字小文字を区別しない）
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// MIMEタイプから判定
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.to_lowercase().as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// マジックバイトから判定
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(ImageFormat::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        // WebP: RIFF....WEBP
        if &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        None
    }
}

/// `data:image/...;base64,` プレフィックスを除去
///
/// プレフィックスがなければそのまま返す。
pub fn strip_data_url_prefix(data: &str) -> &str {
    match DATA_URL_PREFIX.find(data) {
        Some(m) => &data[m.end()..],
        None => data,
    }
}

/// 画像データの形式を判定
///
/// 判定順: Data URLのMIMEタイプ → base64先頭のマジックバイト → PNG
pub fn detect_format(data: &str) -> ImageFormat {
    if let Some(caps) = DATA_URL_PREFIX.captures(data) {
        if let Some(format) = ImageFormat::from_extension(&caps[1]) {
            return format;
        }
    }

    let payload = strip_data_url_prefix(data);
    // 先頭16文字 = 12バイト（マジックバイト判定に十分）
    let head: String = payload.chars().take(16).collect();
    base64::engine::general_purpose::STANDARD
        .decode(head.as_bytes())
        .ok()
        .and_then(|bytes| ImageFormat::from_magic_bytes(&bytes))
        .unwrap_or_default()
}

/// 画像データのMIMEタイプ
pub fn mime_type_of(data: &str) -> &'static str {
    detect_format(data).mime_type()
}

/// base64をData URLに包む
pub fn to_data_url(mime_type: &str, base64_data: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64_data)
}

/// バイト列をbase64エンコード
pub fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Data URL（または素のbase64）をデコード
///
/// # Returns
/// * `Ok((形式, バイト列))`
/// * `Err(Error::Decode)` - base64として不正な場合
pub fn decode_data_url(data: &str) -> Result<(ImageFormat, Vec<u8>)> {
    let mime = data
        .strip_prefix("data:")
        .and_then(|rest| rest.split(';').next())
        .and_then(ImageFormat::from_mime_type);

    let payload = match data.split_once(";base64,") {
        Some((_, payload)) if data.starts_with("data:") => payload,
        _ => data,
    };

    let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
    let format = mime
        .or_else(|| ImageFormat::from_magic_bytes(&bytes))
        .unwrap_or_default();
    Ok((format, bytes))
}
