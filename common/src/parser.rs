//! APIレスポンスパーサー
//!
//! Geminiのレスポンスから結果を取り出す:
//! - 出品文モード: 前後の説明文やコードフェンスを無視してJSONオブジェクトを抽出
//! - 画像モード: パーツ列から最初のインライン画像を取り出してData URL化

use crate::data_url::to_data_url;
use crate::error::{ExtractionError, NoImageProduced};
use crate::gemini::GenerateContentResponse;
use crate::types::Listing;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref CODE_FENCE: Regex = Regex::new(r"(?i)```(json)?").unwrap();
}

/// 出品文JSONの必須フィールド（チェック順）
pub const LISTING_FIELDS: [&str; 3] = ["title", "description", "tags"];

/// レスポンスからJSONオブジェクト部分を抽出
///
/// 1. ```` ``` ```` / ```` ```json ```` を除去してtrim
/// 2. 最初の `{` から最後の `}` まで（両端含む）を切り出す
///
/// # Returns
/// * `Ok(String)` - 抽出されたJSON文字列（未検証）
/// * `Err` - 空レスポンス、または `{` / `}` が見つからない場合
///
/// # Examples
/// ```
/// use candle_studio_common::extract_json_object;
///
/// let response = "Proszę:\n```json\n{\"title\": \"Świeca\"}\n```";
/// assert_eq!(extract_json_object(response).unwrap(), "{\"title\": \"Świeca\"}");
/// ```
pub fn extract_json_object(response: &str) -> Result<String, ExtractionError> {
    if response.trim().is_empty() {
        return Err(ExtractionError::EmptyResponse);
    }

    // フェンス記号は位置を問わず全て除去する（値の中にあっても消える）
    let cleaned = CODE_FENCE.replace_all(response, "");
    let cleaned = cleaned.trim();

    let start = cleaned.find('{').ok_or(ExtractionError::NoJsonObject)?;
    let end = cleaned.rfind('}').ok_or(ExtractionError::NoJsonObject)?;
    if end < start {
        return Err(ExtractionError::NoJsonObject);
    }

    Ok(cleaned[start..=end].to_string())
}

/// 出品文テキストをパース
///
/// 必須フィールドが欠けていれば `MissingField`。値はtrimも長さチェックもせずそのまま返す。
pub fn parse_listing(response: &str) -> Result<Listing, ExtractionError> {
    let json_str = extract_json_object(response)?;

    let value: Value = serde_json::from_str(&json_str)
        .map_err(|e| ExtractionError::InvalidJson(e.to_string()))?;

    let object = value
        .as_object()
        .ok_or_else(|| ExtractionError::InvalidJson("expected a JSON object".into()))?;

    if let Some(missing) = LISTING_FIELDS.iter().find(|f| !object.contains_key(**f)) {
        return Err(ExtractionError::MissingField(*missing));
    }

    serde_json::from_value(value).map_err(|e| ExtractionError::InvalidJson(e.to_string()))
}

/// 先頭候補の全テキストパーツを連結
pub fn response_text(response: &GenerateContentResponse) -> String {
    response
        .first_parts()
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect()
}

/// 出品文レスポンスをパース
pub fn parse_listing_response(response: &GenerateContentResponse) -> Result<Listing, ExtractionError> {
    parse_listing(&response_text(response))
}

/// 背景編集レスポンスから画像を取り出す
///
/// 先頭候補のパーツを順に見て、`inlineData.data` が空でない最初のものを
/// Data URLにして返す。MIMEタイプが画像でなければ `image/png` とみなす。
///
/// # Examples
/// ```
/// use candle_studio_common::{extract_inline_image, GenerateContentResponse};
///
/// let response: GenerateContentResponse = serde_json::from_str(
///     r#"{"candidates":[{"content":{"parts":[{"text":"sure"},{"inlineData":{"data":"abc123"}}]}}]}"#,
/// ).unwrap();
/// assert_eq!(extract_inline_image(&response).unwrap(), "data:image/png;base64,abc123");
/// ```
pub fn extract_inline_image(response: &GenerateContentResponse) -> Result<String, NoImageProduced> {
    let found = response
        .first_parts()
        .iter()
        .filter_map(|p| p.inline_data.as_ref())
        .find(|inline| !inline.data.is_empty());

    if let Some(inline) = found {
        let mime = if inline.mime_type.starts_with("image/") {
            inline.mime_type.as_str()
        } else {
            "image/png"
        };
        return Ok(to_data_url(mime, &inline.data));
    }

    Err(NoImageProduced {
        reason: no_image_reason(response),
    })
}

/// 画像が返らなかった理由（ブロック理由 → 終了理由 → モデルの返答テキスト）
fn no_image_reason(response: &GenerateContentResponse) -> Option<String> {
    if let Some(feedback) = &response.prompt_feedback {
        if let Some(reason) = &feedback.block_reason {
            return Some(
                feedback
                    .block_reason_message
                    .clone()
                    .unwrap_or_else(|| format!("prompt blocked: {}", reason)),
            );
        }
    }

    if let Some(finish) = response
        .candidates
        .first()
        .and_then(|c| c.finish_reason.as_deref())
    {
        if finish != "STOP" {
            return Some(format!("finish reason: {}", finish));
        }
    }

    let text = response_text(response);
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
