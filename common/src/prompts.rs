//! プロンプト生成モジュール
//!
//! - build_edit_prompt: 背景差し替え用プロンプト
//! - build_listing_prompt: 出品文（ポーランド語）生成用プロンプト

use crate::types::BackgroundStyle;

/// タイトルの最大文字数（モデルへの指示のみ。パーサーでは検証しない）
pub const TITLE_MAX_CHARS: usize = 70;

/// 背景差し替えプロンプト生成
///
/// キャンドル自体はそのまま残し、背景だけを指定スタイルで作り直させる。
pub fn build_edit_prompt(style: BackgroundStyle) -> String {
    format!(
        r#"This is a product photo of a candle.
Create a new version of this image where the candle is placed in a {} setting.
Keep the candle appearance exactly the same, but generate a high-quality, professional background suitable for e-commerce sales.
Ensure the lighting matches the new environment."#,
        style.label()
    )
}

/// 出品文生成プロンプト
///
/// OLX / Vinted向けの出品文をポーランド語で、JSONのみで返させる。
pub fn build_listing_prompt() -> String {
    format!(
        r##"Act as a professional copywriter for OLX and Vinted in Poland.
Analyze these candle photos.
Write a sales listing in Polish (Polski).

Return ONLY valid JSON with:
{{
  "title": "max {TITLE_MAX_CHARS} chars",
  "description": "text",
  "tags": ["#tag1", "#tag2"]
}}"##
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_prompt_contains_style_label() {
        let prompt = build_edit_prompt(BackgroundStyle::Luxury);
        assert!(prompt.contains("in a Luxury Dark setting"));
        assert!(prompt.contains("Keep the candle appearance exactly the same"));
    }

    #[test]
    fn test_edit_prompt_differs_per_style() {
        assert_ne!(
            build_edit_prompt(BackgroundStyle::Christmas),
            build_edit_prompt(BackgroundStyle::Nature)
        );
    }

    #[test]
    fn test_listing_prompt() {
        let prompt = build_listing_prompt();
        assert!(prompt.contains("Polish"));
        assert!(prompt.contains("OLX"));
        assert!(prompt.contains("\"title\": \"max 70 chars\""));
        assert!(prompt.contains("\"tags\""));
    }
}
