//! データモデル定義
//!
//! CLIとプロキシで共有される型:
//! - BackgroundStyle: 背景スタイル（固定の列挙）
//! - Listing: 出品文（タイトル・説明・ハッシュタグ）
//! - ImageItem: 元画像と背景加工済み画像のペア

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 同時に保持できる画像の最大数
pub const MAX_IMAGES: usize = 4;

/// 背景スタイル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BackgroundStyle {
    #[serde(rename = "Christmas")]
    Christmas,
    #[default]
    #[serde(rename = "Cozy/Warm")]
    Cozy,
    #[serde(rename = "Living Room")]
    LivingRoom,
    #[serde(rename = "Minimalist Studio")]
    Minimalist,
    #[serde(rename = "Luxury Dark")]
    Luxury,
    #[serde(rename = "Nature/Forest")]
    Nature,
}

impl BackgroundStyle {
    /// 表示順の全スタイル
    pub const ALL: [BackgroundStyle; 6] = [
        BackgroundStyle::Christmas,
        BackgroundStyle::Cozy,
        BackgroundStyle::LivingRoom,
        BackgroundStyle::Minimalist,
        BackgroundStyle::Luxury,
        BackgroundStyle::Nature,
    ];

    /// プロンプトと画面表示に使うラベル
    pub fn label(&self) -> &'static str {
        match self {
            BackgroundStyle::Christmas => "Christmas",
            BackgroundStyle::Cozy => "Cozy/Warm",
            BackgroundStyle::LivingRoom => "Living Room",
            BackgroundStyle::Minimalist => "Minimalist Studio",
            BackgroundStyle::Luxury => "Luxury Dark",
            BackgroundStyle::Nature => "Nature/Forest",
        }
    }

    /// CLI引数・ファイル名用のスラッグ
    pub fn slug(&self) -> &'static str {
        match self {
            BackgroundStyle::Christmas => "christmas",
            BackgroundStyle::Cozy => "cozy",
            BackgroundStyle::LivingRoom => "living-room",
            BackgroundStyle::Minimalist => "minimalist",
            BackgroundStyle::Luxury => "luxury",
            BackgroundStyle::Nature => "nature",
        }
    }
}

impl fmt::Display for BackgroundStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BackgroundStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        BackgroundStyle::ALL
            .iter()
            .copied()
            .find(|style| style.slug() == needle || style.label().to_lowercase() == needle)
            .ok_or_else(|| {
                let known = BackgroundStyle::ALL
                    .iter()
                    .map(|s| s.slug())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Unknown style: {}. Use one of: {}", s, known)
            })
    }
}

/// AIが生成した出品文
///
/// 3フィールドすべて必須。欠けている場合はデシリアライズに失敗する
/// （部分的なListingは存在しない）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl Listing {
    /// ハッシュタグを1行に連結
    pub fn hashtag_line(&self) -> String {
        self.tags.join(" ")
    }
}

/// ユーザーが追加した写真1枚
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageItem {
    pub id: String,

    /// 元画像（base64、`data:`プレフィックスの有無は問わない）
    pub original_data: String,

    /// 背景加工済み画像（`data:image/...;base64,` 形式）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_data: Option<String>,
}

impl ImageItem {
    pub fn new(id: impl Into<String>, original_data: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            original_data: original_data.into(),
            processed_data: None,
        }
    }
}
