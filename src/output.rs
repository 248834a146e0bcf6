//! 生成結果のファイル出力
//!
//! 出力フォルダ構成:
//! - listing.json  出品文（title / description / tags）
//! - listing.txt   そのまま貼り付けられるテキスト
//! - {番号}-{元ファイル名}-{スタイル}.{拡張子}  背景加工済み画像

use crate::error::Result;
use candle_studio_common::data_url::decode_data_url;
use candle_studio_common::{BackgroundStyle, Listing};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const LISTING_JSON: &str = "listing.json";
pub const LISTING_TEXT: &str = "listing.txt";

/// 出力対象の加工済み画像
#[derive(Debug, Clone)]
pub struct ProcessedImage<'a> {
    /// 入力画像の並び順（0始まり、失敗した画像も数える）
    pub index: usize,
    /// 元ファイル名（拡張子なし）
    pub stem: &'a str,
    pub data_url: &'a str,
}

/// 書き出したファイル
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrittenFiles {
    pub listing_json: PathBuf,
    pub listing_text: PathBuf,
    pub images: Vec<PathBuf>,
}

/// 貼り付け用テキスト（タイトル / 説明 / ハッシュタグ を空行区切り）
pub fn format_listing_text(listing: &Listing) -> String {
    format!(
        "{}\n\n{}\n\n{}\n",
        listing.title.trim(),
        listing.description.trim(),
        listing.hashtag_line()
    )
}

/// 加工済み画像のファイル名
pub fn image_file_name(index: usize, stem: &str, style: BackgroundStyle, extension: &str) -> String {
    format!("{}-{}-{}.{}", index + 1, stem, style.slug(), extension)
}

/// 出品文と加工済み画像を書き出す
pub fn write_run(
    dir: &Path,
    listing: &Listing,
    style: BackgroundStyle,
    images: &[ProcessedImage<'_>],
) -> Result<WrittenFiles> {
    std::fs::create_dir_all(dir)?;

    let listing_json = dir.join(LISTING_JSON);
    std::fs::write(&listing_json, serde_json::to_string_pretty(listing)?)?;

    let listing_text = dir.join(LISTING_TEXT);
    std::fs::write(&listing_text, format_listing_text(listing))?;

    let mut written = Vec::with_capacity(images.len());
    for image in images {
        let (format, bytes) = decode_data_url(image.data_url).inspect_err(|e| {
            warn!(image = image.stem, error = %e, "processed image could not be decoded");
        })?;

        let path = dir.join(image_file_name(image.index, image.stem, style, format.extension()));
        std::fs::write(&path, bytes)?;
        debug!(path = %path.display(), "processed image written");
        written.push(path);
    }

    Ok(WrittenFiles {
        listing_json,
        listing_text,
        images: written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StudioError;

    fn listing() -> Listing {
        Listing {
            title: "Świeca sojowa Wanilia".into(),
            description: "Ręcznie robiona świeca.\nCzas palenia 40h.".into(),
            tags: vec!["#świeca".into(), "#handmade".into()],
        }
    }

    #[test]
    fn test_format_listing_text() {
        assert_eq!(
            format_listing_text(&listing()),
            "Świeca sojowa Wanilia\n\nRęcznie robiona świeca.\nCzas palenia 40h.\n\n#świeca #handmade\n"
        );
    }

    #[test]
    fn test_image_file_name() {
        assert_eq!(
            image_file_name(0, "candle", BackgroundStyle::LivingRoom, "png"),
            "1-candle-living-room.png"
        );
    }

    #[test]
    fn test_write_run() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let images = [
            ProcessedImage { index: 0, stem: "a", data_url: "data:image/png;base64,iVBORw0KGgo=" },
            ProcessedImage { index: 1, stem: "b", data_url: "data:image/jpeg;base64,/9j/4A==" },
        ];

        let written = write_run(&out, &listing(), BackgroundStyle::Christmas, &images).unwrap();

        let json = std::fs::read_to_string(&written.listing_json).unwrap();
        let parsed: Listing = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, listing());

        assert_eq!(
            written.images,
            vec![out.join("1-a-christmas.png"), out.join("2-b-christmas.jpg")]
        );
        let bytes = std::fs::read(&written.images[1]).unwrap();
        assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[test]
    fn test_write_run_keeps_input_position() {
        let dir = tempfile::tempdir().unwrap();
        // 1枚目（a）の背景編集が失敗し、b と c だけが残った
        let images = [
            ProcessedImage { index: 1, stem: "b", data_url: "data:image/png;base64,iVBORw0KGgo=" },
            ProcessedImage { index: 2, stem: "c", data_url: "data:image/png;base64,iVBORw0KGgo=" },
        ];

        let written = write_run(dir.path(), &listing(), BackgroundStyle::Cozy, &images).unwrap();
        assert_eq!(
            written.images,
            vec![dir.path().join("2-b-cozy.png"), dir.path().join("3-c-cozy.png")]
        );
    }

    #[test]
    fn test_write_run_invalid_image() {
        let dir = tempfile::tempdir().unwrap();
        let images = [ProcessedImage { index: 0, stem: "broken", data_url: "data:image/png;base64,@@@" }];

        let result = write_run(dir.path(), &listing(), BackgroundStyle::Cozy, &images);
        assert!(matches!(
            result,
            Err(StudioError::Common(candle_studio_common::Error::Decode(_)))
        ));
        // 出品文は先に書かれている
        assert!(dir.path().join(LISTING_TEXT).exists());
    }
}
