//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use candle_studio::error::StudioError;
use candle_studio::scanner;
use candle_studio_common::{ExtractionError, NoImageProduced, SelectionError};
use std::error::Error as _;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"));
    assert!(matches!(result, Err(StudioError::FileNotFound(_))));
}

/// 空のフォルダをスキャンした場合
#[test]
fn test_scan_empty_folder() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = scanner::collect_images(&[dir.path().to_path_buf()]);

    // 空フォルダはエラーではなく空のVecを返す
    assert!(result.unwrap().is_empty());
}

/// 5枚目は読み込み前に拒否
#[test]
fn test_collect_too_many_images() {
    let dir = tempdir().expect("Failed to create temp dir");
    let paths: Vec<PathBuf> = (0..5)
        .map(|i| {
            let path = dir.path().join(format!("candle{}.png", i));
            std::fs::write(&path, b"x").unwrap();
            path
        })
        .collect();

    let err = scanner::collect_images(&paths).unwrap_err();
    assert_eq!(err.to_string(), "Maksymalnie 4 zdjęcia.");
}

/// StudioErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        StudioError::Config("zły plik".to_string()),
        StudioError::FileNotFound("swieca.jpg".to_string()),
        StudioError::Api { status: 429, message: "Resource exhausted".to_string() },
        StudioError::Timeout(Duration::from_secs(5)),
        StudioError::Selection(SelectionError::Empty),
        StudioError::NoImageProduced(NoImageProduced { reason: None }),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// MissingApiKeyエラーのメッセージ確認
#[test]
fn test_missing_api_key_message() {
    let display = StudioError::MissingApiKey.to_string();

    assert!(display.contains("GOOGLE_API_KEY"));
    assert!(display.contains("candle-studio config"));
}

/// 選択エラーはメッセージをそのまま表示
#[test]
fn test_selection_error_transparent() {
    let err: StudioError = SelectionError::Empty.into();
    assert_eq!(err.to_string(), "Nie wybrano żadnych zdjęć");
}

/// 出品文の失敗は原因をsourceに持つ
#[test]
fn test_listing_failure_source() {
    let cause: StudioError = ExtractionError::MissingField("tags").into();
    let err = StudioError::listing_failure(cause);

    assert!(matches!(err, StudioError::ListingFailure(_)));
    let source = err.source().expect("source missing");
    assert!(source.to_string().contains("tags"));

    // 二重にラップしない
    let again = StudioError::listing_failure(err);
    match again {
        StudioError::ListingFailure(inner) => {
            assert!(matches!(*inner, StudioError::Extraction(_)));
        }
        other => panic!("unexpected: {:?}", other),
    }
}

/// 画像なしの理由が表示に含まれる
#[test]
fn test_no_image_reason_display() {
    let err: StudioError = NoImageProduced { reason: Some("prompt blocked: SAFETY".into()) }.into();
    assert!(err.to_string().contains("SAFETY"));
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: StudioError = io_err.into();

    assert!(matches!(err, StudioError::Io(_)));
    assert!(err.to_string().contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: StudioError = json_err.into();

    assert!(matches!(err, StudioError::Json(_)));
}

/// 画像データのデコード失敗はcommon::Error経由で変換
#[test]
fn test_common_error_conversion() {
    let common_err = candle_studio_common::data_url::decode_data_url("data:image/png;base64,@@@")
        .unwrap_err();
    let err: StudioError = common_err.into();

    assert!(matches!(
        err,
        StudioError::Common(candle_studio_common::Error::Decode(_))
    ));
    assert!(err.to_string().contains("invalid image data"));
}
