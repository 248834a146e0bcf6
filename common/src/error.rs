//! エラー型定義

use thiserror::Error;

/// 画像の追加・選択・実行開始に関するエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Nie wybrano żadnych zdjęć")]
    Empty,

    #[error("Maksymalnie {max} zdjęcia.")]
    Full { max: usize },

    #[error("Nieznane zdjęcie: {0}")]
    UnknownImage(String),

    #[error("Generowanie jest już w toku")]
    RunInFlight,
}

/// 出品文レスポンスからのJSON抽出エラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("empty response from AI")]
    EmptyResponse,

    #[error("no JSON object found in response")]
    NoJsonObject,

    #[error("invalid listing JSON: {0}")]
    InvalidJson(String),

    #[error("listing JSON is missing required field `{0}`")]
    MissingField(&'static str),
}

/// 背景編集レスポンスに画像がなかった
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no image generated{}", .reason.as_ref().map(|r| format!(": {r}")).unwrap_or_default())]
pub struct NoImageProduced {
    pub reason: Option<String>,
}

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    NoImage(#[from] NoImageProduced),

    #[error("invalid image data: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_error_display() {
        assert_eq!(SelectionError::Full { max: 4 }.to_string(), "Maksymalnie 4 zdjęcia.");
        assert!(SelectionError::UnknownImage("x1".into()).to_string().contains("x1"));
    }

    #[test]
    fn test_extraction_error_display() {
        let err = ExtractionError::MissingField("tags");
        assert_eq!(err.to_string(), "listing JSON is missing required field `tags`");
    }

    #[test]
    fn test_no_image_produced_display() {
        let err = NoImageProduced { reason: None };
        assert_eq!(err.to_string(), "no image generated");

        let err = NoImageProduced { reason: Some("refused".into()) };
        assert_eq!(err.to_string(), "no image generated: refused");
    }

    #[test]
    fn test_error_from_extraction() {
        let error: Error = ExtractionError::NoJsonObject.into();
        assert!(matches!(error, Error::Extraction(ExtractionError::NoJsonObject)));
        assert_eq!(error.to_string(), "no JSON object found in response");
    }

    #[test]
    fn test_error_from_decode() {
        use base64::Engine;
        let decode_error = base64::engine::general_purpose::STANDARD.decode("@@@").unwrap_err();
        let error: Error = decode_error.into();
        assert!(matches!(error, Error::Decode(_)));
        assert!(error.to_string().starts_with("invalid image data"));
    }
}
