use std::time::Duration;
use thiserror::Error;

use candle_studio_common::{ExtractionError, NoImageProduced, SelectionError};

#[derive(Error, Debug)]
pub enum StudioError {
    #[error("Błąd konfiguracji: {0}")]
    Config(String),

    #[error("Brak klucza API. Ustaw GOOGLE_API_KEY albo użyj `candle-studio config --set-api-key KLUCZ`")]
    MissingApiKey,

    #[error("Nie znaleziono pliku: {0}")]
    FileNotFound(String),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("Nie udało się odczytać odpowiedzi AI: {0}")]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    NoImageProduced(#[from] NoImageProduced),

    #[error("Błąd API ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Błąd sieci: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Przekroczono czas oczekiwania ({0:?})")]
    Timeout(Duration),

    #[error("Nie udało się wygenerować opisu: {0}")]
    ListingFailure(#[source] Box<StudioError>),

    #[error("Błąd JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Błąd IO: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] candle_studio_common::Error),
}

impl StudioError {
    /// 出品文生成の失敗としてラップ
    pub fn listing_failure(cause: StudioError) -> Self {
        match cause {
            already @ StudioError::ListingFailure(_) => already,
            other => StudioError::ListingFailure(Box::new(other)),
        }
    }
}

pub type Result<T> = std::result::Result<T, StudioError>;
