//! Candle Studio Common Library
//!
//! CLIとプロキシで共有される型とユーティリティ

pub mod types;
pub mod data_url;
pub mod error;
pub mod gemini;
pub mod parser;
pub mod prompts;
pub mod studio;

pub use types::{BackgroundStyle, ImageItem, Listing, MAX_IMAGES};
pub use data_url::{ImageFormat, strip_data_url_prefix, mime_type_of, to_data_url};
pub use error::{Error, ExtractionError, NoImageProduced, Result, SelectionError};
pub use gemini::{GenerateContentRequest, GenerateContentResponse, GenerationConfig, InlineData, Part};
pub use parser::{extract_json_object, extract_inline_image, parse_listing, parse_listing_response};
pub use prompts::{build_edit_prompt, build_listing_prompt};
pub use studio::{EditOutcome, RunOutcome, RunPlan, Studio};
