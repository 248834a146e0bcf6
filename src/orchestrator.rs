//! 生成実行オーケストレーター
//!
//! 1回の実行で以下を同時に走らせ、すべて終わってから結果をまとめる:
//! - 出品文生成 ×1（選択された全元画像を添付）
//! - 背景編集 ×N（画像ごとに独立）
//!
//! 背景編集の失敗はその画像だけの失敗として記録し、他の処理は止めない。
//! 出品文の失敗は実行全体の失敗として呼び出し元に返す。リトライはしない。

use crate::backend::GenAiBackend;
use crate::config::Config;
use crate::error::{Result, StudioError};
use candle_studio_common::{
    build_edit_prompt, build_listing_prompt, extract_inline_image, mime_type_of,
    parse_listing_response, strip_data_url_prefix, BackgroundStyle, EditOutcome,
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, ImageItem, Listing, Part,
    RunOutcome, RunPlan, SelectionError, Studio,
};
use futures::future::join_all;
use std::time::Duration;
use tracing::{info, warn};

/// 実行時のモデル・タイムアウト設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOptions {
    pub listing_model: String,
    pub image_model: String,
    /// APIリクエスト1件あたりのタイムアウト
    pub request_timeout: Duration,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl GenerationOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            listing_model: config.listing_model.clone(),
            image_model: config.image_model.clone(),
            request_timeout: config.request_timeout(),
        }
    }
}

/// 実行結果のまとめ（CLI表示用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub listing: Listing,
    pub style: BackgroundStyle,
    /// 背景編集に成功した画像ID
    pub processed: Vec<String>,
    /// 背景編集に失敗した画像IDとメッセージ
    pub failed: Vec<(String, String)>,
}

fn image_part(original: &str) -> Part {
    Part::inline_image(mime_type_of(original), strip_data_url_prefix(original))
}

/// 出品文生成リクエスト（全画像 → プロンプトの順）
pub fn build_listing_request(items: &[ImageItem]) -> GenerateContentRequest {
    let mut parts: Vec<Part> = items.iter().map(|i| image_part(&i.original_data)).collect();
    parts.push(Part::text(build_listing_prompt()));

    GenerateContentRequest::from_parts(parts).with_config(GenerationConfig {
        response_mime_type: Some("application/json".into()),
        ..Default::default()
    })
}

/// 背景編集リクエスト（画像 → プロンプトの順、画像出力を要求）
pub fn build_edit_request(item: &ImageItem, style: BackgroundStyle) -> GenerateContentRequest {
    GenerateContentRequest::from_parts(vec![
        image_part(&item.original_data),
        Part::text(build_edit_prompt(style)),
    ])
    .with_config(GenerationConfig {
        response_modalities: Some(vec!["IMAGE".into()]),
        ..Default::default()
    })
}

async fn call_backend<B: GenAiBackend + ?Sized>(
    backend: &B,
    model: &str,
    request: &GenerateContentRequest,
    timeout: Duration,
) -> Result<GenerateContentResponse> {
    tokio::time::timeout(timeout, backend.generate_content(model, request))
        .await
        .map_err(|_| StudioError::Timeout(timeout))?
}

/// 出品文を生成
pub async fn generate_listing<B: GenAiBackend + ?Sized>(
    backend: &B,
    items: &[ImageItem],
    options: &GenerationOptions,
) -> Result<Listing> {
    let request = build_listing_request(items);
    let response = call_backend(backend, &options.listing_model, &request, options.request_timeout).await?;
    Ok(parse_listing_response(&response)?)
}

/// 画像1枚の背景を差し替え、加工済み画像のData URLを返す
pub async fn edit_background<B: GenAiBackend + ?Sized>(
    backend: &B,
    item: &ImageItem,
    style: BackgroundStyle,
    options: &GenerationOptions,
) -> Result<String> {
    let request = build_edit_request(item, style);
    let response = call_backend(backend, &options.image_model, &request, options.request_timeout).await?;
    Ok(extract_inline_image(&response)?)
}

/// 背景編集（失敗はここで握りつぶしてログに残す）
async fn edit_one<B: GenAiBackend + ?Sized>(
    backend: &B,
    item: &ImageItem,
    style: BackgroundStyle,
    options: &GenerationOptions,
) -> EditOutcome {
    match edit_background(backend, item, style, options).await {
        Ok(data_url) => EditOutcome::succeeded(&item.id, data_url),
        Err(e) => {
            warn!(image_id = %item.id, error = %e, "background edit failed");
            EditOutcome::failed(&item.id, e.to_string())
        }
    }
}

/// 出品文1件 + 背景編集N件を同時に実行し、全件の完了を待つ
///
/// 選択が空なら通信せずに `SelectionError::Empty`。
pub async fn generate<B: GenAiBackend + ?Sized>(
    backend: &B,
    plan: &RunPlan,
    options: &GenerationOptions,
) -> Result<RunOutcome<StudioError>> {
    if plan.is_empty() {
        return Err(SelectionError::Empty.into());
    }

    info!(images = plan.len(), style = %plan.style, "generation run started");

    let listing = generate_listing(backend, &plan.items, options);
    let edits = join_all(
        plan.items
            .iter()
            .map(|item| edit_one(backend, item, plan.style, options)),
    );

    let (listing, edits) = tokio::join!(listing, edits);

    Ok(RunOutcome {
        listing: listing.map_err(StudioError::listing_failure),
        edits,
    })
}

/// スタジオの選択内容で実行し、結果を一括反映する
pub async fn run<B: GenAiBackend + ?Sized>(
    backend: &B,
    studio: &mut Studio,
    options: &GenerationOptions,
) -> Result<RunReport> {
    let plan = studio.start_run()?;

    let outcome = generate(backend, &plan, options)
        .await
        .unwrap_or_else(|e| RunOutcome {
            listing: Err(e),
            edits: Vec::new(),
        });

    let processed: Vec<String> = outcome
        .edits
        .iter()
        .filter(|e| e.is_success())
        .map(|e| e.id.clone())
        .collect();
    let failed: Vec<(String, String)> = outcome
        .edits
        .iter()
        .filter_map(|e| e.failure.as_ref().map(|msg| (e.id.clone(), msg.clone())))
        .collect();

    let listing = studio.settle_run(outcome)?.clone();

    info!(
        processed = processed.len(),
        failed = failed.len(),
        "generation run settled"
    );

    Ok(RunReport {
        listing,
        style: plan.style,
        processed,
        failed,
    })
}
