//! スタジオ状態（画像一覧・選択・背景スタイル・出品文）
//!
//! 状態の変更はすべてこのモジュールの遷移関数を通す:
//! add_image / remove_image / toggle_select / set_style / start_run / settle_run
//!
//! 生成実行の結果は settle_run で一括反映する。画像ごとの途中結果を
//! 順次反映することはない。

use crate::error::SelectionError;
use crate::types::{BackgroundStyle, ImageItem, Listing, MAX_IMAGES};
use uuid::Uuid;

/// 1回の生成実行の入力（start_run 時点のスナップショット）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    /// 選択された画像（画像一覧の順）
    pub items: Vec<ImageItem>,
    pub style: BackgroundStyle,
}

impl RunPlan {
    pub fn new(items: Vec<ImageItem>, style: BackgroundStyle) -> Self {
        Self { items, style }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.id.as_str()).collect()
    }
}

/// 画像1枚分の背景編集結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub id: String,
    /// 成功時の加工済み画像（Data URL）
    pub processed: Option<String>,
    /// 失敗時のメッセージ
    pub failure: Option<String>,
}

impl EditOutcome {
    pub fn succeeded(id: impl Into<String>, data_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            processed: Some(data_url.into()),
            failure: None,
        }
    }

    pub fn failed(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            processed: None,
            failure: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.processed.is_some()
    }
}

/// 生成実行の全結果（出品文1件 + 画像N件）
#[derive(Debug)]
pub struct RunOutcome<E> {
    pub listing: Result<Listing, E>,
    pub edits: Vec<EditOutcome>,
}

/// スタジオ状態
#[derive(Debug, Default)]
pub struct Studio {
    images: Vec<ImageItem>,
    selected: Vec<String>,
    style: BackgroundStyle,
    listing: Option<Listing>,
    in_flight: bool,
}

impl Studio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(style: BackgroundStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    // =============================================
    // 参照
    // =============================================

    pub fn images(&self) -> &[ImageItem] {
        &self.images
    }

    pub fn image(&self, id: &str) -> Option<&ImageItem> {
        self.images.iter().find(|i| i.id == id)
    }

    pub fn selected_ids(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    pub fn style(&self) -> BackgroundStyle {
        self.style
    }

    pub fn listing(&self) -> Option<&Listing> {
        self.listing.as_ref()
    }

    pub fn is_processing(&self) -> bool {
        self.in_flight
    }

    /// 追加可能な残り枚数
    pub fn remaining_slots(&self) -> usize {
        MAX_IMAGES.saturating_sub(self.images.len())
    }

    // =============================================
    // 遷移
    // =============================================

    /// 画像を追加（追加した画像は自動で選択状態になる）
    ///
    /// 既に上限枚数ある場合は何も作らずに `Full` を返す。
    pub fn add_image(&mut self, original_data: impl Into<String>) -> Result<&ImageItem, SelectionError> {
        if self.images.len() >= MAX_IMAGES {
            return Err(SelectionError::Full { max: MAX_IMAGES });
        }

        let id = self.next_id();
        self.selected.push(id.clone());
        self.images.push(ImageItem::new(id, original_data));

        let index = self.images.len() - 1;
        Ok(&self.images[index])
    }

    /// 複数画像を追加（上限を超える場合は1枚も追加しない）
    pub fn add_images(&mut self, originals: Vec<String>) -> Result<Vec<String>, SelectionError> {
        if self.images.len() + originals.len() > MAX_IMAGES {
            return Err(SelectionError::Full { max: MAX_IMAGES });
        }

        let mut ids = Vec::with_capacity(originals.len());
        for original in originals {
            ids.push(self.add_image(original)?.id.clone());
        }
        Ok(ids)
    }

    /// 画像を削除（選択からも外す）
    pub fn remove_image(&mut self, id: &str) -> Result<ImageItem, SelectionError> {
        let index = self
            .images
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| SelectionError::UnknownImage(id.to_string()))?;

        self.selected.retain(|s| s != id);
        Ok(self.images.remove(index))
    }

    /// 選択状態を反転。反転後に選択されていれば true
    pub fn toggle_select(&mut self, id: &str) -> Result<bool, SelectionError> {
        if self.image(id).is_none() {
            return Err(SelectionError::UnknownImage(id.to_string()));
        }

        if self.is_selected(id) {
            self.selected.retain(|s| s != id);
            Ok(false)
        } else {
            self.selected.push(id.to_string());
            Ok(true)
        }
    }

    pub fn set_style(&mut self, style: BackgroundStyle) {
        self.style = style;
    }

    /// 生成実行を開始
    ///
    /// 選択なし → `Empty`、実行中 → `RunInFlight`。
    /// 前回の出品文はここで破棄する。
    pub fn start_run(&mut self) -> Result<RunPlan, SelectionError> {
        if self.in_flight {
            return Err(SelectionError::RunInFlight);
        }
        if self.selected.is_empty() {
            return Err(SelectionError::Empty);
        }

        let items: Vec<ImageItem> = self
            .images
            .iter()
            .filter(|i| self.is_selected(&i.id))
            .cloned()
            .collect();

        self.listing = None;
        self.in_flight = true;
        Ok(RunPlan::new(items, self.style))
    }

    /// 生成実行の結果を一括反映
    ///
    /// - 成功した画像だけ加工済みデータを上書き（失敗した画像は前回の結果を保持）
    /// - 実行中に削除された画像の結果は捨てる
    /// - 出品文は成功時のみ設定、失敗時はエラーをそのまま返す
    pub fn settle_run<E>(&mut self, outcome: RunOutcome<E>) -> Result<&Listing, E> {
        for edit in outcome.edits {
            let Some(processed) = edit.processed else {
                continue;
            };
            if let Some(image) = self.images.iter_mut().find(|i| i.id == edit.id) {
                image.processed_data = Some(processed);
            }
        }

        self.in_flight = false;

        match outcome.listing {
            Ok(listing) => Ok(self.listing.insert(listing)),
            Err(e) => {
                self.listing = None;
                Err(e)
            }
        }
    }

    fn next_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().simple().to_string();
            if self.image(&id).is_none() {
                return id;
            }
        }
    }
}
