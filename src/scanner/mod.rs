use crate::error::{Result, StudioError};
use candle_studio_common::data_url::{encode_base64, to_data_url, ImageFormat};
use candle_studio_common::{SelectionError, MAX_IMAGES};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
    pub format: ImageFormat,
}

impl ImageInfo {
    /// 拡張子なしのファイル名
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.file_name.clone())
    }
}

fn image_info(path: &Path) -> Option<ImageInfo> {
    let format = path
        .extension()
        .and_then(|ext| ImageFormat::from_extension(&ext.to_string_lossy()))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    Some(ImageInfo {
        path: path.to_path_buf(),
        file_name,
        format,
    })
}

/// フォルダ直下の画像を列挙（ファイル名順）
pub fn scan_folder(folder: &Path) -> Result<Vec<ImageInfo>> {
    if !folder.exists() {
        return Err(StudioError::FileNotFound(folder.display().to_string()));
    }

    let mut images: Vec<ImageInfo> = WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter_map(|e| image_info(e.path()))
        .collect();

    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}

/// 引数のファイル・フォルダから入力画像を集める
///
/// 上限枚数を超える場合は、ファイルの中身を読む前にエラーにする。
pub fn collect_images(paths: &[PathBuf]) -> Result<Vec<ImageInfo>> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_dir() {
            images.extend(scan_folder(path)?);
        } else if path.is_file() {
            let info = image_info(path).ok_or_else(|| {
                StudioError::Config(format!(
                    "Nieobsługiwany format pliku: {} (dozwolone: png, jpg, jpeg, webp)",
                    path.display()
                ))
            })?;
            images.push(info);
        } else {
            return Err(StudioError::FileNotFound(path.display().to_string()));
        }
    }

    if images.len() > MAX_IMAGES {
        return Err(SelectionError::Full { max: MAX_IMAGES }.into());
    }

    Ok(images)
}

/// 画像ファイルを読み込んでData URLにする
///
/// 形式はマジックバイトを優先し、判定できなければ拡張子から決める。
pub fn load_data_url(image: &ImageInfo) -> Result<String> {
    let bytes = std::fs::read(&image.path)?;
    let format = ImageFormat::from_magic_bytes(&bytes).unwrap_or(image.format);
    Ok(to_data_url(format.mime_type(), &encode_base64(&bytes)))
}
