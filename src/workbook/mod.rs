//! 圃場調査ブックの読み込み
//!
//! セル値は calamine、埋め込み画像は zip + quick-xml で先頭シートから読む。

mod drawing;
mod sheet;

pub use drawing::EmbeddedImage;

use crate::error::{CropReportError, Result};
use crop_report_common::FieldRecord;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 見出しセル
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub text: String,
    /// 0始まりの列番号
    pub column: u32,
}

#[derive(Debug, Clone)]
pub struct Workbook {
    pub path: PathBuf,
    pub sheet_name: String,
    pub headers: Vec<Header>,
    pub records: Vec<FieldRecord>,
    pub images: Vec<EmbeddedImage>,
}

impl Workbook {
    /// ブックを開く
    ///
    /// 描画レイヤーが読めない場合は画像なしとして続行する。
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CropReportError::FileNotFound(path.display().to_string()));
        }

        let (sheet_name, headers, records) = sheet::read_first_sheet(path)?;

        let images = match drawing::read_embedded_images(path) {
            Ok(images) => images,
            Err(e) => {
                warn!("埋め込み画像を読めませんでした: {}", e);
                Vec::new()
            }
        };

        info!(
            "{}: シート「{}」 {}列 {}件 画像{}枚",
            path.display(),
            sheet_name,
            headers.len(),
            records.len(),
            images.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            sheet_name,
            headers,
            records,
            images,
        })
    }

    /// 見出しの列番号（同名の見出しは左が優先）
    pub fn column_of(&self, header: &str) -> Option<u32> {
        self.headers
            .iter()
            .find(|h| h.text == header)
            .map(|h| h.column)
    }

    /// 指定セルに左上を置いた画像（描画順）
    pub fn images_at(&self, row: u32, col: u32) -> impl Iterator<Item = &EmbeddedImage> {
        self.images
            .iter()
            .filter(move |img| img.row == row && img.col == col)
    }

    /// 圃場名またはスラッグでレコードを絞り込む
    pub fn select_records(&self, field: Option<&str>) -> Result<Vec<&FieldRecord>> {
        let selected: Vec<&FieldRecord> = match field {
            None => self.records.iter().collect(),
            Some(name) => self
                .records
                .iter()
                .filter(|r| r.field_name().as_deref() == Some(name) || r.slug() == name)
                .collect(),
        };

        if selected.is_empty() {
            let target = match field {
                Some(name) => format!("{} (圃場: {})", self.path.display(), name),
                None => self.path.display().to_string(),
            };
            return Err(CropReportError::NoRecords(target));
        }
        Ok(selected)
    }
}
