//! 圃場ごとのスロット画像の抽出
//!
//! 見出し行でスロットの列を決め、圃場の行に左上が置かれた画像を
//! そのスロットの画像として PNG で保存する。

use crate::error::{CropReportError, Result};
use crate::workbook::{Header, Workbook};
use crop_report_common::{FieldRecord, Slot};
use image::ImageFormat;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 見出しから解決したスロットの列
#[derive(Debug, Clone, Default)]
pub struct SlotColumns {
    columns: Vec<(Slot, u32)>,
}

impl SlotColumns {
    /// 見出し行を1回走査してスロットごとの列を決める（同名の見出しは左優先）
    pub fn resolve(headers: &[Header]) -> Self {
        let mut columns = Vec::new();
        for slot in Slot::all() {
            let wanted = slot.header();
            match headers.iter().find(|h| h.text == wanted) {
                Some(h) => columns.push((slot, h.column)),
                None => debug!("スロット列なし: {}", wanted),
            }
        }
        Self { columns }
    }

    pub fn slot_at(&self, col: u32) -> Option<Slot> {
        self.columns
            .iter()
            .find(|(_, c)| *c == col)
            .map(|(slot, _)| *slot)
    }

    pub fn column_of(&self, slot: Slot) -> Option<u32> {
        self.columns
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, c)| *c)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Slot, u32)> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// 1圃場分の抽出結果
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    pub field_dir: PathBuf,
    /// ブックから保存したスロット
    pub saved: Vec<Slot>,
    /// 既定画像をコピーしたスロット
    pub defaulted: Vec<Slot>,
    /// デコード・保存に失敗した画像（スロット, 理由）
    pub failed: Vec<(Slot, String)>,
}

impl ExtractionReport {
    /// ブックにも既定画像にも無いスロット
    pub fn missing(&self) -> Vec<Slot> {
        Slot::all()
            .into_iter()
            .filter(|s| !self.saved.contains(s) && !self.defaulted.contains(s))
            .collect()
    }
}

/// 共有の既定画像を圃場ディレクトリへコピー（既にあるファイルは触らない）
pub fn seed_default_images(defaults_dir: &Path, field_dir: &Path) -> Result<Vec<Slot>> {
    let mut seeded = Vec::new();
    for slot in Slot::all() {
        let file = slot.file_name();
        let source = defaults_dir.join(&file);
        let destination = field_dir.join(&file);
        if source.is_file() && !destination.exists() {
            std::fs::copy(&source, &destination)?;
            debug!("既定画像をコピー: {}", destination.display());
            seeded.push(slot);
        }
    }
    Ok(seeded)
}

/// 圃場1件の画像を `<images_dir>/<slug>/` に保存
///
/// 1枚ごとの失敗は記録して続行する。ディレクトリを作れない場合だけエラー。
pub fn extract_field_images(
    workbook: &Workbook,
    columns: &SlotColumns,
    record: &FieldRecord,
    images_dir: &Path,
) -> Result<ExtractionReport> {
    let field_dir = images_dir.join(record.slug());
    std::fs::create_dir_all(&field_dir)?;

    let mut report = ExtractionReport {
        field_dir: field_dir.clone(),
        ..Default::default()
    };

    match seed_default_images(images_dir, &field_dir) {
        Ok(seeded) => report.defaulted = seeded,
        Err(e) => warn!("既定画像のコピーに失敗 {}: {}", field_dir.display(), e),
    }

    // 同じセルの画像は描画順に試し、最初に保存できた1枚を採用
    for &(slot, col) in columns.iter() {
        let destination = field_dir.join(slot.file_name());
        for image in workbook.images_at(record.sheet_row, col) {
            match save_png(&image.data, &destination) {
                Ok(()) => {
                    info!("画像を保存: {}", destination.display());
                    report.defaulted.retain(|s| *s != slot);
                    report.saved.push(slot);
                    break;
                }
                Err(e) => {
                    warn!("{} の画像を保存できません ({}): {}", slot, image.media_path, e);
                    report.failed.push((slot, e.to_string()));
                }
            }
        }
    }

    Ok(report)
}

/// 画像をデコードして PNG で保存
pub fn save_png(data: &[u8], destination: &Path) -> Result<()> {
    let decoded = image::load_from_memory(data)
        .map_err(|e| CropReportError::ImageDecode(e.to_string()))?;
    decoded
        .save_with_format(destination, ImageFormat::Png)
        .map_err(|e| CropReportError::ImageDecode(format!("{}: {}", destination.display(), e)))
}
