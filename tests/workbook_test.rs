//! ブック読み込みと画像抽出の統合テスト

mod common;

use common::*;
use crop_report::export::images::{extract_field_images, SlotColumns};
use crop_report::workbook::Workbook;
use crop_report_common::{CellValue, Epoch, Slot, VegetationIndex};
use tempfile::tempdir;

fn slot(index: VegetationIndex, epoch: Epoch) -> Slot {
    Slot::new(index, epoch)
}

#[test]
fn test_open_survey() {
    let dir = tempdir().expect("Failed to create temp dir");
    let book = Workbook::open(&build_survey(dir.path())).expect("ブックを開けない");

    assert_eq!(book.headers.len(), HEADERS.len());
    assert_eq!(book.column_of("NDVI Image date"), Some(7));
    assert_eq!(book.records.len(), 2);
    assert_eq!(book.records[0].sheet_row, 1);
    assert_eq!(book.records[1].sheet_row, 2);
    assert_eq!(book.records[0].slug(), "North_Plot");
    assert_eq!(book.records[0].get("NDVI value"), Some(&CellValue::Number(0.45)));

    assert_eq!(book.images.len(), 4);
    let anchors: Vec<(u32, u32)> = book.images.iter().map(|i| (i.row, i.col)).collect();
    assert!(anchors.contains(&(1, 9)));
    assert!(anchors.contains(&(2, 7)));
}

/// 行2・列8（1始まり）の画像は列8の見出しのスロットに入る（挿入順に依存しない）
#[test]
fn test_positional_association() {
    let dir = tempdir().expect("Failed to create temp dir");
    let book = Workbook::open(&build_survey(dir.path())).unwrap();
    let columns = SlotColumns::resolve(&book.headers);
    let images_dir = dir.path().join("images");

    assert_eq!(columns.column_of(slot(VegetationIndex::Ndvi, Epoch::Current)), Some(7));

    let report = extract_field_images(&book, &columns, &book.records[0], &images_dir).unwrap();
    let field_dir = images_dir.join("North_Plot");

    assert_eq!(pixel(&field_dir.join("current_ndvi.png")), RED);
    assert_eq!(pixel(&field_dir.join("old_ndvi.png")), GREEN);
    assert!(report.saved.contains(&slot(VegetationIndex::Ndvi, Epoch::Current)));
    assert!(report.saved.contains(&slot(VegetationIndex::Ndvi, Epoch::Old)));
}

/// 同じセルに2枚ある場合は先に描画された方
#[test]
fn test_first_found_wins() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut book = Workbook::open(&build_survey(dir.path())).unwrap();
    book.images.push(anchored(1, 7, png(BLUE)));
    let columns = SlotColumns::resolve(&book.headers);
    let images_dir = dir.path().join("images");

    let report = extract_field_images(&book, &columns, &book.records[0], &images_dir).unwrap();

    assert_eq!(pixel(&images_dir.join("North_Plot").join("current_ndvi.png")), RED);
    // スロット外の列（Crop）の画像と2枚目は保存されない
    assert_eq!(report.saved.len(), 2);
    assert!(report.failed.is_empty());
}

/// 先の画像が壊れていれば記録して次の画像でスロットを埋める
#[test]
fn test_broken_image_is_recorded_and_skipped() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut book = Workbook::open(&build_survey(dir.path())).unwrap();
    book.images.insert(0, anchored(1, 7, b"not an image".to_vec()));
    let columns = SlotColumns::resolve(&book.headers);
    let images_dir = dir.path().join("images");

    let report = extract_field_images(&book, &columns, &book.records[0], &images_dir)
        .expect("1枚の失敗で抽出全体が失敗してはいけない");
    let field_dir = images_dir.join("North_Plot");
    let current = slot(VegetationIndex::Ndvi, Epoch::Current);

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, current);
    assert_eq!(pixel(&field_dir.join("current_ndvi.png")), RED);
    assert!(report.saved.contains(&current));
    // 他のスロットは影響を受けない
    assert_eq!(pixel(&field_dir.join("old_ndvi.png")), GREEN);
    assert!(report.saved.contains(&slot(VegetationIndex::Ndvi, Epoch::Old)));
}

/// 圃場の行が違えば別の画像
#[test]
fn test_rows_are_independent() {
    let dir = tempdir().expect("Failed to create temp dir");
    let book = Workbook::open(&build_survey(dir.path())).unwrap();
    let columns = SlotColumns::resolve(&book.headers);
    let images_dir = dir.path().join("images");

    let report = extract_field_images(&book, &columns, &book.records[1], &images_dir).unwrap();
    let field_dir = images_dir.join("South");

    assert_eq!(pixel(&field_dir.join("current_ndvi.png")), YELLOW);
    assert!(!field_dir.join("old_ndvi.png").exists());
    assert_eq!(report.saved, vec![slot(VegetationIndex::Ndvi, Epoch::Current)]);
    assert_eq!(report.missing().len(), 9);
}

/// 既定画像はスロットが埋まらなかった場合に残る
#[test]
fn test_default_images_fill_unmatched_slots() {
    let dir = tempdir().expect("Failed to create temp dir");
    let book = Workbook::open(&build_survey(dir.path())).unwrap();
    let columns = SlotColumns::resolve(&book.headers);
    let images_dir = dir.path().join("images");
    std::fs::create_dir_all(&images_dir).unwrap();
    std::fs::write(images_dir.join("old_ndmi.png"), png(GRAY)).unwrap();
    std::fs::write(images_dir.join("current_ndvi.png"), png(GRAY)).unwrap();

    let report = extract_field_images(&book, &columns, &book.records[0], &images_dir).unwrap();
    let field_dir = images_dir.join("North_Plot");

    assert_eq!(pixel(&field_dir.join("old_ndmi.png")), GRAY);
    // ブックの画像が既定画像より優先
    assert_eq!(pixel(&field_dir.join("current_ndvi.png")), RED);
    assert_eq!(report.defaulted, vec![slot(VegetationIndex::Ndmi, Epoch::Old)]);
}
