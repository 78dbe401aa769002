//! テスト用ブックの生成
//!
//! rust_xlsxwriter で見出し・2圃場・画像アンカー付きのブックを作る。

#![allow(dead_code)]

use crop_report::workbook::EmbeddedImage;
use rust_xlsxwriter::{Image, Workbook as XlsxWorkbook};
use std::path::{Path, PathBuf};

pub const RED: [u8; 3] = [220, 20, 20];
pub const GREEN: [u8; 3] = [20, 200, 20];
pub const BLUE: [u8; 3] = [20, 20, 220];
pub const YELLOW: [u8; 3] = [230, 230, 0];
pub const GRAY: [u8; 3] = [128, 128, 128];

/// 見出し（0始まりの列順）
pub const HEADERS: [&str; 14] = [
    "Field",
    "Crop",
    "Sowing/planting",
    "Area",
    "Maturity",
    "Old NDVI value",
    "NDVI value",
    "NDVI Image date",
    "NDVI change",
    "Old NDVI Image date",
    "NDVI ADVISORY",
    "NDMI Image date",
    "Old NDMI Image date",
    "NDMI value",
];

/// 単色PNG
pub fn png(color: [u8; 3]) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(4, 4, image::Rgb(color));
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .expect("PNGエンコード失敗");
    buf.into_inner()
}

/// 保存された画像の左上の色
pub fn pixel(path: &Path) -> [u8; 3] {
    image::open(path)
        .unwrap_or_else(|e| panic!("画像を開けない {}: {}", path.display(), e))
        .to_rgb8()
        .get_pixel(0, 0)
        .0
}

/// 2圃場のブックを作る
///
/// 画像（0始まりの行, 列）:
/// - (1, 9) GREEN  North の Old NDVI
/// - (1, 7) RED    North の NDVI
/// - (2, 7) YELLOW South の NDVI
/// - (1, 1) GRAY   スロットではない列（Crop）
pub fn build_survey(dir: &Path) -> PathBuf {
    let path = dir.join("survey.xlsx");
    let mut workbook = XlsxWorkbook::new();
    {
        let sheet = workbook.add_worksheet();
        for (col, header) in HEADERS.iter().enumerate() {
            sheet.write_string(0, col as u16, *header).expect("見出しの書き込み失敗");
        }

        let north: [(u16, &str); 8] = [
            (0, "North Plot"),
            (1, "Paddy"),
            (2, "2025-06-12 00:00:00"),
            (4, "Tillering"),
            (7, "2025-08-01 00:00:00"),
            (8, "+0.13"),
            (9, "2025-07-01 00:00:00"),
            (10, "Canopy is healthy."),
        ];
        for (col, value) in north {
            sheet.write_string(1, col, value).expect("North の書き込み失敗");
        }
        sheet.write_number(1, 3, 4.0).unwrap();
        sheet.write_number(1, 5, 0.32).unwrap();
        sheet.write_number(1, 6, 0.45).unwrap();
        sheet.write_number(1, 13, 0.21).unwrap();

        sheet.write_string(2, 0, "South").unwrap();
        sheet.write_string(2, 1, "-").unwrap();
        sheet.write_string(2, 4, "nan").unwrap();
        sheet.write_number(2, 6, 0.51).unwrap();

        let images = [
            (1, 9, GREEN),
            (1, 7, RED),
            (2, 7, YELLOW),
            (1, 1, GRAY),
        ];
        for (row, col, color) in images {
            let image = Image::new_from_buffer(&png(color)).expect("画像の作成失敗");
            sheet.insert_image(row, col, &image).expect("画像の挿入失敗");
        }
    }
    workbook.save(&path).expect("ブックの保存失敗");
    path
}

/// 描画レイヤーに画像を1枚足す（同じセルに2枚目を置くため）
///
/// rust_xlsxwriter は1セルに1枚しか残さないので、読み込み後に追加する。
pub fn anchored(row: u32, col: u32, data: Vec<u8>) -> EmbeddedImage {
    EmbeddedImage {
        row,
        col,
        media_path: format!("xl/media/extra_{}_{}.png", row, col),
        data,
    }
}

/// リポジトリ同梱のテンプレート
pub fn templates_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")
}
