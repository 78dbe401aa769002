//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use crop_report::error::CropReportError;
use crop_report::pages::{Page, Templates};
use crop_report::scanner;
use crop_report::workbook::Workbook;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないブックを開いた場合
#[test]
fn test_open_nonexistent_workbook() {
    let result = Workbook::open(Path::new("/nonexistent/path/survey.xlsx"));
    assert!(matches!(result, Err(CropReportError::FileNotFound(_))));
}

/// xlsx ではないファイルを開いた場合
#[test]
fn test_open_broken_workbook() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("broken.xlsx");
    std::fs::write(&path, "this is not a zip file").unwrap();

    let result = Workbook::open(&path);
    assert!(matches!(result, Err(CropReportError::Workbook(_))), "got: {:?}", result.err());
}

/// ブックの無いフォルダ
#[test]
fn test_find_workbooks_empty_folder() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();

    let result = scanner::find_workbooks(dir.path());
    assert!(result.is_ok());
    assert!(result.unwrap().is_empty());
}

/// テンプレートが1枚でも欠けていれば読み込みは失敗
#[test]
fn test_missing_template() {
    let dir = tempdir().expect("Failed to create temp dir");
    for n in 1..=5 {
        std::fs::write(dir.path().join(format!("page{}.html", n)), "<html><body></body></html>").unwrap();
    }

    let result = Templates::load(dir.path(), &Page::all());
    match result {
        Err(CropReportError::FileNotFound(path)) => assert!(path.ends_with("page6.html"), "path: {}", path),
        other => panic!("FileNotFound になるべき: {:?}", other.map(|_| ())),
    }
}

/// CropReportErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        CropReportError::Config("テスト設定エラー".to_string()),
        CropReportError::FileNotFound("survey.xlsx".to_string()),
        CropReportError::Workbook("シートがありません".to_string()),
        CropReportError::Drawing("drawing1.xml".to_string()),
        CropReportError::ImageDecode("不正なPNG".to_string()),
        CropReportError::Template("page2.html".to_string()),
        CropReportError::NoRecords("survey.xlsx".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// 共通ライブラリのエラーはそのまま表示される
#[test]
fn test_common_error_is_transparent() {
    let inner = crop_report_common::Error::Template("<body> タグがありません".into());
    let expected = inner.to_string();
    let err: CropReportError = inner.into();
    assert_eq!(err.to_string(), expected);
}

/// IOエラーの変換
#[test]
fn test_io_error_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: CropReportError = io.into();
    assert!(matches!(err, CropReportError::Io(_)));
    assert!(err.to_string().contains("denied"));
}
