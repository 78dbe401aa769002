use crate::error::{CropReportError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "XLSX"];

/// 入力パスからブックを集める
///
/// ファイルならそのまま、フォルダなら直下の .xlsx（Excelのロックファイル `~$` は除く）。
pub fn find_workbooks(input: &Path) -> Result<Vec<PathBuf>> {
    if !input.exists() {
        return Err(CropReportError::FileNotFound(input.display().to_string()));
    }
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut workbooks: Vec<PathBuf> = WalkDir::new(input)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| path.is_file() && is_workbook(path))
        .collect();

    // ファイル名でソート
    workbooks.sort();

    Ok(workbooks)
}

fn is_workbook(path: &Path) -> bool {
    let is_lock_file = path
        .file_name()
        .map(|n| n.to_string_lossy().starts_with("~$"))
        .unwrap_or(false);
    let has_extension = path
        .extension()
        .map(|ext| WORKBOOK_EXTENSIONS.iter().any(|&e| e == ext.to_string_lossy()))
        .unwrap_or(false);
    has_extension && !is_lock_file
}
