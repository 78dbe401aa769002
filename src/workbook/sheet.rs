//! ワークシートのセル読み込み（calamine）
//!
//! 1行目を見出し、2行目以降を圃場レコードとして読む。
//! 行・列はシート上の絶対位置（0始まり）で保持し、描画アンカーと突き合わせる。

use super::Header;
use crate::error::{CropReportError, Result};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use crop_report_common::{CellValue, FieldRecord};
use std::path::Path;

/// 先頭シートの見出しとレコード
pub(crate) fn read_first_sheet(path: &Path) -> Result<(String, Vec<Header>, Vec<FieldRecord>)> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| CropReportError::Workbook(format!("{}: {}", path.display(), e)))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| CropReportError::Workbook(format!("シートがありません: {}", path.display())))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| CropReportError::Workbook(format!("{}: {}", sheet_name, e)))?;

    let (headers, records) = records_from_range(&range);
    Ok((sheet_name, headers, records))
}

/// Range から見出しとレコードを組み立てる
pub(crate) fn records_from_range(range: &Range<Data>) -> (Vec<Header>, Vec<FieldRecord>) {
    let Some((start_row, start_col)) = range.start() else {
        return (Vec::new(), Vec::new());
    };

    let mut rows = range.rows();
    let headers: Vec<Header> = match rows.next() {
        Some(cells) => cells
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| {
                let text = cell.to_string();
                if text.trim().is_empty() {
                    None
                } else {
                    Some(Header {
                        text,
                        column: start_col + i as u32,
                    })
                }
            })
            .collect(),
        None => return (Vec::new(), Vec::new()),
    };

    let mut records = Vec::new();
    for (offset, cells) in rows.enumerate() {
        if cells.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        let sheet_row = start_row + 1 + offset as u32;
        let mut record = FieldRecord::new(records.len(), sheet_row);
        for header in &headers {
            let idx = (header.column - start_col) as usize;
            let value = cells.get(idx).map(to_cell_value).unwrap_or_default();
            record.insert(header.text.clone(), value);
        }
        records.push(record);
    }

    (headers, records)
}

fn to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Int(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => CellValue::DateTime(ndt),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(cells: Vec<Vec<Data>>) -> Range<Data> {
        let height = cells.len() as u32;
        let width = cells.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, row) in cells.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                range.set_value((r as u32, c as u32), value);
            }
        }
        range
    }

    #[test]
    fn test_records_from_range() {
        let range = range(vec![
            vec![Data::String("Field".into()), Data::String("NDVI value".into())],
            vec![Data::String("North".into()), Data::Float(0.61)],
            vec![Data::Empty, Data::Empty],
            vec![Data::String("South".into()), Data::Float(0.42)],
        ]);

        let (headers, records) = records_from_range(&range);
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[1].text, "NDVI value");
        assert_eq!(headers[1].column, 1);

        // 空行は飛ばすが行番号はシート上の位置
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sheet_row, 1);
        assert_eq!(records[1].sheet_row, 3);
        assert_eq!(records[1].ordinal, 1);
        assert_eq!(records[1].field_name().as_deref(), Some("South"));
    }

    #[test]
    fn test_blank_headers_are_skipped() {
        let range = range(vec![
            vec![Data::String("Field".into()), Data::Empty, Data::String("Crop".into())],
            vec![Data::String("A".into()), Data::String("x".into()), Data::String("Rice".into())],
        ]);
        let (headers, records) = records_from_range(&range);
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[1].column, 2);
        assert_eq!(records[0].get("Crop"), Some(&CellValue::Text("Rice".into())));
    }

    #[test]
    fn test_to_cell_value() {
        assert_eq!(to_cell_value(&Data::Int(3)), CellValue::Int(3));
        assert_eq!(to_cell_value(&Data::Empty), CellValue::Empty);
        assert_eq!(
            to_cell_value(&Data::String("-".into())),
            CellValue::Text("-".into())
        );
    }
}
