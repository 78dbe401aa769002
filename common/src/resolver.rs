//! 列名の表記ゆれ解決
//!
//! 論理項目ごとに列名の候補を順に試し、最初に値が入っている列を採用する。
//! 列そのものが無い場合と、列はあるが空（"-" / "nan" など）の場合で
//! 既定値を使い分ける。

use crate::types::{CellValue, FieldRecord};

/// 解決結果
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    /// 値が見つかった
    Found { header: &'a str, value: &'a CellValue },
    /// 候補列はあるが全て空
    Blank,
    /// 候補列が1つも無い
    Absent,
}

impl Resolution<'_> {
    pub fn value(&self) -> Option<&CellValue> {
        match self {
            Resolution::Found { value, .. } => Some(value),
            _ => None,
        }
    }

    /// 見つかった値の表示文字列、なければ既定値
    pub fn text_or(&self, absent: &str, blank: &str) -> String {
        match self {
            Resolution::Found { value, .. } => value.display(),
            Resolution::Blank => blank.to_string(),
            Resolution::Absent => absent.to_string(),
        }
    }
}

/// 候補列を順に試す
pub fn resolve<'a, S: AsRef<str>>(record: &'a FieldRecord, headers: &[S]) -> Resolution<'a> {
    let mut any_present = false;
    for header in headers {
        let header = header.as_ref();
        if let Some((key, value)) = record.get_key_value(header) {
            any_present = true;
            if !value.is_blank() {
                return Resolution::Found { header: key, value };
            }
        }
    }
    if any_present {
        Resolution::Blank
    } else {
        Resolution::Absent
    }
}

/// 論理項目の定義
#[derive(Debug, Clone, Copy)]
pub struct LogicalField {
    pub name: &'static str,
    pub headers: &'static [&'static str],
    /// 列が無いときの既定値
    pub absent_default: &'static str,
    /// 列が空のときの既定値
    pub blank_default: &'static str,
}

impl LogicalField {
    pub fn resolve<'a>(&self, record: &'a FieldRecord) -> Resolution<'a> {
        resolve(record, self.headers)
    }

    pub fn text(&self, record: &FieldRecord) -> String {
        self.resolve(record)
            .text_or(self.absent_default, self.blank_default)
    }
}

/// 1ページ目（圃場情報）の論理項目
pub mod fields {
    use super::LogicalField;

    pub const FIELD_NAME: LogicalField = LogicalField {
        name: "field name",
        headers: &["Field"],
        absent_default: "Sample Field",
        blank_default: "Sample Field",
    };

    pub const CROP: LogicalField = LogicalField {
        name: "crop",
        headers: &["Crop"],
        absent_default: "-",
        blank_default: "-",
    };

    pub const SOWING_DATE: LogicalField = LogicalField {
        name: "sowing date",
        headers: &["Sowing/planting", "Sowing / Planting"],
        absent_default: "2025-08-01",
        blank_default: "-",
    };

    pub const AREA_COVERAGE: LogicalField = LogicalField {
        name: "area coverage",
        headers: &["area", "Area"],
        absent_default: "10.5 acres",
        blank_default: "10.5 acres",
    };

    pub const GROWTH_STAGE: LogicalField = LogicalField {
        name: "growth stage",
        headers: &["maturity", "Maturity"],
        absent_default: "Mature",
        blank_default: "Not specified",
    };

    /// 既定値は当日（呼び出し側で補う）
    pub const REPORT_DATE: LogicalField = LogicalField {
        name: "report date",
        headers: &["current data", "Current Image date"],
        absent_default: "",
        blank_default: "",
    };
}
