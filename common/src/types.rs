//! 圃場レコードと植生指数の型定義
//!
//! - CellValue: ブックのセル値（読み込みライブラリ非依存）
//! - FieldRecord: データ1行 = 圃場1件
//! - VegetationIndex / Epoch / Slot: 指数ページと画像スロット

use chrono::NaiveDateTime;
use std::collections::HashMap;

/// セル値
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Int(i64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Error(String),
}

/// 空扱いする文字列（"-" や "nan" は未入力とみなす）
const BLANK_SENTINELS: &[&str] = &["", "-", "nan", "NaN", "NaT", "None"];

impl CellValue {
    /// 未入力とみなせる値か
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty | CellValue::Error(_) => true,
            CellValue::Text(s) => BLANK_SENTINELS.contains(&s.trim()),
            CellValue::Number(f) => f.is_nan(),
            _ => false,
        }
    }

    /// 表示用文字列
    ///
    /// 小数は表計算の見た目に合わせる（整数値の小数は `10.0`）。
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
                    format!("{:.1}", f)
                } else {
                    format!("{}", f)
                }
            }
            CellValue::Int(i) => i.to_string(),
            CellValue::Bool(b) => if *b { "True".into() } else { "False".into() },
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            CellValue::Error(e) => e.clone(),
        }
    }
}

/// 圃場名の列
pub const FIELD_COLUMN: &str = "Field";

/// データ1行（圃場1件）
#[derive(Debug, Clone, Default)]
pub struct FieldRecord {
    /// データ行の通し番号（0始まり、ヘッダー除く）
    pub ordinal: usize,
    /// シート上の行（0始まり、描画アンカーと同じ座標系）
    pub sheet_row: u32,
    cells: HashMap<String, CellValue>,
}

impl FieldRecord {
    pub fn new(ordinal: usize, sheet_row: u32) -> Self {
        Self {
            ordinal,
            sheet_row,
            cells: HashMap::new(),
        }
    }

    /// 列を追加（同名の列は先勝ち）
    pub fn insert(&mut self, header: impl Into<String>, value: CellValue) {
        self.cells.entry(header.into()).or_insert(value);
    }

    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.cells.get(header)
    }

    pub fn get_key_value(&self, header: &str) -> Option<(&str, &CellValue)> {
        self.cells
            .get_key_value(header)
            .map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// 圃場名（未入力なら None）
    pub fn field_name(&self) -> Option<String> {
        self.get(FIELD_COLUMN)
            .filter(|v| !v.is_blank())
            .map(CellValue::display)
    }

    /// ファイル名・ディレクトリ名に使う識別子
    ///
    /// 空白とスラッシュを `_` に置換。圃場名がなければ `field_<n>`。
    /// `.` や `..` のようにディレクトリ名にならない名前も `field_<n>`。
    pub fn slug(&self) -> String {
        let slug = self
            .field_name()
            .map(|name| name.replace(' ', "_").replace(['/', '\\'], "_"))
            .unwrap_or_default();
        if slug.is_empty() || slug.chars().all(|c| c == '.') {
            format!("field_{}", self.ordinal + 1)
        } else {
            slug
        }
    }
}

/// 植生指数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VegetationIndex {
    Ndvi,
    Ndmi,
    Reci,
    Msavi,
    Ndre,
}

impl VegetationIndex {
    /// レポートのページ順
    pub const ALL: [VegetationIndex; 5] = [
        VegetationIndex::Ndvi,
        VegetationIndex::Ndmi,
        VegetationIndex::Reci,
        VegetationIndex::Msavi,
        VegetationIndex::Ndre,
    ];

    /// 列名に使う表記（"NDVI" など）
    pub fn code(&self) -> &'static str {
        match self {
            VegetationIndex::Ndvi => "NDVI",
            VegetationIndex::Ndmi => "NDMI",
            VegetationIndex::Reci => "RECI",
            VegetationIndex::Msavi => "MSAVI",
            VegetationIndex::Ndre => "NDRE",
        }
    }

    /// ファイル名に使う小文字表記
    pub fn key(&self) -> &'static str {
        match self {
            VegetationIndex::Ndvi => "ndvi",
            VegetationIndex::Ndmi => "ndmi",
            VegetationIndex::Reci => "reci",
            VegetationIndex::Msavi => "msavi",
            VegetationIndex::Ndre => "ndre",
        }
    }

    /// ページ見出し
    pub fn title(&self) -> &'static str {
        match self {
            VegetationIndex::Ndvi => "Green Health Score",
            VegetationIndex::Ndmi => "Moisture Level Indicator",
            VegetationIndex::Reci => "Leaf Freshness Index",
            VegetationIndex::Msavi => "Growth Strength Index",
            VegetationIndex::Ndre => "Early Stress Checker",
        }
    }

    /// レポート内のページ番号（1ページ目は圃場情報）
    pub fn page_number(&self) -> u8 {
        match self {
            VegetationIndex::Ndvi => 2,
            VegetationIndex::Ndmi => 3,
            VegetationIndex::Reci => 4,
            VegetationIndex::Msavi => 5,
            VegetationIndex::Ndre => 6,
        }
    }

    /// NDVIページだけ変化量の段落を残す
    pub fn shows_change(&self) -> bool {
        matches!(self, VegetationIndex::Ndvi)
    }

    pub fn value_headers(&self, epoch: Epoch) -> Vec<String> {
        match epoch {
            Epoch::Old => vec![format!("Old {} value", self.code())],
            Epoch::Current => vec![format!("{} value", self.code())],
        }
    }

    pub fn change_headers(&self) -> Vec<String> {
        vec![format!("{} change", self.code())]
    }

    pub fn advisory_headers(&self) -> Vec<String> {
        vec![format!("{} ADVISORY", self.code())]
    }

    /// 撮影日の列（NDVIは旧形式の列名にもフォールバック）
    pub fn image_date_headers(&self, epoch: Epoch) -> Vec<String> {
        let mut headers = vec![Slot::new(*self, epoch).header()];
        if *self == VegetationIndex::Ndvi {
            match epoch {
                Epoch::Old => headers.push("Old Date".into()),
                Epoch::Current => {
                    headers.push("Current  image".into());
                    headers.push("Current image".into());
                }
            }
        }
        headers
    }
}

impl std::fmt::Display for VegetationIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// 旧画像 / 現画像
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Epoch {
    Old,
    Current,
}

impl Epoch {
    pub fn key(&self) -> &'static str {
        match self {
            Epoch::Old => "old",
            Epoch::Current => "current",
        }
    }
}

/// 画像スロット: (指数, 旧/現)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub index: VegetationIndex,
    pub epoch: Epoch,
}

impl Slot {
    pub fn new(index: VegetationIndex, epoch: Epoch) -> Self {
        Self { index, epoch }
    }

    /// 全10スロット（ページ順、旧→現）
    pub fn all() -> Vec<Slot> {
        VegetationIndex::ALL
            .iter()
            .flat_map(|&index| [Slot::new(index, Epoch::Old), Slot::new(index, Epoch::Current)])
            .collect()
    }

    /// 画像が貼られている列の見出し
    pub fn header(&self) -> String {
        match self.epoch {
            Epoch::Old => format!("Old {} Image date", self.index.code()),
            Epoch::Current => format!("{} Image date", self.index.code()),
        }
    }

    /// 保存ファイル名（"old_ndvi.png" など）
    pub fn file_name(&self) -> String {
        format!("{}_{}.png", self.epoch.key(), self.index.key())
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.index.code(), self.epoch.key())
    }
}
