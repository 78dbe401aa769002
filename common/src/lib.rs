//! Crop Report Common Library
//!
//! ブック読み込み側（CLI）から独立した型とユーティリティ:
//! - 列名の表記ゆれ解決
//! - 日付の正規化
//! - HTMLテンプレートへの文字列差し込み
//! - ページ断片の結合

pub mod types;
pub mod error;
pub mod resolver;
pub mod dates;
pub mod template;
pub mod pdf_control;
pub mod assemble;

pub use types::{CellValue, Epoch, FieldRecord, Slot, VegetationIndex};
pub use error::{Error, Result};
pub use resolver::{resolve, LogicalField, Resolution};
pub use dates::{format_day_first, format_iso, parse_date, NOT_AVAILABLE};
pub use template::{escape_html, TemplateFiller};
pub use pdf_control::{attach_download_control, DownloadOptions, HTML2PDF_CDN_URL};
pub use assemble::{assemble_report, PageFragment, RebaseRules, PAGE_BREAK};
