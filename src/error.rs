use thiserror::Error;

#[derive(Error, Debug)]
pub enum CropReportError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("ブック読み込みエラー: {0}")]
    Workbook(String),

    #[error("描画レイヤー解析エラー: {0}")]
    Drawing(String),

    #[error("画像デコードエラー: {0}")]
    ImageDecode(String),

    #[error("テンプレートエラー: {0}")]
    Template(String),

    #[error("データ行がありません: {0}")]
    NoRecords(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] crop_report_common::Error),
}

pub type Result<T> = std::result::Result<T, CropReportError>;
