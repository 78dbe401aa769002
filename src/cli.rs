use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "crop-report")]
#[command(about = "圃場調査ブック（xlsx）から作物生育レポート（HTML）を生成", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 全圃場の6ページ結合レポートを生成
    Run {
        /// ブック、またはブックを置いたフォルダ
        #[arg(required = true)]
        input: PathBuf,

        /// テンプレートフォルダ（page1.html〜page6.html）
        #[arg(short, long)]
        templates: Option<PathBuf>,

        /// 出力フォルダ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 画像フォルダ
        #[arg(short, long)]
        images: Option<PathBuf>,

        /// 対象の圃場（名前またはスラッグ）
        #[arg(short, long)]
        field: Option<String>,
    },

    /// 指定ページだけを圃場ごとに生成
    Page {
        /// ブックファイル
        #[arg(required = true)]
        workbook: PathBuf,

        /// ページ番号（1: 圃場情報, 2〜6: NDVI/NDMI/RECI/MSAVI/NDRE）
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=6))]
        number: u8,

        /// テンプレートフォルダ
        #[arg(short, long)]
        templates: Option<PathBuf>,

        /// 出力フォルダ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 画像フォルダ
        #[arg(short, long)]
        images: Option<PathBuf>,

        /// 対象の圃場
        #[arg(short, long)]
        field: Option<String>,
    },

    /// 埋め込み画像を圃場ごとに抽出
    Extract {
        /// ブックファイル
        #[arg(required = true)]
        workbook: PathBuf,

        /// 画像フォルダ
        #[arg(short, long)]
        images: Option<PathBuf>,

        /// 対象の圃場
        #[arg(short, long)]
        field: Option<String>,
    },

    /// ブックの列・レコード・画像アンカーを表示
    Inspect {
        /// ブックファイル
        #[arg(required = true)]
        workbook: PathBuf,
    },

    /// 設定を管理
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// テンプレートフォルダを設定
        #[arg(long)]
        set_templates: Option<PathBuf>,

        /// 出力フォルダを設定
        #[arg(long)]
        set_output: Option<PathBuf>,

        /// 画像フォルダを設定
        #[arg(long)]
        set_images: Option<PathBuf>,
    },
}
