//! レポート各ページの生成
//!
//! 1ページ目は圃場情報、2〜6ページ目は植生指数ごとの比較ページ。
//! 画像・静的ファイルへのリンクは作業ディレクトリ基準で埋め込み、
//! 出力先に合わせた付け替えは書き出し側（export）で行う。

mod field_info;
mod index_page;

use crate::error::{CropReportError, Result};
use chrono::NaiveDate;
use crop_report_common::{attach_download_control, DownloadOptions, FieldRecord, VegetationIndex};
use std::path::Path;
use tracing::debug;

/// ページ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    FieldInfo,
    Index(VegetationIndex),
}

impl Page {
    /// レポート順の全ページ
    pub fn all() -> Vec<Page> {
        std::iter::once(Page::FieldInfo)
            .chain(VegetationIndex::ALL.iter().map(|&i| Page::Index(i)))
            .collect()
    }

    pub fn number(&self) -> u8 {
        match self {
            Page::FieldInfo => 1,
            Page::Index(index) => index.page_number(),
        }
    }

    pub fn from_number(number: u8) -> Option<Page> {
        Page::all().into_iter().find(|p| p.number() == number)
    }

    /// "page1" など
    pub fn name(&self) -> String {
        format!("page{}", self.number())
    }

    pub fn template_file(&self) -> String {
        format!("page{}.html", self.number())
    }

    /// 単ページ出力のファイル名
    pub fn output_file_name(&self, slug: &str) -> String {
        match self {
            Page::FieldInfo => format!("crop_report_{}.html", slug),
            _ => format!("page{}_{}.html", self.number(), slug),
        }
    }

    /// 単ページのダウンロード時のPDF名
    pub fn pdf_file_name(&self, slug: &str) -> String {
        match self {
            Page::FieldInfo => format!("crop_report_{}.pdf", slug),
            Page::Index(index) => format!("{}_report_{}.pdf", index.key(), slug),
        }
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Page::FieldInfo => write!(f, "1: Field Information"),
            Page::Index(index) => write!(f, "{}: {} ({})", index.page_number(), index.title(), index.code()),
        }
    }
}

/// ページに埋め込むリンク先
#[derive(Debug, Clone, PartialEq)]
pub struct PageLinks {
    /// 圃場の画像ディレクトリ（images/North_Plot など）
    pub image_dir: String,
    /// 静的ファイルのディレクトリ
    pub asset_dir: String,
}

impl PageLinks {
    pub fn new(images_dir: &Path, assets_dir: &str, slug: &str) -> Self {
        Self {
            image_dir: format!("{}/{}", link_path(images_dir), slug),
            asset_dir: link_path(Path::new(assets_dir)),
        }
    }
}

/// HTML に書くパス（区切りは常に `/`）
pub fn link_path(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    let trimmed = text.trim_end_matches('/');
    if trimmed.is_empty() {
        text
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct RenderContext {
    /// 報告日の既定値
    pub today: NaiveDate,
    pub links: PageLinks,
    pub pdf_script_url: String,
}

/// 生成済みのページ
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub page: Page,
    pub html: String,
    /// テンプレートに無かったプレースホルダー
    pub missing_placeholders: Vec<String>,
}

/// 6ページ分のテンプレート
#[derive(Debug, Clone)]
pub struct Templates {
    pages: Vec<(Page, String)>,
}

impl Templates {
    /// 指定ページのテンプレートを読む（1つでも無ければエラー）
    pub fn load(dir: &Path, pages: &[Page]) -> Result<Self> {
        let mut loaded = Vec::with_capacity(pages.len());
        for page in pages {
            let path = dir.join(page.template_file());
            if !path.is_file() {
                return Err(CropReportError::FileNotFound(path.display().to_string()));
            }
            let html = std::fs::read_to_string(&path)?;
            loaded.push((*page, html));
        }
        Ok(Self { pages: loaded })
    }

    pub fn get(&self, page: Page) -> Result<&str> {
        self.pages
            .iter()
            .find(|(p, _)| *p == page)
            .map(|(_, html)| html.as_str())
            .ok_or_else(|| CropReportError::Template(format!("{} が読み込まれていません", page.template_file())))
    }
}

/// テンプレートに値を差し込み、ダウンロードボタンを付ける
pub fn render(page: Page, template: &str, record: &FieldRecord, ctx: &RenderContext) -> Result<RenderedPage> {
    let filler = match page {
        Page::FieldInfo => field_info::fill(template, record, ctx),
        Page::Index(index) => index_page::fill(index, template, record, ctx),
    };
    let (html, missing) = filler.into_parts();
    for placeholder in &missing {
        debug!("{}: プレースホルダーなし {:?}", page.name(), placeholder);
    }

    let options = DownloadOptions::single_page(&ctx.pdf_script_url, page.pdf_file_name(&record.slug()));
    let html = attach_download_control(&html, &options)?;

    Ok(RenderedPage {
        page,
        html,
        missing_placeholders: missing,
    })
}
