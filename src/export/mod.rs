pub mod images;

use crate::config::Config;
use crate::error::Result;
use crate::pages::{self, link_path, Page, PageLinks, RenderContext, Templates};
use crate::workbook::Workbook;
use chrono::NaiveDate;
use crop_report_common::assemble::rebase_paths;
use crop_report_common::{assemble_report, DownloadOptions, FieldRecord, PageFragment, RebaseRules};
use images::{ExtractionReport, SlotColumns};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub templates_dir: PathBuf,
    pub output_dir: PathBuf,
    pub images_dir: PathBuf,
    pub assets_dir: String,
    pub pdf_script_url: String,
    /// 対象の圃場（名前またはスラッグ）
    pub field: Option<String>,
    /// 報告日の既定値
    pub today: NaiveDate,
    pub show_progress: bool,
}

impl ExportOptions {
    pub fn from_config(config: &Config, today: NaiveDate) -> Self {
        Self {
            templates_dir: config.templates_dir.clone(),
            output_dir: config.output_dir.clone(),
            images_dir: config.images_dir.clone(),
            assets_dir: config.assets_dir.clone(),
            pdf_script_url: config.pdf_script_url.clone(),
            field: None,
            today,
            show_progress: true,
        }
    }

    fn render_context(&self, slug: &str) -> RenderContext {
        RenderContext {
            today: self.today,
            links: PageLinks::new(&self.images_dir, &self.assets_dir, slug),
            pdf_script_url: self.pdf_script_url.clone(),
        }
    }

    fn rebase_rules(&self, slug: &str) -> RebaseRules {
        RebaseRules {
            prefix: output_prefix(&self.output_dir),
            images_dir: link_path(&self.images_dir),
            assets_dir: link_path(Path::new(&self.assets_dir)),
            field_slug: slug.to_string(),
        }
    }
}

/// 一括処理の結果
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// 書き出したファイル（抽出のみの場合は圃場の画像ディレクトリ）
    pub generated: Vec<PathBuf>,
    /// 失敗した圃場（スラッグ, 理由）
    pub failed: Vec<(String, String)>,
}

impl BatchSummary {
    pub fn merge(&mut self, other: BatchSummary) {
        self.generated.extend(other.generated);
        self.failed.extend(other.failed);
    }
}

/// 出力先から作業ディレクトリへ戻る接頭辞（reports → "../"）
///
/// `../out` や作業ディレクトリ外の絶対パスでは作業ディレクトリ名まで辿る
/// （`/work` で `../out` → `"../work/"`）。
pub fn output_prefix(output_dir: &Path) -> String {
    let Ok(cwd) = std::env::current_dir() else {
        let depth = normalize(output_dir)
            .iter()
            .filter(|c| matches!(c, Component::Normal(_)))
            .count();
        return "../".repeat(depth);
    };

    let joined = cwd.join(output_dir);
    let target = normalize(&joined);
    let base = normalize(&cwd);
    let common = target
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut prefix = "../".repeat(target.len() - common);
    for part in &base[common..] {
        prefix.push_str(&part.as_os_str().to_string_lossy());
        prefix.push('/');
    }
    prefix
}

/// `.` と `..` を字句的に畳む
fn normalize(path: &Path) -> Vec<Component<'_>> {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.last(), Some(Component::Normal(_))) {
                    out.pop();
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    let style = ProgressStyle::with_template("{bar:30.green/white} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}

/// 圃場ごとに処理し、失敗は記録して次へ進む
fn for_each_field<F>(records: &[&FieldRecord], show_progress: bool, mut job: F) -> BatchSummary
where
    F: FnMut(&FieldRecord) -> Result<PathBuf>,
{
    let mut summary = BatchSummary::default();
    let bar = progress_bar(records.len(), show_progress);

    for record in records {
        let slug = record.slug();
        bar.set_message(slug.clone());
        match job(*record) {
            Ok(path) => summary.generated.push(path),
            Err(e) => {
                warn!("{} の処理に失敗: {}", slug, e);
                summary.failed.push((slug, e.to_string()));
            }
        }
        bar.inc(1);
    }

    bar.finish_and_clear();
    summary
}

fn extract_for(
    workbook: &Workbook,
    columns: &SlotColumns,
    record: &FieldRecord,
    options: &ExportOptions,
) -> Result<ExtractionReport> {
    let report = images::extract_field_images(workbook, columns, record, &options.images_dir)?;
    info!(
        "{}: 保存{} 既定{} 失敗{} 欠落{}",
        record.slug(),
        report.saved.len(),
        report.defaulted.len(),
        report.failed.len(),
        report.missing().len()
    );
    Ok(report)
}

/// 画像の抽出のみ
pub fn extract_all_images(workbook: &Workbook, options: &ExportOptions) -> Result<BatchSummary> {
    let records = workbook.select_records(options.field.as_deref())?;
    let columns = SlotColumns::resolve(&workbook.headers);
    if columns.is_empty() {
        warn!("画像スロットの列が見つかりません");
    }

    Ok(for_each_field(&records, options.show_progress, |record| {
        extract_for(workbook, &columns, record, options).map(|report| report.field_dir)
    }))
}

/// 圃場ごとの6ページ結合レポート `full_report_<field>.html`
pub fn export_full_reports(workbook: &Workbook, options: &ExportOptions) -> Result<BatchSummary> {
    let page_list = Page::all();
    let templates = Templates::load(&options.templates_dir, &page_list)?;
    let records = workbook.select_records(options.field.as_deref())?;
    std::fs::create_dir_all(&options.output_dir)?;
    let columns = SlotColumns::resolve(&workbook.headers);

    Ok(for_each_field(&records, options.show_progress, |record| {
        let slug = record.slug();
        extract_for(workbook, &columns, record, options)?;

        let ctx = options.render_context(&slug);
        let mut fragments = Vec::with_capacity(page_list.len());
        for page in &page_list {
            let rendered = pages::render(*page, templates.get(*page)?, record, &ctx)?;
            fragments.push(PageFragment {
                name: page.name(),
                html: rendered.html,
            });
        }

        let download = DownloadOptions::combined(&options.pdf_script_url, format!("full_report_{}.pdf", slug));
        let report = assemble_report(&fragments, &options.rebase_rules(&slug), &download);
        if !report.skipped.is_empty() {
            warn!("{}: 結合できなかったページ {:?}", slug, report.skipped);
        }

        let path = options.output_dir.join(format!("full_report_{}.html", slug));
        std::fs::write(&path, report.html)?;
        info!("レポートを出力: {}", path.display());
        Ok(path)
    }))
}

/// 単ページを圃場ごとに出力（ダウンロードボタン付き）
pub fn export_pages(workbook: &Workbook, page: Page, options: &ExportOptions) -> Result<BatchSummary> {
    let templates = Templates::load(&options.templates_dir, &[page])?;
    let template = templates.get(page)?;
    let records = workbook.select_records(options.field.as_deref())?;
    std::fs::create_dir_all(&options.output_dir)?;
    let columns = SlotColumns::resolve(&workbook.headers);

    Ok(for_each_field(&records, options.show_progress, |record| {
        let slug = record.slug();
        if matches!(page, Page::Index(_)) {
            extract_for(workbook, &columns, record, options)?;
        }

        let rendered = pages::render(page, template, record, &options.render_context(&slug))?;
        let html = rebase_paths(&rendered.html, &options.rebase_rules(&slug));

        let path = options.output_dir.join(page.output_file_name(&slug));
        std::fs::write(&path, html)?;
        info!("ページを出力: {}", path.display());
        Ok(path)
    }))
}
