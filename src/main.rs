use anyhow::Context;
use clap::Parser;
use crop_report::{cli, config, export, pages, scanner, workbook};
use cli::{Cli, Commands};
use config::Config;
use export::images::SlotColumns;
use export::{BatchSummary, ExportOptions};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use workbook::Workbook;

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "crop_report=debug,crop_report_common=debug,warn"
    } else {
        "crop_report=info,warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn options_for(
    config: &Config,
    templates: Option<PathBuf>,
    output: Option<PathBuf>,
    images: Option<PathBuf>,
    field: Option<String>,
) -> ExportOptions {
    let mut options = ExportOptions::from_config(config, chrono::Local::now().date_naive());
    if let Some(dir) = templates {
        options.templates_dir = dir;
    }
    if let Some(dir) = output {
        options.output_dir = dir;
    }
    if let Some(dir) = images {
        options.images_dir = dir;
    }
    options.field = field;
    options
}

fn print_summary(summary: &BatchSummary) {
    for path in &summary.generated {
        println!("  ✔ {}", path.display());
    }
    for (field, reason) in &summary.failed {
        println!("  ✘ {}: {}", field, reason);
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load().context("設定ファイルを読めません")?;

    match cli.command {
        Commands::Run { input, templates, output, images, field } => {
            println!("🌾 crop-report - レポート一括生成\n");
            let options = options_for(&config, templates, output, images, field);

            // 1. ブック検索
            println!("[1/3] ブックを検索中...");
            let workbooks = scanner::find_workbooks(&input)?;
            println!("✔ {}件のブックを検出\n", workbooks.len());

            if workbooks.is_empty() {
                println!("処理対象のブックがありません: {}", input.display());
                return Ok(());
            }

            // 2-3. 読み込みとレポート生成
            let mut summary = BatchSummary::default();
            for path in &workbooks {
                println!("[2/3] 読み込み中: {}", path.display());
                let book = match Workbook::open(path) {
                    Ok(book) => book,
                    Err(e) => {
                        tracing::warn!("{} を読めません: {}", path.display(), e);
                        summary.failed.push((path.display().to_string(), e.to_string()));
                        continue;
                    }
                };
                println!("✔ {}件の圃場\n", book.records.len());

                println!("[3/3] レポート生成中...");
                let result = export::export_full_reports(&book, &options)
                    .with_context(|| format!("{} のレポート生成に失敗", path.display()))?;
                summary.merge(result);
            }

            print_summary(&summary);
            println!(
                "\n✅ 完了: {}件出力 / {}件失敗 ({})",
                summary.generated.len(),
                summary.failed.len(),
                options.output_dir.display()
            );
        }

        Commands::Page { workbook, number, templates, output, images, field } => {
            let page = pages::Page::from_number(number)
                .with_context(|| format!("ページ番号が不正です: {}", number))?;
            println!("📄 crop-report - ページ {}\n", page);
            let options = options_for(&config, templates, output, images, field);

            println!("[1/2] ブックを読み込み中...");
            let book = Workbook::open(&workbook)?;
            println!("✔ {}件の圃場\n", book.records.len());

            println!("[2/2] ページ生成中...");
            let summary = export::export_pages(&book, page, &options)?;
            print_summary(&summary);
            println!("\n✅ 完了: {}件出力 / {}件失敗", summary.generated.len(), summary.failed.len());
        }

        Commands::Extract { workbook, images, field } => {
            println!("🖼  crop-report - 画像抽出\n");
            let options = options_for(&config, None, None, images, field);

            println!("[1/2] ブックを読み込み中...");
            let book = Workbook::open(&workbook)?;
            println!("✔ {}件の圃場 / 埋め込み画像{}枚\n", book.records.len(), book.images.len());

            println!("[2/2] 画像を抽出中...");
            let summary = export::extract_all_images(&book, &options)?;
            print_summary(&summary);
            println!("\n✅ 完了");
        }

        Commands::Inspect { workbook } => {
            let book = Workbook::open(&workbook)?;

            println!("シート: {}", book.sheet_name);
            println!("列 ({}):", book.headers.len());
            for header in &book.headers {
                println!("  [{}] {}", header.column + 1, header.text);
            }

            println!("\nレコード: {}件", book.records.len());
            for record in &book.records {
                println!("  行{}: {}", record.sheet_row + 1, record.slug());
            }

            let columns = SlotColumns::resolve(&book.headers);
            println!("\n画像スロット ({}/10):", columns.len());
            for (slot, col) in columns.iter() {
                println!("  {} → 列{} ({})", slot, col + 1, slot.file_name());
            }

            println!("\n埋め込み画像: {}枚", book.images.len());
            for image in &book.images {
                let slot = columns
                    .slot_at(image.col)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".into());
                println!(
                    "  行{} 列{} {} ({} bytes) → {}",
                    image.row + 1,
                    image.col + 1,
                    image.media_path,
                    image.data.len(),
                    slot
                );
            }
        }

        Commands::Config { show, set_templates, set_output, set_images } => {
            let mut config = config;

            if let Some(dir) = set_templates {
                config.set_templates_dir(dir)?;
                println!("✔ テンプレートフォルダを設定しました");
            }
            if let Some(dir) = set_output {
                config.set_output_dir(dir)?;
                println!("✔ 出力フォルダを設定しました");
            }
            if let Some(dir) = set_images {
                config.set_images_dir(dir)?;
                println!("✔ 画像フォルダを設定しました");
            }

            if show {
                println!("設定:");
                println!("  テンプレート: {}", config.templates_dir.display());
                println!("  画像: {}", config.images_dir.display());
                println!("  出力: {}", config.output_dir.display());
                println!("  静的ファイル: {}", config.assets_dir);
                println!("  PDFスクリプト: {}", config.pdf_script_url);
                if let Ok(path) = Config::config_path() {
                    println!("  設定ファイル: {}", path.display());
                }
            }
        }
    }

    Ok(())
}
