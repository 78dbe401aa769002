//! 2〜6ページ目: 植生指数の新旧比較

use super::RenderContext;
use crop_report_common::{
    escape_html, format_day_first, resolve, Epoch, FieldRecord, Slot, TemplateFiller, VegetationIndex,
    NOT_AVAILABLE,
};
use regex::Regex;
use tracing::debug;

lazy_static::lazy_static! {
    // 「Value: ... (Change: ...)」の段落
    static ref VALUE_CHANGE_RE: Regex = Regex::new(
        r#"<p class="mt-2">\s*Value:[^<]*<span class="font-bold">\s*[^<]*</span>\s*<span>\s*\(Change:\s*</span>\s*<span class="font-bold">\s*[^<]*</span>\s*<span>\s*\)\s*</span>\s*</p>"#
    ).unwrap();
}

fn image_tag(index: VegetationIndex, epoch: Epoch, src: &str) -> String {
    let alt = match epoch {
        Epoch::Old => format!("Old {}", index.code()),
        Epoch::Current => format!("Current {}", index.code()),
    };
    format!(
        r#"<img alt="{}" class="w-[220px] h-[220px] object-cover" height="220" src="{}" width="220"/>"#,
        alt, src
    )
}

fn value_text<S: AsRef<str>>(record: &FieldRecord, headers: &[S]) -> String {
    resolve(record, headers).text_or(NOT_AVAILABLE, NOT_AVAILABLE)
}

fn date_text(index: VegetationIndex, epoch: Epoch, record: &FieldRecord) -> String {
    let headers = index.image_date_headers(epoch);
    let resolution = resolve(record, &headers);
    let text = format_day_first(resolution.value());
    if text == NOT_AVAILABLE {
        debug!("{} {} の撮影日なし ({:?})", index, epoch.key(), resolution);
    }
    text
}

/// 変化量の段落を取り除く
pub(crate) fn remove_value_change(html: &str) -> String {
    VALUE_CHANGE_RE.replace_all(html, "").into_owned()
}

pub(super) fn fill(
    index: VegetationIndex,
    template: &str,
    record: &FieldRecord,
    ctx: &RenderContext,
) -> TemplateFiller {
    let code = index.code();
    let image_dir = escape_html(&ctx.links.image_dir);
    let asset_dir = escape_html(&ctx.links.asset_dir);

    let mut filler = TemplateFiller::new(template);
    filler
        .replace_text("IMAGE DATE1", &date_text(index, Epoch::Old, record))
        .replace_text("IMAGE DATE2", &date_text(index, Epoch::Current, record));

    for epoch in [Epoch::Old, Epoch::Current] {
        let src = format!("{}/{}", image_dir, Slot::new(index, epoch).file_name());
        filler.replace(&image_tag(index, epoch, " "), &image_tag(index, epoch, &src));
    }

    filler.replace(
        "src=\"/assest/farmland.png\"",
        &format!("src=\"{}/farmland.png\"", asset_dir),
    );

    // 旧値のプレースホルダーは現値のものを含むので先に置換
    filler
        .replace_text(&format!("OLD {} VALUE", code), &value_text(record, &index.value_headers(Epoch::Old)))
        .replace_text(&format!("{} VALUE", code), &value_text(record, &index.value_headers(Epoch::Current)))
        .replace_text(&format!("{} change", code), &value_text(record, &index.change_headers()))
        .replace_text(&format!("{} ADVISORY", code), &value_text(record, &index.advisory_headers()));

    if !index.shows_change() {
        filler.transform(remove_value_change);
    }

    filler
}
