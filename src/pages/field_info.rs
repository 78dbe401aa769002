//! 1ページ目: 圃場情報

use super::RenderContext;
use crop_report_common::resolver::fields;
use crop_report_common::{escape_html, format_iso, FieldRecord, LogicalField, Resolution, TemplateFiller, NOT_AVAILABLE};
use tracing::debug;

/// 情報欄（ラベル, テンプレート上の値, 差し替え後のラベル）
const INFO_ROWS: [(&str, &str, &str); 6] = [
    ("Field Name:", "Field", "Field Name:"),
    ("Crop Name:", "crop", "Crop Name:"),
    ("Sowing Date:", "Sowing/planting", "Sowing Date:"),
    ("Report Date:", "Current date", "Report Date:"),
    ("Area Coverage (in Acre):", "Area", "Area Coverage:"),
    ("Growth Stage:", "Maturity", "Growth Stage:"),
];

/// 見た目の調整（ロゴの切り抜き解除と余白）
const LAYOUT_TWEAKS: [(&str, &str); 5] = [
    (
        r#"<img alt="SiRDA_Logo" class="absolute top-6 left-6 rounded-lg w-[300px] h-[60px] object-cover""#,
        r#"<img alt="SiRDA_Logo" class="absolute top-6 left-6 w-[300px] h-[60px] object-contain""#,
    ),
    (
        r#"<img alt="KSRCT_Logo" class="absolute top-6 right-6 rounded-lg w-[60px] h-[60px] object-cover""#,
        r#"<img alt="KSRCT_Logo" class="absolute top-6 right-6 w-[60px] h-[60px] object-contain""#,
    ),
    (
        r#"<h1 class="text-[72px] font-sans font-normal text-[#1f2937] text-center mt-20">"#,
        r#"<h1 class="text-[72px] font-sans font-normal text-[#1f2937] text-center mt-20 mb-8">"#,
    ),
    (
        r#"<div class="max-w-[600px] mx-auto mt-8 rounded-3xl overflow-hidden">"#,
        r#"<div class="max-w-[600px] mx-auto mt-8 mb-6 rounded-3xl overflow-hidden">"#,
    ),
    (
        r#"<div class="flex justify-center items-center mt-4 text-black font-extrabold text-lg">"#,
        r#"<div class="flex justify-center items-center mt-4 mb-6 text-black font-extrabold text-lg">"#,
    ),
];

fn info_block(label: &str, value: &str) -> String {
    format!(
        "<div class=\"text-gray-600 font-semibold flex justify-between\">\n      <span>\n       {}\n      </span>\n      <span class=\"font-extrabold\">\n       {}\n      </span>\n     </div>",
        label, value
    )
}

fn filled_block(label: &str, value: &str) -> String {
    format!(
        "<div class=\"text-gray-600 font-semibold\">\n      <span>{} </span>\n      <span class=\"font-extrabold\">{}</span>\n     </div>",
        label,
        escape_html(value)
    )
}

/// 日付項目（YYYY-MM-DD）。値はあるが日付として読めなければ N/A
fn date_text(field: &LogicalField, record: &FieldRecord, absent: &str, blank: &str) -> String {
    match field.resolve(record) {
        Resolution::Found { header, value } => format_iso(value).unwrap_or_else(|| {
            debug!("{}: 日付として解釈できません {:?} ({})", field.name, value.display(), header);
            NOT_AVAILABLE.to_string()
        }),
        Resolution::Blank => blank.to_string(),
        Resolution::Absent => absent.to_string(),
    }
}

fn text(field: &LogicalField, record: &FieldRecord) -> String {
    let resolution = field.resolve(record);
    if !matches!(resolution, Resolution::Found { .. }) {
        debug!("{}: 既定値を使用 ({:?})", field.name, resolution);
    }
    resolution.text_or(field.absent_default, field.blank_default)
}

pub(super) fn fill(template: &str, record: &FieldRecord, ctx: &RenderContext) -> TemplateFiller {
    let today = ctx.today.format("%Y-%m-%d").to_string();

    let field_name = text(&fields::FIELD_NAME, record);
    let values = [
        field_name.clone(),
        text(&fields::CROP, record),
        date_text(
            &fields::SOWING_DATE,
            record,
            fields::SOWING_DATE.absent_default,
            fields::SOWING_DATE.blank_default,
        ),
        date_text(&fields::REPORT_DATE, record, &today, &today),
        text(&fields::AREA_COVERAGE, record),
        text(&fields::GROWTH_STAGE, record),
    ];

    let mut filler = TemplateFiller::new(template);
    filler.replace_text("Field Information", &format!("{} Information", field_name));

    for ((label, token, new_label), value) in INFO_ROWS.iter().zip(values.iter()) {
        filler.replace(&info_block(label, token), &filled_block(new_label, value));
    }

    for (from, to) in LAYOUT_TWEAKS {
        filler.replace(from, to);
    }

    let asset_dir = escape_html(&ctx.links.asset_dir);
    filler
        .replace(" field images ", &format!("{}/farmland.png", asset_dir))
        .replace("src=\"/assest/", &format!("src=\"{}/", asset_dir));

    filler
}
