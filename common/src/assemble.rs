//! 単ページHTMLを1つのレポートに結合
//!
//! 1. 各ページの `<body>` の中身を取り出す
//! 2. ダウンロードボタンとスクリプトを除去
//! 3. 画像パスを出力先ディレクトリ基準に付け替え
//! 4. ページ順に改ページを挟んで連結し、ボタンとスクリプトを最後に1回だけ付ける

use crate::pdf_control::{
    cdn_script_tag, download_button, download_script, DownloadOptions, CAPTURE_ROOT_ID,
    DOWNLOAD_BUTTON_ID,
};
use crate::types::Slot;

/// 改ページマーカー
pub const PAGE_BREAK: &str = r#"<div class="page-break"></div>"#;

const SHELL_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8"/>
    <meta content="width=device-width, initial-scale=1" name="viewport"/>
    <title>SiDRA Hub Crop Report</title>
    <script src="https://cdn.tailwindcss.com"></script>
    <link href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/5.15.3/css/all.min.css" rel="stylesheet"/>
"#;

const SHELL_STYLE: &str = r#"    <style>
        @media print {
            .page-break {
                page-break-after: always;
            }
        }
        .page {
            margin-bottom: 40px;
        }
    </style>
</head>
<body class="bg-gray-100">
"#;

/// 結合対象のページ
#[derive(Debug, Clone)]
pub struct PageFragment {
    /// ページ識別子（"page1" など、divのidに使う）
    pub name: String,
    pub html: String,
}

/// 画像パス付け替えの規則
#[derive(Debug, Clone)]
pub struct RebaseRules {
    /// 出力先から見た作業ディレクトリへの接頭辞（"../" など）
    pub prefix: String,
    pub images_dir: String,
    pub assets_dir: String,
    pub field_slug: String,
}

impl RebaseRules {
    /// 出力先が作業ディレクトリの1階層下にある場合
    pub fn one_level_up(field_slug: impl Into<String>) -> Self {
        Self {
            prefix: "../".into(),
            images_dir: "images".into(),
            assets_dir: "assest".into(),
            field_slug: field_slug.into(),
        }
    }
}

/// 結合結果
#[derive(Debug, Clone)]
pub struct AssembledReport {
    pub html: String,
    /// 結合したページ
    pub included: Vec<String>,
    /// body が見つからず飛ばしたページ
    pub skipped: Vec<String>,
}

/// `<body ...>` と `</body>` の間
pub fn extract_body(html: &str) -> Option<&str> {
    let start = html.find("<body")?;
    let open_end = start + html[start..].find('>')? + 1;
    let end = html.rfind("</body>")?;
    if end < open_end {
        return None;
    }
    Some(html[open_end..end].trim())
}

/// ダウンロードボタンを囲む div を除去し、キャプチャ範囲のidを外す
pub fn strip_download_controls(body: &str) -> String {
    let marker = format!("id=\"{}\"", DOWNLOAD_BUTTON_ID);
    let mut out = body.replace("<!-- PDF Download Button -->", "");

    while let Some(idx) = out.find(&marker) {
        let div_start = out[..idx].rfind("<div");
        let div_end = out[idx..].find("</div>").map(|e| idx + e + "</div>".len());
        match (div_start, div_end) {
            (Some(start), Some(end)) => out.replace_range(start..end, ""),
            _ => out = out.replacen(&marker, "", 1),
        }
    }

    out.replace(&format!(" id=\"{}\"", CAPTURE_ROOT_ID), "")
}

/// `<script>...</script>` を全て除去
pub fn strip_scripts(body: &str) -> String {
    let mut out = body.to_string();
    while let Some(start) = out.find("<script") {
        match out[start..].find("</script>") {
            Some(len) => out.replace_range(start..start + len + "</script>".len(), ""),
            None => break,
        }
    }
    out
}

/// 絶対パスのリンクには接頭辞を付けない
fn prefix_for<'a>(prefix: &'a str, dir: &str) -> &'a str {
    let bytes = dir.as_bytes();
    let absolute = dir.starts_with('/') || (bytes.len() > 1 && bytes[1] == b':');
    if absolute {
        ""
    } else {
        prefix
    }
}

/// 作業ディレクトリ基準の相対パスを出力先基準に付け替える
pub fn rebase_paths(body: &str, rules: &RebaseRules) -> String {
    let images = &rules.images_dir;
    let assets = &rules.assets_dir;
    let ip = prefix_for(&rules.prefix, images);
    let ap = prefix_for(&rules.prefix, assets);

    let mut out = body
        .replace(&format!("src=\"{}\\", images), &format!("src=\"{}{}/", ip, images))
        .replace(&format!("src=\"{}/", images), &format!("src=\"{}{}/", ip, images))
        .replace(&format!("src=\"{}/", assets), &format!("src=\"{}{}/", ap, assets));

    if !ap.is_empty() {
        out = out.replace(&format!("src=\"{}{}{}/", ap, ap, assets), &format!("src=\"{}{}/", ap, assets));
    }
    if !ip.is_empty() {
        out = out.replace(&format!("src=\"{}{}{}/", ip, ip, images), &format!("src=\"{}{}/", ip, images));
    }

    // 圃場共通の画像パスを圃場別に
    for slot in Slot::all() {
        let file = slot.file_name();
        let generic = format!("src=\"{}{}/{}\"", ip, images, file);
        let specific = format!("src=\"{}{}/{}/{}\"", ip, images, rules.field_slug, file);
        out = out.replace(&generic, &specific);
    }

    out
}

/// ページ断片を1つのHTMLに結合
pub fn assemble_report(
    pages: &[PageFragment],
    rules: &RebaseRules,
    download: &DownloadOptions,
) -> AssembledReport {
    let mut included = Vec::new();
    let mut skipped = Vec::new();
    let mut sections = Vec::new();

    for page in pages {
        let Some(body) = extract_body(&page.html) else {
            skipped.push(page.name.clone());
            continue;
        };
        let body = strip_download_controls(body);
        let body = strip_scripts(&body);
        let body = rebase_paths(&body, rules);

        sections.push(format!(
            "        <div class=\"page\" id=\"{}\">\n            {}\n        </div>",
            page.name,
            body.trim()
        ));
        included.push(page.name.clone());
    }

    let mut html = String::new();
    html.push_str(SHELL_HEAD);
    html.push_str(&format!("    {}\n", cdn_script_tag(&download.script_url)));
    html.push_str(SHELL_STYLE);
    html.push_str(download_button());
    html.push_str(&format!("\n\n    <div id=\"{}\">\n", CAPTURE_ROOT_ID));
    html.push_str(&sections.join(&format!("\n        {}\n", PAGE_BREAK)));
    html.push_str("\n    </div>\n\n");
    html.push_str(&download_script(download));
    html.push_str("\n</body>\n</html>\n");

    AssembledReport {
        html,
        included,
        skipped,
    }
}
