//! 「PDFダウンロード」ボタンとスクリプト
//!
//! PDF化はブラウザ側の html2pdf.js に任せる。ここでは読み込みタグ、
//! ボタン、クリック時のスクリプトを生成してHTMLに埋め込むだけ。

use crate::error::{Error, Result};
use serde_json::json;

pub const HTML2PDF_CDN_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/html2pdf.js/0.10.1/html2pdf.bundle.min.js";

/// ボタンのid
pub const DOWNLOAD_BUTTON_ID: &str = "downloadPdf";

/// PDF化する範囲のid
pub const CAPTURE_ROOT_ID: &str = "reportContent";

const DOWNLOAD_BUTTON: &str = r#"  <!-- PDF Download Button -->
  <div class="fixed top-4 right-4 z-50">
   <button id="downloadPdf" class="bg-blue-600 hover:bg-blue-700 text-white font-bold py-2 px-4 rounded-lg shadow-lg flex items-center gap-2 transition-colors">
    <i class="fas fa-download"></i>
    Download PDF
   </button>
  </div>"#;

const SCRIPT_HEAD: &str = r#"  <script>
    document.getElementById('downloadPdf').addEventListener('click', function() {
      const button = this;
      button.style.display = 'none';

      const element = document.getElementById('reportContent');
      if (!element) {
        alert('Report content not found!');
        button.style.display = 'flex';
        return;
      }

      const opt = "#;

const SCRIPT_TAIL: &str = r#";

      setTimeout(() => {
        html2pdf()
          .from(element)
          .set(opt)
          .save()
          .then(() => {
            button.style.display = 'flex';
          })
          .catch((error) => {
            console.error('PDF generation failed:', error);
            button.style.display = 'flex';
            alert('PDF generation failed: ' + error.message);
          });
      }, 500);
    });
  </script>"#;

/// html2pdf.js の設定
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub script_url: String,
    pub filename: String,
    pub margin_mm: u32,
    /// CSSの page-break を改ページに使う（複数ページ結合時）
    pub css_page_breaks: bool,
}

impl DownloadOptions {
    /// 単ページ用
    pub fn single_page(script_url: &str, filename: impl Into<String>) -> Self {
        Self {
            script_url: script_url.to_string(),
            filename: filename.into(),
            margin_mm: 5,
            css_page_breaks: false,
        }
    }

    /// 結合レポート用
    pub fn combined(script_url: &str, filename: impl Into<String>) -> Self {
        Self {
            script_url: script_url.to_string(),
            filename: filename.into(),
            margin_mm: 10,
            css_page_breaks: true,
        }
    }

    fn html2pdf_options(&self) -> serde_json::Value {
        let mut opt = json!({
            "margin": self.margin_mm,
            "filename": self.filename,
            "image": { "type": "jpeg", "quality": 0.98 },
            "html2canvas": {
                "scale": 2,
                "useCORS": true,
                "allowTaint": true,
                "letterRendering": true,
                "backgroundColor": "#dbe8f2"
            },
            "jsPDF": { "unit": "mm", "format": "a4", "orientation": "portrait" }
        });
        if self.css_page_breaks {
            opt["pagebreak"] = json!({ "mode": ["avoid-all", "css", "legacy"] });
        }
        opt
    }
}

/// `<script src=...>` タグ
pub fn cdn_script_tag(script_url: &str) -> String {
    format!(r#"<script src="{}"></script>"#, script_url)
}

pub fn download_button() -> &'static str {
    DOWNLOAD_BUTTON
}

/// クリック時のスクリプト
pub fn download_script(options: &DownloadOptions) -> String {
    // JSON文字列中の "</" で script が閉じないようにする
    let opt = format!("{:#}", options.html2pdf_options()).replace("</", "<\\/");
    format!("{}{}{}", SCRIPT_HEAD, opt, SCRIPT_TAIL)
}

/// 単ページHTMLにダウンロード機能を付ける
///
/// head に読み込みタグ、body 直後にボタンとキャプチャ範囲の開始、
/// `</body>` 直前にキャプチャ範囲の終了とスクリプトを入れる。
pub fn attach_download_control(html: &str, options: &DownloadOptions) -> Result<String> {
    let mut out = html.to_string();

    let script_tag = cdn_script_tag(&options.script_url);
    if !out.contains(&script_tag) {
        if let Some(head_end) = out.find("</head>") {
            out.insert_str(head_end, &format!("  {}\n ", script_tag));
        }
    }

    let body_start = out
        .find("<body")
        .ok_or_else(|| Error::Template("<body> タグがありません".into()))?;
    let open_end = out[body_start..]
        .find('>')
        .map(|i| body_start + i + 1)
        .ok_or_else(|| Error::Template("<body> タグが閉じていません".into()))?;
    out.insert_str(
        open_end,
        &format!("\n{}\n  <div id=\"{}\">", DOWNLOAD_BUTTON, CAPTURE_ROOT_ID),
    );

    let body_end = out
        .rfind("</body>")
        .ok_or_else(|| Error::Template("</body> タグがありません".into()))?;
    out.insert_str(
        body_end,
        &format!("  </div>\n{}\n ", download_script(options)),
    );

    Ok(out)
}
