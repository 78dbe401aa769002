//! HTMLテンプレートへの差し込み
//!
//! プレースホルダーは完全一致の部分文字列。テンプレート側で既に
//! 削除されているプレースホルダーはエラーにせず記録だけ残す。

/// HTMLエスケープ
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// テンプレート差し込み器
#[derive(Debug, Clone)]
pub struct TemplateFiller {
    html: String,
    missing: Vec<String>,
}

impl TemplateFiller {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            html: template.into(),
            missing: Vec::new(),
        }
    }

    /// HTML断片をそのまま差し込む
    pub fn replace(&mut self, placeholder: &str, html: &str) -> &mut Self {
        if placeholder.is_empty() || !self.html.contains(placeholder) {
            self.missing.push(placeholder.to_string());
            return self;
        }
        self.html = self.html.replace(placeholder, html);
        self
    }

    /// テキスト値をエスケープして差し込む
    pub fn replace_text(&mut self, placeholder: &str, text: &str) -> &mut Self {
        let escaped = escape_html(text);
        self.replace(placeholder, &escaped)
    }

    /// 見つからなかったプレースホルダー
    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// 任意の変換を適用（正規表現での除去など）
    pub fn transform<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&str) -> String,
    {
        self.html = f(&self.html);
        self
    }

    pub fn into_parts(self) -> (String, Vec<String>) {
        (self.html, self.missing)
    }

    pub fn into_html(self) -> String {
        self.html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
        assert_eq!(escape_html("Irrigate within 3 days"), "Irrigate within 3 days");
    }

    #[test]
    fn test_replace_all_occurrences() {
        let mut filler = TemplateFiller::new("<p>NDVI ADVISORY</p><p>NDVI ADVISORY</p>");
        filler.replace_text("NDVI ADVISORY", "Healthy");
        assert_eq!(filler.html(), "<p>Healthy</p><p>Healthy</p>");
        assert!(filler.missing().is_empty());
    }

    #[test]
    fn test_missing_placeholder_is_skipped() {
        let mut filler = TemplateFiller::new("<p>OLD NDMI VALUE</p>");
        filler
            .replace_text("NDMI change", "0.1")
            .replace_text("OLD NDMI VALUE", "0.2");
        assert_eq!(filler.html(), "<p>0.2</p>");
        assert_eq!(filler.missing(), &["NDMI change".to_string()]);
    }

    #[test]
    fn test_order_matters_for_overlapping_tokens() {
        let mut filler = TemplateFiller::new("OLD RECI VALUE / RECI VALUE");
        filler
            .replace_text("OLD RECI VALUE", "1.1")
            .replace_text("RECI VALUE", "1.4");
        assert_eq!(filler.into_html(), "1.1 / 1.4");
    }

    #[test]
    fn test_text_values_are_escaped() {
        let mut filler = TemplateFiller::new("<span>crop</span>");
        filler.replace_text("crop", "<b>Maize</b>");
        assert_eq!(filler.html(), "<span>&lt;b&gt;Maize&lt;/b&gt;</span>");
    }
}
