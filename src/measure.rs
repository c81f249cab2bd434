use unicode_width::UnicodeWidthStr;

/// Text width capability supplied by the host, e.g. a canvas `measureText`.
pub trait TextMeasurer {
    /// Width of `text` rendered in the CSS `font`.
    fn measure(&self, font: &str, text: &str) -> f64;
}

impl<F> TextMeasurer for F
where
    F: Fn(&str, &str) -> f64,
{
    fn measure(&self, font: &str, text: &str) -> f64 {
        self(font, text)
    }
}

/// Monospace estimate for hosts without font metrics.
///
/// Each display column is `font size * char_ratio` wide; East Asian wide
/// characters and emoji count as two columns.
pub struct TextMetrics {
    pub char_ratio: f64,
    pub fallback_font_size: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_ratio: 0.6,
            fallback_font_size: 12.0,
        }
    }
}

impl TextMetrics {
    pub fn char_width(&self, font: &str) -> f64 {
        font_size(font).unwrap_or(self.fallback_font_size) * self.char_ratio
    }

    pub fn text_width(&self, font: &str, text: &str) -> f64 {
        let width = UnicodeWidthStr::width(text);
        width as f64 * self.char_width(font)
    }
}

impl TextMeasurer for TextMetrics {
    fn measure(&self, font: &str, text: &str) -> f64 {
        self.text_width(font, text)
    }
}

/// Pixel size from a CSS font shorthand such as `bold 13px "Segoe UI"`.
fn font_size(font: &str) -> Option<f64> {
    font.split_whitespace()
        .find_map(|part| part.strip_suffix("px"))
        .and_then(|n| n.parse::<f64>().ok())
        .filter(|n| *n > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_width() {
        let m = TextMetrics::default();
        assert_eq!(m.text_width("10px mono", "User"), 4.0 * 6.0);
    }

    #[test]
    fn test_unicode_width() {
        let m = TextMetrics::default();
        // 全角文字は幅2
        assert_eq!(m.text_width("10px mono", "ユーザー"), 8.0 * 6.0);
    }

    #[test]
    fn test_mixed_width() {
        let m = TextMetrics::default();
        // "User" (4) + "テスト" (6) = 10
        assert_eq!(m.text_width("10px mono", "Userテスト"), 10.0 * 6.0);
    }

    #[test]
    fn test_font_size_parsing() {
        assert_eq!(font_size(r#"bold 13px "Segoe UI", system-ui"#), Some(13.0));
        assert_eq!(font_size("monospace"), None);
        let m = TextMetrics::default();
        assert_eq!(m.char_width("monospace"), 12.0 * 0.6);
    }

    #[test]
    fn test_closure_measurer() {
        let measurer = |_font: &str, text: &str| text.len() as f64;
        assert_eq!(measurer.measure("any", "abc"), 3.0);
    }
}
