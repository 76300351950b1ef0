//! 打印页面
//!
//! 遍历内容模型生成独立的 HTML 页面，加载后自动唤起打印对话框

use std::fmt::Write;

use crate::domain::manuscript::{Manuscript, SpanStyle};

const PRINT_STYLE: &str = "\
@page { margin: 2.5cm; }
body { font-family: 'Merriweather', Georgia, serif; font-size: 12pt; line-height: 1.6; color: #000; background: #fff; max-width: 42em; margin: 0 auto; }
h1 { text-align: center; font-size: 2em; line-height: 1.2; margin: 0 0 1.5em; }
p { text-align: justify; margin: 0 0 1em; }
strong { font-weight: bold; }
em { font-style: italic; }
@media print { body { max-width: none; } }";

/// 渲染打印页面
pub fn render_print_page(title: &str, manuscript: &Manuscript) -> String {
    let title = html_escape::encode_text(title);
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{}</title>", title);
    let _ = writeln!(html, "<style>\n{}\n</style>", PRINT_STYLE);
    html.push_str("</head>\n<body>\n");
    let _ = writeln!(html, "<h1>{}</h1>", title);
    html.push_str(&render_blocks(manuscript));
    html.push_str("<script>window.addEventListener('load', function () { window.print(); });</script>\n");
    html.push_str("</body>\n</html>\n");
    html
}

/// 段落渲染为 `<p>`，粗体 / 斜体分别为 `<strong>` / `<em>`，段内换行为 `<br>`
pub fn render_blocks(manuscript: &Manuscript) -> String {
    let mut html = String::new();
    for block in manuscript.blocks() {
        html.push_str("<p>");
        for span in block.spans() {
            let text = html_escape::encode_text(span.text()).replace('\n', "<br>\n");
            match span.style() {
                SpanStyle::Plain => html.push_str(&text),
                SpanStyle::Bold => {
                    let _ = write!(html, "<strong>{}</strong>", text);
                }
                SpanStyle::Italic => {
                    let _ = write!(html, "<em>{}</em>", text);
                }
            }
        }
        html.push_str("</p>\n");
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_to_html() {
        let doc = Manuscript::parse("**Hello** *world*\n\nline one\nline two");
        assert_eq!(
            render_blocks(&doc),
            "<p><strong>Hello</strong> <em>world</em></p>\n<p>line one<br>\nline two</p>\n"
        );
    }

    #[test]
    fn test_literal_text_is_escaped() {
        let doc = Manuscript::parse("<script>alert(1)</script> & **<b>**");
        let html = render_blocks(&doc);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt; &amp; "));
        assert!(html.contains("<strong>&lt;b&gt;</strong>"));
    }

    #[test]
    fn test_print_page_invokes_print() {
        let page = render_print_page("Fire & Ice", &Manuscript::parse("Body"));
        assert!(page.contains("<title>Fire &amp; Ice</title>"));
        assert!(page.contains("<h1>Fire &amp; Ice</h1>"));
        assert!(page.contains("window.print()"));
        assert!(page.contains("@page"));
    }
}
