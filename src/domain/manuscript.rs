//! 正文内容模型
//!
//! 将受限的 Markdown 子集（段落、粗体、斜体）解析为结构化的段落 / 片段树。
//! 所有导出格式和页面渲染都基于同一棵树，强调样式只在这里判定一次。

use once_cell::sync::Lazy;
use regex::Regex;

/// 阅读速度（字/分钟）
pub const WORDS_PER_MINUTE: usize = 200;

/// 片段样式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanStyle {
    Plain,
    Bold,
    Italic,
}

/// 片段 - 一段样式相同的连续文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    style: SpanStyle,
    text: String,
}

impl Span {
    pub fn new(style: SpanStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(SpanStyle::Plain, text)
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self::new(SpanStyle::Bold, text)
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self::new(SpanStyle::Italic, text)
    }

    pub fn style(&self) -> SpanStyle {
        self.style
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_bold(&self) -> bool {
        self.style == SpanStyle::Bold
    }

    pub fn is_italic(&self) -> bool {
        self.style == SpanStyle::Italic
    }
}

/// 段落 - 由空行分隔的最小排版单位
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    spans: Vec<Span>,
}

impl Block {
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// 去除强调标记后的文本
    pub fn text(&self) -> String {
        self.spans.iter().map(Span::text).collect()
    }
}

/// 解析后的正文
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manuscript {
    blocks: Vec<Block>,
}

impl Manuscript {
    pub fn parse(markdown: &str) -> Self {
        let blocks = split_blocks(markdown)
            .into_iter()
            .map(|text| Block {
                spans: parse_inline(&text),
            })
            .collect();
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// 纯文本：去掉强调标记和残留的标题 / 链接 / 代码语法，段落之间空一行
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|block| strip_literal_syntax(&block.text()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn word_count(&self) -> usize {
        self.plain_text().split_whitespace().count()
    }

    /// 预计阅读时间（分钟，向上取整）
    pub fn reading_minutes(&self) -> usize {
        self.word_count().div_ceil(WORDS_PER_MINUTE)
    }
}

/// 解析 Markdown 文本（便捷方法）
pub fn parse(markdown: &str) -> Manuscript {
    Manuscript::parse(markdown)
}

/// 按空行分段
///
/// 只含空白的行视为空行；连续多个空行等同于一个；空段落丢弃
fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            flush_block(&mut current, &mut blocks);
        } else {
            current.push(line);
        }
    }
    flush_block(&mut current, &mut blocks);

    blocks
}

fn flush_block(lines: &mut Vec<&str>, blocks: &mut Vec<String>) {
    if lines.is_empty() {
        return;
    }
    let block = lines.join("\n");
    let trimmed = block.trim();
    if !trimmed.is_empty() {
        blocks.push(trimmed.to_string());
    }
    lines.clear();
}

/// 行内强调解析
///
/// 从左到右扫描，同一位置优先匹配粗体；不支持嵌套，
/// 无法配对的标记按字面保留
fn parse_inline(text: &str) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    let mut plain = String::new();
    let mut rest = text;

    while let Some(pos) = rest.find('*') {
        let (before, from_marker) = rest.split_at(pos);
        plain.push_str(before);

        match match_emphasis(from_marker) {
            Some((style, inner, consumed)) => {
                push_span(&mut spans, Span::plain(std::mem::take(&mut plain)));
                push_span(&mut spans, Span::new(style, inner));
                rest = &from_marker[consumed..];
            }
            None => {
                plain.push('*');
                rest = &from_marker[1..];
            }
        }
    }

    plain.push_str(rest);
    push_span(&mut spans, Span::plain(plain));
    spans
}

/// 在标记位置尝试匹配强调片段，返回 (样式, 内容, 消耗的字节数)
///
/// 强调内容不能为空，不能跨行，首尾不能是空白（`2 * 3 * 4` 保持字面）
fn match_emphasis(s: &str) -> Option<(SpanStyle, &str, usize)> {
    if let Some(body) = s.strip_prefix("**") {
        if let Some(end) = body.find("**") {
            let inner = &body[..end];
            if is_valid_run(inner) {
                return Some((SpanStyle::Bold, inner, end + 4));
            }
        }
    }

    let body = s.strip_prefix('*')?;
    let end = body.find('*')?;
    let inner = &body[..end];
    if !is_valid_run(inner) {
        return None;
    }
    Some((SpanStyle::Italic, inner, end + 2))
}

#[inline]
fn is_valid_run(inner: &str) -> bool {
    !inner.is_empty()
        && !inner.contains('\n')
        && !inner.starts_with(char::is_whitespace)
        && !inner.ends_with(char::is_whitespace)
}

/// 追加片段，相邻的纯文本片段合并
fn push_span(spans: &mut Vec<Span>, span: Span) {
    if span.text.is_empty() {
        return;
    }
    if span.style == SpanStyle::Plain {
        if let Some(last) = spans.last_mut() {
            if last.style == SpanStyle::Plain {
                last.text.push_str(&span.text);
                return;
            }
        }
    }
    spans.push(span);
}

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#{1,6}[ \t]+").expect("valid header regex"));
static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("valid link regex"));

/// 去除正文中不支持的 Markdown 字面语法（标题、链接、代码反引号）
pub fn strip_literal_syntax(text: &str) -> String {
    let without_headers = HEADER_RE.replace_all(text, "");
    let without_links = LINK_RE.replace_all(&without_headers, "$1");
    without_links.replace('`', "")
}
