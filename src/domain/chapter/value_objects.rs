//! Chapter Context - Value Objects

use serde::{Deserialize, Serialize};

use super::ChapterError;

/// 默认篇幅要求
pub const DEFAULT_LENGTH_CONSTRAINT: &str = "About 1500 words, dense and detailed.";
/// 默认写作风格
pub const DEFAULT_WRITING_STYLE: &str = "Standard (Balanced)";
/// 默认插图风格
pub const DEFAULT_ART_STYLE: &str = "Cinematic (Standard)";

/// 插图宽高比
///
/// 原样透传给图片生成服务，不做任何换算
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 横版 / 电影画幅
    #[default]
    #[serde(rename = "16:9")]
    Widescreen,
    /// 竖版 / 封面
    #[serde(rename = "3:4")]
    PortraitTall,
    /// 方形
    #[serde(rename = "1:1")]
    Square,
    /// 手机竖屏
    #[serde(rename = "9:16")]
    PortraitMobile,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 4] = [
        AspectRatio::Widescreen,
        AspectRatio::PortraitTall,
        AspectRatio::Square,
        AspectRatio::PortraitMobile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Widescreen => "16:9",
            AspectRatio::PortraitTall => "3:4",
            AspectRatio::Square => "1:1",
            AspectRatio::PortraitMobile => "9:16",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ratio| ratio.as_str() == s.trim())
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AspectRatio {
    type Error = ChapterError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_str(value).ok_or_else(|| ChapterError::InvalidAspectRatio(value.to_string()))
    }
}

/// 章节生成请求
///
/// 表单提交的一次生成参数。缺失的字段在反序列化时取内置默认值，
/// 因此旧版本保存的默认参数加载后仍然是完整的请求。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChapterRequest {
    pub book_title: String,
    pub genre: String,
    pub chapter_name: String,
    pub plot_summary: String,
    /// 角色设定（可选）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_characters: Option<String>,
    pub length_constraint: String,
    pub writing_style: String,
    /// 对白风格参考（可选）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialogue_enhancement: Option<String>,
    pub image_aspect_ratio: AspectRatio,
    pub image_art_style: String,
    /// 自定义插图主题（可选，为空时使用章节名）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_custom_topic: Option<String>,
}

impl Default for ChapterRequest {
    fn default() -> Self {
        Self {
            book_title: String::new(),
            genre: String::new(),
            chapter_name: String::new(),
            plot_summary: String::new(),
            main_characters: None,
            length_constraint: DEFAULT_LENGTH_CONSTRAINT.to_string(),
            writing_style: DEFAULT_WRITING_STYLE.to_string(),
            dialogue_enhancement: None,
            image_aspect_ratio: AspectRatio::default(),
            image_art_style: DEFAULT_ART_STYLE.to_string(),
            image_custom_topic: None,
        }
    }
}

impl ChapterRequest {
    /// 校验必填字段
    ///
    /// 返回第一个为空（或仅含空白）的必填字段
    pub fn validate(&self) -> Result<(), ChapterError> {
        let required = [
            ("bookTitle", &self.book_title),
            ("genre", &self.genre),
            ("chapterName", &self.chapter_name),
            ("plotSummary", &self.plot_summary),
            ("lengthConstraint", &self.length_constraint),
            ("writingStyle", &self.writing_style),
            ("imageArtStyle", &self.image_art_style),
        ];

        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(ChapterError::MissingField(*name)),
            None => Ok(()),
        }
    }

    pub fn is_submittable(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn characters(&self) -> Option<&str> {
        non_blank(&self.main_characters)
    }

    pub fn dialogue_guidance(&self) -> Option<&str> {
        non_blank(&self.dialogue_enhancement)
    }

    /// 插图主题：优先使用自定义主题，否则回退到章节名
    pub fn visual_subject(&self) -> &str {
        non_blank(&self.image_custom_topic).unwrap_or(self.chapter_name.trim())
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// 文本生成结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterResponse {
    title: String,
    /// Markdown 正文
    content: String,
    editor_analysis: String,
    image_prompt: String,
}

impl ChapterResponse {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        editor_analysis: impl Into<String>,
        image_prompt: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            editor_analysis: editor_analysis.into(),
            image_prompt: image_prompt.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn editor_analysis(&self) -> &str {
        &self.editor_analysis
    }

    pub fn image_prompt(&self) -> &str {
        &self.image_prompt
    }

    /// 修改标题，返回新值
    pub fn with_title(&self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self.clone()
        }
    }
}

/// 图片引用（URL 或 data URI）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageHandle(String);

impl ImageHandle {
    pub fn new(uri: impl Into<String>) -> Result<Self, ChapterError> {
        let uri = uri.into();
        if uri.trim().is_empty() {
            return Err(ChapterError::InvalidImageHandle);
        }
        Ok(Self(uri))
    }

    /// 由 base64 数据构造 data URI
    pub fn from_base64(mime_type: &str, data: &str) -> Result<Self, ChapterError> {
        if data.is_empty() {
            return Err(ChapterError::InvalidImageHandle);
        }
        Ok(Self(format!("data:{};base64,{}", mime_type, data)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_data_uri(&self) -> bool {
        self.0.starts_with("data:")
    }

    /// data URI 的 MIME 类型
    pub fn media_type(&self) -> Option<&str> {
        let rest = self.0.strip_prefix("data:")?;
        let end = rest.find([';', ','])?;
        Some(&rest[..end]).filter(|m| !m.is_empty())
    }

    /// data URI 中 base64 编码的数据部分
    pub fn base64_payload(&self) -> Option<&str> {
        let rest = self.0.strip_prefix("data:")?;
        let (meta, data) = rest.split_once(',')?;
        meta.ends_with(";base64").then_some(data)
    }
}

impl std::fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> ChapterRequest {
        ChapterRequest {
            book_title: "The Salt Road".to_string(),
            genre: "Fantasy".to_string(),
            chapter_name: "The Fall".to_string(),
            plot_summary: "The caravan is ambushed at the pass.".to_string(),
            ..ChapterRequest::default()
        }
    }

    #[test]
    fn test_default_request_is_not_submittable() {
        let request = ChapterRequest::default();
        assert_eq!(request.validate(), Err(ChapterError::MissingField("bookTitle")));
        assert!(!request.is_submittable());
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let mut request = valid_request();
        request.plot_summary = "   \n ".to_string();
        assert_eq!(request.validate(), Err(ChapterError::MissingField("plotSummary")));
    }

    #[test]
    fn test_optional_fields_do_not_block_submission() {
        let request = valid_request();
        assert!(request.validate().is_ok());
        assert!(request.characters().is_none());
    }

    #[test]
    fn test_visual_subject_falls_back_to_chapter_name() {
        let mut request = valid_request();
        assert_eq!(request.visual_subject(), "The Fall");

        request.image_custom_topic = Some("  ".to_string());
        assert_eq!(request.visual_subject(), "The Fall");

        request.image_custom_topic = Some("A burning bridge at dusk".to_string());
        assert_eq!(request.visual_subject(), "A burning bridge at dusk");
    }

    #[test]
    fn test_partial_defaults_merge_over_builtin_values() {
        let json = r#"{"genre": "Noir", "imageAspectRatio": "9:16"}"#;
        let request: ChapterRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.genre, "Noir");
        assert_eq!(request.image_aspect_ratio, AspectRatio::PortraitMobile);
        assert_eq!(request.book_title, "");
        assert_eq!(request.length_constraint, DEFAULT_LENGTH_CONSTRAINT);
        assert_eq!(request.writing_style, DEFAULT_WRITING_STYLE);
        assert_eq!(request.image_art_style, DEFAULT_ART_STYLE);
    }

    #[test]
    fn test_request_uses_camel_case_keys() {
        let json = serde_json::to_value(valid_request()).unwrap();
        assert_eq!(json["bookTitle"], "The Salt Road");
        assert_eq!(json["imageAspectRatio"], "16:9");
        assert!(json.get("mainCharacters").is_none());
    }

    #[test]
    fn test_aspect_ratio_parsing() {
        assert_eq!(AspectRatio::from_str("3:4"), Some(AspectRatio::PortraitTall));
        assert_eq!(AspectRatio::from_str("1:1"), Some(AspectRatio::Square));
        assert!(AspectRatio::try_from("4:3").is_err());
    }

    #[test]
    fn test_with_title_returns_new_value() {
        let response = ChapterResponse::new("Old", "Body", "Notes", "Prompt");
        let renamed = response.with_title("New");

        assert_eq!(response.title(), "Old");
        assert_eq!(renamed.title(), "New");
        assert_eq!(renamed.content(), "Body");
    }

    #[test]
    fn test_image_handle_data_uri() {
        let handle = ImageHandle::from_base64("image/jpeg", "AAEC").unwrap();
        assert_eq!(handle.as_str(), "data:image/jpeg;base64,AAEC");
        assert!(handle.is_data_uri());
        assert_eq!(handle.media_type(), Some("image/jpeg"));
        assert_eq!(handle.base64_payload(), Some("AAEC"));

        let remote = ImageHandle::new("https://cdn.example.com/a.jpg").unwrap();
        assert_eq!(remote.media_type(), None);
        assert!(ImageHandle::new("").is_err());
    }
}
