//! 提示词构造
//!
//! 文本阶段的提示词同时要求模型给出插图描述，
//! 因此画风、插图主题都在这里拼入

use crate::domain::ChapterRequest;

/// 系统指令
pub const SYSTEM_INSTRUCTION: &str = "\
You are a senior fiction editor and an accomplished novelist working as one.

Writing:
- Open on a strong hook or in the middle of the action.
- Give the chapter a clear arc: conflict, escalation, and a closing beat that pulls the reader on.
- Prefer concrete sensory detail over summary. Keep the point of view consistent.
- Let inner and outer conflict develop together.

Illustration prompt:
- The central subject is the visual topic given in the request.
- Structure: art style, the subject rendered as a scene, setting details, lighting and technique.
- The image must contain no text. Never ask for a book cover, poster or title card; \
describe a living scene such as a cinematic shot or concept art.

Output:
- Return only a JSON object with the fields title, content, editorAnalysis and imagePrompt.
- Format the chapter content as Markdown using paragraphs, **bold** and *italic*.";

/// 插图描述结尾固定追加的约束
pub fn image_prompt_suffix(art_style: &str) -> String {
    format!(
        "Masterpiece, text-free, no text, no words, no letters, no typography, no watermark, \
         clean illustration, cinematic lighting, style: {}",
        art_style.trim()
    )
}

/// 构造章节生成提示词
pub fn build_chapter_prompt(request: &ChapterRequest) -> String {
    let mut prompt = format!(
        "Write one chapter with these parameters:\n\
         - Book title: {}\n\
         - Genre: {}\n\
         - Chapter name: {}\n\
         - Writing style (tone): {}\n\
         - Plot summary / key beat: {}\n\
         - Length: {}\n\n\
         Match the narrative voice to the requested writing style.\n",
        request.book_title.trim(),
        request.genre.trim(),
        request.chapter_name.trim(),
        request.writing_style.trim(),
        request.plot_summary.trim(),
        request.length_constraint.trim(),
    );

    if let Some(characters) = request.characters() {
        prompt.push_str(&format!(
            "\nCharacters in this chapter:\n\"{}\"\n\
             Keep their appearance, personality and voice consistent with this description.\n",
            characters
        ));
    }

    if let Some(dialogue) = request.dialogue_guidance() {
        prompt.push_str(&format!(
            "\nDialogue guidance requested by the author:\n\"{}\"\n\
             Dialogue must sound natural and follow this reference closely. Use subtext.\n",
            dialogue
        ));
    }

    prompt.push_str(&format!(
        "\nWhen finished, return the chapter text (Markdown), the editor's analysis and an \
         illustration prompt.\n\n\
         Illustration prompt requirements:\n\
         - Subject: '{}'. Depict what it means in the context of the story.\n\
         - Art style: '{}'. Describe that style explicitly.\n\
         - Composition for a {} frame.\n\
         - End the prompt with: \"{}\"\n",
        request.visual_subject(),
        request.image_art_style.trim(),
        request.image_aspect_ratio,
        image_prompt_suffix(&request.image_art_style),
    ));

    prompt
}

/// 不经过模型时使用的插图描述
pub fn fallback_visual_description(request: &ChapterRequest) -> String {
    format!(
        "{}, {}, a vivid scene from the {} story \"{}\". {}",
        request.image_art_style.trim(),
        request.visual_subject(),
        request.genre.trim().to_lowercase(),
        request.book_title.trim(),
        image_prompt_suffix(&request.image_art_style),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ChapterRequest {
        ChapterRequest {
            book_title: "The Salt Road".to_string(),
            genre: "Fantasy".to_string(),
            chapter_name: "The Fall".to_string(),
            plot_summary: "The caravan is ambushed.".to_string(),
            ..ChapterRequest::default()
        }
    }

    #[test]
    fn test_prompt_uses_chapter_name_as_default_subject() {
        let prompt = build_chapter_prompt(&request());
        assert!(prompt.contains("Subject: 'The Fall'"));
        assert!(prompt.contains("16:9"));
        assert!(!prompt.contains("Characters in this chapter"));
    }

    #[test]
    fn test_prompt_includes_optional_sections() {
        let mut request = request();
        request.main_characters = Some("Ines, a tired cartographer".to_string());
        request.dialogue_enhancement = Some("Clipped, dry humour".to_string());
        request.image_custom_topic = Some("A bridge collapsing".to_string());

        let prompt = build_chapter_prompt(&request);
        assert!(prompt.contains("Ines, a tired cartographer"));
        assert!(prompt.contains("Clipped, dry humour"));
        assert!(prompt.contains("Subject: 'A bridge collapsing'"));
    }

    #[test]
    fn test_suffix_names_art_style() {
        let suffix = image_prompt_suffix(" Watercolor ");
        assert!(suffix.starts_with("Masterpiece, text-free"));
        assert!(suffix.ends_with("style: Watercolor"));
    }
}
