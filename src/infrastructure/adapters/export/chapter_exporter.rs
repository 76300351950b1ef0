//! Chapter Exporter - DocumentExporterPort 实现

use base64::Engine;

use super::docx::build_docx;
use super::html::render_print_page;
use crate::application::ports::{
    derive_filename, DocumentExporterPort, ExportArtifact, ExportError, ExportFormat,
};
use crate::domain::manuscript::Manuscript;
use crate::domain::ImageHandle;

/// 章节导出器
///
/// 所有格式都从同一棵内容模型树生成；Markdown 格式例外，正文原样输出
#[derive(Debug, Clone, Copy, Default)]
pub struct ChapterExporter;

impl ChapterExporter {
    pub fn new() -> Self {
        Self
    }

    fn render(
        &self,
        format: ExportFormat,
        title: &str,
        content: &str,
    ) -> Result<Vec<u8>, ExportError> {
        let bytes = match format {
            ExportFormat::Markdown => format!("# {}\n\n{}", title, content).into_bytes(),
            ExportFormat::Txt => {
                let manuscript = Manuscript::parse(content);
                format!("{}\n\n{}", title.to_uppercase(), manuscript.plain_text()).into_bytes()
            }
            ExportFormat::Docx => build_docx(title, &Manuscript::parse(content))?,
            ExportFormat::Print => render_print_page(title, &Manuscript::parse(content)).into_bytes(),
        };
        Ok(bytes)
    }
}

impl DocumentExporterPort for ChapterExporter {
    fn export(
        &self,
        format: ExportFormat,
        title: &str,
        content: &str,
    ) -> Result<ExportArtifact, ExportError> {
        let bytes = self.render(format, title, content)?;
        let filename = format!("{}.{}", derive_filename(title), format.extension());

        tracing::debug!(
            format = ?format,
            filename = %filename,
            size = bytes.len(),
            "Chapter exported"
        );

        Ok(ExportArtifact {
            filename,
            media_type: format.media_type().to_string(),
            bytes,
            attachment: format.is_download(),
        })
    }

    fn export_image(
        &self,
        title: &str,
        image: &ImageHandle,
    ) -> Result<ExportArtifact, ExportError> {
        let payload = image
            .base64_payload()
            .ok_or_else(|| ExportError::ImageDecode("image is not an embedded data URI".to_string()))?;
        let media_type = image.media_type().unwrap_or("image/jpeg");

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| ExportError::ImageDecode(e.to_string()))?;

        Ok(ExportArtifact {
            filename: format!("{}_Art.{}", derive_filename(title), image_extension(media_type)),
            media_type: media_type.to_string(),
            bytes,
            attachment: true,
        })
    }
}

fn image_extension(media_type: &str) -> &'static str {
    match media_type {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "jpg",
    }
}
