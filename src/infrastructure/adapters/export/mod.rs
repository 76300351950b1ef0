//! Export Adapter - 多格式导出实现

mod chapter_exporter;
mod docx;
mod html;

pub use chapter_exporter::ChapterExporter;
pub use docx::build_docx;
pub use html::{render_blocks, render_print_page};
