//! Service list PDF rendering with lopdf.
//!
//! Uses the standard Helvetica fonts with WinAnsiEncoding, which covers the
//! accented Latin letters found in service descriptions without embedding
//! a font file.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::debug;

use super::Result;
use crate::error::PdfError;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 56.0;
const TITLE_SIZE: f32 = 16.0;
const LEADING: f32 = 1.5;

/// Renders a list of services as a paginated A4 PDF.
#[derive(Debug, Clone)]
pub struct ServiceListWriter {
    title: String,
    subtitle: Option<String>,
    font_size: f32,
}

impl ServiceListWriter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            font_size: 11.0,
        }
    }

    /// Line printed under the title on the first page.
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size.clamp(6.0, 24.0);
        self
    }

    /// Render the PDF into memory.
    pub fn render(&self, services: &[String]) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular = doc.add_object(helvetica("Helvetica"));
        let bold = doc.add_object(helvetica("Helvetica-Bold"));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular,
                "F2" => bold,
            },
        });

        let mut kids = Vec::new();
        for (index, lines) in self.paginate(services).iter().enumerate() {
            let content = self.page_content(index == 0, lines);
            let encoded = content
                .encode()
                .map_err(|e| PdfError::Write(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::from(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            }),
        );

        let catalog_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| PdfError::Write(e.to_string()))?;

        debug!("Rendered {} services on {} pages", services.len(), count);
        Ok(bytes)
    }

    /// Render the PDF to `path`.
    pub fn write(&self, services: &[String], path: &Path) -> crate::Result<()> {
        let bytes = self.render(services)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn line_height(&self) -> f32 {
        self.font_size * LEADING
    }

    fn lines_per_page(&self, first: bool) -> usize {
        let mut usable = PAGE_HEIGHT - 2.0 * MARGIN;
        if first {
            usable -= self.header_height();
        }
        ((usable / self.line_height()).floor() as usize).max(1)
    }

    fn header_height(&self) -> f32 {
        let subtitle = if self.subtitle.is_some() { self.line_height() } else { 0.0 };
        TITLE_SIZE * 2.0 + subtitle
    }

    /// Wrap every service to the page width and split into pages.
    fn paginate(&self, services: &[String]) -> Vec<Vec<String>> {
        // Helvetica averages about half an em per character.
        let max_chars = ((PAGE_WIDTH - 2.0 * MARGIN) / (self.font_size * 0.5)) as usize;
        let lines: Vec<String> = services
            .iter()
            .flat_map(|service| wrap(service, max_chars.max(10)))
            .collect();

        let mut pages = Vec::new();
        let mut remaining = lines.as_slice();
        loop {
            let take = self.lines_per_page(pages.is_empty()).min(remaining.len());
            let (page, rest) = remaining.split_at(take);
            pages.push(page.to_vec());
            remaining = rest;
            if remaining.is_empty() {
                break;
            }
        }
        pages
    }

    fn page_content(&self, first: bool, lines: &[String]) -> Content {
        let mut operations = vec![Operation::new("BT", vec![])];
        let mut y = PAGE_HEIGHT - MARGIN;

        if first {
            y -= TITLE_SIZE;
            operations.extend([
                Operation::new("Tf", vec!["F2".into(), TITLE_SIZE.into()]),
                Operation::new("Td", vec![MARGIN.into(), y.into()]),
                Operation::new("Tj", vec![pdf_string(&self.title)]),
            ]);
            if let Some(subtitle) = &self.subtitle {
                operations.extend([
                    Operation::new("Tf", vec!["F1".into(), self.font_size.into()]),
                    Operation::new("Td", vec![0.into(), (-self.line_height()).into()]),
                    Operation::new("Tj", vec![pdf_string(subtitle)]),
                ]);
            }
            operations.push(Operation::new("Td", vec![0.into(), (-TITLE_SIZE).into()]));
        } else {
            operations.push(Operation::new("Td", vec![MARGIN.into(), y.into()]));
        }

        operations.push(Operation::new("Tf", vec!["F1".into(), self.font_size.into()]));
        operations.push(Operation::new("TL", vec![self.line_height().into()]));
        for line in lines {
            operations.push(Operation::new("T*", vec![]));
            operations.push(Operation::new("Tj", vec![pdf_string(line)]));
        }
        operations.push(Operation::new("ET", vec![]));

        Content { operations }
    }
}

fn helvetica(base_font: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Latin-1 bytes for a WinAnsi font; anything outside it becomes `?`.
fn pdf_string(text: &str) -> Object {
    let bytes = text
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect();
    Object::String(bytes, StringFormat::Literal)
}

/// Greedy word wrap on whitespace; words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(word.drain(..width).collect());
        }
        let word: String = word.into_iter().collect();
        if word.is_empty() {
            continue;
        }
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_paginates() {
        let services: Vec<String> = (0..200).map(|i| format!("EXAME {:03}", i)).collect();
        let bytes = ServiceListWriter::new("Lista de Serviços")
            .with_subtitle("2024-01-01")
            .render(&services)
            .unwrap();

        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().len() > 1);
    }

    #[test]
    fn test_render_empty_list_has_one_page() {
        let bytes = ServiceListWriter::new("Lista").render(&[]).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_pdf_string_latin1() {
        match pdf_string("SERVIÇO €") {
            Object::String(bytes, StringFormat::Literal) => {
                assert_eq!(bytes, b"SERVI\xC7O ?".to_vec());
            }
            other => panic!("unexpected object {:?}", other),
        }
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("AAA BBB CCC", 7), vec!["AAA BBB", "CCC"]);
        assert_eq!(wrap("ABCDEFGHIJ", 4), vec!["ABCD", "EFGH", "IJ"]);
        assert!(wrap("   ", 5).is_empty());
    }
}
