//! Page layout primitives on top of lopdf.
//!
//! Coordinates are PDF points on an A4 page with the origin bottom-left.
//! Text uses the standard Helvetica faces with WinAnsi encoding, so no font
//! program is embedded.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

use super::RenderError;
use crate::config::VillageConfig;

pub const PAGE_WIDTH: i64 = 595;
pub const PAGE_HEIGHT: i64 = 842;
pub const MARGIN_LEFT: i64 = 72;
pub const MARGIN_RIGHT: i64 = PAGE_WIDTH - 72;
const TOP: i64 = PAGE_HEIGHT - 56;
const BOTTOM: i64 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

/// Approximate Helvetica advance width in thousandths of an em.
fn glyph_width(c: char) -> i64 {
    match c {
        ' ' | '.' | ',' | ':' | ';' | '/' | '!' | 'f' | 't' | 'I' => 278,
        'i' | 'j' | 'l' | '\'' => 222,
        '-' | 'r' | '(' | ')' => 333,
        'm' | 'M' => 833,
        'w' => 722,
        'W' => 944,
        '0'..='9' => 556,
        'A'..='Z' => 667,
        _ => 556,
    }
}

pub fn text_width(text: &str, size: i64) -> i64 {
    text.chars().map(glyph_width).sum::<i64>() * size / 1000
}

/// Encodes text for a WinAnsi font; unmappable characters become `?`.
fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '…' => 0x85,
            '–' => 0x96,
            '—' => 0x97,
            c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

/// Greedy word wrap to `max_width` points.
pub fn wrap(text: &str, size: i64, max_width: i64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if text_width(&candidate, size) > max_width && !current.is_empty() {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn int(value: i64) -> Object {
    Object::Integer(value)
}

/// Accumulates drawing operations page by page, top to bottom.
pub struct PageWriter {
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    cursor: i64,
}

impl PageWriter {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            cursor: TOP,
        }
    }

    /// Starts a new page when fewer than `height` points remain.
    pub fn ensure_space(&mut self, height: i64) {
        if self.cursor - height < BOTTOM {
            self.pages.push(std::mem::take(&mut self.current));
            self.cursor = TOP;
        }
    }

    pub fn advance(&mut self, dy: i64) {
        self.cursor -= dy;
    }

    /// Draws text with its baseline at the cursor.
    pub fn text_at(&mut self, x: i64, font: Font, size: i64, text: &str) {
        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.resource().into(), int(size)]),
            Operation::new("Td", vec![int(x), int(self.cursor)]),
            Operation::new("Tj", vec![Object::String(encode(text), StringFormat::Literal)]),
            Operation::new("ET", vec![]),
        ]);
    }

    /// Writes one line of text and moves the cursor below it.
    pub fn line(&mut self, x: i64, font: Font, size: i64, text: &str) {
        self.ensure_space(size + 4);
        self.advance(size + 4);
        self.text_at(x, font, size, text);
    }

    pub fn centered(&mut self, font: Font, size: i64, text: &str) {
        let x = (PAGE_WIDTH - text_width(text, size)) / 2;
        self.line(x.max(MARGIN_LEFT), font, size, text);
    }

    /// Draws text ending at `right` on the current baseline.
    pub fn right_aligned(&mut self, right: i64, font: Font, size: i64, text: &str) {
        let x = right - text_width(text, size);
        self.text_at(x, font, size, text);
    }

    /// Writes a paragraph wrapped between `x` and the right margin.
    pub fn paragraph(&mut self, x: i64, font: Font, size: i64, text: &str) {
        for line in wrap(text, size, MARGIN_RIGHT - x) {
            self.line(x, font, size, &line);
        }
    }

    /// Horizontal rule across the text block below the cursor.
    pub fn rule(&mut self, width: i64) {
        self.advance(4);
        self.current.extend([
            Operation::new("w", vec![int(width)]),
            Operation::new("m", vec![int(MARGIN_LEFT), int(self.cursor)]),
            Operation::new("l", vec![int(MARGIN_RIGHT), int(self.cursor)]),
            Operation::new("S", vec![]),
        ]);
    }

    /// Assembles the pages into a PDF document.
    pub fn finish(mut self) -> Result<Vec<u8>, RenderError> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
        }

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular_id,
                "F2" => bold_id,
            },
        });

        let mut kids = Vec::with_capacity(self.pages.len());
        for operations in self.pages {
            let content = Content { operations }
                .encode()
                .map_err(|e| RenderError::Pdf(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![int(0), int(0), int(PAGE_WIDTH), int(PAGE_HEIGHT)],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        Ok(bytes)
    }
}

/// Institutional letterhead shared by every document.
pub fn letterhead(writer: &mut PageWriter, village: &VillageConfig) {
    writer.centered(
        Font::Bold,
        12,
        &format!("PEMERINTAH KABUPATEN {}", village.regency.to_uppercase()),
    );
    writer.centered(
        Font::Bold,
        12,
        &format!("KECAMATAN {}", village.district.to_uppercase()),
    );
    writer.centered(Font::Bold, 14, &format!("DESA {}", village.name.to_uppercase()));
    writer.centered(Font::Regular, 9, &village.address);
    writer.rule(2);
    writer.advance(2);
    writer.rule(1);
}

/// Date line and signatory, right of centre.
pub fn signature_block(writer: &mut PageWriter, village: &VillageConfig, date: &str) {
    const X: i64 = 340;
    writer.ensure_space(120);
    writer.advance(16);
    writer.line(X, Font::Regular, 11, &format!("{}, {}", village.place, date));
    writer.line(
        X,
        Font::Regular,
        11,
        &format!("{} {}", village.signatory_title, village.name),
    );
    writer.advance(56);
    writer.line(X, Font::Bold, 11, &village.signatory_name);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_maps_winansi_punctuation() {
        assert_eq!(encode("…/…"), vec![0x85, b'/', 0x85]);
        assert_eq!(encode("é"), vec![0xE9]);
        assert_eq!(encode("日"), vec![b'?']);
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "Demikian surat keterangan ini dibuat dengan sebenarnya untuk dapat dipergunakan sebagaimana mestinya.";
        let lines = wrap(text, 11, 200);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, 11) <= 200 || !line.contains(' '));
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_empty_writer_produces_single_page() {
        let bytes = PageWriter::new().finish().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
    }

    #[test]
    fn test_long_content_breaks_pages() {
        let mut writer = PageWriter::new();
        for i in 0..80 {
            writer.line(MARGIN_LEFT, Font::Regular, 11, &format!("Baris {}", i));
        }
        assert_eq!(writer.pages.len(), 1);
        let bytes = writer.finish().unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }
}
