use chrono::{Datelike, NaiveDate};
use domain::models::{DocumentRow, LetterRequest};
use shared::format::format_indonesian_date;

use super::layout::{letterhead, signature_block, Font, PageWriter, MARGIN_LEFT, MARGIN_RIGHT};
use super::RenderError;
use crate::config::VillageConfig;

const BODY_SIZE: i64 = 11;
const LABEL_X: i64 = MARGIN_LEFT + 18;
const VALUE_X: i64 = MARGIN_LEFT + 168;

/// Renders a letter request with the template of its letter type.
///
/// Fails with [`RenderError::MissingField`] naming the first required row
/// that is empty. An unassigned document number prints as a placeholder.
pub fn render_letter(
    request: &LetterRequest,
    village: &VillageConfig,
    rendered_on: NaiveDate,
) -> Result<Vec<u8>, RenderError> {
    let rows = request.fields.document_rows();
    if let Some(missing) = rows.iter().find(|r| r.required && r.value.is_none()) {
        return Err(RenderError::MissingField(missing.label));
    }

    let descriptor = request.letter_type.descriptor();
    let number = if request.document_number.trim().is_empty() {
        format!("…/…/{}/{}", descriptor.classification_code, rendered_on.year())
    } else {
        request.document_number.trim().to_string()
    };

    let mut writer = PageWriter::new();
    letterhead(&mut writer, village);

    writer.advance(18);
    writer.centered(Font::Bold, 12, descriptor.title);
    writer.centered(Font::Regular, BODY_SIZE, &format!("Nomor: {}", number));

    writer.advance(14);
    writer.paragraph(
        MARGIN_LEFT,
        Font::Regular,
        BODY_SIZE,
        &format!(
            "Yang bertanda tangan di bawah ini, {} {}, Kecamatan {}, Kabupaten {}, menerangkan bahwa:",
            village.signatory_title, village.name, village.district, village.regency
        ),
    );

    writer.advance(6);
    for (index, row) in rows.iter().enumerate() {
        write_row(&mut writer, index + 1, row);
    }

    writer.advance(10);
    writer.paragraph(MARGIN_LEFT, Font::Regular, BODY_SIZE, descriptor.closing);

    signature_block(&mut writer, village, &format_indonesian_date(rendered_on));
    writer.finish()
}

fn write_row(writer: &mut PageWriter, number: usize, row: &DocumentRow) {
    let value = row.value.as_deref().unwrap_or("-");
    let lines = super::layout::wrap(value, BODY_SIZE, MARGIN_RIGHT - VALUE_X - 8);

    writer.line(LABEL_X, Font::Regular, BODY_SIZE, &format!("{}. {}", number, row.label));
    writer.text_at(VALUE_X, Font::Regular, BODY_SIZE, ":");
    let mut lines = lines.iter();
    if let Some(first) = lines.next() {
        writer.text_at(VALUE_X + 8, Font::Regular, BODY_SIZE, first);
    }
    for rest in lines {
        writer.line(VALUE_X + 8, Font::Regular, BODY_SIZE, rest);
    }
}
