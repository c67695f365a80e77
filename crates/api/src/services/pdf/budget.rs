use chrono::NaiveDate;
use domain::models::{BudgetPayload, BudgetSection};
use shared::format::{format_indonesian_date, format_rupiah};

use super::layout::{letterhead, signature_block, Font, PageWriter, MARGIN_LEFT, MARGIN_RIGHT};
use super::RenderError;
use crate::config::VillageConfig;

const SIZE: i64 = 10;

/// Renders a budget snapshot as income, expenditure and financing tables.
pub fn render_budget(
    budget: &BudgetPayload,
    village: &VillageConfig,
    rendered_on: NaiveDate,
) -> Result<Vec<u8>, RenderError> {
    let mut writer = PageWriter::new();
    letterhead(&mut writer, village);

    writer.advance(14);
    writer.centered(Font::Bold, 12, "ANGGARAN PENDAPATAN DAN BELANJA DESA");
    writer.centered(Font::Bold, 12, &format!("TAHUN ANGGARAN {}", budget.year));
    writer.centered(Font::Regular, SIZE, &budget.title);

    let income = budget.total_income().ok_or(RenderError::AmountOverflow("income"))?;
    let expenditure = budget
        .total_expenditure()
        .ok_or(RenderError::AmountOverflow("expenditure"))?;
    let financing = budget
        .total_financing()
        .ok_or(RenderError::AmountOverflow("financing"))?;
    let surplus = budget.surplus().ok_or(RenderError::AmountOverflow("surplus"))?;

    writer.advance(10);
    write_group(&mut writer, "A. PENDAPATAN", &budget.income);
    total_line(&mut writer, "JUMLAH PENDAPATAN", income);

    writer.advance(8);
    write_group(&mut writer, "B. BELANJA", &budget.expenditure);
    total_line(&mut writer, "JUMLAH BELANJA", expenditure);

    let label = if surplus < 0 { "DEFISIT" } else { "SURPLUS" };
    writer.advance(4);
    total_line(&mut writer, label, surplus);

    writer.advance(8);
    write_group(&mut writer, "C. PEMBIAYAAN", &budget.financing);
    total_line(&mut writer, "PEMBIAYAAN NETTO", financing);

    signature_block(&mut writer, village, &format_indonesian_date(rendered_on));
    writer.finish()
}

fn write_group(writer: &mut PageWriter, heading: &str, sections: &[BudgetSection]) {
    writer.line(MARGIN_LEFT, Font::Bold, SIZE + 1, heading);
    if sections.is_empty() {
        writer.line(MARGIN_LEFT + 16, Font::Regular, SIZE, "-");
        return;
    }
    for section in sections {
        writer.line(MARGIN_LEFT + 16, Font::Bold, SIZE, &section.name);
        // group totals are checked before any section is written
        let total = section.total().unwrap_or_default();
        writer.right_aligned(MARGIN_RIGHT, Font::Bold, SIZE, &format_rupiah(total));
        for item in &section.items {
            writer.line(MARGIN_LEFT + 32, Font::Regular, SIZE, &item.name);
            writer.right_aligned(MARGIN_RIGHT - 100, Font::Regular, SIZE, &format_rupiah(item.amount));
        }
    }
}

fn total_line(writer: &mut PageWriter, label: &str, amount: i64) {
    writer.rule(1);
    writer.line(MARGIN_LEFT, Font::Bold, SIZE, label);
    writer.right_aligned(MARGIN_RIGHT, Font::Bold, SIZE, &format_rupiah(amount));
}
