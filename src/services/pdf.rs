// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Proposal PDF rendering.
//!
//! Fixed-coordinate A4 layout: company header, proposal details, client
//! and project blocks, one table per section, totals box, terms/notes.
//! All amounts are read from the already-computed proposal. Coordinates
//! are millimetres from the top-left; a new page starts whenever the
//! vertical cursor passes [`PAGE_BREAK_Y`].

use crate::error::AppError;
use crate::models::proposal::ProposalStatus;
use crate::models::{CompanyInfo, Proposal};
use crate::time_utils::parse_rfc3339;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PaintMode, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Rect, Rgb,
};

const PAGE_WIDTH: f64 = 210.0;
const PAGE_HEIGHT: f64 = 297.0;
/// Cursor threshold that forces a page break.
const PAGE_BREAK_Y: f64 = 250.0;
/// Cursor position at the top of a fresh page.
const PAGE_TOP_Y: f64 = 30.0;

/// Six-column item table: Item, Description, Qty, Unit, Unit Price, Total.
const TABLE_COLUMN_WIDTHS: [f64; 6] = [40.0, 50.0, 15.0, 20.0, 25.0, 25.0];
const TABLE_HEADERS: [&str; 6] = ["Item", "Description", "Qty", "Unit", "Unit Price", "Total"];

fn heading_color() -> Color {
    // #4a5a3a
    Color::Rgb(Rgb::new(0.29, 0.353, 0.227, None))
}

fn muted_color() -> Color {
    Color::Rgb(Rgb::new(0.392, 0.392, 0.392, None))
}

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

fn white() -> Color {
    Color::Rgb(Rgb::new(1.0, 1.0, 1.0, None))
}

fn status_color(status: ProposalStatus) -> Color {
    match status {
        ProposalStatus::Draft => Color::Rgb(Rgb::new(0.502, 0.502, 0.502, None)),
        ProposalStatus::Sent => Color::Rgb(Rgb::new(0.231, 0.51, 0.965, None)),
        ProposalStatus::Accepted => Color::Rgb(Rgb::new(0.133, 0.773, 0.369, None)),
        ProposalStatus::Rejected => Color::Rgb(Rgb::new(0.937, 0.267, 0.267, None)),
        ProposalStatus::Expired => Color::Rgb(Rgb::new(0.961, 0.62, 0.043, None)),
    }
}

/// Format an amount as US currency with thousands separators.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    let dollars = cents / 100;
    let remainder = cents % 100;

    let digits = dollars.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}${}.{:02}", sign, grouped, remainder)
}

/// Format an RFC3339 timestamp as "January 2, 2026".
pub fn format_long_date(raw: &str) -> String {
    match parse_rfc3339(raw) {
        Some(dt) => dt.format("%B %-d, %Y").to_string(),
        None => raw.to_string(),
    }
}

/// Download filename for a proposal: non-alphanumerics replaced by `_`.
pub fn pdf_filename(title: &str) -> String {
    let safe: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_proposal.pdf", safe)
}

/// Greedy word wrap to a character budget; overlong words are hard-split.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let (head, tail) = word.split_at(max_chars);
            lines.push(head.to_string());
            word = tail;
        }
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn mm(value: f64) -> Mm {
    Mm(value as _)
}

/// Page state: document handle, fonts, active layer, top-down cursor.
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
}

impl PageWriter {
    fn text(&self, text: &str, size: f64, x: f64, y: f64, bold: bool) {
        let font = if bold { &self.font_bold } else { &self.font };
        self.layer
            .use_text(text, size as _, mm(x), mm(PAGE_HEIGHT - y), font);
    }

    fn fill_color(&self, color: Color) {
        self.layer.set_fill_color(color);
    }

    /// Filled rectangle; x/y/width/height in top-down mm.
    fn rect(&self, x: f64, y: f64, width: f64, height: f64, mode: PaintMode) {
        let rect = Rect::new(
            mm(x),
            mm(PAGE_HEIGHT - y - height),
            mm(x + width),
            mm(PAGE_HEIGHT - y),
        )
        .with_mode(mode);
        self.layer.add_rect(rect);
    }

    /// Start a new page when the cursor has passed the break threshold.
    fn ensure_room(&mut self, y: f64) -> f64 {
        if y > PAGE_BREAK_Y {
            let (page, layer) = self.doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            PAGE_TOP_Y
        } else {
            y
        }
    }
}

/// Render a proposal to PDF bytes.
///
/// The company header falls back to a generic banner when no company info
/// is available.
pub fn generate_proposal_pdf(
    proposal: &Proposal,
    company: Option<&CompanyInfo>,
) -> Result<Vec<u8>, AppError> {
    let (doc, page, layer) =
        PdfDocument::new(proposal.title.as_str(), mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF font error: {}", e)))?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF font error: {}", e)))?;
    let layer = doc.get_page(page).get_layer(layer);

    let mut writer = PageWriter {
        doc,
        layer,
        font,
        font_bold,
    };

    add_header(&writer, proposal, company);
    let mut y = add_client_info(&writer, proposal, 90.0);
    y = add_project_info(&writer, proposal, y);
    y = add_sections(&mut writer, proposal, y);
    y = writer.ensure_room(y);
    y = add_totals(&writer, proposal, y);
    add_terms_and_notes(&mut writer, proposal, y);

    writer
        .doc
        .save_to_bytes()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF generation failed: {}", e)))
}

fn add_header(w: &PageWriter, proposal: &Proposal, company: Option<&CompanyInfo>) {
    let mut y = 30.0;

    match company.filter(|info| !info.name.is_empty()) {
        Some(info) => {
            w.fill_color(heading_color());
            w.text(&info.name, 18.0, 20.0, y, true);
            y += 8.0;

            w.fill_color(muted_color());
            let address = info.formatted_address();
            if !address.is_empty() {
                w.text(&address, 10.0, 20.0, y, false);
                y += 6.0;
            }
            if !info.phone.is_empty() {
                w.text(&format!("Phone: {}", info.phone), 10.0, 20.0, y, false);
                y += 6.0;
            }
            if !info.email.is_empty() {
                w.text(&format!("Email: {}", info.email), 10.0, 20.0, y, false);
                y += 6.0;
            }
            if !info.website.is_empty() {
                w.text(&format!("Website: {}", info.website), 10.0, 20.0, y, false);
            }
        }
        None => {
            // Generic fallback banner
            w.fill_color(heading_color());
            w.text("Landscape Pro", 24.0, 20.0, y, true);
        }
    }

    // Proposal title and dates (right side)
    w.fill_color(black());
    w.text(&proposal.title, 18.0, 120.0, 30.0, true);
    w.fill_color(muted_color());
    w.text(
        &format!("Created: {}", format_long_date(&proposal.created_at)),
        12.0,
        120.0,
        45.0,
        false,
    );
    w.text(
        &format!("Valid Until: {}", format_long_date(&proposal.valid_until)),
        12.0,
        120.0,
        55.0,
        false,
    );

    // Status badge
    let status_text = proposal.status.as_str().to_uppercase();
    let badge_width = status_text.len() as f64 * 2.2 + 10.0;
    w.fill_color(status_color(proposal.status));
    w.rect(180.0, 25.0, badge_width, 15.0, PaintMode::Fill);
    w.fill_color(white());
    w.text(&status_text, 10.0, 185.0, 35.0, true);
}

fn add_client_info(w: &PageWriter, proposal: &Proposal, y_position: f64) -> f64 {
    w.fill_color(heading_color());
    w.text("Client Information", 16.0, 20.0, y_position, true);
    let mut y = y_position + 15.0;

    w.fill_color(black());
    w.text("Name:", 12.0, 20.0, y, true);
    w.text(&proposal.client_name, 12.0, 45.0, y, false);
    y += 8.0;

    w.text("Email:", 12.0, 20.0, y, true);
    w.text(&proposal.client_email, 12.0, 45.0, y, false);
    y += 8.0;

    if !proposal.client_phone.is_empty() {
        w.text("Phone:", 12.0, 20.0, y, true);
        w.text(&proposal.client_phone, 12.0, 45.0, y, false);
        y += 8.0;
    }
    if !proposal.client_address.is_empty() {
        w.text("Address:", 12.0, 20.0, y, true);
        for line in wrap_text(&proposal.client_address, 30) {
            w.text(&line, 12.0, 45.0, y, false);
            y += 8.0;
        }
    }

    y + 10.0
}

fn add_project_info(w: &PageWriter, proposal: &Proposal, y_position: f64) -> f64 {
    w.fill_color(heading_color());
    w.text("Project Information", 16.0, 20.0, y_position, true);
    let mut y = y_position + 15.0;

    w.fill_color(black());
    if !proposal.project_address.is_empty() {
        w.text("Project Address:", 12.0, 20.0, y, true);
        y += 8.0;
        for line in wrap_text(&proposal.project_address, 75) {
            w.text(&line, 12.0, 20.0, y, false);
            y += 8.0;
        }
    }
    if !proposal.project_description.is_empty() {
        w.text("Project Description:", 12.0, 20.0, y, true);
        y += 8.0;
        for line in wrap_text(&proposal.project_description, 75) {
            w.text(&line, 12.0, 20.0, y, false);
            y += 8.0;
        }
    }

    w.text("Timeline:", 12.0, 20.0, y, true);
    y += 8.0;
    w.text(
        &format!(
            "Start Date: {}",
            format_long_date(&proposal.estimated_start_date)
        ),
        12.0,
        25.0,
        y,
        false,
    );
    y += 8.0;
    w.text(
        &format!("Duration: {} days", proposal.estimated_duration),
        12.0,
        25.0,
        y,
        false,
    );
    y += 8.0;
    w.text(
        &format!("Valid Until: {}", format_long_date(&proposal.valid_until)),
        12.0,
        25.0,
        y,
        false,
    );

    y + 15.0
}

fn add_sections(w: &mut PageWriter, proposal: &Proposal, y_position: f64) -> f64 {
    if proposal.sections.is_empty() {
        return y_position;
    }

    w.fill_color(heading_color());
    w.text("Proposal Details", 16.0, 20.0, y_position, true);
    let mut y = y_position + 15.0;

    for section in &proposal.sections {
        y = w.ensure_room(y);

        w.fill_color(black());
        w.text(&section.title, 14.0, 20.0, y, true);
        y += 8.0;

        if let Some(description) = section.description.as_deref() {
            w.fill_color(muted_color());
            let lines = wrap_text(description, 75);
            for line in &lines {
                w.text(line, 10.0, 25.0, y, false);
                y += 6.0;
            }
            y += 5.0;
        }

        if !section.items.is_empty() {
            // Header row
            w.fill_color(heading_color());
            w.rect(20.0, y - 5.0, 175.0, 10.0, PaintMode::Fill);
            w.fill_color(white());
            let mut x = 20.0;
            for (header, width) in TABLE_HEADERS.iter().zip(TABLE_COLUMN_WIDTHS) {
                w.text(header, 10.0, x, y, true);
                x += width;
            }
            y += 15.0;

            w.fill_color(black());
            for item in &section.items {
                y = w.ensure_room(y);

                let name_lines = wrap_text(&item.name, 20);
                let desc_lines = wrap_text(&item.description, 25);

                let mut x = 20.0;
                let mut row_y = y;
                for line in &name_lines {
                    w.text(line, 10.0, x, row_y, false);
                    row_y += 6.0;
                }
                x += TABLE_COLUMN_WIDTHS[0];

                row_y = y;
                for line in &desc_lines {
                    w.text(line, 10.0, x, row_y, false);
                    row_y += 6.0;
                }
                x += TABLE_COLUMN_WIDTHS[1];

                w.text(&format_quantity(item.quantity), 10.0, x, y, false);
                x += TABLE_COLUMN_WIDTHS[2];
                w.text(&item.unit, 10.0, x, y, false);
                x += TABLE_COLUMN_WIDTHS[3];
                w.text(&format_currency(item.unit_price), 10.0, x, y, false);
                x += TABLE_COLUMN_WIDTHS[4];
                w.text(&format_currency(item.total_price), 10.0, x, y, true);

                let line_count = name_lines.len().max(desc_lines.len());
                y += line_count as f64 * 6.0 + 5.0;
            }

            w.fill_color(heading_color());
            w.text(
                &format!("Section Total: {}", format_currency(section.subtotal)),
                12.0,
                140.0,
                y,
                true,
            );
            y += 15.0;
        }

        y += 10.0;
    }

    y
}

fn add_totals(w: &PageWriter, proposal: &Proposal, y_position: f64) -> f64 {
    // Light gray box with border
    w.fill_color(Color::Rgb(Rgb::new(0.941, 0.941, 0.941, None)));
    w.rect(120.0, y_position - 10.0, 75.0, 50.0, PaintMode::Fill);
    w.layer
        .set_outline_color(Color::Rgb(Rgb::new(0.784, 0.784, 0.784, None)));
    w.rect(120.0, y_position - 10.0, 75.0, 50.0, PaintMode::Stroke);

    let mut y = y_position;
    w.fill_color(black());
    w.text("Subtotal:", 14.0, 125.0, y, true);
    w.text(&format_currency(proposal.subtotal), 14.0, 170.0, y, true);
    y += 10.0;
    w.text("Tax:", 14.0, 125.0, y, true);
    w.text(&format!("{}%", proposal.tax_rate), 14.0, 170.0, y, true);
    y += 10.0;
    w.text("Tax Amount:", 14.0, 125.0, y, true);
    w.text(&format_currency(proposal.tax_amount), 14.0, 170.0, y, true);
    y += 10.0;

    w.fill_color(heading_color());
    w.text("TOTAL:", 16.0, 125.0, y, true);
    w.text(&format_currency(proposal.total_amount), 16.0, 170.0, y, true);

    y_position + 60.0
}

fn add_terms_and_notes(w: &mut PageWriter, proposal: &Proposal, y_position: f64) {
    let mut y = y_position;

    if !proposal.terms.is_empty() {
        y = w.ensure_room(y);
        w.fill_color(heading_color());
        w.text("Terms and Conditions", 14.0, 20.0, y, true);
        y += 10.0;

        w.fill_color(black());
        for line in wrap_text(&proposal.terms, 75) {
            y = w.ensure_room(y);
            w.text(&line, 10.0, 20.0, y, false);
            y += 6.0;
        }
        y += 15.0;
    }

    if !proposal.notes.is_empty() {
        y = w.ensure_room(y);
        w.fill_color(heading_color());
        w.text("Notes", 14.0, 20.0, y, true);
        y += 10.0;

        w.fill_color(black());
        for line in wrap_text(&proposal.notes, 75) {
            y = w.ensure_room(y);
            w.text(&line, 10.0, 20.0, y, false);
            y += 6.0;
        }
    }
}

/// Quantities print without a trailing ".0" when whole.
fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{}", quantity as i64)
    } else {
        format!("{}", quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::proposal::{ItemCategory, ProposalItem, ProposalSection};

    fn sample_proposal(section_count: usize, items_per_section: usize) -> Proposal {
        let sections: Vec<ProposalSection> = (0..section_count)
            .map(|s| ProposalSection {
                id: format!("section-{}", s),
                title: format!("Section {}", s),
                description: Some("Prep and planting".to_string()),
                items: (0..items_per_section)
                    .map(|i| ProposalItem {
                        id: format!("item-{}-{}", s, i),
                        name: format!("Item {}", i),
                        description: "Work item".to_string(),
                        quantity: 2.0,
                        unit: "hours".to_string(),
                        unit_price: 85.0,
                        total_price: 170.0,
                        category: ItemCategory::Labor,
                    })
                    .collect(),
                subtotal: items_per_section as f64 * 170.0,
            })
            .collect();

        Proposal {
            id: "prop-1".to_string(),
            title: "Backyard Renovation".to_string(),
            client_name: "Dana Smith".to_string(),
            client_email: "dana@example.com".to_string(),
            client_phone: "555-0100".to_string(),
            client_address: "12 Elm St, Springfield".to_string(),
            project_address: "12 Elm St, Springfield".to_string(),
            project_description: "Full backyard landscaping".to_string(),
            estimated_start_date: "2026-05-01T00:00:00Z".to_string(),
            estimated_duration: 10,
            sections,
            subtotal: 340.0,
            tax_rate: 8.5,
            tax_amount: 28.9,
            total_amount: 368.9,
            terms: "Half due up front.".to_string(),
            notes: "Gate code 4321".to_string(),
            status: ProposalStatus::Draft,
            valid_until: "2026-06-01T00:00:00Z".to_string(),
            user_id: "uid-1".to_string(),
            created_at: "2026-04-01T12:00:00Z".to_string(),
            updated_at: "2026-04-01T12:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(187.0), "$187.00");
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(1000000.0), "$1,000,000.00");
    }

    #[test]
    fn test_format_long_date() {
        assert_eq!(format_long_date("2026-05-01T00:00:00Z"), "May 1, 2026");
        assert_eq!(format_long_date("garbage"), "garbage");
    }

    #[test]
    fn test_pdf_filename() {
        assert_eq!(
            pdf_filename("Backyard Renovation #2"),
            "Backyard_Renovation__2_proposal.pdf"
        );
    }

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("one two three four", 9);
        assert_eq!(lines, vec!["one two", "three", "four"]);

        // Overlong words are hard-split
        let lines = wrap_text("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);

        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }

    #[test]
    fn test_generate_produces_pdf_bytes() {
        let proposal = sample_proposal(2, 3);
        let bytes = generate_proposal_pdf(&proposal, None).expect("generates");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_generate_with_company_header() {
        let company = CompanyInfo {
            name: "Green Thumb LLC".to_string(),
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            phone: "555-0101".to_string(),
            email: "hello@greenthumb.test".to_string(),
            ..CompanyInfo::default()
        };
        let proposal = sample_proposal(1, 1);
        let bytes = generate_proposal_pdf(&proposal, Some(&company)).expect("generates");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_generate_paginates_long_proposals() {
        // Enough rows to push the cursor past the break threshold several
        // times; must not panic and must still produce a document.
        let proposal = sample_proposal(5, 20);
        let bytes = generate_proposal_pdf(&proposal, None).expect("generates");
        assert!(bytes.starts_with(b"%PDF"));
    }
}
