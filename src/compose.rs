//! Section composers. Each one draws a single document region through the
//! canvas primitives and returns the cursor position after it finished,
//! never before. The footer is the one exception: it draws at a fixed
//! distance from the page bottom and leaves the cursor alone.

use crate::canvas::{Align, Canvas, TextStyle};
use crate::format;
use crate::model::Invoice;
use crate::text;
use crate::theme::Theme;
use crate::types::{Color, Pt, Rect};

const LOGO_BOX: f32 = 56.0;
const LOGO_GAP: f32 = 12.0;
const NAME_SIZE: f32 = 18.0;
const NAME_LEAD: f32 = 22.0;
const TAGLINE_SIZE: f32 = 10.0;
const TAGLINE_LEAD: f32 = 14.0;
const CONTACT_SIZE: f32 = 9.0;
const CONTACT_LEAD: f32 = 12.0;

const TITLE_SIZE: f32 = 26.0;
const TITLE_LEAD: f32 = 26.0;
const NUMBER_SIZE: f32 = 10.0;
const NUMBER_LEAD: f32 = 16.0;

const SECTION_GAP: f32 = 24.0;

const DETAIL_SIZE: f32 = 9.0;
const DETAIL_LEAD: f32 = 13.0;
const DETAIL_VALUE_X: f32 = 70.0;
const RECIPIENT_X: f32 = 280.0;

const ROW_HEIGHT: f32 = 18.0;
const CELL_BASELINE: f32 = 13.0;
const CELL_PAD: f32 = 6.0;
const CELL_SIZE: f32 = 9.0;
// Numeric columns hang off the right margin at fixed offsets.
const QTY_OFFSET: f32 = 170.0;
const RATE_OFFSET: f32 = 90.0;
const AMOUNT_OFFSET: f32 = 6.0;
const RULE_WIDTH: f32 = 0.75;
const RULE_GAP: f32 = 6.0;

const TOTALS_LABEL_X: f32 = 120.0;
const TOTALS_LEAD: f32 = 14.0;
const TOTAL_SIZE: f32 = 12.0;
const TOTAL_LEAD: f32 = 20.0;

const NOTES_HEAD_SIZE: f32 = 10.0;
const NOTES_SIZE: f32 = 9.0;
const NOTES_LEAD: f32 = 12.0;
const TERMS_HEAD_SIZE: f32 = 9.0;
const TERMS_SIZE: f32 = 8.0;
const TERMS_LEAD: f32 = 11.0;

const FOOTER_RULE_FROM_BOTTOM: f32 = 64.0;
const FOOTER_BASELINE_FROM_BOTTOM: f32 = 48.0;
const FOOTER_SIZE: f32 = 9.0;

const TABLE_BAND: Color = Color {
    r: 0.93,
    g: 0.94,
    b: 0.96,
};

/// Runs each column composer against a clone of the current cursor and
/// resumes at the deepest resulting position. The header/title pair and the
/// detail/recipient pair render side by side through this, not stacked.
pub fn compose_parallel(
    canvas: &mut Canvas,
    columns: &mut [&mut dyn FnMut(&mut Canvas) -> Pt],
) -> Pt {
    let start = canvas.cursor();
    let mut deepest = start;
    for column in columns.iter_mut() {
        canvas.set_cursor(start);
        deepest = deepest.max(column(canvas));
    }
    canvas.set_cursor(deepest);
    deepest
}

/// Full fixed-order composition. Returns the cursor after the last
/// cursor-relative section (the footer's fixed anchor is excluded), which is
/// what the overflow check wants.
pub fn compose_document(canvas: &mut Canvas, invoice: &Invoice, theme: &Theme) -> Pt {
    compose_parallel(
        canvas,
        &mut [
            &mut |c| compose_company_header(c, theme),
            &mut |c| compose_title_block(c, invoice, theme),
        ],
    );
    canvas.advance(Pt::from_f32(SECTION_GAP));
    compose_parallel(
        canvas,
        &mut [
            &mut |c| compose_detail_block(c, invoice, theme),
            &mut |c| compose_recipient_block(c, invoice, theme),
        ],
    );
    canvas.advance(Pt::from_f32(SECTION_GAP));
    compose_items_table(canvas, invoice, theme);
    compose_totals(canvas, invoice, theme);
    compose_notes(canvas, invoice, theme);
    compose_terms(canvas, theme);
    let content_end = canvas.cursor();
    compose_footer(canvas, theme);
    content_end
}

pub fn compose_company_header(canvas: &mut Canvas, theme: &Theme) -> Pt {
    let left = canvas.content_left();
    let mut y = canvas.cursor();

    if let Some(logo) = theme.logo.as_deref() {
        let box_pt = Pt::from_f32(LOGO_BOX);
        if canvas.place_image(left, y, box_pt, box_pt, logo) {
            y += Pt::from_f32(LOGO_BOX + LOGO_GAP);
        }
        // A failed decode reserves no gap: the name starts where it would
        // have without a logo.
    }

    let bold = theme.family.bold();
    let regular = theme.family.regular();

    y += Pt::from_f32(NAME_LEAD);
    canvas.place_text(
        left,
        y,
        &theme.company_name,
        &TextStyle::new(bold, NAME_SIZE, theme.primary),
        Align::Left,
    );

    if let Some(tagline) = &theme.header_text {
        y += Pt::from_f32(TAGLINE_LEAD);
        canvas.place_text(
            left,
            y,
            tagline,
            &TextStyle::new(regular, TAGLINE_SIZE, theme.secondary),
            Align::Left,
        );
    }

    let contact = TextStyle::new(regular, CONTACT_SIZE, Color::BLACK);
    if let Some(address) = &theme.company_address {
        for line in address.split('\n') {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            y += Pt::from_f32(CONTACT_LEAD);
            canvas.place_text(left, y, line, &contact, Align::Left);
        }
    }
    for field in [
        &theme.company_email,
        &theme.company_phone,
        &theme.company_website,
    ] {
        if let Some(value) = field {
            y += Pt::from_f32(CONTACT_LEAD);
            canvas.place_text(left, y, value, &contact, Align::Left);
        }
    }

    canvas.set_cursor(y);
    y
}

pub fn compose_title_block(canvas: &mut Canvas, invoice: &Invoice, theme: &Theme) -> Pt {
    let right = canvas.content_right();
    let mut y = canvas.cursor();

    y += Pt::from_f32(TITLE_LEAD);
    canvas.place_text(
        right,
        y,
        "INVOICE",
        &TextStyle::new(theme.family.bold(), TITLE_SIZE, theme.primary),
        Align::Right,
    );
    y += Pt::from_f32(NUMBER_LEAD);
    canvas.place_text(
        right,
        y,
        &invoice.number,
        &TextStyle::new(theme.family.regular(), NUMBER_SIZE, theme.secondary),
        Align::Right,
    );

    canvas.set_cursor(y);
    y
}

pub fn compose_detail_block(canvas: &mut Canvas, invoice: &Invoice, theme: &Theme) -> Pt {
    let left = canvas.content_left();
    let value_x = left + Pt::from_f32(DETAIL_VALUE_X);
    let label_style = TextStyle::new(theme.family.bold(), DETAIL_SIZE, theme.secondary);
    let value_style = TextStyle::new(theme.family.regular(), DETAIL_SIZE, Color::BLACK);
    let mut y = canvas.cursor();

    let mut row = |canvas: &mut Canvas, y: &mut Pt, label: &str, value: &str| {
        *y += Pt::from_f32(DETAIL_LEAD);
        canvas.place_text(left, *y, label, &label_style, Align::Left);
        canvas.place_text(value_x, *y, value, &value_style, Align::Left);
    };

    row(canvas, &mut y, "Issue Date:", &invoice.issue_date);
    row(canvas, &mut y, "Due Date:", &invoice.due_date);
    row(canvas, &mut y, "Status:", invoice.status.label());
    if let Some(project) = &invoice.project {
        row(canvas, &mut y, "Project:", &project.name);
    }

    canvas.set_cursor(y);
    y
}

pub fn compose_recipient_block(canvas: &mut Canvas, invoice: &Invoice, theme: &Theme) -> Pt {
    let Some(client) = &invoice.client else {
        return canvas.cursor();
    };
    let x = canvas.content_left() + Pt::from_f32(RECIPIENT_X);
    let regular = theme.family.regular();
    let line_style = TextStyle::new(regular, CONTACT_SIZE, Color::BLACK);
    let mut y = canvas.cursor();

    y += Pt::from_f32(DETAIL_LEAD);
    canvas.place_text(
        x,
        y,
        "BILL TO",
        &TextStyle::new(theme.family.bold(), DETAIL_SIZE, theme.secondary),
        Align::Left,
    );
    y += Pt::from_f32(DETAIL_LEAD);
    canvas.place_text(
        x,
        y,
        &client.name,
        &TextStyle::new(theme.family.bold(), TAGLINE_SIZE, Color::BLACK),
        Align::Left,
    );
    for field in [&client.company, &client.email, &client.phone] {
        if let Some(value) = field {
            y += Pt::from_f32(CONTACT_LEAD);
            canvas.place_text(x, y, value, &line_style, Align::Left);
        }
    }
    if let Some(address) = &client.address {
        for line in address.split('\n') {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            y += Pt::from_f32(CONTACT_LEAD);
            canvas.place_text(x, y, line, &line_style, Align::Left);
        }
    }

    canvas.set_cursor(y);
    y
}

pub fn compose_items_table(canvas: &mut Canvas, invoice: &Invoice, theme: &Theme) -> Pt {
    let left = canvas.content_left();
    let right = canvas.content_right();
    let mut y = canvas.cursor();

    canvas.fill_rect(
        Rect {
            x: left,
            y,
            width: canvas.content_width(),
            height: Pt::from_f32(ROW_HEIGHT),
        },
        TABLE_BAND,
    );
    let header = TextStyle::new(theme.family.bold(), CELL_SIZE, Color::BLACK);
    let base = y + Pt::from_f32(CELL_BASELINE);
    canvas.place_text(left + Pt::from_f32(CELL_PAD), base, "Description", &header, Align::Left);
    canvas.place_text(right - Pt::from_f32(QTY_OFFSET), base, "Qty", &header, Align::Right);
    canvas.place_text(right - Pt::from_f32(RATE_OFFSET), base, "Rate", &header, Align::Right);
    canvas.place_text(right - Pt::from_f32(AMOUNT_OFFSET), base, "Amount", &header, Align::Right);
    y += Pt::from_f32(ROW_HEIGHT);

    // Fixed row height, no description wrapping. An empty item list is
    // legal: header band plus closing rule, nothing else.
    let cell = TextStyle::new(theme.family.regular(), CELL_SIZE, Color::BLACK);
    for item in &invoice.items {
        let base = y + Pt::from_f32(CELL_BASELINE);
        canvas.place_text(left + Pt::from_f32(CELL_PAD), base, &item.description, &cell, Align::Left);
        canvas.place_text(
            right - Pt::from_f32(QTY_OFFSET),
            base,
            &item.quantity.to_string(),
            &cell,
            Align::Right,
        );
        canvas.place_text(
            right - Pt::from_f32(RATE_OFFSET),
            base,
            &format::currency(item.rate),
            &cell,
            Align::Right,
        );
        canvas.place_text(
            right - Pt::from_f32(AMOUNT_OFFSET),
            base,
            &format::currency(item.amount),
            &cell,
            Align::Right,
        );
        y += Pt::from_f32(ROW_HEIGHT);
    }

    canvas.stroke_line(left, y, right, y, theme.secondary, Pt::from_f32(RULE_WIDTH));
    y += Pt::from_f32(RULE_GAP);

    canvas.set_cursor(y);
    y
}

pub fn compose_totals(canvas: &mut Canvas, invoice: &Invoice, theme: &Theme) -> Pt {
    let right = canvas.content_right();
    let label_x = right - Pt::from_f32(TOTALS_LABEL_X);
    let value_x = right - Pt::from_f32(AMOUNT_OFFSET);
    let line = TextStyle::new(theme.family.regular(), CELL_SIZE, Color::BLACK);
    let mut y = canvas.cursor();

    y += Pt::from_f32(TOTALS_LEAD);
    canvas.place_text(label_x, y, "Subtotal", &line, Align::Right);
    canvas.place_text(value_x, y, &format::currency(invoice.subtotal), &line, Align::Right);

    y += Pt::from_f32(TOTALS_LEAD);
    let tax_label = format!("Tax ({})", format::percent(invoice.tax_rate));
    canvas.place_text(label_x, y, &tax_label, &line, Align::Right);
    canvas.place_text(value_x, y, &format::currency(invoice.tax_amount), &line, Align::Right);

    y += Pt::from_f32(TOTAL_LEAD);
    let total = TextStyle::new(theme.family.bold(), TOTAL_SIZE, theme.primary);
    canvas.place_text(label_x, y, "Total", &total, Align::Right);
    canvas.place_text(value_x, y, &format::currency(invoice.total_amount), &total, Align::Right);

    canvas.set_cursor(y);
    y
}

pub fn compose_notes(canvas: &mut Canvas, invoice: &Invoice, theme: &Theme) -> Pt {
    // None and "" both skip with zero cursor delta.
    let Some(notes) = invoice
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    else {
        return canvas.cursor();
    };
    let left = canvas.content_left();
    let width = canvas.content_width();
    let regular = theme.family.regular();
    let mut y = canvas.cursor();

    y += Pt::from_f32(SECTION_GAP);
    canvas.place_text(
        left,
        y,
        "Notes",
        &TextStyle::new(theme.family.bold(), NOTES_HEAD_SIZE, Color::BLACK),
        Align::Left,
    );
    let body = TextStyle::new(regular, NOTES_SIZE, Color::BLACK);
    for line in text::wrap(notes, regular, Pt::from_f32(NOTES_SIZE), width) {
        y += Pt::from_f32(NOTES_LEAD);
        canvas.place_text(left, y, &line, &body, Align::Left);
    }

    canvas.set_cursor(y);
    y
}

pub fn compose_terms(canvas: &mut Canvas, theme: &Theme) -> Pt {
    let Some(terms) = theme.terms_conditions.as_deref() else {
        return canvas.cursor();
    };
    let left = canvas.content_left();
    let width = canvas.content_width();
    let regular = theme.family.regular();
    let mut y = canvas.cursor();

    y += Pt::from_f32(SECTION_GAP);
    canvas.place_text(
        left,
        y,
        "Terms & Conditions",
        &TextStyle::new(theme.family.bold(), TERMS_HEAD_SIZE, theme.secondary),
        Align::Left,
    );
    let body = TextStyle::new(regular, TERMS_SIZE, theme.secondary);
    for line in text::wrap(terms, regular, Pt::from_f32(TERMS_SIZE), width) {
        y += Pt::from_f32(TERMS_LEAD);
        canvas.place_text(left, y, &line, &body, Align::Left);
    }

    canvas.set_cursor(y);
    y
}

/// Fixed bottom anchor, deliberately not cursor-relative: a short document
/// still carries its footer at the same place on the page.
pub fn compose_footer(canvas: &mut Canvas, theme: &Theme) -> Pt {
    let Some(footer) = &theme.footer_text else {
        return canvas.cursor();
    };
    let height = canvas.page_size().height;
    let left = canvas.content_left();
    let right = canvas.content_right();

    let rule_y = height - Pt::from_f32(FOOTER_RULE_FROM_BOTTOM);
    canvas.stroke_line(left, rule_y, right, rule_y, theme.primary, Pt::from_f32(1.0));
    let center = left + canvas.content_width() / 2;
    canvas.place_text(
        center,
        height - Pt::from_f32(FOOTER_BASELINE_FROM_BOTTOM),
        footer,
        &TextStyle::new(theme.family.regular(), FOOTER_SIZE, theme.secondary),
        Align::Center,
    );
    canvas.cursor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Command;
    use crate::model::{Client, InvoiceStatus, LineItem, Template};
    use crate::types::{Margins, Size};

    fn sample_invoice() -> Invoice {
        Invoice {
            id: "inv_1".into(),
            number: "INV-0042".into(),
            issue_date: "2026-01-05".into(),
            due_date: "2026-02-04".into(),
            status: InvoiceStatus::Sent,
            subtotal: 3700.0,
            tax_rate: 0.10,
            tax_amount: 370.0,
            total_amount: 4070.0,
            notes: None,
            items: vec![
                LineItem {
                    description: "Design sprint".into(),
                    quantity: 20,
                    rate: 100.0,
                    amount: 2000.0,
                },
                LineItem {
                    description: "Implementation".into(),
                    quantity: 17,
                    rate: 100.0,
                    amount: 1700.0,
                },
            ],
            client: Some(Client {
                name: "Acme Corp".into(),
                company: Some("Acme Holdings".into()),
                email: Some("billing@acme.test".into()),
                phone: None,
                address: Some("1 Main St\nSpringfield".into()),
            }),
            project: None,
        }
    }

    fn canvas() -> Canvas {
        Canvas::new(Size::letter(), Margins::all(50.0))
    }

    fn strings(canvas: &Canvas) -> Vec<(String, Pt)> {
        canvas
            .commands()
            .iter()
            .filter_map(|cmd| match cmd {
                Command::DrawString { text, y, .. } => Some((text.clone(), *y)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn every_cursor_relative_composer_is_monotonic() {
        let invoice = sample_invoice();
        let theme = Theme::resolve(None);
        let mut c = canvas();

        let checks: &mut [&mut dyn FnMut(&mut Canvas) -> Pt] = &mut [
            &mut |c: &mut Canvas| compose_company_header(c, &theme),
            &mut |c: &mut Canvas| compose_title_block(c, &invoice, &theme),
            &mut |c: &mut Canvas| compose_detail_block(c, &invoice, &theme),
            &mut |c: &mut Canvas| compose_recipient_block(c, &invoice, &theme),
            &mut |c: &mut Canvas| compose_items_table(c, &invoice, &theme),
            &mut |c: &mut Canvas| compose_totals(c, &invoice, &theme),
            &mut |c: &mut Canvas| compose_notes(c, &invoice, &theme),
            &mut |c: &mut Canvas| compose_terms(c, &theme),
        ];
        for composer in checks.iter_mut() {
            let before = c.cursor();
            let after = composer(&mut c);
            assert!(after >= before);
            assert_eq!(c.cursor(), after);
        }
    }

    #[test]
    fn parallel_combinator_resumes_at_deepest_column() {
        let mut c = canvas();
        let start = c.cursor();
        let deepest = compose_parallel(
            &mut c,
            &mut [
                &mut |c: &mut Canvas| c.advance(Pt::from_f32(30.0)),
                &mut |c: &mut Canvas| c.advance(Pt::from_f32(90.0)),
                &mut |c: &mut Canvas| c.advance(Pt::from_f32(10.0)),
            ],
        );
        assert_eq!(deepest, start + Pt::from_f32(90.0));
        assert_eq!(c.cursor(), deepest);
    }

    #[test]
    fn header_and_title_share_a_start_y() {
        let invoice = sample_invoice();
        let theme = Theme::resolve(None);
        let mut c = canvas();
        compose_parallel(
            &mut c,
            &mut [
                &mut |c: &mut Canvas| compose_company_header(c, &theme),
                &mut |c: &mut Canvas| compose_title_block(c, &invoice, &theme),
            ],
        );
        let texts = strings(&c);
        let name_y = texts.iter().find(|(t, _)| t == "Your Company").unwrap().1;
        let title_y = texts.iter().find(|(t, _)| t == "INVOICE").unwrap().1;
        // Both columns started at the top margin; their first baselines
        // differ only by their own leadings.
        let flip = |y: Pt| Size::letter().height - y;
        assert_eq!(flip(name_y), Pt::from_f32(50.0 + NAME_LEAD));
        assert_eq!(flip(title_y), Pt::from_f32(50.0 + TITLE_LEAD));
    }

    #[test]
    fn absent_notes_leave_cursor_untouched() {
        let theme = Theme::resolve(None);
        for notes in [None, Some(String::new()), Some("   ".to_string())] {
            let mut invoice = sample_invoice();
            invoice.notes = notes;
            let mut c = canvas();
            c.advance(Pt::from_f32(300.0));
            let before = c.cursor();
            let commands_before = c.command_count();
            let after = compose_notes(&mut c, &invoice, &theme);
            assert_eq!(after, before);
            assert_eq!(c.command_count(), commands_before);
        }
    }

    #[test]
    fn empty_item_list_renders_header_row_only() {
        let mut invoice = sample_invoice();
        invoice.items.clear();
        let theme = Theme::resolve(None);
        let mut c = canvas();
        let before = c.cursor();
        let after = compose_items_table(&mut c, &invoice, &theme);
        assert_eq!(
            after - before,
            Pt::from_f32(ROW_HEIGHT + RULE_GAP)
        );
        let texts = strings(&c);
        assert_eq!(texts.len(), 4); // Description / Qty / Rate / Amount
        assert!(c.commands().iter().any(|cmd| matches!(cmd, Command::Stroke)));
    }

    #[test]
    fn totals_use_contract_formatting() {
        let invoice = sample_invoice();
        let theme = Theme::resolve(None);
        let mut c = canvas();
        compose_totals(&mut c, &invoice, &theme);
        let texts: Vec<String> = strings(&c).into_iter().map(|(t, _)| t).collect();
        assert!(texts.contains(&"$3,700.00".to_string()));
        assert!(texts.contains(&"Tax (10.0%)".to_string()));
        assert!(texts.contains(&"$370.00".to_string()));
        assert!(texts.contains(&"$4,070.00".to_string()));
    }

    #[test]
    fn corrupt_logo_does_not_shift_company_name() {
        let mut with_bad_logo = Template {
            name: "t".into(),
            company_name: Some("Printify".into()),
            ..Template::default()
        };
        with_bad_logo.logo = Some(b"corrupt bytes".to_vec());

        let theme_bad = Theme::resolve(Some(&with_bad_logo));
        let mut no_logo_template = with_bad_logo.clone();
        no_logo_template.logo = None;
        let theme_none = Theme::resolve(Some(&no_logo_template));

        let mut c1 = canvas();
        compose_company_header(&mut c1, &theme_bad);
        let mut c2 = canvas();
        compose_company_header(&mut c2, &theme_none);

        let y1 = strings(&c1).iter().find(|(t, _)| t == "Printify").unwrap().1;
        let y2 = strings(&c2).iter().find(|(t, _)| t == "Printify").unwrap().1;
        assert_eq!(y1, y2);
        assert_eq!(c1.cursor(), c2.cursor());
    }

    #[test]
    fn footer_is_anchored_to_the_page_bottom() {
        let template = Template {
            name: "t".into(),
            footer_text: Some("Thanks!".into()),
            ..Template::default()
        };
        let theme = Theme::resolve(Some(&template));

        // Footer lands at the same place no matter how tall the body was.
        for body_height in [0.0_f32, 400.0] {
            let mut c = canvas();
            c.advance(Pt::from_f32(body_height));
            let before = c.cursor();
            let after = compose_footer(&mut c, &theme);
            assert_eq!(after, before);
            let footer_y = strings(&c).iter().find(|(t, _)| t == "Thanks!").unwrap().1;
            // PDF-space baseline: fixed offset from the bottom edge.
            assert_eq!(footer_y, Pt::from_f32(FOOTER_BASELINE_FROM_BOTTOM));
        }
    }

    #[test]
    fn compose_document_reports_pre_footer_cursor() {
        let invoice = sample_invoice();
        let template = Template {
            name: "t".into(),
            footer_text: Some("Thanks!".into()),
            ..Template::default()
        };
        let theme = Theme::resolve(Some(&template));
        let mut c = canvas();
        let end = compose_document(&mut c, &invoice, &theme);
        assert_eq!(c.cursor(), end);
        assert!(end > Pt::from_f32(50.0));
        assert!(strings(&c).iter().any(|(t, _)| t == "Thanks!"));
    }
}
