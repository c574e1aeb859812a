//! PDF byte emission. Walks the recorded command list once, building a
//! content stream out of raw operators, then assembles the object tree with
//! lopdf. Resource tables are collected into BTree maps so identical inputs
//! always serialize to identical bytes.

use crate::canvas::{Command, RecordedPage};
use crate::error::RenderError;
use crate::types::{Color, Pt};
use lopdf::{
    Dictionary as LoDictionary, Document as LoDocument, Object as LoObject, Stream as LoStream,
    dictionary,
};
use std::collections::{BTreeMap, BTreeSet};

/// Stable font-name -> resource-name assignment (`F1`, `F2`, ...) in sorted
/// order over the fonts the page actually uses.
pub(crate) fn font_resources(page: &RecordedPage) -> BTreeMap<&'static str, String> {
    let mut names: BTreeSet<&'static str> = BTreeSet::new();
    for cmd in &page.commands {
        if let Command::SetFont { name, .. } = cmd {
            names.insert(name);
        }
    }
    names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| (name, format!("F{}", idx + 1)))
        .collect()
}

pub(crate) fn build_content(
    page: &RecordedPage,
    fonts: &BTreeMap<&'static str, String>,
) -> String {
    let mut out = String::new();
    let mut current_font: Option<(&'static str, Pt)> = None;

    for cmd in &page.commands {
        match cmd {
            Command::SetFillColor(color) => {
                out.push_str(&fill_color_op(*color));
            }
            Command::SetStrokeColor(color) => {
                out.push_str(&stroke_color_op(*color));
            }
            Command::SetLineWidth(width) => {
                out.push_str(&format!("{} w\n", fmt_pt(*width)));
            }
            Command::SetFont { name, size } => {
                current_font = Some((name, *size));
            }
            Command::DrawString { x, y, text } => {
                let (name, size) = current_font.unwrap_or(("Helvetica", Pt::from_i32(12)));
                let resource = fonts
                    .get(name)
                    .map(String::as_str)
                    .unwrap_or("F1");
                out.push_str(&format!(
                    "BT\n/{} {} Tf\n{} {} Td\n({}) Tj\nET\n",
                    resource,
                    fmt_pt(size),
                    fmt_pt(*x),
                    fmt_pt(*y),
                    encode_win_ansi(text)
                ));
            }
            Command::DrawRect {
                x,
                y,
                width,
                height,
            } => {
                out.push_str(&format!(
                    "{} {} {} {} re\nf\n",
                    fmt_pt(*x),
                    fmt_pt(*y),
                    fmt_pt(*width),
                    fmt_pt(*height)
                ));
            }
            Command::MoveTo { x, y } => {
                out.push_str(&format!("{} {} m\n", fmt_pt(*x), fmt_pt(*y)));
            }
            Command::LineTo { x, y } => {
                out.push_str(&format!("{} {} l\n", fmt_pt(*x), fmt_pt(*y)));
            }
            Command::Stroke => out.push_str("S\n"),
            Command::DrawImage {
                x,
                y,
                width,
                height,
                resource_id,
            } => {
                out.push_str(&format!(
                    "q\n{} 0 0 {} {} {} cm\n/{} Do\nQ\n",
                    fmt_pt(*width),
                    fmt_pt(*height),
                    fmt_pt(*x),
                    fmt_pt(*y),
                    resource_id
                ));
            }
        }
    }
    out
}

pub fn page_to_pdf(page: &RecordedPage) -> Result<Vec<u8>, RenderError> {
    let mut doc = LoDocument::with_version("1.5");
    let pages_id = doc.new_object_id();

    let fonts = font_resources(page);
    let mut font_dict = LoDictionary::new();
    for (pdf_name, resource) in &fonts {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => *pdf_name,
            "Encoding" => "WinAnsiEncoding",
        });
        font_dict.set(resource.as_bytes().to_vec(), font_id);
    }

    let mut xobject_dict = LoDictionary::new();
    for (resource_id, img) in &page.images {
        let stream = LoStream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => img.width as i64,
                "Height" => img.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            img.rgb.clone(),
        );
        let image_id = doc.add_object(stream);
        xobject_dict.set(resource_id.as_bytes().to_vec(), image_id);
    }

    let mut resources = dictionary! {
        "Font" => LoObject::Dictionary(font_dict),
    };
    if !page.images.is_empty() {
        resources.set("XObject", LoObject::Dictionary(xobject_dict));
    }

    let content = build_content(page, &fonts);
    let content_id = doc.add_object(LoStream::new(LoDictionary::new(), content.into_bytes()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => LoObject::Dictionary(resources),
        "MediaBox" => vec![
            0.into(),
            0.into(),
            page.page_size.width.to_f32().into(),
            page.page_size.height.to_f32().into(),
        ],
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    };
    doc.objects.insert(pages_id, LoObject::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|err| RenderError::Pdf(err.to_string()))?;
    Ok(bytes)
}

/// Millipoint-exact decimal formatting with trailing zeros trimmed:
/// `612` not `612.000`, `13.5` not `13.500`.
fn fmt_pt(value: Pt) -> String {
    let milli = value.to_milli_i64();
    let sign = if milli < 0 { "-" } else { "" };
    let abs = milli.abs();
    let whole = abs / 1000;
    let frac = abs % 1000;
    if frac == 0 {
        format!("{sign}{whole}")
    } else {
        let frac = format!("{frac:03}");
        format!("{sign}{whole}.{}", frac.trim_end_matches('0'))
    }
}

fn fmt_unit(value: f32) -> String {
    let s = format!("{:.4}", value.clamp(0.0, 1.0));
    let s = s.trim_end_matches('0');
    let s = s.trim_end_matches('.');
    if s.is_empty() { "0".to_string() } else { s.to_string() }
}

fn fill_color_op(color: Color) -> String {
    format!(
        "{} {} {} rg\n",
        fmt_unit(color.r),
        fmt_unit(color.g),
        fmt_unit(color.b)
    )
}

fn stroke_color_op(color: Color) -> String {
    format!(
        "{} {} {} RG\n",
        fmt_unit(color.r),
        fmt_unit(color.g),
        fmt_unit(color.b)
    )
}

/// Escape a text run as a WinAnsi literal string. Characters without a
/// WinAnsi mapping degrade to `?` rather than corrupting the stream.
fn encode_win_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\\' => out.push_str("\\\\"),
            '\n' | '\r' | '\t' => out.push(' '),
            _ => {
                let code = ch as u32;
                if (0x20..0x7F).contains(&code) {
                    out.push(ch);
                } else if let Some(byte) = win_ansi_byte(ch) {
                    out.push_str(&format!("\\{byte:03o}"));
                } else {
                    out.push('?');
                }
            }
        }
    }
    out
}

fn win_ansi_byte(ch: char) -> Option<u8> {
    let code = ch as u32;
    if (0xA0..=0xFF).contains(&code) {
        return Some(code as u8);
    }
    // The 0x80..0x9F window where WinAnsi diverges from Latin-1.
    match ch {
        '\u{20AC}' => Some(0x80), // euro
        '\u{2018}' => Some(0x91),
        '\u{2019}' => Some(0x92),
        '\u{201C}' => Some(0x93),
        '\u{201D}' => Some(0x94),
        '\u{2022}' => Some(0x95), // bullet
        '\u{2013}' => Some(0x96), // en dash
        '\u{2014}' => Some(0x97), // em dash
        '\u{2122}' => Some(0x99), // trademark
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Align, Canvas, TextStyle};
    use crate::font::FontId;
    use crate::types::{Margins, Rect, Size};

    fn recorded_page() -> RecordedPage {
        let mut canvas = Canvas::new(Size::letter(), Margins::all(50.0));
        let body = TextStyle::new(FontId::Helvetica, 9.0, Color::BLACK);
        let bold = TextStyle::new(FontId::HelveticaBold, 12.0, Color::rgb(0.2, 0.5, 1.0));
        canvas.fill_rect(
            Rect {
                x: Pt::from_f32(50.0),
                y: Pt::from_f32(50.0),
                width: Pt::from_f32(512.0),
                height: Pt::from_f32(18.0),
            },
            Color::rgb(0.93, 0.94, 0.96),
        );
        canvas.place_text(
            Pt::from_f32(56.0),
            Pt::from_f32(63.0),
            "Total (net)",
            &body,
            Align::Left,
        );
        canvas.place_text(
            Pt::from_f32(562.0),
            Pt::from_f32(63.0),
            "$3,700.00",
            &bold,
            Align::Right,
        );
        canvas.stroke_line(
            Pt::from_f32(50.0),
            Pt::from_f32(70.0),
            Pt::from_f32(562.0),
            Pt::from_f32(70.0),
            Color::BLACK,
            Pt::from_f32(0.75),
        );
        canvas.finish()
    }

    #[test]
    fn fmt_pt_trims_trailing_zeros() {
        assert_eq!(fmt_pt(Pt::from_f32(612.0)), "612");
        assert_eq!(fmt_pt(Pt::from_f32(13.5)), "13.5");
        assert_eq!(fmt_pt(Pt::from_f32(0.75)), "0.75");
        assert_eq!(fmt_pt(Pt::from_f32(-2.004)), "-2.004");
        assert_eq!(fmt_pt(Pt::ZERO), "0");
    }

    #[test]
    fn fmt_unit_clamps_and_trims() {
        assert_eq!(fmt_unit(0.0), "0");
        assert_eq!(fmt_unit(1.0), "1");
        assert_eq!(fmt_unit(0.5), "0.5");
        assert_eq!(fmt_unit(2.0), "1");
    }

    #[test]
    fn escapes_parens_and_maps_win_ansi() {
        assert_eq!(encode_win_ansi("Tax (10.0%)"), "Tax \\(10.0%\\)");
        assert_eq!(encode_win_ansi("a\\b"), "a\\\\b");
        assert_eq!(encode_win_ansi("caf\u{E9}"), "caf\\351");
        assert_eq!(encode_win_ansi("5\u{2013}6"), "5\\2266");
        assert_eq!(encode_win_ansi("\u{4E16}"), "?");
    }

    #[test]
    fn content_stream_carries_text_and_geometry() {
        let page = recorded_page();
        let fonts = font_resources(&page);
        assert_eq!(fonts.len(), 2);
        let content = build_content(&page, &fonts);
        assert!(content.contains("re\nf\n"));
        assert!(content.contains("($3,700.00) Tj"));
        assert!(content.contains("(Total \\(net\\)) Tj"));
        assert!(content.contains("S\n"));
        assert!(content.contains("0.75 w"));
    }

    #[test]
    fn content_generation_is_deterministic() {
        let page = recorded_page();
        let fonts = font_resources(&page);
        assert_eq!(build_content(&page, &fonts), build_content(&page, &fonts));
    }

    #[test]
    fn page_to_pdf_emits_a_pdf_header() {
        let page = recorded_page();
        let a = page_to_pdf(&page).unwrap();
        let b = page_to_pdf(&page).unwrap();
        assert!(a.starts_with(b"%PDF-1.5"));
        assert_eq!(a, b);
    }
}
