use crate::types::Pt;

/// Base-14 fonts the engine can place. Metrics come from the embedded
/// advance tables below, never from a live font engine, so measured widths
/// are identical on every platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FontId {
    Helvetica,
    HelveticaBold,
    Courier,
    CourierBold,
}

impl FontId {
    pub fn pdf_name(self) -> &'static str {
        match self {
            FontId::Helvetica => "Helvetica",
            FontId::HelveticaBold => "Helvetica-Bold",
            FontId::Courier => "Courier",
            FontId::CourierBold => "Courier-Bold",
        }
    }
}

/// A regular/bold pair resolved from a template's font family string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFamily {
    Helvetica,
    Courier,
}

impl FontFamily {
    /// Known-family lookup; unknown or absent names fall back to Helvetica.
    /// Soft by contract: the family string is user-edited template text.
    pub fn resolve(raw: Option<&str>) -> FontFamily {
        let Some(raw) = raw else {
            return FontFamily::Helvetica;
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "courier" | "courier new" | "monospace" => FontFamily::Courier,
            "" | "helvetica" | "arial" | "sans-serif" => FontFamily::Helvetica,
            other => {
                log::warn!("unknown font family {other:?}, using Helvetica");
                FontFamily::Helvetica
            }
        }
    }

    pub fn regular(self) -> FontId {
        match self {
            FontFamily::Helvetica => FontId::Helvetica,
            FontFamily::Courier => FontId::Courier,
        }
    }

    pub fn bold(self) -> FontId {
        match self {
            FontFamily::Helvetica => FontId::HelveticaBold,
            FontFamily::Courier => FontId::CourierBold,
        }
    }
}

// Adobe AFM advances for chars 0x20..=0x7E, in 1/1000 em units.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278,
    584, 584, 584, 556, 1015, 667, 667, 722, 722, 667, 611, 778, 722, 278,
    500, 667, 556, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 278, 278, 278, 469, 556, 333, 556, 556, 500, 556, 556,
    278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500,
    278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333,
    584, 584, 584, 611, 975, 722, 722, 722, 722, 667, 611, 778, 722, 278,
    556, 722, 611, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 333, 278, 333, 584, 556, 333, 556, 611, 556, 611, 556,
    333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389, 556,
    333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

// Courier is fixed pitch.
const COURIER_ADVANCE: u16 = 600;

// Width charged for characters outside the table (and outside WinAnsi).
const MISSING_WIDTH: u16 = 556;

pub fn char_advance(font: FontId, ch: char) -> u16 {
    match font {
        FontId::Courier | FontId::CourierBold => COURIER_ADVANCE,
        FontId::Helvetica | FontId::HelveticaBold => {
            let code = ch as u32;
            if !(0x20..=0x7E).contains(&code) {
                return MISSING_WIDTH;
            }
            let idx = (code - 0x20) as usize;
            match font {
                FontId::Helvetica => HELVETICA_WIDTHS[idx],
                _ => HELVETICA_BOLD_WIDTHS[idx],
            }
        }
    }
}

/// Measured width of `text` at `size`. Advances are summed in integer em
/// units before scaling so the result does not depend on summation order.
pub fn text_width(font: FontId, size: Pt, text: &str) -> Pt {
    let total: i64 = text.chars().map(|ch| char_advance(font, ch) as i64).sum();
    size.mul_ratio(total, 1000)
}
