use crate::font::{self, FontId};
use crate::types::{Color, Margins, Pt, Rect, Size};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Recorded drawing ops. Coordinates are already absolute PDF-space values
/// (origin bottom-left) by the time a command lands here; composers work in
/// top-down layout space and the canvas flips at record time.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetFillColor(Color),
    SetStrokeColor(Color),
    SetLineWidth(Pt),
    SetFont { name: &'static str, size: Pt },
    DrawString { x: Pt, y: Pt, text: String },
    DrawRect { x: Pt, y: Pt, width: Pt, height: Pt },
    MoveTo { x: Pt, y: Pt },
    LineTo { x: Pt, y: Pt },
    Stroke,
    DrawImage { x: Pt, y: Pt, width: Pt, height: Pt, resource_id: String },
}

/// Explicit style threaded into every text primitive; composers never mutate
/// ambient drawing state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: FontId,
    pub size: Pt,
    pub color: Color,
}

impl TextStyle {
    pub fn new(font: FontId, size: f32, color: Color) -> Self {
        Self {
            font,
            size: Pt::from_f32(size),
            color,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Raster pixels decoded up front so byte emission cannot fail later.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/// One finished page: everything the PDF backend needs.
#[derive(Debug, Clone)]
pub struct RecordedPage {
    pub page_size: Size,
    pub commands: Vec<Command>,
    pub images: BTreeMap<String, DecodedImage>,
}

#[derive(Debug, Clone, Default)]
struct GraphicsState {
    fill_color: Option<Color>,
    stroke_color: Option<Color>,
    line_width: Option<Pt>,
    font: Option<(&'static str, Pt)>,
}

/// The mutable output surface for a single render call: page geometry, one
/// monotonically increasing vertical cursor, and the primitive ops. Owned
/// exclusively by that call, never shared.
pub struct Canvas {
    page_size: Size,
    margins: Margins,
    cursor: Pt,
    commands: Vec<Command>,
    images: BTreeMap<String, DecodedImage>,
    state: GraphicsState,
}

impl Canvas {
    pub fn new(page_size: Size, margins: Margins) -> Self {
        Self {
            page_size,
            margins,
            cursor: margins.top,
            commands: Vec::new(),
            images: BTreeMap::new(),
            state: GraphicsState::default(),
        }
    }

    pub fn page_size(&self) -> Size {
        self.page_size
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn content_left(&self) -> Pt {
        self.margins.left
    }

    pub fn content_right(&self) -> Pt {
        self.page_size.width - self.margins.right
    }

    pub fn content_width(&self) -> Pt {
        self.content_right() - self.content_left()
    }

    pub fn content_bottom(&self) -> Pt {
        self.page_size.height - self.margins.bottom
    }

    /// Running vertical offset in top-down layout space.
    pub fn cursor(&self) -> Pt {
        self.cursor
    }

    pub fn advance(&mut self, dy: Pt) -> Pt {
        self.cursor += dy;
        self.cursor
    }

    /// Used by the parallel-column combinator to rewind a cloned start
    /// position; ordinary composers only ever move the cursor down.
    pub fn set_cursor(&mut self, y: Pt) {
        self.cursor = y;
    }

    fn flip(&self, y: Pt) -> Pt {
        self.page_size.height - y
    }

    fn set_fill_color(&mut self, color: Color) {
        if self.state.fill_color == Some(color) {
            return;
        }
        self.state.fill_color = Some(color);
        self.commands.push(Command::SetFillColor(color));
    }

    fn set_stroke_color(&mut self, color: Color) {
        if self.state.stroke_color == Some(color) {
            return;
        }
        self.state.stroke_color = Some(color);
        self.commands.push(Command::SetStrokeColor(color));
    }

    fn set_line_width(&mut self, width: Pt) {
        let width = width.max(Pt::ZERO);
        if self.state.line_width == Some(width) {
            return;
        }
        self.state.line_width = Some(width);
        self.commands.push(Command::SetLineWidth(width));
    }

    fn set_font(&mut self, font: FontId, size: Pt) {
        let name = font.pdf_name();
        if self.state.font == Some((name, size)) {
            return;
        }
        self.state.font = Some((name, size));
        self.commands.push(Command::SetFont { name, size });
    }

    /// Place one run of text with its baseline at `baseline` (top-down).
    /// Right/center alignment resolves to an absolute x here, from the
    /// embedded metrics, so the command list holds no alignment state.
    pub fn place_text(&mut self, x: Pt, baseline: Pt, text: &str, style: &TextStyle, align: Align) {
        if text.is_empty() {
            return;
        }
        let width = font::text_width(style.font, style.size, text);
        let x = match align {
            Align::Left => x,
            Align::Center => x - width / 2,
            Align::Right => x - width,
        };
        self.set_fill_color(style.color);
        self.set_font(style.font, style.size);
        self.commands.push(Command::DrawString {
            x,
            y: self.flip(baseline),
            text: text.to_string(),
        });
    }

    /// `rect.y` is the top edge in layout space.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.set_fill_color(color);
        self.commands.push(Command::DrawRect {
            x: rect.x,
            y: self.flip(rect.y + rect.height),
            width: rect.width,
            height: rect.height,
        });
    }

    pub fn stroke_line(&mut self, x1: Pt, y1: Pt, x2: Pt, y2: Pt, color: Color, width: Pt) {
        self.set_stroke_color(color);
        self.set_line_width(width);
        self.commands.push(Command::MoveTo {
            x: x1,
            y: self.flip(y1),
        });
        self.commands.push(Command::LineTo {
            x: x2,
            y: self.flip(y2),
        });
        self.commands.push(Command::Stroke);
    }

    /// Embed pre-decoded raster bytes (PNG/JPEG) with the image's top-left
    /// corner at `(x, y)`. Undecodable bytes log a warning and leave the
    /// canvas untouched; a malformed logo must never lose the rest of the
    /// document. Returns whether anything was drawn.
    pub fn place_image(&mut self, x: Pt, y: Pt, width: Pt, height: Pt, bytes: &[u8]) -> bool {
        let decoded = match image::load_from_memory(bytes) {
            Ok(img) => img.to_rgb8(),
            Err(err) => {
                log::warn!("skipping undecodable image ({err})");
                return false;
            }
        };
        let resource_id = image_resource_id(bytes);
        self.images.entry(resource_id.clone()).or_insert(DecodedImage {
            width: decoded.width(),
            height: decoded.height(),
            rgb: decoded.into_raw(),
        });
        self.commands.push(Command::DrawImage {
            x,
            y: self.flip(y + height),
            width,
            height,
            resource_id,
        });
        true
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn finish(self) -> RecordedPage {
        RecordedPage {
            page_size: self.page_size,
            commands: self.commands,
            images: self.images,
        }
    }
}

fn image_resource_id(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut id = String::with_capacity(14);
    id.push_str("Im");
    for byte in digest.iter().take(6) {
        id.push_str(&format!("{byte:02x}"));
    }
    id
}
