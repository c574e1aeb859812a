//! Deterministic invoice document rendering: a structured [`Invoice`] plus an
//! optional branding [`Template`] in, fixed-layout PDF bytes out. Layout is
//! explicit cursor arithmetic over embedded font metrics; no layout engine,
//! browser, or markup renderer is involved, and two renders of identical
//! inputs produce byte-identical buffers.

mod canvas;
mod compose;
mod error;
mod font;
mod format;
mod metrics;
mod model;
mod pdf;
mod text;
mod theme;
mod types;

pub use canvas::{Align, Canvas, Command, DecodedImage, RecordedPage, TextStyle};
pub use error::RenderError;
pub use font::{FontFamily, FontId};
pub use metrics::RenderMetrics;
pub use model::{Client, Invoice, InvoiceStatus, LineItem, Project, Template};
pub use text::{LineWrapper, wrap};
pub use theme::Theme;
pub use types::{Color, Margins, Pt, Rect, Size};

use base64::Engine;
use std::path::Path;

/// What to do when composed content runs past the bottom margin. The engine
/// renders onto a single page; this flag makes that capability explicit
/// instead of silently guessing at pagination semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Record everything; the page clips naturally. A warning is logged.
    Clip,
    /// Surface `RenderError::PageOverflow` to the caller.
    Error,
}

/// Render configuration. Immutable once built, so one `Renderer` can serve
/// concurrent render calls from independent threads; each call owns its own
/// canvas for its whole lifetime.
#[derive(Debug, Clone)]
pub struct Renderer {
    page_size: Size,
    margins: Margins,
    overflow: OverflowPolicy,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            page_size: Size::letter(),
            margins: Margins::all(50.0),
            overflow: OverflowPolicy::Clip,
        }
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: Size) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn with_overflow_policy(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    /// Run the section composers in their fixed order, threading the cursor,
    /// and finalize the canvas into a byte buffer. Pure with respect to its
    /// inputs: no network, filesystem, clock, or randomness in layout math.
    pub fn render(
        &self,
        invoice: &Invoice,
        template: Option<&Template>,
    ) -> Result<RenderedDocument, RenderError> {
        let theme = Theme::resolve(template);
        let mut canvas = Canvas::new(self.page_size, self.margins);
        let content_end = compose::compose_document(&mut canvas, invoice, &theme);
        if content_end > canvas.content_bottom() {
            match self.overflow {
                OverflowPolicy::Error => return Err(RenderError::PageOverflow),
                OverflowPolicy::Clip => log::warn!(
                    "content ends at {:.1}pt, past the bottom margin; clipping to one page",
                    content_end.to_f32()
                ),
            }
        }
        let page = canvas.finish();
        let mut metrics = RenderMetrics {
            command_count: page.commands.len(),
            image_count: page.images.len(),
            total_bytes: 0,
        };
        let bytes = pdf::page_to_pdf(&page)?;
        metrics.total_bytes = bytes.len();
        Ok(RenderedDocument { bytes, metrics })
    }
}

/// One render call's output. The download, blob, and data-URI forms are all
/// derived from this same buffer; nothing re-renders.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    bytes: Vec<u8>,
    metrics: RenderMetrics,
}

impl RenderedDocument {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn metrics(&self) -> RenderMetrics {
        self.metrics
    }

    pub fn data_uri(&self) -> String {
        let mut uri = String::from("data:application/pdf;base64,");
        uri.push_str(&base64::engine::general_purpose::STANDARD.encode(&self.bytes));
        uri
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

/// Default-configuration convenience entry point.
pub fn render_invoice(
    invoice: &Invoice,
    template: Option<&Template>,
) -> Result<RenderedDocument, RenderError> {
    Renderer::new().render(invoice, template)
}
