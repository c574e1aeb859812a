use std::fmt;

#[derive(Debug)]
pub enum RenderError {
    /// Content ran past the bottom margin under `OverflowPolicy::Error`.
    /// The engine is single-page; pagination is out of scope.
    PageOverflow,
    /// PDF object assembly or serialization failed. Never retried: the
    /// render is pure, so the same inputs would fail the same way.
    Pdf(String),
    Io(std::io::Error),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::PageOverflow => {
                write!(f, "document content does not fit on a single page")
            }
            RenderError::Pdf(message) => write!(f, "pdf emission error: {}", message),
            RenderError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RenderError {
    fn from(value: std::io::Error) -> Self {
        RenderError::Io(value)
    }
}
