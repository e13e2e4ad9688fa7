use image::RgbaImage;
use thiserror::Error;

use crate::constants::{FALLBACK_PAGE_HEIGHT, FALLBACK_PAGE_WIDTH};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF parse error: {0}")]
    Parse(#[from] lopdf::Error),
    #[error("encrypted PDFs are not supported")]
    Encrypted,
    #[error("document has no pages")]
    NoPages,
    #[error("page {page} out of range (page count {page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("renderer error: {0}")]
    Backend(String),
}

/// Page size in PDF points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl Default for PageSize {
    fn default() -> Self {
        Self {
            width: FALLBACK_PAGE_WIDTH,
            height: FALLBACK_PAGE_HEIGHT,
        }
    }
}

impl PageSize {
    pub fn as_vec2(&self) -> bevy::math::Vec2 {
        bevy::math::Vec2::new(self.width, self.height)
    }

    /// Pixel dimensions at `scale`, at least 1×1
    pub fn pixels(&self, scale: f32) -> (u32, u32) {
        let scale = if scale > 0.0 { scale } else { 1.0 };
        (
            (self.width * scale).round().max(1.0) as u32,
            (self.height * scale).round().max(1.0) as u32,
        )
    }
}

/// Rasterizes the pages of one open document. Pages are 1-based.
pub trait PageRenderer: Send + Sync {
    fn backend_name(&self) -> &'static str;

    fn page_count(&self) -> u32;

    fn page_size(&self, page: u32) -> Result<PageSize, DocumentError>;

    fn render_page(&self, page: u32, scale: f32) -> Result<RgbaImage, DocumentError>;
}

pub(crate) fn page_index(page: u32, page_count: u32) -> Result<usize, DocumentError> {
    if page == 0 || page > page_count {
        return Err(DocumentError::PageOutOfRange { page, page_count });
    }
    Ok((page - 1) as usize)
}

/// Open `bytes` with the best available backend
pub fn open_renderer(bytes: Vec<u8>) -> Result<Box<dyn PageRenderer>, DocumentError> {
    #[cfg(feature = "pdfium")]
    {
        match super::pdfium_backend::PdfiumRenderer::from_bytes(bytes.clone()) {
            Ok(renderer) => return Ok(Box::new(renderer)),
            Err(e) => bevy::log::warn!("pdfium unavailable, falling back to lopdf: {}", e),
        }
    }

    Ok(Box::new(super::lopdf_backend::LopdfRenderer::from_bytes(&bytes)?))
}
