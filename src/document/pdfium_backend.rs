//! Full page rasterization through a pdfium shared library.

use image::RgbaImage;
use pdfium_render::prelude::*;

use super::renderer::{DocumentError, PageRenderer, PageSize, page_index};

pub struct PdfiumRenderer {
    bytes: Vec<u8>,
    page_sizes: Vec<PageSize>,
}

/// Bind next to the executable first, then the system library
fn bind() -> Result<Pdfium, DocumentError> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()));

    if let Some(dir) = exe_dir
        && let Ok(bindings) = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
    {
        return Ok(Pdfium::new(bindings));
    }

    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| DocumentError::Backend(e.to_string()))
}

fn backend_error(e: PdfiumError) -> DocumentError {
    DocumentError::Backend(e.to_string())
}

impl PdfiumRenderer {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, DocumentError> {
        let pdfium = bind()?;
        let page_sizes = {
            let document = pdfium
                .load_pdf_from_byte_slice(&bytes, None)
                .map_err(backend_error)?;
            document
                .pages()
                .iter()
                .map(|page| PageSize {
                    width: page.width().value,
                    height: page.height().value,
                })
                .collect::<Vec<_>>()
        };

        if page_sizes.is_empty() {
            return Err(DocumentError::NoPages);
        }
        Ok(Self { bytes, page_sizes })
    }
}

impl PageRenderer for PdfiumRenderer {
    fn backend_name(&self) -> &'static str {
        "pdfium"
    }

    fn page_count(&self) -> u32 {
        self.page_sizes.len() as u32
    }

    fn page_size(&self, page: u32) -> Result<PageSize, DocumentError> {
        let index = page_index(page, self.page_count())?;
        Ok(self.page_sizes[index])
    }

    fn render_page(&self, page: u32, scale: f32) -> Result<RgbaImage, DocumentError> {
        let index = page_index(page, self.page_count())?;
        let (width, height) = self.page_sizes[index].pixels(scale);

        let pdfium = bind()?;
        let document = pdfium
            .load_pdf_from_byte_slice(&self.bytes, None)
            .map_err(backend_error)?;
        let pdf_page = document
            .pages()
            .get(index as u16)
            .map_err(backend_error)?;

        let config = PdfRenderConfig::new()
            .set_target_width(width as i32)
            .set_target_height(height as i32);
        let bitmap = pdf_page.render_with_config(&config).map_err(backend_error)?;

        RgbaImage::from_raw(
            bitmap.width() as u32,
            bitmap.height() as u32,
            bitmap.as_rgba_bytes().to_vec(),
        )
        .ok_or_else(|| DocumentError::Backend("bitmap size mismatch".to_string()))
    }
}
