//! Export and import of annotated documents.
//!
//! ## Module Structure
//!
//! - [`snapshot`] - JSON snapshot of the annotation collection (and import)
//! - [`composite`] - Page raster with the annotation overlay, flattened
//! - [`pdf`] - A4 PDF wrapping the composite, with a metadata footer
//! - [`systems`] - Save/open dialogs and background encode tasks
//!
//! PNG export is the composite encoded directly.

mod composite;
mod pdf;
mod snapshot;
mod systems;

use std::io::Cursor;

use bevy::prelude::*;
use image::{ImageFormat, RgbaImage};
use thiserror::Error;

pub use composite::{CompositeInput, compose, fit_centered};
pub use pdf::{PdfMetadata, build_pdf};
pub use snapshot::{AnnotationSnapshot, ImportedAnnotations, parse_snapshot};
pub use systems::{ExportFormat, ExportRequest, ExportStatus, ImportRequest};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("PDF writing failed: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("nothing to export: the image is empty")]
    EmptyImage,
    #[error("file is not an annotation snapshot")]
    NotASnapshot,
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ExportError::EmptyImage);
    }
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

pub struct ExportPlugin;

impl Plugin for ExportPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ExportStatus>()
            .add_message::<ExportRequest>()
            .add_message::<ImportRequest>()
            .add_systems(
                Update,
                (
                    systems::start_export_system.run_if(on_message::<ExportRequest>),
                    systems::poll_export_tasks,
                    systems::start_import_system.run_if(on_message::<ImportRequest>),
                    systems::poll_import_tasks,
                ),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_is_decodable() {
        let image = RgbaImage::from_pixel(3, 2, image::Rgba([9, 8, 7, 255]));
        let bytes = encode_png(&image).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_empty_png_rejected() {
        assert!(matches!(
            encode_png(&RgbaImage::new(0, 3)),
            Err(ExportError::EmptyImage)
        ));
    }
}
