//! The PDF being annotated.
//!
//! ## Module Structure
//!
//! - [`renderer`] - [`PageRenderer`] trait, [`DocumentError`], backend selection
//! - [`lopdf_backend`] - Page structure through lopdf, blank page rasters
//! - `pdfium_backend` - Real rasterization (feature `pdfium`)
//! - [`state`] - Resources, messages and task components
//! - [`systems`] - Async load, navigation and render systems
//!
//! Loading and page rendering run on task pools; systems poll the tasks and
//! drop results that belong to a page or document no longer shown.

mod lopdf_backend;
#[cfg(feature = "pdfium")]
mod pdfium_backend;
mod renderer;
mod state;
mod systems;

pub use lopdf_backend::LopdfRenderer;
#[cfg(feature = "pdfium")]
pub use pdfium_backend::PdfiumRenderer;
pub use renderer::{DocumentError, PageRenderer, PageSize, open_renderer};
pub use state::{
    ChangePageRequest, DocumentOpened, DocumentState, OpenDocument, OpenDocumentRequest,
    PageChanged, PageRaster, PageStep, PickDocumentRequest, RetryDocumentLoad,
};

use bevy::prelude::*;

pub struct DocumentPlugin;

impl Plugin for DocumentPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DocumentState>()
            .init_resource::<OpenDocument>()
            .init_resource::<PageRaster>()
            .add_message::<PickDocumentRequest>()
            .add_message::<OpenDocumentRequest>()
            .add_message::<RetryDocumentLoad>()
            .add_message::<ChangePageRequest>()
            .add_message::<DocumentOpened>()
            .add_message::<PageChanged>()
            .add_systems(
                Update,
                (
                    systems::pick_document_system.run_if(on_message::<PickDocumentRequest>),
                    systems::poll_pick_tasks,
                    systems::open_document_system.run_if(on_message::<OpenDocumentRequest>),
                    systems::retry_document_system.run_if(on_message::<RetryDocumentLoad>),
                    systems::poll_load_tasks,
                    systems::change_page_system.run_if(on_message::<ChangePageRequest>),
                    systems::poll_render_tasks,
                )
                    .chain(),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct FakeRenderer(u32);

    impl PageRenderer for FakeRenderer {
        fn backend_name(&self) -> &'static str {
            "fake"
        }

        fn page_count(&self) -> u32 {
            self.0
        }

        fn page_size(&self, _page: u32) -> Result<PageSize, DocumentError> {
            Ok(PageSize::default())
        }

        fn render_page(&self, _page: u32, _scale: f32) -> Result<image::RgbaImage, DocumentError> {
            Ok(image::RgbaImage::new(1, 1))
        }
    }

    fn open(page: u32, page_count: u32) -> OpenDocument {
        OpenDocument {
            renderer: Some(Arc::new(FakeRenderer(page_count))),
            path: Some("/tmp/report.pdf".into()),
            page,
            page_count,
            generation: 1,
        }
    }

    #[test]
    fn test_page_steps_stay_in_range() {
        let doc = open(1, 3);
        assert_eq!(doc.resolve_step(PageStep::Previous), None);
        assert_eq!(doc.resolve_step(PageStep::Next), Some(2));
        assert_eq!(doc.resolve_step(PageStep::Goto(3)), Some(3));
        assert_eq!(doc.resolve_step(PageStep::Goto(4)), None);
        assert_eq!(doc.resolve_step(PageStep::Goto(1)), None);

        let last = open(3, 3);
        assert_eq!(last.resolve_step(PageStep::Next), None);
        assert!(last.has_previous());
        assert!(!last.has_next());
    }

    #[test]
    fn test_no_navigation_without_document() {
        let doc = OpenDocument::default();
        assert_eq!(doc.resolve_step(PageStep::Next), None);
        assert!(!doc.has_next());
        assert_eq!(doc.page_size(), PageSize::default());
    }

    #[test]
    fn test_file_names() {
        let doc = open(1, 1);
        assert_eq!(doc.file_name(), "report.pdf");
        assert_eq!(doc.file_stem(), "report");
        assert_eq!(OpenDocument::default().file_name(), "document.pdf");
    }

    #[test]
    fn test_page_size_pixels() {
        let size = PageSize {
            width: 100.0,
            height: 50.0,
        };
        assert_eq!(size.pixels(1.5), (150, 75));
        assert_eq!(size.pixels(0.0), (100, 50));
    }

    #[test]
    fn test_open_renderer_rejects_garbage() {
        assert!(open_renderer(b"%PDF-nope".to_vec()).is_err());
    }
}
