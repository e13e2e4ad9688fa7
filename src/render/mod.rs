//! Annotation rendering.
//!
//! ## Module Structure
//!
//! - [`surface`] - [`Surface`] trait and [`PathCommand`]
//! - [`path`] - Path builders for each shape
//! - [`pipeline`] - [`render_frame`]: full redraw of one frame
//! - [`skia`] - [`PixmapSurface`], the tiny-skia raster backend
//! - [`signature_cache`] - Background decoding of signature data URLs
//! - [`text`] - Glyph outlines for text annotations in exported rasters

pub mod path;
mod pipeline;
mod signature_cache;
mod skia;
mod surface;
mod text;


pub use pipeline::{Frame, FrameStats, ImageLookup, NoImages, render_frame};
pub use signature_cache::{
    DataUrlError, SignatureCache, SignatureEntry, decode_data_url, encode_png_data_url,
    poll_signature_decodes, request_signature_decodes,
};
pub use skia::{PixmapSurface, image_from_pixmap, pixmap_from_image};
pub use surface::{PathCommand, Surface};
pub use text::text_font;

#[cfg(test)]
pub use surface::{RecordingSurface, SurfaceOp};
