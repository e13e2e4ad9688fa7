//! Centralized constants used across the application.
//!
//! This module contains magic numbers and configuration values that are used
//! in multiple places or would benefit from being named constants.

/// Default window width in pixels
pub const DEFAULT_WINDOW_WIDTH: f32 = 1400.0;

/// Default window height in pixels
pub const DEFAULT_WINDOW_HEIGHT: f32 = 900.0;

/// Maximum number of recent documents to remember in config
pub const MAX_RECENT_DOCUMENTS: usize = 5;

/// Stroke color used when the selected color is blank
pub const DEFAULT_STROKE_COLOR: &str = "#000000";

/// Color selected when the editor starts
pub const INITIAL_SELECTED_COLOR: &str = "#FF0000";

/// Stroke width selected when the editor starts
pub const INITIAL_STROKE_WIDTH: f32 = 2.0;

/// Smallest stroke width an annotation may carry
pub const MIN_STROKE_WIDTH: f32 = 0.5;

/// Font size for new text annotations
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Clicking this close to the first polygon point closes the shape (logical units)
pub const POLYGON_CLOSE_TOLERANCE: f32 = 10.0;

/// Clicking this close to the first curve point closes the shape (logical units)
pub const CURVE_CLOSE_TOLERANCE: f32 = 15.0;

/// Pencil samples closer than this to the previous sample are dropped
pub const FREEHAND_MIN_DISTANCE: f32 = 2.0;

/// Opacity of polygon and triangle fills (and their previews)
pub const SHAPE_FILL_ALPHA: f32 = 0.3;

/// Opacity of the annotation layer when composited over the page for export
pub const EXPORT_OVERLAY_ALPHA: f32 = 0.8;

/// Hit tolerance around straight lines (logical units)
pub const LINE_HIT_TOLERANCE: f32 = 5.0;

/// Size of a committed signature (logical units)
pub const SIGNATURE_WIDTH: f32 = 200.0;
pub const SIGNATURE_HEIGHT: f32 = 100.0;

/// Size of the signature drawing pad (pixels)
pub const SIGNATURE_PAD_WIDTH: f32 = 400.0;
pub const SIGNATURE_PAD_HEIGHT: f32 = 200.0;

/// Viewport zoom limits and button step
pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 10.0;
pub const ZOOM_STEP: f32 = 0.5;

/// Space left around the page when fitting it to the view (pixels)
pub const FIT_MARGIN: f32 = 24.0;

/// Default page raster scale (pixels per PDF point)
pub const DEFAULT_RENDER_SCALE: f32 = 1.5;

/// A4 portrait in PDF points
pub const A4_WIDTH_PT: f32 = 595.28;
pub const A4_HEIGHT_PT: f32 = 841.89;

/// Page size used when a document has none (US Letter, PDF points)
pub const FALLBACK_PAGE_WIDTH: f32 = 612.0;
pub const FALLBACK_PAGE_HEIGHT: f32 = 792.0;
