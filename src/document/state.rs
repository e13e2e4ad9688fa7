//! Resources, messages and task components for the open document.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bevy::prelude::*;
use bevy::tasks::Task;
use image::RgbaImage;

use super::renderer::{DocumentError, PageRenderer, PageSize};

/// Load lifecycle of the document
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub enum DocumentState {
    #[default]
    Empty,
    Loading { path: PathBuf },
    Ready,
    Failed { path: PathBuf, message: String },
}

impl DocumentState {
    pub fn is_loading(&self) -> bool {
        matches!(self, DocumentState::Loading { .. })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, DocumentState::Ready)
    }
}

/// The document currently shown
#[derive(Resource, Default)]
pub struct OpenDocument {
    pub renderer: Option<Arc<dyn PageRenderer>>,
    pub path: Option<PathBuf>,
    /// 1-based current page, 0 when nothing is open
    pub page: u32,
    pub page_count: u32,
    /// Bumped on every successful open, used to drop stale page renders
    pub generation: u64,
}

impl OpenDocument {
    pub fn is_open(&self) -> bool {
        self.renderer.is_some()
    }

    /// File name shown in exports and the title bar
    pub fn file_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string())
    }

    /// File name without the extension, for export defaults
    pub fn file_stem(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_stem)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string())
    }

    pub fn page_size(&self) -> PageSize {
        self.renderer
            .as_ref()
            .and_then(|r| r.page_size(self.page).ok())
            .unwrap_or_default()
    }

    pub fn has_previous(&self) -> bool {
        self.is_open() && self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.is_open() && self.page < self.page_count
    }

    /// Page reached by `step`, or `None` when it stays put
    pub fn resolve_step(&self, step: PageStep) -> Option<u32> {
        if !self.is_open() || self.page_count == 0 {
            return None;
        }
        let target = match step {
            PageStep::Previous => self.page.saturating_sub(1),
            PageStep::Next => self.page + 1,
            PageStep::Goto(page) => page,
        };
        (target >= 1 && target <= self.page_count && target != self.page).then_some(target)
    }
}

/// Raster of the current page
#[derive(Resource, Default)]
pub struct PageRaster {
    pub page: u32,
    pub generation: u64,
    pub image: Option<RgbaImage>,
    /// Page size in points (logical units)
    pub size: PageSize,
    /// Scale the raster was rendered at
    pub scale: f32,
}

impl PageRaster {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStep {
    Previous,
    Next,
    Goto(u32),
}

/// Ask the user for a PDF to open
#[derive(Message)]
pub struct PickDocumentRequest;

#[derive(Message)]
pub struct OpenDocumentRequest {
    pub path: PathBuf,
}

/// Retry the last failed load
#[derive(Message)]
pub struct RetryDocumentLoad;

#[derive(Message)]
pub struct ChangePageRequest(pub PageStep);

/// Sent after a document finished loading
#[derive(Message)]
pub struct DocumentOpened {
    pub page_size: PageSize,
    pub page_count: u32,
}

/// Sent after the current page changed
#[derive(Message)]
pub struct PageChanged {
    pub page: u32,
    pub page_size: PageSize,
}

#[derive(Component)]
pub struct PickDocumentTask(pub Task<Option<PathBuf>>);

pub struct LoadResult {
    pub path: PathBuf,
    pub result: Result<Arc<dyn PageRenderer>, DocumentError>,
}

#[derive(Component)]
pub struct LoadDocumentTask(pub Task<LoadResult>);

#[derive(Component)]
pub struct RenderPageTask {
    pub page: u32,
    pub generation: u64,
    pub scale: f32,
    pub task: Task<Result<RgbaImage, DocumentError>>,
}
