//! Export/import requests, save dialogs and background encoding.

use std::collections::HashMap;
use std::path::PathBuf;

use bevy::prelude::*;
use bevy::tasks::{IoTaskPool, Task};
use futures_lite::future;
use image::RgbaImage;

use crate::annotation::{Annotation, Shape};
use crate::config::{AppConfig, UpdateExportDirRequest};
use crate::document::{OpenDocument, PageRaster, PageSize};
use crate::drawing::DrawingMachine;
use crate::render::{ImageLookup, SignatureCache, decode_data_url};
use crate::store::{AnnotationStore, ImportMode, Selection};

use super::composite::{CompositeInput, compose};
use super::pdf::{PdfMetadata, build_pdf};
use super::snapshot::{AnnotationSnapshot, ImportedAnnotations, parse_snapshot};
use super::{ExportError, encode_png};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Png,
    Json,
}

impl ExportFormat {
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "Annotated PDF",
            ExportFormat::Png => "PNG image",
            ExportFormat::Json => "Annotations JSON",
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Png => "png",
            ExportFormat::Json => "json",
        }
    }

    fn default_file_name(&self, stem: &str) -> String {
        match self {
            ExportFormat::Json => "annotations.json".to_string(),
            _ => format!("{}-annotated.{}", stem, self.extension()),
        }
    }
}

#[derive(Message)]
pub struct ExportRequest {
    pub format: ExportFormat,
}

/// Pick a snapshot file and load its annotations
#[derive(Message)]
pub struct ImportRequest;

/// Progress of the last export or import, shown as a dialog
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub enum ExportStatus {
    #[default]
    Idle,
    Working(String),
    Finished(String),
    Failed(String),
}

impl ExportStatus {
    pub fn is_busy(&self) -> bool {
        matches!(self, ExportStatus::Working(_))
    }

    pub fn dismiss(&mut self) {
        *self = ExportStatus::Idle;
    }
}

/// Decoded signatures copied out of the cache for a background task
struct SignatureImages(HashMap<String, RgbaImage>);

impl SignatureImages {
    /// Decode signatures on `page` the cache hadn't finished with yet
    fn decode_missing(&mut self, annotations: &[Annotation], page: u32) {
        for annotation in annotations.iter().filter(|a| a.page == page) {
            let Shape::Signature { data, .. } = &annotation.shape else {
                continue;
            };
            if self.0.contains_key(data) {
                continue;
            }
            match decode_data_url(data) {
                Ok(image) => {
                    debug!("Decoded signature {} for export", annotation.id);
                    self.0.insert(data.clone(), image);
                }
                Err(e) => warn!("Signature {} left out of export: {}", annotation.id, e),
            }
        }
    }
}

impl ImageLookup for SignatureImages {
    fn image(&self, data: &str) -> Option<&RgbaImage> {
        self.0.get(data)
    }
}

/// Everything an export needs, owned so it can move to a task
struct ExportJob {
    format: ExportFormat,
    annotations: Vec<Annotation>,
    page: u32,
    page_size: PageSize,
    page_image: Option<RgbaImage>,
    signatures: SignatureImages,
    file_name: String,
    date: String,
}

impl ExportJob {
    /// Encode the file contents. Called on the IO pool.
    fn encode(&mut self) -> Result<Vec<u8>, ExportError> {
        if self.format == ExportFormat::Json {
            let snapshot =
                AnnotationSnapshot::new(self.annotations.clone(), &self.file_name, chrono::Utc::now());
            return Ok(snapshot.to_json()?.into_bytes());
        }

        self.signatures.decode_missing(&self.annotations, self.page);

        let composite = compose(&CompositeInput {
            page_image: self.page_image.as_ref(),
            page_size: self.page_size,
            page: self.page,
            annotations: &self.annotations,
            images: &self.signatures,
        })?;

        match self.format {
            ExportFormat::Png => encode_png(&composite),
            _ => build_pdf(
                &composite,
                &PdfMetadata {
                    annotation_count: self.annotations.len(),
                    file_name: self.file_name.clone(),
                    date: self.date.clone(),
                },
            ),
        }
    }
}

enum ExportOutcome {
    Cancelled,
    Saved(PathBuf),
    Failed(ExportError),
}

#[derive(Component)]
pub struct ExportTask(Task<ExportOutcome>);

enum ImportOutcome {
    Cancelled,
    Loaded(PathBuf, ImportedAnnotations),
    Failed(ExportError),
}

#[derive(Component)]
pub struct ImportTask(Task<ImportOutcome>);

#[allow(clippy::too_many_arguments)]
pub fn start_export_system(
    mut commands: Commands,
    mut events: MessageReader<ExportRequest>,
    mut status: ResMut<ExportStatus>,
    store: Res<AnnotationStore>,
    doc: Res<OpenDocument>,
    raster: Res<PageRaster>,
    signatures: Res<SignatureCache>,
    config: Res<AppConfig>,
) {
    let Some(request) = events.read().last() else {
        return;
    };
    if status.is_busy() {
        warn!("Export already in progress");
        return;
    }

    let annotations = store.annotations().to_vec();
    let signatures = SignatureImages(
        annotations
            .iter()
            .filter_map(|a| match &a.shape {
                Shape::Signature { data, .. } => signatures
                    .image(data)
                    .map(|image| (data.clone(), image.clone())),
                _ => None,
            })
            .collect(),
    );
    let page_image = (doc.is_open() && raster.page == doc.page && raster.generation == doc.generation)
        .then(|| raster.image.clone())
        .flatten();
    if doc.is_open() && page_image.is_none() {
        warn!("Page raster unavailable, exporting annotations only");
    }

    let mut job = ExportJob {
        format: request.format,
        annotations,
        page: doc.page.max(1),
        page_size: doc.page_size(),
        page_image,
        signatures,
        file_name: doc.file_name(),
        date: chrono::Local::now().format("%Y-%m-%d").to_string(),
    };
    let default_name = request.format.default_file_name(&doc.file_stem());
    let start_dir = crate::paths::export_start_dir(config.data.last_export_dir.as_deref());

    info!("Exporting {}", request.format.label());
    *status = ExportStatus::Working(format!("Exporting {}...", request.format.label()));

    let task_pool = IoTaskPool::get();
    let task = task_pool.spawn(async move {
        let mut dialog = rfd::AsyncFileDialog::new()
            .set_title(format!("Export {}", job.format.label()))
            .set_file_name(default_name)
            .add_filter(job.format.label(), &[job.format.extension()]);
        if let Some(dir) = start_dir {
            dialog = dialog.set_directory(dir);
        }
        let Some(handle) = dialog.save_file().await else {
            return ExportOutcome::Cancelled;
        };
        let path = handle.path().to_path_buf();

        match job.encode().and_then(|bytes| Ok(std::fs::write(&path, bytes)?)) {
            Ok(()) => ExportOutcome::Saved(path),
            Err(e) => ExportOutcome::Failed(e),
        }
    });
    commands.spawn(ExportTask(task));
}

pub fn poll_export_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut ExportTask)>,
    mut status: ResMut<ExportStatus>,
    mut dir_events: MessageWriter<UpdateExportDirRequest>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        let Some(outcome) = future::block_on(future::poll_once(&mut task.0)) else {
            continue;
        };
        commands.entity(entity).despawn();

        *status = match outcome {
            ExportOutcome::Cancelled => {
                debug!("Export cancelled");
                ExportStatus::Idle
            }
            ExportOutcome::Saved(path) => {
                info!("Exported to {:?}", path);
                if let Some(dir) = path.parent() {
                    dir_events.write(UpdateExportDirRequest {
                        dir: dir.to_path_buf(),
                    });
                }
                ExportStatus::Finished(format!("Saved {}", path.display()))
            }
            ExportOutcome::Failed(e) => {
                error!("Export failed: {}", e);
                ExportStatus::Failed(e.to_string())
            }
        };
    }
}

pub fn start_import_system(
    mut commands: Commands,
    mut events: MessageReader<ImportRequest>,
    mut status: ResMut<ExportStatus>,
    pending: Query<(), With<ImportTask>>,
) {
    events.clear();
    if status.is_busy() || !pending.is_empty() {
        return;
    }
    *status = ExportStatus::Working("Importing annotations...".to_string());

    let task_pool = IoTaskPool::get();
    let task = task_pool.spawn(async {
        let Some(handle) = rfd::AsyncFileDialog::new()
            .set_title("Import Annotations")
            .add_filter("Annotations JSON", &["json"])
            .pick_file()
            .await
        else {
            return ImportOutcome::Cancelled;
        };
        let path = handle.path().to_path_buf();

        let parsed = std::fs::read_to_string(&path)
            .map_err(ExportError::from)
            .and_then(|json| parse_snapshot(&json));
        match parsed {
            Ok(imported) => ImportOutcome::Loaded(path, imported),
            Err(e) => ImportOutcome::Failed(e),
        }
    });
    commands.spawn(ImportTask(task));
}

pub fn poll_import_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut ImportTask)>,
    mut status: ResMut<ExportStatus>,
    mut store: ResMut<AnnotationStore>,
    mut selection: ResMut<Selection>,
    mut machine: ResMut<DrawingMachine>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        let Some(outcome) = future::block_on(future::poll_once(&mut task.0)) else {
            continue;
        };
        commands.entity(entity).despawn();

        *status = match outcome {
            ImportOutcome::Cancelled => ExportStatus::Idle,
            ImportOutcome::Failed(e) => {
                error!("Import failed: {}", e);
                ExportStatus::Failed(e.to_string())
            }
            ImportOutcome::Loaded(path, imported) => {
                for reason in &imported.rejected {
                    warn!("Skipped annotation from {:?}: {}", path, reason);
                }
                let count = imported.annotations.len();
                let rejected = imported.rejected.len();

                machine.cancel();
                selection.clear();
                let mode = store.import(imported.annotations);
                debug!("Import mode: {:?}", mode);

                let mut message = format!("Imported {} annotations", count);
                if rejected > 0 {
                    message.push_str(&format!(" ({} invalid records skipped)", rejected));
                }
                if mode == ImportMode::Replaced {
                    message.push_str(". Undo restores the previous annotations.");
                }
                ExportStatus::Finished(message)
            }
        };
    }
}
