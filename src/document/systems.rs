//! Document load, page navigation and page rasterization systems.

use std::path::PathBuf;
use std::sync::Arc;

use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, IoTaskPool};
use futures_lite::future;

use crate::config::{AddRecentDocumentRequest, AppConfig};

use super::renderer::{PageRenderer, open_renderer};
use super::state::{
    ChangePageRequest, DocumentOpened, DocumentState, LoadDocumentTask, LoadResult, OpenDocument,
    OpenDocumentRequest, PageChanged, PageRaster, PickDocumentRequest, PickDocumentTask,
    RenderPageTask, RetryDocumentLoad,
};

/// Opens the native file picker without blocking the frame
pub fn pick_document_system(
    mut commands: Commands,
    mut events: MessageReader<PickDocumentRequest>,
    pending: Query<(), With<PickDocumentTask>>,
) {
    events.clear();
    if !pending.is_empty() {
        return;
    }

    let task_pool = AsyncComputeTaskPool::get();
    let task = task_pool.spawn(async {
        rfd::AsyncFileDialog::new()
            .set_title("Open PDF")
            .add_filter("PDF", &["pdf"])
            .pick_file()
            .await
            .map(|h| h.path().to_path_buf())
    });
    commands.spawn(PickDocumentTask(task));
}

pub fn poll_pick_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut PickDocumentTask)>,
    mut open_events: MessageWriter<OpenDocumentRequest>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut task.0)) {
            if let Some(path) = result {
                open_events.write(OpenDocumentRequest { path });
            }
            commands.entity(entity).despawn();
        }
    }
}

fn spawn_load(commands: &mut Commands, state: &mut DocumentState, path: PathBuf) {
    info!("Loading document {:?}", path);
    *state = DocumentState::Loading { path: path.clone() };

    let task_pool = IoTaskPool::get();
    let task = task_pool.spawn(async move {
        let result = std::fs::read(&path)
            .map_err(Into::into)
            .and_then(open_renderer)
            .map(Arc::<dyn PageRenderer>::from);
        LoadResult { path, result }
    });
    commands.spawn(LoadDocumentTask(task));
}

/// Starts an async load for each open request
pub fn open_document_system(
    mut commands: Commands,
    mut events: MessageReader<OpenDocumentRequest>,
    mut state: ResMut<DocumentState>,
) {
    // Only the latest request matters
    let Some(event) = events.read().last() else {
        return;
    };
    if state.is_loading() {
        warn!("Document load already in progress");
        return;
    }
    spawn_load(&mut commands, &mut state, event.path.clone());
}

pub fn retry_document_system(
    mut commands: Commands,
    mut events: MessageReader<RetryDocumentLoad>,
    mut state: ResMut<DocumentState>,
) {
    events.clear();
    let DocumentState::Failed { path, .. } = &*state else {
        return;
    };
    let path = path.clone();
    spawn_load(&mut commands, &mut state, path);
}

fn spawn_page_render(commands: &mut Commands, doc: &OpenDocument, scale: f32) {
    let Some(renderer) = doc.renderer.clone() else {
        return;
    };
    let page = doc.page;
    let task_pool = AsyncComputeTaskPool::get();
    let task = task_pool.spawn(async move { renderer.render_page(page, scale) });
    commands.spawn(RenderPageTask {
        page,
        generation: doc.generation,
        scale,
        task,
    });
}

#[allow(clippy::too_many_arguments)]
pub fn poll_load_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut LoadDocumentTask)>,
    mut state: ResMut<DocumentState>,
    mut doc: ResMut<OpenDocument>,
    mut raster: ResMut<PageRaster>,
    config: Res<AppConfig>,
    mut opened_events: MessageWriter<DocumentOpened>,
    mut recent_events: MessageWriter<AddRecentDocumentRequest>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        let Some(loaded) = future::block_on(future::poll_once(&mut task.0)) else {
            continue;
        };
        commands.entity(entity).despawn();

        match loaded.result {
            Ok(renderer) => {
                info!(
                    "Opened {:?}: {} pages ({} backend)",
                    loaded.path,
                    renderer.page_count(),
                    renderer.backend_name()
                );
                doc.page_count = renderer.page_count();
                doc.renderer = Some(renderer);
                doc.path = Some(loaded.path.clone());
                doc.page = 1;
                doc.generation += 1;
                *state = DocumentState::Ready;

                let page_size = doc.page_size();
                raster.clear();
                raster.size = page_size;

                spawn_page_render(&mut commands, &doc, config.data.render_scale);
                opened_events.write(DocumentOpened {
                    page_size,
                    page_count: doc.page_count,
                });
                recent_events.write(AddRecentDocumentRequest { path: loaded.path });
            }
            Err(e) => {
                error!("Failed to open {:?}: {}", loaded.path, e);
                *state = DocumentState::Failed {
                    path: loaded.path,
                    message: e.to_string(),
                };
            }
        }
    }
}

pub fn change_page_system(
    mut commands: Commands,
    mut events: MessageReader<ChangePageRequest>,
    mut doc: ResMut<OpenDocument>,
    mut raster: ResMut<PageRaster>,
    config: Res<AppConfig>,
    mut changed_events: MessageWriter<PageChanged>,
) {
    for ChangePageRequest(step) in events.read() {
        let Some(page) = doc.resolve_step(*step) else {
            continue;
        };
        doc.page = page;
        let page_size = doc.page_size();
        debug!("Showing page {} of {}", page, doc.page_count);

        // Keep the old raster until the new one is ready, but fix the size now
        raster.size = page_size;
        spawn_page_render(&mut commands, &doc, config.data.render_scale);
        changed_events.write(PageChanged { page, page_size });
    }
}

pub fn poll_render_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut RenderPageTask)>,
    doc: Res<OpenDocument>,
    mut raster: ResMut<PageRaster>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        let Some(result) = future::block_on(future::poll_once(&mut task.task)) else {
            continue;
        };
        commands.entity(entity).despawn();

        // A newer page or document replaced this one while it rendered
        if task.generation != doc.generation || task.page != doc.page {
            continue;
        }

        match result {
            Ok(image) => {
                raster.page = task.page;
                raster.generation = task.generation;
                raster.scale = task.scale;
                raster.size = doc.page_size();
                raster.image = Some(image);
            }
            Err(e) => {
                warn!("Failed to render page {}: {}", task.page, e);
                raster.page = task.page;
                raster.generation = task.generation;
                raster.image = None;
            }
        }
    }
}
