//! Edit commands shared by the toolbar, the annotation list and the keyboard.

use bevy::prelude::*;

use crate::annotation::AnnotationId;
use crate::document::{ChangePageRequest, OpenDocument, PageStep};
use crate::drawing::DrawingMachine;
use crate::store::{AnnotationStore, Selection};
use crate::transform::ViewportTransform;

use super::surface::SurfaceLayout;
use super::tools::DrawSettings;

#[derive(Message, Debug, Clone, PartialEq)]
pub enum EditCommand {
    CancelGesture,
    Undo,
    Redo,
    DeleteSelection,
    Delete(AnnotationId),
    MergePolygons,
    ClearPage,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    FitPage,
    PreviousPage,
    NextPage,
}

/// One-line feedback shown in the status bar
#[derive(Resource, Debug, Default)]
pub struct StatusMessage(pub Option<String>);

#[allow(clippy::too_many_arguments)]
pub fn apply_edit_commands(
    mut events: MessageReader<EditCommand>,
    mut store: ResMut<AnnotationStore>,
    mut selection: ResMut<Selection>,
    mut machine: ResMut<DrawingMachine>,
    mut viewport: ResMut<ViewportTransform>,
    mut status: ResMut<StatusMessage>,
    mut page_requests: MessageWriter<ChangePageRequest>,
    layout: Res<SurfaceLayout>,
    settings: Res<DrawSettings>,
    doc: Res<OpenDocument>,
) {
    for command in events.read() {
        match command {
            EditCommand::CancelGesture => {
                machine.cancel();
            }
            EditCommand::Undo => {
                if store.undo() {
                    selection.retain_existing(store.annotations());
                } else {
                    debug!("Nothing to undo");
                }
            }
            EditCommand::Redo => {
                if store.redo() {
                    selection.retain_existing(store.annotations());
                } else {
                    debug!("Nothing to redo");
                }
            }
            EditCommand::DeleteSelection => {
                if selection.is_empty() {
                    continue;
                }
                let removed = store.delete_selected(&mut selection);
                status.0 = Some(format!("Deleted {} annotations", removed));
            }
            EditCommand::Delete(id) => {
                if store.delete(id) {
                    selection.retain_existing(store.annotations());
                }
            }
            EditCommand::MergePolygons => {
                let stamp = settings.stamp(doc.page.max(1));
                match store.merge_polygons(&mut selection, &stamp) {
                    Ok(_) => status.0 = Some("Merged polygons".to_string()),
                    Err(e) => {
                        warn!("Merge rejected: {}", e);
                        status.0 = Some(e.to_string());
                    }
                }
            }
            EditCommand::ClearPage => {
                let removed = store.clear_page(doc.page.max(1));
                selection.retain_existing(store.annotations());
                status.0 = Some(format!("Cleared {} annotations", removed));
            }
            EditCommand::ZoomIn => viewport.zoom_in(layout.size),
            EditCommand::ZoomOut => viewport.zoom_out(layout.size),
            EditCommand::ZoomReset => viewport.reset(),
            EditCommand::FitPage => {
                viewport.fit_page(doc.page_size().as_vec2(), layout.size);
            }
            EditCommand::PreviousPage => {
                page_requests.write(ChangePageRequest(PageStep::Previous));
            }
            EditCommand::NextPage => {
                page_requests.write(ChangePageRequest(PageStep::Next));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Annotation, Point, Shape, Stamp};

    fn app() -> App {
        let mut app = App::new();
        app.init_resource::<AnnotationStore>()
            .init_resource::<Selection>()
            .init_resource::<DrawingMachine>()
            .init_resource::<ViewportTransform>()
            .init_resource::<StatusMessage>()
            .init_resource::<SurfaceLayout>()
            .init_resource::<DrawSettings>()
            .init_resource::<OpenDocument>()
            .add_message::<EditCommand>()
            .add_message::<ChangePageRequest>()
            .add_systems(Update, apply_edit_commands);
        app
    }

    fn polygon(offset: f32) -> Annotation {
        let stamp = Stamp {
            color: "#000000".to_string(),
            stroke_width: 1.0,
            page: 1,
            timestamp_ms: 0,
        };
        let points = vec![
            Point::new(offset, 0.0),
            Point::new(offset + 10.0, 0.0),
            Point::new(offset, 10.0),
        ];
        Annotation::create(Shape::Polygon { points }, &stamp)
    }

    #[test]
    fn test_undo_drops_vanished_selection() {
        let mut app = app();
        let annotation = polygon(0.0);
        app.world_mut().resource_mut::<AnnotationStore>().add(annotation.clone());
        app.world_mut().resource_mut::<Selection>().toggle(&annotation);

        app.world_mut().write_message(EditCommand::Undo);
        app.update();

        assert!(app.world().resource::<AnnotationStore>().is_empty());
        assert!(app.world().resource::<Selection>().is_empty());
    }

    #[test]
    fn test_merge_with_one_polygon_reports_error() {
        let mut app = app();
        let annotation = polygon(0.0);
        app.world_mut().resource_mut::<AnnotationStore>().add(annotation.clone());
        app.world_mut().resource_mut::<Selection>().toggle(&annotation);

        app.world_mut().write_message(EditCommand::MergePolygons);
        app.update();

        assert_eq!(app.world().resource::<AnnotationStore>().len(), 1);
        assert!(app.world().resource::<StatusMessage>().0.is_some());
    }

    #[test]
    fn test_merge_two_polygons() {
        let mut app = app();
        let (a, b) = (polygon(0.0), polygon(50.0));
        {
            let mut store = app.world_mut().resource_mut::<AnnotationStore>();
            store.add(a.clone());
            store.add(b.clone());
        }
        {
            let mut selection = app.world_mut().resource_mut::<Selection>();
            selection.toggle(&a);
            selection.toggle(&b);
        }

        app.world_mut().write_message(EditCommand::MergePolygons);
        app.update();

        let store = app.world().resource::<AnnotationStore>();
        assert_eq!(store.len(), 1);
        assert_eq!(store.annotations()[0].shape.points().len(), 6);
        assert!(app.world().resource::<Selection>().polygons().is_empty());
    }

    #[test]
    fn test_zoom_commands() {
        let mut app = app();
        app.world_mut().write_message(EditCommand::ZoomIn);
        app.update();
        assert_eq!(app.world().resource::<ViewportTransform>().zoom, 1.5);

        app.world_mut().write_message(EditCommand::ZoomReset);
        app.update();
        assert_eq!(
            *app.world().resource::<ViewportTransform>(),
            ViewportTransform::default()
        );
    }
}
