//! Left-button input on the surface, fed through the drawing machine.

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::annotation::Point;
use crate::document::OpenDocument;
use crate::drawing::{DrawingMachine, DrawingOutcome};
use crate::geometry::find_annotation_at;
use crate::store::{AnnotationStore, Selection};

use super::params::{SurfaceCursor, is_cursor_over_ui};
use super::tools::{CurrentTool, DrawSettings, tool_context};

/// A click asked for one of the annotation editor dialogs
#[derive(Message, Debug, Clone, PartialEq)]
pub enum AnnotationEditorRequest {
    Text { anchor: Point, page: u32 },
    Signature { anchor: Point, page: u32 },
}

/// Carry out a machine outcome against the store and selection.
///
/// Returns the dialog to open, if any.
pub fn perform_outcome(
    outcome: DrawingOutcome,
    page: u32,
    store: &mut AnnotationStore,
    selection: &mut Selection,
) -> Option<AnnotationEditorRequest> {
    match outcome {
        DrawingOutcome::None => None,
        DrawingOutcome::Commit(annotation) => {
            store.add(annotation);
            None
        }
        DrawingOutcome::SelectAt(point) => {
            if let Some(hit) = find_annotation_at(store.annotations(), page, point) {
                selection.toggle(hit);
            }
            None
        }
        DrawingOutcome::OpenTextEditor { anchor } => {
            Some(AnnotationEditorRequest::Text { anchor, page })
        }
        DrawingOutcome::OpenSignatureEditor { anchor } => {
            Some(AnnotationEditorRequest::Signature { anchor, page })
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn handle_pointer_input(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut contexts: EguiContexts,
    cursor: SurfaceCursor,
    current_tool: Res<CurrentTool>,
    settings: Res<DrawSettings>,
    doc: Res<OpenDocument>,
    mut machine: ResMut<DrawingMachine>,
    mut store: ResMut<AnnotationStore>,
    mut selection: ResMut<Selection>,
    mut editor_requests: MessageWriter<AnnotationEditorRequest>,
    mut last_cursor: Local<Option<Point>>,
) {
    let page = doc.page.max(1);
    let tracked = cursor.logical_pos_unclipped();

    if let Some(p) = tracked
        && *last_cursor != Some(p)
    {
        if machine.is_active() {
            machine.pointer_move(p);
        }
        *last_cursor = Some(p);
    }

    if mouse_button.just_pressed(MouseButton::Left)
        && !is_cursor_over_ui(&mut contexts)
        && let Some(p) = cursor.logical_pos()
    {
        let ctx = tool_context(&current_tool, &settings, &doc);
        let outcome = machine.pointer_down(p, &ctx);
        if let Some(request) = perform_outcome(outcome, page, &mut store, &mut selection) {
            editor_requests.write(request);
        }
    }

    // Releases count wherever the pointer ended up
    if mouse_button.just_released(MouseButton::Left) && machine.is_active() {
        let Some(p) = tracked.or(*last_cursor) else {
            return;
        };
        let ctx = tool_context(&current_tool, &settings, &doc);
        let outcome = machine.pointer_up(p, &ctx);
        if let Some(request) = perform_outcome(outcome, page, &mut store, &mut selection) {
            editor_requests.write(request);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Annotation, Shape, Stamp};

    fn stamp(page: u32) -> Stamp {
        Stamp {
            color: "#000000".to_string(),
            stroke_width: 2.0,
            page,
            timestamp_ms: 0,
        }
    }

    fn rect(page: u32) -> Annotation {
        Annotation::create(
            Shape::rectangle(Point::new(0.0, 0.0), Point::new(50.0, 50.0)),
            &stamp(page),
        )
    }

    #[test]
    fn test_commit_adds_to_store() {
        let mut store = AnnotationStore::default();
        let mut selection = Selection::default();
        let request = perform_outcome(
            DrawingOutcome::Commit(rect(1)),
            1,
            &mut store,
            &mut selection,
        );
        assert!(request.is_none());
        assert_eq!(store.len(), 1);
        assert!(store.can_undo());
    }

    #[test]
    fn test_select_toggles_hit_on_current_page_only() {
        let mut store = AnnotationStore::default();
        let mut selection = Selection::default();
        let on_page_two = rect(2);
        store.add(on_page_two.clone());

        perform_outcome(
            DrawingOutcome::SelectAt(Point::new(10.0, 10.0)),
            1,
            &mut store,
            &mut selection,
        );
        assert!(selection.is_empty());

        perform_outcome(
            DrawingOutcome::SelectAt(Point::new(10.0, 10.0)),
            2,
            &mut store,
            &mut selection,
        );
        assert!(selection.contains(&on_page_two.id));

        perform_outcome(
            DrawingOutcome::SelectAt(Point::new(10.0, 10.0)),
            2,
            &mut store,
            &mut selection,
        );
        assert!(selection.is_empty());
    }

    #[test]
    fn test_click_on_empty_space_keeps_selection() {
        let mut store = AnnotationStore::default();
        let mut selection = Selection::default();
        let annotation = rect(1);
        store.add(annotation.clone());
        selection.toggle(&annotation);

        perform_outcome(
            DrawingOutcome::SelectAt(Point::new(400.0, 400.0)),
            1,
            &mut store,
            &mut selection,
        );
        assert_eq!(selection.total(), 1);
    }

    #[test]
    fn test_dialog_outcomes_become_requests() {
        let mut store = AnnotationStore::default();
        let mut selection = Selection::default();
        let anchor = Point::new(5.0, 6.0);

        assert_eq!(
            perform_outcome(
                DrawingOutcome::OpenTextEditor { anchor },
                3,
                &mut store,
                &mut selection
            ),
            Some(AnnotationEditorRequest::Text { anchor, page: 3 })
        );
        assert_eq!(
            perform_outcome(
                DrawingOutcome::OpenSignatureEditor { anchor },
                3,
                &mut store,
                &mut selection
            ),
            Some(AnnotationEditorRequest::Signature { anchor, page: 3 })
        );
        assert!(store.is_empty());
    }
}
