//! End-to-end editing session: gestures, snapshots, and undo/redo.

use cutreel_common::InteractionDefaults;
use cutreel_composition::{Composition, Dim, Element, ElementKind, History, TrackKind};
use cutreel_interaction::{
    CanvasController, CanvasView, DragKind, MediaDescriptor, Selection, TimelineController,
};

fn clip(source: &str, time: f64, duration: f64) -> Element {
    let mut el = Element::new(
        "clip",
        ElementKind::Video {
            source: Some(source.to_string()),
        },
        1080,
        1920,
    );
    el.time = time;
    el.duration = duration;
    el
}

#[test]
fn a_sequence_of_gestures_unwinds_step_by_step() {
    let mut comp = Composition::new(1080, 1920, 30);
    let track = comp.add_track(TrackKind::Video, None);
    let id = comp.add_element(&track, clip("media://a.mp4", 0.0, 5.0)).unwrap();

    let config = InteractionDefaults::default();
    let mut history = History::with_config(&config);
    let mut selection = Selection::new();
    let mut timeline = TimelineController::with_config(&config);
    let mut canvas = CanvasController::new(config);
    let view = CanvasView {
        width: 1080.0,
        height: 1920.0,
    };

    let state0 = comp.clone();

    // Gesture 1: drag the clip to 2.0s on the timeline.
    timeline.begin_drag(&mut comp, &mut history, &selection, &id, DragKind::Move, 0.0);
    timeline.drag_to(&mut comp, 100.0, 100.0);
    timeline.end_drag();
    let state1 = comp.clone();
    assert_eq!(comp.find_element(&id).unwrap().time, 2.0);

    // Gesture 2: select on the canvas and nudge it right.
    canvas.pointer_down(
        &mut comp, &mut history, &mut selection, &view, 3.0, 540.0, 960.0, false,
    );
    canvas.pointer_move(&mut comp, &selection, &view, 3.0, 640.0, 960.0);
    canvas.pointer_up();
    let state2 = comp.clone();
    assert_ne!(state2, state1);

    // Gesture 3: drop music onto a new audio track.
    let audio_track = comp.add_track(TrackKind::Audio, None);
    let media = MediaDescriptor {
        name: "Music".to_string(),
        kind: ElementKind::Audio {
            source: Some("media://m.mp3".to_string()),
        },
        duration: 8.0,
    };
    let dropped = timeline
        .media_drop(&mut comp, &mut history, &audio_track, &media, 0.0, 0.0)
        .unwrap();
    assert!(comp.find_element(&dropped).is_some());

    // Unwind: each undo restores the exact prior state.
    history.undo(&mut comp);
    // The drop snapshot was taken after the audio track was added.
    assert!(comp.find_element(&dropped).is_none());
    assert!(comp.find_track(&audio_track).is_some());

    history.undo(&mut comp);
    assert_eq!(comp, state1);

    history.undo(&mut comp);
    assert_eq!(comp, state0);
    assert_eq!(comp.find_element(&id).unwrap().time, 0.0);

    // And redo walks forward again.
    history.redo(&mut comp);
    assert_eq!(comp, state1);
}

#[test]
fn canvas_move_writes_percentage_geometry() {
    let mut comp = Composition::new(1080, 1920, 30);
    let track = comp.add_track(TrackKind::Overlay, None);
    let mut el = clip("media://a.mp4", 0.0, 5.0);
    el.width = Dim::Px(200.0);
    el.height = Dim::Px(200.0);
    let id = comp.add_element(&track, el).unwrap();

    let mut history = History::default();
    let mut selection = Selection::new();
    let mut canvas = CanvasController::new(InteractionDefaults::default());
    let view = CanvasView {
        width: 540.0,
        height: 960.0,
    };

    // Click the element center (comp 540,960 is screen 270,480 at half
    // scale), then drag 54 screen px right (108 comp px).
    canvas.pointer_down(
        &mut comp, &mut history, &mut selection, &view, 1.0, 270.0, 480.0, false,
    );
    assert_eq!(selection.ids(), [id.clone()]);
    canvas.pointer_move(&mut comp, &selection, &view, 1.0, 324.0, 480.0);
    canvas.pointer_up();

    let el = comp.find_element(&id).unwrap();
    assert_eq!(el.x, Dim::Percent(60.0));
    assert_eq!(el.y, Dim::Percent(50.0));
}
