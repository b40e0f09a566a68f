use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use flipbook::color::Rgba;
use flipbook::event::{EventHandler, StudioEvent};
use flipbook::frame::SequenceError;
use flipbook::store::{FrameRecord, MemoryStore, ProjectStore};
use flipbook::studio::{Studio, StudioConfig, StudioError};
use flipbook::surface::RasterSurface;
use flipbook::tools::ToolKind;

const PROJECT: &str = "proj-1";

fn small_config() -> StudioConfig {
    StudioConfig {
        width: 16,
        height: 12,
        thumbnail_width: 4,
        thumbnail_height: 3,
        ..StudioConfig::default()
    }
}

fn open_studio(store: Arc<MemoryStore>) -> Studio<Arc<MemoryStore>> {
    Studio::new(PROJECT, store, 12, small_config()).unwrap()
}

/// Collects emitted events for assertions.
struct Collector(Rc<RefCell<Vec<StudioEvent>>>);

impl EventHandler for Collector {
    fn handle_event(&mut self, event: &StudioEvent) {
        self.0.borrow_mut().push(event.clone());
    }
}

fn subscribe(studio: &Studio<Arc<MemoryStore>>) -> Rc<RefCell<Vec<StudioEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    studio.events().subscribe(Box::new(Collector(events.clone())));
    events
}

/// Draw a short pen segment and commit it.
fn pen_mark(studio: &mut Studio<Arc<MemoryStore>>) {
    studio.set_tool(ToolKind::Pen);
    studio.pointer_begin(2.0, 2.0);
    studio.pointer_update(8.0, 2.0);
    studio.pointer_commit(8.0, 2.0).unwrap();
}

#[test]
fn test_new_project_starts_with_one_blank_frame() {
    let studio = open_studio(Arc::new(MemoryStore::new()));

    assert_eq!(studio.frame_count(), 1);
    assert_eq!(studio.current_index(), 0);
    assert_eq!(studio.surface().width(), 16);
    assert_eq!(studio.surface().height(), 12);
    assert_eq!(studio.surface().pixel(8, 6).unwrap(), Rgba::WHITE);
}

#[test]
fn test_existing_frames_load_into_the_live_surface() {
    let store = Arc::new(MemoryStore::new());
    let red = RasterSurface::new(16, 12, Rgba::opaque(255, 0, 0));
    store
        .save_frame(
            PROJECT,
            FrameRecord {
                frame_index: 0,
                raster: red.encode().unwrap(),
                thumbnail: red.thumbnail(4, 3).unwrap(),
            },
        )
        .unwrap();

    let studio = open_studio(store);

    assert_eq!(studio.frame_count(), 1);
    assert_eq!(studio.surface().pixel(0, 0).unwrap(), Rgba::opaque(255, 0, 0));
}

#[test]
fn test_commit_updates_the_frame_and_saves_it() {
    let store = Arc::new(MemoryStore::new());
    let mut studio = open_studio(store.clone());

    pen_mark(&mut studio);

    assert_eq!(studio.surface().pixel(5, 2).unwrap(), Rgba::BLACK);

    let record = store.frame(PROJECT, 0).expect("commit reached the store");
    assert_eq!(RasterSurface::decode(&record.raster).unwrap(), *studio.surface());
    let thumb = RasterSurface::decode(&record.thumbnail).unwrap();
    assert_eq!((thumb.width(), thumb.height()), (4, 3));
}

#[test]
fn test_failed_saves_are_non_fatal() {
    let store = Arc::new(MemoryStore::new());
    let mut studio = open_studio(store.clone());
    let events = subscribe(&studio);

    store.set_fail_writes(true);
    pen_mark(&mut studio); // must not error

    // In-memory state is authoritative and fully updated...
    assert_eq!(studio.surface().pixel(5, 2).unwrap(), Rgba::BLACK);
    assert_eq!(studio.frames().current().raster, studio.surface().encode().unwrap());
    // ...while the store saw nothing and the failure surfaced as an event.
    assert_eq!(store.frame_count(PROJECT), 0);
    let events = events.borrow();
    assert!(events.iter().any(|e| matches!(e, StudioEvent::FrameCommitted { index: 0 })));
    assert!(events.iter().any(|e| matches!(e, StudioEvent::SaveFailed { index: 0, .. })));
}

#[test]
fn test_commit_then_undo_restores_every_tool() {
    for kind in [ToolKind::Pen, ToolKind::Rectangle, ToolKind::Circle, ToolKind::Fill, ToolKind::Eraser] {
        let mut studio = open_studio(Arc::new(MemoryStore::new()));
        studio.set_tool(kind);
        let before = studio.surface().snapshot();

        studio.pointer_begin(3.0, 3.0);
        studio.pointer_update(10.0, 8.0);
        studio.pointer_commit(10.0, 8.0).unwrap();
        let after = studio.surface().snapshot();
        assert!(studio.can_undo(), "{kind} commit must be undoable");

        studio.undo().unwrap();
        assert_eq!(studio.surface().snapshot(), before, "{kind} undo must restore the pre-commit surface");

        studio.redo().unwrap();
        assert_eq!(studio.surface().snapshot(), after, "{kind} redo must restore the post-commit surface");
    }
}

#[test]
fn test_undo_with_empty_history_is_a_quiet_no_op() {
    let mut studio = open_studio(Arc::new(MemoryStore::new()));
    let before = studio.surface().snapshot();

    assert!(!studio.can_undo());
    studio.undo().unwrap();
    assert_eq!(studio.surface().snapshot(), before);
}

#[test]
fn test_switching_tools_cancels_the_gesture_in_flight() {
    let mut studio = open_studio(Arc::new(MemoryStore::new()));
    let before = studio.surface().snapshot();

    studio.set_tool(ToolKind::Rectangle);
    studio.pointer_begin(1.0, 1.0);
    studio.pointer_update(12.0, 9.0);
    assert_ne!(studio.surface().snapshot(), before); // preview on screen

    studio.set_tool(ToolKind::Pen);
    assert_eq!(studio.surface().snapshot(), before);
    assert!(!studio.can_undo()); // nothing was committed
}

#[test]
fn test_frame_switch_clears_history() {
    let mut studio = open_studio(Arc::new(MemoryStore::new()));
    pen_mark(&mut studio);
    assert!(studio.can_undo());

    studio.insert_frame().unwrap();
    assert!(!studio.can_undo());
    assert_eq!(studio.current_index(), 1);
    assert_eq!(studio.frame_count(), 2);
    // The new frame is blank.
    assert_eq!(studio.surface().pixel(5, 2).unwrap(), Rgba::WHITE);
}

#[test]
fn test_delete_last_frame_is_rejected() {
    let mut studio = open_studio(Arc::new(MemoryStore::new()));
    let err = studio.delete_frame().unwrap_err();
    assert!(matches!(err, StudioError::Sequence(SequenceError::LastFrame)));
    assert_eq!(studio.frame_count(), 1);
}

#[test]
fn test_select_frame_validates_the_index() {
    let mut studio = open_studio(Arc::new(MemoryStore::new()));
    let err = studio.select_frame(5).unwrap_err();
    assert!(matches!(
        err,
        StudioError::Sequence(SequenceError::IndexOutOfRange { index: 5, count: 1 })
    ));
}

#[test]
fn test_playback_ticks_load_frames_into_the_live_surface() {
    let mut studio = open_studio(Arc::new(MemoryStore::new()));
    pen_mark(&mut studio); // frame 0 carries the mark
    studio.insert_frame().unwrap(); // frame 1 is blank and current

    studio.play();
    assert!(studio.is_playing());
    let interval = Duration::from_nanos(1_000_000_000 / 12);

    assert!(!studio.tick(Duration::ZERO).unwrap()); // anchor only
    assert!(studio.tick(interval).unwrap());

    // Wrapped from frame 1 back to frame 0; the live surface shows the mark.
    assert_eq!(studio.current_index(), 0);
    assert_eq!(studio.surface().pixel(5, 2).unwrap(), Rgba::BLACK);

    studio.pause();
    assert!(!studio.is_playing());
    assert!(!studio.tick(Duration::from_secs(10)).unwrap()); // late tick is dead
}

#[test]
fn test_composited_view_blends_the_ghost_over_the_live_surface() {
    let mut studio = open_studio(Arc::new(MemoryStore::new()));
    // Flood frame 0 black, then move to a fresh blank frame.
    studio.set_tool(ToolKind::Fill);
    studio.pointer_begin(4.0, 4.0);
    studio.pointer_commit(4.0, 4.0).unwrap();
    studio.insert_frame().unwrap();

    let ghosted = studio.composited().unwrap();
    let pixel = ghosted.pixel(8, 6).unwrap();
    assert!(pixel.r < 255, "previous-frame ghost must darken the view");

    studio.set_onion_enabled(false);
    assert_eq!(studio.composited().unwrap(), *studio.surface());
}

#[test]
fn test_export_animation_lists_every_frame_with_the_rate() {
    let mut studio = open_studio(Arc::new(MemoryStore::new()));
    pen_mark(&mut studio);
    studio.insert_frame().unwrap();

    let json = studio.export_animation().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["fps"], 12);
    assert_eq!(value["frames"].as_array().unwrap().len(), 2);
}

#[test]
fn test_brush_size_and_color_setters_clamp_and_parse() {
    let mut studio = open_studio(Arc::new(MemoryStore::new()));

    studio.set_brush_size(0);
    assert_eq!(studio.tool().size, 1);
    studio.set_brush_size(500);
    assert_eq!(studio.tool().size, 50);

    studio.set_color_hex("#ff0080");
    assert_eq!(studio.tool().color, Rgba::opaque(255, 0, 128));
    studio.set_color_hex("not-a-color");
    assert_eq!(studio.tool().color, Rgba::BLACK);
}
