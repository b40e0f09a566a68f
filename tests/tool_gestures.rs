use flipbook::color::Rgba;
use flipbook::surface::RasterSurface;
use flipbook::tools::{ShapeLimits, Tool, ToolEngine, ToolKind};

const RED: Rgba = Rgba::opaque(255, 0, 0);

fn blank(width: u32, height: u32) -> RasterSurface {
    RasterSurface::new(width, height, Rgba::WHITE)
}

fn tool(kind: ToolKind) -> Tool {
    Tool { kind, size: 2, color: Rgba::BLACK }
}

#[test]
fn test_update_and_commit_while_idle_are_no_ops() {
    let mut surface = blank(32, 32);
    let before = surface.snapshot();
    let mut engine = ToolEngine::new();
    let limits = ShapeLimits::default();

    engine.update(&mut surface, tool(ToolKind::Pen), limits, 10.0, 10.0);
    let result = engine.commit(&mut surface, tool(ToolKind::Pen), limits, 10.0, 10.0);

    assert!(result.is_none());
    assert_eq!(surface.snapshot(), before);
}

#[test]
fn test_pen_gesture_paints_a_segment() {
    let mut surface = blank(32, 32);
    let mut engine = ToolEngine::new();
    let limits = ShapeLimits::default();
    let pen = tool(ToolKind::Pen);

    engine.begin(&mut surface, pen, 5.0, 10.0);
    assert!(engine.is_active());
    engine.update(&mut surface, pen, limits, 20.0, 10.0);
    let before = engine.commit(&mut surface, pen, limits, 20.0, 10.0).expect("gesture was active");

    assert!(!engine.is_active());
    // Pixels along the path are painted; the snapshot handed back is pristine.
    assert_eq!(surface.pixel(12, 10).unwrap(), Rgba::BLACK);
    let mut pristine = blank(32, 32);
    pristine.restore(&before);
    assert_eq!(pristine.pixel(12, 10).unwrap(), Rgba::WHITE);
}

#[test]
fn test_eraser_writes_full_transparency() {
    let mut surface = blank(32, 32);
    // Paint a solid block first, then erase through it.
    surface.fill_rect(0.0, 0.0, 32.0, 32.0, Rgba::BLACK);
    let mut engine = ToolEngine::new();
    let limits = ShapeLimits::default();
    let eraser = tool(ToolKind::Eraser);

    engine.begin(&mut surface, eraser, 5.0, 16.0);
    engine.update(&mut surface, eraser, limits, 25.0, 16.0);
    engine.commit(&mut surface, eraser, limits, 25.0, 16.0).unwrap();

    // Erased pixels are transparent, not background-colored.
    assert_eq!(surface.pixel(15, 16).unwrap().a, 0);
    assert_eq!(surface.pixel(15, 5).unwrap(), Rgba::BLACK);
}

#[test]
fn test_rectangle_previews_leave_no_residue() {
    let limits = ShapeLimits::default();
    let rect = tool(ToolKind::Rectangle);

    // Many noisy preview updates before the commit point...
    let mut dragged = blank(100, 100);
    let mut engine = ToolEngine::new();
    engine.begin(&mut dragged, rect, 10.0, 10.0);
    for (x, y) in [(90.0, 20.0), (30.0, 80.0), (70.0, 70.0), (15.0, 12.0)] {
        engine.update(&mut dragged, rect, limits, x, y);
    }
    engine.commit(&mut dragged, rect, limits, 50.0, 40.0).unwrap();

    // ...must land pixel-identical to a single-shot draw to the same point.
    let mut direct = blank(100, 100);
    let mut engine = ToolEngine::new();
    engine.begin(&mut direct, rect, 10.0, 10.0);
    engine.commit(&mut direct, rect, limits, 50.0, 40.0).unwrap();

    assert_eq!(dragged, direct);
}

#[test]
fn test_circle_previews_leave_no_residue() {
    let limits = ShapeLimits::default();
    let circle = tool(ToolKind::Circle);

    let mut dragged = blank(100, 100);
    let mut engine = ToolEngine::new();
    engine.begin(&mut dragged, circle, 50.0, 50.0);
    for (x, y) in [(90.0, 50.0), (50.0, 95.0), (20.0, 20.0)] {
        engine.update(&mut dragged, circle, limits, x, y);
    }
    engine.commit(&mut dragged, circle, limits, 70.0, 50.0).unwrap();

    let mut direct = blank(100, 100);
    let mut engine = ToolEngine::new();
    engine.begin(&mut direct, circle, 50.0, 50.0);
    engine.commit(&mut direct, circle, limits, 70.0, 50.0).unwrap();

    assert_eq!(dragged, direct);
}

#[test]
fn test_rectangle_extent_is_clamped() {
    let mut surface = blank(900, 900);
    let mut engine = ToolEngine::new();
    let limits = ShapeLimits::default();
    let rect = tool(ToolKind::Rectangle);

    engine.begin(&mut surface, rect, 10.0, 10.0);
    engine.commit(&mut surface, rect, limits, 800.0, 800.0).unwrap();

    // The outline stops at anchor + 400, not at the pointer.
    assert_eq!(surface.pixel(410, 10).unwrap(), Rgba::BLACK);
    assert_eq!(surface.pixel(600, 10).unwrap(), Rgba::WHITE);
    assert_eq!(surface.pixel(600, 410).unwrap(), Rgba::WHITE);
}

#[test]
fn test_circle_radius_is_clamped() {
    let mut surface = blank(900, 900);
    let mut engine = ToolEngine::new();
    let limits = ShapeLimits::default();
    let circle = tool(ToolKind::Circle);

    engine.begin(&mut surface, circle, 450.0, 450.0);
    engine.commit(&mut surface, circle, limits, 450.0, 880.0).unwrap();

    // Rightmost point of the outline sits at radius 200.
    assert_eq!(surface.pixel(650, 450).unwrap(), Rgba::BLACK);
    assert_eq!(surface.pixel(860, 450).unwrap(), Rgba::WHITE);
}

#[test]
fn test_fill_commit_floods_the_region() {
    let mut surface = blank(20, 20);
    let mut engine = ToolEngine::new();
    let limits = ShapeLimits::default();
    let fill = Tool { kind: ToolKind::Fill, size: 2, color: RED };

    engine.begin(&mut surface, fill, 7.0, 7.0);
    engine.commit(&mut surface, fill, limits, 7.0, 7.0).unwrap();

    assert_eq!(surface.pixel(0, 0).unwrap(), RED);
    assert_eq!(surface.pixel(19, 19).unwrap(), RED);
}

#[test]
fn test_fill_commit_off_surface_is_ignored() {
    let mut surface = blank(20, 20);
    let before = surface.snapshot();
    let mut engine = ToolEngine::new();
    let limits = ShapeLimits::default();
    let fill = Tool { kind: ToolKind::Fill, size: 2, color: RED };

    engine.begin(&mut surface, fill, 5.0, 5.0);
    engine.commit(&mut surface, fill, limits, -3.0, 25.0).unwrap();

    assert_eq!(surface.snapshot(), before);
}

#[test]
fn test_cancel_restores_the_pre_gesture_surface() {
    let mut surface = blank(50, 50);
    let before = surface.snapshot();
    let mut engine = ToolEngine::new();
    let limits = ShapeLimits::default();
    let rect = tool(ToolKind::Rectangle);

    engine.begin(&mut surface, rect, 5.0, 5.0);
    engine.update(&mut surface, rect, limits, 40.0, 40.0);
    assert_ne!(surface.snapshot(), before); // preview is visible

    engine.cancel(&mut surface);
    assert!(!engine.is_active());
    assert_eq!(surface.snapshot(), before);
}

#[test]
fn test_begin_while_active_is_ignored() {
    let mut surface = blank(50, 50);
    let mut engine = ToolEngine::new();
    let limits = ShapeLimits::default();
    let pen = tool(ToolKind::Pen);

    engine.begin(&mut surface, pen, 5.0, 5.0);
    engine.update(&mut surface, pen, limits, 10.0, 5.0);
    engine.begin(&mut surface, pen, 40.0, 40.0); // stray second press

    // The original gesture still commits from its own anchor path.
    engine.update(&mut surface, pen, limits, 15.0, 5.0);
    engine.commit(&mut surface, pen, limits, 15.0, 5.0).unwrap();
    assert_eq!(surface.pixel(12, 5).unwrap(), Rgba::BLACK);
    assert_eq!(surface.pixel(40, 40).unwrap(), Rgba::WHITE);
}
