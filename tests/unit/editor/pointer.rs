use chrono::TimeZone;

use super::*;

/// Measures every string as a fixed width; errors when `None`.
struct FixedWidth(Option<f64>);

impl TextMeasure for FixedWidth {
    fn measure_text(&mut self, _: &str, _: &str, _: f64) -> DpResult<f64> {
        self.0
            .ok_or_else(|| DpError::evaluation("no fonts registered for text rendering"))
    }
}

fn frame() -> DpFrame {
    let now = chrono::Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let mut f = DpFrame::new("f", "e", "Test", now);
    let ph = &mut f.photo_placeholder;
    ph.x = 100.0;
    ph.y = 100.0;
    ph.width = 200.0;
    ph.height = 200.0;
    let t = &mut f.text_placeholder;
    t.x = 540.0;
    t.y = 760.0;
    t.font_size = 48.0;
    f
}

fn editor(f: &DpFrame) -> Editor {
    Editor::new(f.canvas().unwrap())
}

#[test]
fn dragging_photo_moves_it_by_pointer_delta() {
    let mut f = frame();
    let mut ed = editor(&f);
    let mut m = FixedWidth(None);

    assert!(ed.transition(&mut f, PointerEvent::Down(Point::new(150.0, 150.0)), &mut m));
    assert_eq!(ed.selected(), Some(Element::Photo));
    assert!(matches!(ed.state(), EditorState::DraggingPhoto { .. }));

    assert!(ed.transition(&mut f, PointerEvent::Move(Point::new(170.0, 140.0)), &mut m));
    assert_eq!((f.photo_placeholder.x, f.photo_placeholder.y), (120.0, 90.0));

    assert!(!ed.transition(&mut f, PointerEvent::Up, &mut m));
    assert_eq!(ed.state(), EditorState::Idle);
    assert_eq!(ed.selected(), Some(Element::Photo));
}

#[test]
fn resize_is_floored_at_minimum_size() {
    let mut f = frame();
    let mut ed = editor(&f);
    let mut m = FixedWidth(None);

    ed.transition(&mut f, PointerEvent::Down(Point::new(150.0, 150.0)), &mut m);
    ed.transition(&mut f, PointerEvent::Up, &mut m);

    ed.transition(&mut f, PointerEvent::Down(Point::new(295.0, 295.0)), &mut m);
    assert_eq!(ed.state(), EditorState::ResizingPhoto);

    ed.transition(&mut f, PointerEvent::Move(Point::new(110.0, 110.0)), &mut m);
    assert_eq!(f.photo_placeholder.width, MIN_PLACEHOLDER_SIZE);
    assert_eq!(f.photo_placeholder.height, MIN_PLACEHOLDER_SIZE);

    ed.transition(&mut f, PointerEvent::Move(Point::new(400.0, 350.0)), &mut m);
    assert_eq!(f.photo_placeholder.width, 300.0);
    assert_eq!(f.photo_placeholder.height, 250.0);
}

#[test]
fn handle_only_resizes_a_selected_photo() {
    let mut f = frame();
    let mut ed = editor(&f);
    let mut m = FixedWidth(None);

    ed.transition(&mut f, PointerEvent::Down(Point::new(295.0, 295.0)), &mut m);
    assert!(matches!(ed.state(), EditorState::DraggingPhoto { .. }));
}

#[test]
fn text_wins_over_photo_where_they_overlap() {
    let mut f = frame();
    f.text_placeholder.x = 200.0;
    f.text_placeholder.y = 200.0;
    let mut ed = editor(&f);
    let mut m = FixedWidth(Some(100.0));

    // Centre-aligned 100px box spans x 150..250, y 152..200.
    ed.transition(&mut f, PointerEvent::Down(Point::new(160.0, 190.0)), &mut m);
    assert_eq!(ed.selected(), Some(Element::Text));

    ed.transition(&mut f, PointerEvent::Move(Point::new(170.0, 200.0)), &mut m);
    assert_eq!((f.text_placeholder.x, f.text_placeholder.y), (210.0, 210.0));
    assert_eq!((f.photo_placeholder.x, f.photo_placeholder.y), (100.0, 100.0));
}

#[test]
fn down_on_empty_space_clears_selection() {
    let mut f = frame();
    let mut ed = editor(&f);
    let mut m = FixedWidth(None);

    ed.transition(&mut f, PointerEvent::Down(Point::new(150.0, 150.0)), &mut m);
    ed.transition(&mut f, PointerEvent::Leave, &mut m);
    assert!(ed.transition(&mut f, PointerEvent::Down(Point::new(900.0, 50.0)), &mut m));
    assert_eq!(ed.selected(), None);
    assert_eq!(ed.state(), EditorState::Idle);
    assert!(!ed.transition(&mut f, PointerEvent::Move(Point::new(10.0, 10.0)), &mut m));
}

#[test]
fn viewport_scales_client_points_into_canvas_space() {
    let canvas = Canvas::new(1080, 1080).unwrap();
    let vp = ViewportMapping::new(canvas, Rect::new(10.0, 20.0, 550.0, 560.0)).unwrap();
    assert_eq!(vp.to_canvas(Point::new(20.0, 40.0)), Point::new(20.0, 40.0));
    assert_eq!(vp.to_canvas(Point::new(550.0, 560.0)), Point::new(1080.0, 1080.0));
    assert!(ViewportMapping::new(canvas, Rect::new(0.0, 0.0, 0.0, 10.0)).is_err());
}

#[test]
fn scaled_viewport_drives_drag_in_canvas_units() {
    let mut f = frame();
    let mut ed = editor(&f);
    ed.set_viewport(
        ViewportMapping::new(f.canvas().unwrap(), Rect::new(0.0, 0.0, 540.0, 540.0)).unwrap(),
    );
    let mut m = FixedWidth(None);

    ed.transition(&mut f, PointerEvent::Down(Point::new(75.0, 75.0)), &mut m);
    ed.transition(&mut f, PointerEvent::Move(Point::new(85.0, 70.0)), &mut m);
    assert_eq!((f.photo_placeholder.x, f.photo_placeholder.y), (120.0, 90.0));
}

#[test]
fn canvas_resize_rescales_against_the_same_display_rect() {
    let mut ed = Editor::new(Canvas::new(1080, 1080).unwrap());
    ed.set_display_rect(Rect::new(10.0, 10.0, 550.0, 550.0)).unwrap();
    ed.set_canvas(Canvas::new(2160, 1080).unwrap()).unwrap();

    let vp = ed.viewport();
    assert_eq!(vp.display(), Some(Rect::new(10.0, 10.0, 550.0, 550.0)));
    assert_eq!(vp.to_canvas(Point::new(550.0, 550.0)), Point::new(2160.0, 1080.0));

    let mut plain = Editor::new(Canvas::new(1080, 1080).unwrap());
    plain.set_canvas(Canvas::new(400, 300).unwrap()).unwrap();
    assert_eq!(plain.viewport(), ViewportMapping::identity());
    assert_eq!(plain.viewport().to_canvas(Point::new(7.0, 9.0)), Point::new(7.0, 9.0));
}
