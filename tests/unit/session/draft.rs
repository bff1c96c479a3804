use std::io::Cursor;

use chrono::TimeZone;

use super::*;
use crate::compile::plan::{DrawOp, ImageSlot};
use crate::foundation::core::Point;
use crate::model::frame::TextAlign;
use crate::session::notice::NoticeKind;

fn at(h: u32) -> DateTime<Utc> {
    chrono::Utc.with_ymd_and_hms(2026, 1, 1, h, 0, 0).unwrap()
}

fn draft() -> FrameDraft {
    FrameDraft::new(DpFrame::new("f", "e", "Launch", at(0)), None).unwrap()
}

fn png_upload(w: u32, h: u32) -> Upload {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    Upload::new("frame.png", None, buf)
}

struct FixedWidth(f64);

impl TextMeasure for FixedWidth {
    fn measure_text(&mut self, _: &str, _: &str, _: f64) -> DpResult<f64> {
        Ok(self.0)
    }
}

#[test]
fn frame_image_sets_canvas_size() {
    let mut d = draft();
    d.upload_frame_image(png_upload(320, 240)).unwrap();
    assert_eq!((d.frame().frame_width, d.frame().frame_height), (320, 240));
    assert_eq!(d.frame().frame_image_url, "frame.png");

    let plan = d.plan(&mut FixedWidth(100.0)).unwrap();
    assert_eq!(plan.canvas.width, 320);
    assert_eq!(plan.position_of_image(ImageSlot::Frame), Some(0));
}

#[test]
fn invalid_text_style_is_rolled_back() {
    let mut d = draft();
    d.set_text_style(|t| {
        t.alignment = TextAlign::Left;
        t.font_size = 64.0;
    })
    .unwrap();
    assert_eq!(d.frame().text_placeholder.font_size, 64.0);

    assert!(d.set_text_style(|t| t.color = "not-a-color".into()).is_err());
    assert_eq!(d.frame().text_placeholder.color, "#ffffff");
    assert_eq!(d.frame().text_placeholder.alignment, TextAlign::Left);
}

#[test]
fn selecting_text_adds_its_outline_to_the_preview() {
    let mut d = draft();
    let mut m = FixedWidth(200.0);
    let unselected = d.plan(&mut m).unwrap().ops.len();

    // Default text anchor (540, 760), centred, 48px tall.
    assert!(d.pointer(PointerEvent::Down(Point::new(540.0, 740.0)), &mut m));
    assert_eq!(d.editor().selected(), Some(Element::Text));
    let plan = d.plan(&mut m).unwrap();
    assert_eq!(plan.ops.len(), unselected + 1);
    assert!(matches!(plan.ops.last(), Some(DrawOp::StrokePath { dash: None, .. })));
}

#[test]
fn display_rect_scales_pointer_input() {
    let mut d = draft();
    d.set_display_rect(Rect::new(0.0, 0.0, 540.0, 540.0)).unwrap();
    let mut m = FixedWidth(0.0);
    // Default photo box 340..740; client 300 maps to canvas 600.
    d.pointer(PointerEvent::Down(Point::new(300.0, 300.0)), &mut m);
    d.pointer(PointerEvent::Move(Point::new(310.0, 300.0)), &mut m);
    d.pointer(PointerEvent::Up, &mut m);
    assert_eq!(d.frame().photo_placeholder.x, 360.0);
}

#[test]
fn save_and_publish_stamp_updated_at() {
    let mut d = draft();
    d.set_photo_shape(PlaceholderShape::Star);
    assert_eq!(d.save(at(1)), Notice::success("Frame saved"));
    assert_eq!(d.frame().updated_at, at(1));

    let n = d.publish(at(2));
    assert_eq!(n.kind, NoticeKind::Success);
    assert!(d.frame().is_published);
    assert_eq!(d.frame().updated_at, at(2));

    d.unpublish(at(3));
    let frame = d.into_frame();
    assert!(!frame.is_published);
    assert_eq!(frame.photo_placeholder.shape, PlaceholderShape::Star);
}

#[test]
fn preview_renders_without_fonts() {
    let d = draft();
    let out = d
        .render_preview(&mut CpuRenderer::default(), &mut TextLayoutEngine::new())
        .unwrap();
    assert_eq!((out.width, out.height), (1080, 1080));
    // Transparent outside the placeholder.
    assert_eq!(out.pixel(5, 5), Some([0, 0, 0, 0]));
}

#[test]
fn display_rect_survives_frame_image_upload() {
    let mut d = draft();
    d.set_display_rect(Rect::new(0.0, 0.0, 540.0, 540.0)).unwrap();
    d.upload_frame_image(png_upload(2160, 2160)).unwrap();

    // 2160px canvas shown in 540px: client (100, 75) lands on canvas (400, 300).
    let mut m = FixedWidth(0.0);
    assert!(d.pointer(PointerEvent::Down(Point::new(100.0, 75.0)), &mut m));
    assert_eq!(d.editor().selected(), Some(Element::Photo));
    d.pointer(PointerEvent::Move(Point::new(110.0, 75.0)), &mut m);
    assert_eq!(d.frame().photo_placeholder.x, 380.0);
}

#[test]
fn upload_without_display_rect_maps_one_to_one() {
    let mut d = draft();
    d.upload_frame_image(png_upload(800, 800)).unwrap();
    assert_eq!(d.editor().viewport().display(), None);

    let mut m = FixedWidth(0.0);
    assert!(d.pointer(PointerEvent::Down(Point::new(400.0, 300.0)), &mut m));
    assert_eq!(d.editor().selected(), Some(Element::Photo));
}
