use std::io::Cursor;

use chrono::TimeZone;

use super::*;
use crate::compile::plan::{DrawOp, ImageSlot};

fn frame() -> DpFrame {
    let now = chrono::Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let mut f = DpFrame::new("f1", "e1", "Launch", now);
    f.frame_width = 200;
    f.frame_height = 200;
    let ph = &mut f.photo_placeholder;
    ph.x = 50.0;
    ph.y = 50.0;
    ph.width = 100.0;
    ph.height = 100.0;
    f.text_placeholder.x = 100.0;
    f.text_placeholder.y = 190.0;
    f
}

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([200, 40, 40, 255]));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn session() -> GenerationSession {
    GenerationSession::new(frame(), None).unwrap()
}

fn photo_upload() -> Upload {
    Upload::new("me.png", Some("image/png"), png_bytes(40, 20))
}

#[test]
fn name_is_truncated_by_characters() {
    let mut s = session();
    s.set_name(&"é".repeat(40));
    assert_eq!(s.name().chars().count(), MAX_NAME_CHARS);
}

#[test]
fn zoom_is_clamped_on_every_mutation() {
    let mut s = session();
    s.set_zoom(10.0);
    assert_eq!(s.zoom(), MAX_ZOOM);
    s.zoom_by(-5.0);
    assert_eq!(s.zoom(), MIN_ZOOM);
    s.set_zoom(f64::NAN);
    assert_eq!(s.zoom(), MIN_ZOOM);
}

#[test]
fn pan_accumulates() {
    let mut s = session();
    s.pan_to(Vec2::new(5.0, 5.0));
    s.pan_by(Vec2::new(-10.0, 2.5));
    assert_eq!(s.offset(), Vec2::new(-5.0, 7.5));
}

#[test]
fn can_generate_needs_photo_and_name() {
    let mut s = session();
    assert!(!s.can_generate());
    s.set_name("Ada");
    assert!(!s.can_generate());
    s.load_photo(photo_upload()).unwrap();
    assert!(s.can_generate());
    s.set_name("   ");
    assert!(!s.can_generate());
}

#[test]
fn generate_reports_the_missing_field() {
    let mut s = session();
    let mut r = CpuRenderer::default();
    let mut t = TextLayoutEngine::new();
    assert!(matches!(
        s.generate(&mut r, &mut t),
        Err(DpError::MissingRequiredField("photo"))
    ));
    s.load_photo(photo_upload()).unwrap();
    assert!(matches!(
        s.generate(&mut r, &mut t),
        Err(DpError::MissingRequiredField("name"))
    ));
}

#[test]
fn oversized_upload_leaves_state_unchanged() {
    let mut s = session();
    s.load_photo(photo_upload()).unwrap();
    s.set_zoom(2.0);
    let before = s.photo().cloned();

    let mut big = png_bytes(4, 4);
    big.resize(6 * 1024 * 1024, 0);
    let err = s
        .request_photo(Upload::new("big.png", Some("image/png"), big))
        .unwrap_err();
    assert!(matches!(err, DpError::FileTooLarge { .. }));
    assert_eq!(s.photo().cloned(), before);
    assert_eq!(s.zoom(), 2.0);
}

#[test]
fn non_image_upload_is_rejected() {
    let mut s = session();
    let err = s
        .request_photo(Upload::new("notes.txt", Some("text/plain"), b"hi".to_vec()))
        .unwrap_err();
    assert!(matches!(err, DpError::InvalidFileType(_)));
}

#[test]
fn stale_decode_is_discarded() {
    let mut s = session();
    let first = s.request_photo(photo_upload()).unwrap();
    let second = s
        .request_photo(Upload::new("second.png", None, png_bytes(10, 10)))
        .unwrap();

    let second = std::thread::spawn(move || second.decode()).join().unwrap();
    assert!(s.apply_photo(second).unwrap());
    assert!(!s.apply_photo(first.decode()).unwrap());
    assert_eq!(s.photo().unwrap().file_name, "second.png");
}

#[test]
fn cleared_photo_ignores_in_flight_decode() {
    let mut s = session();
    let pending = s.request_photo(photo_upload()).unwrap();
    s.clear_photo();
    assert!(!s.apply_photo(pending.decode()).unwrap());
    assert!(s.photo().is_none());
}

#[test]
fn plan_places_photo_with_zoom_and_offset() {
    let mut s = session();
    s.load_photo(photo_upload()).unwrap();
    s.set_zoom(2.0);
    s.pan_to(Vec2::new(3.0, -4.0));
    let plan = s.plan().unwrap();
    let Some(DrawOp::ClippedImage { slot, dest, .. }) = plan.ops.first() else {
        panic!("photo op expected first");
    };
    assert_eq!(*slot, ImageSlot::Photo);
    // 40x20 at 2x = 80x40 around (100, 100), shifted (3, -4).
    assert_eq!(dest.origin(), crate::foundation::core::Point::new(63.0, 76.0));
    assert_eq!(dest.size(), kurbo::Size::new(80.0, 40.0));
}

#[test]
fn generate_names_and_encodes_the_download() {
    let mut s = session();
    s.load_photo(photo_upload()).unwrap();
    s.set_name("Ada");
    let out = s
        .generate(&mut CpuRenderer::default(), &mut TextLayoutEngine::new())
        .unwrap();
    assert_eq!(out.file_name, "Ada-DP-Launch.png");
    let img = image::load_from_memory(&out.png).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (200, 200));
    assert_eq!(img.get_pixel(100, 100).0, [200, 40, 40, 255]);
    assert_eq!(img.get_pixel(5, 5).0, [0xf1, 0xf5, 0xf9, 0xff]);
}

#[test]
fn reset_discards_everything() {
    let mut s = session();
    s.load_photo(photo_upload()).unwrap();
    s.set_name("Ada");
    s.set_zoom(2.5);
    s.pan_to(Vec2::new(1.0, 1.0));
    s.reset();
    assert!(s.photo().is_none());
    assert_eq!(s.name(), "");
    assert_eq!(s.zoom(), DEFAULT_ZOOM);
    assert_eq!(s.offset(), Vec2::ZERO);
}

#[test]
fn custom_upload_policy_caps_photo_size() {
    let mut s = session().with_upload_policy(UploadPolicy { max_bytes: Some(1024) });
    let mut bytes = png_bytes(4, 4);
    bytes.resize(2048, 0);
    let err = s
        .request_photo(Upload::new("me.png", Some("image/png"), bytes))
        .unwrap_err();
    assert!(matches!(err, DpError::FileTooLarge { limit: 1024, .. }));
    assert_eq!(
        crate::session::notice::Notice::from_error(&err).message,
        "File size must be less than 1KB"
    );

    let mut s = session().with_upload_policy(UploadPolicy::admin());
    let mut big = png_bytes(4, 4);
    big.resize(6 * 1024 * 1024, 0);
    assert!(s.request_photo(Upload::new("big.png", Some("image/png"), big)).is_ok());
}
