use chrono::TimeZone;

use super::*;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
}

const FRAME_JSON: &str = r##"
{
  "id": "frame-1",
  "eventId": "evt-42",
  "name": "DevFest",
  "frameImageUrl": "frames/devfest.png",
  "frameWidth": 1080,
  "frameHeight": 1080,
  "photoPlaceholder": { "x": 340, "y": 200, "width": 400, "height": 400, "shape": "rounded-square", "rotation": 0 },
  "textPlaceholder": { "x": 540, "y": 760, "fontSize": 48, "fontFamily": "Inter, sans-serif", "color": "#ffffff", "alignment": "center" },
  "isPublished": true,
  "createdAt": "2026-03-14T09:30:00Z",
  "updatedAt": "2026-03-14T10:00:00Z"
}
"##;

#[test]
fn parses_camel_case_json() {
    let f = DpFrame::from_json(FRAME_JSON).unwrap();
    assert_eq!(f.event_id, "evt-42");
    assert_eq!(f.photo_placeholder.shape, PlaceholderShape::RoundedSquare);
    assert_eq!(f.text_placeholder.alignment, TextAlign::Center);
    assert_eq!(f.text_placeholder.max_width, None);
    assert!(f.is_published);
    assert_eq!(f.canvas().unwrap(), Canvas::new(1080, 1080).unwrap());
}

#[test]
fn json_roundtrip_preserves_frame() {
    let f = DpFrame::new("f", "e", "Summit", t0());
    let json = f.to_json_pretty().unwrap();
    assert!(json.contains("\"photoPlaceholder\""));
    assert_eq!(DpFrame::from_json(&json).unwrap(), f);
}

#[test]
fn unknown_shape_tag_is_rejected() {
    let bad = FRAME_JSON.replace("rounded-square", "octagon");
    assert!(matches!(DpFrame::from_json(&bad), Err(DpError::Serde(_))));
}

#[test]
fn validation_rejects_bad_geometry_and_color() {
    let mut f = DpFrame::new("f", "e", "Summit", t0());
    f.photo_placeholder.width = 0.0;
    assert!(f.validate().is_err());

    let mut f = DpFrame::new("f", "e", "Summit", t0());
    f.text_placeholder.color = "chartreuse-ish".to_owned();
    assert!(f.validate().is_err());

    let mut f = DpFrame::new("f", "e", "Summit", t0());
    f.frame_width = 0;
    assert!(f.validate().is_err());

    let mut f = DpFrame::new("f", "e", "Summit", t0());
    f.text_placeholder.font_size = -4.0;
    assert!(f.validate().is_err());
}

#[test]
fn text_hit_rect_follows_alignment() {
    let mut t = TextPlaceholder {
        x: 500.0,
        y: 800.0,
        font_size: 40.0,
        ..TextPlaceholder::default()
    };
    t.alignment = TextAlign::Left;
    assert_eq!(t.hit_rect(200.0), Rect::new(500.0, 760.0, 700.0, 800.0));
    t.alignment = TextAlign::Center;
    assert_eq!(t.hit_rect(200.0), Rect::new(400.0, 760.0, 600.0, 800.0));
    t.alignment = TextAlign::Right;
    assert_eq!(t.hit_rect(200.0), Rect::new(300.0, 760.0, 500.0, 800.0));
}

#[test]
fn max_width_caps_fitted_width() {
    let t = TextPlaceholder {
        max_width: Some(120.0),
        ..TextPlaceholder::default()
    };
    assert_eq!(t.fitted_width(300.0), 120.0);
    assert_eq!(t.fitted_width(80.0), 80.0);
}
