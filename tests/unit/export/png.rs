use super::*;

fn frame() -> FrameRGBA {
    FrameRGBA {
        width: 2,
        height: 1,
        data: vec![128, 0, 0, 128, 0, 0, 0, 0],
        premultiplied: true,
    }
}

#[test]
fn file_name_uses_attendee_and_frame() {
    assert_eq!(export_file_name("Ada", "Launch 2026"), "Ada-DP-Launch 2026.png");
}

#[test]
fn file_name_falls_back_for_blank_names() {
    assert_eq!(export_file_name("  ", "Launch"), "My-DP-Launch.png");
}

#[test]
fn file_name_never_contains_path_separators() {
    assert_eq!(export_file_name("a/b", "c\\d"), "a_b-DP-c_d.png");
}

#[test]
fn straight_copy_unpremultiplies() {
    let data = straight_rgba8(&frame()).unwrap();
    assert_eq!(&data[..4], &[255, 0, 0, 128]);
    assert_eq!(&data[4..], &[0, 0, 0, 0]);
}

#[test]
fn png_round_trips_through_image() {
    let png = encode_png(&frame()).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (2, 1));
    assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0, 128]);
}

#[test]
fn mismatched_buffer_is_rejected() {
    let mut f = frame();
    f.data.pop();
    assert!(matches!(encode_png(&f), Err(DpError::Evaluation(_))));
}
