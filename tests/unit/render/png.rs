use super::*;

#[test]
fn encode_png_unpremultiplies() {
    let frame = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![255, 0, 0, 255, 64, 0, 0, 128],
    };
    let bytes = encode_png(&frame).unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (2, 1));
    assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(decoded.get_pixel(1, 0).0, [128, 0, 0, 128]);
}

#[test]
fn encode_png_rejects_mismatched_buffer() {
    let frame = FrameRGBA {
        width: 4,
        height: 4,
        data: vec![0; 8],
    };
    assert!(matches!(encode_png(&frame), Err(StampError::Render(_))));
}

#[test]
fn write_png_creates_parent_dirs() {
    let dir = std::path::PathBuf::from("target").join("png_unit").join("nested");
    let _ = std::fs::remove_dir_all(&dir);
    let path = dir.join("one.png");
    let frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![0, 0, 255, 255],
    };
    write_png(&frame, &path).unwrap();
    assert!(path.exists());
}
