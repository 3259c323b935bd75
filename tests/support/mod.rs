#![allow(dead_code)]

use std::{io::Cursor, path::PathBuf};

pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("textstamp-tests").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn solid_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

pub fn write_solid_png(dir: &std::path::Path, name: &str, w: u32, h: u32, rgba: [u8; 4]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, solid_png(w, h, rgba)).unwrap();
    path
}

pub fn fields(x: &str, y: &str, size: &str, color: &str, family: &str) -> textstamp::FormFields {
    textstamp::FormFields {
        x: x.to_string(),
        y: y.to_string(),
        font_size: size.to_string(),
        color: color.to_string(),
        font_family: family.to_string(),
    }
}

/// `None` when the machine has no fonts installed; glyph tests skip in that case.
pub fn system_compositor() -> Option<textstamp::CpuCompositor> {
    let fonts = textstamp::FontLibrary::default();
    if fonts.face_count() == 0 {
        return None;
    }
    Some(textstamp::CpuCompositor::new(fonts))
}

pub fn has_reddish_pixel(img: &image::RgbaImage, x0: u32, y0: u32, x1: u32, y1: u32) -> bool {
    for y in y0..y1.min(img.height()) {
        for x in x0..x1.min(img.width()) {
            let [r, g, b, _] = img.get_pixel(x, y).0;
            if r > 200 && g < 120 && b < 120 {
                return true;
            }
        }
    }
    false
}
