use super::*;

#[test]
fn parses_hex_forms() {
    assert_eq!(
        parse_css_color("#ff0000"),
        Some(Rgba8Premul::from_straight_rgba(255, 0, 0, 255))
    );
    assert_eq!(
        parse_css_color("#F00"),
        Some(Rgba8Premul::from_straight_rgba(255, 0, 0, 255))
    );

    let c = parse_color_def("#0000ff80").unwrap();
    assert!((c.b - 1.0).abs() < 1e-9);
    assert!((c.a - (128.0 / 255.0)).abs() < 1e-9);
}

#[test]
fn parses_rgb_functions() {
    assert_eq!(
        parse_css_color("rgb(0, 128, 255)"),
        Some(Rgba8Premul::from_straight_rgba(0, 128, 255, 255))
    );
    assert_eq!(
        parse_css_color("rgba(255 255 255 / 0)"),
        Some(Rgba8Premul::transparent())
    );
    assert_eq!(
        parse_css_color("RGB(100%, 0%, 0%)"),
        Some(Rgba8Premul::from_straight_rgba(255, 0, 0, 255))
    );
}

#[test]
fn parses_hsl_function() {
    let c = parse_color_def("hsl(0, 100%, 50%)").unwrap();
    // Pure red.
    assert!((c.r - 1.0).abs() < 1e-9);
    assert!((c.g - 0.0).abs() < 1e-9);
    assert!((c.b - 0.0).abs() < 1e-9);
}

#[test]
fn parses_named_colors_case_insensitive() {
    assert_eq!(
        parse_css_color("Red"),
        Some(Rgba8Premul::from_straight_rgba(255, 0, 0, 255))
    );
    assert_eq!(parse_css_color("transparent"), Some(Rgba8Premul::transparent()));
}

#[test]
fn rejects_garbage() {
    assert_eq!(parse_css_color(""), None);
    assert_eq!(parse_css_color("#12"), None);
    assert_eq!(parse_css_color("#gggggg"), None);
    assert_eq!(parse_css_color("rgb(1, 2)"), None);
    assert_eq!(parse_css_color("notacolor"), None);
}
