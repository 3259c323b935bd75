use super::*;

#[test]
fn premul_roundtrip_is_exact_for_opaque_and_transparent() {
    let c = Rgba8Premul::from_straight_rgba(200, 100, 50, 255);
    assert_eq!(c.to_straight_rgba(), [200, 100, 50, 255]);

    let t = Rgba8Premul::from_straight_rgba(200, 100, 50, 0);
    assert_eq!(t, Rgba8Premul::transparent());
    assert_eq!(t.to_straight_rgba(), [0, 0, 0, 0]);
}

#[test]
fn premultiply_in_place_zeroes_transparent_pixels() {
    let mut px = vec![10, 20, 30, 0, 255, 255, 255, 128];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[0..4], &[0, 0, 0, 0]);
    assert_eq!(&px[4..8], &[128, 128, 128, 128]);
}

#[test]
fn over_opaque_source_replaces_destination() {
    let mut dst = vec![1, 2, 3, 255];
    premul_over_in_place(&mut dst, &[255, 0, 0, 255]);
    assert_eq!(dst, vec![255, 0, 0, 255]);
}

#[test]
fn over_transparent_source_keeps_destination() {
    let mut dst = vec![9, 8, 7, 255];
    premul_over_in_place(&mut dst, &[0, 0, 0, 0]);
    assert_eq!(dst, vec![9, 8, 7, 255]);
}

#[test]
fn over_half_alpha_blends() {
    let mut dst = vec![0, 0, 255, 255];
    premul_over_in_place(&mut dst, &[128, 0, 0, 128]);
    assert_eq!(dst[0], 128);
    assert_eq!(dst[3], 255);
    assert!(dst[2] > 120 && dst[2] < 130);
}
