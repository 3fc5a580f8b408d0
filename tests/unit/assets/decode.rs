use std::io::Cursor;

use super::*;

fn png_1x1(rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(1, 1, rgba.to_vec()).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let prepared = decode_image(&png_1x1([100, 50, 200, 128])).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_rejects_garbage() {
    assert!(decode_image(b"definitely not an image").is_err());
    assert!(decode_image(&[]).is_err());
}

#[test]
fn from_premul_checks_length() {
    assert!(DecodedImage::from_premul_rgba8(2, 2, vec![0; 16]).is_ok());
    assert!(DecodedImage::from_premul_rgba8(2, 2, vec![0; 15]).is_err());
    assert!(DecodedImage::from_premul_rgba8(0, 2, vec![]).is_err());
}

#[test]
fn oversized_side_is_rejected() {
    let wide = MAX_IMAGE_SIDE + 1;
    let err = DecodedImage::from_premul_rgba8(wide, 1, vec![0; wide as usize * 4]).unwrap_err();
    assert!(err.to_string().contains("limited"), "{err}");
    let max = MAX_IMAGE_SIDE as usize;
    assert!(DecodedImage::from_premul_rgba8(MAX_IMAGE_SIDE, 1, vec![0; max * 4]).is_ok());
}
