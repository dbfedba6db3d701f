use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage, Rgba, RgbaImage};

use veil_core::ImageConfig;
use veil_image::{strip_image_metadata, ImageError, ImageHygiene, MIME_JPEG, MIME_PNG};
use veil_verify::{scan_image_metadata, verify_image, MetadataKind, VerifyOptions};

fn gradient(w: u32, h: u32) -> RgbImage {
    RgbImage::from_fn(w, h, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 96]))
}

fn encode_jpeg(img: RgbImage) -> Vec<u8> {
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_with_encoder(JpegEncoder::new_with_quality(&mut out, 90))
        .unwrap();
    out
}

/// Splice an APP1 segment right after SOI.
fn with_app1(jpeg: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// JPEG with an EXIF segment (big-endian TIFF header, empty IFD0, trailing
/// GPS-looking text).
fn jpeg_with_exif(w: u32, h: u32) -> Vec<u8> {
    let mut exif = b"Exif\0\0".to_vec();
    exif.extend_from_slice(b"MM\x00\x2a\x00\x00\x00\x08");
    exif.extend_from_slice(b"\x00\x00\x00\x00\x00\x00");
    exif.extend_from_slice(b"GPSLatitude=44.9778N;GPSLongitude=93.2650W");
    with_app1(&encode_jpeg(gradient(w, h)), &exif)
}

/// JPEG whose IFD0 carries a single Orientation (0x0112) SHORT entry.
fn jpeg_with_orientation(img: RgbImage, orientation: u8) -> Vec<u8> {
    let mut exif = b"Exif\0\0".to_vec();
    exif.extend_from_slice(b"MM\x00\x2a\x00\x00\x00\x08");
    exif.extend_from_slice(b"\x00\x01");
    exif.extend_from_slice(b"\x01\x12\x00\x03\x00\x00\x00\x01");
    exif.extend_from_slice(&[0x00, orientation, 0x00, 0x00]);
    exif.extend_from_slice(b"\x00\x00\x00\x00");
    with_app1(&encode_jpeg(img), &exif)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[test]
fn large_jpeg_is_downscaled_and_loses_exif() {
    let input = jpeg_with_exif(4000, 3000);
    assert!(scan_image_metadata(&input)
        .iter()
        .any(|b| b.kind == MetadataKind::Exif));

    let clean = ImageHygiene::new(&ImageConfig::default())
        .strip_metadata(&input, "image/jpeg", "IMG_0042.jpg")
        .unwrap();

    assert_eq!(clean.mime_type, MIME_JPEG);
    assert_eq!(clean.file_name, "IMG_0042.jpg");
    assert_eq!((clean.original_width, clean.original_height), (4000, 3000));
    assert_eq!((clean.width, clean.height), (2400, 1800));

    let decoded = image::load_from_memory(&clean.bytes).unwrap();
    assert!(decoded.width().max(decoded.height()) <= 2400);

    assert!(!contains(&clean.bytes, b"Exif\0\0"));
    assert!(!contains(&clean.bytes, b"GPSLatitude"));
    assert!(verify_image(&clean.bytes, &VerifyOptions::default()).ok);
}

#[test]
fn small_image_keeps_dimensions_but_is_reencoded() {
    let input = jpeg_with_exif(320, 200);
    let clean = strip_image_metadata(&input, "image/jpeg").unwrap();

    assert_eq!((clean.width, clean.height), (320, 200));
    assert_ne!(clean.bytes, input);
    assert!(scan_image_metadata(&clean.bytes).is_empty());
}

#[test]
fn png_stays_png_with_alpha() {
    let img = RgbaImage::from_fn(64, 32, |x, _| Rgba([255, 0, 0, (x * 4) as u8]));
    let mut input = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_with_encoder(PngEncoder::new(&mut input))
        .unwrap();

    let clean = ImageHygiene::default()
        .strip_metadata(&input, "image/png", "diagram.png")
        .unwrap();

    assert_eq!(clean.mime_type, MIME_PNG);
    assert_eq!(clean.file_name, "diagram.png");
    let decoded = image::load_from_memory(&clean.bytes).unwrap();
    assert_eq!(decoded.dimensions(), (64, 32));
    assert_eq!(decoded.get_pixel(10, 0)[3], 40);
}

#[test]
fn non_png_types_become_jpeg() {
    let mut input = Vec::new();
    DynamicImage::ImageRgb8(gradient(50, 40))
        .write_with_encoder(PngEncoder::new(&mut input))
        .unwrap();

    // declared as webp; the content decides the decoder, the declared type the encoder
    let clean = ImageHygiene::default()
        .strip_metadata(&input, "image/webp", "photo.webp")
        .unwrap();
    assert_eq!(clean.mime_type, MIME_JPEG);
    assert_eq!(clean.file_name, "photo.jpg");
    assert!(clean.bytes.starts_with(&[0xFF, 0xD8]));
}

#[test]
fn custom_max_edge() {
    let input = jpeg_with_exif(900, 1200);
    let clean = ImageHygiene::new(&ImageConfig {
        max_edge: 600,
        ..ImageConfig::default()
    })
    .strip_metadata(&input, "image/jpeg", "tall.jpg")
    .unwrap();
    assert_eq!((clean.width, clean.height), (450, 600));
}

#[test]
fn exif_rotation_is_applied_before_stripping() {
    // left half red, right half blue
    let img = RgbImage::from_fn(40, 20, |x, _| {
        if x < 20 {
            Rgb([255, 0, 0])
        } else {
            Rgb([0, 0, 255])
        }
    });
    let input = jpeg_with_orientation(img, 6);

    let clean = strip_image_metadata(&input, "image/jpeg").unwrap();
    assert_eq!((clean.original_width, clean.original_height), (20, 40));
    assert_eq!((clean.width, clean.height), (20, 40));
    assert!(scan_image_metadata(&clean.bytes).is_empty());

    // rotated 90 degrees clockwise: the left half is now on top
    let decoded = image::load_from_memory(&clean.bytes).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (20, 40));
    let top = decoded.get_pixel(10, 5);
    let bottom = decoded.get_pixel(10, 34);
    assert!(top[0] > 200 && top[2] < 60, "top pixel {:?}", top);
    assert!(bottom[2] > 200 && bottom[0] < 60, "bottom pixel {:?}", bottom);
}

#[test]
fn upright_orientation_keeps_dimensions() {
    let input = jpeg_with_orientation(gradient(40, 20), 1);
    let clean = strip_image_metadata(&input, "image/jpeg").unwrap();
    assert_eq!((clean.width, clean.height), (40, 20));
}

#[test]
fn corrupt_image_is_a_decode_error() {
    let err = strip_image_metadata(b"not an image at all", "image/jpeg").unwrap_err();
    assert!(matches!(err, ImageError::Decode(_)));
}

#[test]
fn empty_payload_is_rejected() {
    let err = strip_image_metadata(&[], "image/png").unwrap_err();
    assert!(matches!(err, ImageError::EmptyInput));
}
