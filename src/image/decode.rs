use std::io::Cursor;

use exif::{In, Reader as ExifReader, Tag};
use image::DynamicImage;

use crate::overlay::{
    error::{OverlayError, OverlayResult},
    pipeline::{ImageDecoder, ImageSource},
    types::{DecodedImage, Dimensions},
};

/// Decoder collaborator backed by the `image` crate, with EXIF orientation
/// applied.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultDecoder;

impl ImageDecoder for DefaultDecoder {
    fn decode(&self, source: &ImageSource) -> OverlayResult<DecodedImage> {
        match source {
            ImageSource::Path(path) => decode_image_from_path(path),
            ImageSource::Bytes(bytes) => decode_image_from_bytes(bytes),
        }
    }
}

pub fn decode_image_from_path(image_path: &str) -> OverlayResult<DecodedImage> {
    let file_bytes = std::fs::read(image_path).map_err(|e| {
        OverlayError::Decode(format!("failed to read image file '{image_path}': {e}"))
    })?;
    decode_image_from_bytes(&file_bytes)
}

pub fn decode_image_from_bytes(file_bytes: &[u8]) -> OverlayResult<DecodedImage> {
    let exif_orientation = read_exif_orientation(file_bytes);
    let decoded_rgb = image::load_from_memory(file_bytes)?.to_rgb8();
    let oriented =
        apply_exif_orientation(DynamicImage::ImageRgb8(decoded_rgb), exif_orientation).to_rgb8();

    Ok(DecodedImage {
        dimensions: Dimensions {
            width: oriented.width(),
            height: oriented.height(),
        },
        rgb: oriented.into_raw(),
    })
}

fn read_exif_orientation(image_data: &[u8]) -> u32 {
    let mut reader = Cursor::new(image_data);
    let exif_reader = ExifReader::new();
    let exif = exif_reader.read_from_container(&mut reader);
    exif.ok()
        .and_then(|data| {
            data.get_field(Tag::Orientation, In::PRIMARY)
                .and_then(|field| field.value.get_uint(0))
        })
        .unwrap_or(1)
}

fn apply_exif_orientation(image: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.fliph().rotate270(),
        6 => image.rotate90(),
        7 => image.fliph().rotate90(),
        8 => image.rotate270(),
        _ => image,
    }
}

#[cfg(test)]
mod tests {
    use image::{ImageFormat, RgbImage};

    use super::{apply_exif_orientation, decode_image_from_bytes};
    use crate::overlay::error::OverlayError;

    fn encoded_png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 0])
        });
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(image)
            .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("png encoding should succeed");
        bytes
    }

    #[test]
    fn decodes_png_bytes_with_dimensions_and_packed_rgb() {
        let decoded = decode_image_from_bytes(&encoded_png(7, 5)).expect("png should decode");
        assert_eq!(decoded.dimensions.width, 7);
        assert_eq!(decoded.dimensions.height, 5);
        assert_eq!(decoded.rgb.len(), 7 * 5 * 3);
    }

    #[test]
    fn corrupt_bytes_fail_with_decode_error() {
        let err =
            decode_image_from_bytes(&[0u8, 1, 2, 3]).expect_err("garbage bytes must not decode");
        assert!(matches!(err, OverlayError::Decode(_)));
    }

    #[test]
    fn default_decoder_handles_byte_sources() {
        use crate::overlay::pipeline::{ImageDecoder, ImageSource};
        use std::sync::Arc;

        let source = ImageSource::Bytes(Arc::new(encoded_png(3, 9)));
        let decoded = super::DefaultDecoder
            .decode(&source)
            .expect("byte source should decode");
        assert_eq!(decoded.dimensions.width, 3);
        assert_eq!(decoded.dimensions.height, 9);
    }

    #[test]
    fn rotating_orientations_swap_dimensions() {
        let image = image::DynamicImage::ImageRgb8(RgbImage::new(10, 4));
        for orientation in [5, 6, 7, 8] {
            let oriented = apply_exif_orientation(image.clone(), orientation);
            assert_eq!(oriented.width(), 4, "orientation {orientation}");
            assert_eq!(oriented.height(), 10, "orientation {orientation}");
        }
        for orientation in [1, 2, 3, 4] {
            let oriented = apply_exif_orientation(image.clone(), orientation);
            assert_eq!(oriented.width(), 10, "orientation {orientation}");
            assert_eq!(oriented.height(), 4, "orientation {orientation}");
        }
    }
}
