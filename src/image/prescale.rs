use fast_image_resize::{
    FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer,
    images::{Image as FirImage, ImageRef as FirImageRef},
};

use crate::overlay::{
    error::{OverlayError, OverlayResult},
    types::{DecodedImage, Dimensions},
};

/// Produces the detector-input stage of the image chain: a uniform downscale
/// so the longest side does not exceed `limit`. Images already within the
/// limit are passed through unchanged; this never upscales.
pub fn prescale_for_detection(decoded: &DecodedImage, limit: u32) -> OverlayResult<DecodedImage> {
    if limit == 0 {
        return Err(OverlayError::InvalidDimension(
            "detector input limit must be positive".to_string(),
        ));
    }
    let Dimensions { width, height } = decoded.dimensions;
    if width == 0 || height == 0 {
        return Err(OverlayError::InvalidDimension(format!(
            "image dimensions must be positive, got {width}x{height}"
        )));
    }

    let target = scaled_dimensions(decoded.dimensions, limit);
    if target == decoded.dimensions {
        return Ok(decoded.clone());
    }

    let source = FirImageRef::new(width, height, decoded.rgb.as_slice(), PixelType::U8x3)
        .map_err(|e| OverlayError::Decode(format!("invalid decoded RGB buffer: {e}")))?;
    let mut resized = FirImage::new(target.width, target.height, PixelType::U8x3);
    let mut resizer = Resizer::new();
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
    resizer
        .resize(&source, &mut resized, Some(&options))
        .map_err(|e| OverlayError::Decode(format!("failed to resize detector input: {e}")))?;

    Ok(DecodedImage {
        dimensions: target,
        rgb: resized.buffer().to_vec(),
    })
}

fn scaled_dimensions(source: Dimensions, limit: u32) -> Dimensions {
    let longest = source.width.max(source.height);
    if longest <= limit {
        return source;
    }

    let factor = limit as f64 / longest as f64;
    Dimensions {
        width: ((source.width as f64 * factor).round() as u32).max(1),
        height: ((source.height as f64 * factor).round() as u32).max(1),
    }
}
