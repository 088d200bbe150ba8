use crate::overlay::{
    error::{OverlayError, OverlayResult},
    types::{Dimensions, Scale},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScaleMode {
    /// Fill the destination completely, cropping overflow.
    Cover,
    /// Fit entirely inside the destination, letterboxing the slack axis.
    Fit,
}

/// Computes how a source image is scaled and centered into a destination
/// surface. Pure function of its inputs.
pub fn compute_scale(
    source: Dimensions,
    destination: Dimensions,
    mode: ScaleMode,
) -> OverlayResult<Scale> {
    check_positive(source, "source")?;
    check_positive(destination, "destination")?;

    let src_w = source.width as f64;
    let src_h = source.height as f64;
    let dst_w = destination.width as f64;
    let dst_h = destination.height as f64;

    let factor = match mode {
        ScaleMode::Cover => (dst_w / src_w).max(dst_h / src_h),
        ScaleMode::Fit => (dst_w / src_w).min(dst_h / src_h),
    };

    Ok(Scale {
        factor,
        offset_x: (dst_w - src_w * factor) / 2.0,
        offset_y: (dst_h - src_h * factor) / 2.0,
    })
}

fn check_positive(dimensions: Dimensions, label: &str) -> OverlayResult<()> {
    if dimensions.width == 0 || dimensions.height == 0 {
        return Err(OverlayError::InvalidDimension(format!(
            "{label} dimensions must be positive, got {}x{}",
            dimensions.width, dimensions.height
        )));
    }
    Ok(())
}
