use crate::overlay::{
    error::{OverlayError, OverlayResult},
    types::{Dimensions, Rect, Scale},
};

/// How detector-input coordinates are lifted back to original-image
/// coordinates when the detector was fed a pre-scaled copy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PreScaleAxes {
    /// One factor from the width ratio, applied to both axes. Assumes the
    /// detector input was uniformly scaled from the original.
    #[default]
    Uniform,
    /// Independent width and height ratios for anisotropically scaled input.
    PerAxis,
}

/// Per-axis factors lifting detector-input coordinates to original-image
/// coordinates.
pub fn pre_scale(
    detector_input: Dimensions,
    original: Dimensions,
    axes: PreScaleAxes,
) -> OverlayResult<(f64, f64)> {
    if detector_input.width == 0 || detector_input.height == 0 {
        return Err(OverlayError::InvalidDimension(format!(
            "detector input dimensions must be positive, got {}x{}",
            detector_input.width, detector_input.height
        )));
    }
    if original.width == 0 || original.height == 0 {
        return Err(OverlayError::InvalidDimension(format!(
            "original dimensions must be positive, got {}x{}",
            original.width, original.height
        )));
    }

    let width_ratio = original.width as f64 / detector_input.width as f64;
    match axes {
        PreScaleAxes::Uniform => Ok((width_ratio, width_ratio)),
        PreScaleAxes::PerAxis => {
            let height_ratio = original.height as f64 / detector_input.height as f64;
            Ok((width_ratio, height_ratio))
        }
    }
}

/// Maps a face box reported in detector-input space into display/surface
/// space: first back to original-image coordinates, then through the display
/// scale. The result is NOT clamped to the surface; boxes may extend past
/// its edges and clamping is a rendering-time policy.
pub fn map_face_box(
    face: Rect,
    detector_input: Dimensions,
    original: Dimensions,
    display_scale: Scale,
    axes: PreScaleAxes,
) -> OverlayResult<Rect> {
    check_face_box(face)?;
    let (scale_x, scale_y) = pre_scale(detector_input, original, axes)?;

    let in_original = Rect {
        left: face.left * scale_x,
        top: face.top * scale_y,
        right: face.right * scale_x,
        bottom: face.bottom * scale_y,
    };
    Ok(display_scale.apply_rect(in_original))
}

fn check_face_box(face: Rect) -> OverlayResult<()> {
    let finite = face.left.is_finite()
        && face.top.is_finite()
        && face.right.is_finite()
        && face.bottom.is_finite();
    if !finite {
        return Err(OverlayError::DegenerateBox(format!(
            "face box has non-finite edges: {face:?}"
        )));
    }
    if face.width() <= 0.0 || face.height() <= 0.0 {
        return Err(OverlayError::DegenerateBox(format!(
            "face box must have positive width and height, got {}x{}",
            face.width(),
            face.height()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{PreScaleAxes, map_face_box, pre_scale};
    use crate::overlay::{
        error::OverlayError,
        scale::{ScaleMode, compute_scale},
        types::{Dimensions, Rect, Scale},
    };

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    #[test]
    fn maps_detector_box_through_prescale_and_display_scale() {
        let detector_input = dims(300, 600);
        let original = dims(400, 800);
        let display = compute_scale(original, dims(1000, 1000), ScaleMode::Cover)
            .expect("display scale should compute");

        let face = Rect::new(10.0, 20.0, 60.0, 120.0);
        let mapped = map_face_box(face, detector_input, original, display, PreScaleAxes::Uniform)
            .expect("mapping should succeed");

        // Pre-scale 400/300 lifts the box to (13.33, 26.67, 80, 160) in
        // original coordinates; the display scale is factor 2.5 with offsets
        // (0, -500).
        assert!((mapped.left - (40.0 / 3.0) * 2.5).abs() < 1e-6);
        assert!((mapped.top - ((80.0 / 3.0) * 2.5 - 500.0)).abs() < 1e-6);
        assert!((mapped.right - 200.0).abs() < 1e-6);
        assert!((mapped.bottom - (160.0 * 2.5 - 500.0)).abs() < 1e-6);
    }

    #[test]
    fn composed_mapping_equals_direct_composition() {
        let detector_input = dims(300, 600);
        let original = dims(400, 800);
        let display = compute_scale(original, dims(1000, 1000), ScaleMode::Cover)
            .expect("display scale should compute");

        let (pre_x, pre_y) = pre_scale(detector_input, original, PreScaleAxes::Uniform)
            .expect("pre-scale should compute");
        assert_eq!(pre_x, pre_y);
        let pre = Scale {
            factor: pre_x,
            offset_x: 0.0,
            offset_y: 0.0,
        };
        let direct = pre.then(&display);

        let face = Rect::new(10.0, 20.0, 60.0, 120.0);
        let stepwise =
            map_face_box(face, detector_input, original, display, PreScaleAxes::Uniform)
                .expect("mapping should succeed");
        let composed = direct.apply_rect(face);

        for (a, b) in [
            (stepwise.left, composed.left),
            (stepwise.top, composed.top),
            (stepwise.right, composed.right),
            (stepwise.bottom, composed.bottom),
        ] {
            let tolerance = 1e-6 * a.abs().max(b.abs()).max(1.0);
            assert!((a - b).abs() < tolerance, "{a} differs from {b}");
        }
    }

    #[test]
    fn per_axis_mode_uses_independent_ratios() {
        // Detector input squashed vertically relative to the original.
        let detector_input = dims(400, 300);
        let original = dims(800, 900);

        let (uniform_x, uniform_y) =
            pre_scale(detector_input, original, PreScaleAxes::Uniform).expect("should compute");
        assert_eq!(uniform_x, 2.0);
        assert_eq!(uniform_y, 2.0);

        let (per_axis_x, per_axis_y) =
            pre_scale(detector_input, original, PreScaleAxes::PerAxis).expect("should compute");
        assert_eq!(per_axis_x, 2.0);
        assert_eq!(per_axis_y, 3.0);

        let face = Rect::new(10.0, 10.0, 20.0, 20.0);
        let mapped = map_face_box(
            face,
            detector_input,
            original,
            Scale::IDENTITY,
            PreScaleAxes::PerAxis,
        )
        .expect("mapping should succeed");
        assert_eq!(mapped, Rect::new(20.0, 30.0, 40.0, 60.0));
    }

    #[test]
    fn degenerate_box_is_rejected_not_clamped() {
        let detector_input = dims(300, 600);
        let original = dims(400, 800);

        let zero_width = Rect::new(10.0, 20.0, 10.0, 120.0);
        let err = map_face_box(
            zero_width,
            detector_input,
            original,
            Scale::IDENTITY,
            PreScaleAxes::Uniform,
        )
        .expect_err("zero-width box must fail");
        assert!(matches!(err, OverlayError::DegenerateBox(_)));

        let inverted = Rect::new(10.0, 120.0, 60.0, 20.0);
        let err = map_face_box(
            inverted,
            detector_input,
            original,
            Scale::IDENTITY,
            PreScaleAxes::Uniform,
        )
        .expect_err("inverted box must fail");
        assert!(matches!(err, OverlayError::DegenerateBox(_)));
    }

    #[test]
    fn non_finite_box_is_rejected() {
        let err = map_face_box(
            Rect::new(f64::NAN, 0.0, 10.0, 10.0),
            dims(100, 100),
            dims(100, 100),
            Scale::IDENTITY,
            PreScaleAxes::Uniform,
        )
        .expect_err("NaN edge must fail");
        assert!(matches!(err, OverlayError::DegenerateBox(_)));
    }

    #[test]
    fn zero_detector_input_dimension_is_rejected() {
        let err = pre_scale(dims(0, 600), dims(400, 800), PreScaleAxes::Uniform)
            .expect_err("zero detector width must fail");
        assert!(matches!(err, OverlayError::InvalidDimension(_)));
    }
}
