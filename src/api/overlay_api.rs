use crate::image::decode::decode_image_from_path;
use crate::overlay::{
    mapping::{PreScaleAxes, map_face_box},
    placement::placement_rect,
    scale::{ScaleMode, compute_scale},
    types::{Dimensions, Rect},
};

/// Face box in detector-input coordinates, as reported by the caller's
/// detector.
#[derive(Clone, Copy, Debug)]
pub struct FaceBoxInput {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

#[derive(Clone, Debug)]
pub struct OverlayPlanRequest {
    pub image_path: String,
    pub surface_width: u32,
    pub surface_height: u32,
    pub detector_input_width: u32,
    pub detector_input_height: u32,
    pub face_boxes: Vec<FaceBoxInput>,
    pub fit_inside: bool,
    pub per_axis_prescale: bool,
    pub size_multiplier: f64,
}

#[derive(Clone, Copy, Debug)]
pub struct PlacementRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

#[derive(Clone, Debug)]
pub struct OverlayPlanResponse {
    pub image_width: u32,
    pub image_height: u32,
    pub scale_factor: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub placements: Vec<PlacementRect>,
}

/// One-shot plan computation for callers that already ran their own
/// detector: decodes the image for its native dimensions, scales it onto the
/// surface, and returns the sticker draw rectangles in surface coordinates,
/// in the order the boxes were supplied.
pub fn compute_overlay_plan(req: OverlayPlanRequest) -> Result<OverlayPlanResponse, String> {
    if !req.size_multiplier.is_finite() || req.size_multiplier <= 0.0 {
        return Err(format!(
            "size multiplier must be a positive finite number, got {}",
            req.size_multiplier
        ));
    }

    let face_boxes = req
        .face_boxes
        .iter()
        .enumerate()
        .map(|(index, face_box)| {
            Rect::try_from(*face_box).map_err(|e| format!("invalid face box at index {index}: {e}"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let decoded = decode_image_from_path(&req.image_path).map_err(|e| e.to_string())?;
    let surface = Dimensions {
        width: req.surface_width,
        height: req.surface_height,
    };
    let detector_input = Dimensions {
        width: req.detector_input_width,
        height: req.detector_input_height,
    };
    let mode = if req.fit_inside {
        ScaleMode::Fit
    } else {
        ScaleMode::Cover
    };
    let axes = if req.per_axis_prescale {
        PreScaleAxes::PerAxis
    } else {
        PreScaleAxes::Uniform
    };

    let display_scale =
        compute_scale(decoded.dimensions, surface, mode).map_err(|e| e.to_string())?;

    let mut placements = Vec::with_capacity(face_boxes.len());
    for face in face_boxes {
        let mapped = map_face_box(face, detector_input, decoded.dimensions, display_scale, axes)
            .map_err(|e| e.to_string())?;
        let rect = placement_rect(mapped, req.size_multiplier);
        placements.push(PlacementRect {
            left: rect.left,
            top: rect.top,
            right: rect.right,
            bottom: rect.bottom,
        });
    }

    Ok(OverlayPlanResponse {
        image_width: decoded.dimensions.width,
        image_height: decoded.dimensions.height,
        scale_factor: display_scale.factor,
        offset_x: display_scale.offset_x,
        offset_y: display_scale.offset_y,
        placements,
    })
}

impl TryFrom<FaceBoxInput> for Rect {
    type Error = String;

    fn try_from(value: FaceBoxInput) -> Result<Self, Self::Error> {
        if !value.left.is_finite()
            || !value.top.is_finite()
            || !value.right.is_finite()
            || !value.bottom.is_finite()
        {
            return Err("non-finite values are not allowed".to_string());
        }
        if value.right <= value.left || value.bottom <= value.top {
            return Err("width and height must be greater than 0".to_string());
        }

        Ok(Self {
            left: value.left,
            top: value.top,
            right: value.right,
            bottom: value.bottom,
        })
    }
}
