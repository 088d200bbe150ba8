//! Face-to-overlay geometry pipeline: scales a decoded photo onto a render
//! surface, maps externally detected face boxes into surface coordinates,
//! and emits centered sticker draw commands for each face.

pub mod api;
pub mod image;
pub mod overlay;

pub use crate::image::decode::DefaultDecoder;
pub use crate::overlay::{
    error::{OverlayError, OverlayResult},
    mapping::{PreScaleAxes, map_face_box},
    pipeline::{
        DrawPlan, FaceDetector, ImageDecoder, ImageDrawCommand, ImageSource, OverlayPipeline,
        PipelineConfig,
    },
    placement::place_overlay,
    scale::{ScaleMode, compute_scale},
    sticker::Sticker,
    types::{
        DecodedImage, Dimensions, OverlayPlacement, PipelineRun, Point, Rect, RunFailure,
        RunPhase, Scale, StickerHandle,
    },
};
