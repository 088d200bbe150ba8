use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Axis-aligned rectangle with `left <= right` and `top <= bottom`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Point {
        Point {
            x: (self.left + self.right) / 2.0,
            y: (self.top + self.bottom) / 2.0,
        }
    }

    /// Scales every corner about `center`, keeping `center` fixed.
    pub fn scaled_about(&self, center: Point, factor: f64) -> Self {
        Self {
            left: center.x + (self.left - center.x) * factor,
            top: center.y + (self.top - center.y) * factor,
            right: center.x + (self.right - center.x) * factor,
            bottom: center.y + (self.bottom - center.y) * factor,
        }
    }
}

/// Uniform scale plus translation: `dest = source * factor + offset`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale {
    pub factor: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Scale {
    pub const IDENTITY: Scale = Scale {
        factor: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    pub fn apply(&self, point: Point) -> Point {
        Point {
            x: point.x * self.factor + self.offset_x,
            y: point.y * self.factor + self.offset_y,
        }
    }

    pub fn apply_rect(&self, rect: Rect) -> Rect {
        Rect {
            left: rect.left * self.factor + self.offset_x,
            top: rect.top * self.factor + self.offset_y,
            right: rect.right * self.factor + self.offset_x,
            bottom: rect.bottom * self.factor + self.offset_y,
        }
    }

    /// Composition `self` then `next`: applying the result equals applying
    /// `self` first and `next` to its output.
    pub fn then(&self, next: &Scale) -> Scale {
        Scale {
            factor: self.factor * next.factor,
            offset_x: self.offset_x * next.factor + next.offset_x,
            offset_y: self.offset_y * next.factor + next.offset_y,
        }
    }

    /// Post-layout zoom about a fixed center point, so the point that maps
    /// onto `center` stays put while everything else scales around it.
    pub fn zoomed_about(&self, zoom: f64, center: Point) -> Scale {
        Scale {
            factor: self.factor * zoom,
            offset_x: center.x + (self.offset_x - center.x) * zoom,
            offset_y: center.y + (self.offset_y - center.y) * zoom,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DecodedImage {
    pub dimensions: Dimensions,
    pub rgb: Vec<u8>,
}

/// Opaque handle to the overlay asset; shared read-only across runs.
pub type StickerHandle = Arc<DecodedImage>;

#[derive(Clone, Debug)]
pub struct OverlayPlacement {
    pub draw_rect: Rect,
    pub sticker: StickerHandle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Decoding,
    Detecting,
    Ready,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunFailure {
    InvalidDimension(String),
    Decode(String),
    Detection(String),
}

/// Immutable snapshot of one image-selection run. A new selection supersedes
/// the whole snapshot; it is never merged into.
#[derive(Clone, Debug)]
pub struct PipelineRun {
    pub run_id: u64,
    pub phase: RunPhase,
    pub surface: Option<Dimensions>,
    pub original: Option<Dimensions>,
    pub detector_input: Option<Dimensions>,
    pub display_scale: Option<Scale>,
    pub base_image: Option<Arc<DecodedImage>>,
    pub placements: Vec<OverlayPlacement>,
    pub failure: Option<RunFailure>,
}

impl PipelineRun {
    pub fn idle() -> Self {
        Self {
            run_id: 0,
            phase: RunPhase::Idle,
            surface: None,
            original: None,
            detector_input: None,
            display_scale: None,
            base_image: None,
            placements: Vec::new(),
            failure: None,
        }
    }
}
