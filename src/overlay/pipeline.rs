use std::sync::{
    Arc, Mutex, MutexGuard,
    atomic::{AtomicU64, Ordering},
};
use std::thread;

use log::{debug, warn};

use crate::image::prescale::prescale_for_detection;
use crate::overlay::{
    error::OverlayResult,
    mapping::{PreScaleAxes, map_face_box},
    placement::place_overlay,
    scale::{ScaleMode, compute_scale},
    sticker::Sticker,
    types::{
        DecodedImage, Dimensions, OverlayPlacement, PipelineRun, Point, Rect, RunFailure,
        RunPhase, Scale, StickerHandle,
    },
};

/// Opaque reference to a selected image source.
#[derive(Clone, Debug)]
pub enum ImageSource {
    Path(String),
    Bytes(Arc<Vec<u8>>),
}

pub trait ImageDecoder: Send + Sync {
    fn decode(&self, source: &ImageSource) -> OverlayResult<DecodedImage>;
}

pub trait FaceDetector: Send + Sync {
    /// Returns face boxes in the coordinate space of the image it was fed,
    /// in the detector's own order. An empty list is a valid result.
    fn detect(&self, input: &DecodedImage) -> OverlayResult<Vec<Rect>>;
}

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub scale_mode: ScaleMode,
    pub size_multiplier: f64,
    pub prescale_axes: PreScaleAxes,
    /// Longest-side cap for the image fed to the detector. `None` feeds the
    /// original, making the pre-scale factor 1.
    pub detector_input_limit: Option<u32>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scale_mode: ScaleMode::Cover,
            size_multiplier: 3.0,
            prescale_axes: PreScaleAxes::Uniform,
            detector_input_limit: None,
        }
    }
}

/// Renderer-facing output: one scaled base-image command plus the ordered
/// sticker placements, with any external zoom already applied.
#[derive(Clone, Debug)]
pub struct DrawPlan {
    pub image: ImageDrawCommand,
    pub overlays: Vec<OverlayPlacement>,
}

#[derive(Clone, Debug)]
pub struct ImageDrawCommand {
    pub image: Arc<DecodedImage>,
    pub scale: Scale,
}

#[derive(Clone)]
struct RunTicket {
    run_id: u64,
    source: ImageSource,
    surface: Dimensions,
}

/// Sequences decode → detect → mapping → placement for one selected image at
/// a time. Successive selections supersede each other through a monotonic
/// run counter: a completion is applied only while its run id is still the
/// current one, so stale asynchronous results are discarded rather than
/// aborted. The latest snapshot is the single shared state; readers clone it
/// from whichever thread produces draw commands.
pub struct OverlayPipeline {
    decoder: Arc<dyn ImageDecoder>,
    detector: Arc<dyn FaceDetector>,
    sticker: Sticker,
    config: PipelineConfig,
    current_run: AtomicU64,
    latest: Mutex<PipelineRun>,
    zoom: Mutex<f64>,
}

impl OverlayPipeline {
    pub fn new(
        decoder: Arc<dyn ImageDecoder>,
        detector: Arc<dyn FaceDetector>,
        sticker: Sticker,
        config: PipelineConfig,
    ) -> Self {
        Self {
            decoder,
            detector,
            sticker,
            config,
            current_run: AtomicU64::new(0),
            latest: Mutex::new(PipelineRun::idle()),
            zoom: Mutex::new(1.0),
        }
    }

    /// Clones the latest snapshot.
    pub fn latest(&self) -> PipelineRun {
        self.lock_latest().clone()
    }

    /// Externally supplied uniform zoom multiplier, applied after layout at
    /// draw-plan emission. Non-finite or non-positive values are ignored.
    pub fn set_zoom(&self, zoom: f64) {
        if !zoom.is_finite() || zoom <= 0.0 {
            warn!("ignoring invalid zoom multiplier {zoom}");
            return;
        }
        *self.lock_zoom() = zoom;
    }

    pub fn zoom(&self) -> f64 {
        *self.lock_zoom()
    }

    /// Starts a new run on a worker thread and returns its run id. Any
    /// in-flight previous run keeps executing but its results will be
    /// discarded on arrival.
    pub fn select_image(self: &Arc<Self>, source: ImageSource, surface: Dimensions) -> u64 {
        let ticket = self.begin_run(source, surface);
        let run_id = ticket.run_id;
        let pipeline = Arc::clone(self);
        thread::spawn(move || pipeline.execute_run(ticket));
        run_id
    }

    /// Drives a whole run on the caller's thread and returns the resulting
    /// snapshot.
    pub fn select_image_blocking(&self, source: ImageSource, surface: Dimensions) -> PipelineRun {
        let ticket = self.begin_run(source, surface);
        self.execute_run(ticket);
        self.latest()
    }

    /// Emits renderer commands for the latest `Ready` snapshot, with the
    /// current zoom applied about the surface center.
    pub fn draw_plan(&self) -> Option<DrawPlan> {
        let snapshot = self.latest();
        if snapshot.phase != RunPhase::Ready {
            return None;
        }
        let image = snapshot.base_image?;
        let scale = snapshot.display_scale?;
        let surface = snapshot.surface?;

        let zoom = self.zoom();
        if zoom == 1.0 {
            return Some(DrawPlan {
                image: ImageDrawCommand { image, scale },
                overlays: snapshot.placements,
            });
        }

        let center = Point {
            x: surface.width as f64 / 2.0,
            y: surface.height as f64 / 2.0,
        };
        let overlays = snapshot
            .placements
            .into_iter()
            .map(|placement| OverlayPlacement {
                draw_rect: placement.draw_rect.scaled_about(center, zoom),
                sticker: placement.sticker,
            })
            .collect();
        Some(DrawPlan {
            image: ImageDrawCommand {
                image,
                scale: scale.zoomed_about(zoom, center),
            },
            overlays,
        })
    }

    fn begin_run(&self, source: ImageSource, surface: Dimensions) -> RunTicket {
        let run_id = self.current_run.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("run {run_id}: image selected, decoding");

        let mut snapshot = PipelineRun::idle();
        snapshot.run_id = run_id;
        snapshot.phase = RunPhase::Decoding;
        snapshot.surface = Some(surface);
        *self.lock_latest() = snapshot;

        RunTicket {
            run_id,
            source,
            surface,
        }
    }

    fn execute_run(&self, ticket: RunTicket) {
        let decoded = match self.decoder.decode(&ticket.source) {
            Ok(decoded) => Arc::new(decoded),
            Err(e) => {
                let failure = RunFailure::Decode(e.to_string());
                self.finish_run(&ticket, None, None, None, Vec::new(), Some(failure));
                return;
            }
        };

        let detector_input = match self.config.detector_input_limit {
            Some(limit) => match prescale_for_detection(&decoded, limit) {
                Ok(prescaled) => Arc::new(prescaled),
                Err(e) => {
                    self.finish_run(
                        &ticket,
                        Some(Arc::clone(&decoded)),
                        None,
                        None,
                        Vec::new(),
                        Some(RunFailure::InvalidDimension(e.to_string())),
                    );
                    return;
                }
            },
            None => Arc::clone(&decoded),
        };

        if !self.advance_to_detecting(&ticket, &decoded, detector_input.dimensions) {
            return;
        }

        let faces = match self.detector.detect(&detector_input) {
            Ok(faces) => faces,
            Err(e) => {
                let display_scale =
                    compute_scale(decoded.dimensions, ticket.surface, self.config.scale_mode).ok();
                self.finish_run(
                    &ticket,
                    Some(Arc::clone(&decoded)),
                    Some(detector_input.dimensions),
                    display_scale,
                    Vec::new(),
                    Some(RunFailure::Detection(e.to_string())),
                );
                return;
            }
        };
        debug!(
            "run {}: detector returned {} face(s)",
            ticket.run_id,
            faces.len()
        );

        let display_scale =
            match compute_scale(decoded.dimensions, ticket.surface, self.config.scale_mode) {
                Ok(scale) => scale,
                Err(e) => {
                    self.finish_run(
                        &ticket,
                        Some(Arc::clone(&decoded)),
                        Some(detector_input.dimensions),
                        None,
                        Vec::new(),
                        Some(RunFailure::InvalidDimension(e.to_string())),
                    );
                    return;
                }
            };

        let (placements, failure) = if faces.is_empty() {
            (Vec::new(), None)
        } else {
            match self.sticker.handle() {
                Ok(sticker) => (
                    self.build_placements(
                        &faces,
                        detector_input.dimensions,
                        decoded.dimensions,
                        display_scale,
                        &sticker,
                    ),
                    None,
                ),
                Err(e) => (Vec::new(), Some(RunFailure::Decode(e.to_string()))),
            }
        };

        self.finish_run(
            &ticket,
            Some(decoded),
            Some(detector_input.dimensions),
            Some(display_scale),
            placements,
            failure,
        );
    }

    fn build_placements(
        &self,
        faces: &[Rect],
        detector_input: Dimensions,
        original: Dimensions,
        display_scale: Scale,
        sticker: &StickerHandle,
    ) -> Vec<OverlayPlacement> {
        let mut placements = Vec::with_capacity(faces.len());
        for (index, face) in faces.iter().enumerate() {
            match map_face_box(
                *face,
                detector_input,
                original,
                display_scale,
                self.config.prescale_axes,
            ) {
                Ok(mapped) => placements.push(place_overlay(
                    mapped,
                    self.config.size_multiplier,
                    Arc::clone(sticker),
                )),
                Err(e) => warn!("dropping detection {index}: {e}"),
            }
        }
        placements
    }

    fn advance_to_detecting(
        &self,
        ticket: &RunTicket,
        decoded: &Arc<DecodedImage>,
        detector_input: Dimensions,
    ) -> bool {
        self.update_if_current(ticket.run_id, |snapshot| {
            snapshot.phase = RunPhase::Detecting;
            snapshot.original = Some(decoded.dimensions);
            snapshot.detector_input = Some(detector_input);
            snapshot.base_image = Some(Arc::clone(decoded));
        })
    }

    fn finish_run(
        &self,
        ticket: &RunTicket,
        base_image: Option<Arc<DecodedImage>>,
        detector_input: Option<Dimensions>,
        display_scale: Option<Scale>,
        placements: Vec<OverlayPlacement>,
        failure: Option<RunFailure>,
    ) {
        let applied = self.update_if_current(ticket.run_id, |snapshot| {
            snapshot.phase = RunPhase::Ready;
            snapshot.surface = Some(ticket.surface);
            snapshot.original = base_image.as_ref().map(|image| image.dimensions);
            snapshot.detector_input = detector_input;
            snapshot.display_scale = display_scale;
            snapshot.base_image = base_image;
            snapshot.placements = placements;
            snapshot.failure = failure;
        });
        if applied {
            debug!("run {}: ready", ticket.run_id);
        }
    }

    fn update_if_current(&self, run_id: u64, update: impl FnOnce(&mut PipelineRun)) -> bool {
        let mut guard = self.lock_latest();
        if self.current_run.load(Ordering::SeqCst) != run_id {
            debug!("run {run_id}: superseded, discarding result");
            return false;
        }
        update(&mut guard);
        true
    }

    fn lock_latest(&self) -> MutexGuard<'_, PipelineRun> {
        match self.latest.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn lock_zoom(&self) -> MutexGuard<'_, f64> {
        match self.zoom.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
