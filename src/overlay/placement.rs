use crate::overlay::types::{OverlayPlacement, Rect, StickerHandle};

/// Computes the sticker draw rectangle for a mapped face box: the face box
/// blown up by `size_multiplier` on each axis, centered on the face center.
///
/// The multiplier applies to the face box's own width and height
/// independently; the sticker follows the face box's aspect ratio and its
/// source aspect ratio is not preserved.
pub fn place_overlay(
    mapped_face: Rect,
    size_multiplier: f64,
    sticker: StickerHandle,
) -> OverlayPlacement {
    OverlayPlacement {
        draw_rect: placement_rect(mapped_face, size_multiplier),
        sticker,
    }
}

/// The draw rectangle alone, without binding an asset handle.
pub fn placement_rect(mapped_face: Rect, size_multiplier: f64) -> Rect {
    let target_width = mapped_face.width() * size_multiplier;
    let target_height = mapped_face.height() * size_multiplier;
    let center = mapped_face.center();

    let left = center.x - target_width / 2.0;
    let top = center.y - target_height / 2.0;
    Rect::new(left, top, left + target_width, top + target_height)
}
