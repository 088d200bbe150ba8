use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::image::decode::decode_image_from_path;
use crate::overlay::{
    error::OverlayResult,
    types::{DecodedImage, StickerHandle},
};

/// The overlay source asset. Decoded once, on first need; the handle is then
/// shared read-only across all placements of all runs.
#[derive(Debug)]
pub struct Sticker {
    path: String,
    loaded: OnceCell<StickerHandle>,
}

impl Sticker {
    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            loaded: OnceCell::new(),
        }
    }

    /// Wraps an already-decoded asset, skipping the lazy file load.
    pub fn preloaded(image: DecodedImage) -> Self {
        Self {
            path: String::new(),
            loaded: OnceCell::with_value(Arc::new(image)),
        }
    }

    pub fn handle(&self) -> OverlayResult<StickerHandle> {
        self.loaded
            .get_or_try_init(|| decode_image_from_path(&self.path).map(Arc::new))
            .map(Arc::clone)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::Sticker;
    use crate::overlay::{
        error::OverlayError,
        types::{DecodedImage, Dimensions},
    };

    #[test]
    fn preloaded_sticker_hands_out_the_same_asset() {
        let sticker = Sticker::preloaded(DecodedImage {
            dimensions: Dimensions {
                width: 2,
                height: 2,
            },
            rgb: vec![255; 2 * 2 * 3],
        });

        let first = sticker.handle().expect("preloaded handle should resolve");
        let second = sticker.handle().expect("preloaded handle should resolve");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.dimensions.width, 2);
    }

    #[test]
    fn missing_asset_file_surfaces_a_decode_error() {
        let sticker = Sticker::from_path("/nonexistent/overlay.png");
        let err = sticker.handle().expect_err("missing file must fail");
        assert!(matches!(err, OverlayError::Decode(_)));
    }
}
