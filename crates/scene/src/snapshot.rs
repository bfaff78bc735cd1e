//! PNG output of a side view.
//!
//! Feature-gated behind `png` (default on). The pixels themselves come from
//! [`crate::raster`], which is always available.

use aquarium_core::error::AquariumError;
use std::path::Path;

use crate::raster::{render_side_view, SideView};
use crate::Aquarium;

/// Writes an RGBA8 buffer of `width * height` pixels as a PNG.
///
/// Returns `AquariumError::Io` on size overflow, buffer mismatch or write failure.
pub fn write_png(rgba: Vec<u8>, width: usize, height: usize, path: &Path) -> Result<(), AquariumError> {
    let w = u32::try_from(width).map_err(|_| AquariumError::Io("image width overflows u32".into()))?;
    let h = u32::try_from(height).map_err(|_| AquariumError::Io("image height overflows u32".into()))?;
    let img = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| AquariumError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| AquariumError::Io(e.to_string()))
}

/// Renders the aquarium's current frame and writes it to `path`.
pub fn write_side_view(aquarium: &Aquarium, view: &SideView, path: &Path) -> Result<(), AquariumError> {
    let raster = render_side_view(aquarium, view);
    let (width, height) = (raster.width(), raster.height());
    write_png(raster.into_rgba(), width, height, path)
}
