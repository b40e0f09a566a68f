use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::frame::FrameSequence;
use crate::surface::{RasterSurface, SurfaceError};

/// Onion-skin ghosting of the frames adjacent to the current one.
///
/// The previous frame blends at `opacity`, the next at `opacity *
/// next_ghost_falloff`; the next-frame ghost is deliberately fainter to bias
/// the eye toward where the motion just came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OnionSkin {
    pub enabled: bool,
    opacity: f32,
    /// Opacity multiplier for the next-frame ghost. Product default 0.5.
    pub next_ghost_falloff: f32,
}

impl Default for OnionSkin {
    fn default() -> Self {
        Self { enabled: true, opacity: 0.3, next_ghost_falloff: 0.5 }
    }
}

impl OnionSkin {
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    /// The ghost overlay for the sequence's current frame, or `None` when
    /// disabled or no neighbor exists.
    ///
    /// Recomputed on every call; the overlay is derived state and caching it
    /// across edits to neighbor frames would show stale ghosts.
    pub fn compose(&self, frames: &FrameSequence) -> Result<Option<RasterSurface>, SurfaceError> {
        if !self.enabled {
            return Ok(None);
        }
        let index = frames.current_index();
        let all = frames.frames();
        let mut overlay: Option<RasterSurface> = None;
        if index > 0 {
            blend_ghost(&mut overlay, &all[index - 1].raster, self.opacity)?;
        }
        if index + 1 < all.len() {
            blend_ghost(&mut overlay, &all[index + 1].raster, self.opacity * self.next_ghost_falloff)?;
        }
        Ok(overlay)
    }
}

fn blend_ghost(
    overlay: &mut Option<RasterSurface>,
    encoded: &[u8],
    alpha: f32,
) -> Result<(), SurfaceError> {
    let ghost = RasterSurface::decode(encoded)?;
    match overlay {
        Some(target) => target.blend_over(&ghost, alpha),
        None => {
            let mut target = RasterSurface::new(ghost.width(), ghost.height(), Rgba::TRANSPARENT);
            target.blend_over(&ghost, alpha);
            *overlay = Some(target);
        }
    }
    Ok(())
}
