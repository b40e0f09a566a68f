use log::debug;

use crate::color::Rgba;
use crate::surface::{RasterSurface, SurfaceError};

/// Four-connected flood fill from `(seed_x, seed_y)`.
///
/// Reads the color under the seed as the target, then replaces every
/// contiguous pixel that matches it exactly with `fill`. Runs on an explicit
/// work-list rather than recursion so a full-surface region cannot overflow
/// the call stack; each candidate is visited at most once, bounding the fill
/// at O(width * height) time and space. Filling with the target's own color
/// is a no-op.
///
/// Returns the number of pixels recolored. A seed outside the surface is a
/// caller bug and fails with `OutOfBounds`.
pub fn flood_fill(
    surface: &mut RasterSurface,
    seed_x: u32,
    seed_y: u32,
    fill: Rgba,
) -> Result<usize, SurfaceError> {
    let target = surface.pixel(seed_x, seed_y)?;
    if target == fill {
        return Ok(0);
    }

    let width = surface.width();
    let height = surface.height();
    let mut visited = vec![false; width as usize * height as usize];
    let mut work = vec![(seed_x, seed_y)];
    let mut recolored = 0usize;

    while let Some((x, y)) = work.pop() {
        let slot = y as usize * width as usize + x as usize;
        if visited[slot] {
            continue;
        }
        visited[slot] = true;

        if surface.pixel(x, y)? != target {
            continue;
        }
        surface.set_pixel(x, y, fill)?;
        recolored += 1;

        if x + 1 < width {
            work.push((x + 1, y));
        }
        if x > 0 {
            work.push((x - 1, y));
        }
        if y + 1 < height {
            work.push((x, y + 1));
        }
        if y > 0 {
            work.push((x, y - 1));
        }
    }

    debug!("flood fill at ({seed_x}, {seed_y}) recolored {recolored} pixels");
    Ok(recolored)
}
