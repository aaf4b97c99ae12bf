//! Stack-based 4-connected flood fill over the surface's pixel buffer.
//!
//! Matching compares RGB only; alpha is ignored except for the seed check against
//! the non-fillable sentinel. The fill runs on a copy of the buffer which is
//! committed back in one step, so callers never observe a half-filled surface.
//!
//! Reads and writes share that copy. This is sound because of one invariant:
//! a written pixel has the fill RGB, so it never matches the target again and
//! is never revisited. The invariant breaks only when the fill RGB equals the
//! target RGB; only then is a separate visited mask kept.

use egui::Color32;
use image::Rgba;

use crate::error::FillError;
use crate::surface::{Surface, TRANSPARENT};

/// Seeds on this exact pixel value are never filled
pub const NON_FILLABLE: Rgba<u8> = TRANSPARENT;

/// Outcome of a successful fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillReport {
    /// Number of pixels written
    pub filled: usize,
}

/// Recolor the 4-connected region of pixels sharing the seed's RGB.
///
/// Filled pixels get `fill_color`'s RGB and alpha 255. The surface is untouched
/// when the seed is outside it or sits on a [`NON_FILLABLE`] pixel.
pub fn flood_fill(
    surface: &mut Surface,
    seed: (i32, i32),
    fill_color: Color32,
) -> Result<FillReport, FillError> {
    let (seed_x, seed_y) = seed;
    let Some(seed_pixel) = surface.pixel(seed_x, seed_y) else {
        return Err(FillError::SeedOutOfBounds {
            x: seed_x,
            y: seed_y,
            width: surface.width(),
            height: surface.height(),
        });
    };
    if seed_pixel == NON_FILLABLE {
        return Err(FillError::NonFillable { x: seed_x, y: seed_y });
    }

    let target = [seed_pixel[0], seed_pixel[1], seed_pixel[2]];
    let fill = [fill_color.r(), fill_color.g(), fill_color.b()];
    let width = surface.width() as usize;
    let height = surface.height() as usize;

    let mut data = surface.as_raw().to_vec();
    let mut visited = (fill == target).then(|| vec![false; width * height]);
    let mut stack = vec![(seed_x, seed_y)];
    let mut filled = 0;

    while let Some((x, y)) = stack.pop() {
        if x < 0 || y < 0 || x as usize >= width || y as usize >= height {
            continue;
        }
        let index = y as usize * width + x as usize;
        if let Some(visited) = visited.as_mut() {
            if visited[index] {
                continue;
            }
            visited[index] = true;
        }

        let offset = index * 4;
        if data[offset..offset + 3] != target[..] {
            continue;
        }
        data[offset..offset + 3].copy_from_slice(&fill);
        data[offset + 3] = 255;
        filled += 1;

        stack.push((x + 1, y));
        stack.push((x - 1, y));
        stack.push((x, y + 1));
        stack.push((x, y - 1));
    }

    surface.commit_raw(data);
    log::debug!("Flood fill from ({}, {}) wrote {} pixels", seed_x, seed_y, filled);
    Ok(FillReport { filled })
}
