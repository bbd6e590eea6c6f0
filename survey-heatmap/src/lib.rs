pub mod colormap;
#[cfg(feature = "generator")]
pub mod generator;

use colormap::{OUTSIDE, Rgba8, UNCOVERED, value_to_color};
use survey_core::CoverageGrid;

pub fn cell_color(value: Option<u32>) -> Rgba8 {
    match value {
        None => OUTSIDE,
        Some(0) => UNCOVERED,
        Some(count) => value_to_color(count as f64),
    }
}

// Grid y grows northwards, so rows are flipped.
pub fn heatmap_rgba(grid: &CoverageGrid) -> Vec<u8> {
    let (width, height) = (grid.width(), grid.height());
    let mut bytes = vec![0u8; width * height * 4];

    for (x, y, value) in grid.cells() {
        let row = height - 1 - y;
        let offset = (row * width + x) * 4;
        bytes[offset..offset + 4].copy_from_slice(&cell_color(value));
    }

    bytes
}
