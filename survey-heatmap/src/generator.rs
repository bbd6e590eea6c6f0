use image::{Rgba, RgbaImage};

use crate::colormap::{self, BACKGROUND, Rgba8};
use crate::heatmap_rgba;
use survey_core::CoverageGrid;

const COLORBAR_WIDTH: u32 = 50;
const COLORBAR_LEFT: u32 = 50;

fn fill_rect(
    image: &mut RgbaImage,
    start_x: u32,
    start_y: u32,
    width: u32,
    height: u32,
    color: Rgba8,
) {
    let end_x = start_x.saturating_add(width).min(image.width());
    let end_y = start_y.saturating_add(height).min(image.height());

    for y in start_y..end_y {
        for x in start_x..end_x {
            image.put_pixel(x, y, Rgba(color));
        }
    }
}

pub fn draw_colorbar(image: &mut RgbaImage, x: u32, y: u32, width: u32, height: u32) {
    for row in 0..height {
        let color = colormap::value_to_color(colormap::colorbar_value(row, height));
        fill_rect(image, x, y + row, width, 1, color);
    }
}

pub fn build_heatmap_image(grid: &CoverageGrid) -> Option<RgbaImage> {
    RgbaImage::from_raw(grid.width() as u32, grid.height() as u32, heatmap_rgba(grid))
}

pub fn build_survey_image(grid: &CoverageGrid) -> Option<RgbaImage> {
    let heatmap = build_heatmap_image(grid)?;
    let mut image = RgbaImage::from_pixel(heatmap.width(), heatmap.height(), Rgba(BACKGROUND));

    for (x, y, pixel) in heatmap.enumerate_pixels() {
        if pixel.0[3] != 0 {
            image.put_pixel(x, y, *pixel);
        }
    }

    let height = image.height();
    draw_colorbar(&mut image, COLORBAR_LEFT, height / 4, COLORBAR_WIDTH, height / 2);
    Some(image)
}
