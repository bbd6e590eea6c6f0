use crate::boundary::BoundarySpec;
use crate::coordinates::{DisplayFrame, Vector2};
use crate::flight::Photo;

#[derive(Debug, Clone)]
pub struct CoverageGrid {
    frame: DisplayFrame,
    photo_size: u32,
    cells: Vec<Option<u32>>,
}

impl CoverageGrid {
    pub fn new(frame: DisplayFrame, photo_size: u32) -> Self {
        let len = frame.width as usize * frame.height as usize;
        Self {
            frame,
            photo_size,
            cells: vec![None; len],
        }
    }

    pub fn frame(&self) -> DisplayFrame {
        self.frame
    }

    pub fn width(&self) -> usize {
        self.frame.width as usize
    }

    pub fn height(&self) -> usize {
        self.frame.height as usize
    }

    fn cell_index(&self, x: usize, y: usize) -> Option<usize> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(x + y * self.width())
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<u32> {
        self.cell_index(x, y).and_then(|index| self.cells[index])
    }

    pub fn is_area(&self, x: usize, y: usize) -> bool {
        self.cell(x, y).is_some()
    }

    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Option<u32>)> + '_ {
        let width = self.width();
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, value)| (index % width, index / width, *value))
    }

    fn mark_area(&mut self, x: usize, y: usize) {
        if let Some(index) = self.cell_index(x, y) {
            self.cells[index] = Some(0);
        }
    }

    pub fn stamp_boundary(&mut self, boundary: &BoundarySpec) {
        match boundary {
            BoundarySpec::Circle { center, radius } => self.stamp_circle(*center, *radius),
            BoundarySpec::Rectangle { .. } => {
                let (min, max) = boundary.bounding_box();
                self.stamp_rectangle(min, max);
            }
        }
    }

    fn stamp_circle(&mut self, center: Vector2, radius: f64) {
        let grid_center = self.frame.to_grid(center);
        let radius_sq = radius * radius;
        let Some((min_x, max_x)) = clip_span(grid_center.x - radius, grid_center.x + radius, self.width())
        else {
            return;
        };
        let Some((min_y, max_y)) = clip_span(grid_center.y - radius, grid_center.y + radius, self.height())
        else {
            return;
        };

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f64 - grid_center.x;
                let dy = y as f64 - grid_center.y;
                if dx * dx + dy * dy <= radius_sq {
                    self.mark_area(x, y);
                }
            }
        }
    }

    fn stamp_rectangle(&mut self, min: Vector2, max: Vector2) {
        let low = self.frame.to_grid(min);
        let high = self.frame.to_grid(max);
        let Some((min_x, max_x)) = clip_span(low.x, high.x, self.width()) else {
            return;
        };
        let Some((min_y, max_y)) = clip_span(low.y, high.y, self.height()) else {
            return;
        };

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                self.mark_area(x, y);
            }
        }
    }

    pub fn stamp_photo(&mut self, photo: &Photo) {
        let size = self.photo_size;
        let half = (size / 2) as f64;

        for i in 0..size {
            for j in 0..size {
                let sample = Vector2::new(
                    photo.center.x - half + i as f64,
                    photo.center.y - half + j as f64,
                );
                let rotated = sample.rotated_around(photo.center, photo.heading);
                let Some((x, y)) = self.frame.grid_cell(rotated) else {
                    continue;
                };
                if let Some(index) = self.cell_index(x, y) {
                    if let Some(count) = self.cells[index].as_mut() {
                        *count += 1;
                    }
                }
            }
        }
    }

    pub fn stamp_photos(&mut self, photos: &[Photo]) {
        for photo in photos {
            self.stamp_photo(photo);
        }
    }

    pub fn area_cells(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn covered_cells(&self) -> usize {
        self.cells.iter().filter(|cell| matches!(cell, Some(n) if *n > 0)).count()
    }

    pub fn overlapping_cells(&self) -> usize {
        self.cells.iter().filter(|cell| matches!(cell, Some(n) if *n > 1)).count()
    }

    pub fn max_count(&self) -> u32 {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }

    pub fn coverage_percent(&self) -> f64 {
        percent(self.covered_cells(), self.area_cells())
    }

    pub fn overlap_percent(&self) -> f64 {
        percent(self.overlapping_cells(), self.covered_cells())
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    100.0 * part as f64 / whole as f64
}

fn clip_span(low: f64, high: f64, len: usize) -> Option<(usize, usize)> {
    if len == 0 || !(low.is_finite() && high.is_finite()) {
        return None;
    }
    let low = low.ceil().max(0.0);
    let high = high.floor().min((len - 1) as f64);
    if low > high {
        return None;
    }
    Some((low as usize, high as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DisplayFrame {
        DisplayFrame::new(40, 40)
    }

    // 9 x 10 cells: world x 0..=8, y 0..=9.
    fn ninety_cell_grid(photo_size: u32) -> CoverageGrid {
        let mut grid = CoverageGrid::new(frame(), photo_size);
        grid.stamp_boundary(&BoundarySpec::rectangle([
            Vector2::new(0.0, 0.0),
            Vector2::new(8.0, 0.0),
            Vector2::new(0.0, 9.0),
            Vector2::new(8.0, 9.0),
        ]));
        grid
    }

    fn photo(x: f64, y: f64, heading: f64) -> Photo {
        Photo {
            center: Vector2::new(x, y),
            heading,
        }
    }

    fn total_count(grid: &CoverageGrid) -> u32 {
        grid.cells().filter_map(|(_, _, value)| value).sum()
    }

    #[test]
    fn empty_grid_reports_zero_without_dividing() {
        let grid = CoverageGrid::new(frame(), 19);
        assert_eq!(grid.area_cells(), 0);
        assert_eq!(grid.coverage_percent(), 0.0);
        assert_eq!(grid.overlap_percent(), 0.0);
    }

    #[test]
    fn rectangle_marks_inclusive_bounding_box() {
        let grid = ninety_cell_grid(3);
        assert_eq!(grid.area_cells(), 90);
        assert!(grid.is_area(20, 20));
        assert!(grid.is_area(28, 29));
        assert!(!grid.is_area(29, 29));
        assert!(!grid.is_area(19, 20));
        assert_eq!(grid.cell(20, 20), Some(0));
    }

    #[test]
    fn fractional_rectangle_stays_inside_its_box() {
        let min = Vector2::new(0.0, 0.0);
        let max = Vector2::new(2.7, 2.7);
        let mut grid = CoverageGrid::new(frame(), 3);
        grid.stamp_boundary(&BoundarySpec::rectangle([
            min,
            Vector2::new(max.x, min.y),
            Vector2::new(min.x, max.y),
            max,
        ]));

        let low = frame().to_grid(min);
        let high = frame().to_grid(max);
        for (x, y, value) in grid.cells() {
            let (gx, gy) = (x as f64, y as f64);
            let inside = low.x <= gx && gx <= high.x && low.y <= gy && gy <= high.y;
            assert_eq!(value.is_some(), inside, "cell ({x}, {y})");
        }
        assert_eq!(grid.area_cells(), 9);
    }

    #[test]
    fn fractional_corners_round_inwards() {
        let mut grid = CoverageGrid::new(frame(), 3);
        grid.stamp_boundary(&BoundarySpec::rectangle([
            Vector2::new(-1.5, -0.5),
            Vector2::new(1.5, -0.5),
            Vector2::new(-1.5, 0.5),
            Vector2::new(1.5, 0.5),
        ]));

        // x -1..=1, y 0
        assert_eq!(grid.area_cells(), 3);
        assert!(grid.is_area(19, 20));
        assert!(grid.is_area(21, 20));
        assert!(!grid.is_area(18, 20));
        assert!(!grid.is_area(20, 19));
    }

    #[test]
    fn overlap_follows_photographed_cells() {
        let mut grid = ninety_cell_grid(3);
        assert_eq!(grid.coverage_percent(), 0.0);
        assert_eq!(grid.overlap_percent(), 0.0);

        grid.stamp_photo(&photo(4.0, 4.0, 0.0));
        assert_eq!(grid.covered_cells(), 9);
        assert_eq!(grid.coverage_percent(), 10.0);
        assert_eq!(grid.overlap_percent(), 0.0);

        grid.stamp_photo(&photo(4.0, 4.0, 0.0));
        assert_eq!(grid.coverage_percent(), 10.0);
        assert_eq!(grid.overlap_percent(), 100.0);
        assert_eq!(grid.max_count(), 2);
    }

    #[test]
    fn circle_marks_exactly_cells_within_radius() {
        let mut grid = CoverageGrid::new(frame(), 19);
        let center = Vector2::new(3.0, -2.0);
        let radius = 6.5;
        grid.stamp_boundary(&BoundarySpec::circle(center, radius));

        let grid_center = frame().to_grid(center);
        for (x, y, value) in grid.cells() {
            let dx = x as f64 - grid_center.x;
            let dy = y as f64 - grid_center.y;
            let inside = dx * dx + dy * dy <= radius * radius;
            assert_eq!(value.is_some(), inside, "cell ({x}, {y})");
        }
    }

    #[test]
    fn circle_partly_off_grid_is_clipped() {
        let mut grid = CoverageGrid::new(frame(), 19);
        grid.stamp_boundary(&BoundarySpec::circle(Vector2::new(-20.0, -20.0), 5.0));

        assert!(grid.is_area(0, 0));
        assert!(grid.area_cells() > 0);
        assert!(grid.area_cells() < 30);
    }

    #[test]
    fn photos_outside_area_count_for_nothing() {
        let mut grid = ninety_cell_grid(3);
        grid.stamp_photo(&photo(-10.0, -10.0, 0.0));
        grid.stamp_photo(&photo(500.0, 500.0, 30.0));

        assert_eq!(grid.covered_cells(), 0);
        assert_eq!(total_count(&grid), 0);
    }

    #[test]
    fn quarter_turn_footprint_matches_unrotated() {
        let mut upright = ninety_cell_grid(3);
        let mut turned = ninety_cell_grid(3);
        upright.stamp_photo(&photo(4.0, 4.0, 0.0));
        turned.stamp_photo(&photo(4.0, 4.0, 90.0));

        let upright_cells: Vec<_> = upright.cells().collect();
        let turned_cells: Vec<_> = turned.cells().collect();
        assert_eq!(upright_cells, turned_cells);
    }

    #[test]
    fn tilted_footprint_counts_every_sample() {
        let mut grid = CoverageGrid::new(DisplayFrame::new(100, 100), 19);
        grid.stamp_boundary(&BoundarySpec::circle(Vector2::ZERO, 45.0));
        grid.stamp_photo(&photo(0.0, 0.0, 45.0));

        assert_eq!(total_count(&grid), 19 * 19);
        assert!(grid.covered_cells() < 19 * 19);
        assert!(grid.max_count() > 1);
    }

    #[test]
    fn coverage_never_decreases() {
        let mut grid = CoverageGrid::new(DisplayFrame::new(200, 200), 19);
        grid.stamp_boundary(&BoundarySpec::circle(Vector2::new(10.0, 0.0), 60.0));

        let mut last = grid.coverage_percent();
        for k in 0..30 {
            let angle = k as f64 * 0.7;
            let photo = photo(
                10.0 + 40.0 * angle.cos(),
                40.0 * angle.sin(),
                k as f64 * 17.0,
            );
            grid.stamp_photo(&photo);
            let coverage = grid.coverage_percent();
            assert!(coverage >= last, "coverage dropped at photo {k}");
            last = coverage;
        }
        assert!(last > 0.0);
    }

    #[test]
    fn boundary_stamping_is_idempotent_and_keeps_counts_out() {
        let mut grid = ninety_cell_grid(3);
        grid.stamp_boundary(&BoundarySpec::rectangle([
            Vector2::new(0.0, 0.0),
            Vector2::new(8.0, 0.0),
            Vector2::new(0.0, 9.0),
            Vector2::new(8.0, 9.0),
        ]));
        assert_eq!(grid.area_cells(), 90);
        assert_eq!(grid.max_count(), 0);
    }
}
