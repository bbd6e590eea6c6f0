use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Positive `degrees` turn clockwise when viewed north-up.
    pub fn rotated_around(self, center: Vector2, degrees: f64) -> Vector2 {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let dx = self.x - center.x;
        let dy = self.y - center.y;
        Vector2::new(
            center.x + dx * cos + dy * sin,
            center.y - dx * sin + dy * cos,
        )
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Vector2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;

    fn mul(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayFrame {
    pub width: u32,
    pub height: u32,
}

impl DisplayFrame {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vector2 {
        Vector2::new((self.width / 2) as f64, (self.height / 2) as f64)
    }

    pub fn to_screen(&self, world: Vector2) -> Vector2 {
        let center = self.center();
        Vector2::new(world.x + center.x, center.y - world.y)
    }

    pub fn to_grid(&self, world: Vector2) -> Vector2 {
        world + self.center()
    }

    pub fn grid_cell(&self, world: Vector2) -> Option<(usize, usize)> {
        let grid = self.to_grid(world);
        self.cell_at(grid.x.round(), grid.y.round())
    }

    pub(crate) fn cell_at(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        if !(x.is_finite() && y.is_finite()) {
            return None;
        }
        if x < 0.0 || y < 0.0 || x >= self.width as f64 || y >= self.height as f64 {
            return None;
        }
        Some((x as usize, y as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Vector2, expected: Vector2) {
        assert!(
            (actual - expected).length() < 1e-9,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn quarter_turn_is_clockwise() {
        let rotated = Vector2::new(1.0, 0.0).rotated_around(Vector2::ZERO, 90.0);
        assert_close(rotated, Vector2::new(0.0, -1.0));

        let north = Vector2::new(0.0, 1.0).rotated_around(Vector2::ZERO, 90.0);
        assert_close(north, Vector2::new(1.0, 0.0));
    }

    #[test]
    fn zero_rotation_is_identity() {
        let point = Vector2::new(3.5, -7.25);
        assert_eq!(point.rotated_around(Vector2::new(1.0, 2.0), 0.0), point);
    }

    #[test]
    fn rotation_keeps_distance_to_center() {
        let center = Vector2::new(10.0, -4.0);
        let point = Vector2::new(13.0, 0.0);
        let rotated = point.rotated_around(center, 37.0);
        assert!(((rotated - center).length() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn screen_inverts_y_but_grid_does_not() {
        let frame = DisplayFrame::new(1600, 600);
        let world = Vector2::new(10.0, 20.0);

        assert_eq!(frame.to_screen(world), Vector2::new(810.0, 280.0));
        assert_eq!(frame.to_grid(world), Vector2::new(810.0, 320.0));
    }

    #[test]
    fn grid_cell_rounds_and_rejects_out_of_extent() {
        let frame = DisplayFrame::new(20, 10);

        assert_eq!(frame.grid_cell(Vector2::new(0.4, -0.6)), Some((10, 4)));
        assert_eq!(frame.grid_cell(Vector2::new(-10.0, -5.0)), Some((0, 0)));
        assert_eq!(frame.grid_cell(Vector2::new(10.0, 0.0)), None);
        assert_eq!(frame.grid_cell(Vector2::new(0.0, -6.0)), None);
        assert_eq!(frame.grid_cell(Vector2::new(f64::NAN, 0.0)), None);
    }
}
