use macroquad::prelude::*;

#[derive(Debug, Clone)]
pub struct DroneDrawConfig {
    pub radius_px: f32,            // inner radius before stroke, at unit scale
    pub stroke_ratio: f32,         // stroke width as a fraction of radius
    pub line_start_ratio: f32,     // where the heading line begins, fraction of radius
    pub line_length_ratio: f32,    // line length as a fraction of radius
    pub line_thickness_ratio: f32, // line thickness as a fraction of radius
    pub stroke_color: Color,
    pub fill_color: Color,
}

impl Default for DroneDrawConfig {
    fn default() -> Self {
        Self {
            radius_px: 6.0,
            stroke_ratio: 0.4,
            line_start_ratio: 1.0 / 3.0,
            line_length_ratio: 2.0 / 3.0,
            line_thickness_ratio: 0.4,
            stroke_color: BLACK,
            fill_color: WHITE,
        }
    }
}

/// Screen-space unit vector for a compass yaw: 0 points up (north), 90
/// points right (east).
pub fn heading_vector(yaw_degrees: f64) -> Vec2 {
    let (sin, cos) = yaw_degrees.to_radians().sin_cos();
    vec2(sin as f32, -cos as f32)
}

pub fn draw_drone(center_screen: Vec2, yaw_degrees: f64, scale: f32, config: &DroneDrawConfig) {
    let radius_px = config.radius_px * scale.max(0.5);
    let stroke_px = (radius_px * config.stroke_ratio).max(1.0);
    let outer_radius_px = radius_px + stroke_px * 0.5;
    let inner_radius_px = (radius_px - stroke_px * 0.5).max(0.0);
    let heading = heading_vector(yaw_degrees);

    let line_start = center_screen + heading * (radius_px * config.line_start_ratio);
    let line_end = line_start + heading * (radius_px * config.line_length_ratio);
    let line_thickness_px = (radius_px * config.line_thickness_ratio).max(1.0);

    draw_circle(
        center_screen.x,
        center_screen.y,
        outer_radius_px,
        config.stroke_color,
    );
    if inner_radius_px > 0.0 {
        draw_circle(
            center_screen.x,
            center_screen.y,
            inner_radius_px,
            config.fill_color,
        );
    }
    draw_line(
        line_start.x,
        line_start.y,
        line_end.x,
        line_end.y,
        line_thickness_px,
        config.stroke_color,
    );
    draw_circle(
        line_end.x,
        line_end.y,
        line_thickness_px * 0.5,
        config.stroke_color,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Vec2, expected: Vec2) {
        assert!((actual - expected).length() < 1e-6, "{actual:?} != {expected:?}");
    }

    #[test]
    fn heading_zero_points_north_on_screen() {
        assert_close(heading_vector(0.0), vec2(0.0, -1.0));
        assert_close(heading_vector(90.0), vec2(1.0, 0.0));
        assert_close(heading_vector(-90.0), vec2(-1.0, 0.0));
        assert_close(heading_vector(180.0), vec2(0.0, 1.0));
    }
}
