use anyhow::{Context, Result};
use macroquad::prelude::*;
use survey_core::{
    BoundarySpec, DisplayFrame, FlightPhase, Photo, SimSettings, SurveyOutcome, Vector2,
};
use survey_heatmap::colormap::{self, COLORBAR_TITLE, Rgba8};
use survey_heatmap::heatmap_rgba;

use crate::drone::{DroneDrawConfig, draw_drone};
use crate::frames::{SurveyHandle, SurveyMessage};

mod drone;
pub mod frames;

const MIN_ZOOM_POWER: i32 = -16;
const MAX_ZOOM_POWER: i32 = 30;
const ZOOM_FACTOR: f32 = 1.1;

const PHOTO_COLOR: Color = Color::new(200.0 / 255.0, 200.0 / 255.0, 200.0 / 255.0, 1.0);
const PATH_COLOR: Color = Color::new(1.0, 0.8, 0.0, 1.0);
const BOUNDARY_COLOR: Color = RED;
const TEXT_COLOR: Color = BLACK;
const TEXT_SIZE: f32 = 20.0;

fn zoom_scale_from_power(power: i32) -> f32 {
    ZOOM_FACTOR.powi(power)
}

fn clamp_zoom_power(power: i32) -> i32 {
    power.clamp(MIN_ZOOM_POWER, MAX_ZOOM_POWER)
}

fn rgba_color(rgba: Rgba8) -> Color {
    Color::from_rgba(rgba[0], rgba[1], rgba[2], rgba[3])
}

fn to_vec2(point: Vector2) -> Vec2 {
    vec2(point.x as f32, point.y as f32)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub frame: DisplayFrame,
    pub scale: f32,
    pub offset: Vec2,
}

impl ViewTransform {
    pub fn frame_to_screen(&self, point: Vec2) -> Vec2 {
        self.offset + point * self.scale
    }

    pub fn screen_to_frame(&self, point: Vec2) -> Vec2 {
        (point - self.offset) / self.scale
    }

    pub fn world_to_screen(&self, world: Vector2) -> Vec2 {
        self.frame_to_screen(to_vec2(self.frame.to_screen(world)))
    }

    pub fn heatmap_origin(&self) -> Vec2 {
        let center = self.frame.center();
        let top_row_world = (self.frame.height as f64 - 1.0) - center.y;
        let corner = Vector2::new(-center.x - 0.5, top_row_world + 0.5);
        self.world_to_screen(corner)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Camera {
    zoom_power: i32,
    pan: Vec2,
}

impl Camera {
    pub fn transform(&self, frame: DisplayFrame, screen: Vec2) -> ViewTransform {
        let size = vec2(frame.width as f32, frame.height as f32);
        let fit = (screen.x / size.x).min(screen.y / size.y).max(f32::EPSILON);
        let scale = fit * zoom_scale_from_power(self.zoom_power);
        let offset = (screen - size * scale) * 0.5 + self.pan;
        ViewTransform {
            frame,
            scale,
            offset,
        }
    }

    pub fn zoom_at(&mut self, frame: DisplayFrame, screen: Vec2, delta_power: i32, focus: Vec2) {
        let next_power = clamp_zoom_power(self.zoom_power + delta_power);
        if next_power == self.zoom_power {
            return;
        }
        let anchor = self.transform(frame, screen).screen_to_frame(focus);
        self.zoom_power = next_power;
        let moved = self.transform(frame, screen).frame_to_screen(anchor);
        self.pan += focus - moved;
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }
}

pub struct ViewerState {
    settings: SimSettings,
    camera: Camera,
    drone_draw: DroneDrawConfig,
    position: Vector2,
    yaw: f64,
    phase: FlightPhase,
    flight_time: f64,
    path: Vec<Vector2>,
    photos: Vec<Photo>,
    outcome: Option<Box<SurveyOutcome>>,
    heatmap: Option<Texture2D>,
    error: Option<String>,
    last_right_drag_pos: Option<Vec2>,
    fps: f32,
    fps_frame_count: u32,
    fps_last_update_time: f64,
}

impl ViewerState {
    pub fn new(settings: SimSettings) -> Self {
        Self {
            settings,
            camera: Camera::default(),
            drone_draw: DroneDrawConfig::default(),
            position: Vector2::ZERO,
            yaw: 0.0,
            phase: FlightPhase::NotStarted,
            flight_time: 0.0,
            path: Vec::new(),
            photos: Vec::new(),
            outcome: None,
            heatmap: None,
            error: None,
            last_right_drag_pos: None,
            fps: 0.0,
            fps_frame_count: 0,
            fps_last_update_time: 0.0,
        }
    }

    pub fn finished(&self) -> bool {
        self.outcome.is_some() || self.error.is_some()
    }

    pub fn path(&self) -> &[Vector2] {
        &self.path
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn apply(&mut self, message: SurveyMessage) {
        match message {
            SurveyMessage::Frame(update) => {
                self.position = update.position;
                self.yaw = update.yaw;
                self.phase = update.phase;
                self.flight_time = update.flight_time;
                self.path.extend(update.new_path);
                self.photos.extend(update.new_photos);
            }
            SurveyMessage::Finished(outcome) => {
                self.position = outcome.flight.position();
                self.yaw = outcome.flight.yaw();
                self.phase = outcome.flight.phase();
                self.flight_time = outcome.flight.flight_time();
                self.path = outcome.flight.path().to_vec();
                self.photos = outcome.flight.photos().to_vec();
                for line in outcome.report.to_string().lines() {
                    log::info!("{}", line);
                }
                self.outcome = Some(outcome);
            }
            SurveyMessage::Failed(message) => {
                self.error = Some(message);
            }
        }
    }

    fn view(&self) -> ViewTransform {
        self.camera
            .transform(self.settings.frame(), vec2(screen_width(), screen_height()))
    }

    fn handle_mouse_wheel_zoom(&mut self) {
        let (_wheel_x, wheel_y) = mouse_wheel();
        if wheel_y == 0.0 {
            return;
        }
        let (mouse_x, mouse_y) = mouse_position();
        let delta = if wheel_y > 0.0 { 1 } else { -1 };
        self.camera.zoom_at(
            self.settings.frame(),
            vec2(screen_width(), screen_height()),
            delta,
            vec2(mouse_x, mouse_y),
        );
    }

    fn handle_right_mouse_drag(&mut self) {
        let mouse = Vec2::from(mouse_position());
        if is_mouse_button_down(MouseButton::Right) {
            if let Some(last) = self.last_right_drag_pos {
                self.camera.pan_by(mouse - last);
            }
            self.last_right_drag_pos = Some(mouse);
        } else {
            self.last_right_drag_pos = None;
        }
    }

    fn update_fps_if_due(&mut self) {
        let now = get_time();
        self.fps_frame_count += 1;
        let elapsed = now - self.fps_last_update_time;
        if elapsed >= 1.0 {
            self.fps = self.fps_frame_count as f32 / elapsed as f32;
            self.fps_frame_count = 0;
            self.fps_last_update_time = now;
        }
    }

    fn ensure_heatmap_texture(&mut self) {
        if self.heatmap.is_some() {
            return;
        }
        let Some(outcome) = &self.outcome else {
            return;
        };
        let grid = &outcome.coverage;
        let (Ok(width), Ok(height)) = (u16::try_from(grid.width()), u16::try_from(grid.height()))
        else {
            log::warn!("coverage grid too large for a texture");
            return;
        };
        let texture = Texture2D::from_rgba8(width, height, &heatmap_rgba(grid));
        texture.set_filter(FilterMode::Nearest);
        self.heatmap = Some(texture);
    }

    fn render(&mut self) {
        clear_background(rgba_color(colormap::BACKGROUND));
        self.ensure_heatmap_texture();
        let view = self.view();

        if let Some(texture) = &self.heatmap {
            let origin = view.heatmap_origin();
            let size = vec2(texture.width(), texture.height()) * view.scale;
            draw_texture_ex(
                texture,
                origin.x,
                origin.y,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(size),
                    ..Default::default()
                },
            );
        } else {
            self.render_photos(&view);
        }

        self.render_path(&view);
        draw_drone(
            view.world_to_screen(self.position),
            self.yaw,
            view.scale,
            &self.drone_draw,
        );
        self.render_boundary(&view);

        if self.outcome.is_some() {
            self.render_colorbar(&view);
        }
        self.render_text();
    }

    fn render_photos(&self, view: &ViewTransform) {
        let side = self.settings.photo_size as f32 * view.scale;
        for photo in &self.photos {
            let center = view.world_to_screen(photo.center);
            draw_rectangle_ex(
                center.x,
                center.y,
                side,
                side,
                DrawRectangleParams {
                    offset: vec2(0.5, 0.5),
                    rotation: photo.heading.to_radians() as f32,
                    color: PHOTO_COLOR,
                },
            );
        }
    }

    fn render_path(&self, view: &ViewTransform) {
        let thickness = view.scale.max(1.0);
        for pair in self.path.windows(2) {
            let from = view.world_to_screen(pair[0]);
            let to = view.world_to_screen(pair[1]);
            draw_line(from.x, from.y, to.x, to.y, thickness, PATH_COLOR);
        }
    }

    fn render_boundary(&self, view: &ViewTransform) {
        match &self.settings.boundary {
            BoundarySpec::Circle { center, radius } => {
                let center = view.world_to_screen(*center);
                draw_circle_lines(
                    center.x,
                    center.y,
                    *radius as f32 * view.scale,
                    1.0,
                    BOUNDARY_COLOR,
                );
            }
            boundary @ BoundarySpec::Rectangle { .. } => {
                let (min, max) = boundary.bounding_box();
                // north-west corner is the top-left on screen
                let top_left = view.world_to_screen(Vector2::new(min.x, max.y));
                let bottom_right = view.world_to_screen(Vector2::new(max.x, min.y));
                let size = bottom_right - top_left;
                draw_rectangle_lines(top_left.x, top_left.y, size.x, size.y, 1.0, BOUNDARY_COLOR);
            }
        }
    }

    fn render_colorbar(&self, view: &ViewTransform) {
        let frame_height = self.settings.height as f32;
        let top_left = view.frame_to_screen(vec2(50.0, (frame_height / 4.0).floor()));
        let width = 50.0 * view.scale;
        let rows = (frame_height / 2.0).floor().max(1.0) as u32;
        let row_height = view.scale;

        for row in 0..rows {
            let value = colormap::colorbar_value(row, rows);
            draw_rectangle(
                top_left.x,
                top_left.y + row as f32 * row_height,
                width,
                row_height.max(1.0),
                rgba_color(colormap::value_to_color(value)),
            );
        }

        let bottom = top_left.y + rows as f32 * row_height;
        draw_text(COLORBAR_TITLE, top_left.x, top_left.y - 8.0, TEXT_SIZE, TEXT_COLOR);
        draw_text(" - 10", top_left.x + width, top_left.y + 12.0, TEXT_SIZE, TEXT_COLOR);
        draw_text(" - 1", top_left.x + width, bottom, TEXT_SIZE, TEXT_COLOR);
    }

    fn render_text(&self) {
        let mut lines = vec![
            format!(
                "position: ({:.1}, {:.1})  heading: {:.0}",
                self.position.x, self.position.y, self.yaw
            ),
            format!("photos: {}  path samples: {}", self.photos.len(), self.path.len()),
        ];
        if self.phase == FlightPhase::Ended {
            lines.push(format!("flight: ended after {:.0} s", self.flight_time));
        } else {
            lines.push(format!("flight: {:?}", self.phase));
        }

        if let Some(outcome) = &self.outcome {
            lines.extend(outcome.report.to_string().lines().map(str::to_string));
            lines.push("Simulation complete. Press Escape to exit.".to_string());
        } else if let Some(error) = &self.error {
            lines.push(format!("survey failed: {}", error));
            lines.push("Press Escape to exit.".to_string());
        } else {
            lines.push("Escape ends the flight".to_string());
        }
        lines.push(format!("fps: {:.1}", self.fps));

        let x = screen_width() - 420.0;
        for (index, line) in lines.iter().enumerate() {
            draw_text(line, x, 30.0 + index as f32 * 24.0, TEXT_SIZE, TEXT_COLOR);
        }
    }
}

pub async fn run(settings: SimSettings) -> Result<()> {
    let mut survey =
        SurveyHandle::spawn(settings.clone()).context("Failed to start survey thread")?;
    let mut state = ViewerState::new(settings);

    loop {
        for message in survey.drain() {
            state.apply(message);
        }

        if is_key_pressed(KeyCode::Escape) {
            if state.finished() {
                break;
            }
            log::info!("ending flight on request");
            survey.request_quit();
        }

        state.handle_mouse_wheel_zoom();
        state.handle_right_mouse_drag();
        state.update_fps_if_due();
        state.render();

        next_frame().await;
    }

    survey.join();
    Ok(())
}
