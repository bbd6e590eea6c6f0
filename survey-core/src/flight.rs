use crate::coordinates::Vector2;
use log::debug;
use serde::{Deserialize, Serialize};

/// Returned by the compass when no heading can be reported.
pub const HEADING_UNAVAILABLE: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub center: Vector2,
    pub heading: f64, // cumulative yaw at capture, degrees
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlightPhase {
    #[default]
    NotStarted,
    Running,
    Ended,
}

#[derive(Debug, Clone)]
pub struct FlightState {
    position: Vector2,
    velocity: Vector2,
    yaw: f64,
    path: Vec<Vector2>,
    photos: Vec<Photo>,
    phase: FlightPhase,
    start_time: f64,
    speed_factor: f64,
    flight_time: f64,
}

impl FlightState {
    pub fn new(speed_factor: f64) -> Self {
        Self {
            position: Vector2::ZERO,
            velocity: Vector2::ZERO,
            yaw: 0.0,
            path: Vec::new(),
            photos: Vec::new(),
            phase: FlightPhase::NotStarted,
            start_time: 0.0,
            speed_factor,
            flight_time: 0.0,
        }
    }

    pub fn launch(&mut self, now: f64) {
        if self.phase != FlightPhase::NotStarted {
            return;
        }
        self.start_time = now;
        self.phase = FlightPhase::Running;
    }

    pub fn position(&self) -> Vector2 {
        self.position
    }

    pub fn velocity(&self) -> Vector2 {
        self.velocity
    }

    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    pub fn path(&self) -> &[Vector2] {
        &self.path
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    pub fn running(&self) -> bool {
        self.phase == FlightPhase::Running
    }

    pub fn speed_factor(&self) -> f64 {
        self.speed_factor
    }

    pub fn flight_time(&self) -> f64 {
        self.flight_time
    }

    pub fn elapsed_simulated(&self, now: f64) -> f64 {
        match self.phase {
            FlightPhase::NotStarted => 0.0,
            FlightPhase::Running => (now - self.start_time) * self.speed_factor,
            FlightPhase::Ended => self.flight_time,
        }
    }

    pub fn adjust_flight_parameters(&mut self, x_velocity: f64, y_velocity: f64, yaw_rate: f64) {
        if self.phase == FlightPhase::Ended {
            debug!("flight ended, ignoring flight parameters");
            return;
        }
        self.velocity = Vector2::new(x_velocity, y_velocity);
        self.yaw += yaw_rate;
    }

    pub fn step(&mut self, delta_time: f64) {
        if !self.running() {
            return;
        }
        self.position += self.velocity * delta_time;
        self.path.push(self.position);
    }

    pub fn capture_photo(&mut self) -> Option<Photo> {
        if self.phase == FlightPhase::Ended {
            debug!("flight ended, ignoring photo request");
            return None;
        }
        let photo = Photo {
            center: self.position,
            heading: self.yaw,
        };
        self.photos.push(photo);
        Some(photo)
    }

    /// Only the first call measures the flight time.
    pub fn end_flight(&mut self, now: f64) -> bool {
        self.velocity = Vector2::ZERO;
        match self.phase {
            FlightPhase::Ended => false,
            FlightPhase::NotStarted => {
                self.phase = FlightPhase::Ended;
                true
            }
            FlightPhase::Running => {
                self.flight_time = (now - self.start_time) * self.speed_factor;
                self.phase = FlightPhase::Ended;
                true
            }
        }
    }

    pub fn distance_to_origin(&self) -> f64 {
        self.position.length()
    }

    pub fn compass_heading(&self) -> f64 {
        if (-180.0..=180.0).contains(&self.yaw) {
            self.yaw
        } else {
            HEADING_UNAVAILABLE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launched() -> FlightState {
        let mut flight = FlightState::new(1.0);
        flight.launch(0.0);
        flight
    }

    #[test]
    fn compass_reports_sentinel_outside_half_turn() {
        let cases = [
            (-181.0, HEADING_UNAVAILABLE),
            (-180.0, -180.0),
            (0.0, 0.0),
            (180.0, 180.0),
            (181.0, HEADING_UNAVAILABLE),
            (540.0, HEADING_UNAVAILABLE),
        ];

        for (yaw, expected) in cases {
            let mut flight = launched();
            flight.adjust_flight_parameters(0.0, 0.0, yaw);
            assert_eq!(flight.compass_heading(), expected, "yaw {yaw}");
        }
    }

    #[test]
    fn yaw_accumulates_without_wrapping() {
        let mut flight = launched();
        flight.adjust_flight_parameters(0.0, 0.0, 150.0);
        flight.adjust_flight_parameters(0.0, 0.0, 150.0);
        assert_eq!(flight.yaw(), 300.0);

        flight.adjust_flight_parameters(0.0, 0.0, -200.0);
        assert_eq!(flight.yaw(), 100.0);
        assert_eq!(flight.compass_heading(), 100.0);
    }

    #[test]
    fn velocity_is_held_between_steps() {
        let mut flight = launched();
        flight.adjust_flight_parameters(2.0, 0.0, 0.0);

        flight.step(1.0);
        flight.step(0.5);
        flight.step(1.5);

        assert_eq!(flight.position(), Vector2::new(6.0, 0.0));
        assert_eq!(flight.path().len(), 3);
        assert_eq!(flight.path()[0], Vector2::new(2.0, 0.0));
    }

    #[test]
    fn tiny_steps_stay_stable() {
        let mut flight = launched();
        flight.adjust_flight_parameters(0.0, -3.0, 0.0);
        for _ in 0..10_000 {
            flight.step(1e-4);
        }
        assert!((flight.position().y + 3.0).abs() < 1e-9);
        assert_eq!(flight.path().len(), 10_000);
    }

    #[test]
    fn advisory_limits_are_not_clamped() {
        let mut flight = launched();
        flight.adjust_flight_parameters(50.0, -40.0, 1000.0);
        assert_eq!(flight.velocity(), Vector2::new(50.0, -40.0));
        assert_eq!(flight.yaw(), 1000.0);
    }

    #[test]
    fn photo_records_position_and_heading() {
        let mut flight = launched();
        flight.adjust_flight_parameters(3.0, 4.0, 45.0);
        flight.step(1.0);

        let photo = flight.capture_photo().unwrap();

        assert_eq!(photo.center, Vector2::new(3.0, 4.0));
        assert_eq!(photo.heading, 45.0);
        assert_eq!(flight.photos(), &[photo]);
        assert_eq!(flight.distance_to_origin(), 5.0);
    }

    #[test]
    fn end_flight_freezes_time_once() {
        let mut flight = FlightState::new(25.0);
        flight.launch(10.0);
        flight.adjust_flight_parameters(1.0, 1.0, 0.0);

        assert_eq!(flight.flight_time(), 0.0);
        assert!(flight.end_flight(12.0));
        assert_eq!(flight.flight_time(), 50.0);
        assert_eq!(flight.velocity(), Vector2::ZERO);
        assert!(!flight.running());

        assert!(!flight.end_flight(20.0));
        assert_eq!(flight.flight_time(), 50.0);
        assert_eq!(flight.elapsed_simulated(99.0), 50.0);
    }

    #[test]
    fn ended_flight_ignores_further_commands() {
        let mut flight = launched();
        flight.adjust_flight_parameters(1.0, 0.0, 0.0);
        flight.step(1.0);
        flight.end_flight(1.0);

        flight.adjust_flight_parameters(5.0, 5.0, 10.0);
        flight.step(1.0);

        assert_eq!(flight.position(), Vector2::new(1.0, 0.0));
        assert_eq!(flight.velocity(), Vector2::ZERO);
        assert_eq!(flight.yaw(), 0.0);
        assert!(flight.capture_photo().is_none());
        assert_eq!(flight.path().len(), 1);
    }

    #[test]
    fn steps_before_launch_are_ignored() {
        let mut flight = FlightState::new(1.0);
        flight.adjust_flight_parameters(1.0, 0.0, 0.0);
        flight.step(1.0);

        assert_eq!(flight.phase(), FlightPhase::NotStarted);
        assert!(flight.path().is_empty());
        assert_eq!(flight.elapsed_simulated(5.0), 0.0);
    }
}
