use crate::clock::Clock;
use crate::flight::{FlightState, HEADING_UNAVAILABLE};
use crate::settings::SimSettings;
use fastrand::Rng;
use log::{debug, info};

pub trait RenderHook {
    fn draw(&mut self, flight: &FlightState);

    fn quit_requested(&self) -> bool {
        false
    }
}

pub trait FlightHost {
    fn adjust_flight_parameters(&mut self, x_velocity: f64, y_velocity: f64, yaw_rate: f64);
    fn pause_script_execution(&mut self, duration: f64);
    fn get_distance_to_origin(&self) -> f64;
    fn get_x_coordinate(&self) -> f64;
    fn get_y_coordinate(&self) -> f64;
    fn get_compass_heading(&mut self) -> f64;
    fn take_photo(&mut self);
    fn end_flight(&mut self);
}

pub struct FlightController {
    flight: FlightState,
    clock: Box<dyn Clock>,
    render: Option<Box<dyn RenderHook>>,
    poll_interval: f64,
    frame_interval: f64,
    compass_failure_rate: f64,
    rng: Rng,
    last_frame: f64,
}

impl FlightController {
    pub fn new(settings: &SimSettings, clock: Box<dyn Clock>) -> Self {
        Self {
            flight: FlightState::new(settings.simulation_speed),
            clock,
            render: None,
            poll_interval: settings.poll_interval_seconds(),
            frame_interval: settings.frame_interval_seconds(),
            compass_failure_rate: settings.compass_failure_rate,
            rng: Rng::with_seed(settings.seed),
            last_frame: 0.0,
        }
    }

    pub fn with_render_hook(mut self, hook: Box<dyn RenderHook>) -> Self {
        self.render = Some(hook);
        self
    }

    pub fn flight(&self) -> &FlightState {
        &self.flight
    }

    pub fn launch(&mut self) {
        let now = self.clock.now();
        self.flight.launch(now);
        self.last_frame = now;
    }

    pub fn simulated_elapsed(&self) -> f64 {
        self.flight.elapsed_simulated(self.clock.now())
    }

    pub fn quit_requested(&self) -> bool {
        self.render.as_ref().is_some_and(|hook| hook.quit_requested())
    }

    pub fn reset_frame_clock(&mut self) {
        self.last_frame = self.clock.now();
    }

    pub fn advance_frame(&mut self) {
        self.clock.sleep(self.frame_interval);
        let now = self.clock.now();
        let delta_time = (now - self.last_frame) * self.flight.speed_factor();
        self.last_frame = now;
        self.flight.step(delta_time);
        self.draw();
    }

    pub fn finish_flight(&mut self) -> bool {
        let now = self.clock.now();
        let ended = self.flight.end_flight(now);
        self.draw();
        ended
    }

    fn draw(&mut self) {
        if let Some(hook) = self.render.as_mut() {
            hook.draw(&self.flight);
        }
    }

    fn compass_read_fails(&mut self) -> bool {
        self.compass_failure_rate > 0.0 && self.rng.f64() < self.compass_failure_rate
    }
}

impl FlightHost for FlightController {
    fn adjust_flight_parameters(&mut self, x_velocity: f64, y_velocity: f64, yaw_rate: f64) {
        debug!("xVelocity: {x_velocity}, yVelocity: {y_velocity}, yaw: {yaw_rate}");
        self.flight
            .adjust_flight_parameters(x_velocity, y_velocity, yaw_rate);
    }

    /// The final wait and step are clamped to the deadline.
    fn pause_script_execution(&mut self, duration: f64) {
        if !self.flight.running() {
            debug!("flight not running, pause of {duration} seconds skipped");
            return;
        }

        let speed_factor = self.flight.speed_factor();
        let start = self.clock.now();
        let deadline = start + duration / speed_factor;
        let mut last = start;

        while last < deadline {
            self.clock.sleep(self.poll_interval.min(deadline - last));
            let now = self.clock.now().min(deadline);
            let delta_time = (now - last) * speed_factor;
            last = now;
            self.flight.step(delta_time);
            self.draw();
        }

        self.last_frame = self.clock.now();
        debug!("Paused for {duration} seconds");
    }

    fn get_distance_to_origin(&self) -> f64 {
        let distance = self.flight.distance_to_origin();
        debug!("distance: {distance}");
        distance
    }

    fn get_x_coordinate(&self) -> f64 {
        let x = self.flight.position().x;
        debug!("x: {x}");
        x
    }

    fn get_y_coordinate(&self) -> f64 {
        let y = self.flight.position().y;
        debug!("y: {y}");
        y
    }

    fn get_compass_heading(&mut self) -> f64 {
        if self.compass_read_fails() {
            debug!("compass: retrieval failed");
            return HEADING_UNAVAILABLE;
        }
        let heading = self.flight.compass_heading();
        debug!("compass: {heading}");
        heading
    }

    fn take_photo(&mut self) {
        if let Some(photo) = self.flight.capture_photo() {
            info!("Photo taken at ({}, {})", photo.center.x, photo.center.y);
        }
    }

    fn end_flight(&mut self) {
        if self.finish_flight() {
            info!(
                "flight ended after {:.1} simulated seconds",
                self.flight.flight_time()
            );
        }
    }
}
