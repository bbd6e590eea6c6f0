use crate::clock::Clock;
use crate::controller::{FlightController, FlightHost, RenderHook};
use crate::coordinates::Vector2;
use crate::coverage::CoverageGrid;
use crate::flight::FlightState;
use crate::script::{ScriptBridge, ScriptError, ScriptSource};
use crate::settings::{SettingsError, SimSettings};
use log::{info, warn};
use serde::Serialize;
use std::cell::RefCell;
use std::error::Error;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyReport {
    pub flight_time: f64,
    pub coverage_percent: f64,
    pub overlap_percent: f64,
    pub photo_count: usize,
    pub path_samples: usize,
    pub final_position: Vector2,
}

impl SurveyReport {
    pub fn flight_minutes_seconds(&self) -> (u64, u64) {
        let total = self.flight_time.max(0.0) as u64;
        (total / 60, total % 60)
    }
}

impl fmt::Display for SurveyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (minutes, seconds) = self.flight_minutes_seconds();
        writeln!(f, "Total flight time: {} Minutes, {} Seconds", minutes, seconds)?;
        writeln!(f, "Coverage: {}%", self.coverage_percent as u64)?;
        write!(f, "Overlap: {}%", self.overlap_percent as u64)
    }
}

#[derive(Debug, Clone)]
pub struct SurveyOutcome {
    pub report: SurveyReport,
    pub flight: FlightState,
    pub coverage: CoverageGrid,
}

#[derive(Debug)]
pub enum SimulationError {
    Settings(SettingsError),
    Script(ScriptError),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Settings(err) => err.fmt(f),
            Self::Script(err) => err.fmt(f),
        }
    }
}

impl Error for SimulationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Settings(err) => Some(err),
            Self::Script(err) => Some(err),
        }
    }
}

impl From<SettingsError> for SimulationError {
    fn from(err: SettingsError) -> Self {
        Self::Settings(err)
    }
}

impl From<ScriptError> for SimulationError {
    fn from(err: ScriptError) -> Self {
        Self::Script(err)
    }
}

#[derive(Debug, Clone)]
pub struct Simulation {
    settings: SimSettings,
}

impl Simulation {
    pub fn new(settings: SimSettings) -> Result<Self, SimulationError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &SimSettings {
        &self.settings
    }

    pub fn run(
        &self,
        clock: Box<dyn Clock>,
        render: Option<Box<dyn RenderHook>>,
    ) -> Result<SurveyOutcome, SimulationError> {
        let source = ScriptSource::from_file(&self.settings.script_path)?;
        self.run_source(&source, clock, render)
    }

    pub fn run_source(
        &self,
        source: &ScriptSource,
        clock: Box<dyn Clock>,
        render: Option<Box<dyn RenderHook>>,
    ) -> Result<SurveyOutcome, SimulationError> {
        let mut controller = FlightController::new(&self.settings, clock);
        if let Some(hook) = render {
            controller = controller.with_render_hook(hook);
        }
        controller.launch();
        info!(
            "running {} over a {}",
            source.name,
            self.settings.boundary.describe()
        );

        let controller = Rc::new(RefCell::new(controller));
        {
            let bridge = ScriptBridge::new(Rc::clone(&controller))?;
            bridge.execute(source)?;
        }

        let mut controller = controller.borrow_mut();
        self.fly_until_stopped(&mut controller);
        controller.end_flight();

        let flight = controller.flight().clone();
        let coverage = analyze_coverage(&self.settings, &flight);
        let report = SurveyReport {
            flight_time: flight.flight_time(),
            coverage_percent: coverage.coverage_percent(),
            overlap_percent: coverage.overlap_percent(),
            photo_count: flight.photos().len(),
            path_samples: flight.path().len(),
            final_position: flight.position(),
        };

        Ok(SurveyOutcome {
            report,
            flight,
            coverage,
        })
    }

    fn fly_until_stopped(&self, controller: &mut FlightController) {
        controller.reset_frame_clock();
        while controller.flight().running() {
            if controller.quit_requested() {
                info!("quit requested, ending flight");
                controller.end_flight();
                break;
            }
            if let Some(limit) = self.settings.max_flight_seconds {
                if controller.simulated_elapsed() >= limit {
                    warn!("flight still running after {limit} simulated seconds, ending it");
                    controller.end_flight();
                    break;
                }
            }
            controller.advance_frame();
        }
    }
}

pub fn analyze_coverage(settings: &SimSettings, flight: &FlightState) -> CoverageGrid {
    let mut grid = CoverageGrid::new(settings.frame(), settings.photo_size);
    grid.stamp_boundary(&settings.boundary);
    grid.stamp_photos(flight.photos());
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(flight_time: f64, coverage: f64, overlap: f64) -> SurveyReport {
        SurveyReport {
            flight_time,
            coverage_percent: coverage,
            overlap_percent: overlap,
            photo_count: 0,
            path_samples: 0,
            final_position: Vector2::ZERO,
        }
    }

    #[test]
    fn report_truncates_like_the_console() {
        let text = report(461.9, 87.99, 12.5).to_string();
        assert_eq!(
            text,
            "Total flight time: 7 Minutes, 41 Seconds\nCoverage: 87%\nOverlap: 12%"
        );
    }

    #[test]
    fn report_handles_flights_that_never_started() {
        let report = report(0.0, 0.0, 0.0);
        assert_eq!(report.flight_minutes_seconds(), (0, 0));
    }

    #[test]
    fn invalid_settings_are_rejected_up_front() {
        let settings = SimSettings {
            fps: 0,
            ..SimSettings::default()
        };
        assert!(matches!(
            Simulation::new(settings),
            Err(SimulationError::Settings(SettingsError::Invalid { field: "fps", .. }))
        ));
    }

    #[test]
    fn coverage_analysis_uses_boundary_and_photos() {
        let settings = SimSettings::default();
        let mut flight = FlightState::new(1.0);
        flight.launch(0.0);
        flight.adjust_flight_parameters(100.0, 0.0, 0.0);
        flight.step(1.0);
        flight.capture_photo();

        let grid = analyze_coverage(&settings, &flight);

        assert!(grid.area_cells() > 50_000);
        assert_eq!(grid.covered_cells(), 19 * 19);
        assert_eq!(grid.overlap_percent(), 0.0);
    }
}
