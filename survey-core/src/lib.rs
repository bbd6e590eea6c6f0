pub mod boundary;
pub mod clock;
pub mod controller;
pub mod coordinates;
pub mod coverage;
pub mod flight;
pub mod script;
pub mod settings;
pub mod simulation;

pub use boundary::BoundarySpec;
pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{FlightController, FlightHost, RenderHook};
pub use coordinates::{DisplayFrame, Vector2};
pub use coverage::CoverageGrid;
pub use flight::{FlightPhase, FlightState, HEADING_UNAVAILABLE, Photo};
pub use script::{HOST_FUNCTIONS, ScriptBridge, ScriptError, ScriptSource};
pub use settings::{SettingsError, SimSettings};
pub use simulation::{Simulation, SimulationError, SurveyOutcome, SurveyReport, analyze_coverage};
