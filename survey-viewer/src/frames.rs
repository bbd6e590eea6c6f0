use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use survey_core::{
    FlightPhase, FlightState, Photo, RenderHook, SimSettings, Simulation, SurveyOutcome,
    SystemClock, Vector2,
};

#[derive(Debug, Clone, PartialEq)]
pub struct FrameUpdate {
    pub position: Vector2,
    pub yaw: f64,
    pub phase: FlightPhase,
    pub flight_time: f64,
    pub new_path: Vec<Vector2>,
    pub new_photos: Vec<Photo>,
}

#[derive(Debug)]
pub enum SurveyMessage {
    Frame(FrameUpdate),
    Finished(Box<SurveyOutcome>),
    Failed(String),
}

pub struct ChannelRenderHook {
    sender: Sender<SurveyMessage>,
    quit: Arc<AtomicBool>,
    sent_path: usize,
    sent_photos: usize,
}

impl ChannelRenderHook {
    pub fn new(sender: Sender<SurveyMessage>, quit: Arc<AtomicBool>) -> Self {
        Self {
            sender,
            quit,
            sent_path: 0,
            sent_photos: 0,
        }
    }
}

impl RenderHook for ChannelRenderHook {
    fn draw(&mut self, flight: &FlightState) {
        let path = flight.path();
        let photos = flight.photos();
        let update = FrameUpdate {
            position: flight.position(),
            yaw: flight.yaw(),
            phase: flight.phase(),
            flight_time: flight.flight_time(),
            new_path: path[self.sent_path.min(path.len())..].to_vec(),
            new_photos: photos[self.sent_photos.min(photos.len())..].to_vec(),
        };
        self.sent_path = path.len();
        self.sent_photos = photos.len();

        if self.sender.send(SurveyMessage::Frame(update)).is_err() {
            // viewer is gone; stop flying as soon as the script lets us
            self.quit.store(true, Ordering::Relaxed);
        }
    }

    fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::Relaxed)
    }
}

pub struct SurveyHandle {
    receiver: Receiver<SurveyMessage>,
    quit: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl SurveyHandle {
    pub fn spawn(settings: SimSettings) -> std::io::Result<Self> {
        let (sender, receiver) = mpsc::channel();
        let quit = Arc::new(AtomicBool::new(false));
        let hook = ChannelRenderHook::new(sender.clone(), Arc::clone(&quit));

        let worker = thread::Builder::new()
            .name("survey".to_string())
            .spawn(move || {
                let result = Simulation::new(settings).and_then(|simulation| {
                    simulation.run(Box::new(SystemClock::new()), Some(Box::new(hook)))
                });
                let message = match result {
                    Ok(outcome) => SurveyMessage::Finished(Box::new(outcome)),
                    Err(err) => {
                        log::error!("{}", err);
                        SurveyMessage::Failed(err.to_string())
                    }
                };
                let _ = sender.send(message);
            })?;

        Ok(Self {
            receiver,
            quit,
            worker: Some(worker),
        })
    }

    pub fn drain(&self) -> impl Iterator<Item = SurveyMessage> + '_ {
        self.receiver.try_iter()
    }

    /// A pause in progress still runs to its end.
    pub fn request_quit(&self) {
        self.quit.store(true, Ordering::Relaxed);
    }

    pub fn join(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("survey thread panicked");
            }
        }
    }
}
