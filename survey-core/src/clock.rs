use std::cell::Cell;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

pub trait Clock {
    fn now(&self) -> f64;

    fn sleep(&self, seconds: f64);
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    fn sleep(&self, seconds: f64) {
        if seconds.is_finite() && seconds > 0.0 {
            thread::sleep(Duration::from_secs_f64(seconds));
        }
    }
}

#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, seconds: f64) {
        if seconds.is_finite() && seconds > 0.0 {
            self.now.set(self.now.get() + seconds);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }

    fn sleep(&self, seconds: f64) {
        self.advance(seconds);
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> f64 {
        (**self).now()
    }

    fn sleep(&self, seconds: f64) {
        (**self).sleep(seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_only_on_sleep() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), 0.0);

        clock.sleep(0.25);
        clock.sleep(0.5);
        assert_eq!(clock.now(), 0.75);

        clock.sleep(-1.0);
        clock.sleep(f64::NAN);
        assert_eq!(clock.now(), 0.75);
    }

    #[test]
    fn shared_manual_clock_is_observable() {
        let clock = Rc::new(ManualClock::new());
        let boxed: Box<dyn Clock> = Box::new(Rc::clone(&clock));

        boxed.sleep(2.0);
        assert_eq!(clock.now(), 2.0);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.now();
        clock.sleep(0.005);
        let second = clock.now();

        assert!(second > first);
        assert!(second - first >= 0.005);
    }
}
