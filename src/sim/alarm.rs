//! Alarm side effects: the repeating ticker and notification sinks
//!
//! Neither affects detection state. The detector arms/disarms the timer in
//! lockstep with its alarm phase and pushes one-shot events into its sinks.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_TIMER_CATCHUP;

/// Observable alarm notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmEvent {
    /// Inactive -> Active
    Triggered,
    /// Active -> Inactive
    Reset,
    /// Repeating notification while the alarm stays active
    ActiveTick,
}

impl AlarmEvent {
    pub fn tag(&self) -> &'static str {
        match self {
            AlarmEvent::Triggered => "triggered",
            AlarmEvent::Reset => "reset",
            AlarmEvent::ActiveTick => "active-tick",
        }
    }
}

/// Periodic timer facility
pub trait AlarmTimer {
    /// Start firing every `interval` seconds. Re-arming restarts the interval.
    fn arm(&mut self, interval: f32);
    /// Stop firing. No-op when already disarmed.
    fn disarm(&mut self);
    fn is_armed(&self) -> bool;
    /// Let `dt` seconds pass; returns how many intervals elapsed while armed,
    /// at most [`MAX_TIMER_CATCHUP`].
    fn advance(&mut self, dt: f32) -> u32;
}

/// Repeating (non one-shot) timer driven by simulation time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepeatingTimer {
    /// `Some(interval)` while armed
    interval: Option<f32>,
    /// Time accumulated toward the next fire
    elapsed: f32,
}

impl RepeatingTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time until the next fire, if armed
    pub fn time_left(&self) -> Option<f32> {
        self.interval.map(|i| (i - self.elapsed).max(0.0))
    }
}

impl AlarmTimer for RepeatingTimer {
    fn arm(&mut self, interval: f32) {
        self.interval = Some(interval);
        self.elapsed = 0.0;
    }

    fn disarm(&mut self) {
        self.interval = None;
        self.elapsed = 0.0;
    }

    fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    fn advance(&mut self, dt: f32) -> u32 {
        let Some(interval) = self.interval else {
            return 0;
        };
        if interval <= 0.0 || !dt.is_finite() || dt <= 0.0 {
            return 0;
        }

        self.elapsed += dt;
        if self.elapsed < interval {
            return 0;
        }

        // Whole intervals in one step; float-to-int `as` saturates
        let cycles = (self.elapsed / interval).floor();
        self.elapsed = self.elapsed.rem_euclid(interval);
        (cycles as u32).min(MAX_TIMER_CATCHUP)
    }
}

/// Fire-and-forget notification hook. Infallible: delivery problems stay
/// inside the sink.
pub trait AlarmSink {
    fn notify(&mut self, event: AlarmEvent);
}

/// Writes alarm events to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl AlarmSink for LogSink {
    fn notify(&mut self, event: AlarmEvent) {
        match event {
            AlarmEvent::Triggered => log::warn!("ALARM! Intruder detected!"),
            AlarmEvent::Reset => log::info!("Alarm reset - no threat detected"),
            AlarmEvent::ActiveTick => log::warn!("!! ALARM ACTIVE !!"),
        }
    }
}

/// Shared in-memory event recorder. Clones observe the same buffer, so a
/// host can keep one handle while the detector owns another.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<AlarmEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn events(&self) -> Vec<AlarmEvent> {
        self.events.borrow().clone()
    }

    /// Remove and return everything recorded so far
    pub fn drain(&self) -> Vec<AlarmEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn count(&self, event: AlarmEvent) -> usize {
        self.events.borrow().iter().filter(|e| **e == event).count()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl AlarmSink for EventLog {
    fn notify(&mut self, event: AlarmEvent) {
        self.events.borrow_mut().push(event);
    }
}
