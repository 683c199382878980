//! The laser detector and its construction
//!
//! A [`Detector`] owns its config, its detection state, the alarm timer and
//! the notification sinks. The scene (ray casts + hierarchy) is borrowed per
//! tick, see [`Detector::tick`](super::tick).

use super::alarm::{AlarmEvent, AlarmSink, AlarmTimer, LogSink, RepeatingTimer};
use super::flash::flash_alpha;
use super::ray::Ray;
use super::state::{DetectionState, DetectorConfig, DetectorPose, RenderParams};
use crate::error::DetectorError;

/// Line-of-sight intrusion detector with alarm hysteresis
pub struct Detector {
    pub(super) config: DetectorConfig,
    pub(super) pose: DetectorPose,
    pub(super) state: DetectionState,
    pub(super) timer: Box<dyn AlarmTimer>,
    pub(super) sinks: Vec<Box<dyn AlarmSink>>,
    /// Set after a malformed-hierarchy report, cleared by the next clean walk
    pub(super) hierarchy_fault: bool,
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("config", &self.config)
            .field("pose", &self.pose)
            .field("state", &self.state)
            .field("timer_armed", &self.timer.is_armed())
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl Detector {
    /// Detector with an in-crate [`RepeatingTimer`] and a [`LogSink`]
    pub fn new(config: DetectorConfig) -> Result<Self, DetectorError> {
        DetectorBuilder::new(config)
            .timer(Box::new(RepeatingTimer::new()))
            .sink(Box::new(LogSink))
            .build()
    }

    pub fn builder(config: DetectorConfig) -> DetectorBuilder {
        DetectorBuilder::new(config)
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn state(&self) -> &DetectionState {
        &self.state
    }

    pub fn pose(&self) -> DetectorPose {
        self.pose
    }

    /// Sync the detector's world transform from the host
    pub fn set_pose(&mut self, pose: DetectorPose) {
        self.pose = pose;
    }

    #[inline]
    pub fn is_alarm_active(&self) -> bool {
        self.state.is_alarm_active()
    }

    /// True after a malformed hierarchy was hit, until the next clean walk
    pub fn hierarchy_faulted(&self) -> bool {
        self.hierarchy_fault
    }

    pub fn timer_armed(&self) -> bool {
        self.timer.is_armed()
    }

    /// World-space ray for the current pose
    pub fn ray(&self) -> Ray {
        Ray::new(
            self.pose.position,
            self.pose.forward(),
            self.config.length,
            self.config.collision_mask,
        )
    }

    /// Render parameters for the current state (no side effects)
    pub fn render_params(&self) -> RenderParams {
        let active = self.state.is_alarm_active();
        let overlay_alpha = if active {
            flash_alpha(self.state.elapsed_since_alarm_start)
        } else {
            0.0
        };

        RenderParams {
            beam_endpoint: self.state.endpoint,
            beam_color: if active {
                self.config.color_alert
            } else {
                self.config.color_normal
            },
            overlay_color: self.config.color_alert.with_alpha(overlay_alpha),
        }
    }

    pub(super) fn emit(&mut self, event: AlarmEvent) {
        for sink in &mut self.sinks {
            sink.notify(event);
        }
    }
}

/// Fail-fast detector construction
pub struct DetectorBuilder {
    config: DetectorConfig,
    pose: DetectorPose,
    timer: Option<Box<dyn AlarmTimer>>,
    sinks: Vec<Box<dyn AlarmSink>>,
}

impl DetectorBuilder {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            pose: DetectorPose::default(),
            timer: None,
            sinks: Vec::new(),
        }
    }

    pub fn pose(mut self, pose: DetectorPose) -> Self {
        self.pose = pose;
        self
    }

    pub fn timer(mut self, timer: Box<dyn AlarmTimer>) -> Self {
        self.timer = Some(timer);
        self
    }

    /// Add a notification sink. Every sink sees every event.
    pub fn sink(mut self, sink: Box<dyn AlarmSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Validate the config and require a timer.
    ///
    /// With no sinks given, events go to a [`LogSink`].
    pub fn build(self) -> Result<Detector, DetectorError> {
        self.config.validate()?;
        let mut timer = self.timer.ok_or(DetectorError::MissingTimer)?;
        // Lockstep with the initial Inactive phase
        timer.disarm();

        let sinks = if self.sinks.is_empty() {
            vec![Box::new(LogSink) as Box<dyn AlarmSink>]
        } else {
            self.sinks
        };

        log::debug!(
            "Detector ready: length={} interval={} target={:?}",
            self.config.length,
            self.config.tick_interval,
            self.config.target
        );

        Ok(Detector {
            state: DetectionState::new(&self.config),
            config: self.config,
            pose: self.pose,
            timer,
            sinks,
            hierarchy_fault: false,
        })
    }
}
