//! Per-step detection update
//!
//! One call per physics step: poll the alarm timer, cast the beam, classify
//! the hit, run the alarm state machine, then produce render parameters.

use super::alarm::AlarmEvent;
use super::detector::Detector;
use super::hierarchy::{AncestorWalk, ObjectHandle, ancestor_chain_contains};
use super::ray::RayQuery;
use super::state::{AlarmPhase, RenderParams};

impl Detector {
    /// Advance the detector by one step of `dt` seconds against `scene`.
    ///
    /// Negative or non-finite `dt` counts as 0.
    pub fn tick<S>(&mut self, scene: &S, dt: f32) -> RenderParams
    where
        S: RayQuery + AncestorWalk + ?Sized,
    {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        // Time that passed under the previous phase
        if self.timer.is_armed() {
            for _ in 0..self.timer.advance(dt) {
                self.emit(AlarmEvent::ActiveTick);
            }
        }

        let ray = self.ray();
        let entered_active = match scene.cast_ray(&ray) {
            None => {
                self.state.endpoint = self.config.miss_endpoint();
                self.classify(false)
            }
            Some(hit) => {
                self.state.endpoint = self
                    .pose
                    .to_local(hit.point)
                    .clamp_length_max(self.config.length);
                let is_target = self.is_target(scene, hit.object);
                log::debug!(
                    "Beam hit {:?} at {:.1} (target: {})",
                    hit.object,
                    hit.distance,
                    is_target
                );
                self.classify(is_target)
            }
        };

        if self.state.is_alarm_active() && !entered_active {
            self.state.elapsed_since_alarm_start += dt;
        }

        self.render_params()
    }

    /// Hierarchy check for a struck object. A malformed hierarchy counts as
    /// "not the target" and is logged once until the next clean walk.
    fn is_target<W: AncestorWalk + ?Sized>(&mut self, scene: &W, object: ObjectHandle) -> bool {
        match ancestor_chain_contains(scene, object, self.config.target) {
            Ok(found) => {
                self.hierarchy_fault = false;
                found
            }
            Err(err) => {
                if !self.hierarchy_fault {
                    log::error!("{err}");
                    self.hierarchy_fault = true;
                }
                false
            }
        }
    }

    /// Apply the latest classification. Returns true on Inactive -> Active.
    fn classify(&mut self, is_target: bool) -> bool {
        match (self.state.phase, is_target) {
            (AlarmPhase::Inactive, true) => {
                self.raise_alarm();
                true
            }
            (AlarmPhase::Active, false) => {
                self.clear_alarm();
                false
            }
            _ => false,
        }
    }

    fn raise_alarm(&mut self) {
        self.state.phase = AlarmPhase::Active;
        self.state.elapsed_since_alarm_start = 0.0;
        self.timer.arm(self.config.tick_interval);
        self.emit(AlarmEvent::Triggered);
    }

    fn clear_alarm(&mut self) {
        self.state.phase = AlarmPhase::Inactive;
        self.state.elapsed_since_alarm_start = 0.0;
        self.timer.disarm();
        self.emit(AlarmEvent::Reset);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use proptest::prelude::*;

    use crate::consts::*;
    use crate::sim::*;

    /// Scripted scene: each tick returns the next queued ray result
    struct ScriptedScene {
        hit: Option<RayHit>,
        parents: Vec<(ObjectHandle, ObjectHandle)>,
    }

    impl ScriptedScene {
        fn new() -> Self {
            Self {
                hit: None,
                parents: Vec::new(),
            }
        }

        fn with_parent(mut self, child: u32, parent: u32) -> Self {
            self.parents.push((ObjectHandle(child), ObjectHandle(parent)));
            self
        }

        fn hit(&mut self, object: u32, point: Vec2) {
            self.hit = Some(RayHit {
                point,
                object: ObjectHandle(object),
                distance: point.length(),
            });
        }

        fn miss(&mut self) {
            self.hit = None;
        }
    }

    impl RayQuery for ScriptedScene {
        fn cast_ray(&self, _ray: &Ray) -> Option<RayHit> {
            self.hit
        }
    }

    impl AncestorWalk for ScriptedScene {
        fn parent_of(&self, object: ObjectHandle) -> Option<ObjectHandle> {
            self.parents
                .iter()
                .find(|(child, _)| *child == object)
                .map(|(_, parent)| *parent)
        }
    }

    const TARGET: u32 = 1;
    const BYSTANDER: u32 = 50;

    fn detector(target: Option<u32>) -> (Detector, EventLog) {
        let log = EventLog::new();
        let config = DetectorConfig {
            target: target.map(ObjectHandle),
            ..Default::default()
        };
        let detector = Detector::builder(config)
            .timer(Box::new(RepeatingTimer::new()))
            .sink(Box::new(log.clone()))
            .build()
            .expect("valid config");
        (detector, log)
    }

    #[test]
    fn test_scenario_no_target_never_alarms() {
        let (mut det, log) = detector(None);
        let mut scene = ScriptedScene::new();
        scene.hit(BYSTANDER, Vec2::new(120.0, 0.0));

        for _ in 0..100 {
            let params = det.tick(&scene, SIM_DT);
            assert!(!det.is_alarm_active());
            assert_eq!(params.overlay_color.a, 0.0);
        }
        assert!(log.is_empty());
        assert!(!det.timer_armed());
    }

    #[test]
    fn test_scenario_trigger_then_pulse() {
        let (mut det, log) = detector(Some(TARGET));
        let mut scene = ScriptedScene::new();

        // Tick 1: miss
        scene.miss();
        let params = det.tick(&scene, 0.1);
        assert_eq!(params.beam_endpoint, Vec2::new(500.0, 0.0));
        assert!(!det.is_alarm_active());
        assert_eq!(params.beam_color, Color::GREEN);

        // Tick 2: direct hit on target
        scene.hit(TARGET, Vec2::new(200.0, 0.0));
        let params = det.tick(&scene, 0.1);
        assert!(det.is_alarm_active());
        assert!(det.timer_armed());
        assert_eq!(params.beam_endpoint, Vec2::new(200.0, 0.0));
        assert_eq!(params.beam_color, Color::RED);
        assert_eq!(det.state().elapsed_since_alarm_start, 0.0);
        assert_eq!(log.events(), vec![AlarmEvent::Triggered]);

        // Tick 3: same hit, elapsed accumulates
        let params = det.tick(&scene, 0.1);
        assert!((det.state().elapsed_since_alarm_start - 0.1).abs() < 1e-6);
        let expected = (0.5 * ((1.0_f32).sin() + 1.0) * 0.3).clamp(0.0, 1.0);
        assert!((params.overlay_color.a - expected).abs() < 1e-4);
        assert!((params.overlay_color.a - 0.277).abs() < 1e-3);
        // Still one trigger: re-entry does not fire again
        assert_eq!(log.count(AlarmEvent::Triggered), 1);
    }

    #[test]
    fn test_scenario_descendant_triggers() {
        let (mut det, log) = detector(Some(TARGET));
        // 4 -> 3 -> 2 -> 1 (target)
        let mut scene = ScriptedScene::new()
            .with_parent(4, 3)
            .with_parent(3, 2)
            .with_parent(2, TARGET);
        scene.hit(4, Vec2::new(80.0, 0.0));

        det.tick(&scene, SIM_DT);
        assert!(det.is_alarm_active());
        assert_eq!(log.events(), vec![AlarmEvent::Triggered]);
    }

    #[test]
    fn test_scenario_bystander_clears_immediately() {
        let (mut det, log) = detector(Some(TARGET));
        let mut scene = ScriptedScene::new();
        scene.hit(TARGET, Vec2::new(300.0, 0.0));
        for _ in 0..10 {
            det.tick(&scene, SIM_DT);
        }
        assert!(det.is_alarm_active());

        // Something else steps into the beam in front of the target
        scene.hit(BYSTANDER, Vec2::new(100.0, 0.0));
        let params = det.tick(&scene, SIM_DT);
        assert!(!det.is_alarm_active());
        assert!(!det.timer_armed());
        assert_eq!(params.overlay_color.a, 0.0);
        assert_eq!(params.beam_color, Color::GREEN);
        assert_eq!(params.beam_endpoint, Vec2::new(100.0, 0.0));
        assert_eq!(det.state().elapsed_since_alarm_start, 0.0);
        assert_eq!(log.events(), vec![AlarmEvent::Triggered, AlarmEvent::Reset]);
    }

    #[test]
    fn test_miss_clears_alarm() {
        let (mut det, log) = detector(Some(TARGET));
        let mut scene = ScriptedScene::new();
        scene.hit(TARGET, Vec2::new(300.0, 0.0));
        det.tick(&scene, SIM_DT);
        scene.miss();
        let params = det.tick(&scene, SIM_DT);
        assert!(!det.is_alarm_active());
        assert_eq!(params.beam_endpoint, Vec2::new(500.0, 0.0));
        assert_eq!(log.events(), vec![AlarmEvent::Triggered, AlarmEvent::Reset]);
    }

    #[test]
    fn test_active_ticks_follow_interval() {
        let (mut det, log) = detector(Some(TARGET));
        let mut scene = ScriptedScene::new();
        scene.hit(TARGET, Vec2::new(300.0, 0.0));

        det.tick(&scene, 0.1);
        // 1.2s of alarm at a 0.5s interval
        for _ in 0..12 {
            det.tick(&scene, 0.1);
        }
        assert_eq!(log.count(AlarmEvent::ActiveTick), 2);

        // Once reset, the ticker goes silent
        scene.miss();
        det.tick(&scene, 0.1);
        let before = log.count(AlarmEvent::ActiveTick);
        for _ in 0..20 {
            det.tick(&scene, 0.1);
        }
        assert_eq!(log.count(AlarmEvent::ActiveTick), before);
    }

    #[test]
    fn test_retrigger_restarts_pulse() {
        let (mut det, _log) = detector(Some(TARGET));
        let mut scene = ScriptedScene::new();
        scene.hit(TARGET, Vec2::new(300.0, 0.0));
        for _ in 0..30 {
            det.tick(&scene, SIM_DT);
        }
        assert!(det.state().elapsed_since_alarm_start > 0.4);

        scene.miss();
        det.tick(&scene, SIM_DT);
        scene.hit(TARGET, Vec2::new(300.0, 0.0));
        let params = det.tick(&scene, SIM_DT);
        assert_eq!(det.state().elapsed_since_alarm_start, 0.0);
        assert!((params.overlay_color.a - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_endpoint_is_local_and_clamped() {
        let (mut det, _log) = detector(Some(TARGET));
        det.set_pose(DetectorPose::new(Vec2::new(100.0, 50.0), std::f32::consts::FRAC_PI_2));
        let mut scene = ScriptedScene::new();

        // World point 80 units "above" the detector = 80 units forward
        scene.hit(BYSTANDER, Vec2::new(100.0, 130.0));
        let params = det.tick(&scene, SIM_DT);
        assert!((params.beam_endpoint - Vec2::new(80.0, 0.0)).length() < 1e-3);

        // A collaborator reporting a hit beyond the beam is clamped
        scene.hit(BYSTANDER, Vec2::new(100.0, 50.0 + 900.0));
        let params = det.tick(&scene, SIM_DT);
        assert!(params.beam_endpoint.length() <= DEFAULT_LASER_LENGTH + 1e-3);
    }

    #[test]
    fn test_bad_dt_is_ignored() {
        let (mut det, _log) = detector(Some(TARGET));
        let mut scene = ScriptedScene::new();
        scene.hit(TARGET, Vec2::new(300.0, 0.0));
        det.tick(&scene, SIM_DT);
        det.tick(&scene, -1.0);
        det.tick(&scene, f32::NAN);
        assert_eq!(det.state().elapsed_since_alarm_start, 0.0);
    }

    #[test]
    fn test_cyclic_hierarchy_is_not_target() {
        let (mut det, log) = detector(Some(TARGET));
        assert!(!det.hierarchy_faulted());
        let mut scene = ScriptedScene::new().with_parent(7, 8).with_parent(8, 7);
        scene.hit(7, Vec2::new(50.0, 0.0));
        for _ in 0..3 {
            det.tick(&scene, SIM_DT);
            assert!(det.hierarchy_fault);
        }
        assert!(!det.is_alarm_active());
        assert!(log.is_empty());

        // A clean walk clears the fault so the next one is reported again
        scene.hit(TARGET, Vec2::new(50.0, 0.0));
        det.tick(&scene, SIM_DT);
        assert!(!det.hierarchy_faulted());
        assert!(det.is_alarm_active());

        scene.hit(7, Vec2::new(50.0, 0.0));
        det.tick(&scene, SIM_DT);
        assert!(det.hierarchy_faulted());
        assert!(!det.is_alarm_active());
    }

    #[test]
    fn test_miss_keeps_hierarchy_fault() {
        let (mut det, _log) = detector(Some(TARGET));
        let mut scene = ScriptedScene::new().with_parent(7, 7);
        scene.hit(7, Vec2::new(50.0, 0.0));
        det.tick(&scene, SIM_DT);
        assert!(det.hierarchy_faulted());

        // No walk on a miss, nothing to clear the fault
        scene.miss();
        det.tick(&scene, SIM_DT);
        assert!(det.hierarchy_faulted());
    }

    #[test]
    fn test_huge_dt_while_alarmed_returns() {
        let (mut det, log) = detector(Some(TARGET));
        let mut scene = ScriptedScene::new();
        scene.hit(TARGET, Vec2::new(300.0, 0.0));
        det.tick(&scene, SIM_DT);

        det.tick(&scene, 1.0e9);
        assert!(det.is_alarm_active());
        assert_eq!(log.count(AlarmEvent::ActiveTick), MAX_TIMER_CATCHUP as usize);
    }

    #[test]
    fn test_zero_length_hit_on_target() {
        let (mut det, _log) = detector(Some(TARGET));
        let mut scene = ScriptedScene::new();
        scene.hit(TARGET, Vec2::ZERO);
        let params = det.tick(&scene, SIM_DT);
        assert!(det.is_alarm_active());
        assert_eq!(params.beam_endpoint, Vec2::ZERO);
    }

    #[test]
    fn test_against_scene_world() {
        let mut world = SceneWorld::new();
        let player = world.spawn("player", None, Vec2::new(250.0, 200.0));
        let body = world.spawn("body", Some(player), Vec2::new(250.0, 200.0));
        world.spawn_body(
            "hitbox",
            Some(body),
            Vec2::new(250.0, 200.0),
            Collider::Circle { radius: 12.0 },
        );

        let log = EventLog::new();
        let mut det = Detector::builder(DetectorConfig::guarding(player))
            .timer(Box::new(RepeatingTimer::new()))
            .sink(Box::new(log.clone()))
            .build()
            .expect("valid");

        det.tick(&world, SIM_DT);
        assert!(!det.is_alarm_active());

        // Walk the player down through the beam
        world.translate_subtree(player, Vec2::new(0.0, -200.0));
        let params = det.tick(&world, SIM_DT);
        assert!(det.is_alarm_active());
        assert!((params.beam_endpoint - Vec2::new(238.0, 0.0)).length() < 1e-2);

        world.translate_subtree(player, Vec2::new(0.0, -200.0));
        det.tick(&world, SIM_DT);
        assert!(!det.is_alarm_active());
        assert_eq!(log.events(), vec![AlarmEvent::Triggered, AlarmEvent::Reset]);
    }

    #[derive(Debug, Clone, Copy)]
    enum Outcome {
        Miss,
        Target,
        Child,
        Other,
    }

    fn outcome() -> impl Strategy<Value = Outcome> {
        prop_oneof![
            Just(Outcome::Miss),
            Just(Outcome::Target),
            Just(Outcome::Child),
            Just(Outcome::Other),
        ]
    }

    proptest! {
        #[test]
        fn prop_alarm_tracks_latest_outcome(
            steps in prop::collection::vec((outcome(), 0.0f32..0.2, 0.0f32..600.0), 1..80)
        ) {
            let (mut det, log) = detector(Some(TARGET));
            let mut scene = ScriptedScene::new().with_parent(2, TARGET);
            let mut was_active = false;
            let mut last_elapsed = 0.0;

            for (outcome, dt, distance) in steps {
                let point = Vec2::new(distance.min(DEFAULT_LASER_LENGTH), 0.0);
                let hits_target = match outcome {
                    Outcome::Miss => { scene.miss(); false }
                    Outcome::Target => { scene.hit(TARGET, point); true }
                    Outcome::Child => { scene.hit(2, point); true }
                    Outcome::Other => { scene.hit(BYSTANDER, point); false }
                };

                let params = det.tick(&scene, dt);
                let state = det.state();

                // Hysteresis: only the latest outcome matters
                prop_assert_eq!(state.is_alarm_active(), hits_target);
                prop_assert_eq!(det.timer_armed(), hits_target);

                // Endpoint bound, exact length only on a miss
                let len = state.endpoint.length();
                prop_assert!(len <= DEFAULT_LASER_LENGTH + 1e-3);
                if matches!(outcome, Outcome::Miss) {
                    prop_assert!((len - DEFAULT_LASER_LENGTH).abs() < 1e-3);
                }

                // Reset on trigger, monotonic while active
                if hits_target && !was_active {
                    prop_assert_eq!(state.elapsed_since_alarm_start, 0.0);
                } else if hits_target {
                    prop_assert!(state.elapsed_since_alarm_start >= last_elapsed);
                }

                // Pulse bound
                if hits_target {
                    prop_assert!((0.0..=FLASH_PEAK_ALPHA + 1e-6).contains(&params.overlay_color.a));
                } else {
                    prop_assert_eq!(params.overlay_color.a, 0.0);
                }

                was_active = hits_target;
                last_elapsed = state.elapsed_since_alarm_start;
            }

            let triggers = log.count(AlarmEvent::Triggered);
            let resets = log.count(AlarmEvent::Reset);
            prop_assert!(triggers == resets || triggers == resets + 1);
        }
    }
}
