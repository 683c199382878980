//! Laser Tripwire demo entry point
//!
//! Builds a small scene, then runs the detector at a fixed timestep while an
//! intruder patrols across the beam and a drone occasionally blocks it.
//!
//! Usage: `laser-tripwire [settings.json]`

use std::path::Path;
use std::process::ExitCode;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use laser_tripwire::DetectorSettings;
use laser_tripwire::consts::*;
use laser_tripwire::renderer::{MeshPresenter, Presenter};
use laser_tripwire::sim::{
    AlarmEvent, Collider, Detector, EventLog, LogSink, ObjectHandle, RepeatingTimer, SceneWorld,
};

/// Simulated run length (seconds)
const RUN_SECONDS: f32 = 12.0;
/// Patrol speed of the intruder (units/s)
const INTRUDER_SPEED: f32 = 90.0;

/// Scene objects the demo moves around
struct Actors {
    intruder: ObjectHandle,
    drone: ObjectHandle,
}

fn build_scene() -> (SceneWorld, Actors) {
    let mut world = SceneWorld::new();

    // Static pillar just off the beam
    world.spawn_body(
        "pillar",
        None,
        Vec2::new(150.0, 60.0),
        Collider::Rect {
            half_extents: Vec2::new(15.0, 15.0),
        },
    );

    // Intruder: root -> body -> torso -> hitbox, only the leaf collides
    let start = Vec2::new(320.0, 160.0);
    let intruder = world.spawn("player", None, start);
    let body = world.spawn("body", Some(intruder), start);
    let torso = world.spawn("torso", Some(body), start);
    world.spawn_body("hitbox", Some(torso), start, Collider::Circle { radius: 12.0 });

    // Bystander drone parked away from the beam
    let drone = world.spawn_body(
        "drone",
        None,
        Vec2::new(200.0, -400.0),
        Collider::Circle { radius: 8.0 },
    );

    (world, Actors { intruder, drone })
}

/// Move the actors for one simulation step
fn drive_actors(world: &mut SceneWorld, actors: &Actors, t: f32, heading: &mut f32, dt: f32) {
    let y = world
        .object(actors.intruder)
        .map(|o| o.position.y)
        .unwrap_or(0.0);
    if y > 160.0 {
        *heading = -1.0;
    } else if y < -160.0 {
        *heading = 1.0;
    }
    world.translate_subtree(actors.intruder, Vec2::new(0.0, *heading * INTRUDER_SPEED * dt));

    // Drone hovers in front of the intruder between 7s and 8.5s
    let drone_pos = if (7.0..8.5).contains(&t) {
        Vec2::new(200.0, 0.0)
    } else {
        Vec2::new(200.0, -400.0)
    };
    world.set_position(actors.drone, drone_pos);
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    env_logger::init();
    log::info!("Laser Tripwire (native) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => match DetectorSettings::load(Path::new(&path)) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => DetectorSettings {
            target: Some("player".to_string()),
            ..Default::default()
        },
    };

    let (mut world, actors) = build_scene();

    let config = match settings.resolve(&world) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let events = EventLog::new();
    let mut detector = match Detector::builder(config)
        .timer(Box::new(RepeatingTimer::new()))
        .sink(Box::new(LogSink))
        .sink(Box::new(events.clone()))
        .build()
    {
        Ok(detector) => detector,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let mut presenter = MeshPresenter::new(settings.beam_style());

    // Variable frame times, fixed simulation step
    let mut rng = Pcg32::seed_from_u64(0x7219_3e55);
    let mut accumulator = 0.0_f32;
    let mut sim_time = 0.0_f32;
    let mut heading = -1.0_f32;
    let mut steps = 0_u64;
    let mut alarmed_steps = 0_u64;

    while sim_time < RUN_SECONDS {
        let frame_dt: f32 = rng.random_range(0.008..0.034);
        accumulator += frame_dt.min(0.1);

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            drive_actors(&mut world, &actors, sim_time, &mut heading, SIM_DT);
            let params = detector.tick(&world, SIM_DT);
            presenter.present(&params);

            if detector.is_alarm_active() {
                alarmed_steps += 1;
            }
            accumulator -= SIM_DT;
            sim_time += SIM_DT;
            steps += 1;
            substeps += 1;
        }
    }

    log::info!(
        "Ran {} steps ({:.1}s): {} triggers, {} resets, {} active ticks, alarmed {:.1}s",
        steps,
        sim_time,
        events.count(AlarmEvent::Triggered),
        events.count(AlarmEvent::Reset),
        events.count(AlarmEvent::ActiveTick),
        alarmed_steps as f32 * SIM_DT,
    );
    log::info!(
        "Last frame: {} vertices ({} bytes)",
        presenter.beam().len() + presenter.overlay().len(),
        presenter.vertex_bytes().len()
    );

    ExitCode::SUCCESS
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser front-end; the library is driven by the host engine
}
