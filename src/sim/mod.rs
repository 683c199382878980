//! Deterministic detection module
//!
//! All decision logic lives here. This module must stay pure:
//! - Explicit `dt` only, no ambient clock
//! - Scene access only through `RayQuery` / `AncestorWalk`
//! - Side effects only through `AlarmTimer` / `AlarmSink`
//! - No rendering or platform dependencies

pub mod alarm;
pub mod detector;
pub mod flash;
pub mod hierarchy;
pub mod ray;
pub mod state;
pub mod tick;
pub mod world;

pub use alarm::{AlarmEvent, AlarmSink, AlarmTimer, EventLog, LogSink, RepeatingTimer};
pub use detector::{Detector, DetectorBuilder};
pub use flash::flash_alpha;
pub use hierarchy::{
    AncestorWalk, Ancestors, ObjectHandle, ancestor_chain_contains, ancestor_chain_contains_bounded,
};
pub use ray::{Ray, RayHit, RayQuery};
pub use state::{AlarmPhase, Color, DetectionState, DetectorConfig, DetectorPose, RenderParams};
pub use world::{Collider, SceneObject, SceneWorld};
