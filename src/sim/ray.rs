//! Ray queries against the physics world

use glam::Vec2;

use super::hierarchy::ObjectHandle;

/// A single ray cast, in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec2,
    /// Unit direction
    pub direction: Vec2,
    pub max_distance: f32,
    /// Collision layers this ray can hit
    pub mask: u32,
}

impl Ray {
    pub fn new(origin: Vec2, direction: Vec2, max_distance: f32, mask: u32) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            max_distance,
            mask,
        }
    }

    /// Point at distance `t` along the ray
    #[inline]
    pub fn at(&self, t: f32) -> Vec2 {
        self.origin + self.direction * t
    }
}

/// Nearest intersection reported by a ray query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// World-space hit point
    pub point: Vec2,
    /// Object owning the collider that was struck
    pub object: ObjectHandle,
    /// Distance from the ray origin (0 for a ray starting inside a collider)
    pub distance: f32,
}

/// Synchronous ray-intersection provider (the physics engine)
pub trait RayQuery {
    /// Nearest hit within `ray.max_distance`, if any
    fn cast_ray(&self, ray: &Ray) -> Option<RayHit>;
}
