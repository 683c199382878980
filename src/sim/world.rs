//! Reference scene world
//!
//! A minimal 2D scene graph plus collider set. Hosts with their own physics
//! and scene tree implement [`RayQuery`] and [`AncestorWalk`] directly; this
//! world backs the demo and the tests.

use glam::Vec2;
use serde::{Deserialize, Deserializer, Serialize};

use super::hierarchy::{AncestorWalk, ObjectHandle, ancestor_chain_contains};
use super::ray::{Ray, RayHit, RayQuery};
use crate::consts::DEFAULT_COLLISION_MASK;

/// Collision shape, centered on its object's world position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Collider {
    Circle { radius: f32 },
    Rect { half_extents: Vec2 },
}

impl Collider {
    /// Entry distance of `ray` into this shape placed at `center`.
    ///
    /// A ray starting inside the shape hits at distance 0.
    pub fn ray_entry(&self, center: Vec2, ray: &Ray) -> Option<f32> {
        match *self {
            Collider::Circle { radius } => ray_circle(center, radius, ray),
            Collider::Rect { half_extents } => ray_rect(center, half_extents, ray),
        }
    }
}

fn ray_circle(center: Vec2, radius: f32, ray: &Ray) -> Option<f32> {
    let to_origin = ray.origin - center;
    let c = to_origin.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }

    // Direction is unit length, so a == 1
    let b = to_origin.dot(ray.direction);
    if b > 0.0 {
        // Outside and pointing away
        return None;
    }
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t <= ray.max_distance).then_some(t.max(0.0))
}

fn ray_rect(center: Vec2, half_extents: Vec2, ray: &Ray) -> Option<f32> {
    let min = center - half_extents;
    let max = center + half_extents;

    let mut t_enter = 0.0_f32;
    let mut t_exit = ray.max_distance;

    // Slab test, one axis at a time
    for axis in 0..2 {
        let origin = ray.origin[axis];
        let dir = ray.direction[axis];
        if dir.abs() < f32::EPSILON {
            if origin < min[axis] || origin > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / dir;
        let mut t0 = (min[axis] - origin) * inv;
        let mut t1 = (max[axis] - origin) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_enter = t_enter.max(t0);
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    Some(t_enter)
}

/// A node in the scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: ObjectHandle,
    pub name: String,
    pub parent: Option<ObjectHandle>,
    /// World-space position
    pub position: Vec2,
    pub collider: Option<Collider>,
    /// Collision layers this object occupies
    pub layer: u32,
}

/// Scene graph with colliders (sorted by id for deterministic queries)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneWorld {
    #[serde(deserialize_with = "sorted_by_id")]
    objects: Vec<SceneObject>,
    next_id: u32,
}

/// Lookups binary-search by id, so loaded objects are re-sorted
fn sorted_by_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<SceneObject>, D::Error> {
    let mut objects = Vec::<SceneObject>::deserialize(deserializer)?;
    objects.sort_by_key(|o| o.id);
    Ok(objects)
}

impl SceneWorld {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new object handle
    fn next_handle(&mut self) -> ObjectHandle {
        // Never 0, and always past every stored id so `objects` stays sorted
        let after_last = self.objects.last().map_or(0, |o| o.id.0) + 1;
        self.next_id = self.next_id.max(after_last).max(1);
        let id = self.next_id;
        self.next_id += 1;
        ObjectHandle(id)
    }

    /// Add an object without a collider
    pub fn spawn(&mut self, name: &str, parent: Option<ObjectHandle>, position: Vec2) -> ObjectHandle {
        let id = self.next_handle();
        self.objects.push(SceneObject {
            id,
            name: name.to_string(),
            parent,
            position,
            collider: None,
            layer: DEFAULT_COLLISION_MASK,
        });
        id
    }

    /// Add an object with a collider on the default layer
    pub fn spawn_body(
        &mut self,
        name: &str,
        parent: Option<ObjectHandle>,
        position: Vec2,
        collider: Collider,
    ) -> ObjectHandle {
        let id = self.spawn(name, parent, position);
        if let Some(obj) = self.object_mut(id) {
            obj.collider = Some(collider);
        }
        id
    }

    /// Remove an object. Children keep a dangling parent link, which ends
    /// their ancestor chain at the removed handle.
    pub fn despawn(&mut self, id: ObjectHandle) -> bool {
        let before = self.objects.len();
        self.objects.retain(|o| o.id != id);
        self.objects.len() != before
    }

    pub fn object(&self, id: ObjectHandle) -> Option<&SceneObject> {
        self.objects
            .binary_search_by_key(&id, |o| o.id)
            .ok()
            .map(|i| &self.objects[i])
    }

    pub fn object_mut(&mut self, id: ObjectHandle) -> Option<&mut SceneObject> {
        self.objects
            .binary_search_by_key(&id, |o| o.id)
            .ok()
            .map(|i| &mut self.objects[i])
    }

    /// First object with the given name
    pub fn find_by_name(&self, name: &str) -> Option<ObjectHandle> {
        self.objects.iter().find(|o| o.name == name).map(|o| o.id)
    }

    pub fn set_position(&mut self, id: ObjectHandle, position: Vec2) -> bool {
        match self.object_mut(id) {
            Some(obj) => {
                obj.position = position;
                true
            }
            None => false,
        }
    }

    /// Move an object by `delta`, carrying its whole subtree along
    pub fn translate_subtree(&mut self, root: ObjectHandle, delta: Vec2) {
        let members: Vec<ObjectHandle> = self
            .objects
            .iter()
            .filter(|o| {
                ancestor_chain_contains(&*self, o.id, Some(root)).unwrap_or(false)
            })
            .map(|o| o.id)
            .collect();
        for id in members {
            if let Some(obj) = self.object_mut(id) {
                obj.position += delta;
            }
        }
    }

    /// Re-link `id` under `parent`. No cycle check: the hierarchy may be left
    /// malformed, which ancestor walks detect and report.
    pub fn set_parent(&mut self, id: ObjectHandle, parent: Option<ObjectHandle>) -> bool {
        match self.object_mut(id) {
            Some(obj) => {
                obj.parent = parent;
                true
            }
            None => false,
        }
    }

    pub fn set_layer(&mut self, id: ObjectHandle, layer: u32) -> bool {
        match self.object_mut(id) {
            Some(obj) => {
                obj.layer = layer;
                true
            }
            None => false,
        }
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }
}

impl AncestorWalk for SceneWorld {
    fn parent_of(&self, object: ObjectHandle) -> Option<ObjectHandle> {
        self.object(object).and_then(|o| o.parent)
    }
}

impl RayQuery for SceneWorld {
    fn cast_ray(&self, ray: &Ray) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;

        // Objects are sorted by id, so strict `<` keeps the lowest id on ties
        for obj in &self.objects {
            if obj.layer & ray.mask == 0 {
                continue;
            }
            let Some(collider) = obj.collider else {
                continue;
            };
            let Some(t) = collider.ray_entry(obj.position, ray) else {
                continue;
            };
            if best.is_none_or(|b| t < b.distance) {
                best = Some(RayHit {
                    point: ray.at(t),
                    object: obj.id,
                    distance: t,
                });
            }
        }

        best
    }
}
