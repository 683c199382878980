//! Ownership hierarchy queries
//!
//! The scene graph is only seen through [`AncestorWalk`]: a parent lookup per
//! object. Hierarchies are expected to be acyclic, but every walk here is
//! bounded by [`MAX_ANCESTOR_DEPTH`] so a malformed graph is reported rather
//! than hanging the tick.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_ANCESTOR_DEPTH;
use crate::error::HierarchyError;

/// Opaque reference to a scene object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectHandle(pub u32);

/// Parent traversal over a scene graph snapshot
pub trait AncestorWalk {
    /// Structural parent of `object`, or `None` at a root
    fn parent_of(&self, object: ObjectHandle) -> Option<ObjectHandle>;

    /// Chain from `object` (inclusive) up to its root. Stops after
    /// [`MAX_ANCESTOR_DEPTH`] links, so a cycle yields a truncated chain.
    fn ancestors(&self, object: ObjectHandle) -> Ancestors<'_, Self>
    where
        Self: Sized,
    {
        Ancestors {
            walk: self,
            next: Some(object),
            remaining: MAX_ANCESTOR_DEPTH + 1,
        }
    }
}

/// Iterator over an ancestor chain, self first
pub struct Ancestors<'a, W: ?Sized> {
    walk: &'a W,
    next: Option<ObjectHandle>,
    remaining: usize,
}

impl<W: AncestorWalk + ?Sized> Iterator for Ancestors<'_, W> {
    type Item = ObjectHandle;

    fn next(&mut self) -> Option<ObjectHandle> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next?;
        self.remaining -= 1;
        self.next = self.walk.parent_of(current);
        Some(current)
    }
}

/// Is `target` either `object` itself or one of its ancestors?
///
/// Returns `Ok(false)` immediately when `target` is unset. Walks at most
/// [`MAX_ANCESTOR_DEPTH`] links.
pub fn ancestor_chain_contains<W: AncestorWalk + ?Sized>(
    walk: &W,
    object: ObjectHandle,
    target: Option<ObjectHandle>,
) -> Result<bool, HierarchyError> {
    ancestor_chain_contains_bounded(walk, object, target, MAX_ANCESTOR_DEPTH)
}

/// [`ancestor_chain_contains`] with an explicit link limit
pub fn ancestor_chain_contains_bounded<W: AncestorWalk + ?Sized>(
    walk: &W,
    object: ObjectHandle,
    target: Option<ObjectHandle>,
    limit: usize,
) -> Result<bool, HierarchyError> {
    let Some(target) = target else {
        return Ok(false);
    };

    let mut current = Some(object);
    let mut links = 0;
    while let Some(handle) = current {
        if handle == target {
            return Ok(true);
        }
        if links == limit {
            return Err(HierarchyError::DepthExceeded {
                start: object,
                limit,
            });
        }
        links += 1;
        current = walk.parent_of(handle);
    }

    Ok(false)
}
