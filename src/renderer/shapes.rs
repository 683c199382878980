//! Shape generation for 2D primitives

use glam::Vec2;

use super::vertex::Vertex;
use crate::sim::Color;

/// Generate vertices for a thick line segment (two triangles)
///
/// A zero-length segment produces no geometry.
pub fn line_segment(from: Vec2, to: Vec2, width: f32, color: Color) -> Vec<Vertex> {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        return Vec::new();
    }
    // Perpendicular for width
    let perp = Vec2::new(-dir.y, dir.x) * (width * 0.5);

    let a = from + perp;
    let b = from - perp;
    let c = to + perp;
    let d = to - perp;

    vec![
        Vertex::colored(a.x, a.y, color),
        Vertex::colored(b.x, b.y, color),
        Vertex::colored(c.x, c.y, color),
        Vertex::colored(c.x, c.y, color),
        Vertex::colored(b.x, b.y, color),
        Vertex::colored(d.x, d.y, color),
    ]
}

/// Generate vertices for a filled axis-aligned rectangle
pub fn rect(center: Vec2, size: Vec2, color: Color) -> Vec<Vertex> {
    let half = size * 0.5;
    let min = center - half;
    let max = center + half;

    vec![
        Vertex::colored(min.x, min.y, color),
        Vertex::colored(max.x, min.y, color),
        Vertex::colored(min.x, max.y, color),
        Vertex::colored(min.x, max.y, color),
        Vertex::colored(max.x, min.y, color),
        Vertex::colored(max.x, max.y, color),
    ]
}
