//! Geometry of node boxes and edge arrows, in canvas coordinates.

use egui::{Pos2, Rect, Vec2};

/// Size of a node box at zoom 1.
pub const NODE_SIZE: Vec2 = Vec2::new(150.0, 48.0);
pub const ARROW_SIZE: f32 = 10.0;
pub const ARROW_ANGLE: f32 = std::f32::consts::PI / 7.0;
/// Pointer distance (screen px) within which an edge counts as hit.
pub const EDGE_HIT_DISTANCE: f32 = 6.0;

pub fn node_rect(center: Pos2) -> Rect {
    Rect::from_center_size(center, NODE_SIZE)
}

pub fn is_inside(center: Pos2, pos: Pos2) -> bool {
    node_rect(center).contains(pos)
}

/// Point where the ray from `center` toward `toward` leaves the node box.
pub fn closest_boundary_point(center: Pos2, toward: Pos2) -> Pos2 {
    let dir = toward - center;
    if dir == Vec2::ZERO {
        return center;
    }
    let half = NODE_SIZE / 2.0;
    let tx = if dir.x == 0.0 { f32::INFINITY } else { half.x / dir.x.abs() };
    let ty = if dir.y == 0.0 { f32::INFINITY } else { half.y / dir.y.abs() };
    center + dir * tx.min(ty)
}

/// Visible segment of an edge between two node boxes.
pub fn edge_segment(source: Pos2, target: Pos2) -> (Pos2, Pos2) {
    (
        closest_boundary_point(source, target),
        closest_boundary_point(target, source),
    )
}

pub fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

pub fn rotate_vector(vec: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(cos * vec.x - sin * vec.y, sin * vec.x + cos * vec.y)
}

/// Triangle of the arrow head ending at `end`.
pub fn arrow_tip(start: Pos2, end: Pos2, size: f32) -> [Pos2; 3] {
    let dir = (end - start).normalized();
    let side_1 = rotate_vector(dir, ARROW_ANGLE) * size;
    let side_2 = rotate_vector(dir, -ARROW_ANGLE) * size;
    [end, end - side_1, end - side_2]
}
