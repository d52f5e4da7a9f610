//! Shape generation for 2D primitives
//!
//! Everything is emitted as a plain triangle list in screen pixels.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;

fn push_tri(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) {
    out.push(Vertex::new(a.x, a.y, color));
    out.push(Vertex::new(b.x, b.y, color));
    out.push(Vertex::new(c.x, c.y, color));
}

fn push_quad(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, d: Vec2, color: [f32; 4]) {
    push_tri(out, a, b, c, color);
    push_tri(out, a, c, d, color);
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        push_tri(
            &mut vertices,
            center,
            center + Vec2::new(theta1.cos(), theta1.sin()) * radius,
            center + Vec2::new(theta2.cos(), theta2.sin()) * radius,
            color,
        );
    }

    vertices
}

/// Fan-triangulate a star-shaped polygon around `center`.
/// `points` are offsets from the center, scaled by `scale`.
pub fn polygon(center: Vec2, points: &[Vec2], scale: f32, color: [f32; 4]) -> Vec<Vertex> {
    if points.len() < 3 {
        return Vec::new();
    }
    let mut vertices = Vec::with_capacity(points.len() * 3);
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        push_tri(&mut vertices, center, center + a * scale, center + b * scale, color);
    }
    vertices
}

/// Axis-aligned rectangle from its top-left corner
pub fn rect(min: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(6);
    push_quad(
        &mut vertices,
        min,
        min + Vec2::new(size.x, 0.0),
        min + size,
        min + Vec2::new(0.0, size.y),
        color,
    );
    vertices
}

/// Rectangle centered on `center`, rotated by `angle`. `offset` shifts the
/// rectangle along its own axes before rotation (e.g. a barrel sticking out
/// of a turret).
pub fn rotated_rect(
    center: Vec2,
    half_size: Vec2,
    offset: Vec2,
    angle: f32,
    color: [f32; 4],
) -> Vec<Vertex> {
    let rot = Vec2::from_angle(angle);
    let corner = |x: f32, y: f32| center + rot.rotate(offset + Vec2::new(x, y));
    let mut vertices = Vec::with_capacity(6);
    push_quad(
        &mut vertices,
        corner(-half_size.x, -half_size.y),
        corner(half_size.x, -half_size.y),
        corner(half_size.x, half_size.y),
        corner(-half_size.x, half_size.y),
        color,
    );
    vertices
}

/// Thick line segment
pub fn line(from: Vec2, to: Vec2, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        return Vec::new();
    }
    let perp = dir.perp() * (width / 2.0);
    let mut vertices = Vec::with_capacity(6);
    push_quad(
        &mut vertices,
        from + perp,
        to + perp,
        to - perp,
        from - perp,
        color,
    );
    vertices
}

/// Isosceles arrowhead pointing along `angle` with its tip at `tip`
pub fn arrow(tip: Vec2, angle: f32, length: f32, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let dir = Vec2::from_angle(angle);
    let base = tip - dir * length;
    let side = dir.perp() * (width / 2.0);
    let mut vertices = Vec::with_capacity(3);
    push_tri(&mut vertices, tip, base + side, base - side, color);
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [f32; 4] = [1.0; 4];

    #[test]
    fn test_circle_vertex_count() {
        assert_eq!(circle(Vec2::ZERO, 10.0, WHITE, 16).len(), 48);
        // Degenerate segment counts are raised to a triangle
        assert_eq!(circle(Vec2::ZERO, 10.0, WHITE, 1).len(), 9);
    }

    #[test]
    fn test_polygon_needs_three_points() {
        assert!(polygon(Vec2::ZERO, &[Vec2::X, Vec2::Y], 1.0, WHITE).is_empty());
        let square = [Vec2::X, Vec2::Y, -Vec2::X, -Vec2::Y];
        let verts = polygon(Vec2::new(1.0, 1.0), &square, 2.0, WHITE);
        assert_eq!(verts.len(), 12);
        assert_eq!(verts[1].position, [3.0, 1.0]);
    }

    #[test]
    fn test_rotated_rect_quarter_turn() {
        let verts = rotated_rect(
            Vec2::ZERO,
            Vec2::new(10.0, 2.0),
            Vec2::ZERO,
            std::f32::consts::FRAC_PI_2,
            WHITE,
        );
        let max_y = verts.iter().map(|v| v.position[1]).fold(f32::MIN, f32::max);
        let max_x = verts.iter().map(|v| v.position[0]).fold(f32::MIN, f32::max);
        assert!((max_y - 10.0).abs() < 1e-4);
        assert!((max_x - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_length_line_is_empty() {
        assert!(line(Vec2::ONE, Vec2::ONE, 2.0, WHITE).is_empty());
        assert_eq!(line(Vec2::ZERO, Vec2::X * 5.0, 2.0, WHITE).len(), 6);
    }
}
