//! Shape generation for 2D primitives
//!
//! Everything is tessellated into triangle lists in field coordinates.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;

fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], color[3] * alpha]
}

/// Thick stroke along `points`, fading from transparent (oldest) to
/// `color` (newest) and tapering the same way
pub fn stroke(points: &[Vec2], width: f32, color: [f32; 4]) -> Vec<Vertex> {
    if points.len() < 2 {
        return Vec::new();
    }

    let mut vertices = Vec::with_capacity(points.len() * 6);
    let last = (points.len() - 1) as f32;

    for i in 0..points.len() - 1 {
        let p1 = points[i];
        let p2 = points[i + 1];

        let t1 = i as f32 / last;
        let t2 = (i + 1) as f32 / last;

        let color1 = with_alpha(color, t1);
        let color2 = with_alpha(color, t2);
        let width1 = width * (0.3 + 0.7 * t1) / 2.0;
        let width2 = width * (0.3 + 0.7 * t2) / 2.0;

        let dir = (p2 - p1).normalize_or_zero();
        let perp = Vec2::new(-dir.y, dir.x);

        let v1a = p1 + perp * width1;
        let v1b = p1 - perp * width1;
        let v2a = p2 + perp * width2;
        let v2b = p2 - perp * width2;

        vertices.push(Vertex::new(v1a.x, v1a.y, color1));
        vertices.push(Vertex::new(v1b.x, v1b.y, color1));
        vertices.push(Vertex::new(v2a.x, v2a.y, color2));

        vertices.push(Vertex::new(v2a.x, v2a.y, color2));
        vertices.push(Vertex::new(v1b.x, v1b.y, color1));
        vertices.push(Vertex::new(v2b.x, v2b.y, color2));
    }

    vertices
}

/// One round of Chaikin corner cutting; endpoints are kept
pub fn smooth(points: &[Vec2]) -> Vec<Vec2> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity(points.len() * 2);
    out.push(points[0]);
    for pair in points.windows(2) {
        out.push(pair[0].lerp(pair[1], 0.25));
        out.push(pair[0].lerp(pair[1], 0.75));
    }
    out.push(points[points.len() - 1]);
    out
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for a ring (hollow circle)
pub fn ring(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;
        let (dir1, dir2) = (Vec2::from_angle(theta1), Vec2::from_angle(theta2));

        let inner1 = center + dir1 * inner_radius;
        let outer1 = center + dir1 * outer_radius;
        let inner2 = center + dir2 * inner_radius;
        let outer2 = center + dir2 * outer_radius;

        vertices.push(Vertex::new(inner1.x, inner1.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(inner2.x, inner2.y, color));

        vertices.push(Vertex::new(inner2.x, inner2.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(outer2.x, outer2.y, color));
    }

    vertices
}

/// Half of a disc, flat edge through the center. `start` is the angle where
/// the curved edge begins; it sweeps PI from there.
pub fn half_disc(center: Vec2, radius: f32, start: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = start + (i as f32 / segments as f32) * PI;
        let theta2 = start + ((i + 1) as f32 / segments as f32) * PI;
        let p1 = center + Vec2::from_angle(theta1) * radius;
        let p2 = center + Vec2::from_angle(theta2) * radius;

        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(p1.x, p1.y, color));
        vertices.push(Vertex::new(p2.x, p2.y, color));
    }

    vertices
}

/// Axis-aligned filled rectangle
pub fn rect(min: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let max = min + size;
    vec![
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

pub fn triangle(a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    vec![
        Vertex::new(a.x, a.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(c.x, c.y, color),
    ]
}

/// Segment count that keeps edges smooth at this radius
pub fn segments_for(radius: f32) -> u32 {
    ((radius * 0.8) as u32).clamp(8, 48)
}
