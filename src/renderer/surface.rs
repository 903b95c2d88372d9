//! Drawable surface abstraction
//!
//! The presenter draws through `Surface`; `ShapeBatch` tessellates the calls
//! into a vertex list for the GPU pipeline and collects text for a separate
//! 2D text layer (emoji and labels are not tessellated).

use glam::Vec2;

use super::shapes;
use super::vertex::Vertex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// A piece of text to draw in field coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct TextCommand {
    pub text: String,
    pub pos: Vec2,
    /// Font size in field units
    pub size: f32,
    pub color: [f32; 4],
    pub align: TextAlign,
    /// Radians, about `pos`
    pub rotation: f32,
    pub bold: bool,
}

impl TextCommand {
    pub fn new(text: impl Into<String>, pos: Vec2, size: f32, color: [f32; 4]) -> Self {
        Self {
            text: text.into(),
            pos,
            size,
            color,
            align: TextAlign::Center,
            rotation: 0.0,
            bold: false,
        }
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn rotated(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// Something the presenter can draw on
pub trait Surface {
    fn clear(&mut self, color: [f32; 4]);
    /// Translation applied to everything drawn afterwards (screen shake)
    fn set_offset(&mut self, offset: Vec2);
    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: [f32; 4]);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]);
    fn ring(&mut self, center: Vec2, radius: f32, thickness: f32, color: [f32; 4]);
    /// Half disc whose curved edge starts at angle `start`
    fn half_disc(&mut self, center: Vec2, radius: f32, start: f32, color: [f32; 4]);
    fn triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]);
    /// Tapered stroke, oldest point first
    fn stroke_path(&mut self, points: &[Vec2], width: f32, color: [f32; 4]);
    fn text(&mut self, text: TextCommand);
}

/// Tessellating surface
#[derive(Debug, Clone, Default)]
pub struct ShapeBatch {
    pub clear_color: [f32; 4],
    pub vertices: Vec<Vertex>,
    pub texts: Vec<TextCommand>,
    offset: Vec2,
}

impl ShapeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, vertices: Vec<Vertex>) {
        let offset = self.offset;
        self.vertices.extend(vertices.into_iter().map(|mut v| {
            v.position[0] += offset.x;
            v.position[1] += offset.y;
            v
        }));
    }
}

impl Surface for ShapeBatch {
    fn clear(&mut self, color: [f32; 4]) {
        self.clear_color = color;
        self.vertices.clear();
        self.texts.clear();
        self.offset = Vec2::ZERO;
    }

    fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: [f32; 4]) {
        self.push(shapes::rect(min, size, color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        self.push(shapes::circle(center, radius, color, shapes::segments_for(radius)));
    }

    fn ring(&mut self, center: Vec2, radius: f32, thickness: f32, color: [f32; 4]) {
        self.push(shapes::ring(
            center,
            radius - thickness / 2.0,
            radius + thickness / 2.0,
            color,
            shapes::segments_for(radius),
        ));
    }

    fn half_disc(&mut self, center: Vec2, radius: f32, start: f32, color: [f32; 4]) {
        let segments = shapes::segments_for(radius) / 2;
        self.push(shapes::half_disc(center, radius, start, color, segments.max(4)));
    }

    fn triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) {
        self.push(shapes::triangle(a, b, c, color));
    }

    fn stroke_path(&mut self, points: &[Vec2], width: f32, color: [f32; 4]) {
        self.push(shapes::stroke(points, width, color));
    }

    fn text(&mut self, mut text: TextCommand) {
        text.pos += self.offset;
        self.texts.push(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_applies_to_shapes_and_text() {
        let mut batch = ShapeBatch::new();
        batch.set_offset(Vec2::new(5.0, -5.0));
        batch.fill_rect(Vec2::ZERO, Vec2::ONE, [1.0; 4]);
        batch.text(TextCommand::new("hi", Vec2::new(10.0, 10.0), 12.0, [1.0; 4]));
        assert_eq!(batch.vertices[0].position, [5.0, -5.0]);
        assert_eq!(batch.texts[0].pos, Vec2::new(15.0, 5.0));
    }

    #[test]
    fn test_clear_resets_frame() {
        let mut batch = ShapeBatch::new();
        batch.set_offset(Vec2::ONE);
        batch.fill_circle(Vec2::ZERO, 10.0, [1.0; 4]);
        batch.clear([0.0, 0.0, 0.0, 1.0]);
        assert!(batch.vertices.is_empty());
        batch.fill_rect(Vec2::ZERO, Vec2::ONE, [1.0; 4]);
        assert_eq!(batch.vertices[0].position, [0.0, 0.0]);
    }
}
