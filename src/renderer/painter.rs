//! Immediate-mode painter with a translate stack
//!
//! Callers `save()`, `translate()` and later `restore()`; every shape pushed
//! in between is offset by the accumulated translation. The world pass
//! translates by the negated camera position so world coordinates come out as
//! screen pixels.

use glam::Vec2;
use serde::Serialize;

use super::shapes;
use super::vertex::Vertex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// A piece of text for the label layer, already in screen pixels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub text: String,
    pub pos: Vec2,
    /// Font size in pixels
    pub size: f32,
    pub color: [f32; 4],
    pub align: TextAlign,
}

#[derive(Debug, Default)]
pub struct Painter {
    vertices: Vec<Vertex>,
    labels: Vec<Label>,
    offset: Vec2,
    stack: Vec<Vec2>,
}

impl Painter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&mut self) {
        self.stack.push(self.offset);
    }

    /// Pop the last saved translation; unbalanced restores reset to identity
    pub fn restore(&mut self) {
        self.offset = self.stack.pop().unwrap_or(Vec2::ZERO);
    }

    pub fn translate(&mut self, by: Vec2) {
        self.offset += by;
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        let segments = ((radius * 0.8) as u32).clamp(10, 48);
        self.vertices
            .extend(shapes::circle(center + self.offset, radius, color, segments));
    }

    pub fn fill_polygon(&mut self, center: Vec2, points: &[Vec2], scale: f32, color: [f32; 4]) {
        self.vertices
            .extend(shapes::polygon(center + self.offset, points, scale, color));
    }

    pub fn fill_rect(&mut self, min: Vec2, size: Vec2, color: [f32; 4]) {
        self.vertices.extend(shapes::rect(min + self.offset, size, color));
    }

    pub fn fill_rotated_rect(
        &mut self,
        center: Vec2,
        half_size: Vec2,
        offset: Vec2,
        angle: f32,
        color: [f32; 4],
    ) {
        self.vertices.extend(shapes::rotated_rect(
            center + self.offset,
            half_size,
            offset,
            angle,
            color,
        ));
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: [f32; 4]) {
        self.vertices
            .extend(shapes::line(from + self.offset, to + self.offset, width, color));
    }

    pub fn arrow(&mut self, tip: Vec2, angle: f32, length: f32, width: f32, color: [f32; 4]) {
        self.vertices
            .extend(shapes::arrow(tip + self.offset, angle, length, width, color));
    }

    pub fn text(
        &mut self,
        text: impl Into<String>,
        pos: Vec2,
        size: f32,
        color: [f32; 4],
        align: TextAlign,
    ) {
        self.labels.push(Label {
            text: text.into(),
            pos: pos + self.offset,
            size,
            color,
            align,
        });
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn finish(self) -> (Vec<Vertex>, Vec<Label>) {
        (self.vertices, self.labels)
    }
}
