//! Render submission surface.
//!
//! Drawing is owned by the host application. The draw traversal only hands
//! debug primitives to whatever implements [`RenderSurface`]; the kernel
//! ships a [`NullSurface`] for headless runs and a [`RecordingSurface`] that
//! keeps every submission, which tests and the demo binary use.

use glam::Vec2;
use log::trace;

/// Color hint for debug primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugColor {
    Active,
    Inactive,
    Static,
}

/// Sink for the draw traversal's primitive submissions.
pub trait RenderSurface {
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: DebugColor);
    fn draw_rect(&mut self, min: Vec2, size: Vec2, color: DebugColor);
    fn draw_label(&mut self, at: Vec2, text: &str);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl RenderSurface for NullSurface {
    fn draw_circle(&mut self, _center: Vec2, _radius: f32, _color: DebugColor) {}
    fn draw_rect(&mut self, _min: Vec2, _size: Vec2, _color: DebugColor) {}
    fn draw_label(&mut self, _at: Vec2, _text: &str) {}
}

/// A single recorded submission.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Circle {
        center: Vec2,
        radius: f32,
        color: DebugColor,
    },
    Rect {
        min: Vec2,
        size: Vec2,
        color: DebugColor,
    },
    Label {
        at: Vec2,
        text: String,
    },
}

/// Keeps submissions in order until cleared.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Labels submitted so far, in order.
    pub fn labels(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Label { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl RenderSurface for RecordingSurface {
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: DebugColor) {
        trace!("draw circle at {center} r={radius}");
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn draw_rect(&mut self, min: Vec2, size: Vec2, color: DebugColor) {
        trace!("draw rect at {min} size={size}");
        self.commands.push(DrawCommand::Rect { min, size, color });
    }

    fn draw_label(&mut self, at: Vec2, text: &str) {
        self.commands.push(DrawCommand::Label {
            at,
            text: text.to_string(),
        });
    }
}
