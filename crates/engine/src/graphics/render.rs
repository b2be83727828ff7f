use crate::geometry::{Rect, Vec2};

use super::texture::Texture;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const RED: Color = Color::rgba(255, 0, 0, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Visible world region handed to the renderer before actors draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub center: Vec2,
    pub size: Vec2,
    pub rotation_degrees: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteDraw {
    pub texture: Texture,
    pub position: Vec2,
    pub origin: Vec2,
    pub rotation_degrees: f32,
    pub scale: Vec2,
    pub color: Color,
}

/// Draw submission seam. The window backend implements this; the core only
/// describes what to draw.
pub trait RenderTarget {
    /// Called once before each frame's draw calls.
    fn begin_frame(&mut self) {}

    fn set_view(&mut self, _view: &View) {}

    fn draw_sprite(&mut self, sprite: &SpriteDraw);

    fn draw_rect(&mut self, _rect: Rect, _color: Color) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    View(View),
    Sprite(SpriteDraw),
    Rect { rect: Rect, color: Color },
}

/// Render target that records commands, for headless runs and tests.
#[derive(Debug, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn sprites(&self) -> impl Iterator<Item = &SpriteDraw> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Sprite(sprite) => Some(sprite),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl RenderTarget for DrawList {
    fn begin_frame(&mut self) {
        self.commands.clear();
    }

    fn set_view(&mut self, view: &View) {
        self.commands.push(DrawCommand::View(*view));
    }

    fn draw_sprite(&mut self, sprite: &SpriteDraw) {
        self.commands.push(DrawCommand::Sprite(sprite.clone()));
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Rect { rect, color });
    }
}
