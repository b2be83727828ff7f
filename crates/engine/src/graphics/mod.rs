mod animation;
mod render;
mod sprite;
mod texture;

pub use animation::{Animation, AnimationError, AnimationStep, STILL_FPS};
pub use render::{Color, DrawCommand, DrawList, RenderTarget, SpriteDraw, View};
pub use sprite::{Sprite, SpriteError, STILL_ANIMATION};
pub use texture::{Texture, TextureError, PLACEHOLDER_TEXTURE_KEY};
