use std::collections::HashMap;

use thiserror::Error;

use crate::geometry::Vec2;

use super::animation::{Animation, AnimationError, AnimationStep};
use super::render::{Color, SpriteDraw};
use super::texture::Texture;

/// Name of the single-frame animation backing [`Sprite::still`].
pub const STILL_ANIMATION: &str = "still";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpriteError {
    #[error("animation '{name}' is already registered")]
    DuplicateAnimation { name: String },
    #[error("animation '{name}' is not registered")]
    UnknownAnimation { name: String },
    #[error(transparent)]
    Animation(#[from] AnimationError),
}

/// Graphics facade: a set of named animations, the active one, and the
/// transform and visibility the renderer needs.
#[derive(Debug, Clone)]
pub struct Sprite {
    animations: HashMap<String, Animation>,
    current_animation: Option<String>,
    image: Option<Texture>,
    pub position: Vec2,
    pub origin: Vec2,
    pub rotation_degrees: f32,
    pub scale: Vec2,
    pub color: Color,
    visible: bool,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            animations: HashMap::new(),
            current_animation: None,
            image: None,
            position: Vec2::ZERO,
            origin: Vec2::ZERO,
            rotation_degrees: 0.0,
            scale: Vec2::ONE,
            color: Color::WHITE,
            visible: true,
        }
    }
}

impl Sprite {
    /// A sprite with no animation and no image.
    pub fn new() -> Self {
        Self::default()
    }

    /// A sprite showing one texture through a playing single-frame animation.
    pub fn still(texture: Texture) -> Self {
        let mut sprite = Self::default();
        let mut animation = Animation::still(texture);
        animation.play();
        sprite
            .animations
            .insert(STILL_ANIMATION.to_string(), animation);
        sprite.activate(STILL_ANIMATION.to_string());
        sprite
    }

    pub fn add_animation(
        &mut self,
        name: impl Into<String>,
        animation: Animation,
    ) -> Result<(), SpriteError> {
        let name = name.into();
        if self.animations.contains_key(&name) {
            return Err(SpriteError::DuplicateAnimation { name });
        }
        self.animations.insert(name, animation);
        Ok(())
    }

    pub fn add_animation_frames(
        &mut self,
        name: impl Into<String>,
        frames: Vec<Texture>,
        fps: f32,
    ) -> Result<(), SpriteError> {
        let animation = Animation::new(frames, fps)?;
        self.add_animation(name, animation)
    }

    /// Makes `name` the active animation and marks it playing.
    pub fn play_animation(&mut self, name: &str) -> Result<(), SpriteError> {
        self.switch_animation(name)?;
        if let Some(animation) = self.current_animation_mut() {
            animation.play();
        }
        Ok(())
    }

    /// Makes `name` the active animation without touching its play state.
    pub fn switch_animation(&mut self, name: &str) -> Result<(), SpriteError> {
        if !self.animations.contains_key(name) {
            return Err(SpriteError::UnknownAnimation {
                name: name.to_string(),
            });
        }
        self.activate(name.to_string());
        Ok(())
    }

    pub fn has_animation(&self, name: &str) -> bool {
        self.animations.contains_key(name)
    }

    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.get(name)
    }

    pub fn animation_mut(&mut self, name: &str) -> Option<&mut Animation> {
        self.animations.get_mut(name)
    }

    pub fn current_animation_name(&self) -> Option<&str> {
        self.current_animation.as_deref()
    }

    pub fn current_animation(&self) -> Option<&Animation> {
        self.current_animation
            .as_deref()
            .and_then(|name| self.animations.get(name))
    }

    pub fn current_animation_mut(&mut self) -> Option<&mut Animation> {
        match self.current_animation.as_deref() {
            Some(name) => self.animations.get_mut(name),
            None => None,
        }
    }

    pub fn restart_animation(&mut self) {
        if let Some(animation) = self.current_animation_mut() {
            animation.restart();
        }
        self.refresh_image();
    }

    pub fn next_frame(&mut self) {
        if let Some(animation) = self.current_animation_mut() {
            animation.next_frame();
        }
        self.refresh_image();
    }

    pub fn previous_frame(&mut self) {
        if let Some(animation) = self.current_animation_mut() {
            animation.previous_frame();
        }
        self.refresh_image();
    }

    /// Advances the active animation. Returns `None` when none is active.
    pub fn update(&mut self, dt: f32) -> Option<AnimationStep> {
        let step = self.current_animation_mut().map(|animation| animation.update(dt));
        self.refresh_image();
        step
    }

    /// Texture of the active animation's current frame.
    pub fn image(&self) -> Option<&Texture> {
        self.image.as_ref()
    }

    /// Image size multiplied by scale, or `None` without an image.
    pub fn scaled_size(&self) -> Option<Vec2> {
        self.image
            .as_ref()
            .map(|image| image.size().mul_components(self.scale))
    }

    pub fn center_origin(&mut self) {
        if let Some(image) = &self.image {
            self.origin = image.size() / 2.0;
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Color handed to the renderer: fully transparent while hidden, the
    /// stored color otherwise. The stored color is never modified.
    pub fn effective_color(&self) -> Color {
        if self.visible {
            self.color
        } else {
            self.color.with_alpha(0)
        }
    }

    pub fn draw_params(&self) -> Option<SpriteDraw> {
        self.image.as_ref().map(|texture| SpriteDraw {
            texture: texture.clone(),
            position: self.position,
            origin: self.origin,
            rotation_degrees: self.rotation_degrees,
            scale: self.scale,
            color: self.effective_color(),
        })
    }

    fn activate(&mut self, name: String) {
        self.current_animation = Some(name);
        self.refresh_image();
    }

    fn refresh_image(&mut self) {
        self.image = self
            .current_animation()
            .map(|animation| animation.current_texture().clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture(key: &str, size: u32) -> Texture {
        Texture::new(key, size, size).expect("texture")
    }

    fn walk_frames() -> Vec<Texture> {
        vec![texture("walk_0", 8), texture("walk_1", 8), texture("walk_2", 8)]
    }

    #[test]
    fn empty_sprite_has_no_animation_or_image() {
        let mut sprite = Sprite::new();
        assert_eq!(sprite.current_animation_name(), None);
        assert!(sprite.image().is_none());
        assert!(sprite.update(0.5).is_none());
        assert!(sprite.draw_params().is_none());
    }

    #[test]
    fn still_sprite_shows_its_texture() {
        let sprite = Sprite::still(texture("rock", 12));
        assert_eq!(sprite.current_animation_name(), Some(STILL_ANIMATION));
        assert_eq!(sprite.image().map(Texture::key), Some("rock"));
        assert!(sprite
            .current_animation()
            .is_some_and(Animation::is_playing));
    }

    #[test]
    fn duplicate_animation_name_is_rejected() {
        let mut sprite = Sprite::new();
        sprite
            .add_animation_frames("walk", walk_frames(), 4.0)
            .expect("first registration");
        let err = sprite
            .add_animation_frames("walk", walk_frames(), 4.0)
            .expect_err("duplicate");
        assert_eq!(
            err,
            SpriteError::DuplicateAnimation {
                name: "walk".to_string()
            }
        );
    }

    #[test]
    fn invalid_frames_surface_animation_error() {
        let mut sprite = Sprite::new();
        let err = sprite
            .add_animation_frames("empty", Vec::new(), 4.0)
            .expect_err("no frames");
        assert_eq!(err, SpriteError::Animation(AnimationError::NoFrames));
    }

    #[test]
    fn unknown_animation_cannot_be_played_or_switched() {
        let mut sprite = Sprite::new();
        assert!(matches!(
            sprite.play_animation("run"),
            Err(SpriteError::UnknownAnimation { .. })
        ));
        assert!(matches!(
            sprite.switch_animation("run"),
            Err(SpriteError::UnknownAnimation { .. })
        ));
        assert_eq!(sprite.current_animation_name(), None);
    }

    #[test]
    fn switch_keeps_play_state_but_play_starts_it() {
        let mut sprite = Sprite::new();
        sprite
            .add_animation_frames("walk", walk_frames(), 2.0)
            .expect("register");

        sprite.switch_animation("walk").expect("switch");
        assert_eq!(sprite.image().map(Texture::key), Some("walk_0"));
        assert!(!sprite.current_animation().is_some_and(Animation::is_playing));
        assert!(sprite.update(1.0).is_some_and(|step| step.is_quiet()));

        sprite.play_animation("walk").expect("play");
        assert!(sprite.current_animation().is_some_and(Animation::is_playing));
        let step = sprite.update(0.5).expect("active animation");
        assert!(step.frame_changed());
        assert_eq!(sprite.image().map(Texture::key), Some("walk_1"));
    }

    #[test]
    fn play_switches_image_immediately() {
        let mut sprite = Sprite::still(texture("idle", 8));
        sprite
            .add_animation_frames("walk", walk_frames(), 2.0)
            .expect("register");
        sprite.play_animation("walk").expect("play");
        assert_eq!(sprite.image().map(Texture::key), Some("walk_0"));
    }

    #[test]
    fn frame_stepping_refreshes_image() {
        let mut sprite = Sprite::new();
        sprite
            .add_animation_frames("walk", walk_frames(), 2.0)
            .expect("register");
        sprite.switch_animation("walk").expect("switch");

        sprite.next_frame();
        assert_eq!(sprite.image().map(Texture::key), Some("walk_1"));
        sprite.previous_frame();
        sprite.previous_frame();
        assert_eq!(sprite.image().map(Texture::key), Some("walk_2"));
        sprite.restart_animation();
        assert_eq!(sprite.image().map(Texture::key), Some("walk_0"));
    }

    #[test]
    fn hidden_sprite_draws_transparent_without_losing_color() {
        let mut sprite = Sprite::still(texture("ghost", 4));
        sprite.color = Color::rgba(10, 20, 30, 200);
        sprite.set_visible(false);

        let draw = sprite.draw_params().expect("has image");
        assert_eq!(draw.color, Color::rgba(10, 20, 30, 0));
        assert_eq!(sprite.color.a, 200);

        sprite.set_visible(true);
        assert_eq!(sprite.effective_color().a, 200);
    }

    #[test]
    fn scaled_size_and_center_origin_follow_image() {
        let mut sprite = Sprite::still(Texture::new("wide", 20, 10).expect("texture"));
        sprite.scale = Vec2::new(2.0, 0.5);
        assert_eq!(sprite.scaled_size(), Some(Vec2::new(40.0, 5.0)));
        sprite.center_origin();
        assert_eq!(sprite.origin, Vec2::new(10.0, 5.0));
    }
}
