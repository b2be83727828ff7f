use std::any::Any;
use std::fmt;

use crate::geometry::{Rect, Vec2};
use crate::graphics::{AnimationStep, RenderTarget, Sprite};
use crate::input::{track_pointer, MouseButton, PointerEvent, PointerHit};

use super::manager::ActorContext;
use super::registry::ObjectDesc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Default)]
pub(crate) struct ActorIdAllocator {
    next: u64,
}

impl ActorIdAllocator {
    pub(crate) fn allocate(&mut self) -> ActorId {
        let id = ActorId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// State every actor carries. Concrete actors embed one and expose it through
/// [`Actor::core`].
#[derive(Debug, Clone)]
pub struct ActorCore {
    id: Option<ActorId>,
    name: String,
    depth: i32,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// Run the built-in velocity/acceleration integrator each frame.
    pub built_in_motion: bool,
    pub sprite: Sprite,
    bbox: Rect,
    /// Derive the bbox size from the sprite image; otherwise the size is
    /// caller-owned and only the position follows the actor.
    pub calc_bbox_off_graphics: bool,
    /// Survives [`ActorManager::clear_non_persistent`](super::ActorManager::clear_non_persistent).
    pub persistent: bool,
    source: Option<ObjectDesc>,
    mouse_over: bool,
}

impl Default for ActorCore {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            depth: 0,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            built_in_motion: true,
            sprite: Sprite::new(),
            bbox: Rect::default(),
            calc_bbox_off_graphics: true,
            persistent: false,
            source: None,
            mouse_over: false,
        }
    }
}

impl ActorCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sprite(sprite: Sprite) -> Self {
        Self {
            sprite,
            ..Self::default()
        }
    }

    /// Assigned by the manager on add; `None` while detached.
    pub fn id(&self) -> Option<ActorId> {
        self.id
    }

    pub fn is_attached(&self) -> bool {
        self.id.is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Lower depths draw first. The owning manager re-sorts with the new value
    /// as soon as the mutable access that made the change ends.
    pub fn set_depth(&mut self, depth: i32) {
        self.depth = depth;
    }

    pub fn position(&self) -> Vec2 {
        self.sprite.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.sprite.position = position;
    }

    pub fn x(&self) -> f32 {
        self.sprite.position.x
    }

    pub fn y(&self) -> f32 {
        self.sprite.position.y
    }

    pub fn set_x(&mut self, x: f32) {
        self.sprite.position.x = x;
    }

    pub fn set_y(&mut self, y: f32) {
        self.sprite.position.y = y;
    }

    pub fn rotation_degrees(&self) -> f32 {
        self.sprite.rotation_degrees
    }

    pub fn set_rotation_degrees(&mut self, rotation_degrees: f32) {
        self.sprite.rotation_degrees = rotation_degrees;
    }

    pub fn scale(&self) -> Vec2 {
        self.sprite.scale
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.sprite.scale = scale;
    }

    pub fn is_visible(&self) -> bool {
        self.sprite.is_visible()
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.sprite.set_visible(visible);
    }

    pub fn bbox(&self) -> Rect {
        self.bbox
    }

    /// Sets a caller-owned bbox size and stops deriving it from graphics.
    pub fn set_bbox_size(&mut self, size: Vec2) {
        self.calc_bbox_off_graphics = false;
        self.bbox = Rect::from_position_size(self.position(), size);
    }

    pub fn is_mouse_over(&self) -> bool {
        self.mouse_over
    }

    /// Object description this actor was spawned from, if any.
    pub fn source(&self) -> Option<&ObjectDesc> {
        self.source.as_ref()
    }

    pub fn set_source(&mut self, source: ObjectDesc) {
        self.source = Some(source);
    }

    /// Semi-implicit Euler step: velocity first, then position.
    pub fn integrate_motion(&mut self, dt: f32) {
        self.velocity += self.acceleration * dt;
        let position = self.position() + self.velocity * dt;
        self.set_position(position);
    }

    pub fn update_bbox(&mut self) {
        let position = self.position();
        if !self.calc_bbox_off_graphics {
            self.bbox.x = position.x;
            self.bbox.y = position.y;
            return;
        }
        let size = self.sprite.scaled_size().unwrap_or(Vec2::ZERO);
        self.bbox = Rect::from_position_size(position, size);
    }

    pub(crate) fn attach(&mut self, id: ActorId) {
        self.id = Some(id);
    }

    pub(crate) fn detach(&mut self) {
        self.id = None;
        self.mouse_over = false;
    }

    /// Gives unnamed actors a label built from their source object type (or
    /// their id) and position.
    pub(crate) fn ensure_name(&mut self) {
        if !self.name.is_empty() {
            return;
        }
        let label = match (&self.source, self.id) {
            (Some(source), _) if !source.type_tag.is_empty() => source.type_tag.clone(),
            (_, Some(id)) => format!("actor_{id}"),
            (_, None) => "actor".to_string(),
        };
        let position = self.position();
        self.name = format!("{label} ({:.0}, {:.0})", position.x, position.y);
    }

    pub(crate) fn track_pointer(
        &mut self,
        events: &[PointerEvent],
        last_position: Option<Vec2>,
    ) -> Vec<PointerHit> {
        track_pointer(self.bbox, &mut self.mouse_over, events, last_position)
    }
}

/// Downcasting support for type-filtered actor queries.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behaviour hooks for a live game entity.
///
/// Each frame the manager calls [`Actor::update`], then [`Actor::do_motion`]
/// (when built-in motion is on), recomputes the bbox, advances the sprite
/// animation, and finally tests the bbox against the pointer. Callbacks get an
/// [`ActorContext`] for structural changes; removals requested through it are
/// applied after the pass.
pub trait Actor: AsAny {
    fn core(&self) -> &ActorCore;

    fn core_mut(&mut self) -> &mut ActorCore;

    /// Called once, right after the actor is attached and has its id.
    fn on_ready(&mut self, _ctx: &mut ActorContext<'_>) {}

    fn update(&mut self, _dt: f32, _ctx: &mut ActorContext<'_>) {}

    fn do_motion(&mut self, dt: f32) {
        self.core_mut().integrate_motion(dt);
    }

    /// Called when the active animation changed frame or looped.
    fn on_animation(&mut self, _step: AnimationStep, _ctx: &mut ActorContext<'_>) {}

    fn on_clicked(&mut self, _button: MouseButton, _ctx: &mut ActorContext<'_>) {}

    fn on_mouse_entered(&mut self, _ctx: &mut ActorContext<'_>) {}

    fn on_mouse_left(&mut self, _ctx: &mut ActorContext<'_>) {}

    fn draw(&self, target: &mut dyn RenderTarget) {
        if let Some(sprite) = self.core().sprite.draw_params() {
            target.draw_sprite(&sprite);
        }
    }

    fn draw_overlay(&self, _target: &mut dyn RenderTarget) {}

    /// Called once when the queued removal is applied, before detaching.
    fn on_removed(&mut self, _ctx: &mut ActorContext<'_>) {}
}

/// An actor with no behaviour beyond the built-in pipeline.
#[derive(Debug, Clone, Default)]
pub struct BasicActor {
    pub core: ActorCore,
}

impl BasicActor {
    pub fn new(core: ActorCore) -> Self {
        Self { core }
    }
}

impl Actor for BasicActor {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::Texture;

    #[test]
    fn allocator_never_reuses_ids() {
        let mut allocator = ActorIdAllocator::default();
        let a = allocator.allocate();
        let b = allocator.allocate();
        let c = allocator.allocate();
        assert_eq!(a, ActorId(0));
        assert_eq!(b, ActorId(1));
        assert_eq!(c, ActorId(2));
    }

    #[test]
    fn motion_is_semi_implicit_euler() {
        let mut core = ActorCore::new();
        core.acceleration = Vec2::new(2.0, 0.0);
        core.integrate_motion(0.5);
        assert_eq!(core.velocity, Vec2::new(1.0, 0.0));
        assert_eq!(core.position(), Vec2::new(0.5, 0.0));
    }

    #[test]
    fn bbox_follows_scaled_sprite_image() {
        let texture = Texture::new("crate", 16, 8).expect("texture");
        let mut core = ActorCore::with_sprite(Sprite::still(texture));
        core.set_position(Vec2::new(3.0, 4.0));
        core.set_scale(Vec2::new(2.0, 3.0));
        core.update_bbox();
        assert_eq!(core.bbox(), Rect::new(3.0, 4.0, 32.0, 24.0));
    }

    #[test]
    fn bbox_collapses_without_image() {
        let mut core = ActorCore::new();
        core.set_position(Vec2::new(7.0, -2.0));
        core.update_bbox();
        assert_eq!(core.bbox(), Rect::new(7.0, -2.0, 0.0, 0.0));
    }

    #[test]
    fn manual_bbox_keeps_size_and_tracks_position() {
        let texture = Texture::new("crate", 16, 8).expect("texture");
        let mut core = ActorCore::with_sprite(Sprite::still(texture));
        core.set_bbox_size(Vec2::new(4.0, 4.0));
        core.set_position(Vec2::new(10.0, 10.0));
        core.update_bbox();
        assert_eq!(core.bbox(), Rect::new(10.0, 10.0, 4.0, 4.0));
    }

    #[test]
    fn visibility_delegates_to_sprite() {
        let mut core = ActorCore::new();
        core.set_visible(false);
        assert!(!core.sprite.is_visible());
        assert!(!core.is_visible());
    }

    #[test]
    fn name_fallback_uses_source_type_then_id() {
        let mut from_map = ActorCore::new();
        from_map.set_source(ObjectDesc {
            type_tag: "Coin".to_string(),
            ..ObjectDesc::default()
        });
        from_map.set_position(Vec2::new(32.0, 64.4));
        from_map.ensure_name();
        assert_eq!(from_map.name(), "Coin (32, 64)");

        let mut spawned = ActorCore::new();
        spawned.attach(ActorId(9));
        spawned.ensure_name();
        assert_eq!(spawned.name(), "actor_9 (0, 0)");

        let mut named = ActorCore::new();
        named.set_name("hero");
        named.ensure_name();
        assert_eq!(named.name(), "hero");
    }
}
