use std::path::{Path, PathBuf};

use stage_engine::{
    Actor, ActorContext, ActorCore, ActorRegistry, AnimationStep, Color, MouseButton,
    ObjectDesc, RegistryError, Sprite, Texture, Vec2,
};
use tracing::{debug, info, warn};

const PLAYER_WALK_FPS: f32 = 8.0;
const PLAYER_FRAME_PX: u32 = 16;
const PLAYER_DEFAULT_SPEED: f32 = 32.0;
const COIN_PX: u32 = 8;
const COIN_SPIN_DEGREES_PER_SECOND: f32 = 180.0;
const SPAWNER_DEFAULT_INTERVAL: f32 = 1.0;
const SPAWNER_DEFAULT_MAX: u32 = 5;
const SPAWN_OFFSET: Vec2 = Vec2::new(24.0, 4.0);

pub(crate) fn build_registry(asset_root: &Path) -> Result<ActorRegistry, RegistryError> {
    let mut registry = ActorRegistry::new();
    registry.register_with("Player", |desc| {
        Box::new(Player::new(
            desc.property_f32("speed").unwrap_or(PLAYER_DEFAULT_SPEED),
        ))
    })?;
    registry.register_with("Coin", |desc| {
        let value = desc.property_f32("value").map_or(1, |value| value.max(0.0) as u32);
        Box::new(Coin::new(value))
    })?;
    registry.register_with("CoinSpawner", |desc| {
        Box::new(CoinSpawner::new(
            desc.property_f32("interval").unwrap_or(SPAWNER_DEFAULT_INTERVAL),
            desc.property_f32("max")
                .map_or(SPAWNER_DEFAULT_MAX, |max| max.max(0.0) as u32),
        ))
    })?;
    let root = asset_root.to_path_buf();
    registry.register_with("Prop", move |desc| Box::new(Prop::from_desc(desc, &root)))?;
    Ok(registry)
}

fn solid_frames(prefix: &str, count: usize, size: u32) -> Vec<Texture> {
    (0..count)
        .map(|index| {
            Texture::new(format!("{prefix}_{index}"), size, size)
                .unwrap_or_else(|_| Texture::placeholder())
        })
        .collect()
}

/// Walks right at a constant speed. Clicking it toggles the walk animation.
pub(crate) struct Player {
    pub(crate) core: ActorCore,
    speed: f32,
    pub(crate) score: u32,
    pub(crate) steps_taken: u32,
}

impl Default for Player {
    fn default() -> Self {
        Self::new(PLAYER_DEFAULT_SPEED)
    }
}

impl Player {
    pub(crate) fn new(speed: f32) -> Self {
        let mut sprite = Sprite::still(Texture::placeholder());
        let frames = solid_frames("player_walk", 4, PLAYER_FRAME_PX);
        if let Err(error) = sprite.add_animation_frames("walk", frames, PLAYER_WALK_FPS) {
            warn!(error = %error, "player_animation_missing");
        }
        let mut core = ActorCore::with_sprite(sprite);
        core.set_depth(10);
        core.persistent = true;
        Self {
            core,
            speed,
            score: 0,
            steps_taken: 0,
        }
    }

    fn is_walking(&self) -> bool {
        self.core.sprite.current_animation_name() == Some("walk")
            && self
                .core
                .sprite
                .current_animation()
                .is_some_and(|animation| animation.is_playing())
    }
}

impl Actor for Player {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn on_ready(&mut self, _ctx: &mut ActorContext<'_>) {
        if self.core.sprite.play_animation("walk").is_ok() {
            self.core.velocity = Vec2::new(self.speed, 0.0);
        }
    }

    fn on_animation(&mut self, step: AnimationStep, _ctx: &mut ActorContext<'_>) {
        if step.looped() && self.is_walking() {
            self.steps_taken += step.loops;
            debug!(steps = self.steps_taken, "player_step_cycle");
        }
    }

    fn on_clicked(&mut self, button: MouseButton, _ctx: &mut ActorContext<'_>) {
        if button != MouseButton::Left {
            return;
        }
        if self.is_walking() {
            if let Some(animation) = self.core.sprite.current_animation_mut() {
                animation.pause();
            }
            self.core.velocity = Vec2::ZERO;
        } else if self.core.sprite.play_animation("walk").is_ok() {
            self.core.velocity = Vec2::new(self.speed, 0.0);
        }
        info!(walking = self.is_walking(), "player_clicked");
    }
}

/// Spins in place until the player touches it, then removes itself.
pub(crate) struct Coin {
    pub(crate) core: ActorCore,
    value: u32,
}

impl Default for Coin {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Coin {
    pub(crate) fn new(value: u32) -> Self {
        let texture =
            Texture::new("coin", COIN_PX, COIN_PX).unwrap_or_else(|_| Texture::placeholder());
        let mut core = ActorCore::with_sprite(Sprite::still(texture));
        core.sprite.color = Color::rgba(255, 215, 0, 255);
        Self { core, value }
    }
}

impl Actor for Coin {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn update(&mut self, dt: f32, ctx: &mut ActorContext<'_>) {
        let rotation = self.core.rotation_degrees() + COIN_SPIN_DEGREES_PER_SECOND * dt;
        self.core.set_rotation_degrees(rotation % 360.0);

        let bbox = self.core.bbox();
        let Some(player_id) = ctx
            .get_actor_by_type::<Player>()
            .filter(|player| player.core.bbox().intersection_depth(&bbox).is_some())
            .and_then(|player| player.core.id())
        else {
            return;
        };
        if ctx.remove_self() {
            let value = self.value;
            let collected = ctx.with_actor_mut(player_id, |actor| {
                if let Some(player) = actor.as_any_mut().downcast_mut::<Player>() {
                    player.score += value;
                }
            });
            if collected.is_ok() {
                info!(value, name = self.core.name(), "coin_collected");
            }
        }
    }
}

/// Drops a coin ahead of itself every `interval` seconds, up to `max` coins.
pub(crate) struct CoinSpawner {
    pub(crate) core: ActorCore,
    interval: f32,
    max: u32,
    timer: f32,
    pub(crate) spawned: u32,
}

impl Default for CoinSpawner {
    fn default() -> Self {
        Self::new(SPAWNER_DEFAULT_INTERVAL, SPAWNER_DEFAULT_MAX)
    }
}

impl CoinSpawner {
    pub(crate) fn new(interval: f32, max: u32) -> Self {
        Self {
            core: ActorCore::new(),
            interval: interval.max(f32::EPSILON),
            max,
            timer: 0.0,
            spawned: 0,
        }
    }
}

impl Actor for CoinSpawner {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn update(&mut self, dt: f32, ctx: &mut ActorContext<'_>) {
        if self.spawned >= self.max {
            return;
        }
        self.timer += dt;
        while self.timer >= self.interval && self.spawned < self.max {
            self.timer -= self.interval;
            self.spawned += 1;
            let mut coin = Coin::default();
            let offset = SPAWN_OFFSET * self.spawned as f32;
            coin.core.set_position(self.core.position() + offset);
            let id = ctx.add(coin);
            debug!(id = %id, spawned = self.spawned, "coin_spawned");
        }
        if self.spawned >= self.max {
            info!(name = self.core.name(), spawned = self.spawned, "spawner_exhausted");
            ctx.remove_self();
        }
    }
}

/// Static decoration whose image comes from the level's asset directory.
#[derive(Default)]
pub(crate) struct Prop {
    pub(crate) core: ActorCore,
}

impl Prop {
    fn from_desc(desc: &ObjectDesc, asset_root: &Path) -> Self {
        let texture = match desc.property_str("texture") {
            Some(relative) => load_texture_or_placeholder(asset_root.join(relative), relative),
            None => Texture::placeholder(),
        };
        let mut core = ActorCore::with_sprite(Sprite::still(texture));
        if let Some(depth) = desc.property_f32("depth") {
            core.set_depth(depth as i32);
        }
        Self { core }
    }
}

impl Actor for Prop {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }
}

fn load_texture_or_placeholder(path: PathBuf, key: &str) -> Texture {
    Texture::load_png(key, &path).unwrap_or_else(|error| {
        warn!(path = %path.display(), error = %error, "texture_load_failed; using placeholder");
        Texture::placeholder()
    })
}
