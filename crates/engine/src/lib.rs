//! A small 2D actor engine: depth-sorted actors with sprite animation,
//! pointer hit-testing, a follow camera, and a fixed-timestep driver.

use thiserror::Error;

pub mod actors;
pub mod app;
pub mod camera;
pub mod geometry;
pub mod graphics;
pub mod input;

pub use actors::{
    Actor, ActorContext, ActorCore, ActorId, ActorManager, ActorRegistry, AsAny, BasicActor,
    ManagerError, ObjectDesc, RegistryError, SpawnReport,
};
pub use app::{
    run_headless, GameTime, LoopConfig, LoopMetricsSnapshot, LoopSummary, MetricsHandle, Stage,
    FRAME_LIMIT_ENV_VAR,
};
pub use camera::Camera;
pub use geometry::{AngleUnit, Rect, Vec2};
pub use graphics::{
    Animation, AnimationError, AnimationStep, Color, DrawCommand, DrawList, RenderTarget, Sprite,
    SpriteDraw, SpriteError, Texture, TextureError, View,
};
pub use input::{MouseButton, PointerEvent};

/// Any engine error, for callers that do not care which subsystem failed.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Texture(#[from] TextureError),
    #[error(transparent)]
    Animation(#[from] AnimationError),
    #[error(transparent)]
    Sprite(#[from] SpriteError),
    #[error(transparent)]
    Manager(#[from] ManagerError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
