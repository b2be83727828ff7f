use std::env;
use std::path::PathBuf;

use stage_engine::{
    Camera, LoopConfig, MouseButton, PointerEvent, RegistryError, Stage,
};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::actors::{build_registry, Player};
use super::level::{builtin_level, load_level_file, LevelError, LoadedLevel};

pub(crate) const LEVEL_PATH_ENV_VAR: &str = "STAGE_LEVEL_PATH";

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error("failed to register actor types: {0}")]
    Registry(#[from] RegistryError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) stage: Stage,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Stage Startup ===");

    let loaded = match level_path_from_env() {
        Some(path) => load_level_file(&path)?,
        None => builtin_level()?,
    };
    let stage = build_stage(&loaded)?;

    Ok(AppWiring {
        config: LoopConfig::default(),
        stage,
    })
}

pub(crate) fn build_stage(loaded: &LoadedLevel) -> Result<Stage, BootstrapError> {
    let level = &loaded.level;
    let registry = build_registry(&loaded.asset_root)?;
    let mut stage = Stage::new(Camera::new(level.viewport.width, level.viewport.height));
    let report = registry.spawn_objects(&mut stage.actors, &level.objects);
    info!(
        level = level.name.as_str(),
        spawned = report.spawned.len(),
        skipped = report.skipped.len(),
        asset_root = %loaded.asset_root.display(),
        "level_loaded"
    );

    let player = stage
        .actors
        .get_actor_by_type::<Player>()
        .and_then(|player| player.core.id().map(|id| (id, player.core.bbox().center())));
    if let Some((id, center)) = player {
        stage.follow(Some(id));
        stage.camera.goto(center);
        // Demo click on the player so the click path runs in headless mode.
        let screen = stage.camera.world_to_screen(center);
        stage.handle_screen_pointer(PointerEvent::Moved(screen));
        stage.handle_screen_pointer(PointerEvent::Released {
            position: screen,
            button: MouseButton::Left,
        });
    }
    Ok(stage)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn level_path_from_env() -> Option<PathBuf> {
    match env::var(LEVEL_PATH_ENV_VAR) {
        Ok(value) if value.trim().is_empty() => None,
        Ok(value) => Some(PathBuf::from(value.trim())),
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!(
                env_var = LEVEL_PATH_ENV_VAR,
                error = %err,
                "unable to read level path env var; using built-in level"
            );
            None
        }
    }
}
