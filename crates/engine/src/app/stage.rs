use std::time::Duration;

use crate::actors::{ActorId, ActorManager};
use crate::camera::Camera;
use crate::graphics::RenderTarget;
use crate::input::PointerEvent;

use super::clock::GameTime;

/// Everything one running level needs: its actors, the camera looking at
/// them, and the simulation clock.
#[derive(Default)]
pub struct Stage {
    pub actors: ActorManager,
    pub camera: Camera,
    time: GameTime,
    follow: Option<ActorId>,
}

impl Stage {
    pub fn new(camera: Camera) -> Self {
        Self {
            actors: ActorManager::new(),
            camera,
            time: GameTime::new(),
            follow: None,
        }
    }

    /// Keeps the camera targeting the centre of `id`'s bbox while it lives.
    pub fn follow(&mut self, id: Option<ActorId>) {
        self.follow = id;
    }

    pub fn followed(&self) -> Option<ActorId> {
        self.follow
    }

    pub fn time(&self) -> &GameTime {
        &self.time
    }

    /// Forwards a pointer event given in screen pixels, converted to world
    /// space through the current camera.
    pub fn handle_screen_pointer(&mut self, event: PointerEvent) {
        let world_event = match event {
            PointerEvent::Moved(position) => {
                PointerEvent::Moved(self.camera.screen_to_world(position))
            }
            PointerEvent::Released { position, button } => PointerEvent::Released {
                position: self.camera.screen_to_world(position),
                button,
            },
            PointerEvent::Exited => PointerEvent::Exited,
        };
        self.actors.handle_pointer(world_event);
    }

    /// One simulation step: actors first, then the camera.
    pub fn tick(&mut self, dt: Duration) {
        self.time.advance(dt);
        let seconds = dt.as_secs_f32();
        self.actors.update(seconds);
        if let Some(id) = self.follow {
            match self.actors.get(id) {
                Ok(actor) => self.camera.target(actor.core().bbox().center()),
                Err(_) => self.follow = None,
            }
        }
        self.camera.update(seconds);
    }

    pub fn draw(&self, target: &mut dyn RenderTarget) {
        target.begin_frame();
        target.set_view(&self.camera.view());
        self.actors.draw(target);
        self.actors.draw_overlay(target);
    }

    pub fn frame(&mut self, dt: Duration, target: &mut dyn RenderTarget) {
        self.tick(dt);
        self.draw(target);
    }
}
