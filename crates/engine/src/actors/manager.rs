use std::any::{type_name, TypeId};
use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::geometry::Vec2;
use crate::graphics::RenderTarget;
use crate::input::{PointerEvent, PointerHit, PointerState};

use super::actor::{Actor, ActorId, ActorIdAllocator};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManagerError {
    #[error("actor {id} is not live")]
    NotFound { id: ActorId },
    #[error("actor {id} is inside one of its own callbacks")]
    Busy { id: ActorId },
    #[error("actor {id} is not a {expected}")]
    WrongType { id: ActorId, expected: &'static str },
}

struct Slot {
    // Empty while the actor runs one of its own callbacks.
    actor: Option<Box<dyn Actor>>,
    type_id: TypeId,
    depth: i32,
    persistent: bool,
}

impl Slot {
    /// Refreshes cached fields; returns true when the depth changed.
    fn sync(&mut self) -> bool {
        let Some(actor) = self.actor.as_deref() else {
            return false;
        };
        let core = actor.core();
        self.persistent = core.persistent;
        let changed = self.depth != core.depth();
        self.depth = core.depth();
        changed
    }
}

/// Owns the live actors, keyed by id, plus a depth-sorted draw order.
///
/// Structural changes requested while a pass is running are deferred: removals
/// are queued and applied once every actor has been updated, so actors may
/// remove themselves or each other from inside their callbacks.
#[derive(Default)]
pub struct ActorManager {
    allocator: ActorIdAllocator,
    slots: BTreeMap<ActorId, Slot>,
    draw_order: Vec<ActorId>,
    removal_queue: Vec<ActorId>,
    pointer: PointerState,
}

impl ActorManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<A: Actor>(&mut self, actor: A) -> ActorId {
        self.add_boxed(Box::new(actor))
    }

    /// Attaches the actor under a fresh id, runs its `on_ready` hook, and
    /// re-sorts the draw order.
    pub fn add_boxed(&mut self, mut actor: Box<dyn Actor>) -> ActorId {
        let id = self.allocator.allocate();
        actor.core_mut().attach(id);
        let type_id = actor.as_ref().as_any().type_id();
        self.slots.insert(
            id,
            Slot {
                actor: None,
                type_id,
                depth: actor.core().depth(),
                persistent: actor.core().persistent,
            },
        );

        actor.core_mut().ensure_name();
        actor.on_ready(&mut ActorContext::new(self, id));
        let core = actor.core_mut();
        core.update_bbox();
        debug!(
            id = %id,
            name = core.name(),
            depth = core.depth(),
            "actor_added"
        );

        if let Some(slot) = self.slots.get_mut(&id) {
            slot.actor = Some(actor);
            slot.sync();
        }
        self.sort_by_depth();
        id
    }

    /// Queues `id` for removal at the end of the next update pass. Returns
    /// false when no such actor is live.
    pub fn remove(&mut self, id: ActorId) -> bool {
        if !self.slots.contains_key(&id) {
            return false;
        }
        self.removal_queue.push(id);
        true
    }

    pub fn remove_actor(&mut self, actor: &dyn Actor) -> bool {
        match actor.core().id() {
            Some(id) => self.remove(id),
            None => false,
        }
    }

    /// Queues every live actor of type `T`. Returns how many were queued.
    pub fn remove_all<T: Actor>(&mut self) -> usize {
        let target = TypeId::of::<T>();
        let matching: Vec<ActorId> = self
            .slots
            .iter()
            .filter(|(_, slot)| slot.type_id == target)
            .map(|(id, _)| *id)
            .collect();
        let count = matching.len();
        self.removal_queue.extend(matching);
        count
    }

    /// Queues every actor not flagged persistent, as on a scene change.
    pub fn clear_non_persistent(&mut self) -> usize {
        let doomed: Vec<ActorId> = self
            .slots
            .iter()
            .filter(|(_, slot)| !slot.persistent)
            .map(|(id, _)| *id)
            .collect();
        let count = doomed.len();
        self.removal_queue.extend(doomed);
        debug!(count, "clear_non_persistent_queued");
        count
    }

    pub fn get(&self, id: ActorId) -> Result<&dyn Actor, ManagerError> {
        let slot = self.slots.get(&id).ok_or(ManagerError::NotFound { id })?;
        slot.actor.as_deref().ok_or(ManagerError::Busy { id })
    }

    pub fn get_as<T: Actor>(&self, id: ActorId) -> Result<&T, ManagerError> {
        self.get(id)?
            .as_any()
            .downcast_ref::<T>()
            .ok_or(ManagerError::WrongType {
                id,
                expected: type_name::<T>(),
            })
    }

    /// Runs `f` with mutable access to one actor, then re-sorts the draw order
    /// if its depth changed.
    pub fn with_actor_mut<R>(
        &mut self,
        id: ActorId,
        f: impl FnOnce(&mut dyn Actor) -> R,
    ) -> Result<R, ManagerError> {
        let slot = self
            .slots
            .get_mut(&id)
            .ok_or(ManagerError::NotFound { id })?;
        let actor = slot.actor.as_deref_mut().ok_or(ManagerError::Busy { id })?;
        let result = f(actor);
        if slot.sync() {
            self.sort_by_depth();
        }
        Ok(result)
    }

    pub fn with_actor_mut_as<T: Actor, R>(
        &mut self,
        id: ActorId,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, ManagerError> {
        self.with_actor_mut(id, |actor| {
            actor.as_any_mut().downcast_mut::<T>().map(f)
        })?
        .ok_or(ManagerError::WrongType {
            id,
            expected: type_name::<T>(),
        })
    }

    pub fn set_depth(&mut self, id: ActorId, depth: i32) -> Result<(), ManagerError> {
        self.with_actor_mut(id, |actor| actor.core_mut().set_depth(depth))
    }

    pub fn get_actors_by_type<T: Actor>(&self) -> Vec<&T> {
        self.slots
            .values()
            .filter_map(|slot| slot.actor.as_deref())
            .filter_map(|actor| actor.as_any().downcast_ref::<T>())
            .collect()
    }

    /// First live actor of type `T`, or `None`.
    pub fn get_actor_by_type<T: Actor>(&self) -> Option<&T> {
        self.slots
            .values()
            .filter_map(|slot| slot.actor.as_deref())
            .find_map(|actor| actor.as_any().downcast_ref::<T>())
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn is_removal_queued(&self, id: ActorId) -> bool {
        self.removal_queue.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.slots.keys().copied()
    }

    /// Ids in draw order: ascending depth, insertion order within a depth.
    pub fn draw_order(&self) -> &[ActorId] {
        &self.draw_order
    }

    /// Stable sort by depth. Ids are allocated in insertion order, so walking
    /// the id-ordered map before sorting keeps insertion order for ties.
    pub fn sort_by_depth(&mut self) {
        let mut order: Vec<(i32, ActorId)> = self
            .slots
            .iter()
            .map(|(id, slot)| (slot.depth, *id))
            .collect();
        order.sort_by_key(|(depth, _)| *depth);
        self.draw_order = order.into_iter().map(|(_, id)| id).collect();
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        self.pointer.push(event);
    }

    pub fn pointer_position(&self) -> Option<Vec2> {
        self.pointer.last_position()
    }

    /// Runs one frame for every actor live at the start of the pass, then
    /// applies queued removals. Actors added during the pass first update on
    /// the next frame.
    pub fn update(&mut self, dt: f32) {
        let pointer_events = self.pointer.take_pending();
        let pass: Vec<ActorId> = self.slots.keys().copied().collect();
        for id in pass {
            self.step_actor(id, dt, &pointer_events);
        }

        if self.apply_removals() > 0 {
            self.sort_by_depth();
        }
    }

    pub fn draw(&self, target: &mut dyn RenderTarget) {
        for actor in self.actors_in_draw_order() {
            actor.draw(target);
        }
    }

    pub fn draw_overlay(&self, target: &mut dyn RenderTarget) {
        for actor in self.actors_in_draw_order() {
            actor.draw_overlay(target);
        }
    }

    fn actors_in_draw_order(&self) -> impl Iterator<Item = &dyn Actor> + '_ {
        self.draw_order
            .iter()
            .filter_map(|id| self.slots.get(id))
            .filter_map(|slot| slot.actor.as_deref())
    }

    fn step_actor(&mut self, id: ActorId, dt: f32, pointer_events: &[PointerEvent]) {
        let Some(mut actor) = self.slots.get_mut(&id).and_then(|slot| slot.actor.take()) else {
            return;
        };

        actor.update(dt, &mut ActorContext::new(self, id));
        if actor.core().built_in_motion {
            actor.do_motion(dt);
        }
        actor.core_mut().update_bbox();

        if let Some(step) = actor.core_mut().sprite.update(dt) {
            if !step.is_quiet() {
                actor.on_animation(step, &mut ActorContext::new(self, id));
            }
        }

        let hits = actor
            .core_mut()
            .track_pointer(pointer_events, self.pointer.last_position());
        for hit in hits {
            let mut ctx = ActorContext::new(self, id);
            match hit {
                PointerHit::Entered => actor.on_mouse_entered(&mut ctx),
                PointerHit::Left => actor.on_mouse_left(&mut ctx),
                PointerHit::Clicked(button) => actor.on_clicked(button, &mut ctx),
            }
        }

        self.restore(id, actor);
    }

    fn restore(&mut self, id: ActorId, actor: Box<dyn Actor>) {
        let Some(slot) = self.slots.get_mut(&id) else {
            return;
        };
        slot.actor = Some(actor);
        if slot.sync() {
            self.sort_by_depth();
        }
    }

    /// Drains the removal queue, including removals queued by `on_removed`
    /// hooks. Returns how many actors were removed.
    fn apply_removals(&mut self) -> usize {
        let mut removed = 0;
        while !self.removal_queue.is_empty() {
            let queue = std::mem::take(&mut self.removal_queue);
            for id in queue {
                let Some(slot) = self.slots.remove(&id) else {
                    continue;
                };
                let Some(mut actor) = slot.actor else {
                    continue;
                };
                actor.on_removed(&mut ActorContext::new(self, id));
                actor.core_mut().detach();
                debug!(id = %id, name = actor.core().name(), "actor_removed");
                removed += 1;
            }
        }
        removed
    }
}

/// Handle passed to actor callbacks. It is the actor's only route to the
/// manager, and only exposes operations that are safe mid-pass.
pub struct ActorContext<'a> {
    manager: &'a mut ActorManager,
    actor_id: ActorId,
}

impl<'a> ActorContext<'a> {
    pub(crate) fn new(manager: &'a mut ActorManager, actor_id: ActorId) -> Self {
        Self { manager, actor_id }
    }

    pub fn actor_id(&self) -> ActorId {
        self.actor_id
    }

    pub fn add<A: Actor>(&mut self, actor: A) -> ActorId {
        self.manager.add(actor)
    }

    pub fn add_boxed(&mut self, actor: Box<dyn Actor>) -> ActorId {
        self.manager.add_boxed(actor)
    }

    pub fn remove(&mut self, id: ActorId) -> bool {
        self.manager.remove(id)
    }

    pub fn remove_self(&mut self) -> bool {
        self.manager.remove(self.actor_id)
    }

    pub fn remove_all<T: Actor>(&mut self) -> usize {
        self.manager.remove_all::<T>()
    }

    pub fn clear_non_persistent(&mut self) -> usize {
        self.manager.clear_non_persistent()
    }

    /// Other actors only; the calling actor reports [`ManagerError::Busy`].
    pub fn get(&self, id: ActorId) -> Result<&dyn Actor, ManagerError> {
        self.manager.get(id)
    }

    pub fn get_as<T: Actor>(&self, id: ActorId) -> Result<&T, ManagerError> {
        self.manager.get_as(id)
    }

    pub fn with_actor_mut<R>(
        &mut self,
        id: ActorId,
        f: impl FnOnce(&mut dyn Actor) -> R,
    ) -> Result<R, ManagerError> {
        self.manager.with_actor_mut(id, f)
    }

    pub fn get_actors_by_type<T: Actor>(&self) -> Vec<&T> {
        self.manager.get_actors_by_type()
    }

    pub fn get_actor_by_type<T: Actor>(&self) -> Option<&T> {
        self.manager.get_actor_by_type()
    }

    pub fn pointer_position(&self) -> Option<Vec2> {
        self.manager.pointer_position()
    }

    pub fn actor_count(&self) -> usize {
        self.manager.len()
    }
}
