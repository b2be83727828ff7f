use crate::geometry::{Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Pointer input, already expressed in the coordinate space of actor bboxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Moved(Vec2),
    Released { position: Vec2, button: MouseButton },
    /// The pointer left the window.
    Exited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerHit {
    Entered,
    Left,
    Clicked(MouseButton),
}

/// Pointer state owned by the actor manager. Events are buffered for one
/// update pass; the last known position persists across frames.
#[derive(Debug, Clone, Default)]
pub(crate) struct PointerState {
    last_position: Option<Vec2>,
    pending: Vec<PointerEvent>,
}

impl PointerState {
    pub(crate) fn push(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Moved(position) | PointerEvent::Released { position, .. } => {
                self.last_position = Some(position);
            }
            PointerEvent::Exited => self.last_position = None,
        }
        self.pending.push(event);
    }

    pub(crate) fn last_position(&self) -> Option<Vec2> {
        self.last_position
    }

    /// Hands the buffered events to the current pass.
    pub(crate) fn take_pending(&mut self) -> Vec<PointerEvent> {
        std::mem::take(&mut self.pending)
    }
}

/// Replays this frame's pointer events against `bbox`, then re-tests the last
/// known position so an actor moving under a still pointer is noticed.
/// `mouse_over` carries hover state between frames; enter and leave only fire
/// on transitions.
pub(crate) fn track_pointer(
    bbox: Rect,
    mouse_over: &mut bool,
    events: &[PointerEvent],
    last_position: Option<Vec2>,
) -> Vec<PointerHit> {
    let mut hits = Vec::new();
    let mut set_hover = |inside: bool, hits: &mut Vec<PointerHit>| {
        if inside != *mouse_over {
            *mouse_over = inside;
            hits.push(if inside {
                PointerHit::Entered
            } else {
                PointerHit::Left
            });
        }
    };

    for event in events {
        match *event {
            PointerEvent::Moved(position) => set_hover(bbox.hit_test(position), &mut hits),
            PointerEvent::Released { position, button } => {
                if bbox.hit_test(position) {
                    hits.push(PointerHit::Clicked(button));
                }
            }
            PointerEvent::Exited => set_hover(false, &mut hits),
        }
    }

    if let Some(position) = last_position {
        set_hover(bbox.hit_test(position), &mut hits);
    }
    hits
}
