//! Drag-and-drop reordering of the items on a [`Shelf`].

use shared::domain::BookId;
use tracing::{debug, trace};

use crate::shelf::{MoveOutcome, Shelf};

/// State of the current drag gesture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragSession {
    #[default]
    Idle,
    Dragging {
        dragged: BookId,
        over: Option<BookId>,
    },
}

impl DragSession {
    pub fn dragged(&self) -> Option<&BookId> {
        match self {
            Self::Idle => None,
            Self::Dragging { dragged, .. } => Some(dragged),
        }
    }
}

/// Pointer events as seen by the items. `None` targets mean the pointer is
/// over something that is not an item, such as the container background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEvent {
    Start(BookId),
    Over(Option<BookId>),
    Drop(Option<BookId>),
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotAttached,
    NotDragging,
    NoTarget,
    SameItem,
    UnknownItem,
    AlreadyInPlace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Moved {
        dragged: BookId,
        after: BookId,
        from: usize,
        to: usize,
    },
    Ignored(IgnoreReason),
}

/// Owns the drag session for one rendered generation of a shelf.
///
/// [`attach`](ReorderController::attach) runs after every successful load.
/// Events that arrive while detached, or for a shelf generation other than the
/// attached one, are ignored.
#[derive(Debug, Default)]
pub struct ReorderController {
    session: DragSession,
    attached: Option<u64>,
}

impl ReorderController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &DragSession {
        &self.session
    }

    pub fn attached_generation(&self) -> Option<u64> {
        self.attached
    }

    pub fn attach(&mut self, shelf: &Shelf) {
        self.session = DragSession::Idle;
        self.attached = Some(shelf.generation());
        debug!(
            generation = shelf.generation(),
            items = shelf.len(),
            "reorder handlers attached"
        );
    }

    pub fn detach(&mut self) {
        self.session = DragSession::Idle;
        self.attached = None;
    }

    fn is_attached_to(&self, shelf: &Shelf) -> bool {
        self.attached == Some(shelf.generation())
    }

    /// Applies one event. Only [`DragEvent::Drop`] yields an outcome.
    pub fn handle(&mut self, shelf: &mut Shelf, event: &DragEvent) -> Option<DropOutcome> {
        if !self.is_attached_to(shelf) {
            trace!(?event, "ignoring drag event for stale or missing handlers");
            return matches!(event, DragEvent::Drop(_))
                .then_some(DropOutcome::Ignored(IgnoreReason::NotAttached));
        }
        match event {
            DragEvent::Start(id) => {
                self.drag_start(shelf, id);
                None
            }
            DragEvent::Over(target) => {
                self.drag_over(shelf, target.as_ref());
                None
            }
            DragEvent::Drop(target) => Some(self.drop_on(shelf, target.as_ref())),
            DragEvent::End => {
                self.drag_end(shelf);
                None
            }
        }
    }

    fn drag_start(&mut self, shelf: &mut Shelf, id: &BookId) {
        // A previous gesture may have lost its dragend.
        shelf.clear_dragging();
        shelf.clear_drag_over();

        if shelf.set_dragging(id, true) {
            self.session = DragSession::Dragging {
                dragged: id.clone(),
                over: None,
            };
        } else {
            self.session = DragSession::Idle;
        }
    }

    fn drag_over(&mut self, shelf: &mut Shelf, target: Option<&BookId>) {
        let DragSession::Dragging { over, .. } = &mut self.session else {
            return;
        };
        if over.as_ref() == target {
            return;
        }
        if let Some(previous) = over.take() {
            shelf.set_drag_over(&previous, false);
        }
        if let Some(target) = target {
            if shelf.set_drag_over(target, true) {
                *over = Some(target.clone());
            }
        }
    }

    fn drop_on(&mut self, shelf: &mut Shelf, target: Option<&BookId>) -> DropOutcome {
        let outcome = match (&self.session, target) {
            (DragSession::Idle, _) => DropOutcome::Ignored(IgnoreReason::NotDragging),
            (DragSession::Dragging { .. }, None) => DropOutcome::Ignored(IgnoreReason::NoTarget),
            (DragSession::Dragging { dragged, .. }, Some(target)) if dragged == target => {
                DropOutcome::Ignored(IgnoreReason::SameItem)
            }
            (DragSession::Dragging { dragged, .. }, Some(target)) => {
                match shelf.move_after(dragged, target) {
                    MoveOutcome::Moved { from, to } => DropOutcome::Moved {
                        dragged: dragged.clone(),
                        after: target.clone(),
                        from,
                        to,
                    },
                    MoveOutcome::InPlace => DropOutcome::Ignored(IgnoreReason::AlreadyInPlace),
                    MoveOutcome::NotFound => DropOutcome::Ignored(IgnoreReason::UnknownItem),
                }
            }
        };

        shelf.clear_drag_over();
        // The dragging marker stays until dragend, which always follows a drop.
        self.session = DragSession::Idle;
        debug!(?outcome, "drop handled");
        outcome
    }

    fn drag_end(&mut self, shelf: &mut Shelf) {
        shelf.clear_dragging();
        shelf.clear_drag_over();
        self.session = DragSession::Idle;
    }
}

#[cfg(test)]
#[path = "tests/reorder_tests.rs"]
mod tests;
