use shared::domain::{Book, BookId};
use tracing::warn;

use crate::{
    events::{EventHub, Subscription},
    loader::LoadError,
    reorder::{DragEvent, DragSession, DropOutcome, ReorderController},
    shelf::Shelf,
};

/// Notifications for whoever mirrors the shelf onto a screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShelfEvent {
    Rendered { generation: u64, count: usize },
    LoadFailed { message: String },
    Reordered { dragged: BookId, after: BookId, order: Vec<BookId> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Rendered { generation: u64, count: usize },
    Failed(LoadError),
}

/// One page worth of state: the shelf, its reorder controller and listeners.
#[derive(Default)]
pub struct BookPage {
    shelf: Shelf,
    controller: ReorderController,
    events: EventHub<ShelfEvent>,
}

impl BookPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shelf(&self) -> &Shelf {
        &self.shelf
    }

    pub fn session(&self) -> &DragSession {
        self.controller.session()
    }

    pub fn subscribe(&self, handler: impl FnMut(&ShelfEvent) + 'static) -> Subscription {
        self.events.subscribe(handler)
    }

    /// Renders a successful fetch and re-attaches reordering, or shows the error.
    pub fn apply_load(&mut self, result: Result<Vec<Book>, LoadError>) -> LoadOutcome {
        match result {
            Ok(books) => {
                let count = books.len();
                let generation = self.shelf.render(books);
                self.controller.attach(&self.shelf);
                self.events.emit(&ShelfEvent::Rendered { generation, count });
                LoadOutcome::Rendered { generation, count }
            }
            Err(error) => {
                warn!(%error, "book list failed to load");
                self.shelf.fail(error.to_string());
                self.controller.detach();
                self.events.emit(&ShelfEvent::LoadFailed {
                    message: error.to_string(),
                });
                LoadOutcome::Failed(error)
            }
        }
    }

    pub fn handle_drag(&mut self, event: DragEvent) -> Option<DropOutcome> {
        let outcome = self.controller.handle(&mut self.shelf, &event);
        if let Some(DropOutcome::Moved { dragged, after, .. }) = &outcome {
            self.events.emit(&ShelfEvent::Reordered {
                dragged: dragged.clone(),
                after: after.clone(),
                order: self.shelf.order(),
            });
        }
        outcome
    }
}

#[cfg(test)]
#[path = "tests/page_tests.rs"]
mod tests;
