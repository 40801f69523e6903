//! Page logic for the book list: loading records, the container model the
//! page renders from, and drag-and-drop reordering.
//!
//! Nothing here touches a real DOM. The browser binding feeds DOM events in
//! as [`DragEvent`]s and mirrors the resulting [`Shelf`] back onto elements,
//! which keeps every ordering and marker rule testable on the host.

pub mod events;
#[cfg(feature = "http")]
pub mod http;
pub mod loader;
pub mod page;
pub mod reorder;
pub mod shelf;

pub use events::{EventHub, Subscription};
#[cfg(feature = "http")]
pub use http::{BookClient, ClientError};
pub use loader::{load_into, parse_books, BookSource, LoadError};
pub use page::{BookPage, LoadOutcome, ShelfEvent};
pub use reorder::{DragEvent, DragSession, DropOutcome, IgnoreReason, ReorderController};
pub use shelf::{MoveOutcome, RenderedItem, Shelf, ShelfState};
