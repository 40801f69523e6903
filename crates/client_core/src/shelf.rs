//! The book-list container: one rendered item per book record, in display order.

use shared::domain::{Book, BookId};

/// Element id of the container in the host page.
pub const CONTAINER_ID: &str = "book-list";
pub const ITEM_CLASS: &str = "book-item";
pub const DRAGGING_CLASS: &str = "dragging";
pub const DRAG_OVER_CLASS: &str = "drag-over";
pub const ERROR_CLASS: &str = "book-list-error";
/// Attribute holding the book id on each item element.
pub const ID_ATTRIBUTE: &str = "data-id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedItem {
    book: Book,
    dragging: bool,
    drag_over: bool,
}

impl RenderedItem {
    fn new(book: Book) -> Self {
        Self {
            book,
            dragging: false,
            drag_over: false,
        }
    }

    pub fn id(&self) -> &BookId {
        &self.book.id
    }

    pub fn title(&self) -> &str {
        &self.book.title
    }

    pub fn author(&self) -> &str {
        &self.book.author
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_drag_over(&self) -> bool {
        self.drag_over
    }

    /// CSS classes the item element should carry right now.
    pub fn classes(&self) -> Vec<&'static str> {
        let mut classes = vec![ITEM_CLASS];
        if self.dragging {
            classes.push(DRAGGING_CLASS);
        }
        if self.drag_over {
            classes.push(DRAG_OVER_CLASS);
        }
        classes
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ShelfState {
    /// No load has completed yet.
    #[default]
    Pending,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { from: usize, to: usize },
    /// Same item, or the dragged item already follows the target.
    InPlace,
    NotFound,
}

#[derive(Debug, Clone, Default)]
pub struct Shelf {
    items: Vec<RenderedItem>,
    state: ShelfState,
    generation: u64,
}

impl Shelf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[RenderedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn state(&self) -> &ShelfState {
        &self.state
    }

    /// Bumped on every render or failure; items from older generations are gone.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn order(&self) -> Vec<BookId> {
        self.items.iter().map(|item| item.id().clone()).collect()
    }

    /// Discards every item and recreates one per record, in record order.
    pub fn render(&mut self, books: Vec<Book>) -> u64 {
        self.items = books.into_iter().map(RenderedItem::new).collect();
        self.state = ShelfState::Ready;
        self.generation += 1;
        self.generation
    }

    pub fn fail(&mut self, message: impl Into<String>) -> u64 {
        self.items.clear();
        self.state = ShelfState::Failed(message.into());
        self.generation += 1;
        self.generation
    }

    /// Index of the first item with `id`. Later duplicates are unreachable by id.
    pub fn position_of(&self, id: &BookId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn get(&self, id: &BookId) -> Option<&RenderedItem> {
        self.position_of(id).map(|index| &self.items[index])
    }

    /// Relocates `dragged` to immediately follow `target`. The target keeps its
    /// place relative to every other item.
    pub fn move_after(&mut self, dragged: &BookId, target: &BookId) -> MoveOutcome {
        let (Some(from), Some(target_index)) = (self.position_of(dragged), self.position_of(target))
        else {
            return MoveOutcome::NotFound;
        };
        if from == target_index {
            return MoveOutcome::InPlace;
        }

        let item = self.items.remove(from);
        let target_index = if from < target_index {
            target_index - 1
        } else {
            target_index
        };
        let to = target_index + 1;
        self.items.insert(to, item);

        if from == to {
            MoveOutcome::InPlace
        } else {
            MoveOutcome::Moved { from, to }
        }
    }

    pub fn set_dragging(&mut self, id: &BookId, on: bool) -> bool {
        self.with_item(id, |item| item.dragging = on)
    }

    pub fn set_drag_over(&mut self, id: &BookId, on: bool) -> bool {
        self.with_item(id, |item| item.drag_over = on)
    }

    pub fn clear_dragging(&mut self) {
        self.items.iter_mut().for_each(|item| item.dragging = false);
    }

    pub fn clear_drag_over(&mut self) {
        self.items.iter_mut().for_each(|item| item.drag_over = false);
    }

    fn with_item(&mut self, id: &BookId, f: impl FnOnce(&mut RenderedItem)) -> bool {
        match self.position_of(id) {
            Some(index) => {
                f(&mut self.items[index]);
                true
            }
            None => false,
        }
    }

    /// Inner markup of the container. Text and attribute values are escaped.
    pub fn to_html(&self) -> String {
        if let ShelfState::Failed(message) = &self.state {
            return format!(
                r#"<p class="{ERROR_CLASS}">{}</p>"#,
                escape_html(message)
            );
        }

        let mut html = String::new();
        for item in &self.items {
            html.push_str(&format!(
                r#"<div class="{}" draggable="true" {ID_ATTRIBUTE}="{}"><h2>{}</h2><p>{}</p></div>"#,
                item.classes().join(" "),
                escape_html(item.id().as_str()),
                escape_html(item.title()),
                escape_html(item.author()),
            ));
        }
        html
    }
}

/// Escape special HTML characters for text and double-quoted attribute values.
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
#[path = "tests/shelf_tests.rs"]
mod tests;
