//! Browser front end for the book list.
//!
//! On page ready, fetches `/books`, renders one draggable item per record into
//! `#book-list`, and wires drag-and-drop so the user can reorder the list.
//! Ordering and marker rules live in [`client_core`]; this crate only moves
//! DOM nodes and CSS classes to match.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use client_core::{
    load_into, loader::BOOKS_PATH, shelf::CONTAINER_ID, BookPage, DragEvent, DropOutcome,
    LoadOutcome, ShelfEvent, Subscription,
};
use gloo::events::EventListener;
use tracing::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element};

mod dom;
mod listeners;
mod source;

pub use source::FetchBookSource;

pub(crate) struct App {
    document: Document,
    container: Element,
    page: Rc<RefCell<BookPage>>,
    elements: Vec<Element>,
    listeners: Vec<EventListener>,
    _events: Subscription,
}

thread_local! {
    static APP: RefCell<Option<Rc<RefCell<App>>>> = const { RefCell::new(None) };
}

/// Module entry point, run by the generated JS glue once the wasm is loaded.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        error!("no document available; nothing to render into");
        return;
    };

    if document.ready_state() == "loading" {
        let ready = document.clone();
        EventListener::once(&document, "DOMContentLoaded", move |_| boot(ready)).forget();
    } else {
        boot(document);
    }
}

/// Runs the loader again, replacing every item and its listeners.
#[wasm_bindgen]
pub fn reload_books() {
    match APP.with(|slot| slot.borrow().clone()) {
        Some(app) => wasm_bindgen_futures::spawn_local(load(app)),
        None => warn!("reload requested before the page finished booting"),
    }
}

fn boot(document: Document) {
    let Some(container) = document.get_element_by_id(CONTAINER_ID) else {
        error!(id = CONTAINER_ID, "book list container is missing from the page");
        return;
    };

    let page = BookPage::new();
    let events = page.subscribe(|event| match event {
        ShelfEvent::Rendered { generation, count } => {
            info!(generation, count, "book list rendered");
        }
        ShelfEvent::LoadFailed { message } => warn!(%message, "book list unavailable"),
        ShelfEvent::Reordered { dragged, after, .. } => {
            debug!(%dragged, %after, "book moved");
        }
    });

    let app = Rc::new(RefCell::new(App {
        document,
        container,
        page: Rc::new(RefCell::new(page)),
        elements: Vec::new(),
        listeners: Vec::new(),
        _events: events,
    }));
    APP.with(|slot| *slot.borrow_mut() = Some(Rc::clone(&app)));
    wasm_bindgen_futures::spawn_local(load(app));
}

async fn load(app: Rc<RefCell<App>>) {
    let page = Rc::clone(&app.borrow().page);
    let source = FetchBookSource::new(BOOKS_PATH);
    if let LoadOutcome::Failed(error) = load_into(&source, &page).await {
        error!(%error, "failed to load books");
    }

    let rebuilt = app.borrow_mut().rebuild(Rc::downgrade(&app));
    if let Err(error) = rebuilt {
        error!(?error, "failed to render book list");
    }
}

impl App {
    fn rebuild(&mut self, handle: Weak<RefCell<App>>) -> Result<(), JsValue> {
        self.listeners.clear();
        let page = self.page.borrow();
        self.elements = dom::render(&self.document, &self.container, page.shelf())?;
        if !self.elements.is_empty() {
            self.listeners =
                listeners::attach(handle, &self.container, &self.elements, page.shelf());
        }
        Ok(())
    }

    fn on_drag(&mut self, event: DragEvent) {
        let mut page = self.page.borrow_mut();
        if let Some(DropOutcome::Moved { from, to, .. }) = page.handle_drag(event) {
            if let Err(error) = dom::move_item(&self.container, &mut self.elements, from, to) {
                error!(?error, from, to, "failed to move book element");
            }
        }
        dom::sync_markers(&self.elements, page.shelf());
    }
}

pub(crate) fn dispatch(app: &Weak<RefCell<App>>, event: DragEvent) {
    let Some(app) = app.upgrade() else {
        return;
    };
    let Ok(mut state) = app.try_borrow_mut() else {
        warn!(?event, "dropping drag event that arrived during a render");
        return;
    };
    state.on_drag(event);
}
