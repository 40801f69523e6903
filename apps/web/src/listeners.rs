//! DOM event wiring for drag-and-drop reordering.
//!
//! Every listener is a [`gloo::events::EventListener`], which detaches itself
//! when dropped. The app keeps the current set and replaces it wholesale on
//! reload, so handlers never pile up on an element.

use std::{cell::RefCell, rc::Weak};

use client_core::{DragEvent, Shelf};
use gloo::events::{EventListener, EventListenerOptions};
use shared::domain::BookId;
use tracing::warn;
use wasm_bindgen::JsCast;
use web_sys::{Element, Node};

use crate::App;

/// Drag payload format, matching what other drop targets expect from text drags.
const PAYLOAD_FORMAT: &str = "text/plain";

pub(crate) fn attach(
    app: Weak<RefCell<App>>,
    container: &Element,
    elements: &[Element],
    shelf: &Shelf,
) -> Vec<EventListener> {
    let mut listeners = Vec::with_capacity(elements.len() * 4 + 1);

    for (element, item) in elements.iter().zip(shelf.items()) {
        let id = item.id().clone();

        listeners.push({
            let app = app.clone();
            let id = id.clone();
            EventListener::new(element, "dragstart", move |event| {
                if let Some(transfer) = event
                    .dyn_ref::<web_sys::DragEvent>()
                    .and_then(web_sys::DragEvent::data_transfer)
                {
                    // Firefox refuses to start a drag without a payload.
                    if let Err(error) = transfer.set_data(PAYLOAD_FORMAT, id.as_str()) {
                        warn!(?error, %id, "could not set drag payload");
                    }
                }
                crate::dispatch(&app, DragEvent::Start(id.clone()));
            })
        });

        listeners.push({
            let app = app.clone();
            let id = id.clone();
            EventListener::new_with_options(
                element,
                "dragover",
                EventListenerOptions::enable_prevent_default(),
                move |event| {
                    // Without this the platform rejects the drop.
                    event.prevent_default();
                    crate::dispatch(&app, DragEvent::Over(Some(id.clone())));
                },
            )
        });

        listeners.push({
            let app = app.clone();
            let id: BookId = id.clone();
            EventListener::new_with_options(
                element,
                "drop",
                EventListenerOptions::enable_prevent_default(),
                move |event| {
                    event.prevent_default();
                    crate::dispatch(&app, DragEvent::Drop(Some(id.clone())));
                },
            )
        });

        listeners.push({
            let app = app.clone();
            EventListener::new(element, "dragend", move |_| {
                crate::dispatch(&app, DragEvent::End);
            })
        });
    }

    // Hovering the bare container drops the stale drop-target marker. Default
    // is not prevented here, so the background never accepts a drop.
    listeners.push({
        let background = container.clone();
        EventListener::new(container, "dragover", move |event| {
            let on_background = event
                .target()
                .and_then(|target| target.dyn_into::<Node>().ok())
                .is_some_and(|node| background.is_same_node(Some(&node)));
            if on_background {
                crate::dispatch(&app, DragEvent::Over(None));
            }
        })
    });

    listeners
}
