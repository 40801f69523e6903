//! Mirrors a [`Shelf`] onto the container element.

use client_core::{
    shelf::{ERROR_CLASS, ID_ATTRIBUTE},
    Shelf, ShelfState,
};
use wasm_bindgen::JsValue;
use web_sys::{Document, Element, Node};

/// Replaces the container's children with one element per shelf item, or with
/// the error message when the shelf failed to load. Returns the item elements
/// in display order.
pub fn render(document: &Document, container: &Element, shelf: &Shelf) -> Result<Vec<Element>, JsValue> {
    container.set_text_content(None);

    if let ShelfState::Failed(message) = shelf.state() {
        let error = document.create_element("p")?;
        error.set_class_name(ERROR_CLASS);
        error.set_text_content(Some(message));
        container.append_child(&error)?;
        return Ok(Vec::new());
    }

    let mut elements = Vec::with_capacity(shelf.len());
    for item in shelf.items() {
        let element = document.create_element("div")?;
        element.set_class_name(&item.classes().join(" "));
        element.set_attribute("draggable", "true")?;
        element.set_attribute(ID_ATTRIBUTE, item.id().as_str())?;

        // Text nodes only: titles and authors are never parsed as markup.
        let heading = document.create_element("h2")?;
        heading.set_text_content(Some(item.title()));
        let author = document.create_element("p")?;
        author.set_text_content(Some(item.author()));

        element.append_child(&heading)?;
        element.append_child(&author)?;
        container.append_child(&element)?;
        elements.push(element);
    }
    Ok(elements)
}

/// Where a relocated element lands: the slot it now occupies and the index of
/// the sibling it sits in front of (`None` when it ends the list).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Placement {
    pub index: usize,
    pub before: Option<usize>,
}

/// Repeats a shelf move on a parallel list: remove at `from`, insert at `to`.
pub(crate) fn relocate<T>(items: &mut Vec<T>, from: usize, to: usize) -> Option<Placement> {
    if from >= items.len() || to >= items.len() {
        return None;
    }
    let item = items.remove(from);
    items.insert(to, item);
    Some(Placement {
        index: to,
        before: (to + 1 < items.len()).then_some(to + 1),
    })
}

/// Applies a model move to `elements` and the DOM.
pub fn move_item(
    container: &Element,
    elements: &mut Vec<Element>,
    from: usize,
    to: usize,
) -> Result<(), JsValue> {
    let Some(placement) = relocate(elements, from, to) else {
        return Ok(());
    };
    let next: Option<&Node> = placement.before.map(|index| &*elements[index]);
    container.insert_before(&elements[placement.index], next)?;
    Ok(())
}

/// Class lists that differ from the shelf, keyed by element index.
pub(crate) fn class_updates<I>(current: I, shelf: &Shelf) -> Vec<(usize, String)>
where
    I: IntoIterator<Item = String>,
{
    current
        .into_iter()
        .zip(shelf.items())
        .enumerate()
        .filter_map(|(index, (have, item))| {
            let want = item.classes().join(" ");
            (have != want).then_some((index, want))
        })
        .collect()
}

pub fn sync_markers(elements: &[Element], shelf: &Shelf) {
    for (index, classes) in class_updates(elements.iter().map(Element::class_name), shelf) {
        elements[index].set_class_name(&classes);
    }
}

#[cfg(test)]
#[path = "tests/dom_tests.rs"]
mod tests;
