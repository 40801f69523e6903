use super::*;
use client_core::{
    shelf::{DRAGGING_CLASS, DRAG_OVER_CLASS, ITEM_CLASS},
    BookPage, DragEvent, DropOutcome,
};
use shared::domain::{Book, BookId};

fn page_with(ids: &[&str]) -> BookPage {
    let mut page = BookPage::new();
    let books = ids
        .iter()
        .map(|id| Book::new(*id, format!("T{id}"), format!("A{id}")))
        .collect();
    page.apply_load(Ok(books));
    page
}

fn drop_onto(page: &mut BookPage, dragged: &str, target: &str) -> Option<DropOutcome> {
    page.handle_drag(DragEvent::Start(BookId::new(dragged)));
    page.handle_drag(DragEvent::Over(Some(BookId::new(target))));
    let outcome = page.handle_drag(DragEvent::Drop(Some(BookId::new(target))));
    page.handle_drag(DragEvent::End);
    outcome
}

#[test]
fn relocating_elements_mirrors_every_shelf_move() {
    let ids = ["1", "2", "3", "4"];
    for dragged in ids {
        for target in ids {
            let mut page = page_with(&ids);
            let mut mirror = page.shelf().order();

            if let Some(DropOutcome::Moved { from, to, .. }) = drop_onto(&mut page, dragged, target)
            {
                let placement = relocate(&mut mirror, from, to).expect("indices in range");
                assert_eq!(mirror[placement.index], BookId::new(dragged));
                match placement.before {
                    Some(next) => assert_eq!(next, placement.index + 1),
                    None => assert_eq!(placement.index, mirror.len() - 1),
                }
            }

            assert_eq!(mirror, page.shelf().order(), "drag {dragged} onto {target}");
        }
    }
}

#[test]
fn dropping_first_onto_last_appends() {
    let mut page = page_with(&["1", "2", "3"]);
    let mut mirror = page.shelf().order();

    let Some(DropOutcome::Moved { from, to, .. }) = drop_onto(&mut page, "1", "3") else {
        panic!("expected a move");
    };
    let placement = relocate(&mut mirror, from, to).expect("indices in range");

    assert_eq!(placement, Placement { index: 2, before: None });
    assert_eq!(mirror, vec![BookId::new("2"), BookId::new("3"), BookId::new("1")]);
}

#[test]
fn out_of_range_move_leaves_elements_alone() {
    let mut items = vec!["a", "b"];
    assert_eq!(relocate(&mut items, 0, 2), None);
    assert_eq!(relocate(&mut items, 5, 0), None);
    assert_eq!(items, vec!["a", "b"]);
}

#[test]
fn class_updates_follow_markers_by_position() {
    let mut page = page_with(&["1", "2", "3"]);
    let rendered = vec![ITEM_CLASS.to_string(); 3];

    page.handle_drag(DragEvent::Start(BookId::new("1")));
    page.handle_drag(DragEvent::Over(Some(BookId::new("3"))));

    let updates = class_updates(rendered.clone(), page.shelf());
    assert_eq!(
        updates,
        vec![
            (0, format!("{ITEM_CLASS} {DRAGGING_CLASS}")),
            (2, format!("{ITEM_CLASS} {DRAG_OVER_CLASS}")),
        ]
    );

    page.handle_drag(DragEvent::End);
    assert!(class_updates(rendered, page.shelf()).is_empty());
}
