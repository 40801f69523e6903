use serde::{Deserialize, Serialize};

use crate::domain::{Book, BookId};

/// Body of `POST /books`. A missing id is assigned by the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBook {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BookId>,
    pub title: String,
    #[serde(default)]
    pub author: String,
}

impl NewBook {
    pub fn into_book(self) -> Book {
        Book {
            id: self.id.filter(|id| !id.is_empty()).unwrap_or_else(BookId::generate),
            title: self.title,
            author: self.author,
        }
    }
}

/// Body of `PUT /books/:id`. The id in the path always wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookUpdate {
    pub title: String,
    #[serde(default)]
    pub author: String,
}

impl BookUpdate {
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_book_without_id_gets_one_assigned() {
        let book = NewBook {
            id: None,
            title: "Dune".into(),
            author: "Frank Herbert".into(),
        }
        .into_book();
        assert!(!book.id.is_empty());
        assert_eq!(book.title, "Dune");
    }

    #[test]
    fn blank_id_is_treated_as_missing() {
        let book = NewBook {
            id: Some(BookId::new("")),
            title: "Dune".into(),
            author: String::new(),
        }
        .into_book();
        assert!(!book.id.is_empty());
    }
}
