//! Search filter
//!
//! Plain case-insensitive substring test over the descriptive text fields.
//! No tokenization or ranking; `image_url` is never searched.

use super::record::Book;

/// Fields a search term is matched against
pub const SEARCHABLE_FIELDS: [&str; 6] = [
    "titre",
    "auteur",
    "editeur",
    "genre",
    "date",
    "info_supplementaires",
];

/// Whether `book` matches `term`. A blank term matches everything.
pub fn matches(book: &Book, term: &str) -> bool {
    if term.trim().is_empty() {
        return true;
    }
    let needle = term.to_lowercase();

    SEARCHABLE_FIELDS.iter().any(|field| {
        book.text_field(field)
            .map(|value| value.to_lowercase().contains(&needle))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::normalize_book;
    use serde_json::json;

    fn sample() -> Book {
        normalize_book(&json!({
            "titre": "Cent ans de solitude",
            "auteur": "Gabriel García Márquez",
            "editeur": "Seuil",
            "genre": "Roman",
            "date": "mars 2022",
            "info_supplementaires": "Traduit de l'espagnol",
            "image_url": "https://example.org/couverture-secrete.jpg",
        }))
    }

    #[test]
    fn test_blank_term_matches_everything() {
        assert!(matches(&sample(), ""));
        assert!(matches(&sample(), "   "));
        assert!(matches(&Book::default(), ""));
    }

    #[test]
    fn test_case_insensitive_on_each_field() {
        let book = sample();
        assert!(matches(&book, "SOLITUDE"));
        assert!(matches(&book, "márquez"));
        assert!(matches(&book, "seuil"));
        assert!(matches(&book, "roman"));
        assert!(matches(&book, "2022"));
        assert!(matches(&book, "espagnol"));
    }

    #[test]
    fn test_image_url_not_searched() {
        assert!(!matches(&sample(), "couverture-secrete"));
    }

    #[test]
    fn test_null_fields_skipped() {
        let book = normalize_book(&json!({"titre": "Seul titre"}));
        assert!(matches(&book, "seul"));
        assert!(!matches(&book, "roman"));
    }
}
