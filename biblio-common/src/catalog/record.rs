//! Book record model, normalization and boundary validation
//!
//! Two entry points exist for untyped JSON:
//! - [`normalize_book`] is lenient and never fails. It is used when reading
//!   stored data, which may predate any validation.
//! - [`NewBook::validate`] and [`BookPatch::validate`] are strict and reject
//!   malformed payloads before they reach a store.
//!
//! Text field policy: strings pass through; numbers and booleans are coerced
//! to their textual form; arrays and objects are treated as missing when
//! normalizing and rejected when validating.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Optional text fields, in display order
pub const TEXT_FIELDS: [&str; 6] = [
    "auteur",
    "date",
    "editeur",
    "genre",
    "info_supplementaires",
    "image_url",
];

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Book {
    /// Storage identifier (omitted from public listings)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub titre: Option<String>,
    pub auteur: Option<String>,
    pub date: Option<String>,
    pub editeur: Option<String>,
    pub genre: Option<String>,
    pub info_supplementaires: Option<String>,
    pub image_url: Option<String>,
    /// Manual display rank, lower first; `None` sorts after every ranked book
    pub priorite: Option<f64>,
}

impl Book {
    /// Title, if present and not blank
    pub fn title(&self) -> Option<&str> {
        non_blank(self.titre.as_deref())
    }

    /// Author, if present and not blank
    pub fn author(&self) -> Option<&str> {
        non_blank(self.auteur.as_deref())
    }

    /// Last whitespace-separated token of the author, used as a surname
    pub fn surname(&self) -> Option<&str> {
        self.author().and_then(surname_of)
    }

    /// Copy without the storage identifier
    pub fn without_id(mut self) -> Self {
        self.id = None;
        self
    }

    /// Field lookup by its JSON name (text fields only)
    pub fn text_field(&self, name: &str) -> Option<&str> {
        match name {
            "titre" => self.titre.as_deref(),
            "auteur" => self.auteur.as_deref(),
            "date" => self.date.as_deref(),
            "editeur" => self.editeur.as_deref(),
            "genre" => self.genre.as_deref(),
            "info_supplementaires" => self.info_supplementaires.as_deref(),
            "image_url" => self.image_url.as_deref(),
            _ => None,
        }
    }

    fn text_field_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            "titre" => Some(&mut self.titre),
            "auteur" => Some(&mut self.auteur),
            "date" => Some(&mut self.date),
            "editeur" => Some(&mut self.editeur),
            "genre" => Some(&mut self.genre),
            "info_supplementaires" => Some(&mut self.info_supplementaires),
            "image_url" => Some(&mut self.image_url),
            _ => None,
        }
    }
}

/// Surname proxy: the last whitespace-separated token
pub fn surname_of(author: &str) -> Option<&str> {
    author.split_whitespace().last()
}

pub(crate) fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

// ========================================
// Lenient normalization
// ========================================

/// Normalize a priority value
///
/// - null / missing -> `None`
/// - finite number -> itself (no clamping: negative and fractional kept)
/// - string -> trimmed and parsed; empty or non-numeric -> `None`
/// - anything else -> `None`
pub fn normalize_priority(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => parse_priority_str(s),
        _ => None,
    }
}

fn parse_priority_str(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Coerce arbitrary JSON into a book record, defaulting every missing or
/// unusable field to `None`
pub fn normalize_book(value: &Value) -> Book {
    let field = |name: &str| value.get(name).and_then(scalar_text);

    Book {
        id: value.get("id").and_then(Value::as_i64),
        titre: field("titre"),
        auteur: field("auteur"),
        date: field("date"),
        editeur: field("editeur"),
        genre: field("genre"),
        info_supplementaires: field("info_supplementaires"),
        image_url: field("image_url"),
        priorite: value.get("priorite").and_then(normalize_priority),
    }
}

// ========================================
// Strict boundary validation
// ========================================

/// Outcome of validating an untyped payload
#[derive(Debug, Clone, PartialEq)]
pub enum Validated<T> {
    /// Payload is well-formed
    Valid(T),
    /// Payload rejected, with one message per problem
    Rejected(Vec<String>),
}

impl<T> Validated<T> {
    /// Convert into a `Result`, joining rejection messages
    pub fn into_result(self) -> crate::Result<T> {
        match self {
            Validated::Valid(v) => Ok(v),
            Validated::Rejected(reasons) => Err(crate::Error::InvalidInput(reasons.join("; "))),
        }
    }
}

/// A book ready to be inserted (title guaranteed non-blank)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewBook {
    pub titre: String,
    pub auteur: Option<String>,
    pub date: Option<String>,
    pub editeur: Option<String>,
    pub genre: Option<String>,
    pub info_supplementaires: Option<String>,
    pub image_url: Option<String>,
    pub priorite: Option<f64>,
}

impl NewBook {
    /// Build from a normalized record; `None` when the title is blank
    pub fn from_book(book: Book) -> Option<Self> {
        let titre = book.title()?.to_string();
        Some(Self {
            titre,
            auteur: book.auteur,
            date: book.date,
            editeur: book.editeur,
            genre: book.genre,
            info_supplementaires: book.info_supplementaires,
            image_url: book.image_url,
            priorite: book.priorite,
        })
    }

    /// Validate a create payload: object with a non-blank `titre`
    pub fn validate(value: &Value) -> Validated<NewBook> {
        let Some(obj) = value.as_object() else {
            return Validated::Rejected(vec!["payload must be a JSON object".to_string()]);
        };

        let mut errors = Vec::new();
        let patch = collect_patch(obj, &mut errors);

        let titre = match patch.titre.clone() {
            Some(t) => Some(t),
            None => {
                errors.push("titre is required".to_string());
                None
            }
        };

        match titre {
            Some(titre) if errors.is_empty() => {
                let mut book = Book {
                    titre: Some(titre.clone()),
                    ..Book::default()
                };
                patch.apply(&mut book);
                Validated::Valid(NewBook {
                    titre,
                    auteur: book.auteur,
                    date: book.date,
                    editeur: book.editeur,
                    genre: book.genre,
                    info_supplementaires: book.info_supplementaires,
                    image_url: book.image_url,
                    priorite: book.priorite,
                })
            }
            _ => Validated::Rejected(errors),
        }
    }

    /// Record form of this book, without identifier
    pub fn into_book(self) -> Book {
        Book {
            id: None,
            titre: Some(self.titre),
            auteur: self.auteur,
            date: self.date,
            editeur: self.editeur,
            genre: self.genre,
            info_supplementaires: self.info_supplementaires,
            image_url: self.image_url,
            priorite: self.priorite,
        }
    }
}

/// Partial update. Outer `None` leaves a field untouched; `Some(None)`
/// clears it. The title can be replaced but never cleared.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BookPatch {
    pub titre: Option<String>,
    pub auteur: Option<Option<String>>,
    pub date: Option<Option<String>>,
    pub editeur: Option<Option<String>>,
    pub genre: Option<Option<String>>,
    pub info_supplementaires: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
    pub priorite: Option<Option<f64>>,
}

impl BookPatch {
    /// Validate an update payload
    pub fn validate(value: &Value) -> Validated<BookPatch> {
        let Some(obj) = value.as_object() else {
            return Validated::Rejected(vec!["payload must be a JSON object".to_string()]);
        };

        let mut errors = Vec::new();
        let patch = collect_patch(obj, &mut errors);

        if obj.contains_key("titre") && patch.titre.is_none() {
            errors.push("titre cannot be empty".to_string());
        }

        if errors.is_empty() {
            Validated::Valid(patch)
        } else {
            Validated::Rejected(errors)
        }
    }

    /// Apply to an existing record in place
    pub fn apply(&self, book: &mut Book) {
        if let Some(titre) = &self.titre {
            book.titre = Some(titre.clone());
        }
        for (name, update) in self.text_updates() {
            if let (Some(value), Some(slot)) = (update, book.text_field_mut(name)) {
                *slot = value.clone();
            }
        }
        if let Some(priorite) = self.priorite {
            book.priorite = priorite;
        }
    }

    /// True when nothing would change
    pub fn is_empty(&self) -> bool {
        self.titre.is_none()
            && self.priorite.is_none()
            && self.text_updates().iter().all(|(_, u)| u.is_none())
    }

    fn text_updates(&self) -> [(&'static str, Option<&Option<String>>); 6] {
        [
            ("auteur", self.auteur.as_ref()),
            ("date", self.date.as_ref()),
            ("editeur", self.editeur.as_ref()),
            ("genre", self.genre.as_ref()),
            ("info_supplementaires", self.info_supplementaires.as_ref()),
            ("image_url", self.image_url.as_ref()),
        ]
    }

    fn slot(&mut self, name: &str) -> Option<&mut Option<Option<String>>> {
        match name {
            "auteur" => Some(&mut self.auteur),
            "date" => Some(&mut self.date),
            "editeur" => Some(&mut self.editeur),
            "genre" => Some(&mut self.genre),
            "info_supplementaires" => Some(&mut self.info_supplementaires),
            "image_url" => Some(&mut self.image_url),
            _ => None,
        }
    }
}

/// Strict text coercion: blank strings become `None`, containers are errors
fn strict_text(name: &str, value: &Value, errors: &mut Vec<String>) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Array(_) | Value::Object(_) => {
            errors.push(format!("{} must be text", name));
            None
        }
        other => scalar_text(other).filter(|s| !s.trim().is_empty()),
    }
}

fn collect_patch(obj: &Map<String, Value>, errors: &mut Vec<String>) -> BookPatch {
    let mut patch = BookPatch::default();

    if let Some(value) = obj.get("titre") {
        patch.titre = strict_text("titre", value, errors).map(|t| t.trim().to_string());
    }

    for name in TEXT_FIELDS {
        if let Some(value) = obj.get(name) {
            let text = strict_text(name, value, errors);
            if let Some(slot) = patch.slot(name) {
                *slot = Some(text);
            }
        }
    }

    if let Some(value) = obj.get("priorite") {
        let priorite = match value {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::Number(_) | Value::String(_) => {
                let parsed = normalize_priority(value);
                if parsed.is_none() {
                    errors.push("priorite must be a number".to_string());
                }
                parsed
            }
            _ => {
                errors.push("priorite must be a number".to_string());
                None
            }
        };
        patch.priorite = Some(priorite);
    }

    patch
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_priority_normalization() {
        assert_eq!(normalize_priority(&json!("")), None);
        assert_eq!(normalize_priority(&json!("   ")), None);
        assert_eq!(normalize_priority(&Value::Null), None);
        assert_eq!(normalize_priority(&json!("abc")), None);
        assert_eq!(normalize_priority(&json!("3")), Some(3.0));
        assert_eq!(normalize_priority(&json!(" 7 ")), Some(7.0));
        assert_eq!(normalize_priority(&json!(3.5)), Some(3.5));
        assert_eq!(normalize_priority(&json!(-1)), Some(-1.0));
        assert_eq!(normalize_priority(&json!(true)), None);
        assert_eq!(normalize_priority(&json!([1])), None);
    }

    #[test]
    fn test_priority_missing_field() {
        let book = normalize_book(&json!({"titre": "A"}));
        assert_eq!(book.priorite, None);
    }

    #[test]
    fn test_normalize_defaults_missing_fields() {
        let book = normalize_book(&json!({"titre": "Le Horla", "priorite": "2"}));
        assert_eq!(book.titre.as_deref(), Some("Le Horla"));
        assert_eq!(book.auteur, None);
        assert_eq!(book.genre, None);
        assert_eq!(book.image_url, None);
        assert_eq!(book.priorite, Some(2.0));
        assert_eq!(book.id, None);
    }

    #[test]
    fn test_normalize_non_object() {
        assert_eq!(normalize_book(&json!("chaine")), Book::default());
        assert_eq!(normalize_book(&Value::Null), Book::default());
    }

    #[test]
    fn test_normalize_coerces_scalars_drops_containers() {
        let book = normalize_book(&json!({
            "titre": "T",
            "genre": 42,
            "editeur": ["a", "b"],
            "auteur": {"nom": "x"},
        }));
        assert_eq!(book.genre.as_deref(), Some("42"));
        assert_eq!(book.editeur, None);
        assert_eq!(book.auteur, None);
    }

    #[test]
    fn test_surname_proxy() {
        let book = normalize_book(&json!({"titre": "T", "auteur": "Gabriel García Márquez"}));
        assert_eq!(book.surname(), Some("Márquez"));

        let blank = normalize_book(&json!({"titre": "T", "auteur": "   "}));
        assert_eq!(blank.author(), None);
        assert_eq!(blank.surname(), None);
    }

    #[test]
    fn test_validate_new_requires_title() {
        match NewBook::validate(&json!({"auteur": "X"})) {
            Validated::Rejected(reasons) => {
                assert!(reasons.iter().any(|r| r.contains("titre")));
            }
            Validated::Valid(_) => panic!("missing title should be rejected"),
        }

        assert!(matches!(
            NewBook::validate(&json!({"titre": "   "})),
            Validated::Rejected(_)
        ));
        assert!(matches!(NewBook::validate(&json!([1, 2])), Validated::Rejected(_)));
    }

    #[test]
    fn test_validate_new_accepts_and_cleans() {
        let valid = NewBook::validate(&json!({
            "titre": "  Bartleby ",
            "auteur": "Herman Melville",
            "genre": "",
            "priorite": "4",
        }));
        let Validated::Valid(book) = valid else {
            panic!("expected valid payload");
        };
        assert_eq!(book.titre, "Bartleby");
        assert_eq!(book.auteur.as_deref(), Some("Herman Melville"));
        assert_eq!(book.genre, None);
        assert_eq!(book.priorite, Some(4.0));
    }

    #[test]
    fn test_validate_rejects_bad_priority_and_containers() {
        let rejected = NewBook::validate(&json!({
            "titre": "T",
            "priorite": "haute",
            "genre": ["roman"],
        }));
        let Validated::Rejected(reasons) = rejected else {
            panic!("expected rejection");
        };
        assert_eq!(reasons.len(), 2);
    }

    #[test]
    fn test_patch_partial_apply() {
        let mut book = normalize_book(&json!({
            "id": 7,
            "titre": "Ancien",
            "auteur": "A",
            "genre": "Roman",
            "priorite": 1,
        }));

        let Validated::Valid(patch) =
            BookPatch::validate(&json!({"titre": "Nouveau", "genre": null}))
        else {
            panic!("expected valid patch");
        };
        patch.apply(&mut book);

        assert_eq!(book.id, Some(7));
        assert_eq!(book.titre.as_deref(), Some("Nouveau"));
        assert_eq!(book.auteur.as_deref(), Some("A"));
        assert_eq!(book.genre, None);
        assert_eq!(book.priorite, Some(1.0));
    }

    #[test]
    fn test_patch_cannot_clear_title() {
        assert!(matches!(
            BookPatch::validate(&json!({"titre": ""})),
            Validated::Rejected(_)
        ));
        assert!(matches!(
            BookPatch::validate(&json!({"auteur": "X"})),
            Validated::Valid(_)
        ));
    }

    #[test]
    fn test_empty_patch() {
        let Validated::Valid(patch) = BookPatch::validate(&json!({})) else {
            panic!("empty object is a valid patch");
        };
        assert!(patch.is_empty());
    }
}
