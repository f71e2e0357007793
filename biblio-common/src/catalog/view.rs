//! Grouped and sorted catalog views
//!
//! A view is a pure function of (records, search term, mode). Only records
//! with a non-blank title that pass the search filter are shown, and every
//! shown record lands in exactly one bucket.
//!
//! Ordering rules:
//! - priority view: priority asc, surname asc, author asc, title asc
//! - genre / editor / author buckets: year desc, month desc, priority asc,
//!   title asc
//! - date buckets: month desc, priority asc, title asc
//!
//! Missing values always sort last.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use super::collation::compare;
use super::date::{parse_date, DateParts};
use super::record::{non_blank, surname_of, Book};
use super::search::matches;

/// Bucket for books without a genre
pub const NO_GENRE: &str = "Non classé";
/// Bucket for books without a publisher or author
pub const NOT_SPECIFIED: &str = "Non spécifié";
/// Bucket for books without a recognizable year
pub const NO_DATE: &str = "Sans date";

/// Default span of the recent releases view, in years
pub const RECENT_YEARS: u32 = 5;

/// Available catalog views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Flat list ordered by manual priority
    #[default]
    Priorite,
    Genre,
    Editeur,
    Auteur,
    Date,
}

impl ViewMode {
    /// Parse a view name; unknown names fall back to the priority view
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "genre" => ViewMode::Genre,
            "editeur" | "éditeur" => ViewMode::Editeur,
            "auteur" => ViewMode::Auteur,
            "date" => ViewMode::Date,
            _ => ViewMode::Priorite,
        }
    }
}

/// A named group of books sharing a grouping key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub key: String,
    pub books: Vec<Book>,
}

/// Result of [`build_view`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CatalogView {
    /// Priority-ordered list
    Flat { books: Vec<Book> },
    /// Buckets in display order
    Grouped { mode: ViewMode, buckets: Vec<Bucket> },
}

impl CatalogView {
    /// Number of books across the whole view
    pub fn len(&self) -> usize {
        match self {
            CatalogView::Flat { books } => books.len(),
            CatalogView::Grouped { buckets, .. } => buckets.iter().map(|b| b.books.len()).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Buckets of a grouped view (empty for the flat view)
    pub fn buckets(&self) -> &[Bucket] {
        match self {
            CatalogView::Flat { .. } => &[],
            CatalogView::Grouped { buckets, .. } => buckets,
        }
    }
}

/// A shown book with its parsed date
#[derive(Debug, Clone)]
struct Entry {
    book: Book,
    date: DateParts,
}

impl Entry {
    fn new(book: Book) -> Self {
        let date = parse_date(book.date.as_deref());
        Self { book, date }
    }

    fn title(&self) -> &str {
        self.book.titre.as_deref().unwrap_or_default()
    }
}

/// Records that are shown for `term`: non-blank title and matching the filter
pub fn visible_books(records: &[Book], term: &str) -> Vec<Book> {
    records
        .iter()
        .filter(|book| book.title().is_some())
        .filter(|book| matches(book, term))
        .cloned()
        .collect()
}

/// Build the view selected by `mode`
pub fn build_view(records: &[Book], term: &str, mode: ViewMode) -> CatalogView {
    let entries: Vec<Entry> = visible_books(records, term)
        .into_iter()
        .map(Entry::new)
        .collect();

    match mode {
        ViewMode::Priorite => {
            let mut entries = entries;
            entries.sort_by(cmp_priority_view);
            CatalogView::Flat {
                books: entries.into_iter().map(|e| e.book).collect(),
            }
        }
        ViewMode::Genre => grouped(mode, entries, |b| {
            non_blank(b.genre.as_deref()).unwrap_or(NO_GENRE).to_string()
        }),
        ViewMode::Editeur => grouped(mode, entries, |b| {
            non_blank(b.editeur.as_deref()).unwrap_or(NOT_SPECIFIED).to_string()
        }),
        ViewMode::Auteur => grouped(mode, entries, |b| {
            b.author().unwrap_or(NOT_SPECIFIED).to_string()
        }),
        ViewMode::Date => by_year(entries),
    }
}

/// Books from the last `years` years (current year included), newest first
///
/// Undated books are left out. Within a year: month desc, then title.
pub fn recent_releases(records: &[Book], current_year: i32, years: u32) -> Vec<Bucket> {
    let span = i32::try_from(years.max(1)).unwrap_or(i32::MAX);
    let oldest = current_year.saturating_sub(span - 1);

    let mut entries: Vec<Entry> = visible_books(records, "")
        .into_iter()
        .map(Entry::new)
        .filter(|e| e.date.year.is_some_and(|y| y >= oldest))
        .collect();

    entries.sort_by(|a, b| {
        desc_none_last(a.date.year, b.date.year)
            .then_with(|| desc_none_last(a.date.month, b.date.month))
            .then_with(|| compare(a.title(), b.title()))
    });

    let mut buckets: Vec<Bucket> = Vec::new();
    for entry in entries {
        let key = entry.date.year.map(|y| y.to_string()).unwrap_or_default();
        match buckets.last_mut() {
            Some(last) if last.key == key => last.books.push(entry.book),
            _ => buckets.push(Bucket {
                key,
                books: vec![entry.book],
            }),
        }
    }
    buckets
}

fn grouped<F>(mode: ViewMode, entries: Vec<Entry>, key_of: F) -> CatalogView
where
    F: Fn(&Book) -> String,
{
    let mut groups: HashMap<String, Vec<Entry>> = HashMap::new();
    for entry in entries {
        groups.entry(key_of(&entry.book)).or_default().push(entry);
    }

    let mut keyed: Vec<(String, Vec<Entry>)> = groups.into_iter().collect();
    if mode == ViewMode::Auteur {
        keyed.sort_by(|(a, _), (b, _)| cmp_author_bucket(a, b));
    } else {
        keyed.sort_by(|(a, _), (b, _)| compare(a, b));
    }

    let buckets = keyed
        .into_iter()
        .map(|(key, mut entries)| {
            entries.sort_by(cmp_recency);
            Bucket {
                key,
                books: entries.into_iter().map(|e| e.book).collect(),
            }
        })
        .collect();

    CatalogView::Grouped { mode, buckets }
}

fn by_year(entries: Vec<Entry>) -> CatalogView {
    let mut groups: HashMap<Option<i32>, Vec<Entry>> = HashMap::new();
    for entry in entries {
        groups.entry(entry.date.year).or_default().push(entry);
    }

    let mut keyed: Vec<(Option<i32>, Vec<Entry>)> = groups.into_iter().collect();
    keyed.sort_by(|(a, _), (b, _)| desc_none_last(*a, *b));

    let buckets = keyed
        .into_iter()
        .map(|(year, mut entries)| {
            entries.sort_by(|a, b| {
                desc_none_last(a.date.month, b.date.month)
                    .then_with(|| asc_priority(a.book.priorite, b.book.priorite))
                    .then_with(|| compare(a.title(), b.title()))
            });
            Bucket {
                key: year.map(|y| y.to_string()).unwrap_or_else(|| NO_DATE.to_string()),
                books: entries.into_iter().map(|e| e.book).collect(),
            }
        })
        .collect();

    CatalogView::Grouped {
        mode: ViewMode::Date,
        buckets,
    }
}

// ========================================
// Comparators
// ========================================

fn cmp_priority_view(a: &Entry, b: &Entry) -> Ordering {
    asc_priority(a.book.priorite, b.book.priorite)
        .then_with(|| asc_text_none_last(a.book.surname(), b.book.surname()))
        .then_with(|| asc_text_none_last(a.book.author(), b.book.author()))
        .then_with(|| compare(a.title(), b.title()))
}

fn cmp_recency(a: &Entry, b: &Entry) -> Ordering {
    desc_none_last(a.date.year, b.date.year)
        .then_with(|| desc_none_last(a.date.month, b.date.month))
        .then_with(|| asc_priority(a.book.priorite, b.book.priorite))
        .then_with(|| compare(a.title(), b.title()))
}

/// Author buckets: surname, then full name; the unnamed bucket goes last
fn cmp_author_bucket(a: &str, b: &str) -> Ordering {
    match (a == NOT_SPECIFIED, b == NOT_SPECIFIED) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => asc_text_none_last(surname_of(a), surname_of(b))
            .then_with(|| compare(a, b)),
    }
}

fn asc_priority(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn asc_text_none_last(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => compare(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn desc_none_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
