//! Free-text date parsing
//!
//! Book dates are stored as whatever the editor typed ("janvier 2021",
//! "03/2019", "printemps 2020"). We only ever need a year and a month for
//! grouping and recency ordering, and absence of either is a normal outcome.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::collation::fold;

// ASCII word boundaries: a year touching a non-ASCII letter ("é2020") still counts
static YEAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u:\b)(?:19|20)[0-9]{2}(?-u:\b)").expect("year pattern is valid")
});

static NUMERIC_MONTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^0-9])(0?[1-9]|1[0-2])(?:[^0-9]|$)").expect("month pattern is valid")
});

/// Month keywords, already folded (lower-case, no diacritics).
/// Checked in month order; the first keyword contained in the date wins.
const MONTH_KEYWORDS: [(u32, &[&str]); 12] = [
    (1, &["janvier", "jan"]),
    (2, &["fevrier", "fev", "feb"]),
    (3, &["mars", "mar"]),
    (4, &["avril", "avr", "apr"]),
    (5, &["mai", "may"]),
    (6, &["juin", "jun"]),
    (7, &["juillet", "jul"]),
    (8, &["aout", "aug"]),
    (9, &["septembre", "sept", "sep"]),
    (10, &["octobre", "oct"]),
    (11, &["novembre", "nov"]),
    (12, &["decembre", "dec", "dez"]),
];

/// Year and month extracted from a date string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DateParts {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// Extract a 19xx/20xx year standing as its own token
pub fn extract_year(date: Option<&str>) -> Option<i32> {
    let date = date?;
    YEAR_RE
        .find(date)
        .and_then(|m| m.as_str().parse::<i32>().ok())
}

/// Extract a month number (1-12) from keywords, then from a bare number
pub fn extract_month(date: Option<&str>) -> Option<u32> {
    let folded = fold(date?);

    for (month, keywords) in MONTH_KEYWORDS.iter() {
        if keywords.iter().any(|kw| folded.contains(kw)) {
            return Some(*month);
        }
    }

    NUMERIC_MONTH_RE
        .captures(&folded)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|m| (1..=12).contains(m))
}

/// Extract both year and month
pub fn parse_date(date: Option<&str>) -> DateParts {
    DateParts {
        year: extract_year(date),
        month: extract_month(date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_name_and_year() {
        let parts = parse_date(Some("janvier 2021"));
        assert_eq!(parts.year, Some(2021));
        assert_eq!(parts.month, Some(1));
    }

    #[test]
    fn test_year_only() {
        let parts = parse_date(Some("2019"));
        assert_eq!(parts.year, Some(2019));
        assert_eq!(parts.month, None);
    }

    #[test]
    fn test_unrecognized_text() {
        assert_eq!(parse_date(Some("inconnue")), DateParts::default());
        assert_eq!(parse_date(None), DateParts::default());
        assert_eq!(parse_date(Some("")), DateParts::default());
    }

    #[test]
    fn test_year_out_of_range_ignored() {
        assert_eq!(extract_year(Some("1850")), None);
        assert_eq!(extract_year(Some("2150")), None);
        assert_eq!(extract_year(Some("paru en 1999, réédité en 2004")), Some(1999));
    }

    #[test]
    fn test_year_must_be_its_own_token() {
        assert_eq!(extract_year(Some("ISBN 120214")), None);
        assert_eq!(extract_year(Some("12/2014")), Some(2014));
        assert_eq!(extract_year(Some("trad2014")), None);
    }

    #[test]
    fn test_year_next_to_non_ascii_letter() {
        assert_eq!(extract_year(Some("é2020")), Some(2020));
        assert_eq!(extract_year(Some("2021年")), Some(2021));
        assert_eq!(parse_date(Some("parution:été2019")).year, Some(2019));
    }

    #[test]
    fn test_accented_and_unaccented_months() {
        assert_eq!(extract_month(Some("Février 2020")), Some(2));
        assert_eq!(extract_month(Some("fevrier 2020")), Some(2));
        assert_eq!(extract_month(Some("AOÛT 2018")), Some(8));
        assert_eq!(extract_month(Some("décembre 2017")), Some(12));
    }

    #[test]
    fn test_english_abbreviations() {
        assert_eq!(extract_month(Some("Sep 2016")), Some(9));
        assert_eq!(extract_month(Some("May 2016")), Some(5));
        assert_eq!(extract_month(Some("Aug. 2016")), Some(8));
    }

    #[test]
    fn test_numeric_month_fallback() {
        assert_eq!(extract_month(Some("03/2021")), Some(3));
        assert_eq!(extract_month(Some("2021-11")), Some(11));
        assert_eq!(extract_month(Some("1/2020")), Some(1));
    }

    #[test]
    fn test_numeric_month_out_of_range() {
        assert_eq!(extract_month(Some("13/2021")), None);
        assert_eq!(extract_month(Some("00/2021")), None);
        // A year alone never yields a month
        assert_eq!(extract_month(Some("2021")), None);
    }
}
