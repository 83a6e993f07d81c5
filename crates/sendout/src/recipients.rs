//! Recipient parsing and normalization.
//!
//! Phone numbers arrive from a free-text box (one per line, commas and
//! semicolons also accepted) and from single-column CSV uploads. Both are
//! reduced to a canonical textual form and merged without duplicates.
//! There is no country-code inference or locale-aware validation.

use indexmap::IndexSet;
use thiserror::Error;

/// Errors from recipient input parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecipientError {
    /// A CSV row contained more than one column.
    #[error("CSV must contain exactly one column (one phone per row), got: {line}")]
    MultiColumn { line: String },
}

const CSV_DELIMITERS: [char; 3] = [',', ';', '\t'];

/// Normalize a phone number.
///
/// Keeps only digits and `+`, then drops a single leading `+`. Returns
/// `None` when nothing is left.
///
/// ```
/// assert_eq!(
///     sendout::normalize_phone("+38 (073) 392-7425").as_deref(),
///     Some("380733927425")
/// );
/// assert_eq!(sendout::normalize_phone("  - "), None);
/// ```
pub fn normalize_phone(raw: &str) -> Option<String> {
    let kept: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    let normalized = kept.strip_prefix('+').unwrap_or(&kept);
    if normalized.is_empty() {
        None
    } else {
        Some(normalized.to_string())
    }
}

/// Split manual input on newlines, commas and semicolons, normalizing each entry.
pub fn parse_manual(text: &str) -> Vec<String> {
    text.split(['\n', ',', ';'])
        .filter_map(normalize_phone)
        .collect()
}

/// Parse a single-column CSV (no header). Returns the raw, trimmed rows.
pub fn parse_csv_single_column(text: &str) -> Result<Vec<String>, RecipientError> {
    let mut rows = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        for delimiter in CSV_DELIMITERS {
            let columns = line
                .split(delimiter)
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .count();
            if columns > 1 {
                return Err(RecipientError::MultiColumn {
                    line: line.to_string(),
                });
            }
        }
        rows.push(line.to_string());
    }

    Ok(rows)
}

/// Deduplicated, normalized recipients in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientSet {
    numbers: IndexSet<String>,
}

impl RecipientSet {
    /// Merge manual text and CSV rows. Manual entries come first.
    pub fn merge(manual: &str, csv_rows: &[String]) -> Self {
        let manual = parse_manual(manual);
        let csv = csv_rows.iter().filter_map(|row| normalize_phone(row));
        manual.into_iter().chain(csv).collect()
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    pub fn contains(&self, number: &str) -> bool {
        self.numbers.contains(number)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.numbers.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.numbers.into_iter().collect()
    }
}

impl FromIterator<String> for RecipientSet {
    /// Collects already-normalized numbers, dropping duplicates.
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            numbers: iter.into_iter().collect(),
        }
    }
}
