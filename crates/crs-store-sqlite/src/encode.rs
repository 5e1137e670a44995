//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Counts and pagination bounds
//! cross the boundary as `i64`, SQLite's only integer type.

use chrono::{DateTime, Utc};
use crs_core::{Page, WktRecord, store::LoadState};

use crate::{Error, Result};

// ─── Columns ─────────────────────────────────────────────────────────────────

/// Column list matching [`read_record`].
pub const RECORD_COLUMNS: &str =
  "id, version, code, solar_body, datum_name, ellipsoid_name, projection_name, wkt";

/// Columns searched by keyword.
pub const SEARCH_COLUMNS: &[&str] =
  &["id", "solar_body", "datum_name", "ellipsoid_name", "projection_name"];

pub fn read_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<WktRecord> {
  Ok(WktRecord {
    id:              row.get(0)?,
    version:         row.get(1)?,
    code:            row.get(2)?,
    solar_body:      row.get(3)?,
    datum_name:      row.get(4)?,
    ellipsoid_name:  row.get(5)?,
    projection_name: row.get(6)?,
    wkt:             row.get(7)?,
  })
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Integers ────────────────────────────────────────────────────────────────

/// `(limit, offset)` as SQL parameters.
pub fn encode_page(page: Page) -> (i64, i64) {
  (
    i64::from(page.limit),
    i64::try_from(page.offset).unwrap_or(i64::MAX),
  )
}

pub fn decode_count(n: i64) -> u64 { u64::try_from(n).unwrap_or(0) }

// ─── Keyword search ──────────────────────────────────────────────────────────

/// Escape `%`, `_` and `\` so `term` matches literally inside a `LIKE ... ESCAPE '\'`
/// substring pattern.
pub fn like_pattern(term: &str) -> String {
  let mut out = String::with_capacity(term.len() + 2);
  out.push('%');
  for c in term.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

/// Split a keyword into its search terms.
pub fn search_terms(keyword: &str) -> Vec<String> {
  keyword.split_whitespace().map(like_pattern).collect()
}

/// `WHERE` clause requiring every term (`?1`..`?n`) to match some searchable column.
pub fn search_clause(terms: usize) -> String {
  (1..=terms)
    .map(|i| {
      let alternatives: Vec<String> = SEARCH_COLUMNS
        .iter()
        .map(|col| format!("{col} LIKE ?{i} ESCAPE '\\'"))
        .collect();
      format!("({})", alternatives.join(" OR "))
    })
    .collect::<Vec<_>>()
    .join(" AND ")
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from the `catalog_meta` row.
pub struct RawLoadState {
  pub dataset_digest: String,
  pub record_count:   i64,
  pub loaded_at:      String,
}

impl RawLoadState {
  pub fn into_state(self) -> Result<LoadState> {
    Ok(LoadState {
      dataset_digest: self.dataset_digest,
      record_count:   decode_count(self.record_count),
      loaded_at:      decode_dt(&self.loaded_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn like_pattern_escapes_wildcards() {
    assert_eq!(like_pattern("mars"), "%mars%");
    assert_eq!(like_pattern("50%_a\\b"), "%50\\%\\_a\\\\b%");
  }

  #[test]
  fn search_clause_binds_each_term_once() {
    let clause = search_clause(2);
    assert!(clause.starts_with("(id LIKE ?1 ESCAPE '\\' OR "));
    assert!(clause.contains(") AND (id LIKE ?2"));
    assert_eq!(clause.matches("?2").count(), SEARCH_COLUMNS.len());
  }

  #[test]
  fn page_and_count_conversions() {
    assert_eq!(encode_page(Page { limit: 20, offset: 40 }), (20, 40));
    assert_eq!(encode_page(Page { limit: 1, offset: u64::MAX }).1, i64::MAX);
    assert_eq!(decode_count(-1), 0);
    assert_eq!(decode_count(7), 7);
  }
}
