//! Reference dataset reader.
//!
//! A dataset is a text file of WKT2 definitions separated by blank lines.
//! Lines starting with `#` between definitions are comments. Blank lines
//! inside an open bracket do not end a definition.

use std::collections::HashMap;

use crs_core::{NewWkt, WktRecord};

use crate::{
  Error, Result,
  parse::{Node, parse},
};

const DATUM_KEYWORDS: &[&str] = &["DATUM", "GEODETICDATUM", "TRF"];
const ELLIPSOID_KEYWORDS: &[&str] = &["ELLIPSOID", "SPHEROID"];
const PROJECTED_KEYWORDS: &[&str] = &["PROJCRS", "PROJECTEDCRS"];

/// One definition's text and where it starts in the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
  /// 1-based position among the dataset's definitions.
  pub index: usize,
  /// 1-based line of the definition's first line.
  pub line:  usize,
  pub text:  String,
}

// ─── Splitting ───────────────────────────────────────────────────────────────

/// Split `input` into definitions.
pub fn split_entries(input: &str) -> Vec<RawEntry> {
  let mut entries = Vec::new();
  let mut current: Vec<&str> = Vec::new();
  let mut start = 0;
  let mut depth: i64 = 0;
  let mut in_quote = false;

  let mut flush = |current: &mut Vec<&str>, start: usize| {
    if !current.is_empty() {
      entries.push(RawEntry {
        index: entries.len() + 1,
        line:  start,
        text:  current.join("\n").trim().to_owned(),
      });
      current.clear();
    }
  };

  for (i, line) in input.lines().enumerate() {
    let trimmed = line.trim();
    let at_top = depth <= 0 && !in_quote;

    if at_top && trimmed.is_empty() {
      flush(&mut current, start);
      continue;
    }
    if at_top && current.is_empty() && trimmed.starts_with('#') {
      continue;
    }

    if current.is_empty() {
      start = i + 1;
    }
    current.push(line);

    for c in line.chars() {
      match c {
        '"' => in_quote = !in_quote,
        '[' | '(' if !in_quote => depth += 1,
        ']' | ')' if !in_quote => depth -= 1,
        _ => {}
      }
    }
  }
  flush(&mut current, start);

  entries
}

// ─── Field extraction ────────────────────────────────────────────────────────

fn invalid(entry: &RawEntry, reason: impl Into<String>) -> Error {
  Error::InvalidEntry {
    index:  entry.index,
    line:   entry.line,
    reason: reason.into(),
  }
}

/// The last `ID["IAU", code, version]` directly under the root node.
fn iau_identifier(root: &Node) -> Option<(i64, i64)> {
  root
    .children()
    .filter(|n| n.is("ID"))
    .filter(|n| n.name().is_some_and(|a| a.eq_ignore_ascii_case("IAU")))
    .filter_map(|n| {
      let code = n.args.get(1)?.as_integer()?;
      let version = n.args.get(2)?.as_integer()?;
      Some((version, code))
    })
    .last()
}

fn extract(entry: &RawEntry) -> Result<NewWkt> {
  let root = parse(&entry.text).map_err(|e| match e {
    Error::Syntax { line, message } => Error::Syntax {
      line: entry.line + line - 1,
      message,
    },
    other => other,
  })?;

  let (version, code) = iau_identifier(&root)
    .ok_or_else(|| invalid(entry, "missing ID[\"IAU\", <code>, <version>] on the root node"))?;

  let datum_name = root
    .find_any(DATUM_KEYWORDS)
    .and_then(Node::name)
    .ok_or_else(|| invalid(entry, "missing DATUM name"))?
    .to_owned();

  let ellipsoid_name = root
    .find_any(ELLIPSOID_KEYWORDS)
    .and_then(Node::name)
    .unwrap_or_default()
    .to_owned();

  let projection_name = if PROJECTED_KEYWORDS.iter().any(|k| root.is(k)) {
    root.name().unwrap_or_default().to_owned()
  } else {
    String::new()
  };

  Ok(NewWkt {
    version,
    code,
    datum_name,
    ellipsoid_name,
    projection_name,
    wkt: entry.text.clone(),
  })
}

/// Parse `input` into records, deriving identifiers and solar bodies.
///
/// The first malformed definition aborts the whole read, as does a repeated
/// identifier.
pub fn read_dataset(input: &str) -> Result<Vec<WktRecord>> {
  let entries = split_entries(input);
  let mut seen: HashMap<String, usize> = HashMap::with_capacity(entries.len());
  let mut records = Vec::with_capacity(entries.len());

  for entry in &entries {
    let record = WktRecord::from_entry(extract(entry)?).map_err(|source| Error::Record {
      index: entry.index,
      line: entry.line,
      source,
    })?;

    if let Some(first) = seen.insert(record.id.clone(), entry.index) {
      return Err(Error::DuplicateId {
        id: record.id,
        first,
        second: entry.index,
      });
    }
    records.push(record);
  }

  tracing::debug!(records = records.len(), "dataset parsed");
  Ok(records)
}

#[cfg(test)]
mod tests {
  use super::*;

  const DATASET: &str = r#"# IAU 2015 planetary definitions

GEOGCRS["Mars (2015) - Sphere / Ocentric",
    DATUM["Mars (2015) - Sphere",
        ELLIPSOID["Mars (2015) - Sphere",3396190,0,LENGTHUNIT["metre",1]]],
    PRIMEM["Reference Meridian",0,ANGLEUNIT["degree",0.0174532925199433]],
    CS[ellipsoidal,2],
        AXIS["geodetic latitude (Lat)",north,ORDER[1]],
        AXIS["geodetic longitude (Lon)",east,ORDER[2]],
    ID["IAU",49900,2015]]

# Projected

PROJCRS["Moon (2015) - Sphere / Equirectangular, clon = 0",
    BASEGEOGCRS["Moon (2015) - Sphere / Ocentric",
        DATUM["Moon (2015) - Sphere",
            ELLIPSOID["Moon (2015) - Sphere",1737400,0,LENGTHUNIT["metre",1]]],
        PRIMEM["Reference Meridian",0],
        ID["IAU",30100,2015]],
    CONVERSION["Equirectangular, clon = 0",
        METHOD["Equidistant Cylindrical",ID["EPSG",1028]]],
    CS[Cartesian,2],

        AXIS["easting (E)",east,ORDER[1]],
        AXIS["northing (N)",north,ORDER[2]],
    ID["IAU",30110,2015]]
"#;

  #[test]
  fn splits_on_blank_lines_outside_brackets() {
    let entries = split_entries(DATASET);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].line, 3);
    assert_eq!(entries[1].index, 2);
    assert!(entries[1].text.contains("northing"));
  }

  #[test]
  fn reads_geographic_and_projected_definitions() {
    let records = read_dataset(DATASET).unwrap();
    assert_eq!(records.len(), 2);

    let mars = &records[0];
    assert_eq!(mars.id, "IAU:2015:49900");
    assert_eq!(mars.solar_body, "Mars");
    assert_eq!(mars.ellipsoid_name, "Mars (2015) - Sphere");
    assert_eq!(mars.projection_name, "");
    assert!(mars.wkt.starts_with("GEOGCRS["));
    assert!(mars.wkt.ends_with("ID[\"IAU\",49900,2015]]"));

    // The base CRS carries its own ID; only the root's counts.
    let moon = &records[1];
    assert_eq!(moon.id, "IAU:2015:30110");
    assert_eq!(moon.solar_body, "Moon");
    assert_eq!(moon.projection_name, "Moon (2015) - Sphere / Equirectangular, clon = 0");
  }

  #[test]
  fn missing_identifier_is_fatal() {
    let err = read_dataset("GEOGCRS[\"x\",DATUM[\"Mars\"]]").unwrap_err();
    assert!(matches!(err, Error::InvalidEntry { index: 1, line: 1, .. }));
  }

  #[test]
  fn missing_datum_is_fatal() {
    let err = read_dataset("GEOGCRS[\"x\",ID[\"IAU\",1,2015]]").unwrap_err();
    assert!(matches!(err, Error::InvalidEntry { .. }));
  }

  #[test]
  fn syntax_error_reports_dataset_line() {
    let input = "# header\n\nGEOGCRS[\"ok\",DATUM[\"Mars\"],ID[\"IAU\",1,2015]]\n\nGEOGCRS[\"broken\",\n  DATUM[\"Mars\" ID[\"IAU\",2,2015]]\n";
    match read_dataset(input).unwrap_err() {
      Error::Syntax { line, .. } => assert_eq!(line, 6),
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[test]
  fn old_version_is_fatal() {
    let err = read_dataset("GEOGCRS[\"x\",DATUM[\"Mars\"],ID[\"IAU\",1,2009]]").unwrap_err();
    assert!(matches!(
      err,
      Error::Record {
        source: crs_core::Error::VersionOutOfRange(2009),
        ..
      }
    ));
  }

  #[test]
  fn duplicate_identifiers_are_fatal() {
    let input = "GEOGCRS[\"a\",DATUM[\"Mars\"],ID[\"IAU\",1,2015]]\n\nGEOGCRS[\"b\",DATUM[\"Mars\"],ID[\"IAU\",1,2015]]";
    assert!(matches!(
      read_dataset(input),
      Err(Error::DuplicateId { first: 1, second: 2, .. })
    ));
  }

  #[test]
  fn empty_dataset_reads_nothing() {
    assert!(read_dataset("# nothing here\n\n").unwrap().is_empty());
  }
}
