//! WKT records: the single entity held by the registry.
//!
//! A record is keyed by `IAU:<version>:<code>`. The key and the solar body are
//! derived from the other fields when the record is built, so they can never
//! drift apart from `version`, `code` and `datum_name`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Versions are IAU report years; anything at or below this is rejected.
pub const MIN_VERSION_EXCLUSIVE: i64 = 2014;

/// Authority prefix used for every identifier the loader builds.
pub const IAU_AUTHORITY: &str = "IAU";

// ─── Identifier ──────────────────────────────────────────────────────────────

/// A syntactically valid WKT identifier: `<anything>:<digits>:<digits>`.
///
/// Only the shape is checked. Whether a record with this identifier exists is
/// up to the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WktId(String);

impl WktId {
  /// Build the canonical identifier of an IAU definition.
  pub fn iau(version: i64, code: i64) -> Self {
    Self(format!("{IAU_AUTHORITY}:{version}:{code}"))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

/// Digit runs of any length are accepted; a segment too large for the
/// store's integers never matches a record.
fn is_digits(segment: &str) -> bool {
  !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

impl FromStr for WktId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    // The authority may itself contain colons; only the last two segments
    // are constrained.
    let mut parts = s.rsplitn(3, ':');
    let code = parts.next().filter(|c| is_digits(c));
    let version = parts.next().filter(|v| is_digits(v));
    let authority = parts.next().filter(|a| !a.contains('\n'));

    match (authority, version, code) {
      (Some(_), Some(_), Some(_)) => Ok(Self(s.to_owned())),
      _ => Err(Error::InvalidWktId(s.to_owned())),
    }
  }
}

impl fmt::Display for WktId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Version ─────────────────────────────────────────────────────────────────

/// An IAU report year accepted as a path filter (strictly after 2014).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionId(i64);

impl VersionId {
  pub fn get(self) -> i64 { self.0 }
}

impl TryFrom<i64> for VersionId {
  type Error = Error;

  fn try_from(v: i64) -> Result<Self> {
    if v > MIN_VERSION_EXCLUSIVE {
      Ok(Self(v))
    } else {
      Err(Error::VersionOutOfRange(v))
    }
  }
}

impl FromStr for VersionId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let v: i64 = s
      .trim()
      .parse()
      .map_err(|_| Error::MalformedVersion(s.to_owned()))?;
    Self::try_from(v)
  }
}

impl fmt::Display for VersionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// ─── Solar body ──────────────────────────────────────────────────────────────

/// The solar body a datum applies to: the first whitespace-delimited token of
/// its name (`"Mars (2015) - Sphere"` → `"Mars"`).
///
/// Returns an empty string for a blank name.
pub fn derive_solar_body(datum_name: &str) -> &str {
  datum_name.split_whitespace().next().unwrap_or("")
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// Raw fields of one dataset entry, before derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWkt {
  pub version:         i64,
  pub code:            i64,
  pub datum_name:      String,
  pub ellipsoid_name:  String,
  pub projection_name: String,
  pub wkt:             String,
}

/// A stored CRS definition, serialised as-is by the listing endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WktRecord {
  pub id:              String,
  pub version:         i64,
  pub code:            i64,
  pub solar_body:      String,
  pub datum_name:      String,
  pub ellipsoid_name:  String,
  pub projection_name: String,
  pub wkt:             String,
}

impl WktRecord {
  /// Build a record, deriving `id` and `solar_body`.
  pub fn from_entry(entry: NewWkt) -> Result<Self> {
    if entry.version <= MIN_VERSION_EXCLUSIVE {
      return Err(Error::VersionOutOfRange(entry.version));
    }
    let id = WktId::iau(entry.version, entry.code);
    let solar_body = derive_solar_body(&entry.datum_name).to_owned();
    if solar_body.is_empty() {
      return Err(Error::BlankDatumName(id.to_string()));
    }

    Ok(Self {
      id: id.to_string(),
      version: entry.version,
      code: entry.code,
      solar_body,
      datum_name: entry.datum_name,
      ellipsoid_name: entry.ellipsoid_name,
      projection_name: entry.projection_name,
      wkt: entry.wkt,
    })
  }

  /// Case-insensitive comparison against a solar body path filter.
  pub fn is_on(&self, solar_body: &str) -> bool {
    self.solar_body.to_lowercase() == solar_body.to_lowercase()
  }
}
