//! Pagination window shared by every listing endpoint.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of records returned when the caller does not ask for a limit.
pub const DEFAULT_LIMIT: u32 = 50;

/// Largest accepted `limit`.
pub const MAX_LIMIT: u32 = 100;

/// A validated `limit`/`offset` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
  pub limit:  u32,
  pub offset: u64,
}

impl Default for Page {
  fn default() -> Self {
    Self {
      limit:  DEFAULT_LIMIT,
      offset: 0,
    }
  }
}

impl Page {
  /// Validate raw query values, filling in defaults for missing ones.
  ///
  /// `limit` must lie in `0..=100` and `offset` must not be negative.
  pub fn new(limit: Option<i64>, offset: Option<i64>) -> Result<Self> {
    let limit = match limit {
      None => DEFAULT_LIMIT,
      Some(l) if (0..=i64::from(MAX_LIMIT)).contains(&l) => l as u32,
      Some(l) => return Err(Error::LimitOutOfRange(l)),
    };
    let offset = match offset {
      None => 0,
      Some(o) if o >= 0 => o as u64,
      Some(o) => return Err(Error::NegativeOffset(o)),
    };
    Ok(Self { limit, offset })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_when_absent() {
    let page = Page::new(None, None).unwrap();
    assert_eq!(page, Page { limit: 50, offset: 0 });
  }

  #[test]
  fn bounds_are_inclusive() {
    assert_eq!(Page::new(Some(0), Some(0)).unwrap().limit, 0);
    assert_eq!(Page::new(Some(100), Some(7)).unwrap().limit, 100);
  }

  #[test]
  fn limit_above_maximum_rejected() {
    assert!(matches!(
      Page::new(Some(101), None),
      Err(Error::LimitOutOfRange(101))
    ));
  }

  #[test]
  fn negative_values_rejected() {
    assert!(matches!(
      Page::new(Some(-1), None),
      Err(Error::LimitOutOfRange(-1))
    ));
    assert!(matches!(
      Page::new(None, Some(-3)),
      Err(Error::NegativeOffset(-3))
    ));
  }
}
