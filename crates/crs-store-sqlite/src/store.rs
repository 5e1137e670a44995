//! [`SqliteStore`], the SQLite implementation of [`CatalogStore`] and
//! [`CatalogLoader`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, types::Value};

use crs_core::{
  Page, WktRecord,
  store::{CatalogLoader, CatalogStore, LoadState},
};

use crate::{
  Result,
  encode::{
    RECORD_COLUMNS, RawLoadState, decode_count, encode_dt, encode_page, read_record,
    search_clause, search_terms,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A WKT catalog backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the underlying connection. Clones of this store fail afterwards.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a `SELECT` of [`RECORD_COLUMNS`] with positional parameters.
  async fn select_records(&self, sql: String, params: Vec<Value>) -> Result<Vec<WktRecord>> {
    let records = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), read_record)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(records)
  }

  /// Run a query yielding a single integer.
  async fn select_count(&self, sql: String, params: Vec<Value>) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, rusqlite::params_from_iter(params), |r| r.get(0))?)
      })
      .await?;
    Ok(decode_count(n))
  }

  fn with_page(mut params: Vec<Value>, page: Page) -> Vec<Value> {
    let (limit, offset) = encode_page(page);
    params.push(Value::Integer(limit));
    params.push(Value::Integer(offset));
    params
  }
}

// ─── CatalogStore impl ───────────────────────────────────────────────────────

impl CatalogStore for SqliteStore {
  type Error = crate::Error;

  // ── Whole catalog ─────────────────────────────────────────────────────────

  async fn list(&self, page: Page) -> Result<Vec<WktRecord>> {
    self
      .select_records(
        format!("SELECT {RECORD_COLUMNS} FROM wkts ORDER BY rowid LIMIT ?1 OFFSET ?2"),
        Self::with_page(vec![], page),
      )
      .await
  }

  async fn count(&self) -> Result<u64> {
    self
      .select_count("SELECT COUNT(*) FROM wkts".into(), vec![])
      .await
  }

  async fn find_by_id(&self, id: &str) -> Result<Option<WktRecord>> {
    let id = id.to_owned();
    let record = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {RECORD_COLUMNS} FROM wkts WHERE id = ?1"),
            rusqlite::params![id],
            read_record,
          )
          .optional()?)
      })
      .await?;
    Ok(record)
  }

  // ── Versions ──────────────────────────────────────────────────────────────

  async fn versions(&self) -> Result<Vec<i64>> {
    let versions = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare_cached("SELECT DISTINCT version FROM wkts ORDER BY version")?;
        let rows = stmt
          .query_map([], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(versions)
  }

  async fn list_by_version(&self, version: i64, page: Page) -> Result<Vec<WktRecord>> {
    self
      .select_records(
        format!(
          "SELECT {RECORD_COLUMNS} FROM wkts WHERE version = ?1
           ORDER BY rowid LIMIT ?2 OFFSET ?3"
        ),
        Self::with_page(vec![Value::Integer(version)], page),
      )
      .await
  }

  async fn count_by_version(&self, version: i64) -> Result<u64> {
    self
      .select_count(
        "SELECT COUNT(*) FROM wkts WHERE version = ?1".into(),
        vec![Value::Integer(version)],
      )
      .await
  }

  // ── Solar bodies ──────────────────────────────────────────────────────────

  async fn solar_bodies(&self) -> Result<Vec<String>> {
    let bodies = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare_cached("SELECT DISTINCT solar_body FROM wkts ORDER BY solar_body")?;
        let rows = stmt
          .query_map([], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(bodies)
  }

  async fn count_solar_bodies(&self) -> Result<u64> {
    self
      .select_count("SELECT COUNT(DISTINCT solar_body) FROM wkts".into(), vec![])
      .await
  }

  async fn list_by_solar_body(&self, body: &str, page: Page) -> Result<Vec<WktRecord>> {
    self
      .select_records(
        format!(
          "SELECT {RECORD_COLUMNS} FROM wkts WHERE lower(solar_body) = lower(?1)
           ORDER BY rowid LIMIT ?2 OFFSET ?3"
        ),
        Self::with_page(vec![Value::Text(body.to_owned())], page),
      )
      .await
  }

  async fn count_by_solar_body(&self, body: &str, page: Page) -> Result<u64> {
    // Counts the paginated slice, not the whole filtered set.
    self
      .select_count(
        "SELECT COUNT(*) FROM (
           SELECT 1 FROM wkts WHERE lower(solar_body) = lower(?1)
           ORDER BY rowid LIMIT ?2 OFFSET ?3
         )"
        .into(),
        Self::with_page(vec![Value::Text(body.to_owned())], page),
      )
      .await
  }

  // ── Keyword search ────────────────────────────────────────────────────────

  async fn search(&self, keyword: &str, page: Page) -> Result<Vec<WktRecord>> {
    let terms = search_terms(keyword);
    if terms.is_empty() {
      return Ok(vec![]);
    }
    let n = terms.len();
    tracing::debug!(keyword, terms = n, "keyword search");

    let sql = format!(
      "SELECT {RECORD_COLUMNS} FROM wkts WHERE {}
       ORDER BY rowid LIMIT ?{} OFFSET ?{}",
      search_clause(n),
      n + 1,
      n + 2,
    );
    let params = terms.into_iter().map(Value::Text).collect();
    self.select_records(sql, Self::with_page(params, page)).await
  }

  async fn search_count(&self, keyword: &str) -> Result<u64> {
    let terms = search_terms(keyword);
    if terms.is_empty() {
      return Ok(0);
    }
    let sql = format!("SELECT COUNT(*) FROM wkts WHERE {}", search_clause(terms.len()));
    self
      .select_count(sql, terms.into_iter().map(Value::Text).collect())
      .await
  }
}

// ─── CatalogLoader impl ──────────────────────────────────────────────────────

impl CatalogLoader for SqliteStore {
  type Error = crate::Error;

  async fn load_state(&self) -> Result<Option<LoadState>> {
    let raw: Option<RawLoadState> = self
      .conn
      .call(|conn| {
        Ok(conn
          .query_row(
            "SELECT dataset_digest, record_count, loaded_at FROM catalog_meta
             WHERE singleton = 1",
            [],
            |row| {
              Ok(RawLoadState {
                dataset_digest: row.get(0)?,
                record_count:   row.get(1)?,
                loaded_at:      row.get(2)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawLoadState::into_state).transpose()
  }

  /// The stored `record_count` is the table's row count at commit time, so
  /// it always agrees with [`CatalogStore::count`] after a successful load.
  async fn ingest(&self, records: Vec<WktRecord>, state: LoadState) -> Result<u64> {
    let digest = state.dataset_digest;
    let at_str = encode_dt(state.loaded_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut inserted: u64 = 0;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO wkts (
               id, version, code, solar_body,
               datum_name, ellipsoid_name, projection_name, wkt
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO NOTHING",
          )?;
          for r in &records {
            inserted += stmt.execute(rusqlite::params![
              r.id,
              r.version,
              r.code,
              r.solar_body,
              r.datum_name,
              r.ellipsoid_name,
              r.projection_name,
              r.wkt,
            ])? as u64;
          }
        }

        let total: i64 = tx.query_row("SELECT COUNT(*) FROM wkts", [], |r| r.get(0))?;
        tx.execute(
          "INSERT INTO catalog_meta (singleton, dataset_digest, record_count, loaded_at)
           VALUES (1, ?1, ?2, ?3)
           ON CONFLICT(singleton) DO UPDATE SET
             dataset_digest = excluded.dataset_digest,
             record_count   = excluded.record_count,
             loaded_at      = excluded.loaded_at",
          rusqlite::params![digest, total, at_str],
        )?;
        tx.commit()?;
        Ok(inserted)
      })
      .await?;

    Ok(inserted)
  }
}
