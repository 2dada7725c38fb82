//! Raw SQL operations for the facts table.

use rusqlite::types::ToSql;
use rusqlite::{params, Connection, Row};

use chronofact_core::StorageError;

use crate::to_storage_err;

const FACT_COLUMNS: &str =
    "seq, id, namespace, field_name, ts_micros, data_type, value, is_deleted, columns";

/// Raw fact row from the database.
#[derive(Debug, Clone)]
pub struct RawFact {
    pub seq: i64,
    pub id: String,
    pub namespace: String,
    pub field_name: String,
    pub ts_micros: i64,
    pub data_type: String,
    pub value: Option<String>,
    pub is_deleted: bool,
    pub columns: Option<String>,
}

/// Column values for an insert.
#[derive(Debug, Clone, Copy)]
pub struct NewFactRow<'a> {
    pub id: &'a str,
    pub namespace: &'a str,
    pub field_name: &'a str,
    pub ts_micros: i64,
    pub data_type: &'a str,
    pub value: Option<&'a str>,
    pub is_deleted: bool,
    pub columns: Option<&'a str>,
}

/// Keyset range filter. Every `Some` narrows the scan; `after` is the
/// exclusive `(ts_micros, seq)` resume point in scan direction.
#[derive(Debug, Clone, Default)]
pub struct RangeFilter<'a> {
    pub namespace: Option<&'a str>,
    pub field_name: Option<&'a str>,
    pub start_micros: Option<i64>,
    pub end_micros: Option<i64>,
    pub after: Option<(i64, i64)>,
    pub ascending: bool,
    pub limit: Option<usize>,
}

/// Insert a single fact. Returns the assigned sequence.
pub fn insert_fact(conn: &Connection, row: &NewFactRow<'_>) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO facts
            (id, namespace, field_name, ts_micros, data_type, value, is_deleted, columns)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            row.id,
            row.namespace,
            row.field_name,
            row.ts_micros,
            row.data_type,
            row.value,
            row.is_deleted,
            row.columns,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(conn.last_insert_rowid())
}

/// Ordered range scan.
pub fn query_facts(conn: &Connection, filter: &RangeFilter<'_>) -> Result<Vec<RawFact>, StorageError> {
    let mut clauses: Vec<String> = Vec::new();
    let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(ns) = filter.namespace {
        params_vec.push(Box::new(ns.to_string()));
        clauses.push(format!("namespace = ?{}", params_vec.len()));
    }
    if let Some(field) = filter.field_name {
        params_vec.push(Box::new(field.to_string()));
        clauses.push(format!("field_name = ?{}", params_vec.len()));
    }
    if let Some(start) = filter.start_micros {
        params_vec.push(Box::new(start));
        clauses.push(format!("ts_micros >= ?{}", params_vec.len()));
    }
    if let Some(end) = filter.end_micros {
        params_vec.push(Box::new(end));
        clauses.push(format!("ts_micros <= ?{}", params_vec.len()));
    }
    if let Some((ts, seq)) = filter.after {
        params_vec.push(Box::new(ts));
        let ts_idx = params_vec.len();
        params_vec.push(Box::new(seq));
        let seq_idx = params_vec.len();
        let op = if filter.ascending { ">" } else { "<" };
        clauses.push(format!(
            "(ts_micros {op} ?{ts_idx} OR (ts_micros = ?{ts_idx} AND seq {op} ?{seq_idx}))"
        ));
    }

    let direction = if filter.ascending { "ASC" } else { "DESC" };
    let mut sql = format!("SELECT {FACT_COLUMNS} FROM facts");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(&format!(" ORDER BY ts_micros {direction}, seq {direction}"));
    if let Some(limit) = filter.limit {
        params_vec.push(Box::new(limit as i64));
        sql.push_str(&format!(" LIMIT ?{}", params_vec.len()));
    }

    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

    let rows = stmt
        .query_map(params_refs.as_slice(), row_to_raw_fact)
        .map_err(|e| to_storage_err(e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Latest row for a fact id across every namespace and field.
pub fn latest_for_id(conn: &Connection, id: &str) -> Result<Option<RawFact>, StorageError> {
    let result = conn.query_row(
        &format!(
            "SELECT {FACT_COLUMNS} FROM facts WHERE id = ?1
             ORDER BY ts_micros DESC, seq DESC LIMIT 1"
        ),
        params![id],
        row_to_raw_fact,
    );

    match result {
        Ok(f) => Ok(Some(f)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(to_storage_err(e.to_string())),
    }
}

/// Latest row of every `(namespace, field_name)` that carries `id`, in
/// ascending position order.
pub fn latest_per_key_for_id(conn: &Connection, id: &str) -> Result<Vec<RawFact>, StorageError> {
    let sql = format!(
        "SELECT {FACT_COLUMNS} FROM facts AS f
         WHERE f.id = ?1
           AND f.seq = (
               SELECT g.seq FROM facts AS g
               WHERE g.id = f.id AND g.namespace = f.namespace AND g.field_name = f.field_name
               ORDER BY g.ts_micros DESC, g.seq DESC LIMIT 1
           )
         ORDER BY f.ts_micros ASC, f.seq ASC"
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![id], row_to_raw_fact)
        .map_err(|e| to_storage_err(e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Total number of stored versions.
pub fn count_facts(conn: &Connection) -> Result<u64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM facts", [], |row| row.get::<_, i64>(0))
        .map(|n| n as u64)
        .map_err(|e| to_storage_err(e.to_string()))
}

fn row_to_raw_fact(row: &Row<'_>) -> rusqlite::Result<RawFact> {
    Ok(RawFact {
        seq: row.get(0)?,
        id: row.get(1)?,
        namespace: row.get(2)?,
        field_name: row.get(3)?,
        ts_micros: row.get(4)?,
        data_type: row.get(5)?,
        value: row.get(6)?,
        is_deleted: row.get(7)?,
        columns: row.get(8)?,
    })
}
