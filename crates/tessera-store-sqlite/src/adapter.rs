//! Repository contract over a SQLite connection handle
//!
//! Translation happens before dispatch: filter, ordering and paging
//! arguments are validated and rendered to SQL on the async side, then
//! the statement runs on the blocking pool against the shared
//! connection. Cancellation is observed before dispatch and raced
//! against the running statement's task.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use tessera_errors::{
    cancelled, store_failure, store_violation, DataResult, StoreFailure,
};
use tessera_repository::{Filter, PageRequest, Repository, Sort};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::db::SqliteHandle;
use crate::record::{select_sql, SqlRecord};
use crate::sql::{order_clause, where_clause};

/// SQLite realization of the repository contract for one record type.
pub struct SqliteRepository<R: SqlRecord> {
    handle: SqliteHandle,
    _record: PhantomData<fn() -> R>,
}

impl<R: SqlRecord> SqliteRepository<R> {
    /// Bind a repository to an injected connection handle.
    ///
    /// The handle stays owned by the caller; the repository never
    /// closes or recycles it.
    pub fn new(handle: SqliteHandle) -> Self {
        Self {
            handle,
            _record: PhantomData,
        }
    }

    /// Run `work` against the shared connection on the blocking pool,
    /// racing the cancellation token.
    async fn run<T, F>(&self, op: &'static str, cancel: &CancellationToken, work: F) -> DataResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> DataResult<T> + Send + 'static,
    {
        if cancel.is_cancelled() {
            return Err(cancelled(op).with_entity(R::NAME));
        }

        let handle = Arc::clone(&self.handle);
        let task = tokio::task::spawn_blocking(move || {
            let conn = handle.lock().map_err(|_| {
                store_violation(op, StoreFailure::Other, "connection handle poisoned")
            })?;
            work(&conn)
        });

        tokio::select! {
            _ = cancel.cancelled() => Err(cancelled(op).with_entity(R::NAME)),
            joined = task => match joined {
                Ok(result) => result.map_err(|e| e.with_entity(R::NAME)),
                Err(join_err) => {
                    Err(store_failure(op, StoreFailure::Other, join_err).with_entity(R::NAME))
                }
            },
        }
    }

    fn classified(op: &'static str, err: rusqlite::Error) -> tessera_errors::DataError {
        store_failure(op, classify(&err), err)
    }
}

/// Map a native SQLite failure onto the uniform sub-classification.
fn classify(err: &rusqlite::Error) -> StoreFailure {
    use rusqlite::ErrorCode;

    match err {
        rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
            ErrorCode::ConstraintViolation => StoreFailure::ConstraintViolation,
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => StoreFailure::Conflict,
            ErrorCode::OperationInterrupted => StoreFailure::Timeout,
            ErrorCode::CannotOpen
            | ErrorCode::NotADatabase
            | ErrorCode::SystemIoFailure
            | ErrorCode::DiskFull => StoreFailure::Connectivity,
            ErrorCode::TypeMismatch => StoreFailure::Serialization,
            _ => StoreFailure::Other,
        },
        rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::ToSqlConversionFailure(..)
        | rusqlite::Error::InvalidColumnType(..) => StoreFailure::Serialization,
        _ => StoreFailure::Other,
    }
}

fn query_rows<R: SqlRecord>(
    op: &'static str,
    conn: &Connection,
    sql: &str,
    params: Vec<Value>,
) -> DataResult<Vec<R>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| SqliteRepository::<R>::classified(op, e))?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), R::from_row)
        .map_err(|e| SqliteRepository::<R>::classified(op, e))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| SqliteRepository::<R>::classified(op, e))?;
    Ok(rows)
}

#[async_trait]
impl<R: SqlRecord> Repository<R> for SqliteRepository<R> {
    async fn add(&self, entity: R, cancel: &CancellationToken) -> DataResult<R> {
        const OP: &str = "add";

        let mut columns: Vec<&str> = Vec::new();
        if !R::KEY_GENERATED {
            columns.push(R::KEY_COLUMN);
        }
        columns.extend_from_slice(R::DATA_COLUMNS);
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            R::TABLE,
            columns.join(", "),
            placeholders
        );

        self.run(OP, cancel, move |conn| {
            let mut params: Vec<Value> = Vec::new();
            if !R::KEY_GENERATED {
                params.push(R::key_value(&entity.key()));
            }
            params.extend(entity.data_values());

            conn.execute(&sql, params_from_iter(params.iter()))
                .map_err(|e| Self::classified(OP, e))?;

            let mut persisted = entity;
            if R::KEY_GENERATED {
                persisted.apply_generated_key(conn.last_insert_rowid());
            }
            debug!(table = R::TABLE, key = %persisted.key(), "row inserted");
            Ok(persisted)
        })
        .await
    }

    async fn find_by_id(
        &self,
        key: &R::Key,
        cancel: &CancellationToken,
    ) -> DataResult<Option<R>> {
        const OP: &str = "find_by_id";

        let sql = format!("{} WHERE {} = ?", select_sql::<R>(), R::KEY_COLUMN);
        let key_param = R::key_value(key);

        self.run(OP, cancel, move |conn| {
            conn.query_row(&sql, [&key_param], R::from_row)
                .optional()
                .map_err(|e| Self::classified(OP, e))
        })
        .await
    }

    async fn find_all(&self, cancel: &CancellationToken) -> DataResult<Vec<R>> {
        const OP: &str = "find_all";

        let sql = format!("{} {}", select_sql::<R>(), order_clause::<R>(OP, None)?);

        self.run(OP, cancel, move |conn| {
            query_rows::<R>(OP, conn, &sql, Vec::new())
        })
        .await
    }

    async fn find_where(
        &self,
        filter: &Filter,
        cancel: &CancellationToken,
    ) -> DataResult<Vec<R>> {
        const OP: &str = "find_where";

        let predicate = where_clause::<R>(OP, filter).map_err(|e| e.with_entity(R::NAME))?;
        let order = order_clause::<R>(OP, None)?;
        let (sql, params) = match predicate {
            Some((fragment, params)) => (
                format!("{} WHERE {} {}", select_sql::<R>(), fragment, order),
                params,
            ),
            None => (format!("{} {}", select_sql::<R>(), order), Vec::new()),
        };

        self.run(OP, cancel, move |conn| {
            query_rows::<R>(OP, conn, &sql, params)
        })
        .await
    }

    async fn find_where_paged(
        &self,
        filter: &Filter,
        page_index: i64,
        page_size: i64,
        sort: Option<Sort>,
        cancel: &CancellationToken,
    ) -> DataResult<Vec<R>> {
        const OP: &str = "find_where_paged";

        let page = PageRequest::new(OP, page_index, page_size)
            .map_err(|e| e.with_entity(R::NAME))?;
        let predicate = where_clause::<R>(OP, filter).map_err(|e| e.with_entity(R::NAME))?;
        let order =
            order_clause::<R>(OP, sort.as_ref()).map_err(|e| e.with_entity(R::NAME))?;

        let (mut sql, mut params) = match predicate {
            Some((fragment, params)) => (
                format!("{} WHERE {} {}", select_sql::<R>(), fragment, order),
                params,
            ),
            None => (format!("{} {}", select_sql::<R>(), order), Vec::new()),
        };
        sql.push_str(" LIMIT ? OFFSET ?");
        params.push(Value::Integer(page.size() as i64));
        params.push(Value::Integer(page.offset() as i64));

        self.run(OP, cancel, move |conn| {
            query_rows::<R>(OP, conn, &sql, params)
        })
        .await
    }

    async fn update(&self, entity: R, cancel: &CancellationToken) -> DataResult<R> {
        const OP: &str = "update";

        let assignments = R::DATA_COLUMNS
            .iter()
            .map(|column| format!("{} = ?", column))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            R::TABLE,
            assignments,
            R::KEY_COLUMN
        );

        self.run(OP, cancel, move |conn| {
            let mut params = entity.data_values();
            params.push(R::key_value(&entity.key()));

            let affected = conn
                .execute(&sql, params_from_iter(params.iter()))
                .map_err(|e| Self::classified(OP, e))?;
            if affected == 0 {
                return Err(store_violation(
                    OP,
                    StoreFailure::Conflict,
                    format!("identity '{}' is absent from the store", entity.key()),
                ));
            }
            Ok(entity)
        })
        .await
    }

    async fn remove(&self, entity: &R, cancel: &CancellationToken) -> DataResult<()> {
        const OP: &str = "remove";

        let sql = format!("DELETE FROM {} WHERE {} = ?", R::TABLE, R::KEY_COLUMN);
        let key_param = R::key_value(&entity.key());

        self.run(OP, cancel, move |conn| {
            // Zero affected rows is the idempotent no-op success.
            conn.execute(&sql, [&key_param])
                .map_err(|e| Self::classified(OP, e))?;
            Ok(())
        })
        .await
    }
}
