//! Entity-to-table mapping
//!
//! `SqlRecord` is the adapter's side of the identity contract: it names
//! the table, the key column and the data columns, and provides the row
//! codec. Columns declared here form the whitelist filter and sort
//! fields are validated against.

use rusqlite::types::Value;
use rusqlite::Row;
use tessera_core_types::Entity;

/// Mapping of an entity type onto a SQLite table.
pub trait SqlRecord: Entity {
    /// Table name.
    const TABLE: &'static str;

    /// Primary-key column name.
    const KEY_COLUMN: &'static str;

    /// Data columns, in the order `data_values` produces them.
    /// Excludes the key column.
    const DATA_COLUMNS: &'static [&'static str];

    /// Whether the store assigns the key on insert
    /// (`INTEGER PRIMARY KEY` rowid alias). When true, `add` omits the
    /// key column and installs the generated rowid via
    /// `apply_generated_key`.
    const KEY_GENERATED: bool = false;

    /// Render an identity value as a SQL parameter.
    fn key_value(key: &Self::Key) -> Value;

    /// Render the data columns as SQL parameters, in `DATA_COLUMNS`
    /// order.
    fn data_values(&self) -> Vec<Value>;

    /// Decode a row selected as `KEY_COLUMN, DATA_COLUMNS...`.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Install a store-assigned key after insert. No-op for natural
    /// keys.
    fn apply_generated_key(&mut self, _rowid: i64) {}
}

/// `SELECT key, data... FROM table` prefix for a record type.
pub(crate) fn select_sql<R: SqlRecord>() -> String {
    let mut columns = vec![R::KEY_COLUMN];
    columns.extend_from_slice(R::DATA_COLUMNS);
    format!("SELECT {} FROM {}", columns.join(", "), R::TABLE)
}

/// Whether `field` names a column of this record type.
pub(crate) fn is_column<R: SqlRecord>(field: &str) -> bool {
    field == R::KEY_COLUMN || R::DATA_COLUMNS.iter().any(|column| *column == field)
}
