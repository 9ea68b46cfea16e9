//! Shared fixtures for SQLite adapter tests

use rusqlite::types::Value;
use rusqlite::Row;
use tessera_core_types::Entity;
use tessera_store_sqlite::{db, SqlRecord, SqliteRepository};

/// Entity with a store-assigned numeric key.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub active: bool,
    pub score: Option<f64>,
}

impl Person {
    pub fn new(name: &str, active: bool) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            active,
            score: None,
        }
    }
}

impl Entity for Person {
    type Key = i64;
    const NAME: &'static str = "person";

    fn key(&self) -> i64 {
        self.id
    }
}

impl SqlRecord for Person {
    const TABLE: &'static str = "people";
    const KEY_COLUMN: &'static str = "id";
    const DATA_COLUMNS: &'static [&'static str] = &["name", "active", "score"];
    const KEY_GENERATED: bool = true;

    fn key_value(key: &i64) -> Value {
        Value::Integer(*key)
    }

    fn data_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Integer(i64::from(self.active)),
            match self.score {
                Some(score) => Value::Real(score),
                None => Value::Null,
            },
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            active: row.get::<_, i64>(2)? != 0,
            score: row.get(3)?,
        })
    }

    fn apply_generated_key(&mut self, rowid: i64) {
        self.id = rowid;
    }
}

/// Entity with a caller-supplied string key.
#[derive(Debug, Clone, PartialEq)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

impl Entity for Setting {
    type Key = String;
    const NAME: &'static str = "setting";

    fn key(&self) -> String {
        self.key.clone()
    }
}

impl SqlRecord for Setting {
    const TABLE: &'static str = "settings";
    const KEY_COLUMN: &'static str = "key";
    const DATA_COLUMNS: &'static [&'static str] = &["value"];

    fn key_value(key: &String) -> Value {
        Value::Text(key.clone())
    }

    fn data_values(&self) -> Vec<Value> {
        vec![Value::Text(self.value.clone())]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            key: row.get(0)?,
            value: row.get(1)?,
        })
    }
}

pub fn people_repository() -> SqliteRepository<Person> {
    let conn = db::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE people (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            active INTEGER NOT NULL,
            score REAL
        );",
    )
    .unwrap();
    SqliteRepository::new(db::shared(conn))
}

pub fn settings_repository() -> SqliteRepository<Setting> {
    let conn = db::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )
    .unwrap();
    SqliteRepository::new(db::shared(conn))
}

/// Repository whose table was never created, so every store call fails
/// natively.
pub fn broken_repository() -> SqliteRepository<Person> {
    SqliteRepository::new(db::shared(db::open_in_memory().unwrap()))
}

/// Seed 100 active people through the repository; SQLite assigns the
/// sequential identities 1..=100.
pub async fn seed_people(
    repo: &SqliteRepository<Person>,
    cancel: &tokio_util::sync::CancellationToken,
) {
    use tessera_repository::Repository;

    for i in 1..=100 {
        let person = Person::new(&format!("TITLE_{:03}", i), true);
        let persisted = repo.add(person, cancel).await.unwrap();
        assert_eq!(persisted.id, i);
    }
}
