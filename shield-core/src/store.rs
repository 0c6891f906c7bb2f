//! Small key/value persistence for preferences and the session token.

use crate::error::Result;
use std::cell::RefCell;
use std::collections::BTreeMap;

pub const PREMIUM_KEY: &str = "supplyshield_premium";
pub const THEME_KEY: &str = "supplyshield_theme";
pub const TOKEN_KEY: &str = "token";

pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(entries: &[(&str, &str)]) -> Self {
        let store = Self::new();
        store.values.borrow_mut().extend(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        store
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::PreferenceStore;
    use crate::error::{Result, ShieldError};
    use rusqlite::{params, Connection, OptionalExtension};
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    #[derive(Clone, Debug)]
    pub struct SqliteStore {
        db_path: Arc<PathBuf>,
    }

    impl SqliteStore {
        pub fn open(path: impl AsRef<Path>) -> Result<Self> {
            let db_path = path.as_ref().to_path_buf();
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| ShieldError::Storage(e.to_string()))?;
                }
            }

            let conn = Connection::open(&db_path)?;
            conn.execute_batch(
                "
                PRAGMA journal_mode=WAL;
                PRAGMA synchronous=NORMAL;
                CREATE TABLE IF NOT EXISTS preferences (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );
                ",
            )?;

            Ok(Self {
                db_path: Arc::new(db_path),
            })
        }

        pub fn path(&self) -> &Path {
            &self.db_path
        }

        fn conn(&self) -> Result<Connection> {
            Ok(Connection::open(&*self.db_path)?)
        }
    }

    impl PreferenceStore for SqliteStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            let conn = self.conn()?;
            let value = conn
                .query_row(
                    "SELECT value FROM preferences WHERE key = ?1",
                    params![key],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            Ok(value)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            let conn = self.conn()?;
            conn.execute(
                "INSERT INTO preferences (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<()> {
            let conn = self.conn()?;
            conn.execute("DELETE FROM preferences WHERE key = ?1", params![key])?;
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn values_survive_reopen() {
            let dir = tempfile::tempdir().expect("tempdir");
            let path = dir.path().join("nested").join("prefs.db");

            let store = SqliteStore::open(&path).expect("open");
            store.set("supplyshield_theme", "dark").expect("set");
            store.set("supplyshield_theme", "light").expect("overwrite");
            store.set("token", "abc").expect("set token");
            store.remove("token").expect("remove");

            let reopened = SqliteStore::open(&path).expect("reopen");
            assert_eq!(
                reopened.get("supplyshield_theme").expect("get"),
                Some("light".to_string())
            );
            assert_eq!(reopened.get("token").expect("get"), None);
        }
    }
}
