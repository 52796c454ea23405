use crate::sqlite_column;
use crate::sqlite_persistence::{
    open_versioned_db, Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
    DEFAULT_TIMESTAMP,
};
use crate::user::auth::{FilmlogHasher, PasswordCredentials};
use crate::user::{User, UserRole, UserStore, WatchlistStore};
use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::{
    path::Path,
    str::FromStr,
    sync::{Arc, Mutex},
};

/// V 0
const USER_TABLE_V_0: Table = Table {
    name: "user",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!("email", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("full_name", &SqlType::Text, non_null = true),
        sqlite_column!("role", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[],
    indices: &[("idx_user_email", "email")],
};
const USER_PASSWORD_CREDENTIALS_TABLE_V_0: Table = Table {
    name: "user_password_credentials",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            is_unique = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("salt", &SqlType::Text, non_null = true),
        sqlite_column!("hash", &SqlType::Text, non_null = true),
        sqlite_column!("hasher", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[],
    indices: &[],
};
const WATCHLIST_TABLE_V_0: Table = Table {
    name: "watchlist",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("movie_id", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[&["user_id", "movie_id"]],
    indices: &[("idx_watchlist_user_id", "user_id")],
};

pub const USER_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        USER_TABLE_V_0,
        USER_PASSWORD_CREDENTIALS_TABLE_V_0,
        WATCHLIST_TABLE_V_0,
    ],
    migration: None,
}];

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(usize, String, String, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

#[derive(Clone)]
pub struct SqliteUserStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUserStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = open_versioned_db(db_path, USER_VERSIONED_SCHEMAS)?;
        Ok(SqliteUserStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl UserStore for SqliteUserStore {
    fn create_user(&self, email: &str, full_name: &str, role: UserRole) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (email, full_name, role) VALUES (?1, ?2, ?3)",
                USER_TABLE_V_0.name
            ),
            params![email, full_name, role.as_str()],
        )
        .with_context(|| format!("Failed to create user {}", email))?;
        Ok(conn.last_insert_rowid() as usize)
    }

    fn get_user(&self, user_id: usize) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                &format!(
                    "SELECT id, email, full_name, role FROM {} WHERE id = ?1",
                    USER_TABLE_V_0.name
                ),
                params![user_id],
                user_from_row,
            )
            .optional()?;
        row.map(|(id, email, full_name, role)| {
            Ok(User {
                id,
                email,
                full_name,
                role: UserRole::from_str(&role)?,
            })
        })
        .transpose()
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                &format!(
                    "SELECT id, email, full_name, role FROM {} WHERE email = ?1",
                    USER_TABLE_V_0.name
                ),
                params![email],
                user_from_row,
            )
            .optional()?;
        row.map(|(id, email, full_name, role)| {
            Ok(User {
                id,
                email,
                full_name,
                role: UserRole::from_str(&role)?,
            })
        })
        .transpose()
    }

    fn get_all_users(&self) -> Result<Vec<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, email, full_name, role FROM {} ORDER BY id",
            USER_TABLE_V_0.name
        ))?;
        let rows = stmt
            .query_map([], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(id, email, full_name, role)| {
                Ok(User {
                    id,
                    email,
                    full_name,
                    role: UserRole::from_str(&role)?,
                })
            })
            .collect()
    }

    fn set_user_role(&self, user_id: usize, role: UserRole) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            &format!("UPDATE {} SET role = ?1 WHERE id = ?2", USER_TABLE_V_0.name),
            params![role.as_str(), user_id],
        )?;
        if updated == 0 {
            return Err(anyhow!("User {} not found", user_id));
        }
        Ok(())
    }

    fn get_password_credentials(&self, user_id: usize) -> Result<Option<PasswordCredentials>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                &format!(
                    "SELECT user_id, salt, hash, hasher FROM {} WHERE user_id = ?1",
                    USER_PASSWORD_CREDENTIALS_TABLE_V_0.name
                ),
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, usize>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;
        row.map(|(user_id, salt, hash, hasher)| {
            Ok(PasswordCredentials {
                user_id,
                salt,
                hash,
                hasher: FilmlogHasher::from_str(&hasher)?,
            })
        })
        .transpose()
    }

    fn set_password_credentials(&self, credentials: PasswordCredentials) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute(
            &format!(
                "DELETE FROM {} WHERE user_id = ?1",
                USER_PASSWORD_CREDENTIALS_TABLE_V_0.name
            ),
            params![credentials.user_id],
        )?;
        tx.execute(
            &format!(
                "INSERT INTO {} (user_id, salt, hash, hasher) VALUES (?1, ?2, ?3, ?4)",
                USER_PASSWORD_CREDENTIALS_TABLE_V_0.name
            ),
            params![
                credentials.user_id,
                credentials.salt,
                credentials.hash,
                credentials.hasher.to_string()
            ],
        )?;
        tx.commit()?;
        Ok(())
    }
}

impl WatchlistStore for SqliteUserStore {
    fn add_watchlist_movie(&self, user_id: usize, movie_id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        // UNIQUE(user_id, movie_id) makes this a single atomic
        // check-and-insert, the affected row count tells duplicates apart.
        let inserted = conn
            .execute(
                &format!(
                    "INSERT OR IGNORE INTO {} (user_id, movie_id) VALUES (?1, ?2)",
                    WATCHLIST_TABLE_V_0.name
                ),
                params![user_id, movie_id],
            )
            .with_context(|| format!("Failed to add movie {} for user {}", movie_id, user_id))?;
        Ok(inserted > 0)
    }

    fn remove_watchlist_movie(&self, user_id: usize, movie_id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            &format!(
                "DELETE FROM {} WHERE user_id = ?1 AND movie_id = ?2",
                WATCHLIST_TABLE_V_0.name
            ),
            params![user_id, movie_id],
        )?;
        Ok(deleted > 0)
    }

    fn get_watchlist(&self, user_id: usize) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT movie_id FROM {} WHERE user_id = ?1 ORDER BY id",
            WATCHLIST_TABLE_V_0.name
        ))?;
        let movie_ids = stmt
            .query_map(params![user_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(movie_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_store(dir: &TempDir) -> SqliteUserStore {
        SqliteUserStore::new(dir.path().join("user.db")).unwrap()
    }

    #[test]
    fn create_and_look_up_user() {
        let dir = TempDir::new().unwrap();
        let store = new_store(&dir);

        let id = store
            .create_user("a@b.com", "Ada B", UserRole::Regular)
            .unwrap();

        let user = store.get_user(id).unwrap().unwrap();
        assert_eq!(user.email, "a@b.com");
        assert_eq!(user.role, UserRole::Regular);
        assert_eq!(store.get_user_by_email("a@b.com").unwrap().unwrap().id, id);
        assert!(store.get_user_by_email("x@y.com").unwrap().is_none());

        assert!(store
            .create_user("a@b.com", "Other", UserRole::Regular)
            .is_err());

        store.set_user_role(id, UserRole::Admin).unwrap();
        assert_eq!(store.get_user(id).unwrap().unwrap().role, UserRole::Admin);
        assert!(store.set_user_role(999, UserRole::Admin).is_err());
    }

    #[test]
    fn password_credentials_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = new_store(&dir);
        let id = store
            .create_user("a@b.com", "Ada B", UserRole::Regular)
            .unwrap();

        assert!(store.get_password_credentials(id).unwrap().is_none());

        let credentials = PasswordCredentials::create(id, "hunter2").unwrap();
        store.set_password_credentials(credentials).unwrap();

        let loaded = store.get_password_credentials(id).unwrap().unwrap();
        assert!(loaded.hasher.verify("hunter2", loaded.hash.as_str()).unwrap());

        // Replacing is allowed.
        let replaced = PasswordCredentials::create(id, "hunter3").unwrap();
        store.set_password_credentials(replaced).unwrap();
        let loaded = store.get_password_credentials(id).unwrap().unwrap();
        assert!(loaded.hasher.verify("hunter3", loaded.hash.as_str()).unwrap());
    }

    #[test]
    fn watchlist_add_is_idempotent_guarded() {
        let dir = TempDir::new().unwrap();
        let store = new_store(&dir);
        let id = store
            .create_user("a@b.com", "Ada B", UserRole::Regular)
            .unwrap();

        assert!(store.add_watchlist_movie(id, "m1").unwrap());
        assert!(!store.add_watchlist_movie(id, "m1").unwrap());
        assert_eq!(store.get_watchlist(id).unwrap(), vec!["m1"]);
    }

    #[test]
    fn watchlist_keeps_insertion_order() {
        let dir = TempDir::new().unwrap();
        let store = new_store(&dir);
        let id = store
            .create_user("a@b.com", "Ada B", UserRole::Regular)
            .unwrap();

        store.add_watchlist_movie(id, "m3").unwrap();
        store.add_watchlist_movie(id, "m1").unwrap();
        store.add_watchlist_movie(id, "m2").unwrap();
        assert_eq!(store.get_watchlist(id).unwrap(), vec!["m3", "m1", "m2"]);
    }

    #[test]
    fn watchlist_remove_reports_absence() {
        let dir = TempDir::new().unwrap();
        let store = new_store(&dir);
        let id = store
            .create_user("a@b.com", "Ada B", UserRole::Regular)
            .unwrap();

        store.add_watchlist_movie(id, "m1").unwrap();
        assert!(store.remove_watchlist_movie(id, "m1").unwrap());
        assert!(!store.remove_watchlist_movie(id, "m1").unwrap());
        assert!(store.get_watchlist(id).unwrap().is_empty());
    }

    #[test]
    fn watchlists_are_isolated_per_user() {
        let dir = TempDir::new().unwrap();
        let store = new_store(&dir);
        let a = store
            .create_user("a@b.com", "Ada B", UserRole::Regular)
            .unwrap();
        let b = store
            .create_user("c@d.com", "Cee D", UserRole::Regular)
            .unwrap();

        store.add_watchlist_movie(a, "m1").unwrap();
        assert!(store.get_watchlist(b).unwrap().is_empty());
        assert!(!store.remove_watchlist_movie(b, "m1").unwrap());
        assert_eq!(store.get_watchlist(a).unwrap(), vec!["m1"]);
    }
}
