//! Application config persistence.
//!
//! # Responsibility
//! - Load and store the single `Config` document as JSON.
//!
//! # Invariants
//! - `load_config` returns defaults when nothing was stored.
//! - `save_config` validates before writing.

use crate::db::ensure_schema_ready;
use crate::model::config::Config;
use crate::model::draft::now_epoch_ms;
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for app config.
pub trait ConfigRepository {
    fn load_config(&self) -> RepoResult<Config>;
    fn save_config(&self, config: &Config) -> RepoResult<()>;
}

/// SQLite-backed config repository.
pub struct SqliteConfigRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteConfigRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ConfigRepository for SqliteConfigRepository<'_> {
    fn load_config(&self) -> RepoResult<Config> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload_json FROM app_config WHERE id = 1;",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(json) => serde_json::from_str(&json)
                .map_err(|err| RepoError::InvalidData(format!("app_config.payload_json: {err}"))),
            None => Ok(Config::default()),
        }
    }

    fn save_config(&self, config: &Config) -> RepoResult<()> {
        config.validate()?;
        let json = serde_json::to_string(config)
            .map_err(|err| RepoError::InvalidData(format!("config serialization failed: {err}")))?;

        self.conn.execute(
            "INSERT OR REPLACE INTO app_config (id, payload_json, updated_at)
             VALUES (1, ?1, ?2);",
            params![json, now_epoch_ms()],
        )?;
        Ok(())
    }
}
