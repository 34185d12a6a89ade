use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::config::DatabaseConfig;
use crate::error::{MatchError, Result};
use crate::models::{
    CandidateFilter, InteractionType, MatchInteraction, MessageKind, MessagePayload, NewInteraction, Profile,
};
use crate::schema::{match_interactions, profiles};

// Type alias for the database connection pool
pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// SQLite-backed storage for profiles and the interaction log
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Open (or create) the database at `database_url` with default pool settings.
    ///
    /// Accepts `sqlite:path`, `sqlite://path`, a bare path, or `:memory:`.
    pub fn new(database_url: &str) -> Result<Self> {
        Self::open(database_url, 10, Duration::from_secs(30))
    }

    /// Open the database described by the `database` config section
    pub fn with_config(config: &DatabaseConfig) -> Result<Self> {
        Self::open(
            &config.url,
            config.max_connections,
            Duration::from_secs(config.connection_timeout_secs),
        )
    }

    fn open(database_url: &str, max_connections: u32, connection_timeout: Duration) -> Result<Self> {
        let path = database_url
            .strip_prefix("sqlite://")
            .or_else(|| database_url.strip_prefix("sqlite:"))
            .unwrap_or(database_url);

        // Every in-memory connection is its own database, so keep exactly one
        let (manager, max_size) = if path == ":memory:" {
            (SqliteConnectionManager::memory(), 1)
        } else {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            (SqliteConnectionManager::file(path), max_connections.max(1))
        };

        let pool = Pool::builder()
            .max_size(max_size)
            .connection_timeout(connection_timeout)
            .build(manager)?;

        let conn = pool.get()?;
        Self::run_migrations(&conn)?;
        debug!(path, max_size, "Database opened");

        Ok(Self { pool })
    }

    /// Run database migrations
    fn run_migrations(conn: &Connection) -> Result<()> {
        conn.execute_batch(include_str!("../migrations/2026-10-01-000000_create_profiles/up.sql"))?;
        conn.execute_batch(include_str!("../migrations/2026-10-01-000001_create_match_interactions/up.sql"))?;
        Ok(())
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> Result<DbConnection> {
        Ok(self.pool.get()?)
    }

    /// Get a profile by wallet address
    pub fn get_profile(&self, wallet_address: &str) -> Result<Option<Profile>> {
        let conn = self.get_connection()?;

        let document: Option<String> = conn
            .query_row(
                &format!(
                    "SELECT {} FROM {} WHERE {} = ?",
                    profiles::DOCUMENT,
                    profiles::TABLE,
                    profiles::WALLET_ADDRESS
                ),
                params![wallet_address],
                |row| row.get(0),
            )
            .optional()?;

        document.map(|doc| decode_profile(&doc)).transpose()
    }

    /// Get every profile whose wallet address is in `wallet_addresses`, in table order
    pub fn get_profiles(&self, wallet_addresses: &[String]) -> Result<Vec<Profile>> {
        if wallet_addresses.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.get_connection()?;
        let placeholders = vec!["?"; wallet_addresses.len()].join(", ");
        let query = format!(
            "SELECT {} FROM {} WHERE {} IN ({}) ORDER BY {} ASC",
            profiles::DOCUMENT,
            profiles::TABLE,
            profiles::WALLET_ADDRESS,
            placeholders,
            profiles::ID
        );

        let mut stmt = conn.prepare(&query)?;
        let documents = stmt
            .query_map(params_from_iter(wallet_addresses.iter()), |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        documents.iter().map(|doc| decode_profile(doc)).collect()
    }

    /// Fetch up to `limit` active profiles matching the coarse pool filter, oldest first
    pub fn query_profiles(&self, filter: &CandidateFilter, limit: usize) -> Result<Vec<Profile>> {
        filter.validate()?;
        let conn = self.get_connection()?;

        let query = format!(
            "SELECT {doc} FROM {table} \
             WHERE {gender} = ?1 AND {age} BETWEEN ?2 AND ?3 AND {active} = 1 AND {key} != ?4 \
             ORDER BY {id} ASC LIMIT ?5",
            doc = profiles::DOCUMENT,
            table = profiles::TABLE,
            gender = profiles::GENDER,
            age = profiles::AGE,
            active = profiles::IS_ACTIVE,
            key = profiles::WALLET_ADDRESS,
            id = profiles::ID,
        );

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = conn.prepare(&query)?;
        let documents = stmt
            .query_map(
                params![filter.gender.as_str(), filter.age_min, filter.age_max, filter.exclude_key, limit],
                |row| row.get::<_, String>(0),
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        documents.iter().map(|doc| decode_profile(doc)).collect()
    }

    /// Insert a profile or replace the stored one with the same wallet address.
    ///
    /// The stored creation time is kept on update.
    pub fn upsert_profile(&self, profile: &Profile) -> Result<Profile> {
        let mut stored = profile.clone();
        let mut conn = self.get_connection()?;
        let tx = conn.transaction()?;

        let existing_created_at: Option<DateTime<Utc>> = tx
            .query_row(
                &format!(
                    "SELECT {} FROM {} WHERE {} = ?",
                    profiles::CREATED_AT,
                    profiles::TABLE,
                    profiles::WALLET_ADDRESS
                ),
                params![profile.wallet_address],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(created_at) = existing_created_at {
            stored.created_at = created_at;
        }

        let document = serde_json::to_string(&stored)?;
        tx.execute(
            &format!(
                "INSERT INTO {table} ({key}, {gender}, {age}, {active}, {created}, {last}, {doc}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
                 ON CONFLICT({key}) DO UPDATE SET \
                 {gender} = excluded.{gender}, {age} = excluded.{age}, {active} = excluded.{active}, \
                 {last} = excluded.{last}, {doc} = excluded.{doc}",
                table = profiles::TABLE,
                key = profiles::WALLET_ADDRESS,
                gender = profiles::GENDER,
                age = profiles::AGE,
                active = profiles::IS_ACTIVE,
                created = profiles::CREATED_AT,
                last = profiles::LAST_ACTIVE,
                doc = profiles::DOCUMENT,
            ),
            params![
                stored.wallet_address,
                stored.gender.as_str(),
                stored.age,
                stored.is_active,
                stored.created_at,
                stored.last_active,
                document
            ],
        )?;
        tx.commit()?;

        Ok(stored)
    }

    /// Append an interaction to the log
    pub fn add_interaction(&self, new_interaction: NewInteraction) -> Result<MatchInteraction> {
        let conn = self.get_connection()?;

        let (kind, content, url) = match &new_interaction.message {
            Some(payload) => (Some(payload.kind.as_str()), payload.content.as_deref(), payload.url.as_deref()),
            None => (None, None, None),
        };

        conn.execute(
            &format!(
                "INSERT INTO {} ({}, {}, {}, {}, {}, {}, {}) VALUES (?, ?, ?, ?, ?, ?, ?)",
                match_interactions::TABLE,
                match_interactions::SENDER,
                match_interactions::RECIPIENT,
                match_interactions::INTERACTION_TYPE,
                match_interactions::MESSAGE_KIND,
                match_interactions::CONTENT,
                match_interactions::URL,
                match_interactions::CREATED_AT
            ),
            params![
                new_interaction.sender,
                new_interaction.recipient,
                new_interaction.interaction_type.as_str(),
                kind,
                content,
                url,
                new_interaction.created_at
            ],
        )?;

        let id = conn.last_insert_rowid();
        Ok(MatchInteraction::from_new(id, new_interaction))
    }

    /// Interactions of `interaction_type` sent by `wallet_address`, newest first
    pub fn get_interactions_by_sender(
        &self,
        wallet_address: &str,
        interaction_type: InteractionType,
    ) -> Result<Vec<MatchInteraction>> {
        self.interactions_where(match_interactions::SENDER, wallet_address, interaction_type)
    }

    /// Interactions of `interaction_type` received by `wallet_address`, newest first
    pub fn get_interactions_by_recipient(
        &self,
        wallet_address: &str,
        interaction_type: InteractionType,
    ) -> Result<Vec<MatchInteraction>> {
        self.interactions_where(match_interactions::RECIPIENT, wallet_address, interaction_type)
    }

    fn interactions_where(
        &self,
        column: &str,
        wallet_address: &str,
        interaction_type: InteractionType,
    ) -> Result<Vec<MatchInteraction>> {
        let conn = self.get_connection()?;

        let query = format!(
            "SELECT * FROM {} WHERE {} = ? AND {} = ? ORDER BY {} DESC, {} DESC",
            match_interactions::TABLE,
            column,
            match_interactions::INTERACTION_TYPE,
            match_interactions::CREATED_AT,
            match_interactions::ID
        );

        let mut stmt = conn.prepare(&query)?;
        let rows = stmt.query_map(params![wallet_address, interaction_type.as_str()], map_interaction)?;

        let mut results = Vec::new();
        for interaction in rows {
            results.push(interaction?);
        }

        Ok(results)
    }
}

fn decode_profile(document: &str) -> Result<Profile> {
    Ok(serde_json::from_str(document)?)
}

fn conversion_error(column: usize, err: MatchError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(err))
}

/// Map a database row to a `MatchInteraction`
fn map_interaction(row: &Row) -> rusqlite::Result<MatchInteraction> {
    let type_idx = row.as_ref().column_index(match_interactions::INTERACTION_TYPE)?;
    let interaction_type = row
        .get::<_, String>(type_idx)?
        .parse::<InteractionType>()
        .map_err(|e| conversion_error(type_idx, e))?;

    let kind_idx = row.as_ref().column_index(match_interactions::MESSAGE_KIND)?;
    let message = match row.get::<_, Option<String>>(kind_idx)? {
        Some(kind) => Some(MessagePayload {
            kind: kind.parse::<MessageKind>().map_err(|e| conversion_error(kind_idx, e))?,
            content: row.get(match_interactions::CONTENT)?,
            url: row.get(match_interactions::URL)?,
        }),
        None => None,
    };

    Ok(MatchInteraction {
        id: row.get(match_interactions::ID)?,
        sender: row.get(match_interactions::SENDER)?,
        recipient: row.get(match_interactions::RECIPIENT)?,
        interaction_type,
        message,
        created_at: row.get(match_interactions::CREATED_AT)?,
    })
}
