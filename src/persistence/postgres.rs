//! PostgreSQL implementation of the message store and room directory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::{NewRoom, RoomRecord, StoredMessage};
use super::{MessageStore, RoomDirectory};
use crate::config::ChatConfig;
use crate::domain::UserIdentity;
use crate::error::ChatError;

/// Row tuple for `chat_messages` queries.
type MessageRow = (
    i64,
    i64,
    i64,
    String,
    String,
    DateTime<Utc>,
    bool,
    Option<DateTime<Utc>>,
);

/// Row tuple for `chat_rooms` queries with aggregated participants.
type RoomRow = (
    i64,
    String,
    Option<String>,
    bool,
    Option<i64>,
    DateTime<Utc>,
    Vec<i64>,
);

const MESSAGE_COLUMNS: &str = r#"id, room_id, user_id, username, content, "timestamp", edited, edited_at"#;

const ROOM_SELECT: &str = "SELECT r.id, r.name, r.description, r.is_public, r.created_by, r.created_at, \
     COALESCE(array_agg(p.user_id) FILTER (WHERE p.user_id IS NOT NULL), '{}') \
     FROM chat_rooms r LEFT JOIN chat_room_participants p ON p.room_id = r.id";

/// PostgreSQL-backed store and directory using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the configured database and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Persistence`] if the pool cannot be created or
    /// a migration fails.
    pub async fn connect(config: &ChatConfig) -> Result<Self, ChatError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(std::time::Duration::from_secs(
                config.database_connect_timeout_secs,
            ))
            .connect(&config.database_url)
            .await
            .map_err(|e| ChatError::Persistence(e.to_string()))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| ChatError::Persistence(e.to_string()))?;

        Ok(Self::new(pool))
    }
}

fn persistence_err(e: sqlx::Error) -> ChatError {
    ChatError::Persistence(e.to_string())
}

fn message_from_row(row: MessageRow) -> StoredMessage {
    let (id, room_id, user_id, username, content, timestamp, edited, edited_at) = row;
    StoredMessage {
        id,
        room_id,
        user_id,
        username,
        content,
        timestamp,
        edited,
        edited_at,
    }
}

fn room_from_row(row: RoomRow) -> RoomRecord {
    let (id, name, description, is_public, created_by, created_at, participants) = row;
    RoomRecord {
        id,
        name,
        description,
        is_public,
        created_by,
        created_at,
        participants,
    }
}

/// Returns `true` for PostgreSQL unique-violation errors (SQLSTATE 23505).
fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// Returns `true` for PostgreSQL foreign-key violations (SQLSTATE 23503).
fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23503"))
}

#[async_trait]
impl MessageStore for PostgresStore {
    async fn append(
        &self,
        room_id: i64,
        user: &UserIdentity,
        content: &str,
    ) -> Result<StoredMessage, ChatError> {
        let sql = format!(
            "INSERT INTO chat_messages (room_id, user_id, username, content) \
             VALUES ($1, $2, $3, $4) RETURNING {MESSAGE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(room_id)
            .bind(user.id)
            .bind(&user.username)
            .bind(content)
            .fetch_one(&self.pool)
            .await
            .map_err(persistence_err)?;

        Ok(message_from_row(row))
    }

    async fn list_by_room(&self, room_id: i64) -> Result<Vec<StoredMessage>, ChatError> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM chat_messages \
             WHERE room_id = $1 ORDER BY \"timestamp\" ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(room_id)
            .fetch_all(&self.pool)
            .await
            .map_err(persistence_err)?;

        Ok(rows.into_iter().map(message_from_row).collect())
    }

    async fn count_by_room(&self, room_id: i64) -> Result<i64, ChatError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chat_messages WHERE room_id = $1")
            .bind(room_id)
            .fetch_one(&self.pool)
            .await
            .map_err(persistence_err)
    }

    async fn last_by_room(&self, room_id: i64) -> Result<Option<StoredMessage>, ChatError> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM chat_messages \
             WHERE room_id = $1 ORDER BY \"timestamp\" DESC, id DESC LIMIT 1"
        );
        let row = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(room_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence_err)?;

        Ok(row.map(message_from_row))
    }

    async fn mark_edited(
        &self,
        message_id: i64,
        content: &str,
    ) -> Result<StoredMessage, ChatError> {
        let sql = format!(
            "UPDATE chat_messages SET content = $2, edited = TRUE, edited_at = now() \
             WHERE id = $1 RETURNING {MESSAGE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(message_id)
            .bind(content)
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence_err)?;

        row.map(message_from_row)
            .ok_or(ChatError::MessageNotFound(message_id))
    }
}

#[async_trait]
impl RoomDirectory for PostgresStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<RoomRecord>, ChatError> {
        let sql = format!("{ROOM_SELECT} WHERE r.name = $1 GROUP BY r.id");
        let row = sqlx::query_as::<_, RoomRow>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence_err)?;

        Ok(row.map(room_from_row))
    }

    async fn find_by_id(&self, room_id: i64) -> Result<Option<RoomRecord>, ChatError> {
        let sql = format!("{ROOM_SELECT} WHERE r.id = $1 GROUP BY r.id");
        let row = sqlx::query_as::<_, RoomRow>(&sql)
            .bind(room_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence_err)?;

        Ok(row.map(room_from_row))
    }

    async fn create(&self, room: NewRoom) -> Result<RoomRecord, ChatError> {
        let row = sqlx::query_as::<_, (i64, String, Option<String>, bool, Option<i64>, DateTime<Utc>)>(
            "INSERT INTO chat_rooms (name, description, is_public, created_by) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, name, description, is_public, created_by, created_at",
        )
        .bind(&room.name)
        .bind(&room.description)
        .bind(room.is_public)
        .bind(room.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ChatError::DuplicateRoom(room.name.clone())
            } else {
                persistence_err(e)
            }
        })?;

        let (id, name, description, is_public, created_by, created_at) = row;
        Ok(RoomRecord {
            id,
            name,
            description,
            is_public,
            created_by,
            created_at,
            participants: Vec::new(),
        })
    }

    async fn list_visible(&self, viewer: Option<i64>) -> Result<Vec<RoomRecord>, ChatError> {
        let rows = if let Some(user_id) = viewer {
            let sql = format!(
                "{ROOM_SELECT} WHERE r.is_public OR EXISTS \
                 (SELECT 1 FROM chat_room_participants q \
                  WHERE q.room_id = r.id AND q.user_id = $1) \
                 GROUP BY r.id ORDER BY r.created_at DESC"
            );
            sqlx::query_as::<_, RoomRow>(&sql)
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
        } else {
            let sql = format!("{ROOM_SELECT} WHERE r.is_public GROUP BY r.id ORDER BY r.created_at DESC");
            sqlx::query_as::<_, RoomRow>(&sql).fetch_all(&self.pool).await
        }
        .map_err(persistence_err)?;

        Ok(rows.into_iter().map(room_from_row).collect())
    }

    async fn add_participant(&self, room_id: i64, user_id: i64) -> Result<(), ChatError> {
        sqlx::query(
            "INSERT INTO chat_room_participants (room_id, user_id) VALUES ($1, $2) \
             ON CONFLICT (room_id, user_id) DO NOTHING",
        )
        .bind(room_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                ChatError::RoomNotFound(room_id.to_string())
            } else {
                persistence_err(e)
            }
        })?;

        Ok(())
    }

    async fn remove_participant(&self, room_id: i64, user_id: i64) -> Result<(), ChatError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM chat_rooms WHERE id = $1)")
                .bind(room_id)
                .fetch_one(&self.pool)
                .await
                .map_err(persistence_err)?;
        if !exists {
            return Err(ChatError::RoomNotFound(room_id.to_string()));
        }

        sqlx::query("DELETE FROM chat_room_participants WHERE room_id = $1 AND user_id = $2")
            .bind(room_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(persistence_err)?;

        Ok(())
    }
}
