// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User and channel-link CRUD operations.

use dailyq_core::fsm::ConversationState;
use dailyq_core::DailyqError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{ChannelKind, ChannelLink, User};

pub(crate) fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        display_name: row.get(1)?,
        is_active: row.get(2)?,
        conversation_state: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn link_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChannelLink> {
    let channel: String = row.get(2)?;
    let channel = channel.parse::<ChannelKind>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(ChannelLink {
        id: row.get(0)?,
        user_id: row.get(1)?,
        channel,
        native_id: row.get(3)?,
        is_enabled: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Resolve a channel-native identity to its user, creating the user and the
/// channel link on first contact.
///
/// The select and the insert run in one transaction so concurrent webhook
/// deliveries for the same identity race to a single user row.
pub async fn find_or_create_by_channel(
    db: &Database,
    channel: ChannelKind,
    native_id: &str,
    display_name: Option<&str>,
) -> Result<User, DailyqError> {
    let channel = channel.to_string();
    let native_id = native_id.to_string();
    let display_name = display_name.map(|s| s.to_string());
    let new_user_id = uuid::Uuid::new_v4().to_string();

    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let existing = tx.query_row(
                "SELECT u.id, u.display_name, u.is_active, u.conversation_state,
                        u.created_at, u.updated_at
                 FROM users u
                 JOIN channel_links l ON l.user_id = u.id
                 WHERE l.channel = ?1 AND l.native_id = ?2",
                params![channel, native_id],
                user_from_row,
            );

            match existing {
                Ok(user) => {
                    tx.commit()?;
                    Ok(user)
                }
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    tx.execute(
                        "INSERT INTO users (id, display_name) VALUES (?1, ?2)",
                        params![new_user_id, display_name],
                    )?;
                    tx.execute(
                        "INSERT INTO channel_links (user_id, channel, native_id)
                         VALUES (?1, ?2, ?3)",
                        params![new_user_id, channel, native_id],
                    )?;
                    let user = tx.query_row(
                        "SELECT id, display_name, is_active, conversation_state,
                                created_at, updated_at
                         FROM users WHERE id = ?1",
                        params![new_user_id],
                        user_from_row,
                    )?;
                    tx.commit()?;
                    Ok(user)
                }
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a user by id.
pub async fn get_user(db: &Database, id: &str) -> Result<Option<User>, DailyqError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT id, display_name, is_active, conversation_state,
                        created_at, updated_at
                 FROM users WHERE id = ?1",
                params![id],
                user_from_row,
            );
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Persist a user's conversation state and refresh `updated_at`.
pub async fn update_conversation_state(
    db: &Database,
    user_id: &str,
    state: ConversationState,
) -> Result<(), DailyqError> {
    let user_id = user_id.to_string();
    let state = state.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE users
                 SET conversation_state = ?1,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![state, user_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Active users with at least one enabled preference on an active question,
/// ordered by creation time.
pub async fn broadcast_targets(db: &Database) -> Result<Vec<User>, DailyqError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT u.id, u.display_name, u.is_active, u.conversation_state,
                        u.created_at, u.updated_at
                 FROM users u
                 JOIN question_preferences p ON p.user_id = u.id AND p.is_enabled = 1
                 JOIN questions q ON q.id = p.question_id AND q.is_active = 1
                 WHERE u.is_active = 1
                 ORDER BY u.created_at ASC, u.id ASC",
            )?;
            let rows = stmt.query_map([], user_from_row)?;
            let mut users = Vec::new();
            for row in rows {
                users.push(row?);
            }
            Ok(users)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Enabled channel links for a user, oldest first.
pub async fn enabled_channel_links(
    db: &Database,
    user_id: &str,
) -> Result<Vec<ChannelLink>, DailyqError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, channel, native_id, is_enabled, created_at
                 FROM channel_links
                 WHERE user_id = ?1 AND is_enabled = 1
                 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![user_id], link_from_row)?;
            let mut links = Vec::new();
            for row in rows {
                links.push(row?);
            }
            Ok(links)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Create or re-enable a channel link for an existing user.
///
/// Used by push-subscription registration, where the user already exists via
/// the auth surface and the link is keyed by the subscription endpoint.
pub async fn upsert_channel_link(
    db: &Database,
    user_id: &str,
    channel: ChannelKind,
    native_id: &str,
) -> Result<(), DailyqError> {
    let user_id = user_id.to_string();
    let channel = channel.to_string();
    let native_id = native_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO channel_links (user_id, channel, native_id)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (channel, native_id) DO UPDATE SET is_enabled = 1",
                params![user_id, channel, native_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Disable a channel link.
pub async fn disable_channel_link(
    db: &Database,
    channel: ChannelKind,
    native_id: &str,
) -> Result<(), DailyqError> {
    let channel = channel.to_string();
    let native_id = native_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE channel_links SET is_enabled = 0
                 WHERE channel = ?1 AND native_id = ?2",
                params![channel, native_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn first_contact_creates_user_and_link() {
        let (db, _dir) = setup_db().await;

        let user =
            find_or_create_by_channel(&db, ChannelKind::Telegram, "12345", Some("Test User"))
                .await
                .unwrap();
        assert!(user.is_active);
        assert_eq!(user.display_name.as_deref(), Some("Test User"));
        assert!(user.conversation_state.is_none());

        let links = enabled_channel_links(&db, &user.id).await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].channel, ChannelKind::Telegram);
        assert_eq!(links[0].native_id, "12345");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn repeated_contact_resolves_to_same_user() {
        let (db, _dir) = setup_db().await;

        let first = find_or_create_by_channel(&db, ChannelKind::Telegram, "12345", None)
            .await
            .unwrap();
        let second = find_or_create_by_channel(&db, ChannelKind::Telegram, "12345", None)
            .await
            .unwrap();
        assert_eq!(first.id, second.id);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn same_native_id_on_different_channels_is_different_users() {
        let (db, _dir) = setup_db().await;

        let telegram = find_or_create_by_channel(&db, ChannelKind::Telegram, "5550001", None)
            .await
            .unwrap();
        let whatsapp = find_or_create_by_channel(&db, ChannelKind::WhatsApp, "5550001", None)
            .await
            .unwrap();
        assert_ne!(telegram.id, whatsapp.id);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn conversation_state_round_trips() {
        let (db, _dir) = setup_db().await;

        let user = find_or_create_by_channel(&db, ChannelKind::Telegram, "1", None)
            .await
            .unwrap();
        update_conversation_state(&db, &user.id, ConversationState::AwaitingAnswer)
            .await
            .unwrap();

        let reloaded = get_user(&db, &user.id).await.unwrap().unwrap();
        assert_eq!(
            reloaded.conversation_state.as_deref(),
            Some("awaiting_answer")
        );
        assert_eq!(reloaded.current_state(), ConversationState::AwaitingAnswer);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_nonexistent_user_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_user(&db, "no-such-user").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn broadcast_targets_require_enabled_preference() {
        let (db, _dir) = setup_db().await;

        let subscribed = find_or_create_by_channel(&db, ChannelKind::Telegram, "1", None)
            .await
            .unwrap();
        let _unsubscribed = find_or_create_by_channel(&db, ChannelKind::Telegram, "2", None)
            .await
            .unwrap();

        let question = crate::queries::questions::create_question(
            &db,
            "Sleep well?",
            &["Yes".into(), "No".into()],
        )
        .await
        .unwrap();
        crate::queries::questions::set_preference(&db, &subscribed.id, &question.id, true)
            .await
            .unwrap();

        let targets = broadcast_targets(&db).await.unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].id, subscribed.id);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn disabled_links_are_not_listed() {
        let (db, _dir) = setup_db().await;

        let user = find_or_create_by_channel(&db, ChannelKind::Telegram, "1", None)
            .await
            .unwrap();
        disable_channel_link(&db, ChannelKind::Telegram, "1")
            .await
            .unwrap();

        assert!(enabled_channel_links(&db, &user.id).await.unwrap().is_empty());

        // Upsert re-enables the same link.
        upsert_channel_link(&db, &user.id, ChannelKind::Telegram, "1")
            .await
            .unwrap();
        assert_eq!(enabled_channel_links(&db, &user.id).await.unwrap().len(), 1);

        db.close().await.unwrap();
    }
}
