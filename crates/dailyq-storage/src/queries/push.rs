// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Web-push subscription operations.
//!
//! Subscriptions are upserted on registration and disabled (never deleted)
//! when the push service reports them gone, so re-registration from the same
//! browser reactivates the row in place.

use dailyq_core::DailyqError;
use rusqlite::params;

use crate::database::Database;
use crate::models::PushSubscription;

fn subscription_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PushSubscription> {
    Ok(PushSubscription {
        id: row.get(0)?,
        user_id: row.get(1)?,
        endpoint: row.get(2)?,
        p256dh: row.get(3)?,
        auth: row.get(4)?,
        user_agent: row.get(5)?,
        is_enabled: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

const SUBSCRIPTION_COLUMNS: &str =
    "id, user_id, endpoint, p256dh, auth, user_agent, is_enabled, created_at, updated_at";

/// Save a push subscription (upsert by (user, endpoint)).
///
/// Refreshes the encryption keys, re-enables a previously disabled row, and
/// updates `updated_at`.
pub async fn save_subscription(
    db: &Database,
    user_id: &str,
    endpoint: &str,
    p256dh: &str,
    auth: &str,
    user_agent: Option<&str>,
) -> Result<(), DailyqError> {
    let user_id = user_id.to_string();
    let endpoint = endpoint.to_string();
    let p256dh = p256dh.to_string();
    let auth = auth.to_string();
    let user_agent = user_agent.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO push_subscriptions (user_id, endpoint, p256dh, auth, user_agent)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (user_id, endpoint) DO UPDATE SET
                     p256dh = excluded.p256dh,
                     auth = excluded.auth,
                     user_agent = excluded.user_agent,
                     is_enabled = 1,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![user_id, endpoint, p256dh, auth, user_agent],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All enabled subscriptions for a user.
pub async fn subscriptions_for_user(
    db: &Database,
    user_id: &str,
) -> Result<Vec<PushSubscription>, DailyqError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SUBSCRIPTION_COLUMNS} FROM push_subscriptions
                 WHERE user_id = ?1 AND is_enabled = 1
                 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map(params![user_id], subscription_from_row)?;
            let mut subscriptions = Vec::new();
            for row in rows {
                subscriptions.push(row?);
            }
            Ok(subscriptions)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Look up an enabled subscription by its endpoint URL.
pub async fn subscription_by_endpoint(
    db: &Database,
    endpoint: &str,
) -> Result<Option<PushSubscription>, DailyqError> {
    let endpoint = endpoint.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!(
                    "SELECT {SUBSCRIPTION_COLUMNS} FROM push_subscriptions
                     WHERE endpoint = ?1 AND is_enabled = 1
                     LIMIT 1"
                ),
                params![endpoint],
                subscription_from_row,
            );
            match result {
                Ok(subscription) => Ok(Some(subscription)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Disable every subscription row for an endpoint (the push service reported
/// it gone, or the user unsubscribed).
pub async fn disable_subscription(db: &Database, endpoint: &str) -> Result<(), DailyqError> {
    let endpoint = endpoint.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE push_subscriptions
                 SET is_enabled = 0,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE endpoint = ?1",
                params![endpoint],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
