// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily sequence ledger operations.
//!
//! One row per (user, question, day) records that a question was sent. The
//! absence of a row is the sole signal that the question is still pending for
//! the day, and the unique-keyed upsert in [`mark_sent`] is the single
//! serialization point that makes concurrent or retried delivery attempts
//! safe.

use chrono::NaiveDate;
use dailyq_core::DailyqError;
use rusqlite::params;

use crate::database::Database;
use crate::models::Question;
use crate::queries::questions::question_from_row;

/// The earliest-by-position subscribed question with no ledger row for
/// (user, question, day). `None` when the subscribed set is empty or fully
/// covered.
///
/// Deterministic across repeated calls within a day: retried webhooks keep
/// proposing the same question until it is marked sent.
pub async fn find_next_pending(
    db: &Database,
    user_id: &str,
    day: NaiveDate,
) -> Result<Option<Question>, DailyqError> {
    let user_id = user_id.to_string();
    let day = day.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT q.id, q.text, q.options, q.is_active, q.position, q.created_at
                 FROM questions q
                 JOIN question_preferences p ON p.question_id = q.id
                 WHERE p.user_id = ?1 AND p.is_enabled = 1 AND q.is_active = 1
                   AND NOT EXISTS (
                       SELECT 1 FROM daily_sequence_entries e
                       WHERE e.user_id = ?1 AND e.question_id = q.id AND e.day = ?2
                   )
                 ORDER BY q.position ASC
                 LIMIT 1",
                params![user_id, day],
                question_from_row,
            );
            match result {
                Ok(question) => Ok(Some(question)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record that a question was sent to a user on a day.
///
/// Idempotent upsert: a second mark for the same triple only refreshes
/// `sent_at` and never errors, so concurrent dispatch attempts race
/// harmlessly to the same end state.
pub async fn mark_sent(
    db: &Database,
    user_id: &str,
    question_id: &str,
    day: NaiveDate,
) -> Result<(), DailyqError> {
    let user_id = user_id.to_string();
    let question_id = question_id.to_string();
    let day = day.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO daily_sequence_entries (user_id, question_id, day)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (user_id, question_id, day)
                 DO UPDATE SET sent_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![user_id, question_id, day],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Whether any question was sent to the user on the given day, i.e. whether
/// an active sequence exists for inbound replies to continue.
pub async fn has_entries(
    db: &Database,
    user_id: &str,
    day: NaiveDate,
) -> Result<bool, DailyqError> {
    let user_id = user_id.to_string();
    let day = day.to_string();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM daily_sequence_entries
                 WHERE user_id = ?1 AND day = ?2",
                params![user_id, day],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The most recently sent question of the day, used to match free-text
/// replies against the options the user is currently looking at.
pub async fn last_sent(
    db: &Database,
    user_id: &str,
    day: NaiveDate,
) -> Result<Option<Question>, DailyqError> {
    let user_id = user_id.to_string();
    let day = day.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT q.id, q.text, q.options, q.is_active, q.position, q.created_at
                 FROM questions q
                 JOIN daily_sequence_entries e ON e.question_id = q.id
                 WHERE e.user_id = ?1 AND e.day = ?2
                 ORDER BY e.sent_at DESC, q.position DESC
                 LIMIT 1",
                params![user_id, day],
                question_from_row,
            );
            match result {
                Ok(question) => Ok(Some(question)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
