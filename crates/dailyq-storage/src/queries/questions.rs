// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Question and subscription-preference operations.
//!
//! Questions are managed by the admin surface; this core only creates them on
//! behalf of that collaborator and reads them for sequencing. Option lists are
//! stored as a JSON array in the `options` column.

use dailyq_core::DailyqError;
use rusqlite::params;

use crate::database::Database;
use crate::models::Question;

pub(crate) fn question_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Question> {
    let options_json: String = row.get(2)?;
    let options = serde_json::from_str(&options_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Question {
        id: row.get(0)?,
        text: row.get(1)?,
        options,
        is_active: row.get(3)?,
        position: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub(crate) const QUESTION_COLUMNS: &str = "id, text, options, is_active, position, created_at";

/// Create a question, assigning the next sequencing position.
pub async fn create_question(
    db: &Database,
    text: &str,
    options: &[String],
) -> Result<Question, DailyqError> {
    let id = uuid::Uuid::new_v4().to_string();
    let text = text.to_string();
    let options_json = serde_json::to_string(options).map_err(|e| DailyqError::Storage {
        source: Box::new(e),
    })?;

    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO questions (id, text, options, position)
                 VALUES (?1, ?2, ?3,
                         (SELECT COALESCE(MAX(position), 0) + 1 FROM questions))",
                params![id, text, options_json],
            )?;
            conn.query_row(
                &format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?1"),
                params![id],
                question_from_row,
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a question by id.
pub async fn get_question(db: &Database, id: &str) -> Result<Option<Question>, DailyqError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?1"),
                params![id],
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

/// Subscribe or unsubscribe a user to a question (upsert).
pub async fn set_preference(
    db: &Database,
    user_id: &str,
    question_id: &str,
    enabled: bool,
) -> Result<(), DailyqError> {
    let user_id = user_id.to_string();
    let question_id = question_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO question_preferences (user_id, question_id, is_enabled)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (user_id, question_id) DO UPDATE SET is_enabled = excluded.is_enabled",
                params![user_id, question_id, enabled],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// A user's enabled, active questions ordered by sequencing position.
pub async fn enabled_questions_for_user(
    db: &Database,
    user_id: &str,
) -> Result<Vec<Question>, DailyqError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT q.id, q.text, q.options, q.is_active, q.position, q.created_at
                 FROM questions q
                 JOIN question_preferences p ON p.question_id = q.id
                 WHERE p.user_id = ?1 AND p.is_enabled = 1 AND q.is_active = 1
                 ORDER BY q.position ASC",
            )?;
            let rows = stmt.query_map(params![user_id], question_from_row)?;
            let mut questions = Vec::new();
            for row in rows {
                questions.push(row?);
            }
            Ok(questions)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
