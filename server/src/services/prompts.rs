//! Flat log of prompt/response pairs. Unrelated to tournament runs.

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, OptionalExtension};
use tracing::{error, info};
use uuid::Uuid;

use crate::db::Db;
use crate::error::AppError;
use crate::models::prompt::{NewPrompt, PromptRecord};

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn create_prompt(db: &Db, req: NewPrompt) -> Result<PromptRecord, AppError> {
    if req.content.trim().is_empty() {
        return Err(AppError::BadRequest("Prompt content cannot be empty".into()));
    }

    let id = req
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let stamp = now();
    let record = PromptRecord {
        id,
        content: req.content,
        response: req.response,
        created_at: stamp.clone(),
        updated_at: stamp,
    };

    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO prompts (id, content, response, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id,
                record.content,
                record.response,
                record.created_at,
                record.updated_at
            ],
        )
    })
    .map_err(|source| {
        error!(id = %record.id, error = %source, "error creating prompt");
        AppError::Persistence {
            action: "create the prompt",
            source,
        }
    })?;

    Ok(record)
}

pub fn get_prompt(db: &Db, id: &str) -> Result<PromptRecord, AppError> {
    let found = db
        .with_conn(|conn| {
            conn.query_row(
                "SELECT id, content, response, created_at, updated_at FROM prompts WHERE id = ?1",
                params![id],
                |row| {
                    Ok(PromptRecord {
                        id: row.get(0)?,
                        content: row.get(1)?,
                        response: row.get(2)?,
                        created_at: row.get(3)?,
                        updated_at: row.get(4)?,
                    })
                },
            )
            .optional()
        })
        .map_err(|source| {
            error!(%id, error = %source, "error fetching prompt");
            AppError::Persistence {
                action: "get the prompt",
                source,
            }
        })?;

    found.ok_or_else(|| AppError::NotFound(format!("Prompt {} not found", id)))
}

/// Deletes every record. Meant for development databases.
pub fn clear_prompts(db: &Db) -> Result<usize, AppError> {
    let deleted = db
        .with_conn(|conn| conn.execute("DELETE FROM prompts", []))
        .map_err(|source| {
            error!(error = %source, "error clearing prompts");
            AppError::Persistence {
                action: "clear the prompts",
                source,
            }
        })?;
    info!(deleted, "all prompts cleared");
    Ok(deleted)
}
