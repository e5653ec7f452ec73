use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::entity::{chat, message};

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Composite index for chat history reads:
    // SELECT * FROM message WHERE chat_id = ? ORDER BY created_at
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_message_chat_created")
        .table(message::Entity)
        .col(message::Column::ChatId)
        .col(message::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_message_chat_created exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_message_chat_created: {}", e);
        }
    }

    // Composite index for the sidebar listing:
    // SELECT ... FROM chat WHERE user_id = ? ORDER BY updated_at DESC
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_chat_user_updated")
        .table(chat::Entity)
        .col(chat::Column::UserId)
        .col(chat::Column::UpdatedAt)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_chat_user_updated exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_chat_user_updated: {}", e);
        }
    }

    Ok(())
}
