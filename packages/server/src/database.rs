use std::time::Duration;

use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::{info, warn};

use crate::entity::{comment, like};

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    // Set connection pool options
    opt.max_connections(50)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("shorts_server::entity::*")
        .sync(&db)
        .await?;

    Ok(db)
}

/// Create the indexes the schema sync does not know about.
///
/// The like index is unique: it is what makes concurrent toggles from the
/// same user collapse into a single row.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let unique_like = Index::create()
        .if_not_exists()
        .unique()
        .name("uq_likes_video_user")
        .table(like::Entity)
        .col(like::Column::VideoId)
        .col(like::Column::UserIdentifier)
        .to_string(PostgresQueryBuilder);

    // A failed unique index is fatal: toggles would double-count.
    db.execute_unprepared(&unique_like).await?;
    info!("Ensured index uq_likes_video_user exists");

    // Comment listing: WHERE video_id = ? ORDER BY created_at DESC
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_comments_video_created")
        .table(comment::Entity)
        .col(comment::Column::VideoId)
        .col(comment::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => info!("Ensured index idx_comments_video_created exists"),
        Err(e) => warn!("Failed to create index idx_comments_video_created: {}", e),
    }

    Ok(())
}
