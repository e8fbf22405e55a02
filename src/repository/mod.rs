mod conversion;
mod intention_repository;
mod local_storage_repository;

pub use intention_repository::{IntentionRepository, PrayerOutcome};
pub use local_storage_repository::LocalStorageRepository;

#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("In-memory database should open");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Migrations should apply to an empty database");

    pool
}
