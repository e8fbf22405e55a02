use async_trait::async_trait;
use poise::serenity_prelude::UserId;
use sqlx::{query, query_as, query_scalar, Pool, Sqlite};

use crate::gate::LocalStore;

use super::conversion::DBConvertible;

/// Small per-visitor key/value storage, the bot's counterpart of a
/// browser's local storage.
#[derive(Clone, Debug)]
pub struct LocalStorageRepository {
    pool: Pool<Sqlite>,
}

impl LocalStorageRepository {
    pub fn new(pool: Pool<Sqlite>) -> LocalStorageRepository {
        LocalStorageRepository { pool }
    }

    pub fn scoped(&self, visitor: UserId) -> VisitorStorage {
        VisitorStorage {
            repository: self.clone(),
            visitor,
        }
    }

    pub async fn get(&self, visitor: UserId, key: &str) -> Result<Option<String>, anyhow::Error> {
        let value = query_scalar::<_, String>(
            r#"
                SELECT value FROM local_storage
                WHERE visitor = $1 AND key = $2
            "#,
        )
        .bind(visitor.to_db()?)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    pub async fn set(&self, visitor: UserId, key: &str, value: &str) -> Result<(), anyhow::Error> {
        query(
            r#"
                INSERT INTO local_storage (visitor, key, value)
                VALUES ($1, $2, $3)
                ON CONFLICT (visitor, key) DO UPDATE SET value = $3
            "#,
        )
        .bind(visitor.to_db()?)
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn clear(&self, visitor: UserId, key: &str) -> Result<(), anyhow::Error> {
        query("DELETE FROM local_storage WHERE visitor = $1 AND key = $2")
            .bind(visitor.to_db()?)
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Every visitor that has a value stored under `key`.
    pub async fn entries_with_key(&self, key: &str) -> Result<Vec<(UserId, String)>, anyhow::Error> {
        let rows = query_as::<_, (i64, String)>(
            r#"
                SELECT visitor, value FROM local_storage
                WHERE key = $1
                ORDER BY visitor
            "#,
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(visitor, value)| -> Result<_, anyhow::Error> {
                Ok((UserId::from_db(&visitor)?, value))
            })
            .collect()
    }
}

pub struct VisitorStorage {
    repository: LocalStorageRepository,
    visitor: UserId,
}

#[async_trait]
impl LocalStore for VisitorStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, anyhow::Error> {
        self.repository.get(self.visitor, key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), anyhow::Error> {
        self.repository.set(self.visitor, key, value).await
    }

    async fn clear(&self, key: &str) -> Result<(), anyhow::Error> {
        self.repository.clear(self.visitor, key).await
    }
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude::UserId;
    use time::macros::datetime;

    use super::LocalStorageRepository;
    use crate::{
        gate::{GateStatus, LocalStore, SubmissionGate, LAST_RECORDED_AT_KEY},
        repository::test_pool,
    };

    #[test_log::test(tokio::test)]
    async fn values_are_scoped_per_visitor() {
        let repository = LocalStorageRepository::new(test_pool().await);
        let alice = repository.scoped(UserId::new(1));
        let bob = repository.scoped(UserId::new(2));

        alice.set("language", "pt").await.unwrap();
        bob.set("language", "es").await.unwrap();
        alice.set("language", "en").await.unwrap();

        assert_eq!(alice.get("language").await.unwrap().as_deref(), Some("en"));
        assert_eq!(bob.get("language").await.unwrap().as_deref(), Some("es"));

        alice.clear("language").await.unwrap();

        assert_eq!(alice.get("language").await.unwrap(), None);
        assert_eq!(bob.get("language").await.unwrap().as_deref(), Some("es"));
    }

    #[test_log::test(tokio::test)]
    async fn lists_entries_by_key() {
        let repository = LocalStorageRepository::new(test_pool().await);
        repository.set(UserId::new(2), "language", "es").await.unwrap();
        repository.set(UserId::new(1), "language", "pt").await.unwrap();
        repository.set(UserId::new(1), "other", "x").await.unwrap();

        assert_eq!(
            repository.entries_with_key("language").await.unwrap(),
            vec![
                (UserId::new(1), "pt".to_string()),
                (UserId::new(2), "es".to_string()),
            ]
        );
    }

    #[test_log::test(tokio::test)]
    async fn gate_over_sqlite() {
        let repository = LocalStorageRepository::new(test_pool().await);
        let now = datetime!(2020-04-20 16:20 UTC);
        let gate = SubmissionGate::new(repository.scoped(UserId::new(1)));
        let other_gate = SubmissionGate::new(repository.scoped(UserId::new(2)));

        let unlock_at = gate.record_submission(now).await.unwrap();

        assert_eq!(
            gate.check_gate(now).await,
            GateStatus {
                allowed: false,
                unlock_at: Some(unlock_at),
            }
        );
        assert!(other_gate.check_gate(now).await.allowed);
        assert!(repository
            .get(UserId::new(1), LAST_RECORDED_AT_KEY)
            .await
            .unwrap()
            .is_some());
    }
}
