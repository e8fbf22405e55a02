use async_trait::async_trait;
use poise::serenity_prelude::UserId;
use sqlx::{query, query_as, query_scalar, FromRow, Pool, Sqlite};

use crate::{
    models::{
        types::UtcDateTime, Comment, Intention, IntentionId, Location, NewIntention, Prayer,
        ShortCode,
    },
    submitter::RecordStore,
};

use super::conversion::DBConvertible;

#[derive(Clone, Debug)]
pub struct IntentionRepository {
    pool: Pool<Sqlite>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum PrayerOutcome {
    Recorded,
    AlreadyPrayed,
    NotFound,
}

impl IntentionRepository {
    pub fn new(pool: Pool<Sqlite>) -> IntentionRepository {
        IntentionRepository { pool }
    }

    pub async fn create_intention(
        &self,
        intention: &NewIntention,
    ) -> Result<Intention, anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        let id = {
            let code = intention.code.to_db()?;
            let created_at = intention.created_at.to_db()?;
            let location = &intention.location;

            query_scalar::<_, i64>(
                r#"
                    INSERT INTO intencoes (
                        code,
                        content,
                        created_at,
                        ip,
                        country,
                        country_code,
                        region,
                        region_code,
                        city,
                        postal,
                        latitude,
                        longitude,
                        timezone)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                    RETURNING id
                "#,
            )
            .bind(code)
            .bind(&intention.content)
            .bind(created_at)
            .bind(&intention.ip)
            .bind(&location.country)
            .bind(&location.country_code)
            .bind(&location.region)
            .bind(&location.region_code)
            .bind(&location.city)
            .bind(&location.postal)
            .bind(location.latitude)
            .bind(location.longitude)
            .bind(&location.timezone)
            .fetch_one(&mut *transaction)
            .await?
        };

        for prayer in &intention.prayers {
            query(
                r#"
                    INSERT INTO intention_prayers (intention_id, intercessor, prayed_at)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (intention_id, intercessor) DO NOTHING
                "#,
            )
            .bind(id)
            .bind(prayer.intercessor.to_db()?)
            .bind(prayer.prayed_at.to_db()?)
            .execute(&mut *transaction)
            .await?;
        }

        for comment in &intention.comments {
            query(
                r#"
                    INSERT INTO intention_comments (intention_id, author, content, created_at)
                    VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(id)
            .bind(comment.author.to_db()?)
            .bind(&comment.content)
            .bind(comment.created_at.to_db()?)
            .execute(&mut *transaction)
            .await?;
        }

        transaction.commit().await?;

        Ok(Intention {
            id: IntentionId::from_db(&id)?,
            code: intention.code.clone(),
            content: intention.content.clone(),
            created_at: intention.created_at,
            ip: intention.ip.clone(),
            location: intention.location.clone(),
            prayers: intention.prayers.clone(),
            comments: intention.comments.clone(),
        })
    }

    pub async fn find_by_code(&self, code: &ShortCode) -> Result<Option<Intention>, anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        let intention = {
            let code = code.to_db()?;

            query_as::<_, SqlIntention>(
                r#"
                    SELECT * FROM intencoes
                    WHERE code = $1
                    LIMIT 1
                "#,
            )
            .bind(code)
            .fetch_optional(&mut *transaction)
            .await?
        };

        let Some(intention) = intention else {
            return Ok(None);
        };

        let prayers = query_as::<_, SqlPrayer>(
            r#"
                SELECT intercessor, prayed_at FROM intention_prayers
                WHERE intention_id = $1
                ORDER BY id
            "#,
        )
        .bind(intention.id)
        .fetch_all(&mut *transaction)
        .await?;

        let comments = query_as::<_, SqlComment>(
            r#"
                SELECT author, content, created_at FROM intention_comments
                WHERE intention_id = $1
                ORDER BY id
            "#,
        )
        .bind(intention.id)
        .fetch_all(&mut *transaction)
        .await?;

        transaction.commit().await?;

        Ok(Some(Intention {
            id: IntentionId::from_db(&intention.id)?,
            code: ShortCode::from_db(&intention.code)?,
            content: intention.content,
            created_at: UtcDateTime::from_db(&intention.created_at)?,
            ip: intention.ip,
            location: Location {
                country: intention.country,
                country_code: intention.country_code,
                region: intention.region,
                region_code: intention.region_code,
                city: intention.city,
                postal: intention.postal,
                latitude: intention.latitude,
                longitude: intention.longitude,
                timezone: intention.timezone,
            },
            prayers: prayers
                .iter()
                .map(|prayer| -> Result<Prayer, anyhow::Error> {
                    Ok(Prayer {
                        intercessor: UserId::from_db(&prayer.intercessor)?,
                        prayed_at: UtcDateTime::from_db(&prayer.prayed_at)?,
                    })
                })
                .collect::<Result<_, _>>()?,
            comments: comments
                .iter()
                .map(|comment| -> Result<Comment, anyhow::Error> {
                    Ok(Comment {
                        author: UserId::from_db(&comment.author)?,
                        content: comment.content.clone(),
                        created_at: UtcDateTime::from_db(&comment.created_at)?,
                    })
                })
                .collect::<Result<_, _>>()?,
        }))
    }

    /// An intercessor is counted once per intention.
    pub async fn add_prayer(
        &self,
        code: &ShortCode,
        intercessor: UserId,
        prayed_at: UtcDateTime,
    ) -> Result<PrayerOutcome, anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        let Some(intention_id) = find_id(&mut transaction, code).await? else {
            return Ok(PrayerOutcome::NotFound);
        };

        let inserted = query(
            r#"
                INSERT INTO intention_prayers (intention_id, intercessor, prayed_at)
                VALUES ($1, $2, $3)
                ON CONFLICT (intention_id, intercessor) DO NOTHING
            "#,
        )
        .bind(intention_id)
        .bind(intercessor.to_db()?)
        .bind(prayed_at.to_db()?)
        .execute(&mut *transaction)
        .await?
        .rows_affected();

        transaction.commit().await?;

        Ok(if inserted > 0 {
            PrayerOutcome::Recorded
        } else {
            PrayerOutcome::AlreadyPrayed
        })
    }

    /// Returns `None` when there is no intention with this code.
    pub async fn add_comment(
        &self,
        code: &ShortCode,
        author: UserId,
        content: &str,
        created_at: UtcDateTime,
    ) -> Result<Option<Comment>, anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        let Some(intention_id) = find_id(&mut transaction, code).await? else {
            return Ok(None);
        };

        query(
            r#"
                INSERT INTO intention_comments (intention_id, author, content, created_at)
                VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(intention_id)
        .bind(author.to_db()?)
        .bind(content)
        .bind(created_at.to_db()?)
        .execute(&mut *transaction)
        .await?;

        transaction.commit().await?;

        Ok(Some(Comment {
            author,
            content: content.to_string(),
            created_at,
        }))
    }
}

async fn find_id(
    transaction: &mut sqlx::Transaction<'_, Sqlite>,
    code: &ShortCode,
) -> Result<Option<i64>, anyhow::Error> {
    let code = code.to_db()?;

    let id = query_scalar::<_, i64>("SELECT id FROM intencoes WHERE code = $1")
        .bind(code)
        .fetch_optional(&mut **transaction)
        .await?;

    Ok(id)
}

#[async_trait]
impl RecordStore for IntentionRepository {
    async fn create(&self, intention: NewIntention) -> Result<Intention, anyhow::Error> {
        self.create_intention(&intention).await
    }
}

#[derive(Debug, FromRow)]
struct SqlIntention {
    id: i64,
    code: String,
    content: String,
    created_at: String,
    ip: String,
    country: Option<String>,
    country_code: Option<String>,
    region: Option<String>,
    region_code: Option<String>,
    city: Option<String>,
    postal: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    timezone: Option<String>,
}

#[derive(Debug, FromRow)]
struct SqlPrayer {
    intercessor: i64,
    prayed_at: String,
}

#[derive(Debug, FromRow)]
struct SqlComment {
    author: i64,
    content: String,
    created_at: String,
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude::UserId;
    use time::{macros::datetime, Duration};

    use super::{IntentionRepository, PrayerOutcome};
    use crate::{
        models::{types::UtcDateTime, Location, NewIntention, ShortCode},
        repository::test_pool,
    };

    fn new_intention(code: &str) -> NewIntention {
        NewIntention {
            code: code.parse().unwrap(),
            content: "Please pray for my family".to_string(),
            created_at: UtcDateTime::from(datetime!(2020-04-20 16:20 UTC)),
            ip: "203.0.113.7".to_string(),
            location: Location {
                country: Some("Brazil".to_string()),
                country_code: Some("BR".to_string()),
                city: Some("Curitiba".to_string()),
                latitude: Some(-25.4284),
                longitude: Some(-49.2733),
                ..Default::default()
            },
            prayers: vec![],
            comments: vec![],
        }
    }

    #[test_log::test(tokio::test)]
    async fn creates_and_finds_intentions() {
        let repository = IntentionRepository::new(test_pool().await);

        let created = repository
            .create_intention(&new_intention("PPBqWA9xyz"))
            .await
            .unwrap();
        let found = repository
            .find_by_code(&created.code)
            .await
            .unwrap()
            .expect("The intention was just created");

        assert_eq!(found, created);
        assert!(found.prayers.is_empty());
        assert!(found.comments.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn unknown_code() {
        let repository = IntentionRepository::new(test_pool().await);
        let code: ShortCode = "nothing_here".parse().unwrap();

        assert_eq!(repository.find_by_code(&code).await.unwrap(), None);
        assert_eq!(
            repository
                .add_prayer(&code, UserId::new(1), UtcDateTime::now())
                .await
                .unwrap(),
            PrayerOutcome::NotFound
        );
        assert_eq!(
            repository
                .add_comment(&code, UserId::new(1), "Amen", UtcDateTime::now())
                .await
                .unwrap(),
            None
        );
    }

    #[test_log::test(tokio::test)]
    async fn codes_are_unique() {
        let repository = IntentionRepository::new(test_pool().await);

        repository
            .create_intention(&new_intention("PPBqWA9xyz"))
            .await
            .unwrap();

        assert!(repository
            .create_intention(&new_intention("PPBqWA9xyz"))
            .await
            .is_err());
    }

    #[test_log::test(tokio::test)]
    async fn intercessors_pray_once() {
        let repository = IntentionRepository::new(test_pool().await);
        let intention = repository
            .create_intention(&new_intention("PPBqWA9xyz"))
            .await
            .unwrap();
        let prayed_at = UtcDateTime::from(datetime!(2020-04-20 17:00 UTC));

        let first = repository
            .add_prayer(&intention.code, UserId::new(10), prayed_at)
            .await
            .unwrap();
        let second = repository
            .add_prayer(&intention.code, UserId::new(10), prayed_at)
            .await
            .unwrap();
        repository
            .add_prayer(&intention.code, UserId::new(11), prayed_at)
            .await
            .unwrap();

        assert_eq!(first, PrayerOutcome::Recorded);
        assert_eq!(second, PrayerOutcome::AlreadyPrayed);

        let found = repository.find_by_code(&intention.code).await.unwrap().unwrap();
        let intercessors: Vec<UserId> = found.prayers.iter().map(|p| p.intercessor).collect();
        assert_eq!(intercessors, vec![UserId::new(10), UserId::new(11)]);
    }

    #[test_log::test(tokio::test)]
    async fn comments_keep_their_order() {
        let repository = IntentionRepository::new(test_pool().await);
        let intention = repository
            .create_intention(&new_intention("PPBqWA9xyz"))
            .await
            .unwrap();
        let start = UtcDateTime::from(datetime!(2020-04-20 17:00 UTC));

        for (i, text) in ["Praying for you", "God bless", "Amen"].iter().enumerate() {
            repository
                .add_comment(
                    &intention.code,
                    UserId::new(10),
                    text,
                    start + Duration::minutes(i as i64),
                )
                .await
                .unwrap()
                .expect("The intention exists");
        }

        let found = repository.find_by_code(&intention.code).await.unwrap().unwrap();
        let texts: Vec<&str> = found.comments.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(texts, vec!["Praying for you", "God bless", "Amen"]);
    }
}
