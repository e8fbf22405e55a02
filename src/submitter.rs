use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use poise::serenity_prelude::UserId;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::{
    gate::{LocalStore, SubmissionGate},
    ip_locator::{IpLocator, LocatorError},
    models::{types::UtcDateTime, Intention, NewIntention, ShortCode},
};

pub const MAX_CONTENT_LENGTH: usize = 4000;

/// Where intentions are persisted.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create(&self, intention: NewIntention) -> Result<Intention, anyhow::Error>;
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("The intention is empty")]
    EmptyContent,
    #[error("The intention is longer than {max} characters")]
    ContentTooLong { max: usize },
    #[error("A new intention can be sent at {unlock_at}")]
    CoolingDown { unlock_at: OffsetDateTime },
    #[error("Could not locate the submission: {0}")]
    Lookup(#[from] LocatorError),
    #[error("Could not save the intention: {0}")]
    Store(anyhow::Error),
}

#[derive(Debug)]
pub struct SubmissionReceipt {
    pub intention: Intention,
    /// `None` when the cooldown could not be written.
    pub unlock_at: Option<OffsetDateTime>,
}

pub struct IntentionSubmitter {
    locator: Arc<dyn IpLocator>,
    records: Arc<dyn RecordStore>,
    in_flight: Mutex<HashMap<UserId, Arc<tokio::sync::Mutex<()>>>>,
}

impl IntentionSubmitter {
    pub fn new(locator: Arc<dyn IpLocator>, records: Arc<dyn RecordStore>) -> IntentionSubmitter {
        IntentionSubmitter {
            locator,
            records,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Submissions of one visitor run one at a time, from the gate check
    /// until the cooldown is recorded.
    ///
    /// Nothing is retried: on failure the gate is left as it was, so the
    /// visitor may try again right away.
    #[tracing::instrument(skip(self, gate, content, now))]
    pub async fn submit<S: LocalStore>(
        &self,
        visitor: UserId,
        gate: &SubmissionGate<S>,
        content: &str,
        now: OffsetDateTime,
    ) -> Result<SubmissionReceipt, SubmitError> {
        let content = content.trim();

        if content.is_empty() {
            return Err(SubmitError::EmptyContent);
        }

        if content.chars().count() > MAX_CONTENT_LENGTH {
            return Err(SubmitError::ContentTooLong {
                max: MAX_CONTENT_LENGTH,
            });
        }

        let lock = self.visitor_lock(visitor);
        let _guard = lock.lock().await;

        let status = gate.check_gate(now).await;
        if !status.allowed {
            if let Some(unlock_at) = status.unlock_at {
                return Err(SubmitError::CoolingDown { unlock_at });
            }
        }

        let ip = self.locator.public_ip().await?;
        let location = self.locator.locate(ip).await?;
        debug!("Submission comes from {ip}");

        let intention = self
            .records
            .create(NewIntention {
                code: ShortCode::generate(),
                content: content.to_string(),
                created_at: UtcDateTime::from(now),
                ip: ip.to_string(),
                location,
                prayers: vec![],
                comments: vec![],
            })
            .await
            .map_err(SubmitError::Store)?;

        info!("Intention {} has been created", intention.code);

        let unlock_at = match gate.record_submission(now).await {
            Ok(unlock_at) => Some(unlock_at),
            Err(err) => {
                warn!(
                    "Could not record the cooldown for intention {}: {err}",
                    intention.code
                );
                None
            }
        };

        Ok(SubmissionReceipt {
            intention,
            unlock_at,
        })
    }

    fn visitor_lock(&self, visitor: UserId) -> Arc<tokio::sync::Mutex<()>> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Locks nobody is holding or waiting for.
        in_flight.retain(|_, lock| Arc::strong_count(lock) > 1);

        in_flight.entry(visitor).or_default().clone()
    }
}
