use std::sync::Arc;

use poise::serenity_prelude::{CreateMessage, Http, UserId};
use time::{Duration, OffsetDateTime};
use tokio::{
    select,
    sync::{mpsc, Notify},
    task::JoinHandle,
};
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::{
    gate::{parse_boundary, CooldownSchedule, SubmissionGate, LAST_RECORDED_AT_KEY, UNSET_SENTINEL},
    i18n::{stored_language, text, MessageKey},
    repository::LocalStorageRepository,
};

const IDLE_SLEEP_DURATION: Duration = Duration::seconds(60 * 60 /* One hour */);
const COMMAND_BUFFER: usize = 128;

#[derive(Clone, Copy, Debug)]
pub enum CooldownCommand {
    Schedule {
        visitor: UserId,
        unlock_at: OffsetDateTime,
    },
}

#[derive(Clone, Debug)]
pub struct CooldownHandle {
    commands: mpsc::Sender<CooldownCommand>,
}

impl CooldownHandle {
    /// Replaces any countdown already running for the visitor.
    pub async fn schedule(&self, visitor: UserId, unlock_at: OffsetDateTime) {
        self.send(CooldownCommand::Schedule { visitor, unlock_at })
            .await;
    }

    async fn send(&self, command: CooldownCommand) {
        if let Err(err) = self.commands.send(command).await {
            warn!("Cooldown service is not running, dropping {:?}", err.0);
        }
    }
}

/// Finishes visitors' countdowns: resets the stored cooldown once it has
/// elapsed and, optionally, lets the visitor know in the DMs.
pub struct CooldownService {
    storage: LocalStorageRepository,
    http: Option<Arc<Http>>,
    schedule: CooldownSchedule<UserId>,
    commands: mpsc::Receiver<CooldownCommand>,
    shutdown: Arc<Notify>,
}

impl CooldownService {
    pub fn new(
        storage: LocalStorageRepository,
        shutdown: Arc<Notify>,
    ) -> (CooldownService, CooldownHandle) {
        let (sender, receiver) = mpsc::channel(COMMAND_BUFFER);

        let service = CooldownService {
            storage,
            http: None,
            schedule: CooldownSchedule::new(),
            commands: receiver,
            shutdown,
        };

        (service, CooldownHandle { commands: sender })
    }

    /// DM visitors when their countdown finishes.
    pub fn notify_with(mut self, http: Arc<Http>) -> CooldownService {
        self.http = Some(http);
        self
    }

    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(self.run().instrument(info_span!("cooldown_service")))
    }

    async fn run(mut self) {
        match self.restore(OffsetDateTime::now_utc()).await {
            Ok(restored) => info!("Restored {restored} pending cooldowns"),
            Err(err) => error!("Could not restore pending cooldowns: {err}"),
        }

        loop {
            let sleep_duration = sleep_duration(
                self.schedule
                    .next_deadline()
                    .map(|deadline| deadline - OffsetDateTime::now_utc())
                    .unwrap_or(IDLE_SLEEP_DURATION),
            );

            debug!(
                "Next cooldown check in {:?} ({} pending)",
                sleep_duration,
                self.schedule.len()
            );

            select! {
                _ = tokio::time::sleep(sleep_duration) => {
                    self.elapse(OffsetDateTime::now_utc()).await;
                }

                command = self.commands.recv() => {
                    match command {
                        Some(command) => self.apply(command),
                        None => {
                            info!("All cooldown handles are gone, stopping");
                            break;
                        }
                    }
                }

                _ = self.shutdown.notified() => {
                    info!("Shutting down");
                    break;
                }
            }
        }
    }

    fn apply(&mut self, command: CooldownCommand) {
        match command {
            CooldownCommand::Schedule { visitor, unlock_at } => {
                self.schedule.schedule(visitor, unlock_at);
            }
        }
    }

    /// Picks up the countdowns that were running before a restart. The ones
    /// that ran out in the meantime are finished right away.
    #[tracing::instrument(skip(self))]
    async fn restore(&mut self, now: OffsetDateTime) -> Result<usize, anyhow::Error> {
        let entries = self.storage.entries_with_key(LAST_RECORDED_AT_KEY).await?;

        for (visitor, value) in entries {
            if value == UNSET_SENTINEL {
                continue;
            }

            match parse_boundary(&value) {
                Some(unlock_at) => self.schedule.schedule(visitor, unlock_at),
                None => warn!("Ignoring unreadable cooldown of {visitor}: {value:?}"),
            }
        }

        let overdue = self.elapse(now).await;

        Ok(self.schedule.len() + overdue)
    }

    /// Returns how many countdowns were finished.
    #[tracing::instrument(skip(self))]
    async fn elapse(&mut self, now: OffsetDateTime) -> usize {
        let mut finished = 0;

        for visitor in self.schedule.take_due(now) {
            let gate = SubmissionGate::new(self.storage.scoped(visitor));

            // A newer submission may have moved the boundary before its
            // schedule command arrived.
            let status = gate.check_gate(now).await;
            if let (false, Some(unlock_at)) = (status.allowed, status.unlock_at) {
                debug!("Cooldown of {visitor} has moved, rescheduling");
                self.schedule.schedule(visitor, unlock_at);
                continue;
            }

            if let Err(err) = gate.on_cooldown_elapsed().await {
                error!("Could not reset the cooldown of {visitor}: {err}");
                continue;
            }

            finished += 1;

            if let Some(http) = &self.http {
                let language = stored_language(gate.store(), visitor).await;
                let message =
                    CreateMessage::new().content(text(language, MessageKey::CooldownElapsed));

                if let Err(err) = visitor.direct_message(&**http, message).await {
                    warn!("Could not tell {visitor} that their cooldown has elapsed: {err}");
                }
            }
        }

        finished
    }
}

/// Whole milliseconds, rounded up so that a deadline is never woken up early.
fn sleep_duration(remaining: Duration) -> std::time::Duration {
    let nanos = remaining.whole_nanoseconds().max(0);
    let millis = (nanos + 999_999) / 1_000_000;
    std::time::Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX))
}
