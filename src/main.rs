#![forbid(unsafe_code)]

mod commands;
mod config;
mod cooldown_service;
mod gate;
mod i18n;
mod ip_locator;
mod models;
mod poise_error_handler;
mod repository;
mod submitter;
mod utils;

use std::{process::exit, str::FromStr, sync::Arc};

use config::AppConfig;
use cooldown_service::{CooldownHandle, CooldownService};
use ip_locator::HttpIpLocator;
use poise::{serenity_prelude::*, Framework};
use poise_error_handler::handle_error;
use repository::{IntentionRepository, LocalStorageRepository};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use submitter::IntentionSubmitter;
use tokio::{select, signal, sync::Notify};
use tracing::{error, info, info_span, warn, Instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub struct BotState {
    pub intention_repository: Arc<IntentionRepository>,
    pub local_storage: LocalStorageRepository,
    pub submitter: IntentionSubmitter,
    pub cooldowns: CooldownHandle,
    pub intercessor_role: Option<RoleId>,
    pub intercession_channel: Option<ChannelId>,
    pub donation_url: String,
}

#[tokio::main]
async fn main() {
    if let Err(err) = dotenvy::dotenv() {
        warn!("Could not load config from .env file: {err}");
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(
                    "intercession_bot=info"
                        .parse()
                        .expect("Hard-coded default directive should be correct"),
                )
                .from_env_lossy(),
        )
        .init();

    let app_config = match envy::from_env::<AppConfig>() {
        Ok(config) => config,
        Err(err) => {
            error!("Could not load app config: {err}");
            exit(255);
        }
    };

    let db_pool = match setup_database(&app_config.database_url).await {
        Ok(pool) => pool,
        Err(err) => {
            error!("Could not setup database: {err}");
            exit(255);
        }
    };

    let locator = match HttpIpLocator::new(&app_config.public_ip_url, &app_config.geolocation_url)
    {
        Ok(locator) => locator,
        Err(err) => {
            error!("Could not create the IP locator: {err}");
            exit(255);
        }
    };

    let shutdown_notify = Arc::new(Notify::new());

    let intention_repository = Arc::new(IntentionRepository::new(db_pool.clone()));
    let local_storage = LocalStorageRepository::new(db_pool.clone());
    let (cooldown_service, cooldowns) =
        CooldownService::new(local_storage.clone(), shutdown_notify.clone());

    let app_state = BotState {
        intention_repository: intention_repository.clone(),
        local_storage,
        submitter: IntentionSubmitter::new(Arc::new(locator), intention_repository),
        cooldowns,
        intercessor_role: app_config.intercessor_role(),
        intercession_channel: app_config.intercession_channel(),
        donation_url: app_config.donation_url.clone(),
    };

    let register_globally = app_config.register_commands_globally;
    let register_in_guilds = app_config.register_commands_in_guilds.clone();
    let notify_cooldown_elapsed = app_config.notify_cooldown_elapsed;

    let framework = Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            on_error: |error| Box::pin(handle_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(
                async move {
                    let commands = &framework.options().commands;

                    if let Some(true) = register_globally {
                        info!("Registering commands globally");
                        poise::builtins::register_globally(ctx, commands).await?;
                    }

                    if let Some(guilds) = register_in_guilds {
                        for guild in guilds.iter().map(|g| GuildId::new(*g)) {
                            let guild_name = ctx
                                .http()
                                .get_guild(guild)
                                .await
                                .map(|g| g.name)
                                .unwrap_or("???".to_string());

                            info!("Registering commands in guild {guild} ({guild_name})");

                            poise::builtins::register_in_guild(ctx, commands, guild).await?;
                        }
                    }

                    let cooldown_service = if notify_cooldown_elapsed {
                        cooldown_service.notify_with(ctx.http.clone())
                    } else {
                        cooldown_service
                    };
                    cooldown_service.start();

                    Ok(app_state)
                }
                .instrument(info_span!("bot_setup")),
            )
        })
        .build();

    let mut client =
        match ClientBuilder::new(&app_config.discord_bot_token, GatewayIntents::GUILDS)
            .framework(framework)
            .await
        {
            Ok(client) => client,
            Err(err) => {
                error!("Failed to create the client: {err}");
                exit(255);
            }
        };

    select! {
        _ = signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
            shutdown_notify.notify_one();
            client.shard_manager.shutdown_all().await;
            db_pool.close().await;
        },

        result = client.start() => {
            if let Err(err) = result {
                error!("Failed to start the client: {err}");
            }
        },
    };
}

#[tracing::instrument(skip(url))]
async fn setup_database(url: &str) -> anyhow::Result<SqlitePool> {
    info!("Connecting to SQLite database at {url}");
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    info!("Running migrations");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Done!");
    Ok(pool)
}
