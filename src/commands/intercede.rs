use poise::CreateReply;
use tracing::info;

use crate::{
    commands::{arguments::TrimmedString, *},
    i18n::{text, MessageKey::*},
    models::{types::UtcDateTime, ShortCode},
    repository::PrayerOutcome,
    utils::formatting::truncate,
};

const MAX_COMMENT_LENGTH: usize = 1000;

/// Only members holding the intercessor role may pray and comment.
async fn is_intercessor(ctx: Context<'_>) -> Result<bool, CommandError> {
    let Some(role) = ctx.data().intercessor_role else {
        return Err(user_err(
            "Intercessors have not been configured for this bot yet.",
        ));
    };

    match ctx.author_member().await {
        Some(member) => Ok(member.roles.contains(&role)),
        None => Ok(false),
    }
}

/// Tell the submitter that you are praying for their intention.
#[tracing::instrument(skip_all)]
#[poise::command(slash_command, guild_only, ephemeral, check = "is_intercessor")]
pub async fn intercede(
    ctx: Context<'_>,

    #[description = "The intention code."] code: ShortCode,
) -> CommandResult {
    let language = visitor_language(ctx).await;

    let outcome = ctx
        .data()
        .intention_repository
        .add_prayer(&code, ctx.author().id, UtcDateTime::now())
        .await
        .map_err(|err| internal_err(format!("Could not record the prayer: {err}")))?;

    let message = match outcome {
        PrayerOutcome::Recorded => {
            info!("Intercessor {} prays for intention {code}", ctx.author().id);
            text(language, PrayerRecorded)
        }
        PrayerOutcome::AlreadyPrayed => text(language, AlreadyPrayed),
        PrayerOutcome::NotFound => {
            return Err(user_err(format!(
                "**{}** `{code}`",
                text(language, IntentionNotFound)
            )));
        }
    };

    ctx.send(CreateReply::default().ephemeral(true).content(message))
        .await?;

    Ok(())
}

/// Send a message of support the submitter can read with their code.
#[tracing::instrument(skip_all)]
#[poise::command(slash_command, guild_only, ephemeral, check = "is_intercessor")]
pub async fn comment(
    ctx: Context<'_>,

    #[description = "The intention code."] code: ShortCode,

    #[description = "Your message. The submitter will see it when tracking the intention."]
    message: TrimmedString,
) -> CommandResult {
    let language = visitor_language(ctx).await;

    if message.is_empty() {
        return Err(user_err("**The message is empty.**"));
    }

    let content = truncate(message.as_ref(), MAX_COMMENT_LENGTH);

    let comment = ctx
        .data()
        .intention_repository
        .add_comment(&code, ctx.author().id, &content, UtcDateTime::now())
        .await
        .map_err(|err| internal_err(format!("Could not save the message: {err}")))?;

    if comment.is_none() {
        return Err(user_err(format!(
            "**{}** `{code}`",
            text(language, IntentionNotFound)
        )));
    }

    ctx.send(
        CreateReply::default()
            .ephemeral(true)
            .content(text(language, CommentRecorded)),
    )
    .await?;

    Ok(())
}
