use indoc::formatdoc;
use poise::{
    serenity_prelude::{ChannelId, CreateEmbed, CreateEmbedFooter, CreateMessage},
    CreateReply,
};
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::{
    commands::{arguments::TrimmedString, *},
    gate::SubmissionGate,
    i18n::{resolve_language, text, MessageKey::*},
    models::{Intention, Language, ShortCode},
    submitter::SubmitError,
    utils::formatting::{format_countdown, format_local, format_utc, truncate},
};

const ANNOUNCEMENT_LENGTH: usize = 1000;
const COMMENT_PREVIEW_COUNT: usize = 10;

#[poise::command(
    slash_command,
    subcommands("intention_request", "intention_track"),
    subcommand_required
)]
pub async fn intention(_ctx: Context<'_>) -> CommandResult {
    Ok(())
}

/// Ask for prayer. Nobody will know who you are.
#[tracing::instrument(skip_all)]
#[poise::command(slash_command, rename = "request", ephemeral)]
pub async fn intention_request(
    ctx: Context<'_>,

    #[description = "Your intention. Only intercessors will read it."] content: TrimmedString,
) -> CommandResult {
    let visitor = ctx.author().id;
    let storage = ctx.data().local_storage.scoped(visitor);
    let language = resolve_language(&storage, ctx.locale()).await;
    let gate = SubmissionGate::new(storage);

    // Address and geolocation lookups can outlast the interaction deadline.
    ctx.defer_ephemeral().await?;

    let receipt = match ctx
        .data()
        .submitter
        .submit(visitor, &gate, content.as_ref(), OffsetDateTime::now_utc())
        .await
    {
        Ok(receipt) => receipt,

        Err(SubmitError::EmptyContent) => {
            return Err(user_err(format!(
                "**{}**",
                text(language, IntentionRequired)
            )));
        }

        Err(SubmitError::ContentTooLong { max }) => {
            return Err(user_err(format!(
                "**{}** ({max})",
                text(language, IntentionTooLong)
            )));
        }

        Err(SubmitError::CoolingDown { unlock_at }) => {
            let message = formatdoc! {
                r#"
                    **{active}**

                    {title}: {countdown}
                "#,
                active = text(language, CooldownActive),
                title = text(language, CountdownTitle),
                countdown = format_countdown(unlock_at),
            };
            return Err(user_err(message));
        }

        Err(err) => {
            return Err(internal_err(format!("Could not submit the intention: {err}")));
        }
    };

    let intention = receipt.intention;

    if let Some(unlock_at) = receipt.unlock_at {
        ctx.data().cooldowns.schedule(visitor, unlock_at).await;
    }

    if let Some(channel) = ctx.data().intercession_channel {
        announce(ctx, channel, &intention).await;
    }

    let mut description = formatdoc! {
        r#"
            {hint}
            # `{code}`
        "#,
        hint = text(language, TrackHint),
        code = intention.code,
    };

    if let Some(unlock_at) = receipt.unlock_at {
        description += &format!(
            "\n{}: {}",
            text(language, CountdownTitle),
            format_countdown(unlock_at)
        );
    }

    let embed = CreateEmbed::new()
        .title(text(language, IntentionSuccess))
        .description(description)
        .colour(EMBED_COLOUR);

    ctx.send(CreateReply::default().ephemeral(true).embed(embed))
        .await?;

    Ok(())
}

/// Follow the prayers and messages for your intention.
#[tracing::instrument(skip_all)]
#[poise::command(slash_command, rename = "track", ephemeral)]
pub async fn intention_track(
    ctx: Context<'_>,

    #[description = "The code you received when you sent the intention."] code: ShortCode,
) -> CommandResult {
    let language = visitor_language(ctx).await;

    let intention = match ctx.data().intention_repository.find_by_code(&code).await {
        Ok(Some(intention)) => intention,
        Ok(None) => {
            return Err(user_err(format!(
                "**{}** `{code}`",
                text(language, IntentionNotFound)
            )));
        }
        Err(err) => {
            return Err(internal_err(format!("Could not find the intention: {err}")));
        }
    };

    debug!("Tracking intention {}", intention.code);

    ctx.send(
        CreateReply::default()
            .ephemeral(true)
            .embed(tracking_embed(&intention, language)),
    )
    .await?;

    Ok(())
}

fn tracking_embed(intention: &Intention, language: Language) -> CreateEmbed {
    let comments = if intention.comments.is_empty() {
        text(language, NoComments).to_string()
    } else {
        intention
            .comments
            .iter()
            .rev()
            .take(COMMENT_PREVIEW_COUNT)
            .rev()
            .map(|comment| {
                format!(
                    "{}: {}",
                    format_local(comment.created_at),
                    truncate(&comment.content, 200)
                )
            })
            .collect::<Vec<String>>()
            .join("\n")
    };

    CreateEmbed::new()
        .title(format!("{} `{}`", text(language, TrackIntention), intention.code))
        .description(truncate(&intention.content, 4000))
        .field(
            text(language, SentAt),
            format_local(intention.created_at),
            true,
        )
        .field(
            text(language, Prayers),
            intention.prayers.len().to_string(),
            true,
        )
        .field(
            format!("{} ({})", text(language, Comments), intention.comments.len()),
            comments,
            false,
        )
        .colour(EMBED_COLOUR)
}

/// Lets the intercessors know; the submitter's address and location stay
/// private.
async fn announce(ctx: Context<'_>, channel: ChannelId, intention: &Intention) {
    let language = Language::FALLBACK;

    let embed = CreateEmbed::new()
        .title(format!("{} `{}`", text(language, NewIntention), intention.code))
        .description(truncate(&intention.content, ANNOUNCEMENT_LENGTH))
        .footer(CreateEmbedFooter::new(format!(
            "/intercede {code} · /comment {code} · {created} UTC",
            code = intention.code,
            created = format_utc(intention.created_at),
        )))
        .colour(EMBED_COLOUR);

    if let Err(err) = channel
        .send_message(ctx.serenity_context(), CreateMessage::new().embed(embed))
        .await
    {
        warn!(
            "Could not announce intention {} in channel {channel}: {err}",
            intention.code
        );
    }
}
