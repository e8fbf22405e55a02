use poise::{
    samples::HelpConfiguration,
    serenity_prelude::{CreateActionRow, CreateButton, CreateEmbed, CreateEmbedFooter},
    CreateReply,
};

use crate::{
    commands::*,
    i18n::{text, MessageKey::*},
};

/// What this bot is about and how it works.
#[poise::command(slash_command, ephemeral)]
pub async fn about(ctx: Context<'_>) -> CommandResult {
    let language = visitor_language(ctx).await;

    let embed = CreateEmbed::new()
        .title(text(language, TabAbout))
        .description(text(language, AboutDescription))
        .field(
            text(language, TabAsk),
            format!(
                "**{}**: `/intention request`\n{}",
                text(language, RequestPray),
                text(language, IntentionPlaceholder)
            ),
            false,
        )
        .field(
            text(language, TrackIntention),
            "`/intention track`",
            true,
        )
        .field(text(language, Prayer), "`/intercede` · `/comment`", true)
        .footer(CreateEmbedFooter::new("intercede4.us"))
        .colour(EMBED_COLOUR);

    ctx.send(CreateReply::default().ephemeral(true).embed(embed))
        .await?;

    Ok(())
}

/// Support the project.
#[poise::command(slash_command, ephemeral)]
pub async fn donate(ctx: Context<'_>) -> CommandResult {
    let language = visitor_language(ctx).await;

    let embed = CreateEmbed::new()
        .title(text(language, Donate))
        .description(text(language, DonateDescription))
        .colour(EMBED_COLOUR);

    let button = CreateButton::new_link(ctx.data().donation_url.as_str())
        .label(text(language, Donate))
        .emoji('🙏');

    ctx.send(
        CreateReply::default()
            .ephemeral(true)
            .embed(embed)
            .components(vec![CreateActionRow::Buttons(vec![button])]),
    )
    .await?;

    Ok(())
}

/// Get help for available bot commands.
#[poise::command(slash_command, ephemeral)]
pub async fn help(
    ctx: Context<'_>,

    #[description = "The command to provide help about."]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> CommandResult {
    let config = HelpConfiguration {
        extra_text_at_bottom: "Use `/intention request` to ask for prayer.",
        ..Default::default()
    };

    poise::builtins::help(ctx, command.as_deref(), config).await?;

    Ok(())
}
