use poise::{serenity_prelude::CreateEmbed, CreateReply};

use crate::{
    commands::*,
    gate::LocalStore,
    i18n::{text, MessageKey::*, LANGUAGE_KEY},
    models::Language,
};

/// Show or change the language the bot talks to you in.
#[tracing::instrument(skip_all)]
#[poise::command(slash_command, ephemeral)]
pub async fn language(
    ctx: Context<'_>,

    #[description = "The new language."] language: Option<Language>,

    #[description = "Forget the chosen language and follow your Discord settings."]
    automatic: Option<bool>,
) -> CommandResult {
    let storage = ctx.data().local_storage.scoped(ctx.author().id);

    if automatic == Some(true) {
        storage
            .clear(LANGUAGE_KEY)
            .await
            .map_err(|err| internal_err(format!("Could not reset the language: {err}")))?;
    } else if let Some(language) = language {
        storage
            .set(LANGUAGE_KEY, language.code())
            .await
            .map_err(|err| internal_err(format!("Could not change the language: {err}")))?;
    }

    let current = visitor_language(ctx).await;

    let description = match (automatic, language) {
        (Some(true), _) => format!(
            "{}\n{} {}",
            text(current, LanguageAutomatic),
            current.flag(),
            current.native_name()
        ),
        (_, Some(_)) => format!(
            "{} {} {}",
            text(current, LanguageChanged),
            current.flag(),
            current.native_name()
        ),
        _ => format!("{} {}", current.flag(), current.native_name()),
    };

    let embed = CreateEmbed::new()
        .title(text(current, ChangeLanguage))
        .description(description)
        .colour(EMBED_COLOUR);

    ctx.send(CreateReply::default().ephemeral(true).embed(embed))
        .await?;

    Ok(())
}
