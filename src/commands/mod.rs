mod arguments;
mod info;
mod intention;
mod intercede;
mod language;

use poise::serenity_prelude::Colour;

use crate::{i18n::resolve_language, models::Language, BotState};

pub use info::{about, donate, help};
pub use intention::intention;
pub use intercede::{comment, intercede};
pub use language::language;

type CommandResult = Result<(), CommandError>;
type Context<'a> = poise::Context<'a, BotState, CommandError>;

const EMBED_COLOUR: Colour = Colour::new(0x1890ff);

#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error("{message}")]
    User { message: String },
    #[error("{message}")]
    Internal { message: String },
    #[error(transparent)]
    Serenity(#[from] serenity::Error),
}

pub fn user_err(message: impl Into<String>) -> CommandError {
    CommandError::User {
        message: message.into(),
    }
}

pub fn internal_err(message: impl Into<String>) -> CommandError {
    CommandError::Internal {
        message: message.into(),
    }
}

pub fn all() -> Vec<poise::Command<BotState, CommandError>> {
    vec![
        intention(),
        intercede(),
        comment(),
        language(),
        about(),
        donate(),
        help(),
    ]
}

/// The invoking visitor's language, detected from their Discord locale on
/// first use.
async fn visitor_language(ctx: Context<'_>) -> Language {
    let storage = ctx.data().local_storage.scoped(ctx.author().id);
    resolve_language(&storage, ctx.locale()).await
}
