use poise::{Context, CreateReply, FrameworkError};
use tracing::{error, warn};

use crate::{commands::CommandError, BotState};

pub async fn handle_error(error: poise::FrameworkError<'_, BotState, CommandError>) {
    use FrameworkError::*;

    match error {
        Setup { error, .. } => {
            error!("Error in user data setup: {}", error);
        }

        EventHandler { error, event, .. } => {
            error!(
                "Error in user event {} handler: {}",
                event.snake_case_name(),
                error
            );
        }

        Command { error, ctx, .. } => match error {
            CommandError::User { message } => {
                reply_with_error(ctx, &message).await;
            }

            CommandError::Internal { message } => {
                reply_with_internal_error(ctx, &message).await;
                error!("Internal error: {}", message);
            }

            CommandError::Serenity(error) => {
                reply_with_internal_error(ctx, &error.to_string()).await;
                error!("Serenity error: {}", error);
            }
        },

        ArgumentParse {
            error, input, ctx, ..
        } => {
            let usage = ctx
                .command()
                .help_text
                .as_deref()
                .unwrap_or("Please check the help menu or contact the admins.");

            let response = if let Some(input) = input {
                format!(
                    "**Sorry, cannot parse `{}` as an argument: {}**\n{}",
                    input, error, usage
                )
            } else {
                format!("**{}**\n{}", error, usage)
            };

            reply_with_error(ctx, &response).await;
        }

        CommandStructureMismatch {
            description, ctx, ..
        } => {
            error!(
                "Failed to deserialize interaction arguments for `{}`: {}",
                ctx.command.qualified_name, description
            );
        }

        GuildOnly { ctx, .. } => {
            reply_with_error(
                ctx,
                "Sorry, but you can only run this command in a server where you are an intercessor.",
            )
            .await;
        }

        CommandCheckFailed { error, ctx, .. } => {
            let message = match error {
                Some(CommandError::User { message }) => message,
                Some(error) => {
                    error!("Command check failed: {}", error);
                    "Sorry, can't run this command due to a failed command check.".to_string()
                }
                None => "Sorry, only intercessors can run this command.".to_string(),
            };

            reply_with_error(ctx, &message).await;
        }

        UnknownInteraction { interaction, .. } => {
            warn!("Received an unknown interaction: {:?}", interaction);
        }

        error => {
            error!("Unknown error: {}", error);
        }
    }
}

async fn reply_with_error(ctx: Context<'_, BotState, CommandError>, error_message: &str) {
    if let Err(send_error) = poise::send_reply(
        ctx,
        CreateReply::default()
            .content(error_message)
            .ephemeral(true),
    )
    .await
    {
        error!(
            "Failed to send an error message to the user: {}\nThe message was: {}",
            send_error, error_message
        );
    }
}

async fn reply_with_internal_error(ctx: Context<'_, BotState, CommandError>, error_message: &str) {
    reply_with_error(
        ctx,
        &format!(
            "Sorry, there was an internal error while executing your command: {}",
            error_message
        ),
    )
    .await;
}
