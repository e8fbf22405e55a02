use poise::serenity_prelude::{ChannelId, RoleId};
use serde::Deserialize;

/// Read from the environment (and `.env`), e.g. `DISCORD_BOT_TOKEN`.
#[derive(Deserialize)]
pub struct AppConfig {
    pub discord_bot_token: String,
    pub database_url: String,
    pub register_commands_globally: Option<bool>,
    pub register_commands_in_guilds: Option<Vec<u64>>,

    /// Members with this role may pray for intentions and comment on them.
    pub intercessor_role: Option<u64>,
    /// New intentions are announced here.
    pub intercession_channel: Option<u64>,

    #[serde(default = "default_donation_url")]
    pub donation_url: String,
    #[serde(default = "default_public_ip_url")]
    pub public_ip_url: String,
    #[serde(default = "default_geolocation_url")]
    pub geolocation_url: String,

    #[serde(default)]
    pub notify_cooldown_elapsed: bool,
}

fn default_donation_url() -> String {
    "https://www.paypal.com/donate/?hosted_button_id=D3R5W3QUV48J4".to_string()
}

fn default_public_ip_url() -> String {
    "https://api.ipify.org?format=json".to_string()
}

fn default_geolocation_url() -> String {
    "https://ipapi.co".to_string()
}

impl AppConfig {
    pub fn intercessor_role(&self) -> Option<RoleId> {
        self.intercessor_role.filter(|id| *id != 0).map(RoleId::new)
    }

    pub fn intercession_channel(&self) -> Option<ChannelId> {
        self.intercession_channel
            .filter(|id| *id != 0)
            .map(ChannelId::new)
    }
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude::{ChannelId, RoleId};

    use super::AppConfig;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, envy::Error> {
        envy::from_iter(
            vars.iter()
                .map(|(key, value)| (key.to_string(), value.to_string())),
        )
    }

    #[test]
    fn minimal() {
        let config = load(&[
            ("DISCORD_BOT_TOKEN", "token"),
            ("DATABASE_URL", "sqlite://intentions.db"),
        ])
        .unwrap();

        assert_eq!(config.register_commands_globally, None);
        assert_eq!(config.intercessor_role(), None);
        assert_eq!(config.public_ip_url, "https://api.ipify.org?format=json");
        assert_eq!(config.geolocation_url, "https://ipapi.co");
        assert!(config.donation_url.contains("D3R5W3QUV48J4"));
        assert!(!config.notify_cooldown_elapsed);
    }

    #[test]
    fn full() {
        let config = load(&[
            ("DISCORD_BOT_TOKEN", "token"),
            ("DATABASE_URL", "sqlite://intentions.db"),
            ("REGISTER_COMMANDS_GLOBALLY", "false"),
            ("REGISTER_COMMANDS_IN_GUILDS", "1,2"),
            ("INTERCESSOR_ROLE", "42"),
            ("INTERCESSION_CHANNEL", "43"),
            ("NOTIFY_COOLDOWN_ELAPSED", "true"),
        ])
        .unwrap();

        assert_eq!(config.register_commands_in_guilds, Some(vec![1, 2]));
        assert_eq!(config.intercessor_role(), Some(RoleId::new(42)));
        assert_eq!(config.intercession_channel(), Some(ChannelId::new(43)));
        assert!(config.notify_cooldown_elapsed);
    }

    #[test]
    fn missing_token() {
        assert!(load(&[("DATABASE_URL", "sqlite://intentions.db")]).is_err());
    }
}
