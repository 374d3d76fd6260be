//! Configuration loaded from environment variables.

use std::env;

/// Console front end configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database URL.
    pub database_url: String,
    /// Requester ids holding the elevated role.
    pub admins: Vec<String>,
    /// Known members as `(display name, id)`, used to reassign authors.
    pub members: Vec<(String, String)>,
    /// Id of the console user.
    pub user_id: String,
    /// Display name of the console user.
    pub user_name: String,
    /// Channel the console speaks in.
    pub channel_id: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `HOLOCRON_DATABASE_URL` | SQLite database URL | `sqlite:holocron.db?mode=rwc` |
    /// | `HOLOCRON_ADMINS` | Comma-separated elevated user ids | (none) |
    /// | `HOLOCRON_MEMBERS` | Comma-separated `name=id` pairs | (none) |
    /// | `HOLOCRON_USER_ID` | Console user id | `console` |
    /// | `HOLOCRON_USER_NAME` | Console user name | `Console` |
    /// | `HOLOCRON_CHANNEL` | Console channel id | `console` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("HOLOCRON_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:holocron.db?mode=rwc".to_string());

        let admins = env::var("HOLOCRON_ADMINS")
            .map(|value| parse_list(&value))
            .unwrap_or_default();

        let members = match env::var("HOLOCRON_MEMBERS") {
            Ok(value) => parse_members(&value)?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            database_url,
            admins,
            members,
            user_id: env::var("HOLOCRON_USER_ID").unwrap_or_else(|_| "console".to_string()),
            user_name: env::var("HOLOCRON_USER_NAME").unwrap_or_else(|_| "Console".to_string()),
            channel_id: env::var("HOLOCRON_CHANNEL").unwrap_or_else(|_| "console".to_string()),
        })
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_members(value: &str) -> Result<Vec<(String, String)>, ConfigError> {
    parse_list(value)
        .into_iter()
        .map(|entry| match entry.split_once('=') {
            Some((name, id)) if !name.trim().is_empty() && !id.trim().is_empty() => {
                Ok((name.trim().to_string(), id.trim().to_string()))
            }
            _ => Err(ConfigError::InvalidMember(entry)),
        })
        .collect()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid HOLOCRON_MEMBERS entry `{0}`, expected `name=id`")]
    InvalidMember(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_skips_blanks() {
        assert_eq!(parse_list(" u1, ,u2 ,"), vec!["u1", "u2"]);
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_parse_members() {
        let members = parse_members("Han = u-han, Leia=u-leia").unwrap();
        assert_eq!(
            members,
            vec![
                ("Han".to_string(), "u-han".to_string()),
                ("Leia".to_string(), "u-leia".to_string())
            ]
        );
        assert!(matches!(
            parse_members("Han"),
            Err(ConfigError::InvalidMember(entry)) if entry == "Han"
        ));
    }
}
