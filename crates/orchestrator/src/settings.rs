//! Runtime settings for the orchestrator.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use holocron_core::SortPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tip_storage::OrphanPolicy;

/// Where responses are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    /// The channel the command came from.
    #[default]
    Channel,
    /// A direct message to the requester.
    Direct,
}

impl FromStr for ResponseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "channel" => Ok(Self::Channel),
            "dm" | "direct" => Ok(Self::Direct),
            other => Err(format!("unknown response mode: {}", other)),
        }
    }
}

/// Errors reading settings from the environment.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid value for {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

/// Orchestrator settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Prefix that marks a command message, e.g. `!`.
    pub prefix: String,
    /// Order tips and candidates are shown in.
    pub tip_sort: SortPolicy,
    pub response_mode: ResponseMode,
    /// What happens to a deleted squad's tips.
    pub orphan_policy: OrphanPolicy,
    /// Directory with `<mode>/labels.json`, `<mode>/shape.json` and map images.
    pub data_dir: PathBuf,
    /// How often expired pending interactions are swept.
    pub sweep_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prefix: "!".to_string(),
            tip_sort: SortPolicy::default(),
            response_mode: ResponseMode::default(),
            orphan_policy: OrphanPolicy::default(),
            data_dir: PathBuf::from("data"),
            sweep_interval: Duration::from_secs(86_400),
        }
    }
}

impl Settings {
    /// Load settings from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `HOLOCRON_PREFIX` | `!` |
    /// | `HOLOCRON_TIP_SORT` | `recent` (`recent`, `rating`, `oldest`) |
    /// | `HOLOCRON_RESPONSE_MODE` | `channel` (`channel`, `dm`) |
    /// | `HOLOCRON_ORPHAN_POLICY` | `delete` (`delete`, `retain`) |
    /// | `HOLOCRON_DATA_DIR` | `data` |
    /// | `HOLOCRON_SWEEP_INTERVAL_SECS` | `86400` |
    pub fn from_env() -> Result<Self, SettingsError> {
        let defaults = Self::default();

        let prefix = env::var("HOLOCRON_PREFIX").unwrap_or(defaults.prefix);
        let tip_sort = parse_var("HOLOCRON_TIP_SORT")?.unwrap_or(defaults.tip_sort);
        let response_mode = parse_var("HOLOCRON_RESPONSE_MODE")?.unwrap_or(defaults.response_mode);
        let orphan_policy = parse_var("HOLOCRON_ORPHAN_POLICY")?.unwrap_or(defaults.orphan_policy);
        let data_dir = env::var("HOLOCRON_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let sweep_interval = parse_var::<u64>("HOLOCRON_SWEEP_INTERVAL_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.sweep_interval);

        Ok(Self {
            prefix,
            tip_sort,
            response_mode,
            orphan_policy,
            data_dir,
            sweep_interval,
        })
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_response_mode(mut self, response_mode: ResponseMode) -> Self {
        self.response_mode = response_mode;
        self
    }
}

fn parse_var<T>(var: &'static str) -> Result<Option<T>, SettingsError>
where
    T: FromStr,
    T::Err: ToString,
{
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| SettingsError::Invalid {
                var,
                message: e.to_string(),
            }),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.prefix, "!");
        assert_eq!(settings.tip_sort, SortPolicy::Recent);
        assert_eq!(settings.response_mode, ResponseMode::Channel);
        assert_eq!(settings.orphan_policy, OrphanPolicy::Delete);
        assert_eq!(settings.sweep_interval, Duration::from_secs(86_400));
    }

    #[test]
    fn test_response_mode_parse() {
        assert_eq!("dm".parse::<ResponseMode>(), Ok(ResponseMode::Direct));
        assert_eq!("Channel".parse::<ResponseMode>(), Ok(ResponseMode::Channel));
        assert!("carrier pigeon".parse::<ResponseMode>().is_err());
    }
}
