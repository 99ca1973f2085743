use config::{Config, ConfigError, Environment};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://slack.com/api";

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub slack: SlackSettings,
    pub app: AppSettings,
}

#[derive(Debug, Deserialize)]
pub struct SlackSettings {
    pub token: String,
    pub channel_id: String,
    pub base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct AppSettings {
    /// Inclusive lower bound, seconds since epoch.
    pub oldest: String,
    pub limit: usize,
    pub output: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let mut s = Config::new();
        s.set_default("slack.base_url", DEFAULT_BASE_URL)?;
        s.set_default("app.oldest", "1704056400")?;
        s.set_default("app.limit", 1000i64)?;
        s.set_default("app.output", "trades.xlsx")?;
        s.merge(Environment::new().separator("__"))?;
        s.try_into()
    }
}
