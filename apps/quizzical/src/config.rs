use std::{env, fs, path::PathBuf, time::Duration};

use anyhow::Context;
use opentdb::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use serde::Deserialize;
use tracing::warn;
use url::Url;

const CONFIG_FILE: &str = "quizzical.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub quizzes_file: PathBuf,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.into(),
            quizzes_file: default_quizzes_file(),
            request_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Settings {
    /// Client settings for the trivia backend; fails if the base URL does
    /// not parse.
    pub fn client_config(&self) -> anyhow::Result<ClientConfig> {
        Url::parse(&self.api_base_url)
            .with_context(|| format!("invalid trivia api url '{}'", self.api_base_url))?;
        Ok(ClientConfig {
            base_url: self.api_base_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
            ..ClientConfig::default()
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    quizzes_file: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
}

fn default_quizzes_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quizzical")
        .join("quizzes.json")
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(CONFIG_FILE) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| env::var(key).ok());

    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let file_cfg = match toml::from_str::<FileSettings>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!(%err, "ignoring unreadable {CONFIG_FILE}");
            return;
        }
    };

    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.quizzes_file {
        settings.quizzes_file = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("QUIZZICAL_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = var("QUIZZICAL_QUIZZES_FILE") {
        settings.quizzes_file = PathBuf::from(v);
    }
    if let Some(v) = var("QUIZZICAL_TIMEOUT_SECS") {
        match v.trim().parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = parsed,
            Err(_) => warn!(value = %v, "ignoring non-numeric QUIZZICAL_TIMEOUT_SECS"),
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
