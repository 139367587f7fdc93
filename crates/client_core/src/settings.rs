use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use shared::domain::DEFAULT_VIDEO_TITLE;
use url::Url;

pub const DEFAULT_SETTINGS_FILE: &str = "autodidact.toml";

/// How late health-probe results are reconciled with newer status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusOrdering {
    /// Probe results older than the current status are dropped.
    #[default]
    Sequenced,
    /// Whatever response arrives last is shown.
    LastResponseWins,
}

impl FromStr for StatusOrdering {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "sequenced" => Ok(StatusOrdering::Sequenced),
            "last_response_wins" => Ok(StatusOrdering::LastResponseWins),
            other => Err(anyhow!("unknown status ordering '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub backend_url: String,
    /// Zero disables the per-request timeout.
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub video_title: String,
    pub status_ordering: StatusOrdering,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".into(),
            request_timeout_secs: 300,
            connect_timeout_secs: 10,
            video_title: DEFAULT_VIDEO_TITLE.into(),
            status_ordering: StatusOrdering::Sequenced,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    backend_url: Option<String>,
    request_timeout_secs: Option<u64>,
    connect_timeout_secs: Option<u64>,
    video_title: Option<String>,
    status_ordering: Option<StatusOrdering>,
}

impl Settings {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(self.backend_url.trim())
            .with_context(|| format!("backend url '{}' is not a valid url", self.backend_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow!(
                "backend url '{}' must use http or https",
                self.backend_url
            ));
        }
        Ok(())
    }

    fn apply_file(&mut self, raw: &str) -> Result<()> {
        let file_cfg: FileSettings = toml::from_str(raw)?;
        if let Some(v) = file_cfg.backend_url {
            self.backend_url = v;
        }
        if let Some(v) = file_cfg.request_timeout_secs {
            self.request_timeout_secs = v;
        }
        if let Some(v) = file_cfg.connect_timeout_secs {
            self.connect_timeout_secs = v;
        }
        if let Some(v) = file_cfg.video_title {
            self.video_title = v;
        }
        if let Some(v) = file_cfg.status_ordering {
            self.status_ordering = v;
        }
        Ok(())
    }

    fn apply_env(&mut self, env: &impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = env("AUTODIDACT_BACKEND_URL") {
            self.backend_url = v;
        }
        if let Some(v) = env("APP__BACKEND_URL") {
            self.backend_url = v;
        }

        if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = v
                .trim()
                .parse()
                .with_context(|| format!("APP__REQUEST_TIMEOUT_SECS='{v}' is not a number"))?;
        }
        if let Some(v) = env("APP__CONNECT_TIMEOUT_SECS") {
            self.connect_timeout_secs = v
                .trim()
                .parse()
                .with_context(|| format!("APP__CONNECT_TIMEOUT_SECS='{v}' is not a number"))?;
        }

        if let Some(v) = env("APP__VIDEO_TITLE") {
            self.video_title = v;
        }
        if let Some(v) = env("APP__STATUS_ORDERING") {
            self.status_ordering = v.parse()?;
        }
        Ok(())
    }
}

/// Settings file path: `AUTODIDACT_CONFIG` when set, else `autodidact.toml` in the working dir.
pub fn settings_path() -> PathBuf {
    std::env::var_os("AUTODIDACT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
}

pub fn load_settings() -> Result<Settings> {
    load_settings_with(&settings_path(), |name| {
        std::env::var(name).ok().filter(|v| !v.trim().is_empty())
    })
}

/// Defaults, then the TOML file at `path` if it exists, then `env` overrides.
pub fn load_settings_with(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => settings
            .apply_file(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    }

    settings.apply_env(&env)?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
