use std::{fs, path::Path, str::FromStr, sync::OnceLock};

use anyhow::{bail, Context, Result};
use autolink_client::ClientConfig;
use http::Uri;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Root of `autolink.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CliConfig {
    pub server: ServerConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub url: String,
    pub token: Option<String>,
    pub plugins_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8065".into(),
            token: None,
            plugins_prefix: "/plugins".into(),
        }
    }
}

impl CliConfig {
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.client.validate().context("invalid [client] section")?;
        Ok(())
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        let uri = Uri::from_str(&self.url)
            .with_context(|| format!("invalid server url `{}`", self.url))?;
        if !matches!(uri.scheme_str(), Some("http" | "https")) {
            bail!("server url `{}` must use the http or https scheme", self.url);
        }
        if uri.authority().is_none() {
            bail!("server url `{}` must include a host", self.url);
        }
        if !self.plugins_prefix.starts_with('/') {
            bail!("plugins_prefix `{}` must start with `/`", self.plugins_prefix);
        }
        Ok(())
    }

    /// Bearer token, treating an empty value (e.g. an unset `${VAR}`) as absent.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.trim().is_empty())
    }
}

pub fn load_config(path: &Path) -> Result<CliConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let cfg = parse_config(&raw).with_context(|| format!("failed to parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid configuration in {}", path.display()))?;
    Ok(cfg)
}

fn parse_config(raw: &str) -> Result<CliConfig> {
    let expanded = interpolate_env(raw);
    Ok(toml::from_str::<CliConfig>(&expanded)?)
}

/// Replaces `${VAR}` and `${VAR:default}` with values from the environment.
fn interpolate_env(input: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let regex = RE.get_or_init(|| Regex::new(r"\$\{([A-Z0-9_]+)(?::([^}]+))?\}").unwrap());
    regex
        .replace_all(input, |caps: &regex::Captures| {
            let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(&caps[1]).unwrap_or_else(|_| default.to_string())
        })
        .into_owned()
}
