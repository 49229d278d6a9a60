use anyhow::{bail, Context, Result};
use autolink_sdk::{AUTOLINK_PLUGIN_ID, LINK_API_PATH};
use http::Uri;
use serde::{Deserialize, Serialize};

/// Addressing of the autolink plugin's link endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub plugin_id: String,
    pub api_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            plugin_id: AUTOLINK_PLUGIN_ID.to_string(),
            api_path: LINK_API_PATH.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.plugin_id.trim().is_empty() {
            bail!("plugin_id must not be empty");
        }
        if let Some(bad) = self
            .plugin_id
            .chars()
            .find(|c| matches!(c, '/' | '?' | '#') || c.is_whitespace())
        {
            bail!(
                "plugin_id `{}` must not contain `{}`",
                self.plugin_id,
                bad.escape_default()
            );
        }
        if !self.api_path.starts_with('/') {
            bail!("api_path `{}` must start with `/`", self.api_path);
        }
        if let Some(bad) = self
            .api_path
            .chars()
            .find(|c| matches!(c, '?' | '#') || c.is_whitespace())
        {
            bail!(
                "api_path `{}` must not contain `{}`",
                self.api_path,
                bad.escape_default()
            );
        }
        let route = self.route();
        route
            .parse::<Uri>()
            .with_context(|| format!("invalid link route `{route}`"))?;
        Ok(())
    }

    /// Path of the link endpoint as seen by the host, e.g. `/mattermost-autolink/api/v1/link`.
    pub fn route(&self) -> String {
        format!("/{}{}", self.plugin_id, self.api_path)
    }
}
