use std::env;

use anyhow::Result;

use crate::credentials::StaticCredentials;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Only
/// the server URL has a default — token and user id stay optional so
/// anonymous commands work with no setup at all.
pub struct Config {
    /// RepNet API base URL (defaults to http://localhost:3000).
    pub server_url: String,
    /// Bearer token for authenticated endpoints.
    pub token: Option<String>,
    /// The signed-in user's numeric id.
    pub user_id: Option<i64>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let user_id = match env::var("REPNET_USER_ID") {
            Ok(raw) => Some(raw.parse::<i64>().map_err(|_| {
                anyhow::anyhow!("REPNET_USER_ID must be a number, got '{raw}'")
            })?),
            Err(_) => None,
        };

        Ok(Self {
            server_url: env::var("REPNET_SERVER_URL")
                .unwrap_or_else(|_| crate::api::client::DEFAULT_SERVER_URL.to_string()),
            token: env::var("REPNET_TOKEN").ok().filter(|t| !t.is_empty()),
            user_id,
        })
    }

    /// Check that both halves of the credentials are configured.
    /// Call this before any operation that votes or lists own reports.
    pub fn require_auth(&self) -> Result<()> {
        if self.token.is_none() {
            anyhow::bail!(
                "REPNET_TOKEN not set. This operation requires authentication.\n\
                 Add it to your .env file."
            );
        }
        if self.user_id.is_none() {
            anyhow::bail!(
                "REPNET_USER_ID not set. Voting and own-report queries need the\n\
                 signed-in user's numeric id. Add it to your .env file."
            );
        }
        Ok(())
    }

    /// Build the credential provider backing API calls.
    pub fn credentials(&self) -> StaticCredentials {
        StaticCredentials::new(self.token.clone(), self.user_id)
    }
}
