use crate::error::{BetfairError, Result};

/// Per-request Betfair credentials.
///
/// Every inbound request supplies its own config: the app key is mandatory,
/// plus either a ready-made session token or a username+password pair for
/// lazy login. Nothing is cached across requests.
#[derive(Debug, Clone, Default)]
pub struct BetfairConfig {
    pub app_key: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub session_token: Option<String>,
}

impl BetfairConfig {
    /// Config with username/password credentials for lazy login.
    pub fn with_credentials(app_key: String, username: String, password: String) -> Self {
        Self {
            app_key,
            username: Some(username),
            password: Some(password),
            session_token: None,
        }
    }

    /// Config with a caller-supplied session token. The token is trusted as-is;
    /// validity is discovered on the first API call.
    pub fn with_session_token(app_key: String, session_token: String) -> Self {
        Self {
            app_key,
            username: None,
            password: None,
            session_token: Some(session_token),
        }
    }

    /// Check the config before any network call is attempted.
    pub fn validate(&self) -> Result<()> {
        if self.app_key.trim().is_empty() {
            return Err(BetfairError::Configuration(
                "Missing Betfair app key".to_string(),
            ));
        }

        let has_credentials = self.username.is_some() && self.password.is_some();
        if self.session_token.is_none() && !has_credentials {
            return Err(BetfairError::Configuration(
                "Either provide a session token OR both username and password".to_string(),
            ));
        }

        Ok(())
    }

    /// Load config from the environment (used by the diagnostic binary).
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let config = Self {
            app_key: std::env::var("BETFAIR_APP_KEY").unwrap_or_default(),
            username: std::env::var("BETFAIR_USERNAME").ok(),
            password: std::env::var("BETFAIR_PASSWORD").ok(),
            session_token: std::env::var("BETFAIR_SESSION_TOKEN").ok(),
        };

        config.validate()?;
        Ok(config)
    }
}
