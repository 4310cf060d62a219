use std::sync::RwLock;

use reqwest::Client;
use tracing::{info, warn};

use crate::config::BetfairConfig;
use crate::error::{BetfairError, Result};
use crate::exchange::types::LoginResponse;

// Spanish identity domain, matching the account jurisdiction.
const IDENTITY_URL: &str = "https://identitysso.betfair.es/api";

/// Owns the authenticated session against the Betfair identity endpoint.
///
/// Instances are request-scoped: one session per inbound request, so the
/// lazy login never races across requests. The lock only exists so the
/// token can be stored behind `&self`.
pub struct BetfairSession {
    http: Client,
    config: BetfairConfig,
    identity_url: String,
    token: RwLock<Option<String>>,
}

impl BetfairSession {
    pub fn new(http: Client, config: BetfairConfig) -> Self {
        Self::with_identity_url(http, config, IDENTITY_URL.to_string())
    }

    /// Session against an alternative identity endpoint (exercised by tests;
    /// production callers use [`BetfairSession::new`]).
    pub fn with_identity_url(http: Client, config: BetfairConfig, identity_url: String) -> Self {
        let token = RwLock::new(config.session_token.clone());
        Self {
            http,
            config,
            identity_url,
            token,
        }
    }

    pub fn app_key(&self) -> &str {
        &self.config.app_key
    }

    /// Return the held session token, logging in first if none is held.
    ///
    /// A token supplied at construction is trusted without validation;
    /// an expired one surfaces as an upstream error on the first data call.
    pub async fn ensure_authenticated(&self) -> Result<String> {
        {
            let guard = self.token.read().unwrap();
            if let Some(ref token) = *guard {
                return Ok(token.clone());
            }
        }

        let token = self.login().await?;
        *self.token.write().unwrap() = Some(token.clone());
        Ok(token)
    }

    async fn login(&self) -> Result<String> {
        let username = self.config.username.as_deref().ok_or_else(|| {
            BetfairError::Configuration("Missing username for Betfair login".to_string())
        })?;
        let password = self.config.password.as_deref().ok_or_else(|| {
            BetfairError::Configuration("Missing password for Betfair login".to_string())
        })?;

        info!("Logging in to Betfair at {}", self.identity_url);

        let response = self
            .http
            .post(format!("{}/login", self.identity_url))
            .header("X-Application", &self.config.app_key)
            .header("Accept", "application/json")
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BetfairError::Authentication {
                status: status.as_u16(),
                body,
            });
        }

        let login: LoginResponse = response.json().await?;
        if login.status != "SUCCESS" {
            return Err(BetfairError::Authentication {
                status: status.as_u16(),
                body: format!(
                    "{} - {}",
                    login.status,
                    login.error.unwrap_or_else(|| "Unknown error".to_string())
                ),
            });
        }

        let token = login.token.ok_or_else(|| BetfairError::Authentication {
            status: status.as_u16(),
            body: "Login succeeded but no session token returned".to_string(),
        })?;

        info!("Betfair login successful");
        Ok(token)
    }

    /// Renew the session lifetime. Advisory: callers that do not depend on
    /// it may ignore failures.
    pub async fn keep_alive(&self) -> Result<()> {
        let token = self.ensure_authenticated().await?;

        let response = self
            .http
            .post(format!("{}/keepAlive", self.identity_url))
            .header("X-Application", &self.config.app_key)
            .header("X-Authentication", &token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BetfairError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    /// Best-effort upstream revoke, then clear the token locally.
    /// Failures are logged, never surfaced.
    pub async fn logout(&self) {
        let token = match self.token.write().unwrap().take() {
            Some(token) => token,
            None => return,
        };

        let result = self
            .http
            .post(format!("{}/logout", self.identity_url))
            .header("X-Application", &self.config.app_key)
            .header("X-Authentication", &token)
            .send()
            .await;

        if let Err(err) = result {
            warn!("Betfair logout failed: {}", err);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// One-shot identity endpoint answering every request with `body`.
    /// Returns the base URL to hand to `with_identity_url`.
    pub(crate) async fn spawn_identity_stub(body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        format!("http://{}", addr)
    }

    fn session_with_token(token: &str) -> BetfairSession {
        let config = BetfairConfig::with_session_token("key".to_string(), token.to_string());
        BetfairSession::new(Client::new(), config)
    }

    #[tokio::test]
    async fn test_supplied_token_is_reused_without_login() {
        let session = session_with_token("abc123");

        // No credentials configured, so any login attempt would fail with a
        // configuration error instead of returning the token.
        let token = session.ensure_authenticated().await.unwrap();
        assert_eq!(token, "abc123");
    }

    #[tokio::test]
    async fn test_login_without_credentials_is_configuration_error() {
        let config = BetfairConfig {
            app_key: "key".to_string(),
            ..Default::default()
        };
        let session = BetfairSession::new(Client::new(), config);

        let err = session.ensure_authenticated().await.unwrap_err();
        assert!(matches!(err, BetfairError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_non_success_login_is_authentication_error() {
        let url =
            spawn_identity_stub(r#"{"status":"FAIL","error":"INVALID_USERNAME_OR_PASSWORD"}"#)
                .await;

        let config = BetfairConfig::with_credentials(
            "key".to_string(),
            "user".to_string(),
            "pass".to_string(),
        );
        let session = BetfairSession::with_identity_url(Client::new(), config, url);

        let err = session.ensure_authenticated().await.unwrap_err();
        match err {
            BetfairError::Authentication { status, body } => {
                assert_eq!(status, 200);
                assert!(body.contains("FAIL"));
                assert!(body.contains("INVALID_USERNAME_OR_PASSWORD"));
            }
            other => panic!("Expected authentication error, got {:?}", other),
        }

        // The rejected login must not leave a token behind.
        assert!(session.token.read().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_successful_login_stores_token() {
        let url = spawn_identity_stub(
            r#"{"status":"SUCCESS","token":"tok42","product":"key"}"#,
        )
        .await;

        let config = BetfairConfig::with_credentials(
            "key".to_string(),
            "user".to_string(),
            "pass".to_string(),
        );
        let session = BetfairSession::with_identity_url(Client::new(), config, url);

        let token = session.ensure_authenticated().await.unwrap();
        assert_eq!(token, "tok42");

        // The stub serves a single request: a second call must reuse the
        // stored token instead of logging in again.
        let again = session.ensure_authenticated().await.unwrap();
        assert_eq!(again, "tok42");
    }
}
