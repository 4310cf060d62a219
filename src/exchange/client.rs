use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::BetfairConfig;
use crate::error::{BetfairError, Result};
use crate::exchange::session::BetfairSession;
use crate::exchange::types::{MarketBook, MarketCatalogue, MarketFilter};

const BETTING_URL: &str = "https://api.betfair.com/exchange/betting/json-rpc/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// The two market-data operations the aggregator needs, plus session
/// keep-alive. Seam for exercising the aggregation pipeline without the
/// real exchange.
#[async_trait]
pub trait BetfairApi {
    async fn list_market_catalogue(
        &self,
        filter: &MarketFilter,
        max_results: u32,
        market_projection: &[&str],
    ) -> Result<Vec<MarketCatalogue>>;

    /// Order-book snapshots at the given best-offers depth. An empty
    /// `market_ids` slice short-circuits to an empty result with no
    /// network call.
    async fn list_market_book(
        &self,
        market_ids: &[String],
        best_prices_depth: u32,
    ) -> Result<Vec<MarketBook>>;

    async fn keep_alive(&self) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<serde_json::Value>,
}

/// Typed façade over the Betfair JSON-RPC betting endpoint.
pub struct BetfairClient {
    http: Client,
    session: BetfairSession,
}

impl BetfairClient {
    /// Build a client for one request. Fails with a configuration error
    /// before any network traffic when credentials are incomplete.
    pub fn new(config: BetfairConfig) -> Result<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(BetfairError::from)?;

        let session = BetfairSession::new(http.clone(), config);
        Ok(Self { http, session })
    }

    pub fn session(&self) -> &BetfairSession {
        &self.session
    }

    async fn api_call<T, P>(&self, method: &str, params: &P) -> Result<T>
    where
        T: DeserializeOwned,
        P: serde::Serialize,
    {
        let token = self.session.ensure_authenticated().await?;

        debug!("Betfair API call: {}", method);

        let response = self
            .http
            .post(BETTING_URL)
            .header("X-Application", self.session.app_key())
            .header("X-Authentication", &token)
            .json(&serde_json::json!({
                "jsonrpc": "2.0",
                "method": method,
                "params": params,
                "id": 1,
            }))
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

        let rpc: JsonRpcResponse<T> = response.json().await?;

        // Application errors arrive embedded in a 200 response.
        if let Some(error) = rpc.error {
            return Err(BetfairError::Upstream {
                status: status.as_u16(),
                body: error.to_string(),
            });
        }

        rpc.result.ok_or_else(|| BetfairError::Upstream {
            status: status.as_u16(),
            body: "Missing result in Betfair response".to_string(),
        })
    }
}

#[async_trait]
impl BetfairApi for BetfairClient {
    async fn list_market_catalogue(
        &self,
        filter: &MarketFilter,
        max_results: u32,
        market_projection: &[&str],
    ) -> Result<Vec<MarketCatalogue>> {
        self.api_call(
            "SportsAPING/v1.0/listMarketCatalogue",
            &serde_json::json!({
                "filter": filter,
                "maxResults": max_results,
                "marketProjection": market_projection,
            }),
        )
        .await
    }

    async fn list_market_book(
        &self,
        market_ids: &[String],
        best_prices_depth: u32,
    ) -> Result<Vec<MarketBook>> {
        if market_ids.is_empty() {
            return Ok(Vec::new());
        }

        self.api_call(
            "SportsAPING/v1.0/listMarketBook",
            &serde_json::json!({
                "marketIds": market_ids,
                "priceProjection": {
                    "priceData": ["EX_BEST_OFFERS"],
                    "exBestOffersOverrides": {
                        "bestPricesDepth": best_prices_depth,
                    },
                },
            }),
        )
        .await
    }

    async fn keep_alive(&self) -> Result<()> {
        self.session.keep_alive().await
    }
}
